// RegMap - AXI4-Lite Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use regmap_codegen::{verify_file, DigestStatus};
use std::path::PathBuf;
use tracing::{error, info};

/// Checks and reports every file, including after a failure. Returns whether all of them
/// passed.
pub fn verify_files(files: &[PathBuf]) -> bool {
    let mut all_valid = true;
    for file in files {
        let status = match verify_file(file) {
            Ok(status) => status,
            Err(e) => {
                error!("Failed to read {}: {}", file.display(), e);
                all_valid = false;
                continue;
            }
        };
        match &status {
            DigestStatus::Valid => info!("Hash for file {} is valid", file.display()),
            DigestStatus::Mismatch { expected, actual } => {
                error!("Hash mismatch for file {}", file.display());
                error!("    Expected: {}", expected);
                error!("    Actual:   {}", actual);
            }
            DigestStatus::Missing => error!("Hash not found for file {}", file.display()),
            DigestStatus::FileMissing => error!("File does not exist: {}", file.display()),
        }
        all_valid &= status.is_valid();
    }
    all_valid
}
