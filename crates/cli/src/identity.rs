// RegMap - AXI4-Lite Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use regmap_ir::Identity;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Who, where and when, for the provenance header of generated files.
pub fn capture() -> Identity {
    let username = ["USER", "USERNAME"]
        .iter()
        .find_map(|key| non_empty_var(key));

    // COMPUTERNAME on Windows.
    let hostname = ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .find_map(|key| non_empty_var(key))
        .or_else(read_hostname_file)
        .or_else(run_hostname_command)
        .unwrap_or_else(|| "unknown".to_string());

    let timestamp = chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string();
    Identity::new(username, hostname, timestamp)
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn read_hostname_file() -> Option<String> {
    std::fs::read_to_string("/etc/hostname")
        .ok()
        .and_then(|s| first_line(&s))
}

/// `hostname` exists on Linux, macOS and Windows alike.
fn run_hostname_command() -> Option<String> {
    let output = std::process::Command::new("hostname").output().ok()?;
    if !output.status.success() {
        return None;
    }
    first_line(&String::from_utf8_lossy(&output.stdout))
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
