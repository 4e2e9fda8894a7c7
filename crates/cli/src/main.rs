// RegMap - AXI4-Lite Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use regmap_codegen::{Emitter, OutputFormat};
use regmap_ir::{compile_file, CompileError, CompileOptions, CompiledModel, Identity};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

mod identity;
mod verify;

const EXIT_PASS: u8 = 0;
const EXIT_CHECK_FAIL: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_ERROR: u8 = 3;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "AXI4-Lite register file generator",
    long_about = None
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate VHDL, Verilog and Markdown from a register map
    Generate(GenerateArgs),
    /// Print the flattened register map as JSON
    Flatten(FlattenArgs),
    /// Check the SHA-256 trailer of generated files
    Verify(VerifyArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Register map (JSON or YAML)
    input: PathBuf,

    /// Output base path; the format extension is appended
    #[arg(short, long)]
    output: PathBuf,

    /// Override config.entity_name
    #[arg(long)]
    entity_name: Option<String>,

    /// Also write the flattened register map as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FlattenArgs {
    /// Register map (JSON or YAML)
    input: PathBuf,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override config.entity_name
    #[arg(long)]
    entity_name: Option<String>,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Generated files to check
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so `flatten` can write JSON to stdout
    if cli.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Flatten(args) => run_flatten(args),
        Commands::Verify(args) => run_verify(args),
    }
}

fn load_model(input: &Path, entity_name: Option<String>) -> Result<CompiledModel, ExitCode> {
    if !input.exists() {
        error!("File does not exist: {}", input.display());
        return Err(ExitCode::from(EXIT_CONFIG_ERROR));
    }

    let options = CompileOptions { entity_name };
    match compile_file(input, &options) {
        Ok(model) => Ok(model),
        Err(e @ CompileError::Io(_)) => {
            error!("{}", e);
            Err(ExitCode::from(EXIT_RUNTIME_ERROR))
        }
        Err(e) => {
            error!("{}", e);
            Err(ExitCode::from(EXIT_CONFIG_ERROR))
        }
    }
}

/// The output base must not already carry one of the generated extensions.
fn has_generated_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| OutputFormat::ALL.iter().any(|f| f.extension() == ext))
        .unwrap_or(false)
}

fn with_extension_appended(base: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

fn write_or_exit(path: &Path, contents: &str) -> Result<(), ExitCode> {
    write_output(path, contents).map_err(|e| {
        error!("{:#}", e);
        ExitCode::from(EXIT_RUNTIME_ERROR)
    })
}

/// Captures the identity and applies it to the model, so `include_username` is off
/// wherever no user could be determined.
fn load_identity(model: &mut CompiledModel) -> Identity {
    let identity = identity::capture();
    model.adopt_identity(&identity);
    identity
}

fn run_generate(args: GenerateArgs) -> ExitCode {
    if has_generated_extension(&args.output) {
        error!(
            "Output path must not have an extension (.vhd, .v or .md): {}",
            args.output.display()
        );
        return ExitCode::from(EXIT_CONFIG_ERROR);
    }

    let mut model = match load_model(&args.input, args.entity_name) {
        Ok(model) => model,
        Err(code) => return code,
    };

    let identity = load_identity(&mut model);
    let artifacts = match Emitter::new(&model, &identity).emit_all() {
        Ok(artifacts) => artifacts,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    };

    for (format, text) in artifacts {
        let path = with_extension_appended(&args.output, format.extension());
        info!("Writing {} to: {}", format.name(), path.display());
        if let Err(code) = write_or_exit(&path, &text) {
            return code;
        }
    }

    if let Some(json_path) = args.json {
        let json = match model.to_json_string() {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize register map: {}", e);
                return ExitCode::from(EXIT_RUNTIME_ERROR);
            }
        };
        info!("Writing JSON to: {}", json_path.display());
        if let Err(code) = write_or_exit(&json_path, &json) {
            return code;
        }
    }

    ExitCode::from(EXIT_PASS)
}

fn run_flatten(args: FlattenArgs) -> ExitCode {
    let mut model = match load_model(&args.input, args.entity_name) {
        Ok(model) => model,
        Err(code) => return code,
    };
    load_identity(&mut model);

    let json = match model.to_json_string() {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize register map: {}", e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    };

    match args.output {
        Some(path) => {
            info!("Writing JSON to: {}", path.display());
            match write_or_exit(&path, &json) {
                Ok(()) => ExitCode::from(EXIT_PASS),
                Err(code) => code,
            }
        }
        None => {
            println!("{}", json);
            ExitCode::from(EXIT_PASS)
        }
    }
}

fn run_verify(args: VerifyArgs) -> ExitCode {
    if verify::verify_files(&args.files) {
        ExitCode::from(EXIT_PASS)
    } else {
        ExitCode::from(EXIT_CHECK_FAIL)
    }
}
