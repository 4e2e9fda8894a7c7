//! Failure modes of a compilation.

use regmap_config::{DocumentError, SchemaError};
use std::path::PathBuf;
use thiserror::Error;

/// Registers sharing one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCollision {
    /// The contested address.
    pub address: u64,
    /// Every register placed at `address`, in declaration order.
    pub names: Vec<String>,
}

/// Everything that can abort a compilation.
///
/// Collision variants carry every offender, not just the first, so the input can be fixed
/// in one pass.
#[derive(Debug, Error)]
pub enum CompileError {
    /// An entry did not match the schema.
    #[error("Schema error in {origin}: {source}")]
    Schema {
        /// File (or `<input>`) the entry came from.
        origin: String,
        /// What was wrong with the entry.
        #[source]
        source: SchemaError,
    },

    /// The top-level document has no `config` entry.
    #[error("Could not find configuration in {origin}")]
    MissingConfig {
        /// File (or `<input>`) that lacks the entry.
        origin: String,
    },

    /// A nested document declares a different bus width.
    #[error(
        "Included file {} declares data_size {found}, expected {expected}",
        .file.display()
    )]
    ConfigMismatch {
        /// The offending include.
        file: PathBuf,
        /// Top-level `data_size`.
        expected: u32,
        /// `data_size` found in the include.
        found: u32,
    },

    /// The input or one of its includes does not exist.
    #[error("File does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    /// An include could not be decoded.
    #[error(transparent)]
    Parse(DocumentError),

    /// An include could not be read.
    #[error(transparent)]
    Io(DocumentError),

    /// A file includes itself, directly or through other files.
    #[error("Cyclic include: {}", format_chain(.chain))]
    CyclicInclude {
        /// Include chain, ending with the file that closes the cycle.
        chain: Vec<PathBuf>,
    },

    /// Two or more registers resolve to the same address.
    #[error(
        "Multiple registers have the same address (addresses: {addresses:?}): {}",
        format_collisions(.collisions)
    )]
    DuplicateAddress {
        /// Sorted distinct colliding addresses.
        addresses: Vec<u64>,
        /// Registers at each colliding address.
        collisions: Vec<AddressCollision>,
    },

    /// Two or more registers resolve to the same flattened name.
    #[error("Multiple registers have the same name (names: {names:?})")]
    DuplicateName {
        /// Sorted distinct colliding names.
        names: Vec<String>,
    },

    /// A register or include base lies beyond the 64-bit address space.
    #[error("Address overflows the 64-bit address space (name: {name})")]
    AddressOverflow {
        /// Flattened name of the register or include instance.
        name: String,
    },

    /// A register needs more bits than the bus carries.
    #[error("Register contains too many bits (name: {name}, bits: {bits} > {limit})")]
    RegisterTooWide {
        /// Flattened register name.
        name: String,
        /// Bits the register needs.
        bits: u64,
        /// Configured `data_size`.
        limit: u32,
    },
}

impl From<DocumentError> for CompileError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotFound(path) => CompileError::FileNotFound(path),
            DocumentError::Io { .. } => CompileError::Io(err),
            DocumentError::Json { .. } | DocumentError::Yaml { .. } => CompileError::Parse(err),
        }
    }
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn format_collisions(collisions: &[AddressCollision]) -> String {
    collisions
        .iter()
        .map(|c| format!("{} => [{}]", c.address, c.names.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}
