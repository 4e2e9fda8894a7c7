//! RegMap Intermediate Representation (IR)
//!
//! This crate turns validated register map documents into the single model every output
//! format is rendered from. It owns:
//!
//! 1. **Flattening**: resolving nested includes into one ordered register list, with
//!    namespaced names and composed base addresses.
//! 2. **Address allocation**: one bus word per register, auto-assigned unless forced.
//! 3. **Invariant checks**: register width, duplicate addresses and duplicate names.
//! 4. **Round-trip JSON**: writing a compiled model back out as a flat register map.

#![warn(missing_docs)]

use regmap_config::{
    addr_bits_from_data, split_config, validate_document, BitsError, BitsSpec, GlobalConfig,
    RegType,
};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

pub mod alloc;
pub mod checks;
pub mod error;
pub mod flatten;

pub use error::{AddressCollision, CompileError};
pub use flatten::{Flattener, FsLoader, SourceLoader};

/// A fully resolved register: final name, final address.
///
/// Serializes to the same shape as a register entry in an input document, so a flattened
/// list can be compiled again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Register {
    /// Name with every enclosing instance prefix joined in.
    pub name: String,

    /// Optional free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Direction of the register's fabric ports.
    pub reg_type: RegType,

    /// Whether an update strobe output is generated.
    pub use_upd_pulse: bool,

    /// Absolute byte address on the bus.
    pub addr_offset: u64,

    /// Bit layout and reset value.
    pub bits: BitsSpec,
}

/// Position of one named field inside its register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    /// The field's name.
    pub name: String,
    /// Offset of the field's least significant bit.
    pub offset: u64,
    /// Width in bits.
    pub num_bits: u32,
    /// Reset value of the field alone.
    pub default_value: u64,
    /// Free-form description, possibly empty.
    pub description: String,
}

impl Register {
    /// Total number of bits the register uses.
    pub fn count_bits(&self) -> u64 {
        self.bits.count_bits()
    }

    /// Reset value as a string of binary digits, MSB first.
    pub fn default_bit_string(&self) -> String {
        self.bits.default_bit_string()
    }

    /// Offsets of the named fields, in declaration order. Empty for unstructured registers.
    pub fn field_layout(&self) -> Result<Vec<FieldLayout>, BitsError> {
        self.bits
            .fields()
            .iter()
            .map(|f| {
                Ok(FieldLayout {
                    name: f.field_name.clone(),
                    offset: self.bits.get_offset(&f.field_name)?,
                    num_bits: f.num_bits,
                    default_value: f.default_value,
                    description: f.description.clone(),
                })
            })
            .collect()
    }
}

/// Provenance of a generated artifact.
///
/// Supplied by the caller so compilation and rendering stay deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Generating user; `None` when it could not be determined.
    pub username: Option<String>,
    /// Generating host.
    pub hostname: String,
    /// UTC timestamp, already formatted.
    pub timestamp: String,
    /// Version of the generator.
    pub version: String,
}

impl Identity {
    /// Identity stamped with this crate's version.
    pub fn new(
        username: Option<String>,
        hostname: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            username,
            hostname: hostname.into(),
            timestamp: timestamp.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// User name for display, `unknown` when absent.
    pub fn username_or_unknown(&self) -> &str {
        self.username.as_deref().unwrap_or("unknown")
    }
}

/// Load-time overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Replaces `config.entity_name` when set.
    pub entity_name: Option<String>,
}

/// The finalized register file: the outermost config plus the flat register list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledModel {
    /// Configuration of the top-level document.
    pub config: GlobalConfig,
    /// Registers in pre-order of the declaration tree.
    pub registers: Vec<Register>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum DocumentEntry<'a> {
    Config { config: &'a GlobalConfig },
    Register(&'a Register),
}

impl CompiledModel {
    /// Bytes per bus word, the width of the write strobe.
    pub fn strobe_size(&self) -> u32 {
        self.config.data_size / 8
    }

    /// Low address bits that select a byte within one bus word.
    pub fn addr_bits(&self) -> u32 {
        addr_bits_from_data(self.config.data_size)
    }

    /// Width of the bus address needed to reach the highest register.
    ///
    /// Never narrower than `addr_bits() + 1`.
    pub fn address_width(&self) -> u32 {
        let highest = self
            .registers
            .iter()
            .map(|r| r.addr_offset)
            .max()
            .unwrap_or(0);
        let needed = u64::BITS - highest.leading_zeros();
        needed.max(self.addr_bits() + 1)
    }

    /// Turns `include_username` off when `identity` has no user.
    ///
    /// Applied before rendering and before writing the model back out, so both agree.
    pub fn adopt_identity(&mut self, identity: &Identity) {
        if identity.username.is_none() && self.config.include_username {
            tracing::warn!("No user name available, disabling include_username");
            self.config.include_username = false;
        }
    }

    /// The model as a register map document: the config entry first, then every register
    /// with its resolved address.
    pub fn to_json_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self.document_entries())
    }

    /// [`Self::to_json_value`] as text, pretty-printed with four-space indentation and keys
    /// in declaration order.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.document_entries().serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn document_entries(&self) -> Vec<DocumentEntry<'_>> {
        std::iter::once(DocumentEntry::Config {
            config: &self.config,
        })
        .chain(self.registers.iter().map(DocumentEntry::Register))
        .collect()
    }
}

/// Compiles a register map file, resolving includes from the filesystem.
pub fn compile_file(path: &Path, options: &CompileOptions) -> Result<CompiledModel, CompileError> {
    compile_with_loader(&FsLoader, path, options)
}

/// Compiles the file at `path`, reading it and its includes through `loader`.
pub fn compile_with_loader<L: SourceLoader>(
    loader: &L,
    path: &Path,
    options: &CompileOptions,
) -> Result<CompiledModel, CompileError> {
    tracing::info!("Compiling register map {}", path.display());
    let doc = loader.load(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    compile_value(
        &doc,
        &path.display().to_string(),
        base_dir,
        Some(path),
        loader,
        options,
    )
}

/// Compiles an already decoded document. Includes resolve against `base_dir`.
pub fn compile_document(
    doc: &Value,
    base_dir: &Path,
    options: &CompileOptions,
) -> Result<CompiledModel, CompileError> {
    compile_value(doc, "<input>", base_dir, None, &FsLoader, options)
}

fn compile_value<L: SourceLoader>(
    doc: &Value,
    origin: &str,
    base_dir: &Path,
    root: Option<&Path>,
    loader: &L,
    options: &CompileOptions,
) -> Result<CompiledModel, CompileError> {
    let schema_error = |source| CompileError::Schema {
        origin: origin.to_string(),
        source,
    };

    let entries = validate_document(doc).map_err(schema_error)?;
    let (config, entries) = split_config(entries);
    let mut config = config.ok_or_else(|| CompileError::MissingConfig {
        origin: origin.to_string(),
    })?;
    if let Some(name) = &options.entity_name {
        config.override_entity_name(name).map_err(schema_error)?;
    }

    let mut flattener = Flattener::new(&config, loader);
    if let Some(path) = root {
        flattener = flattener.with_root(path);
    }
    let registers = flattener.flatten(entries, base_dir)?;
    checks::check_invariants(&registers, config.data_size)?;

    tracing::info!(
        "Compiled {} registers into '{}' ({}-bit bus)",
        registers.len(),
        config.entity_name,
        config.data_size
    );
    Ok(CompiledModel { config, registers })
}
