// RegMap - AXI4-Lite Register File Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod bits;
pub mod literal;

pub use bits::{addr_bits_from_data, BitsError, BitsSpec, FieldSpec};
pub use literal::{json_type_name, parse_literal, LiteralError};

pub const DEFAULT_ENTITY_NAME: &str = "reg_file";
pub const DEFAULT_INSTANCE_SEPARATOR: &str = "_";

fn default_entity_name() -> String {
    DEFAULT_ENTITY_NAME.to_string()
}

fn default_instance_separator() -> String {
    DEFAULT_INSTANCE_SEPARATOR.to_string()
}

/// Bus-wide settings. Exactly one per compile unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalConfig {
    pub data_size: u32,
    pub entity_name: String,
    pub instance_separator: String,
    pub include_username: bool,
    pub include_timestamp: bool,
}

impl GlobalConfig {
    pub fn new(data_size: u32) -> Self {
        Self {
            data_size,
            entity_name: default_entity_name(),
            instance_separator: default_instance_separator(),
            include_username: true,
            include_timestamp: true,
        }
    }

    /// Bytes per bus word; also the address stride between registers.
    pub fn word_bytes(&self) -> u64 {
        u64::from(self.data_size / 8)
    }

    /// Replaces the entity name, applying the same rules as the `entity_name` key.
    pub fn override_entity_name(&mut self, name: &str) -> Result<(), SchemaError> {
        if name.is_empty() {
            return Err(SchemaError::at_field(
                None,
                "config.entity_name",
                SchemaErrorKind::EmptyString("entity_name"),
            ));
        }
        tracing::debug!("Overriding entity name '{}' -> '{}'", self.entity_name, name);
        self.entity_name = name.to_string();
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegType {
    /// Written by the bus, driven out to the fabric.
    Rw,
    /// Driven by the fabric, read by the bus.
    #[default]
    Ro,
    /// Bus writes go out, bus reads come in from a separate fabric input.
    Custom,
}

impl RegType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegType::Rw => "rw",
            RegType::Ro => "ro",
            RegType::Custom => "custom",
        }
    }

    /// Whether the register drives an output port.
    pub fn has_output(&self) -> bool {
        matches!(self, RegType::Rw | RegType::Custom)
    }

    /// Whether the register samples an input port.
    pub fn has_input(&self) -> bool {
        matches!(self, RegType::Ro | RegType::Custom)
    }
}

impl fmt::Display for RegType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub reg_type: RegType,
    pub use_upd_pulse: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addr_offset: Option<u64>,
    pub bits: BitsSpec,
}

/// A reference to a nested register map, instantiated under `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeDirective {
    pub name: String,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addr_offset: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Config(GlobalConfig),
    Register(RegisterEntry),
    Include(IncludeDirective),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaErrorKind {
    #[error("document must be an array of entries, found {0}")]
    NotAnArray(&'static str),
    #[error("entry is neither a config block, a register nor an include directive")]
    UnknownShape,
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("expected {expected}, found {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    #[error(transparent)]
    Literal(#[from] LiteralError),
    #[error("value must be a positive integer, found {0}")]
    NotPositive(u64),
    #[error("value {0} is out of range")]
    OutOfRange(u64),
    #[error("data_size must be a positive multiple of 8, found {0}")]
    InvalidDataSize(u64),
    #[error("reg_type must be one of rw, ro, custom, found '{0}'")]
    InvalidRegType(String),
    #[error("default value {value:#x} does not fit in {num_bits} bits")]
    DefaultOutOfRange { value: u64, num_bits: u32 },
    #[error("field list must contain at least one field")]
    EmptyFieldList,
    #[error("`{0}` must not be empty")]
    EmptyString(&'static str),
    #[error("more than one config entry")]
    DuplicateConfig,
}

/// A register map entry that does not match any accepted shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    /// Index of the offending entry in its document, if the error is entry-specific.
    pub entry: Option<usize>,
    /// Dotted path of the offending key within the entry.
    pub field: Option<String>,
    pub kind: SchemaErrorKind,
}

impl SchemaError {
    pub fn document(kind: SchemaErrorKind) -> Self {
        Self {
            entry: None,
            field: None,
            kind,
        }
    }

    pub fn at_entry(entry: usize, kind: SchemaErrorKind) -> Self {
        Self {
            entry: Some(entry),
            field: None,
            kind,
        }
    }

    pub fn at_field(entry: Option<usize>, field: impl Into<String>, kind: SchemaErrorKind) -> Self {
        Self {
            entry,
            field: Some(field.into()),
            kind,
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.entry, &self.field) {
            (Some(entry), Some(field)) => write!(f, "entry {} (`{}`): {}", entry, field, self.kind),
            (Some(entry), None) => write!(f, "entry {}: {}", entry, self.kind),
            (None, Some(field)) => write!(f, "`{}`: {}", field, self.kind),
            (None, None) => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Tracks which keys of a JSON object were consumed so leftovers can be rejected.
struct ObjectReader<'a> {
    map: &'a Map<String, Value>,
    entry: usize,
    prefix: String,
    known: Vec<&'static str>,
}

impl<'a> ObjectReader<'a> {
    fn new(map: &'a Map<String, Value>, entry: usize, prefix: impl Into<String>) -> Self {
        Self {
            map,
            entry,
            prefix: prefix.into(),
            known: Vec::new(),
        }
    }

    fn path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }

    fn error(&self, key: &str, kind: SchemaErrorKind) -> SchemaError {
        SchemaError::at_field(Some(self.entry), self.path(key), kind)
    }

    fn optional(&mut self, key: &'static str) -> Option<&'a Value> {
        self.known.push(key);
        self.map.get(key)
    }

    fn required(&mut self, key: &'static str) -> Result<&'a Value, SchemaError> {
        self.optional(key).ok_or_else(|| {
            if self.prefix.is_empty() {
                SchemaError::at_entry(self.entry, SchemaErrorKind::MissingField(key))
            } else {
                SchemaError::at_field(
                    Some(self.entry),
                    self.prefix.clone(),
                    SchemaErrorKind::MissingField(key),
                )
            }
        })
    }

    fn string(&mut self, key: &'static str) -> Result<String, SchemaError> {
        let value = self.required(key)?;
        self.as_string(key, value)
    }

    fn optional_string(&mut self, key: &'static str) -> Result<Option<String>, SchemaError> {
        match self.optional(key) {
            Some(value) => self.as_string(key, value).map(Some),
            None => Ok(None),
        }
    }

    fn as_string(&self, key: &str, value: &Value) -> Result<String, SchemaError> {
        value.as_str().map(str::to_string).ok_or_else(|| {
            self.error(
                key,
                SchemaErrorKind::WrongType {
                    expected: "string",
                    found: json_type_name(value),
                },
            )
        })
    }

    fn bool_or(&mut self, key: &'static str, default: bool) -> Result<bool, SchemaError> {
        match self.optional(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(self.error(
                key,
                SchemaErrorKind::WrongType {
                    expected: "boolean",
                    found: json_type_name(other),
                },
            )),
        }
    }

    fn literal(&mut self, key: &'static str) -> Result<Option<u64>, SchemaError> {
        match self.optional(key) {
            None => Ok(None),
            Some(value) => parse_literal(value)
                .map(Some)
                .map_err(|e| self.error(key, e.into())),
        }
    }

    fn positive_u32(&mut self, key: &'static str) -> Result<u32, SchemaError> {
        let value = self.required(key)?;
        let n = value.as_u64().ok_or_else(|| {
            self.error(
                key,
                SchemaErrorKind::WrongType {
                    expected: "positive integer",
                    found: json_type_name(value),
                },
            )
        })?;
        if n == 0 {
            return Err(self.error(key, SchemaErrorKind::NotPositive(n)));
        }
        u32::try_from(n).map_err(|_| self.error(key, SchemaErrorKind::OutOfRange(n)))
    }

    fn finish(self) -> Result<(), SchemaError> {
        for key in self.map.keys() {
            if !self.known.contains(&key.as_str()) {
                return Err(self.error(key, SchemaErrorKind::UnknownField(key.clone())));
            }
        }
        Ok(())
    }
}

/// Validates a whole register map document (a JSON array of entries).
///
/// Defaults are applied and string literals normalized. At most one `config` entry may
/// appear; whether one is required is decided by the caller.
pub fn validate_document(doc: &Value) -> Result<Vec<Entry>, SchemaError> {
    let items = doc.as_array().ok_or_else(|| {
        SchemaError::document(SchemaErrorKind::NotAnArray(json_type_name(doc)))
    })?;

    let mut entries = Vec::with_capacity(items.len());
    let mut seen_config = false;
    for (index, item) in items.iter().enumerate() {
        let entry = validate_entry(index, item)?;
        if matches!(entry, Entry::Config(_)) {
            if seen_config {
                return Err(SchemaError::at_entry(index, SchemaErrorKind::DuplicateConfig));
            }
            seen_config = true;
        }
        entries.push(entry);
    }
    Ok(entries)
}

/// Validates one entry against the config, include and register shapes.
pub fn validate_entry(index: usize, value: &Value) -> Result<Entry, SchemaError> {
    let Some(map) = value.as_object() else {
        return Err(SchemaError::at_entry(index, SchemaErrorKind::UnknownShape));
    };

    if map.contains_key("config") {
        let mut reader = ObjectReader::new(map, index, "");
        let config = reader.required("config")?;
        reader.finish()?;
        validate_config(index, config).map(Entry::Config)
    } else if map.contains_key("file") {
        validate_include(index, map).map(Entry::Include)
    } else if map.contains_key("name") || map.contains_key("bits") {
        validate_register(index, map).map(Entry::Register)
    } else {
        Err(SchemaError::at_entry(index, SchemaErrorKind::UnknownShape))
    }
}

fn validate_config(index: usize, value: &Value) -> Result<GlobalConfig, SchemaError> {
    let map = value.as_object().ok_or_else(|| {
        SchemaError::at_field(
            Some(index),
            "config",
            SchemaErrorKind::WrongType {
                expected: "object",
                found: json_type_name(value),
            },
        )
    })?;
    let mut r = ObjectReader::new(map, index, "config");

    let data_size = r.positive_u32("data_size")?;
    if data_size % 8 != 0 {
        return Err(r.error(
            "data_size",
            SchemaErrorKind::InvalidDataSize(u64::from(data_size)),
        ));
    }

    let entity_name = r
        .optional_string("entity_name")?
        .unwrap_or_else(default_entity_name);
    if entity_name.is_empty() {
        return Err(r.error("entity_name", SchemaErrorKind::EmptyString("entity_name")));
    }

    let config = GlobalConfig {
        data_size,
        entity_name,
        instance_separator: r
            .optional_string("instance_separator")?
            .unwrap_or_else(default_instance_separator),
        include_username: r.bool_or("include_username", true)?,
        include_timestamp: r.bool_or("include_timestamp", true)?,
    };
    r.finish()?;
    Ok(config)
}

fn validate_include(index: usize, map: &Map<String, Value>) -> Result<IncludeDirective, SchemaError> {
    let mut r = ObjectReader::new(map, index, "");
    let include = IncludeDirective {
        name: r.string("name")?,
        file: r.string("file")?,
        addr_offset: r.literal("addr_offset")?,
    };
    r.finish()?;
    Ok(include)
}

fn validate_register(index: usize, map: &Map<String, Value>) -> Result<RegisterEntry, SchemaError> {
    let mut r = ObjectReader::new(map, index, "");
    let name = r.string("name")?;
    let description = r.optional_string("description")?;

    let reg_type = match r.optional_string("reg_type")?.as_deref() {
        None | Some("ro") => RegType::Ro,
        Some("rw") => RegType::Rw,
        Some("custom") => RegType::Custom,
        Some(other) => {
            return Err(r.error("reg_type", SchemaErrorKind::InvalidRegType(other.to_string())))
        }
    };

    let use_upd_pulse = r.bool_or("use_upd_pulse", false)?;
    let addr_offset = r.literal("addr_offset")?;
    let bits = validate_bits(index, r.required("bits")?)?;
    r.finish()?;

    Ok(RegisterEntry {
        name,
        description,
        reg_type,
        use_upd_pulse,
        addr_offset,
        bits,
    })
}

fn validate_bits(index: usize, value: &Value) -> Result<BitsSpec, SchemaError> {
    match value {
        Value::Number(n) => {
            let width = n.as_u64().ok_or_else(|| {
                SchemaError::at_field(
                    Some(index),
                    "bits",
                    SchemaErrorKind::WrongType {
                        expected: "positive integer",
                        found: json_type_name(value),
                    },
                )
            })?;
            if width == 0 {
                return Err(SchemaError::at_field(
                    Some(index),
                    "bits",
                    SchemaErrorKind::NotPositive(width),
                ));
            }
            let width = u32::try_from(width).map_err(|_| {
                SchemaError::at_field(Some(index), "bits", SchemaErrorKind::OutOfRange(width))
            })?;
            Ok(BitsSpec::Width(width))
        }
        Value::Object(map) => {
            let mut r = ObjectReader::new(map, index, "bits");
            let num_bits = r.positive_u32("num_bits")?;
            let default_value = r.literal("default_value")?.unwrap_or(0);
            check_fits(&r, default_value, num_bits)?;
            r.finish()?;
            Ok(BitsSpec::Single {
                num_bits,
                default_value,
            })
        }
        Value::Array(items) => {
            if items.is_empty() {
                return Err(SchemaError::at_field(
                    Some(index),
                    "bits",
                    SchemaErrorKind::EmptyFieldList,
                ));
            }
            let mut fields = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let prefix = format!("bits[{}]", i);
                let map = item.as_object().ok_or_else(|| {
                    SchemaError::at_field(
                        Some(index),
                        prefix.clone(),
                        SchemaErrorKind::WrongType {
                            expected: "object",
                            found: json_type_name(item),
                        },
                    )
                })?;
                let mut r = ObjectReader::new(map, index, prefix);
                let field_name = r.string("field_name")?;
                let num_bits = r.positive_u32("num_bits")?;
                let default_value = r.literal("default_value")?.unwrap_or(0);
                check_fits(&r, default_value, num_bits)?;
                let description = r.optional_string("description")?.unwrap_or_default();
                r.finish()?;
                fields.push(FieldSpec {
                    field_name,
                    num_bits,
                    default_value,
                    description,
                });
            }
            Ok(BitsSpec::Fields(fields))
        }
        other => Err(SchemaError::at_field(
            Some(index),
            "bits",
            SchemaErrorKind::WrongType {
                expected: "integer, object or array",
                found: json_type_name(other),
            },
        )),
    }
}

fn check_fits(r: &ObjectReader<'_>, value: u64, num_bits: u32) -> Result<(), SchemaError> {
    if num_bits < 64 && value >> num_bits != 0 {
        return Err(r.error(
            "default_value",
            SchemaErrorKind::DefaultOutOfRange { value, num_bits },
        ));
    }
    Ok(())
}

/// Separates the `config` entry (if any) from the remaining entries, keeping their order.
pub fn split_config(entries: Vec<Entry>) -> (Option<GlobalConfig>, Vec<Entry>) {
    let mut config = None;
    let mut rest = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Entry::Config(c) if config.is_none() => config = Some(c),
            other => rest.push(other),
        }
    }
    (config, rest)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// YAML for `.yaml`/`.yml`, JSON for everything else.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("File does not exist: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to parse YAML in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Reads a register map file into its raw JSON value, without validating it.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Value, DocumentError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DocumentError::NotFound(path.to_path_buf())
        } else {
            DocumentError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    parse_document(&content, DocumentFormat::from_path(path), path)
}

/// Parses register map text; `origin` is only used in error messages.
pub fn parse_document(
    content: &str,
    format: DocumentFormat,
    origin: &Path,
) -> Result<Value, DocumentError> {
    match format {
        DocumentFormat::Json => serde_json::from_str(content).map_err(|e| DocumentError::Json {
            path: origin.to_path_buf(),
            source: e,
        }),
        DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(|e| DocumentError::Yaml {
            path: origin.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn register(value: Value) -> RegisterEntry {
        match validate_entry(0, &value).unwrap() {
            Entry::Register(r) => r,
            other => panic!("Expected register, got {:?}", other),
        }
    }

    #[test]
    fn test_config_defaults() {
        let entries = validate_document(&json!([{"config": {"data_size": 32}}])).unwrap();
        let Entry::Config(config) = &entries[0] else {
            panic!("Expected config entry");
        };
        assert_eq!(config, &GlobalConfig::new(32));
        assert_eq!(config.entity_name, "reg_file");
        assert_eq!(config.instance_separator, "_");
        assert!(config.include_username);
        assert!(config.include_timestamp);
    }

    #[test]
    fn test_config_data_size_rules() {
        for bad in [json!(0), json!(12), json!(-8), json!("32")] {
            let err = validate_document(&json!([{"config": {"data_size": bad}}])).unwrap_err();
            assert_eq!(err.entry, Some(0));
            assert_eq!(err.field.as_deref(), Some("config.data_size"));
        }
        let err = validate_document(&json!([{"config": {}}])).unwrap_err();
        assert_eq!(err.kind, SchemaErrorKind::MissingField("data_size"));
    }

    #[test]
    fn test_register_defaults() {
        let reg = register(json!({"name": "Test_Register", "bits": 32}));
        assert_eq!(reg.reg_type, RegType::Ro);
        assert!(!reg.use_upd_pulse);
        assert_eq!(reg.addr_offset, None);
        assert_eq!(reg.description, None);
        assert_eq!(reg.bits, BitsSpec::Width(32));
    }

    #[test]
    fn test_field_list_normalization() {
        let reg = register(json!({
            "name": "Register_with_Fields",
            "reg_type": "custom",
            "addr_offset": "0x40",
            "bits": [
                {"field_name": "A", "num_bits": 2, "default_value": "0b11"},
                {"field_name": "B", "num_bits": 8, "default_value": "0xFF"},
                {"field_name": "C", "num_bits": 2}
            ]
        }));
        assert_eq!(reg.addr_offset, Some(64));
        let fields = reg.bits.fields();
        assert_eq!(fields[0].default_value, 3);
        assert_eq!(fields[1].default_value, 255);
        assert_eq!(fields[2].default_value, 0);
        assert_eq!(fields[2].description, "");
    }

    #[test]
    fn test_bad_default_values() {
        for bad in [json!("hello"), json!([1]), json!(1.5), json!(null)] {
            let err = validate_entry(
                3,
                &json!({"name": "bad", "bits": {"num_bits": 32, "default_value": bad}}),
            )
            .unwrap_err();
            assert_eq!(err.entry, Some(3));
            assert_eq!(err.field.as_deref(), Some("bits.default_value"));
            assert!(matches!(err.kind, SchemaErrorKind::Literal(_)));
        }

        let ok = register(json!({"name": "ok", "bits": {"num_bits": 32, "default_value": 18}}));
        assert_eq!(
            ok.bits,
            BitsSpec::Single {
                num_bits: 32,
                default_value: 18
            }
        );
    }

    #[test]
    fn test_default_must_fit() {
        let err = validate_entry(
            0,
            &json!({"name": "r", "bits": [{"field_name": "f", "num_bits": 4, "default_value": 16}]}),
        )
        .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("bits[0].default_value"));
        assert_eq!(
            err.kind,
            SchemaErrorKind::DefaultOutOfRange {
                value: 16,
                num_bits: 4
            }
        );
    }

    #[test]
    fn test_include_directive() {
        let entry = validate_entry(
            1,
            &json!({"name": "Heirarchy_One", "file": "sub.json", "addr_offset": 128}),
        )
        .unwrap();
        assert_eq!(
            entry,
            Entry::Include(IncludeDirective {
                name: "Heirarchy_One".to_string(),
                file: "sub.json".to_string(),
                addr_offset: Some(128),
            })
        );
    }

    #[test]
    fn test_unknown_shapes_and_fields() {
        let err = validate_entry(2, &json!({"foo": 1})).unwrap_err();
        assert_eq!(err.kind, SchemaErrorKind::UnknownShape);

        let err = validate_entry(2, &json!(42)).unwrap_err();
        assert_eq!(err.kind, SchemaErrorKind::UnknownShape);

        let err = validate_entry(2, &json!({"name": "r", "bits": 8, "color": "red"})).unwrap_err();
        assert_eq!(err.kind, SchemaErrorKind::UnknownField("color".to_string()));

        let err = validate_entry(2, &json!({"name": "r"})).unwrap_err();
        assert_eq!(err.kind, SchemaErrorKind::MissingField("bits"));

        let err = validate_entry(2, &json!({"name": "r", "bits": 8, "reg_type": "wo"})).unwrap_err();
        assert_eq!(err.kind, SchemaErrorKind::InvalidRegType("wo".to_string()));
    }

    #[test]
    fn test_duplicate_config_rejected() {
        let err = validate_document(&json!([
            {"config": {"data_size": 32}},
            {"config": {"data_size": 32}}
        ]))
        .unwrap_err();
        assert_eq!(err.entry, Some(1));
        assert_eq!(err.kind, SchemaErrorKind::DuplicateConfig);
    }

    #[test]
    fn test_document_must_be_array() {
        let err = validate_document(&json!({"config": {"data_size": 32}})).unwrap_err();
        assert_eq!(err.kind, SchemaErrorKind::NotAnArray("object"));
    }

    #[test]
    fn test_split_config_keeps_order() {
        let entries = validate_document(&json!([
            {"name": "a", "bits": 1},
            {"config": {"data_size": 16}},
            {"name": "b", "bits": 1}
        ]))
        .unwrap();
        let (config, rest) = split_config(entries);
        assert_eq!(config.unwrap().data_size, 16);
        let names: Vec<_> = rest
            .iter()
            .map(|e| match e {
                Entry::Register(r) => r.name.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_entity_name_override() {
        let mut config = GlobalConfig::new(32);
        config.override_entity_name("my_regs").unwrap();
        assert_eq!(config.entity_name, "my_regs");
        assert!(config.override_entity_name("").is_err());
    }

    #[test]
    fn test_error_display_mentions_location() {
        let err = validate_entry(
            5,
            &json!({"name": "r", "bits": {"num_bits": 8, "default_value": "12"}}),
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("entry 5"));
        assert!(msg.contains("bits.default_value"));
        assert!(msg.contains("must start with 0x or 0b"));
    }
}
