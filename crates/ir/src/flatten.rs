//! Include resolution: turns a tree of register maps into one flat, addressed list.

use crate::alloc::AddressAllocator;
use crate::error::CompileError;
use crate::Register;
use regmap_config::{
    split_config, validate_document, DocumentError, Entry, GlobalConfig, IncludeDirective,
    RegisterEntry,
};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Where included register maps come from.
pub trait SourceLoader {
    /// Reads and decodes the document at `path` without validating it.
    fn load(&self, path: &Path) -> Result<Value, DocumentError>;

    /// Identity of `path` for include-cycle detection.
    fn canonicalize(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }
}

/// Loads register maps from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, path: &Path) -> Result<Value, DocumentError> {
        regmap_config::load_document(path)
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Depth-first flattener for one compile unit.
///
/// Output order is a pre-order walk of the declaration tree: the contents of an include
/// appear contiguously where the include was declared.
pub struct Flattener<'a, L: SourceLoader> {
    config: &'a GlobalConfig,
    loader: &'a L,
    allocator: AddressAllocator,
    include_stack: Vec<PathBuf>,
}

impl<'a, L: SourceLoader> Flattener<'a, L> {
    /// Creates a flattener with a fresh address cursor at 0.
    pub fn new(config: &'a GlobalConfig, loader: &'a L) -> Self {
        Self {
            config,
            loader,
            allocator: AddressAllocator::new(config.word_bytes()),
            include_stack: Vec::new(),
        }
    }

    /// Marks `path` as the file being flattened, so including it again is a cycle.
    pub fn with_root(mut self, path: &Path) -> Self {
        self.include_stack.push(self.loader.canonicalize(path));
        self
    }

    /// Flattens the top-level entries (its `config` entry already removed).
    ///
    /// Includes resolve relative to `base_dir`.
    pub fn flatten(
        mut self,
        entries: Vec<Entry>,
        base_dir: &Path,
    ) -> Result<Vec<Register>, CompileError> {
        let mut out = Vec::new();
        self.flatten_level(entries, base_dir, None, 0, &mut out)?;
        Ok(out)
    }

    fn flatten_level(
        &mut self,
        entries: Vec<Entry>,
        dir: &Path,
        instance: Option<&str>,
        base: u64,
        out: &mut Vec<Register>,
    ) -> Result<(), CompileError> {
        for entry in entries {
            match entry {
                Entry::Include(include) => self.include(include, dir, instance, base, out)?,
                Entry::Register(reg) => {
                    let placed = self.place(reg, instance, base)?;
                    out.push(placed);
                }
                // Nested config entries are checked when the include is loaded.
                Entry::Config(_) => {}
            }
        }
        Ok(())
    }

    fn place(
        &mut self,
        reg: RegisterEntry,
        instance: Option<&str>,
        base: u64,
    ) -> Result<Register, CompileError> {
        let name = self.full_name(&reg.name, instance);
        let addr_offset = self
            .allocator
            .take_next(reg.addr_offset, base)
            .map_err(|_| CompileError::AddressOverflow { name: name.clone() })?;
        tracing::debug!("Placed register {} at {:#x}", name, addr_offset);
        Ok(Register {
            name,
            description: reg.description,
            reg_type: reg.reg_type,
            use_upd_pulse: reg.use_upd_pulse,
            addr_offset,
            bits: reg.bits,
        })
    }

    fn include(
        &mut self,
        include: IncludeDirective,
        dir: &Path,
        instance: Option<&str>,
        base: u64,
        out: &mut Vec<Register>,
    ) -> Result<(), CompileError> {
        let path = dir.join(&include.file);
        let identity = self.loader.canonicalize(&path);
        if self.include_stack.contains(&identity) {
            let mut chain = self.include_stack.clone();
            chain.push(identity);
            return Err(CompileError::CyclicInclude { chain });
        }

        let doc = self.loader.load(&path)?;
        let entries = validate_document(&doc).map_err(|source| CompileError::Schema {
            origin: path.display().to_string(),
            source,
        })?;
        let (nested_config, entries) = split_config(entries);
        if let Some(nested) = nested_config {
            if nested.data_size != self.config.data_size {
                return Err(CompileError::ConfigMismatch {
                    file: path,
                    expected: self.config.data_size,
                    found: nested.data_size,
                });
            }
        }

        let sub_instance = self.full_name(&include.name, instance);
        let sub_base = self
            .allocator
            .set_next(include.addr_offset, base)
            .and_then(|()| self.allocator.peek())
            .map_err(|_| CompileError::AddressOverflow {
                name: sub_instance.clone(),
            })?;
        tracing::debug!(
            "Including {} as {} at {:#x}",
            path.display(),
            sub_instance,
            sub_base
        );

        let sub_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        self.include_stack.push(identity);
        self.flatten_level(entries, &sub_dir, Some(&sub_instance), sub_base, out)?;
        self.include_stack.pop();
        Ok(())
    }

    fn full_name(&self, name: &str, instance: Option<&str>) -> String {
        match instance {
            Some(prefix) => format!("{}{}{}", prefix, self.config.instance_separator, name),
            None => name.to_string(),
        }
    }
}
