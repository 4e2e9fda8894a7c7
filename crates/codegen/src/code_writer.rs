use std::fmt::{self, Write};
use thiserror::Error;

/// Indentation-aware text sink used by the built-in renderers.
pub struct CodeWriter {
    out: String,
    indent_level: u32,
}

impl CodeWriter {
    pub fn new() -> CodeWriter {
        CodeWriter {
            out: String::new(),
            indent_level: 0,
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn unindent(&mut self) -> Result<(), Error> {
        if self.indent_level == 0 {
            return Err(Error::IndentUnderflow);
        }
        self.indent_level -= 1;
        Ok(())
    }

    fn append_indent(&mut self) -> Result<(), Error> {
        for _ in 0..self.indent_level {
            self.out.write_str("    ")?;
        }
        Ok(())
    }

    pub fn append_newline(&mut self) -> Result<(), Error> {
        self.out.write_char('\n')?;
        Ok(())
    }

    pub fn append_line(&mut self, s: &str) -> Result<(), Error> {
        if !s.is_empty() {
            self.append_indent()?;
            self.out.write_str(s)?;
        }
        self.append_newline()
    }

    /// Finishes the text. The final newline is dropped; the digest trailer supplies it.
    pub fn finish(mut self) -> Result<String, Error> {
        if self.indent_level != 0 {
            return Err(Error::UnbalancedIndent(self.indent_level));
        }
        if self.out.ends_with('\n') {
            self.out.pop();
        }
        Ok(self.out)
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("unindent below column zero")]
    IndentUnderflow,
    #[error("output finished at indent level {0}")]
    UnbalancedIndent(u32),
    #[error(transparent)]
    Fmt(#[from] fmt::Error),
}
