use anyhow::{Context, Result};
use regmap_ir::{CompiledModel, Identity};

pub mod code_writer;
pub mod digest;
pub mod markdown;
pub mod verilog;
pub mod vhdl;

pub use digest::{append_digest, verify_digest, verify_file, DigestStatus};
pub use markdown::MarkdownGenerator;
pub use verilog::VerilogGenerator;
pub use vhdl::VhdlGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Vhdl,
    Verilog,
    Markdown,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [
        OutputFormat::Vhdl,
        OutputFormat::Verilog,
        OutputFormat::Markdown,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Vhdl => "vhd",
            OutputFormat::Verilog => "v",
            OutputFormat::Markdown => "md",
        }
    }

    /// Opening and closing delimiters of a single-line comment.
    pub fn comment_delimiters(&self) -> (&'static str, &'static str) {
        match self {
            OutputFormat::Vhdl => ("-- ", ""),
            OutputFormat::Verilog => ("// ", ""),
            OutputFormat::Markdown => ("<!-- ", " -->"),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Vhdl => "VHDL",
            OutputFormat::Verilog => "Verilog",
            OutputFormat::Markdown => "Documentation",
        }
    }
}

/// Everything a renderer may read: the compiled model and who generated it.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub model: &'a CompiledModel,
    pub identity: &'a Identity,
}

impl<'a> RenderContext<'a> {
    pub fn new(model: &'a CompiledModel, identity: &'a Identity) -> Self {
        Self { model, identity }
    }

    /// User and host are only shown when configured and the user is known.
    pub fn show_username(&self) -> bool {
        self.model.config.include_username && self.identity.username.is_some()
    }

    pub fn show_timestamp(&self) -> bool {
        self.model.config.include_timestamp
    }

    /// Provenance lines shared by every artifact header.
    pub fn provenance(&self) -> Vec<String> {
        let mut lines = vec![format!("Generated by regmap {}", self.identity.version)];
        if self.show_username() {
            lines.push(format!(
                "User: {}@{}",
                self.identity.username_or_unknown(),
                self.identity.hostname
            ));
        }
        if self.show_timestamp() {
            lines.push(format!("Date: {}", self.identity.timestamp));
        }
        lines
    }
}

/// Turns a compiled model into the text of one artifact, without its digest trailer.
pub trait Renderer {
    fn format(&self) -> OutputFormat;
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String>;
}

pub fn renderer_for(format: OutputFormat) -> Box<dyn Renderer> {
    match format {
        OutputFormat::Vhdl => Box::new(VhdlGenerator),
        OutputFormat::Verilog => Box::new(VerilogGenerator),
        OutputFormat::Markdown => Box::new(MarkdownGenerator),
    }
}

/// Renders artifacts and stamps them with their SHA-256 trailer.
pub struct Emitter<'a> {
    ctx: RenderContext<'a>,
}

impl<'a> Emitter<'a> {
    pub fn new(model: &'a CompiledModel, identity: &'a Identity) -> Self {
        Self {
            ctx: RenderContext::new(model, identity),
        }
    }

    pub fn emit(&self, format: OutputFormat) -> Result<String> {
        self.emit_with(renderer_for(format).as_ref())
    }

    pub fn emit_with(&self, renderer: &dyn Renderer) -> Result<String> {
        let format = renderer.format();
        let body = renderer
            .render(&self.ctx)
            .with_context(|| format!("Failed to render {}", format.name()))?;
        tracing::debug!("Rendered {} ({} bytes)", format.name(), body.len());
        Ok(append_digest(&body, format))
    }

    /// All built-in formats, in [`OutputFormat::ALL`] order.
    pub fn emit_all(&self) -> Result<Vec<(OutputFormat, String)>> {
        OutputFormat::ALL
            .iter()
            .map(|f| Ok((*f, self.emit(*f)?)))
            .collect()
    }
}

/// Signal name of a register's fabric port, e.g. `R_Scratch_O`.
pub(crate) fn port_name(reg_name: &str, suffix: &str) -> String {
    format!("R_{}_{}", reg_name, suffix)
}

/// Hex rendering of a binary digit string of any length.
pub(crate) fn bits_to_hex(bits: &str) -> String {
    if bits.is_empty() {
        return "0".to_string();
    }
    let pad = (4 - bits.len() % 4) % 4;
    let padded: String = "0".repeat(pad) + bits;
    padded
        .as_bytes()
        .chunks(4)
        .map(|nibble| {
            let v = nibble
                .iter()
                .fold(0u32, |acc, b| (acc << 1) | u32::from(*b == b'1'));
            std::char::from_digit(v, 16).unwrap_or('0').to_ascii_uppercase()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use regmap_config::{BitsSpec, GlobalConfig, RegType};
    use regmap_ir::Register;

    pub(crate) fn sample_model() -> CompiledModel {
        CompiledModel {
            config: GlobalConfig::new(32),
            registers: vec![
                Register {
                    name: "Status".to_string(),
                    description: Some("Fabric status".to_string()),
                    reg_type: RegType::Ro,
                    use_upd_pulse: false,
                    addr_offset: 0,
                    bits: BitsSpec::Width(8),
                },
                Register {
                    name: "Scratch".to_string(),
                    description: None,
                    reg_type: RegType::Rw,
                    use_upd_pulse: true,
                    addr_offset: 4,
                    bits: BitsSpec::Single {
                        num_bits: 32,
                        default_value: 0x1234_5678,
                    },
                },
            ],
        }
    }

    pub(crate) fn sample_identity() -> Identity {
        Identity::new(
            Some("builder".to_string()),
            "buildhost",
            "2026-01-02 03:04:05 UTC",
        )
    }

    #[test]
    fn test_bits_to_hex() {
        assert_eq!(bits_to_hex("11"), "3");
        assert_eq!(bits_to_hex("111111111100"), "FFC");
        assert_eq!(bits_to_hex("00010010001101000101011001111000"), "12345678");
        assert_eq!(bits_to_hex(""), "0");
    }

    #[test]
    fn test_every_format_gets_a_valid_trailer() {
        let model = sample_model();
        let identity = sample_identity();
        let emitter = Emitter::new(&model, &identity);
        for (format, text) in emitter.emit_all().unwrap() {
            assert!(verify_digest(&text).is_valid(), "{:?}", format);
            let last = text.rsplit('\n').next().unwrap();
            assert!(last.starts_with(format.comment_delimiters().0));
        }
    }

    #[test]
    fn test_provenance_respects_flags() {
        let mut model = sample_model();
        let identity = sample_identity();
        let ctx = RenderContext::new(&model, &identity);
        assert_eq!(ctx.provenance().len(), 3);

        model.config.include_timestamp = false;
        let ctx = RenderContext::new(&model, &identity);
        assert!(!ctx.provenance().iter().any(|l| l.contains("2026")));

        let anonymous = Identity::new(None, "buildhost", "now");
        let ctx = RenderContext::new(&model, &anonymous);
        assert!(!ctx.show_username());
        assert_eq!(ctx.provenance().len(), 1);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let model = sample_model();
        let identity = sample_identity();
        let a = Emitter::new(&model, &identity).emit_all().unwrap();
        let b = Emitter::new(&model.clone(), &identity).emit_all().unwrap();
        assert_eq!(a, b);
    }
}
