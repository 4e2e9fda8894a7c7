//! Register map documentation.

use crate::code_writer::CodeWriter;
use crate::{bits_to_hex, port_name, OutputFormat, RenderContext, Renderer};
use anyhow::Result;
use regmap_ir::Register;

pub struct MarkdownGenerator;

impl Renderer for MarkdownGenerator {
    fn format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<String> {
        let model = ctx.model;
        let digits = (model.address_width() as usize).div_ceil(4);
        let mut w = CodeWriter::new();

        w.append_line(&format!("# {}", model.config.entity_name))?;
        w.append_line("")?;
        for line in ctx.provenance() {
            w.append_line(&format!("{}  ", line))?;
        }
        w.append_line("")?;
        w.append_line("| Property | Value |")?;
        w.append_line("|----------|-------|")?;
        w.append_line(&format!("| Data width | {} bits |", model.config.data_size))?;
        w.append_line(&format!("| Address width | {} bits |", model.address_width()))?;
        w.append_line(&format!("| Write strobe width | {} |", model.strobe_size()))?;
        w.append_line(&format!("| Registers | {} |", model.registers.len()))?;
        w.append_line("")?;

        w.append_line("## Register Map")?;
        w.append_line("")?;
        w.append_line("| Address | Name | Type | Width | Default | Ports | Description |")?;
        w.append_line("|---------|------|------|-------|---------|-------|-------------|")?;
        for reg in &model.registers {
            w.append_line(&format!(
                "| 0x{:0digits$X} | {} | {} | {} | 0x{} | {} | {} |",
                reg.addr_offset,
                reg.name,
                reg.reg_type,
                reg.count_bits(),
                bits_to_hex(&reg.default_bit_string()),
                Self::ports(reg),
                cell(reg.description.as_deref().unwrap_or("")),
                digits = digits
            ))?;
        }

        for reg in model.registers.iter().filter(|r| !r.bits.fields().is_empty()) {
            w.append_line("")?;
            w.append_line(&format!(
                "### {} (0x{:0digits$X})",
                reg.name,
                reg.addr_offset,
                digits = digits
            ))?;
            w.append_line("")?;
            if let Some(description) = &reg.description {
                w.append_line(description)?;
                w.append_line("")?;
            }
            w.append_line("| Bits | Field | Width | Default | Description |")?;
            w.append_line("|------|-------|-------|---------|-------------|")?;
            for field in reg.field_layout()? {
                let hi = field.offset + u64::from(field.num_bits) - 1;
                let bits = if hi == field.offset {
                    format!("[{}]", hi)
                } else {
                    format!("[{}:{}]", hi, field.offset)
                };
                w.append_line(&format!(
                    "| {} | {} | {} | 0x{:X} | {} |",
                    bits,
                    field.name,
                    field.num_bits,
                    field.default_value,
                    cell(&field.description)
                ))?;
            }
        }

        Ok(w.finish()?)
    }
}

impl MarkdownGenerator {
    fn ports(reg: &Register) -> String {
        let mut ports = Vec::new();
        if reg.reg_type.has_output() {
            ports.push(format!("`{}`", port_name(&reg.name, "O")));
            if reg.use_upd_pulse {
                ports.push(format!("`{}`", port_name(&reg.name, "O_upd")));
            }
        }
        if reg.reg_type.has_input() {
            ports.push(format!("`{}`", port_name(&reg.name, "I")));
        }
        ports.join(", ")
    }
}

/// Keeps free text inside one table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{sample_identity, sample_model};
    use regmap_config::{BitsSpec, FieldSpec, RegType};

    #[test]
    fn test_register_table() {
        let model = sample_model();
        let identity = sample_identity();
        let md = MarkdownGenerator
            .render(&RenderContext::new(&model, &identity))
            .unwrap();
        assert!(md.starts_with("# reg_file\n"));
        assert!(md.contains("| 0x0 | Status | ro | 8 | 0x00 | `R_Status_I` | Fabric status |"));
        assert!(md.contains(
            "| 0x4 | Scratch | rw | 32 | 0x12345678 | `R_Scratch_O`, `R_Scratch_O_upd` |  |"
        ));
        assert!(md.contains("User: builder@buildhost"));
    }

    #[test]
    fn test_field_table() {
        let mut model = sample_model();
        model.registers.push(Register {
            name: "Ctrl".to_string(),
            description: None,
            reg_type: RegType::Custom,
            use_upd_pulse: false,
            addr_offset: 8,
            bits: BitsSpec::Fields(vec![
                FieldSpec {
                    field_name: "Mode".to_string(),
                    num_bits: 2,
                    default_value: 3,
                    description: "Operating | mode".to_string(),
                },
                FieldSpec {
                    field_name: "Enable".to_string(),
                    num_bits: 1,
                    default_value: 0,
                    description: String::new(),
                },
            ]),
        });
        let identity = sample_identity();
        let md = MarkdownGenerator
            .render(&RenderContext::new(&model, &identity))
            .unwrap();
        assert!(md.contains("### Ctrl (0x8)"));
        assert!(md.contains("| [2:1] | Mode | 2 | 0x3 | Operating \\| mode |"));
        assert!(md.contains("| [0] | Enable | 1 | 0x0 |  |"));
    }
}
