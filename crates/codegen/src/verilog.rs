//! Verilog-2001 AXI4-Lite slave with the same ports as the VHDL entity.

use crate::code_writer::CodeWriter;
use crate::vhdl::byte_lanes;
use crate::{port_name, OutputFormat, RenderContext, Renderer};
use anyhow::Result;
use regmap_ir::Register;

pub struct VerilogGenerator;

impl Renderer for VerilogGenerator {
    fn format(&self) -> OutputFormat {
        OutputFormat::Verilog
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<String> {
        let model = ctx.model;
        let entity = &model.config.entity_name;
        let mut w = CodeWriter::new();

        for line in ctx.provenance() {
            w.append_line(&format!("// {}", line))?;
        }
        w.append_line(&format!("// AXI4-Lite register file: {}", entity))?;
        w.append_line("")?;
        w.append_line("`timescale 1ns / 1ps")?;
        w.append_line("")?;

        w.append_line(&format!("module {} (", entity))?;
        w.indent();
        let ports = Self::ports(ctx);
        for (i, port) in ports.iter().enumerate() {
            let sep = if i + 1 == ports.len() { "" } else { "," };
            w.append_line(&format!("{}{}", port, sep))?;
        }
        w.unindent()?;
        w.append_line(");")?;
        w.indent();

        for reg in &model.registers {
            Self::declarations(&mut w, reg, model.address_width())?;
        }
        w.append_line("")?;
        w.append_line("reg awready;")?;
        w.append_line("reg wready;")?;
        w.append_line("reg bvalid;")?;
        w.append_line("reg arready;")?;
        w.append_line("reg rvalid;")?;
        w.append_line(&format!("reg [{}:0] rdata;", model.config.data_size - 1))?;
        w.append_line("")?;
        w.append_line("assign regs_awready = awready;")?;
        w.append_line("assign regs_wready  = wready;")?;
        w.append_line("assign regs_bvalid  = bvalid;")?;
        w.append_line("assign regs_bresp   = 2'b00;")?;
        w.append_line("assign regs_arready = arready;")?;
        w.append_line("assign regs_rvalid  = rvalid;")?;
        w.append_line("assign regs_rdata   = rdata;")?;
        w.append_line("assign regs_rresp   = 2'b00;")?;
        for reg in model.registers.iter().filter(|r| r.reg_type.has_output()) {
            w.append_line(&format!(
                "assign {} = r_{};",
                port_name(&reg.name, "O"),
                reg.name
            ))?;
            if reg.use_upd_pulse {
                w.append_line(&format!(
                    "assign {} = r_{}_upd;",
                    port_name(&reg.name, "O_upd"),
                    reg.name
                ))?;
            }
        }
        w.append_line("")?;
        Self::write_block(&mut w, ctx)?;
        w.append_line("")?;
        Self::read_block(&mut w, ctx)?;
        w.unindent()?;
        w.append_line("endmodule")?;

        Ok(w.finish()?)
    }
}

impl VerilogGenerator {
    fn range(width: u64) -> String {
        format!("[{}:0]", width.saturating_sub(1))
    }

    /// `N'b...` reset literal.
    pub fn reset_literal(reg: &Register) -> String {
        format!("{}'b{}", reg.count_bits(), reg.default_bit_string())
    }

    fn ports(ctx: &RenderContext<'_>) -> Vec<String> {
        let model = ctx.model;
        let addr = Self::range(u64::from(model.address_width()));
        let data = Self::range(u64::from(model.config.data_size));
        let strb = Self::range(u64::from(model.strobe_size()));
        let mut ports = vec![
            "input  wire regs_aclk".to_string(),
            "input  wire regs_aresetn".to_string(),
            format!("input  wire {} regs_awaddr", addr),
            "input  wire [2:0] regs_awprot".to_string(),
            "input  wire regs_awvalid".to_string(),
            "output wire regs_awready".to_string(),
            format!("input  wire {} regs_wdata", data),
            format!("input  wire {} regs_wstrb", strb),
            "input  wire regs_wvalid".to_string(),
            "output wire regs_wready".to_string(),
            "output wire [1:0] regs_bresp".to_string(),
            "output wire regs_bvalid".to_string(),
            "input  wire regs_bready".to_string(),
            format!("input  wire {} regs_araddr", addr),
            "input  wire [2:0] regs_arprot".to_string(),
            "input  wire regs_arvalid".to_string(),
            "output wire regs_arready".to_string(),
            format!("output wire {} regs_rdata", data),
            "output wire [1:0] regs_rresp".to_string(),
            "output wire regs_rvalid".to_string(),
            "input  wire regs_rready".to_string(),
        ];

        for reg in &model.registers {
            let range = Self::range(reg.count_bits());
            if reg.reg_type.has_output() {
                ports.push(format!("output wire {} {}", range, port_name(&reg.name, "O")));
                if reg.use_upd_pulse {
                    ports.push(format!("output wire {}", port_name(&reg.name, "O_upd")));
                }
            }
            if reg.reg_type.has_input() {
                ports.push(format!("input  wire {} {}", range, port_name(&reg.name, "I")));
            }
        }
        ports
    }

    fn declarations(w: &mut CodeWriter, reg: &Register, address_width: u32) -> Result<()> {
        w.append_line("")?;
        w.append_line(&format!("// {} ({})", reg.name, reg.reg_type))?;
        w.append_line(&format!(
            "localparam [{}:0] C_{}_ADDR = {}'h{:X};",
            address_width - 1,
            reg.name,
            address_width,
            reg.addr_offset
        ))?;
        for field in reg.field_layout()? {
            w.append_line(&format!(
                "localparam integer C_{}_{}_OFFSET = {};",
                reg.name, field.name, field.offset
            ))?;
            w.append_line(&format!(
                "localparam integer C_{}_{}_WIDTH = {};",
                reg.name, field.name, field.num_bits
            ))?;
        }
        if reg.reg_type.has_output() {
            w.append_line(&format!(
                "reg {} r_{};",
                Self::range(reg.count_bits()),
                reg.name
            ))?;
            if reg.use_upd_pulse {
                w.append_line(&format!("reg r_{}_upd;", reg.name))?;
            }
        }
        Ok(())
    }

    fn write_block(w: &mut CodeWriter, ctx: &RenderContext<'_>) -> Result<()> {
        let writable: Vec<&Register> = ctx
            .model
            .registers
            .iter()
            .filter(|r| r.reg_type.has_output())
            .collect();

        w.append_line("always @(posedge regs_aclk) begin")?;
        w.indent();
        w.append_line("if (!regs_aresetn) begin")?;
        w.indent();
        w.append_line("awready <= 1'b0;")?;
        w.append_line("wready  <= 1'b0;")?;
        w.append_line("bvalid  <= 1'b0;")?;
        for reg in &writable {
            w.append_line(&format!("r_{} <= {};", reg.name, Self::reset_literal(reg)))?;
            if reg.use_upd_pulse {
                w.append_line(&format!("r_{}_upd <= 1'b0;", reg.name))?;
            }
        }
        w.unindent()?;
        w.append_line("end else begin")?;
        w.indent();
        for reg in writable.iter().filter(|r| r.use_upd_pulse) {
            w.append_line(&format!("r_{}_upd <= 1'b0;", reg.name))?;
        }
        w.append_line("if (!awready && !wready && !bvalid && regs_awvalid && regs_wvalid) begin")?;
        w.indent();
        w.append_line("awready <= 1'b1;")?;
        w.append_line("wready  <= 1'b1;")?;
        w.append_line("bvalid  <= 1'b1;")?;
        w.append_line("case (regs_awaddr)")?;
        w.indent();
        for reg in &writable {
            w.append_line(&format!("C_{}_ADDR: begin", reg.name))?;
            w.indent();
            for (lane, hi, lo) in byte_lanes(reg.count_bits()) {
                w.append_line(&format!(
                    "if (regs_wstrb[{lane}]) r_{name}[{hi}:{lo}] <= regs_wdata[{hi}:{lo}];",
                    lane = lane,
                    name = reg.name,
                    hi = hi,
                    lo = lo
                ))?;
            }
            if reg.use_upd_pulse {
                w.append_line(&format!("r_{}_upd <= 1'b1;", reg.name))?;
            }
            w.unindent()?;
            w.append_line("end")?;
        }
        w.append_line("default: ;")?;
        w.unindent()?;
        w.append_line("endcase")?;
        w.unindent()?;
        w.append_line("end else begin")?;
        w.indent();
        w.append_line("awready <= 1'b0;")?;
        w.append_line("wready  <= 1'b0;")?;
        w.append_line("if (bvalid && regs_bready) bvalid <= 1'b0;")?;
        w.unindent()?;
        w.append_line("end")?;
        w.unindent()?;
        w.append_line("end")?;
        w.unindent()?;
        w.append_line("end")?;
        Ok(())
    }

    fn read_block(w: &mut CodeWriter, ctx: &RenderContext<'_>) -> Result<()> {
        w.append_line("always @(posedge regs_aclk) begin")?;
        w.indent();
        w.append_line("if (!regs_aresetn) begin")?;
        w.indent();
        w.append_line("arready <= 1'b0;")?;
        w.append_line("rvalid  <= 1'b0;")?;
        w.append_line("rdata   <= 0;")?;
        w.unindent()?;
        w.append_line("end else if (!arready && !rvalid && regs_arvalid) begin")?;
        w.indent();
        w.append_line("arready <= 1'b1;")?;
        w.append_line("rvalid  <= 1'b1;")?;
        w.append_line("rdata   <= 0;")?;
        w.append_line("case (regs_araddr)")?;
        w.indent();
        for reg in &ctx.model.registers {
            let source = if reg.reg_type.has_input() {
                port_name(&reg.name, "I")
            } else {
                format!("r_{}", reg.name)
            };
            w.append_line(&format!(
                "C_{}_ADDR: rdata[{}:0] <= {};",
                reg.name,
                reg.count_bits().saturating_sub(1),
                source
            ))?;
        }
        w.append_line("default: ;")?;
        w.unindent()?;
        w.append_line("endcase")?;
        w.unindent()?;
        w.append_line("end else begin")?;
        w.indent();
        w.append_line("arready <= 1'b0;")?;
        w.append_line("if (rvalid && regs_rready) rvalid <= 1'b0;")?;
        w.unindent()?;
        w.append_line("end")?;
        w.unindent()?;
        w.append_line("end")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{sample_identity, sample_model};

    fn render() -> String {
        let model = sample_model();
        let identity = sample_identity();
        VerilogGenerator
            .render(&RenderContext::new(&model, &identity))
            .unwrap()
    }

    #[test]
    fn test_module_header() {
        let v = render();
        assert!(v.contains("module reg_file ("));
        assert!(v.contains("input  wire [3:0] regs_wstrb,"));
        assert!(v.contains("input  wire [31:0] regs_wdata,"));
        assert!(v.trim_end().ends_with("endmodule"));
    }

    #[test]
    fn test_reset_literal_width_prefix() {
        let model = sample_model();
        assert_eq!(
            VerilogGenerator::reset_literal(&model.registers[0]),
            "8'b00000000"
        );
        assert!(render().contains("r_Scratch <= 32'b00010010001101000101011001111000;"));
    }

    #[test]
    fn test_register_ports() {
        let v = render();
        assert!(v.contains("input  wire [7:0] R_Status_I"));
        assert!(v.contains("output wire [31:0] R_Scratch_O,"));
        assert!(v.contains("output wire R_Scratch_O_upd"));
    }

    #[test]
    fn test_last_port_has_no_comma() {
        let v = render();
        let close = v.find("\n);").unwrap();
        assert!(!v[..close].ends_with(','));
    }
}
