//! VHDL-2008 AXI4-Lite slave.

use crate::code_writer::CodeWriter;
use crate::{port_name, OutputFormat, RenderContext, Renderer};
use anyhow::Result;
use regmap_ir::Register;

pub struct VhdlGenerator;

impl Renderer for VhdlGenerator {
    fn format(&self) -> OutputFormat {
        OutputFormat::Vhdl
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<String> {
        let model = ctx.model;
        let entity = &model.config.entity_name;
        let mut w = CodeWriter::new();

        for line in ctx.provenance() {
            w.append_line(&format!("-- {}", line))?;
        }
        w.append_line(&format!("-- AXI4-Lite register file: {}", entity))?;
        w.append_line("")?;
        w.append_line("library ieee;")?;
        w.append_line("use ieee.std_logic_1164.all;")?;
        w.append_line("use ieee.numeric_std.all;")?;
        w.append_line("")?;

        w.append_line(&format!("entity {} is", entity))?;
        w.indent();
        w.append_line("port (")?;
        w.indent();
        let ports = Self::ports(ctx);
        let width = ports.iter().map(|p| p.0.len()).max().unwrap_or(0);
        for (i, (name, decl)) in ports.iter().enumerate() {
            let sep = if i + 1 == ports.len() { "" } else { ";" };
            w.append_line(&format!("{:width$} : {}{}", name, decl, sep, width = width))?;
        }
        w.unindent()?;
        w.append_line(");")?;
        w.unindent()?;
        w.append_line(&format!("end entity {};", entity))?;
        w.append_line("")?;

        w.append_line(&format!("architecture rtl of {} is", entity))?;
        w.indent();
        for reg in &model.registers {
            Self::declarations(&mut w, reg)?;
        }
        w.append_line("")?;
        w.append_line("signal awready : std_logic;")?;
        w.append_line("signal wready  : std_logic;")?;
        w.append_line("signal bvalid  : std_logic;")?;
        w.append_line("signal arready : std_logic;")?;
        w.append_line("signal rvalid  : std_logic;")?;
        w.append_line(&format!(
            "signal rdata   : std_logic_vector({} downto 0);",
            model.config.data_size - 1
        ))?;
        w.unindent()?;
        w.append_line("begin")?;
        w.indent();
        w.append_line("regs_awready <= awready;")?;
        w.append_line("regs_wready  <= wready;")?;
        w.append_line("regs_bvalid  <= bvalid;")?;
        w.append_line("regs_bresp   <= \"00\";")?;
        w.append_line("regs_arready <= arready;")?;
        w.append_line("regs_rvalid  <= rvalid;")?;
        w.append_line("regs_rdata   <= rdata;")?;
        w.append_line("regs_rresp   <= \"00\";")?;
        for reg in model.registers.iter().filter(|r| r.reg_type.has_output()) {
            w.append_line(&format!("{} <= r_{};", port_name(&reg.name, "O"), reg.name))?;
            if reg.use_upd_pulse {
                w.append_line(&format!(
                    "{} <= r_{}_upd;",
                    port_name(&reg.name, "O_upd"),
                    reg.name
                ))?;
            }
        }
        w.append_line("")?;
        Self::write_process(&mut w, ctx)?;
        w.append_line("")?;
        Self::read_process(&mut w, ctx)?;
        w.unindent()?;
        w.append_line("end architecture rtl;")?;

        Ok(w.finish()?)
    }
}

impl VhdlGenerator {
    fn vector(width: u64) -> String {
        format!("std_logic_vector({} downto 0)", width.saturating_sub(1))
    }

    fn ports(ctx: &RenderContext<'_>) -> Vec<(String, String)> {
        let model = ctx.model;
        let addr = Self::vector(u64::from(model.address_width()));
        let data = Self::vector(u64::from(model.config.data_size));
        let strb = Self::vector(u64::from(model.strobe_size()));
        let bus: [(&str, &str, &str); 21] = [
            ("regs_aclk", "in ", "std_logic"),
            ("regs_aresetn", "in ", "std_logic"),
            ("regs_awaddr", "in ", &addr),
            ("regs_awprot", "in ", "std_logic_vector(2 downto 0)"),
            ("regs_awvalid", "in ", "std_logic"),
            ("regs_awready", "out", "std_logic"),
            ("regs_wdata", "in ", &data),
            ("regs_wstrb", "in ", &strb),
            ("regs_wvalid", "in ", "std_logic"),
            ("regs_wready", "out", "std_logic"),
            ("regs_bresp", "out", "std_logic_vector(1 downto 0)"),
            ("regs_bvalid", "out", "std_logic"),
            ("regs_bready", "in ", "std_logic"),
            ("regs_araddr", "in ", &addr),
            ("regs_arprot", "in ", "std_logic_vector(2 downto 0)"),
            ("regs_arvalid", "in ", "std_logic"),
            ("regs_arready", "out", "std_logic"),
            ("regs_rdata", "out", &data),
            ("regs_rresp", "out", "std_logic_vector(1 downto 0)"),
            ("regs_rvalid", "out", "std_logic"),
            ("regs_rready", "in ", "std_logic"),
        ];
        let mut ports: Vec<(String, String)> = bus
            .iter()
            .map(|(name, dir, ty)| (name.to_string(), format!("{} {}", dir, ty)))
            .collect();

        for reg in &model.registers {
            let ty = Self::vector(reg.count_bits());
            if reg.reg_type.has_output() {
                ports.push((port_name(&reg.name, "O"), format!("out {}", ty)));
                if reg.use_upd_pulse {
                    ports.push((port_name(&reg.name, "O_upd"), "out std_logic".to_string()));
                }
            }
            if reg.reg_type.has_input() {
                ports.push((port_name(&reg.name, "I"), format!("in  {}", ty)));
            }
        }
        ports
    }

    fn declarations(w: &mut CodeWriter, reg: &Register) -> Result<()> {
        w.append_line("")?;
        w.append_line(&format!("-- {} ({})", reg.name, reg.reg_type))?;
        w.append_line(&format!(
            "constant C_{}_ADDR : natural := 16#{:X}#;",
            reg.name, reg.addr_offset
        ))?;
        for field in reg.field_layout()? {
            w.append_line(&format!(
                "constant C_{}_{}_OFFSET : natural := {};",
                reg.name, field.name, field.offset
            ))?;
            w.append_line(&format!(
                "constant C_{}_{}_WIDTH : natural := {};",
                reg.name, field.name, field.num_bits
            ))?;
        }
        if reg.reg_type.has_output() {
            w.append_line(&format!(
                "signal r_{} : {};",
                reg.name,
                Self::vector(reg.count_bits())
            ))?;
            if reg.use_upd_pulse {
                w.append_line(&format!("signal r_{}_upd : std_logic;", reg.name))?;
            }
        }
        Ok(())
    }

    fn write_process(w: &mut CodeWriter, ctx: &RenderContext<'_>) -> Result<()> {
        let writable: Vec<&Register> = ctx
            .model
            .registers
            .iter()
            .filter(|r| r.reg_type.has_output())
            .collect();

        w.append_line("write_proc : process (regs_aclk)")?;
        w.append_line("begin")?;
        w.indent();
        w.append_line("if rising_edge(regs_aclk) then")?;
        w.indent();
        w.append_line("if regs_aresetn = '0' then")?;
        w.indent();
        w.append_line("awready <= '0';")?;
        w.append_line("wready  <= '0';")?;
        w.append_line("bvalid  <= '0';")?;
        for reg in &writable {
            w.append_line(&format!("r_{} <= \"{}\";", reg.name, reg.default_bit_string()))?;
            if reg.use_upd_pulse {
                w.append_line(&format!("r_{}_upd <= '0';", reg.name))?;
            }
        }
        w.unindent()?;
        w.append_line("else")?;
        w.indent();
        for reg in writable.iter().filter(|r| r.use_upd_pulse) {
            w.append_line(&format!("r_{}_upd <= '0';", reg.name))?;
        }
        w.append_line("if awready = '0' and wready = '0' and bvalid = '0' and regs_awvalid = '1' and regs_wvalid = '1' then")?;
        w.indent();
        w.append_line("awready <= '1';")?;
        w.append_line("wready  <= '1';")?;
        w.append_line("bvalid  <= '1';")?;
        w.append_line("case to_integer(unsigned(regs_awaddr)) is")?;
        w.indent();
        for reg in &writable {
            w.append_line(&format!("when C_{}_ADDR =>", reg.name))?;
            w.indent();
            for (lane, hi, lo) in byte_lanes(reg.count_bits()) {
                w.append_line(&format!(
                    "if regs_wstrb({lane}) = '1' then r_{name}({hi} downto {lo}) <= regs_wdata({hi} downto {lo}); end if;",
                    lane = lane,
                    name = reg.name,
                    hi = hi,
                    lo = lo
                ))?;
            }
            if reg.use_upd_pulse {
                w.append_line(&format!("r_{}_upd <= '1';", reg.name))?;
            }
            w.unindent()?;
        }
        w.append_line("when others =>")?;
        w.indent();
        w.append_line("null;")?;
        w.unindent()?;
        w.unindent()?;
        w.append_line("end case;")?;
        w.unindent()?;
        w.append_line("else")?;
        w.indent();
        w.append_line("awready <= '0';")?;
        w.append_line("wready  <= '0';")?;
        w.append_line("if bvalid = '1' and regs_bready = '1' then")?;
        w.indent();
        w.append_line("bvalid <= '0';")?;
        w.unindent()?;
        w.append_line("end if;")?;
        w.unindent()?;
        w.append_line("end if;")?;
        w.unindent()?;
        w.append_line("end if;")?;
        w.unindent()?;
        w.append_line("end if;")?;
        w.unindent()?;
        w.append_line("end process write_proc;")?;
        Ok(())
    }

    fn read_process(w: &mut CodeWriter, ctx: &RenderContext<'_>) -> Result<()> {
        w.append_line("read_proc : process (regs_aclk)")?;
        w.append_line("begin")?;
        w.indent();
        w.append_line("if rising_edge(regs_aclk) then")?;
        w.indent();
        w.append_line("if regs_aresetn = '0' then")?;
        w.indent();
        w.append_line("arready <= '0';")?;
        w.append_line("rvalid  <= '0';")?;
        w.append_line("rdata   <= (others => '0');")?;
        w.unindent()?;
        w.append_line("elsif arready = '0' and rvalid = '0' and regs_arvalid = '1' then")?;
        w.indent();
        w.append_line("arready <= '1';")?;
        w.append_line("rvalid  <= '1';")?;
        w.append_line("rdata   <= (others => '0');")?;
        w.append_line("case to_integer(unsigned(regs_araddr)) is")?;
        w.indent();
        for reg in &ctx.model.registers {
            let source = if reg.reg_type.has_input() {
                port_name(&reg.name, "I")
            } else {
                format!("r_{}", reg.name)
            };
            w.append_line(&format!("when C_{}_ADDR =>", reg.name))?;
            w.indent();
            w.append_line(&format!(
                "rdata({} downto 0) <= {};",
                reg.count_bits().saturating_sub(1),
                source
            ))?;
            w.unindent()?;
        }
        w.append_line("when others =>")?;
        w.indent();
        w.append_line("null;")?;
        w.unindent()?;
        w.unindent()?;
        w.append_line("end case;")?;
        w.unindent()?;
        w.append_line("else")?;
        w.indent();
        w.append_line("arready <= '0';")?;
        w.append_line("if rvalid = '1' and regs_rready = '1' then")?;
        w.indent();
        w.append_line("rvalid <= '0';")?;
        w.unindent()?;
        w.append_line("end if;")?;
        w.unindent()?;
        w.append_line("end if;")?;
        w.unindent()?;
        w.append_line("end if;")?;
        w.unindent()?;
        w.append_line("end process read_proc;")?;
        Ok(())
    }
}

/// `(strobe lane, high bit, low bit)` for every byte a register of `width` bits touches.
pub(crate) fn byte_lanes(width: u64) -> Vec<(u64, u64, u64)> {
    (0..width.div_ceil(8))
        .map(|lane| {
            let lo = lane * 8;
            let hi = (lo + 7).min(width - 1);
            (lane, hi, lo)
        })
        .collect()
}
