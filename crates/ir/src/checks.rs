//! Structural checks on a flattened register list.

use crate::error::{AddressCollision, CompileError};
use crate::Register;
use std::collections::BTreeMap;

/// Fails on the first register wider than the bus.
pub fn check_register_widths(registers: &[Register], data_size: u32) -> Result<(), CompileError> {
    for reg in registers {
        let bits = reg.count_bits();
        if bits > u64::from(data_size) {
            tracing::error!(
                "Register contains too many bits (name: {}, bits: {} > {})",
                reg.name,
                bits,
                data_size
            );
            return Err(CompileError::RegisterTooWide {
                name: reg.name.clone(),
                bits,
                limit: data_size,
            });
        }
    }
    Ok(())
}

/// Every address claimed by two or more registers, ascending.
pub fn find_duplicate_addresses(registers: &[Register]) -> Vec<AddressCollision> {
    let mut by_addr: BTreeMap<u64, Vec<String>> = BTreeMap::new();
    for reg in registers {
        by_addr
            .entry(reg.addr_offset)
            .or_default()
            .push(reg.name.clone());
    }
    by_addr
        .into_iter()
        .filter(|(_, names)| names.len() > 1)
        .map(|(address, names)| AddressCollision { address, names })
        .collect()
}

/// Every name used by two or more registers, ascending.
pub fn find_duplicate_names(registers: &[Register]) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for reg in registers {
        *counts.entry(reg.name.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Runs the width, address and name checks in that order.
///
/// The two duplicate scans always complete before failing, and log one line per offending
/// register.
pub fn check_invariants(registers: &[Register], data_size: u32) -> Result<(), CompileError> {
    check_register_widths(registers, data_size)?;

    let collisions = find_duplicate_addresses(registers);
    if !collisions.is_empty() {
        for collision in &collisions {
            for name in &collision.names {
                tracing::error!("Duplicate address {:#x}: {}", collision.address, name);
            }
        }
        return Err(CompileError::DuplicateAddress {
            addresses: collisions.iter().map(|c| c.address).collect(),
            collisions,
        });
    }

    let names = find_duplicate_names(registers);
    if !names.is_empty() {
        for reg in registers.iter().filter(|r| names.contains(&r.name)) {
            tracing::error!("Duplicate name {} at {:#x}", reg.name, reg.addr_offset);
        }
        return Err(CompileError::DuplicateName { names });
    }

    Ok(())
}
