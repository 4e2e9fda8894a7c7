//! Sequential address assignment.

/// The cursor ran past the end of the 64-bit address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("address space exhausted")]
pub struct AddressOverflow;

/// Running "next free address" for one compilation.
///
/// Every register takes one bus word regardless of its width. The cursor is owned by a
/// single [`crate::flatten::Flattener`] and threaded through nested includes, so separate
/// compilations never share it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressAllocator {
    /// `None` once the last word of the address space has been handed out.
    next: Option<u64>,
    stride: u64,
}

impl AddressAllocator {
    /// Starts at address 0, advancing `stride` bytes per register.
    pub fn new(stride: u64) -> Self {
        Self {
            next: Some(0),
            stride,
        }
    }

    /// Returns the address for the next register and advances past it.
    ///
    /// A forced offset re-bases the cursor to `forced + base` first; it may move backwards.
    pub fn take_next(&mut self, forced: Option<u64>, base: u64) -> Result<u64, AddressOverflow> {
        self.set_next(forced, base)?;
        let addr = self.next.ok_or(AddressOverflow)?;
        self.next = addr.checked_add(self.stride);
        Ok(addr)
    }

    /// Moves the cursor to `addr + base` without allocating. `None` leaves it untouched.
    pub fn set_next(&mut self, addr: Option<u64>, base: u64) -> Result<(), AddressOverflow> {
        if let Some(offset) = addr {
            self.next = Some(offset.checked_add(base).ok_or(AddressOverflow)?);
        }
        Ok(())
    }

    /// The address the next unforced register would get.
    pub fn peek(&self) -> Result<u64, AddressOverflow> {
        self.next.ok_or(AddressOverflow)
    }
}
