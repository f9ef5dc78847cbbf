//! The seam between the expression core and whatever emulator it inspects.
use crate::expr::error::EvalError;

/// Read-only access to one emulated CPU's registers and guest memory.
///
/// Implementations must not change state while an expression is being
/// evaluated; callers serialize evaluation with stepping the CPU.
pub trait Bridge {
    /// Current value of the register called `name` (no `$` prefix),
    /// or `None` if the CPU has no such register.
    fn resolve_register(&self, name: &str) -> Option<u64>;

    /// Lowest guest address backed by memory.
    fn base_address(&self) -> u64;

    /// Maps a guest address onto an offset into host memory.
    fn translate_address(&self, guest: u64) -> Option<usize>;

    fn read_byte(&self, host: usize) -> Option<u8>;

    /// Reads `n` consecutive guest bytes starting at `guest`.
    /// Fails on the first address that is not backed by memory.
    fn read_bytes(&self, guest: u64, n: usize) -> Result<Vec<u8>, EvalError> {
        if guest < self.base_address() {
            return Err(EvalError::InvalidAddress(guest));
        }
        (0..n as u64)
            .map(|i| {
                let addr = guest.wrapping_add(i);
                self.translate_address(addr)
                    .and_then(|host| self.read_byte(host))
                    .ok_or(EvalError::InvalidAddress(addr))
            })
            .collect()
    }
}
