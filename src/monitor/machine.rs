//! A minimal RV64 machine state the debugger can be pointed at.
//!
//! It only holds what the expression core can observe: the 32
//! general purpose registers, the program counter and a flat block
//! of guest memory mapped at a configurable base address.
//!
//! Registers can be named by ABI name or by number:
//!
//! ```text
//! $0  $ra $sp $gp $tp $t0-$t2 $s0 $s1 $a0-$a7 $s2-$s11 $t3-$t6
//! $x0 ... $x31
//! $pc
//! ```
//!
//! `$0` / `$x0` is hardwired to zero.

use std::fmt;
use thiserror::Error;

use super::bridge::Bridge;

const REGISTER_NAMES: [&str; 32] = [
    "0",  "ra", "sp", "gp", "tp", "t0", "t1", "t2",
    "s0", "s1", "a0", "a1", "a2", "a3", "a4", "a5",
    "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7",
    "s8", "s9", "s10", "s11", "t3", "t4", "t5", "t6",
];

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum MachineError {
    #[error("unknown register `{0}`")]
    UnknownRegister(String),

    #[error("image of {len} bytes does not fit in {size} bytes of guest memory")]
    ImageTooLarge { len: usize, size: usize },

    #[error("address 0x{0:016x} is outside guest memory")]
    OutOfRange(u64),

    #[error("invalid register assignment `{0}`, expected NAME=VALUE")]
    InvalidAssignment(String),

    #[error("unable to allocate {size} bytes of guest memory")]
    OutOfMemory { size: usize },
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct MachineConfig {
    /// Guest address of the first byte of memory.
    pub base: u64,
    /// Bytes of guest memory.
    pub size: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig{base: 0x8000_0000, size: 0x800_0000}
    }
}

#[derive(Clone, Debug)]
pub struct Machine {
    gpr: [u64; 32],
    pc: u64,
    base: u64,
    memory: Vec<u8>,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Register {
    Gpr(usize),
    Pc,
}

impl Register {
    fn lookup(name: &str) -> Option<Register> {
        if name == "pc" {
            return Some(Register::Pc);
        }
        if let Some(idx) = REGISTER_NAMES.iter().position(|n| *n == name) {
            return Some(Register::Gpr(idx));
        }
        // xN, with no leading zeros.
        let num = name.strip_prefix('x')?;
        if num.len() > 1 && num.starts_with('0') {
            return None;
        }
        match num.parse::<usize>() {
            Ok(idx) if idx < 32 => Some(Register::Gpr(idx)),
            _ => None,
        }
    }
}

impl Machine {
    /// Fails instead of aborting when guest memory cannot be allocated.
    pub fn new(config: MachineConfig) -> Result<Self, MachineError> {
        let mut memory = Vec::new();
        memory.try_reserve_exact(config.size)
            .map_err(|_| MachineError::OutOfMemory{size: config.size})?;
        memory.resize(config.size, 0);

        Ok(Machine {
            gpr: [0; 32],
            pc: config.base,
            base: config.base,
            memory,
        })
    }

    pub fn set_register(&mut self, name: &str, value: u64) -> Result<(), MachineError> {
        match Register::lookup(name) {
            // Writes to x0 are discarded, as on hardware.
            Some(Register::Gpr(0)) => Ok(()),
            Some(Register::Gpr(idx)) => { self.gpr[idx] = value; Ok(()) },
            Some(Register::Pc) => { self.pc = value; Ok(()) },
            None => Err(MachineError::UnknownRegister(name.to_owned())),
        }
    }

    /// Parses and applies a `NAME=VALUE` assignment, VALUE in decimal or `0x` hex.
    pub fn assign(&mut self, assignment: &str) -> Result<(), MachineError> {
        let invalid = || MachineError::InvalidAssignment(assignment.to_owned());
        let mut parts = assignment.splitn(2, '=');
        let name = parts.next().ok_or_else(invalid)?.trim().trim_start_matches('$');
        let value = parts.next().ok_or_else(invalid)?.trim();
        let value = parse_number(value).ok_or_else(invalid)?;
        self.set_register(name, value)
    }

    /// Copies `image` to the start of guest memory.
    pub fn load_image(&mut self, image: &[u8]) -> Result<(), MachineError> {
        if image.len() > self.memory.len() {
            return Err(MachineError::ImageTooLarge{len: image.len(), size: self.memory.len()});
        }
        self.memory[..image.len()].copy_from_slice(image);
        info!("loaded {} byte image at 0x{:08x}", image.len(), self.base);
        Ok(())
    }

    pub fn write_byte(&mut self, guest: u64, byte: u8) -> Result<(), MachineError> {
        let host = self.translate_address(guest).ok_or(MachineError::OutOfRange(guest))?;
        self.memory[host] = byte;
        Ok(())
    }

    /// Every register as `(name, value)`, in architectural order with `pc` last.
    pub fn registers(&self) -> Vec<(String, u64)> {
        REGISTER_NAMES.iter()
            .zip(self.gpr.iter())
            .map(|(name, value)| (format!("${}", name), *value))
            .chain(std::iter::once(("$pc".to_owned(), self.pc)))
            .collect()
    }
}

impl Bridge for Machine {
    fn resolve_register(&self, name: &str) -> Option<u64> {
        match Register::lookup(name)? {
            Register::Gpr(idx) => Some(self.gpr[idx]),
            Register::Pc => Some(self.pc),
        }
    }

    fn base_address(&self) -> u64 {
        self.base
    }

    fn translate_address(&self, guest: u64) -> Option<usize> {
        let offset = guest.checked_sub(self.base)?;
        if offset < self.memory.len() as u64 {
            Some(offset as usize)
        } else {
            None
        }
    }

    fn read_byte(&self, host: usize) -> Option<u8> {
        self.memory.get(host).copied()
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "pc=0x{:016x} mem=[0x{:08x}, 0x{:08x})",
            self.pc, self.base, self.base.wrapping_add(self.memory.len() as u64))
    }
}

/// Parses a decimal or `0x`/`0X` prefixed hexadecimal number.
pub fn parse_number(s: &str) -> Option<u64> {
    if s.starts_with("0x") || s.starts_with("0X") {
        u64::from_str_radix(&s[2..], 16).ok()
    } else {
        s.parse::<u64>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Machine {
        Machine::new(MachineConfig{base: 0x1000, size: 16}).unwrap()
    }

    #[test]
    fn test_new_rejects_huge_memory() {
        let config = MachineConfig{base: 0x8000_0000, size: usize::MAX};
        assert_eq!(Machine::new(config).err(), Some(MachineError::OutOfMemory{size: usize::MAX}));

        let config = MachineConfig{base: 0x8000_0000, size: isize::MAX as usize + 1};
        assert!(Machine::new(config).is_err());
    }

    #[test]
    fn test_register_lookup() {
        assert_eq!(Register::lookup("0"), Some(Register::Gpr(0)));
        assert_eq!(Register::lookup("sp"), Some(Register::Gpr(2)));
        assert_eq!(Register::lookup("a0"), Some(Register::Gpr(10)));
        assert_eq!(Register::lookup("s11"), Some(Register::Gpr(27)));
        assert_eq!(Register::lookup("t6"), Some(Register::Gpr(31)));
        assert_eq!(Register::lookup("x0"), Some(Register::Gpr(0)));
        assert_eq!(Register::lookup("x31"), Some(Register::Gpr(31)));
        assert_eq!(Register::lookup("pc"), Some(Register::Pc));

        assert_eq!(Register::lookup("x32"), None);
        assert_eq!(Register::lookup("x01"), None);
        assert_eq!(Register::lookup("x"), None);
        assert_eq!(Register::lookup("zero"), None);
        assert_eq!(Register::lookup("$sp"), None);
    }

    #[test]
    fn test_set_register() {
        let mut m = small();
        assert_eq!(m.set_register("a0", 42), Ok(()));
        assert_eq!(m.resolve_register("a0"), Some(42));
        assert_eq!(m.resolve_register("x10"), Some(42));

        assert_eq!(m.set_register("0", 42), Ok(()));
        assert_eq!(m.resolve_register("0"), Some(0));

        assert_eq!(m.resolve_register("pc"), Some(0x1000));
        assert_eq!(m.set_register("pc", 0x1004), Ok(()));
        assert_eq!(m.resolve_register("pc"), Some(0x1004));

        assert_eq!(m.set_register("q1", 1), Err(MachineError::UnknownRegister("q1".to_owned())));
        assert_eq!(m.resolve_register("q1"), None);
    }

    #[test]
    fn test_assign() {
        let mut m = small();
        assert_eq!(m.assign("sp=0x1008"), Ok(()));
        assert_eq!(m.assign("$t0 = 17"), Ok(()));
        assert_eq!(m.resolve_register("sp"), Some(0x1008));
        assert_eq!(m.resolve_register("t0"), Some(17));

        assert_eq!(m.assign("sp"), Err(MachineError::InvalidAssignment("sp".to_owned())));
        assert_eq!(m.assign("sp=zz"), Err(MachineError::InvalidAssignment("sp=zz".to_owned())));
        assert_eq!(m.assign("q1=1"), Err(MachineError::UnknownRegister("q1".to_owned())));
    }

    #[test]
    fn test_memory() {
        let mut m = small();
        assert_eq!(m.load_image(&[1, 2, 3]), Ok(()));
        assert_eq!(m.load_image(&[0; 17]), Err(MachineError::ImageTooLarge{len: 17, size: 16}));
        assert_eq!(m.write_byte(0x100f, 0xff), Ok(()));
        assert_eq!(m.write_byte(0x1010, 0xff), Err(MachineError::OutOfRange(0x1010)));
        assert_eq!(m.write_byte(0x0fff, 0xff), Err(MachineError::OutOfRange(0x0fff)));

        assert_eq!(m.translate_address(0x0fff), None);
        assert_eq!(m.translate_address(0x1000), Some(0));
        assert_eq!(m.translate_address(0x100f), Some(15));
        assert_eq!(m.translate_address(0x1010), None);
        assert_eq!(m.read_byte(2), Some(3));
        assert_eq!(m.read_byte(15), Some(0xff));
        assert_eq!(m.read_byte(16), None);
    }

    #[test]
    fn test_read_bytes() {
        use crate::expr::error::EvalError;

        let mut m = small();
        m.load_image(&[0xde, 0xad, 0xbe, 0xef]).unwrap();
        assert_eq!(m.read_bytes(0x1000, 4), Ok(vec![0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(m.read_bytes(0x1002, 0), Ok(vec![]));
        assert_eq!(m.read_bytes(0x0fff, 2), Err(EvalError::InvalidAddress(0x0fff)));
        assert_eq!(m.read_bytes(0x100e, 4), Err(EvalError::InvalidAddress(0x1010)));
    }

    #[test]
    fn test_registers_listing() {
        let mut m = small();
        m.set_register("ra", 7).unwrap();
        let regs = m.registers();
        assert_eq!(regs.len(), 33);
        assert_eq!(regs[0], ("$0".to_owned(), 0));
        assert_eq!(regs[1], ("$ra".to_owned(), 7));
        assert_eq!(regs[32], ("$pc".to_owned(), 0x1000));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("0"), Some(0));
        assert_eq!(parse_number("4096"), Some(4096));
        assert_eq!(parse_number("0x1000"), Some(4096));
        assert_eq!(parse_number("0X1f"), Some(31));
        assert_eq!(parse_number("0x"), None);
        assert_eq!(parse_number("-1"), None);
    }
}
