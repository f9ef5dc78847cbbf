#[macro_use] extern crate log;
extern crate regex;
extern crate once_cell;
extern crate thiserror;

pub mod expr;
pub mod monitor;

pub use expr::evaluate;
pub use expr::error::{EvalError, LexError};
pub use monitor::bridge::Bridge;
pub use monitor::machine::{Machine, MachineConfig};
