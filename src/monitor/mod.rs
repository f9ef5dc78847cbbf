//! The Monitor module is everything around the expression
//! core: the machine it reads from and the harness that
//! checks it against files of known answers.

pub mod bridge;
pub mod machine;
pub mod oracle;
