//! The Expr module is in charge of taking a debugger
//! expression such as `*$sp + 0x10 == 4` and producing
//! its value against the current machine state.
//!
//! It does this with a regex-driven tokenizer, a one-token
//! lookback classifier and a recursive evaluator that splits
//! token ranges on their lowest-priority operator.

pub mod classifier;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod resolver;
pub mod token;

use crate::monitor::bridge::Bridge;
use error::EvalError;

/// Evaluates `text` against the registers and memory exposed by `bridge`.
///
/// Every call owns its token list, so evaluating the same string twice
/// against unchanged machine state gives the same answer.
pub fn evaluate<B: Bridge + ?Sized>(text: &str, bridge: &B) -> Result<u64, EvalError> {
    let tokens = classifier::classify(&lexer::tokenize(text)?);
    let value = eval::Evaluator::new(bridge).eval(&tokens);
    debug!("`{}` => {:?}", text, value);
    value
}
