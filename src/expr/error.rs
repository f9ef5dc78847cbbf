use thiserror::Error;

/// Raised by the tokenizer. No partial token list survives one of these.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum LexError {
    #[error("no match at position {position}")]
    NoMatch { position: usize },

    #[error("token of {len} characters at position {position} is too long (max {max})")]
    TokenTooLong { position: usize, len: usize, max: usize },

    #[error("expression has more than {limit} tokens")]
    TooManyTokens { limit: usize },
}

/// Every way an expression can fail to produce a value.
/// None of these are fatal; the caller decides how to report them.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("malformed expression: {0}")]
    Parse(String),

    #[error("unknown register `{0}`")]
    UnknownRegister(String),

    #[error("invalid address 0x{0:016x}")]
    InvalidAddress(u64),

    #[error("division by zero")]
    DivideByZero,
}

impl EvalError {
    pub(crate) fn parse<S: Into<String>>(reason: S) -> Self {
        EvalError::Parse(reason.into())
    }
}
