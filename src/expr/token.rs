//! Tokens of the sdb expression language.
//!
//! ```text
//! 42            ; decimal integer
//! 0x80000000    ; hexadecimal integer, 0x or 0X prefix
//! $sp  $a0  $s11 ; register reference
//! *$sp          ; one byte of guest memory at the address in $sp
//! + - * /       ; arithmetic, usual precedence, u64 wraparound
//! == !=         ; equality, yields 1 or 0
//! &&            ; logical and, yields 1 or 0, lowest precedence
//! ( )           ; grouping
//! ```

use std::fmt;

/// Longest literal (number or register name) a single token may carry.
pub const MAX_LITERAL_LEN: usize = 31;

/// Most tokens a single expression may contain.
pub const MAX_TOKENS: usize = 32;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Token {
    Dec(String),
    Hex(String),
    Reg(String),
    Op(BinOp),
    Deref,
    LParen,
    RParen,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Eq,
    Ne,
}

impl BinOp {
    /// Binding priority. The split point of a range is the
    /// operator with the smallest value here.
    pub fn priority(&self) -> u8 {
        use BinOp::*;
        match self {
            And       => 0,
            Eq | Ne   => 1,
            Add | Sub => 2,
            Mul | Div => 3,
        }
    }

    /// Applies the operator to two already evaluated operands.
    /// Division by zero is the caller's problem and yields `None`.
    pub fn apply(&self, lhs: u64, rhs: u64) -> Option<u64> {
        use BinOp::*;
        match self {
            Add => Some(lhs.wrapping_add(rhs)),
            Sub => Some(lhs.wrapping_sub(rhs)),
            Mul => Some(lhs.wrapping_mul(rhs)),
            Div => lhs.checked_div(rhs),
            And => Some((lhs != 0 && rhs != 0) as u64),
            Eq  => Some((lhs == rhs) as u64),
            Ne  => Some((lhs != rhs) as u64),
        }
    }

    fn symbol(&self) -> &'static str {
        use BinOp::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            And => "&&",
            Eq  => "==",
            Ne  => "!=",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Dec(s) | Token::Hex(s) | Token::Reg(s) => write!(f, "{}", s),
            Token::Op(op) => write!(f, "{}", op),
            Token::Deref  => write!(f, "*"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

impl Token {
    /// True for the four arithmetic operators. A `*` following
    /// one of these is a dereference rather than a multiplication.
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Token::Op(BinOp::Add) | Token::Op(BinOp::Sub) | Token::Op(BinOp::Mul) | Token::Op(BinOp::Div))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        assert!(BinOp::And.priority() < BinOp::Eq.priority());
        assert_eq!(BinOp::Eq.priority(), BinOp::Ne.priority());
        assert!(BinOp::Ne.priority() < BinOp::Add.priority());
        assert_eq!(BinOp::Add.priority(), BinOp::Sub.priority());
        assert!(BinOp::Sub.priority() < BinOp::Mul.priority());
        assert_eq!(BinOp::Mul.priority(), BinOp::Div.priority());
    }

    #[test]
    fn test_apply() {
        assert_eq!(BinOp::Add.apply(u64::MAX, 2), Some(1));
        assert_eq!(BinOp::Sub.apply(0, 1), Some(u64::MAX));
        assert_eq!(BinOp::Mul.apply(6, 7), Some(42));
        assert_eq!(BinOp::Div.apply(10, 3), Some(3));
        assert_eq!(BinOp::Div.apply(10, 0), None);
        assert_eq!(BinOp::And.apply(5, 9), Some(1));
        assert_eq!(BinOp::And.apply(5, 0), Some(0));
        assert_eq!(BinOp::Eq.apply(3, 3), Some(1));
        assert_eq!(BinOp::Ne.apply(3, 3), Some(0));
    }

    #[test]
    fn test_display() {
        let tokens = vec![
            Token::Deref,
            Token::Reg("$sp".to_owned()),
            Token::Op(BinOp::Ne),
            Token::LParen,
            Token::Hex("0x10".to_owned()),
            Token::RParen,
        ];
        let s: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        assert_eq!(s.concat(), "*$sp!=(0x10)");
    }
}
