//! The Evaluator walks a classified token list recursively,
//! one sub-slice at a time, and produces its value.
use super::error::EvalError;
use super::resolver::{check_parentheses, find_split};
use super::token::{BinOp, Token};
use crate::monitor::bridge::Bridge;

pub struct Evaluator<'b, B: Bridge + ?Sized> {
    bridge: &'b B,
}

impl<'b, B: Bridge + ?Sized> Evaluator<'b, B> {
    pub fn new(bridge: &'b B) -> Self {
        Evaluator{bridge}
    }

    /// Evaluates a range of tokens. An empty range is
    /// always an error: something is missing an operand.
    pub fn eval(&self, tokens: &[Token]) -> Result<u64, EvalError> {
        match tokens {
            [] => Err(EvalError::parse("missing operand")),
            [tok] => self.operand(tok),
            _ if check_parentheses(tokens) => self.eval(&tokens[1..tokens.len() - 1]),
            _ => match find_split(tokens) {
                Some(d) => self.binary(tokens, d),
                None if tokens[0] == Token::Deref => self.deref(&tokens[1..]),
                None => Err(EvalError::parse(format!("no operator between `{}` and `{}`",
                    tokens[0], tokens[tokens.len() - 1]))),
            },
        }
    }

    fn operand(&self, tok: &Token) -> Result<u64, EvalError> {
        match tok {
            Token::Dec(s) => u64::from_str_radix(s, 10)
                .map_err(|e| EvalError::parse(format!("bad decimal literal `{}`: {}", s, e))),
            // The lexer guarantees the 0x / 0X prefix.
            Token::Hex(s) => u64::from_str_radix(&s[2..], 16)
                .map_err(|e| EvalError::parse(format!("bad hex literal `{}`: {}", s, e))),
            Token::Reg(s) => self.register(s),
            _ => Err(EvalError::parse(format!("unexpected `{}`", tok))),
        }
    }

    fn register(&self, literal: &str) -> Result<u64, EvalError> {
        let name = literal.trim_start_matches('$');
        self.bridge.resolve_register(name)
            .ok_or_else(|| EvalError::UnknownRegister(name.to_owned()))
    }

    /// Reads the byte at the address the operand evaluates to.
    fn deref(&self, operand: &[Token]) -> Result<u64, EvalError> {
        let addr = self.eval(operand)?;
        if addr < self.bridge.base_address() {
            return Err(EvalError::InvalidAddress(addr));
        }
        let host = self.bridge.translate_address(addr)
            .ok_or(EvalError::InvalidAddress(addr))?;
        let byte = self.bridge.read_byte(host)
            .ok_or(EvalError::InvalidAddress(addr))?;
        debug!("*0x{:08x} = 0x{:02x}", addr, byte);
        Ok(byte as u64)
    }

    fn binary(&self, tokens: &[Token], d: usize) -> Result<u64, EvalError> {
        // Both sides are evaluated before either result is looked at;
        // `&&` does not short-circuit.
        let lhs = self.eval(&tokens[..d]);
        let rhs = self.eval(&tokens[d + 1..]);
        trace!("split at {} ({}): {:?} {:?}", d, tokens[d], lhs, rhs);

        let op = match tokens[d] {
            Token::Op(op) => op,
            ref tok => return Err(EvalError::parse(format!("`{}` is not a binary operator", tok))),
        };
        if op == BinOp::Div && rhs == Ok(0) {
            return Err(EvalError::DivideByZero);
        }

        let (lhs, rhs) = (lhs?, rhs?);
        op.apply(lhs, rhs).ok_or(EvalError::DivideByZero)
    }
}
