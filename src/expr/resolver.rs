//! Finds where a flat token range splits into two operands.
//!
//! No syntax tree is ever built. Instead the evaluator hands a range
//! of tokens to [`find_split`], which returns the operator that would
//! sit at the root of that range's tree: the one with the lowest
//! binding priority outside any parentheses, rightmost among equals so
//! that operators of the same priority associate to the left.
use super::token::Token;

/// True if the whole range is a single parenthesized group.
///
/// `(1+2)` is, `(1)+(2)` is not: the `(` at the start must be closed
/// by the last token of the range and not before it.
pub fn check_parentheses(tokens: &[Token]) -> bool {
    if tokens.first() != Some(&Token::LParen) {
        return false;
    }

    let mut depth: usize = 1;
    for (i, tok) in tokens.iter().enumerate().skip(1) {
        match tok {
            Token::LParen => depth += 1,
            Token::RParen => depth -= 1,
            _ => {},
        }
        if depth == 0 {
            return i == tokens.len() - 1;
        }
    }
    false
}

/// Index of the operator to split `tokens` on, or `None` if there
/// is no binary operator at parenthesis depth 0.
pub fn find_split(tokens: &[Token]) -> Option<usize> {
    let mut split: Option<(usize, u8)> = None;
    let mut depth: isize = 0;

    for (i, tok) in tokens.iter().enumerate() {
        match tok {
            Token::LParen => depth += 1,
            Token::RParen => depth -= 1,
            _ => {},
        }
        if depth != 0 {
            continue;
        }

        if let Token::Op(op) = tok {
            let priority = op.priority();
            match split {
                Some((_, best)) if best < priority => {},
                _ => split = Some((i, priority)),
            }
        }
    }

    split.map(|(i, _)| i)
}
