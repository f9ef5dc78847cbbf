//! This lexer tokenizes sdb expressions.
use once_cell::sync::Lazy;
use regex::Regex;

use super::error::LexError;
use super::token::{BinOp, Token, MAX_LITERAL_LEN, MAX_TOKENS};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Rule {
    Space,
    Op(BinOp),
    LParen,
    RParen,
    Hex,
    Dec,
    Reg,
}

// Order matters: the first rule matching at the current
// position wins, so `==` must come before anything it
// could be split into and hex must precede decimal.
static RULES: Lazy<Vec<(Regex, Rule)>> = Lazy::new(|| {
    [
        (r"^ +",                         Rule::Space),
        (r"^\+",                         Rule::Op(BinOp::Add)),
        (r"^==",                         Rule::Op(BinOp::Eq)),
        (r"^!=",                         Rule::Op(BinOp::Ne)),
        (r"^&&",                         Rule::Op(BinOp::And)),
        (r"^-",                          Rule::Op(BinOp::Sub)),
        (r"^\*",                         Rule::Op(BinOp::Mul)),
        (r"^/",                          Rule::Op(BinOp::Div)),
        (r"^\(",                         Rule::LParen),
        (r"^\)",                         Rule::RParen),
        (r"^0[xX][0-9a-fA-F]+",          Rule::Hex),
        (r"^(0|[1-9][0-9]*)",            Rule::Dec),
        (r"^\$[a-zA-Z0-9]{1,2}[0-9]?",   Rule::Reg),
    ]
    .iter()
    .map(|(pattern, rule)| (Regex::new(pattern).expect("lexer rules are valid regexes"), *rule))
    .collect()
});

/// Splits `text` into tokens. `*` is always emitted as a
/// multiplication here; see the classifier for dereferences.
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens: Vec<Token> = Vec::with_capacity(MAX_TOKENS);
    let mut position = 0;

    while position < text.len() {
        let (len, rule) = match_rule(&text[position..])
            .ok_or(LexError::NoMatch { position })?;
        let literal = &text[position..position + len];
        trace!("matched {:?} at position {} with len {}: {}", rule, position, len, literal);

        if let Some(tok) = make_token(rule, literal, position)? {
            if tokens.len() == MAX_TOKENS {
                return Err(LexError::TooManyTokens { limit: MAX_TOKENS });
            }
            tokens.push(tok);
        }
        position += len;
    }

    Ok(tokens)
}

/// Tries every rule in priority order against the start of `rest`.
fn match_rule(rest: &str) -> Option<(usize, Rule)> {
    RULES.iter()
        .find_map(|(re, rule)| re.find(rest).map(|m| (m.end(), *rule)))
}

fn make_token(rule: Rule, literal: &str, position: usize) -> Result<Option<Token>, LexError> {
    let literal_token = |f: fn(String) -> Token| {
        if literal.len() > MAX_LITERAL_LEN {
            Err(LexError::TokenTooLong { position, len: literal.len(), max: MAX_LITERAL_LEN })
        } else {
            Ok(Some(f(literal.to_owned())))
        }
    };

    match rule {
        Rule::Space  => Ok(None),
        Rule::Op(op) => Ok(Some(Token::Op(op))),
        Rule::LParen => Ok(Some(Token::LParen)),
        Rule::RParen => Ok(Some(Token::RParen)),
        Rule::Hex    => literal_token(Token::Hex),
        Rule::Dec    => literal_token(Token::Dec),
        Rule::Reg    => literal_token(Token::Reg),
    }
}
