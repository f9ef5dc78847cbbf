//! Disambiguates `*` once the whole expression has been tokenized.
use super::token::{BinOp, Token};

/// Returns a copy of `tokens` where every `*` that cannot be a
/// multiplication is a dereference instead. That is the case for a
/// `*` at the very start or right after one of `+ - * /`.
pub fn classify(tokens: &[Token]) -> Vec<Token> {
    tokens.iter().enumerate()
        .map(|(i, tok)| match tok {
            Token::Op(BinOp::Mul) if i == 0 || tokens[i - 1].is_arithmetic() => Token::Deref,
            _ => tok.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::lexer::tokenize;
    use pretty_assertions::assert_eq;

    fn classified(text: &str) -> Vec<Token> {
        classify(&tokenize(text).unwrap())
    }

    #[test]
    fn test_classify() {
        let sp = || Token::Reg("$sp".to_owned());
        let two = || Token::Dec("2".to_owned());

        assert_eq!(classified("*$sp"), vec![Token::Deref, sp()]);
        assert_eq!(classified("2*$sp"), vec![two(), Token::Op(BinOp::Mul), sp()]);
        assert_eq!(classified("2**$sp"), vec![two(), Token::Op(BinOp::Mul), Token::Deref, sp()]);
        assert_eq!(classified("2+*$sp"), vec![two(), Token::Op(BinOp::Add), Token::Deref, sp()]);
        assert_eq!(classified("2-*$sp"), vec![two(), Token::Op(BinOp::Sub), Token::Deref, sp()]);
        assert_eq!(classified("2/*$sp"), vec![two(), Token::Op(BinOp::Div), Token::Deref, sp()]);
        // Lookback sees the original `*`, so a chain of stars all dereference.
        assert_eq!(classified("**$sp"), vec![Token::Deref, Token::Deref, sp()]);
        assert_eq!(classified("$sp*2"), vec![sp(), Token::Op(BinOp::Mul), two()]);
        assert_eq!(classified("(2)*2"), vec![Token::LParen, two(), Token::RParen, Token::Op(BinOp::Mul), two()]);
    }

    #[test]
    fn test_classify_leaves_input_alone() {
        let tokens = tokenize("*$sp").unwrap();
        let _ = classify(&tokens);
        assert_eq!(tokens[0], Token::Op(BinOp::Mul));
    }

    #[test]
    fn test_classify_empty() {
        assert_eq!(classify(&[]), Vec::<Token>::new());
    }
}
