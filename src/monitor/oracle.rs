//! Self-test files for the expression evaluator.
//!
//! Each line holds the expected result followed by an expression:
//!
//! ```text
//! 7 1+2*3
//! 9 (1+2)*3
//! fail 1/(2-2)
//! eof
//! ```
//!
//! `fail` marks an expression that must not evaluate, such as a
//! generated one that ends up dividing by zero. Reading stops at the
//! `eof` line (a leading number on it is ignored).
use std::io::BufRead;
use thiserror::Error;

use super::bridge::Bridge;
use crate::expr::{self, error::EvalError};

const SENTINEL: &str = "eof";

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("error reading line {line}: {source}")]
    Io { line: usize, source: std::io::Error },

    #[error("line {line}: expected `<value> <expression>`, got `{text}`")]
    BadLine { line: usize, text: String },
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Expected {
    Value(u64),
    Failure,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Case {
    pub line: usize,
    pub expected: Expected,
    pub expression: String,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Outcome {
    pub case: Case,
    pub result: Result<u64, EvalError>,
}

impl Outcome {
    pub fn passed(&self) -> bool {
        match (self.case.expected, &self.result) {
            (Expected::Value(want), Ok(got)) => want == *got,
            (Expected::Failure, Err(_)) => true,
            _ => false,
        }
    }
}

/// Reads cases up to the sentinel line. Line numbers are 1-based.
pub fn parse<R: BufRead>(reader: R) -> Result<Vec<Case>, OracleError> {
    let mut cases = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_num = index + 1;
        let line = line.map_err(|source| OracleError::Io{line: line_num, source})?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        match parse_line(text, line_num)? {
            Some(case) => cases.push(case),
            None => return Ok(cases),
        }
    }

    warn!("oracle input ended without an `{}` line", SENTINEL);
    Ok(cases)
}

/// `None` for the sentinel.
fn parse_line(text: &str, line: usize) -> Result<Option<Case>, OracleError> {
    if text == SENTINEL {
        return Ok(None);
    }
    let bad = || OracleError::BadLine{line, text: text.to_owned()};

    let mut parts = text.splitn(2, char::is_whitespace);
    let expected = parts.next().ok_or_else(bad)?;
    let expression = parts.next().map(str::trim).ok_or_else(bad)?;
    if expression == SENTINEL {
        return Ok(None);
    }

    let expected = match expected {
        "fail" => Expected::Failure,
        n => Expected::Value(n.parse().map_err(|_| bad())?),
    };
    Ok(Some(Case{line, expected, expression: expression.to_owned()}))
}

/// Evaluates every case against `bridge`. Failing cases are logged.
pub fn run<B: Bridge + ?Sized>(cases: &[Case], bridge: &B) -> Vec<Outcome> {
    cases.iter()
        .map(|case| {
            let outcome = Outcome{case: case.clone(), result: expr::evaluate(&case.expression, bridge)};
            if !outcome.passed() {
                error!("failed: line {}: `{}` expected {:?}, got {:?}",
                    case.line, case.expression, case.expected, outcome.result);
            }
            outcome
        })
        .collect()
}
