//! FILENAME: parser/src/rules/number.rs
//! PURPOSE: Numeric literal rule with a configurable literal ladder.
//! CONTEXT: Scanning is greedy-then-shrink: take the longest run of
//! number-ish characters, then retry ever-shorter prefixes until one
//! parses, so `12.5x` lexes as the number `12.5` followed by whatever the
//! remaining rules make of `x`. The literal type ladder is configurable;
//! by default int and double are enabled and a literal becomes the
//! narrowest enabled type that parses.

use std::sync::OnceLock;

use rust_decimal::Decimal;

use crate::builder::TreeBuilder;
use crate::error::BuildError;
use crate::expr::Expr;
use crate::rules::{LexerRule, ScanOutcome};
use crate::session::ParseSession;
use crate::token::{RuleId, Token, TokenKind};
use crate::value::Value;

const AUX_INT: u32 = 0;
const AUX_FLOAT: u32 = 1;
const AUX_DOUBLE: u32 = 2;
const AUX_DECIMAL: u32 = 3;

#[derive(Debug)]
pub struct NumberRule {
    decimal_separator: char,
    include_sign: bool,
    substitutions: Vec<(char, char)>,
    parse_int: bool,
    parse_float: bool,
    parse_double: bool,
    parse_decimal: bool,
    charset: OnceLock<String>,
}

impl Default for NumberRule {
    fn default() -> Self {
        NumberRule {
            decimal_separator: '.',
            include_sign: false,
            substitutions: Vec::new(),
            parse_int: true,
            parse_float: false,
            parse_double: true,
            parse_decimal: false,
            charset: OnceLock::new(),
        }
    }
}

impl NumberRule {
    pub fn new() -> Self {
        NumberRule::default()
    }

    /// Changes the decimal separator, e.g. `','` for locales writing `1,5`.
    pub fn with_decimal_separator(mut self, sep: char) -> Self {
        self.decimal_separator = sep;
        self
    }

    /// Lets a leading `+`/`-` belong to the literal. Off by default: with
    /// it on, `5-3` lexes as `5` followed by the literal `-3`, which then
    /// fails to build for want of an operator.
    pub fn with_sign(mut self) -> Self {
        self.include_sign = true;
        self
    }

    /// Maps `from` to `to` before parsing, e.g. a digit-group separator
    /// to nothing is not expressible, but `','` to `'.'` is.
    pub fn with_substitution(mut self, from: char, to: char) -> Self {
        self.substitutions.push((from, to));
        self
    }

    pub fn with_float(mut self) -> Self {
        self.parse_float = true;
        self
    }

    pub fn with_decimal(mut self) -> Self {
        self.parse_decimal = true;
        self
    }

    pub fn without_int(mut self) -> Self {
        self.parse_int = false;
        self
    }

    pub fn without_double(mut self) -> Self {
        self.parse_double = false;
        self
    }

    fn charset(&self) -> &str {
        self.charset.get_or_init(|| {
            let mut set = String::from("0123456789");
            set.push(self.decimal_separator);
            for (from, _) in &self.substitutions {
                if !set.contains(*from) {
                    set.push(*from);
                }
            }
            if self.include_sign {
                set.push('+');
                set.push('-');
            }
            if self.parse_float || self.parse_double || self.parse_decimal {
                set.push('e');
                set.push('E');
            }
            set
        })
    }

    fn normalize_char(&self, c: char) -> char {
        for (from, to) in &self.substitutions {
            if c == *from {
                return *to;
            }
        }
        if c == self.decimal_separator {
            '.'
        } else {
            c
        }
    }

    /// Tries the enabled literal types narrowest-first. Float and double
    /// parses that overflow to infinity are rejected so the next wider
    /// type gets a chance.
    fn classify(&self, s: &str) -> Option<u32> {
        if self.parse_int && s.parse::<i32>().is_ok() {
            return Some(AUX_INT);
        }
        if self.parse_float && s.parse::<f32>().map(f32::is_finite).unwrap_or(false) {
            return Some(AUX_FLOAT);
        }
        if self.parse_double && s.parse::<f64>().map(f64::is_finite).unwrap_or(false) {
            return Some(AUX_DOUBLE);
        }
        if self.parse_decimal && s.parse::<Decimal>().is_ok() {
            return Some(AUX_DECIMAL);
        }
        None
    }
}

impl LexerRule for NumberRule {
    fn scan(&self, session: &mut ParseSession, rule: RuleId) -> ScanOutcome {
        let charset = self.charset();
        let raw: Vec<char> = session
            .rest()
            .chars()
            .take_while(|c| charset.contains(*c))
            .collect();
        if raw.is_empty() {
            return ScanOutcome::NoMatch;
        }
        let norm: Vec<char> = raw.iter().map(|&c| self.normalize_char(c)).collect();

        for prefix in (1..=raw.len()).rev() {
            let candidate: String = norm[..prefix].iter().collect();
            let Some(aux) = self.classify(&candidate) else {
                continue;
            };
            let byte_len: usize = raw[..prefix].iter().map(|c| c.len_utf8()).sum();
            let start = session.pos();
            session.push_token(Token::new(rule, TokenKind::Number, start, byte_len).with_aux(aux));
            session.advance_to(start + byte_len);
            return ScanOutcome::Match;
        }
        ScanOutcome::NoMatch
    }

    fn build(&self, builder: &mut TreeBuilder<'_>, left: Option<Expr>) -> Result<Expr, BuildError> {
        let token = builder.bump().ok_or(BuildError::Empty)?;
        if left.is_some() {
            return Err(BuildError::MissingOperator(token.start));
        }
        let normalized: String = token
            .text(builder.source())
            .chars()
            .map(|c| self.normalize_char(c))
            .collect();
        let value = match token.aux {
            Some(AUX_INT) => normalized.parse::<i32>().ok().map(Value::Int),
            Some(AUX_FLOAT) => normalized.parse::<f32>().ok().map(Value::Float),
            Some(AUX_DOUBLE) => normalized.parse::<f64>().ok().map(Value::Double),
            Some(AUX_DECIMAL) => normalized.parse::<Decimal>().ok().map(Value::Decimal),
            _ => None,
        }
        .ok_or(BuildError::InvalidLiteral(token.start))?;
        let leaf = builder.intern(value);
        Ok(Expr::Const(leaf))
    }
}
