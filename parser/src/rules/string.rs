//! FILENAME: parser/src/rules/string.rs
//! PURPOSE: Quoted string literals with doubled-separator escaping.
//! CONTEXT: `"He said ""hi"""` lexes as one token and decodes to
//! `He said "hi"`. An unterminated literal consumes the rest of the source
//! and carries an error report, so pass 2 refuses the stream.

use crate::builder::TreeBuilder;
use crate::error::BuildError;
use crate::expr::Expr;
use crate::rules::{LexerRule, ScanOutcome};
use crate::session::ParseSession;
use crate::token::{ReportCode, RuleId, Severity, Token, TokenKind};

#[derive(Debug)]
pub struct StringRule {
    separator: char,
}

impl StringRule {
    pub fn new(separator: char) -> Self {
        StringRule { separator }
    }

    pub fn separator(&self) -> char {
        self.separator
    }
}

impl Default for StringRule {
    fn default() -> Self {
        StringRule::new('"')
    }
}

impl LexerRule for StringRule {
    fn scan(&self, session: &mut ParseSession, rule: RuleId) -> ScanOutcome {
        let rest = session.rest();
        if !rest.starts_with(self.separator) {
            return ScanOutcome::NoMatch;
        }
        let sep_len = self.separator.len_utf8();
        let body = &rest[sep_len..];

        let mut len = None;
        let mut iter = body.char_indices().peekable();
        while let Some((i, c)) = iter.next() {
            if c != self.separator {
                continue;
            }
            if matches!(iter.peek(), Some((_, next)) if *next == self.separator) {
                // Doubled separator: an escaped quote, keep going
                iter.next();
            } else {
                len = Some(sep_len + i + sep_len);
                break;
            }
        }

        let start = session.pos();
        let mut token = match len {
            Some(len) => Token::new(rule, TokenKind::Text, start, len),
            None => Token::new(rule, TokenKind::Text, start, rest.len()),
        };
        if len.is_none() {
            token.set_report(
                Severity::Error,
                ReportCode::UnterminatedString,
                format!("string literal opened at offset {start} is never closed"),
            );
        }
        let end = token.end();
        session.push_token(token);
        session.advance_to(end);
        ScanOutcome::Match
    }

    fn build(&self, builder: &mut TreeBuilder<'_>, left: Option<Expr>) -> Result<Expr, BuildError> {
        let token = builder.bump().ok_or(BuildError::Empty)?;
        if left.is_some() {
            return Err(BuildError::MissingOperator(token.start));
        }
        let sep_len = self.separator.len_utf8();
        let raw = token.text(builder.source());
        // Error tokens never reach pass 2, so the literal is terminated.
        let inner = &raw[sep_len..raw.len() - sep_len];
        let doubled: String = [self.separator, self.separator].iter().collect();
        let value = inner.replace(&doubled, &self.separator.to_string());
        Ok(Expr::Text {
            value,
            quote: self.separator,
        })
    }
}
