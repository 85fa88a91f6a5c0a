//! FILENAME: parser/src/rules/trivia.rs
//! PURPOSE: Whitespace, newline, and line-comment rules.
//! CONTEXT: Trivia tokens keep the token stream contiguous over the full
//! source text but carry no expression content; the builder skips them.

use crate::builder::TreeBuilder;
use crate::error::BuildError;
use crate::expr::Expr;
use crate::rules::{LexerRule, ScanOutcome};
use crate::session::ParseSession;
use crate::token::{RuleId, Token, TokenKind};

/// Runs of spaces and tabs.
#[derive(Debug, Default)]
pub struct SpaceRule;

impl LexerRule for SpaceRule {
    fn scan(&self, session: &mut ParseSession, rule: RuleId) -> ScanOutcome {
        let len: usize = session
            .rest()
            .chars()
            .take_while(|&c| c == ' ' || c == '\t')
            .map(char::len_utf8)
            .sum();
        if len == 0 {
            return ScanOutcome::NoMatch;
        }
        let start = session.pos();
        session.push_token(Token::new(rule, TokenKind::Space, start, len));
        session.advance_to(start + len);
        ScanOutcome::Match
    }

    fn build(&self, builder: &mut TreeBuilder<'_>, _left: Option<Expr>) -> Result<Expr, BuildError> {
        // Never dispatched: the builder skips trivia tokens.
        Err(BuildError::MissingOperator(builder.current_offset()))
    }
}

/// A single line break: `\r\n`, `\n`, or `\r`.
#[derive(Debug, Default)]
pub struct NewlineRule;

impl LexerRule for NewlineRule {
    fn scan(&self, session: &mut ParseSession, rule: RuleId) -> ScanOutcome {
        let rest = session.rest();
        let len = if rest.starts_with("\r\n") {
            2
        } else if rest.starts_with('\n') || rest.starts_with('\r') {
            1
        } else {
            return ScanOutcome::NoMatch;
        };
        let start = session.pos();
        session.push_token(Token::new(rule, TokenKind::Newline, start, len));
        session.advance_to(start + len);
        ScanOutcome::Match
    }

    fn build(&self, builder: &mut TreeBuilder<'_>, _left: Option<Expr>) -> Result<Expr, BuildError> {
        Err(BuildError::MissingOperator(builder.current_offset()))
    }
}

/// A comment running from a marker to the end of the line. The terminating
/// line break is left for `NewlineRule`.
#[derive(Debug)]
pub struct LineCommentRule {
    marker: String,
}

impl LineCommentRule {
    pub fn new(marker: impl Into<String>) -> Self {
        LineCommentRule {
            marker: marker.into(),
        }
    }
}

impl Default for LineCommentRule {
    fn default() -> Self {
        LineCommentRule::new("//")
    }
}

impl LexerRule for LineCommentRule {
    fn scan(&self, session: &mut ParseSession, rule: RuleId) -> ScanOutcome {
        let rest = session.rest();
        if self.marker.is_empty() || !rest.starts_with(&self.marker) {
            return ScanOutcome::NoMatch;
        }
        let len = rest.find(['\n', '\r']).unwrap_or(rest.len());
        let start = session.pos();
        session.push_token(Token::new(rule, TokenKind::Comment, start, len));
        session.advance_to(start + len);
        ScanOutcome::Match
    }

    fn build(&self, builder: &mut TreeBuilder<'_>, _left: Option<Expr>) -> Result<Expr, BuildError> {
        Err(BuildError::MissingOperator(builder.current_offset()))
    }
}
