//! FILENAME: parser/src/ruleset.rs
//! PURPOSE: The rule registry and the two-pass engine driver.
//! CONTEXT: A `RuleSet` is configured once (rules registered in priority
//! order) and then shared read-only across any number of parse sessions.
//! Pass 1 tries each rule in registration order at the current position;
//! pass 2 hands the token stream to a `TreeBuilder`. Unrecognized
//! characters never abort pass 1: they become coalesced error tokens, and
//! pass 2 refuses the stream instead.

use std::sync::Arc;

use crate::builder::TreeBuilder;
use crate::error::{BuildError, SessionError};
use crate::expr::Expr;
use crate::intern::InternPool;
use crate::rules::{LexerRule, ScanOutcome};
use crate::session::ParseSession;
use crate::token::{ReportCode, RuleId, Severity, Token, TokenKind};

/// Default cap on expression nesting depth during pass 2.
pub const DEFAULT_MAX_DEPTH: usize = 100;

pub struct RuleSet {
    rules: Vec<Arc<dyn LexerRule>>,
    max_depth: usize,
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::new()
    }
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet {
            rules: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Registers a rule at the end of the priority order and returns its
    /// id. Earlier rules win when several match the same position.
    pub fn register(&mut self, rule: impl LexerRule + 'static) -> RuleId {
        self.register_arc(Arc::new(rule))
    }

    pub fn register_arc(&mut self, rule: Arc<dyn LexerRule>) -> RuleId {
        let id = RuleId(self.rules.len());
        self.rules.push(rule);
        id
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    /// Pass 1: tokenizes the whole source. Always consumes every byte;
    /// lexical problems surface as error reports on tokens, and the only
    /// failure here is calling with a session in the wrong state.
    pub fn parse(&self, session: &mut ParseSession) -> Result<(), SessionError> {
        session.begin_parsing()?;
        while session.pos() < session.source_len() {
            let pos = session.pos();
            let mut matched = false;
            let mut first_batch: Option<(usize, usize)> = None;

            for (i, rule) in self.rules.iter().enumerate() {
                let staged = session.suspected_len();
                match rule.scan(session, RuleId(i)) {
                    ScanOutcome::Match => {
                        matched = true;
                        break;
                    }
                    ScanOutcome::Suspect => {
                        if first_batch.is_none() && session.suspected_len() > staged {
                            first_batch = Some((staged, session.suspected_len()));
                        }
                    }
                    ScanOutcome::NoMatch => {}
                }
            }

            if !matched {
                // No full match anywhere: fall back to the first rule's
                // partial tokens, or to a one-character error token.
                if let Some((from, to)) = first_batch {
                    session.commit_suspected(from, to);
                    let end = session.last_token().map(|t| t.end()).unwrap_or(pos);
                    // Guaranteed progress must stay on a char boundary,
                    // even when a rule staged a zero-length token
                    let next_char = pos
                        + session
                            .rest()
                            .chars()
                            .next()
                            .map(char::len_utf8)
                            .unwrap_or(1);
                    session.advance_to(end.max(next_char));
                } else {
                    consume_unknown_char(session);
                }
            }
            session.clear_suspected();

            if session.pos() <= pos {
                // A rule claimed a match without advancing; force progress
                // so the scan terminates.
                log::warn!("lexer rule did not advance at offset {pos}");
                consume_unknown_char(session);
            }
        }
        self.audit(session);
        session.finish_parsing();
        log::debug!(
            "tokenized {} bytes into {} tokens",
            session.source_len(),
            session.token_count()
        );
        Ok(())
    }

    /// Pass 2: builds the expression tree. Constant leaves are interned
    /// through a throwaway pool; use `create_expression_with` to share a
    /// pool across a batch.
    pub fn create_expression(&self, session: &mut ParseSession) -> Result<Expr, BuildError> {
        let mut pool = InternPool::new();
        self.create_expression_with(session, &mut pool)
    }

    pub fn create_expression_with(
        &self,
        session: &mut ParseSession,
        pool: &mut InternPool,
    ) -> Result<Expr, BuildError> {
        session.begin_expression()?;
        if session.has_error_tokens() {
            session.fail_expression();
            return Err(BuildError::ErrorTokens);
        }
        let result = {
            let mut builder = TreeBuilder::new(session, &self.rules, pool, self.max_depth);
            let result = builder.build();
            if let Err(err) = &result {
                flag_build_error(&mut builder, err);
            }
            result
        };
        match result {
            Ok(expr) => {
                session.finish_expression();
                Ok(expr)
            }
            Err(err) => {
                session.fail_expression();
                Err(err)
            }
        }
    }

    /// Both passes over a fresh session, for the common one-shot case.
    pub fn parse_to_expression(&self, source: impl Into<String>) -> Result<Expr, BuildError> {
        let mut session = ParseSession::new(source);
        self.parse(&mut session)?;
        self.create_expression(&mut session)
    }

    /// Post-scan integrity check: the token list must cover the source
    /// contiguously and stay in bounds. Violations are rule bugs; they are
    /// flagged as error tokens so pass 2 refuses the stream.
    fn audit(&self, session: &mut ParseSession) {
        let source_len = session.source_len();
        let mut expected = 0usize;
        for i in 0..session.token_count() {
            let (start, end) = {
                let t = &session.tokens()[i];
                (t.start, t.end())
            };
            if start > expected {
                log::warn!("token stream gap: {expected}..{start} uncovered");
                flag(session, i, ReportCode::TokenGap, format!("source bytes {expected}..{start} are not covered by any token"));
            } else if start < expected {
                log::warn!("token overlap at offset {start}");
                flag(session, i, ReportCode::TokenOverlap, format!("token at offset {start} overlaps the preceding token"));
            }
            if end > source_len {
                flag(session, i, ReportCode::TokenOutOfBounds, format!("token extends to offset {end}, past the end of the source"));
            }
            expected = expected.max(end);
        }
        if expected < source_len && session.token_count() > 0 {
            let last = session.token_count() - 1;
            flag(session, last, ReportCode::TokenGap, format!("source bytes {expected}..{source_len} are not covered by any token"));
        }
    }
}

fn flag(session: &mut ParseSession, index: usize, code: ReportCode, message: String) {
    if let Some(token) = session.token_mut(index) {
        token.set_report(Severity::Error, code, message);
    }
}

fn consume_unknown_char(session: &mut ParseSession) {
    let pos = session.pos();
    let Some(ch) = session.rest().chars().next() else {
        return;
    };
    let len = ch.len_utf8();
    let coalesce = matches!(
        session.last_token(),
        Some(t) if t.rule == RuleId::FALLBACK && t.kind == TokenKind::Error && t.end() == pos
    );
    if coalesce {
        if let Some(t) = session.last_token_mut() {
            t.len += len;
        }
    } else {
        let mut token = Token::new(RuleId::FALLBACK, TokenKind::Error, pos, len);
        token.set_report(
            Severity::Error,
            ReportCode::UnknownChar,
            format!("unrecognized character '{ch}'"),
        );
        session.push_token(token);
    }
    session.advance_to(pos + len);
}

/// Mirrors a build failure onto the token that triggered it, so callers
/// inspecting `session.reports()` see structural errors alongside lexical
/// ones.
fn flag_build_error(builder: &mut TreeBuilder<'_>, err: &BuildError) {
    let (code, offset) = match err {
        BuildError::MissingOperand(o) => (ReportCode::MissingOperand, Some(*o)),
        BuildError::MissingOperator(o) => (ReportCode::MissingOperator, Some(*o)),
        BuildError::UnmatchedParen(o) => (ReportCode::UnmatchedParen, Some(*o)),
        BuildError::TrailingTokens(o) => (ReportCode::TrailingTokens, Some(*o)),
        BuildError::InvalidLiteral(o) => (ReportCode::InvalidNumber, Some(*o)),
        BuildError::UnknownFunction(_) => (ReportCode::UnknownFunction, None),
        BuildError::ArityMismatch { .. } => (ReportCode::ArityMismatch, None),
        BuildError::MissingArgumentList(_) => (ReportCode::MissingOperand, None),
        BuildError::NotUnary(_) | BuildError::NotBinary(_) | BuildError::TooDeep(_) => {
            (ReportCode::Other, None)
        }
        BuildError::ErrorTokens
        | BuildError::Empty
        | BuildError::UnknownRule(_)
        | BuildError::Session(_) => return,
    };
    let message = err.to_string();
    let near = builder.current_index();
    let session = builder.session_mut();
    let token_index = match offset {
        Some(o) => session
            .tokens()
            .iter()
            .position(|t| t.start <= o && o < t.end()),
        None => None,
    }
    .or_else(|| near.checked_sub(1))
    .or_else(|| session.token_count().checked_sub(1));
    if let Some(index) = token_index.filter(|&i| i < session.token_count()) {
        if let Some(token) = session.token_mut(index) {
            token.set_report(Severity::Error, code, message);
        }
    }
}
