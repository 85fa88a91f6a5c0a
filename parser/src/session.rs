//! FILENAME: parser/src/session.rs
//! PURPOSE: Per-parse mutable state: source text, cursor, tokens, reports.
//! CONTEXT: A `ParseSession` is created per parse job and discarded after
//! evaluation or synthesis. Its lifecycle is a linear state machine
//! enforced at runtime; the long-lived `RuleSet` holds no per-parse state
//! and may be shared across threads, while a session must not be.

use std::collections::HashMap;

use crate::error::SessionError;
use crate::expr::ExprId;
use crate::token::{Report, ReportCode, Severity, Token};
use crate::value::Value;

/// Lifecycle states of a parse job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    Parsing,
    Parsed,
    ExpressionCreating,
    ExpressionCreated,
}

/// A report paired with the token it originated from.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ReportEntry {
    pub severity: Severity,
    pub code: ReportCode,
    pub message: String,
    /// Index of the originating token in the token list.
    pub token: usize,
    pub start: usize,
    pub len: usize,
}

/// Work-in-progress state for one parse job.
#[derive(Debug)]
pub struct ParseSession {
    source: String,
    pos: usize,
    state: SessionState,
    tokens: Vec<Token>,
    suspected: Vec<Token>,
    token_map: HashMap<usize, ExprId>,
    user_data: HashMap<String, Value>,
}

impl ParseSession {
    pub fn new(source: impl Into<String>) -> Self {
        ParseSession {
            source: source.into(),
            pos: 0,
            state: SessionState::Init,
            tokens: Vec::new(),
            suspected: Vec::new(),
            token_map: HashMap::new(),
            user_data: HashMap::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    /// Current scan position (byte offset).
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The unscanned remainder of the source text.
    pub fn rest(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Appends a committed token. Called by lexer rules during pass 1.
    pub fn push_token(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Stages a partial-match token. Committed by the rule set only if no
    /// rule fully matches at the current position.
    pub fn push_suspected(&mut self, token: Token) {
        self.suspected.push(token);
    }

    /// Token → expression correspondences recorded during pass 2, keyed by
    /// token index. Ids reflect node creation order.
    pub fn token_map(&self) -> &HashMap<usize, ExprId> {
        &self.token_map
    }

    /// Arbitrary per-parse values available to rules and closed over by the
    /// tree at construction time.
    pub fn set_user_data(&mut self, key: impl Into<String>, value: Value) {
        self.user_data.insert(key.into(), value);
    }

    pub fn user_data(&self, key: &str) -> Option<&Value> {
        self.user_data.get(key)
    }

    /// Flat list of all reports attached to tokens, in token order.
    pub fn reports(&self) -> Vec<ReportEntry> {
        self.tokens
            .iter()
            .enumerate()
            .filter_map(|(i, t)| {
                t.report.as_ref().map(|Report { severity, code, message }| ReportEntry {
                    severity: *severity,
                    code: *code,
                    message: message.clone(),
                    token: i,
                    start: t.start,
                    len: t.len,
                })
            })
            .collect()
    }

    pub fn has_error_tokens(&self) -> bool {
        self.tokens.iter().any(Token::is_error)
    }

    // ---- pass 1 internals -------------------------------------------------

    pub(crate) fn begin_parsing(&mut self) -> Result<(), SessionError> {
        self.expect_state(SessionState::Init)?;
        self.state = SessionState::Parsing;
        Ok(())
    }

    pub(crate) fn finish_parsing(&mut self) {
        self.state = SessionState::Parsed;
    }

    pub(crate) fn advance_to(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub(crate) fn clear_suspected(&mut self) {
        self.suspected.clear();
    }

    pub(crate) fn suspected_len(&self) -> usize {
        self.suspected.len()
    }

    /// Moves the staged tokens `range` into the committed token list.
    pub(crate) fn commit_suspected(&mut self, from: usize, to: usize) {
        self.tokens.extend(self.suspected.drain(from..to));
        self.suspected.clear();
    }

    pub(crate) fn last_token(&self) -> Option<&Token> {
        self.tokens.last()
    }

    pub(crate) fn last_token_mut(&mut self) -> Option<&mut Token> {
        self.tokens.last_mut()
    }

    pub(crate) fn token_mut(&mut self, index: usize) -> Option<&mut Token> {
        self.tokens.get_mut(index)
    }

    // ---- pass 2 internals -------------------------------------------------

    pub(crate) fn begin_expression(&mut self) -> Result<(), SessionError> {
        self.expect_state(SessionState::Parsed)?;
        self.state = SessionState::ExpressionCreating;
        self.token_map.clear();
        Ok(())
    }

    pub(crate) fn finish_expression(&mut self) {
        self.state = SessionState::ExpressionCreated;
    }

    /// Returns the session to `Parsed` after a failed build so reports can
    /// be inspected; a re-entrant build attempt still fails the
    /// `begin_expression` state check.
    pub(crate) fn fail_expression(&mut self) {
        self.state = SessionState::Parsed;
    }

    pub(crate) fn map_token(&mut self, token: usize, node: ExprId) {
        self.token_map.insert(token, node);
    }

    fn expect_state(&self, expected: SessionState) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }
}
