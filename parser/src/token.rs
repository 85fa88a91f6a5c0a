//! FILENAME: parser/src/token.rs
//! PURPOSE: Token definitions for the tokenization pass.
//! CONTEXT: Tokens are position-annotated spans of source text produced by
//! lexer rules during pass 1 and consumed by the expression builder in
//! pass 2. A token never moves once appended; only its length may grow
//! (error coalescing) and its report severity may be raised.

use serde::{Deserialize, Serialize};

/// Typed handle to a registered lexer rule.
///
/// Returned by `RuleSet::register` and stamped onto every token the rule
/// produces, so pass 2 can dispatch a token back to its owning rule without
/// any type scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleId(pub(crate) usize);

impl RuleId {
    /// Owner id used by the rule set's built-in unknown-character fallback.
    pub const FALLBACK: RuleId = RuleId(usize::MAX);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Classification of a token, assigned by the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Trivia (skipped by the expression builder)
    Space,
    Newline,
    Comment,

    // Literals
    Number,
    Text,

    // Operator rule
    Operator,
    OpenParen,
    CloseParen,

    // Function rule
    FuncName,
    CallOpen,
    CallClose,
    ArgSep,

    // Fallback for unrecognized characters
    Error,

    /// Escape hatch for third-party rules that need their own kind.
    Custom(u16),
}

impl TokenKind {
    /// Trivia tokens carry no expression content.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Space | TokenKind::Newline | TokenKind::Comment)
    }
}

/// Report severity. The ordering is total: `Info < Warning < Error`,
/// and `Token::set_report` merges by maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Machine-readable report categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportCode {
    // Lexical
    UnknownChar,
    UnterminatedString,
    InvalidNumber,

    // Structural (pass 2)
    UnknownFunction,
    ArityMismatch,
    MissingOperand,
    MissingOperator,
    UnmatchedParen,
    TrailingTokens,

    // Post-scan integrity (indicates a lexer-rule bug, not bad input)
    TokenOverlap,
    TokenGap,
    TokenOutOfBounds,

    Other,
}

/// A severity-tagged message attached to a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub severity: Severity,
    pub code: ReportCode,
    pub message: String,
}

/// A classified span of source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The rule that produced this token.
    pub rule: RuleId,
    pub kind: TokenKind,
    /// Byte offset into the source text.
    pub start: usize,
    /// Span length in bytes. Mutable so the error fallback can coalesce
    /// consecutive unrecognized characters into one growing token.
    pub len: usize,
    /// Opaque per-rule payload. The operator rule stores the index of the
    /// matched definition here; the number rule stores the literal type.
    pub aux: Option<u32>,
    pub report: Option<Report>,
}

impl Token {
    pub fn new(rule: RuleId, kind: TokenKind, start: usize, len: usize) -> Self {
        Token {
            rule,
            kind,
            start,
            len,
            aux: None,
            report: None,
        }
    }

    pub fn with_aux(mut self, aux: u32) -> Self {
        self.aux = Some(aux);
        self
    }

    /// Byte offset one past the end of the span.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// The slice of source text this token covers.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end()]
    }

    /// Attaches a report, or raises an existing one. Severity is monotonic:
    /// a later call can only raise it, never lower it. A call at the same
    /// or lower severity leaves the existing report untouched.
    pub fn set_report(&mut self, severity: Severity, code: ReportCode, message: impl Into<String>) {
        match &self.report {
            Some(existing) if existing.severity >= severity => {}
            _ => {
                self.report = Some(Report {
                    severity,
                    code,
                    message: message.into(),
                });
            }
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        self.report.as_ref().map(|r| r.severity)
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Some(Severity::Error)
    }
}
