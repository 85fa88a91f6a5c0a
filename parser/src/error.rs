//! FILENAME: parser/src/error.rs
//! PURPOSE: Error types for parsing, expression building, and evaluation.

use thiserror::Error;

use crate::session::SessionState;

/// Lifecycle misuse of a `ParseSession`. These indicate a programming error
/// in the caller (wrong-state operation, re-entrant build), never bad input.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("operation requires session state {expected:?}, but session is {actual:?}")]
    InvalidState {
        expected: SessionState,
        actual: SessionState,
    },
}

/// Failure to assemble an expression tree from a token stream (pass 2).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("token stream contains error-severity tokens; expression not built")]
    ErrorTokens,

    #[error("empty expression")]
    Empty,

    #[error("expression nesting exceeds the configured depth limit ({0})")]
    TooDeep(usize),

    #[error("missing operand near offset {0}")]
    MissingOperand(usize),

    #[error("missing operator near offset {0}")]
    MissingOperator(usize),

    #[error("unmatched parenthesis at offset {0}")]
    UnmatchedParen(usize),

    #[error("unexpected trailing tokens at offset {0}")]
    TrailingTokens(usize),

    #[error("operator '{0}' has no unary registration")]
    NotUnary(String),

    #[error("operator '{0}' has no binary registration")]
    NotBinary(String),

    #[error("malformed literal at offset {0}")]
    InvalidLiteral(usize),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{name} expects {min}..={max} arguments, got {got}")]
    ArityMismatch {
        name: String,
        min: usize,
        max: usize,
        got: usize,
    },

    #[error("function '{0}' must be followed by an argument list")]
    MissingArgumentList(String),

    #[error("token at offset {0} belongs to an unregistered rule")]
    UnknownRule(usize),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Failure during `Expr::calc()` evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("unsupported operation '{op}' between {left} and {right}")]
    Unsupported {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("unsupported unary operation '{op}' on {operand}")]
    UnsupportedUnary {
        op: &'static str,
        operand: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("numeric overflow in '{0}'")]
    Overflow(&'static str),

    #[error("invalid argument to {func}: {reason}")]
    InvalidArgument { func: String, reason: String },
}

impl CalcError {
    pub fn invalid_argument(func: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidArgument {
            func: func.into(),
            reason: reason.into(),
        }
    }
}

/// Mutation of a sealed descriptor registry (operator or function
/// definitions are read-only once the owning rule is in use).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("registry is sealed after first use")]
    Sealed,

    #[error("duplicate definition '{0}'")]
    Duplicate(String),
}
