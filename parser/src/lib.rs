//! FILENAME: parser/src/lib.rs
//! PURPOSE: Library root for the two-pass expression parser.
//! CONTEXT: This crate converts source text into evaluatable expression
//! trees in two passes, both driven by a pluggable rule registry.
//!
//! PIPELINE: Source String --> RuleSet::parse --> Tokens --> create_expression --> Expr --> calc
//!
//! SUPPORTED FEATURES:
//! - Pluggable lexer rules; each rule also builds its own tokens into nodes
//! - Arithmetic: +, -, *, /, ^ (power), with a typed coercion ladder
//! - Comparison: =, <>, <, >, <=, >=
//! - String concatenation: &
//! - Function calls with arity checking and localized aliases
//! - Parentheses for grouping, unary sign operators
//! - Position-annotated tokens with severity-tagged reports
//! - Constant-leaf interning for batch parsing
//! - Source synthesis: `Expr::synthesize` round-trips through the parser

pub mod arith;
pub mod builder;
pub mod error;
pub mod expr;
pub mod intern;
pub mod rules;
pub mod ruleset;
pub mod session;
pub mod token;
pub mod value;

// Register the separate tests module
#[cfg(test)]
mod tests;

// Re-export commonly used types for convenience
pub use builder::TreeBuilder;
pub use error::{BuildError, CalcError, RegistryError, SessionError};
pub use expr::{Expr, ExprId};
pub use intern::InternPool;
pub use rules::{
    BinaryOpDef, FunctionDef, FunctionRule, LexerRule, LineCommentRule, NewlineRule, NumberRule,
    OperatorRule, ScanOutcome, SpaceRule, StringRule, UnaryOpDef,
};
pub use ruleset::{RuleSet, DEFAULT_MAX_DEPTH};
pub use session::{ParseSession, ReportEntry, SessionState};
pub use token::{Report, ReportCode, RuleId, Severity, Token, TokenKind};
pub use value::Value;
