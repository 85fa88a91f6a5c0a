//! FILENAME: parser/src/rules/mod.rs
//! PURPOSE: The lexer-rule trait and the bundled rule implementations.
//! CONTEXT: A rule owns both halves of its token lifecycle: `scan`
//! recognizes text during pass 1, and `build` turns the tokens it produced
//! into expression nodes during pass 2. The rule set dispatches pass 2
//! tokens back to their producing rule through the `RuleId` stamped on
//! each token, so third-party rules plug in without touching the core.

pub mod function;
pub mod number;
pub mod operator;
pub mod string;
pub mod trivia;

pub use function::{FunctionDef, FunctionRule};
pub use number::NumberRule;
pub use operator::{BinaryOpDef, OperatorRule, UnaryOpDef};
pub use string::StringRule;
pub use trivia::{LineCommentRule, NewlineRule, SpaceRule};

use crate::builder::TreeBuilder;
use crate::error::BuildError;
use crate::expr::Expr;
use crate::session::ParseSession;
use crate::token::RuleId;

/// Result of one `scan` attempt at the current session position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The rule recognized text, pushed one or more committed tokens, and
    /// advanced the session position past them.
    Match,
    /// The rule saw a plausible but incomplete match. It staged tokens via
    /// `push_suspected` and did NOT advance; the rule set commits the first
    /// suspecting rule's batch only if no later rule fully matches.
    Suspect,
    /// The rule does not apply here; session untouched.
    NoMatch,
}

/// A pluggable tokenizer-and-builder unit.
///
/// `rule` is the id the rule set assigned at registration; implementations
/// stamp it on every token they produce so `build` gets dispatched back to
/// them.
pub trait LexerRule: Send + Sync {
    fn scan(&self, session: &mut ParseSession, rule: RuleId) -> ScanOutcome;

    /// Consumes the current token (and any tokens that structurally belong
    /// to it) from the builder and returns the resulting node. `left` is
    /// the expression accumulated so far in the enclosing run, if any;
    /// rules producing operand tokens must reject a present `left`.
    fn build(&self, builder: &mut TreeBuilder<'_>, left: Option<Expr>) -> Result<Expr, BuildError>;
}
