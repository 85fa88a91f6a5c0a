//! FILENAME: parser/src/builder.rs
//! PURPOSE: Pass 2 driver: walks the token stream and assembles the tree.
//! CONTEXT: The builder iterates tokens left to right, dispatching each
//! non-trivia token to its producing rule via the `RuleId` stamp. Rules
//! call back into `sub_expression`/`operand` for their nested content, so
//! recursion depth tracks source nesting and is capped by the rule set's
//! configured limit.

use std::rc::Rc;
use std::sync::Arc;

use crate::error::BuildError;
use crate::expr::{Expr, ExprId};
use crate::intern::InternPool;
use crate::rules::LexerRule;
use crate::session::ParseSession;
use crate::token::{Token, TokenKind};
use crate::value::Value;

pub struct TreeBuilder<'a> {
    session: &'a mut ParseSession,
    rules: &'a [Arc<dyn LexerRule>],
    pool: &'a mut InternPool,
    index: usize,
    depth: usize,
    max_depth: usize,
    next_id: u32,
}

impl<'a> TreeBuilder<'a> {
    pub(crate) fn new(
        session: &'a mut ParseSession,
        rules: &'a [Arc<dyn LexerRule>],
        pool: &'a mut InternPool,
        max_depth: usize,
    ) -> Self {
        TreeBuilder {
            session,
            rules,
            pool,
            index: 0,
            depth: 0,
            max_depth,
            next_id: 0,
        }
    }

    /// Builds the whole stream into one expression.
    pub(crate) fn build(&mut self) -> Result<Expr, BuildError> {
        if !self.session.tokens().iter().any(|t| !t.kind.is_trivia()) {
            return Err(BuildError::Empty);
        }
        let expr = self.sub_expression(&[])?;
        self.skip_trivia();
        if self.peek().is_some() {
            return Err(BuildError::TrailingTokens(self.current_offset()));
        }
        Ok(expr)
    }

    /// Parses a run of tokens up to (not including) a stop kind or the end
    /// of the stream, threading the accumulated expression through each
    /// rule as its `left` context.
    pub fn sub_expression(&mut self, stop: &[TokenKind]) -> Result<Expr, BuildError> {
        self.enter()?;
        let mut left: Option<Expr> = None;
        loop {
            self.skip_trivia();
            let Some(token) = self.peek() else { break };
            if stop.contains(&token.kind) {
                break;
            }
            let token_index = self.index;
            let rule = self.rule_for(token)?;
            let before = self.index;
            let expr = rule.build(self, left.take())?;
            if self.index == before {
                // A rule that consumes nothing would loop forever
                return Err(BuildError::UnknownRule(self.current_offset()));
            }
            self.record_node(token_index);
            left = Some(expr);
        }
        self.leave();
        left.ok_or(BuildError::MissingOperand(self.current_offset()))
    }

    /// Parses exactly one operand unit: a literal, a parenthesized group,
    /// a function call, or a unary operator applied to one of those.
    pub fn operand(&mut self) -> Result<Expr, BuildError> {
        self.enter()?;
        self.skip_trivia();
        let Some(token) = self.peek() else {
            return Err(BuildError::MissingOperand(self.current_offset()));
        };
        if matches!(
            token.kind,
            TokenKind::CloseParen | TokenKind::ArgSep | TokenKind::CallClose
        ) {
            return Err(BuildError::MissingOperand(self.current_offset()));
        }
        let token_index = self.index;
        let rule = self.rule_for(token)?;
        let expr = rule.build(self, None)?;
        self.record_node(token_index);
        self.leave();
        Ok(expr)
    }

    /// The current token, trivia included.
    pub fn peek(&self) -> Option<&Token> {
        self.session.tokens().get(self.index)
    }

    /// Consumes and returns the current token.
    pub fn bump(&mut self) -> Option<Token> {
        let token = self.session.tokens().get(self.index).cloned()?;
        self.index += 1;
        Some(token)
    }

    pub fn skip_trivia(&mut self) {
        while matches!(self.peek(), Some(t) if t.kind.is_trivia()) {
            self.index += 1;
        }
    }

    pub fn source(&self) -> &str {
        self.session.source()
    }

    /// Byte offset of the current token, or the end of the source when the
    /// stream is exhausted.
    pub fn current_offset(&self) -> usize {
        self.peek()
            .map(|t| t.start)
            .unwrap_or_else(|| self.session.source_len())
    }

    /// Per-parse values installed on the session before parsing.
    pub fn user_data(&self, key: &str) -> Option<&Value> {
        self.session.user_data(key)
    }

    /// Interns a constant leaf through the active pool.
    pub fn intern(&mut self, value: Value) -> Rc<Value> {
        self.pool.intern(value)
    }

    pub(crate) fn current_index(&self) -> usize {
        self.index
    }

    pub(crate) fn session_mut(&mut self) -> &mut ParseSession {
        self.session
    }

    fn rule_for(&self, token: &Token) -> Result<Arc<dyn LexerRule>, BuildError> {
        self.rules
            .get(token.rule.index())
            .cloned()
            .ok_or(BuildError::UnknownRule(token.start))
    }

    /// Assigns the next node id and maps the dispatched token to it.
    fn record_node(&mut self, token_index: usize) {
        let id = ExprId(self.next_id);
        self.next_id += 1;
        self.session.map_token(token_index, id);
    }

    fn enter(&mut self) -> Result<(), BuildError> {
        if self.depth >= self.max_depth {
            return Err(BuildError::TooDeep(self.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}
