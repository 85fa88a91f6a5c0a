//! FILENAME: parser/src/rules/operator.rs
//! PURPOSE: Operators, parentheses, and precedence by tree rotation.
//! CONTEXT: Pass 2 runs left to right with no grammar-level precedence
//! climbing; instead `combine` rotates the tree locally whenever an
//! incoming operator binds tighter than the one at the root of the
//! accumulated left side. Explicit parenthesis groups become `Expr::Paren`
//! nodes, which rotation never descends into.

use std::sync::Arc;

use crate::arith;
use crate::builder::TreeBuilder;
use crate::error::{BuildError, CalcError, RegistryError};
use crate::expr::Expr;
use crate::rules::{LexerRule, ScanOutcome};
use crate::session::ParseSession;
use crate::token::{RuleId, Token, TokenKind};
use crate::value::Value;

/// High bit of the token aux payload flags a unary-only match.
const UNARY_FLAG: u32 = 0x8000_0000;

/// A binary operator definition. Higher priority binds tighter.
#[derive(Debug)]
pub struct BinaryOpDef {
    pub text: String,
    pub priority: u8,
    pub apply: fn(&Value, &Value) -> Result<Value, CalcError>,
}

impl BinaryOpDef {
    pub fn new(
        text: impl Into<String>,
        priority: u8,
        apply: fn(&Value, &Value) -> Result<Value, CalcError>,
    ) -> Self {
        BinaryOpDef {
            text: text.into(),
            priority,
            apply,
        }
    }
}

/// A prefix operator definition. Unary operators bind tighter than any
/// binary operator: they consume exactly one operand unit.
#[derive(Debug)]
pub struct UnaryOpDef {
    pub text: String,
    pub apply: fn(&Value) -> Result<Value, CalcError>,
}

impl UnaryOpDef {
    pub fn new(text: impl Into<String>, apply: fn(&Value) -> Result<Value, CalcError>) -> Self {
        UnaryOpDef {
            text: text.into(),
            apply,
        }
    }
}

/// Lexer rule for operator symbols and parentheses.
///
/// Definitions are matched in registration order, so multi-character
/// operators must be registered before their single-character prefixes
/// (`<=` before `<`). Registration requires `&mut self`; once the rule is
/// handed to a `RuleSet` the definitions are frozen by ownership.
#[derive(Debug, Default)]
pub struct OperatorRule {
    binary: Vec<Arc<BinaryOpDef>>,
    unary: Vec<Arc<UnaryOpDef>>,
}

impl OperatorRule {
    pub fn new() -> Self {
        OperatorRule::default()
    }

    /// The spreadsheet-style catalog: comparisons, concatenation,
    /// additive, multiplicative, exponent, and sign operators.
    pub fn standard() -> Self {
        let binary = [
            BinaryOpDef::new("<=", 1, arith::less_equal),
            BinaryOpDef::new(">=", 1, arith::greater_equal),
            BinaryOpDef::new("<>", 1, arith::not_equal),
            BinaryOpDef::new("=", 1, arith::equal),
            BinaryOpDef::new("<", 1, arith::less_than),
            BinaryOpDef::new(">", 1, arith::greater_than),
            BinaryOpDef::new("&", 2, arith::concat),
            BinaryOpDef::new("+", 3, arith::add),
            BinaryOpDef::new("-", 3, arith::subtract),
            BinaryOpDef::new("*", 4, arith::multiply),
            BinaryOpDef::new("/", 4, arith::divide),
            BinaryOpDef::new("^", 5, arith::power),
        ];
        let unary = [
            UnaryOpDef::new("-", arith::negate),
            UnaryOpDef::new("+", arith::identity),
        ];
        OperatorRule {
            binary: binary.into_iter().map(Arc::new).collect(),
            unary: unary.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn register_binary(
        &mut self,
        text: impl Into<String>,
        priority: u8,
        apply: fn(&Value, &Value) -> Result<Value, CalcError>,
    ) -> Result<(), RegistryError> {
        let text = text.into();
        if self.binary.iter().any(|d| d.text == text) {
            return Err(RegistryError::Duplicate(text));
        }
        self.binary.push(Arc::new(BinaryOpDef::new(text, priority, apply)));
        Ok(())
    }

    pub fn register_unary(
        &mut self,
        text: impl Into<String>,
        apply: fn(&Value) -> Result<Value, CalcError>,
    ) -> Result<(), RegistryError> {
        let text = text.into();
        if self.unary.iter().any(|d| d.text == text) {
            return Err(RegistryError::Duplicate(text));
        }
        self.unary.push(Arc::new(UnaryOpDef::new(text, apply)));
        Ok(())
    }

    fn unary_def(&self, text: &str) -> Option<Arc<UnaryOpDef>> {
        self.unary.iter().find(|d| d.text == text).cloned()
    }
}

impl LexerRule for OperatorRule {
    fn scan(&self, session: &mut ParseSession, rule: RuleId) -> ScanOutcome {
        let rest = session.rest();
        let Some(ch) = rest.chars().next() else {
            return ScanOutcome::NoMatch;
        };
        let start = session.pos();

        if ch == '(' || ch == ')' {
            let kind = if ch == '(' {
                TokenKind::OpenParen
            } else {
                TokenKind::CloseParen
            };
            session.push_token(Token::new(rule, kind, start, 1));
            session.advance_to(start + 1);
            return ScanOutcome::Match;
        }

        for (i, def) in self.binary.iter().enumerate() {
            if rest.starts_with(def.text.as_str()) {
                let len = def.text.len();
                session.push_token(
                    Token::new(rule, TokenKind::Operator, start, len).with_aux(i as u32),
                );
                session.advance_to(start + len);
                return ScanOutcome::Match;
            }
        }
        for (i, def) in self.unary.iter().enumerate() {
            if rest.starts_with(def.text.as_str()) {
                let len = def.text.len();
                session.push_token(
                    Token::new(rule, TokenKind::Operator, start, len)
                        .with_aux(UNARY_FLAG | i as u32),
                );
                session.advance_to(start + len);
                return ScanOutcome::Match;
            }
        }
        ScanOutcome::NoMatch
    }

    fn build(&self, builder: &mut TreeBuilder<'_>, left: Option<Expr>) -> Result<Expr, BuildError> {
        let token = builder.bump().ok_or(BuildError::Empty)?;
        match token.kind {
            TokenKind::OpenParen => {
                if left.is_some() {
                    return Err(BuildError::MissingOperator(token.start));
                }
                let inner = builder.sub_expression(&[TokenKind::CloseParen])?;
                builder.skip_trivia();
                match builder.peek() {
                    Some(t) if t.kind == TokenKind::CloseParen => {
                        builder.bump();
                    }
                    _ => return Err(BuildError::UnmatchedParen(token.start)),
                }
                Ok(Expr::Paren(Box::new(inner)))
            }
            TokenKind::CloseParen => Err(BuildError::UnmatchedParen(token.start)),
            TokenKind::Operator => {
                let text = token.text(builder.source()).to_string();
                match left {
                    None => {
                        let def = self
                            .unary_def(&text)
                            .ok_or(BuildError::NotUnary(text))?;
                        let operand = builder.operand()?;
                        Ok(Expr::Unary {
                            op: def,
                            operand: Box::new(operand),
                        })
                    }
                    Some(left) => {
                        let def = match token.aux {
                            Some(aux) if aux & UNARY_FLAG == 0 => {
                                self.binary.get(aux as usize).cloned()
                            }
                            _ => None,
                        }
                        .ok_or(BuildError::NotBinary(text))?;
                        let right = builder.operand()?;
                        Ok(combine(left, def, right))
                    }
                }
            }
            _ => Err(BuildError::MissingOperator(token.start)),
        }
    }
}

/// Joins an accumulated left side with an incoming operator and operand.
///
/// When the incoming operator binds tighter than the root of `left`, the
/// join descends into `left`'s right spine (a rotation), which yields the
/// same shape precedence climbing would have produced. Equal priorities
/// do not rotate, so operators of one level stay left-associative.
pub(crate) fn combine(left: Expr, op: Arc<BinaryOpDef>, right: Expr) -> Expr {
    if let Expr::Binary {
        op: left_op,
        left: ll,
        right: lr,
    } = left
    {
        if op.priority > left_op.priority {
            return Expr::Binary {
                op: left_op,
                left: ll,
                right: Box::new(combine(*lr, op, right)),
            };
        }
        return Expr::Binary {
            op,
            left: Box::new(Expr::Binary {
                op: left_op,
                left: ll,
                right: lr,
            }),
            right: Box::new(right),
        };
    }
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}
