//! FILENAME: parser/src/expr.rs
//! PURPOSE: The expression tree: node types, evaluation, synthesis.
//! CONTEXT: Pass 2 output. Every node can evaluate itself (`calc`), report
//! whether repeated evaluation yields the same value (`is_const`), and
//! render itself back to parseable source text (`synthesize`). Constant
//! leaves are `Rc<Value>` so an `InternPool` can share them across trees
//! built in the same batch.

use std::rc::Rc;
use std::sync::Arc;

use crate::error::CalcError;
use crate::rules::function::FunctionDef;
use crate::rules::operator::{BinaryOpDef, UnaryOpDef};
use crate::value::Value;

/// Creation-order id of an expression node within one build. Recorded in
/// the session's token map so callers can correlate tokens with nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct ExprId(pub(crate) u32);

impl ExprId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// A node in the expression tree.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A constant leaf (number literal, or any pre-computed value).
    Const(Rc<Value>),
    /// A string literal. The quote character is kept so synthesis escapes
    /// with the same separator the source used.
    Text { value: String, quote: char },
    Unary {
        op: Arc<UnaryOpDef>,
        operand: Box<Expr>,
    },
    Binary {
        op: Arc<BinaryOpDef>,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// An explicit parenthesized group, kept as a node so synthesis
    /// reproduces the source's grouping.
    Paren(Box<Expr>),
    Call {
        def: Arc<FunctionDef>,
        args: Vec<Expr>,
        separator: char,
    },
}

impl Expr {
    /// Evaluates the tree bottom-up.
    pub fn calc(&self) -> Result<Value, CalcError> {
        match self {
            Expr::Const(v) => Ok((**v).clone()),
            Expr::Text { value, .. } => Ok(Value::Text(value.clone())),
            Expr::Unary { op, operand } => {
                let v = operand.calc()?;
                (op.apply)(&v)
            }
            Expr::Binary { op, left, right } => {
                let l = left.calc()?;
                let r = right.calc()?;
                (op.apply)(&l, &r)
            }
            Expr::Paren(inner) => inner.calc(),
            Expr::Call { def, args, .. } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(arg.calc()?);
                }
                (def.apply)(&values)
            }
        }
    }

    /// True if every evaluation of this tree yields the same value. Calls
    /// to volatile functions (NOW, TODAY) poison the whole subtree.
    pub fn is_const(&self) -> bool {
        match self {
            Expr::Const(_) | Expr::Text { .. } => true,
            Expr::Unary { operand, .. } => operand.is_const(),
            Expr::Binary { left, right, .. } => left.is_const() && right.is_const(),
            Expr::Paren(inner) => inner.is_const(),
            Expr::Call { def, args, .. } => !def.volatile && args.iter().all(Expr::is_const),
        }
    }

    /// Direct children, left to right.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Const(_) | Expr::Text { .. } => Vec::new(),
            Expr::Unary { operand, .. } => vec![operand],
            Expr::Binary { left, right, .. } => vec![left, right],
            Expr::Paren(inner) => vec![inner],
            Expr::Call { args, .. } => args.iter().collect(),
        }
    }

    /// Renders the tree back to source text that re-parses to an
    /// equivalent tree. Parentheses are inserted wherever precedence
    /// would otherwise re-associate the result.
    pub fn synthesize(&self) -> String {
        let mut out = String::new();
        self.synth_into(&mut out);
        out
    }

    fn synth_into(&self, out: &mut String) {
        match self {
            Expr::Const(v) => out.push_str(&v.to_literal()),
            Expr::Text { value, quote } => {
                out.push(*quote);
                for ch in value.chars() {
                    if ch == *quote {
                        out.push(*quote);
                    }
                    out.push(ch);
                }
                out.push(*quote);
            }
            Expr::Unary { op, operand } => {
                out.push_str(&op.text);
                // Any compound operand gets grouped so the sign binds to
                // the whole of it on re-parse.
                if operand.is_primary() {
                    operand.synth_into(out);
                } else {
                    out.push('(');
                    operand.synth_into(out);
                    out.push(')');
                }
            }
            Expr::Binary { op, left, right } => {
                Self::synth_child(left, op.priority, false, out);
                out.push_str(&op.text);
                Self::synth_child(right, op.priority, true, out);
            }
            Expr::Paren(inner) => {
                out.push('(');
                inner.synth_into(out);
                out.push(')');
            }
            Expr::Call { def, args, separator } => {
                out.push_str(&def.name);
                out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push(*separator);
                    }
                    arg.synth_into(out);
                }
                out.push(')');
            }
        }
    }

    /// A binary child needs grouping when its operator binds looser than
    /// the parent, or equally on the right-hand side (left associativity).
    /// Unary children are always grouped so the sign reads unambiguously
    /// next to the parent operator.
    fn synth_child(child: &Expr, parent_priority: u8, is_right: bool, out: &mut String) {
        let needs_parens = match child {
            Expr::Binary { op, .. } => {
                op.priority < parent_priority || (is_right && op.priority == parent_priority)
            }
            Expr::Unary { .. } => true,
            _ => false,
        };
        if needs_parens {
            out.push('(');
            child.synth_into(out);
            out.push(')');
        } else {
            child.synth_into(out);
        }
    }

    fn is_primary(&self) -> bool {
        matches!(
            self,
            Expr::Const(_) | Expr::Text { .. } | Expr::Paren(_) | Expr::Call { .. }
        )
    }
}
