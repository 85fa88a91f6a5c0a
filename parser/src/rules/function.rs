//! FILENAME: parser/src/rules/function.rs
//! PURPOSE: Function-call lexing, lookup, and call-node construction.
//! CONTEXT: The function rule owns four token kinds: the name, the call
//! parenthesis pair, and the argument separator. A `(` becomes a CallOpen
//! only when it directly follows one of this rule's names, and `,`/`)`
//! become ArgSep/CallClose only when the innermost unclosed opener is this
//! rule's CallOpen, so grouping parentheses stay with the operator rule.
//! Name lookup is indexed lazily; the first lookup seals registration.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::builder::TreeBuilder;
use crate::error::{BuildError, CalcError, RegistryError};
use crate::expr::Expr;
use crate::rules::{LexerRule, ScanOutcome};
use crate::session::ParseSession;
use crate::token::{RuleId, Token, TokenKind};
use crate::value::Value;

/// A callable function definition.
#[derive(Debug)]
pub struct FunctionDef {
    pub name: String,
    /// Optional alias resolving to the same definition, for localized
    /// catalogs. Synthesis always renders the canonical name.
    pub localized_name: Option<String>,
    pub min_args: usize,
    pub max_args: usize,
    /// Volatile functions (NOW, TODAY) may return a different value on
    /// every call; `Expr::is_const` reports false for trees containing one.
    pub volatile: bool,
    pub apply: fn(&[Value]) -> Result<Value, CalcError>,
}

impl FunctionDef {
    pub fn new(
        name: impl Into<String>,
        min_args: usize,
        max_args: usize,
        apply: fn(&[Value]) -> Result<Value, CalcError>,
    ) -> Self {
        FunctionDef {
            name: name.into(),
            localized_name: None,
            min_args,
            max_args,
            volatile: false,
            apply,
        }
    }

    pub fn volatile(mut self) -> Self {
        self.volatile = true;
        self
    }

    pub fn localized(mut self, name: impl Into<String>) -> Self {
        self.localized_name = Some(name.into());
        self
    }
}

/// Lexer rule for function calls.
#[derive(Debug)]
pub struct FunctionRule {
    defs: Vec<Arc<FunctionDef>>,
    case_sensitive: bool,
    extra_name_chars: String,
    invalid_first_chars: String,
    arg_separator: char,
    index: OnceLock<HashMap<String, Arc<FunctionDef>>>,
}

impl Default for FunctionRule {
    fn default() -> Self {
        FunctionRule {
            defs: Vec::new(),
            case_sensitive: false,
            extra_name_chars: "_".to_string(),
            invalid_first_chars: "0123456789".to_string(),
            arg_separator: ',',
            index: OnceLock::new(),
        }
    }
}

impl FunctionRule {
    pub fn new() -> Self {
        FunctionRule::default()
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    pub fn with_arg_separator(mut self, sep: char) -> Self {
        self.arg_separator = sep;
        self
    }

    pub fn with_extra_name_chars(mut self, chars: impl Into<String>) -> Self {
        self.extra_name_chars = chars.into();
        self
    }

    pub fn arg_separator(&self) -> char {
        self.arg_separator
    }

    /// Registers a definition. Fails once any lookup has built the name
    /// index, and on a name (or alias) collision.
    pub fn register(&mut self, def: FunctionDef) -> Result<(), RegistryError> {
        if self.index.get().is_some() {
            return Err(RegistryError::Sealed);
        }
        let key = self.canonical(&def.name);
        if self.contains_key(&key) {
            return Err(RegistryError::Duplicate(def.name));
        }
        if let Some(alias) = &def.localized_name {
            let alias_key = self.canonical(alias);
            if alias_key != key && self.contains_key(&alias_key) {
                return Err(RegistryError::Duplicate(alias.clone()));
            }
        }
        self.defs.push(Arc::new(def));
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<FunctionDef>> {
        self.index().get(&self.canonical(name)).cloned()
    }

    fn index(&self) -> &HashMap<String, Arc<FunctionDef>> {
        self.index.get_or_init(|| {
            let mut map = HashMap::new();
            for def in &self.defs {
                map.insert(self.canonical(&def.name), def.clone());
                if let Some(alias) = &def.localized_name {
                    map.insert(self.canonical(alias), def.clone());
                }
            }
            map
        })
    }

    fn contains_key(&self, key: &str) -> bool {
        self.defs.iter().any(|d| {
            self.canonical(&d.name) == key
                || d.localized_name
                    .as_deref()
                    .is_some_and(|a| self.canonical(a) == key)
        })
    }

    fn canonical(&self, name: &str) -> String {
        if self.case_sensitive {
            name.to_string()
        } else {
            name.to_uppercase()
        }
    }

    fn is_name_char(&self, c: char) -> bool {
        c.is_alphabetic() || c.is_ascii_digit() || self.extra_name_chars.contains(c)
    }

    /// The innermost unclosed opening token, if any.
    fn enclosing_open<'t>(&self, session: &'t ParseSession) -> Option<&'t Token> {
        let mut depth = 0usize;
        for t in session.tokens().iter().rev() {
            match t.kind {
                TokenKind::CloseParen | TokenKind::CallClose => depth += 1,
                TokenKind::OpenParen | TokenKind::CallOpen => {
                    if depth == 0 {
                        return Some(t);
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        None
    }

    fn owns_enclosing_open(&self, session: &ParseSession, rule: RuleId) -> bool {
        self.enclosing_open(session)
            .is_some_and(|t| t.kind == TokenKind::CallOpen && t.rule == rule)
    }
}

impl LexerRule for FunctionRule {
    fn scan(&self, session: &mut ParseSession, rule: RuleId) -> ScanOutcome {
        let rest = session.rest();
        let Some(ch) = rest.chars().next() else {
            return ScanOutcome::NoMatch;
        };
        let start = session.pos();

        if self.is_name_char(ch) && !self.invalid_first_chars.contains(ch) {
            let len: usize = rest
                .chars()
                .take_while(|&c| self.is_name_char(c))
                .map(char::len_utf8)
                .sum();
            session.push_token(Token::new(rule, TokenKind::FuncName, start, len));
            session.advance_to(start + len);
            return ScanOutcome::Match;
        }

        let kind = if ch == '(' {
            // Only a call-open when it follows one of our names; grouping
            // parentheses belong to the operator rule.
            let after_name = session
                .tokens()
                .iter()
                .rev()
                .find(|t| !t.kind.is_trivia())
                .is_some_and(|t| t.kind == TokenKind::FuncName && t.rule == rule);
            if !after_name {
                return ScanOutcome::NoMatch;
            }
            TokenKind::CallOpen
        } else if ch == self.arg_separator && self.owns_enclosing_open(session, rule) {
            TokenKind::ArgSep
        } else if ch == ')' && self.owns_enclosing_open(session, rule) {
            TokenKind::CallClose
        } else {
            return ScanOutcome::NoMatch;
        };

        let len = ch.len_utf8();
        session.push_token(Token::new(rule, kind, start, len));
        session.advance_to(start + len);
        ScanOutcome::Match
    }

    fn build(&self, builder: &mut TreeBuilder<'_>, left: Option<Expr>) -> Result<Expr, BuildError> {
        let token = builder.bump().ok_or(BuildError::Empty)?;
        if left.is_some() {
            return Err(BuildError::MissingOperator(token.start));
        }
        if token.kind != TokenKind::FuncName {
            // Call punctuation is consumed by the name's build; a stray
            // one here means the stream was assembled by hand.
            return Err(BuildError::MissingOperator(token.start));
        }

        let name = token.text(builder.source()).to_string();
        let def = self
            .lookup(&name)
            .ok_or_else(|| BuildError::UnknownFunction(name.clone()))?;

        builder.skip_trivia();
        let open_start = match builder.peek() {
            Some(t) if t.kind == TokenKind::CallOpen => {
                let start = t.start;
                builder.bump();
                start
            }
            _ => return Err(BuildError::MissingArgumentList(name)),
        };

        let mut args = Vec::new();
        builder.skip_trivia();
        if matches!(builder.peek(), Some(t) if t.kind == TokenKind::CallClose) {
            builder.bump();
        } else {
            loop {
                let arg =
                    builder.sub_expression(&[TokenKind::ArgSep, TokenKind::CallClose])?;
                args.push(arg);
                builder.skip_trivia();
                match builder.peek().map(|t| t.kind) {
                    Some(TokenKind::ArgSep) => {
                        builder.bump();
                    }
                    Some(TokenKind::CallClose) => {
                        builder.bump();
                        break;
                    }
                    _ => return Err(BuildError::UnmatchedParen(open_start)),
                }
            }
        }

        if args.len() < def.min_args || args.len() > def.max_args {
            return Err(BuildError::ArityMismatch {
                name: def.name.clone(),
                min: def.min_args,
                max: def.max_args,
                got: args.len(),
            });
        }
        Ok(Expr::Call {
            def,
            args,
            separator: self.arg_separator,
        })
    }
}
