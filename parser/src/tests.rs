//! FILENAME: parser/src/tests.rs
//! PURPOSE: Consolidated unit tests for the parser crate.

use std::cmp::Ordering;
use std::rc::Rc;

use chrono::{Duration, NaiveDate};

use crate::arith;
use crate::builder::TreeBuilder;
use crate::error::{BuildError, CalcError, RegistryError, SessionError};
use crate::expr::Expr;
use crate::intern::InternPool;
use crate::rules::{
    FunctionDef, FunctionRule, LexerRule, LineCommentRule, NewlineRule, NumberRule, OperatorRule,
    ScanOutcome, SpaceRule, StringRule,
};
use crate::ruleset::RuleSet;
use crate::session::{ParseSession, SessionState};
use crate::token::{ReportCode, RuleId, Severity, Token, TokenKind};
use crate::value::{datetime_to_oa, oa_to_datetime, Value};

// ========================================
// TEST HELPERS
// ========================================

fn test_functions() -> FunctionRule {
    let mut rule = FunctionRule::new();
    rule.register(FunctionDef::new("SUM", 1, usize::MAX, |args| {
        args.iter()
            .try_fold(Value::Int(0), |acc, v| arith::add(&acc, v))
    }))
    .unwrap();
    rule.register(FunctionDef::new("PI", 0, 0, |_| {
        Ok(Value::Double(std::f64::consts::PI))
    }))
    .unwrap();
    rule.register(FunctionDef::new("IF", 2, 3, |args| {
        let cond = args[0].as_bool().unwrap_or(false);
        if cond {
            Ok(args[1].clone())
        } else {
            Ok(args.get(2).cloned().unwrap_or(Value::Null))
        }
    }))
    .unwrap();
    rule.register(
        FunctionDef::new("NOW", 0, 0, |_| Ok(Value::Int(0))).volatile(),
    )
    .unwrap();
    rule
}

fn standard_rules() -> RuleSet {
    let mut set = RuleSet::new();
    set.register(SpaceRule);
    set.register(NewlineRule);
    set.register(LineCommentRule::default());
    set.register(test_functions());
    set.register(StringRule::default());
    set.register(NumberRule::default());
    set.register(OperatorRule::standard());
    set
}

fn parse_session(set: &RuleSet, source: &str) -> ParseSession {
    let mut session = ParseSession::new(source);
    set.parse(&mut session).unwrap();
    session
}

fn build(source: &str) -> Result<Expr, BuildError> {
    standard_rules().parse_to_expression(source)
}

fn eval(source: &str) -> Value {
    build(source).unwrap().calc().unwrap()
}

// ========================================
// PASS 1: TOKENIZATION
// ========================================

#[test]
fn tokens_cover_source_contiguously() {
    let set = standard_rules();
    let session = parse_session(&set, "1 + SUM(2, 3) * \"x\"");
    let mut expected = 0;
    for token in session.tokens() {
        assert_eq!(token.start, expected);
        expected = token.end();
    }
    assert_eq!(expected, session.source_len());
    assert!(session.reports().is_empty());
}

#[test]
fn number_then_name_splits_at_longest_parse() {
    let set = standard_rules();
    let session = parse_session(&set, "12.5x");
    let kinds: Vec<TokenKind> = session.tokens().iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![TokenKind::Number, TokenKind::FuncName]);
    assert_eq!(session.tokens()[0].text(session.source()), "12.5");
    assert_eq!(session.tokens()[1].text(session.source()), "x");
}

#[test]
fn call_punctuation_is_owned_by_the_function_rule() {
    let set = standard_rules();
    let session = parse_session(&set, "SUM(1, (2))");
    let kinds: Vec<TokenKind> = session
        .tokens()
        .iter()
        .filter(|t| !t.kind.is_trivia())
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::FuncName,
            TokenKind::CallOpen,
            TokenKind::Number,
            TokenKind::ArgSep,
            TokenKind::OpenParen,
            TokenKind::Number,
            TokenKind::CloseParen,
            TokenKind::CallClose,
        ]
    );
}

#[test]
fn unknown_characters_coalesce_into_one_error_token() {
    let set = standard_rules();
    let session = parse_session(&set, "1 + ### + 2");
    let errors: Vec<&Token> = session
        .tokens()
        .iter()
        .filter(|t| t.kind == TokenKind::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].len, 3);
    assert_eq!(errors[0].rule, RuleId::FALLBACK);
    let reports = session.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].code, ReportCode::UnknownChar);
    assert_eq!(reports[0].severity, Severity::Error);
}

#[test]
fn multibyte_unknown_char_is_one_error_token() {
    let set = standard_rules();
    let session = parse_session(&set, "1+§");
    let errors: Vec<&Token> = session
        .tokens()
        .iter()
        .filter(|t| t.kind == TokenKind::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].len, '§'.len_utf8());
    assert_eq!(errors[0].end(), session.source_len());
}

#[test]
fn unterminated_string_is_an_error_token() {
    let set = standard_rules();
    let mut session = parse_session(&set, "1 & \"oops");
    assert!(session.has_error_tokens());
    let reports = session.reports();
    assert_eq!(reports[0].code, ReportCode::UnterminatedString);
    assert!(matches!(
        set.create_expression(&mut session),
        Err(BuildError::ErrorTokens)
    ));
}

#[test]
fn comment_runs_to_end_of_line() {
    let set = standard_rules();
    let session = parse_session(&set, "1+2// the rest\n+3");
    let comment = session
        .tokens()
        .iter()
        .find(|t| t.kind == TokenKind::Comment)
        .unwrap();
    assert_eq!(comment.text(session.source()), "// the rest");
    assert_eq!(eval("1+2// the rest\n+3"), Value::Int(6));
}

// ========================================
// SUSPECTED-TOKEN COMMIT
// ========================================

struct AbRule;

impl LexerRule for AbRule {
    fn scan(&self, session: &mut ParseSession, rule: RuleId) -> ScanOutcome {
        let rest = session.rest();
        let start = session.pos();
        if rest.starts_with("ab!") {
            session.push_token(Token::new(rule, TokenKind::Custom(7), start, 3));
            session.advance_to(start + 3);
            ScanOutcome::Match
        } else if rest.starts_with("ab") {
            session.push_suspected(Token::new(rule, TokenKind::Custom(7), start, 2));
            ScanOutcome::Suspect
        } else {
            ScanOutcome::NoMatch
        }
    }

    fn build(
        &self,
        builder: &mut TreeBuilder<'_>,
        _left: Option<Expr>,
    ) -> Result<Expr, BuildError> {
        builder.bump().ok_or(BuildError::Empty)?;
        Ok(Expr::Const(builder.intern(Value::Int(1))))
    }
}

#[test]
fn suspected_tokens_commit_when_nothing_else_matches() {
    let mut set = RuleSet::new();
    set.register(AbRule);
    let session = parse_session(&set, "ab!ab");
    let lens: Vec<usize> = session.tokens().iter().map(|t| t.len).collect();
    assert_eq!(lens, vec![3, 2]);
    assert!(!session.has_error_tokens());
}

struct StallRule;

impl LexerRule for StallRule {
    fn scan(&self, session: &mut ParseSession, rule: RuleId) -> ScanOutcome {
        session.push_suspected(Token::new(rule, TokenKind::Custom(9), session.pos(), 0));
        ScanOutcome::Suspect
    }

    fn build(
        &self,
        builder: &mut TreeBuilder<'_>,
        _left: Option<Expr>,
    ) -> Result<Expr, BuildError> {
        Err(BuildError::MissingOperator(builder.current_offset()))
    }
}

#[test]
fn zero_length_suspected_batch_advances_by_whole_chars() {
    let mut set = RuleSet::new();
    set.register(StallRule);
    // multi-byte source: a raw one-byte step would split a char and
    // panic on the next rest() slice
    let mut session = ParseSession::new("é§");
    set.parse(&mut session).unwrap();
    assert_eq!(session.pos(), session.source_len());
    // the uncovered bytes are flagged by the post-scan audit
    assert!(session.has_error_tokens());
}

// ========================================
// PASS 2: PRECEDENCE AND SHAPE
// ========================================

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(eval("1+2*3"), Value::Int(7));
    assert_eq!(eval("2*3+4*5"), Value::Int(26));
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(eval("(1+2)*3"), Value::Int(9));
}

#[test]
fn same_priority_is_left_associative() {
    assert_eq!(eval("10-3-2"), Value::Int(5));
    assert_eq!(eval("16/4/2"), Value::Int(2));
}

#[test]
fn exponent_binds_tightest() {
    assert_eq!(eval("1+2*3^2"), Value::Int(19));
}

#[test]
fn unary_sign_consumes_one_operand() {
    assert_eq!(eval("-5"), Value::Int(-5));
    assert_eq!(eval("-5+3"), Value::Int(-2));
    assert_eq!(eval("2*-3"), Value::Int(-6));
    assert_eq!(eval("+4"), Value::Int(4));
    assert_eq!(eval("-(1+2)"), Value::Int(-3));
}

#[test]
fn comparison_operators_evaluate_to_bool() {
    assert_eq!(eval("1<2"), Value::Bool(true));
    assert_eq!(eval("2<=2"), Value::Bool(true));
    assert_eq!(eval("1<>1"), Value::Bool(false));
    assert_eq!(eval("1+1=2"), Value::Bool(true));
}

#[test]
fn text_comparison_ignores_case() {
    assert_eq!(eval("\"abc\"=\"ABC\""), Value::Bool(true));
    assert_eq!(eval("\"a\"<\"B\""), Value::Bool(true));
}

#[test]
fn concatenation_coerces_to_text() {
    assert_eq!(eval("\"a\"&1"), Value::Text("a1".to_string()));
    assert_eq!(eval("1&2"), Value::Text("12".to_string()));
}

#[test]
fn string_literal_decodes_doubled_quotes() {
    assert_eq!(
        eval("\"He said \"\"hi\"\"\""),
        Value::Text("He said \"hi\"".to_string())
    );
}

#[test]
fn function_calls_evaluate() {
    assert_eq!(eval("SUM(1,2,3)"), Value::Int(6));
    assert_eq!(eval("SUM(1, 2*3, (4))"), Value::Int(11));
    assert_eq!(eval("IF(1<2, \"yes\", \"no\")"), Value::Text("yes".to_string()));
    assert_eq!(eval("PI()*0"), Value::Double(0.0));
}

#[test]
fn function_names_match_case_insensitively() {
    assert_eq!(eval("sum(1,2)"), Value::Int(3));
}

#[test]
fn token_map_records_node_per_dispatched_token() {
    let set = standard_rules();
    let mut session = parse_session(&set, "1+2");
    set.create_expression(&mut session).unwrap();
    assert_eq!(session.state(), SessionState::ExpressionCreated);
    // one entry each for the two numbers and the operator
    assert_eq!(session.token_map().len(), 3);
}

// ========================================
// PASS 2: STRUCTURAL ERRORS
// ========================================

#[test]
fn adjacent_operands_need_an_operator() {
    assert!(matches!(build("1 2"), Err(BuildError::MissingOperator(_))));
}

#[test]
fn trailing_operator_needs_an_operand() {
    assert!(matches!(build("1+"), Err(BuildError::MissingOperand(_))));
}

#[test]
fn unmatched_parens_are_rejected() {
    assert!(matches!(build("(1"), Err(BuildError::UnmatchedParen(_))));
    assert!(matches!(build(")1"), Err(BuildError::UnmatchedParen(_))));
    assert!(matches!(build("()"), Err(BuildError::MissingOperand(_))));
}

#[test]
fn empty_source_is_rejected() {
    assert!(matches!(build(""), Err(BuildError::Empty)));
    assert!(matches!(build("  "), Err(BuildError::Empty)));
}

#[test]
fn unknown_function_is_flagged_on_its_token() {
    let set = standard_rules();
    let mut session = parse_session(&set, "FOO(1)");
    let err = set.create_expression(&mut session).unwrap_err();
    assert_eq!(err, BuildError::UnknownFunction("FOO".to_string()));
    assert_eq!(session.state(), SessionState::Parsed);
    let reports = session.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].code, ReportCode::UnknownFunction);
    assert_eq!(reports[0].start, 0);
}

#[test]
fn arity_is_checked_against_the_definition() {
    let err = build("IF(1)").unwrap_err();
    assert_eq!(
        err,
        BuildError::ArityMismatch {
            name: "IF".to_string(),
            min: 2,
            max: 3,
            got: 1,
        }
    );
    assert!(matches!(build("PI(1)"), Err(BuildError::ArityMismatch { .. })));
}

#[test]
fn function_name_without_call_is_rejected() {
    assert!(matches!(
        build("SUM"),
        Err(BuildError::MissingArgumentList(_))
    ));
}

#[test]
fn empty_argument_slot_is_rejected() {
    assert!(matches!(build("SUM(1,)"), Err(BuildError::MissingOperand(_))));
    assert!(matches!(build("SUM(1,,2)"), Err(BuildError::MissingOperand(_))));
}

#[test]
fn nesting_depth_is_capped() {
    let mut set = standard_rules();
    set.set_max_depth(5);
    assert!(matches!(
        set.parse_to_expression("((((((1))))))"),
        Err(BuildError::TooDeep(5))
    ));
    assert!(set.parse_to_expression("((1))").is_ok());
}

// ========================================
// SESSION LIFECYCLE
// ========================================

#[test]
fn expression_before_parse_is_a_state_error() {
    let set = standard_rules();
    let mut session = ParseSession::new("1");
    let err = set.create_expression(&mut session).unwrap_err();
    assert_eq!(
        err,
        BuildError::Session(SessionError::InvalidState {
            expected: SessionState::Parsed,
            actual: SessionState::Init,
        })
    );
}

#[test]
fn parse_twice_is_a_state_error() {
    let set = standard_rules();
    let mut session = parse_session(&set, "1");
    assert!(set.parse(&mut session).is_err());
}

#[test]
fn reports_serialize_to_json() {
    let set = standard_rules();
    let session = parse_session(&set, "1 # 2");
    let json = serde_json::to_value(session.reports()).unwrap();
    assert_eq!(json[0]["code"], "UnknownChar");
    assert_eq!(json[0]["severity"], "Error");
}

// ========================================
// REPORT SEVERITY
// ========================================

#[test]
fn warning_reports_do_not_block_build() {
    let set = standard_rules();
    let mut session = parse_session(&set, "1+2");
    session
        .token_mut(0)
        .unwrap()
        .set_report(Severity::Warning, ReportCode::Other, "suspicious literal");
    assert!(!session.has_error_tokens());
    let expr = set.create_expression(&mut session).unwrap();
    assert_eq!(expr.calc().unwrap(), Value::Int(3));
    // the warning survives the build and stays visible in the reports
    assert_eq!(session.reports()[0].severity, Severity::Warning);
}

#[test]
fn report_severity_only_rises() {
    let mut token = Token::new(RuleId::FALLBACK, TokenKind::Error, 0, 1);
    token.set_report(Severity::Warning, ReportCode::Other, "first");
    token.set_report(Severity::Info, ReportCode::Other, "ignored");
    assert_eq!(token.severity(), Some(Severity::Warning));
    assert_eq!(token.report.as_ref().unwrap().message, "first");
    token.set_report(Severity::Error, ReportCode::UnknownChar, "raised");
    assert_eq!(token.severity(), Some(Severity::Error));
    assert_eq!(token.report.as_ref().unwrap().message, "raised");
}

// ========================================
// NUMBER RULE CONFIGURATION
// ========================================

#[test]
fn decimal_literals_when_enabled() {
    let mut set = RuleSet::new();
    set.register(NumberRule::default().with_decimal().without_double());
    set.register(OperatorRule::standard());
    let value = set.parse_to_expression("1.5").unwrap().calc().unwrap();
    assert_eq!(value, Value::Decimal("1.5".parse().unwrap()));
}

#[test]
fn custom_decimal_separator() {
    let mut set = RuleSet::new();
    set.register(NumberRule::default().with_decimal_separator(','));
    set.register(OperatorRule::standard());
    assert_eq!(
        set.parse_to_expression("1,5").unwrap().calc().unwrap(),
        Value::Double(1.5)
    );
}

#[test]
fn signed_literals_when_enabled() {
    let mut set = RuleSet::new();
    set.register(NumberRule::default().with_sign());
    set.register(OperatorRule::standard());
    assert_eq!(
        set.parse_to_expression("-3").unwrap().calc().unwrap(),
        Value::Int(-3)
    );
    // the cost of signed literals: 5-3 lexes as two literals
    assert!(matches!(
        set.parse_to_expression("5-3"),
        Err(BuildError::MissingOperator(_))
    ));
}

// ========================================
// REGISTRY SEALING
// ========================================

#[test]
fn duplicate_function_names_are_rejected() {
    let mut rule = FunctionRule::new();
    rule.register(FunctionDef::new("F", 0, 0, |_| Ok(Value::Null)))
        .unwrap();
    assert_eq!(
        rule.register(FunctionDef::new("f", 0, 0, |_| Ok(Value::Null))),
        Err(RegistryError::Duplicate("f".to_string()))
    );
}

#[test]
fn first_lookup_seals_the_function_registry() {
    let mut rule = FunctionRule::new();
    rule.register(FunctionDef::new("F", 0, 0, |_| Ok(Value::Null)))
        .unwrap();
    assert!(rule.lookup("F").is_some());
    assert_eq!(
        rule.register(FunctionDef::new("G", 0, 0, |_| Ok(Value::Null))),
        Err(RegistryError::Sealed)
    );
}

#[test]
fn localized_alias_resolves_to_the_same_definition() {
    let mut rule = FunctionRule::new();
    rule.register(
        FunctionDef::new("SUM", 1, usize::MAX, |_| Ok(Value::Null)).localized("SUMME"),
    )
    .unwrap();
    let a = rule.lookup("SUMME").unwrap();
    assert_eq!(a.name, "SUM");
}

// ========================================
// CONSTANT FOLDING AND VOLATILITY
// ========================================

#[test]
fn const_trees_report_const() {
    assert!(build("1+2*3").unwrap().is_const());
    assert!(build("SUM(1, \"a\"&\"b\")").unwrap().is_const());
}

#[test]
fn volatile_calls_poison_const_detection() {
    assert!(!build("NOW()").unwrap().is_const());
    assert!(!build("1+NOW()").unwrap().is_const());
}

// ========================================
// INTERNING
// ========================================

fn const_leaves(expr: &Expr, out: &mut Vec<Rc<Value>>) {
    if let Expr::Const(v) = expr {
        out.push(v.clone());
    }
    for child in expr.children() {
        const_leaves(child, out);
    }
}

#[test]
fn buffering_pool_shares_equal_constants() {
    let set = standard_rules();
    let mut pool = InternPool::new();
    pool.begin_buffering();

    let mut first = parse_session(&set, "5+5");
    let expr1 = set.create_expression_with(&mut first, &mut pool).unwrap();
    let mut second = parse_session(&set, "5*2");
    let expr2 = set.create_expression_with(&mut second, &mut pool).unwrap();

    let mut leaves = Vec::new();
    const_leaves(&expr1, &mut leaves);
    const_leaves(&expr2, &mut leaves);
    let fives: Vec<&Rc<Value>> = leaves
        .iter()
        .filter(|v| ***v == Value::Int(5))
        .collect();
    assert_eq!(fives.len(), 3);
    assert!(Rc::ptr_eq(fives[0], fives[1]));
    assert!(Rc::ptr_eq(fives[1], fives[2]));
    assert!(pool.buffered_count() >= 2);

    pool.end_buffering();
    assert!(!pool.is_buffering());
    assert_eq!(pool.buffered_count(), 0);
}

#[test]
fn buffering_scopes_nest() {
    let mut pool = InternPool::new();
    pool.begin_buffering();
    pool.begin_buffering();
    let a = pool.intern(Value::Int(9));
    pool.end_buffering();
    assert!(pool.is_buffering());
    let b = pool.intern(Value::Int(9));
    assert!(Rc::ptr_eq(&a, &b));
    pool.end_buffering();
    let c = pool.intern(Value::Int(9));
    assert!(!Rc::ptr_eq(&a, &c));
}

#[test]
fn unbuffered_interning_allocates_fresh() {
    let mut pool = InternPool::new();
    let a = pool.intern(Value::Int(1));
    let b = pool.intern(Value::Int(1));
    assert!(!Rc::ptr_eq(&a, &b));
}

// ========================================
// SYNTHESIS
// ========================================

#[test]
fn synthesize_round_trips_through_the_parser() {
    for source in [
        "1+2*3",
        "(1+2)*3",
        "-5+3",
        "2*-3",
        "10-3-2",
        "SUM(1,2*3,(4))",
        "\"He said \"\"hi\"\"\"&\"!\"",
        "1<2",
    ] {
        let expr = build(source).unwrap();
        let synthesized = expr.synthesize();
        let reparsed = build(&synthesized).unwrap();
        assert_eq!(
            expr.calc().unwrap(),
            reparsed.calc().unwrap(),
            "round trip changed the value of {source:?} (synthesized {synthesized:?})"
        );
    }
}

#[test]
fn synthesize_preserves_explicit_grouping() {
    assert_eq!(build("(1+2)*3").unwrap().synthesize(), "(1+2)*3");
    assert_eq!(build("1+2*3").unwrap().synthesize(), "1+2*3");
    assert_eq!(build("SUM(1, 2)").unwrap().synthesize(), "SUM(1,2)");
}

// ========================================
// COERCION LADDER
// ========================================

#[test]
fn int_arithmetic_stays_int_until_it_cannot() {
    assert_eq!(eval("2+3"), Value::Int(5));
    assert_eq!(eval("4/2"), Value::Int(2));
    assert_eq!(eval("1/2"), Value::Double(0.5));
    assert_eq!(eval("2^10"), Value::Int(1024));
}

#[test]
fn int_overflow_falls_back_to_double() {
    let max = i32::MAX;
    let result = arith::add(&Value::Int(max), &Value::Int(1)).unwrap();
    assert_eq!(result, Value::Double(f64::from(max) + 1.0));
}

#[test]
fn mixed_arithmetic_takes_the_wider_type() {
    assert_eq!(eval("1+2.5"), Value::Double(3.5));
    assert_eq!(
        arith::multiply(&Value::Int(2), &Value::Float(1.5)).unwrap(),
        Value::Float(3.0)
    );
}

#[test]
fn division_by_zero_is_an_error() {
    assert_eq!(build("1/0").unwrap().calc(), Err(CalcError::DivisionByZero));
    assert_eq!(
        build("1.5/0").unwrap().calc(),
        Err(CalcError::DivisionByZero)
    );
}

#[test]
fn numeric_text_participates_in_arithmetic() {
    assert_eq!(
        arith::add(&Value::Text("2".to_string()), &Value::Int(3)).unwrap(),
        Value::Double(5.0)
    );
    assert_eq!(
        arith::add(&Value::Text("a".to_string()), &Value::Int(3)).unwrap(),
        Value::Text("a3".to_string())
    );
}

#[test]
fn bools_behave_as_integers_in_arithmetic() {
    assert_eq!(
        arith::add(&Value::Bool(true), &Value::Bool(true)).unwrap(),
        Value::Int(2)
    );
}

#[test]
fn datetime_arithmetic_uses_day_units() {
    let date = NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let next = arith::add(&Value::DateTime(date), &Value::Int(1)).unwrap();
    assert_eq!(
        next,
        Value::DateTime(date + Duration::days(1))
    );
    let diff = arith::subtract(&Value::DateTime(date + Duration::days(3)), &Value::DateTime(date))
        .unwrap();
    assert_eq!(diff, Value::Duration(Duration::days(3)));
}

#[test]
fn ole_serial_conversion_round_trips() {
    let date = NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(datetime_to_oa(date), 43831.0);
    assert_eq!(oa_to_datetime(43831.0), date);
}

#[test]
fn comparisons_route_through_the_ladder() {
    assert_eq!(
        arith::compare(&Value::Int(2), &Value::Double(2.0)).unwrap(),
        Ordering::Equal
    );
    assert_eq!(
        arith::equal(&Value::Text("x".to_string()), &Value::Int(1)).unwrap(),
        Value::Bool(false)
    );
    assert!(arith::compare(&Value::Text("x".to_string()), &Value::Int(1)).is_err());
}

#[test]
fn negation_follows_value_types() {
    assert_eq!(arith::negate(&Value::Int(5)).unwrap(), Value::Int(-5));
    assert_eq!(arith::negate(&Value::Int(i32::MIN)).unwrap(), Value::Double(-(i32::MIN as f64)));
    assert!(arith::negate(&Value::Null).is_err());
}
