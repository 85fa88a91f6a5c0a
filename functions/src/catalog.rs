//! FILENAME: functions/src/catalog.rs
//! PURPOSE: Catalog assembly and the standard rule set.

use parser::{
    FunctionRule, LineCommentRule, NewlineRule, NumberRule, OperatorRule, RegistryError, RuleSet,
    SpaceRule, StringRule,
};

use crate::{builtins, datetime};

/// Registers every bundled function into `rule`.
pub fn register_all(rule: &mut FunctionRule) -> Result<(), RegistryError> {
    builtins::register(rule)?;
    datetime::register(rule)?;
    Ok(())
}

/// A function rule pre-loaded with the full catalog.
pub fn standard_functions() -> Result<FunctionRule, RegistryError> {
    let mut rule = FunctionRule::new();
    register_all(&mut rule)?;
    Ok(rule)
}

/// The standard rule set: trivia, functions, strings, numbers, operators,
/// in that priority order. Function names are tried before numbers so a
/// name can never start with a digit anyway, and the operator rule comes
/// last so call punctuation stays with the function rule.
pub fn standard_rule_set() -> Result<RuleSet, RegistryError> {
    let mut set = RuleSet::new();
    set.register(SpaceRule);
    set.register(NewlineRule);
    set.register(LineCommentRule::default());
    set.register(standard_functions()?);
    set.register(StringRule::default());
    set.register(NumberRule::default());
    set.register(OperatorRule::standard());
    Ok(set)
}
