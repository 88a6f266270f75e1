//! Table reference parsing: qualified name + alias + hints + classification.

use std::collections::HashSet;

use crate::types::{TableReference, TokenKind};

use super::names::{parse_alias, parse_qualified_name};
use super::scope::ScopeStack;
use super::state::ParserState;

/// Where CTE names come from when classifying a reference.
enum CteLookup<'a> {
    /// Walk the active scope chain, innermost outward.
    Scope(&'a ScopeStack),
    /// Flat set of known CTE names, for callers not yet scope-aware.
    Flat(&'a HashSet<String>),
}

impl CteLookup<'_> {
    fn is_cte(&self, name: &str) -> bool {
        match self {
            Self::Scope(scopes) => scopes.is_cte(name),
            Self::Flat(names) => names.iter().any(|n| n.eq_ignore_ascii_case(name)),
        }
    }
}

/// Parses one table reference: qualified name, optional alias, optional
/// `WITH (hint, ...)` group. Hints are skipped whole via the balanced-group
/// primitive and never interpreted; the alias may also follow the hint
/// group. Returns `None` without consuming anything when the current token
/// cannot start a reference.
pub fn parse_table_reference(
    state: &mut ParserState<'_>,
    scopes: &ScopeStack,
) -> Option<TableReference> {
    parse_with_lookup(state, &CteLookup::Scope(scopes))
}

/// Legacy entry point taking a flat set of CTE names in place of a scope
/// stack. Produces the same reference shape as [`parse_table_reference`].
pub fn parse_table_reference_with_ctes(
    state: &mut ParserState<'_>,
    cte_names: &HashSet<String>,
) -> Option<TableReference> {
    parse_with_lookup(state, &CteLookup::Flat(cte_names))
}

fn parse_with_lookup(state: &mut ParserState<'_>, lookup: &CteLookup) -> Option<TableReference> {
    let qualified = parse_qualified_name(state)?;
    let mut reference = TableReference::from_qualified_name(qualified);
    classify(&mut reference, lookup);

    reference.alias = parse_alias(state);
    if state.is_keyword("WITH") && state.peek(1).is_some_and(|t| t.is_punctuation("(")) {
        state.advance();
        state.skip_balanced_group();
        if reference.alias.is_none() {
            reference.alias = parse_alias(state);
        }
    }
    Some(reference)
}

fn classify(reference: &mut TableReference, lookup: &CteLookup) {
    if reference.name.starts_with("##") {
        reference.is_global_temp = true;
    } else if reference.name.starts_with('#') {
        reference.is_temp = true;
    } else if reference.name.starts_with('@') {
        reference.is_table_variable = true;
    } else {
        reference.is_cte = lookup.is_cte(&reference.name);
    }
}

/// Whether the current token can start a table reference.
pub(crate) fn at_reference_start(state: &ParserState<'_>) -> bool {
    state.is_type(TokenKind::Identifier) || state.is_type(TokenKind::BracketId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn reference(sql: &str) -> TableReference {
        let tokens = tokenize(sql);
        let mut state = ParserState::new(&tokens);
        let scopes = ScopeStack::new();
        parse_table_reference(&mut state, &scopes).expect("reference")
    }

    #[test]
    fn plain_reference_with_alias() {
        let r = reference("dbo.Employees e");
        assert_eq!(r.schema.as_deref(), Some("dbo"));
        assert_eq!(r.name, "Employees");
        assert_eq!(r.alias.as_deref(), Some("e"));
        assert!(!r.is_temp && !r.is_global_temp && !r.is_table_variable && !r.is_cte);
    }

    #[test]
    fn temp_classification() {
        assert!(reference("#tmp").is_temp);
        let global = reference("##tmp");
        assert!(global.is_global_temp);
        assert!(!global.is_temp);
        assert!(reference("@tv").is_table_variable);
    }

    #[test]
    fn hint_group_is_skipped_and_alias_may_follow() {
        let r = reference("Employees WITH (NOLOCK, INDEX(1)) e");
        assert_eq!(r.name, "Employees");
        assert_eq!(r.alias.as_deref(), Some("e"));
    }

    #[test]
    fn alias_before_hint_group() {
        let r = reference("Employees e WITH (NOLOCK)");
        assert_eq!(r.alias.as_deref(), Some("e"));
    }

    #[test]
    fn cte_classification_walks_scope_chain() {
        let tokens = tokenize("cte1");
        let mut state = ParserState::new(&tokens);
        let mut scopes = ScopeStack::new();
        scopes.push();
        scopes.add_cte("CTE1");
        scopes.push();
        let r = parse_table_reference(&mut state, &scopes).unwrap();
        assert!(r.is_cte);
    }

    #[test]
    fn legacy_and_scope_entry_points_agree() {
        let mut scopes = ScopeStack::new();
        scopes.push();
        scopes.add_cte("recent");
        let flat: HashSet<String> = ["recent".to_string()].into_iter().collect();

        let tokens = tokenize("Recent r");
        let mut state = ParserState::new(&tokens);
        let scoped = parse_table_reference(&mut state, &scopes).unwrap();
        let mut state = ParserState::new(&tokens);
        let legacy = parse_table_reference_with_ctes(&mut state, &flat).unwrap();
        assert_eq!(scoped, legacy);
        assert!(scoped.is_cte);
    }

    #[test]
    fn returns_none_on_non_reference_token() {
        let tokens = tokenize("WHERE x = 1");
        let mut state = ParserState::new(&tokens);
        let scopes = ScopeStack::new();
        assert!(parse_table_reference(&mut state, &scopes).is_none());
        assert!(state.is_keyword("WHERE"));
    }
}
