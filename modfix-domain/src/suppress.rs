//! `@SuppressWarnings` placement and naming.

use crate::ports::BindingOracle;
use modfix_types::ast::{DeclId, Span, SourceUnit, UnitId};

pub use modfix_types::ast::{QUALIFIED_SUPPRESS_WARNINGS, SUPPRESS_WARNINGS};

/// Suppressible declarations for a warning raised inside `from`: the nearest one, then the next
/// enclosing one when `include_secondary` is set. Anonymous types are skipped.
pub fn suppress_targets(unit: &SourceUnit, from: DeclId, include_secondary: bool) -> Vec<DeclId> {
    let limit = if include_secondary { 2 } else { 1 };
    std::iter::once(from)
        .chain(unit.ancestors(from))
        .filter(|id| unit.decl(*id).is_some_and(|d| d.is_suppressible()))
        .take(limit)
        .collect()
}

/// Name `java.lang.SuppressWarnings` resolves by in `unit_id`.
///
/// New annotations are written with it, and only annotations written with it (or fully qualified)
/// are merged into or edited. Falls back to the qualified name when another `SuppressWarnings` type is imported, declared in
/// the unit, or reported visible by the oracle.
pub fn annotation_name(unit: &SourceUnit, unit_id: UnitId, oracle: &dyn BindingOracle) -> String {
    let imported = unit.imports.iter().any(|i| {
        !i.on_demand && i.simple_name() == SUPPRESS_WARNINGS && i.path != QUALIFIED_SUPPRESS_WARNINGS
    });
    let shadowed = oracle
        .shadowing_type(unit_id, SUPPRESS_WARNINGS)
        .is_some_and(|q| q != QUALIFIED_SUPPRESS_WARNINGS);
    if imported || shadowed || unit.declares_type(SUPPRESS_WARNINGS) {
        QUALIFIED_SUPPRESS_WARNINGS.to_string()
    } else {
        SUPPRESS_WARNINGS.to_string()
    }
}

/// Declaration whose `@SuppressWarnings` value holds the string literal at `span`, with the token.
///
/// `name` comes from [`annotation_name`]; a same-named annotation of another type is ignored.
pub fn token_at(unit: &SourceUnit, name: &str, span: Span) -> Option<(DeclId, String)> {
    unit.decl_ids().find_map(|id| {
        let decl = unit.decl(id)?;
        let value = decl.modifiers.suppress_warnings(name)?.value.as_ref()?;
        value
            .elements
            .iter()
            .find(|e| e.span.contains(span) || span.contains(e.span))
            .map(|e| (id, e.value.clone()))
    })
}

/// Whether `decl` already suppresses `token` through the annotation resolved by `name`.
pub fn suppresses(unit: &SourceUnit, decl: DeclId, name: &str, token: &str) -> bool {
    unit.decl(decl)
        .and_then(|d| d.modifiers.suppress_warnings(name))
        .and_then(|a| a.value.as_ref())
        .is_some_and(|v| v.contains(token))
}
