//! Maps a diagnostic span to the declarations a fix has to touch.

use crate::classifier::{ProblemKind, SecondarySite};
use crate::ports::BindingOracle;
use modfix_types::ast::{DeclRef, ProjectSnapshot};
use modfix_types::diagnostic::Diagnostic;
use tracing::debug;

/// A classified diagnostic bound to its sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierProblem {
    pub kind: ProblemKind,
    pub diagnostic: Diagnostic,
    /// Innermost declaration enclosing the diagnostic span.
    pub primary: DeclRef,
    /// Referenced member or overridden method, possibly in another unit.
    pub secondary: Option<DeclRef>,
    /// Index into the unit's references when the span covers a recorded use.
    pub reference: Option<usize>,
}

impl ModifierProblem {
    pub fn args(&self) -> &[i64] {
        &self.diagnostic.args
    }
}

/// Binds `diag` to its primary and secondary sites.
///
/// Returns `None` when the span lies outside every declaration. A failed secondary lookup is not
/// fatal: the problem comes back without a secondary site and each fixer decides what it can
/// still offer.
pub fn locate(
    project: &ProjectSnapshot,
    oracle: &dyn BindingOracle,
    diag: &Diagnostic,
    kind: ProblemKind,
) -> Option<ModifierProblem> {
    let Some(unit) = project.unit(diag.unit) else {
        debug!(id = %diag.id, unit = diag.unit.0, "diagnostic names an unknown unit");
        return None;
    };
    let Some(decl) = unit.innermost_decl(diag.span) else {
        debug!(id = %diag.id, "diagnostic span is outside every declaration");
        return None;
    };
    let primary = DeclRef::new(diag.unit, decl);

    let reference = unit.reference_at(diag.span);
    let secondary = match kind.secondary_site() {
        SecondarySite::None => None,
        SecondarySite::Reference => reference
            .and_then(|idx| unit.references.get(idx))
            .and_then(|r| oracle.resolve_reference(diag.unit, r)),
        SecondarySite::Overridden => oracle.overridden_methods(primary).first().copied(),
    };
    if secondary.is_none() && kind.secondary_site() != SecondarySite::None {
        debug!(id = %diag.id, "secondary site did not resolve");
    }

    Some(ModifierProblem {
        kind,
        diagnostic: diag.clone(),
        primary,
        secondary,
        reference,
    })
}
