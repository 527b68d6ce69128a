use crate::classifier::ProblemKind;
use crate::locator::ModifierProblem;
use crate::planner::PlanContext;
use crate::splitter;
use modfix_types::ast::{DeclRef, Declaration, Modifier, Visibility};
use modfix_types::ops::EditOperation;
use modfix_types::plan::PlannedFix;
use serde::Serialize;

mod annotations;
mod bodies;
mod finality;
mod illegal_modifiers;
mod inherited_field;
mod overrides;
mod static_access;
mod suppression;
mod visibility_access;

pub trait Fixer: Sync {
    fn meta(&self) -> FixerMeta;

    fn plan(
        &self,
        ctx: &PlanContext<'_>,
        problem: &ModifierProblem,
    ) -> anyhow::Result<Vec<PlannedFix>>;
}

/// Catalog entry describing a builtin fixer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixerMeta {
    pub name: &'static str,
    pub description: &'static str,
    /// Fix keys the fixer may emit.
    pub fix_keys: &'static [&'static str],
}

/// The fixer responsible for `kind`; `None` only for unsupported problems.
pub fn fixer_for(kind: ProblemKind) -> Option<&'static dyn Fixer> {
    use ProblemKind::*;
    let fixer: &'static dyn Fixer = match kind {
        StaticRequired
        | InstanceBeforeConstructor
        | StaticInNonStaticInner(_)
        | MethodCanBeStatic { .. } => &static_access::StaticAccessFixer,
        NotVisible(crate::classifier::MemberKind::Field) | InvisibleInheritedField => {
            &inherited_field::InheritedFieldFixer
        }
        NotVisible(_) | NeedToEmulate => &visibility_access::VisibilityAccessFixer,
        FinalAssignment
        | OuterLocalMustBeFinal
        | OverrideFinal
        | ExtendsFinalClass
        | FinalVolatileField => &finality::FinalityFixer,
        MethodRequiresBody | AbstractWithBody | NativeWithBody | AbstractInConcreteClass(_) => {
            &bodies::BodyFixer
        }
        OverrideReducesVisibility
        | InheritedReducesVisibility
        | OverridesNonVisible
        | StaticHidesInstance
        | InstanceOverridesStatic
        | MissingSynchronized => &overrides::OverrideFixer,
        MissingOverride | MustOverride | MissingDeprecated | OverridingDeprecated => {
            &annotations::AnnotationFixer
        }
        IllegalModifier(_) | RedundantModifier => &illegal_modifiers::IllegalModifierFixer,
        UnusedSuppressToken | Suppressible(_) => &suppression::SuppressionFixer,
        Unsupported => return None,
    };
    Some(fixer)
}

pub fn builtin_fixers() -> Vec<&'static dyn Fixer> {
    vec![
        &static_access::StaticAccessFixer,
        &visibility_access::VisibilityAccessFixer,
        &inherited_field::InheritedFieldFixer,
        &finality::FinalityFixer,
        &bodies::BodyFixer,
        &overrides::OverrideFixer,
        &annotations::AnnotationFixer,
        &illegal_modifiers::IllegalModifierFixer,
        &suppression::SuppressionFixer,
    ]
}

pub fn builtin_fixer_metas() -> Vec<FixerMeta> {
    builtin_fixers().into_iter().map(|f| f.meta()).collect()
}

fn name_of(decl: &Declaration) -> &str {
    if decl.name.is_empty() {
        "<anonymous>"
    } else {
        &decl.name
    }
}

fn add_label(decl: &Declaration, modifier: Modifier) -> String {
    format!("Change modifier of '{}' to '{modifier}'", name_of(decl))
}

fn remove_label(decl: &Declaration, modifier: Modifier) -> String {
    format!("Remove '{modifier}' modifier of '{}'", name_of(decl))
}

/// Single-modifier fix on `target`, splitting a shared statement first.
fn modifier_fix(
    ctx: &PlanContext<'_>,
    target: DeclRef,
    modifier: Modifier,
    add: bool,
) -> Option<PlannedFix> {
    let decl = ctx.project.decl(target)?;
    if decl.has_modifier(modifier) == add {
        return None;
    }
    let (key, label, op) = if add {
        (
            add_key(modifier),
            add_label(decl, modifier),
            EditOperation::AddModifier { target, modifier },
        )
    } else {
        (
            remove_key(modifier),
            remove_label(decl, modifier),
            EditOperation::RemoveModifier { target, modifier },
        )
    };
    let plan = splitter::isolated_plan(ctx.project, target, vec![op])?;
    Some(PlannedFix::new(key, label, plan))
}

fn add_key(modifier: Modifier) -> &'static str {
    match modifier {
        Modifier::Static => "modifier.add_static",
        Modifier::Final => "modifier.add_final",
        Modifier::Abstract => "modifier.add_abstract",
        Modifier::Synchronized => "modifier.add_synchronized",
        _ => "modifier.add",
    }
}

fn remove_key(modifier: Modifier) -> &'static str {
    match modifier {
        Modifier::Static => "modifier.remove_static",
        Modifier::Final => "modifier.remove_final",
        Modifier::Abstract => "modifier.remove_abstract",
        Modifier::Native => "modifier.remove_native",
        Modifier::Volatile => "modifier.remove_volatile",
        _ => "modifier.remove",
    }
}

/// Operations that move `target` from its declared access level to `to`.
fn visibility_ops(target: DeclRef, decl: &Declaration, to: Visibility) -> Vec<EditOperation> {
    let mut ops: Vec<EditOperation> = decl
        .modifiers
        .keywords()
        .filter(|(m, _)| m.is_visibility())
        .map(|(modifier, _)| EditOperation::RemoveModifier { target, modifier })
        .collect();
    if let Some(modifier) = to.modifier() {
        ops.push(EditOperation::AddModifier { target, modifier });
    }
    ops
}

/// Changes the declared access level of `target` to `to`; `None` when it already has it.
fn visibility_fix(ctx: &PlanContext<'_>, target: DeclRef, to: Visibility) -> Option<PlannedFix> {
    let decl = ctx.project.decl(target)?;
    if decl.visibility() == to {
        return None;
    }
    let ops = visibility_ops(target, decl, to);
    let plan = splitter::isolated_plan(ctx.project, target, ops)?;
    Some(PlannedFix::new(
        "visibility.change",
        format!("Change visibility of '{}' to '{to}'", name_of(decl)),
        plan,
    ))
}
