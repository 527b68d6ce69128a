use super::{Fixer, FixerMeta};
use crate::classifier::ProblemKind;
use crate::locator::ModifierProblem;
use crate::planner::PlanContext;
use modfix_types::ast::{DeclKind, DeclRef};
use modfix_types::ops::EditOperation;
use modfix_types::plan::{EditPlan, PlannedFix};

const OVERRIDE: &str = "Override";
const DEPRECATED: &str = "Deprecated";

/// Inserts or removes the `@Override` and `@Deprecated` markers.
pub struct AnnotationFixer;

impl AnnotationFixer {
    fn insert(ctx: &PlanContext<'_>, target: DeclRef, name: &str, key: &str) -> Option<PlannedFix> {
        let decl = ctx.project.decl(target)?;
        if decl.modifiers.annotation(name).is_some() {
            return None;
        }
        Some(PlannedFix::new(
            key,
            format!("Add '@{name}' annotation"),
            EditPlan::single(EditOperation::InsertAnnotation {
                target,
                name: name.to_string(),
            }),
        ))
    }

    /// `@Override` on a method that overrides nothing.
    fn stray_override(ctx: &PlanContext<'_>, target: DeclRef) -> Option<PlannedFix> {
        let decl = ctx.project.decl(target)?;
        let annotation = decl.modifiers.annotation(OVERRIDE)?;
        if !ctx.oracle.overridden_methods(target).is_empty() {
            return None;
        }
        Some(PlannedFix::new(
            "annotation.remove_override",
            "Remove '@Override' annotation",
            EditPlan::single(EditOperation::RemoveAnnotation {
                target,
                name: annotation.name.clone(),
            }),
        ))
    }

    fn documented_deprecation(ctx: &PlanContext<'_>, target: DeclRef) -> Option<PlannedFix> {
        let decl = ctx.project.decl(target)?;
        if !decl.doc.as_ref().is_some_and(|d| d.deprecated) {
            return None;
        }
        Self::insert(ctx, target, DEPRECATED, "annotation.add_deprecated")
    }
}

impl Fixer for AnnotationFixer {
    fn meta(&self) -> FixerMeta {
        FixerMeta {
            name: "annotations",
            description: "Add missing @Override/@Deprecated, remove @Override that overrides nothing",
            fix_keys: &[
                "annotation.add_override",
                "annotation.remove_override",
                "annotation.add_deprecated",
            ],
        }
    }

    fn plan(
        &self,
        ctx: &PlanContext<'_>,
        problem: &ModifierProblem,
    ) -> anyhow::Result<Vec<PlannedFix>> {
        let target = problem.primary;
        let is_method = ctx
            .project
            .decl(target)
            .is_some_and(|d| d.kind == DeclKind::Method);
        let fix = match problem.kind {
            ProblemKind::MissingOverride if is_method => {
                Self::insert(ctx, target, OVERRIDE, "annotation.add_override")
            }
            ProblemKind::MustOverride if is_method => Self::stray_override(ctx, target),
            ProblemKind::MissingDeprecated => Self::documented_deprecation(ctx, target),
            ProblemKind::OverridingDeprecated if is_method => {
                Self::insert(ctx, target, DEPRECATED, "annotation.add_deprecated")
            }
            _ => None,
        };
        Ok(fix.into_iter().collect())
    }
}
