use super::{Fixer, FixerMeta};
use crate::classifier::ProblemKind;
use crate::legality::{self, LegalityContext};
use crate::locator::ModifierProblem;
use crate::planner::PlanContext;
use modfix_types::ast::DeclRef;
use modfix_types::ops::EditOperation;
use modfix_types::plan::{EditPlan, PlannedFix};

/// Strips modifiers and annotations that the declaration's context forbids or already implies.
///
/// Co-declared variables share one context, so edits on a multi-declarator statement apply to
/// the shared modifier list without splitting it.
pub struct IllegalModifierFixer;

impl IllegalModifierFixer {
    fn invalid(
        ctx: &PlanContext<'_>,
        target: DeclRef,
        context: LegalityContext,
    ) -> Option<PlannedFix> {
        let decl = ctx.project.decl(target)?;
        let mut ops: Vec<EditOperation> = decl
            .modifiers
            .keywords()
            .filter(|(m, _)| !legality::is_legal(context, *m))
            .map(|(modifier, _)| EditOperation::RemoveModifier { target, modifier })
            .collect();
        ops.extend(
            decl.modifiers
                .annotations()
                .filter(|a| !legality::is_legal_annotation(context, a.simple_name()))
                .map(|a| EditOperation::RemoveAnnotation {
                    target,
                    name: a.name.clone(),
                }),
        );
        if ops.is_empty() {
            return None;
        }
        Some(PlannedFix::new(
            "modifier.remove_invalid",
            "Remove invalid modifiers",
            EditPlan::new(ops),
        ))
    }

    fn redundant(ctx: &PlanContext<'_>, target: DeclRef) -> Option<PlannedFix> {
        let unit = ctx.project.unit(target.unit)?;
        let decl = unit.decl(target.decl)?;
        let context = legality::context_of(unit, target.decl)?;
        let ops: Vec<EditOperation> = legality::implied_modifiers(context)
            .iter()
            .filter(|m| decl.has_modifier(**m))
            .map(|&modifier| EditOperation::RemoveModifier { target, modifier })
            .collect();
        if ops.is_empty() {
            return None;
        }
        Some(PlannedFix::new(
            "modifier.remove_redundant",
            "Remove redundant modifiers",
            EditPlan::new(ops),
        ))
    }
}

impl Fixer for IllegalModifierFixer {
    fn meta(&self) -> FixerMeta {
        FixerMeta {
            name: "illegal_modifiers",
            description: "Remove modifiers that are illegal or redundant for the declaration",
            fix_keys: &["modifier.remove_invalid", "modifier.remove_redundant"],
        }
    }

    fn plan(
        &self,
        ctx: &PlanContext<'_>,
        problem: &ModifierProblem,
    ) -> anyhow::Result<Vec<PlannedFix>> {
        let fix = match problem.kind {
            ProblemKind::IllegalModifier(context) => Self::invalid(ctx, problem.primary, context),
            ProblemKind::RedundantModifier => Self::redundant(ctx, problem.primary),
            _ => None,
        };
        Ok(fix.into_iter().collect())
    }
}
