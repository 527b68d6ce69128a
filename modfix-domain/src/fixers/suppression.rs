use super::{name_of, Fixer, FixerMeta};
use crate::classifier::ProblemKind;
use crate::locator::ModifierProblem;
use crate::planner::PlanContext;
use crate::suppress;
use modfix_types::ast::DeclRef;
use modfix_types::ops::EditOperation;
use modfix_types::plan::{EditPlan, PlannedFix};

/// Adds suppression tokens for suppressible warnings and drops tokens that suppress nothing.
pub struct SuppressionFixer;

impl SuppressionFixer {
    fn unused_token(ctx: &PlanContext<'_>, problem: &ModifierProblem) -> Option<PlannedFix> {
        let unit_id = problem.diagnostic.unit;
        let unit = ctx.project.unit(unit_id)?;
        let annotation = suppress::annotation_name(unit, unit_id, ctx.oracle);
        let (decl, token) = suppress::token_at(unit, &annotation, problem.diagnostic.span)?;
        Some(PlannedFix::new(
            "suppress.remove_token",
            format!("Remove '{token}' token"),
            EditPlan::single(EditOperation::RemoveSuppressToken {
                target: DeclRef::new(unit_id, decl),
                token,
                annotation,
            }),
        ))
    }

    fn suppress(ctx: &PlanContext<'_>, problem: &ModifierProblem, token: &str) -> Vec<PlannedFix> {
        let unit_id = problem.primary.unit;
        let Some(unit) = ctx.project.unit(unit_id) else {
            return vec![];
        };
        let annotation = suppress::annotation_name(unit, unit_id, ctx.oracle);
        suppress::suppress_targets(
            unit,
            problem.primary.decl,
            ctx.config.secondary_suppress_target,
        )
        .into_iter()
        .filter(|id| !suppress::suppresses(unit, *id, &annotation, token))
        .filter_map(|id| {
            let decl = unit.decl(id)?;
            Some(PlannedFix::new(
                "suppress.add_token",
                format!("Add @SuppressWarnings '{token}' to '{}'", name_of(decl)),
                EditPlan::single(EditOperation::MergeSuppressToken {
                    target: DeclRef::new(unit_id, id),
                    token: token.to_string(),
                    annotation: annotation.clone(),
                }),
            ))
        })
        .collect()
    }
}

impl Fixer for SuppressionFixer {
    fn meta(&self) -> FixerMeta {
        FixerMeta {
            name: "suppression",
            description: "Add or remove @SuppressWarnings tokens",
            fix_keys: &["suppress.add_token", "suppress.remove_token"],
        }
    }

    fn plan(
        &self,
        ctx: &PlanContext<'_>,
        problem: &ModifierProblem,
    ) -> anyhow::Result<Vec<PlannedFix>> {
        let fixes = match problem.kind {
            ProblemKind::UnusedSuppressToken => {
                Self::unused_token(ctx, problem).into_iter().collect()
            }
            ProblemKind::Suppressible(token) => Self::suppress(ctx, problem, token),
            _ => vec![],
        };
        Ok(fixes)
    }
}
