use super::{visibility_fix, Fixer, FixerMeta};
use crate::classifier::{MemberKind, ProblemKind};
use crate::locator::ModifierProblem;
use crate::planner::PlanContext;
use crate::visibility::required_visibility;
use modfix_types::ast::{DeclKind, DeclRef, Visibility};
use modfix_types::ops::EditOperation;
use modfix_types::plan::{EditPlan, PlannedFix};

/// Relaxes the access level of a referenced method, constructor or type.
pub struct VisibilityAccessFixer;

impl VisibilityAccessFixer {
    fn relax(
        ctx: &PlanContext<'_>,
        problem: &ModifierProblem,
        member: MemberKind,
    ) -> Option<PlannedFix> {
        let target = problem.secondary?;
        let decl = ctx.project.decl(target)?;
        let level = required_visibility(ctx.project, ctx.oracle, problem.primary, target)?;
        if member == MemberKind::Constructor && decl.kind == DeclKind::Type {
            return Self::explicit_constructor(target, &decl.name, level);
        }
        visibility_fix(ctx, target, level)
    }

    /// The implicit constructor of `ty` takes the type's access level; spell one out instead.
    fn explicit_constructor(ty: DeclRef, name: &str, level: Visibility) -> Option<PlannedFix> {
        Some(PlannedFix::new(
            "constructor.synthesize",
            format!("Add constructor '{name}()' with visibility '{level}'"),
            EditPlan::single(EditOperation::SynthesizeConstructor {
                target: ty,
                visibility: level,
            }),
        ))
    }

    fn emulated(ctx: &PlanContext<'_>, problem: &ModifierProblem) -> Option<PlannedFix> {
        let target = problem.secondary?;
        let unit = ctx.project.unit(target.unit)?;
        if unit.effective_visibility(target.decl) != Visibility::Private {
            return None;
        }
        visibility_fix(ctx, target, Visibility::Package)
    }
}

impl Fixer for VisibilityAccessFixer {
    fn meta(&self) -> FixerMeta {
        FixerMeta {
            name: "visibility_access",
            description: "Relax the visibility of members referenced from where they are not visible",
            fix_keys: &["visibility.change", "constructor.synthesize"],
        }
    }

    fn plan(
        &self,
        ctx: &PlanContext<'_>,
        problem: &ModifierProblem,
    ) -> anyhow::Result<Vec<PlannedFix>> {
        let fix = match problem.kind {
            ProblemKind::NotVisible(member) => Self::relax(ctx, problem, member),
            ProblemKind::NeedToEmulate => Self::emulated(ctx, problem),
            _ => None,
        };
        Ok(fix.into_iter().collect())
    }
}
