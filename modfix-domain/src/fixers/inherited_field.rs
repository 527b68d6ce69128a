use super::{visibility_fix, Fixer, FixerMeta};
use crate::locator::ModifierProblem;
use crate::planner::PlanContext;
use crate::visibility::required_visibility;
use modfix_types::ast::{Access, DeclRef, Reference, SourceUnit};
use modfix_types::ops::EditOperation;
use modfix_types::plan::{EditPlan, PlannedFix};

/// Fixes for a use of a field that is not visible at the use site.
///
/// A qualified use can only be fixed by relaxing the field. An unqualified use inside a subtype
/// can additionally be rebound to something local: a shadowing field, a parameter, a local
/// variable, or for a write, nothing at all.
pub struct InheritedFieldFixer;

impl InheritedFieldFixer {
    fn shadow_field(
        unit: &SourceUnit,
        problem: &ModifierProblem,
        ty: &str,
        name: &str,
    ) -> Option<PlannedFix> {
        let accessor = unit.owning_type(problem.primary.decl)?;
        let accessor_decl = unit.decl(accessor)?;
        Some(PlannedFix::new(
            "field.shadow",
            format!("Create field '{name}' in type '{}'", accessor_decl.name),
            EditPlan::single(EditOperation::InsertField {
                target: DeclRef::new(problem.primary.unit, accessor),
                ty: ty.to_string(),
                name: name.to_string(),
            }),
        ))
    }

    fn as_parameter(
        unit: &SourceUnit,
        problem: &ModifierProblem,
        ty: &str,
        name: &str,
    ) -> Option<PlannedFix> {
        let primary = problem.primary.decl;
        let method = std::iter::once(primary)
            .chain(unit.ancestors(primary))
            .find(|id| unit.decl(*id).is_some_and(|d| d.kind.is_callable()))?;
        Some(PlannedFix::new(
            "field.as_parameter",
            format!("Create parameter '{name}'"),
            EditPlan::single(EditOperation::AddParameter {
                target: DeclRef::new(problem.primary.unit, method),
                ty: ty.to_string(),
                name: name.to_string(),
            }),
        ))
    }

    fn as_local(problem: &ModifierProblem, reference: usize, ty: &str, name: &str) -> PlannedFix {
        PlannedFix::new(
            "field.as_local",
            format!("Create local variable '{name}'"),
            EditPlan::single(EditOperation::DeclareLocal {
                unit: problem.primary.unit,
                reference,
                ty: ty.to_string(),
            }),
        )
    }

    fn remove_assignment(problem: &ModifierProblem, r: &Reference) -> Option<PlannedFix> {
        Some(PlannedFix::new(
            "field.remove_assignment",
            format!("Remove assignment to '{}'", r.name),
            EditPlan::single(EditOperation::RemoveStatement {
                unit: problem.primary.unit,
                span: r.statement?,
            }),
        ))
    }
}

impl Fixer for InheritedFieldFixer {
    fn meta(&self) -> FixerMeta {
        FixerMeta {
            name: "inherited_field",
            description: "Relax, shadow or rebind a field that is not visible at its use",
            fix_keys: &[
                "visibility.change",
                "field.shadow",
                "field.as_parameter",
                "field.as_local",
                "field.remove_assignment",
            ],
        }
    }

    fn plan(
        &self,
        ctx: &PlanContext<'_>,
        problem: &ModifierProblem,
    ) -> anyhow::Result<Vec<PlannedFix>> {
        let Some(unit) = ctx.project.unit(problem.primary.unit) else {
            return Ok(vec![]);
        };
        let Some((index, reference)) = problem
            .reference
            .and_then(|i| unit.references.get(i).map(|r| (i, r)))
        else {
            return Ok(vec![]);
        };
        let field = problem.secondary.and_then(|f| {
            let decl = ctx.project.decl(f)?;
            Some((f, decl.variable_info()?.ty.text.clone()))
        });

        let mut fixes = Vec::new();
        if let Some((target, _)) = &field {
            let relaxed = required_visibility(ctx.project, ctx.oracle, problem.primary, *target)
                .and_then(|level| visibility_fix(ctx, *target, level));
            fixes.extend(relaxed);
        }
        if reference.qualified {
            return Ok(fixes);
        }

        let name = reference.name.as_str();
        let is_write = reference.access == Access::Write && reference.statement.is_some();
        if let Some((_, ty)) = &field {
            fixes.extend(Self::shadow_field(unit, problem, ty, name));
            fixes.extend(Self::as_parameter(unit, problem, ty, name));
            if is_write {
                fixes.push(Self::as_local(problem, index, ty, name));
            }
        }
        if is_write {
            fixes.extend(Self::remove_assignment(problem, reference));
        }
        Ok(fixes)
    }
}
