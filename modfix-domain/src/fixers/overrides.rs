use super::{modifier_fix, name_of, visibility_fix, Fixer, FixerMeta};
use crate::classifier::ProblemKind;
use crate::locator::ModifierProblem;
use crate::planner::PlanContext;
use modfix_types::ast::{DeclRef, Modifier, ProjectSnapshot, Visibility};
use modfix_types::plan::PlannedFix;
use tracing::debug;

/// Reconciles an overriding method with the methods it overrides.
pub struct OverrideFixer;

fn effective(project: &ProjectSnapshot, r: DeclRef) -> Option<Visibility> {
    project
        .unit(r.unit)
        .map(|unit| unit.effective_visibility(r.decl))
}

fn in_interface(project: &ProjectSnapshot, r: DeclRef) -> bool {
    project
        .unit(r.unit)
        .and_then(|unit| unit.enclosing_type(r.decl).and_then(|t| unit.decl(t)))
        .and_then(|t| t.type_info())
        .is_some_and(|t| t.is_interface_like())
}

impl OverrideFixer {
    /// Relabels a visibility fix that edits the overridden side.
    fn on_super(ctx: &PlanContext<'_>, target: DeclRef, to: Visibility) -> Option<PlannedFix> {
        let mut fix = visibility_fix(ctx, target, to)?;
        let decl = ctx.project.decl(target)?;
        fix.label = format!(
            "Change visibility of overridden '{}' to '{to}'",
            name_of(decl)
        );
        Some(fix)
    }

    fn reduced_visibility(ctx: &PlanContext<'_>, problem: &ModifierProblem) -> Vec<PlannedFix> {
        let project = ctx.project;
        let method = problem.primary;
        let overridden = ctx.oracle.overridden_methods(method);
        let (Some(current), Some(needed)) = (
            effective(project, method),
            overridden.iter().filter_map(|m| effective(project, *m)).max(),
        ) else {
            return vec![];
        };

        let mut fixes = Vec::new();
        if needed > current {
            fixes.extend(visibility_fix(ctx, method, needed));
        }

        // Only the nearest class method can be lowered; interface methods stay as declared. The
        // lowered level has to stay reachable from the override's package.
        let Some(sup) = overridden
            .iter()
            .copied()
            .find(|m| !in_interface(project, *m))
        else {
            return fixes;
        };
        let same_package = project.package_of(method) == project.package_of(sup);
        let lowerable = current != Visibility::Private
            && effective(project, sup).is_some_and(|v| v > current)
            && !(current == Visibility::Package && !same_package);
        if lowerable {
            fixes.extend(Self::on_super(ctx, sup, current));
        } else {
            debug!(id = %problem.diagnostic.id, "overridden side left unchanged");
        }
        fixes
    }

    fn inherited(ctx: &PlanContext<'_>, problem: &ModifierProblem) -> Option<PlannedFix> {
        let unit = ctx.project.unit(problem.primary.unit)?;
        let ty = DeclRef::new(problem.primary.unit, unit.owning_type(problem.primary.decl)?);
        let (implementation, interface_method) = ctx.oracle.inherited_implementation(ty)?;
        let needed = effective(ctx.project, interface_method)?;
        if effective(ctx.project, implementation)? >= needed {
            return None;
        }
        visibility_fix(ctx, implementation, needed)
    }

    fn non_visible(ctx: &PlanContext<'_>, problem: &ModifierProblem) -> Option<PlannedFix> {
        let sup = problem.secondary?;
        let to = effective(ctx.project, problem.primary)?;
        if to <= effective(ctx.project, sup)? {
            return None;
        }
        Self::on_super(ctx, sup, to)
    }
}

impl Fixer for OverrideFixer {
    fn meta(&self) -> FixerMeta {
        FixerMeta {
            name: "overrides",
            description: "Align visibility, static and synchronized between overriding and overridden methods",
            fix_keys: &[
                "visibility.change",
                "modifier.remove_static",
                "modifier.add_synchronized",
            ],
        }
    }

    fn plan(
        &self,
        ctx: &PlanContext<'_>,
        problem: &ModifierProblem,
    ) -> anyhow::Result<Vec<PlannedFix>> {
        let fixes = match problem.kind {
            ProblemKind::OverrideReducesVisibility => Self::reduced_visibility(ctx, problem),
            ProblemKind::InheritedReducesVisibility => {
                Self::inherited(ctx, problem).into_iter().collect()
            }
            ProblemKind::OverridesNonVisible => {
                Self::non_visible(ctx, problem).into_iter().collect()
            }
            ProblemKind::StaticHidesInstance => {
                modifier_fix(ctx, problem.primary, Modifier::Static, false)
                    .into_iter()
                    .collect()
            }
            ProblemKind::InstanceOverridesStatic => problem
                .secondary
                .and_then(|sup| modifier_fix(ctx, sup, Modifier::Static, false))
                .into_iter()
                .collect(),
            ProblemKind::MissingSynchronized => {
                modifier_fix(ctx, problem.primary, Modifier::Synchronized, true)
                    .into_iter()
                    .collect()
            }
            _ => vec![],
        };
        Ok(fixes)
    }
}
