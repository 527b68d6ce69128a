use super::{add_label, modifier_fix, Fixer, FixerMeta};
use crate::classifier::{ProblemKind, StaticMember};
use crate::locator::ModifierProblem;
use crate::planner::PlanContext;
use crate::splitter;
use crate::suppress;
use modfix_types::ast::{DeclKind, DeclRef, Modifier, TypeNesting};
use modfix_types::ops::EditOperation;
use modfix_types::plan::{EditPlan, PlannedFix};

/// Adds or removes `static` around members used from, or declared in, the wrong context.
pub struct StaticAccessFixer;

impl StaticAccessFixer {
    const STATIC_METHOD_TOKEN: &'static str = "static-method";

    /// `static` on the referenced member; abstract and default methods lose those keywords too.
    fn make_static(ctx: &PlanContext<'_>, target: DeclRef) -> Option<PlannedFix> {
        let decl = ctx.project.decl(target)?;
        if decl.has_modifier(Modifier::Static) {
            return None;
        }
        let mut ops = vec![EditOperation::AddModifier {
            target,
            modifier: Modifier::Static,
        }];
        if decl.kind == DeclKind::Method {
            for modifier in [Modifier::Abstract, Modifier::Default] {
                if decl.has_modifier(modifier) {
                    ops.push(EditOperation::RemoveModifier { target, modifier });
                }
            }
        }
        let plan = splitter::isolated_plan(ctx.project, target, ops)?;
        Some(PlannedFix::new(
            "modifier.add_static",
            add_label(decl, Modifier::Static),
            plan,
        ))
    }

    /// `static` on the member type enclosing `member`.
    fn make_enclosing_static(ctx: &PlanContext<'_>, member: DeclRef) -> Option<PlannedFix> {
        let unit = ctx.project.unit(member.unit)?;
        let ty = unit.enclosing_type(member.decl)?;
        let info = unit.decl(ty)?.type_info()?;
        if info.nesting != TypeNesting::Member {
            return None;
        }
        let mut fix = modifier_fix(ctx, DeclRef::new(member.unit, ty), Modifier::Static, true)?;
        fix.fix_key = "modifier.add_static_to_type".to_string();
        Some(fix)
    }

    fn static_in_inner(
        ctx: &PlanContext<'_>,
        problem: &ModifierProblem,
        member: StaticMember,
    ) -> Vec<PlannedFix> {
        let target = problem.primary;
        let Some(decl) = ctx.project.decl(target) else {
            return vec![];
        };
        let mut fixes = Vec::new();
        fixes.extend(modifier_fix(ctx, target, Modifier::Static, false));
        if member == StaticMember::Field {
            let uninitialized = decl.variable_info().is_some_and(|v| v.initializer.is_none());
            if uninitialized && !decl.has_modifier(Modifier::Final) {
                let mut ops = vec![EditOperation::AddModifier {
                    target,
                    modifier: Modifier::Final,
                }];
                if decl.has_modifier(Modifier::Volatile) {
                    ops.push(EditOperation::RemoveModifier {
                        target,
                        modifier: Modifier::Volatile,
                    });
                }
                if let Some(plan) = splitter::isolated_plan(ctx.project, target, ops) {
                    fixes.push(PlannedFix::new(
                        "modifier.add_final",
                        format!("Change modifier of '{}' to 'static final'", decl.name),
                        plan,
                    ));
                }
            }
        }
        fixes.extend(Self::make_enclosing_static(ctx, target));
        fixes
    }

    fn can_be_static(
        ctx: &PlanContext<'_>,
        problem: &ModifierProblem,
        mandatory: bool,
    ) -> Vec<PlannedFix> {
        let target = problem.primary;
        let Some(decl) = ctx.project.decl(target) else {
            return vec![];
        };
        if decl.kind != DeclKind::Method {
            return vec![];
        }
        let mut fixes: Vec<PlannedFix> = Self::make_static(ctx, target).into_iter().collect();
        if !mandatory {
            let Some(unit) = ctx.project.unit(target.unit) else {
                return fixes;
            };
            let annotation = suppress::annotation_name(unit, target.unit, ctx.oracle);
            if !suppress::suppresses(unit, target.decl, &annotation, Self::STATIC_METHOD_TOKEN) {
                fixes.push(PlannedFix::new(
                    "suppress.add_token",
                    format!(
                        "Add @SuppressWarnings '{}' to '{}'",
                        Self::STATIC_METHOD_TOKEN,
                        decl.name
                    ),
                    EditPlan::single(EditOperation::MergeSuppressToken {
                        target,
                        token: Self::STATIC_METHOD_TOKEN.to_string(),
                        annotation,
                    }),
                ));
            }
        }
        fixes
    }
}

impl Fixer for StaticAccessFixer {
    fn meta(&self) -> FixerMeta {
        FixerMeta {
            name: "static_access",
            description: "Make members static where they are used statically, or drop misplaced static",
            fix_keys: &[
                "modifier.add_static",
                "modifier.remove_static",
                "modifier.add_final",
                "modifier.add_static_to_type",
                "suppress.add_token",
            ],
        }
    }

    fn plan(
        &self,
        ctx: &PlanContext<'_>,
        problem: &ModifierProblem,
    ) -> anyhow::Result<Vec<PlannedFix>> {
        let fixes = match problem.kind {
            ProblemKind::StaticRequired | ProblemKind::InstanceBeforeConstructor => problem
                .secondary
                .and_then(|target| Self::make_static(ctx, target))
                .into_iter()
                .collect(),
            ProblemKind::StaticInNonStaticInner(member) => {
                Self::static_in_inner(ctx, problem, member)
            }
            ProblemKind::MethodCanBeStatic { mandatory } => {
                Self::can_be_static(ctx, problem, mandatory)
            }
            _ => vec![],
        };
        Ok(fixes)
    }
}
