use super::{modifier_fix, name_of, remove_label, Fixer, FixerMeta};
use crate::classifier::{ProblemKind, ReportedOn};
use crate::locator::ModifierProblem;
use crate::planner::PlanContext;
use modfix_types::ast::{DeclKind, DeclRef, Declaration, Modifier, TypeKind, TypeNesting};
use modfix_types::ops::EditOperation;
use modfix_types::plan::{EditPlan, PlannedFix};

/// Reconciles body presence with `abstract` and `native`.
pub struct BodyFixer;

impl BodyFixer {
    fn method<'a>(ctx: &PlanContext<'a>, target: DeclRef) -> Option<&'a Declaration> {
        ctx.project
            .decl(target)
            .filter(|d| d.kind == DeclKind::Method && d.method_info().is_some())
    }

    /// Members of interfaces and annotation types are implicitly abstract.
    fn in_interface(ctx: &PlanContext<'_>, target: DeclRef) -> bool {
        let Some(unit) = ctx.project.unit(target.unit) else {
            return false;
        };
        unit.owning_type(target.decl)
            .and_then(|ty| unit.decl(ty))
            .and_then(|ty| ty.type_info())
            .is_some_and(|info| matches!(info.kind, TypeKind::Interface | TypeKind::Annotation))
    }

    fn default_return(ctx: &PlanContext<'_>, decl: &Declaration) -> Option<String> {
        let ty = decl.method_info()?.return_type.as_ref()?;
        ctx.config.default_returns.for_type(&ty.text)
    }

    fn add_body(ctx: &PlanContext<'_>, target: DeclRef, decl: &Declaration) -> EditOperation {
        EditOperation::AddBody {
            target,
            default_return: Self::default_return(ctx, decl),
        }
    }

    fn remove_body(target: DeclRef, decl: &Declaration) -> Option<PlannedFix> {
        decl.method_info()?.body?;
        Some(PlannedFix::new(
            "body.remove",
            "Remove method body",
            EditPlan::single(EditOperation::RemoveBody { target }),
        ))
    }

    /// `abstract` on a named class.
    fn abstract_type(ctx: &PlanContext<'_>, ty: DeclRef) -> Option<PlannedFix> {
        let decl = ctx.project.decl(ty)?;
        let info = decl.type_info()?;
        if info.kind != TypeKind::Class || info.nesting == TypeNesting::Anonymous {
            return None;
        }
        let mut fix = modifier_fix(ctx, ty, Modifier::Abstract, true)?;
        fix.fix_key = "modifier.abstract_type".to_string();
        fix.label = format!("Make type '{}' abstract", name_of(decl));
        Some(fix)
    }

    fn requires_body(ctx: &PlanContext<'_>, target: DeclRef) -> Vec<PlannedFix> {
        let Some(decl) = Self::method(ctx, target) else {
            return vec![];
        };
        if decl.method_info().is_some_and(|m| m.terminator.is_none()) {
            return vec![];
        }
        let mut fixes = vec![PlannedFix::new(
            "body.add",
            "Add method body",
            EditPlan::single(Self::add_body(ctx, target, decl)),
        )];
        if !Self::in_interface(ctx, target) {
            fixes.extend(modifier_fix(ctx, target, Modifier::Abstract, true));
        }
        fixes
    }

    /// Keyword that forbids a body: drop the keyword, or drop the body.
    fn forbidden_body(ctx: &PlanContext<'_>, target: DeclRef, keyword: Modifier) -> Vec<PlannedFix> {
        let Some(decl) = Self::method(ctx, target) else {
            return vec![];
        };
        let mut fixes: Vec<PlannedFix> =
            modifier_fix(ctx, target, keyword, false).into_iter().collect();
        fixes.extend(Self::remove_body(target, decl));
        fixes
    }

    fn abstract_in_concrete(
        ctx: &PlanContext<'_>,
        problem: &ModifierProblem,
        side: ReportedOn,
    ) -> Vec<PlannedFix> {
        let primary = problem.primary;
        let Some(unit) = ctx.project.unit(primary.unit) else {
            return vec![];
        };
        let Some(ty) = unit.owning_type(primary.decl) else {
            return vec![];
        };
        let ty = DeclRef::new(primary.unit, ty);
        if side == ReportedOn::Type {
            return Self::abstract_type(ctx, ty).into_iter().collect();
        }

        let Some(decl) = Self::method(ctx, primary) else {
            return vec![];
        };
        let mut fixes = Vec::new();
        if decl.has_modifier(Modifier::Abstract) {
            let mut ops = vec![EditOperation::RemoveModifier {
                target: primary,
                modifier: Modifier::Abstract,
            }];
            if decl.method_info().is_some_and(|m| m.body.is_none()) {
                ops.push(Self::add_body(ctx, primary, decl));
            }
            fixes.push(PlannedFix::new(
                "modifier.remove_abstract",
                remove_label(decl, Modifier::Abstract),
                EditPlan::new(ops),
            ));
        }
        fixes.extend(Self::abstract_type(ctx, ty));
        fixes
    }
}

impl Fixer for BodyFixer {
    fn meta(&self) -> FixerMeta {
        FixerMeta {
            name: "bodies",
            description: "Add or remove method bodies, or the abstract/native keywords that forbid them",
            fix_keys: &[
                "body.add",
                "body.remove",
                "modifier.add_abstract",
                "modifier.remove_abstract",
                "modifier.remove_native",
                "modifier.abstract_type",
            ],
        }
    }

    fn plan(
        &self,
        ctx: &PlanContext<'_>,
        problem: &ModifierProblem,
    ) -> anyhow::Result<Vec<PlannedFix>> {
        let fixes = match problem.kind {
            ProblemKind::MethodRequiresBody => Self::requires_body(ctx, problem.primary),
            ProblemKind::AbstractWithBody => {
                Self::forbidden_body(ctx, problem.primary, Modifier::Abstract)
            }
            ProblemKind::NativeWithBody => {
                Self::forbidden_body(ctx, problem.primary, Modifier::Native)
            }
            ProblemKind::AbstractInConcreteClass(side) => {
                Self::abstract_in_concrete(ctx, problem, side)
            }
            _ => vec![],
        };
        debug_assert!(fixes.iter().all(|f| !f.plan.is_empty()));
        Ok(fixes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::locator::locate;
    use crate::planner::PlannerConfig;
    use crate::ports::SnapshotOracle;
    use modfix_types::ast::{ProjectSnapshot, UnitId};
    use modfix_types::diagnostic::Diagnostic;
    use modfix_types::fixture::UnitBuilder;

    fn plan(src: &str, id: &str, needle: &str) -> Vec<PlannedFix> {
        let mut b = UnitBuilder::new("E.java", src);
        let e = b.ty(None, "E");
        b.method(e, "foo");
        let span = b.span_of(needle);
        let project = ProjectSnapshot::new(vec![b.build()]);
        let oracle = SnapshotOracle::new();
        let config = PlannerConfig::default();
        let ctx = PlanContext {
            project: &project,
            oracle: &oracle,
            config: &config,
        };
        let diag = Diagnostic::new(id, UnitId(0), span);
        let problem = locate(&project, &oracle, &diag, classify(id)).unwrap();
        BodyFixer.plan(&ctx, &problem).unwrap()
    }

    fn labels(fixes: &[PlannedFix]) -> Vec<&str> {
        fixes.iter().map(|f| f.label.as_str()).collect()
    }

    #[test]
    fn abstract_method_with_body_has_two_fixes() {
        let fixes = plan(
            "public abstract class E {\n    public abstract void foo() {\n    }\n}\n",
            "abstract_method_with_body",
            "foo",
        );
        assert_eq!(
            labels(&fixes),
            vec!["Remove 'abstract' modifier of 'foo'", "Remove method body"]
        );
    }

    #[test]
    fn native_method_with_body_has_two_fixes() {
        let fixes = plan(
            "class E {\n    native int foo() {\n        return 1;\n    }\n}\n",
            "native_method_with_body",
            "foo",
        );
        assert_eq!(
            labels(&fixes),
            vec!["Remove 'native' modifier of 'foo'", "Remove method body"]
        );
    }

    #[test]
    fn missing_body_uses_the_default_return() {
        let fixes = plan(
            "abstract class E {\n    boolean foo();\n}\n",
            "method_requires_body",
            "foo",
        );
        assert_eq!(fixes.len(), 2);
        assert_eq!(
            fixes[0].plan.ops[0],
            EditOperation::AddBody {
                target: fixes[0].plan.ops[0].target().unwrap(),
                default_return: Some("false".to_string())
            }
        );
        assert_eq!(fixes[1].label, "Change modifier of 'foo' to 'abstract'");
    }

    #[test]
    fn interface_method_without_body_only_gets_a_body() {
        let fixes = plan(
            "interface E {\n    default int foo();\n}\n",
            "method_requires_body",
            "foo",
        );
        assert_eq!(labels(&fixes), vec!["Add method body"]);
        assert_eq!(
            fixes[0].plan.ops[0],
            EditOperation::AddBody {
                target: fixes[0].plan.ops[0].target().unwrap(),
                default_return: Some("0".to_string())
            }
        );
    }

    #[test]
    fn abstract_method_in_concrete_class_from_both_sides() {
        let src = "class E {\n    abstract String foo();\n}\n";
        let on_method = plan(src, "abstract_method_in_concrete_class", "foo");
        assert_eq!(
            labels(&on_method),
            vec!["Remove 'abstract' modifier of 'foo'", "Make type 'E' abstract"]
        );
        assert_eq!(on_method[0].plan.ops.len(), 2);

        let on_type = plan(src, "abstract_methods_in_concrete_class", "E");
        assert_eq!(labels(&on_type), vec!["Make type 'E' abstract"]);
    }
}
