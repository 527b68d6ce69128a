use super::{modifier_fix, Fixer, FixerMeta};
use crate::classifier::ProblemKind;
use crate::locator::ModifierProblem;
use crate::planner::PlanContext;
use modfix_types::ast::{DeclKind, Modifier};
use modfix_types::plan::PlannedFix;

/// Adds or removes `final` where it blocks an assignment, a capture, an override or a subclass.
pub struct FinalityFixer;

impl FinalityFixer {
    fn captured(ctx: &PlanContext<'_>, problem: &ModifierProblem) -> Option<PlannedFix> {
        let target = problem.secondary?;
        let decl = ctx.project.decl(target)?;
        if !matches!(decl.kind, DeclKind::LocalVariable | DeclKind::Parameter) {
            return None;
        }
        modifier_fix(ctx, target, Modifier::Final, true)
    }
}

impl Fixer for FinalityFixer {
    fn meta(&self) -> FixerMeta {
        FixerMeta {
            name: "finality",
            description: "Add or remove final on variables, methods and classes",
            fix_keys: &[
                "modifier.add_final",
                "modifier.remove_final",
                "modifier.remove_volatile",
            ],
        }
    }

    fn plan(
        &self,
        ctx: &PlanContext<'_>,
        problem: &ModifierProblem,
    ) -> anyhow::Result<Vec<PlannedFix>> {
        let fixes = match problem.kind {
            ProblemKind::OuterLocalMustBeFinal => {
                Self::captured(ctx, problem).into_iter().collect()
            }
            ProblemKind::FinalAssignment
            | ProblemKind::OverrideFinal
            | ProblemKind::ExtendsFinalClass => problem
                .secondary
                .and_then(|target| modifier_fix(ctx, target, Modifier::Final, false))
                .into_iter()
                .collect(),
            ProblemKind::FinalVolatileField => [Modifier::Volatile, Modifier::Final]
                .into_iter()
                .filter_map(|m| modifier_fix(ctx, problem.primary, m, false))
                .collect(),
            _ => vec![],
        };
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
    use modfix_types::ast::{DeclId, DeclRef, ProjectSnapshot, Span, UnitId};
    use modfix_types::diagnostic::Diagnostic;
    use modfix_types::fixture::UnitBuilder;
    use modfix_types::ops::EditOperation;

    fn plan(
        project: &ProjectSnapshot,
        oracle: &SnapshotOracle,
        diag: &Diagnostic,
    ) -> Vec<PlannedFix> {
        let config = PlannerConfig::default();
        let ctx = PlanContext {
            project,
            oracle,
            config: &config,
        };
        let problem = locate(project, oracle, diag, classify(&diag.id)).unwrap();
        FinalityFixer.plan(&ctx, &problem).unwrap()
    }

    /// A local `name` declared by `decl_src` inside `foo`, captured by an anonymous class.
    fn captured(
        decl_src: &str,
        name: &str,
    ) -> (ProjectSnapshot, SnapshotOracle, Diagnostic, DeclId) {
        let src = format!(
            "class E {{\n    void foo() {{\n        {decl_src}\n        Runnable r= new Runnable() {{\n            public void run() {{\n                System.out.println({name});\n            }}\n        }};\n    }}\n}}\n"
        );
        let mut b = UnitBuilder::new("E.java", src);
        let e = b.ty(None, "E");
        let foo = b.method(e, "foo");
        let local = b.local(foo, name);
        let anon = b.anonymous(foo, "new Runnable()");
        let run = b.method(anon, "run");
        let r = b.reference(run, &format!("println({name})"), name);
        let project = ProjectSnapshot::new(vec![b.build()]);
        let reference = project.units[0].references[r].clone();
        let mut oracle = SnapshotOracle::new();
        oracle.bind(UnitId(0), &reference, DeclRef::new(UnitId(0), local));
        let diag = Diagnostic::new("outer_local_must_be_final", UnitId(0), reference.span);
        (project, oracle, diag, local)
    }

    #[test]
    fn captured_local_becomes_final() {
        let (project, oracle, diag, local) = captured("int x= 1;", "x");
        let fixes = plan(&project, &oracle, &diag);
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].label, "Change modifier of 'x' to 'final'");
        assert_eq!(
            fixes[0].plan.ops,
            vec![EditOperation::AddModifier {
                target: DeclRef::new(UnitId(0), local),
                modifier: Modifier::Final
            }]
        );
    }

    #[test]
    fn co_declared_local_is_split_first() {
        let (project, oracle, diag, _) = captured("int a= 0, x= 1, b= 2;", "x");
        let fixes = plan(&project, &oracle, &diag);
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].plan.ops[0].name(), "split_declarator");
    }

    #[test]
    fn already_final_local_yields_nothing() {
        let (project, oracle, diag, _) = captured("final int x= 1;", "x");
        assert!(plan(&project, &oracle, &diag).is_empty());
    }

    #[test]
    fn final_volatile_field_offers_both_removals() {
        let src = "class E {\n    final volatile int x= 1;\n}\n";
        let mut b = UnitBuilder::new("E.java", src);
        let e = b.ty(None, "E");
        b.field(e, "x");
        let span = b.span_of("x=");
        let project = ProjectSnapshot::new(vec![b.build()]);
        let diag = Diagnostic::new(
            "illegal_modifier_combination_final_volatile_for_field",
            UnitId(0),
            Span::new(span.start, span.start + 1),
        );
        let fixes = plan(&project, &SnapshotOracle::new(), &diag);
        let labels: Vec<_> = fixes.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Remove 'volatile' modifier of 'x'", "Remove 'final' modifier of 'x'"]
        );
    }

    #[test]
    fn final_field_assignment_removes_final_at_the_declaration() {
        let src = "class E {\n    final int x= 1;\n    void foo() {\n        x= 2;\n    }\n}\n";
        let mut b = UnitBuilder::new("E.java", src);
        let e = b.ty(None, "E");
        let x = b.field(e, "x");
        let foo = b.method(e, "foo");
        let r = b.reference(foo, "x= 2", "x");
        let project = ProjectSnapshot::new(vec![b.build()]);
        let reference = project.units[0].references[r].clone();
        let mut oracle = SnapshotOracle::new();
        oracle.bind(UnitId(0), &reference, DeclRef::new(UnitId(0), x));
        let diag = Diagnostic::new("final_field_assignment", UnitId(0), reference.span);
        let fixes = plan(&project, &oracle, &diag);
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].fix_key, "modifier.remove_final");
    }
}
