//! End-to-end planning scenarios: plan a diagnostic, then render every fix to full-file text.

use modfix_domain::{PlanContext, Planner, PlannerConfig, SnapshotOracle};
use modfix_edit::{render_plan, RenderOptions};
use modfix_types::ast::{DeclRef, ProjectSnapshot, Span, UnitId};
use modfix_types::diagnostic::Diagnostic;
use modfix_types::fixture::UnitBuilder;
use modfix_types::plan::PlannedFix;
use pretty_assertions::assert_eq;

const C_SRC: &str = "package test1;\npublic class C {\n    private int fXoo;\n}\n";

struct Scenario {
    project: ProjectSnapshot,
    oracle: SnapshotOracle,
    diag: Diagnostic,
}

impl Scenario {
    fn plan(&self) -> Vec<PlannedFix> {
        let config = PlannerConfig::default();
        let ctx = PlanContext {
            project: &self.project,
            oracle: &self.oracle,
            config: &config,
        };
        Planner::new().plan(&ctx, &self.diag).unwrap()
    }

    /// Text of `unit` after applying `fix`.
    fn render(&self, fix: &PlannedFix, unit: UnitId) -> String {
        let previews = render_plan(&self.project, &fix.plan, &RenderOptions::default()).unwrap();
        previews
            .into_iter()
            .find(|p| p.unit == unit)
            .map(|p| p.text)
            .unwrap_or_else(|| panic!("{} does not touch unit {}", fix.fix_key, unit.0))
    }
}

/// `C` with a private `fXoo`, and a second unit using it inside method `foo`.
fn field_use(user_src: &str, user: &str, pattern: &str, subtype: bool) -> Scenario {
    let mut cb = UnitBuilder::new("test1/C.java", C_SRC);
    let c = cb.ty(None, "C");
    let field = cb.field(c, "fXoo");
    let mut ub = UnitBuilder::new(format!("test1/{user}.java"), user_src);
    let ty = ub.ty(None, user);
    let foo = ub.method(ty, "foo");
    let r = ub.reference(foo, pattern, "fXoo");

    let mut project = ProjectSnapshot::default();
    let cu = project.push(cb.build());
    let uu = project.push(ub.build());
    let reference = project.units[uu.index()].references[r].clone();
    let mut oracle = SnapshotOracle::new();
    oracle.bind(uu, &reference, DeclRef::new(cu, field));
    let id = if subtype {
        oracle.extends(DeclRef::new(uu, ty), DeclRef::new(cu, c));
        "not_visible_inherited_field"
    } else {
        "not_visible_field"
    };
    Scenario {
        project,
        oracle,
        diag: Diagnostic::new(id, uu, reference.span),
    }
}

/// One unit; `build` registers declarations and returns the diagnostic span.
fn single_unit(src: &str, id: &str, build: impl FnOnce(&mut UnitBuilder) -> Span) -> Scenario {
    let mut b = UnitBuilder::new("E.java", src);
    let span = build(&mut b);
    Scenario {
        project: ProjectSnapshot::new(vec![b.build()]),
        oracle: SnapshotOracle::new(),
        diag: Diagnostic::new(id, UnitId(0), span),
    }
}

#[test]
fn unrelated_class_in_the_package_gets_one_relaxation() {
    let src = "package test1;\npublic class F {\n    public void foo(C c) {\n         c.fXoo= 1;\n    }\n}\n";
    let s = field_use(src, "F", "c.fXoo= 1", false);

    let fixes = s.plan();

    assert_eq!(fixes.len(), 1);
    assert_eq!(fixes[0].label, "Change visibility of 'fXoo' to 'package'");
    assert_eq!(
        s.render(&fixes[0], UnitId(0)),
        "package test1;\npublic class C {\n    int fXoo;\n}\n"
    );
}

#[test]
fn subtype_write_gets_five_fixes() {
    let src = "package test1;\npublic class E extends C {\n    public void foo() {\n         fXoo= 1;\n    }\n}\n";
    let s = field_use(src, "E", "fXoo= 1", true);

    let fixes = s.plan();

    let rendered: Vec<(UnitId, String)> = fixes
        .iter()
        .map(|f| {
            let unit = f.plan.units[0];
            (unit, s.render(f, unit))
        })
        .collect();
    assert_eq!(
        rendered,
        vec![
            (UnitId(0), "package test1;\npublic class C {\n    int fXoo;\n}\n".to_string()),
            (
                UnitId(1),
                "package test1;\npublic class E extends C {\n    private int fXoo;\n    public void foo() {\n         fXoo= 1;\n    }\n}\n"
                    .to_string()
            ),
            (
                UnitId(1),
                "package test1;\npublic class E extends C {\n    public void foo(int fXoo) {\n         fXoo= 1;\n    }\n}\n"
                    .to_string()
            ),
            (
                UnitId(1),
                "package test1;\npublic class E extends C {\n    public void foo() {\n         int fXoo= 1;\n    }\n}\n"
                    .to_string()
            ),
            (
                UnitId(1),
                "package test1;\npublic class E extends C {\n    public void foo() {\n    }\n}\n"
                    .to_string()
            ),
        ]
    );
}

#[test]
fn abstract_method_with_body_gets_two_fixes() {
    let src = "public abstract class E {\n    public abstract void foo() {\n    }\n}\n";
    let s = single_unit(src, "abstract_method_with_body", |b| {
        let e = b.ty(None, "E");
        b.method(e, "foo");
        b.span_of("foo")
    });

    let texts: Vec<String> = s.plan().iter().map(|f| s.render(f, UnitId(0))).collect();

    assert_eq!(
        texts,
        vec![
            "public abstract class E {\n    public void foo() {\n    }\n}\n".to_string(),
            "public abstract class E {\n    public abstract void foo();\n}\n".to_string(),
        ]
    );
}

#[test]
fn abstract_in_concrete_class_is_planned_per_side() {
    let src = "class E {\n    abstract int foo();\n}\n";
    let on_method = single_unit(src, "abstract_method_in_concrete_class", |b| {
        let e = b.ty(None, "E");
        b.method(e, "foo");
        b.span_of("foo")
    });
    let texts: Vec<String> = on_method
        .plan()
        .iter()
        .map(|f| on_method.render(f, UnitId(0)))
        .collect();
    assert_eq!(
        texts,
        vec![
            "class E {\n    int foo() {\n        return 0;\n    }\n}\n".to_string(),
            "abstract class E {\n    abstract int foo();\n}\n".to_string(),
        ]
    );

    let on_type = single_unit(src, "abstract_methods_in_concrete_class", |b| {
        let e = b.ty(None, "E");
        b.method(e, "foo");
        b.span_of("E")
    });
    let fixes = on_type.plan();
    assert_eq!(fixes.len(), 1);
    assert_eq!(
        on_type.render(&fixes[0], UnitId(0)),
        "abstract class E {\n    abstract int foo();\n}\n"
    );
}

#[test]
fn making_a_method_static_inserts_only_the_keyword() {
    let src = "class E {\n    void foo() {}\n    static void run() {\n        foo();\n    }\n}\n";
    let mut b = UnitBuilder::new("E.java", src);
    let e = b.ty(None, "E");
    let foo = b.method(e, "foo");
    let run = b.method(e, "run");
    let r = b.reference(run, "foo();", "foo");
    let project = ProjectSnapshot::new(vec![b.build()]);
    let reference = project.units[0].references[r].clone();
    let mut oracle = SnapshotOracle::new();
    oracle.bind(UnitId(0), &reference, DeclRef::new(UnitId(0), foo));
    let s = Scenario {
        project,
        oracle,
        diag: Diagnostic::new("static_method_requested", UnitId(0), reference.span),
    };

    let fixes = s.plan();

    assert_eq!(fixes.len(), 1);
    assert_eq!(
        s.render(&fixes[0], UnitId(0)),
        "class E {\n    static void foo() {}\n    static void run() {\n        foo();\n    }\n}\n"
    );
}

#[test]
fn shared_field_statement_is_split_before_the_change() {
    let src = "class E {\n    int a, b;\n    static void run() {\n        b = 1;\n    }\n}\n";
    let mut builder = UnitBuilder::new("E.java", src);
    let e = builder.ty(None, "E");
    let b = builder.field(e, "b");
    let run = builder.method(e, "run");
    let r = builder.reference(run, "b = 1", "b");
    let project = ProjectSnapshot::new(vec![builder.build()]);
    let reference = project.units[0].references[r].clone();
    let mut oracle = SnapshotOracle::new();
    oracle.bind(UnitId(0), &reference, DeclRef::new(UnitId(0), b));
    let s = Scenario {
        project,
        oracle,
        diag: Diagnostic::new("static_field_requested", UnitId(0), reference.span),
    };

    let fixes = s.plan();

    assert_eq!(fixes.len(), 1);
    assert_eq!(
        s.render(&fixes[0], UnitId(0)),
        "class E {\n    int a;\n    static int b;\n    static void run() {\n        b = 1;\n    }\n}\n"
    );
}
