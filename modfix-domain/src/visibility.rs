//! Minimal access level that makes a reference legal.

use crate::ports::BindingOracle;
use modfix_types::ast::{DeclKind, DeclRef, ProjectSnapshot, TypeNesting, Visibility};

/// How an accessor relates to the declaration it reaches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRelation {
    SamePackage,
    /// Accessor's type is a subtype of the target's declaring type, in another package.
    Subtype,
    Unrelated,
}

impl AccessRelation {
    pub fn minimum(self) -> Visibility {
        match self {
            AccessRelation::SamePackage => Visibility::Package,
            AccessRelation::Subtype => Visibility::Protected,
            AccessRelation::Unrelated => Visibility::Public,
        }
    }
}

pub fn relation(
    project: &ProjectSnapshot,
    oracle: &dyn BindingOracle,
    accessor: DeclRef,
    target: DeclRef,
) -> AccessRelation {
    if project.package_of(accessor) == project.package_of(target) {
        return AccessRelation::SamePackage;
    }
    let accessor_type = project
        .unit(accessor.unit)
        .and_then(|u| u.owning_type(accessor.decl))
        .map(|d| DeclRef::new(accessor.unit, d));
    let declaring_type = project
        .unit(target.unit)
        .and_then(|u| u.enclosing_type(target.decl))
        .map(|d| DeclRef::new(target.unit, d));
    match (accessor_type, declaring_type) {
        (Some(sub), Some(sup)) if oracle.is_subtype(sub, sup) => AccessRelation::Subtype,
        _ => AccessRelation::Unrelated,
    }
}

/// Level `target` must be raised to so that `accessor` may use it.
///
/// When the relation-derived minimum would not loosen the current level the answer is `public`.
/// Top-level types cannot be `protected`, so they go straight to `public`. Returns `None` when
/// the target is already public.
pub fn required_visibility(
    project: &ProjectSnapshot,
    oracle: &dyn BindingOracle,
    accessor: DeclRef,
    target: DeclRef,
) -> Option<Visibility> {
    let unit = project.unit(target.unit)?;
    let decl = unit.decl(target.decl)?;
    let current = unit.effective_visibility(target.decl);

    let mut level = relation(project, oracle, accessor, target).minimum();
    if level <= current {
        level = Visibility::Public;
    }
    let top_level_type = decl.kind == DeclKind::Type
        && decl
            .type_info()
            .is_some_and(|t| t.nesting == TypeNesting::TopLevel);
    if top_level_type && level == Visibility::Protected {
        level = Visibility::Public;
    }
    (level > current).then_some(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::SnapshotOracle;
    use modfix_types::fixture::UnitBuilder;
    use proptest::prelude::*;

    struct World {
        project: ProjectSnapshot,
        oracle: SnapshotOracle,
        target: DeclRef,
        accessor: DeclRef,
    }

    /// `C.m` declared with `vis` in package `a`; accessor method `E.use` in `pkg`.
    fn world(vis: &str, pkg: &str, subtype: bool) -> World {
        let c_src = format!("package a;\npublic class C {{\n    {vis} void m() {{}}\n}}\n");
        let mut cb = UnitBuilder::new("a/C.java", c_src);
        let c = cb.ty(None, "C");
        let m = cb.method(c, "m");

        let e_src = format!("package {pkg};\npublic class E {{\n    void use() {{}}\n}}\n");
        let mut eb = UnitBuilder::new(format!("{pkg}/E.java"), e_src);
        let e = eb.ty(None, "E");
        let u = eb.method(e, "use");

        let mut project = ProjectSnapshot::default();
        let cu = project.push(cb.build());
        let eu = project.push(eb.build());
        let mut oracle = SnapshotOracle::new();
        if subtype {
            oracle.extends(DeclRef::new(eu, e), DeclRef::new(cu, c));
        }
        World {
            project,
            oracle,
            target: DeclRef::new(cu, m),
            accessor: DeclRef::new(eu, u),
        }
    }

    fn required(w: &World) -> Option<Visibility> {
        required_visibility(&w.project, &w.oracle, w.accessor, w.target)
    }

    #[test]
    fn same_package_needs_package() {
        assert_eq!(required(&world("private", "a", false)), Some(Visibility::Package));
        assert_eq!(required(&world("private", "a", true)), Some(Visibility::Package));
    }

    #[test]
    fn subtype_elsewhere_needs_protected() {
        assert_eq!(required(&world("private", "b", true)), Some(Visibility::Protected));
    }

    #[test]
    fn unrelated_needs_public() {
        assert_eq!(required(&world("", "b", false)), Some(Visibility::Public));
    }

    #[test]
    fn minimum_at_or_below_current_bumps_to_public() {
        assert_eq!(required(&world("protected", "b", true)), Some(Visibility::Public));
        assert_eq!(required(&world("public", "b", false)), None);
    }

    #[test]
    fn top_level_types_skip_protected() {
        let src = "package a;\nclass C {}\n";
        let mut b = UnitBuilder::new("a/C.java", src);
        let c = b.ty(None, "C");
        let other = "package b;\nclass E {}\n";
        let mut eb = UnitBuilder::new("b/E.java", other);
        let e = eb.ty(None, "E");
        let mut project = ProjectSnapshot::default();
        let cu = project.push(b.build());
        let eu = project.push(eb.build());
        let oracle = SnapshotOracle::new();
        assert_eq!(
            required_visibility(&project, &oracle, DeclRef::new(eu, e), DeclRef::new(cu, c)),
            Some(Visibility::Public)
        );
    }

    fn vis_strategy() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just("private"), Just(""), Just("protected"), Just("public")]
    }

    proptest! {
        #[test]
        fn relaxation_never_lowers_and_covers_the_relation(
            vis in vis_strategy(),
            same_pkg in any::<bool>(),
            subtype in any::<bool>(),
        ) {
            let w = world(vis, if same_pkg { "a" } else { "b" }, subtype);
            let current = w.project.unit(w.target.unit).unwrap().effective_visibility(w.target.decl);
            let minimum = relation(&w.project, &w.oracle, w.accessor, w.target).minimum();
            match required(&w) {
                Some(level) => {
                    prop_assert!(level > current);
                    prop_assert!(level >= minimum);
                }
                None => prop_assert_eq!(current, Visibility::Public),
            }
        }
    }
}
