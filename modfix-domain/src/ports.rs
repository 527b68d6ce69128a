use modfix_types::ast::{DeclRef, Reference, UnitId};
use std::collections::{BTreeMap, BTreeSet};

/// Read-only symbol and type resolution supplied by the front end.
///
/// modfix-domain only ever asks questions through this trait, so it can be driven by a real
/// compiler binding layer or by the table-backed [`SnapshotOracle`].
pub trait BindingOracle {
    /// Declaration a recorded reference binds to.
    fn resolve_reference(&self, unit: UnitId, reference: &Reference) -> Option<DeclRef>;

    /// Reflexive and transitive subtype test between two type declarations.
    fn is_subtype(&self, sub: DeclRef, sup: DeclRef) -> bool;

    /// Methods `method` overrides, nearest first, superclass chain before interfaces.
    fn overridden_methods(&self, method: DeclRef) -> Vec<DeclRef>;

    /// For a type that inherits a concrete method implementing a more visible interface method:
    /// `(inherited implementation, interface method)`.
    fn inherited_implementation(&self, _ty: DeclRef) -> Option<(DeclRef, DeclRef)> {
        None
    }

    /// Qualified name of a type called `simple_name` visible in `unit` through something other
    /// than its own imports and declarations, e.g. a same-package type.
    fn shadowing_type(&self, _unit: UnitId, _simple_name: &str) -> Option<String> {
        None
    }
}

/// Table-backed `BindingOracle`.
#[derive(Debug, Clone, Default)]
pub struct SnapshotOracle {
    bindings: BTreeMap<(UnitId, usize, usize), DeclRef>,
    supertypes: BTreeMap<DeclRef, BTreeSet<DeclRef>>,
    overrides: BTreeMap<DeclRef, Vec<DeclRef>>,
    inherited: BTreeMap<DeclRef, (DeclRef, DeclRef)>,
    shadows: BTreeMap<(UnitId, String), String>,
}

impl SnapshotOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the reference recorded at `reference` in `unit` to `target`.
    pub fn bind(&mut self, unit: UnitId, reference: &Reference, target: DeclRef) -> &mut Self {
        self.bindings
            .insert((unit, reference.span.start, reference.span.end), target);
        self
    }

    /// Records a direct `extends`/`implements` edge.
    pub fn extends(&mut self, sub: DeclRef, sup: DeclRef) -> &mut Self {
        self.supertypes.entry(sub).or_default().insert(sup);
        self
    }

    /// Appends `overridden` to the methods `method` overrides.
    pub fn overrides(&mut self, method: DeclRef, overridden: DeclRef) -> &mut Self {
        let entry = self.overrides.entry(method).or_default();
        if !entry.contains(&overridden) {
            entry.push(overridden);
        }
        self
    }

    pub fn inherits(
        &mut self,
        ty: DeclRef,
        implementation: DeclRef,
        interface_method: DeclRef,
    ) -> &mut Self {
        self.inherited.insert(ty, (implementation, interface_method));
        self
    }

    pub fn shadow(
        &mut self,
        unit: UnitId,
        simple_name: impl Into<String>,
        qualified: impl Into<String>,
    ) -> &mut Self {
        self.shadows
            .insert((unit, simple_name.into()), qualified.into());
        self
    }
}

impl BindingOracle for SnapshotOracle {
    fn resolve_reference(&self, unit: UnitId, reference: &Reference) -> Option<DeclRef> {
        self.bindings
            .get(&(unit, reference.span.start, reference.span.end))
            .copied()
    }

    fn is_subtype(&self, sub: DeclRef, sup: DeclRef) -> bool {
        let mut seen = BTreeSet::new();
        let mut stack = vec![sub];
        while let Some(current) = stack.pop() {
            if current == sup {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(parents) = self.supertypes.get(&current) {
                stack.extend(parents.iter().copied());
            }
        }
        false
    }

    fn overridden_methods(&self, method: DeclRef) -> Vec<DeclRef> {
        self.overrides.get(&method).cloned().unwrap_or_default()
    }

    fn inherited_implementation(&self, ty: DeclRef) -> Option<(DeclRef, DeclRef)> {
        self.inherited.get(&ty).copied()
    }

    fn shadowing_type(&self, unit: UnitId, simple_name: &str) -> Option<String> {
        self.shadows.get(&(unit, simple_name.to_string())).cloned()
    }
}
