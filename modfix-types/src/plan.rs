use crate::ast::UnitId;
use crate::ops::EditOperation;
use serde::{Deserialize, Serialize};

/// Ordered edits applied together to produce one proposal.
///
/// `units` lists every unit the plan edits; a plan spanning two files names both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditPlan {
    pub units: Vec<UnitId>,
    pub ops: Vec<EditOperation>,
}

impl EditPlan {
    pub fn new(ops: Vec<EditOperation>) -> Self {
        let mut plan = Self {
            units: Vec::new(),
            ops: Vec::new(),
        };
        for op in ops {
            plan.push(op);
        }
        plan
    }

    pub fn single(op: EditOperation) -> Self {
        Self::new(vec![op])
    }

    pub fn push(&mut self, op: EditOperation) {
        let unit = op.unit();
        if !self.units.contains(&unit) {
            self.units.push(unit);
        }
        self.ops.push(op);
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops_for(&self, unit: UnitId) -> impl Iterator<Item = &EditOperation> + '_ {
        self.ops.iter().filter(move |op| op.unit() == unit)
    }
}

/// A candidate fix as produced by a fixer, before rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedFix {
    /// Stable key of the fix shape, e.g. `"modifier.add_static"`.
    pub fix_key: String,
    pub label: String,
    pub plan: EditPlan,
}

impl PlannedFix {
    pub fn new(fix_key: impl Into<String>, label: impl Into<String>, plan: EditPlan) -> Self {
        Self {
            fix_key: fix_key.into(),
            label: label.into(),
            plan,
        }
    }
}
