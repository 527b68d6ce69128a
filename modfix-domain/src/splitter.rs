//! Planning side of multi-declarator splitting.
//!
//! A variable declared together with others shares one modifier list. A per-variable modifier
//! change first emits `SplitDeclarator` so that the renderer can give each variable its own
//! statement and apply the change to the targeted one only.

use modfix_types::ast::{DeclRef, GroupId, ProjectSnapshot};
use modfix_types::ops::EditOperation;
use modfix_types::plan::EditPlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitNeed {
    /// The target owns its modifier list.
    Inline,
    /// The target shares a statement that has to be split first.
    Split(GroupId),
    /// The target shares a `for` initializer, which cannot be split into statements.
    Refused,
}

pub fn split_need(project: &ProjectSnapshot, target: DeclRef) -> SplitNeed {
    let Some(unit) = project.unit(target.unit) else {
        return SplitNeed::Inline;
    };
    let group = unit
        .decl(target.decl)
        .and_then(|d| d.variable_info())
        .and_then(|v| v.group);
    let Some(group_id) = group else {
        return SplitNeed::Inline;
    };
    match unit.group(group_id) {
        Some(g) if g.declarators.len() > 1 && !g.terminated => SplitNeed::Refused,
        Some(g) if g.declarators.len() > 1 => SplitNeed::Split(group_id),
        _ => SplitNeed::Inline,
    }
}

/// Wraps per-variable `ops` on `target` into a plan, splitting its statement first when shared.
///
/// Returns `None` when the variable sits in a multi-declarator `for` initializer.
pub fn isolated_plan(
    project: &ProjectSnapshot,
    target: DeclRef,
    ops: Vec<EditOperation>,
) -> Option<EditPlan> {
    let mut plan = EditPlan::default();
    match split_need(project, target) {
        SplitNeed::Refused => return None,
        SplitNeed::Split(group) => plan.push(EditOperation::SplitDeclarator {
            unit: target.unit,
            group,
        }),
        SplitNeed::Inline => {}
    }
    for op in ops {
        plan.push(op);
    }
    Some(plan)
}
