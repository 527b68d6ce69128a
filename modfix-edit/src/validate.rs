//! Structural checks run before any text is touched.

use crate::error::{ContractError, EditResult};
use modfix_types::ast::ProjectSnapshot;
use modfix_types::ops::EditOperation;
use modfix_types::plan::EditPlan;
use std::collections::BTreeSet;
use tracing::warn;

/// Rejects plans that no renderer could apply faithfully.
pub fn validate_plan(project: &ProjectSnapshot, plan: &EditPlan) -> EditResult<()> {
    let result = check(project, plan);
    if let Err(err) = &result {
        warn!(error = %err, "rejecting edit plan");
    }
    result.map_err(Into::into)
}

fn check(project: &ProjectSnapshot, plan: &EditPlan) -> Result<(), ContractError> {
    let mut added = BTreeSet::new();
    let mut removed = BTreeSet::new();

    for op in &plan.ops {
        let unit_id = op.unit();
        if !plan.units.contains(&unit_id) {
            return Err(ContractError::UnlistedUnit { unit: unit_id.0 });
        }
        let Some(unit) = project.unit(unit_id) else {
            return Err(ContractError::MissingSite {
                unit: unit_id.0,
                what: "such unit".to_string(),
            });
        };
        if let Some(target) = op.target() {
            if unit.decl(target.decl).is_none() {
                return Err(ContractError::MissingSite {
                    unit: unit_id.0,
                    what: format!("declaration {}", target.decl.0),
                });
            }
        }

        match op {
            EditOperation::AddModifier { target, modifier } => {
                added.insert((*target, *modifier));
            }
            EditOperation::RemoveModifier { target, modifier } => {
                removed.insert((*target, *modifier));
            }
            EditOperation::SplitDeclarator { group, .. } => {
                let Some(g) = unit.group(*group) else {
                    return Err(ContractError::MissingSite {
                        unit: unit_id.0,
                        what: format!("declarator group {}", group.0),
                    });
                };
                if !g.terminated && g.declarators.len() > 1 {
                    return Err(ContractError::UnsplittableGroup {
                        unit: unit_id.0,
                        group: group.0,
                    });
                }
            }
            EditOperation::DeclareLocal { reference, .. } => {
                if unit.references.get(*reference).is_none() {
                    return Err(ContractError::MissingSite {
                        unit: unit_id.0,
                        what: format!("reference {reference}"),
                    });
                }
            }
            EditOperation::RemoveStatement { span, .. } => {
                if span.end > unit.text.len() || span.is_empty() {
                    return Err(ContractError::MissingSite {
                        unit: unit_id.0,
                        what: format!("statement at {}..{}", span.start, span.end),
                    });
                }
            }
            _ => {}
        }
    }

    if let Some((target, modifier)) = added.intersection(&removed).next() {
        return Err(ContractError::ConflictingModifier {
            unit: target.unit.0,
            decl: target.decl.0,
            modifier: *modifier,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modfix_types::ast::{DeclId, DeclRef, GroupId, Modifier, UnitId};
    use modfix_types::fixture::UnitBuilder;

    fn project() -> ProjectSnapshot {
        let src = "class A {\n    void foo() {\n        for (int i = 0, j = 1; i < j; i++) {}\n    }\n}\n";
        let mut b = UnitBuilder::new("A.java", src);
        let a = b.ty(None, "A");
        let foo = b.method(a, "foo");
        b.local(foo, "i");
        ProjectSnapshot::new(vec![b.build()])
    }

    #[test]
    fn adding_and_removing_one_keyword_conflicts() {
        let target = DeclRef::new(UnitId(0), DeclId(1));
        let plan = EditPlan::new(vec![
            EditOperation::AddModifier {
                target,
                modifier: Modifier::Static,
            },
            EditOperation::RemoveModifier {
                target,
                modifier: Modifier::Static,
            },
        ]);
        assert_eq!(
            check(&project(), &plan),
            Err(ContractError::ConflictingModifier {
                unit: 0,
                decl: 1,
                modifier: Modifier::Static
            })
        );
    }

    #[test]
    fn for_initializers_cannot_be_split() {
        let plan = EditPlan::single(EditOperation::SplitDeclarator {
            unit: UnitId(0),
            group: GroupId(0),
        });
        assert_eq!(
            check(&project(), &plan),
            Err(ContractError::UnsplittableGroup { unit: 0, group: 0 })
        );
    }

    #[test]
    fn every_op_unit_must_be_listed() {
        let mut plan = EditPlan::single(EditOperation::RemoveBody {
            target: DeclRef::new(UnitId(0), DeclId(1)),
        });
        plan.units.clear();
        assert_eq!(
            check(&project(), &plan),
            Err(ContractError::UnlistedUnit { unit: 0 })
        );
    }

    #[test]
    fn unknown_declarations_are_rejected() {
        let plan = EditPlan::single(EditOperation::RemoveBody {
            target: DeclRef::new(UnitId(0), DeclId(40)),
        });
        assert!(validate_plan(&project(), &plan).unwrap_err().is_contract_violation());
    }
}
