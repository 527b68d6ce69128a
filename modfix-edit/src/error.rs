//! Error types for modfix-edit.
//!
//! Two families are kept apart:
//! - Contract violations: the plan itself is malformed (conflicting edits, unknown sites,
//!   overlapping text ranges). These are planner bugs and are never silently repaired.
//! - Runtime errors: anything else raised while rendering.

use modfix_types::ast::Modifier;
use thiserror::Error;

/// The top-level error type for modfix-edit operations.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("contract violation: {0}")]
    Contract(#[from] ContractError),

    #[error("runtime error: {0}")]
    Runtime(#[from] anyhow::Error),
}

/// A plan that cannot be rendered as written.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContractError {
    #[error("operation on unit {unit} but the plan does not list that unit")]
    UnlistedUnit { unit: u32 },

    #[error("unit {unit} has no {what}")]
    MissingSite { unit: u32, what: String },

    /// The same keyword is both added to and removed from one declaration.
    #[error("plan both adds and removes `{modifier}` on declaration {decl} of unit {unit}")]
    ConflictingModifier {
        unit: u32,
        decl: u32,
        modifier: Modifier,
    },

    #[error("group {group} of unit {unit} shares a for initializer and cannot be split")]
    UnsplittableGroup { unit: u32, group: u32 },

    #[error("edits overlap at byte {at} of unit {unit}")]
    OverlappingEdits { unit: u32, at: usize },

    #[error("{op} does not apply: {reason}")]
    NotApplicable { op: &'static str, reason: String },
}

impl EditError {
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, EditError::Contract(_))
    }
}

/// Result type alias using EditError.
pub type EditResult<T> = Result<T, EditError>;

#[cfg(test)]
mod tests {
    use super::{ContractError, EditError};
    use modfix_types::ast::Modifier;

    #[test]
    fn contract_errors_are_flagged() {
        let err = EditError::from(ContractError::ConflictingModifier {
            unit: 0,
            decl: 3,
            modifier: Modifier::Static,
        });
        assert!(err.is_contract_violation());
        assert!(err.to_string().contains("contract violation"));
        assert!(err.to_string().contains("`static`"));
    }

    #[test]
    fn runtime_errors_are_not_contract_violations() {
        let err = EditError::from(anyhow::anyhow!("boom"));
        assert!(!err.is_contract_violation());
        assert!(err.to_string().contains("runtime error"));
    }
}
