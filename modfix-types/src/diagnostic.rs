use crate::ast::{Span, UnitId};
use serde::{Deserialize, Serialize};

/// A compiler-reported problem, as handed over by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable snake_case problem identifier, e.g. `"method_requires_body"`.
    pub id: String,
    pub unit: UnitId,
    pub span: Span,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<i64>,
}

impl Diagnostic {
    pub fn new(id: impl Into<String>, unit: UnitId, span: Span) -> Self {
        Self {
            id: id.into(),
            unit,
            span,
            args: Vec::new(),
        }
    }
}
