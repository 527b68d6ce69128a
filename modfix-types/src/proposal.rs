use crate::ast::UnitId;
use crate::plan::EditPlan;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Full text of one affected file after applying a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePreview {
    pub unit: UnitId,
    pub path: Utf8PathBuf,
    pub text: String,
}

/// A candidate fix handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Deterministic id, stable across identical requests.
    pub id: String,
    /// Diagnostic id this proposal answers.
    pub diagnostic: String,
    pub fix_key: String,
    pub label: String,
    pub plan: EditPlan,
    pub previews: Vec<FilePreview>,
}

impl Proposal {
    pub fn preview_for(&self, unit: UnitId) -> Option<&str> {
        self.previews
            .iter()
            .find(|p| p.unit == unit)
            .map(|p| p.text.as_str())
    }

    /// Preview of the first unit the plan edits.
    pub fn primary_preview(&self) -> Option<&str> {
        self.plan.units.first().and_then(|u| self.preview_for(*u))
    }
}
