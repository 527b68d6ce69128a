//! Edit engine for modfix plans.
//!
//! Responsibilities:
//! - Validate a plan against the project it was computed for.
//! - Apply operations to private copies of the affected units, keeping all other text intact.
//! - Generate a unified diff preview.

mod error;
mod modifiers;
mod render;
mod text;
mod validate;

pub use error::{ContractError, EditError, EditResult};
pub use render::render_plan;
pub use text::{apply_edits, with_trailing_whitespace, TextEdit};
pub use validate::validate_plan;

use diffy::PatchFormatter;
use modfix_types::ast::ProjectSnapshot;
use modfix_types::plan::EditPlan;
use modfix_types::proposal::FilePreview;

/// Layout choices for generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// One level of indentation inside generated bodies and members.
    pub indent_unit: String,
    pub line_separator: String,
    /// Rewrite `{"a", "b"}` minus one token as `"b"` rather than `{"b"}`.
    pub collapse_single_suppress_token: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent_unit: "    ".to_string(),
            line_separator: "\n".to_string(),
            collapse_single_suppress_token: false,
        }
    }
}

/// Renders `plan` and formats the changed units as one unified diff.
pub fn preview_patch(
    project: &ProjectSnapshot,
    plan: &EditPlan,
    opts: &RenderOptions,
) -> EditResult<String> {
    let previews = render_plan(project, plan, opts)?;
    Ok(render_patch(project, &previews))
}

fn render_patch(project: &ProjectSnapshot, previews: &[FilePreview]) -> String {
    let mut out = String::new();
    let formatter = PatchFormatter::new();

    for preview in previews {
        let Some(old) = project.unit(preview.unit).map(|u| u.text.as_str()) else {
            continue;
        };
        if old == preview.text {
            continue;
        }

        out.push_str(&format!("diff --git a/{0} b/{0}\n", preview.path));
        out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", preview.path));

        let patch = diffy::create_patch(old, &preview.text);
        out.push_str(&formatter.fmt_patch(&patch).to_string());
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }

    out
}
