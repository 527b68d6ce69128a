//! Turns planned fixes into the proposal list handed back to the caller.

use modfix_edit::{render_plan, EditResult, RenderOptions};
use modfix_types::ast::ProjectSnapshot;
use modfix_types::diagnostic::Diagnostic;
use modfix_types::plan::PlannedFix;
use modfix_types::proposal::{FilePreview, Proposal};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use tracing::debug;
use uuid::Uuid;

/// Renders, deduplicates and identifies proposals for one diagnostic.
///
/// Order is the planner's emission order. Two fixes whose previews are byte-identical collapse to
/// the first; a fix that changes no text is dropped.
#[derive(Debug, Clone)]
pub struct ProposalAssembler {
    render: RenderOptions,
}

impl ProposalAssembler {
    pub fn new(render: RenderOptions) -> Self {
        Self { render }
    }

    pub fn assemble(
        &self,
        project: &ProjectSnapshot,
        diag: &Diagnostic,
        fixes: Vec<PlannedFix>,
    ) -> EditResult<Vec<Proposal>> {
        let mut seen = BTreeSet::new();
        let mut proposals = Vec::with_capacity(fixes.len());
        for fix in fixes {
            let previews = render_plan(project, &fix.plan, &self.render)?;
            if previews.iter().all(|p| unchanged(project, p)) {
                debug!(id = %diag.id, fix_key = %fix.fix_key, "dropping fix that changes nothing");
                continue;
            }
            let digest = preview_digest(&previews);
            if !seen.insert(digest.clone()) {
                debug!(id = %diag.id, fix_key = %fix.fix_key, "dropping duplicate preview");
                continue;
            }
            proposals.push(Proposal {
                id: proposal_id(&diag.id, &fix.fix_key, &digest).to_string(),
                diagnostic: diag.id.clone(),
                fix_key: fix.fix_key,
                label: fix.label,
                plan: fix.plan,
                previews,
            });
        }
        Ok(proposals)
    }
}

fn unchanged(project: &ProjectSnapshot, preview: &FilePreview) -> bool {
    project
        .unit(preview.unit)
        .is_some_and(|u| u.text == preview.text)
}

/// sha256 over every preview's path and text, hex encoded.
pub fn preview_digest(previews: &[FilePreview]) -> String {
    let mut hasher = Sha256::new();
    for preview in previews {
        hasher.update(preview.path.as_str().as_bytes());
        hasher.update([0]);
        hasher.update(preview.text.as_bytes());
        hasher.update([0]);
    }
    hex::encode(hasher.finalize())
}

fn proposal_id(diagnostic: &str, fix_key: &str, digest: &str) -> Uuid {
    // Deterministic ID: v5(namespace, stable_key_bytes)
    const NAMESPACE: Uuid = Uuid::from_bytes([
        0x9e, 0x31, 0x6a, 0x0c, 0x52, 0x7f, 0x4d, 0x1b, 0xa4, 0x08, 0x3c, 0x6e, 0xd2, 0x15, 0x87,
        0x4f,
    ]);

    let stable_key = format!("{diagnostic}|{fix_key}|{digest}");
    Uuid::new_v5(&NAMESPACE, stable_key.as_bytes())
}
