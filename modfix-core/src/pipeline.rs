//! The "collect corrections" entry points.
//!
//! Each call is request-scoped: the project snapshot is only read, previews are rendered into
//! fresh buffers, and nothing survives the call.

use crate::assembler::ProposalAssembler;
use crate::settings::EngineSettings;
use modfix_domain::{BindingOracle, PlanContext, Planner};
use modfix_edit::EditError;
use modfix_types::ast::ProjectSnapshot;
use modfix_types::diagnostic::Diagnostic;
use modfix_types::proposal::Proposal;
use serde::Serialize;
use tracing::{debug, warn};

/// Error type for pipeline results.
#[derive(Debug, thiserror::Error)]
pub enum CorrectionError {
    /// A fixer failed while planning.
    #[error("{0:#}")]
    Planning(#[from] anyhow::Error),

    /// A planned fix could not be rendered.
    #[error(transparent)]
    Render(#[from] EditError),
}

/// Proposals for one diagnostic of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticCorrections {
    pub diagnostic: Diagnostic,
    pub proposals: Vec<Proposal>,
    /// Set when planning or rendering failed; `proposals` is then empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Proposals for one diagnostic, in emission order.
///
/// Unknown diagnostic ids and unresolvable sites yield an empty list, not an error.
pub fn collect_corrections(
    project: &ProjectSnapshot,
    oracle: &dyn BindingOracle,
    diag: &Diagnostic,
    settings: &EngineSettings,
) -> Result<Vec<Proposal>, CorrectionError> {
    let config = settings.planner_config();
    let ctx = PlanContext {
        project,
        oracle,
        config: &config,
    };
    let fixes = Planner::new().plan(&ctx, diag)?;
    let assembler = ProposalAssembler::new(settings.render_options());
    let proposals = assembler.assemble(project, diag, fixes)?;
    debug!(id = %diag.id, count = proposals.len(), "collected corrections");
    Ok(proposals)
}

/// Proposals for each diagnostic of `diags`, planned independently of one another.
///
/// A diagnostic that fails is reported in its own entry and does not affect the others.
pub fn collect_corrections_batch(
    project: &ProjectSnapshot,
    oracle: &dyn BindingOracle,
    diags: &[Diagnostic],
    settings: &EngineSettings,
) -> Vec<DiagnosticCorrections> {
    diags
        .iter()
        .map(
            |diag| match collect_corrections(project, oracle, diag, settings) {
                Ok(proposals) => DiagnosticCorrections {
                    diagnostic: diag.clone(),
                    proposals,
                    error: None,
                },
                Err(err) => {
                    warn!(id = %diag.id, error = %err, "no corrections for diagnostic");
                    DiagnosticCorrections {
                        diagnostic: diag.clone(),
                        proposals: vec![],
                        error: Some(err.to_string()),
                    }
                }
            },
        )
        .collect()
}
