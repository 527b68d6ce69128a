//! Embeddable core library for modfix.
//!
//! Ties the planner and the renderer together behind one request/response call. The caller owns
//! parsing and binding: it hands over a resolved [`ProjectSnapshot`](modfix_types::ast::ProjectSnapshot)
//! and a [`BindingOracle`], and gets back proposals with full-file previews.
//!
//! # Entry points
//!
//! - [`collect_corrections`](pipeline::collect_corrections): proposals for one diagnostic
//! - [`collect_corrections_batch`](pipeline::collect_corrections_batch): independent proposals
//!   for several diagnostics of one project
//!
//! Settings come from [`EngineSettings`](settings::EngineSettings), optionally loaded from a
//! `modfix.toml` through [`config::load_settings`].

pub mod assembler;
pub mod config;
pub mod pipeline;
pub mod report;
pub mod settings;

pub use assembler::ProposalAssembler;
pub use config::{load_settings, ConfigError};
pub use pipeline::{
    collect_corrections, collect_corrections_batch, CorrectionError, DiagnosticCorrections,
};
pub use settings::EngineSettings;

// Re-export the port so callers don't need modfix-domain directly.
pub use modfix_domain::{BindingOracle, SnapshotOracle};
