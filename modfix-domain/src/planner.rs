use crate::classifier::{self, ProblemKind};
use crate::fixers;
use crate::locator;
use crate::ports::BindingOracle;
use anyhow::Context;
use modfix_types::ast::ProjectSnapshot;
use modfix_types::diagnostic::Diagnostic;
use modfix_types::plan::PlannedFix;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Return statements synthesized into new method bodies, keyed by the kind of return type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultReturns {
    pub boolean: String,
    pub numeric: String,
    pub reference: String,
}

impl Default for DefaultReturns {
    fn default() -> Self {
        Self {
            boolean: "false".to_string(),
            numeric: "0".to_string(),
            reference: "null".to_string(),
        }
    }
}

impl DefaultReturns {
    /// Expression to return from a method declared to return `ty`; `None` for `void`.
    pub fn for_type(&self, ty: &str) -> Option<String> {
        match ty.trim() {
            "void" => None,
            "boolean" => Some(self.boolean.clone()),
            "byte" | "short" | "int" | "long" | "float" | "double" | "char" => {
                Some(self.numeric.clone())
            }
            _ => Some(self.reference.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlannerConfig {
    pub default_returns: DefaultReturns,
    /// Offer `@SuppressWarnings` on the next enclosing declaration as a second alternative.
    pub secondary_suppress_target: bool,
}

pub struct PlanContext<'a> {
    pub project: &'a ProjectSnapshot,
    pub oracle: &'a dyn BindingOracle,
    pub config: &'a PlannerConfig,
}

/// Turns one diagnostic into candidate fixes.
#[derive(Debug, Default, Clone, Copy)]
pub struct Planner;

impl Planner {
    pub fn new() -> Self {
        Self
    }

    pub fn plan(
        &self,
        ctx: &PlanContext<'_>,
        diag: &Diagnostic,
    ) -> anyhow::Result<Vec<PlannedFix>> {
        let kind = classifier::classify(&diag.id);
        if kind == ProblemKind::Unsupported {
            debug!(id = %diag.id, "unsupported diagnostic");
            return Ok(vec![]);
        }
        let Some(fixer) = fixers::fixer_for(kind) else {
            return Ok(vec![]);
        };
        let Some(problem) = locator::locate(ctx.project, ctx.oracle, diag, kind) else {
            return Ok(vec![]);
        };

        let meta = fixer.meta();
        let mut fixes = fixer
            .plan(ctx, &problem)
            .with_context(|| format!("fixer {} failed on {}", meta.name, diag.id))?;

        // Textually identical plans collapse to the first.
        let mut seen = Vec::with_capacity(fixes.len());
        fixes.retain(|f| {
            if seen.contains(&f.plan) {
                false
            } else {
                seen.push(f.plan.clone());
                true
            }
        });
        debug!(id = %diag.id, fixer = meta.name, count = fixes.len(), "planned");
        Ok(fixes)
    }
}
