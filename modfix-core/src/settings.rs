//! Immutable engine settings threaded through every request.

use modfix_domain::{DefaultReturns, PlannerConfig};
use modfix_edit::RenderOptions;
use serde::{Deserialize, Serialize};

/// Everything the engine reads from outside a request.
///
/// The value is never mutated by the engine; build one per configuration and pass it by
/// reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// One level of indentation in generated members and bodies.
    pub indent_unit: String,
    pub line_separator: String,

    /// Return statements for synthesized method bodies.
    pub default_returns: DefaultReturns,

    /// Rewrite a suppression array left with one token as the bare literal.
    pub collapse_single_suppress_token: bool,

    /// Also offer `@SuppressWarnings` on the next enclosing declaration.
    pub include_secondary_suppress_target: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            indent_unit: "    ".to_string(),
            line_separator: "\n".to_string(),
            default_returns: DefaultReturns::default(),
            collapse_single_suppress_token: false,
            include_secondary_suppress_target: true,
        }
    }
}

impl EngineSettings {
    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            default_returns: self.default_returns.clone(),
            secondary_suppress_target: self.include_secondary_suppress_target,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            indent_unit: self.indent_unit.clone(),
            line_separator: self.line_separator.clone(),
            collapse_single_suppress_token: self.collapse_single_suppress_token,
        }
    }
}
