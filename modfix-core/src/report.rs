//! JSON rendering of collected corrections.

use crate::pipeline::DiagnosticCorrections;
use anyhow::Context;
use serde::Serialize;

pub const SCHEMA: &str = "modfix.corrections.v1";

#[derive(Debug, Serialize)]
struct CorrectionsReport<'a> {
    schema: &'static str,
    diagnostics: &'a [DiagnosticCorrections],
}

/// Pretty JSON document listing every diagnostic with its proposals.
pub fn to_json(results: &[DiagnosticCorrections]) -> anyhow::Result<String> {
    let report = CorrectionsReport {
        schema: SCHEMA,
        diagnostics: results,
    };
    serde_json::to_string_pretty(&report).context("serialize corrections report")
}

#[cfg(test)]
mod tests {
    use super::*;
    use modfix_types::ast::{Span, UnitId};
    use modfix_types::diagnostic::Diagnostic;

    #[test]
    fn empty_results_still_carry_the_schema() {
        let results = vec![DiagnosticCorrections {
            diagnostic: Diagnostic::new("no_such_problem", UnitId(0), Span::new(1, 2)),
            proposals: vec![],
            error: None,
        }];
        let json: serde_json::Value = serde_json::from_str(&to_json(&results).unwrap()).unwrap();
        assert_eq!(json["schema"], SCHEMA);
        assert_eq!(json["diagnostics"][0]["diagnostic"]["id"], "no_such_problem");
        assert_eq!(json["diagnostics"][0]["proposals"], serde_json::json!([]));
        assert!(json["diagnostics"][0].get("error").is_none());
    }
}
