//! Byte-range replacements over a unit's text.

use crate::error::{ContractError, EditResult};
use modfix_types::ast::{Span, UnitId};

/// Replace `span` with `replacement`; an empty span is a pure insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub span: Span,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(Span::empty(at), text)
    }

    pub fn delete(span: Span) -> Self {
        Self::replace(span, String::new())
    }
}

/// `span` extended over the whitespace, line breaks included, that follows it.
pub fn with_trailing_whitespace(text: &str, span: Span) -> Span {
    let rest = text.get(span.end..).unwrap_or("");
    let skipped = rest.len() - rest.trim_start().len();
    Span::new(span.start, span.end + skipped)
}

/// Applies `edits` to `base`, whose first byte sits at absolute offset `offset`.
///
/// Edits are sorted by position; insertions at one offset keep their given order. Edits must not
/// overlap and must lie within `base`.
pub fn apply_edits(
    unit: UnitId,
    base: &str,
    offset: usize,
    mut edits: Vec<TextEdit>,
) -> EditResult<String> {
    edits.sort_by_key(|e| (e.span.start, e.span.end));
    let mut out = String::with_capacity(base.len());
    let mut cursor = offset;
    for edit in &edits {
        let Span { start, end } = edit.span;
        if start < cursor || end > offset + base.len() {
            return Err(ContractError::OverlappingEdits {
                unit: unit.0,
                at: start,
            }
            .into());
        }
        let Some(kept) = base.get(cursor - offset..start - offset) else {
            return Err(ContractError::NotApplicable {
                op: "text_edit",
                reason: format!("byte {start} is not a character boundary"),
            }
            .into());
        };
        out.push_str(kept);
        out.push_str(&edit.replacement);
        cursor = end;
    }
    out.push_str(base.get(cursor - offset..).unwrap_or(""));
    Ok(out)
}
