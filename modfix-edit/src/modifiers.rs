//! Text edits for one modifier list: keywords, marker annotations and `@SuppressWarnings` tokens.

use crate::RenderOptions;
use crate::text::{with_trailing_whitespace, TextEdit};
use modfix_types::ast::{Annotation, Modifier, ModifierList, SourceUnit, Span, SUPPRESS_WARNINGS};
use modfix_types::ops::EditOperation;

/// Everything one plan does to one modifier list, collected before any text is produced so that
/// several operations on the same list render as one coherent edit set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ListChanges {
    add: Vec<Modifier>,
    remove: Vec<Modifier>,
    insert_annotations: Vec<String>,
    remove_annotations: Vec<String>,
    merge_tokens: Vec<String>,
    /// Name `java.lang.SuppressWarnings` resolves by in the unit; new annotations are written
    /// with it.
    suppress_annotation: Option<String>,
    remove_tokens: Vec<String>,
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

fn literal(token: &str) -> String {
    format!("\"{token}\"")
}

impl ListChanges {
    /// Records `op`; returns false for operations that do not live in a modifier list.
    pub fn record(&mut self, op: &EditOperation) -> bool {
        match op {
            EditOperation::AddModifier { modifier, .. } => push_unique(&mut self.add, *modifier),
            EditOperation::RemoveModifier { modifier, .. } => {
                push_unique(&mut self.remove, *modifier)
            }
            EditOperation::InsertAnnotation { name, .. } => {
                push_unique(&mut self.insert_annotations, name.clone())
            }
            EditOperation::RemoveAnnotation { name, .. } => {
                push_unique(&mut self.remove_annotations, name.clone())
            }
            EditOperation::MergeSuppressToken {
                token, annotation, ..
            } => {
                push_unique(&mut self.merge_tokens, token.clone());
                self.suppress_annotation.get_or_insert_with(|| annotation.clone());
            }
            EditOperation::RemoveSuppressToken {
                token, annotation, ..
            } => {
                push_unique(&mut self.remove_tokens, token.clone());
                self.suppress_annotation.get_or_insert_with(|| annotation.clone());
            }
            _ => return false,
        }
        true
    }

    fn removes_annotation(&self, a: &Annotation) -> bool {
        self.remove_annotations
            .iter()
            .any(|n| *n == a.name || a.is(n))
    }

    /// Edits in absolute offsets of `unit.text`.
    pub fn edits(
        &self,
        unit: &SourceUnit,
        list: &ModifierList,
        opts: &RenderOptions,
    ) -> Vec<TextEdit> {
        let text = unit.text.as_str();
        let mut edits = Vec::new();
        let mut new_annotations: Vec<String> = self
            .insert_annotations
            .iter()
            .filter(|n| list.annotation(n).is_none())
            .map(|n| format!("@{n}"))
            .collect();

        for a in list.annotations().filter(|a| self.removes_annotation(a)) {
            edits.push(TextEdit::delete(with_trailing_whitespace(text, a.span)));
        }

        let name = self.suppress_annotation.as_deref().unwrap_or(SUPPRESS_WARNINGS);
        let suppress = list
            .suppress_warnings(name)
            .filter(|a| !self.removes_annotation(a));
        match suppress {
            Some(a) => edits.extend(self.suppress_edits(text, a, opts)),
            None => {
                let tokens: Vec<String> = self.merge_tokens.iter().map(|t| literal(t)).collect();
                match tokens.as_slice() {
                    [] => {}
                    [one] => new_annotations.push(format!("@{name}({one})")),
                    many => new_annotations.push(format!("@{name}({{{}}})", many.join(", "))),
                }
            }
        }

        if !new_annotations.is_empty() {
            let at = list.start();
            let separator = if unit.starts_line(at) {
                format!("{}{}", opts.line_separator, unit.line_indent(at))
            } else {
                " ".to_string()
            };
            let inserted: String = new_annotations
                .iter()
                .map(|a| format!("{a}{separator}"))
                .collect();
            edits.push(TextEdit::insert(at, inserted));
        }

        for (modifier, span) in list.keywords() {
            if self.remove.contains(&modifier) {
                edits.push(TextEdit::delete(with_trailing_whitespace(text, span)));
            }
        }

        let kept: Vec<(Modifier, Span)> = list
            .keywords()
            .filter(|(m, _)| !self.remove.contains(m))
            .collect();
        let mut added: Vec<Modifier> = self
            .add
            .iter()
            .copied()
            .filter(|m| !kept.iter().any(|(k, _)| k == m))
            .collect();
        added.sort_by_key(|m| m.rank());
        for modifier in added {
            let at = kept
                .iter()
                .find(|(k, _)| k.rank() > modifier.rank())
                .map(|(_, span)| span.start)
                .unwrap_or(list.insert_at);
            edits.push(TextEdit::insert(at, format!("{modifier} ")));
        }
        edits
    }

    /// Token edits on an existing `@SuppressWarnings`.
    fn suppress_edits(&self, text: &str, a: &Annotation, opts: &RenderOptions) -> Vec<TextEdit> {
        let Some(value) = &a.value else {
            let tokens: Vec<String> = self.merge_tokens.iter().map(|t| literal(t)).collect();
            return match tokens.as_slice() {
                [] => vec![],
                [one] => vec![TextEdit::replace(a.span, format!("@{}({one})", a.name))],
                many => vec![TextEdit::replace(
                    a.span,
                    format!("@{}({{{}}})", a.name, many.join(", ")),
                )],
            };
        };

        let removed: Vec<usize> = value
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| self.remove_tokens.contains(&e.value))
            .map(|(i, _)| i)
            .collect();
        let added: Vec<String> = self
            .merge_tokens
            .iter()
            .filter(|t| !value.contains(t))
            .map(|t| literal(t))
            .collect();
        if removed.is_empty() && added.is_empty() {
            return vec![];
        }

        let mut remaining: Vec<String> = value
            .elements
            .iter()
            .enumerate()
            .filter(|(i, _)| !removed.contains(i))
            .map(|(_, e)| e.span.slice(text).to_string())
            .collect();
        remaining.extend(added.iter().cloned());

        if remaining.is_empty() {
            return vec![TextEdit::delete(with_trailing_whitespace(text, a.span))];
        }
        if !value.array || (remaining.len() == 1 && opts.collapse_single_suppress_token) {
            let rendered = match remaining.as_slice() {
                [one] if !value.array || opts.collapse_single_suppress_token => one.clone(),
                many => format!("{{{}}}", many.join(", ")),
            };
            return vec![TextEdit::replace(value.span, rendered)];
        }

        // Array form kept: touch only the affected elements.
        let elements = &value.elements;
        match (removed.as_slice(), added.is_empty()) {
            ([], false) => match elements.last() {
                Some(last) => {
                    let tail: String = added.iter().map(|t| format!(", {t}")).collect();
                    vec![TextEdit::insert(last.span.end, tail)]
                }
                None => vec![TextEdit::insert(value.span.start + 1, added.join(", "))],
            },
            ([i], true) => {
                let span = match (elements.get(i + 1), i.checked_sub(1)) {
                    (Some(next), _) => Span::new(elements[*i].span.start, next.span.start),
                    (None, Some(prev)) => Span::new(elements[prev].span.end, elements[*i].span.end),
                    (None, None) => elements[*i].span,
                };
                vec![TextEdit::delete(span)]
            }
            _ => vec![TextEdit::replace(
                value.span,
                format!("{{{}}}", remaining.join(", ")),
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::apply_edits;
    use modfix_types::ast::{DeclId, DeclRef, UnitId, QUALIFIED_SUPPRESS_WARNINGS};
    use modfix_types::fixture::UnitBuilder;

    fn target() -> DeclRef {
        DeclRef::new(UnitId(0), DeclId(1))
    }

    fn render(src: &str, member: &str, ops: &[EditOperation], opts: &RenderOptions) -> String {
        let mut b = UnitBuilder::new("A.java", src);
        let a = b.ty(None, "A");
        let id = if src.contains(&format!("{member}(")) {
            b.method(a, member)
        } else {
            b.field(a, member)
        };
        let unit = b.build();
        let mut changes = ListChanges::default();
        for op in ops {
            assert!(changes.record(op));
        }
        let list = &unit.decls[id.index()].modifiers;
        let edits = changes.edits(&unit, list, opts);
        apply_edits(UnitId(0), &unit.text, 0, edits).unwrap()
    }

    fn add(modifier: Modifier) -> EditOperation {
        EditOperation::AddModifier {
            target: target(),
            modifier,
        }
    }

    fn remove(modifier: Modifier) -> EditOperation {
        EditOperation::RemoveModifier {
            target: target(),
            modifier,
        }
    }

    fn remove_token(token: &str) -> EditOperation {
        EditOperation::RemoveSuppressToken {
            target: target(),
            token: token.to_string(),
            annotation: SUPPRESS_WARNINGS.to_string(),
        }
    }

    fn merge(token: &str) -> EditOperation {
        EditOperation::MergeSuppressToken {
            target: target(),
            token: token.to_string(),
            annotation: SUPPRESS_WARNINGS.to_string(),
        }
    }

    fn qualified(op: EditOperation) -> EditOperation {
        match op {
            EditOperation::MergeSuppressToken { target, token, .. } => {
                EditOperation::MergeSuppressToken {
                    target,
                    token,
                    annotation: QUALIFIED_SUPPRESS_WARNINGS.to_string(),
                }
            }
            EditOperation::RemoveSuppressToken { target, token, .. } => {
                EditOperation::RemoveSuppressToken {
                    target,
                    token,
                    annotation: QUALIFIED_SUPPRESS_WARNINGS.to_string(),
                }
            }
            other => other,
        }
    }

    #[test]
    fn keywords_land_in_canonical_order() {
        let src = "class A {\n    private final int x = 1;\n}\n";
        let out = render(src, "x", &[add(Modifier::Static)], &RenderOptions::default());
        assert_eq!(out, "class A {\n    private static final int x = 1;\n}\n");

        let out = render(
            src,
            "x",
            &[remove(Modifier::Private), add(Modifier::Public)],
            &RenderOptions::default(),
        );
        assert_eq!(out, "class A {\n    public final int x = 1;\n}\n");
    }

    #[test]
    fn adding_to_a_bare_declaration_inserts_only_the_keyword() {
        let src = "class A {\n    void foo() {}\n}\n";
        let out = render(src, "foo", &[add(Modifier::Static)], &RenderOptions::default());
        assert_eq!(out, "class A {\n    static void foo() {}\n}\n");
    }

    #[test]
    fn annotations_go_on_their_own_line_before_existing_ones() {
        let src = "class A {\n    @Deprecated\n    public void foo() {}\n}\n";
        let op = EditOperation::InsertAnnotation {
            target: target(),
            name: "Override".to_string(),
        };
        let out = render(src, "foo", &[op], &RenderOptions::default());
        assert_eq!(
            out,
            "class A {\n    @Override\n    @Deprecated\n    public void foo() {}\n}\n"
        );
    }

    #[test]
    fn removed_annotation_takes_its_line_along() {
        let src = "class A {\n    @Override\n    void foo() {}\n}\n";
        let op = EditOperation::RemoveAnnotation {
            target: target(),
            name: "Override".to_string(),
        };
        let out = render(src, "foo", &[op], &RenderOptions::default());
        assert_eq!(out, "class A {\n    void foo() {}\n}\n");
    }

    #[test]
    fn removing_a_token_keeps_the_array_form() {
        let src = "class A {\n    @SuppressWarnings({\"unused\",\"X\"})\n    int f;\n}\n";
        let out = render(src, "f", &[remove_token("unused")], &RenderOptions::default());
        assert_eq!(out, "class A {\n    @SuppressWarnings({\"X\"})\n    int f;\n}\n");

        let collapse = RenderOptions {
            collapse_single_suppress_token: true,
            ..RenderOptions::default()
        };
        let out = render(src, "f", &[remove_token("unused")], &collapse);
        assert_eq!(out, "class A {\n    @SuppressWarnings(\"X\")\n    int f;\n}\n");
    }

    #[test]
    fn removing_the_last_token_drops_the_annotation() {
        let src = "class A {\n    @SuppressWarnings(\"unused\")\n    int f;\n}\n";
        let out = render(src, "f", &[remove_token("unused")], &RenderOptions::default());
        assert_eq!(out, "class A {\n    int f;\n}\n");
    }

    #[test]
    fn merging_extends_an_existing_annotation() {
        let src = "class A {\n    @SuppressWarnings(\"unused\")\n    int f;\n}\n";
        let out = render(src, "f", &[merge("rawtypes")], &RenderOptions::default());
        assert_eq!(
            out,
            "class A {\n    @SuppressWarnings({\"unused\", \"rawtypes\"})\n    int f;\n}\n"
        );

        let out = render(src, "f", &[merge("unused")], &RenderOptions::default());
        assert_eq!(out, src);
    }

    #[test]
    fn two_merges_create_one_annotation() {
        let src = "class A {\n    int f;\n}\n";
        let out = render(
            src,
            "f",
            &[merge("rawtypes"), merge("unchecked"), merge("rawtypes")],
            &RenderOptions::default(),
        );
        assert_eq!(
            out,
            "class A {\n    @SuppressWarnings({\"rawtypes\", \"unchecked\"})\n    int f;\n}\n"
        );
    }

    #[test]
    fn shadowed_name_leaves_the_foreign_annotation_alone() {
        let src = "class A {\n    @SuppressWarnings(\"BC\")\n    void foo() {}\n}\n";
        let out = render(src, "foo", &[qualified(merge("deprecation"))], &RenderOptions::default());
        assert_eq!(
            out,
            "class A {\n    @java.lang.SuppressWarnings(\"deprecation\")\n    @SuppressWarnings(\"BC\")\n    void foo() {}\n}\n"
        );

        let out = render(src, "foo", &[qualified(remove_token("BC"))], &RenderOptions::default());
        assert_eq!(out, src);
    }

    #[test]
    fn shadowed_name_still_edits_the_qualified_annotation() {
        let src = "class A {\n    @SuppressWarnings(\"BC\")\n    @java.lang.SuppressWarnings(\"unused\")\n    void foo() {}\n}\n";
        let out = render(src, "foo", &[qualified(merge("rawtypes"))], &RenderOptions::default());
        assert_eq!(
            out,
            "class A {\n    @SuppressWarnings(\"BC\")\n    @java.lang.SuppressWarnings({\"unused\", \"rawtypes\"})\n    void foo() {}\n}\n"
        );

        let out = render(src, "foo", &[qualified(remove_token("unused"))], &RenderOptions::default());
        assert_eq!(
            out,
            "class A {\n    @SuppressWarnings(\"BC\")\n    void foo() {}\n}\n"
        );
    }
}
