//! Applies an `EditPlan` to private copies of the affected units.

use crate::RenderOptions;
use crate::error::{ContractError, EditResult};
use crate::modifiers::ListChanges;
use crate::text::{apply_edits, with_trailing_whitespace, TextEdit};
use crate::validate::validate_plan;
use modfix_types::ast::{
    DeclId, DeclRef, Declaration, GroupId, ProjectSnapshot, SourceUnit, Span, UnitId, Visibility,
};
use modfix_types::ops::EditOperation;
use modfix_types::plan::EditPlan;
use modfix_types::proposal::FilePreview;
use std::collections::BTreeMap;
use tracing::debug;

/// Which modifier list a modifier operation edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ListKey {
    Decl(DeclId),
    /// The shared list of an unsplit multi-declarator statement.
    Group(GroupId),
    /// One declarator of a statement the same plan splits.
    Declarator(DeclId),
}

/// Renders every unit `plan` touches, in `plan.units` order.
pub fn render_plan(
    project: &ProjectSnapshot,
    plan: &EditPlan,
    opts: &RenderOptions,
) -> EditResult<Vec<FilePreview>> {
    validate_plan(project, plan)?;
    let mut previews = Vec::with_capacity(plan.units.len());
    for unit_id in &plan.units {
        let unit = site(project.unit(*unit_id), *unit_id, "such unit")?;
        let ops: Vec<&EditOperation> = plan.ops_for(*unit_id).collect();
        let text = render_unit(unit, *unit_id, &ops, opts)?;
        debug!(unit = unit_id.0, path = %unit.path, ops = ops.len(), "rendered unit");
        previews.push(FilePreview {
            unit: *unit_id,
            path: unit.path.clone(),
            text,
        });
    }
    Ok(previews)
}

fn site<T>(found: Option<T>, unit: UnitId, what: impl Into<String>) -> EditResult<T> {
    found.ok_or_else(|| {
        ContractError::MissingSite {
            unit: unit.0,
            what: what.into(),
        }
        .into()
    })
}

fn not_applicable(op: &EditOperation, reason: impl Into<String>) -> crate::EditError {
    ContractError::NotApplicable {
        op: op.name(),
        reason: reason.into(),
    }
    .into()
}

fn render_unit(
    unit: &SourceUnit,
    unit_id: UnitId,
    ops: &[&EditOperation],
    opts: &RenderOptions,
) -> EditResult<String> {
    let splits: Vec<GroupId> = ops
        .iter()
        .filter_map(|op| match op {
            EditOperation::SplitDeclarator { group, .. } => Some(*group),
            _ => None,
        })
        .collect();

    let mut lists: BTreeMap<ListKey, ListChanges> = BTreeMap::new();
    let mut edits = Vec::new();
    for op in ops {
        if op.touches_modifiers() {
            let Some(target) = op.target() else {
                continue;
            };
            let decl = site(unit.decl(target.decl), unit_id, "target declaration")?;
            let key = match decl.variable_info().and_then(|v| v.group) {
                Some(g) if splits.contains(&g) => ListKey::Declarator(target.decl),
                Some(g) if unit.group(g).is_some_and(|g| g.declarators.len() > 1) => {
                    ListKey::Group(g)
                }
                _ => ListKey::Decl(target.decl),
            };
            lists.entry(key).or_default().record(op);
            continue;
        }
        edits.extend(structural_edits(unit, unit_id, op, opts)?);
    }

    for group in &splits {
        edits.push(split_edit(unit, unit_id, *group, &mut lists, opts)?);
    }
    for (key, changes) in &lists {
        let list = match key {
            ListKey::Decl(id) | ListKey::Declarator(id) => {
                &site(unit.decl(*id), unit_id, "target declaration")?.modifiers
            }
            ListKey::Group(g) => &site(unit.group(*g), unit_id, "declarator group")?.modifiers,
        };
        edits.extend(changes.edits(unit, list, opts));
    }

    apply_edits(unit_id, &unit.text, 0, edits)
}

/// One statement per declarator, each with its own copy of the shared modifiers and its own
/// pending modifier changes.
fn split_edit(
    unit: &SourceUnit,
    unit_id: UnitId,
    group_id: GroupId,
    lists: &mut BTreeMap<ListKey, ListChanges>,
    opts: &RenderOptions,
) -> EditResult<TextEdit> {
    let group = site(unit.group(group_id), unit_id, "declarator group")?;
    let text = unit.text.as_str();
    let prefix = Span::new(group.modifiers.start(), group.ty.span.start);
    let indent = unit.line_indent(group.span.start);
    let mut out = String::new();
    for (i, id) in group.declarators.iter().enumerate() {
        let decl = site(unit.decl(*id), unit_id, "declarator")?;
        let declarator = decl.variable_info().map(|v| v.declarator).unwrap_or(decl.name_span);
        if i > 0 {
            out.push_str(&opts.line_separator);
            out.push_str(indent);
        }
        match lists.remove(&ListKey::Declarator(*id)) {
            Some(changes) => {
                let edits = changes.edits(unit, &group.modifiers, opts);
                out.push_str(&apply_edits(unit_id, prefix.slice(text), prefix.start, edits)?);
            }
            None => out.push_str(prefix.slice(text)),
        }
        out.push_str(group.ty.span.slice(text));
        out.push(' ');
        out.push_str(declarator.slice(text));
        out.push(';');
    }
    Ok(TextEdit::replace(
        Span::new(group.modifiers.start(), group.span.end),
        out,
    ))
}

fn decl_of<'a>(
    unit: &'a SourceUnit,
    op: &EditOperation,
    target: DeclRef,
) -> EditResult<&'a Declaration> {
    unit.decl(target.decl)
        .ok_or_else(|| not_applicable(op, format!("no declaration {}", target.decl.0)))
}

/// Indentation for members of the type `ty`.
fn member_indent(unit: &SourceUnit, ty: &Declaration, opts: &RenderOptions) -> String {
    format!("{}{}", unit.line_indent(ty.span.start), opts.indent_unit)
}

/// Edits for operations outside modifier lists.
fn structural_edits(
    unit: &SourceUnit,
    unit_id: UnitId,
    op: &EditOperation,
    opts: &RenderOptions,
) -> EditResult<Vec<TextEdit>> {
    let text = unit.text.as_str();
    let nl = opts.line_separator.as_str();
    let edit = match op {
        EditOperation::SplitDeclarator { .. } => return Ok(vec![]),
        EditOperation::AddBody {
            target,
            default_return,
        } => {
            let decl = decl_of(unit, op, *target)?;
            let Some(semi) = decl.method_info().and_then(|m| m.terminator) else {
                return Err(not_applicable(op, format!("`{}` is not terminated by `;`", decl.name)));
            };
            let indent = unit.line_indent(decl.span.start);
            let body = match default_return {
                Some(value) => format!(
                    " {{{nl}{indent}{}return {value};{nl}{indent}}}",
                    opts.indent_unit
                ),
                None => format!(" {{{nl}{indent}}}"),
            };
            TextEdit::replace(semi, body)
        }
        EditOperation::RemoveBody { target } => {
            let decl = decl_of(unit, op, *target)?;
            let Some(body) = decl.method_info().and_then(|m| m.body) else {
                return Err(not_applicable(op, format!("`{}` has no body", decl.name)));
            };
            let head = text.get(..body.start).unwrap_or("").trim_end().len();
            TextEdit::replace(Span::new(head, body.end), ";")
        }
        EditOperation::SynthesizeConstructor { target, visibility } => {
            let decl = decl_of(unit, op, *target)?;
            let Some(info) = decl.type_info() else {
                return Err(not_applicable(op, format!("`{}` is not a type", decl.name)));
            };
            let indent = member_indent(unit, decl, opts);
            let keyword = match visibility {
                Visibility::Package => String::new(),
                other => format!("{other} "),
            };
            TextEdit::insert(
                info.body.start + 1,
                format!("{nl}{indent}{keyword}{}() {{{nl}{indent}}}", decl.name),
            )
        }
        EditOperation::InsertField { target, ty, name } => {
            let decl = decl_of(unit, op, *target)?;
            let Some(info) = decl.type_info() else {
                return Err(not_applicable(op, format!("`{}` is not a type", decl.name)));
            };
            let indent = member_indent(unit, decl, opts);
            TextEdit::insert(info.body.start + 1, format!("{nl}{indent}private {ty} {name};"))
        }
        EditOperation::AddParameter { target, ty, name } => {
            let decl = decl_of(unit, op, *target)?;
            let Some(params) = decl.method_info().map(|m| m.params) else {
                return Err(not_applicable(op, format!("`{}` takes no parameters", decl.name)));
            };
            let written = params.slice(text);
            if written.trim().is_empty() {
                TextEdit::replace(params, format!("{ty} {name}"))
            } else {
                let end = params.start + written.trim_end().len();
                TextEdit::insert(end, format!(", {ty} {name}"))
            }
        }
        EditOperation::DeclareLocal { reference, ty, .. } => {
            let Some(statement) = unit.references.get(*reference).and_then(|r| r.statement)
            else {
                return Err(not_applicable(op, "reference is not an assignment statement"));
            };
            TextEdit::insert(statement.start, format!("{ty} "))
        }
        EditOperation::RemoveStatement { span, .. } => {
            let line_start = unit.line_start(span.start);
            let rest = text.get(span.end..).unwrap_or("");
            let line_end = rest.find('\n').map(|i| span.end + i + 1);
            match line_end {
                Some(end)
                    if unit.starts_line(span.start)
                        && text.get(span.end..end - 1).is_some_and(|s| s.trim().is_empty()) =>
                {
                    TextEdit::delete(Span::new(line_start, end))
                }
                _ => TextEdit::delete(with_trailing_whitespace(text, *span)),
            }
        }
        other => {
            debug!(unit = unit_id.0, op = other.name(), "modifier operation reached structural rendering");
            return Ok(vec![]);
        }
    };
    Ok(vec![edit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use modfix_types::ast::Modifier;
    use modfix_types::fixture::UnitBuilder;
    use pretty_assertions::assert_eq;

    fn one(src: &str, build: impl FnOnce(&mut UnitBuilder) -> Vec<EditOperation>) -> String {
        let mut b = UnitBuilder::new("E.java", src);
        let ops = build(&mut b);
        let project = ProjectSnapshot::new(vec![b.build()]);
        let previews = render_plan(&project, &EditPlan::new(ops), &RenderOptions::default()).unwrap();
        assert_eq!(previews.len(), 1);
        previews.into_iter().next().map(|p| p.text).unwrap()
    }

    fn at(decl: DeclId) -> DeclRef {
        DeclRef::new(UnitId(0), decl)
    }

    #[test]
    fn split_gives_each_declarator_a_statement() {
        let src = "class E {\n    private int a = 1, x, b;\n}\n";
        let out = one(src, |b| {
            let e = b.ty(None, "E");
            let x = b.field(e, "x");
            vec![
                EditOperation::SplitDeclarator {
                    unit: UnitId(0),
                    group: GroupId(0),
                },
                EditOperation::AddModifier {
                    target: at(x),
                    modifier: Modifier::Final,
                },
            ]
        });
        assert_eq!(
            out,
            "class E {\n    private int a = 1;\n    private final int x;\n    private int b;\n}\n"
        );
    }

    #[test]
    fn unsplit_group_edits_the_shared_list_once() {
        let src = "class E {\n    int a, b;\n}\n";
        let out = one(src, |b| {
            let e = b.ty(None, "E");
            let a = b.field(e, "a");
            let second = b.field(e, "b");
            vec![
                EditOperation::AddModifier {
                    target: at(a),
                    modifier: Modifier::Static,
                },
                EditOperation::AddModifier {
                    target: at(second),
                    modifier: Modifier::Static,
                },
            ]
        });
        assert_eq!(out, "class E {\n    static int a, b;\n}\n");
    }

    #[test]
    fn body_is_added_with_a_default_return() {
        let src = "class E {\n    abstract int foo();\n}\n";
        let out = one(src, |b| {
            let e = b.ty(None, "E");
            let foo = b.method(e, "foo");
            vec![
                EditOperation::RemoveModifier {
                    target: at(foo),
                    modifier: Modifier::Abstract,
                },
                EditOperation::AddBody {
                    target: at(foo),
                    default_return: Some("0".to_string()),
                },
            ]
        });
        assert_eq!(
            out,
            "class E {\n    int foo() {\n        return 0;\n    }\n}\n"
        );
    }

    #[test]
    fn removed_body_leaves_a_terminator() {
        let src = "abstract class E {\n    public abstract void foo() {\n    }\n}\n";
        let out = one(src, |b| {
            let e = b.ty(None, "E");
            let foo = b.method(e, "foo");
            vec![EditOperation::RemoveBody { target: at(foo) }]
        });
        assert_eq!(out, "abstract class E {\n    public abstract void foo();\n}\n");
    }

    #[test]
    fn members_are_inserted_first_in_the_body() {
        let src = "package p;\nclass C {\n    int y;\n}\n";
        let out = one(src, |b| {
            let c = b.ty(None, "C");
            vec![
                EditOperation::InsertField {
                    target: at(c),
                    ty: "int".to_string(),
                    name: "fXoo".to_string(),
                },
                EditOperation::SynthesizeConstructor {
                    target: at(c),
                    visibility: Visibility::Public,
                },
            ]
        });
        assert_eq!(
            out,
            "package p;\nclass C {\n    private int fXoo;\n    public C() {\n    }\n    int y;\n}\n"
        );
    }

    #[test]
    fn write_becomes_a_declaration_or_disappears() {
        let src = "class E {\n    void foo(String s) {\n        fXoo= 1;\n    }\n}\n";
        let declare = one(src, |b| {
            let e = b.ty(None, "E");
            let foo = b.method(e, "foo");
            let r = b.reference(foo, "fXoo= 1", "fXoo");
            vec![EditOperation::DeclareLocal {
                unit: UnitId(0),
                reference: r,
                ty: "int".to_string(),
            }]
        });
        assert_eq!(
            declare,
            "class E {\n    void foo(String s) {\n        int fXoo= 1;\n    }\n}\n"
        );

        let removed = one(src, |b| {
            let span = b.span_of("fXoo= 1;");
            b.ty(None, "E");
            vec![EditOperation::RemoveStatement {
                unit: UnitId(0),
                span,
            }]
        });
        assert_eq!(removed, "class E {\n    void foo(String s) {\n    }\n}\n");
    }

    #[test]
    fn parameters_are_appended() {
        let src = "class E {\n    void foo(String s) {}\n    void bar() {}\n}\n";
        let out = one(src, |b| {
            let e = b.ty(None, "E");
            let foo = b.method(e, "foo");
            let bar = b.method(e, "bar");
            vec![
                EditOperation::AddParameter {
                    target: at(foo),
                    ty: "int".to_string(),
                    name: "fXoo".to_string(),
                },
                EditOperation::AddParameter {
                    target: at(bar),
                    ty: "int".to_string(),
                    name: "fXoo".to_string(),
                },
            ]
        });
        assert_eq!(
            out,
            "class E {\n    void foo(String s, int fXoo) {}\n    void bar(int fXoo) {}\n}\n"
        );
    }
}
