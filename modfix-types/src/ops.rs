use crate::ast::{DeclRef, GroupId, Modifier, Span, UnitId, Visibility};
use serde::{Deserialize, Serialize};

/// One atomic structural edit.
///
/// Modifier and annotation edits that target a variable inside a multi-declarator statement act on
/// the statement's shared modifier list, unless the same plan splits that statement first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOperation {
    AddModifier {
        target: DeclRef,
        modifier: Modifier,
    },
    RemoveModifier {
        target: DeclRef,
        modifier: Modifier,
    },
    /// Marker annotation such as `Override`, placed before existing annotations.
    InsertAnnotation {
        target: DeclRef,
        name: String,
    },
    RemoveAnnotation {
        target: DeclRef,
        name: String,
    },
    /// Add `token` to the target's `@SuppressWarnings`, creating the annotation when absent.
    /// `annotation` is the name the unit resolves `java.lang.SuppressWarnings` by; a new
    /// annotation is written with it.
    MergeSuppressToken {
        target: DeclRef,
        token: String,
        annotation: String,
    },
    /// Drop `token` from the `@SuppressWarnings` resolved by `annotation`.
    RemoveSuppressToken {
        target: DeclRef,
        token: String,
        annotation: String,
    },
    SplitDeclarator {
        unit: UnitId,
        group: GroupId,
    },
    /// Replace the `;` of a body-less method with a block; `default_return` of `None` means no
    /// return statement.
    AddBody {
        target: DeclRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_return: Option<String>,
    },
    RemoveBody {
        target: DeclRef,
    },
    /// Add an explicit no-argument constructor to the target type.
    SynthesizeConstructor {
        target: DeclRef,
        visibility: Visibility,
    },
    /// Add `private <ty> <name>;` as the first member of the target type.
    InsertField {
        target: DeclRef,
        ty: String,
        name: String,
    },
    /// Append `<ty> <name>` to the target method's parameter list.
    AddParameter {
        target: DeclRef,
        ty: String,
        name: String,
    },
    /// Turn the assignment statement of a recorded write reference into a local declaration.
    DeclareLocal {
        unit: UnitId,
        reference: usize,
        ty: String,
    },
    RemoveStatement {
        unit: UnitId,
        span: Span,
    },
}

impl EditOperation {
    /// The unit this operation edits.
    pub fn unit(&self) -> UnitId {
        match self {
            EditOperation::AddModifier { target, .. }
            | EditOperation::RemoveModifier { target, .. }
            | EditOperation::InsertAnnotation { target, .. }
            | EditOperation::RemoveAnnotation { target, .. }
            | EditOperation::MergeSuppressToken { target, .. }
            | EditOperation::RemoveSuppressToken { target, .. }
            | EditOperation::AddBody { target, .. }
            | EditOperation::RemoveBody { target }
            | EditOperation::SynthesizeConstructor { target, .. }
            | EditOperation::InsertField { target, .. }
            | EditOperation::AddParameter { target, .. } => target.unit,
            EditOperation::SplitDeclarator { unit, .. }
            | EditOperation::DeclareLocal { unit, .. }
            | EditOperation::RemoveStatement { unit, .. } => *unit,
        }
    }

    pub fn target(&self) -> Option<DeclRef> {
        match self {
            EditOperation::AddModifier { target, .. }
            | EditOperation::RemoveModifier { target, .. }
            | EditOperation::InsertAnnotation { target, .. }
            | EditOperation::RemoveAnnotation { target, .. }
            | EditOperation::MergeSuppressToken { target, .. }
            | EditOperation::RemoveSuppressToken { target, .. }
            | EditOperation::AddBody { target, .. }
            | EditOperation::RemoveBody { target }
            | EditOperation::SynthesizeConstructor { target, .. }
            | EditOperation::InsertField { target, .. }
            | EditOperation::AddParameter { target, .. } => Some(*target),
            EditOperation::SplitDeclarator { .. }
            | EditOperation::DeclareLocal { .. }
            | EditOperation::RemoveStatement { .. } => None,
        }
    }

    /// Whether this edit lives in a modifier list (keywords, annotations, suppression tokens).
    pub fn touches_modifiers(&self) -> bool {
        matches!(
            self,
            EditOperation::AddModifier { .. }
                | EditOperation::RemoveModifier { .. }
                | EditOperation::InsertAnnotation { .. }
                | EditOperation::RemoveAnnotation { .. }
                | EditOperation::MergeSuppressToken { .. }
                | EditOperation::RemoveSuppressToken { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditOperation::AddModifier { .. } => "add_modifier",
            EditOperation::RemoveModifier { .. } => "remove_modifier",
            EditOperation::InsertAnnotation { .. } => "insert_annotation",
            EditOperation::RemoveAnnotation { .. } => "remove_annotation",
            EditOperation::MergeSuppressToken { .. } => "merge_suppress_token",
            EditOperation::RemoveSuppressToken { .. } => "remove_suppress_token",
            EditOperation::SplitDeclarator { .. } => "split_declarator",
            EditOperation::AddBody { .. } => "add_body",
            EditOperation::RemoveBody { .. } => "remove_body",
            EditOperation::SynthesizeConstructor { .. } => "synthesize_constructor",
            EditOperation::InsertField { .. } => "insert_field",
            EditOperation::AddParameter { .. } => "add_parameter",
            EditOperation::DeclareLocal { .. } => "declare_local",
            EditOperation::RemoveStatement { .. } => "remove_statement",
        }
    }
}
