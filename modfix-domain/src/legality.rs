//! Which modifiers a declaration may carry, per declaration kind and container.

use modfix_types::ast::Modifier::{self, *};
use modfix_types::ast::{DeclId, DeclKind, SourceUnit, TypeKind, TypeNesting};

/// Declaration kind and container combination a legality diagnostic names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegalityContext {
    Class,
    MemberClass,
    LocalClass,
    Interface,
    MemberInterface,
    Enum,
    MemberEnum,
    Field,
    InterfaceField,
    Method,
    InterfaceMethod,
    Constructor,
    EnumConstructor,
    EnumConstant,
    Argument,
    Variable,
}

const TABLE: &[(LegalityContext, &[Modifier])] = &[
    (LegalityContext::Class, &[Public, Abstract, Final, Strictfp]),
    (
        LegalityContext::MemberClass,
        &[Public, Protected, Private, Static, Abstract, Final, Strictfp],
    ),
    (LegalityContext::LocalClass, &[Abstract, Final, Strictfp]),
    (LegalityContext::Interface, &[Public, Abstract, Strictfp]),
    (LegalityContext::MemberInterface, &[Public, Static, Strictfp]),
    (LegalityContext::Enum, &[Public, Strictfp]),
    (
        LegalityContext::MemberEnum,
        &[Public, Protected, Private, Static, Strictfp],
    ),
    (
        LegalityContext::Field,
        &[Public, Protected, Private, Static, Final, Volatile, Transient],
    ),
    (LegalityContext::InterfaceField, &[Public, Static, Final]),
    (
        LegalityContext::Method,
        &[
            Public,
            Protected,
            Private,
            Static,
            Abstract,
            Final,
            Native,
            Strictfp,
            Synchronized,
        ],
    ),
    (
        LegalityContext::InterfaceMethod,
        &[Public, Abstract, Strictfp, Default, Static],
    ),
    (LegalityContext::Constructor, &[Public, Protected, Private]),
    (LegalityContext::EnumConstructor, &[Private]),
    (LegalityContext::EnumConstant, &[]),
    (LegalityContext::Argument, &[Final]),
    (LegalityContext::Variable, &[Final]),
];

/// Modifiers legal in `ctx`.
pub fn legal_modifiers(ctx: LegalityContext) -> &'static [Modifier] {
    TABLE
        .iter()
        .find(|(c, _)| *c == ctx)
        .map(|(_, mods)| *mods)
        .unwrap_or(&[])
}

pub fn is_legal(ctx: LegalityContext, modifier: Modifier) -> bool {
    legal_modifiers(ctx).contains(&modifier)
}

/// Annotations whose target is restricted to particular declaration kinds.
pub fn is_legal_annotation(ctx: LegalityContext, simple_name: &str) -> bool {
    use LegalityContext as C;
    match simple_name {
        "Override" => matches!(ctx, C::Method | C::InterfaceMethod),
        "SafeVarargs" => matches!(ctx, C::Method | C::Constructor | C::EnumConstructor),
        "FunctionalInterface" => matches!(ctx, C::Interface | C::MemberInterface),
        _ => true,
    }
}

/// Keywords the language already implies in `ctx`, so spelling them out is redundant.
pub fn implied_modifiers(ctx: LegalityContext) -> &'static [Modifier] {
    match ctx {
        LegalityContext::InterfaceMethod => &[Public, Abstract],
        LegalityContext::InterfaceField => &[Public, Static, Final],
        LegalityContext::MemberInterface => &[Static],
        LegalityContext::MemberEnum => &[Static],
        LegalityContext::EnumConstructor => &[Private],
        _ => &[],
    }
}

/// Derives the legality context of a declaration from its kind and container.
pub fn context_of(unit: &SourceUnit, id: DeclId) -> Option<LegalityContext> {
    let decl = unit.decl(id)?;
    let container = decl
        .enclosing
        .and_then(|e| unit.decl(e))
        .and_then(|e| e.type_info());
    let in_interface = container.is_some_and(|t| t.is_interface_like());
    let in_enum = container.is_some_and(|t| t.kind == TypeKind::Enum);
    let ctx = match decl.kind {
        DeclKind::Type => {
            let info = decl.type_info()?;
            match (info.nesting, info.is_interface_like(), info.kind) {
                (TypeNesting::Anonymous, _, _) => return None,
                (TypeNesting::TopLevel, true, _) => LegalityContext::Interface,
                (TypeNesting::TopLevel, false, TypeKind::Enum) => LegalityContext::Enum,
                (TypeNesting::TopLevel, false, _) => LegalityContext::Class,
                (TypeNesting::Member, true, _) => LegalityContext::MemberInterface,
                (TypeNesting::Member, false, TypeKind::Enum) => LegalityContext::MemberEnum,
                (TypeNesting::Member, false, _) => LegalityContext::MemberClass,
                (TypeNesting::Local, _, _) => LegalityContext::LocalClass,
            }
        }
        DeclKind::Method if in_interface => LegalityContext::InterfaceMethod,
        DeclKind::Method => LegalityContext::Method,
        DeclKind::Constructor if in_enum => LegalityContext::EnumConstructor,
        DeclKind::Constructor => LegalityContext::Constructor,
        DeclKind::Field if in_interface => LegalityContext::InterfaceField,
        DeclKind::Field => LegalityContext::Field,
        DeclKind::LocalVariable => LegalityContext::Variable,
        DeclKind::Parameter => LegalityContext::Argument,
        DeclKind::EnumConstant => LegalityContext::EnumConstant,
    };
    Some(ctx)
}
