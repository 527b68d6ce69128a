//! Diagnostic id to problem kind.

use crate::legality::LegalityContext;

/// Member kind named by a visibility diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Method,
    Constructor,
    Type,
    Field,
}

/// Which declaration a two-sided diagnostic was reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportedOn {
    Method,
    Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaticMember {
    Field,
    Method,
}

/// Closed set of problems the planner knows how to fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemKind {
    StaticRequired,
    InstanceBeforeConstructor,
    NotVisible(MemberKind),
    /// A private field of a supertype accessed from a subtype.
    InvisibleInheritedField,
    NeedToEmulate,
    FinalAssignment,
    OuterLocalMustBeFinal,
    OverrideFinal,
    ExtendsFinalClass,
    FinalVolatileField,
    MethodRequiresBody,
    AbstractWithBody,
    NativeWithBody,
    AbstractInConcreteClass(ReportedOn),
    OverrideReducesVisibility,
    InheritedReducesVisibility,
    OverridesNonVisible,
    StaticHidesInstance,
    InstanceOverridesStatic,
    MissingSynchronized,
    MissingOverride,
    MustOverride,
    MissingDeprecated,
    OverridingDeprecated,
    IllegalModifier(LegalityContext),
    RedundantModifier,
    StaticInNonStaticInner(StaticMember),
    UnusedSuppressToken,
    /// A warning that `@SuppressWarnings(token)` silences.
    Suppressible(&'static str),
    MethodCanBeStatic {
        mandatory: bool,
    },
    Unsupported,
}

/// How the locator finds the secondary declaration for a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondarySite {
    None,
    /// The declaration the reference under the diagnostic binds to.
    Reference,
    /// The nearest method the primary method overrides.
    Overridden,
}

impl ProblemKind {
    pub fn secondary_site(self) -> SecondarySite {
        use ProblemKind::*;
        match self {
            StaticRequired
            | InstanceBeforeConstructor
            | NotVisible(_)
            | InvisibleInheritedField
            | NeedToEmulate
            | FinalAssignment
            | OuterLocalMustBeFinal
            | ExtendsFinalClass => SecondarySite::Reference,
            OverrideFinal
            | OverrideReducesVisibility
            | OverridesNonVisible
            | InstanceOverridesStatic
            | MissingSynchronized
            | OverridingDeprecated => SecondarySite::Overridden,
            _ => SecondarySite::None,
        }
    }
}

const TABLE: &[(&str, ProblemKind)] = {
    use LegalityContext as L;
    use ProblemKind::*;
    &[
        ("non_static_access_to_static_method", StaticRequired),
        ("non_static_access_to_static_field", StaticRequired),
        ("static_method_requested", StaticRequired),
        ("static_field_requested", StaticRequired),
        (
            "instance_method_during_constructor_invocation",
            InstanceBeforeConstructor,
        ),
        (
            "instance_field_during_constructor_invocation",
            InstanceBeforeConstructor,
        ),
        ("not_visible_method", NotVisible(MemberKind::Method)),
        ("not_visible_constructor", NotVisible(MemberKind::Constructor)),
        ("not_visible_type", NotVisible(MemberKind::Type)),
        ("not_visible_field", NotVisible(MemberKind::Field)),
        ("not_visible_inherited_field", InvisibleInheritedField),
        ("need_to_emulate_method_access", NeedToEmulate),
        ("need_to_emulate_field_read_access", NeedToEmulate),
        ("need_to_emulate_field_write_access", NeedToEmulate),
        ("need_to_emulate_constructor_access", NeedToEmulate),
        ("final_field_assignment", FinalAssignment),
        ("final_local_assignment", FinalAssignment),
        ("final_parameter_assignment", FinalAssignment),
        ("duplicate_final_local_initialization", FinalAssignment),
        ("outer_local_must_be_final", OuterLocalMustBeFinal),
        ("outer_local_must_be_effectively_final", OuterLocalMustBeFinal),
        ("final_method_cannot_be_overridden", OverrideFinal),
        ("class_extends_final_class", ExtendsFinalClass),
        (
            "illegal_modifier_combination_final_volatile_for_field",
            FinalVolatileField,
        ),
        ("method_requires_body", MethodRequiresBody),
        ("abstract_method_with_body", AbstractWithBody),
        ("body_for_abstract_method", AbstractWithBody),
        ("native_method_with_body", NativeWithBody),
        ("body_for_native_method", NativeWithBody),
        (
            "abstract_method_in_concrete_class",
            AbstractInConcreteClass(ReportedOn::Method),
        ),
        (
            "abstract_methods_in_concrete_class",
            AbstractInConcreteClass(ReportedOn::Type),
        ),
        ("method_reduces_visibility", OverrideReducesVisibility),
        ("inherited_method_reduces_visibility", InheritedReducesVisibility),
        ("overriding_non_visible_method", OverridesNonVisible),
        ("static_overriding_instance_method", StaticHidesInstance),
        ("cannot_hide_instance_method_with_static", StaticHidesInstance),
        ("instance_overriding_static_method", InstanceOverridesStatic),
        (
            "cannot_override_static_method_with_instance",
            InstanceOverridesStatic,
        ),
        ("missing_synchronized_on_inherited_method", MissingSynchronized),
        ("missing_override_annotation", MissingOverride),
        (
            "missing_override_annotation_for_interface_method",
            MissingOverride,
        ),
        ("method_must_override", MustOverride),
        ("method_must_override_or_implement", MustOverride),
        ("missing_deprecated_annotation", MissingDeprecated),
        ("overriding_deprecated_method", OverridingDeprecated),
        ("illegal_modifier_for_class", IllegalModifier(L::Class)),
        ("illegal_modifier_for_member_class", IllegalModifier(L::MemberClass)),
        ("illegal_modifier_for_local_class", IllegalModifier(L::LocalClass)),
        ("illegal_modifier_for_interface", IllegalModifier(L::Interface)),
        (
            "illegal_modifier_for_member_interface",
            IllegalModifier(L::MemberInterface),
        ),
        (
            "illegal_visibility_modifier_for_interface_member_type",
            IllegalModifier(L::MemberInterface),
        ),
        ("illegal_modifier_for_enum", IllegalModifier(L::Enum)),
        ("illegal_modifier_for_member_enum", IllegalModifier(L::MemberEnum)),
        ("illegal_modifier_for_field", IllegalModifier(L::Field)),
        (
            "illegal_modifier_for_interface_field",
            IllegalModifier(L::InterfaceField),
        ),
        ("illegal_modifier_for_method", IllegalModifier(L::Method)),
        (
            "illegal_modifier_for_interface_method",
            IllegalModifier(L::InterfaceMethod),
        ),
        ("illegal_modifier_for_constructor", IllegalModifier(L::Constructor)),
        (
            "illegal_modifier_for_enum_constructor",
            IllegalModifier(L::EnumConstructor),
        ),
        (
            "illegal_modifier_for_enum_constant",
            IllegalModifier(L::EnumConstant),
        ),
        ("illegal_modifier_for_argument", IllegalModifier(L::Argument)),
        ("illegal_modifier_for_variable", IllegalModifier(L::Variable)),
        ("redundant_modifier", RedundantModifier),
        (
            "unexpected_static_modifier_for_field",
            StaticInNonStaticInner(StaticMember::Field),
        ),
        (
            "unexpected_static_modifier_for_method",
            StaticInNonStaticInner(StaticMember::Method),
        ),
        ("unused_warning_token", UnusedSuppressToken),
        ("unhandled_warning_token", UnusedSuppressToken),
        ("unsafe_raw_constructor_invocation", Suppressible("unchecked")),
        ("unsafe_raw_method_invocation", Suppressible("unchecked")),
        ("unsafe_type_conversion", Suppressible("unchecked")),
        ("raw_type_reference", Suppressible("rawtypes")),
        ("unused_private_field", Suppressible("unused")),
        ("unused_private_method", Suppressible("unused")),
        ("unused_private_type", Suppressible("unused")),
        ("local_variable_is_never_used", Suppressible("unused")),
        ("uses_deprecated_method", Suppressible("deprecation")),
        ("uses_deprecated_field", Suppressible("deprecation")),
        ("uses_deprecated_type", Suppressible("deprecation")),
        ("missing_serial_version", Suppressible("serial")),
        (
            "method_must_be_static",
            MethodCanBeStatic { mandatory: true },
        ),
        (
            "method_can_be_potentially_static",
            MethodCanBeStatic { mandatory: false },
        ),
    ]
};

/// Maps a diagnostic id to its problem kind; unknown ids map to [`ProblemKind::Unsupported`].
pub fn classify(id: &str) -> ProblemKind {
    TABLE
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, kind)| *kind)
        .unwrap_or(ProblemKind::Unsupported)
}

/// Every diagnostic id the classifier recognizes.
pub fn known_ids() -> impl Iterator<Item = &'static str> {
    TABLE.iter().map(|(id, _)| *id)
}
