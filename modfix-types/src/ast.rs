//! Resolved source model.
//!
//! A front end hands the engine one [`SourceUnit`] per file. Declarations live in a per-unit
//! arena and refer to each other by [`DeclId`]; cross-file links go through [`DeclRef`].

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open byte range into a unit's text.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn overlaps(&self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.start..self.end).unwrap_or("")
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UnitId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u32);

impl UnitId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl DeclId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl GroupId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A declaration addressed across the whole project snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeclRef {
    pub unit: UnitId,
    pub decl: DeclId,
}

impl DeclRef {
    pub const fn new(unit: UnitId, decl: DeclId) -> Self {
        Self { unit, decl }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Abstract,
    Static,
    Final,
    Transient,
    Volatile,
    Synchronized,
    Native,
    Strictfp,
    Default,
}

impl Modifier {
    pub const ALL: [Modifier; 12] = [
        Modifier::Public,
        Modifier::Protected,
        Modifier::Private,
        Modifier::Abstract,
        Modifier::Static,
        Modifier::Final,
        Modifier::Transient,
        Modifier::Volatile,
        Modifier::Synchronized,
        Modifier::Native,
        Modifier::Strictfp,
        Modifier::Default,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Abstract => "abstract",
            Modifier::Static => "static",
            Modifier::Final => "final",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
            Modifier::Synchronized => "synchronized",
            Modifier::Native => "native",
            Modifier::Strictfp => "strictfp",
            Modifier::Default => "default",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.keyword() == word)
    }

    /// Position in the conventional Java modifier order. Visibility keywords share rank 0.
    pub fn rank(self) -> u8 {
        match self {
            Modifier::Public | Modifier::Protected | Modifier::Private => 0,
            Modifier::Abstract => 1,
            Modifier::Static => 2,
            Modifier::Final => 3,
            Modifier::Transient => 4,
            Modifier::Volatile => 5,
            Modifier::Synchronized => 6,
            Modifier::Native => 7,
            Modifier::Strictfp => 8,
            Modifier::Default => 9,
        }
    }

    pub fn is_visibility(self) -> bool {
        self.rank() == 0
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Access level, totally ordered from most to least restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Private,
    Package,
    Protected,
    Public,
}

impl Visibility {
    pub const ALL: [Visibility; 4] = [
        Visibility::Private,
        Visibility::Package,
        Visibility::Protected,
        Visibility::Public,
    ];

    /// The keyword that spells this level; package access has none.
    pub fn modifier(self) -> Option<Modifier> {
        match self {
            Visibility::Private => Some(Modifier::Private),
            Visibility::Package => None,
            Visibility::Protected => Some(Modifier::Protected),
            Visibility::Public => Some(Modifier::Public),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Package => "package",
            Visibility::Protected => "protected",
            Visibility::Public => "public",
        }
    }

    pub fn from_modifiers<I>(modifiers: I) -> Self
    where
        I: IntoIterator<Item = Modifier>,
    {
        for m in modifiers {
            match m {
                Modifier::Public => return Visibility::Public,
                Modifier::Protected => return Visibility::Protected,
                Modifier::Private => return Visibility::Private,
                _ => {}
            }
        }
        Visibility::Package
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One string literal inside an annotation value; the span includes the quotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringElement {
    pub value: String,
    pub span: Span,
}

/// The value of a single-member annotation: either a bare literal or a `{...}` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationValue {
    pub span: Span,
    pub array: bool,
    pub elements: Vec<StringElement>,
}

impl AnnotationValue {
    pub fn contains(&self, token: &str) -> bool {
        self.elements.iter().any(|e| e.value == token)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Name as written, possibly qualified.
    pub name: String,
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AnnotationValue>,
}

impl Annotation {
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn is(&self, simple_name: &str) -> bool {
        self.simple_name() == simple_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum ModifierItem {
    Keyword { modifier: Modifier, span: Span },
    Annotation(Annotation),
}

impl ModifierItem {
    pub fn span(&self) -> Span {
        match self {
            ModifierItem::Keyword { span, .. } => *span,
            ModifierItem::Annotation(a) => a.span,
        }
    }
}

pub const SUPPRESS_WARNINGS: &str = "SuppressWarnings";
pub const QUALIFIED_SUPPRESS_WARNINGS: &str = "java.lang.SuppressWarnings";

/// Keywords and annotations in source order, plus the offset where the declaration proper starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierList {
    pub items: Vec<ModifierItem>,
    pub insert_at: usize,
}

impl ModifierList {
    pub fn keywords(&self) -> impl Iterator<Item = (Modifier, Span)> + '_ {
        self.items.iter().filter_map(|item| match item {
            ModifierItem::Keyword { modifier, span } => Some((*modifier, *span)),
            ModifierItem::Annotation(_) => None,
        })
    }

    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> + '_ {
        self.items.iter().filter_map(|item| match item {
            ModifierItem::Annotation(a) => Some(a),
            ModifierItem::Keyword { .. } => None,
        })
    }

    pub fn has(&self, modifier: Modifier) -> bool {
        self.keywords().any(|(m, _)| m == modifier)
    }

    pub fn keyword_span(&self, modifier: Modifier) -> Option<Span> {
        self.keywords().find(|(m, _)| *m == modifier).map(|(_, s)| s)
    }

    pub fn annotation(&self, simple_name: &str) -> Option<&Annotation> {
        self.annotations().find(|a| a.is(simple_name))
    }

    /// The `java.lang.SuppressWarnings` annotation, given the name the unit resolves it by.
    ///
    /// With `name` qualified, a simple-name `@SuppressWarnings` refers to some other type and is
    /// not matched.
    pub fn suppress_warnings(&self, name: &str) -> Option<&Annotation> {
        self.annotations()
            .find(|a| a.name == name || a.name == QUALIFIED_SUPPRESS_WARNINGS)
    }

    /// Offset of the first item, or `insert_at` when the list is empty.
    pub fn start(&self) -> usize {
        self.items
            .first()
            .map(|i| i.span().start)
            .unwrap_or(self.insert_at)
    }

    pub fn visibility(&self) -> Visibility {
        Visibility::from_modifiers(self.keywords().map(|(m, _)| m))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Type,
    Method,
    Constructor,
    Field,
    LocalVariable,
    Parameter,
    EnumConstant,
}

impl DeclKind {
    pub fn is_variable(self) -> bool {
        matches!(
            self,
            DeclKind::Field | DeclKind::LocalVariable | DeclKind::Parameter
        )
    }

    pub fn is_callable(self) -> bool {
        matches!(self, DeclKind::Method | DeclKind::Constructor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeNesting {
    TopLevel,
    Member,
    Local,
    Anonymous,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub kind: TypeKind,
    pub nesting: TypeNesting,
    /// Braces included.
    pub body: Span,
}

impl TypeInfo {
    pub fn is_interface_like(&self) -> bool {
        matches!(self.kind, TypeKind::Interface | TypeKind::Annotation)
    }
}

/// A type as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    /// `None` for constructors.
    pub return_type: Option<TypeRef>,
    /// Text between the parameter parentheses.
    pub params: Span,
    /// Braces included.
    pub body: Option<Span>,
    /// The `;` of a body-less method.
    pub terminator: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableInfo {
    pub ty: TypeRef,
    /// Name through the end of the initializer.
    pub declarator: Span,
    pub initializer: Option<Span>,
    pub group: Option<GroupId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "detail", rename_all = "snake_case")]
pub enum DeclDetail {
    Type(TypeInfo),
    Method(MethodInfo),
    Variable(VariableInfo),
    EnumConstant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocComment {
    pub span: Span,
    /// Carries an `@deprecated` tag.
    pub deprecated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: DeclKind,
    pub name: String,
    pub name_span: Span,
    pub modifiers: ModifierList,
    pub enclosing: Option<DeclId>,
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<DocComment>,
    pub detail: DeclDetail,
}

impl Declaration {
    /// Declared access level, read off the modifier keywords.
    pub fn visibility(&self) -> Visibility {
        self.modifiers.visibility()
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.has(modifier)
    }

    pub fn type_info(&self) -> Option<&TypeInfo> {
        match &self.detail {
            DeclDetail::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn method_info(&self) -> Option<&MethodInfo> {
        match &self.detail {
            DeclDetail::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn variable_info(&self) -> Option<&VariableInfo> {
        match &self.detail {
            DeclDetail::Variable(v) => Some(v),
            _ => None,
        }
    }

    /// Whether `@SuppressWarnings` may be attached here.
    pub fn is_suppressible(&self) -> bool {
        !matches!(
            self.type_info().map(|t| t.nesting),
            Some(TypeNesting::Anonymous)
        )
    }
}

/// A declaration statement that may introduce several variables sharing one modifier list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaratorGroup {
    /// From the first modifier through the `;` when `terminated`.
    pub span: Span,
    pub modifiers: ModifierList,
    pub ty: TypeRef,
    pub declarators: Vec<DeclId>,
    /// False for `for (...)` initializers.
    pub terminated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Read,
    Write,
}

/// A use of a name, as recorded by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub span: Span,
    pub name: String,
    /// Accessed through an explicit receiver (`c.name`).
    pub qualified: bool,
    pub access: Access,
    /// The whole `name = value;` statement when the reference is its assignment target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<Span>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_value: Option<Span>,
    pub enclosing: Option<DeclId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub path: String,
    pub span: Span,
    #[serde(default)]
    pub on_demand: bool,
}

impl Import {
    pub fn simple_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }
}

/// One parsed, resolved file plus its text buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    pub path: Utf8PathBuf,
    pub package: String,
    pub text: String,
    #[serde(default)]
    pub imports: Vec<Import>,
    #[serde(default)]
    pub decls: Vec<Declaration>,
    #[serde(default)]
    pub groups: Vec<DeclaratorGroup>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl SourceUnit {
    pub fn decl(&self, id: DeclId) -> Option<&Declaration> {
        self.decls.get(id.index())
    }

    pub fn group(&self, id: GroupId) -> Option<&DeclaratorGroup> {
        self.groups.get(id.index())
    }

    pub fn decl_ids(&self) -> impl Iterator<Item = DeclId> + '_ {
        (0..self.decls.len()).map(|i| DeclId(i as u32))
    }

    /// The smallest declaration whose span covers `span`.
    pub fn innermost_decl(&self, span: Span) -> Option<DeclId> {
        self.decl_ids()
            .filter_map(|id| self.decl(id).map(|d| (id, d)))
            .filter(|(_, d)| d.span.contains(span))
            .min_by_key(|(_, d)| d.span.len())
            .map(|(id, _)| id)
    }

    /// Ancestors of `id`, nearest first, not including `id` itself.
    pub fn ancestors(&self, id: DeclId) -> Ancestors<'_> {
        Ancestors {
            unit: self,
            next: self.decl(id).and_then(|d| d.enclosing),
        }
    }

    /// Nearest enclosing type declaration, not including `id` itself.
    pub fn enclosing_type(&self, id: DeclId) -> Option<DeclId> {
        self.ancestors(id)
            .find(|a| matches!(self.decl(*a).map(|d| d.kind), Some(DeclKind::Type)))
    }

    /// Like [`SourceUnit::enclosing_type`] but returns `id` itself when it is a type.
    pub fn owning_type(&self, id: DeclId) -> Option<DeclId> {
        match self.decl(id).map(|d| d.kind) {
            Some(DeclKind::Type) => Some(id),
            Some(_) => self.enclosing_type(id),
            None => None,
        }
    }

    /// The reference whose span covers `span`, preferring the tightest one.
    pub fn reference_at(&self, span: Span) -> Option<usize> {
        self.references
            .iter()
            .enumerate()
            .filter(|(_, r)| r.span.contains(span) || span.contains(r.span))
            .min_by_key(|(_, r)| r.span.len())
            .map(|(i, _)| i)
    }

    /// Access level as the language sees it: interface members and enum constants are public.
    pub fn effective_visibility(&self, id: DeclId) -> Visibility {
        let Some(decl) = self.decl(id) else {
            return Visibility::Package;
        };
        if decl.kind == DeclKind::EnumConstant {
            return Visibility::Public;
        }
        let in_interface = decl
            .enclosing
            .and_then(|e| self.decl(e))
            .and_then(|e| e.type_info())
            .is_some_and(|t| t.is_interface_like());
        if in_interface {
            return Visibility::Public;
        }
        decl.visibility()
    }

    pub fn line_start(&self, offset: usize) -> usize {
        self.text
            .get(..offset)
            .and_then(|head| head.rfind('\n'))
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// Leading whitespace of the line containing `offset`.
    pub fn line_indent(&self, offset: usize) -> &str {
        let start = self.line_start(offset);
        let line = self.text.get(start..).unwrap_or("");
        let len = line
            .find(|c: char| c != ' ' && c != '\t')
            .unwrap_or(line.len());
        &line[..len]
    }

    /// True when only whitespace precedes `offset` on its line.
    pub fn starts_line(&self, offset: usize) -> bool {
        let start = self.line_start(offset);
        self.text
            .get(start..offset)
            .is_some_and(|s| s.chars().all(|c| c == ' ' || c == '\t'))
    }

    pub fn declares_type(&self, simple_name: &str) -> bool {
        self.decls
            .iter()
            .any(|d| d.kind == DeclKind::Type && d.name == simple_name)
    }
}

pub struct Ancestors<'a> {
    unit: &'a SourceUnit,
    next: Option<DeclId>,
}

impl Iterator for Ancestors<'_> {
    type Item = DeclId;

    fn next(&mut self) -> Option<DeclId> {
        let current = self.next?;
        self.next = self.unit.decl(current).and_then(|d| d.enclosing);
        Some(current)
    }
}

/// All units visible to one correction request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub units: Vec<SourceUnit>,
}

impl ProjectSnapshot {
    pub fn new(units: Vec<SourceUnit>) -> Self {
        Self { units }
    }

    pub fn push(&mut self, unit: SourceUnit) -> UnitId {
        self.units.push(unit);
        UnitId((self.units.len() - 1) as u32)
    }

    pub fn unit(&self, id: UnitId) -> Option<&SourceUnit> {
        self.units.get(id.index())
    }

    pub fn decl(&self, r: DeclRef) -> Option<&Declaration> {
        self.unit(r.unit).and_then(|u| u.decl(r.decl))
    }

    /// Package of the unit that holds `r`.
    pub fn package_of(&self, r: DeclRef) -> Option<&str> {
        self.unit(r.unit).map(|u| u.package.as_str())
    }
}
