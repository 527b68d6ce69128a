//! Builds resolved [`SourceUnit`]s straight from Java text.
//!
//! This is not a parser. Callers name each declaration they care about and the builder locates it
//! by token search, then reads the modifier prefix, type, body and declarators around it. It is
//! meant for tests and for embedders that want to drive the engine from small snippets.
//!
//! Every locating method panics with a descriptive message when the requested element cannot be
//! found, since a wrong fixture is a bug in the caller.

use crate::ast::{
    Access, Annotation, AnnotationValue, DeclDetail, DeclId, DeclKind, Declaration,
    DeclaratorGroup, DocComment, GroupId, Import, MethodInfo, Modifier, ModifierItem,
    ModifierList, Reference, SourceUnit, Span, StringElement, TypeInfo, TypeKind, TypeNesting,
    TypeRef, VariableInfo,
};
use camino::Utf8PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tok {
    Ident,
    Str,
    Char,
    Num,
    Punct(u8),
    Doc,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: Tok,
    span: Span,
}

fn lex(text: &str) -> Vec<Token> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        if b == b'/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }
        if b == b'/' && bytes.get(i + 1) == Some(&b'*') {
            let doc = bytes.get(i + 2) == Some(&b'*') && bytes.get(i + 3) != Some(&b'/');
            i += 2;
            while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                i += 1;
            }
            i = (i + 2).min(bytes.len());
            if doc {
                out.push(Token {
                    kind: Tok::Doc,
                    span: Span::new(start, i),
                });
            }
            continue;
        }
        if b == b'"' || b == b'\'' {
            i += 1;
            while i < bytes.len() && bytes[i] != b {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            i = (i + 1).min(bytes.len());
            let kind = if b == b'"' { Tok::Str } else { Tok::Char };
            out.push(Token {
                kind,
                span: Span::new(start, i),
            });
            continue;
        }
        if b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80 {
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric()
                    || bytes[i] == b'_'
                    || bytes[i] == b'$'
                    || bytes[i] >= 0x80)
            {
                i += 1;
            }
            out.push(Token {
                kind: Tok::Ident,
                span: Span::new(start, i),
            });
            continue;
        }
        if b.is_ascii_digit() {
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'.' || bytes[i] == b'_')
            {
                i += 1;
            }
            out.push(Token {
                kind: Tok::Num,
                span: Span::new(start, i),
            });
            continue;
        }
        out.push(Token {
            kind: Tok::Punct(b),
            span: Span::new(start, start + 1),
        });
        i += 1;
    }
    out
}

const STATEMENT_KEYWORDS: &[&str] = &[
    "return", "throw", "new", "else", "case", "assert", "yield", "break", "continue", "this",
    "super", "if", "while", "for", "do", "switch", "try", "catch", "finally", "goto", "package",
    "import", "class", "interface", "enum", "instanceof",
];

struct Prefix {
    doc: Option<DocComment>,
    modifiers: ModifierList,
    /// Token index right after the modifier list.
    rest: usize,
}

struct ParsedDeclarator {
    name: usize,
    declarator: Span,
    initializer: Option<Span>,
}

struct ParsedStatement {
    prefix: Prefix,
    ty: TypeRef,
    declarators: Vec<ParsedDeclarator>,
    span: Span,
    terminated: bool,
}

/// Incrementally builds one [`SourceUnit`].
pub struct UnitBuilder {
    path: Utf8PathBuf,
    text: String,
    tokens: Vec<Token>,
    package: String,
    imports: Vec<Import>,
    decls: Vec<Declaration>,
    groups: Vec<DeclaratorGroup>,
    references: Vec<Reference>,
}

impl UnitBuilder {
    /// Lexes `text` and reads its package and import declarations.
    pub fn new(path: impl Into<Utf8PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        let tokens = lex(&text);
        let mut builder = Self {
            path: path.into(),
            text,
            tokens,
            package: String::new(),
            imports: Vec::new(),
            decls: Vec::new(),
            groups: Vec::new(),
            references: Vec::new(),
        };
        builder.read_header();
        builder
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Span of the first occurrence of `needle` in the text.
    ///
    /// # Panics
    /// When `needle` does not occur.
    pub fn span_of(&self, needle: &str) -> Span {
        let start = self
            .text
            .find(needle)
            .unwrap_or_else(|| panic!("`{needle}` not found in {}", self.path));
        Span::new(start, start + needle.len())
    }

    pub fn build(self) -> SourceUnit {
        SourceUnit {
            path: self.path,
            package: self.package,
            text: self.text,
            imports: self.imports,
            decls: self.decls,
            groups: self.groups,
            references: self.references,
        }
    }

    /// A top-level or member class, interface, enum or annotation type named `name`.
    pub fn ty(&mut self, parent: Option<DeclId>, name: &str) -> DeclId {
        let (lo, hi) = self.search_range(parent);
        let direct = parent.is_none_or(|p| self.decls[p.index()].kind == DeclKind::Type);
        let found = (lo..hi).find(|&i| {
            self.is_ident(i, name)
                && i > 0
                && matches!(self.tok_text(i - 1), "class" | "interface" | "enum")
                && (!direct || self.depth_between(lo, i) == 0)
        });
        let Some(name_tok) = found else {
            panic!("type `{name}` not found in {}", self.path);
        };
        let mut keyword = name_tok - 1;
        let kind = match self.tok_text(keyword) {
            "class" => TypeKind::Class,
            "enum" => TypeKind::Enum,
            _ if keyword > 0 && self.is_punct(keyword - 1, b'@') => {
                keyword -= 1;
                TypeKind::Annotation
            }
            _ => TypeKind::Interface,
        };
        let prefix = self.prefix_before(keyword);
        let open = (name_tok..self.tokens.len())
            .find(|&i| self.is_punct(i, b'{'))
            .unwrap_or_else(|| panic!("type `{name}` has no body"));
        let close = self.matching(open);
        let nesting = match parent.map(|p| self.decls[p.index()].kind) {
            None => TypeNesting::TopLevel,
            Some(DeclKind::Type) => TypeNesting::Member,
            Some(_) => TypeNesting::Local,
        };
        let body = Span::new(self.tokens[open].span.start, self.tokens[close].span.end);
        self.push_decl(Declaration {
            kind: DeclKind::Type,
            name: name.to_string(),
            name_span: self.tokens[name_tok].span,
            span: Span::new(prefix.modifiers.start(), body.end),
            modifiers: prefix.modifiers,
            enclosing: parent,
            doc: prefix.doc,
            detail: DeclDetail::Type(TypeInfo {
                kind,
                nesting,
                body,
            }),
        })
    }

    /// An anonymous class whose instantiation starts with `needle` inside `scope`.
    pub fn anonymous(&mut self, scope: DeclId, needle: &str) -> DeclId {
        let scope_span = self.decls[scope.index()].span;
        let at = self.find_in(scope_span, needle);
        let first = self.first_token_at_or_after(at.end);
        let open = (first..self.tokens.len())
            .find(|&i| self.is_punct(i, b'{'))
            .unwrap_or_else(|| panic!("anonymous class `{needle}` has no body"));
        let close = self.matching(open);
        let body = Span::new(self.tokens[open].span.start, self.tokens[close].span.end);
        self.push_decl(Declaration {
            kind: DeclKind::Type,
            name: String::new(),
            name_span: at,
            modifiers: ModifierList {
                items: Vec::new(),
                insert_at: at.start,
            },
            enclosing: Some(scope),
            span: Span::new(at.start, body.end),
            doc: None,
            detail: DeclDetail::Type(TypeInfo {
                kind: TypeKind::Class,
                nesting: TypeNesting::Anonymous,
                body,
            }),
        })
    }

    /// A method declared directly in `parent`.
    pub fn method(&mut self, parent: DeclId, name: &str) -> DeclId {
        let (lo, hi) = self.search_range(Some(parent));
        let found = (lo..hi).find(|&i| {
            self.is_ident(i, name)
                && self.is_punct(i + 1, b'(')
                && self.depth_between(lo, i) == 0
                && i > 0
                && match self.tokens[i - 1].kind {
                    Tok::Ident => !matches!(self.tok_text(i - 1), "new" | "return"),
                    Tok::Punct(b'>') | Tok::Punct(b']') => true,
                    _ => false,
                }
        });
        let Some(name_tok) = found else {
            panic!("method `{name}` not found in {}", self.path);
        };
        self.callable(parent, name_tok, DeclKind::Method)
    }

    /// The constructor of type `parent`; the first one when overloaded.
    pub fn constructor(&mut self, parent: DeclId) -> DeclId {
        let name = self.decls[parent.index()].name.clone();
        let (lo, hi) = self.search_range(Some(parent));
        let found = (lo..hi).find(|&i| {
            self.is_ident(i, &name)
                && self.is_punct(i + 1, b'(')
                && self.depth_between(lo, i) == 0
                && (i == 0
                    || !(self.is_ident(i - 1, "new")
                        || self.is_punct(i - 1, b'.')
                        || self.is_punct(i - 1, b'@')))
        });
        let Some(name_tok) = found else {
            panic!("constructor of `{name}` not found in {}", self.path);
        };
        self.callable(parent, name_tok, DeclKind::Constructor)
    }

    /// A field of `parent`. Co-declared fields are registered together.
    pub fn field(&mut self, parent: DeclId, name: &str) -> DeclId {
        self.variable(parent, name, DeclKind::Field)
    }

    /// A local variable declared anywhere in the body of `scope`, including `for` initializers.
    pub fn local(&mut self, scope: DeclId, name: &str) -> DeclId {
        self.variable(scope, name, DeclKind::LocalVariable)
    }

    /// A parameter of method or constructor `method`.
    pub fn param(&mut self, method: DeclId, name: &str) -> DeclId {
        let params = match &self.decls[method.index()].detail {
            DeclDetail::Method(m) => m.params,
            _ => panic!("`{}` is not a method", self.decls[method.index()].name),
        };
        let lo = self.first_token_at_or_after(params.start);
        let hi = self.first_token_at_or_after(params.end);
        let mut segments = Vec::new();
        let mut seg_start = lo;
        let mut depth = 0i32;
        for i in lo..hi {
            match self.tokens[i].kind {
                Tok::Punct(b'(') | Tok::Punct(b'<') | Tok::Punct(b'[') => depth += 1,
                Tok::Punct(b')') | Tok::Punct(b'>') | Tok::Punct(b']') => depth -= 1,
                Tok::Punct(b',') if depth == 0 => {
                    segments.push((seg_start, i));
                    seg_start = i + 1;
                }
                _ => {}
            }
        }
        if seg_start < hi {
            segments.push((seg_start, hi));
        }
        for (start, end) in segments {
            let Some(name_tok) = (start..end).rev().find(|&i| self.tokens[i].kind == Tok::Ident)
            else {
                continue;
            };
            if self.tok_text(name_tok) != name {
                continue;
            }
            let (items, rest) = self.modifier_items(start, name_tok);
            let modifiers = ModifierList {
                items,
                insert_at: self.tokens[rest].span.start,
            };
            let ty_span = Span::new(
                self.tokens[rest].span.start,
                self.tokens[name_tok - 1].span.end,
            );
            let name_span = self.tokens[name_tok].span;
            return self.push_decl(Declaration {
                kind: DeclKind::Parameter,
                name: name.to_string(),
                name_span,
                span: Span::new(modifiers.start(), name_span.end),
                modifiers,
                enclosing: Some(method),
                doc: None,
                detail: DeclDetail::Variable(VariableInfo {
                    ty: TypeRef {
                        text: ty_span.slice(&self.text).to_string(),
                        span: ty_span,
                    },
                    declarator: name_span,
                    initializer: None,
                    group: None,
                }),
            });
        }
        panic!("parameter `{name}` not found in {}", self.path);
    }

    /// An enum constant of enum `parent`.
    pub fn enum_constant(&mut self, parent: DeclId, name: &str) -> DeclId {
        let (lo, hi) = self.search_range(Some(parent));
        let found = (lo..hi).find(|&i| self.is_ident(i, name) && self.depth_between(lo, i) == 0);
        let Some(name_tok) = found else {
            panic!("enum constant `{name}` not found in {}", self.path);
        };
        let prefix = self.prefix_before(name_tok);
        let mut end = self.tokens[name_tok].span.end;
        let mut next = name_tok + 1;
        if self.is_punct(next, b'(') {
            next = self.matching(next);
            end = self.tokens[next].span.end;
            next += 1;
        }
        if self.is_punct(next, b'{') {
            end = self.tokens[self.matching(next)].span.end;
        }
        self.push_decl(Declaration {
            kind: DeclKind::EnumConstant,
            name: name.to_string(),
            name_span: self.tokens[name_tok].span,
            span: Span::new(prefix.modifiers.start(), end),
            modifiers: prefix.modifiers,
            enclosing: Some(parent),
            doc: prefix.doc,
            detail: DeclDetail::EnumConstant,
        })
    }

    /// Records a use of `name` inside the first occurrence of `pattern` within `scope`.
    /// Returns the reference index.
    pub fn reference(&mut self, scope: DeclId, pattern: &str, name: &str) -> usize {
        let scope_span = self.decls[scope.index()].span;
        let at = self.find_in(scope_span, pattern);
        let lo = self.first_token_at_or_after(at.start);
        let hi = self.first_token_at_or_after(at.end);
        let Some(name_tok) = (lo..hi).find(|&i| self.is_ident(i, name)) else {
            panic!("`{name}` not found inside `{pattern}`");
        };
        let qualified = name_tok > 0 && self.is_punct(name_tok - 1, b'.');
        let next = name_tok + 1;
        let plain_assign = self.is_punct(next, b'=') && !self.is_punct(next + 1, b'=');
        let compound = matches!(
            self.tokens.get(next).map(|t| t.kind),
            Some(Tok::Punct(b'+' | b'-' | b'*' | b'/' | b'%' | b'&' | b'|' | b'^'))
        ) && self.is_punct(next + 1, b'=');
        let step = (self.is_punct(next, b'+') && self.is_punct(next + 1, b'+'))
            || (self.is_punct(next, b'-') && self.is_punct(next + 1, b'-'));
        let access = if plain_assign || compound || step {
            Access::Write
        } else {
            Access::Read
        };

        let mut statement = None;
        let mut assigned_value = None;
        if plain_assign {
            let mut chain = name_tok;
            while chain >= 2
                && self.is_punct(chain - 1, b'.')
                && self.tokens[chain - 2].kind == Tok::Ident
            {
                chain -= 2;
            }
            let starts_statement = chain == 0
                || matches!(
                    self.tokens[chain - 1].kind,
                    Tok::Punct(b';') | Tok::Punct(b'{') | Tok::Punct(b'}')
                );
            if starts_statement {
                if let Some(semi) = self.statement_end(next + 1) {
                    statement = Some(Span::new(
                        self.tokens[chain].span.start,
                        self.tokens[semi].span.end,
                    ));
                    if semi > next + 1 {
                        assigned_value = Some(Span::new(
                            self.tokens[next + 1].span.start,
                            self.tokens[semi - 1].span.end,
                        ));
                    }
                }
            }
        }

        self.references.push(Reference {
            span: self.tokens[name_tok].span,
            name: name.to_string(),
            qualified,
            access,
            statement,
            assigned_value,
            enclosing: Some(scope),
        });
        self.references.len() - 1
    }

    fn read_header(&mut self) {
        let mut i = 0;
        while i < self.tokens.len() {
            let word = self.tok_text(i);
            if word != "package" && word != "import" {
                if self.tokens[i].kind == Tok::Ident || self.is_punct(i, b'@') {
                    break;
                }
                i += 1;
                continue;
            }
            let Some(semi) = (i..self.tokens.len()).find(|&j| self.is_punct(j, b';')) else {
                break;
            };
            let mut path_start = i + 1;
            if word == "import" && self.is_ident(path_start, "static") {
                path_start += 1;
            }
            let path: String = (path_start..semi).map(|j| self.tok_text(j)).collect();
            if word == "package" {
                self.package = path;
            } else {
                let on_demand = path.ends_with(".*");
                self.imports.push(Import {
                    path: path.trim_end_matches(".*").to_string(),
                    span: Span::new(self.tokens[i].span.start, self.tokens[semi].span.end),
                    on_demand,
                });
            }
            i = semi + 1;
        }
    }

    fn callable(&mut self, parent: DeclId, name_tok: usize, kind: DeclKind) -> DeclId {
        let prefix = self.prefix_before(name_tok);
        let return_type = (kind == DeclKind::Method && prefix.rest < name_tok).then(|| {
            let span = Span::new(
                self.tokens[prefix.rest].span.start,
                self.tokens[name_tok - 1].span.end,
            );
            TypeRef {
                text: span.slice(&self.text).to_string(),
                span,
            }
        });
        let open = name_tok + 1;
        let close = self.matching(open);
        let params = Span::new(self.tokens[open].span.end, self.tokens[close].span.start);
        let mut body = None;
        let mut terminator = None;
        let mut end = self.tokens[close].span.end;
        let mut depth = 0i32;
        for i in close + 1..self.tokens.len() {
            match self.tokens[i].kind {
                Tok::Punct(b'(') => depth += 1,
                Tok::Punct(b')') => depth -= 1,
                Tok::Punct(b'{') if depth == 0 => {
                    let c = self.matching(i);
                    let span = Span::new(self.tokens[i].span.start, self.tokens[c].span.end);
                    body = Some(span);
                    end = span.end;
                    break;
                }
                Tok::Punct(b';') if depth == 0 => {
                    terminator = Some(self.tokens[i].span);
                    end = self.tokens[i].span.end;
                    break;
                }
                _ => {}
            }
        }
        let name = self.tok_text(name_tok).to_string();
        self.push_decl(Declaration {
            kind,
            name,
            name_span: self.tokens[name_tok].span,
            span: Span::new(prefix.modifiers.start(), end),
            modifiers: prefix.modifiers,
            enclosing: Some(parent),
            doc: prefix.doc,
            detail: DeclDetail::Method(MethodInfo {
                return_type,
                params,
                body,
                terminator,
            }),
        })
    }

    fn variable(&mut self, scope: DeclId, name: &str, kind: DeclKind) -> DeclId {
        let (lo, hi) = self.search_range(Some(scope));
        for i in lo..hi {
            if !self.is_ident(i, name) {
                continue;
            }
            if kind == DeclKind::Field && self.depth_between(lo, i) != 0 {
                continue;
            }
            let span = self.tokens[i].span;
            if let Some(existing) = self.decls.iter().position(|d| d.name_span == span) {
                return DeclId(existing as u32);
            }
            let Some(stmt) = self.parse_statement(i) else {
                continue;
            };
            if !stmt.declarators.iter().any(|d| d.name == i) {
                continue;
            }
            return self.register_group(scope, kind, stmt, i);
        }
        panic!("variable `{name}` not found in {}", self.path);
    }

    fn register_group(
        &mut self,
        scope: DeclId,
        kind: DeclKind,
        stmt: ParsedStatement,
        wanted: usize,
    ) -> DeclId {
        let group = GroupId(self.groups.len() as u32);
        let mut ids = Vec::new();
        let mut result = None;
        for d in &stmt.declarators {
            let id = self.push_decl(Declaration {
                kind,
                name: self.tok_text(d.name).to_string(),
                name_span: self.tokens[d.name].span,
                modifiers: stmt.prefix.modifiers.clone(),
                enclosing: Some(scope),
                span: d.declarator,
                doc: stmt.prefix.doc.clone(),
                detail: DeclDetail::Variable(VariableInfo {
                    ty: stmt.ty.clone(),
                    declarator: d.declarator,
                    initializer: d.initializer,
                    group: Some(group),
                }),
            });
            if d.name == wanted {
                result = Some(id);
            }
            ids.push(id);
        }
        self.groups.push(DeclaratorGroup {
            span: stmt.span,
            modifiers: stmt.prefix.modifiers,
            ty: stmt.ty,
            declarators: ids,
            terminated: stmt.terminated,
        });
        match result {
            Some(id) => id,
            None => panic!("declarator vanished while registering"),
        }
    }

    /// Parses the declaration statement containing token `at`, if it is one.
    fn parse_statement(&self, at: usize) -> Option<ParsedStatement> {
        let mut i = at;
        let mut for_init = false;
        let first = loop {
            if i == 0 {
                break 0;
            }
            let prev = i - 1;
            match self.tokens[prev].kind {
                Tok::Punct(b';') | Tok::Punct(b'{') | Tok::Punct(b'}') | Tok::Doc => break i,
                Tok::Punct(b'(') => {
                    if prev > 0 && self.is_ident(prev - 1, "for") {
                        for_init = true;
                        break i;
                    }
                    return None;
                }
                Tok::Punct(b')') | Tok::Punct(b']') => i = self.matching_back(prev),
                _ => i = prev,
            }
        };
        let prefix = self.prefix_at(first);
        let ty_end = self.type_end(prefix.rest)?;
        let ty_span = Span::new(
            self.tokens[prefix.rest].span.start,
            self.tokens[ty_end - 1].span.end,
        );
        let mut declarators = Vec::new();
        let mut j = ty_end;
        let (end_tok, terminated) = loop {
            let name = j;
            if self.tokens.get(name)?.kind != Tok::Ident {
                return None;
            }
            j += 1;
            while self.is_punct(j, b'[') && self.is_punct(j + 1, b']') {
                j += 2;
            }
            let mut last = j - 1;
            let mut initializer = None;
            if self.is_punct(j, b'=') {
                let init_start = j + 1;
                j = init_start;
                while j < self.tokens.len() {
                    match self.tokens[j].kind {
                        Tok::Punct(b',') | Tok::Punct(b';') | Tok::Punct(b')') => break,
                        Tok::Punct(b'(') | Tok::Punct(b'[') | Tok::Punct(b'{') => {
                            j = self.matching(j) + 1
                        }
                        _ => j += 1,
                    }
                }
                if j == init_start {
                    return None;
                }
                last = j - 1;
                initializer = Some(Span::new(
                    self.tokens[init_start].span.start,
                    self.tokens[last].span.end,
                ));
            }
            declarators.push(ParsedDeclarator {
                name,
                declarator: Span::new(self.tokens[name].span.start, self.tokens[last].span.end),
                initializer,
            });
            match self.tokens.get(j)?.kind {
                Tok::Punct(b',') => j += 1,
                Tok::Punct(b';') => break (j, !for_init),
                Tok::Punct(b':') if for_init => break (j, false),
                _ => return None,
            }
        };
        let end = if terminated {
            self.tokens[end_tok].span.end
        } else {
            self.tokens[end_tok - 1].span.end
        };
        Some(ParsedStatement {
            span: Span::new(prefix.modifiers.start(), end),
            prefix,
            ty: TypeRef {
                text: ty_span.slice(&self.text).to_string(),
                span: ty_span,
            },
            declarators,
            terminated,
        })
    }

    /// Exclusive end token of a type starting at `i`.
    fn type_end(&self, i: usize) -> Option<usize> {
        let first = self.tokens.get(i)?;
        if first.kind != Tok::Ident || STATEMENT_KEYWORDS.contains(&self.tok_text(i)) {
            return None;
        }
        let mut j = i + 1;
        loop {
            if self.is_punct(j, b'.') && self.tokens.get(j + 1).map(|t| t.kind) == Some(Tok::Ident)
            {
                j += 2;
            } else if self.is_punct(j, b'<') {
                j = self.matching(j) + 1;
            } else {
                break;
            }
        }
        while self.is_punct(j, b'[') && self.is_punct(j + 1, b']') {
            j += 2;
        }
        Some(j)
    }

    /// Prefix of the declaration whose keyword or name token is `anchor`.
    fn prefix_before(&self, anchor: usize) -> Prefix {
        let mut i = anchor;
        while i > 0 {
            let prev = i - 1;
            match self.tokens[prev].kind {
                Tok::Punct(b';') | Tok::Punct(b'{') | Tok::Punct(b'}') | Tok::Punct(b',')
                | Tok::Doc => break,
                Tok::Punct(b')') | Tok::Punct(b']') | Tok::Punct(b'>') => {
                    i = self.matching_back(prev)
                }
                _ => i = prev,
            }
        }
        self.prefix_at(i)
    }

    fn prefix_at(&self, first: usize) -> Prefix {
        let doc = (first > 0 && self.tokens[first - 1].kind == Tok::Doc).then(|| {
            let span = self.tokens[first - 1].span;
            DocComment {
                span,
                deprecated: span.slice(&self.text).contains("@deprecated"),
            }
        });
        let (items, rest) = self.modifier_items(first, self.tokens.len());
        let insert_at = self
            .tokens
            .get(rest)
            .map(|t| t.span.start)
            .unwrap_or(self.text.len());
        Prefix {
            doc,
            modifiers: ModifierList { items, insert_at },
            rest,
        }
    }

    fn modifier_items(&self, mut i: usize, limit: usize) -> (Vec<ModifierItem>, usize) {
        let mut items = Vec::new();
        while i < limit {
            if self.is_punct(i, b'@') && !self.is_ident(i + 1, "interface") {
                let start = self.tokens[i].span.start;
                let mut j = i + 1;
                let mut name = String::new();
                while self.tokens.get(j).map(|t| t.kind) == Some(Tok::Ident) {
                    name.push_str(self.tok_text(j));
                    j += 1;
                    if self.is_punct(j, b'.') {
                        name.push('.');
                        j += 1;
                    } else {
                        break;
                    }
                }
                let mut end = self.tokens[j - 1].span.end;
                let mut value = None;
                if self.is_punct(j, b'(') {
                    let close = self.matching(j);
                    value = self.annotation_value(j + 1, close);
                    end = self.tokens[close].span.end;
                    j = close + 1;
                }
                items.push(ModifierItem::Annotation(Annotation {
                    name,
                    span: Span::new(start, end),
                    value,
                }));
                i = j;
                continue;
            }
            if self.tokens[i].kind == Tok::Ident {
                if let Some(modifier) = Modifier::from_keyword(self.tok_text(i)) {
                    items.push(ModifierItem::Keyword {
                        modifier,
                        span: self.tokens[i].span,
                    });
                    i += 1;
                    continue;
                }
            }
            break;
        }
        (items, i)
    }

    fn annotation_value(&self, mut lo: usize, hi: usize) -> Option<AnnotationValue> {
        if lo + 1 < hi && self.is_ident(lo, "value") && self.is_punct(lo + 1, b'=') {
            lo += 2;
        }
        if lo >= hi {
            return None;
        }
        match self.tokens[lo].kind {
            Tok::Str => Some(AnnotationValue {
                span: self.tokens[lo].span,
                array: false,
                elements: vec![self.string_element(lo)],
            }),
            Tok::Punct(b'{') => {
                let close = self.matching(lo);
                let elements = (lo + 1..close)
                    .filter(|&k| self.tokens[k].kind == Tok::Str)
                    .map(|k| self.string_element(k))
                    .collect();
                Some(AnnotationValue {
                    span: Span::new(self.tokens[lo].span.start, self.tokens[close].span.end),
                    array: true,
                    elements,
                })
            }
            _ => None,
        }
    }

    fn string_element(&self, i: usize) -> StringElement {
        let span = self.tokens[i].span;
        let raw = span.slice(&self.text);
        StringElement {
            value: raw.trim_matches('"').to_string(),
            span,
        }
    }

    fn statement_end(&self, mut j: usize) -> Option<usize> {
        while j < self.tokens.len() {
            match self.tokens[j].kind {
                Tok::Punct(b';') => return Some(j),
                Tok::Punct(b'(') | Tok::Punct(b'[') | Tok::Punct(b'{') => j = self.matching(j) + 1,
                Tok::Punct(b'}') => return None,
                _ => j += 1,
            }
        }
        None
    }

    fn push_decl(&mut self, decl: Declaration) -> DeclId {
        self.decls.push(decl);
        DeclId((self.decls.len() - 1) as u32)
    }

    /// Token range to search for children of `parent`: a type's body or a callable's body.
    fn search_range(&self, parent: Option<DeclId>) -> (usize, usize) {
        let Some(p) = parent else {
            return (0, self.tokens.len());
        };
        let span = match &self.decls[p.index()].detail {
            DeclDetail::Type(t) => t.body,
            DeclDetail::Method(m) => m.body.unwrap_or(m.params),
            _ => self.decls[p.index()].span,
        };
        let lo = self.first_token_at_or_after(span.start + 1);
        let hi = self.first_token_at_or_after(span.end.saturating_sub(1));
        (lo, hi)
    }

    fn find_in(&self, scope: Span, needle: &str) -> Span {
        let hay = scope.slice(&self.text);
        let Some(offset) = hay.find(needle) else {
            panic!("`{needle}` not found in scope of {}", self.path);
        };
        let start = scope.start + offset;
        Span::new(start, start + needle.len())
    }

    fn first_token_at_or_after(&self, offset: usize) -> usize {
        self.tokens
            .iter()
            .position(|t| t.span.start >= offset)
            .unwrap_or(self.tokens.len())
    }

    /// Net count of `{` opened between token `lo` (inclusive) and `i` (exclusive).
    fn depth_between(&self, lo: usize, i: usize) -> i32 {
        let mut depth = 0;
        for t in &self.tokens[lo..i] {
            match t.kind {
                Tok::Punct(b'{') => depth += 1,
                Tok::Punct(b'}') => depth -= 1,
                _ => {}
            }
        }
        depth
    }

    fn matching(&self, open: usize) -> usize {
        let (o, c) = match self.tokens[open].kind {
            Tok::Punct(b'(') => (b'(', b')'),
            Tok::Punct(b'[') => (b'[', b']'),
            Tok::Punct(b'{') => (b'{', b'}'),
            Tok::Punct(b'<') => (b'<', b'>'),
            _ => return open,
        };
        let mut depth = 0;
        for i in open..self.tokens.len() {
            if self.is_punct(i, o) {
                depth += 1;
            } else if self.is_punct(i, c) {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
        }
        panic!("unbalanced `{}` in {}", o as char, self.path);
    }

    fn matching_back(&self, close: usize) -> usize {
        let (o, c) = match self.tokens[close].kind {
            Tok::Punct(b')') => (b'(', b')'),
            Tok::Punct(b']') => (b'[', b']'),
            Tok::Punct(b'}') => (b'{', b'}'),
            Tok::Punct(b'>') => (b'<', b'>'),
            _ => return close,
        };
        let mut depth = 0;
        for i in (0..=close).rev() {
            if self.is_punct(i, c) {
                depth += 1;
            } else if self.is_punct(i, o) {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
        }
        panic!("unbalanced `{}` in {}", c as char, self.path);
    }

    fn tok_text(&self, i: usize) -> &str {
        self.tokens
            .get(i)
            .map(|t| t.span.slice(&self.text))
            .unwrap_or("")
    }

    fn is_ident(&self, i: usize, word: &str) -> bool {
        self.tokens.get(i).is_some_and(|t| t.kind == Tok::Ident) && self.tok_text(i) == word
    }

    fn is_punct(&self, i: usize, c: u8) -> bool {
        self.tokens.get(i).is_some_and(|t| t.kind == Tok::Punct(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_package_and_imports() {
        let b = UnitBuilder::new(
            "test1/A.java",
            "package test1;\nimport java.util.*;\nimport foo.SuppressWarnings;\nclass A {}\n",
        );
        let unit = b.build();
        assert_eq!(unit.package, "test1");
        assert_eq!(unit.imports.len(), 2);
        assert!(unit.imports[0].on_demand);
        assert_eq!(unit.imports[1].simple_name(), "SuppressWarnings");
    }

    #[test]
    fn type_and_method_prefixes() {
        let src = "package p;\npublic abstract class E {\n    /** @deprecated */\n    @Override public abstract int foo();\n}\n";
        let mut b = UnitBuilder::new("p/E.java", src);
        let e = b.ty(None, "E");
        let foo = b.method(e, "foo");
        let unit = b.build();
        let e = unit.decl(e).unwrap();
        assert!(e.has_modifier(Modifier::Abstract));
        assert_eq!(e.modifiers.insert_at, src.find("class").unwrap());
        let foo = unit.decl(foo).unwrap();
        assert_eq!(foo.kind, DeclKind::Method);
        assert!(foo.doc.as_ref().unwrap().deprecated);
        assert!(foo.modifiers.annotation("Override").is_some());
        let m = foo.method_info().unwrap();
        assert_eq!(m.return_type.as_ref().unwrap().text, "int");
        assert!(m.body.is_none());
        assert_eq!(m.terminator.unwrap().slice(src), ";");
    }

    #[test]
    fn multi_declarator_group_registers_all_variables() {
        let src = "class E {\n    final List<String> a= null, x= a, y= a;\n}\n";
        let mut b = UnitBuilder::new("E.java", src);
        let e = b.ty(None, "E");
        let x = b.field(e, "x");
        let unit = b.build();
        assert_eq!(unit.groups.len(), 1);
        let group = &unit.groups[0];
        assert_eq!(group.declarators.len(), 3);
        assert_eq!(group.ty.text, "List<String>");
        assert!(group.terminated);
        assert_eq!(group.span.slice(src), "final List<String> a= null, x= a, y= a;");
        let x = unit.decl(x).unwrap();
        assert_eq!(x.variable_info().unwrap().declarator.slice(src), "x= a");
    }

    #[test]
    fn for_initializer_is_not_terminated() {
        let src = "class E {\n    void foo() {\n        for (int i= 1; true;) {\n        }\n    }\n}\n";
        let mut b = UnitBuilder::new("E.java", src);
        let e = b.ty(None, "E");
        let foo = b.method(e, "foo");
        b.local(foo, "i");
        let unit = b.build();
        assert!(!unit.groups[0].terminated);
        assert_eq!(unit.groups[0].span.slice(src), "int i= 1");
    }

    #[test]
    fn suppress_warnings_values_are_read() {
        let src = "class A {\n    @SuppressWarnings({\"unused\", \"X\"})\n    int f;\n}\n";
        let mut b = UnitBuilder::new("A.java", src);
        let a = b.ty(None, "A");
        let f = b.field(a, "f");
        let unit = b.build();
        let ann = unit
            .decl(f)
            .unwrap()
            .modifiers
            .annotation("SuppressWarnings")
            .cloned()
            .unwrap();
        let value = ann.value.unwrap();
        assert!(value.array);
        assert_eq!(value.elements.len(), 2);
        assert_eq!(value.elements[1].value, "X");
    }

    #[test]
    fn write_reference_records_statement() {
        let src = "class E extends C {\n    public void foo() {\n         fXoo= 1;\n    }\n}\n";
        let mut b = UnitBuilder::new("E.java", src);
        let e = b.ty(None, "E");
        let foo = b.method(e, "foo");
        let r = b.reference(foo, "fXoo= 1", "fXoo");
        let unit = b.build();
        let r = &unit.references[r];
        assert_eq!(r.access, Access::Write);
        assert!(!r.qualified);
        assert_eq!(r.statement.unwrap().slice(src), "fXoo= 1;");
        assert_eq!(r.assigned_value.unwrap().slice(src), "1");
    }

    #[test]
    fn parameters_keep_their_modifiers() {
        let src = "class E {\n    void foo(final int a, List<String> b) {}\n}\n";
        let mut b = UnitBuilder::new("E.java", src);
        let e = b.ty(None, "E");
        let foo = b.method(e, "foo");
        let a = b.param(foo, "a");
        let bb = b.param(foo, "b");
        let unit = b.build();
        assert!(unit.decl(a).unwrap().has_modifier(Modifier::Final));
        let b_info = unit.decl(bb).unwrap().variable_info().unwrap().clone();
        assert_eq!(b_info.ty.text, "List<String>");
    }
}
