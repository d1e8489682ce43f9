//! # Program Tree
//!
//! Every declaration and every name inside it carries a source span. Spans are
//! opaque to the compiler core: they are copied into diagnostics and never
//! interpreted.

use std::fmt;

use chumsky::span::SimpleSpan;
use serde::Serialize;

/// Source location attached to tree nodes.
pub type Span = SimpleSpan<usize>;

/// A value paired with its source span.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Spanned<T>(T, SimpleSpan<usize>);

impl<T> Spanned<T> {
    /// Create a new spanned value
    pub const fn new(value: T, span: SimpleSpan<usize>) -> Self {
        Self(value, span)
    }

    /// Get the inner value
    pub const fn value(&self) -> &T {
        &self.0
    }

    /// Get the span
    pub const fn span(&self) -> SimpleSpan<usize> {
        self.1
    }

    /// Destructure into value and span
    pub fn into_parts(self) -> (T, SimpleSpan<usize>) {
        (self.0, self.1)
    }
}

impl Spanned<String> {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Root of the tree: one program unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Program {
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Declaration {
    App(Spanned<AppDecl>),
    Model(Spanned<ModelDecl>),
    Query(Spanned<QueryDecl>),
    Component(Spanned<ComponentDecl>),
    Page(Spanned<PageDecl>),
}

impl Declaration {
    pub const fn kind(&self) -> DeclarationKind {
        match self {
            Self::App(_) => DeclarationKind::App,
            Self::Model(_) => DeclarationKind::Model,
            Self::Query(_) => DeclarationKind::Query,
            Self::Component(_) => DeclarationKind::Component,
            Self::Page(_) => DeclarationKind::Page,
        }
    }

    /// The declared name.
    pub const fn name(&self) -> &Spanned<String> {
        match self {
            Self::App(app) => &app.value().name,
            Self::Model(model) => &model.value().name,
            Self::Query(query) => &query.value().name,
            Self::Component(component) => &component.value().name,
            Self::Page(page) => &page.value().name,
        }
    }

    /// Span of the whole declaration.
    pub const fn span(&self) -> Span {
        match self {
            Self::App(app) => app.span(),
            Self::Model(model) => model.span(),
            Self::Query(query) => query.span(),
            Self::Component(component) => component.span(),
            Self::Page(page) => page.span(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeclarationKind {
    App,
    Model,
    Query,
    Component,
    Page,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::App => write!(f, "app"),
            Self::Model => write!(f, "model"),
            Self::Query => write!(f, "query"),
            Self::Component => write!(f, "component"),
            Self::Page => write!(f, "page"),
        }
    }
}

// ===== App =====

/// `app` declaration: application-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppDecl {
    pub name: Spanned<String>,
    pub title: Spanned<String>,
    pub auth: Option<Spanned<AuthDecl>>,
    /// Client-side package dependencies.
    pub dependencies: Vec<Spanned<Dependency>>,
}

/// Authentication configuration inside `app`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthDecl {
    /// Model holding the users.
    pub user_model: Spanned<String>,
    pub id_field: Spanned<String>,
    pub username_field: Spanned<String>,
    pub password_field: Spanned<String>,
    /// Presence tracking field (`Boolean`).
    pub is_online_field: Option<Spanned<String>>,
    /// Last-activity tracking field (`DateTime`).
    pub last_active_field: Option<Spanned<String>>,
    pub on_auth_succeeded_redirect_to: Option<Spanned<String>>,
    pub on_auth_failed_redirect_to: Option<Spanned<String>>,
}

/// A `(package, version)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub package: Spanned<String>,
    pub version: Spanned<String>,
}

// ===== Models =====

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelDecl {
    pub name: Spanned<String>,
    pub fields: Vec<Spanned<FieldDecl>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDecl {
    pub name: Spanned<String>,
    pub ty: Spanned<TypeExpr>,
    pub attributes: Vec<Spanned<FieldAttribute>>,
}

impl FieldDecl {
    pub fn has_attribute(&self, predicate: impl Fn(&FieldAttribute) -> bool) -> bool {
        self.attributes.iter().any(|attr| predicate(attr.value()))
    }

    /// The `@relation(fields, references)` attribute, if present.
    pub fn relation_attribute(&self) -> Option<(&Spanned<String>, &Spanned<String>)> {
        self.attributes.iter().find_map(|attr| match attr.value() {
            FieldAttribute::Relation { fields, references } => Some((fields, references)),
            _ => None,
        })
    }
}

/// A field type as written: a type name plus a modifier.
///
/// Whether the name denotes a scalar or a model is decided during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeExpr {
    pub name: String,
    pub modifier: TypeModifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeModifier {
    Required,
    /// `T?`
    Optional,
    /// `T[]`
    List,
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modifier {
            TypeModifier::Required => write!(f, "{}", self.name),
            TypeModifier::Optional => write!(f, "{}?", self.name),
            TypeModifier::List => write!(f, "{}[]", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldAttribute {
    /// `@id`
    Id,
    /// `@unique`
    Unique,
    /// `@default(value)`
    Default(Literal),
    /// `@relation(fields, references)`: `fields` names the local foreign key,
    /// `references` the field it points at on the related model.
    Relation {
        fields: Spanned<String>,
        references: Spanned<String>,
    },
}

/// Literal values used by defaults.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Literal {
    Int(i64),
    /// Decimal literal kept as written.
    Decimal(String),
    String(String),
    Bool(bool),
    /// Generator call such as `now()` or `autoincrement()`, without parentheses.
    Call(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value:?}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Call(name) => write!(f, "{name}()"),
        }
    }
}

// ===== Queries =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QueryVariant {
    FindUnique,
    FindMany,
    Create,
    Update,
    Delete,
}

impl QueryVariant {
    pub const fn is_find(self) -> bool {
        matches!(self, Self::FindUnique | Self::FindMany)
    }
}

impl fmt::Display for QueryVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FindUnique => write!(f, "FindUnique"),
            Self::FindMany => write!(f, "FindMany"),
            Self::Create => write!(f, "Create"),
            Self::Update => write!(f, "Update"),
            Self::Delete => write!(f, "Delete"),
        }
    }
}

/// `query<Variant> name { ... }`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryDecl {
    pub name: Spanned<String>,
    pub variant: Spanned<QueryVariant>,
    /// Target model name.
    pub model: Spanned<String>,
    /// Permission tags as written; checked against the known vocabulary.
    pub permissions: Vec<Spanned<String>>,
    pub search: Option<Spanned<Vec<Spanned<String>>>>,
    pub where_field: Option<Spanned<String>>,
    pub data: Option<Spanned<DataBlock>>,
}

/// `data: { fields: [...], relationFields: { ... } }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DataBlock {
    pub fields: Vec<Spanned<String>>,
    pub relation_fields: Vec<Spanned<ConnectDirective>>,
}

/// `relation: connect(foreignKey)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectDirective {
    pub relation: Spanned<String>,
    pub foreign_key: Spanned<String>,
}

// ===== Components =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ComponentVariant {
    Create,
    Update,
    FindMany,
    FindUnique,
    Custom,
}

impl ComponentVariant {
    /// The query variant a component of this variant must bind.
    pub const fn query_variant(self) -> Option<QueryVariant> {
        match self {
            Self::Create => Some(QueryVariant::Create),
            Self::Update => Some(QueryVariant::Update),
            Self::FindMany => Some(QueryVariant::FindMany),
            Self::FindUnique => Some(QueryVariant::FindUnique),
            Self::Custom => None,
        }
    }

    /// The binding slot a component of this variant uses.
    pub const fn binding_slot(self) -> Option<BindingSlot> {
        match self {
            Self::Create | Self::Update => Some(BindingSlot::ActionQuery),
            Self::FindMany | Self::FindUnique => Some(BindingSlot::FindQuery),
            Self::Custom => None,
        }
    }
}

impl fmt::Display for ComponentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "Create"),
            Self::Update => write!(f, "Update"),
            Self::FindMany => write!(f, "FindMany"),
            Self::FindUnique => write!(f, "FindUnique"),
            Self::Custom => write!(f, "Custom"),
        }
    }
}

/// `component<Variant> name { ... }`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentDecl {
    pub name: Spanned<String>,
    pub variant: Spanned<ComponentVariant>,
    pub body: ComponentBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentBody {
    Bound(BoundComponent),
    Custom(CustomComponent),
}

/// Body of a component driven by a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BoundComponent {
    pub binding: Option<Spanned<QueryBinding>>,
    pub form_inputs: Vec<Spanned<FormInput>>,
}

/// Which property the query is bound through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BindingSlot {
    /// `actionQuery: name()`
    ActionQuery,
    /// `findQuery: name()`
    FindQuery,
}

impl fmt::Display for BindingSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActionQuery => write!(f, "actionQuery"),
            Self::FindQuery => write!(f, "findQuery"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryBinding {
    pub slot: BindingSlot,
    pub query: Spanned<String>,
}

/// One entry of `formInputs`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FormInput {
    pub field: Spanned<String>,
    pub kind: Spanned<InputKind>,
    pub default: Option<Spanned<DefaultBinding>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InputKind {
    TextInput,
    TextArea,
    NumberInput,
    Checkbox,
    DateInput,
    RelationInput,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextInput => write!(f, "TextInput"),
            Self::TextArea => write!(f, "TextArea"),
            Self::NumberInput => write!(f, "NumberInput"),
            Self::Checkbox => write!(f, "Checkbox"),
            Self::DateInput => write!(f, "DateInput"),
            Self::RelationInput => write!(f, "RelationInput"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefaultBinding {
    Literal(Literal),
    /// `connect <connect> with LoggedInUser.<user_field>`
    LoggedInUser {
        connect: Spanned<String>,
        user_field: Spanned<String>,
    },
}

/// Body of a hand-written component. Code blocks are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CustomComponent {
    pub imports: Vec<Spanned<Import>>,
    pub dependencies: Vec<Spanned<Dependency>>,
    pub code: Vec<CodeBlock>,
}

/// `import <what> from "<from>"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Import {
    pub what: String,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CodeBlock {
    pub language: String,
    pub source: String,
}

// ===== Pages =====

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageDecl {
    pub name: Spanned<String>,
    pub route: Spanned<String>,
    pub permissions: Vec<Spanned<String>>,
    pub render: Vec<Spanned<RenderNode>>,
}

/// A node of a page's render tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RenderNode {
    /// Inline markup element.
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<Spanned<RenderNode>>,
    },
    Text(String),
    /// Reference to a declared component.
    Component {
        name: Spanned<String>,
        props: Vec<(String, String)>,
    },
    /// Iteration over a collection expression (opaque).
    ForEach {
        item: String,
        source: String,
        body: Vec<Spanned<RenderNode>>,
    },
    /// Conditional rendering on an opaque expression.
    If {
        condition: String,
        then_branch: Vec<Spanned<RenderNode>>,
        else_branch: Vec<Spanned<RenderNode>>,
    },
}
