//! Constructors for program trees.
//!
//! All nodes built here carry an empty span at offset 0 unless placed with
//! [`Declaration::at`]. Field types are written the way they appear in source:
//! `"String"`, `"String?"`, `"Task[]"`.
//!
//! ```
//! use weft_compiler_syntax::build::*;
//! use weft_compiler_syntax::QueryVariant;
//!
//! let program = program(vec![
//!     app("todo", "ToDo").into(),
//!     model("Task", [field("id", "Int").id(), field("title", "String")]).into(),
//!     query("getTasks", QueryVariant::FindMany, "Task").into(),
//! ]);
//! assert_eq!(program.declarations.len(), 3);
//! ```

use std::ops::Range;

use chumsky::span::SimpleSpan;

use crate::ast::*;

/// Wrap a value with an empty span.
pub fn spanned<T>(value: T) -> Spanned<T> {
    Spanned::new(value, SimpleSpan::from(0..0))
}

fn name(value: &str) -> Spanned<String> {
    spanned(value.to_string())
}

pub fn program(declarations: Vec<Declaration>) -> Program {
    Program { declarations }
}

impl Declaration {
    /// Place the declaration at `range`. Its name gets the same span.
    pub fn at(self, range: Range<usize>) -> Self {
        let span = SimpleSpan::from(range);
        fn relocate<T>(decl: Spanned<T>, span: Span, name: impl FnOnce(&mut T)) -> Spanned<T> {
            let (mut value, _) = decl.into_parts();
            name(&mut value);
            Spanned::new(value, span)
        }
        let rename = |n: &mut Spanned<String>| *n = Spanned::new(n.value().clone(), span);
        match self {
            Self::App(d) => Self::App(relocate(d, span, |v| rename(&mut v.name))),
            Self::Model(d) => Self::Model(relocate(d, span, |v| rename(&mut v.name))),
            Self::Query(d) => Self::Query(relocate(d, span, |v| rename(&mut v.name))),
            Self::Component(d) => Self::Component(relocate(d, span, |v| rename(&mut v.name))),
            Self::Page(d) => Self::Page(relocate(d, span, |v| rename(&mut v.name))),
        }
    }
}

// ===== App =====

pub fn app(app_name: &str, title: &str) -> AppDecl {
    AppDecl {
        name: name(app_name),
        title: name(title),
        auth: None,
        dependencies: Vec::new(),
    }
}

impl AppDecl {
    pub fn with_auth(mut self, auth: AuthDecl) -> Self {
        self.auth = Some(spanned(auth));
        self
    }

    pub fn with_dependency(mut self, package: &str, version: &str) -> Self {
        self.dependencies.push(spanned(dependency(package, version)));
        self
    }
}

impl From<AppDecl> for Declaration {
    fn from(decl: AppDecl) -> Self {
        Self::App(spanned(decl))
    }
}

pub fn dependency(package: &str, version: &str) -> Dependency {
    Dependency {
        package: name(package),
        version: name(version),
    }
}

/// Auth on `user_model` using the conventional `id`, `username` and `password` fields.
pub fn auth(user_model: &str) -> AuthDecl {
    AuthDecl {
        user_model: name(user_model),
        id_field: name("id"),
        username_field: name("username"),
        password_field: name("password"),
        is_online_field: None,
        last_active_field: None,
        on_auth_succeeded_redirect_to: None,
        on_auth_failed_redirect_to: None,
    }
}

impl AuthDecl {
    pub fn with_fields(mut self, id: &str, username: &str, password: &str) -> Self {
        self.id_field = name(id);
        self.username_field = name(username);
        self.password_field = name(password);
        self
    }

    pub fn with_is_online(mut self, field: &str) -> Self {
        self.is_online_field = Some(name(field));
        self
    }

    pub fn with_last_active(mut self, field: &str) -> Self {
        self.last_active_field = Some(name(field));
        self
    }

    pub fn on_success_redirect_to(mut self, route: &str) -> Self {
        self.on_auth_succeeded_redirect_to = Some(name(route));
        self
    }

    pub fn on_failure_redirect_to(mut self, route: &str) -> Self {
        self.on_auth_failed_redirect_to = Some(name(route));
        self
    }
}

// ===== Models =====

pub fn model(model_name: &str, fields: impl IntoIterator<Item = FieldDecl>) -> ModelDecl {
    ModelDecl {
        name: name(model_name),
        fields: fields.into_iter().map(spanned).collect(),
    }
}

impl From<ModelDecl> for Declaration {
    fn from(decl: ModelDecl) -> Self {
        Self::Model(spanned(decl))
    }
}

/// Parse a written field type such as `String?` or `Task[]`.
pub fn type_expr(written: &str) -> TypeExpr {
    let written = written.trim();
    if let Some(inner) = written.strip_suffix("[]") {
        TypeExpr {
            name: inner.to_string(),
            modifier: TypeModifier::List,
        }
    } else if let Some(inner) = written.strip_suffix('?') {
        TypeExpr {
            name: inner.to_string(),
            modifier: TypeModifier::Optional,
        }
    } else {
        TypeExpr {
            name: written.to_string(),
            modifier: TypeModifier::Required,
        }
    }
}

pub fn field(field_name: &str, ty: &str) -> FieldDecl {
    FieldDecl {
        name: name(field_name),
        ty: spanned(type_expr(ty)),
        attributes: Vec::new(),
    }
}

impl FieldDecl {
    pub fn id(mut self) -> Self {
        self.attributes.push(spanned(FieldAttribute::Id));
        self
    }

    pub fn unique(mut self) -> Self {
        self.attributes.push(spanned(FieldAttribute::Unique));
        self
    }

    pub fn with_default(mut self, value: Literal) -> Self {
        self.attributes.push(spanned(FieldAttribute::Default(value)));
        self
    }

    /// `@relation(foreign_key, references)`
    pub fn relation(mut self, foreign_key: &str, references: &str) -> Self {
        self.attributes.push(spanned(FieldAttribute::Relation {
            fields: name(foreign_key),
            references: name(references),
        }));
        self
    }
}

// ===== Queries =====

pub fn query(query_name: &str, variant: QueryVariant, target: &str) -> QueryDecl {
    QueryDecl {
        name: name(query_name),
        variant: spanned(variant),
        model: name(target),
        permissions: Vec::new(),
        search: None,
        where_field: None,
        data: None,
    }
}

impl QueryDecl {
    pub fn with_permission(mut self, tag: &str) -> Self {
        self.permissions.push(name(tag));
        self
    }

    pub fn with_search<'a>(mut self, fields: impl IntoIterator<Item = &'a str>) -> Self {
        self.search = Some(spanned(fields.into_iter().map(name).collect()));
        self
    }

    pub fn with_where(mut self, field: &str) -> Self {
        self.where_field = Some(name(field));
        self
    }

    pub fn with_data<'a>(mut self, fields: impl IntoIterator<Item = &'a str>) -> Self {
        let block = self.data.get_or_insert_with(|| spanned(DataBlock::default()));
        let (mut value, span) = block.clone().into_parts();
        value.fields.extend(fields.into_iter().map(name));
        *block = Spanned::new(value, span);
        self
    }

    /// `relationFields: { relation: connect(foreign_key) }`
    pub fn with_connect(mut self, relation: &str, foreign_key: &str) -> Self {
        let block = self.data.get_or_insert_with(|| spanned(DataBlock::default()));
        let (mut value, span) = block.clone().into_parts();
        value.relation_fields.push(spanned(ConnectDirective {
            relation: name(relation),
            foreign_key: name(foreign_key),
        }));
        *block = Spanned::new(value, span);
        self
    }
}

impl From<QueryDecl> for Declaration {
    fn from(decl: QueryDecl) -> Self {
        Self::Query(spanned(decl))
    }
}

// ===== Components =====

/// A component of `variant`; custom components get an empty custom body.
pub fn component(component_name: &str, variant: ComponentVariant) -> ComponentDecl {
    let body = match variant {
        ComponentVariant::Custom => ComponentBody::Custom(CustomComponent::default()),
        _ => ComponentBody::Bound(BoundComponent::default()),
    };
    ComponentDecl {
        name: name(component_name),
        variant: spanned(variant),
        body,
    }
}

impl ComponentDecl {
    fn bound_mut(&mut self) -> &mut BoundComponent {
        if !matches!(self.body, ComponentBody::Bound(_)) {
            self.body = ComponentBody::Bound(BoundComponent::default());
        }
        match &mut self.body {
            ComponentBody::Bound(bound) => bound,
            ComponentBody::Custom(_) => unreachable!("body was just replaced"),
        }
    }

    fn custom_mut(&mut self) -> &mut CustomComponent {
        if !matches!(self.body, ComponentBody::Custom(_)) {
            self.body = ComponentBody::Custom(CustomComponent::default());
        }
        match &mut self.body {
            ComponentBody::Custom(custom) => custom,
            ComponentBody::Bound(_) => unreachable!("body was just replaced"),
        }
    }

    pub fn action_query(mut self, query: &str) -> Self {
        self.bound_mut().binding = Some(spanned(QueryBinding {
            slot: BindingSlot::ActionQuery,
            query: name(query),
        }));
        self
    }

    pub fn find_query(mut self, query: &str) -> Self {
        self.bound_mut().binding = Some(spanned(QueryBinding {
            slot: BindingSlot::FindQuery,
            query: name(query),
        }));
        self
    }

    pub fn with_input(mut self, input: FormInput) -> Self {
        self.bound_mut().form_inputs.push(spanned(input));
        self
    }

    pub fn with_import(mut self, what: &str, from: &str) -> Self {
        self.custom_mut().imports.push(spanned(Import {
            what: what.to_string(),
            from: from.to_string(),
        }));
        self
    }

    pub fn with_dependency(mut self, package: &str, version: &str) -> Self {
        self.custom_mut()
            .dependencies
            .push(spanned(dependency(package, version)));
        self
    }

    pub fn with_code(mut self, language: &str, source: &str) -> Self {
        self.custom_mut().code.push(CodeBlock {
            language: language.to_string(),
            source: source.to_string(),
        });
        self
    }
}

impl From<ComponentDecl> for Declaration {
    fn from(decl: ComponentDecl) -> Self {
        Self::Component(spanned(decl))
    }
}

pub fn form_input(field_name: &str, kind: InputKind) -> FormInput {
    FormInput {
        field: name(field_name),
        kind: spanned(kind),
        default: None,
    }
}

impl FormInput {
    pub fn with_default(mut self, value: Literal) -> Self {
        self.default = Some(spanned(DefaultBinding::Literal(value)));
        self
    }

    /// `connect <connect> with LoggedInUser.<user_field>`
    pub fn connect_logged_in_user(mut self, connect: &str, user_field: &str) -> Self {
        self.default = Some(spanned(DefaultBinding::LoggedInUser {
            connect: name(connect),
            user_field: name(user_field),
        }));
        self
    }
}

// ===== Pages =====

pub fn page(page_name: &str, route: &str) -> PageDecl {
    PageDecl {
        name: name(page_name),
        route: name(route),
        permissions: Vec::new(),
        render: Vec::new(),
    }
}

impl PageDecl {
    pub fn with_permission(mut self, tag: &str) -> Self {
        self.permissions.push(name(tag));
        self
    }

    pub fn with_node(mut self, node: RenderNode) -> Self {
        self.render.push(spanned(node));
        self
    }
}

impl From<PageDecl> for Declaration {
    fn from(decl: PageDecl) -> Self {
        Self::Page(spanned(decl))
    }
}

pub fn element(tag: &str, children: impl IntoIterator<Item = RenderNode>) -> RenderNode {
    RenderNode::Element {
        tag: tag.to_string(),
        attributes: Vec::new(),
        children: children.into_iter().map(spanned).collect(),
    }
}

pub fn text(value: &str) -> RenderNode {
    RenderNode::Text(value.to_string())
}

pub fn use_component(component_name: &str) -> RenderNode {
    RenderNode::Component {
        name: name(component_name),
        props: Vec::new(),
    }
}

pub fn for_each(item: &str, source: &str, body: impl IntoIterator<Item = RenderNode>) -> RenderNode {
    RenderNode::ForEach {
        item: item.to_string(),
        source: source.to_string(),
        body: body.into_iter().map(spanned).collect(),
    }
}

pub fn if_then(
    condition: &str,
    then_branch: impl IntoIterator<Item = RenderNode>,
    else_branch: impl IntoIterator<Item = RenderNode>,
) -> RenderNode {
    RenderNode::If {
        condition: condition.to_string(),
        then_branch: then_branch.into_iter().map(spanned).collect(),
        else_branch: else_branch.into_iter().map(spanned).collect(),
    }
}
