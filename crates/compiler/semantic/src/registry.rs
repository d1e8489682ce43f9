//! # Declaration Registry
//!
//! Pass 1 of the analysis: every top-level declaration is registered by
//! (kind, name) before any body is looked at, so later passes can resolve forward
//! references without caring about declaration order.
//!
//! Duplicate names are fatal. Building the registry either yields a complete,
//! unambiguous registry or the list of duplicate declaration diagnostics.

use index_vec::IndexVec;
use rustc_hash::FxHashMap;
use weft_compiler_diagnostics::Diagnostic;
use weft_compiler_syntax::{
    AppDecl, ComponentDecl, Declaration, DeclarationKind, ModelDecl, PageDecl, Program,
    QueryDecl, Span, Spanned,
};

use crate::ids::{ComponentId, ModelId, PageId, QueryId};

/// Identifier of any registered declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationId {
    App,
    Model(ModelId),
    Query(QueryId),
    Component(ComponentId),
    Page(PageId),
}

/// Read-only index of a program's declarations.
///
/// Holds references into the program tree; the tree outlives every phase.
#[derive(Debug)]
pub struct DeclarationRegistry<'ast> {
    app: Option<&'ast Spanned<AppDecl>>,
    models: IndexVec<ModelId, &'ast Spanned<ModelDecl>>,
    queries: IndexVec<QueryId, &'ast Spanned<QueryDecl>>,
    components: IndexVec<ComponentId, &'ast Spanned<ComponentDecl>>,
    pages: IndexVec<PageId, &'ast Spanned<PageDecl>>,
    model_names: FxHashMap<&'ast str, ModelId>,
    query_names: FxHashMap<&'ast str, QueryId>,
    component_names: FxHashMap<&'ast str, ComponentId>,
    page_names: FxHashMap<&'ast str, PageId>,
}

impl<'ast> DeclarationRegistry<'ast> {
    /// Register every declaration of `program`.
    ///
    /// Returns every duplicate found, not only the first one.
    pub fn build(program: &'ast Program) -> Result<Self, Vec<Diagnostic>> {
        let _span = tracing::debug_span!("declaration_registry").entered();

        let mut registry = Self {
            app: None,
            models: IndexVec::new(),
            queries: IndexVec::new(),
            components: IndexVec::new(),
            pages: IndexVec::new(),
            model_names: FxHashMap::default(),
            query_names: FxHashMap::default(),
            component_names: FxHashMap::default(),
            page_names: FxHashMap::default(),
        };
        let mut duplicates = Vec::new();

        for declaration in &program.declarations {
            let name = declaration.name();
            let previous = match declaration {
                Declaration::App(app) => match registry.app {
                    Some(first) => Some(first.value().name.span()),
                    None => {
                        registry.app = Some(app);
                        None
                    }
                },
                Declaration::Model(model) => register(
                    &mut registry.models,
                    &mut registry.model_names,
                    model,
                    |decl| &decl.name,
                ),
                Declaration::Query(query) => register(
                    &mut registry.queries,
                    &mut registry.query_names,
                    query,
                    |decl| &decl.name,
                ),
                Declaration::Component(component) => register(
                    &mut registry.components,
                    &mut registry.component_names,
                    component,
                    |decl| &decl.name,
                ),
                Declaration::Page(page) => register(
                    &mut registry.pages,
                    &mut registry.page_names,
                    page,
                    |decl| &decl.name,
                ),
            };

            if let Some(first) = previous {
                duplicates.push(Diagnostic::duplicate_declaration(
                    &declaration.kind().to_string(),
                    name.value(),
                    name.span(),
                    first,
                ));
            }
        }

        if !duplicates.is_empty() {
            tracing::debug!(count = duplicates.len(), "duplicate declarations");
            return Err(duplicates);
        }

        tracing::debug!(
            models = registry.models.len(),
            queries = registry.queries.len(),
            components = registry.components.len(),
            pages = registry.pages.len(),
            "registry built"
        );
        Ok(registry)
    }

    pub const fn app(&self) -> Option<&'ast Spanned<AppDecl>> {
        self.app
    }

    pub fn lookup(&self, kind: DeclarationKind, name: &str) -> Option<DeclarationId> {
        match kind {
            DeclarationKind::App => self
                .app
                .filter(|app| app.value().name.value() == name)
                .map(|_| DeclarationId::App),
            DeclarationKind::Model => self.model_id(name).map(DeclarationId::Model),
            DeclarationKind::Query => self.query_id(name).map(DeclarationId::Query),
            DeclarationKind::Component => self.component_id(name).map(DeclarationId::Component),
            DeclarationKind::Page => self.page_names.get(name).copied().map(DeclarationId::Page),
        }
    }

    pub fn model_id(&self, name: &str) -> Option<ModelId> {
        self.model_names.get(name).copied()
    }

    pub fn query_id(&self, name: &str) -> Option<QueryId> {
        self.query_names.get(name).copied()
    }

    pub fn component_id(&self, name: &str) -> Option<ComponentId> {
        self.component_names.get(name).copied()
    }

    pub fn model(&self, id: ModelId) -> &'ast Spanned<ModelDecl> {
        self.models[id]
    }

    pub fn query(&self, id: QueryId) -> &'ast Spanned<QueryDecl> {
        self.queries[id]
    }

    pub fn component(&self, id: ComponentId) -> &'ast Spanned<ComponentDecl> {
        self.components[id]
    }

    pub fn page(&self, id: PageId) -> &'ast Spanned<PageDecl> {
        self.pages[id]
    }

    /// Models in declaration order.
    pub fn models(&self) -> Vec<(ModelId, &'ast Spanned<ModelDecl>)> {
        self.models.iter_enumerated().map(|(id, decl)| (id, *decl)).collect()
    }

    pub fn queries(&self) -> Vec<(QueryId, &'ast Spanned<QueryDecl>)> {
        self.queries.iter_enumerated().map(|(id, decl)| (id, *decl)).collect()
    }

    pub fn components(&self) -> Vec<(ComponentId, &'ast Spanned<ComponentDecl>)> {
        self.components
            .iter_enumerated()
            .map(|(id, decl)| (id, *decl))
            .collect()
    }

    pub fn pages(&self) -> Vec<(PageId, &'ast Spanned<PageDecl>)> {
        self.pages.iter_enumerated().map(|(id, decl)| (id, *decl)).collect()
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }
}

/// Register one declaration in its arena. Returns the span of the first
/// declaration with the same name when this one is a duplicate.
fn register<'ast, I: index_vec::Idx, T>(
    arena: &mut IndexVec<I, &'ast Spanned<T>>,
    names: &mut FxHashMap<&'ast str, I>,
    decl: &'ast Spanned<T>,
    name_of: impl Fn(&'ast T) -> &'ast Spanned<String>,
) -> Option<Span> {
    let name = name_of(decl.value());
    if let Some(&first) = names.get(name.value().as_str()) {
        return Some(name_of(arena[first].value()).span());
    }
    let id = arena.push(decl);
    names.insert(name.value().as_str(), id);
    None
}
