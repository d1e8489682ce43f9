//! # Resolvers
//!
//! One module per tier. Every resolver takes a single declaration plus the frozen
//! state of the tiers before it and returns its result together with a local list
//! of diagnostics, so a tier can be validated in parallel and merged in
//! declaration order afterwards.
//!
//! Tier order: models, queries, components, pages, app.

pub(crate) mod app;
pub(crate) mod components;
pub(crate) mod models;
pub(crate) mod pages;
pub(crate) mod queries;
pub(crate) mod shared;

use index_vec::IndexVec;

use crate::ids::ModelId;
use crate::registry::DeclarationRegistry;
use crate::relation_graph::RelationGraph;

pub use models::{FieldLookup, ModelOutline};

/// What the app declares about authentication, looked up before any tier runs.
///
/// The auth block itself is validated last, with the app.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub declared: bool,
    /// The user model, if it is declared.
    pub user_model: Option<ModelId>,
}

impl AuthContext {
    pub fn from_registry(registry: &DeclarationRegistry<'_>) -> Self {
        let auth = registry.app().and_then(|app| app.value().auth.as_ref());
        Self {
            declared: auth.is_some(),
            user_model: auth.and_then(|auth| registry.model_id(auth.value().user_model.value())),
        }
    }
}

/// Read-only state handed to the query, component, page and app resolvers.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a, 'ast> {
    pub registry: &'a DeclarationRegistry<'ast>,
    pub models: &'a IndexVec<ModelId, ModelOutline>,
    pub graph: &'a RelationGraph,
    pub auth: AuthContext,
}
