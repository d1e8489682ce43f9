//! # Weft Tier Specifications
//!
//! The intermediate representation handed to code generators: three immutable
//! specs, one per target tier, produced from a fully validated program.
//!
//! ## Architecture
//!
//! ```text
//! TierSpecs
//! data_model: DataModelSpec   models, fields, relations
//! api:        ApiSpec         auth, one endpoint per query
//! ui:         UiSpec          components, pages
//! ```
//!
//! Every cross-reference is a stable handle from semantic analysis (`ModelId`,
//! `FieldRef`, `QueryId`, ...). Names are carried alongside for emission only.
//!
//! ## Guarantees
//!
//! - Generation is a pure, total fold over a [`ResolvedProgram`]; it never fails.
//! - Every handle resolves inside the specs ([`TierSpecs::validate`]).
//! - Serialization is deterministic: the same program yields byte-identical JSON.

#![allow(clippy::option_if_let_else)]

pub mod api;
pub mod data_model;
pub mod generate;
pub mod ui;
pub mod validate;

use index_vec::{Idx, IndexVec};
use serde::{Serialize, Serializer};

pub use api::{
    ApiSpec, AuthSpec, ConnectSpec, EndpointSpec, HttpMethod, OwnershipHop,
};
pub use data_model::{DataModelSpec, FieldKind, FieldSpec, ModelSpec, RelationSpec};
pub use generate::generate_specs;
pub use ui::{
    ComponentBodySpec, ComponentSpec, DefaultSpec, DependencySpec, InputSpec, NodeSpec,
    PageSpec, UiSpec,
};

pub use weft_compiler_semantic::{operation_path, ResolvedProgram};

/// The three tier specs of one program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierSpecs {
    pub data_model: DataModelSpec,
    pub api: ApiSpec,
    pub ui: UiSpec,
}

impl TierSpecs {
    /// Serialize all three specs as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl PrettyPrint for TierSpecs {
    fn pretty_print(&self, indent: usize) -> String {
        let mut result = String::new();
        result.push_str(&self.data_model.pretty_print(indent));
        result.push_str(&self.api.pretty_print(indent));
        result.push_str(&self.ui.pretty_print(indent));
        result
    }
}

// --- Pretty Printing Support ---

/// Trait for pretty-printing spec constructs
pub trait PrettyPrint {
    fn pretty_print(&self, indent: usize) -> String;
}

/// Helper function to create indentation
pub(crate) fn indent_str(level: usize) -> String {
    "  ".repeat(level)
}

/// Arenas serialize as plain arrays; the position is the handle.
pub(crate) fn serialize_arena<I, T, S>(arena: &IndexVec<I, T>, serializer: S) -> Result<S::Ok, S::Error>
where
    I: Idx,
    T: Serialize,
    S: Serializer,
{
    arena.raw.serialize(serializer)
}
