//! # Resolved Program
//!
//! The output of a successful analysis. Every cross-declaration reference is a
//! stable identifier; names are kept only for display and code emission.
//!
//! A [`ResolvedProgram`] only exists for programs without error diagnostics.

use index_vec::IndexVec;
use rustc_hash::FxHashMap;
use weft_compiler_syntax::{
    BindingSlot, CustomComponent, InputKind, Literal, QueryVariant, Span, TypeModifier,
};

use crate::ids::{ComponentId, FieldId, FieldRef, ModelId, PageId, QueryId, RelationEdgeId};
use crate::relation_graph::RelationGraph;
use crate::types::{FieldType, PermissionSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub name: String,
    pub ty: FieldType,
    pub modifier: TypeModifier,
    pub is_id: bool,
    pub is_unique: bool,
    pub default: Option<Literal>,
    /// Edge of a relation field; set once relations are validated.
    pub relation: Option<RelationEdgeId>,
    pub span: Span,
}

impl ResolvedField {
    pub fn is_optional(&self) -> bool {
        self.modifier == TypeModifier::Optional
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    pub name: String,
    pub fields: IndexVec<FieldId, ResolvedField>,
    pub identifier: FieldId,
    pub span: Span,
    field_names: FxHashMap<String, FieldId>,
}

impl ResolvedModel {
    pub fn new(
        name: String,
        fields: IndexVec<FieldId, ResolvedField>,
        identifier: FieldId,
        span: Span,
    ) -> Self {
        let field_names = fields
            .iter_enumerated()
            .map(|(id, field)| (field.name.clone(), id))
            .collect();
        Self {
            name,
            fields,
            identifier,
            span,
            field_names,
        }
    }

    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.field_names.get(name).copied()
    }

    pub fn field(&self, id: FieldId) -> &ResolvedField {
        &self.fields[id]
    }
}

/// `relation: connect(foreignKey)` after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedConnect {
    /// Relation field on the query's model.
    pub relation: FieldId,
    pub edge: RelationEdgeId,
    pub foreign_key: FieldId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuery {
    pub name: String,
    pub variant: QueryVariant,
    pub model: ModelId,
    pub search: Vec<FieldId>,
    pub where_field: Option<FieldId>,
    pub data: Vec<FieldId>,
    pub connects: Vec<ResolvedConnect>,
    pub permissions: PermissionSet,
    /// Relation hops from the query's model to the user model, present when the
    /// query requires `OwnsRecord`.
    pub ownership_path: Option<Vec<RelationEdgeId>>,
    pub span: Span,
}

/// Default value of a form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedDefault {
    Literal(Literal),
    /// Connect the relation to the logged-in user: `connect` is the field on the
    /// relation's target model, `user_field` the field on the user model.
    LoggedInUser {
        connect: FieldRef,
        user_field: FieldRef,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInput {
    /// Field of the bound query's model.
    pub field: FieldRef,
    pub kind: InputKind,
    pub default: Option<ResolvedDefault>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedComponentBody {
    Bound {
        slot: BindingSlot,
        query: QueryId,
        inputs: Vec<ResolvedInput>,
    },
    /// Passed through untouched.
    Custom(CustomComponent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedComponent {
    pub name: String,
    pub variant: weft_compiler_syntax::ComponentVariant,
    pub body: ResolvedComponentBody,
    /// Permissions of the bound query, surfaced but not enforced.
    pub permissions: PermissionSet,
    pub span: Span,
}

/// Render tree node with component references resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedNode {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<ResolvedNode>,
    },
    Text(String),
    Component {
        component: ComponentId,
        props: Vec<(String, String)>,
    },
    ForEach {
        item: String,
        source: String,
        body: Vec<ResolvedNode>,
    },
    If {
        condition: String,
        then_branch: Vec<ResolvedNode>,
        else_branch: Vec<ResolvedNode>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPage {
    pub name: String,
    pub route: String,
    /// Tags declared on the page itself.
    pub permissions: PermissionSet,
    /// Own tags plus the tags surfaced by referenced components.
    pub effective_permissions: PermissionSet,
    pub render: Vec<ResolvedNode>,
    /// Referenced components in order of first appearance.
    pub components: Vec<ComponentId>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAuth {
    pub user_model: ModelId,
    pub id_field: FieldId,
    pub username_field: FieldId,
    pub password_field: FieldId,
    pub is_online_field: Option<FieldId>,
    pub last_active_field: Option<FieldId>,
    pub on_success_redirect: Option<PageId>,
    pub on_failure_redirect: Option<PageId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedApp {
    pub name: String,
    pub title: String,
    pub dependencies: Vec<(String, String)>,
    pub auth: Option<ResolvedAuth>,
}

/// A fully validated program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProgram {
    pub app: ResolvedApp,
    pub models: IndexVec<ModelId, ResolvedModel>,
    pub relations: RelationGraph,
    pub queries: IndexVec<QueryId, ResolvedQuery>,
    pub components: IndexVec<ComponentId, ResolvedComponent>,
    pub pages: IndexVec<PageId, ResolvedPage>,
}

impl ResolvedProgram {
    pub fn model_id(&self, name: &str) -> Option<ModelId> {
        self.models.iter_enumerated().find_map(|(id, m)| (m.name == name).then_some(id))
    }

    pub fn query_id(&self, name: &str) -> Option<QueryId> {
        self.queries.iter_enumerated().find_map(|(id, q)| (q.name == name).then_some(id))
    }

    pub fn component_id(&self, name: &str) -> Option<ComponentId> {
        self.components
            .iter_enumerated()
            .find_map(|(id, c)| (c.name == name).then_some(id))
    }

    pub fn page_id(&self, name: &str) -> Option<PageId> {
        self.pages.iter_enumerated().find_map(|(id, p)| (p.name == name).then_some(id))
    }

    pub fn field(&self, field: FieldRef) -> &ResolvedField {
        self.models[field.model].field(field.field)
    }
}
