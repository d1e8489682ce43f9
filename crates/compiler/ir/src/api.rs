//! # API Spec
//!
//! One endpoint per query, plus the auth configuration the server needs to
//! enforce permissions.

use std::fmt;

use index_vec::IndexVec;
use serde::Serialize;
use weft_compiler_semantic::{FieldRef, ModelId, PageId, Permission, QueryId, RelationEdgeId};
use weft_compiler_syntax::QueryVariant;

use crate::data_model::{field_handle, model_handle};
use crate::{indent_str, serialize_arena, PrettyPrint};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSpec {
    pub app_name: String,
    pub auth: Option<AuthSpec>,
    #[serde(serialize_with = "serialize_arena")]
    pub endpoints: IndexVec<QueryId, EndpointSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSpec {
    pub user_model: ModelId,
    pub id_field: FieldRef,
    pub username_field: FieldRef,
    pub password_field: FieldRef,
    pub is_online_field: Option<FieldRef>,
    pub last_active_field: Option<FieldRef>,
    pub on_success_redirect: Option<PageId>,
    pub on_failure_redirect: Option<PageId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HttpMethod {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "POST")]
    Post,
}

impl HttpMethod {
    /// Finds are reads; everything else mutates.
    pub const fn for_variant(variant: QueryVariant) -> Self {
        if variant.is_find() {
            Self::Get
        } else {
            Self::Post
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSpec {
    pub query: QueryId,
    pub name: String,
    pub variant: QueryVariant,
    pub model: ModelId,
    pub http_method: HttpMethod,
    pub path: String,
    pub search: Vec<FieldRef>,
    pub where_field: Option<FieldRef>,
    pub data: Vec<FieldRef>,
    pub connects: Vec<ConnectSpec>,
    /// Hops from the endpoint's model to the user model; present with `OwnsRecord`.
    pub ownership: Option<Vec<OwnershipHop>>,
    pub permissions: Vec<Permission>,
}

/// `relation: connect(foreignKey)` on a create or update endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectSpec {
    pub relation: FieldRef,
    pub edge: RelationEdgeId,
    pub foreign_key: FieldRef,
}

/// One step of an ownership path: follow `foreign_key` on `source` to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipHop {
    pub edge: RelationEdgeId,
    pub source: ModelId,
    pub foreign_key: FieldRef,
    pub target: ModelId,
}

impl ApiSpec {
    pub fn endpoint_named(&self, name: &str) -> Option<&EndpointSpec> {
        self.endpoints.iter().find(|endpoint| endpoint.name == name)
    }
}

fn field_list(fields: &[FieldRef]) -> String {
    fields
        .iter()
        .map(|&field| field_handle(field))
        .collect::<Vec<_>>()
        .join(", ")
}

impl PrettyPrint for ApiSpec {
    fn pretty_print(&self, indent: usize) -> String {
        let mut result = String::new();
        let base_indent = indent_str(indent);

        result.push_str(&format!("{base_indent}api {} {{\n", self.app_name));
        if let Some(auth) = &self.auth {
            result.push_str(&auth.pretty_print(indent + 1));
        }
        for endpoint in &self.endpoints {
            result.push_str(&endpoint.pretty_print(indent + 1));
        }
        result.push_str(&format!("{base_indent}}}\n"));
        result
    }
}

impl PrettyPrint for AuthSpec {
    fn pretty_print(&self, indent: usize) -> String {
        let mut result = format!(
            "{}auth {} (id {}, username {}, password {})",
            indent_str(indent),
            model_handle(self.user_model),
            field_handle(self.id_field),
            field_handle(self.username_field),
            field_handle(self.password_field)
        );
        if let Some(field) = self.is_online_field {
            result.push_str(&format!(" online {}", field_handle(field)));
        }
        if let Some(field) = self.last_active_field {
            result.push_str(&format!(" last-active {}", field_handle(field)));
        }
        if let Some(page) = self.on_success_redirect {
            result.push_str(&format!(" success -> p{}", page.index()));
        }
        if let Some(page) = self.on_failure_redirect {
            result.push_str(&format!(" failure -> p{}", page.index()));
        }
        result.push('\n');
        result
    }
}

impl PrettyPrint for EndpointSpec {
    fn pretty_print(&self, indent: usize) -> String {
        let mut result = String::new();
        let base_indent = indent_str(indent);
        let detail_indent = indent_str(indent + 1);

        result.push_str(&format!(
            "{base_indent}q{} {} {} {} on {}",
            self.query.index(),
            self.http_method,
            self.path,
            self.variant,
            model_handle(self.model)
        ));
        if !self.permissions.is_empty() {
            let tags: Vec<_> = self.permissions.iter().map(|tag| format!("{tag:?}")).collect();
            result.push_str(&format!(" [{}]", tags.join(", ")));
        }
        result.push('\n');

        if !self.search.is_empty() {
            result.push_str(&format!("{detail_indent}search {}\n", field_list(&self.search)));
        }
        if let Some(field) = self.where_field {
            result.push_str(&format!("{detail_indent}where {}\n", field_handle(field)));
        }
        if !self.data.is_empty() {
            result.push_str(&format!("{detail_indent}data {}\n", field_list(&self.data)));
        }
        for connect in &self.connects {
            result.push_str(&format!(
                "{detail_indent}connect {} via {}\n",
                field_handle(connect.relation),
                field_handle(connect.foreign_key)
            ));
        }
        if let Some(hops) = &self.ownership {
            let path: Vec<_> = hops
                .iter()
                .map(|hop| {
                    format!(
                        "{} -[{}]-> {}",
                        model_handle(hop.source),
                        field_handle(hop.foreign_key),
                        model_handle(hop.target)
                    )
                })
                .collect();
            if path.is_empty() {
                result.push_str(&format!("{detail_indent}owner self\n"));
            } else {
                result.push_str(&format!("{detail_indent}owner {}\n", path.join(", ")));
            }
        }
        result
    }
}
