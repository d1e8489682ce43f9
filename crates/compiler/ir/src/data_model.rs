//! # Data Model Spec
//!
//! Models, their fields and the relations between them, ready for schema
//! emission.

use index_vec::IndexVec;
use serde::Serialize;
use weft_compiler_semantic::{
    Cardinality, FieldId, FieldRef, ModelId, RelationEdgeId, ScalarType,
};
use weft_compiler_syntax::Literal;

use crate::{indent_str, serialize_arena, PrettyPrint};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataModelSpec {
    #[serde(serialize_with = "serialize_arena")]
    pub models: IndexVec<ModelId, ModelSpec>,
    #[serde(serialize_with = "serialize_arena")]
    pub relations: IndexVec<RelationEdgeId, RelationSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSpec {
    pub name: String,
    pub identifier: FieldId,
    #[serde(serialize_with = "serialize_arena")]
    pub fields: IndexVec<FieldId, FieldSpec>,
}

impl ModelSpec {
    pub fn field_named(&self, name: &str) -> Option<FieldId> {
        self.fields
            .iter_enumerated()
            .find_map(|(id, field)| (field.name == name).then_some(id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub optional: bool,
    pub list: bool,
    pub id: bool,
    pub unique: bool,
    pub default: Option<Literal>,
    /// Edge of a relation field.
    pub relation: Option<RelationEdgeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FieldKind {
    Scalar { scalar: ScalarType },
    Relation { target: ModelId, cardinality: Cardinality },
}

/// One relation edge. `foreign_key` and `references` are set on the owning side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationSpec {
    pub source: FieldRef,
    pub target: ModelId,
    pub cardinality: Cardinality,
    pub foreign_key: Option<FieldRef>,
    pub references: Option<FieldRef>,
}

impl DataModelSpec {
    pub fn model_named(&self, name: &str) -> Option<ModelId> {
        self.models
            .iter_enumerated()
            .find_map(|(id, model)| (model.name == name).then_some(id))
    }

    fn model_name(&self, id: ModelId) -> &str {
        self.models.get(id).map_or("?", |model| model.name.as_str())
    }

    fn field_type(&self, field: &FieldSpec) -> String {
        let base = match field.kind {
            FieldKind::Scalar { scalar } => scalar.name().to_string(),
            FieldKind::Relation { target, .. } => self.model_name(target).to_string(),
        };
        if field.list {
            format!("{base}[]")
        } else if field.optional {
            format!("{base}?")
        } else {
            base
        }
    }
}

impl PrettyPrint for DataModelSpec {
    fn pretty_print(&self, indent: usize) -> String {
        let mut result = String::new();
        let base_indent = indent_str(indent);
        let field_indent = indent_str(indent + 2);

        result.push_str(&format!("{base_indent}data model {{\n"));
        for (model_id, model) in self.models.iter_enumerated() {
            result.push_str(&format!(
                "{base_indent}  model {} ({}) {{\n",
                model.name,
                model_handle(model_id)
            ));
            for (field_id, field) in model.fields.iter_enumerated() {
                result.push_str(&format!(
                    "{field_indent}f{} {}: {}",
                    field_id.index(),
                    field.name,
                    self.field_type(field)
                ));
                if field.id {
                    result.push_str(" @id");
                }
                if field.unique {
                    result.push_str(" @unique");
                }
                if let Some(default) = &field.default {
                    result.push_str(&format!(" @default({default})"));
                }
                if let Some(edge) = field.relation {
                    result.push_str(&format!(" -> e{}", edge.index()));
                }
                result.push('\n');
            }
            result.push_str(&format!("{base_indent}  }}\n"));
        }
        for (edge_id, relation) in self.relations.iter_enumerated() {
            result.push_str(&format!(
                "{base_indent}  relation e{}: {}\n",
                edge_id.index(),
                relation.pretty_print(0)
            ));
        }
        result.push_str(&format!("{base_indent}}}\n"));
        result
    }
}

impl PrettyPrint for RelationSpec {
    fn pretty_print(&self, indent: usize) -> String {
        let cardinality = match self.cardinality {
            Cardinality::One => "one",
            Cardinality::Many => "many",
        };
        let mut result = format!(
            "{}{} -> {} ({cardinality})",
            indent_str(indent),
            field_handle(self.source),
            model_handle(self.target)
        );
        if let (Some(foreign_key), Some(references)) = (self.foreign_key, self.references) {
            result.push_str(&format!(
                " via {} = {}",
                field_handle(foreign_key),
                field_handle(references)
            ));
        }
        result
    }
}

pub(crate) fn model_handle(model: ModelId) -> String {
    format!("m{}", model.index())
}

pub(crate) fn field_handle(field: FieldRef) -> String {
    format!("m{}.f{}", field.model.index(), field.field.index())
}
