//! # Field Types and Permissions
//!
//! The closed vocabularies the resolvers check against: scalar field types, relation
//! cardinality, input-kind compatibility, and the permission tag set.

use std::fmt;

use bitflags::bitflags;
use serde::Serialize;
use weft_compiler_syntax::{InputKind, Literal};

use crate::ids::ModelId;

/// Built-in scalar field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScalarType {
    Int,
    Float,
    String,
    Boolean,
    DateTime,
    Json,
}

impl ScalarType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Int" => Some(Self::Int),
            "Float" => Some(Self::Float),
            "String" => Some(Self::String),
            "Boolean" => Some(Self::Boolean),
            "DateTime" => Some(Self::DateTime),
            "Json" => Some(Self::Json),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "Int",
            Self::Float => "Float",
            Self::String => "String",
            Self::Boolean => "Boolean",
            Self::DateTime => "DateTime",
            Self::Json => "Json",
        }
    }

    /// Types an identifier field may have.
    pub const fn is_identifier_type(self) -> bool {
        matches!(self, Self::Int | Self::String)
    }

    /// Whether `literal` is a valid default for a field of this type.
    pub fn accepts_literal(self, literal: &Literal) -> bool {
        match (self, literal) {
            (Self::Int, Literal::Int(_)) => true,
            (Self::Int, Literal::Call(call)) => call == "autoincrement",
            (Self::Float, Literal::Int(_) | Literal::Decimal(_)) => true,
            (Self::String, Literal::String(_)) => true,
            (Self::String, Literal::Call(call)) => call == "uuid" || call == "cuid",
            (Self::Boolean, Literal::Bool(_)) => true,
            (Self::DateTime, Literal::String(_)) => true,
            (Self::DateTime, Literal::Call(call)) => call == "now",
            (Self::Json, Literal::String(_)) => true,
            _ => false,
        }
    }

    /// Whether a form input of `kind` can edit a field of this type.
    ///
    /// `RelationInput` never edits a scalar.
    pub const fn accepts_input(self, kind: InputKind) -> bool {
        match kind {
            InputKind::TextInput | InputKind::TextArea => matches!(self, Self::String),
            InputKind::NumberInput => matches!(self, Self::Int | Self::Float),
            InputKind::Checkbox => matches!(self, Self::Boolean),
            InputKind::DateInput => matches!(self, Self::DateTime),
            InputKind::RelationInput => false,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How many records a relation field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Cardinality {
    One,
    Many,
}

/// The resolved type of a model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Scalar(ScalarType),
    Relation {
        target: ModelId,
        cardinality: Cardinality,
    },
}

impl FieldType {
    pub const fn scalar(self) -> Option<ScalarType> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            Self::Relation { .. } => None,
        }
    }

    pub const fn is_relation(self) -> bool {
        matches!(self, Self::Relation { .. })
    }
}

/// A single permission tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Permission {
    IsAuth,
    OwnsRecord,
}

bitflags! {
    /// Permission tags attached to a query or page. Tags combine with AND semantics.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PermissionSet: u8 {
        /// The caller must be authenticated.
        const IS_AUTH = 1 << 0;
        /// The caller must own the record, through the ownership path.
        const OWNS_RECORD = 1 << 1;
    }
}

impl PermissionSet {
    /// Parse a tag as written in source. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "IsAuth" => Some(Self::IS_AUTH),
            "OwnsRecord" => Some(Self::OWNS_RECORD),
            _ => None,
        }
    }

    /// Parse every known tag, ignoring unknown ones.
    pub fn from_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Self {
        tags.into_iter()
            .filter_map(Self::from_tag)
            .fold(Self::empty(), |set, tag| set | tag)
    }

    /// The tags in canonical order.
    pub fn permissions(self) -> Vec<Permission> {
        let mut permissions = Vec::new();
        if self.contains(Self::IS_AUTH) {
            permissions.push(Permission::IsAuth);
        }
        if self.contains(Self::OWNS_RECORD) {
            permissions.push(Permission::OwnsRecord);
        }
        permissions
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<_> = self
            .permissions()
            .into_iter()
            .map(|p| match p {
                Permission::IsAuth => "IsAuth",
                Permission::OwnsRecord => "OwnsRecord",
            })
            .collect();
        write!(f, "[{}]", tags.join(", "))
    }
}
