//! Stable identifiers handed out by the registry and the resolvers.
//!
//! Every identifier is an arena index. Identifiers are assigned in source order,
//! so two runs over the same program produce the same identifiers.

use serde::{Serialize, Serializer};

index_vec::define_index_type! {
    /// A declared model.
    pub struct ModelId = usize;
}

index_vec::define_index_type! {
    /// A declared query.
    pub struct QueryId = usize;
}

index_vec::define_index_type! {
    /// A declared component.
    pub struct ComponentId = usize;
}

index_vec::define_index_type! {
    /// A declared page.
    pub struct PageId = usize;
}

index_vec::define_index_type! {
    /// A field within one model. Only meaningful together with its [`ModelId`].
    pub struct FieldId = usize;
}

index_vec::define_index_type! {
    /// An edge of the relation graph.
    pub struct RelationEdgeId = usize;
}

macro_rules! serialize_as_index {
    ($($id:ty),* $(,)?) => {
        $(
            impl Serialize for $id {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.serialize_u64(self.index() as u64)
                }
            }
        )*
    };
}

serialize_as_index!(ModelId, QueryId, ComponentId, PageId, FieldId, RelationEdgeId);

/// A field handle that is valid program-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FieldRef {
    pub model: ModelId,
    pub field: FieldId,
}

impl FieldRef {
    pub const fn new(model: ModelId, field: FieldId) -> Self {
        Self { model, field }
    }
}
