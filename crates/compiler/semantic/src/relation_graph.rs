//! # Relation Graph
//!
//! Relations between models are stored as edge data keyed by [`ModelId`], never as
//! links between model values, so self-relations and mutual relations need no
//! special handling.

use std::collections::VecDeque;

use index_vec::IndexVec;
use rustc_hash::FxHashSet;

use crate::ids::{FieldId, ModelId, RelationEdgeId};
use crate::types::Cardinality;

/// The foreign key half of a relation: a scalar on the source model and the
/// identifier it references on the target model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForeignKey {
    pub local: FieldId,
    pub references: FieldId,
}

/// One relation field, seen as a directed edge from the model declaring it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationEdge {
    pub source: ModelId,
    /// The relation field on `source`.
    pub field: FieldId,
    pub target: ModelId,
    pub cardinality: Cardinality,
    /// Present on the side that holds the foreign key.
    pub foreign_key: Option<ForeignKey>,
}

impl RelationEdge {
    /// Edges an ownership path may follow: singular and holding the foreign key.
    pub const fn is_owning(&self) -> bool {
        matches!(self.cardinality, Cardinality::One) && self.foreign_key.is_some()
    }
}

/// Outcome of an ownership path search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnershipSearch {
    /// Shortest path of edges. Empty when the start model is the user model.
    Found(Vec<RelationEdgeId>),
    NotFound,
    /// No path was found, but the search crossed a model whose relations failed
    /// validation, so the answer cannot be trusted.
    Inconclusive,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationGraph {
    edges: IndexVec<RelationEdgeId, RelationEdge>,
    outgoing: IndexVec<ModelId, Vec<RelationEdgeId>>,
    broken: FxHashSet<ModelId>,
}

impl RelationGraph {
    pub fn new(model_count: usize) -> Self {
        Self {
            edges: IndexVec::new(),
            outgoing: (0..model_count).map(|_| Vec::new()).collect(),
            broken: FxHashSet::default(),
        }
    }

    pub fn add_edge(&mut self, edge: RelationEdge) -> RelationEdgeId {
        let source = edge.source;
        let id = self.edges.push(edge);
        self.outgoing[source].push(id);
        id
    }

    /// Mark a model whose relations did not validate.
    pub fn mark_broken(&mut self, model: ModelId) {
        self.broken.insert(model);
    }

    pub fn is_broken(&self, model: ModelId) -> bool {
        self.broken.contains(&model)
    }

    pub fn edge(&self, id: RelationEdgeId) -> &RelationEdge {
        &self.edges[id]
    }

    pub const fn edges(&self) -> &IndexVec<RelationEdgeId, RelationEdge> {
        &self.edges
    }

    pub fn outgoing(&self, model: ModelId) -> &[RelationEdgeId] {
        &self.outgoing[model]
    }

    /// Edge of a given relation field, if the field produced one.
    pub fn edge_of(&self, model: ModelId, field: FieldId) -> Option<RelationEdgeId> {
        self.outgoing[model]
            .iter()
            .copied()
            .find(|&id| self.edges[id].field == field)
    }

    /// Breadth-first search from `from` to `to` over owning edges.
    ///
    /// Edges are explored in declaration order, so the path found is the first
    /// shortest one and is stable across runs.
    pub fn ownership_path(&self, from: ModelId, to: ModelId) -> OwnershipSearch {
        if from == to {
            return OwnershipSearch::Found(Vec::new());
        }

        let mut reached_by: IndexVec<ModelId, Option<RelationEdgeId>> =
            (0..self.outgoing.len()).map(|_| None).collect();
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::from([from]);
        let mut crossed_broken = false;
        visited.insert(from);

        while let Some(model) = queue.pop_front() {
            if self.is_broken(model) {
                crossed_broken = true;
            }
            for &edge_id in &self.outgoing[model] {
                let edge = &self.edges[edge_id];
                if !edge.is_owning() || !visited.insert(edge.target) {
                    continue;
                }
                reached_by[edge.target] = Some(edge_id);
                if edge.target == to {
                    return OwnershipSearch::Found(self.walk_back(&reached_by, from, to));
                }
                queue.push_back(edge.target);
            }
        }

        if crossed_broken {
            OwnershipSearch::Inconclusive
        } else {
            OwnershipSearch::NotFound
        }
    }

    fn walk_back(
        &self,
        reached_by: &IndexVec<ModelId, Option<RelationEdgeId>>,
        from: ModelId,
        to: ModelId,
    ) -> Vec<RelationEdgeId> {
        let mut path = Vec::new();
        let mut current = to;
        while current != from {
            let Some(edge_id) = reached_by[current] else {
                break;
            };
            path.push(edge_id);
            current = self.edges[edge_id].source;
        }
        path.reverse();
        path
    }
}
