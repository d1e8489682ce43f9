#![allow(clippy::option_if_let_else)]

//! # Weft Semantic Analysis
//!
//! Resolves a parsed Weft program: every cross-declaration reference is checked and
//! replaced by a stable identifier, and the invariants that span the data, API and
//! UI tiers are enforced.
//!
//! ## Architecture
//!
//! The analysis is a single batch pass over an immutable program tree:
//! 1. **Registry**: every declaration is indexed by kind and name before any body is
//!    read. Duplicate names stop the analysis.
//! 2. **Models**: field types, defaults, identifiers, then relations and the
//!    relation graph.
//! 3. **Queries**: target model, variant-specific body shape, permissions and
//!    ownership paths.
//! 4. **Components and pages**: query bindings, form inputs, render trees, routes.
//! 5. **App**: title, dependencies, auth configuration.
//!
//! Every problem is collected as a [`Diagnostic`]; a [`ResolvedProgram`] is only
//! produced when no error was found.
//!
//! ## Main Entry Point
//!
//! [`analyze_program`] runs the whole pipeline.

pub mod ids;
pub mod registry;
pub mod relation_graph;
pub mod resolve;
pub mod resolved;
pub mod session;
pub mod types;

pub use weft_compiler_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticCollection};

pub use ids::{ComponentId, FieldId, FieldRef, ModelId, PageId, QueryId, RelationEdgeId};
pub use registry::{DeclarationId, DeclarationRegistry};
pub use relation_graph::{ForeignKey, OwnershipSearch, RelationEdge, RelationGraph};
pub use resolve::queries::operation_path;
pub use resolved::{
    ResolvedApp, ResolvedAuth, ResolvedComponent, ResolvedComponentBody, ResolvedConnect,
    ResolvedDefault, ResolvedField, ResolvedInput, ResolvedModel, ResolvedNode, ResolvedPage,
    ResolvedProgram, ResolvedQuery,
};
pub use session::{analyze_program, Analysis, AnalysisOptions};
pub use types::{Cardinality, FieldType, Permission, PermissionSet, ScalarType};
