//! # Analysis Session
//!
//! Threads one program through every phase:
//!
//! 1. registry (duplicates abort here)
//! 2. models: outlines, then relations and the relation graph
//! 3. queries
//! 4. components
//! 5. pages, then route uniqueness
//! 6. app
//!
//! Within a tier every declaration is resolved independently, on the rayon pool
//! when [`AnalysisOptions::parallel`] is set. Per-declaration diagnostics are merged
//! in declaration order, so the output does not depend on scheduling.

use index_vec::IndexVec;
use rayon::prelude::*;
use weft_compiler_diagnostics::{Diagnostic, DiagnosticCollection};
use weft_compiler_syntax::Program;

use crate::ids::ModelId;
use crate::registry::DeclarationRegistry;
use crate::relation_graph::RelationGraph;
use crate::resolve::{
    app, components, models, pages, queries, AuthContext, ModelOutline, ResolveContext,
};
use crate::resolved::{
    ResolvedApp, ResolvedComponent, ResolvedPage, ResolvedProgram, ResolvedQuery,
};

/// Options for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Resolve the declarations of a tier in parallel.
    pub parallel: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Result of analysing a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Present if and only if no error diagnostic was produced.
    pub resolved: Option<ResolvedProgram>,
    /// Every diagnostic, errors first, declaration order within a severity.
    pub diagnostics: DiagnosticCollection,
    /// The run stopped at the registry because of duplicate declarations.
    pub aborted: bool,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Map `f` over the declarations of one tier, keeping declaration order.
fn map_tier<T, R, F>(options: &AnalysisOptions, items: Vec<T>, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync + Send,
{
    if options.parallel {
        items.into_par_iter().map(f).collect()
    } else {
        items.into_iter().map(f).collect()
    }
}

/// Split per-declaration results into values and merged diagnostics.
fn merge<R>(results: Vec<(R, Vec<Diagnostic>)>, sink: &mut DiagnosticCollection) -> Vec<R> {
    results
        .into_iter()
        .map(|(value, diagnostics)| {
            sink.extend(diagnostics);
            value
        })
        .collect()
}

/// Analyse `program` and, when it is free of errors, resolve it.
pub fn analyze_program(program: &Program, options: &AnalysisOptions) -> Analysis {
    let _span = tracing::debug_span!("analyze_program", parallel = options.parallel).entered();

    let registry = match DeclarationRegistry::build(program) {
        Ok(registry) => registry,
        Err(duplicates) => {
            return Analysis {
                resolved: None,
                diagnostics: DiagnosticCollection::from(duplicates),
                aborted: true,
            };
        }
    };

    let mut diagnostics = DiagnosticCollection::new();
    let auth = AuthContext::from_registry(&registry);

    // Models: sub-pass A, then relations.
    let (outlines, graph) = {
        let _span = tracing::debug_span!("models").entered();
        let outlines: IndexVec<ModelId, ModelOutline> = merge(
            map_tier(options, registry.models(), |(_, decl)| {
                models::outline_model(&registry, decl)
            }),
            &mut diagnostics,
        )
        .into_iter()
        .collect();

        let checks = map_tier(options, outlines.indices().collect(), |model| {
            models::check_relations(model, &outlines)
        });

        let mut outlines = outlines;
        let mut graph = RelationGraph::new(outlines.len());
        for (model, check) in outlines.indices().zip(checks) {
            if check.broken {
                graph.mark_broken(model);
            }
            for edge in check.edges {
                let field = edge.field;
                let id = graph.add_edge(edge);
                outlines[model].fields[field].relation = Some(id);
            }
            diagnostics.extend(check.diagnostics);
        }
        tracing::debug!(models = outlines.len(), edges = graph.edges().len(), "models resolved");
        (outlines, graph)
    };

    let ctx = ResolveContext {
        registry: &registry,
        models: &outlines,
        graph: &graph,
        auth,
    };

    let resolved_queries = {
        let _span = tracing::debug_span!("queries").entered();
        let resolved = merge(
            map_tier(options, registry.queries(), |(_, decl)| queries::resolve_query(ctx, decl)),
            &mut diagnostics,
        );
        diagnostics.extend(queries::check_operation_paths(&registry));
        resolved
    };

    let resolved_components = {
        let _span = tracing::debug_span!("components").entered();
        merge(
            map_tier(options, registry.components(), |(_, decl)| {
                components::resolve_component(ctx, decl)
            }),
            &mut diagnostics,
        )
    };

    let resolved_pages = {
        let _span = tracing::debug_span!("pages").entered();
        let resolved = merge(
            map_tier(options, registry.pages(), |(_, decl)| pages::resolve_page(ctx, decl)),
            &mut diagnostics,
        );
        diagnostics.extend(pages::check_routes(&registry));
        resolved
    };

    let (resolved_app, app_diagnostics) = app::check_app(ctx);
    diagnostics.extend(app_diagnostics);

    diagnostics.sort();
    tracing::debug!(summary = %diagnostics.summary(), "analysis finished");

    let resolved = if diagnostics.has_errors() {
        None
    } else {
        assemble(
            resolved_app,
            outlines,
            graph,
            resolved_queries,
            resolved_components,
            resolved_pages,
        )
    };

    Analysis {
        resolved,
        diagnostics,
        aborted: false,
    }
}

/// Build the resolved program. Any missing piece means some declaration failed.
fn assemble(
    app: Option<ResolvedApp>,
    outlines: IndexVec<ModelId, ModelOutline>,
    relations: RelationGraph,
    queries: Vec<Option<ResolvedQuery>>,
    components: Vec<Option<ResolvedComponent>>,
    pages: Vec<Option<ResolvedPage>>,
) -> Option<ResolvedProgram> {
    Some(ResolvedProgram {
        app: app?,
        models: outlines
            .into_iter()
            .map(ModelOutline::into_resolved)
            .collect::<Option<_>>()?,
        relations,
        queries: queries.into_iter().collect::<Option<_>>()?,
        components: components.into_iter().collect::<Option<_>>()?,
        pages: pages.into_iter().collect::<Option<_>>()?,
    })
}
