//! # Query Resolver
//!
//! Checks one query against its target model:
//!
//! | Variant | Body | Checks |
//! |---|---|---|
//! | FindUnique, FindMany | optional `search` | fields exist; no `data`, no `where` |
//! | Create | `data` | fields exist, are scalar, are not repeated; connects match foreign keys; no `where`, no `search` |
//! | Update | `where`, `data` | as Create, plus `where` is the identifier or unique |
//! | Delete | `where` | `where` is the identifier or unique; no `data`, no `search` |
//!
//! Permission tags are checked here too, and `OwnsRecord` is turned into an
//! ownership path. Every query is served at [`operation_path`]; two queries
//! whose names map to the same path are rejected by [`check_operation_paths`].

use rustc_hash::{FxHashMap, FxHashSet};
use weft_compiler_diagnostics::Diagnostic;
use weft_compiler_syntax::{DataBlock, QueryDecl, QueryVariant, Span, Spanned};

use super::shared::{check_permission_tags, lookup_field};
use super::{FieldLookup, ModelOutline, ResolveContext};
use crate::ids::{FieldId, ModelId, RelationEdgeId};
use crate::registry::DeclarationRegistry;
use crate::relation_graph::OwnershipSearch;
use crate::resolved::{ResolvedConnect, ResolvedQuery};
use crate::types::PermissionSet;

pub fn resolve_query(
    ctx: ResolveContext<'_, '_>,
    decl: &Spanned<QueryDecl>,
) -> (Option<ResolvedQuery>, Vec<Diagnostic>) {
    let query = decl.value();
    let name = query.name.value();
    let referrer = format!("query '{name}'");
    let _span = tracing::trace_span!("resolve_query", query = %name).entered();
    let mut diagnostics = Vec::new();

    let Some(model_id) = ctx.registry.model_id(query.model.value()) else {
        diagnostics.push(Diagnostic::unresolved(
            "model",
            query.model.value(),
            &referrer,
            query.model.span(),
        ));
        return (None, diagnostics);
    };
    let model = &ctx.models[model_id];

    let permissions =
        check_permission_tags(&query.permissions, &referrer, ctx.auth, true, &mut diagnostics);
    let ownership_path = if permissions.contains(PermissionSet::OWNS_RECORD) {
        ownership_path(ctx, query, model_id, &referrer, &mut diagnostics)
    } else {
        None
    };

    let variant = *query.variant.value();
    let mut checker = BodyChecker {
        ctx,
        query,
        model_id,
        model,
        referrer: &referrer,
        diagnostics: &mut diagnostics,
    };
    let search = checker.search(variant);
    let where_field = checker.where_field(variant);
    let (data, connects) = checker.data(variant);

    if diagnostics.iter().any(Diagnostic::is_error) {
        return (None, diagnostics);
    }

    let resolved = ResolvedQuery {
        name: name.clone(),
        variant,
        model: model_id,
        search,
        where_field,
        data,
        connects,
        permissions,
        ownership_path,
        span: query.name.span(),
    };
    (Some(resolved), diagnostics)
}

fn ownership_path(
    ctx: ResolveContext<'_, '_>,
    query: &QueryDecl,
    model: ModelId,
    referrer: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Vec<RelationEdgeId>> {
    // Missing auth or user model is reported elsewhere.
    let user_model = ctx.auth.user_model?;
    match ctx.graph.ownership_path(model, user_model) {
        OwnershipSearch::Found(path) => Some(path),
        OwnershipSearch::Inconclusive => None,
        OwnershipSearch::NotFound => {
            let span = query
                .permissions
                .iter()
                .find(|tag| tag.value() == "OwnsRecord")
                .map_or(query.name.span(), |tag| tag.span());
            diagnostics.push(Diagnostic::permission_config(
                format!(
                    "{referrer} requires OwnsRecord but model '{}' has no ownership path to user model '{}'",
                    ctx.models[model].name, ctx.models[user_model].name
                ),
                span,
            ));
            None
        }
    }
}

struct BodyChecker<'c, 'a, 'ast> {
    ctx: ResolveContext<'a, 'ast>,
    query: &'c QueryDecl,
    model_id: ModelId,
    model: &'c ModelOutline,
    referrer: &'c str,
    diagnostics: &'c mut Vec<Diagnostic>,
}

impl BodyChecker<'_, '_, '_> {
    fn forbid(&mut self, variant: QueryVariant, part: &str, span: Span) {
        self.diagnostics.push(Diagnostic::shape(
            format!(
                "{} of variant {variant} cannot declare {part}",
                self.referrer
            ),
            span,
        ));
    }

    fn require(&mut self, variant: QueryVariant, part: &str) {
        self.diagnostics.push(Diagnostic::shape(
            format!("{} of variant {variant} requires {part}", self.referrer),
            self.query.name.span(),
        ));
    }

    fn search(&mut self, variant: QueryVariant) -> Vec<FieldId> {
        let query = self.query;
        let Some(search) = &query.search else {
            return Vec::new();
        };
        if !variant.is_find() {
            self.forbid(variant, "search", search.span());
            return Vec::new();
        }
        search
            .value()
            .iter()
            .filter_map(|field| lookup_field(self.model, field, self.referrer, self.diagnostics))
            .collect()
    }

    fn where_field(&mut self, variant: QueryVariant) -> Option<FieldId> {
        let query = self.query;
        match (variant, &query.where_field) {
            (QueryVariant::Update | QueryVariant::Delete, None) => {
                self.require(variant, "a where field");
                None
            }
            (QueryVariant::Update | QueryVariant::Delete, Some(field)) => {
                let id = lookup_field(self.model, field, self.referrer, self.diagnostics)?;
                let resolved = self.model.field(id);
                if !resolved.is_id && !resolved.is_unique {
                    self.diagnostics.push(Diagnostic::shape(
                        format!(
                            "where field '{}.{}' of {} must be the identifier or a unique field",
                            self.model.name,
                            field.value(),
                            self.referrer
                        ),
                        field.span(),
                    ));
                }
                Some(id)
            }
            (_, Some(field)) => {
                self.forbid(variant, "a where field", field.span());
                None
            }
            (_, None) => None,
        }
    }

    fn data(&mut self, variant: QueryVariant) -> (Vec<FieldId>, Vec<ResolvedConnect>) {
        let query = self.query;
        match (variant, &query.data) {
            (QueryVariant::Create | QueryVariant::Update, None) => {
                self.require(variant, "a data block");
                (Vec::new(), Vec::new())
            }
            (QueryVariant::Create | QueryVariant::Update, Some(data)) => {
                (self.data_fields(data.value()), self.connects(data.value()))
            }
            (_, Some(data)) => {
                self.forbid(variant, "a data block", data.span());
                (Vec::new(), Vec::new())
            }
            (_, None) => (Vec::new(), Vec::new()),
        }
    }

    fn data_fields(&mut self, data: &DataBlock) -> Vec<FieldId> {
        let mut seen = FxHashSet::default();
        let mut fields = Vec::new();
        for field in &data.fields {
            if !seen.insert(field.value().as_str()) {
                self.diagnostics.push(Diagnostic::shape(
                    format!(
                        "{} lists data field '{}' more than once",
                        self.referrer,
                        field.value()
                    ),
                    field.span(),
                ));
                continue;
            }
            let Some(id) = lookup_field(self.model, field, self.referrer, self.diagnostics) else {
                continue;
            };
            if self.model.field(id).ty.is_relation() {
                self.diagnostics.push(Diagnostic::shape(
                    format!(
                        "data field '{}.{}' of {} is a relation; connect it through relationFields",
                        self.model.name,
                        field.value(),
                        self.referrer
                    ),
                    field.span(),
                ));
                continue;
            }
            fields.push(id);
        }
        fields
    }

    fn connects(&mut self, data: &DataBlock) -> Vec<ResolvedConnect> {
        let mut seen = FxHashSet::default();
        let mut connects = Vec::new();
        for directive in &data.relation_fields {
            let relation = &directive.value().relation;
            let foreign_key = &directive.value().foreign_key;
            if !seen.insert(relation.value().as_str()) {
                self.diagnostics.push(Diagnostic::shape(
                    format!(
                        "{} connects relation '{}' more than once",
                        self.referrer,
                        relation.value()
                    ),
                    relation.span(),
                ));
                continue;
            }

            let field_id = match self.model.lookup(relation.value()) {
                FieldLookup::Found(id) => id,
                FieldLookup::Unresolved => continue,
                FieldLookup::Missing => {
                    lookup_field(self.model, relation, self.referrer, self.diagnostics);
                    continue;
                }
            };
            let qualified = format!("{}.{}", self.model.name, relation.value());
            if !self.model.field(field_id).ty.is_relation() {
                self.diagnostics.push(Diagnostic::shape(
                    format!(
                        "{} connects '{qualified}', which is not a relation field",
                        self.referrer
                    ),
                    relation.span(),
                ));
                continue;
            }
            // Relations that failed validation have no edge and are already reported.
            let Some(edge_id) = self.ctx.graph.edge_of(self.model_id, field_id) else {
                continue;
            };
            let Some(fk) = self.ctx.graph.edge(edge_id).foreign_key else {
                self.diagnostics.push(Diagnostic::shape(
                    format!(
                        "{} connects '{qualified}', which does not hold a foreign key",
                        self.referrer
                    ),
                    relation.span(),
                ));
                continue;
            };
            let fk_name = &self.model.field(fk.local).name;
            if fk_name != foreign_key.value() {
                self.diagnostics.push(Diagnostic::shape(
                    format!(
                        "{} connects '{qualified}' through '{}', but its foreign key is '{fk_name}'",
                        self.referrer,
                        foreign_key.value()
                    ),
                    foreign_key.span(),
                ));
                continue;
            }
            connects.push(ResolvedConnect {
                relation: field_id,
                edge: edge_id,
                foreign_key: fk.local,
            });
        }
        connects
    }
}

/// HTTP path of the endpoint serving a query: `/operations/<kebab-case name>`.
pub fn operation_path(query_name: &str) -> String {
    format!("/operations/{}", kebab_case(query_name))
}

fn kebab_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut result = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' {
            result.push('-');
            continue;
        }
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let word_start = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower);
            if word_start {
                result.push('-');
            }
        }
        result.push(c.to_ascii_lowercase());
    }
    result
}

/// Operation path uniqueness across queries. Every later query whose path is
/// already taken is reported, pointing at the first query serving it.
pub fn check_operation_paths(registry: &DeclarationRegistry<'_>) -> Vec<Diagnostic> {
    let mut first_use: FxHashMap<String, (&str, Span)> = FxHashMap::default();
    let mut diagnostics = Vec::new();
    for (_, query) in registry.queries() {
        let query = query.value();
        let name = query.name.value().as_str();
        let path = operation_path(name);
        match first_use.get(&path) {
            Some(&(first_query, first_span)) => diagnostics.push(
                Diagnostic::shape(
                    format!(
                        "query '{name}' would be served at '{path}', which query '{first_query}' already uses"
                    ),
                    query.name.span(),
                )
                .with_related_span(first_span, format!("'{first_query}' is declared here")),
            ),
            None => {
                first_use.insert(path, (name, query.name.span()));
            }
        }
    }
    diagnostics
}
