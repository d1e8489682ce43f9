//! # Model Resolver
//!
//! Two sub-passes:
//!
//! - [`outline_model`] classifies every field of one model on its own: field names,
//!   types, attributes, defaults and the identifier.
//! - [`check_relations`] validates the relation fields of one model against the
//!   outlines of every model and produces the edges of the relation graph.
//!
//! Both run per model and can run in parallel; edges are numbered afterwards in
//! model and field order.

use index_vec::IndexVec;
use rustc_hash::{FxHashMap, FxHashSet};
use weft_compiler_diagnostics::Diagnostic;
use weft_compiler_syntax::{FieldAttribute, ModelDecl, Span, Spanned, TypeModifier};

use crate::ids::{FieldId, ModelId};
use crate::registry::DeclarationRegistry;
use crate::relation_graph::{ForeignKey, RelationEdge};
use crate::resolved::{ResolvedField, ResolvedModel};
use crate::types::{Cardinality, FieldType, ScalarType};

/// Result of looking up a field by name on a [`ModelOutline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLookup {
    Found(FieldId),
    /// The field exists but its type did not resolve. It has been reported.
    Unresolved,
    Missing,
}

/// A model after sub-pass A.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOutline {
    pub name: String,
    pub span: Span,
    pub fields: IndexVec<FieldId, ResolvedField>,
    /// The single valid identifier field, if there is one.
    pub identifier: Option<FieldId>,
    field_names: FxHashMap<String, FieldId>,
    unresolved: FxHashSet<String>,
    /// Some unresolved field carries `@relation`.
    unresolved_foreign_key_side: bool,
    relation_attributes: FxHashMap<FieldId, (Spanned<String>, Spanned<String>)>,
}

impl ModelOutline {
    pub fn lookup(&self, name: &str) -> FieldLookup {
        if let Some(&id) = self.field_names.get(name) {
            FieldLookup::Found(id)
        } else if self.unresolved.contains(name) {
            FieldLookup::Unresolved
        } else {
            FieldLookup::Missing
        }
    }

    pub fn field(&self, id: FieldId) -> &ResolvedField {
        &self.fields[id]
    }

    pub fn has_unresolved_fields(&self) -> bool {
        !self.unresolved.is_empty()
    }

    /// `(foreign key, references)` of a relation field carrying `@relation`.
    pub fn relation_attribute(&self, id: FieldId) -> Option<&(Spanned<String>, Spanned<String>)> {
        self.relation_attributes.get(&id)
    }

    /// Whether this model has a singular `@relation` field targeting `target`,
    /// other than `except`.
    fn has_foreign_key_side_to(&self, target: ModelId, except: Option<FieldId>) -> bool {
        self.fields.iter_enumerated().any(|(id, field)| {
            Some(id) != except
                && self.relation_attributes.contains_key(&id)
                && field.ty
                    == FieldType::Relation {
                        target,
                        cardinality: Cardinality::One,
                    }
        })
    }

    /// Whether an unresolved field of this model may have been the foreign-key
    /// side that a relation of another model points back to.
    fn may_hold_unresolved_foreign_key_side(&self) -> bool {
        self.unresolved_foreign_key_side
    }

    pub fn into_resolved(self) -> Option<ResolvedModel> {
        let identifier = self.identifier?;
        if self.has_unresolved_fields() {
            return None;
        }
        Some(ResolvedModel::new(self.name, self.fields, identifier, self.span))
    }
}

/// Sub-pass A: classify the fields of one model.
pub fn outline_model(
    registry: &DeclarationRegistry<'_>,
    decl: &Spanned<ModelDecl>,
) -> (ModelOutline, Vec<Diagnostic>) {
    let model = decl.value();
    let model_name = model.name.value();
    let _span = tracing::trace_span!("outline_model", model = %model_name).entered();

    let mut diagnostics = Vec::new();
    let mut fields: IndexVec<FieldId, ResolvedField> = IndexVec::new();
    let mut field_names = FxHashMap::default();
    let mut first_spans: FxHashMap<&str, Span> = FxHashMap::default();
    let mut unresolved = FxHashSet::default();
    let mut unresolved_foreign_key_side = false;
    let mut relation_attributes = FxHashMap::default();

    for field_decl in &model.fields {
        let field = field_decl.value();
        let field_name = field.name.value();
        let qualified = format!("{model_name}.{field_name}");

        if let Some(&first) = first_spans.get(field_name.as_str()) {
            diagnostics.push(
                Diagnostic::shape(
                    format!("field '{qualified}' is declared more than once"),
                    field.name.span(),
                )
                .with_related_span(first, format!("first declaration of '{field_name}' is here")),
            );
            continue;
        }
        first_spans.insert(field_name.as_str(), field.name.span());

        let ty = field.ty.value();
        let field_type = if let Some(scalar) = ScalarType::from_name(&ty.name) {
            FieldType::Scalar(scalar)
        } else if let Some(target) = registry.model_id(&ty.name) {
            let cardinality = match ty.modifier {
                TypeModifier::List => Cardinality::Many,
                TypeModifier::Required | TypeModifier::Optional => Cardinality::One,
            };
            FieldType::Relation {
                target,
                cardinality,
            }
        } else {
            diagnostics.push(Diagnostic::unresolved(
                "type",
                &ty.name,
                &format!("field '{qualified}'"),
                field.ty.span(),
            ));
            unresolved.insert(field_name.clone());
            unresolved_foreign_key_side |= field.relation_attribute().is_some();
            continue;
        };

        let is_id = field.has_attribute(|attr| matches!(attr, FieldAttribute::Id));
        let is_unique = field.has_attribute(|attr| matches!(attr, FieldAttribute::Unique));
        let default = field.attributes.iter().find_map(|attr| match attr.value() {
            FieldAttribute::Default(literal) => Some((literal.clone(), attr.span())),
            _ => None,
        });

        match field_type {
            FieldType::Relation { .. } => {
                if is_id || default.is_some() {
                    diagnostics.push(Diagnostic::shape(
                        format!("relation field '{qualified}' cannot carry @id or @default"),
                        field.name.span(),
                    ));
                }
            }
            FieldType::Scalar(scalar) => {
                if field.relation_attribute().is_some() {
                    diagnostics.push(Diagnostic::relation_integrity(
                        model_name,
                        field_name,
                        &format!("carries @relation but has scalar type {scalar}"),
                        field.name.span(),
                    ));
                }
                if let Some((literal, span)) = &default {
                    if !scalar.accepts_literal(literal) {
                        diagnostics.push(Diagnostic::shape(
                            format!(
                                "default value {literal} of field '{qualified}' does not fit type {scalar}"
                            ),
                            *span,
                        ));
                    }
                }
                if is_id && (ty.modifier != TypeModifier::Required || !scalar.is_identifier_type())
                {
                    diagnostics.push(Diagnostic::shape(
                        format!(
                            "identifier field '{qualified}' must be a required Int or String, found {ty}"
                        ),
                        field.ty.span(),
                    ));
                }
            }
        }

        let id = fields.push(ResolvedField {
            name: field_name.clone(),
            ty: field_type,
            modifier: ty.modifier,
            is_id,
            is_unique,
            default: default.map(|(literal, _)| literal),
            relation: None,
            span: field.name.span(),
        });
        field_names.insert(field_name.clone(), id);
        if let Some((foreign_key, references)) = field.relation_attribute() {
            if field_type.is_relation() {
                relation_attributes.insert(id, (foreign_key.clone(), references.clone()));
            }
        }
    }

    let declared_ids = model
        .fields
        .iter()
        .filter(|field| field.value().has_attribute(|attr| matches!(attr, FieldAttribute::Id)))
        .count();
    let identifier = match declared_ids {
        0 => {
            diagnostics.push(Diagnostic::shape(
                format!("model '{model_name}' has no identifier field; mark one field with @id"),
                model.name.span(),
            ));
            None
        }
        1 => fields
            .iter_enumerated()
            .find(|(_, field)| field.is_id)
            .filter(|(_, field)| {
                field.modifier == TypeModifier::Required
                    && field.ty.scalar().is_some_and(ScalarType::is_identifier_type)
            })
            .map(|(id, _)| id),
        count => {
            diagnostics.push(Diagnostic::shape(
                format!(
                    "model '{model_name}' declares {count} identifier fields; exactly one is allowed"
                ),
                model.name.span(),
            ));
            None
        }
    };

    let outline = ModelOutline {
        name: model_name.clone(),
        span: model.name.span(),
        fields,
        identifier,
        field_names,
        unresolved,
        unresolved_foreign_key_side,
        relation_attributes,
    };
    (outline, diagnostics)
}

/// Relation edges of one model, in field order.
#[derive(Debug, Default)]
pub struct RelationCheck {
    pub edges: Vec<RelationEdge>,
    /// Some relation of this model did not validate.
    pub broken: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Sub-pass B: validate the relation fields of `model` against every outline.
pub fn check_relations(model: ModelId, outlines: &IndexVec<ModelId, ModelOutline>) -> RelationCheck {
    let outline = &outlines[model];
    let _span = tracing::trace_span!("check_relations", model = %outline.name).entered();

    let mut check = RelationCheck {
        broken: outline.has_unresolved_fields(),
        ..RelationCheck::default()
    };

    for (field_id, field) in outline.fields.iter_enumerated() {
        let FieldType::Relation {
            target,
            cardinality,
        } = field.ty
        else {
            continue;
        };
        let target_outline = &outlines[target];
        let attribute = outline.relation_attribute(field_id);

        let result = match (cardinality, attribute) {
            (Cardinality::One, Some((foreign_key, references))) => {
                check_foreign_key(outline, target_outline, foreign_key, references).map(Some)
            }
            (Cardinality::One, None) => {
                let except = (target == model).then_some(field_id);
                if target_outline.has_foreign_key_side_to(model, except) {
                    Ok(None)
                } else if target_outline.may_hold_unresolved_foreign_key_side() {
                    Err(None)
                } else {
                    Err(Some(format!(
                        "has no @relation and '{}' declares no @relation field pointing back to '{}'",
                        target_outline.name, outline.name
                    )))
                }
            }
            (Cardinality::Many, Some(_)) => Err(Some(
                "is a list relation and cannot carry @relation".to_string(),
            )),
            (Cardinality::Many, None) => {
                if target_outline.has_foreign_key_side_to(model, None) {
                    Ok(None)
                } else if target_outline.may_hold_unresolved_foreign_key_side() {
                    Err(None)
                } else {
                    Err(Some(format!(
                        "is a list relation but '{}' declares no @relation field pointing back to '{}'",
                        target_outline.name, outline.name
                    )))
                }
            }
        };

        match result {
            Ok(foreign_key) => check.edges.push(RelationEdge {
                source: model,
                field: field_id,
                target,
                cardinality,
                foreign_key,
            }),
            Err(reason) => {
                check.broken = true;
                if let Some(reason) = reason {
                    check.diagnostics.push(Diagnostic::relation_integrity(
                        &outline.name,
                        &field.name,
                        &reason,
                        field.span,
                    ));
                }
            }
        }
    }

    check
}

/// Validate `@relation(foreign_key, references)`.
///
/// `Err(None)` means the relation cannot be checked because a field it names did
/// not resolve; that problem is already reported.
fn check_foreign_key(
    model: &ModelOutline,
    target: &ModelOutline,
    foreign_key: &Spanned<String>,
    references: &Spanned<String>,
) -> Result<ForeignKey, Option<String>> {
    let fk_name = foreign_key.value();
    let ref_name = references.value();

    let local = match model.lookup(fk_name) {
        FieldLookup::Found(id) => id,
        FieldLookup::Unresolved => return Err(None),
        FieldLookup::Missing => {
            return Err(Some(format!(
                "names foreign key '{fk_name}' which is not a field of '{}'",
                model.name
            )))
        }
    };
    let Some(local_type) = model.field(local).ty.scalar() else {
        return Err(Some(format!(
            "names foreign key '{fk_name}' which is not a scalar field"
        )));
    };

    let referenced = match target.lookup(ref_name) {
        FieldLookup::Found(id) => id,
        FieldLookup::Unresolved => return Err(None),
        FieldLookup::Missing => {
            return Err(Some(format!(
                "references '{ref_name}' which is not a field of '{}'",
                target.name
            )))
        }
    };
    if target.identifier.is_some_and(|id| id != referenced) {
        return Err(Some(format!(
            "references '{}.{ref_name}' which is not the identifier of '{}'",
            target.name, target.name
        )));
    }
    let Some(referenced_type) = target.field(referenced).ty.scalar() else {
        return Err(Some(format!(
            "references '{}.{ref_name}' which is not a scalar field",
            target.name
        )));
    };

    if local_type != referenced_type {
        return Err(Some(format!(
            "has foreign key '{fk_name}' of type {local_type} but '{}.{ref_name}' has type {referenced_type}",
            target.name
        )));
    }

    Ok(ForeignKey {
        local,
        references: referenced,
    })
}
