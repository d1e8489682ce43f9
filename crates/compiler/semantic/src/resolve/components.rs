//! # Component Resolver
//!
//! Query-bound components are checked against their bound query: binding slot,
//! variant agreement, and every form input against the query's data block and
//! the target model. Custom components are passthrough: only their imports and
//! dependency list are checked.

use rustc_hash::FxHashSet;
use weft_compiler_diagnostics::Diagnostic;
use weft_compiler_syntax::{
    BoundComponent, ComponentBody, ComponentDecl, ComponentVariant, CustomComponent,
    DefaultBinding, FormInput, InputKind, QueryDecl, Span, Spanned,
};

use super::shared::check_dependencies;
use super::{FieldLookup, ModelOutline, ResolveContext};
use crate::ids::{FieldId, FieldRef, ModelId};
use crate::resolved::{ResolvedComponent, ResolvedComponentBody, ResolvedDefault, ResolvedInput};
use crate::types::{FieldType, PermissionSet};

pub fn resolve_component(
    ctx: ResolveContext<'_, '_>,
    decl: &Spanned<ComponentDecl>,
) -> (Option<ResolvedComponent>, Vec<Diagnostic>) {
    let component = decl.value();
    let name = component.name.value();
    let referrer = format!("component '{name}'");
    let variant = *component.variant.value();
    let _span = tracing::trace_span!("resolve_component", component = %name).entered();
    let mut diagnostics = Vec::new();

    let resolved = match (variant, &component.body) {
        (ComponentVariant::Custom, ComponentBody::Custom(custom)) => {
            check_custom(custom, &referrer, &mut diagnostics);
            Some((ResolvedComponentBody::Custom(custom.clone()), PermissionSet::empty()))
        }
        (ComponentVariant::Custom, ComponentBody::Bound(_)) => {
            diagnostics.push(Diagnostic::shape(
                format!("{referrer} is Custom but declares a query binding instead of code"),
                component.variant.span(),
            ));
            None
        }
        (_, ComponentBody::Custom(_)) => {
            diagnostics.push(Diagnostic::shape(
                format!("{referrer} of variant {variant} needs a query binding, not custom code"),
                component.variant.span(),
            ));
            None
        }
        (_, ComponentBody::Bound(bound)) => {
            let mut checker = BoundChecker {
                ctx,
                component,
                variant,
                referrer: &referrer,
                diagnostics: &mut diagnostics,
            };
            checker.check(bound)
        }
    };

    let Some((body, permissions)) = resolved else {
        return (None, diagnostics);
    };
    if diagnostics.iter().any(Diagnostic::is_error) {
        return (None, diagnostics);
    }
    let resolved = ResolvedComponent {
        name: name.clone(),
        variant,
        body,
        permissions,
        span: component.name.span(),
    };
    (Some(resolved), diagnostics)
}

fn check_custom(custom: &CustomComponent, referrer: &str, diagnostics: &mut Vec<Diagnostic>) {
    for import in &custom.imports {
        let value = import.value();
        if value.what.trim().is_empty() || value.from.trim().is_empty() {
            diagnostics.push(Diagnostic::shape(
                format!("{referrer} has an import with an empty name or source"),
                import.span(),
            ));
        }
    }
    check_dependencies(&custom.dependencies, referrer, diagnostics);
}

struct BoundChecker<'c, 'a, 'ast> {
    ctx: ResolveContext<'a, 'ast>,
    component: &'c ComponentDecl,
    variant: ComponentVariant,
    referrer: &'c str,
    diagnostics: &'c mut Vec<Diagnostic>,
}

impl BoundChecker<'_, '_, '_> {
    fn shape(&mut self, message: String, span: Span) {
        self.diagnostics.push(Diagnostic::shape(message, span));
    }

    fn check(&mut self, bound: &BoundComponent) -> Option<(ResolvedComponentBody, PermissionSet)> {
        let variant = self.variant;
        let (expected_slot, expected_variant) =
            variant.binding_slot().zip(variant.query_variant())?;

        let Some(binding) = &bound.binding else {
            self.shape(
                format!(
                    "{} of variant {variant} has no {expected_slot} binding",
                    self.referrer
                ),
                self.component.name.span(),
            );
            return None;
        };
        let binding_value = binding.value();
        if binding_value.slot != expected_slot {
            self.shape(
                format!(
                    "{} of variant {variant} must bind through {expected_slot}, not {}",
                    self.referrer, binding_value.slot
                ),
                binding.span(),
            );
            return None;
        }

        let query_name = &binding_value.query;
        let Some(query_id) = self.ctx.registry.query_id(query_name.value()) else {
            self.diagnostics.push(Diagnostic::unresolved(
                "query",
                query_name.value(),
                self.referrer,
                query_name.span(),
            ));
            return None;
        };
        let query = self.ctx.registry.query(query_id).value();
        let query_variant = *query.variant.value();
        if query_variant != expected_variant {
            self.shape(
                format!(
                    "variant mismatch: Component<{variant}> {} binds Query<{query_variant}> {}",
                    self.component.name.value(),
                    query.name.value()
                ),
                query_name.span(),
            );
            return None;
        }

        let permissions = PermissionSet::from_tags(
            query.permissions.iter().map(|tag| tag.value().as_str()),
        );
        let inputs = self.check_inputs(bound, query)?;
        let body = ResolvedComponentBody::Bound {
            slot: expected_slot,
            query: query_id,
            inputs,
        };
        Some((body, permissions))
    }

    fn check_inputs(
        &mut self,
        bound: &BoundComponent,
        query: &QueryDecl,
    ) -> Option<Vec<ResolvedInput>> {
        let variant = self.variant;
        if !matches!(variant, ComponentVariant::Create | ComponentVariant::Update) {
            if let Some(first) = bound.form_inputs.first() {
                self.shape(
                    format!(
                        "{} of variant {variant} cannot declare form inputs",
                        self.referrer
                    ),
                    first.span(),
                );
                return None;
            }
            return Some(Vec::new());
        }

        // An unknown target model is reported on the query.
        let model_id = self.ctx.registry.model_id(query.model.value())?;
        let models = self.ctx.models;
        let model = &models[model_id];

        let data_fields: Vec<&str> = query
            .data
            .iter()
            .flat_map(|data| data.value().fields.iter())
            .map(|field| field.value().as_str())
            .collect();
        let connected: Vec<&str> = query
            .data
            .iter()
            .flat_map(|data| data.value().relation_fields.iter())
            .map(|connect| connect.value().relation.value().as_str())
            .collect();

        let mut seen = FxHashSet::default();
        let mut inputs = Vec::new();
        for input in &bound.form_inputs {
            let key = input.value().field.value().as_str();
            if !seen.insert(key) {
                self.shape(
                    format!(
                        "{} declares form input '{key}' more than once",
                        self.referrer
                    ),
                    input.value().field.span(),
                );
                continue;
            }
            if !data_fields.contains(&key) && !connected.contains(&key) {
                self.shape(
                    format!(
                        "form input '{key}' of {} is not a data field or connected relation of query '{}'",
                        self.referrer,
                        query.name.value()
                    ),
                    input.value().field.span(),
                );
                continue;
            }
            // Missing or unresolved fields are reported on the query or the model.
            let FieldLookup::Found(field_id) = model.lookup(key) else {
                continue;
            };
            if let Some(resolved) = self.check_input(model_id, model, field_id, input) {
                inputs.push(resolved);
            }
        }

        for field in query.data.iter().flat_map(|data| data.value().fields.iter()) {
            let key = field.value().as_str();
            if !seen.contains(key) && matches!(model.lookup(key), FieldLookup::Found(_)) {
                self.diagnostics.push(Diagnostic::missing_form_input(
                    self.component.name.value(),
                    key,
                    query.name.value(),
                    self.component.name.span(),
                ));
                seen.insert(key);
            }
        }

        Some(inputs)
    }

    fn check_input(
        &mut self,
        model_id: ModelId,
        model: &ModelOutline,
        field_id: FieldId,
        input: &Spanned<FormInput>,
    ) -> Option<ResolvedInput> {
        let input_value = input.value();
        let key = input_value.field.value();
        let kind = *input_value.kind.value();
        let field = model.field(field_id);
        let qualified = format!("{}.{key}", model.name);

        match (kind, field.ty) {
            (InputKind::RelationInput, FieldType::Scalar(scalar)) => {
                self.shape(
                    format!(
                        "form input '{key}' of {} is a RelationInput but '{qualified}' is a {scalar}",
                        self.referrer
                    ),
                    input_value.kind.span(),
                );
                return None;
            }
            (InputKind::RelationInput, FieldType::Relation { .. }) => {}
            (_, FieldType::Relation { .. }) => {
                self.shape(
                    format!(
                        "form input '{key}' of {} uses {kind} on relation '{qualified}'; use RelationInput",
                        self.referrer
                    ),
                    input_value.kind.span(),
                );
                return None;
            }
            (_, FieldType::Scalar(scalar)) => {
                if !scalar.accepts_input(kind) {
                    self.shape(
                        format!(
                            "form input '{key}' of {} uses {kind}, which cannot edit '{qualified}' of type {scalar}",
                            self.referrer
                        ),
                        input_value.kind.span(),
                    );
                    return None;
                }
            }
        }

        let default = match &input_value.default {
            None => None,
            Some(default) => Some(self.check_default(field.ty, kind, &qualified, default)?),
        };

        Some(ResolvedInput {
            field: FieldRef::new(model_id, field_id),
            kind,
            default,
        })
    }

    fn check_default(
        &mut self,
        field_type: FieldType,
        kind: InputKind,
        qualified: &str,
        default: &Spanned<DefaultBinding>,
    ) -> Option<ResolvedDefault> {
        match default.value() {
            DefaultBinding::Literal(literal) => match field_type.scalar() {
                Some(scalar) if scalar.accepts_literal(literal) => {
                    Some(ResolvedDefault::Literal(literal.clone()))
                }
                Some(scalar) => {
                    self.shape(
                        format!(
                            "default {literal} in {} does not fit '{qualified}' of type {scalar}",
                            self.referrer
                        ),
                        default.span(),
                    );
                    None
                }
                None => {
                    self.shape(
                        format!(
                            "{} gives relation '{qualified}' a literal default",
                            self.referrer
                        ),
                        default.span(),
                    );
                    None
                }
            },
            DefaultBinding::LoggedInUser {
                connect,
                user_field,
            } => {
                let (InputKind::RelationInput, FieldType::Relation { target, .. }) =
                    (kind, field_type)
                else {
                    self.shape(
                        format!(
                            "{} uses LoggedInUser on '{qualified}', which is only valid on a RelationInput",
                            self.referrer
                        ),
                        default.span(),
                    );
                    return None;
                };
                if !self.ctx.auth.declared {
                    self.diagnostics.push(Diagnostic::auth_config(
                        format!(
                            "{} defaults '{qualified}' to LoggedInUser but the app declares no auth",
                            self.referrer
                        ),
                        default.span(),
                    ));
                    return None;
                }

                let models = self.ctx.models;
                // The user model itself is checked with the app.
                let user_model = self.ctx.auth.user_model?;
                let user_outline = &models[user_model];
                let user_field = match user_outline.lookup(user_field.value()) {
                    FieldLookup::Found(id) => FieldRef::new(user_model, id),
                    FieldLookup::Unresolved => return None,
                    FieldLookup::Missing => {
                        self.diagnostics.push(Diagnostic::auth_config(
                            format!(
                                "{} uses LoggedInUser.{}, which is not a field of user model '{}'",
                                self.referrer,
                                user_field.value(),
                                user_outline.name
                            ),
                            user_field.span(),
                        ));
                        return None;
                    }
                };

                let target_outline = &models[target];
                let connect = match target_outline.lookup(connect.value()) {
                    FieldLookup::Found(id) => FieldRef::new(target, id),
                    FieldLookup::Unresolved => return None,
                    FieldLookup::Missing => {
                        self.shape(
                            format!(
                                "{} connects '{qualified}' by '{}', which is not a field of model '{}'",
                                self.referrer,
                                connect.value(),
                                target_outline.name
                            ),
                            connect.span(),
                        );
                        return None;
                    }
                };

                Some(ResolvedDefault::LoggedInUser {
                    connect,
                    user_field,
                })
            }
        }
    }
}
