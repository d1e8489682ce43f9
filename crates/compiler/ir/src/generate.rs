//! # Spec Generation
//!
//! A total fold from a [`ResolvedProgram`] to the three tier specs. Analysis has
//! already rejected every inconsistent program, so nothing here can fail.

use index_vec::IndexVec;
use weft_compiler_semantic::{
    operation_path, ComponentId, FieldRef, FieldType, PageId, QueryId, RelationEdgeId,
    ResolvedAuth, ResolvedComponent, ResolvedComponentBody, ResolvedDefault, ResolvedField,
    ResolvedInput, ResolvedModel, ResolvedNode, ResolvedPage, ResolvedProgram, ResolvedQuery,
};
use weft_compiler_syntax::{Dependency, Spanned, TypeModifier};

use crate::api::{ApiSpec, AuthSpec, ConnectSpec, EndpointSpec, HttpMethod, OwnershipHop};
use crate::data_model::{DataModelSpec, FieldKind, FieldSpec, ModelSpec, RelationSpec};
use crate::ui::{
    ComponentBodySpec, ComponentSpec, DefaultSpec, DependencySpec, InputSpec, NodeSpec, PageSpec,
    UiSpec,
};
use crate::TierSpecs;

/// Generate the data-model, API and UI specs of a validated program.
pub fn generate_specs(program: &ResolvedProgram) -> TierSpecs {
    let _span = tracing::debug_span!("generate_specs", app = %program.app.name).entered();

    let specs = TierSpecs {
        data_model: data_model_spec(program),
        api: api_spec(program),
        ui: ui_spec(program),
    };
    tracing::debug!(
        models = specs.data_model.models.len(),
        endpoints = specs.api.endpoints.len(),
        pages = specs.ui.pages.len(),
        "tier specs generated"
    );
    specs
}

// ===== Data model =====

fn data_model_spec(program: &ResolvedProgram) -> DataModelSpec {
    let models = program.models.iter().map(model_spec).collect();
    let relations: IndexVec<RelationEdgeId, RelationSpec> = program
        .relations
        .edges()
        .iter()
        .map(|edge| RelationSpec {
            source: FieldRef::new(edge.source, edge.field),
            target: edge.target,
            cardinality: edge.cardinality,
            foreign_key: edge.foreign_key.map(|fk| FieldRef::new(edge.source, fk.local)),
            references: edge.foreign_key.map(|fk| FieldRef::new(edge.target, fk.references)),
        })
        .collect();
    DataModelSpec { models, relations }
}

fn model_spec(model: &ResolvedModel) -> ModelSpec {
    ModelSpec {
        name: model.name.clone(),
        identifier: model.identifier,
        fields: model.fields.iter().map(field_spec).collect(),
    }
}

fn field_spec(field: &ResolvedField) -> FieldSpec {
    let kind = match field.ty {
        FieldType::Scalar(scalar) => FieldKind::Scalar { scalar },
        FieldType::Relation {
            target,
            cardinality,
        } => FieldKind::Relation {
            target,
            cardinality,
        },
    };
    FieldSpec {
        name: field.name.clone(),
        kind,
        optional: field.modifier == TypeModifier::Optional,
        list: field.modifier == TypeModifier::List,
        id: field.is_id,
        unique: field.is_unique,
        default: field.default.clone(),
        relation: field.relation,
    }
}

// ===== API =====

fn api_spec(program: &ResolvedProgram) -> ApiSpec {
    let endpoints: IndexVec<QueryId, EndpointSpec> = program
        .queries
        .iter_enumerated()
        .map(|(id, query)| endpoint_spec(program, id, query))
        .collect();
    ApiSpec {
        app_name: program.app.name.clone(),
        auth: program.app.auth.as_ref().map(auth_spec),
        endpoints,
    }
}

fn auth_spec(auth: &ResolvedAuth) -> AuthSpec {
    let user_field = |field| FieldRef::new(auth.user_model, field);
    AuthSpec {
        user_model: auth.user_model,
        id_field: user_field(auth.id_field),
        username_field: user_field(auth.username_field),
        password_field: user_field(auth.password_field),
        is_online_field: auth.is_online_field.map(user_field),
        last_active_field: auth.last_active_field.map(user_field),
        on_success_redirect: auth.on_success_redirect,
        on_failure_redirect: auth.on_failure_redirect,
    }
}

fn endpoint_spec(program: &ResolvedProgram, id: QueryId, query: &ResolvedQuery) -> EndpointSpec {
    let local = |field| FieldRef::new(query.model, field);
    let connects = query
        .connects
        .iter()
        .map(|connect| ConnectSpec {
            relation: local(connect.relation),
            edge: connect.edge,
            foreign_key: local(connect.foreign_key),
        })
        .collect();
    let ownership = query
        .ownership_path
        .as_ref()
        .map(|path| ownership_hops(program, path));

    EndpointSpec {
        query: id,
        name: query.name.clone(),
        variant: query.variant,
        model: query.model,
        http_method: HttpMethod::for_variant(query.variant),
        path: operation_path(&query.name),
        search: query.search.iter().copied().map(local).collect(),
        where_field: query.where_field.map(local),
        data: query.data.iter().copied().map(local).collect(),
        connects,
        ownership,
        permissions: query.permissions.permissions(),
    }
}

/// Ownership paths only follow owning edges, which always carry a foreign key.
fn ownership_hops(program: &ResolvedProgram, path: &[RelationEdgeId]) -> Vec<OwnershipHop> {
    path.iter()
        .filter_map(|&edge_id| {
            let edge = program.relations.edge(edge_id);
            edge.foreign_key.map(|fk| OwnershipHop {
                edge: edge_id,
                source: edge.source,
                foreign_key: FieldRef::new(edge.source, fk.local),
                target: edge.target,
            })
        })
        .collect()
}

// ===== UI =====

fn ui_spec(program: &ResolvedProgram) -> UiSpec {
    let components: IndexVec<ComponentId, ComponentSpec> =
        program.components.iter().map(component_spec).collect();
    let pages: IndexVec<PageId, PageSpec> = program.pages.iter().map(page_spec).collect();
    UiSpec {
        title: program.app.title.clone(),
        dependencies: program
            .app
            .dependencies
            .iter()
            .map(|(package, version)| DependencySpec {
                package: package.clone(),
                version: version.clone(),
            })
            .collect(),
        components,
        pages,
    }
}

fn component_spec(component: &ResolvedComponent) -> ComponentSpec {
    let body = match &component.body {
        ResolvedComponentBody::Bound {
            slot,
            query,
            inputs,
        } => ComponentBodySpec::Bound {
            slot: *slot,
            query: *query,
            inputs: inputs.iter().map(input_spec).collect(),
        },
        ResolvedComponentBody::Custom(custom) => ComponentBodySpec::Custom {
            imports: custom
                .imports
                .iter()
                .map(|import| import.value().clone())
                .collect(),
            dependencies: custom.dependencies.iter().map(dependency_spec).collect(),
            code: custom.code.clone(),
        },
    };
    ComponentSpec {
        name: component.name.clone(),
        variant: component.variant,
        permissions: component.permissions.permissions(),
        body,
    }
}

fn dependency_spec(dependency: &Spanned<Dependency>) -> DependencySpec {
    let dependency = dependency.value();
    DependencySpec {
        package: dependency.package.value().clone(),
        version: dependency.version.value().clone(),
    }
}

fn input_spec(input: &ResolvedInput) -> InputSpec {
    let default = input.default.as_ref().map(|default| match default {
        ResolvedDefault::Literal(value) => DefaultSpec::Literal {
            value: value.clone(),
        },
        ResolvedDefault::LoggedInUser {
            connect,
            user_field,
        } => DefaultSpec::LoggedInUser {
            connect: *connect,
            user_field: *user_field,
        },
    });
    InputSpec {
        field: input.field,
        kind: input.kind,
        default,
    }
}

fn page_spec(page: &ResolvedPage) -> PageSpec {
    PageSpec {
        name: page.name.clone(),
        route: page.route.clone(),
        permissions: page.permissions.permissions(),
        effective_permissions: page.effective_permissions.permissions(),
        render: page.render.iter().map(node_spec).collect(),
        components: page.components.clone(),
    }
}

fn node_spec(node: &ResolvedNode) -> NodeSpec {
    let nodes = |nodes: &[ResolvedNode]| -> Vec<NodeSpec> { nodes.iter().map(node_spec).collect() };
    match node {
        ResolvedNode::Element {
            tag,
            attributes,
            children,
        } => NodeSpec::Element {
            tag: tag.clone(),
            attributes: attributes.clone(),
            children: nodes(children),
        },
        ResolvedNode::Text(text) => NodeSpec::Text { text: text.clone() },
        ResolvedNode::Component { component, props } => NodeSpec::Component {
            component: *component,
            props: props.clone(),
        },
        ResolvedNode::ForEach { item, source, body } => NodeSpec::ForEach {
            item: item.clone(),
            source: source.clone(),
            body: nodes(body),
        },
        ResolvedNode::If {
            condition,
            then_branch,
            else_branch,
        } => NodeSpec::If {
            condition: condition.clone(),
            then_branch: nodes(then_branch),
            else_branch: nodes(else_branch),
        },
    }
}
