//! # Referential Closure
//!
//! Every handle stored in the specs must resolve inside the specs themselves, so
//! a generator can consume them without consulting the source program.

use rustc_hash::FxHashMap;
use weft_compiler_semantic::{
    ComponentId, FieldRef, ModelId, PageId, Permission, QueryId, RelationEdgeId,
};

use crate::api::EndpointSpec;
use crate::data_model::{DataModelSpec, FieldKind, FieldSpec, RelationSpec};
use crate::ui::{ComponentBodySpec, DefaultSpec, UiSpec};
use crate::TierSpecs;

impl TierSpecs {
    /// Check that every handle resolves and that cross-tier links agree.
    pub fn validate(&self) -> Result<(), String> {
        self.data_model.validate()?;
        self.validate_api()?;
        self.validate_ui()?;
        Ok(())
    }

    fn validate_api(&self) -> Result<(), String> {
        let data = &self.data_model;

        if let Some(auth) = &self.api.auth {
            data.model(auth.user_model)?;
            for field in [auth.id_field, auth.username_field, auth.password_field]
                .into_iter()
                .chain(auth.is_online_field)
                .chain(auth.last_active_field)
            {
                if field.model != auth.user_model {
                    return Err(format!("auth field {field:?} is not on the user model"));
                }
                data.field(field)?;
            }
            for page in [auth.on_success_redirect, auth.on_failure_redirect]
                .into_iter()
                .flatten()
            {
                self.page(page)?;
            }
        }

        let mut paths: FxHashMap<&str, &str> = FxHashMap::default();
        for (query_id, endpoint) in self.api.endpoints.iter_enumerated() {
            if let Some(first) = paths.insert(&endpoint.path, &endpoint.name) {
                return Err(format!(
                    "endpoints '{first}' and '{}' share path {}",
                    endpoint.name, endpoint.path
                ));
            }
            if endpoint.query != query_id {
                return Err(format!(
                    "endpoint '{}' stored at {query_id:?} claims {:?}",
                    endpoint.name, endpoint.query
                ));
            }
            self.validate_endpoint(endpoint)
                .map_err(|err| format!("endpoint '{}': {err}", endpoint.name))?;
        }
        Ok(())
    }

    fn validate_endpoint(&self, endpoint: &EndpointSpec) -> Result<(), String> {
        let data = &self.data_model;
        data.model(endpoint.model)?;

        for &field in endpoint
            .search
            .iter()
            .chain(&endpoint.data)
            .chain(&endpoint.where_field)
        {
            if field.model != endpoint.model {
                return Err(format!("field {field:?} is not on the endpoint's model"));
            }
            data.field(field)?;
        }

        for connect in &endpoint.connects {
            data.field(connect.relation)?;
            data.field(connect.foreign_key)?;
            let relation = data.relation(connect.edge)?;
            if relation.source != connect.relation {
                return Err(format!(
                    "connect through {:?} does not match its edge {:?}",
                    connect.relation, connect.edge
                ));
            }
            if relation.foreign_key != Some(connect.foreign_key) {
                return Err(format!(
                    "connect key {:?} is not the foreign key of {:?}",
                    connect.foreign_key, connect.edge
                ));
            }
        }

        let owns_record = endpoint.permissions.contains(&Permission::OwnsRecord);
        match (&endpoint.ownership, owns_record) {
            (Some(hops), true) => {
                let mut current = endpoint.model;
                for hop in hops {
                    let relation = data.relation(hop.edge)?;
                    if hop.source != current || relation.target != hop.target {
                        return Err(format!("ownership path breaks at {:?}", hop.edge));
                    }
                    if relation.foreign_key != Some(hop.foreign_key) {
                        return Err(format!("ownership hop {:?} has the wrong key", hop.edge));
                    }
                    current = hop.target;
                }
                let user_model = self
                    .api
                    .auth
                    .map(|auth| auth.user_model)
                    .ok_or_else(|| "ownership path without auth".to_string())?;
                if current != user_model {
                    return Err("ownership path does not end at the user model".to_string());
                }
            }
            (None, false) => {}
            (Some(_), false) => return Err("ownership path without OwnsRecord".to_string()),
            (None, true) => return Err("OwnsRecord without an ownership path".to_string()),
        }
        Ok(())
    }

    fn validate_ui(&self) -> Result<(), String> {
        let data = &self.data_model;
        let ui = &self.ui;

        for component in &ui.components {
            let ComponentBodySpec::Bound { query, inputs, .. } = &component.body else {
                continue;
            };
            let endpoint = self.endpoint(*query)?;
            for input in inputs {
                if input.field.model != endpoint.model {
                    return Err(format!(
                        "component '{}': input {:?} is not on the bound query's model",
                        component.name, input.field
                    ));
                }
                data.field(input.field)?;
                if let Some(DefaultSpec::LoggedInUser {
                    connect,
                    user_field,
                }) = &input.default
                {
                    data.field(*connect)?;
                    data.field(*user_field)?;
                }
            }
        }

        for page in &ui.pages {
            let mut referenced = Vec::new();
            page.render
                .iter()
                .for_each(|node| node.component_refs(&mut referenced));
            for component in referenced.iter().chain(&page.components) {
                ui.component(*component)
                    .map_err(|err| format!("page '{}': {err}", page.name))?;
            }
            if referenced.iter().any(|id| !page.components.contains(id)) {
                return Err(format!(
                    "page '{}' renders a component missing from its component list",
                    page.name
                ));
            }
        }
        Ok(())
    }

    fn endpoint(&self, id: QueryId) -> Result<&EndpointSpec, String> {
        self.api
            .endpoints
            .get(id)
            .ok_or_else(|| format!("dangling query handle {id:?}"))
    }

    fn page(&self, id: PageId) -> Result<(), String> {
        self.ui
            .pages
            .get(id)
            .map(|_| ())
            .ok_or_else(|| format!("dangling page handle {id:?}"))
    }
}

impl DataModelSpec {
    /// Check models, fields and relation edges against each other.
    pub fn validate(&self) -> Result<(), String> {
        for (model_id, model) in self.models.iter_enumerated() {
            let identifier = model
                .fields
                .get(model.identifier)
                .ok_or_else(|| format!("model '{}' has a dangling identifier", model.name))?;
            if !identifier.id {
                return Err(format!(
                    "identifier '{}' of model '{}' is not marked @id",
                    identifier.name, model.name
                ));
            }
            for (field_id, field) in model.fields.iter_enumerated() {
                self.validate_field(FieldRef::new(model_id, field_id), field)
                    .map_err(|err| format!("{}.{}: {err}", model.name, field.name))?;
            }
        }

        for (edge_id, relation) in self.relations.iter_enumerated() {
            let source = self.field(relation.source)?;
            if source.relation != Some(edge_id) {
                return Err(format!("edge {edge_id:?} is not linked from its field"));
            }
            self.model(relation.target)?;
            if let Some(foreign_key) = relation.foreign_key {
                if foreign_key.model != relation.source.model {
                    return Err(format!("foreign key of {edge_id:?} is not on its source"));
                }
                self.field(foreign_key)?;
            }
            if let Some(references) = relation.references {
                if references.model != relation.target {
                    return Err(format!("{edge_id:?} references outside its target"));
                }
                self.field(references)?;
            }
        }
        Ok(())
    }

    fn validate_field(&self, handle: FieldRef, field: &FieldSpec) -> Result<(), String> {
        match (field.kind, field.relation) {
            (FieldKind::Scalar { .. }, None) => Ok(()),
            (FieldKind::Scalar { .. }, Some(_)) => Err("scalar field linked to an edge".to_string()),
            (FieldKind::Relation { .. }, None) => Err("relation field without an edge".to_string()),
            (FieldKind::Relation { target, .. }, Some(edge)) => {
                self.model(target)?;
                let relation = self.relation(edge)?;
                if relation.source != handle || relation.target != target {
                    return Err(format!("edge {edge:?} does not match the field"));
                }
                Ok(())
            }
        }
    }

    fn model(&self, id: ModelId) -> Result<(), String> {
        self.models
            .get(id)
            .map(|_| ())
            .ok_or_else(|| format!("dangling model handle {id:?}"))
    }

    fn field(&self, field: FieldRef) -> Result<&FieldSpec, String> {
        self.models
            .get(field.model)
            .and_then(|model| model.fields.get(field.field))
            .ok_or_else(|| format!("dangling field handle {field:?}"))
    }

    fn relation(&self, id: RelationEdgeId) -> Result<&RelationSpec, String> {
        self.relations
            .get(id)
            .ok_or_else(|| format!("dangling relation handle {id:?}"))
    }
}

impl UiSpec {
    fn component(&self, id: ComponentId) -> Result<(), String> {
        self.components
            .get(id)
            .map(|_| ())
            .ok_or_else(|| format!("dangling component handle {id:?}"))
    }
}
