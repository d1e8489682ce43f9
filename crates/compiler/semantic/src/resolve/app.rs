//! # App Checks
//!
//! The `app` declaration is checked last: its auth block names fields of the user
//! model and its redirect targets name page routes.

use weft_compiler_diagnostics::Diagnostic;
use weft_compiler_syntax::{AppDecl, AuthDecl, Span, Spanned};

use super::shared::check_dependencies;
use super::{FieldLookup, ModelOutline, ResolveContext};
use crate::ids::{FieldId, PageId};
use crate::resolved::{ResolvedApp, ResolvedAuth};
use crate::types::ScalarType;

pub fn check_app(ctx: ResolveContext<'_, '_>) -> (Option<ResolvedApp>, Vec<Diagnostic>) {
    let _span = tracing::debug_span!("check_app").entered();
    let mut diagnostics = Vec::new();

    let Some(app) = ctx.registry.app() else {
        diagnostics.push(Diagnostic::shape(
            "program declares no app".to_string(),
            Span::from(0..0),
        ));
        return (None, diagnostics);
    };
    let app_decl: &AppDecl = app.value();
    let referrer = format!("app '{}'", app_decl.name.value());

    if app_decl.title.value().trim().is_empty() {
        diagnostics.push(Diagnostic::shape(
            format!("{referrer} has an empty title"),
            app_decl.title.span(),
        ));
    }
    check_dependencies(&app_decl.dependencies, &referrer, &mut diagnostics);

    let auth = app_decl
        .auth
        .as_ref()
        .and_then(|auth| check_auth(ctx, auth, &referrer, &mut diagnostics));

    if diagnostics.iter().any(Diagnostic::is_error) {
        return (None, diagnostics);
    }
    let resolved = ResolvedApp {
        name: app_decl.name.value().clone(),
        title: app_decl.title.value().clone(),
        dependencies: app_decl
            .dependencies
            .iter()
            .map(|dep| {
                let dep = dep.value();
                (dep.package.value().clone(), dep.version.value().clone())
            })
            .collect(),
        auth,
    };
    (Some(resolved), diagnostics)
}

/// A field the auth block requires, with the type it must have.
#[derive(Clone, Copy)]
enum AuthRole {
    Id,
    Username,
    Password,
    IsOnline,
    LastActive,
}

impl AuthRole {
    const fn label(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Username => "username",
            Self::Password => "password",
            Self::IsOnline => "isOnline",
            Self::LastActive => "lastActive",
        }
    }

    fn accepts(self, scalar: ScalarType) -> bool {
        match self {
            Self::Id => scalar.is_identifier_type(),
            Self::Username | Self::Password => scalar == ScalarType::String,
            Self::IsOnline => scalar == ScalarType::Boolean,
            Self::LastActive => scalar == ScalarType::DateTime,
        }
    }

    const fn expected(self) -> &'static str {
        match self {
            Self::Id => "Int or String",
            Self::Username | Self::Password => "String",
            Self::IsOnline => "Boolean",
            Self::LastActive => "DateTime",
        }
    }
}

fn check_auth(
    ctx: ResolveContext<'_, '_>,
    auth: &Spanned<AuthDecl>,
    referrer: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<ResolvedAuth> {
    let auth = auth.value();
    let auth_referrer = format!("auth configuration of {referrer}");

    let redirects = [
        &auth.on_auth_succeeded_redirect_to,
        &auth.on_auth_failed_redirect_to,
    ]
    .map(|target| {
        target
            .as_ref()
            .map(|route| check_redirect(ctx, route, &auth_referrer, diagnostics))
    });

    let Some(user_model) = ctx.registry.model_id(auth.user_model.value()) else {
        diagnostics.push(Diagnostic::unresolved(
            "model",
            auth.user_model.value(),
            &auth_referrer,
            auth.user_model.span(),
        ));
        return None;
    };
    let model = &ctx.models[user_model];

    let mut field = |role: AuthRole, name: &Spanned<String>| {
        check_auth_field(model, role, name, &auth_referrer, diagnostics)
    };
    let id_field = field(AuthRole::Id, &auth.id_field);
    let username_field = field(AuthRole::Username, &auth.username_field);
    let password_field = field(AuthRole::Password, &auth.password_field);
    let is_online_field = auth
        .is_online_field
        .as_ref()
        .map(|name| field(AuthRole::IsOnline, name));
    let last_active_field = auth
        .last_active_field
        .as_ref()
        .map(|name| field(AuthRole::LastActive, name));

    let [on_success_redirect, on_failure_redirect] = redirects;
    Some(ResolvedAuth {
        user_model,
        id_field: id_field?,
        username_field: username_field?,
        password_field: password_field?,
        is_online_field: settle(is_online_field)?,
        last_active_field: settle(last_active_field)?,
        on_success_redirect: settle(on_success_redirect)?,
        on_failure_redirect: settle(on_failure_redirect)?,
    })
}

/// An optional entry that was declared but did not resolve poisons the result.
fn settle<T>(entry: Option<Option<T>>) -> Option<Option<T>> {
    match entry {
        Some(None) => None,
        Some(Some(value)) => Some(Some(value)),
        None => Some(None),
    }
}

fn check_auth_field(
    model: &ModelOutline,
    role: AuthRole,
    name: &Spanned<String>,
    referrer: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<FieldId> {
    let label = role.label();
    let id = match model.lookup(name.value()) {
        FieldLookup::Found(id) => id,
        FieldLookup::Unresolved => return None,
        FieldLookup::Missing => {
            diagnostics.push(Diagnostic::auth_config(
                format!(
                    "{referrer} names {label} field '{}', which is not a field of user model '{}'",
                    name.value(),
                    model.name
                ),
                name.span(),
            ));
            return None;
        }
    };

    let field = model.field(id);
    let qualified = format!("{}.{}", model.name, field.name);
    if matches!(role, AuthRole::Id) && !field.is_id {
        diagnostics.push(Diagnostic::auth_config(
            format!("{referrer} uses '{qualified}' as id field, but it is not the identifier"),
            name.span(),
        ));
        return None;
    }
    if !field.ty.scalar().is_some_and(|scalar| role.accepts(scalar)) {
        diagnostics.push(Diagnostic::auth_config(
            format!(
                "{referrer} uses '{qualified}' as {label} field, which must be {}",
                role.expected()
            ),
            name.span(),
        ));
        return None;
    }
    Some(id)
}

fn check_redirect(
    ctx: ResolveContext<'_, '_>,
    route: &Spanned<String>,
    referrer: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<PageId> {
    let target = route.value();
    let page = target.starts_with('/').then(|| {
        ctx.registry
            .pages()
            .into_iter()
            .find(|(_, page)| page.value().route.value() == target)
            .map(|(id, _)| id)
    });
    match page.flatten() {
        Some(page) => Some(page),
        None => {
            diagnostics.push(Diagnostic::auth_config(
                format!("{referrer} redirects to '{target}', which is not the route of a declared page"),
                route.span(),
            ));
            None
        }
    }
}
