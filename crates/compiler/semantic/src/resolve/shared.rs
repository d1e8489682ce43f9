//! Checks shared by several tiers.

use rustc_hash::FxHashSet;
use weft_compiler_diagnostics::{Diagnostic, DiagnosticSink};
use weft_compiler_syntax::{ComponentBody, Dependency, Spanned};

use super::{AuthContext, FieldLookup, ModelOutline};
use crate::ids::{ComponentId, FieldId};
use crate::registry::DeclarationRegistry;
use crate::types::PermissionSet;

/// Look up a field referenced from `referrer`.
///
/// Missing fields are reported as shape errors. Fields whose type failed to
/// resolve were already reported and yield `None` silently.
pub fn lookup_field(
    model: &ModelOutline,
    name: &Spanned<String>,
    referrer: &str,
    sink: &mut impl DiagnosticSink,
) -> Option<FieldId> {
    match model.lookup(name.value()) {
        FieldLookup::Found(id) => Some(id),
        FieldLookup::Unresolved => None,
        FieldLookup::Missing => {
            sink.push(Diagnostic::shape(
                format!(
                    "{referrer} references field '{}' which is not a field of model '{}'",
                    name.value(),
                    model.name
                ),
                name.span(),
            ));
            None
        }
    }
}

/// Parse and check the permission tags of a query or page.
///
/// Unknown tags and `OwnsRecord` where it is not allowed are permission errors;
/// any tag without an auth configuration is one auth error.
pub fn check_permission_tags(
    tags: &[Spanned<String>],
    referrer: &str,
    auth: AuthContext,
    allow_owns_record: bool,
    sink: &mut impl DiagnosticSink,
) -> PermissionSet {
    let mut permissions = PermissionSet::empty();
    for tag in tags {
        match PermissionSet::from_tag(tag.value()) {
            Some(permission) if permission == PermissionSet::OWNS_RECORD && !allow_owns_record => {
                sink.push(Diagnostic::permission_config(
                    format!("{referrer} uses OwnsRecord, which only applies to queries"),
                    tag.span(),
                ));
            }
            Some(permission) => permissions |= permission,
            None => sink.push(Diagnostic::permission_config(
                format!(
                    "{referrer} uses unknown permission '{}'; expected IsAuth or OwnsRecord",
                    tag.value()
                ),
                tag.span(),
            )),
        }
    }

    if let Some(first) = tags.first() {
        if !auth.declared {
            sink.push(Diagnostic::auth_config(
                format!("{referrer} requires permissions but the app declares no auth"),
                first.span(),
            ));
        }
    }
    permissions
}

/// Check a `(package, version)` list: well-formed names, non-empty versions, no
/// package listed twice.
pub fn check_dependencies(
    dependencies: &[Spanned<Dependency>],
    referrer: &str,
    sink: &mut impl DiagnosticSink,
) {
    let mut seen = FxHashSet::default();
    for dependency in dependencies {
        let package = dependency.value().package.value();
        let version = dependency.value().version.value();
        if !is_package_name(package) {
            sink.push(Diagnostic::shape(
                format!("{referrer} depends on malformed package name '{package}'"),
                dependency.value().package.span(),
            ));
        } else if !seen.insert(package.as_str()) {
            sink.push(Diagnostic::shape(
                format!("{referrer} lists package '{package}' more than once"),
                dependency.span(),
            ));
        }
        if version.trim().is_empty() {
            sink.push(Diagnostic::shape(
                format!("{referrer} gives package '{package}' an empty version"),
                dependency.value().version.span(),
            ));
        }
    }
}

/// Package names as npm accepts them: optionally scoped, lowercase-friendly
/// characters, no whitespace.
fn is_package_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '/' | '-' | '_' | '.'))
}

/// Permissions a component surfaces: the known tags of its bound query.
pub fn surfaced_permissions(
    registry: &DeclarationRegistry<'_>,
    component: ComponentId,
) -> PermissionSet {
    let ComponentBody::Bound(bound) = &registry.component(component).value().body else {
        return PermissionSet::empty();
    };
    bound
        .binding
        .as_ref()
        .and_then(|binding| registry.query_id(binding.value().query.value()))
        .map(|query| {
            PermissionSet::from_tags(
                registry
                    .query(query)
                    .value()
                    .permissions
                    .iter()
                    .map(|tag| tag.value().as_str()),
            )
        })
        .unwrap_or_default()
}
