//! Auth configuration: user model, credential fields, redirects.

use weft_compiler_diagnostics::DiagnosticCode;
use weft_compiler_syntax::build::*;
use weft_compiler_syntax::{AppDecl, AuthDecl};

use crate::*;

fn todo_app(auth: AuthDecl) -> AppDecl {
    app("todoApp", "ToDo").with_auth(auth)
}

fn default_auth() -> AuthDecl {
    auth("User")
        .on_success_redirect_to("/")
        .on_failure_redirect_to("/login")
}

#[test]
fn test_resolved_auth() {
    let resolved = assert_semantic_ok!(task_app());
    let auth = resolved.app.auth.as_ref().unwrap();
    let user = &resolved.models[auth.user_model];

    assert_eq!(user.name, "User");
    assert_eq!(user.field(auth.id_field).name, "id");
    assert_eq!(user.field(auth.username_field).name, "username");
    assert_eq!(user.field(auth.password_field).name, "password");
    assert_eq!(auth.is_online_field, None);
    assert_eq!(auth.on_success_redirect, resolved.page_id("Main"));
    assert_eq!(auth.on_failure_redirect, resolved.page_id("Login"));
}

#[test]
fn test_unknown_user_model() {
    let decls = with_declaration(task_app(), todo_app(auth("Account")));
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::NameResolution]);
    assert!(diagnostics.all()[0].message.contains("unknown model 'Account'"));
}

#[test]
fn test_missing_username_field() {
    let decls = with_declaration(
        task_app(),
        todo_app(default_auth().with_fields("id", "email", "password")),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::AuthConfig]);
    assert!(diagnostics.all()[0]
        .message
        .contains("username field 'email', which is not a field of user model 'User'"));
}

#[test]
fn test_password_must_be_string() {
    let decls = with_declaration(
        task_app(),
        todo_app(default_auth().with_fields("id", "username", "id")),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::AuthConfig]);
    assert!(diagnostics.all()[0].message.contains("as password field, which must be String"));
}

#[test]
fn test_id_field_must_be_identifier() {
    let decls = with_declaration(
        task_app(),
        todo_app(default_auth().with_fields("username", "username", "password")),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::AuthConfig]);
    assert!(diagnostics.all()[0].message.contains("it is not the identifier"));
}

#[test]
fn test_redirect_to_unknown_route() {
    let decls = with_declaration(
        task_app(),
        todo_app(
            auth("User")
                .on_success_redirect_to("/")
                .on_failure_redirect_to("/signin"),
        ),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::AuthConfig]);
    assert!(diagnostics.all()[0].message.contains("'/signin'"));
}

#[test]
fn test_redirect_must_be_a_route() {
    let decls = with_declaration(
        task_app(),
        todo_app(auth("User").on_success_redirect_to("Main")),
    );
    assert_semantic_err!(decls, [DiagnosticCode::AuthConfig]);
}

#[test]
fn test_presence_fields() {
    let user = model(
        "User",
        [
            field("id", "Int").id(),
            field("username", "String").unique(),
            field("password", "String"),
            field("isOnline", "Boolean"),
            field("lastActiveAt", "DateTime?"),
            field("tasks", "Task[]"),
        ],
    );
    let decls = with_declaration(task_app(), user.clone());
    let decls = with_declaration(
        decls,
        todo_app(
            default_auth()
                .with_is_online("isOnline")
                .with_last_active("lastActiveAt"),
        ),
    );
    let resolved = assert_semantic_ok!(decls);
    let auth = resolved.app.auth.as_ref().unwrap();
    let user_model = &resolved.models[auth.user_model];
    assert_eq!(user_model.field(auth.is_online_field.unwrap()).name, "isOnline");
    assert_eq!(
        user_model.field(auth.last_active_field.unwrap()).name,
        "lastActiveAt"
    );

    let decls = with_declaration(task_app(), user);
    let decls = with_declaration(
        decls,
        todo_app(
            default_auth()
                .with_is_online("lastActiveAt")
                .with_last_active("isOnline"),
        ),
    );
    assert_semantic_err!(
        decls,
        [DiagnosticCode::AuthConfig, DiagnosticCode::AuthConfig]
    );
}

#[test]
fn test_logged_in_user_default_without_auth() {
    let decls = with_declaration(task_app(), app("todoApp", "ToDo"));
    let analysis = run_analysis(decls);
    let codes = analysis.diagnostics.codes();

    // Four guarded queries, the LoggedInUser default and the guarded page.
    assert_eq!(codes.len(), 6, "{}", format_diagnostics(&analysis.diagnostics));
    assert!(codes.iter().all(|&code| code == DiagnosticCode::AuthConfig));
    assert!(analysis.diagnostics.all()[4].message.contains("LoggedInUser"));
}
