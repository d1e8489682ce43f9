//! The app declaration and duplicate declarations.

use weft_compiler_diagnostics::DiagnosticCode;
use weft_compiler_syntax::build::*;
use weft_compiler_syntax::{ComponentVariant, QueryVariant};

use crate::*;

#[test]
fn test_program_without_app() {
    let decls = vec![model("Tag", [field("id", "Int").id()]).into()];
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::Shape]);
    assert_eq!(diagnostics.all()[0].message, "program declares no app");
}

#[test]
fn test_empty_title() {
    let decls = with_declaration(
        task_app(),
        app("todoApp", "  ").with_auth(
            auth("User")
                .on_success_redirect_to("/")
                .on_failure_redirect_to("/login"),
        ),
    );
    assert_semantic_err!(decls, [DiagnosticCode::Shape]);
}

#[test]
fn test_second_app_is_a_duplicate() {
    let mut decls = task_app();
    decls.push(app("otherApp", "Other").into());
    let analysis = run_analysis(decls);

    assert!(analysis.aborted);
    assert!(analysis.resolved.is_none());
    assert_eq!(
        analysis.diagnostics.codes(),
        vec![DiagnosticCode::DuplicateDeclaration]
    );
}

#[test]
fn test_every_duplicate_is_reported() {
    let mut decls = task_app();
    decls.push(task_model(true).into());
    decls.push(page("Main", "/main").into());
    let diagnostics = assert_semantic_err!(
        decls,
        [
            DiagnosticCode::DuplicateDeclaration,
            DiagnosticCode::DuplicateDeclaration
        ]
    );
    assert!(diagnostics.all()[0].message.starts_with("model 'Task'"));
    assert!(diagnostics.all()[1].message.starts_with("page 'Main'"));
}

#[test]
fn test_duplicates_stop_the_analysis() {
    // The unknown model would be a resolution error, but duplicates abort first.
    let mut decls = with_declaration(
        task_app(),
        query("getPosts", QueryVariant::FindMany, "Post"),
    );
    decls.push(component("Clock", ComponentVariant::Custom).into());
    assert_semantic_err!(decls, [DiagnosticCode::DuplicateDeclaration]);
}

#[test]
fn test_app_dependencies() {
    let decls = with_declaration(
        task_app(),
        app("todoApp", "ToDo")
            .with_auth(
                auth("User")
                    .on_success_redirect_to("/")
                    .on_failure_redirect_to("/login"),
            )
            .with_dependency("react-query", "^3.39.0")
            .with_dependency("zod", "3.22.4"),
    );
    let resolved = assert_semantic_ok!(decls);
    assert_eq!(resolved.app.name, "todoApp");
    assert_eq!(resolved.app.title, "ToDo");
    assert_eq!(
        resolved.app.dependencies,
        [
            ("react-query".to_string(), "^3.39.0".to_string()),
            ("zod".to_string(), "3.22.4".to_string()),
        ]
    );
}

#[test]
fn test_app_dependency_listed_twice() {
    let decls = with_declaration(
        task_app(),
        app("todoApp", "ToDo")
            .with_auth(
                auth("User")
                    .on_success_redirect_to("/")
                    .on_failure_redirect_to("/login"),
            )
            .with_dependency("zod", "3.22.4")
            .with_dependency("zod", "3.23.0"),
    );
    assert_semantic_err!(decls, [DiagnosticCode::Shape]);
}

#[test]
fn test_app_without_auth_and_without_tags() {
    let decls = vec![
        app("notes", "Notes").into(),
        model("Note", [field("id", "Int").id(), field("body", "String")]).into(),
        query("getNotes", QueryVariant::FindMany, "Note").into(),
        page("Home", "/").into(),
    ];
    let resolved = assert_semantic_ok!(decls);
    assert!(resolved.app.auth.is_none());
    assert_eq!(resolved.queries.len(), 1);
}
