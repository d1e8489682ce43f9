//! End-to-end scenarios over the reference ToDo program.

use weft_compiler_diagnostics::DiagnosticCode;
use weft_compiler_syntax::build::*;
use weft_compiler_syntax::{ComponentVariant, InputKind, QueryVariant};

use crate::*;

#[test]
fn test_owned_task_list_compiles_cleanly() {
    let analysis = run_analysis(task_app());
    assert!(
        analysis.diagnostics.is_empty(),
        "{}",
        format_diagnostics(&analysis.diagnostics)
    );
    let resolved = analysis.resolved.unwrap();

    let get = &resolved.queries[resolved.query_id("getTasks").unwrap()];
    let path = get.ownership_path.as_ref().unwrap();
    let hop = resolved.relations.edge(path[0]);
    let source = &resolved.models[hop.source];
    assert_eq!(
        format!(
            "{}.{} -> {}",
            source.name,
            source.field(hop.field).name,
            resolved.models[hop.target].name
        ),
        "Task.user -> User"
    );
}

#[test]
fn test_removed_foreign_key_fails_once() {
    let decls = with_declaration(task_app(), task_model(false));
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::RelationIntegrity]);
    assert!(diagnostics.all()[0].message.contains("Task.user"));
}

#[test]
fn test_query_on_undeclared_model() {
    let decls = with_declaration(
        task_app(),
        query("createTask", QueryVariant::Create, "Post")
            .with_data(["title"])
            .with_permission("IsAuth"),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::NameResolution]);
    assert!(diagnostics.all()[0].message.contains("'Post'"));
}

#[test]
fn test_update_form_bound_to_create_query() {
    let decls = with_declaration(
        task_app(),
        component("TaskForm", ComponentVariant::Update)
            .action_query("createTask")
            .with_input(form_input("description", InputKind::TextInput)),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::Shape]);
    assert!(diagnostics.all()[0].message.starts_with("variant mismatch"));
}

#[test]
fn test_two_pages_on_root_route() {
    let decls = with_declaration(task_app(), page("Dashboard", "/"));
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::Shape]);
    assert!(diagnostics.all()[0].message.contains("route '/'"));
}

#[test]
fn test_independent_errors_are_all_reported() {
    let decls = with_declaration(task_app(), task_model(false));
    let decls = with_declaration(decls, page("Dashboard", "/"));
    let decls = with_declaration(
        decls,
        component("TaskForm", ComponentVariant::Update).action_query("createTask"),
    );
    assert_semantic_err!(
        decls,
        [
            DiagnosticCode::RelationIntegrity,
            DiagnosticCode::Shape,
            DiagnosticCode::Shape
        ]
    );
}
