//! Route shape and uniqueness.

use weft_compiler_diagnostics::DiagnosticCode;
use weft_compiler_syntax::build::*;

use crate::*;

#[test]
fn test_duplicate_route() {
    let decls = with_declaration(
        task_app(),
        page("Home", "/").with_node(text("Welcome")),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::Shape]);
    let duplicate = &diagnostics.all()[0];
    assert_eq!(
        duplicate.message,
        "route '/' of page 'Home' is already used by page 'Main'"
    );
    assert_eq!(duplicate.related_spans.len(), 1);
}

#[test]
fn test_every_reuse_points_at_first_page() {
    let decls = with_declaration(task_app(), page("Home", "/"));
    let decls = with_declaration(decls, page("Landing", "/"));
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::Shape, DiagnosticCode::Shape]);
    assert!(diagnostics
        .iter()
        .all(|diagnostic| diagnostic.message.ends_with("already used by page 'Main'")));
}

#[test]
fn test_route_without_leading_slash() {
    let decls = with_declaration(task_app(), page("About", "about"));
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::Shape]);
    assert!(diagnostics.all()[0].message.contains("does not start with '/'"));
}

#[test]
fn test_same_page_name_as_component() {
    // Names are scoped per declaration kind.
    let decls = with_declaration(
        task_app(),
        page("TaskList", "/tasks").with_node(use_component("TaskList")),
    );
    let resolved = assert_semantic_ok!(decls);
    assert_eq!(resolved.pages[resolved.page_id("TaskList").unwrap()].route, "/tasks");
}
