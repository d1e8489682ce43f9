//! Render trees and page permissions.

use weft_compiler_diagnostics::DiagnosticCode;
use weft_compiler_semantic::{PermissionSet, ResolvedNode};
use weft_compiler_syntax::build::*;

use crate::*;

#[test]
fn test_unknown_component_in_render_tree() {
    let decls = with_declaration(
        task_app(),
        page("Stats", "/stats").with_node(element("section", [use_component("Chart")])),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::NameResolution]);
    assert!(diagnostics.all()[0].message.contains("unknown component 'Chart'"));
}

#[test]
fn test_unknown_component_in_else_branch() {
    let decls = with_declaration(
        task_app(),
        page("Stats", "/stats").with_node(if_then(
            "user",
            [use_component("TaskList")],
            [use_component("Chart"), use_component("Gauge")],
        )),
    );
    assert_semantic_err!(
        decls,
        [DiagnosticCode::NameResolution, DiagnosticCode::NameResolution]
    );
}

#[test]
fn test_owns_record_on_page() {
    let decls = with_declaration(
        task_app(),
        page("Main", "/")
            .with_permission("IsAuth")
            .with_permission("OwnsRecord")
            .with_node(use_component("TaskList")),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::PermissionConfig]);
    assert!(diagnostics.all()[0].message.contains("only applies to queries"));
}

#[test]
fn test_components_in_order_of_first_appearance() {
    let resolved = assert_semantic_ok!(task_app());
    let main = &resolved.pages[resolved.page_id("Main").unwrap()];

    let names: Vec<_> = main
        .components
        .iter()
        .map(|&component| resolved.components[component].name.as_str())
        .collect();
    assert_eq!(names, ["NewTaskForm", "TaskToggle", "TaskList"]);

    let [ResolvedNode::Element { tag, children, .. }] = main.render.as_slice() else {
        panic!("Main should render a single element");
    };
    assert_eq!(tag, "div");
    assert_eq!(children.len(), 3);
    assert!(matches!(&children[1], ResolvedNode::ForEach { body, .. } if body.len() == 1));
}

#[test]
fn test_repeated_component_listed_once() {
    let decls = with_declaration(
        task_app(),
        page("Login", "/login")
            .with_node(use_component("Clock"))
            .with_node(element("footer", [use_component("Clock")])),
    );
    let resolved = assert_semantic_ok!(decls);
    let login = &resolved.pages[resolved.page_id("Login").unwrap()];
    assert_eq!(login.components.len(), 1);
    assert_eq!(login.render.len(), 2);
}

#[test]
fn test_effective_permissions() {
    let resolved = assert_semantic_ok!(task_app());

    let main = &resolved.pages[resolved.page_id("Main").unwrap()];
    assert_eq!(main.permissions, PermissionSet::IS_AUTH);
    assert_eq!(
        main.effective_permissions,
        PermissionSet::IS_AUTH | PermissionSet::OWNS_RECORD
    );

    let login = &resolved.pages[resolved.page_id("Login").unwrap()];
    assert_eq!(login.permissions, PermissionSet::empty());
    assert_eq!(login.effective_permissions, PermissionSet::empty());
}

#[test]
fn test_public_page_inherits_component_permissions() {
    let decls = with_declaration(
        task_app(),
        page("Public", "/public").with_node(use_component("TaskList")),
    );
    let resolved = assert_semantic_ok!(decls);
    let public = &resolved.pages[resolved.page_id("Public").unwrap()];
    assert!(public.permissions.is_empty());
    assert!(public.effective_permissions.contains(PermissionSet::IS_AUTH));
}
