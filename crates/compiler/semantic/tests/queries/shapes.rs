//! Variant-specific body shapes of queries.

use weft_compiler_diagnostics::DiagnosticCode;
use weft_compiler_syntax::build::*;
use weft_compiler_syntax::QueryVariant;

use crate::*;

#[test]
fn test_unknown_target_model() {
    let decls = with_declaration(
        task_app(),
        query("createTask", QueryVariant::Create, "Post")
            .with_permission("IsAuth")
            .with_data(["description", "isDone"])
            .with_connect("user", "userId"),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::NameResolution]);
    assert!(diagnostics.all()[0].message.contains("unknown model 'Post'"));
}

#[test]
fn test_find_query_with_data_block() {
    let decls = with_declaration(
        task_app(),
        query("getTasks", QueryVariant::FindMany, "Task")
            .with_permission("IsAuth")
            .with_permission("OwnsRecord")
            .with_data(["description"]),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::Shape]);
    assert!(diagnostics.all()[0]
        .message
        .contains("of variant FindMany cannot declare a data block"));
}

#[test]
fn test_search_on_create() {
    let decls = with_declaration(
        task_app(),
        query("createTask", QueryVariant::Create, "Task")
            .with_permission("IsAuth")
            .with_search(["description"])
            .with_data(["description", "isDone"])
            .with_connect("user", "userId"),
    );
    assert_semantic_err!(decls, [DiagnosticCode::Shape]);
}

#[test]
fn test_delete_without_where() {
    let decls = with_declaration(
        task_app(),
        query("deleteTask", QueryVariant::Delete, "Task").with_permission("IsAuth"),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::Shape]);
    assert!(diagnostics.all()[0].message.contains("requires a where field"));
}

#[test]
fn test_update_where_must_be_unique() {
    let decls = with_declaration(
        task_app(),
        query("updateTask", QueryVariant::Update, "Task")
            .with_permission("IsAuth")
            .with_where("description")
            .with_data(["isDone"]),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::Shape]);
    assert!(diagnostics.all()[0]
        .message
        .contains("must be the identifier or a unique field"));
}

#[test]
fn test_delete_by_unique_field() {
    let decls = with_declaration(
        task_app(),
        query("deleteUser", QueryVariant::Delete, "User")
            .with_permission("IsAuth")
            .with_where("username"),
    );
    let resolved = assert_semantic_ok!(decls);
    let delete = &resolved.queries[resolved.query_id("deleteUser").unwrap()];
    let user = &resolved.models[delete.model];
    assert_eq!(user.field(delete.where_field.unwrap()).name, "username");
}

#[test]
fn test_create_without_data_block() {
    let decls = with_declaration(
        task_app(),
        query("quickCreate", QueryVariant::Create, "Task").with_permission("IsAuth"),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::Shape]);
    assert!(diagnostics.all()[0].message.contains("requires a data block"));
}

#[test]
fn test_data_field_not_on_model() {
    let decls = with_declaration(
        task_app(),
        query("createTask", QueryVariant::Create, "Task")
            .with_permission("IsAuth")
            .with_data(["description", "isDone", "priority"])
            .with_connect("user", "userId"),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::Shape]);
    assert!(diagnostics.all()[0].message.contains("'priority'"));
}

#[test]
fn test_data_field_listed_twice() {
    let decls = with_declaration(
        task_app(),
        query("retitleTask", QueryVariant::Update, "Task")
            .with_permission("IsAuth")
            .with_where("id")
            .with_data(["description", "description"]),
    );
    assert_semantic_err!(decls, [DiagnosticCode::Shape]);
}

#[test]
fn test_relation_in_data_fields() {
    let decls = with_declaration(
        task_app(),
        query("assignTask", QueryVariant::Update, "Task")
            .with_permission("IsAuth")
            .with_where("id")
            .with_data(["user"]),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::Shape]);
    assert!(diagnostics.all()[0].message.contains("connect it through relationFields"));
}

#[test]
fn test_connect_through_wrong_foreign_key() {
    let decls = with_declaration(
        task_app(),
        query("createTask", QueryVariant::Create, "Task")
            .with_permission("IsAuth")
            .with_data(["description", "isDone"])
            .with_connect("user", "ownerId"),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::Shape]);
    assert!(diagnostics.all()[0]
        .message
        .contains("its foreign key is 'userId'"));
}

#[test]
fn test_connect_on_side_without_foreign_key() {
    let decls = with_declaration(
        task_app(),
        query("signUp", QueryVariant::Create, "User")
            .with_data(["username", "password"])
            .with_connect("tasks", "taskId"),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::Shape]);
    assert!(diagnostics.all()[0]
        .message
        .contains("does not hold a foreign key"));
}

#[test]
fn test_connect_on_scalar() {
    let decls = with_declaration(
        task_app(),
        query("createTask", QueryVariant::Create, "Task")
            .with_permission("IsAuth")
            .with_data(["description"])
            .with_connect("isDone", "userId")
            .with_connect("user", "userId"),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::Shape]);
    assert!(diagnostics.all()[0].message.contains("not a relation field"));
}

#[test]
fn test_resolved_create_query() {
    let resolved = assert_semantic_ok!(task_app());
    let create = &resolved.queries[resolved.query_id("createTask").unwrap()];
    let task = &resolved.models[create.model];

    let data: Vec<_> = create
        .data
        .iter()
        .map(|&field| task.field(field).name.as_str())
        .collect();
    assert_eq!(data, ["description", "isDone"]);
    assert_eq!(create.connects.len(), 1);
    assert_eq!(task.field(create.connects[0].relation).name, "user");
    assert_eq!(task.field(create.connects[0].foreign_key).name, "userId");
    assert!(create.where_field.is_none());
    assert!(create.ownership_path.is_none());

    let get = &resolved.queries[resolved.query_id("getTasks").unwrap()];
    assert_eq!(get.search.len(), 1);
    assert_eq!(task.field(get.search[0]).name, "description");
}

#[test]
fn test_queries_sharing_an_operation_path() {
    let decls = with_declaration(
        task_app(),
        query("get_tasks", QueryVariant::FindMany, "Task").with_permission("IsAuth"),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::Shape]);
    let error = &diagnostics.all()[0];
    assert!(error.message.contains("'get_tasks'"), "{}", error.message);
    assert!(error.message.contains("/operations/get-tasks"), "{}", error.message);
    assert!(error.message.contains("'getTasks'"), "{}", error.message);
    assert_eq!(error.related_spans.len(), 1);
}
