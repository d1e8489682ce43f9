//! Shared fixtures for tier spec tests: the reference ToDo program and a helper
//! that resolves it.

use weft_compiler_semantic::{analyze_program, AnalysisOptions, ResolvedProgram};
use weft_compiler_syntax::build::*;
use weft_compiler_syntax::{ComponentVariant, Declaration, InputKind, Literal, QueryVariant};

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Users own tasks; tasks are listed, created, toggled and deleted.
pub fn todo_app() -> Vec<Declaration> {
    vec![
        app("todoApp", "ToDo")
            .with_auth(
                auth("User")
                    .on_success_redirect_to("/")
                    .on_failure_redirect_to("/login"),
            )
            .into(),
        model(
            "User",
            [
                field("id", "Int")
                    .id()
                    .with_default(Literal::Call("autoincrement".into())),
                field("username", "String").unique(),
                field("password", "String"),
                field("tasks", "Task[]"),
            ],
        )
        .into(),
        model(
            "Task",
            [
                field("id", "Int")
                    .id()
                    .with_default(Literal::Call("autoincrement".into())),
                field("description", "String"),
                field("isDone", "Boolean").with_default(Literal::Bool(false)),
                field("user", "User").relation("userId", "id"),
                field("userId", "Int"),
            ],
        )
        .into(),
        query("getTasks", QueryVariant::FindMany, "Task")
            .with_permission("IsAuth")
            .with_permission("OwnsRecord")
            .with_search(["description"])
            .into(),
        query("createTask", QueryVariant::Create, "Task")
            .with_permission("IsAuth")
            .with_data(["description", "isDone"])
            .with_connect("user", "userId")
            .into(),
        query("updateTask", QueryVariant::Update, "Task")
            .with_permission("IsAuth")
            .with_permission("OwnsRecord")
            .with_where("id")
            .with_data(["isDone"])
            .into(),
        query("deleteTask", QueryVariant::Delete, "Task")
            .with_permission("IsAuth")
            .with_where("id")
            .into(),
        component("NewTaskForm", ComponentVariant::Create)
            .action_query("createTask")
            .with_input(form_input("description", InputKind::TextInput))
            .with_input(form_input("isDone", InputKind::Checkbox).with_default(Literal::Bool(false)))
            .with_input(
                form_input("user", InputKind::RelationInput).connect_logged_in_user("id", "id"),
            )
            .into(),
        component("TaskList", ComponentVariant::FindMany)
            .find_query("getTasks")
            .into(),
        component("TaskToggle", ComponentVariant::Update)
            .action_query("updateTask")
            .with_input(form_input("isDone", InputKind::Checkbox))
            .into(),
        component("Clock", ComponentVariant::Custom)
            .with_import("useState", "react")
            .with_code("tsx", "export default function Clock() { return null; }")
            .into(),
        page("Main", "/")
            .with_permission("IsAuth")
            .with_node(element(
                "div",
                [
                    use_component("NewTaskForm"),
                    for_each("task", "tasks", [use_component("TaskToggle")]),
                    use_component("TaskList"),
                ],
            ))
            .into(),
        page("Login", "/login")
            .with_node(use_component("Clock"))
            .into(),
    ]
}

/// Analyze `declarations` and return the resolved program, panicking on errors.
#[track_caller]
pub fn resolve(declarations: Vec<Declaration>) -> ResolvedProgram {
    init_tracing();
    let analysis = analyze_program(&program(declarations), &AnalysisOptions::default());
    match analysis.resolved {
        Some(resolved) => resolved,
        None => panic!(
            "expected the program to resolve, got:\n{}",
            analysis
                .diagnostics
                .iter()
                .map(|diagnostic| format!("  {diagnostic}\n"))
                .collect::<String>()
        ),
    }
}
