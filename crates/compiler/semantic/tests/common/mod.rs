//! Common test utilities for semantic analysis tests
//!
//! This module contains all shared test infrastructure including:
//! - The reference ToDo program every test starts from
//! - Helpers to swap or drop declarations of that program
//! - Diagnostic formatting and the assertion implementations behind the macros

use weft_compiler_diagnostics::{DiagnosticCode, DiagnosticCollection};
use weft_compiler_semantic::{analyze_program, Analysis, AnalysisOptions, ResolvedProgram};
use weft_compiler_syntax::build::*;
use weft_compiler_syntax::{
    ComponentVariant, Declaration, DeclarationKind, InputKind, Literal, Program, QueryVariant,
};

// ===== Tracing =====

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

// ===== Reference Program =====

/// A complete ToDo application: users own tasks, tasks are listed, created,
/// toggled and deleted through auth-guarded queries.
pub fn task_app() -> Vec<Declaration> {
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
        task_model(true).into(),
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

/// The `Task` model of [`task_app`], optionally without its `userId` foreign key.
pub fn task_model(with_foreign_key: bool) -> weft_compiler_syntax::ModelDecl {
    let mut fields = vec![
        field("id", "Int")
            .id()
            .with_default(Literal::Call("autoincrement".into())),
        field("description", "String"),
        field("isDone", "Boolean").with_default(Literal::Bool(false)),
        field("user", "User").relation("userId", "id"),
    ];
    if with_foreign_key {
        fields.push(field("userId", "Int"));
    }
    model("Task", fields)
}

// ===== Program Editing =====

/// Replace the declaration of the same kind and name, or append it.
pub fn with_declaration(
    mut declarations: Vec<Declaration>,
    declaration: impl Into<Declaration>,
) -> Vec<Declaration> {
    let declaration = declaration.into();
    let position = declarations.iter().position(|existing| {
        existing.kind() == declaration.kind()
            && existing.name().value() == declaration.name().value()
    });
    match position {
        Some(index) => declarations[index] = declaration,
        None => declarations.push(declaration),
    }
    declarations
}

/// Drop the declaration of `kind` named `name`.
pub fn without(
    declarations: Vec<Declaration>,
    kind: DeclarationKind,
    name: &str,
) -> Vec<Declaration> {
    declarations
        .into_iter()
        .filter(|decl| !(decl.kind() == kind && decl.name().value() == name))
        .collect()
}

// ===== Validation and Diagnostic Utilities =====

pub fn run_analysis(declarations: Vec<Declaration>) -> Analysis {
    init_tracing();
    analyze_program(&program(declarations), &AnalysisOptions::default())
}

pub fn run_analysis_on(program: &Program, parallel: bool) -> Analysis {
    init_tracing();
    analyze_program(program, &AnalysisOptions { parallel })
}

/// One line per diagnostic, for failure messages.
pub fn format_diagnostics(diagnostics: &DiagnosticCollection) -> String {
    if diagnostics.is_empty() {
        return "No diagnostics found.\n".to_string();
    }
    let mut result = format!("Found {} diagnostic(s):\n", diagnostics.len());
    for diagnostic in diagnostics {
        result.push_str(&format!("  {diagnostic}\n"));
    }
    result
}

// ===== Assertion Implementation Functions =====

/// Assert that a program analyses without errors and return its resolution.
/// Warnings are allowed.
#[track_caller]
pub fn assert_semantic_ok_impl(declarations: Vec<Declaration>, test_name: &str) -> ResolvedProgram {
    let analysis = run_analysis(declarations);
    if analysis.has_errors() {
        panic!(
            "{test_name}: expected successful semantic analysis, but got:\n{}",
            format_diagnostics(&analysis.diagnostics)
        );
    }
    analysis
        .resolved
        .unwrap_or_else(|| panic!("{test_name}: no errors but no resolved program"))
}

/// Assert that a program fails with exactly the given diagnostic codes, in order.
#[track_caller]
pub fn assert_semantic_err_impl(
    declarations: Vec<Declaration>,
    expected: &[DiagnosticCode],
    test_name: &str,
) -> DiagnosticCollection {
    let analysis = run_analysis(declarations);
    if analysis.resolved.is_some() {
        panic!("{test_name}: a failing analysis must not produce a resolved program");
    }
    let codes: Vec<_> = analysis
        .diagnostics
        .errors()
        .iter()
        .map(|diagnostic| diagnostic.code)
        .collect();
    if codes != expected {
        panic!(
            "{test_name}: expected error codes {expected:?}, got {codes:?}\n{}",
            format_diagnostics(&analysis.diagnostics)
        );
    }
    analysis.diagnostics
}
