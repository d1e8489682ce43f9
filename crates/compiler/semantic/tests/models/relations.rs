//! Relation fields, foreign keys and the relation graph.

use weft_compiler_diagnostics::DiagnosticCode;
use weft_compiler_semantic::{Cardinality, OwnershipSearch};
use weft_compiler_syntax::build::*;

use crate::*;

fn task_with_user_relation(foreign_key_type: &str, references: &str) -> weft_compiler_syntax::ModelDecl {
    model(
        "Task",
        [
            field("id", "Int").id(),
            field("description", "String"),
            field("isDone", "Boolean"),
            field("user", "User").relation("userId", references),
            field("userId", foreign_key_type),
        ],
    )
}

#[test]
fn test_resolved_relation_graph() {
    let resolved = assert_semantic_ok!(task_app());

    let user = resolved.model_id("User").unwrap();
    let task = resolved.model_id("Task").unwrap();
    assert_eq!(resolved.relations.edges().len(), 2);

    let task_user = resolved.models[task].field_id("user").unwrap();
    let edge_id = resolved.relations.edge_of(task, task_user).unwrap();
    let edge = resolved.relations.edge(edge_id);
    assert!(edge.is_owning());
    assert_eq!(edge.target, user);
    assert_eq!(edge.cardinality, Cardinality::One);
    let foreign_key = edge.foreign_key.unwrap();
    assert_eq!(resolved.models[task].field(foreign_key.local).name, "userId");
    assert_eq!(resolved.models[user].field(foreign_key.references).name, "id");
    assert_eq!(
        resolved.models[task].field(task_user).relation,
        Some(edge_id)
    );

    let user_tasks = resolved.models[user].field_id("tasks").unwrap();
    let back = resolved.relations.edge_of(user, user_tasks).unwrap();
    assert!(!resolved.relations.edge(back).is_owning());
    assert_eq!(resolved.relations.edge(back).cardinality, Cardinality::Many);
}

#[test]
fn test_missing_foreign_key_field() {
    let decls = with_declaration(task_app(), task_model(false));
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::RelationIntegrity]);
    let message = &diagnostics.all()[0].message;
    assert!(message.contains("Task.user"), "{message}");
    assert!(message.contains("userId"), "{message}");
}

#[test]
fn test_misspelled_relation_target_is_one_error() {
    let decls = with_declaration(
        task_app(),
        model(
            "Task",
            [
                field("id", "Int").id(),
                field("description", "String"),
                field("isDone", "Boolean"),
                field("user", "Usr").relation("userId", "id"),
                field("userId", "Int"),
            ],
        ),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::NameResolution]);
    assert!(diagnostics.all()[0].message.contains("Usr"));
}

#[test]
fn test_foreign_key_type_mismatch() {
    let decls = with_declaration(task_app(), task_with_user_relation("String", "id"));
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::RelationIntegrity]);
    assert!(diagnostics.all()[0].message.contains("of type String"));
}

#[test]
fn test_reference_must_be_identifier() {
    let decls = with_declaration(task_app(), task_with_user_relation("String", "username"));
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::RelationIntegrity]);
    assert!(diagnostics.all()[0].message.contains("not the identifier of 'User'"));
}

#[test]
fn test_reference_to_missing_field() {
    let decls = with_declaration(task_app(), task_with_user_relation("Int", "uid"));
    assert_semantic_err!(decls, [DiagnosticCode::RelationIntegrity]);
}

#[test]
fn test_relation_attribute_on_scalar() {
    let decls = with_declaration(
        task_app(),
        model(
            "Tag",
            [
                field("id", "Int").id(),
                field("ownerId", "Int").relation("ownerId", "id"),
            ],
        ),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::RelationIntegrity]);
    assert!(diagnostics.all()[0].message.contains("scalar type Int"));
}

#[test]
fn test_list_relation_with_attribute() {
    let decls = with_declaration(
        task_app(),
        model(
            "User",
            [
                field("id", "Int").id(),
                field("username", "String").unique(),
                field("password", "String"),
                field("tasks", "Task[]").relation("taskId", "id"),
            ],
        ),
    );
    assert_semantic_err!(decls, [DiagnosticCode::RelationIntegrity]);
}

#[test]
fn test_list_relation_without_back_reference() {
    let decls = with_declaration(
        task_app(),
        model("Tag", [field("id", "Int").id(), field("tasks", "Task[]")]),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::RelationIntegrity]);
    assert!(diagnostics.all()[0].message.contains("Tag.tasks"));
}

#[test]
fn test_many_to_many_is_rejected() {
    let decls = with_declaration(
        task_app(),
        model(
            "Task",
            [
                field("id", "Int").id(),
                field("description", "String"),
                field("isDone", "Boolean"),
                field("user", "User").relation("userId", "id"),
                field("userId", "Int"),
                field("tags", "Tag[]"),
            ],
        ),
    );
    let decls = with_declaration(
        decls,
        model("Tag", [field("id", "Int").id(), field("tasks", "Task[]")]),
    );
    assert_semantic_err!(
        decls,
        [
            DiagnosticCode::RelationIntegrity,
            DiagnosticCode::RelationIntegrity
        ]
    );
}

#[test]
fn test_self_relation() {
    let decls = with_declaration(
        task_app(),
        model(
            "Employee",
            [
                field("id", "Int").id(),
                field("managerId", "Int?"),
                field("manager", "Employee?").relation("managerId", "id"),
                field("reports", "Employee[]"),
            ],
        ),
    );
    let resolved = assert_semantic_ok!(decls);

    let employee = resolved.model_id("Employee").unwrap();
    let outgoing = resolved.relations.outgoing(employee);
    assert_eq!(outgoing.len(), 2);
    assert!(outgoing
        .iter()
        .all(|&edge| resolved.relations.edge(edge).target == employee));
    assert_eq!(
        resolved.relations.ownership_path(employee, employee),
        OwnershipSearch::Found(Vec::new())
    );
}

#[test]
fn test_one_to_one_back_reference() {
    let decls = with_declaration(
        task_app(),
        model(
            "Profile",
            [
                field("id", "Int").id(),
                field("bio", "String?"),
                field("ownerId", "Int").unique(),
                field("owner", "User").relation("ownerId", "id"),
            ],
        ),
    );
    let decls = with_declaration(
        decls,
        model(
            "User",
            [
                field("id", "Int").id(),
                field("username", "String").unique(),
                field("password", "String"),
                field("tasks", "Task[]"),
                field("profile", "Profile?"),
            ],
        ),
    );
    let resolved = assert_semantic_ok!(decls);

    let user = resolved.model_id("User").unwrap();
    let profile = resolved.model_id("Profile").unwrap();
    assert!(matches!(
        resolved.relations.ownership_path(profile, user),
        OwnershipSearch::Found(path) if path.len() == 1
    ));
}
