//! Field types, defaults and per-field attribute checks.

use weft_compiler_diagnostics::DiagnosticCode;
use weft_compiler_semantic::{FieldType, ScalarType};
use weft_compiler_syntax::build::*;
use weft_compiler_syntax::Literal;

use crate::*;

fn tag_with(extra: weft_compiler_syntax::FieldDecl) -> weft_compiler_syntax::ModelDecl {
    model("Tag", [field("id", "Int").id(), extra])
}

#[test]
fn test_default_of_wrong_type() {
    let decls = with_declaration(
        task_app(),
        tag_with(field("label", "String").with_default(Literal::Int(3))),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::Shape]);
    assert!(diagnostics.all()[0].message.contains("does not fit type String"));
}

#[test]
fn test_float_accepts_integer_default() {
    let decls = with_declaration(
        task_app(),
        tag_with(field("weight", "Float").with_default(Literal::Int(1))),
    );
    let resolved = assert_semantic_ok!(decls);
    let tag = &resolved.models[resolved.model_id("Tag").unwrap()];
    let weight = tag.field(tag.field_id("weight").unwrap());
    assert_eq!(weight.ty, FieldType::Scalar(ScalarType::Float));
    assert_eq!(weight.default, Some(Literal::Int(1)));
}

#[test]
fn test_datetime_now_default() {
    let decls = with_declaration(
        task_app(),
        tag_with(field("createdAt", "DateTime").with_default(Literal::Call("now".into()))),
    );
    assert_semantic_ok!(decls);
}

#[test]
fn test_unknown_field_type() {
    let decls = with_declaration(task_app(), tag_with(field("color", "Colour")));
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::NameResolution]);
    assert!(diagnostics.all()[0].message.contains("unknown type 'Colour'"));
}

#[test]
fn test_field_declared_twice() {
    let decls = with_declaration(
        task_app(),
        model(
            "Tag",
            [
                field("id", "Int").id(),
                field("label", "String"),
                field("label", "Int"),
            ],
        ),
    );
    let diagnostics = assert_semantic_err!(decls, [DiagnosticCode::Shape]);
    assert_eq!(diagnostics.all()[0].related_spans.len(), 1);
}

#[test]
fn test_relation_field_with_default() {
    // The default is a shape problem; the missing back-reference is reported too.
    let decls = with_declaration(
        task_app(),
        tag_with(field("owner", "User").with_default(Literal::Int(1))),
    );
    assert_semantic_err!(
        decls,
        [DiagnosticCode::Shape, DiagnosticCode::RelationIntegrity]
    );
}

#[test]
fn test_optional_and_list_modifiers_are_kept() {
    let resolved = assert_semantic_ok!(with_declaration(
        task_app(),
        tag_with(field("note", "String?"))
    ));
    let tag = &resolved.models[resolved.model_id("Tag").unwrap()];
    assert!(tag.field(tag.field_id("note").unwrap()).is_optional());

    let user = &resolved.models[resolved.model_id("User").unwrap()];
    let tasks = user.field(user.field_id("tasks").unwrap());
    assert!(tasks.ty.is_relation());
    assert!(!tasks.is_optional());
}
