//! # Weft Program Tree
//!
//! The tree of tagged declarations handed to the compiler core by the parser
//! front-end. Lexing and parsing live outside this workspace; this crate only
//! defines the shape of their output, plus [`build`] helpers for constructing
//! trees directly (tests, generators, embedding tools).

pub mod ast;
pub mod build;

pub use ast::*;
