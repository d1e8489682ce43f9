pub mod defaults;
pub mod relations;
