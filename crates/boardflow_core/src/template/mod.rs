//! Template registry and document generation engine.

pub mod builtin;
pub mod engine;
pub mod registry;
