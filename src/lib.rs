//! Compiles declarative Snowflake resource states into DDL statements.
//!
//! Callers hold a desired resource state and a lifecycle action; this crate
//! emits the exact statement text to send to the warehouse. It never
//! executes SQL, diffs state, or talks to a connection: every entry point is
//! a pure function from a [`Urn`], an attribute map and a property schema to
//! one statement string with no trailing terminator.

pub mod error;
pub mod identifier;
pub mod lifecycle;
pub mod props;
pub mod resource;
pub mod sql;

pub use error::CompileError;
pub use identifier::{Fqn, Urn};
pub use lifecycle::{compile_create, compile_drop, compile_transfer, compile_update};
pub use props::{Attributes, Prop, Props};
pub use resource::ResourceType;
