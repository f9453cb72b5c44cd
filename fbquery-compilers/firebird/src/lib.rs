//! Compiles query trees into Firebird sql.
//!
//! The visitor translates the tree into an intermediate sql AST using the
//! function mapping table and the range compiler. The renderer then writes
//! the AST out as sql text plus the bound parameters.

pub mod capabilities;
pub mod fragment;
pub mod functions;
pub mod range;
pub mod renderer;
pub mod visitor;

mod query_compiler;
pub use query_compiler::*;
mod session;
pub use session::*;

pub use capabilities::{capabilities_for, DialectCapabilities, Feature};
