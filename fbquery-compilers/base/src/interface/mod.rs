mod observer;
mod query;
mod query_compiler;

pub use observer::*;
pub use query::*;
pub use query_compiler::*;
