use fbquery_core::{config::CompilerConfig, err::Result, qtree::QueryNode};

/// The query compiler compiles query trees into SQL that can be executed against the target server
pub trait QueryCompiler {
    type TQuery;
    type TCapabilities;

    /// Compiles the query into a dialect-specific query object
    fn compile_query(
        caps: &Self::TCapabilities,
        conf: &CompilerConfig,
        query: &QueryNode,
    ) -> Result<Self::TQuery>;
}
