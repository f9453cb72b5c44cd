use fbquery_compilers_base::{
    common::query::QueryParam,
    interface::{LoggedQuery, QueryCompiler},
};
use fbquery_core::{config::CompilerConfig, err::Result, qtree::QueryNode};
use serde::Serialize;

use crate::{capabilities::DialectCapabilities, renderer::render, visitor::translate};

/// A compiled Firebird statement, exactly as sent to the server
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirebirdQuery {
    pub query: String,
    /// The bound parameters in placeholder order
    pub params: Vec<QueryParam>,
}

impl FirebirdQuery {
    pub fn new(query: impl Into<String>, params: Vec<QueryParam>) -> Self {
        Self {
            query: query.into(),
            params,
        }
    }

    pub fn logged(&self) -> LoggedQuery {
        LoggedQuery::from_params(&self.query, &self.params)
    }
}

/// Query compiler for Firebird
pub struct FirebirdQueryCompiler;

impl QueryCompiler for FirebirdQueryCompiler {
    type TQuery = FirebirdQuery;
    type TCapabilities = DialectCapabilities;

    fn compile_query(
        caps: &DialectCapabilities,
        conf: &CompilerConfig,
        query: &QueryNode,
    ) -> Result<FirebirdQuery> {
        let select = translate(caps, query)?;
        let (sql, params) = render(caps, conf.placeholders, &select)?;

        Ok(FirebirdQuery::new(sql, params))
    }
}
