use serde::{Deserialize, Serialize};

use crate::common::query::QueryParam;

/// A string representation of a compiled query, used for logging and by statement observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedQuery {
    query: String,
    params: Vec<String>,
}

impl LoggedQuery {
    pub fn new(query: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            query: query.into(),
            params,
        }
    }

    pub fn new_query(query: impl Into<String>) -> Self {
        Self::new(query, vec![])
    }

    /// Creates a logged query from the sql and its bound parameters
    pub fn from_params(query: impl Into<String>, params: &[QueryParam]) -> Self {
        Self::new(query, params.iter().map(|p| p.logged()).collect())
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn params(&self) -> &Vec<String> {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use fbquery_core::data::{DataType, DataValue};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_logged_query_from_params() {
        let logged = LoggedQuery::from_params(
            "SELECT 1 FROM RDB$DATABASE WHERE ? = ?",
            &[
                QueryParam::dynamic2("id", DataType::Int32),
                QueryParam::constant(DataValue::Binary(vec![0xff])),
            ],
        );

        assert_eq!(logged.query(), "SELECT 1 FROM RDB$DATABASE WHERE ? = ?");
        assert_eq!(
            logged.params(),
            &vec!["@id: Int32".to_string(), "Binary([255])".to_string()]
        );
    }
}
