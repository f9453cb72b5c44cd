use serde::{Deserialize, Serialize};

use super::{QueryNode, SubNode};

/// A table of the database, the root of every sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// The table name
    pub table: String,
    /// The alias used to refer to the table from nested expressions
    pub alias: Option<String>,
}

impl Source {
    pub fn new(table: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            table: table.into(),
            alias,
        }
    }

    /// Gets the alias of the source.
    /// If none was given this is the lowercased first letter of the table.
    pub fn alias(&self) -> String {
        if let Some(alias) = &self.alias {
            return alias.clone();
        }

        match self.table.chars().next() {
            Some(c) if c.is_alphabetic() => c.to_lowercase().collect(),
            _ => "t".into(),
        }
    }
}

/// Restricts the rows of a sequence to those matching the predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub source: SubNode,
    pub predicate: SubNode,
}

impl Filter {
    pub fn new(source: QueryNode, predicate: QueryNode) -> Self {
        Self {
            source: Box::new(source),
            predicate: Box::new(predicate),
        }
    }
}

/// Maps each row of a sequence to a list of aliased expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub source: SubNode,
    /// The list of column expressions indexed by their aliases
    pub cols: Vec<(String, QueryNode)>,
}

impl Project {
    pub fn new(source: QueryNode, cols: Vec<(String, QueryNode)>) -> Self {
        Self {
            source: Box::new(source),
            cols,
        }
    }
}

/// Bypasses a number of rows of a sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skip {
    pub source: SubNode,
    /// The number of rows to skip, an integer constant or parameter
    pub count: SubNode,
}

impl Skip {
    pub fn new(source: QueryNode, count: QueryNode) -> Self {
        Self {
            source: Box::new(source),
            count: Box::new(count),
        }
    }
}

/// Limits a sequence to a number of rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Take {
    pub source: SubNode,
    /// The number of rows to return, an integer constant or parameter
    pub count: SubNode,
}

impl Take {
    pub fn new(source: QueryNode, count: QueryNode) -> Self {
        Self {
            source: Box::new(source),
            count: Box::new(count),
        }
    }
}

/// Orders a sequence by a key.
/// Nested orderings append keys, so the innermost node is the primary key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub source: SubNode,
    pub key: SubNode,
    pub r#type: OrderingType,
}

impl OrderBy {
    pub fn new(source: QueryNode, key: QueryNode, r#type: OrderingType) -> Self {
        Self {
            source: Box::new(source),
            key: Box::new(key),
            r#type,
        }
    }
}

/// Type of ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderingType {
    Asc,
    Desc,
}

/// Tests whether a sequence has any rows, optionally matching a predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Any {
    pub source: SubNode,
    pub predicate: Option<SubNode>,
}

impl Any {
    pub fn new(source: QueryNode, predicate: Option<QueryNode>) -> Self {
        Self {
            source: Box::new(source),
            predicate: predicate.map(Box::new),
        }
    }
}
