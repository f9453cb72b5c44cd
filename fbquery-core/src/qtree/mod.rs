// The query tree is the language-embedded query (filters, projections, paging, ...)
// handed to the compilers. It is built by the ORM layer, or deserialized from yaml/json.

mod expr;
mod query;

pub use expr::*;
pub use query::*;

use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

use crate::data::DataValue;

/// A node of the query tree
#[derive(Debug, Clone, PartialEq, EnumAsInner, Serialize, Deserialize)]
pub enum QueryNode {
    Source(Source),
    Filter(Filter),
    Project(Project),
    Skip(Skip),
    Take(Take),
    OrderBy(OrderBy),
    Any(Any),
    MemberAccess(MemberAccess),
    MethodCall(MethodCall),
    Constant(DataValue),
    Parameter(Parameter),
    BinaryOp(BinaryOp),
    UnaryOp(UnaryOp),
}

pub type SubNode = Box<QueryNode>;

impl QueryNode {
    /// Whether the node yields a sequence of rows rather than a scalar
    pub fn is_sequence(&self) -> bool {
        matches!(
            self,
            Self::Source(_)
                | Self::Filter(_)
                | Self::Project(_)
                | Self::Skip(_)
                | Self::Take(_)
                | Self::OrderBy(_)
        )
    }

    /// Returns a short name of the node kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Source(_) => "Source",
            Self::Filter(_) => "Filter",
            Self::Project(_) => "Project",
            Self::Skip(_) => "Skip",
            Self::Take(_) => "Take",
            Self::OrderBy(_) => "OrderBy",
            Self::Any(_) => "Any",
            Self::MemberAccess(_) => "MemberAccess",
            Self::MethodCall(_) => "MethodCall",
            Self::Constant(_) => "Constant",
            Self::Parameter(_) => "Parameter",
            Self::BinaryOp(_) => "BinaryOp",
            Self::UnaryOp(_) => "UnaryOp",
        }
    }

    pub fn filter(self, predicate: QueryNode) -> Self {
        Self::Filter(Filter::new(self, predicate))
    }

    pub fn project<S: Into<String>>(self, cols: impl IntoIterator<Item = (S, QueryNode)>) -> Self {
        Self::Project(Project::new(
            self,
            cols.into_iter().map(|(a, c)| (a.into(), c)).collect(),
        ))
    }

    pub fn skip(self, count: QueryNode) -> Self {
        Self::Skip(Skip::new(self, count))
    }

    pub fn take(self, count: QueryNode) -> Self {
        Self::Take(Take::new(self, count))
    }

    pub fn order_by(self, key: QueryNode, r#type: OrderingType) -> Self {
        Self::OrderBy(OrderBy::new(self, key, r#type))
    }

    pub fn any(self, predicate: Option<QueryNode>) -> Self {
        Self::Any(Any::new(self, predicate))
    }

    /// Accesses a value member of this node, eg `x.Length`
    pub fn member(self, prop: Property) -> Self {
        Self::MemberAccess(MemberAccess::new(Some(self), Member::Property(prop)))
    }

    /// Calls a method on this node, eg `x.Substring(1, 2)`
    pub fn call(self, method: Method, args: Vec<QueryNode>) -> Self {
        Self::MethodCall(MethodCall::new(Some(self), method, args))
    }
}

/// A table of the database
pub fn source(table: impl Into<String>) -> QueryNode {
    QueryNode::Source(Source::new(table, None))
}

/// A table of the database with an explicit alias
pub fn source_as(table: impl Into<String>, alias: impl Into<String>) -> QueryNode {
    QueryNode::Source(Source::new(table, Some(alias.into())))
}

/// A column of the innermost row in scope
pub fn col(name: impl Into<String>) -> QueryNode {
    QueryNode::MemberAccess(MemberAccess::new(
        None,
        Member::Column(ColumnRef::new(None, name)),
    ))
}

/// A column of the source with the supplied alias
pub fn col_of(alias: impl Into<String>, name: impl Into<String>) -> QueryNode {
    QueryNode::MemberAccess(MemberAccess::new(
        None,
        Member::Column(ColumnRef::new(Some(alias.into()), name)),
    ))
}

/// A static value member, eg `DateTime.Now`
pub fn static_member(prop: Property) -> QueryNode {
    QueryNode::MemberAccess(MemberAccess::new(None, Member::Property(prop)))
}

/// A static method call, eg `string.IsNullOrEmpty(x)`
pub fn static_call(method: Method, args: Vec<QueryNode>) -> QueryNode {
    QueryNode::MethodCall(MethodCall::new(None, method, args))
}

pub fn constant(val: impl Into<DataValue>) -> QueryNode {
    QueryNode::Constant(val.into())
}

pub fn null() -> QueryNode {
    QueryNode::Constant(DataValue::Null)
}

pub fn param(name: impl Into<String>, r#type: crate::data::DataType) -> QueryNode {
    QueryNode::Parameter(Parameter::new(name, r#type))
}

pub fn binary(left: QueryNode, r#type: BinaryOpType, right: QueryNode) -> QueryNode {
    QueryNode::BinaryOp(BinaryOp::new(left, r#type, right))
}

pub fn unary(r#type: UnaryOpType, expr: QueryNode) -> QueryNode {
    QueryNode::UnaryOp(UnaryOp::new(r#type, expr))
}

pub fn equal(left: QueryNode, right: QueryNode) -> QueryNode {
    binary(left, BinaryOpType::Equal, right)
}

pub fn not_equal(left: QueryNode, right: QueryNode) -> QueryNode {
    binary(left, BinaryOpType::NotEqual, right)
}

pub fn and(left: QueryNode, right: QueryNode) -> QueryNode {
    binary(left, BinaryOpType::LogicalAnd, right)
}

pub fn or(left: QueryNode, right: QueryNode) -> QueryNode {
    binary(left, BinaryOpType::LogicalOr, right)
}

pub fn not(expr: QueryNode) -> QueryNode {
    unary(UnaryOpType::LogicalNot, expr)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::data::DataType;

    use super::*;

    #[test]
    fn test_query_node_builders() {
        let node = source("MON$ATTACHMENTS")
            .filter(not_equal(
                col("MON$ATTACHMENT_NAME").call(Method::Trim, vec![]),
                constant(""),
            ))
            .take(constant(3));

        let take = node.as_take().unwrap();
        assert_eq!(*take.count, QueryNode::Constant(DataValue::Int32(3)));
        let filter = take.source.as_filter().unwrap();
        assert_eq!(
            filter.source.as_source().unwrap(),
            &Source::new("MON$ATTACHMENTS", None)
        );
        assert!(filter.predicate.is_binary_op());
    }

    #[test]
    fn test_query_node_is_sequence() {
        assert!(source("A").is_sequence());
        assert!(source("A").skip(constant(1)).is_sequence());
        assert!(!source("A").any(None).is_sequence());
        assert!(!col("X").is_sequence());
        assert!(!param("p", DataType::Int32).is_sequence());
    }

    #[test]
    fn test_query_node_deserialize_json() {
        let json = r#"{
            "Filter": {
                "source": {"Source": {"table": "MON$ATTACHMENTS"}},
                "predicate": {
                    "BinaryOp": {
                        "left": {"MemberAccess": {"member": {"Column": {"name": "MON$ATTACHMENT_ID"}}}},
                        "type": "NotEqual",
                        "right": {"Constant": {"Int32": 0}}
                    }
                }
            }
        }"#;

        let parsed: QueryNode = serde_json::from_str(json).unwrap();

        assert_eq!(
            parsed,
            source("MON$ATTACHMENTS").filter(not_equal(col("MON$ATTACHMENT_ID"), constant(0)))
        );
    }
}
