use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::DataType;

use super::{QueryNode, SubNode};

/// Accesses a column of a row or a value member of an expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberAccess {
    /// The instance the member is read from, `None` for columns and static members
    pub instance: Option<SubNode>,
    pub member: Member,
}

impl MemberAccess {
    pub fn new(instance: Option<QueryNode>, member: Member) -> Self {
        Self {
            instance: instance.map(Box::new),
            member,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Member {
    Column(ColumnRef),
    Property(Property),
}

/// A column of the row in scope, or of an enclosing source when aliased
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub alias: Option<String>,
    pub name: String,
}

impl ColumnRef {
    pub fn new(alias: Option<String>, name: impl Into<String>) -> Self {
        Self {
            alias,
            name: name.into(),
        }
    }
}

/// Value members with a known translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    Length,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
    DayOfYear,
    DayOfWeek,
    Date,
    TimeOfDay,
    Now,
    UtcNow,
    Today,
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Calls a method on an instance, or a static method when there is no instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub instance: Option<SubNode>,
    pub method: Method,
    #[serde(default)]
    pub args: Vec<QueryNode>,
}

impl MethodCall {
    pub fn new(instance: Option<QueryNode>, method: Method, args: Vec<QueryNode>) -> Self {
        Self {
            instance: instance.map(Box::new),
            method,
            args,
        }
    }
}

/// Methods with a known translation.
/// String indices are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    Trim,
    TrimStart,
    TrimEnd,
    Substring,
    ToUpper,
    ToLower,
    Contains,
    StartsWith,
    EndsWith,
    IndexOf,
    Replace,
    IsNullOrEmpty,
    IsNullOrWhiteSpace,
    AddDays,
    AddMonths,
    AddYears,
    AddHours,
    AddMinutes,
    AddSeconds,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A parameter bound at execution time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub r#type: DataType,
}

impl Parameter {
    pub fn new(name: impl Into<String>, r#type: DataType) -> Self {
        Self {
            name: name.into(),
            r#type,
        }
    }
}

/// A binary operation over two expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryOp {
    /// The LHS of the expression
    pub left: SubNode,
    /// The binary operator being used
    pub r#type: BinaryOpType,
    /// The RHS of the expression
    pub right: SubNode,
}

impl BinaryOp {
    pub fn new(left: QueryNode, r#type: BinaryOpType, right: QueryNode) -> Self {
        Self {
            left: Box::new(left),
            r#type,
            right: Box::new(right),
        }
    }
}

/// Supported binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOpType {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Concat,
    LogicalAnd,
    LogicalOr,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl BinaryOpType {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::GreaterThan
                | Self::GreaterThanOrEqual
                | Self::LessThan
                | Self::LessThanOrEqual
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Self::LogicalAnd | Self::LogicalOr)
    }
}

/// A unary operation over one expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryOp {
    pub r#type: UnaryOpType,
    /// The expression being operated on
    pub expr: SubNode,
}

impl UnaryOp {
    pub fn new(r#type: UnaryOpType, expr: QueryNode) -> Self {
        Self {
            r#type,
            expr: Box::new(expr),
        }
    }
}

/// Supported unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOpType {
    LogicalNot,
    Negate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_op_type_classification() {
        assert!(BinaryOpType::NotEqual.is_comparison());
        assert!(!BinaryOpType::Concat.is_comparison());
        assert!(BinaryOpType::LogicalOr.is_logical());
        assert!(!BinaryOpType::Equal.is_logical());
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Substring.to_string(), "Substring");
        assert_eq!(Property::DayOfYear.to_string(), "DayOfYear");
    }
}
