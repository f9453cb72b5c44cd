use enum_as_inner::EnumAsInner;
use fbquery_core::{
    data::{DataType, DataValue},
    qtree,
};
use serde::Serialize;

/// A bound parameter of a compiled query, in placeholder order
#[derive(Debug, Clone, PartialEq, Serialize, EnumAsInner)]
pub enum QueryParam {
    /// A parameter of the query tree, its value is supplied for every execution
    Dynamic(qtree::Parameter),
    /// A constant of the query tree that cannot be written as a SQL literal
    Constant(DataValue),
}

impl QueryParam {
    pub fn dynamic(param: qtree::Parameter) -> Self {
        Self::Dynamic(param)
    }

    pub fn dynamic2(name: impl Into<String>, r#type: DataType) -> Self {
        Self::Dynamic(qtree::Parameter::new(name, r#type))
    }

    pub fn constant(param: DataValue) -> Self {
        Self::Constant(param)
    }

    /// Gets the type of the query parameter
    pub fn r#type(&self) -> DataType {
        match self {
            QueryParam::Dynamic(p) => p.r#type.clone(),
            QueryParam::Constant(v) => v.r#type(),
        }
    }

    /// Gets a loggable representation of the parameter
    pub fn logged(&self) -> String {
        match self {
            QueryParam::Dynamic(p) => format!("@{}: {:?}", p.name, p.r#type),
            QueryParam::Constant(v) => format!("{:?}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_query_param_type() {
        assert_eq!(
            QueryParam::dynamic2("skip", DataType::Int32).r#type(),
            DataType::Int32
        );
        assert_eq!(
            QueryParam::constant(DataValue::Binary(vec![1, 2])).r#type(),
            DataType::Binary
        );
    }

    #[test]
    fn test_query_param_logged() {
        assert_eq!(
            QueryParam::dynamic2("skip", DataType::Int64).logged(),
            "@skip: Int64"
        );
        assert_eq!(
            QueryParam::constant(DataValue::Binary(vec![1, 2])).logged(),
            "Binary([1, 2])"
        );
    }
}
