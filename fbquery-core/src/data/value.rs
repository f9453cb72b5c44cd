use serde::{Deserialize, Serialize};

use super::DataType;

/// Data container for respective types
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum DataValue {
    Null,
    Utf8String(String),
    Binary(Vec<u8>),
    Boolean(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Decimal(rust_decimal::Decimal),
    Date(chrono::NaiveDate),
    Time(chrono::NaiveTime),
    DateTime(chrono::NaiveDateTime),
    Uuid(uuid::Uuid),
}

impl DataValue {
    pub fn is_null(&self) -> bool {
        *self == DataValue::Null
    }

    /// Gets the type of the value
    pub fn r#type(&self) -> DataType {
        DataType::from(self)
    }

    /// Returns the value as an i64 if it is an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            DataValue::Int16(v) => Some(*v as i64),
            DataValue::Int32(v) => Some(*v as i64),
            DataValue::Int64(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for DataValue {
    fn from(str: &str) -> Self {
        DataValue::Utf8String(str.to_string())
    }
}

impl From<String> for DataValue {
    fn from(str: String) -> Self {
        DataValue::Utf8String(str)
    }
}

impl From<bool> for DataValue {
    fn from(v: bool) -> Self {
        DataValue::Boolean(v)
    }
}

impl From<i32> for DataValue {
    fn from(v: i32) -> Self {
        DataValue::Int32(v)
    }
}

impl From<i64> for DataValue {
    fn from(v: i64) -> Self {
        DataValue::Int64(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_value_as_integer() {
        assert_eq!(DataValue::Int16(-3).as_integer(), Some(-3));
        assert_eq!(DataValue::Int32(3).as_integer(), Some(3));
        assert_eq!(DataValue::Int64(i64::MAX).as_integer(), Some(i64::MAX));
        assert_eq!(DataValue::Float64(3.0).as_integer(), None);
        assert_eq!(DataValue::from("3").as_integer(), None);
    }
}
