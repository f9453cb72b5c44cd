use std::{collections::HashMap, fmt};

use fbquery_core::{
    data::DataValue,
    err::{CompileError, Result},
    qtree::{Method, Property},
};
use lazy_static::lazy_static;

use crate::{
    capabilities::{DialectCapabilities, Feature},
    fragment::{CastType, DatePart, SqlBinaryOp, SqlFragment, TrimWhere},
};

/// A member or method with a SQL translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationId {
    Property(Property),
    Method(Method),
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationId::Property(p) => write!(f, "{}", p),
            OperationId::Method(m) => write!(f, "{}()", m),
        }
    }
}

/// The SQL shape an operation is translated to.
/// Operands are the instance (if any) followed by the arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlTemplate {
    /// `NAME(op0, op1, ...)`
    Function(&'static str),
    /// `TRIM([where] [op1] FROM op0)`
    Trim(Option<TrimWhere>),
    /// `SUBSTRING(op0 FROM op1 [FOR op2])`
    Substring,
    /// `EXTRACT(part FROM op0)`
    Extract(DatePart),
    /// `CAST(op0 AS type)`
    Cast(CastType),
    /// A niladic keyword such as `CURRENT_DATE`
    Keyword(&'static str),
    /// `POSITION(op1 IN op0)`
    Position,
    /// `POSITION(op1 IN op0) > 0`
    PositionFound,
    /// `op0 STARTING WITH op1`
    StartingWith,
    /// `RIGHT(op0, CHAR_LENGTH(op1)) = op1`
    EndsWith,
    /// `op0 IS NULL OR op0 = ''`, optionally trimming op0 first
    IsNullOr { trimmed: bool },
    /// `DATEADD(op1 part TO op0)`
    DateAdd(DatePart),
    /// `CAST(CURRENT_TIMESTAMP AT TIME ZONE 'UTC' AS TIMESTAMP)`
    UtcTimestamp,
}

/// An adjustment applied to the operands or result of a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    None,
    /// Converts the zero-based start index (op1) to one-based
    OneBasedStart,
    /// `result + 1`
    IncrementResult,
    /// `result - 1`
    DecrementResult,
    /// `TRUNC(result)`
    TruncateResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionMappingEntry {
    pub operation: OperationId,
    /// The number of arguments, excluding the instance
    pub arity: usize,
    /// Whether the operation is invoked on an instance
    pub has_instance: bool,
    pub template: SqlTemplate,
    pub transform: Transform,
    /// The dialect feature the translation depends on
    pub requires: Option<Feature>,
}

impl FunctionMappingEntry {
    fn new(
        operation: OperationId,
        arity: usize,
        has_instance: bool,
        template: SqlTemplate,
    ) -> Self {
        Self {
            operation,
            arity,
            has_instance,
            template,
            transform: Transform::None,
            requires: None,
        }
    }

    fn transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    fn requires(mut self, feature: Feature) -> Self {
        self.requires = Some(feature);
        self
    }

    /// Builds the SQL fragment for the supplied, already translated, operands
    pub fn apply(
        &self,
        instance: Option<SqlFragment>,
        args: Vec<SqlFragment>,
        caps: &DialectCapabilities,
    ) -> Result<SqlFragment> {
        if let Some(feature) = self.requires {
            caps.require(feature)?;
        }

        if instance.is_some() != self.has_instance {
            return Err(CompileError::unsupported_expression(if self.has_instance {
                format!("{} must be invoked on an instance", self.operation)
            } else {
                format!("{} cannot be invoked on an instance", self.operation)
            })
            .into());
        }

        if args.len() != self.arity {
            return Err(CompileError::unmapped(self.operation.to_string(), args.len()).into());
        }

        let mut ops = instance.into_iter().chain(args).collect::<Vec<_>>();

        if self.transform == Transform::OneBasedStart && caps.substring_is_one_based {
            let start = ops.remove(1);
            ops.insert(1, to_one_based(start)?);
        }

        let frag = self.build(ops)?;

        Ok(match self.transform {
            Transform::IncrementResult => {
                SqlFragment::binary(frag, SqlBinaryOp::Add, SqlFragment::literal(1))
            }
            Transform::DecrementResult => {
                SqlFragment::binary(frag, SqlBinaryOp::Subtract, SqlFragment::literal(1))
            }
            Transform::TruncateResult => SqlFragment::function("TRUNC", vec![frag]),
            Transform::None | Transform::OneBasedStart => frag,
        })
    }

    fn build(&self, ops: Vec<SqlFragment>) -> Result<SqlFragment> {
        let mut ops = ops.into_iter();
        let mut next = || -> Result<SqlFragment> {
            ops.next().ok_or_else(|| {
                CompileError::unmapped(self.operation.to_string(), self.arity).into()
            })
        };

        Ok(match self.template {
            SqlTemplate::Function(name) => {
                let args = (0..self.arity + self.has_instance as usize)
                    .map(|_| next())
                    .collect::<Result<Vec<_>>>()?;
                SqlFragment::function(name, args)
            }
            SqlTemplate::Trim(r#where) => {
                let expr = next()?;
                let chars = if self.arity == 1 {
                    Some(Box::new(next()?))
                } else {
                    None
                };
                SqlFragment::Trim {
                    r#where,
                    chars,
                    expr: Box::new(expr),
                }
            }
            SqlTemplate::Substring => {
                let expr = next()?;
                let start = next()?;
                let len = if self.arity == 2 {
                    Some(Box::new(next()?))
                } else {
                    None
                };
                SqlFragment::Substring {
                    expr: Box::new(expr),
                    start: Box::new(start),
                    len,
                }
            }
            SqlTemplate::Extract(part) => SqlFragment::Extract {
                part,
                expr: Box::new(next()?),
            },
            SqlTemplate::Cast(r#type) => SqlFragment::cast(next()?, r#type),
            SqlTemplate::Keyword(kw) => SqlFragment::Keyword(kw),
            SqlTemplate::Position | SqlTemplate::PositionFound => {
                let haystack = next()?;
                let needle = next()?;
                let pos = SqlFragment::Position {
                    needle: Box::new(needle),
                    haystack: Box::new(haystack),
                };

                if self.template == SqlTemplate::PositionFound {
                    SqlFragment::binary(pos, SqlBinaryOp::GreaterThan, SqlFragment::literal(0))
                } else {
                    pos
                }
            }
            SqlTemplate::StartingWith => {
                let expr = next()?;
                SqlFragment::binary(expr, SqlBinaryOp::StartingWith, next()?)
            }
            SqlTemplate::EndsWith => {
                let expr = next()?;
                let suffix = next()?;
                SqlFragment::binary(
                    SqlFragment::function(
                        "RIGHT",
                        vec![
                            expr,
                            SqlFragment::function("CHAR_LENGTH", vec![suffix.clone()]),
                        ],
                    ),
                    SqlBinaryOp::Equal,
                    suffix,
                )
            }
            SqlTemplate::IsNullOr { trimmed } => {
                let expr = next()?;
                let compared = if trimmed {
                    SqlFragment::Trim {
                        r#where: None,
                        chars: None,
                        expr: Box::new(expr.clone()),
                    }
                } else {
                    expr.clone()
                };

                SqlFragment::binary(
                    SqlFragment::is_null(expr, false),
                    SqlBinaryOp::Or,
                    SqlFragment::binary(compared, SqlBinaryOp::Equal, SqlFragment::literal("")),
                )
            }
            SqlTemplate::DateAdd(part) => {
                let expr = next()?;
                SqlFragment::DateAdd {
                    amount: Box::new(next()?),
                    part,
                    expr: Box::new(expr),
                }
            }
            SqlTemplate::UtcTimestamp => SqlFragment::cast(
                SqlFragment::AtTimeZone {
                    expr: Box::new(SqlFragment::Keyword("CURRENT_TIMESTAMP")),
                    zone: "UTC",
                },
                CastType::Timestamp,
            ),
        })
    }
}

/// Converts a zero-based index to one-based, folding integer constants
fn to_one_based(start: SqlFragment) -> Result<SqlFragment> {
    if let SqlFragment::Literal(val) = &start {
        let idx = match val.as_integer() {
            Some(idx) => idx,
            None => {
                return Err(CompileError::invalid_argument(format!(
                    "Substring start index must be an integer, found {:?}",
                    val
                ))
                .into())
            }
        };

        if idx < 0 {
            return Err(CompileError::invalid_argument(format!(
                "Substring start index cannot be negative, found {}",
                idx
            ))
            .into());
        }

        return Ok(SqlFragment::Literal(match val {
            DataValue::Int16(_) | DataValue::Int32(_) if idx < i32::MAX as i64 => {
                DataValue::Int32(idx as i32 + 1)
            }
            _ => DataValue::Int64(idx.saturating_add(1)),
        }));
    }

    Ok(SqlFragment::binary(
        start,
        SqlBinaryOp::Add,
        SqlFragment::literal(1),
    ))
}

lazy_static! {
    static ref FUNCTION_MAPPINGS: HashMap<(OperationId, usize), FunctionMappingEntry> = {
        use OperationId::{Method as M, Property as P};

        let prop = |p: Property, template: SqlTemplate| FunctionMappingEntry::new(P(p), 0, true, template);
        let stat = |p: Property, template: SqlTemplate| FunctionMappingEntry::new(P(p), 0, false, template);
        let method = |m: Method, arity: usize, template: SqlTemplate| FunctionMappingEntry::new(M(m), arity, true, template);

        let entries = vec![
            // String members
            prop(Property::Length, SqlTemplate::Function("CHAR_LENGTH")),
            method(Method::Trim, 0, SqlTemplate::Trim(None)),
            method(Method::Trim, 1, SqlTemplate::Trim(Some(TrimWhere::Both))),
            method(Method::TrimStart, 0, SqlTemplate::Trim(Some(TrimWhere::Leading))),
            method(Method::TrimStart, 1, SqlTemplate::Trim(Some(TrimWhere::Leading))),
            method(Method::TrimEnd, 0, SqlTemplate::Trim(Some(TrimWhere::Trailing))),
            method(Method::TrimEnd, 1, SqlTemplate::Trim(Some(TrimWhere::Trailing))),
            method(Method::Substring, 1, SqlTemplate::Substring).transform(Transform::OneBasedStart),
            method(Method::Substring, 2, SqlTemplate::Substring).transform(Transform::OneBasedStart),
            method(Method::ToUpper, 0, SqlTemplate::Function("UPPER")),
            method(Method::ToLower, 0, SqlTemplate::Function("LOWER")),
            method(Method::Contains, 1, SqlTemplate::PositionFound),
            method(Method::StartsWith, 1, SqlTemplate::StartingWith),
            method(Method::EndsWith, 1, SqlTemplate::EndsWith),
            method(Method::IndexOf, 1, SqlTemplate::Position).transform(Transform::DecrementResult),
            method(Method::Replace, 2, SqlTemplate::Function("REPLACE")),
            FunctionMappingEntry::new(M(Method::IsNullOrEmpty), 1, false, SqlTemplate::IsNullOr { trimmed: false }),
            FunctionMappingEntry::new(M(Method::IsNullOrWhiteSpace), 1, false, SqlTemplate::IsNullOr { trimmed: true }),
            // Date/time members
            prop(Property::Year, SqlTemplate::Extract(DatePart::Year)),
            prop(Property::Month, SqlTemplate::Extract(DatePart::Month)),
            prop(Property::Day, SqlTemplate::Extract(DatePart::Day)),
            prop(Property::Hour, SqlTemplate::Extract(DatePart::Hour)),
            prop(Property::Minute, SqlTemplate::Extract(DatePart::Minute)),
            prop(Property::Second, SqlTemplate::Extract(DatePart::Second)).transform(Transform::TruncateResult),
            prop(Property::Millisecond, SqlTemplate::Extract(DatePart::Millisecond))
                .transform(Transform::TruncateResult)
                .requires(Feature::MillisecondExtract),
            prop(Property::DayOfYear, SqlTemplate::Extract(DatePart::YearDay)).transform(Transform::IncrementResult),
            prop(Property::DayOfWeek, SqlTemplate::Extract(DatePart::WeekDay)),
            prop(Property::Date, SqlTemplate::Cast(CastType::Date)),
            prop(Property::TimeOfDay, SqlTemplate::Cast(CastType::Time)),
            stat(Property::Now, SqlTemplate::Keyword("CURRENT_TIMESTAMP")),
            stat(Property::UtcNow, SqlTemplate::UtcTimestamp).requires(Feature::TimeZones),
            stat(Property::Today, SqlTemplate::Keyword("CURRENT_DATE")),
            method(Method::AddYears, 1, SqlTemplate::DateAdd(DatePart::Year)),
            method(Method::AddMonths, 1, SqlTemplate::DateAdd(DatePart::Month)),
            method(Method::AddDays, 1, SqlTemplate::DateAdd(DatePart::Day)),
            method(Method::AddHours, 1, SqlTemplate::DateAdd(DatePart::Hour)),
            method(Method::AddMinutes, 1, SqlTemplate::DateAdd(DatePart::Minute)),
            method(Method::AddSeconds, 1, SqlTemplate::DateAdd(DatePart::Second)),
        ];

        entries
            .into_iter()
            .map(|e| ((e.operation, e.arity), e))
            .collect()
    };
}

/// Finds the translation of an operation invoked with the supplied number of arguments
pub fn lookup(operation: OperationId, arity: usize) -> Result<&'static FunctionMappingEntry> {
    FUNCTION_MAPPINGS
        .get(&(operation, arity))
        .ok_or_else(|| CompileError::unmapped(operation.to_string(), arity).into())
}
