use fbquery_core::{
    data::DataValue,
    err::{CompileError, Result},
    qtree::QueryNode,
};

use crate::fragment::{RangeClause, SqlBinaryOp, SqlFragment};

/// The upper bound used when rows are skipped without a limit
pub const MAX_ROWS: i64 = i64::MAX;

/// The requested window of rows.
/// Each count is an integer literal or a bound parameter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PagingSpec {
    pub skip: Option<SqlFragment>,
    pub take: Option<SqlFragment>,
}

impl PagingSpec {
    pub fn new(skip: Option<SqlFragment>, take: Option<SqlFragment>) -> Self {
        Self { skip, take }
    }

    pub fn is_empty(&self) -> bool {
        self.skip.is_none() && self.take.is_none()
    }

    /// Converts the count of a Skip or Take node into a row count fragment
    pub fn row_count(node: &QueryNode, operator: &str) -> Result<SqlFragment> {
        let frag = match node {
            QueryNode::Constant(val) => SqlFragment::Literal(val.clone()),
            QueryNode::Parameter(param) => SqlFragment::Parameter(param.clone()),
            _ => {
                return Err(CompileError::invalid_argument(format!(
                    "{} count must be an integer constant or parameter, found {}",
                    operator,
                    node.kind()
                ))
                .into())
            }
        };

        validate_row_count(&frag, operator)?;
        Ok(frag)
    }
}

fn validate_row_count(frag: &SqlFragment, operator: &str) -> Result<()> {
    match frag {
        SqlFragment::Literal(val) => match val.as_integer() {
            Some(n) if n >= 0 => Ok(()),
            Some(n) => Err(CompileError::invalid_argument(format!(
                "{} count cannot be negative, found {}",
                operator, n
            ))
            .into()),
            None => Err(CompileError::invalid_argument(format!(
                "{} count must be an integer, found {:?}",
                operator, val
            ))
            .into()),
        },
        SqlFragment::Parameter(param) if param.r#type.is_integer() => Ok(()),
        SqlFragment::Parameter(param) => Err(CompileError::invalid_argument(format!(
            "{} count parameter \"{}\" must be an integer, found {:?}",
            operator, param.name, param.r#type
        ))
        .into()),
        _ => Err(CompileError::invalid_argument(format!(
            "{} count must be an integer constant or parameter",
            operator
        ))
        .into()),
    }
}

/// Compiles the paging window into a `ROWS m [TO n]` clause.
///
/// Firebird rows are one-based and both bounds are inclusive, so skipping S rows
/// and taking N is `ROWS (S + 1) TO (S + N)`. The counts are kept symbolic so
/// parameterised paging produces a single statement for every page.
pub fn compile_range(spec: &PagingSpec) -> Result<Option<RangeClause>> {
    if let Some(skip) = &spec.skip {
        validate_row_count(skip, "Skip")?;
    }

    if let Some(take) = &spec.take {
        validate_row_count(take, "Take")?;
    }

    Ok(match (&spec.skip, &spec.take) {
        (None, None) => None,
        (None, Some(take)) => Some(RangeClause {
            lower: take.clone(),
            upper: None,
        }),
        (Some(skip), take) => Some(RangeClause {
            lower: SqlFragment::binary(skip.clone(), SqlBinaryOp::Add, SqlFragment::literal(1)),
            upper: Some(match take {
                Some(take) => SqlFragment::binary(skip.clone(), SqlBinaryOp::Add, take.clone()),
                None => SqlFragment::Literal(DataValue::Int64(MAX_ROWS)),
            }),
        }),
    })
}
