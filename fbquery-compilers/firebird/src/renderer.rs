use std::collections::HashSet;

use fbquery_compilers_base::common::query::QueryParam;
use fbquery_core::{
    config::PlaceholderStyle,
    data::DataValue,
    err::{CompileError, Result},
    qtree::{self, OrderingType},
};

use crate::{
    capabilities::DialectCapabilities,
    fragment::{
        CastType, DatePart, FromClause, RangeClause, SelectColumn, SelectFragment, SqlBinaryOp,
        SqlFragment, SqlUnaryOp, TrimWhere,
    },
};

/// Renders the select into sql text and the parameters bound to its placeholders
pub fn render(
    caps: &DialectCapabilities,
    placeholders: PlaceholderStyle,
    select: &SelectFragment,
) -> Result<(String, Vec<QueryParam>)> {
    let opts = RenderOptions::new(caps, placeholders).with_param_names_of(select);
    let mut params = Vec::<QueryParam>::new();

    let sql = FirebirdSqlRenderer::render_select(&opts, select, &mut params)?;

    Ok((sql, params))
}

/// The dialect settings that affect rendering
#[derive(Debug, Clone)]
pub struct RenderOptions<'a> {
    pub caps: &'a DialectCapabilities,
    pub placeholders: PlaceholderStyle,
    /// Names of the query parameters, constant placeholders must not reuse them
    param_names: HashSet<String>,
}

impl<'a> RenderOptions<'a> {
    pub fn new(caps: &'a DialectCapabilities, placeholders: PlaceholderStyle) -> Self {
        Self {
            caps,
            placeholders,
            param_names: HashSet::new(),
        }
    }

    pub fn with_param_names_of(mut self, select: &SelectFragment) -> Self {
        select.walk(&mut |frag| {
            if let SqlFragment::Parameter(param) = frag {
                self.param_names.insert(param.name.clone());
            }
        });
        self
    }

    /// The name of the nth constant placeholder: p0, p1 and so on, skipping parameter names
    fn constant_param_name(&self, nth: usize) -> String {
        let mut idx = 0;
        let mut free = 0;

        loop {
            let name = format!("p{}", idx);
            idx += 1;

            if self.param_names.contains(&name) {
                continue;
            }

            if free == nth {
                return name;
            }

            free += 1;
        }
    }
}

/// Renders the intermediate sql AST as Firebird sql
pub struct FirebirdSqlRenderer;

/// Binding strength of an operator, higher binds tighter
type Precedence = u8;

const PREC_OR: Precedence = 1;
const PREC_AND: Precedence = 2;
const PREC_NOT: Precedence = 3;
const PREC_COMPARISON: Precedence = 4;
const PREC_CONCAT: Precedence = 5;
const PREC_ADDITIVE: Precedence = 6;
const PREC_MULTIPLICATIVE: Precedence = 7;
const PREC_NEGATE: Precedence = 8;
const PREC_ATOM: Precedence = 9;

impl FirebirdSqlRenderer {
    pub fn render_select(
        opts: &RenderOptions,
        select: &SelectFragment,
        params: &mut Vec<QueryParam>,
    ) -> Result<String> {
        let sql = [
            "SELECT".to_string(),
            Self::render_select_cols(opts, &select.cols, params)?,
            format!("FROM {}", Self::render_from(opts, &select.from, params)?),
            Self::render_where(opts, &select.r#where, params)?,
            Self::render_order_by(opts, &select.order_bys, params)?,
            Self::render_range(opts, select.range.as_ref(), params)?,
        ]
        .into_iter()
        .filter(|i| !i.is_empty())
        .collect::<Vec<String>>()
        .join(" ");

        Ok(sql)
    }

    fn render_select_cols(
        opts: &RenderOptions,
        cols: &[SelectColumn],
        params: &mut Vec<QueryParam>,
    ) -> Result<String> {
        Ok(cols
            .iter()
            .map(|col| {
                let expr = Self::render_expr(opts, &col.expr, params)?;

                Ok(match &col.alias {
                    Some(alias) => format!("{} AS {}", expr, Self::render_identifier(opts, alias)?),
                    None => expr,
                })
            })
            .collect::<Result<Vec<String>>>()?
            .join(", "))
    }

    fn render_from(
        opts: &RenderOptions,
        from: &FromClause,
        params: &mut Vec<QueryParam>,
    ) -> Result<String> {
        Ok(match from {
            FromClause::Table { name, alias } => format!(
                "{} {}",
                Self::render_identifier(opts, name)?,
                Self::render_identifier(opts, alias)?
            ),
            FromClause::Derived { select, alias } => format!(
                "({}) {}",
                Self::render_select(opts, select, params)?,
                Self::render_identifier(opts, alias)?
            ),
            FromClause::Dual => "RDB$DATABASE".to_string(),
        })
    }

    fn render_where(
        opts: &RenderOptions,
        r#where: &[SqlFragment],
        params: &mut Vec<QueryParam>,
    ) -> Result<String> {
        if r#where.is_empty() {
            return Ok("".to_string());
        }

        let clauses = r#where
            .iter()
            .map(|e| Self::render_operand(opts, e, PREC_AND, params))
            .collect::<Result<Vec<String>>>()?
            .join(" AND ");

        Ok(format!("WHERE {}", clauses))
    }

    fn render_order_by(
        opts: &RenderOptions,
        order_bys: &[(SqlFragment, OrderingType)],
        params: &mut Vec<QueryParam>,
    ) -> Result<String> {
        if order_bys.is_empty() {
            return Ok("".to_string());
        }

        let clauses = order_bys
            .iter()
            .map(|(expr, r#type)| {
                Ok(format!(
                    "{} {}",
                    Self::render_expr(opts, expr, params)?,
                    match r#type {
                        OrderingType::Asc => "ASC",
                        OrderingType::Desc => "DESC",
                    }
                ))
            })
            .collect::<Result<Vec<String>>>()?
            .join(", ");

        Ok(format!("ORDER BY {}", clauses))
    }

    fn render_range(
        opts: &RenderOptions,
        range: Option<&RangeClause>,
        params: &mut Vec<QueryParam>,
    ) -> Result<String> {
        let range = match range {
            Some(range) => range,
            None => return Ok("".to_string()),
        };

        let mut sql = format!("ROWS ({})", Self::render_expr(opts, &range.lower, params)?);

        if let Some(upper) = &range.upper {
            sql.push_str(&format!(" TO ({})", Self::render_expr(opts, upper, params)?));
        }

        Ok(sql)
    }

    pub fn render_expr(
        opts: &RenderOptions,
        expr: &SqlFragment,
        params: &mut Vec<QueryParam>,
    ) -> Result<String> {
        let sql = match expr {
            SqlFragment::Column { table_alias, name } => format!(
                "{}.{}",
                Self::render_identifier(opts, table_alias)?,
                Self::render_identifier(opts, name)?
            ),
            SqlFragment::AllColumns { table_alias } => {
                format!("{}.*", Self::render_identifier(opts, table_alias)?)
            }
            SqlFragment::Literal(val) => Self::render_literal(opts, val, params)?,
            SqlFragment::Parameter(p) => Self::render_param(opts, p, params),
            SqlFragment::Keyword(kw) => kw.to_string(),
            SqlFragment::Function { name, args } => format!(
                "{}({})",
                name,
                args.iter()
                    .map(|arg| Self::render_expr(opts, arg, params))
                    .collect::<Result<Vec<_>>>()?
                    .join(", ")
            ),
            SqlFragment::Trim {
                r#where,
                chars,
                expr,
            } => {
                let mut spec = vec![];

                if let Some(r#where) = r#where {
                    spec.push(
                        match r#where {
                            TrimWhere::Both => "BOTH",
                            TrimWhere::Leading => "LEADING",
                            TrimWhere::Trailing => "TRAILING",
                        }
                        .to_string(),
                    );
                }

                if let Some(chars) = chars {
                    spec.push(Self::render_expr(opts, chars, params)?);
                }

                let expr = Self::render_expr(opts, expr, params)?;

                if spec.is_empty() {
                    format!("TRIM({})", expr)
                } else {
                    format!("TRIM({} FROM {})", spec.join(" "), expr)
                }
            }
            SqlFragment::Substring { expr, start, len } => {
                let mut sql = format!(
                    "SUBSTRING({} FROM {}",
                    Self::render_expr(opts, expr, params)?,
                    Self::render_expr(opts, start, params)?
                );

                if let Some(len) = len {
                    sql.push_str(&format!(" FOR {}", Self::render_expr(opts, len, params)?));
                }

                sql.push(')');
                sql
            }
            SqlFragment::Extract { part, expr } => format!(
                "EXTRACT({} FROM {})",
                Self::render_date_part(*part),
                Self::render_expr(opts, expr, params)?
            ),
            SqlFragment::Cast { expr, r#type } => format!(
                "CAST({} AS {})",
                Self::render_expr(opts, expr, params)?,
                match r#type {
                    CastType::Date => "DATE",
                    CastType::Time => "TIME",
                    CastType::Timestamp => "TIMESTAMP",
                }
            ),
            SqlFragment::Position { needle, haystack } => format!(
                "POSITION({} IN {})",
                Self::render_expr(opts, needle, params)?,
                Self::render_expr(opts, haystack, params)?
            ),
            SqlFragment::DateAdd { amount, part, expr } => format!(
                "DATEADD({} {} TO {})",
                Self::render_operand(opts, amount, PREC_ATOM, params)?,
                Self::render_date_part(*part),
                Self::render_expr(opts, expr, params)?
            ),
            SqlFragment::AtTimeZone { expr, zone } => format!(
                "{} AT TIME ZONE {}",
                Self::render_operand(opts, expr, PREC_ATOM, params)?,
                Self::render_string(zone)
            ),
            SqlFragment::Binary { left, op, right } => {
                Self::render_binary_op(opts, left, *op, right, params)?
            }
            SqlFragment::Unary { op, expr } => match op {
                SqlUnaryOp::Not => {
                    format!("NOT {}", Self::render_operand(opts, expr, PREC_NOT, params)?)
                }
                SqlUnaryOp::Negate => {
                    let inner = Self::render_operand(opts, expr, PREC_NEGATE, params)?;

                    // "--" starts a comment
                    if inner.starts_with('-') {
                        format!("-({})", inner)
                    } else {
                        format!("-{}", inner)
                    }
                }
            },
            SqlFragment::IsNull { expr, negated } => format!(
                "{} IS {}NULL",
                Self::render_operand(opts, expr, PREC_CONCAT, params)?,
                if *negated { "NOT " } else { "" }
            ),
            SqlFragment::Case { whens, r#else } => {
                let mut parts = vec!["CASE".to_string()];

                for (cond, val) in whens {
                    parts.push(format!(
                        "WHEN {} THEN {}",
                        Self::render_expr(opts, cond, params)?,
                        Self::render_expr(opts, val, params)?
                    ));
                }

                if let Some(r#else) = r#else {
                    parts.push(format!("ELSE {}", Self::render_expr(opts, r#else, params)?));
                }

                parts.push("END".to_string());
                parts.join(" ")
            }
            SqlFragment::Exists(select) => {
                format!("EXISTS ({})", Self::render_select(opts, select, params)?)
            }
        };

        Ok(sql)
    }

    fn render_binary_op(
        opts: &RenderOptions,
        left: &SqlFragment,
        op: SqlBinaryOp,
        right: &SqlFragment,
        params: &mut Vec<QueryParam>,
    ) -> Result<String> {
        // Firebird has no modulo operator
        if op == SqlBinaryOp::Modulo {
            return Ok(format!(
                "MOD({}, {})",
                Self::render_expr(opts, left, params)?,
                Self::render_expr(opts, right, params)?
            ));
        }

        let prec = Self::binary_precedence(op);

        // Comparisons do not chain, everything else is left-associative
        let left_min = if prec == PREC_COMPARISON { prec + 1 } else { prec };
        let right_min = match right {
            SqlFragment::Binary { op: right_op, .. }
                if *right_op == op && Self::is_associative(op) =>
            {
                prec
            }
            _ => prec + 1,
        };

        let l = Self::render_operand(opts, left, left_min, params)?;
        let r = Self::render_operand(opts, right, right_min, params)?;

        Ok(format!(
            "{} {} {}",
            l,
            match op {
                SqlBinaryOp::Add => "+",
                SqlBinaryOp::Subtract => "-",
                SqlBinaryOp::Multiply => "*",
                SqlBinaryOp::Divide => "/",
                SqlBinaryOp::Modulo => "%",
                SqlBinaryOp::Concat => "||",
                SqlBinaryOp::And => "AND",
                SqlBinaryOp::Or => "OR",
                SqlBinaryOp::Equal => "=",
                SqlBinaryOp::NotEqual => "<>",
                SqlBinaryOp::GreaterThan => ">",
                SqlBinaryOp::GreaterThanOrEqual => ">=",
                SqlBinaryOp::LessThan => "<",
                SqlBinaryOp::LessThanOrEqual => "<=",
                SqlBinaryOp::StartingWith => "STARTING WITH",
            },
            r
        ))
    }

    /// Renders the expression, parenthesised if it binds looser than `min`
    fn render_operand(
        opts: &RenderOptions,
        expr: &SqlFragment,
        min: Precedence,
        params: &mut Vec<QueryParam>,
    ) -> Result<String> {
        let sql = Self::render_expr(opts, expr, params)?;

        Ok(if Self::precedence(expr) < min {
            format!("({})", sql)
        } else {
            sql
        })
    }

    fn precedence(expr: &SqlFragment) -> Precedence {
        match expr {
            SqlFragment::Binary { op, .. } => Self::binary_precedence(*op),
            SqlFragment::Unary {
                op: SqlUnaryOp::Not,
                ..
            } => PREC_NOT,
            SqlFragment::Unary {
                op: SqlUnaryOp::Negate,
                ..
            } => PREC_NEGATE,
            SqlFragment::IsNull { .. } => PREC_COMPARISON,
            // Negative literals behave like a negation
            SqlFragment::Literal(val) if Self::is_negative(val) => PREC_NEGATE,
            _ => PREC_ATOM,
        }
    }

    fn binary_precedence(op: SqlBinaryOp) -> Precedence {
        match op {
            SqlBinaryOp::Or => PREC_OR,
            SqlBinaryOp::And => PREC_AND,
            SqlBinaryOp::Equal
            | SqlBinaryOp::NotEqual
            | SqlBinaryOp::GreaterThan
            | SqlBinaryOp::GreaterThanOrEqual
            | SqlBinaryOp::LessThan
            | SqlBinaryOp::LessThanOrEqual
            | SqlBinaryOp::StartingWith => PREC_COMPARISON,
            SqlBinaryOp::Concat => PREC_CONCAT,
            SqlBinaryOp::Add | SqlBinaryOp::Subtract => PREC_ADDITIVE,
            SqlBinaryOp::Multiply | SqlBinaryOp::Divide => PREC_MULTIPLICATIVE,
            SqlBinaryOp::Modulo => PREC_ATOM,
        }
    }

    fn is_associative(op: SqlBinaryOp) -> bool {
        matches!(
            op,
            SqlBinaryOp::Add
                | SqlBinaryOp::Multiply
                | SqlBinaryOp::Concat
                | SqlBinaryOp::And
                | SqlBinaryOp::Or
        )
    }

    fn is_negative(val: &DataValue) -> bool {
        match val {
            DataValue::Int16(v) => *v < 0,
            DataValue::Int32(v) => *v < 0,
            DataValue::Int64(v) => *v < 0,
            DataValue::Float32(v) => v.is_sign_negative(),
            DataValue::Float64(v) => v.is_sign_negative(),
            DataValue::Decimal(v) => v.is_sign_negative(),
            _ => false,
        }
    }

    fn render_date_part(part: DatePart) -> &'static str {
        match part {
            DatePart::Year => "YEAR",
            DatePart::Month => "MONTH",
            DatePart::Day => "DAY",
            DatePart::Hour => "HOUR",
            DatePart::Minute => "MINUTE",
            DatePart::Second => "SECOND",
            DatePart::Millisecond => "MILLISECOND",
            DatePart::YearDay => "YEARDAY",
            DatePart::WeekDay => "WEEKDAY",
        }
    }

    /// Quotes the identifier, doubling embedded quotes
    pub fn render_identifier(opts: &RenderOptions, id: &str) -> Result<String> {
        if id.is_empty() {
            return Err(CompileError::invalid_argument("Identifier cannot be empty").into());
        }

        if id.contains('\0') {
            return Err(CompileError::invalid_argument(format!(
                "Invalid identifier: \"{}\", cannot contain '\\0' chars",
                id.escape_default()
            ))
            .into());
        }

        let len = id.chars().count();
        if len > opts.caps.max_identifier_length {
            return Err(CompileError::invalid_argument(format!(
                "Identifier \"{}\" is {} characters long, Firebird {} allows at most {}",
                id, len, opts.caps.server_version, opts.caps.max_identifier_length
            ))
            .into());
        }

        Ok(format!("\"{}\"", id.replace('"', "\"\"")))
    }

    fn render_string(val: &str) -> String {
        format!("'{}'", val.replace('\'', "''"))
    }

    fn render_literal(
        opts: &RenderOptions,
        val: &DataValue,
        params: &mut Vec<QueryParam>,
    ) -> Result<String> {
        Ok(match val {
            DataValue::Null => "NULL".to_string(),
            DataValue::Utf8String(s) => Self::render_string(s),
            DataValue::Boolean(b) => match (opts.caps.supports_boolean_type, b) {
                (true, true) => "TRUE".to_string(),
                (true, false) => "FALSE".to_string(),
                (false, true) => "1".to_string(),
                (false, false) => "0".to_string(),
            },
            DataValue::Int16(v) => v.to_string(),
            DataValue::Int32(v) => v.to_string(),
            DataValue::Int64(v) => v.to_string(),
            DataValue::Float32(v) if v.is_finite() => format!("{:?}", v),
            DataValue::Float64(v) if v.is_finite() => format!("{:?}", v),
            DataValue::Float32(_) | DataValue::Float64(_) => {
                return Err(CompileError::invalid_argument(format!(
                    "Cannot represent {:?} as a sql literal",
                    val
                ))
                .into())
            }
            DataValue::Decimal(v) => v.to_string(),
            DataValue::Date(d) => format!("DATE '{}'", Self::render_date(d)?),
            DataValue::Time(t) => format!("TIME '{}'", Self::render_time(t)),
            DataValue::DateTime(dt) => format!(
                "TIMESTAMP '{} {}'",
                Self::render_date(&dt.date())?,
                Self::render_time(&dt.time())
            ),
            DataValue::Uuid(uuid) if opts.caps.supports_char_to_uuid => {
                format!("CHAR_TO_UUID('{}')", uuid.hyphenated())
            }
            DataValue::Uuid(_) | DataValue::Binary(_) => {
                Self::push_constant_param(opts, val.clone(), params)
            }
        })
    }

    /// Firebird dates range from 0001-01-01 to 9999-12-31
    fn render_date(date: &fbquery_core::data::chrono::NaiveDate) -> Result<String> {
        use fbquery_core::data::chrono::Datelike;

        if !(1..=9999).contains(&date.year()) {
            return Err(CompileError::invalid_argument(format!(
                "Date {} is outside the range supported by Firebird",
                date
            ))
            .into());
        }

        Ok(date.format("%Y-%m-%d").to_string())
    }

    /// Firebird time precision is a ten-thousandth of a second
    fn render_time(time: &fbquery_core::data::chrono::NaiveTime) -> String {
        use fbquery_core::data::chrono::Timelike;

        format!(
            "{}.{:04}",
            time.format("%H:%M:%S"),
            (time.nanosecond() / 100_000).min(9999)
        )
    }

    fn render_param(
        opts: &RenderOptions,
        param: &qtree::Parameter,
        params: &mut Vec<QueryParam>,
    ) -> String {
        match opts.placeholders {
            PlaceholderStyle::Positional => {
                params.push(QueryParam::dynamic(param.clone()));
                "?".to_string()
            }
            PlaceholderStyle::Named => {
                // Named placeholders are bound once however often they appear
                let bound = params
                    .iter()
                    .filter_map(|p| p.as_dynamic())
                    .any(|p| p.name == param.name);

                if !bound {
                    params.push(QueryParam::dynamic(param.clone()));
                }

                format!("@{}", param.name)
            }
        }
    }

    fn push_constant_param(
        opts: &RenderOptions,
        val: DataValue,
        params: &mut Vec<QueryParam>,
    ) -> String {
        let nth = params.iter().filter(|p| p.as_constant().is_some()).count();
        params.push(QueryParam::constant(val));

        match opts.placeholders {
            PlaceholderStyle::Positional => "?".to_string(),
            PlaceholderStyle::Named => format!("@{}", opts.constant_param_name(nth)),
        }
    }
}
