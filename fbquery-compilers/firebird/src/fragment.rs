// The intermediate SQL AST produced by the visitor and consumed by the renderer.
// Fragments only live for the duration of a single compilation.

use fbquery_core::{
    data::DataValue,
    qtree::{self, OrderingType},
};

/// A SQL expression
#[derive(Debug, Clone, PartialEq)]
pub enum SqlFragment {
    /// `"alias"."name"`
    Column { table_alias: String, name: String },
    /// `"alias".*`
    AllColumns { table_alias: String },
    /// A constant, written inline where the dialect allows it
    Literal(DataValue),
    /// A bound parameter placeholder
    Parameter(qtree::Parameter),
    /// A bare keyword such as `CURRENT_TIMESTAMP`
    Keyword(&'static str),
    /// `NAME(arg, ...)`
    Function {
        name: &'static str,
        args: Vec<SqlFragment>,
    },
    /// `TRIM([BOTH|LEADING|TRAILING] [chars] FROM expr)`
    Trim {
        r#where: Option<TrimWhere>,
        chars: Option<Box<SqlFragment>>,
        expr: Box<SqlFragment>,
    },
    /// `SUBSTRING(expr FROM start [FOR len])`, the start is one-based
    Substring {
        expr: Box<SqlFragment>,
        start: Box<SqlFragment>,
        len: Option<Box<SqlFragment>>,
    },
    /// `EXTRACT(part FROM expr)`
    Extract { part: DatePart, expr: Box<SqlFragment> },
    /// `CAST(expr AS type)`
    Cast { expr: Box<SqlFragment>, r#type: CastType },
    /// `POSITION(needle IN haystack)`, one-based and zero when not found
    Position {
        needle: Box<SqlFragment>,
        haystack: Box<SqlFragment>,
    },
    /// `DATEADD(amount part TO expr)`
    DateAdd {
        amount: Box<SqlFragment>,
        part: DatePart,
        expr: Box<SqlFragment>,
    },
    /// `expr AT TIME ZONE 'zone'`
    AtTimeZone {
        expr: Box<SqlFragment>,
        zone: &'static str,
    },
    Binary {
        left: Box<SqlFragment>,
        op: SqlBinaryOp,
        right: Box<SqlFragment>,
    },
    Unary {
        op: SqlUnaryOp,
        expr: Box<SqlFragment>,
    },
    /// `expr IS [NOT] NULL`
    IsNull {
        expr: Box<SqlFragment>,
        negated: bool,
    },
    /// `CASE WHEN cond THEN val ... [ELSE val] END`
    Case {
        whens: Vec<(SqlFragment, SqlFragment)>,
        r#else: Option<Box<SqlFragment>>,
    },
    /// `EXISTS (subquery)`
    Exists(Box<SelectFragment>),
}

impl SqlFragment {
    pub fn column(table_alias: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Column {
            table_alias: table_alias.into(),
            name: name.into(),
        }
    }

    pub fn literal(val: impl Into<DataValue>) -> Self {
        Self::Literal(val.into())
    }

    pub fn binary(left: SqlFragment, op: SqlBinaryOp, right: SqlFragment) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn unary(op: SqlUnaryOp, expr: SqlFragment) -> Self {
        Self::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    pub fn function(name: &'static str, args: Vec<SqlFragment>) -> Self {
        Self::Function { name, args }
    }

    pub fn is_null(expr: SqlFragment, negated: bool) -> Self {
        Self::IsNull {
            expr: Box::new(expr),
            negated,
        }
    }

    pub fn cast(expr: SqlFragment, r#type: CastType) -> Self {
        Self::Cast {
            expr: Box::new(expr),
            r#type,
        }
    }

    /// Whether the fragment is a search condition rather than a value
    pub fn is_predicate(&self) -> bool {
        match self {
            Self::Binary { op, .. } => op.is_predicate(),
            Self::Unary { op, .. } => *op == SqlUnaryOp::Not,
            Self::IsNull { .. } | Self::Exists(_) => true,
            _ => false,
        }
    }

    /// Calls `f` on this fragment and every fragment nested in it, including subqueries
    pub fn walk<'a, F: FnMut(&'a SqlFragment)>(&'a self, f: &mut F) {
        f(self);

        match self {
            Self::Column { .. }
            | Self::AllColumns { .. }
            | Self::Literal(_)
            | Self::Parameter(_)
            | Self::Keyword(_) => {}
            Self::Function { args, .. } => args.iter().for_each(|arg| arg.walk(f)),
            Self::Trim { chars, expr, .. } => {
                if let Some(chars) = chars {
                    chars.walk(f);
                }
                expr.walk(f);
            }
            Self::Substring { expr, start, len } => {
                expr.walk(f);
                start.walk(f);
                if let Some(len) = len {
                    len.walk(f);
                }
            }
            Self::Extract { expr, .. }
            | Self::Cast { expr, .. }
            | Self::AtTimeZone { expr, .. }
            | Self::Unary { expr, .. }
            | Self::IsNull { expr, .. } => expr.walk(f),
            Self::Position { needle, haystack } => {
                needle.walk(f);
                haystack.walk(f);
            }
            Self::DateAdd { amount, expr, .. } => {
                amount.walk(f);
                expr.walk(f);
            }
            Self::Binary { left, right, .. } => {
                left.walk(f);
                right.walk(f);
            }
            Self::Case { whens, r#else } => {
                for (cond, val) in whens {
                    cond.walk(f);
                    val.walk(f);
                }
                if let Some(r#else) = r#else {
                    r#else.walk(f);
                }
            }
            Self::Exists(select) => select.walk(f),
        }
    }

    /// Rewrites the column references of the source `from` to refer to `to` instead.
    /// Returns `None` if the expression contains a subquery.
    pub fn rebase(&self, from: &str, to: &str) -> Option<SqlFragment> {
        let mut has_subquery = false;
        self.walk(&mut |frag| has_subquery |= matches!(frag, Self::Exists(_)));

        if has_subquery {
            return None;
        }

        let mut rebased = self.clone();
        rebased.rename_alias(from, to);
        Some(rebased)
    }

    fn rename_alias(&mut self, from: &str, to: &str) {
        match self {
            Self::Column { table_alias, .. } | Self::AllColumns { table_alias } => {
                if *table_alias == from {
                    *table_alias = to.to_string();
                }
            }
            Self::Literal(_) | Self::Parameter(_) | Self::Keyword(_) | Self::Exists(_) => {}
            Self::Function { args, .. } => {
                args.iter_mut().for_each(|arg| arg.rename_alias(from, to))
            }
            Self::Trim { chars, expr, .. } => {
                if let Some(chars) = chars {
                    chars.rename_alias(from, to);
                }
                expr.rename_alias(from, to);
            }
            Self::Substring { expr, start, len } => {
                expr.rename_alias(from, to);
                start.rename_alias(from, to);
                if let Some(len) = len {
                    len.rename_alias(from, to);
                }
            }
            Self::Extract { expr, .. }
            | Self::Cast { expr, .. }
            | Self::AtTimeZone { expr, .. }
            | Self::Unary { expr, .. }
            | Self::IsNull { expr, .. } => expr.rename_alias(from, to),
            Self::Position { needle, haystack } => {
                needle.rename_alias(from, to);
                haystack.rename_alias(from, to);
            }
            Self::DateAdd { amount, expr, .. } => {
                amount.rename_alias(from, to);
                expr.rename_alias(from, to);
            }
            Self::Binary { left, right, .. } => {
                left.rename_alias(from, to);
                right.rename_alias(from, to);
            }
            Self::Case { whens, r#else } => {
                for (cond, val) in whens.iter_mut() {
                    cond.rename_alias(from, to);
                    val.rename_alias(from, to);
                }
                if let Some(r#else) = r#else {
                    r#else.rename_alias(from, to);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlBinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Concat,
    And,
    Or,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    StartingWith,
}

impl SqlBinaryOp {
    pub fn is_predicate(&self) -> bool {
        !matches!(
            self,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Modulo | Self::Concat
        )
    }
}

impl From<qtree::BinaryOpType> for SqlBinaryOp {
    fn from(op: qtree::BinaryOpType) -> Self {
        match op {
            qtree::BinaryOpType::Add => Self::Add,
            qtree::BinaryOpType::Subtract => Self::Subtract,
            qtree::BinaryOpType::Multiply => Self::Multiply,
            qtree::BinaryOpType::Divide => Self::Divide,
            qtree::BinaryOpType::Modulo => Self::Modulo,
            qtree::BinaryOpType::Concat => Self::Concat,
            qtree::BinaryOpType::LogicalAnd => Self::And,
            qtree::BinaryOpType::LogicalOr => Self::Or,
            qtree::BinaryOpType::Equal => Self::Equal,
            qtree::BinaryOpType::NotEqual => Self::NotEqual,
            qtree::BinaryOpType::GreaterThan => Self::GreaterThan,
            qtree::BinaryOpType::GreaterThanOrEqual => Self::GreaterThanOrEqual,
            qtree::BinaryOpType::LessThan => Self::LessThan,
            qtree::BinaryOpType::LessThanOrEqual => Self::LessThanOrEqual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlUnaryOp {
    Not,
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimWhere {
    Both,
    Leading,
    Trailing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
    YearDay,
    WeekDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastType {
    Date,
    Time,
    Timestamp,
}

/// A SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectFragment {
    pub cols: Vec<SelectColumn>,
    pub from: FromClause,
    /// Conditions combined with AND
    pub r#where: Vec<SqlFragment>,
    pub order_bys: Vec<(SqlFragment, OrderingType)>,
    pub range: Option<RangeClause>,
}

impl SelectFragment {
    pub fn new(from: FromClause) -> Self {
        Self {
            cols: vec![],
            from,
            r#where: vec![],
            order_bys: vec![],
            range: None,
        }
    }

    /// Whether further filtering, ordering or paging must wrap this select in a derived table
    pub fn is_paged(&self) -> bool {
        self.range.is_some()
    }

    /// Calls `f` on every expression of the select, including derived tables and subqueries
    pub fn walk<'a, F: FnMut(&'a SqlFragment)>(&'a self, f: &mut F) {
        for col in self.cols.iter() {
            col.expr.walk(f);
        }

        if let FromClause::Derived { select, .. } = &self.from {
            select.walk(f);
        }

        for cond in self.r#where.iter() {
            cond.walk(f);
        }

        for (key, _) in self.order_bys.iter() {
            key.walk(f);
        }

        if let Some(range) = &self.range {
            range.lower.walk(f);
            if let Some(upper) = &range.upper {
                upper.walk(f);
            }
        }
    }

    /// Whether the select only returns every column of its source
    pub fn selects_all_columns(&self) -> bool {
        match (self.cols.as_slice(), self.from.alias()) {
            ([SelectColumn {
                expr: SqlFragment::AllColumns { table_alias },
                alias: None,
            }], Some(from)) => table_alias == from,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    pub expr: SqlFragment,
    pub alias: Option<String>,
}

impl SelectColumn {
    pub fn new(expr: SqlFragment, alias: Option<String>) -> Self {
        Self { expr, alias }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FromClause {
    /// `"TABLE" "alias"`
    Table { name: String, alias: String },
    /// `(SELECT ...) "alias"`
    Derived {
        select: Box<SelectFragment>,
        alias: String,
    },
    /// The single row system table `RDB$DATABASE`
    Dual,
}

impl FromClause {
    pub fn alias(&self) -> Option<&str> {
        match self {
            Self::Table { alias, .. } | Self::Derived { alias, .. } => Some(alias),
            Self::Dual => None,
        }
    }
}

/// `ROWS lower [TO upper]`, both bounds are one-based and inclusive
#[derive(Debug, Clone, PartialEq)]
pub struct RangeClause {
    pub lower: SqlFragment,
    pub upper: Option<SqlFragment>,
}
