use std::collections::HashSet;

use fbquery_core::{
    data::DataValue,
    err::{CompileError, Result},
    qtree::{self, BinaryOpType, Member, OrderingType, QueryNode, UnaryOpType},
};

use crate::{
    capabilities::{DialectCapabilities, Feature},
    fragment::{FromClause, SelectColumn, SelectFragment, SqlBinaryOp, SqlFragment, SqlUnaryOp},
    functions::{self, OperationId},
    range::{compile_range, PagingSpec},
};

/// Translates a query tree into the intermediate SQL AST
pub fn translate(caps: &DialectCapabilities, query: &QueryNode) -> Result<SelectFragment> {
    Translator::new(caps).translate(query)
}

/// Adds the alias of every source in the tree, including those of subqueries
fn collect_source_aliases(node: &QueryNode, aliases: &mut HashSet<String>) {
    let children: Vec<&QueryNode> = match node {
        QueryNode::Source(source) => {
            aliases.insert(source.alias());
            vec![]
        }
        QueryNode::Filter(filter) => vec![&*filter.source, &*filter.predicate],
        QueryNode::Project(project) => std::iter::once(&*project.source)
            .chain(project.cols.iter().map(|(_, expr)| expr))
            .collect(),
        QueryNode::Skip(skip) => vec![&*skip.source, &*skip.count],
        QueryNode::Take(take) => vec![&*take.source, &*take.count],
        QueryNode::OrderBy(order) => vec![&*order.source, &*order.key],
        QueryNode::Any(any) => std::iter::once(&*any.source)
            .chain(any.predicate.as_deref())
            .collect(),
        QueryNode::MemberAccess(access) => access.instance.as_deref().into_iter().collect(),
        QueryNode::MethodCall(call) => call
            .instance
            .as_deref()
            .into_iter()
            .chain(call.args.iter())
            .collect(),
        QueryNode::BinaryOp(op) => vec![&*op.left, &*op.right],
        QueryNode::UnaryOp(op) => vec![&*op.expr],
        QueryNode::Constant(_) | QueryNode::Parameter(_) => vec![],
    };

    for child in children {
        collect_source_aliases(child, aliases);
    }
}

/// A source visible to expressions, innermost last
#[derive(Debug, Clone)]
struct Scope {
    /// The alias the query tree refers to the source by
    logical: String,
    /// The alias of the source in the generated sql
    sql: String,
}

/// A select under construction
#[derive(Debug)]
struct SelectBuilder {
    select: SelectFragment,
    paging: PagingSpec,
    projected: bool,
}

impl SelectBuilder {
    fn new(from: FromClause) -> Self {
        Self {
            select: SelectFragment::new(from),
            paging: PagingSpec::default(),
            projected: false,
        }
    }

    fn is_paged(&self) -> bool {
        !self.paging.is_empty()
    }
}

/// Walks the query tree, one instance per compilation
pub struct Translator<'a> {
    caps: &'a DialectCapabilities,
    scopes: Vec<Scope>,
    /// Counter for naming derived tables
    derived: usize,
    /// Source aliases used by the query tree, derived tables must not shadow them
    source_aliases: HashSet<String>,
}

impl<'a> Translator<'a> {
    pub fn new(caps: &'a DialectCapabilities) -> Self {
        Self {
            caps,
            scopes: vec![],
            derived: 0,
            source_aliases: HashSet::new(),
        }
    }

    /// Translates a query-shaped node into a select statement
    pub fn translate(&mut self, node: &QueryNode) -> Result<SelectFragment> {
        collect_source_aliases(node, &mut self.source_aliases);
        let depth = self.scopes.len();

        let res = match node {
            QueryNode::Any(any) => self.translate_top_level_any(any),
            _ if node.is_sequence() => self
                .translate_sequence(node)
                .and_then(|b| self.finish(b)),
            _ => Err(CompileError::unsupported_expression(format!(
                "{} cannot be used as a query",
                node.kind()
            ))
            .into()),
        };

        self.scopes.truncate(depth);
        res
    }

    fn translate_sequence(&mut self, node: &QueryNode) -> Result<SelectBuilder> {
        match node {
            QueryNode::Source(source) => {
                let alias = source.alias();
                self.scopes.push(Scope {
                    logical: alias.clone(),
                    sql: alias.clone(),
                });

                Ok(SelectBuilder::new(FromClause::Table {
                    name: source.table.clone(),
                    alias,
                }))
            }
            QueryNode::Filter(filter) => {
                let mut builder = self.translate_sequence(&filter.source)?;

                if builder.is_paged() || builder.projected {
                    builder = self.push_down(builder)?;
                }

                let predicate = self.translate_predicate(&filter.predicate)?;
                builder.select.r#where.push(predicate);
                Ok(builder)
            }
            QueryNode::Project(project) => {
                let mut builder = self.translate_sequence(&project.source)?;

                if builder.projected {
                    builder = self.push_down(builder)?;
                }

                builder.select.cols = project
                    .cols
                    .iter()
                    .map(|(alias, expr)| {
                        Ok(SelectColumn::new(
                            self.translate_value(expr)?,
                            Some(alias.clone()),
                        ))
                    })
                    .collect::<Result<Vec<_>>>()?;
                builder.projected = true;
                Ok(builder)
            }
            QueryNode::Skip(skip) => {
                let mut builder = self.translate_sequence(&skip.source)?;

                if builder.is_paged() {
                    builder = self.push_down(builder)?;
                }

                builder.paging.skip = Some(PagingSpec::row_count(&skip.count, "Skip")?);
                Ok(builder)
            }
            QueryNode::Take(take) => {
                let mut builder = self.translate_sequence(&take.source)?;

                if builder.paging.take.is_some() {
                    builder = self.push_down(builder)?;
                }

                builder.paging.take = Some(PagingSpec::row_count(&take.count, "Take")?);
                Ok(builder)
            }
            QueryNode::OrderBy(order) => {
                let mut builder = self.translate_sequence(&order.source)?;

                if builder.is_paged() || builder.projected {
                    builder = self.push_down(builder)?;
                }

                let key = self.translate_value(&order.key)?;
                builder.select.order_bys.push((key, order.r#type));
                Ok(builder)
            }
            _ => Err(CompileError::unsupported_expression(format!(
                "{} cannot be used as a sequence",
                node.kind()
            ))
            .into()),
        }
    }

    /// Wraps the select in a derived table so further operators apply to its result
    fn push_down(&mut self, builder: SelectBuilder) -> Result<SelectBuilder> {
        let mut inner = self.finish(builder)?;
        let alias = self.next_derived_alias();

        // The rows of a derived table are unordered
        let order_bys = Self::carry_order_bys(&inner, &alias)?;
        if !inner.is_paged() {
            inner.order_bys.clear();
        }

        if let Some(scope) = self.scopes.last_mut() {
            scope.sql = alias.clone();
        }

        let mut outer = SelectBuilder::new(FromClause::Derived {
            select: Box::new(inner),
            alias,
        });
        outer.select.order_bys = order_bys;
        Ok(outer)
    }

    fn next_derived_alias(&mut self) -> String {
        loop {
            let alias = format!("t{}", self.derived);
            self.derived += 1;

            if !self.source_aliases.contains(&alias) {
                return alias;
            }
        }
    }

    /// Restates the ordering of the inner select in terms of the derived table's columns
    fn carry_order_bys(
        inner: &SelectFragment,
        alias: &str,
    ) -> Result<Vec<(SqlFragment, OrderingType)>> {
        inner
            .order_bys
            .iter()
            .map(|(key, r#type)| {
                let projected = inner
                    .cols
                    .iter()
                    .find(|col| &col.expr == key)
                    .and_then(|col| col.alias.clone());

                if let Some(name) = projected {
                    return Ok((SqlFragment::column(alias, name), *r#type));
                }

                let rebased = match inner.from.alias() {
                    Some(from) if inner.selects_all_columns() => key.rebase(from, alias),
                    _ => None,
                };

                match rebased {
                    Some(key) => Ok((key, *r#type)),
                    None => Err(CompileError::unsupported_expression(
                        "Cannot keep the ordering of a projected query, order by one of its projected columns",
                    )
                    .into()),
                }
            })
            .collect()
    }

    fn finish(&mut self, builder: SelectBuilder) -> Result<SelectFragment> {
        let mut select = builder.select;

        if select.cols.is_empty() {
            let table_alias = select.from.alias().map(|a| a.to_string()).ok_or_else(|| {
                CompileError::unsupported_expression("Cannot select all columns without a source")
            })?;
            select
                .cols
                .push(SelectColumn::new(SqlFragment::AllColumns { table_alias }, None));
        }

        select.range = compile_range(&builder.paging)?;
        Ok(select)
    }

    fn translate_top_level_any(&mut self, any: &qtree::Any) -> Result<SelectFragment> {
        self.caps.require(Feature::TopLevelAny)?;

        let exists = self.translate_exists(any)?;
        let mut select = SelectFragment::new(FromClause::Dual);
        select.cols.push(SelectColumn::new(
            SqlFragment::Case {
                whens: vec![(
                    SqlFragment::Exists(Box::new(exists)),
                    SqlFragment::literal(true),
                )],
                r#else: Some(Box::new(SqlFragment::literal(false))),
            },
            None,
        ));

        Ok(select)
    }

    /// Translates `Any` into the subquery of an EXISTS test.
    /// The subquery may refer to the enclosing sources.
    fn translate_exists(&mut self, any: &qtree::Any) -> Result<SelectFragment> {
        let depth = self.scopes.len();
        let res = self.translate_exists_inner(any);
        self.scopes.truncate(depth);
        res
    }

    fn translate_exists_inner(&mut self, any: &qtree::Any) -> Result<SelectFragment> {
        let mut builder = self.translate_sequence(&any.source)?;

        if let Some(predicate) = &any.predicate {
            if builder.is_paged() || builder.projected {
                builder = self.push_down(builder)?;
            }

            let predicate = self.translate_predicate(predicate)?;
            builder.select.r#where.push(predicate);
        }

        if !builder.is_paged() {
            builder.select.order_bys.clear();
        }

        builder.select.cols = vec![SelectColumn::new(SqlFragment::literal(1), None)];
        self.finish(builder)
    }

    /// Translates a scalar-shaped node
    pub fn translate_expr(&mut self, node: &QueryNode) -> Result<SqlFragment> {
        match node {
            QueryNode::Constant(val) => Ok(SqlFragment::Literal(val.clone())),
            QueryNode::Parameter(param) => Ok(SqlFragment::Parameter(param.clone())),
            QueryNode::MemberAccess(access) => self.translate_member_access(access),
            QueryNode::MethodCall(call) => self.translate_method_call(call),
            QueryNode::BinaryOp(op) => self.translate_binary_op(op),
            QueryNode::UnaryOp(op) => self.translate_unary_op(op),
            QueryNode::Any(any) => Ok(SqlFragment::Exists(Box::new(self.translate_exists(any)?))),
            QueryNode::Source(_)
            | QueryNode::Filter(_)
            | QueryNode::Project(_)
            | QueryNode::Skip(_)
            | QueryNode::Take(_)
            | QueryNode::OrderBy(_) => Err(CompileError::unsupported_expression(format!(
                "{} cannot be used as a scalar expression",
                node.kind()
            ))
            .into()),
        }
    }

    /// Translates a node used as a search condition
    fn translate_predicate(&mut self, node: &QueryNode) -> Result<SqlFragment> {
        let frag = self.translate_expr(node)?;
        Ok(self.as_predicate(frag))
    }

    /// Translates a node used as a value
    fn translate_value(&mut self, node: &QueryNode) -> Result<SqlFragment> {
        let frag = self.translate_expr(node)?;
        Ok(self.as_value(frag))
    }

    /// Without a BOOLEAN type, boolean values are stored as 1/0
    fn as_predicate(&self, frag: SqlFragment) -> SqlFragment {
        if frag.is_predicate() || self.caps.supports_boolean_type {
            frag
        } else {
            SqlFragment::binary(frag, SqlBinaryOp::Equal, SqlFragment::literal(1))
        }
    }

    /// Without a BOOLEAN type, conditions cannot be used as values
    fn as_value(&self, frag: SqlFragment) -> SqlFragment {
        if !frag.is_predicate() || self.caps.supports_boolean_type {
            frag
        } else {
            SqlFragment::Case {
                whens: vec![(frag, SqlFragment::literal(1))],
                r#else: Some(Box::new(SqlFragment::literal(0))),
            }
        }
    }

    fn translate_member_access(&mut self, access: &qtree::MemberAccess) -> Result<SqlFragment> {
        match &access.member {
            Member::Column(col) => {
                if access.instance.is_some() {
                    return Err(CompileError::unsupported_expression(format!(
                        "Column \"{}\" cannot be read from an expression",
                        col.name
                    ))
                    .into());
                }

                let scope = match &col.alias {
                    Some(alias) => self.scopes.iter().rev().find(|s| &s.logical == alias),
                    None => self.scopes.last(),
                };

                let scope = scope.ok_or_else(|| {
                    CompileError::unsupported_expression(match &col.alias {
                        Some(alias) => format!(
                            "Column \"{}\" refers to unknown source \"{}\"",
                            col.name, alias
                        ),
                        None => format!("Column \"{}\" is not in the scope of a source", col.name),
                    })
                })?;

                Ok(SqlFragment::column(scope.sql.clone(), col.name.clone()))
            }
            Member::Property(prop) => {
                let instance = match &access.instance {
                    Some(instance) => Some(self.translate_value(instance)?),
                    None => None,
                };

                functions::lookup(OperationId::Property(*prop), 0)?.apply(
                    instance,
                    vec![],
                    self.caps,
                )
            }
        }
    }

    fn translate_method_call(&mut self, call: &qtree::MethodCall) -> Result<SqlFragment> {
        let entry = functions::lookup(OperationId::Method(call.method), call.args.len())?;

        let instance = match &call.instance {
            Some(instance) => Some(self.translate_value(instance)?),
            None => None,
        };

        let args = call
            .args
            .iter()
            .map(|arg| self.translate_value(arg))
            .collect::<Result<Vec<_>>>()?;

        entry.apply(instance, args, self.caps)
    }

    fn translate_binary_op(&mut self, op: &qtree::BinaryOp) -> Result<SqlFragment> {
        // Comparisons to NULL are never true in sql
        if matches!(op.r#type, BinaryOpType::Equal | BinaryOpType::NotEqual) {
            let negated = op.r#type == BinaryOpType::NotEqual;

            match (&*op.left, &*op.right) {
                (QueryNode::Constant(DataValue::Null), other)
                | (other, QueryNode::Constant(DataValue::Null)) => {
                    return Ok(SqlFragment::is_null(self.translate_value(other)?, negated));
                }
                _ => {}
            }
        }

        let (left, right) = if op.r#type.is_logical() {
            (
                self.translate_predicate(&op.left)?,
                self.translate_predicate(&op.right)?,
            )
        } else {
            (
                self.translate_value(&op.left)?,
                self.translate_value(&op.right)?,
            )
        };

        Ok(SqlFragment::binary(left, op.r#type.into(), right))
    }

    fn translate_unary_op(&mut self, op: &qtree::UnaryOp) -> Result<SqlFragment> {
        Ok(match op.r#type {
            UnaryOpType::LogicalNot => {
                SqlFragment::unary(SqlUnaryOp::Not, self.translate_predicate(&op.expr)?)
            }
            UnaryOpType::Negate => {
                SqlFragment::unary(SqlUnaryOp::Negate, self.translate_value(&op.expr)?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use fbquery_core::{
        data::DataType,
        qtree::{col, col_of, constant, equal, not_equal, null, param, source, Method, Property},
        version::ServerVersion,
    };
    use pretty_assertions::assert_eq;

    use crate::{capabilities::capabilities_for, fragment::RangeClause};

    use super::*;

    fn caps() -> DialectCapabilities {
        DialectCapabilities::default()
    }

    fn attachments() -> QueryNode {
        source("MON$ATTACHMENTS")
    }

    fn table() -> FromClause {
        FromClause::Table {
            name: "MON$ATTACHMENTS".into(),
            alias: "m".into(),
        }
    }

    fn all_cols(alias: &str) -> Vec<SelectColumn> {
        vec![SelectColumn::new(
            SqlFragment::AllColumns {
                table_alias: alias.into(),
            },
            None,
        )]
    }

    #[test]
    fn test_translate_source() {
        let select = translate(&caps(), &attachments()).unwrap();

        assert_eq!(
            select,
            SelectFragment {
                cols: all_cols("m"),
                from: table(),
                r#where: vec![],
                order_bys: vec![],
                range: None,
            }
        );
    }

    #[test]
    fn test_translate_filter_trim() {
        let query = attachments().filter(not_equal(
            col("MON$ATTACHMENT_NAME").call(Method::Trim, vec![]),
            constant(""),
        ));

        let select = translate(&caps(), &query).unwrap();

        assert_eq!(
            select.r#where,
            vec![SqlFragment::binary(
                SqlFragment::Trim {
                    r#where: None,
                    chars: None,
                    expr: Box::new(SqlFragment::column("m", "MON$ATTACHMENT_NAME")),
                },
                SqlBinaryOp::NotEqual,
                SqlFragment::literal(""),
            )]
        );
    }

    #[test]
    fn test_translate_consecutive_filters() {
        let query = attachments()
            .filter(not_equal(col("MON$ATTACHMENT_ID"), constant(0)))
            .filter(equal(col("MON$STATE"), constant(1)));

        let select = translate(&caps(), &query).unwrap();

        assert_eq!(select.r#where.len(), 2);
        assert_eq!(select.from, table());
    }

    #[test]
    fn test_translate_null_comparison() {
        let query = attachments()
            .filter(equal(col("MON$REMOTE_ADDRESS"), null()))
            .filter(not_equal(null(), col("MON$USER")));

        let select = translate(&caps(), &query).unwrap();

        assert_eq!(
            select.r#where,
            vec![
                SqlFragment::is_null(SqlFragment::column("m", "MON$REMOTE_ADDRESS"), false),
                SqlFragment::is_null(SqlFragment::column("m", "MON$USER"), true),
            ]
        );
    }

    #[test]
    fn test_translate_skip_take_single_range() {
        let query = attachments().skip(constant(1)).take(constant(3));

        let select = translate(&caps(), &query).unwrap();

        assert_eq!(select.from, table());
        assert_eq!(
            select.range,
            Some(RangeClause {
                lower: SqlFragment::binary(
                    SqlFragment::literal(1),
                    SqlBinaryOp::Add,
                    SqlFragment::literal(1)
                ),
                upper: Some(SqlFragment::binary(
                    SqlFragment::literal(1),
                    SqlBinaryOp::Add,
                    SqlFragment::literal(3)
                )),
            })
        );
    }

    #[test]
    fn test_translate_filter_after_take_pushes_down() {
        let query = attachments()
            .take(constant(10))
            .filter(not_equal(col("MON$ATTACHMENT_ID"), constant(0)));

        let select = translate(&caps(), &query).unwrap();

        assert_eq!(select.cols, all_cols("t0"));
        assert_eq!(
            select.r#where,
            vec![SqlFragment::binary(
                SqlFragment::column("t0", "MON$ATTACHMENT_ID"),
                SqlBinaryOp::NotEqual,
                SqlFragment::literal(0)
            )]
        );

        let inner = match select.from {
            FromClause::Derived { select, alias } => {
                assert_eq!(alias, "t0");
                select
            }
            other => panic!("Unexpected from clause: {:?}", other),
        };
        assert_eq!(inner.from, table());
        assert!(inner.range.is_some());
    }

    #[test]
    fn test_translate_take_after_skip_stays_flat_skip_after_take_pushes_down() {
        let flat = translate(&caps(), &attachments().skip(constant(2)).take(constant(3))).unwrap();
        assert_eq!(flat.from, table());

        let nested = translate(&caps(), &attachments().take(constant(3)).skip(constant(2))).unwrap();
        assert!(matches!(nested.from, FromClause::Derived { .. }));
    }

    #[test]
    fn test_translate_order_survives_push_down() {
        let query = attachments()
            .order_by(col("MON$TIMESTAMP"), OrderingType::Desc)
            .take(constant(10))
            .skip(constant(2));

        let select = translate(&caps(), &query).unwrap();

        assert_eq!(
            select.order_bys,
            vec![(SqlFragment::column("t0", "MON$TIMESTAMP"), OrderingType::Desc)]
        );

        let inner = match select.from {
            FromClause::Derived { select, .. } => select,
            other => panic!("Unexpected from clause: {:?}", other),
        };
        assert_eq!(
            inner.order_bys,
            vec![(SqlFragment::column("m", "MON$TIMESTAMP"), OrderingType::Desc)]
        );
        assert!(inner.range.is_some());
    }

    #[test]
    fn test_translate_order_of_projection_uses_column_alias() {
        let query = attachments()
            .order_by(col("MON$TIMESTAMP"), OrderingType::Asc)
            .project([("Started", col("MON$TIMESTAMP"))])
            .filter(not_equal(col("Started"), null()));

        let select = translate(&caps(), &query).unwrap();

        assert_eq!(
            select.order_bys,
            vec![(SqlFragment::column("t0", "Started"), OrderingType::Asc)]
        );
        match select.from {
            FromClause::Derived { select, .. } => assert_eq!(select.order_bys, vec![]),
            other => panic!("Unexpected from clause: {:?}", other),
        }
    }

    #[test]
    fn test_translate_order_hidden_by_projection_is_rejected() {
        let query = attachments()
            .order_by(col("MON$TIMESTAMP"), OrderingType::Asc)
            .project([("Id", col("MON$ATTACHMENT_ID"))])
            .filter(not_equal(col("Id"), constant(0)));

        let err = translate(&caps(), &query).unwrap_err();

        assert!(matches!(
            CompileError::of(&err),
            Some(CompileError::UnsupportedExpression(_))
        ));
    }

    #[test]
    fn test_translate_derived_alias_avoids_source_aliases() {
        let query = qtree::source_as("MON$ATTACHMENTS", "t0")
            .take(constant(10))
            .filter(not_equal(col("MON$ATTACHMENT_ID"), constant(0)));

        let select = translate(&caps(), &query).unwrap();

        assert_eq!(select.cols, all_cols("t1"));
        match select.from {
            FromClause::Derived { select, alias } => {
                assert_eq!(alias, "t1");
                assert_eq!(select.from.alias(), Some("t0"));
            }
            other => panic!("Unexpected from clause: {:?}", other),
        }
    }

    #[test]
    fn test_translate_project() {
        let query = attachments().project([(
            "Year",
            col("MON$TIMESTAMP").member(Property::Year),
        )]);

        let select = translate(&caps(), &query).unwrap();

        assert_eq!(
            select.cols,
            vec![SelectColumn::new(
                SqlFragment::Extract {
                    part: crate::fragment::DatePart::Year,
                    expr: Box::new(SqlFragment::column("m", "MON$TIMESTAMP")),
                },
                Some("Year".into())
            )]
        );
    }

    #[test]
    fn test_translate_top_level_any() {
        let query = attachments().any(Some(not_equal(col("MON$ATTACHMENT_ID"), constant(0))));

        let select = translate(&caps(), &query).unwrap();

        assert_eq!(select.from, FromClause::Dual);
        assert!(matches!(
            &select.cols[0].expr,
            SqlFragment::Case { whens, .. } if matches!(whens[0].0, SqlFragment::Exists(_))
        ));
    }

    #[test]
    fn test_translate_top_level_any_unsupported() {
        let query = attachments().any(None);

        let err = translate(&capabilities_for(ServerVersion::new(2, 5, 9, 0)), &query).unwrap_err();

        assert!(matches!(
            CompileError::of(&err),
            Some(CompileError::UnsupportedFeature(_))
        ));
    }

    #[test]
    fn test_translate_nested_any_correlated() {
        let query = source_as_statements().filter(
            attachments()
                .any(Some(equal(
                    col("MON$ATTACHMENT_ID"),
                    col_of("s", "MON$ATTACHMENT_ID"),
                ))),
        );

        let select = translate(&capabilities_for(ServerVersion::new(2, 5, 0, 0)), &query).unwrap();

        let exists = match &select.r#where[0] {
            SqlFragment::Exists(exists) => exists,
            other => panic!("Unexpected predicate: {:?}", other),
        };
        assert_eq!(
            exists.r#where,
            vec![SqlFragment::binary(
                SqlFragment::column("m", "MON$ATTACHMENT_ID"),
                SqlBinaryOp::Equal,
                SqlFragment::column("s", "MON$ATTACHMENT_ID"),
            )]
        );
    }

    fn source_as_statements() -> QueryNode {
        qtree::source_as("MON$STATEMENTS", "s")
    }

    #[test]
    fn test_translate_unknown_alias() {
        let query = attachments().filter(equal(col_of("x", "MON$ATTACHMENT_ID"), constant(1)));

        let err = translate(&caps(), &query).unwrap_err();

        assert_eq!(
            CompileError::of(&err),
            Some(&CompileError::UnsupportedExpression(
                "Column \"MON$ATTACHMENT_ID\" refers to unknown source \"x\"".into()
            ))
        );
    }

    #[test]
    fn test_translate_scalar_at_query_position() {
        let err = translate(&caps(), &col("MON$ATTACHMENT_ID")).unwrap_err();

        assert!(matches!(
            CompileError::of(&err),
            Some(CompileError::UnsupportedExpression(_))
        ));
    }

    #[test]
    fn test_translate_boolean_predicate_without_boolean_type() {
        let caps = capabilities_for(ServerVersion::new(2, 5, 0, 0));
        let query = attachments()
            .filter(col("MON$SYSTEM_FLAG"))
            .project([("HasId", not_equal(col("MON$ATTACHMENT_ID"), constant(0)))]);

        let select = translate(&caps, &query).unwrap();

        assert_eq!(
            select.r#where,
            vec![SqlFragment::binary(
                SqlFragment::column("m", "MON$SYSTEM_FLAG"),
                SqlBinaryOp::Equal,
                SqlFragment::literal(1)
            )]
        );
        assert!(matches!(select.cols[0].expr, SqlFragment::Case { .. }));
    }

    #[test]
    fn test_translate_parameter_paging() {
        let query = attachments()
            .skip(param("skip", DataType::Int32))
            .take(param("take", DataType::Int32));

        let select = translate(&caps(), &query).unwrap();
        let range = select.range.unwrap();

        assert_eq!(
            range.lower,
            SqlFragment::binary(
                SqlFragment::Parameter(qtree::Parameter::new("skip", DataType::Int32)),
                SqlBinaryOp::Add,
                SqlFragment::literal(1)
            )
        );
    }
}
