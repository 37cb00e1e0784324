//! Structural metadata about a parsed statement.
//!
//! Every category is a list of SQL fragments in the order they are met while
//! walking the tree.

use std::collections::HashMap;
use std::ops::ControlFlow;

use serde::Serialize;
use sqlparser::ast::{
    BinaryOperator, Expr, GroupByExpr, JoinConstraint, JoinOperator, Query, Select, SelectItem,
    SetExpr, SetOperator, Statement, TableFactor, Visit, Visitor,
};

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub table_expressions: Vec<String>,
    pub column_expressions: Vec<String>,
    pub function_use: Vec<String>,
    pub aliases: Vec<String>,
    pub where_statements: Vec<String>,
    pub joins: Vec<String>,
    pub groupbys: Vec<String>,
    pub orderbys: Vec<String>,
    pub limits: Vec<String>,
    pub subqueries: Vec<String>,
    pub unions: Vec<String>,
    pub cte: Vec<String>,
    pub having: Vec<String>,
    pub distinct: Vec<String>,
    pub case: Vec<String>,
    pub literals: Vec<String>,
}

/// An equality join key, with qualifiers resolved to table names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinRelationship {
    pub left_table: String,
    pub left_column: String,
    pub right_table: String,
    pub right_column: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct MetadataReport {
    pub metadata: Metadata,
    pub join_relationships: Vec<JoinRelationship>,
}

pub fn extract_metadata(statement: &Statement) -> MetadataReport {
    let mut collector = Collector::default();
    let _ = statement.visit(&mut collector);
    collector.finish()
}

/// A column reference split into `(qualifier, column)`.
type QualifiedColumn = (String, String);

#[derive(Default)]
struct Collector {
    metadata: Metadata,
    /// Lower-cased table alias to table name.
    aliases: HashMap<String, String>,
    join_keys: Vec<(QualifiedColumn, QualifiedColumn)>,
}

impl Collector {
    fn finish(self) -> MetadataReport {
        let resolve = |qualifier: String| {
            self.aliases
                .get(&qualifier.to_ascii_lowercase())
                .cloned()
                .unwrap_or(qualifier)
        };
        let join_relationships = self
            .join_keys
            .into_iter()
            .map(|((left_table, left_column), (right_table, right_column))| JoinRelationship {
                left_table: resolve(left_table),
                left_column,
                right_table: resolve(right_table),
                right_column,
            })
            .collect();

        MetadataReport {
            metadata: self.metadata,
            join_relationships,
        }
    }

    fn collect_set_expr(&mut self, body: &SetExpr) {
        match body {
            SetExpr::Select(select) => self.collect_select(select),
            SetExpr::SetOperation {
                op, left, right, ..
            } => {
                if *op == SetOperator::Union {
                    self.metadata.unions.push(body.to_string());
                }
                self.collect_set_expr(left);
                self.collect_set_expr(right);
            }
            _ => {}
        }
    }

    fn collect_select(&mut self, select: &Select) {
        if let Some(distinct) = &select.distinct {
            self.metadata.distinct.push(distinct.to_string());
        }
        for item in &select.projection {
            if let SelectItem::ExprWithAlias { .. } = item {
                self.metadata.aliases.push(item.to_string());
            }
        }
        for table in &select.from {
            for join in &table.joins {
                self.metadata.joins.push(join.to_string().trim().to_string());
                if let Some(JoinConstraint::On(condition)) = join_constraint(&join.join_operator) {
                    self.collect_join_keys(condition);
                }
            }
        }
        if let Some(selection) = &select.selection {
            self.metadata
                .where_statements
                .push(format!("WHERE {}", selection));
        }
        let has_group_by = match &select.group_by {
            GroupByExpr::All(_) => true,
            GroupByExpr::Expressions(exprs, _) => !exprs.is_empty(),
        };
        if has_group_by {
            self.metadata.groupbys.push(select.group_by.to_string());
        }
        if let Some(having) = &select.having {
            self.metadata.having.push(format!("HAVING {}", having));
        }
    }

    fn collect_join_keys(&mut self, condition: &Expr) {
        match condition {
            Expr::Nested(inner) => self.collect_join_keys(inner),
            Expr::BinaryOp {
                left,
                op: BinaryOperator::And,
                right,
            } => {
                self.collect_join_keys(left);
                self.collect_join_keys(right);
            }
            Expr::BinaryOp {
                left,
                op: BinaryOperator::Eq,
                right,
            } => {
                if let (Some(left), Some(right)) = (qualified_column(left), qualified_column(right))
                {
                    self.join_keys.push((left, right));
                }
            }
            _ => {}
        }
    }
}

impl Visitor for Collector {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<()> {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.metadata.cte.push(cte.to_string());
            }
        }
        self.collect_set_expr(&query.body);
        if let Some(order_by) = &query.order_by {
            self.metadata.orderbys.push(order_by.to_string().trim().to_string());
        }
        if let Some(limit) = &query.limit_clause {
            self.metadata.limits.push(limit.to_string().trim().to_string());
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_table_factor(&mut self, factor: &TableFactor) -> ControlFlow<()> {
        match factor {
            TableFactor::Table { name, alias, .. } => {
                self.metadata.table_expressions.push(factor.to_string());
                if let Some(alias) = alias {
                    self.aliases
                        .insert(alias.name.value.to_ascii_lowercase(), name.to_string());
                }
            }
            TableFactor::Derived { .. } => self.metadata.subqueries.push(factor.to_string()),
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_expr(&mut self, expr: &Expr) -> ControlFlow<()> {
        match expr {
            Expr::Identifier(_) | Expr::CompoundIdentifier(_) => {
                self.metadata.column_expressions.push(expr.to_string())
            }
            Expr::Function(_) => self.metadata.function_use.push(expr.to_string()),
            Expr::Case { .. } => self.metadata.case.push(expr.to_string()),
            Expr::Value(_) => self.metadata.literals.push(expr.to_string()),
            Expr::Subquery(_) => self.metadata.subqueries.push(expr.to_string()),
            Expr::Exists { subquery, .. } => {
                self.metadata.subqueries.push(format!("({})", subquery))
            }
            Expr::InSubquery { subquery, .. } => {
                self.metadata.subqueries.push(format!("({})", subquery))
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }
}

fn join_constraint(operator: &JoinOperator) -> Option<&JoinConstraint> {
    match operator {
        JoinOperator::Join(constraint)
        | JoinOperator::Inner(constraint)
        | JoinOperator::Left(constraint)
        | JoinOperator::LeftOuter(constraint)
        | JoinOperator::Right(constraint)
        | JoinOperator::RightOuter(constraint)
        | JoinOperator::FullOuter(constraint)
        | JoinOperator::Semi(constraint)
        | JoinOperator::LeftSemi(constraint)
        | JoinOperator::RightSemi(constraint)
        | JoinOperator::Anti(constraint)
        | JoinOperator::LeftAnti(constraint)
        | JoinOperator::RightAnti(constraint)
        | JoinOperator::StraightJoin(constraint)
        | JoinOperator::AsOf { constraint, .. } => Some(constraint),
        _ => None,
    }
}

fn qualified_column(expr: &Expr) -> Option<QualifiedColumn> {
    match expr {
        Expr::CompoundIdentifier(idents) if idents.len() >= 2 => {
            let column = &idents[idents.len() - 1];
            let qualifier = &idents[idents.len() - 2];
            Some((qualifier.value.clone(), column.value.clone()))
        }
        _ => None,
    }
}
