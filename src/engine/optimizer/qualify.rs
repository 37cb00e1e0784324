//! Qualifies columns in single-table SELECTs and expands `*` from the schema.

use std::ops::ControlFlow;

use sqlparser::ast::{
    Expr, GroupByExpr, Ident, ObjectName, ObjectNamePart, Query, Select, SelectItem, SetExpr,
    Statement, TableFactor, VisitMut, VisitorMut, WildcardAdditionalOptions,
};

use crate::engine::Schema;

pub fn qualify_columns(statement: &mut Statement, schema: &Schema) {
    let _ = statement.visit(&mut QualifyColumns { schema });
}

struct QualifyColumns<'a> {
    schema: &'a Schema,
}

impl VisitorMut for QualifyColumns<'_> {
    type Break = ();

    fn pre_visit_query(&mut self, query: &mut Query) -> ControlFlow<()> {
        qualify_set_expr(&mut query.body, self.schema);
        ControlFlow::Continue(())
    }
}

fn qualify_set_expr(body: &mut SetExpr, schema: &Schema) {
    match body {
        SetExpr::Select(select) => qualify_select(select, schema),
        SetExpr::SetOperation { left, right, .. } => {
            qualify_set_expr(left, schema);
            qualify_set_expr(right, schema);
        }
        _ => {}
    }
}

fn qualify_select(select: &mut Select, schema: &Schema) {
    let Some((table, qualifier)) = single_table(select) else {
        return;
    };

    if let Some(columns) = schema.columns(&table) {
        let projection = std::mem::take(&mut select.projection);
        select.projection = projection
            .into_iter()
            .flat_map(|item| match item {
                SelectItem::Wildcard(options) if options == WildcardAdditionalOptions::default() => {
                    columns
                        .iter()
                        .map(|column| {
                            SelectItem::UnnamedExpr(Expr::CompoundIdentifier(vec![
                                qualifier.clone(),
                                Ident::new(column),
                            ]))
                        })
                        .collect()
                }
                other => vec![other],
            })
            .collect();
    }

    let aliases: Vec<Ident> = select
        .projection
        .iter()
        .filter_map(|item| match item {
            SelectItem::ExprWithAlias { alias, .. } => Some(alias.clone()),
            _ => None,
        })
        .collect();

    let mut scope = ScopeQualifier {
        qualifier,
        depth: 0,
        aliases: Vec::new(),
    };
    for item in select.projection.iter_mut() {
        match item {
            SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => {
                let _ = expr.visit(&mut scope);
            }
            _ => {}
        }
    }
    if let Some(selection) = select.selection.as_mut() {
        let _ = selection.visit(&mut scope);
    }

    // GROUP BY and HAVING may name projection aliases
    scope.aliases = aliases;
    if let GroupByExpr::Expressions(exprs, _) = &mut select.group_by {
        for expr in exprs.iter_mut() {
            let _ = expr.visit(&mut scope);
        }
    }
    if let Some(having) = select.having.as_mut() {
        let _ = having.visit(&mut scope);
    }
}

/// The table name and column qualifier of a SELECT reading exactly one table.
fn single_table(select: &Select) -> Option<(String, Ident)> {
    let [from] = select.from.as_slice() else {
        return None;
    };
    if !from.joins.is_empty() {
        return None;
    }
    let TableFactor::Table { name, alias, .. } = &from.relation else {
        return None;
    };
    let table = last_ident(name)?;
    let qualifier = match alias {
        Some(alias) => alias.name.clone(),
        None => table.clone(),
    };
    Some((table.value, qualifier))
}

fn last_ident(name: &ObjectName) -> Option<Ident> {
    match name.0.last()? {
        ObjectNamePart::Identifier(ident) => Some(ident.clone()),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

/// Qualifies bare identifiers, leaving nested subqueries to their own scope.
struct ScopeQualifier {
    qualifier: Ident,
    depth: usize,
    /// Projection aliases left unqualified.
    aliases: Vec<Ident>,
}

impl ScopeQualifier {
    fn is_alias(&self, ident: &Ident) -> bool {
        self.aliases
            .iter()
            .any(|alias| alias.value.eq_ignore_ascii_case(&ident.value))
    }
}

impl VisitorMut for ScopeQualifier {
    type Break = ();

    fn pre_visit_query(&mut self, _query: &mut Query) -> ControlFlow<()> {
        self.depth += 1;
        ControlFlow::Continue(())
    }

    fn post_visit_query(&mut self, _query: &mut Query) -> ControlFlow<()> {
        self.depth -= 1;
        ControlFlow::Continue(())
    }

    fn pre_visit_expr(&mut self, expr: &mut Expr) -> ControlFlow<()> {
        if self.depth == 0 {
            if let Expr::Identifier(ident) = expr {
                if self.is_alias(ident) {
                    return ControlFlow::Continue(());
                }
                *expr = Expr::CompoundIdentifier(vec![self.qualifier.clone(), ident.clone()]);
            }
        }
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{SqlEngine, SqlParserEngine};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn qualify(sql: &str, schema: &Schema) -> String {
        let mut parsed = SqlParserEngine::new().parse(sql, None).unwrap();
        qualify_columns(&mut parsed.statement, schema);
        parsed.statement.to_string()
    }

    #[test]
    fn test_qualifies_with_table_name() {
        assert_eq!(
            qualify("SELECT a, b AS c FROM t WHERE a > 1 GROUP BY b", &Schema::default()),
            "SELECT t.a, t.b AS c FROM t WHERE t.a > 1 GROUP BY t.b"
        );
    }

    #[test]
    fn test_projection_aliases_stay_unqualified() {
        assert_eq!(
            qualify(
                "SELECT a AS c, COUNT(b) AS n FROM t GROUP BY c HAVING n > 1",
                &Schema::default()
            ),
            "SELECT t.a AS c, COUNT(t.b) AS n FROM t GROUP BY c HAVING n > 1"
        );
    }

    #[test]
    fn test_qualifies_with_alias() {
        assert_eq!(
            qualify("SELECT a FROM db.t AS x", &Schema::default()),
            "SELECT x.a FROM db.t AS x"
        );
    }

    #[test]
    fn test_leaves_joins_alone() {
        let sql = "SELECT a FROM t JOIN u ON t.id = u.id";
        assert_eq!(qualify(sql, &Schema::default()), sql);
    }

    #[test]
    fn test_subquery_has_its_own_scope() {
        assert_eq!(
            qualify(
                "SELECT a FROM t WHERE a IN (SELECT b FROM u)",
                &Schema::default()
            ),
            "SELECT t.a FROM t WHERE t.a IN (SELECT u.b FROM u)"
        );
    }

    #[test]
    fn test_expands_star_from_schema() {
        let value = json!({"t": {"id": "INT", "name": "TEXT"}});
        let schema = Schema::from_json(Some(&value)).unwrap();
        assert_eq!(
            qualify("SELECT * FROM t", &schema),
            "SELECT t.id, t.name FROM t"
        );
    }

    #[test]
    fn test_star_kept_for_unknown_table() {
        assert_eq!(qualify("SELECT * FROM t", &Schema::default()), "SELECT * FROM t");
    }
}
