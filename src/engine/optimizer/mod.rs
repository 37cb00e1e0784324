//! A small rule-based rewriter over sqlparser's AST.
//!
//! Rules run in order. Statements that are not queries are returned as-is.

mod qualify;
mod simplify;

use sqlparser::ast::Statement;
use tracing::debug;

use super::Schema;

pub fn optimize(statement: &mut Statement, schema: &Schema) {
    if !matches!(statement, Statement::Query(_)) {
        debug!("Skipping optimizer for non-query statement");
        return;
    }
    debug!("Running optimizer rules (schema provided: {})", !schema.is_empty());
    qualify::qualify_columns(statement, schema);
    simplify::simplify(statement);
}
