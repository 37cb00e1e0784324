//! Bottom-up boolean and constant folding.

use std::cmp::Ordering;
use std::ops::ControlFlow;

use sqlparser::ast::{
    visit_expressions_mut, BinaryOperator, Expr, Query, Select, SetExpr, Statement,
    UnaryOperator, Value, VisitMut, VisitorMut,
};

pub fn simplify(statement: &mut Statement) {
    // Expressions are visited children-first, so operands are already folded.
    let _ = visit_expressions_mut(statement, |expr| {
        if let Some(simpler) = simplified(expr) {
            *expr = simpler;
        }
        ControlFlow::<()>::Continue(())
    });
    let _ = statement.visit(&mut PruneTrivialFilters);
}

fn simplified(expr: &Expr) -> Option<Expr> {
    match expr {
        Expr::Nested(inner) => match inner.as_ref() {
            Expr::Value(_) | Expr::Nested(_) | Expr::Identifier(_) | Expr::CompoundIdentifier(_) => {
                Some(inner.as_ref().clone())
            }
            _ => None,
        },
        Expr::UnaryOp {
            op: UnaryOperator::Not,
            expr: inner,
        } => match unnested(inner) {
            Expr::UnaryOp {
                op: UnaryOperator::Not,
                expr: operand,
            } => Some(operand.as_ref().clone()),
            other => boolean(other).map(|b| boolean_expr(!b)),
        },
        Expr::BinaryOp { left, op, right } => simplified_binary(left, op, right),
        _ => None,
    }
}

fn simplified_binary(left: &Expr, op: &BinaryOperator, right: &Expr) -> Option<Expr> {
    match op {
        BinaryOperator::And => match (boolean(left), boolean(right)) {
            (Some(false), _) | (_, Some(false)) => Some(boolean_expr(false)),
            (Some(true), _) => Some(right.clone()),
            (_, Some(true)) => Some(left.clone()),
            _ => None,
        },
        BinaryOperator::Or => match (boolean(left), boolean(right)) {
            (Some(true), _) | (_, Some(true)) => Some(boolean_expr(true)),
            (Some(false), _) => Some(right.clone()),
            (_, Some(false)) => Some(left.clone()),
            _ => None,
        },
        BinaryOperator::Eq
        | BinaryOperator::NotEq
        | BinaryOperator::Lt
        | BinaryOperator::LtEq
        | BinaryOperator::Gt
        | BinaryOperator::GtEq => {
            let ordering = compare(literal(left)?, literal(right)?)?;
            let result = match op {
                BinaryOperator::Eq => ordering == Ordering::Equal,
                BinaryOperator::NotEq => ordering != Ordering::Equal,
                BinaryOperator::Lt => ordering == Ordering::Less,
                BinaryOperator::LtEq => ordering != Ordering::Greater,
                BinaryOperator::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Some(boolean_expr(result))
        }
        BinaryOperator::Plus | BinaryOperator::Minus | BinaryOperator::Multiply => {
            let lhs = integer(literal(left)?)?;
            let rhs = integer(literal(right)?)?;
            let folded = match op {
                BinaryOperator::Plus => lhs.checked_add(rhs),
                BinaryOperator::Minus => lhs.checked_sub(rhs),
                _ => lhs.checked_mul(rhs),
            }?;
            Some(Expr::value(Value::Number(folded.to_string(), false)))
        }
        _ => None,
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(lhs, _), Value::Number(rhs, _)) => {
            let lhs: f64 = lhs.parse().ok()?;
            let rhs: f64 = rhs.parse().ok()?;
            lhs.partial_cmp(&rhs)
        }
        (Value::SingleQuotedString(lhs), Value::SingleQuotedString(rhs)) => Some(lhs.cmp(rhs)),
        _ => None,
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(digits, false) => digits.parse().ok(),
        _ => None,
    }
}

fn unnested(mut expr: &Expr) -> &Expr {
    while let Expr::Nested(inner) = expr {
        expr = inner.as_ref();
    }
    expr
}

fn literal(expr: &Expr) -> Option<&Value> {
    match unnested(expr) {
        Expr::Value(value) => Some(&value.value),
        _ => None,
    }
}

fn boolean(expr: &Expr) -> Option<bool> {
    match literal(expr)? {
        Value::Boolean(b) => Some(*b),
        _ => None,
    }
}

fn boolean_expr(value: bool) -> Expr {
    Expr::value(Value::Boolean(value))
}

/// Drops `WHERE TRUE` and `HAVING TRUE`.
struct PruneTrivialFilters;

impl VisitorMut for PruneTrivialFilters {
    type Break = ();

    fn pre_visit_query(&mut self, query: &mut Query) -> ControlFlow<()> {
        prune_set_expr(&mut query.body);
        ControlFlow::Continue(())
    }
}

fn prune_set_expr(body: &mut SetExpr) {
    match body {
        SetExpr::Select(select) => prune_select(select),
        SetExpr::SetOperation { left, right, .. } => {
            prune_set_expr(left);
            prune_set_expr(right);
        }
        _ => {}
    }
}

fn prune_select(select: &mut Select) {
    if select.selection.as_ref().and_then(boolean) == Some(true) {
        select.selection = None;
    }
    if select.having.as_ref().and_then(boolean) == Some(true) {
        select.having = None;
    }
}
