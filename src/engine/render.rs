//! Rendering a parsed statement for a target dialect.

use std::ops::ControlFlow;

use sqlparser::ast::{
    visit_expressions_mut, Expr, Ident, ObjectName, ObjectNamePart, Statement, Value,
};
use sqlparser::tokenizer::{Token, Tokenizer};
use tracing::debug;

use super::{grammar_for, ParsedSql};
use crate::dialect::Dialect;

pub fn render(parsed: &ParsedSql, write: Dialect, pretty: bool) -> String {
    let mut statement = parsed.statement.clone();
    rename_functions(&mut statement, write.function_renames());
    single_quote_strings(&mut statement);

    let sql = if pretty {
        format!("{statement:#}")
    } else {
        statement.to_string()
    };

    let grammar = grammar_for(parsed.read);
    requote_identifiers(&sql, grammar.as_ref(), write.identifier_quote())
}

/// Renames unqualified function calls found in `renames`.
fn rename_functions(
    statement: &mut Statement,
    renames: &'static phf::Map<&'static str, &'static str>,
) {
    let _ = visit_expressions_mut(statement, |expr| {
        if let Expr::Function(function) = expr {
            if function.name.0.len() == 1 {
                let name = function.name.to_string().to_ascii_uppercase();
                if let Some(renamed) = renames.get(name.as_str()) {
                    function.name =
                        ObjectName(vec![ObjectNamePart::Identifier(Ident::new(*renamed))]);
                }
            }
        }
        ControlFlow::<()>::Continue(())
    });
}

/// Rewrites double-quoted string literals as single-quoted ones, which every
/// target reads as a string rather than an identifier.
fn single_quote_strings(statement: &mut Statement) {
    let _ = visit_expressions_mut(statement, |expr| {
        if let Expr::Value(literal) = expr {
            if let Value::DoubleQuotedString(text) = &mut literal.value {
                let text = std::mem::take(text);
                literal.value = Value::SingleQuotedString(text);
            }
        }
        ControlFlow::<()>::Continue(())
    });
}

/// Swaps the quote characters of every delimited identifier in `sql`.
///
/// `sql` is re-tokenized with the grammar it was originally read in, so the
/// quote characters it produced are recognized as identifiers.
fn requote_identifiers(
    sql: &str,
    grammar: &dyn sqlparser::dialect::Dialect,
    quote: char,
) -> String {
    let tokens = match Tokenizer::new(grammar, sql).with_unescape(false).tokenize() {
        Ok(tokens) => tokens,
        Err(err) => {
            debug!("Leaving identifier quotes untouched: {}", err);
            return sql.to_string();
        }
    };

    tokens
        .into_iter()
        .map(|token| match token {
            Token::Word(word) => match word.quote_style {
                Some(source) => requote(&word.value, source, quote),
                None => word.to_string(),
            },
            other => other.to_string(),
        })
        .collect()
}

/// Re-delimits an identifier still carrying its doubled `source` quotes.
fn requote(raw: &str, source: char, target: char) -> String {
    let source_end = closing_quote(source);
    let target_end = closing_quote(target);
    let value = raw.replace(&source_end.to_string().repeat(2), &source_end.to_string());
    let escaped = value.replace(target_end, &target_end.to_string().repeat(2));
    format!("{target}{escaped}{target_end}")
}

fn closing_quote(open: char) -> char {
    match open {
        '[' => ']',
        other => other,
    }
}
