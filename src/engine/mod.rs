//! The SQL capability seam: parse, render and optimize.
//!
//! Handlers only talk to [`SqlEngine`]. The production implementation,
//! [`SqlParserEngine`], is backed by the `sqlparser` crate.

pub mod metadata;
mod optimizer;
mod render;
mod schema;

use std::fmt::Debug;
use std::sync::Arc;

use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use tracing::debug;

use crate::dialect::Dialect;
use crate::errors::{Error, Result};

pub use metadata::{extract_metadata, MetadataReport};
pub use schema::Schema;

/// Engine handle shared by all request handlers.
pub type SharedEngine = Arc<dyn SqlEngine>;

/// A single parsed statement, along with the dialect it was read in.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSql {
    pub statement: Statement,
    /// `None` when the query was read with the generic grammar.
    pub read: Option<Dialect>,
}

pub trait SqlEngine: Debug + Send + Sync {
    /// Parses exactly one statement written in `read` (generic SQL when `None`).
    fn parse(&self, sql: &str, read: Option<Dialect>) -> Result<ParsedSql>;

    /// Renders a parsed statement as SQL text for the `write` dialect.
    fn render(&self, parsed: &ParsedSql, write: Dialect, pretty: bool) -> Result<String>;

    /// Rewrites a parsed statement using the optimizer rule pipeline.
    fn optimize(&self, parsed: ParsedSql, schema: &Schema) -> Result<ParsedSql>;
}

/// [`SqlEngine`] implementation backed by sqlparser-rs.
#[derive(Debug, Default, Clone)]
pub struct SqlParserEngine;

impl SqlParserEngine {
    pub fn new() -> Self {
        SqlParserEngine
    }

    /// Wraps a new engine for sharing across handlers.
    pub fn shared() -> SharedEngine {
        Arc::new(SqlParserEngine::new())
    }
}

impl SqlEngine for SqlParserEngine {
    fn parse(&self, sql: &str, read: Option<Dialect>) -> Result<ParsedSql> {
        let grammar = grammar_for(read);
        let mut statements = Parser::parse_sql(grammar.as_ref(), sql)?;
        debug!("Parsed {} statement(s)", statements.len());

        match statements.len() {
            0 => Err(Error::Parse(format!(
                "No expression was parsed from '{}'",
                sql
            ))),
            1 => Ok(ParsedSql {
                statement: statements.remove(0),
                read,
            }),
            n => Err(Error::Parse(format!(
                "Expected a single statement, found {}",
                n
            ))),
        }
    }

    fn render(&self, parsed: &ParsedSql, write: Dialect, pretty: bool) -> Result<String> {
        Ok(render::render(parsed, write, pretty))
    }

    fn optimize(&self, mut parsed: ParsedSql, schema: &Schema) -> Result<ParsedSql> {
        optimizer::optimize(&mut parsed.statement, schema);
        Ok(parsed)
    }
}

/// The sqlparser grammar for an optional dialect.
pub(crate) fn grammar_for(read: Option<Dialect>) -> Box<dyn sqlparser::dialect::Dialect> {
    match read {
        Some(dialect) => dialect.parser_dialect(),
        None => Box::new(GenericDialect {}),
    }
}
