//! The allow-list of SQL dialects accepted by the API, and how each one maps
//! onto a sqlparser grammar and its rendering conventions.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use sqlparser::dialect::{
    BigQueryDialect, ClickHouseDialect, DatabricksDialect, DuckDbDialect, GenericDialect,
    HiveDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect, RedshiftSqlDialect,
    SQLiteDialect, SnowflakeDialect,
};

use crate::errors::{Error, Result};

/// A named SQL dialect accepted by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Athena,
    BigQuery,
    ClickHouse,
    Databricks,
    Doris,
    Drill,
    Druid,
    DuckDb,
    Hive,
    Materialize,
    MySql,
    Oracle,
    Postgres,
    Presto,
    Prql,
    Redshift,
    RisingWave,
    Snowflake,
    Spark,
    Spark2,
    Sqlite,
    StarRocks,
    Tableau,
    Teradata,
    Trino,
    TSql,
}

/// Function renames applied when rendering for postgres-like targets.
static POSTGRES_FUNCTIONS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "IFNULL" => "COALESCE",
    "NVL" => "COALESCE",
    "LEN" => "LENGTH",
    "GETDATE" => "NOW",
};

static TSQL_FUNCTIONS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "LENGTH" => "LEN",
    "IFNULL" => "ISNULL",
    "NVL" => "ISNULL",
    "NOW" => "GETDATE",
};

static SQLITE_FUNCTIONS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "NVL" => "IFNULL",
    "LEN" => "LENGTH",
};

static MYSQL_FUNCTIONS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "NVL" => "IFNULL",
    "LEN" => "LENGTH",
    "GETDATE" => "NOW",
};

static BIGQUERY_FUNCTIONS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "NVL" => "IFNULL",
    "LEN" => "LENGTH",
    "GETDATE" => "CURRENT_TIMESTAMP",
};

static DEFAULT_FUNCTIONS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "LEN" => "LENGTH",
};

/// Canonical dialect names, sorted.
static SORTED_NAMES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut names: Vec<&'static str> = Dialect::ALL.iter().map(|d| d.as_str()).collect();
    names.sort_unstable();
    names
});

impl Dialect {
    pub const ALL: [Dialect; 26] = [
        Dialect::Athena,
        Dialect::BigQuery,
        Dialect::ClickHouse,
        Dialect::Databricks,
        Dialect::Doris,
        Dialect::Drill,
        Dialect::Druid,
        Dialect::DuckDb,
        Dialect::Hive,
        Dialect::Materialize,
        Dialect::MySql,
        Dialect::Oracle,
        Dialect::Postgres,
        Dialect::Presto,
        Dialect::Prql,
        Dialect::Redshift,
        Dialect::RisingWave,
        Dialect::Snowflake,
        Dialect::Spark,
        Dialect::Spark2,
        Dialect::Sqlite,
        Dialect::StarRocks,
        Dialect::Tableau,
        Dialect::Teradata,
        Dialect::Trino,
        Dialect::TSql,
    ];

    /// All supported dialect names in alphabetical order.
    pub fn names() -> &'static [&'static str] {
        &SORTED_NAMES
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Athena => "athena",
            Dialect::BigQuery => "bigquery",
            Dialect::ClickHouse => "clickhouse",
            Dialect::Databricks => "databricks",
            Dialect::Doris => "doris",
            Dialect::Drill => "drill",
            Dialect::Druid => "druid",
            Dialect::DuckDb => "duckdb",
            Dialect::Hive => "hive",
            Dialect::Materialize => "materialize",
            Dialect::MySql => "mysql",
            Dialect::Oracle => "oracle",
            Dialect::Postgres => "postgres",
            Dialect::Presto => "presto",
            Dialect::Prql => "prql",
            Dialect::Redshift => "redshift",
            Dialect::RisingWave => "risingwave",
            Dialect::Snowflake => "snowflake",
            Dialect::Spark => "spark",
            Dialect::Spark2 => "spark2",
            Dialect::Sqlite => "sqlite",
            Dialect::StarRocks => "starrocks",
            Dialect::Tableau => "tableau",
            Dialect::Teradata => "teradata",
            Dialect::Trino => "trino",
            Dialect::TSql => "tsql",
        }
    }

    /// The sqlparser grammar used to read SQL written in this dialect.
    ///
    /// Dialects without a dedicated sqlparser grammar fall back to the
    /// closest relative, or to the generic grammar.
    pub fn parser_dialect(&self) -> Box<dyn sqlparser::dialect::Dialect> {
        match self {
            Dialect::MySql | Dialect::Doris | Dialect::StarRocks => Box::new(MySqlDialect {}),
            Dialect::Postgres | Dialect::Materialize | Dialect::RisingWave => {
                Box::new(PostgreSqlDialect {})
            }
            Dialect::Redshift => Box::new(RedshiftSqlDialect {}),
            Dialect::BigQuery => Box::new(BigQueryDialect {}),
            Dialect::Snowflake => Box::new(SnowflakeDialect {}),
            Dialect::DuckDb => Box::new(DuckDbDialect {}),
            Dialect::ClickHouse => Box::new(ClickHouseDialect {}),
            Dialect::Hive | Dialect::Spark | Dialect::Spark2 => Box::new(HiveDialect {}),
            Dialect::Databricks => Box::new(DatabricksDialect {}),
            Dialect::Sqlite => Box::new(SQLiteDialect {}),
            Dialect::TSql => Box::new(MsSqlDialect {}),
            Dialect::Athena
            | Dialect::Presto
            | Dialect::Trino
            | Dialect::Drill
            | Dialect::Druid
            | Dialect::Oracle
            | Dialect::Teradata
            | Dialect::Tableau
            | Dialect::Prql => Box::new(GenericDialect {}),
        }
    }

    /// Opening quote character for delimited identifiers.
    pub fn identifier_quote(&self) -> char {
        match self {
            Dialect::MySql
            | Dialect::BigQuery
            | Dialect::Hive
            | Dialect::Spark
            | Dialect::Spark2
            | Dialect::Databricks
            | Dialect::Doris
            | Dialect::StarRocks
            | Dialect::Drill => '`',
            Dialect::TSql => '[',
            _ => '"',
        }
    }

    /// Upper-cased function names that must be renamed when writing this dialect.
    pub fn function_renames(&self) -> &'static phf::Map<&'static str, &'static str> {
        match self {
            Dialect::Postgres | Dialect::Materialize | Dialect::RisingWave | Dialect::Redshift => {
                &POSTGRES_FUNCTIONS
            }
            Dialect::TSql => &TSQL_FUNCTIONS,
            Dialect::Sqlite => &SQLITE_FUNCTIONS,
            Dialect::MySql | Dialect::Doris | Dialect::StarRocks => &MYSQL_FUNCTIONS,
            Dialect::BigQuery => &BIGQUERY_FUNCTIONS,
            _ => &DEFAULT_FUNCTIONS,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        let wanted = name.trim().to_ascii_lowercase();
        Dialect::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| Error::UnsupportedDialect(name.to_string()))
    }
}

/// Parses an optional dialect name, defaulting to `None` when absent or blank.
pub fn parse_optional(name: Option<&str>) -> Result<Option<Dialect>> {
    match name {
        Some(name) if !name.trim().is_empty() => name.parse().map(Some),
        _ => Ok(None),
    }
}
