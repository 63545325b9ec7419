//! Read-only enforcement for `run_sql`.
//!
//! `run_sql` only executes statements that produce rows without mutating
//! state: SELECT, WITH, and VALUES, plus EXPLAIN over one of those.
//! Everything else is rejected before the driver is contacted. This is defense in depth against accidental
//! mutation, not a security boundary - grants on the database side remain
//! the real control.
//!
//! Uses sqlparser for AST-based classification, preventing bypass through
//! formatting tricks or SQL comments. DB2 SQL the parser does not understand
//! falls back to leading-keyword classification so that unusual but
//! read-only dialect constructs still run.

use crate::error::{Db2Error, Db2Result};
use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

/// Validate that the SQL text is read-only.
///
/// Returns `Ok(())` for SELECT/WITH/VALUES statements and EXPLAIN of one
/// of those, or `Err(Db2Error::WriteNotAllowed)` naming the offending
/// operation.
pub fn ensure_readonly(sql: &str) -> Db2Result<()> {
    if sql.trim().is_empty() {
        return Err(Db2Error::write_not_allowed("empty statement"));
    }

    match Parser::parse_sql(&GenericDialect {}, sql) {
        Ok(statements) if !statements.is_empty() => {
            for stmt in &statements {
                if let Some(operation) = rejected_operation(stmt) {
                    return Err(Db2Error::write_not_allowed(operation));
                }
            }
            Ok(())
        }
        // Parser saw nothing (comments only) or does not know the dialect
        // construct; fall back to the leading keyword.
        _ => ensure_readonly_by_keyword(sql),
    }
}

/// Classify a parsed statement; `None` means it is allowed.
fn rejected_operation(stmt: &Statement) -> Option<&'static str> {
    match stmt {
        // SELECT, WITH, and VALUES all parse as Statement::Query.
        Statement::Query(_) => None,

        // EXPLAIN describes a statement without running it; allow it only
        // over statements that would pass on their own.
        Statement::Explain { statement, .. } => rejected_operation(statement),

        Statement::Insert(_) => Some("INSERT"),
        Statement::Update { .. } => Some("UPDATE"),
        Statement::Delete(_) => Some("DELETE"),
        Statement::Merge { .. } => Some("MERGE"),
        Statement::Truncate { .. } => Some("TRUNCATE"),

        Statement::CreateTable { .. }
        | Statement::CreateView { .. }
        | Statement::CreateIndex(_)
        | Statement::CreateSchema { .. }
        | Statement::CreateDatabase { .. }
        | Statement::CreateSequence { .. }
        | Statement::CreateFunction { .. }
        | Statement::CreateProcedure { .. }
        | Statement::CreateTrigger { .. } => Some("CREATE"),

        Statement::AlterTable { .. }
        | Statement::AlterView { .. }
        | Statement::AlterIndex { .. } => Some("ALTER"),

        Statement::Drop { .. }
        | Statement::DropFunction { .. }
        | Statement::DropProcedure { .. }
        | Statement::DropTrigger { .. } => Some("DROP"),

        Statement::StartTransaction { .. } => Some("BEGIN"),
        Statement::Commit { .. } => Some("COMMIT"),
        Statement::Rollback { .. } => Some("ROLLBACK"),
        Statement::Savepoint { .. } => Some("SAVEPOINT"),

        // Procedure invocation goes through call_sp, not run_sql.
        Statement::Call { .. } => Some("CALL"),
        Statement::Execute { .. } => Some("EXECUTE"),

        Statement::Grant { .. } => Some("GRANT"),
        Statement::Revoke { .. } => Some("REVOKE"),
        Statement::Set(_) => Some("SET"),

        // Conservative default: anything unrecognized is treated as a write.
        _ => Some("unrecognized statement"),
    }
}

/// Leading-keyword fallback for SQL the parser cannot handle.
fn ensure_readonly_by_keyword(sql: &str) -> Db2Result<()> {
    let keyword = sql
        .split_whitespace()
        .next()
        .map(|w| w.trim_start_matches('(').to_ascii_uppercase())
        .unwrap_or_default();

    match keyword.as_str() {
        "SELECT" | "WITH" | "VALUES" => Ok(()),
        "" => Err(Db2Error::write_not_allowed("empty statement")),
        other => Err(Db2Error::write_not_allowed(other.to_string())),
    }
}
