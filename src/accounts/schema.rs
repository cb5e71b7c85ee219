use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{info, info_span, Instrument};

pub const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

/// Apply the bundled schema. Every statement is idempotent, so this runs on
/// every startup.
///
/// # Errors
/// Returns an error if any statement fails.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    let statements = split_sql_statements(SCHEMA_SQL);
    for (index, statement) in statements.iter().enumerate() {
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DDL",
            db.statement = statement.as_str()
        );
        sqlx::query(statement)
            .execute(pool)
            .instrument(span)
            .await
            .with_context(|| format!("failed to execute schema statement {}", index + 1))?;
    }
    info!(statements = statements.len(), "Database schema ensured");
    Ok(())
}

/// Split a script on statement-terminating lines.
pub(crate) fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        current.push_str(line);
        current.push('\n');

        if trimmed.ends_with(';') {
            let statement = current.trim();
            if !statement.is_empty() {
                statements.push(statement.to_string());
            }
            current.clear();
        }
    }

    let leftover = current.trim();
    if !leftover.is_empty() {
        statements.push(leftover.to_string());
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_schema_is_one_idempotent_statement() {
        let statements = split_sql_statements(SCHEMA_SQL);
        assert_eq!(statements.len(), 1);
        assert!(statements[0].contains("CREATE TABLE IF NOT EXISTS accounts"));
        assert!(statements[0].contains("UNIQUE (email)"));
    }

    #[test]
    fn splits_on_terminating_lines() {
        let sql = "CREATE TABLE a (\n  id INT\n);\n\nCREATE INDEX b ON a (id);\nSELECT 1";
        let statements = split_sql_statements(sql);
        assert_eq!(
            statements,
            vec![
                "CREATE TABLE a (\n  id INT\n);".to_string(),
                "CREATE INDEX b ON a (id);".to_string(),
                "SELECT 1".to_string(),
            ]
        );
    }

    #[test]
    fn blank_input_yields_nothing() {
        assert!(split_sql_statements("\n  \n").is_empty());
    }
}
