//! Document number generation.
//!
//! Ledger entries and cash transactions carry human-facing numbers of the
//! form `{TAG}/{YYYYMMDD}/{seq}`, with a per-day sequence. The next sequence
//! is read from the highest existing number inside the caller's DB
//! transaction; a unique-index violation on insert is surfaced as
//! [`EngineError::DuplicateNumber`] and never retried silently.

use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseTransaction, DbErr, Statement};

use crate::{EngineError, ResultEngine};

use super::Engine;

/// Tag for balance-history entry numbers.
pub(super) const LEDGER_TAG: &str = "TRX";
/// Tag for cash-transaction numbers.
pub(super) const CASH_TAG: &str = "KAS";

impl Engine {
    /// Returns the next `{tag}/{YYYYMMDD}/{seq:04}` number for `table`.
    pub(super) async fn next_number(
        &self,
        db_tx: &DatabaseTransaction,
        table: &str,
        tag: &str,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<String> {
        let prefix = format!("{tag}/{}/", occurred_at.format("%Y%m%d"));
        let backend = db_tx.get_database_backend();
        // MAX over the raw text is lexicographic and would stall at 9999;
        // compare the numeric suffix instead.
        let stmt = Statement::from_sql_and_values(
            backend,
            format!(
                "SELECT COALESCE(MAX(CAST(SUBSTR(number, ?) AS INTEGER)), 0) AS max_seq \
                 FROM {table} WHERE number LIKE ?"
            ),
            vec![
                (prefix.len() as i64 + 1).into(),
                format!("{prefix}%").into(),
            ],
        );
        let row = db_tx.query_one(stmt).await?;
        let max_seq: i64 = row.and_then(|r| r.try_get("", "max_seq").ok()).unwrap_or(0);

        let seq = max_seq + 1;
        Ok(format!("{prefix}{seq:04}"))
    }
}

/// Maps a unique-constraint violation on a number column to
/// [`EngineError::DuplicateNumber`]; other DB errors pass through.
pub(super) fn map_number_conflict(err: DbErr, number: &str) -> EngineError {
    let text = err.to_string();
    if text.contains("UNIQUE") || text.contains("unique") {
        EngineError::DuplicateNumber(number.to_string())
    } else {
        EngineError::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violations_become_duplicate_number() {
        let err = DbErr::Custom("UNIQUE constraint failed: balance_history.number".to_string());
        assert_eq!(
            map_number_conflict(err, "TRX/20260601/0001"),
            EngineError::DuplicateNumber("TRX/20260601/0001".to_string())
        );
    }

    #[test]
    fn other_db_errors_pass_through() {
        let err = DbErr::Custom("disk I/O error".to_string());
        assert!(matches!(
            map_number_conflict(err, "TRX/20260601/0001"),
            EngineError::Database(_)
        ));
    }
}
