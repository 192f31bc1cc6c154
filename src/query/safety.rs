//! Gate deciding which generated queries may be passed to the executor.
//!
//! This is a textual heuristic over the upper-cased query, not a SQL parser.
//! It does not see through comments, string literals, or statements chained
//! with `;` after a leading `SELECT`, and a deny-listed word inside an
//! identifier (e.g. a `DROPOFF_DATE` column) is rejected as well. Treat it as
//! a guard against obviously destructive model output, not as protection
//! against SQL injection.

/// Substrings that mark a query as unsafe wherever they appear.
pub const DENY_LIST: [&str; 5] = ["DROP", "DELETE FROM", "TRUNCATE", "ALTER", "CREATE USER"];

const READ_ONLY_PREFIX: &str = "SELECT";

pub fn is_safe(sql: &str) -> bool {
    let normalized = sql.trim().to_uppercase();

    if DENY_LIST.iter().any(|keyword| normalized.contains(keyword)) {
        return false;
    }

    normalized.starts_with(READ_ONLY_PREFIX)
}
