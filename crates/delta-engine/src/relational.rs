//! Pure SQL text for the RelationalDiff strategy (spec §4.4). These
//! queries assume `current`/`previous` tables already carry a `pk VARCHAR`
//! column holding the primary-key tuple joined by `|` (spec §4.5); building
//! and executing them against a live connection pool is `delta-store`'s job
//! (it owns the pool and the per-client table names).

/// `SELECT c.* FROM current c LEFT JOIN previous p ON c.pk = p.pk WHERE p.pk IS NULL`
pub fn added_query(current_table: &str, previous_table: &str) -> String {
    format!(
        "SELECT c.pk, c.hash FROM {current_table} c \
         LEFT JOIN {previous_table} p ON c.pk = p.pk WHERE p.pk IS NULL"
    )
}

/// `SELECT c.* FROM current c INNER JOIN previous p ON c.pk = p.pk WHERE c.hash <> p.hash`
pub fn updated_query(current_table: &str, previous_table: &str) -> String {
    format!(
        "SELECT c.pk, c.hash FROM {current_table} c \
         INNER JOIN {previous_table} p ON c.pk = p.pk WHERE c.hash <> p.hash"
    )
}

/// `SELECT p.* FROM previous p LEFT JOIN current c ON p.pk = c.pk WHERE c.pk IS NULL`
pub fn removed_query(current_table: &str, previous_table: &str) -> String {
    format!(
        "SELECT p.pk, p.hash FROM {previous_table} p \
         LEFT JOIN {current_table} c ON p.pk = c.pk WHERE c.pk IS NULL"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_reference_both_tables() {
        let added = added_query("client_a_current", "client_a_previous");
        assert!(added.contains("client_a_current"));
        assert!(added.contains("client_a_previous"));
        assert!(added.contains("IS NULL"));

        assert!(updated_query("cur", "prev").contains("<>"));
        assert!(removed_query("cur", "prev").starts_with("SELECT p.pk"));
    }
}
