//! Batch bookkeeping on the tracking table

use migrate_specific_migrations::{
    error::Result, transaction, MigrationConnection, MigrationError, MigrationRepository,
    TrackingRow,
};

/// Move the rows of `names` to a new head batch and return its number.
///
/// Reading the next batch number and updating the rows happen in one locked
/// transaction, so a concurrent run can't claim the same batch in between.
pub fn move_to_head(
    conn: &mut dyn MigrationConnection,
    repository: &MigrationRepository,
    names: &[String],
) -> Result<i64> {
    transaction(conn, |conn| move_to_head_in(conn, repository, names))
}

/// Like [`move_to_head`], for callers that already hold a transaction
pub fn move_to_head_in(
    conn: &mut dyn MigrationConnection,
    repository: &MigrationRepository,
    names: &[String],
) -> Result<i64> {
    if !repository.exists(conn)? {
        return Ok(1);
    }

    repository.lock(conn)?;
    let batch = repository.next_batch_number(conn)?;
    let moved = repository.set_batch(conn, names, batch)?;
    tracing::info!(batch, moved, "moved selected migrations to head batch");
    Ok(batch)
}

/// Original batch numbers of the selected migrations, taken before a refresh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSnapshot {
    rows: Vec<TrackingRow>,
}

impl BatchSnapshot {
    /// Capture the existing rows for `names`; names without a row are left out
    pub fn capture(
        conn: &mut dyn MigrationConnection,
        repository: &MigrationRepository,
        names: &[String],
    ) -> Result<Self> {
        let rows = repository.rows_for(conn, names)?;
        tracing::debug!(rows = rows.len(), "captured batch snapshot");
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[TrackingRow] {
        &self.rows
    }

    /// Put the snapshotted batch numbers back; row ids are left as the store assigned them
    pub fn restore(self, conn: &mut dyn MigrationConnection, repository: &MigrationRepository) -> Result<u64> {
        if self.rows.is_empty() {
            return Ok(0);
        }

        transaction(conn, |conn| {
            let mut restored = 0;
            for row in &self.rows {
                restored += repository.set_batch(conn, std::slice::from_ref(&row.migration), row.batch)?;
            }
            tracing::info!(restored, "restored original batches");
            Ok::<_, MigrationError>(restored)
        })
    }
}

/// Run `f` with foreign-key checks disabled when `enabled` is set.
///
/// Checks are switched back on afterwards even if `f` failed. A failure to
/// switch them back on is logged and never replaces `f`'s own error.
pub fn without_foreign_keys<T, E, F>(
    conn: &mut dyn MigrationConnection,
    enabled: bool,
    f: F,
) -> std::result::Result<T, E>
where
    F: FnOnce(&mut dyn MigrationConnection) -> std::result::Result<T, E>,
    E: From<MigrationError>,
{
    if !enabled {
        return f(conn);
    }

    conn.set_foreign_key_checks(false)?;
    tracing::info!("foreign key checks disabled");

    let result = f(&mut *conn);

    match conn.set_foreign_key_checks(true) {
        Ok(()) => {
            tracing::info!("foreign key checks enabled");
            result
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to re-enable foreign key checks");
            match result {
                Ok(_) => Err(err.into()),
                Err(primary) => Err(primary),
            }
        }
    }
}

/// Run `f` inside a transaction that is always rolled back
pub fn discarded<T, E, F>(conn: &mut dyn MigrationConnection, f: F) -> std::result::Result<T, E>
where
    F: FnOnce(&mut dyn MigrationConnection) -> std::result::Result<T, E>,
    E: From<MigrationError>,
{
    conn.begin_transaction()?;
    let result = f(&mut *conn);

    match conn.rollback_transaction() {
        Ok(()) => result,
        Err(err) => {
            tracing::error!(error = %err, "failed to discard pretend transaction");
            match result {
                Ok(_) => Err(err.into()),
                Err(primary) => Err(primary),
            }
        }
    }
}
