use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::db::Database;

impl Database {
    /// Writes every entry in one transaction; either all land or none do.
    pub async fn put_all(&self, bucket: &str, entries: Vec<(String, Vec<u8>)>) -> Result<()> {
        let bucket = bucket.to_string();
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open write transaction")?;
            let updated_at = Utc::now().to_rfc3339();
            {
                let mut stmt = tx.prepare_cached(
                    "INSERT INTO kv (bucket, key, value, updated_at)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(bucket, key) DO UPDATE
                     SET value = excluded.value,
                         updated_at = excluded.updated_at",
                )?;
                for (key, value) in &entries {
                    stmt.execute(params![bucket, key, value, updated_at])
                        .with_context(|| format!("failed to write {bucket}/{key}"))?;
                }
            }
            tx.commit().context("failed to commit write transaction")?;
            Ok(())
        })
        .await
    }

    pub async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let bucket = bucket.to_string();
        let key = key.to_string();
        self.execute(move |conn| {
            conn.query_row(
                "SELECT value FROM kv WHERE bucket = ?1 AND key = ?2",
                params![bucket, key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("failed to read {bucket}/{key}"))
        })
        .await
    }

    /// Point-reads several keys inside one read transaction so the values all
    /// come from the same committed write.
    pub async fn get_all(&self, bucket: &str, keys: &[&str]) -> Result<Vec<Option<Vec<u8>>>> {
        let bucket = bucket.to_string();
        let keys: Vec<String> = keys.iter().map(|key| key.to_string()).collect();
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open read transaction")?;
            let mut values = Vec::with_capacity(keys.len());
            {
                let mut stmt =
                    tx.prepare_cached("SELECT value FROM kv WHERE bucket = ?1 AND key = ?2")?;
                for key in &keys {
                    let value: Option<Vec<u8>> = stmt
                        .query_row(params![bucket, key], |row| row.get(0))
                        .optional()
                        .with_context(|| format!("failed to read {bucket}/{key}"))?;
                    values.push(value);
                }
            }
            tx.finish().context("failed to close read transaction")?;
            Ok(values)
        })
        .await
    }
}
