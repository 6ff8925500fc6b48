//! Repository for the `bulk_staged_rows` table.

use std::collections::HashMap;

use sqlx::PgPool;

use crate::models::bulk_staged_row::{BulkStagedRow, NewStagedRow};

/// Column list for bulk_staged_rows queries.
const COLUMNS: &str = "id, wholesaler_id, service_kind, property_code, entity_key, payload, \
    created_at, updated_at";

/// Provides data-access methods for staged wholesaler rows.
pub struct BulkStagedRowRepo;

impl BulkStagedRowRepo {
    /// Land a batch of rows in one transaction.
    ///
    /// With `replace` set, every existing row for the batch's properties is
    /// removed first (master semantics). Otherwise rows are upserted on
    /// their natural key. Returns the number of rows written.
    pub async fn apply(
        pool: &PgPool,
        wholesaler_id: i16,
        service_kind: &str,
        replace: bool,
        property_codes: &[String],
        rows: &[NewStagedRow],
    ) -> Result<u64, sqlx::Error> {
        let rows = dedupe_last_wins(rows);
        let mut tx = pool.begin().await?;

        if replace && !property_codes.is_empty() {
            let deleted = sqlx::query(
                "DELETE FROM bulk_staged_rows
                 WHERE wholesaler_id = $1 AND service_kind = $2 AND property_code = ANY($3)",
            )
            .bind(wholesaler_id)
            .bind(service_kind)
            .bind(property_codes)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            tracing::debug!(wholesaler_id, service_kind, deleted, "Cleared staged master rows");
        }

        let written = if rows.is_empty() {
            0
        } else {
            let properties: Vec<&str> = rows.iter().map(|r| r.property_code.as_str()).collect();
            let keys: Vec<&str> = rows.iter().map(|r| r.entity_key.as_str()).collect();
            let payloads: Vec<serde_json::Value> = rows.iter().map(|r| r.payload.clone()).collect();

            sqlx::query(
                "INSERT INTO bulk_staged_rows
                    (wholesaler_id, service_kind, property_code, entity_key, payload)
                 SELECT $1, $2, t.property_code, t.entity_key, t.payload
                 FROM UNNEST($3::text[], $4::text[], $5::jsonb[])
                    AS t(property_code, entity_key, payload)
                 ON CONFLICT (wholesaler_id, service_kind, property_code, entity_key)
                 DO UPDATE SET payload = EXCLUDED.payload",
            )
            .bind(wholesaler_id)
            .bind(service_kind)
            .bind(&properties)
            .bind(&keys)
            .bind(&payloads)
            .execute(&mut *tx)
            .await?
            .rows_affected()
        };

        tx.commit().await?;
        Ok(written)
    }

    /// List staged rows for one wholesaler/domain/property, ordered by key.
    pub async fn list_for_property(
        pool: &PgPool,
        wholesaler_id: i16,
        service_kind: &str,
        property_code: &str,
    ) -> Result<Vec<BulkStagedRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bulk_staged_rows
             WHERE wholesaler_id = $1 AND service_kind = $2 AND property_code = $3
             ORDER BY entity_key ASC"
        );
        sqlx::query_as::<_, BulkStagedRow>(&query)
            .bind(wholesaler_id)
            .bind(service_kind)
            .bind(property_code)
            .fetch_all(pool)
            .await
    }
}

/// Collapse rows sharing a natural key, keeping the last occurrence.
///
/// A single INSERT .. ON CONFLICT cannot touch the same key twice.
fn dedupe_last_wins(rows: &[NewStagedRow]) -> Vec<&NewStagedRow> {
    let mut position: HashMap<(&str, &str), usize> = HashMap::with_capacity(rows.len());
    let mut out: Vec<&NewStagedRow> = Vec::with_capacity(rows.len());

    for row in rows {
        let key = (row.property_code.as_str(), row.entity_key.as_str());
        match position.get(&key).copied() {
            Some(i) => out[i] = row,
            None => {
                position.insert(key, out.len());
                out.push(row);
            }
        }
    }
    out
}
