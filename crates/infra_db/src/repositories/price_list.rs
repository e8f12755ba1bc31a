//! Price list repository
//!
//! One row per aggregate. Scalar state lives in columns, the price table in a
//! JSONB array of [`PriceEntryRecord`]s. Rows are decoded back through
//! [`PriceListSnapshot::restore`], so a row that breaks an aggregate invariant
//! surfaces as a corrupt record rather than a half-built list.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{ActorId, DomainPort, PortError, PriceListId};
use domain_pricing::{
    PriceEntryRecord, PriceList, PriceListRepository, PriceListSnapshot, StrategyKind,
    PRICE_LIST_ENTITY,
};

use crate::error::DatabaseError;

const SELECT_PRICE_LIST: &str = r#"
    SELECT id, reference, strategy_boundary, version,
           active, archived, soft_deleted,
           created_at, created_by, last_modified_at, last_modified_by,
           entries
    FROM price_lists
"#;

/// PostgreSQL-backed [`PriceListRepository`]
///
/// # Example
///
/// ```rust,ignore
/// use infra_db::repositories::PostgresPriceListRepository;
///
/// let repository = PostgresPriceListRepository::new(pool);
/// let list = repository.find(id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresPriceListRepository {
    pool: PgPool,
}

impl PostgresPriceListRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Current stored version, or `None` if the row does not exist
    async fn stored_version(&self, id: PriceListId) -> Result<Option<u64>, DatabaseError> {
        let row = sqlx::query("SELECT version FROM price_lists WHERE id = $1")
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(version_from_column(id, row.try_get("version")?)?)),
            None => Ok(None),
        }
    }

    /// Classifies a compare-and-swap that matched no row
    async fn missed_write(&self, id: PriceListId, expected: Option<u64>) -> DatabaseError {
        match self.stored_version(id).await {
            Ok(None) => DatabaseError::not_found(PRICE_LIST_ENTITY, id),
            Ok(actual) => DatabaseError::VersionConflict {
                entity: PRICE_LIST_ENTITY,
                id: id.to_string(),
                expected,
                actual,
            },
            Err(e) => e,
        }
    }

    async fn insert(&self, snapshot: &PriceListSnapshot) -> Result<(), PortError> {
        let entries = entries_to_column(snapshot)?;
        let result = sqlx::query(
            r#"
            INSERT INTO price_lists (
                id, reference, strategy_boundary, version,
                active, archived, soft_deleted,
                created_at, created_by, last_modified_at, last_modified_by,
                entries
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(Uuid::from(snapshot.id))
        .bind(&snapshot.reference)
        .bind(snapshot.strategy_boundary.as_str())
        .bind(version_to_column(snapshot.version)?)
        .bind(snapshot.active)
        .bind(snapshot.archived)
        .bind(snapshot.soft_deleted)
        .bind(snapshot.created_at)
        .bind(Uuid::from(snapshot.created_by))
        .bind(snapshot.last_modified_at)
        .bind(Uuid::from(snapshot.last_modified_by))
        .bind(entries)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from);

        match result {
            Ok(done) if done.rows_affected() == 1 => Ok(()),
            Ok(_) => Err(self.missed_write(snapshot.id, None).await.into()),
            Err(DatabaseError::DuplicateEntry(_)) => Err(PortError::already_exists(
                PRICE_LIST_ENTITY,
                &snapshot.reference,
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, snapshot: &PriceListSnapshot, expected: u64) -> Result<(), PortError> {
        let entries = entries_to_column(snapshot)?;
        let result = sqlx::query(
            r#"
            UPDATE price_lists
            SET reference = $2,
                strategy_boundary = $3,
                version = $4,
                active = $5,
                archived = $6,
                soft_deleted = $7,
                last_modified_at = $8,
                last_modified_by = $9,
                entries = $10
            WHERE id = $1 AND version = $11
            "#,
        )
        .bind(Uuid::from(snapshot.id))
        .bind(&snapshot.reference)
        .bind(snapshot.strategy_boundary.as_str())
        .bind(version_to_column(snapshot.version)?)
        .bind(snapshot.active)
        .bind(snapshot.archived)
        .bind(snapshot.soft_deleted)
        .bind(snapshot.last_modified_at)
        .bind(Uuid::from(snapshot.last_modified_by))
        .bind(entries)
        .bind(version_to_column(expected)?)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from);

        match result {
            Ok(done) if done.rows_affected() == 1 => Ok(()),
            Ok(_) => Err(self.missed_write(snapshot.id, Some(expected)).await.into()),
            Err(DatabaseError::DuplicateEntry(_)) => Err(PortError::already_exists(
                PRICE_LIST_ENTITY,
                &snapshot.reference,
            )),
            Err(e) => Err(e.into()),
        }
    }
}

impl DomainPort for PostgresPriceListRepository {}

#[async_trait]
impl PriceListRepository for PostgresPriceListRepository {
    #[instrument(skip(self), fields(price_list_id = %id))]
    async fn find(&self, id: PriceListId) -> Result<PriceList, PortError> {
        let row = sqlx::query(&format!("{SELECT_PRICE_LIST} WHERE id = $1"))
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DatabaseError::not_found(PRICE_LIST_ENTITY, id))?;

        Ok(row_to_price_list(&row)?)
    }

    #[instrument(skip(self))]
    async fn find_by_reference(&self, reference: &str) -> Result<Option<PriceList>, PortError> {
        let row = sqlx::query(&format!("{SELECT_PRICE_LIST} WHERE reference = $1"))
            .bind(reference)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        match row {
            Some(row) => Ok(Some(row_to_price_list(&row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, list), fields(price_list_id = %list.id(), version = list.version()))]
    async fn save(&self, list: &mut PriceList) -> Result<(), PortError> {
        let snapshot = PriceListSnapshot::capture(list)
            .map_err(|e| DatabaseError::corrupt(PRICE_LIST_ENTITY, list.id(), e))?;

        match list.persisted_version() {
            None => self.insert(&snapshot).await?,
            Some(expected) => self.update(&snapshot, expected).await?,
        }

        list.mark_persisted();
        debug!(entries = snapshot.entries.len(), "price list saved");
        Ok(())
    }

    #[instrument(skip(self), fields(price_list_id = %id))]
    async fn delete(&self, id: PriceListId, expected_version: u64) -> Result<(), PortError> {
        let done = sqlx::query("DELETE FROM price_lists WHERE id = $1 AND version = $2")
            .bind(Uuid::from(id))
            .bind(version_to_column(expected_version)?)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        if done.rows_affected() == 0 {
            return Err(self.missed_write(id, Some(expected_version)).await.into());
        }
        debug!("price list deleted");
        Ok(())
    }
}

fn version_to_column(version: u64) -> Result<i64, DatabaseError> {
    i64::try_from(version)
        .map_err(|_| DatabaseError::QueryFailed(format!("version {} out of range", version)))
}

fn version_from_column(id: impl std::fmt::Display, version: i64) -> Result<u64, DatabaseError> {
    u64::try_from(version)
        .map_err(|_| DatabaseError::corrupt(PRICE_LIST_ENTITY, id, format!("negative version {}", version)))
}

fn entries_to_column(snapshot: &PriceListSnapshot) -> Result<serde_json::Value, DatabaseError> {
    serde_json::to_value(&snapshot.entries)
        .map_err(|e| DatabaseError::corrupt(PRICE_LIST_ENTITY, snapshot.id, e))
}

/// Converts a `price_lists` row back into the aggregate
fn row_to_price_list(row: &PgRow) -> Result<PriceList, DatabaseError> {
    let id: Uuid = row.try_get("id")?;
    let corrupt = |message: String| DatabaseError::corrupt(PRICE_LIST_ENTITY, id, message);

    let boundary: String = row.try_get("strategy_boundary")?;
    let strategy_boundary = boundary
        .parse::<StrategyKind>()
        .map_err(|e| corrupt(e.to_string()))?;
    let entries: Vec<PriceEntryRecord> =
        serde_json::from_value(row.try_get::<serde_json::Value, _>("entries")?)
            .map_err(|e| corrupt(e.to_string()))?;

    let snapshot = PriceListSnapshot {
        id: PriceListId::from(id),
        reference: row.try_get("reference")?,
        strategy_boundary,
        version: version_from_column(id, row.try_get("version")?)?,
        active: row.try_get("active")?,
        archived: row.try_get("archived")?,
        soft_deleted: row.try_get("soft_deleted")?,
        created_at: row.try_get("created_at")?,
        created_by: ActorId::from(row.try_get::<Uuid, _>("created_by")?),
        last_modified_at: row.try_get("last_modified_at")?,
        last_modified_by: ActorId::from(row.try_get::<Uuid, _>("last_modified_by")?),
        entries,
    };

    snapshot.restore().map_err(|e| corrupt(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_column_bounds() {
        assert_eq!(version_to_column(7).unwrap(), 7);
        assert!(version_to_column(u64::MAX).is_err());
        assert!(matches!(
            version_from_column("PRL-1", -1),
            Err(DatabaseError::SerializationError { .. })
        ));
    }
}
