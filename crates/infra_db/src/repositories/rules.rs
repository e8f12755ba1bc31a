//! Incompatibility rule store

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{ActorId, DomainPort, ItemId, PortError, RuleId};
use domain_compatibility::{
    CompatibilityTag, IncompatibilityRule, RuleRecord, RuleStore, RULE_ENTITY,
};

use crate::error::DatabaseError;

/// PostgreSQL-backed [`RuleStore`]
#[derive(Debug, Clone)]
pub struct PostgresRuleStore {
    pool: PgPool,
}

impl PostgresRuleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PostgresRuleStore {}

#[async_trait]
impl RuleStore for PostgresRuleStore {
    #[instrument(skip(self))]
    async fn find_active_rules(&self) -> Result<Vec<IncompatibilityRule>, PortError> {
        let rows = sqlx::query(
            r#"
            SELECT id, trigger_id, trigger_tag, forbidden_id
            FROM incompatibility_rules
            WHERE active
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        let rules = rows
            .iter()
            .map(row_to_rule)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = rules.len(), "loaded active rules");
        Ok(rules)
    }

    #[instrument(skip(self), fields(rule_id = %id))]
    async fn find_rule(&self, id: RuleId) -> Result<RuleRecord, PortError> {
        let row = sqlx::query(
            r#"
            SELECT id, trigger_id, trigger_tag, forbidden_id, active, created_at, created_by
            FROM incompatibility_rules
            WHERE id = $1
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(|| DatabaseError::not_found(RULE_ENTITY, id))?;

        Ok(RuleRecord {
            id,
            rule: row_to_rule(&row)?,
            active: row.try_get("active").map_err(DatabaseError::from)?,
            created_at: row.try_get("created_at").map_err(DatabaseError::from)?,
            created_by: ActorId::from(
                row.try_get::<Uuid, _>("created_by")
                    .map_err(DatabaseError::from)?,
            ),
        })
    }

    #[instrument(skip(self, record), fields(rule_id = %record.id))]
    async fn add_rule(&self, record: &RuleRecord) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            INSERT INTO incompatibility_rules (
                id, trigger_id, trigger_tag, forbidden_id, active, created_at, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::from(record.id))
        .bind(record.rule.trigger_id().map(Uuid::from))
        .bind(record.rule.trigger_tag().map(|t| t.as_str().to_string()))
        .bind(Uuid::from(record.rule.forbidden_id()))
        .bind(record.active)
        .bind(record.created_at)
        .bind(Uuid::from(record.created_by))
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from);

        match result {
            Ok(_) => Ok(()),
            Err(DatabaseError::DuplicateEntry(_)) => {
                Err(PortError::already_exists(RULE_ENTITY, record.id))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self), fields(rule_id = %id))]
    async fn deactivate_rule(&self, id: RuleId) -> Result<(), PortError> {
        let done = sqlx::query("UPDATE incompatibility_rules SET active = FALSE WHERE id = $1")
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        if done.rows_affected() == 0 {
            return Err(DatabaseError::not_found(RULE_ENTITY, id).into());
        }
        Ok(())
    }
}

/// Rebuilds the rule from its trigger columns, re-running its validation
fn row_to_rule(row: &PgRow) -> Result<IncompatibilityRule, DatabaseError> {
    let id: Uuid = row.try_get("id")?;
    let trigger_id: Option<Uuid> = row.try_get("trigger_id")?;
    let trigger_tag: Option<String> = row.try_get("trigger_tag")?;
    let forbidden_id: Uuid = row.try_get("forbidden_id")?;

    let trigger_tag = trigger_tag
        .map(CompatibilityTag::new)
        .transpose()
        .map_err(|e| DatabaseError::corrupt(RULE_ENTITY, id, e))?;

    IncompatibilityRule::new(
        trigger_id.map(ItemId::from),
        trigger_tag,
        ItemId::from(forbidden_id),
    )
    .map_err(|e| DatabaseError::corrupt(RULE_ENTITY, id, e))
}
