use {crate::domain::error::PaymentError, uuid::Uuid};

pub struct NewAuditEntry {
    pub id: Uuid,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub order_id: Option<String>,
    pub event_id: Option<String>,
    pub action: String,
    pub actor: String,
    pub detail: serde_json::Value,
}

impl NewAuditEntry {
    pub fn payment(entity_id: Uuid, order_id: &str, action: &str, actor: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            entity_type: "payment".to_string(),
            entity_id: Some(entity_id),
            order_id: Some(order_id.to_string()),
            event_id: None,
            action: action.to_string(),
            actor: actor.to_string(),
            detail: serde_json::Value::Null,
        }
    }
}

pub async fn insert_audit_entry(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    entry: &NewAuditEntry,
) -> Result<(), PaymentError> {
    sqlx::query(
        r#"
        INSERT INTO audit_log (id, entity_type, entity_id, order_id, event_id, action, actor, detail)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(entry.id)
    .bind(&entry.entity_type)
    .bind(entry.entity_id)
    .bind(entry.order_id.as_deref())
    .bind(entry.event_id.as_deref())
    .bind(&entry.action)
    .bind(&entry.actor)
    .bind(&entry.detail)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
