use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct PlanUsage {
    pub user_id: Uuid,
    pub used: i32,
    pub updated_at: NaiveDateTime,
}
