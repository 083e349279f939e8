use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::companies;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = companies)]
pub struct CompanyEntity {
    pub id: Uuid,
    pub plan_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}
