use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::companies},
};
use domain::{entities::companies::CompanyEntity, repositories::companies::CompanyRepository};

pub struct CompanyPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CompanyPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CompanyRepository for CompanyPostgres {
    async fn update_plan(&self, company_id: Uuid, plan_id: Uuid) -> Result<CompanyEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(companies::table)
            .filter(companies::id.eq(company_id))
            .set((
                companies::plan_id.eq(Some(plan_id)),
                companies::updated_at.eq(Utc::now()),
            ))
            .returning(CompanyEntity::as_returning())
            .get_result::<CompanyEntity>(&mut conn)
            .optional()?
            .ok_or_else(|| anyhow!("company {} not found", company_id))
    }
}
