use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::companies::CompanyEntity;

#[async_trait]
#[automock]
pub trait CompanyRepository {
    /// Points the company at `plan_id`. Fails when the company does not exist.
    async fn update_plan(&self, company_id: Uuid, plan_id: Uuid) -> Result<CompanyEntity>;
}
