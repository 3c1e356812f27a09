//! The operations the interface can ask for.
//!
//! `Desk` is the single boundary between the front ends (HTML pages and CLI)
//! and the store. Front ends hold a `Desk`, call one method per user action
//! and await it inline; they never see SQL or the connection.

use std::path::PathBuf;

use tracing::info;

use crate::auth::{self, Session};
use crate::backup::BackupManager;
use crate::db::{
    customers, Customer, CustomerInput, CustomerQuery, CustomerType, DashboardSummary, Store,
};
use crate::error::CrmResult;

/// Number of customers on the dashboard's recent list
pub const RECENT_LIMIT: u32 = 5;

#[derive(Clone)]
pub struct Desk {
    store: Store,
    backups: BackupManager,
}

impl Desk {
    pub fn new(store: Store, backups: BackupManager) -> Self {
        Self { store, backups }
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    pub async fn login(&self, username: &str, password: &str) -> CrmResult<Session> {
        auth::authenticate(&self.store.pool(), username, password).await
    }

    /// Counts per type plus the most recent customers. Never cached.
    pub async fn dashboard(&self) -> CrmResult<DashboardSummary> {
        let db = self.store.pool();
        Ok(DashboardSummary {
            total: customers::count_all(&db).await?,
            clean_coal: customers::count_by_type(&db, CustomerType::CleanCoal).await?,
            middlings: customers::count_by_type(&db, CustomerType::Middlings).await?,
            recent: customers::list_recent(&db, RECENT_LIMIT).await?,
        })
    }

    pub async fn search_customers(&self, query: &CustomerQuery) -> CrmResult<Vec<Customer>> {
        Ok(customers::search(&self.store.pool(), query).await?)
    }

    pub async fn customer(&self, id: i64) -> CrmResult<Option<Customer>> {
        Ok(customers::find(&self.store.pool(), id).await?)
    }

    pub async fn add_customer(&self, input: &CustomerInput) -> CrmResult<i64> {
        let id = customers::insert(&self.store.pool(), input).await?;
        info!(customer_id = id, company = %input.company_name.trim(), "Customer added");
        Ok(id)
    }

    /// Unknown ids are accepted and change nothing
    pub async fn update_customer(&self, id: i64, input: &CustomerInput) -> CrmResult<()> {
        let changed = customers::update(&self.store.pool(), id, input).await?;
        info!(customer_id = id, rows = changed, "Customer updated");
        Ok(())
    }

    /// The caller confirms with the operator before calling this
    pub async fn delete_customer(&self, id: i64) -> CrmResult<()> {
        let removed = customers::delete(&self.store.pool(), id).await?;
        info!(customer_id = id, rows = removed, "Customer deleted");
        Ok(())
    }

    pub async fn change_password(
        &self,
        session: &Session,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> CrmResult<()> {
        auth::change_password(&self.store.pool(), &session.username, current, new, confirm).await
    }

    pub async fn backup(&self) -> CrmResult<PathBuf> {
        self.backups.backup().await
    }

    pub async fn list_backups(&self) -> CrmResult<Vec<String>> {
        self.backups.list().await
    }

    pub async fn restore(&self, file_name: &str) -> CrmResult<()> {
        self.backups.restore(file_name).await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::temp_desk;
    use super::*;
    use crate::error::CrmError;

    fn customer(company: &str, t: CustomerType) -> CustomerInput {
        CustomerInput::new(company, "联系人", "13800138000", t, "")
    }

    #[tokio::test]
    async fn test_dashboard_scenario() {
        let (_dir, desk) = temp_desk().await;

        let a = desk.add_customer(&customer("A", CustomerType::CleanCoal)).await.unwrap();
        let b = desk.add_customer(&customer("B", CustomerType::Middlings)).await.unwrap();
        let c = desk.add_customer(&customer("C", CustomerType::CleanCoal)).await.unwrap();

        let summary = desk.dashboard().await.unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.clean_coal, 2);
        assert_eq!(summary.middlings, 1);
        let ids: Vec<i64> = summary.recent.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![c, b, a]);
    }

    #[tokio::test]
    async fn test_recent_list_capped_at_five() {
        let (_dir, desk) = temp_desk().await;
        for i in 0..7 {
            desk.add_customer(&customer(&format!("C{i}"), CustomerType::Middlings))
                .await
                .unwrap();
        }

        let summary = desk.dashboard().await.unwrap();
        assert_eq!(summary.total, 7);
        assert_eq!(summary.recent.len(), 5);
        assert_eq!(summary.recent[0].company_name, "C6");
        assert_eq!(summary.recent[4].company_name, "C2");
    }

    #[tokio::test]
    async fn test_count_tracks_inserts_and_deletes() {
        let (_dir, desk) = temp_desk().await;
        let a = desk.add_customer(&customer("A", CustomerType::CleanCoal)).await.unwrap();
        desk.add_customer(&customer("B", CustomerType::CleanCoal)).await.unwrap();
        desk.delete_customer(a).await.unwrap();
        desk.delete_customer(a).await.unwrap();
        assert_eq!(desk.dashboard().await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_login_and_change_password() {
        let (_dir, desk) = temp_desk().await;

        let session = desk.login("jirowang", "123456").await.unwrap();
        assert!(matches!(
            desk.login("jirowang", "bad").await,
            Err(CrmError::InvalidCredentials)
        ));

        desk.change_password(&session, "123456", "654321", "654321")
            .await
            .unwrap();
        assert!(desk.login("jirowang", "654321").await.is_ok());
    }

    #[tokio::test]
    async fn test_restore_through_desk() {
        let (_dir, desk) = temp_desk().await;
        desk.add_customer(&customer("Kept", CustomerType::CleanCoal)).await.unwrap();
        let path = desk.backup().await.unwrap();
        desk.add_customer(&customer("Lost", CustomerType::CleanCoal)).await.unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(desk.list_backups().await.unwrap(), vec![name.clone()]);
        desk.restore(&name).await.unwrap();

        let rows = desk.search_customers(&CustomerQuery::all()).await.unwrap();
        let names: Vec<&str> = rows.iter().map(|c| c.company_name.as_str()).collect();
        assert_eq!(names, vec!["Kept"]);
    }
}
