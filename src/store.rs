use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::schemas::{Bill, Group};

/// Persistence for groups and their bills.
///
/// Group lookups are scoped to an owner; bill lookups are not, callers go
/// through [`crate::access`] to check the owning group.
#[async_trait]
pub trait Store: Send + Sync {
    /// Groups of `owner`, oldest first.
    async fn list_groups(&self, owner: &str) -> Result<Vec<Group>>;
    async fn find_group(&self, owner: &str, id: &str) -> Result<Option<Group>>;
    async fn insert_group(&self, group: &Group) -> Result<()>;
    /// Returns false when no group of `group.owner` has `group.id`.
    async fn update_group(&self, group: &Group) -> Result<bool>;
    /// Removes the group together with its bills.
    async fn delete_group(&self, owner: &str, id: &str) -> Result<bool>;

    /// Bills of a group, ascending by due date.
    async fn list_bills(&self, group_id: &str) -> Result<Vec<Bill>>;
    async fn find_bill(&self, id: &str) -> Result<Option<Bill>>;
    async fn insert_bill(&self, bill: &Bill) -> Result<()>;
    async fn update_bill(&self, bill: &Bill) -> Result<bool>;
    async fn delete_bill(&self, id: &str) -> Result<bool>;
}

#[derive(Default)]
pub struct MemoryStore {
    groups: RwLock<Vec<Group>>,
    bills: RwLock<Vec<Bill>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_groups(&self, owner: &str) -> Result<Vec<Group>> {
        let mut groups: Vec<Group> = self
            .groups
            .read()
            .await
            .iter()
            .filter(|g| g.owner == owner)
            .cloned()
            .collect();
        groups.sort_by_key(|g| g.created_at);
        Ok(groups)
    }

    async fn find_group(&self, owner: &str, id: &str) -> Result<Option<Group>> {
        Ok(self
            .groups
            .read()
            .await
            .iter()
            .find(|g| g.id == id && g.owner == owner)
            .cloned())
    }

    async fn insert_group(&self, group: &Group) -> Result<()> {
        self.groups.write().await.push(group.clone());
        Ok(())
    }

    async fn update_group(&self, group: &Group) -> Result<bool> {
        let mut groups = self.groups.write().await;
        match groups
            .iter_mut()
            .find(|g| g.id == group.id && g.owner == group.owner)
        {
            Some(stored) => {
                *stored = group.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_group(&self, owner: &str, id: &str) -> Result<bool> {
        let mut groups = self.groups.write().await;
        let before = groups.len();
        groups.retain(|g| !(g.id == id && g.owner == owner));
        if groups.len() == before {
            return Ok(false);
        }
        self.bills.write().await.retain(|b| b.group_id != id);
        Ok(true)
    }

    async fn list_bills(&self, group_id: &str) -> Result<Vec<Bill>> {
        let mut bills: Vec<Bill> = self
            .bills
            .read()
            .await
            .iter()
            .filter(|b| b.group_id == group_id)
            .cloned()
            .collect();
        bills.sort_by_key(|b| (b.due_on, b.created_at));
        Ok(bills)
    }

    async fn find_bill(&self, id: &str) -> Result<Option<Bill>> {
        Ok(self.bills.read().await.iter().find(|b| b.id == id).cloned())
    }

    async fn insert_bill(&self, bill: &Bill) -> Result<()> {
        self.bills.write().await.push(bill.clone());
        Ok(())
    }

    async fn update_bill(&self, bill: &Bill) -> Result<bool> {
        let mut bills = self.bills.write().await;
        match bills.iter_mut().find(|b| b.id == bill.id) {
            Some(stored) => {
                *stored = bill.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_bill(&self, id: &str) -> Result<bool> {
        let mut bills = self.bills.write().await;
        let before = bills.len();
        bills.retain(|b| b.id != id);
        Ok(bills.len() != before)
    }
}
