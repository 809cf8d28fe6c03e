use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::FindOptions, Client, Collection};

use crate::error::Result;
use crate::schemas::{Bill, Group};
use crate::store::Store;

pub struct MongoStore {
    groups: Collection<Group>,
    bills: Collection<Bill>,
}

impl MongoStore {
    pub fn new(client: &Client, database: &str) -> Self {
        let db = client.database(database);
        MongoStore {
            groups: db.collection("Groups"),
            bills: db.collection("Bills"),
        }
    }

    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self::new(&client, database))
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn list_groups(&self, owner: &str) -> Result<Vec<Group>> {
        let options = FindOptions::builder().sort(doc! { "created_at": 1 }).build();
        let cursor = self.groups.find(doc! { "owner": owner }, options).await?;
        let groups: Vec<Group> = cursor.try_collect().await?;
        Ok(groups)
    }

    async fn find_group(&self, owner: &str, id: &str) -> Result<Option<Group>> {
        Ok(self
            .groups
            .find_one(doc! { "id": id, "owner": owner }, None)
            .await?)
    }

    async fn insert_group(&self, group: &Group) -> Result<()> {
        self.groups.insert_one(group, None).await?;
        Ok(())
    }

    async fn update_group(&self, group: &Group) -> Result<bool> {
        let result = self
            .groups
            .replace_one(
                doc! { "id": group.id.as_str(), "owner": group.owner.as_str() },
                group,
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_group(&self, owner: &str, id: &str) -> Result<bool> {
        let result = self
            .groups
            .delete_one(doc! { "id": id, "owner": owner }, None)
            .await?;
        if result.deleted_count == 0 {
            return Ok(false);
        }
        let bills = self.bills.delete_many(doc! { "group_id": id }, None).await?;
        log::info!("deleted group {id} and {} bills", bills.deleted_count);
        Ok(true)
    }

    async fn list_bills(&self, group_id: &str) -> Result<Vec<Bill>> {
        let options = FindOptions::builder()
            .sort(doc! { "due_on": 1, "created_at": 1 })
            .build();
        let cursor = self
            .bills
            .find(doc! { "group_id": group_id }, options)
            .await?;
        let bills: Vec<Bill> = cursor.try_collect().await?;
        Ok(bills)
    }

    async fn find_bill(&self, id: &str) -> Result<Option<Bill>> {
        Ok(self.bills.find_one(doc! { "id": id }, None).await?)
    }

    async fn insert_bill(&self, bill: &Bill) -> Result<()> {
        self.bills.insert_one(bill, None).await?;
        Ok(())
    }

    async fn update_bill(&self, bill: &Bill) -> Result<bool> {
        let result = self
            .bills
            .replace_one(doc! { "id": bill.id.as_str() }, bill, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_bill(&self, id: &str) -> Result<bool> {
        let result = self.bills.delete_one(doc! { "id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }
}
