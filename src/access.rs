//! Ownership checks run before any group data reaches the aggregator.

use crate::error::{AppError, Result};
use crate::schemas::{Bill, Group};
use crate::store::Store;

pub async fn owned_group(store: &dyn Store, owner: &str, group_id: &str) -> Result<Group> {
    store
        .find_group(owner, group_id)
        .await?
        .ok_or(AppError::NotFound("group"))
}

/// A bill whose group belongs to `owner`. Bills of other users are reported
/// as missing.
pub async fn owned_bill(store: &dyn Store, owner: &str, bill_id: &str) -> Result<(Bill, Group)> {
    let bill = store
        .find_bill(bill_id)
        .await?
        .ok_or(AppError::NotFound("bill"))?;
    match store.find_group(owner, &bill.group_id).await? {
        Some(group) => Ok((bill, group)),
        None => Err(AppError::NotFound("bill")),
    }
}
