use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::access::{owned_bill, owned_group};
use crate::auth::Owner;
use crate::error::{AppError, Result};
use crate::report::build_report;
use crate::schemas::{Bill, BillPayload, BillUpdate, Group, GroupPayload, PaidToggle};
use crate::statement::{compute_statement, Statement};
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth_secret: String,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, auth_secret: impl Into<String>) -> Self {
        AppState {
            store,
            auth_secret: auth_secret.into(),
        }
    }
}

/// `?month=&year=`; missing values fall back to the current date.
#[derive(Deserialize, Debug, Default)]
pub struct PeriodQuery {
    month: Option<i64>,
    year: Option<i32>,
}

impl PeriodQuery {
    fn resolve(&self, today: NaiveDate) -> (i64, i32) {
        (
            self.month.unwrap_or_else(|| i64::from(today.month())),
            self.year.unwrap_or_else(|| today.year()),
        )
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Serialize)]
struct GroupDetail {
    group: Group,
    statement: Statement,
}

async fn group_statement(
    state: &AppState,
    owner: &str,
    group_id: &str,
    query: &PeriodQuery,
) -> Result<(Group, Statement)> {
    let group = owned_group(state.store.as_ref(), owner, group_id).await?;
    let bills = state.store.list_bills(&group.id).await?;
    let (month, year) = query.resolve(today());
    let statement = compute_statement(&bills, month, year)?;
    Ok((group, statement))
}

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[get("/groups")]
async fn list_groups(state: web::Data<AppState>, Owner(owner): Owner) -> Result<HttpResponse> {
    let groups = state.store.list_groups(&owner).await?;
    Ok(HttpResponse::Ok().json(groups))
}

#[post("/groups")]
async fn add_group(
    state: web::Data<AppState>,
    Owner(owner): Owner,
    json: web::Json<GroupPayload>,
) -> Result<HttpResponse> {
    let group = Group::new(owner, json.into_inner().validate()?);
    state.store.insert_group(&group).await?;
    log::info!("group {} created by {}", group.id, group.owner);
    Ok(HttpResponse::Created().json(group))
}

#[get("/groups/{id}")]
async fn get_group(
    state: web::Data<AppState>,
    Owner(owner): Owner,
    id: web::Path<String>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse> {
    let (group, statement) = group_statement(&state, &owner, &id, &query).await?;
    Ok(HttpResponse::Ok().json(GroupDetail { group, statement }))
}

#[put("/groups/{id}")]
async fn update_group(
    state: web::Data<AppState>,
    Owner(owner): Owner,
    id: web::Path<String>,
    json: web::Json<GroupPayload>,
) -> Result<HttpResponse> {
    let mut group = owned_group(state.store.as_ref(), &owner, &id).await?;
    let payload = json.into_inner().validate()?;
    group.name = payload.name;
    group.description = payload.description;
    if !state.store.update_group(&group).await? {
        return Err(AppError::NotFound("group"));
    }
    Ok(HttpResponse::Ok().json(group))
}

#[delete("/groups/{id}")]
async fn delete_group(
    state: web::Data<AppState>,
    Owner(owner): Owner,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    if !state.store.delete_group(&owner, &id).await? {
        return Err(AppError::NotFound("group"));
    }
    log::info!("group {} deleted by {}", id.as_str(), owner);
    Ok(HttpResponse::NoContent().finish())
}

#[get("/groups/{id}/report")]
async fn get_report(
    state: web::Data<AppState>,
    Owner(owner): Owner,
    id: web::Path<String>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse> {
    let (group, statement) = group_statement(&state, &owner, &id, &query).await?;
    Ok(HttpResponse::Ok().json(build_report(&group, &statement)))
}

#[post("/groups/{id}/bills")]
async fn add_bill(
    state: web::Data<AppState>,
    Owner(owner): Owner,
    id: web::Path<String>,
    json: web::Json<BillPayload>,
) -> Result<HttpResponse> {
    let group = owned_group(state.store.as_ref(), &owner, &id).await?;
    let bill = Bill::new(group.id, json.into_inner().validate(today())?);
    state.store.insert_bill(&bill).await?;
    log::debug!("bill {} added to group {}", bill.id, bill.group_id);
    Ok(HttpResponse::Created().json(bill))
}

#[put("/bills/{id}")]
async fn update_bill(
    state: web::Data<AppState>,
    Owner(owner): Owner,
    id: web::Path<String>,
    json: web::Json<BillUpdate>,
) -> Result<HttpResponse> {
    let (mut bill, group) = owned_bill(state.store.as_ref(), &owner, &id).await?;
    let (target_group, payload) = json.into_inner().into_parts();
    let payload = payload.validate(today())?;
    if let Some(target) = target_group.filter(|target| *target != group.id) {
        bill.group_id = owned_group(state.store.as_ref(), &owner, &target).await?.id;
    }
    bill.apply(payload);
    if !state.store.update_bill(&bill).await? {
        return Err(AppError::NotFound("bill"));
    }
    Ok(HttpResponse::Ok().json(bill))
}

#[patch("/bills/{id}/paid")]
async fn set_bill_paid(
    state: web::Data<AppState>,
    Owner(owner): Owner,
    id: web::Path<String>,
    json: web::Json<PaidToggle>,
) -> Result<HttpResponse> {
    let (mut bill, _) = owned_bill(state.store.as_ref(), &owner, &id).await?;
    bill.set_paid(json.into_inner(), today());
    if !state.store.update_bill(&bill).await? {
        return Err(AppError::NotFound("bill"));
    }
    Ok(HttpResponse::Ok().json(bill))
}

#[delete("/bills/{id}")]
async fn delete_bill(
    state: web::Data<AppState>,
    Owner(owner): Owner,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    let (bill, _) = owned_bill(state.store.as_ref(), &owner, &id).await?;
    if !state.store.delete_bill(&bill.id).await? {
        return Err(AppError::NotFound("bill"));
    }
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(list_groups)
        .service(add_group)
        .service(get_report)
        .service(get_group)
        .service(update_group)
        .service(delete_group)
        .service(add_bill)
        .service(set_bill_paid)
        .service(update_bill)
        .service(delete_bill);
}
