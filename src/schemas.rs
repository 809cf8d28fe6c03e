use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub type OwnerId = String;

const GROUP_NAME_MAX: usize = 100;
const BILL_DESCRIPTION_MAX: usize = 200;
const AMOUNT_SCALE: u32 = 2;
// Ten significant digits, two of them after the decimal point.
const AMOUNT_INTEGER_DIGITS: u32 = 8;

pub fn new_id() -> String {
    ObjectId::new().to_hex()
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub owner: OwnerId,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(owner: OwnerId, payload: GroupPayload) -> Group {
        Group {
            id: new_id(),
            name: payload.name,
            description: payload.description,
            owner,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Bill {
    pub id: String,
    pub group_id: String,
    pub description: String,
    pub amount: Decimal,
    pub due_on: NaiveDate,
    #[serde(default)]
    pub paid: bool,
    pub paid_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Bill {
    pub fn new(group_id: String, payload: BillPayload) -> Bill {
        Bill {
            id: new_id(),
            group_id,
            description: payload.description,
            amount: payload.amount,
            due_on: payload.due_on,
            paid: payload.paid,
            paid_on: payload.paid_on,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, payload: BillPayload) {
        self.description = payload.description;
        self.amount = payload.amount;
        self.due_on = payload.due_on;
        self.paid = payload.paid;
        self.paid_on = payload.paid_on;
    }

    /// Marks the bill paid or pending. A paid bill without an explicit date
    /// is recorded as paid on `today`.
    pub fn set_paid(&mut self, toggle: PaidToggle, today: NaiveDate) {
        self.paid = toggle.paid;
        self.paid_on = if toggle.paid {
            Some(toggle.paid_on.unwrap_or(today))
        } else {
            None
        };
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GroupPayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl GroupPayload {
    pub fn validate(self) -> Result<GroupPayload> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("group name must not be empty".into()));
        }
        if name.chars().count() > GROUP_NAME_MAX {
            return Err(AppError::Validation(format!(
                "group name must be at most {GROUP_NAME_MAX} characters"
            )));
        }
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Ok(GroupPayload { name, description })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BillPayload {
    pub description: String,
    pub amount: Decimal,
    pub due_on: NaiveDate,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub paid_on: Option<NaiveDate>,
}

impl BillPayload {
    /// Normalizes the payload. A paid bill without a payment date is taken as
    /// paid on `today`; a pending bill never keeps one.
    pub fn validate(self, today: NaiveDate) -> Result<BillPayload> {
        let description = self.description.trim().to_string();
        if description.is_empty() {
            return Err(AppError::Validation(
                "bill description must not be empty".into(),
            ));
        }
        if description.chars().count() > BILL_DESCRIPTION_MAX {
            return Err(AppError::Validation(format!(
                "bill description must be at most {BILL_DESCRIPTION_MAX} characters"
            )));
        }
        let amount = validate_amount(self.amount)?;
        let paid_on = self.paid.then(|| self.paid_on.unwrap_or(today));
        Ok(BillPayload {
            description,
            amount,
            due_on: self.due_on,
            paid: self.paid,
            paid_on,
        })
    }
}

fn validate_amount(amount: Decimal) -> Result<Decimal> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AppError::Validation("amount must not be negative".into()));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(AppError::Validation(format!(
            "amount must have at most {AMOUNT_SCALE} decimal places"
        )));
    }
    if amount.trunc() >= Decimal::from(10u64.pow(AMOUNT_INTEGER_DIGITS)) {
        return Err(AppError::Validation(format!(
            "amount must have at most {AMOUNT_INTEGER_DIGITS} integer digits"
        )));
    }
    let mut amount = amount.abs();
    amount.rescale(AMOUNT_SCALE);
    Ok(amount)
}

/// Edit form for an existing bill; `group_id` moves it to another group.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BillUpdate {
    #[serde(default)]
    pub group_id: Option<String>,
    pub description: String,
    pub amount: Decimal,
    pub due_on: NaiveDate,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub paid_on: Option<NaiveDate>,
}

impl BillUpdate {
    pub fn into_parts(self) -> (Option<String>, BillPayload) {
        let payload = BillPayload {
            description: self.description,
            amount: self.amount,
            due_on: self.due_on,
            paid: self.paid,
            paid_on: self.paid_on,
        };
        (self.group_id, payload)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct PaidToggle {
    pub paid: bool,
    #[serde(default)]
    pub paid_on: Option<NaiveDate>,
}
