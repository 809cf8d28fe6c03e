//! Export-ready view of a monthly statement.
//!
//! Everything a PDF or spreadsheet writer needs is already localized here:
//! Brazilian currency, `dd/mm/YYYY` dates, status glyphs and the file name.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::schemas::{Bill, Group};
use crate::statement::Statement;

pub const PAID_LABEL: &str = "✓ Pago";
pub const PENDING_LABEL: &str = "○ Pendente";
pub const EMPTY_MESSAGE: &str = "Nenhuma conta cadastrada para este mês.";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatementReport {
    pub title: String,
    pub subtitle: String,
    pub file_stem: String,
    pub summary: ReportSummary,
    pub rows: Vec<ReportRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_due: String,
    pub total_paid: String,
    pub total_outstanding: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportRow {
    pub status: &'static str,
    pub due_on: String,
    pub description: String,
    pub amount: String,
}

impl From<&Bill> for ReportRow {
    fn from(bill: &Bill) -> Self {
        ReportRow {
            status: if bill.paid { PAID_LABEL } else { PENDING_LABEL },
            due_on: bill.due_on.format("%d/%m/%Y").to_string(),
            description: bill.description.clone(),
            amount: format_brl(bill.amount),
        }
    }
}

pub fn build_report(group: &Group, statement: &Statement) -> StatementReport {
    let period = statement.period;
    let rows: Vec<ReportRow> = statement.bills.iter().map(ReportRow::from).collect();
    let file_stem = format!(
        "resumo_{}_{}_{}",
        group.name.to_lowercase().replace(' ', "_"),
        period.long_name().to_lowercase(),
        period.year()
    );
    StatementReport {
        title: group.name.clone(),
        subtitle: format!("Resumo de {} de {}", period.long_name(), period.year()),
        file_stem,
        summary: ReportSummary {
            total_due: format_brl(statement.total_due),
            total_paid: format_brl(statement.total_paid),
            total_outstanding: format_brl(statement.total_outstanding),
        },
        empty_message: rows.is_empty().then_some(EMPTY_MESSAGE),
        rows,
    }
}

/// Formats an amount as `R$ 1.234,56`.
pub fn format_brl(amount: Decimal) -> String {
    let mut cents = amount.round_dp(2);
    cents.rescale(2);
    let plain = cents.abs().to_string();
    let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if cents.is_sign_negative() && !cents.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}R$ {grouped},{fraction}")
}
