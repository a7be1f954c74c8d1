use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::model::employee::Employee;
use crate::payroll::calculator::SalaryBreakdown;

/// Earliest payroll year accepted by the API.
pub const MIN_PAYROLL_YEAR: i32 = 2000;

/// A payroll period: one generation/approval batch.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, derive_more::Display)]
#[display(fmt = "{}/{}", month, year)]
pub struct Period {
    month: u32,
    year: i32,
}

impl Period {
    pub fn new(month: u32, year: i32) -> AppResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(AppError::Validation(
                "Month must be between 1 and 12".to_string(),
            ));
        }
        if year < MIN_PAYROLL_YEAR {
            return Err(AppError::Validation(format!(
                "Year must be {MIN_PAYROLL_YEAR} or later"
            )));
        }
        Ok(Self { month, year })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PayslipStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone)]
pub struct Payslip {
    pub id: u64,
    pub employee_id: u64,
    pub employee_code: String,
    pub employee_first_name: String,
    pub employee_last_name: String,
    pub employee_email: String,
    pub breakdown: SalaryBreakdown,
    pub month: u32,
    pub year: i32,
    pub status: PayslipStatus,
    pub generation_date: NaiveDate,
    pub approval_date: Option<NaiveDate>,
}

impl Payslip {
    pub fn is_pending(&self) -> bool {
        self.status == PayslipStatus::Pending
    }

    /// PENDING -> PAID. PAID is terminal.
    pub fn approve(&mut self, on: NaiveDate) -> AppResult<()> {
        match self.status {
            PayslipStatus::Pending => {
                self.status = PayslipStatus::Paid;
                self.approval_date = Some(on);
                Ok(())
            }
            PayslipStatus::Paid => Err(AppError::Conflict(format!(
                "Payslip {} is already paid",
                self.id
            ))),
        }
    }

    pub fn net_salary(&self) -> Decimal {
        self.breakdown.net_salary
    }

    pub fn gross_salary(&self) -> Decimal {
        self.breakdown.gross_salary
    }
}

/// A computed payslip that has not been stored yet.
#[derive(Debug, Clone)]
pub struct PayslipDraft {
    pub employee_id: u64,
    pub employee_code: String,
    pub employee_first_name: String,
    pub employee_last_name: String,
    pub employee_email: String,
    pub breakdown: SalaryBreakdown,
    pub period: Period,
    pub generation_date: NaiveDate,
}

impl PayslipDraft {
    pub fn pending(
        employee: &Employee,
        breakdown: SalaryBreakdown,
        period: Period,
        generation_date: NaiveDate,
    ) -> Self {
        Self {
            employee_id: employee.id,
            employee_code: employee.code.clone(),
            employee_first_name: employee.first_name.clone(),
            employee_last_name: employee.last_name.clone(),
            employee_email: employee.email.clone(),
            breakdown,
            period,
            generation_date,
        }
    }

    pub fn into_payslip(self, id: u64) -> Payslip {
        Payslip {
            id,
            employee_id: self.employee_id,
            employee_code: self.employee_code,
            employee_first_name: self.employee_first_name,
            employee_last_name: self.employee_last_name,
            employee_email: self.employee_email,
            breakdown: self.breakdown,
            month: self.period.month(),
            year: self.period.year(),
            status: PayslipStatus::Pending,
            generation_date: self.generation_date,
            approval_date: None,
        }
    }
}
