use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone)]
pub struct Employment {
    pub id: u64,
    pub code: String,
    pub employee_id: u64,
    pub employee_code: String,
    pub employee_first_name: String,
    pub employee_last_name: String,
    pub department: String,
    pub position: String,
    pub base_salary: Decimal,
    pub status: EmploymentStatus,
    pub joining_date: NaiveDate,
}

impl Employment {
    pub fn is_active(&self) -> bool {
        self.status == EmploymentStatus::Active
    }
}

#[derive(Debug, Clone)]
pub struct EmploymentDraft {
    pub code: String,
    pub employee_id: u64,
    pub department: String,
    pub position: String,
    pub base_salary: Decimal,
    pub status: EmploymentStatus,
    pub joining_date: NaiveDate,
}
