use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeStatus {
    Active,
    Disabled,
}

#[derive(Debug, Clone)]
pub struct Employee {
    pub id: u64,
    pub code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub mobile: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub status: EmployeeStatus,
    pub roles: Vec<Role>,
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }

    /// Soft delete. Employees are never removed from storage.
    pub fn disable(&mut self) {
        self.status = EmployeeStatus::Disabled;
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fields written when an employee is created or updated.
#[derive(Debug, Clone)]
pub struct EmployeeDraft {
    pub code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub mobile: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub status: EmployeeStatus,
    pub roles: Vec<Role>,
}

impl EmployeeDraft {
    pub fn into_employee(self, id: u64) -> Employee {
        Employee {
            id,
            code: self.code,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password_hash: self.password_hash,
            mobile: self.mobile,
            date_of_birth: self.date_of_birth,
            status: self.status,
            roles: self.roles,
        }
    }
}
