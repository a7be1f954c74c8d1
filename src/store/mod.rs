//! Persistence seams.
//!
//! Each aggregate gets an async trait. `mysql` implements them over a
//! `MySqlPool`; the in-memory `memory` implementation backs the tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::AppResult;
use crate::model::{
    deduction::{Deduction, DeductionDraft},
    employee::{Employee, EmployeeDraft},
    employment::{Employment, EmploymentDraft},
    message::{Message, MessageDraft},
    payslip::{Payslip, PayslipDraft, Period},
};

#[cfg(test)]
pub mod memory;
pub mod mysql;

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn insert(&self, draft: EmployeeDraft) -> AppResult<Employee>;
    async fn update(&self, id: u64, draft: EmployeeDraft) -> AppResult<Employee>;
    async fn find_by_id(&self, id: u64) -> AppResult<Option<Employee>>;
    async fn find_by_code(&self, code: &str) -> AppResult<Option<Employee>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Employee>>;
    async fn list(&self) -> AppResult<Vec<Employee>>;
    async fn list_active(&self) -> AppResult<Vec<Employee>>;
    async fn disable(&self, id: u64) -> AppResult<bool>;
}

#[async_trait]
pub trait EmploymentStore: Send + Sync {
    async fn insert(&self, draft: EmploymentDraft) -> AppResult<Employment>;
    async fn update(&self, id: u64, draft: EmploymentDraft) -> AppResult<Employment>;
    async fn find_by_id(&self, id: u64) -> AppResult<Option<Employment>>;
    async fn find_by_code(&self, code: &str) -> AppResult<Option<Employment>>;
    async fn find_active(&self, employee_id: u64) -> AppResult<Option<Employment>>;
    async fn list(&self) -> AppResult<Vec<Employment>>;
    async fn delete(&self, id: u64) -> AppResult<bool>;
}

#[async_trait]
pub trait DeductionStore: Send + Sync {
    async fn insert(&self, draft: DeductionDraft) -> AppResult<Deduction>;
    async fn update(&self, id: u64, draft: DeductionDraft) -> AppResult<Deduction>;
    async fn find_by_id(&self, id: u64) -> AppResult<Option<Deduction>>;
    async fn find_by_code(&self, code: &str) -> AppResult<Option<Deduction>>;
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Deduction>>;
    async fn list(&self) -> AppResult<Vec<Deduction>>;
    async fn delete(&self, id: u64) -> AppResult<bool>;

    /// The rule table as `name -> fraction`.
    async fn list_rates(&self) -> AppResult<HashMap<String, Decimal>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .map(|d| (d.name, d.rate))
            .collect())
    }
}

#[async_trait]
pub trait PayslipStore: Send + Sync {
    async fn find_by_id(&self, id: u64) -> AppResult<Option<Payslip>>;
    async fn find_by_employee(&self, employee_id: u64) -> AppResult<Vec<Payslip>>;
    async fn find_by_period(&self, period: Period) -> AppResult<Vec<Payslip>>;

    /// Atomically discards the period's PENDING payslips and stores `drafts`.
    /// Fails with `Conflict` if the period holds any PAID payslip.
    async fn replace_pending(
        &self,
        period: Period,
        drafts: Vec<PayslipDraft>,
    ) -> AppResult<Vec<Payslip>>;

    /// Atomically marks every payslip of the period PAID on `approval_date`.
    /// Fails with `Conflict` if any of them is already PAID.
    async fn mark_paid(&self, period: Period, approval_date: NaiveDate)
    -> AppResult<Vec<Payslip>>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn record(&self, draft: MessageDraft) -> AppResult<Message>;
    async fn find_by_id(&self, id: u64) -> AppResult<Option<Message>>;
    async fn find_by_employee(&self, employee_id: u64) -> AppResult<Vec<Message>>;
}
