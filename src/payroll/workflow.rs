//! Payroll generation and approval over one (month, year) period.
//!
//! Both workflows hold the period lock for their whole run. Generation computes
//! every payslip before writing anything, so an excessive-deduction failure on
//! any employee leaves storage untouched. Approval commits the PAID transition
//! first and then notifies, so delivery failures never undo it.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::model::payslip::{Payslip, PayslipDraft, Period};
use crate::notify::Notifier;
use crate::payroll::calculator::{DeductionRates, calculate_payslip};
use crate::store::{DeductionStore, EmployeeStore, EmploymentStore, PayslipStore};
use crate::utils::period_lock::PeriodLocks;

pub struct PayrollWorkflow {
    employees: Arc<dyn EmployeeStore>,
    employments: Arc<dyn EmploymentStore>,
    deductions: Arc<dyn DeductionStore>,
    payslips: Arc<dyn PayslipStore>,
    notifier: Arc<Notifier>,
    locks: PeriodLocks,
}

impl PayrollWorkflow {
    pub fn new(
        employees: Arc<dyn EmployeeStore>,
        employments: Arc<dyn EmploymentStore>,
        deductions: Arc<dyn DeductionStore>,
        payslips: Arc<dyn PayslipStore>,
        notifier: Arc<Notifier>,
        locks: PeriodLocks,
    ) -> Self {
        Self {
            employees,
            employments,
            deductions,
            payslips,
            notifier,
            locks,
        }
    }

    /// Computes PENDING payslips for every active employee with an active
    /// employment, replacing any PENDING payslips already stored for the period.
    pub async fn generate(&self, period: Period, today: NaiveDate) -> AppResult<Vec<Payslip>> {
        let _guard = self.locks.acquire(period).await;

        let existing = self.payslips.find_by_period(period).await?;
        if existing.iter().any(|p| !p.is_pending()) {
            return Err(AppError::Conflict(format!(
                "Payroll for {period} has already been approved. Cannot re-generate."
            )));
        }

        let rates = DeductionRates::from_rules(&self.deductions.list_rates().await?);

        let mut drafts = Vec::new();
        let mut skipped = 0usize;
        for employee in self.employees.list_active().await? {
            let Some(employment) = self.employments.find_active(employee.id).await? else {
                warn!(
                    employee_id = employee.id,
                    code = %employee.code,
                    %period,
                    "No active employment, employee skipped"
                );
                skipped += 1;
                continue;
            };

            let breakdown = calculate_payslip(employment.base_salary, &rates)
                .map_err(|e| e.for_employee(&employee.code))?;
            drafts.push(PayslipDraft::pending(&employee, breakdown, period, today));
        }

        let stored = self.payslips.replace_pending(period, drafts).await?;
        info!(
            %period,
            generated = stored.len(),
            replaced = existing.len(),
            skipped,
            "Payroll generated"
        );
        Ok(stored)
    }

    /// Marks every payslip of the period PAID, then records a message and
    /// emails each employee.
    pub async fn approve(&self, period: Period, today: NaiveDate) -> AppResult<Vec<Payslip>> {
        let _guard = self.locks.acquire(period).await;

        let current = self.payslips.find_by_period(period).await?;
        if current.is_empty() {
            return Err(AppError::not_found(format!("Payslips for {period}")));
        }
        if let Some(paid) = current.iter().find(|p| !p.is_pending()) {
            return Err(AppError::Conflict(format!(
                "Payroll for {period} cannot be approved: payslip {} is not pending",
                paid.id
            )));
        }

        let approved = self.payslips.mark_paid(period, today).await?;

        let mut failures = 0usize;
        for payslip in &approved {
            let delivery = self.notifier.payslip_paid(payslip, today).await;
            if !(delivery.message_recorded && delivery.email_sent) {
                failures += 1;
            }
        }

        info!(
            %period,
            approved = approved.len(),
            notification_failures = failures,
            "Payroll approved"
        );
        Ok(approved)
    }
}
