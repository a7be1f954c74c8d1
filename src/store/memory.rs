//! In-memory store used by the unit and handler tests.
//!
//! One `MemoryStore` implements every store trait over a single locked state,
//! so joined fields (employee code and names) resolve the same way the MySQL
//! queries resolve them.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{AppError, AppResult};
use crate::model::{
    deduction::{Deduction, DeductionDraft},
    employee::{Employee, EmployeeDraft, EmployeeStatus},
    employment::{Employment, EmploymentDraft, EmploymentStatus},
    message::{Message, MessageDraft},
    payslip::{Payslip, PayslipDraft, PayslipStatus, Period},
};
use crate::store::{DeductionStore, EmployeeStore, EmploymentStore, MessageStore, PayslipStore};

#[derive(Default)]
struct State {
    next_id: u64,
    employees: Vec<Employee>,
    employments: Vec<EmploymentDraftRow>,
    deductions: Vec<Deduction>,
    payslips: Vec<Payslip>,
    messages: Vec<Message>,
}

/// Employments are stored without the joined employee fields.
#[derive(Clone)]
struct EmploymentDraftRow {
    id: u64,
    draft: EmploymentDraft,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn employee(&self, id: u64) -> AppResult<&Employee> {
        self.employees
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::not_found(format!("Employee id {id}")))
    }

    fn employment(&self, row: &EmploymentDraftRow) -> AppResult<Employment> {
        let employee = self.employee(row.draft.employee_id)?;
        let d = &row.draft;
        Ok(Employment {
            id: row.id,
            code: d.code.clone(),
            employee_id: d.employee_id,
            employee_code: employee.code.clone(),
            employee_first_name: employee.first_name.clone(),
            employee_last_name: employee.last_name.clone(),
            department: d.department.clone(),
            position: d.position.clone(),
            base_salary: d.base_salary,
            status: d.status,
            joining_date: d.joining_date,
        })
    }

    fn check_employee_unique(&self, draft: &EmployeeDraft, except: Option<u64>) -> AppResult<()> {
        let taken = self.employees.iter().any(|e| {
            Some(e.id) != except && (e.code == draft.code || e.email == draft.email)
        });
        if taken {
            return Err(AppError::Conflict(
                "Employee with this code or email already exists".into(),
            ));
        }
        Ok(())
    }

    fn check_employment_unique(
        &self,
        draft: &EmploymentDraft,
        except: Option<u64>,
    ) -> AppResult<()> {
        let taken = self.employments.iter().any(|row| {
            Some(row.id) != except
                && (row.draft.code == draft.code
                    || (draft.status == EmploymentStatus::Active
                        && row.draft.status == EmploymentStatus::Active
                        && row.draft.employee_id == draft.employee_id))
        });
        if taken {
            return Err(AppError::Conflict(
                "Employment code already exists or the employee already has an active employment"
                    .into(),
            ));
        }
        Ok(())
    }

    fn check_deduction_unique(&self, draft: &DeductionDraft, except: Option<u64>) -> AppResult<()> {
        let taken = self
            .deductions
            .iter()
            .any(|d| Some(d.id) != except && (d.code == draft.code || d.name == draft.name));
        if taken {
            return Err(AppError::Conflict(
                "Deduction with this code or name already exists".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn insert(&self, draft: EmployeeDraft) -> AppResult<Employee> {
        let mut state = self.state();
        state.check_employee_unique(&draft, None)?;
        let id = state.next_id();
        let employee = draft.into_employee(id);
        state.employees.push(employee.clone());
        Ok(employee)
    }

    async fn update(&self, id: u64, draft: EmployeeDraft) -> AppResult<Employee> {
        let mut state = self.state();
        state.employee(id)?;
        state.check_employee_unique(&draft, Some(id))?;
        let employee = draft.into_employee(id);
        if let Some(slot) = state.employees.iter_mut().find(|e| e.id == id) {
            *slot = employee.clone();
        }
        Ok(employee)
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<Employee>> {
        Ok(self.state().employees.iter().find(|e| e.id == id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Employee>> {
        Ok(self.state().employees.iter().find(|e| e.code == code).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Employee>> {
        Ok(self
            .state()
            .employees
            .iter()
            .find(|e| e.email == email)
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<Employee>> {
        Ok(self.state().employees.clone())
    }

    async fn list_active(&self) -> AppResult<Vec<Employee>> {
        Ok(self
            .state()
            .employees
            .iter()
            .filter(|e| e.is_active())
            .cloned()
            .collect())
    }

    async fn disable(&self, id: u64) -> AppResult<bool> {
        let mut state = self.state();
        match state.employees.iter_mut().find(|e| e.id == id) {
            Some(employee) => {
                employee.status = EmployeeStatus::Disabled;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl EmploymentStore for MemoryStore {
    async fn insert(&self, draft: EmploymentDraft) -> AppResult<Employment> {
        let mut state = self.state();
        state.employee(draft.employee_id)?;
        state.check_employment_unique(&draft, None)?;
        let row = EmploymentDraftRow {
            id: state.next_id(),
            draft,
        };
        let employment = state.employment(&row)?;
        state.employments.push(row);
        Ok(employment)
    }

    async fn update(&self, id: u64, draft: EmploymentDraft) -> AppResult<Employment> {
        let mut state = self.state();
        if !state.employments.iter().any(|row| row.id == id) {
            return Err(AppError::not_found(format!("Employment id {id}")));
        }
        state.employee(draft.employee_id)?;
        state.check_employment_unique(&draft, Some(id))?;
        let row = EmploymentDraftRow { id, draft };
        let employment = state.employment(&row)?;
        if let Some(slot) = state.employments.iter_mut().find(|r| r.id == id) {
            *slot = row;
        }
        Ok(employment)
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<Employment>> {
        let state = self.state();
        state
            .employments
            .iter()
            .find(|row| row.id == id)
            .map(|row| state.employment(row))
            .transpose()
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Employment>> {
        let state = self.state();
        state
            .employments
            .iter()
            .find(|row| row.draft.code == code)
            .map(|row| state.employment(row))
            .transpose()
    }

    async fn find_active(&self, employee_id: u64) -> AppResult<Option<Employment>> {
        let state = self.state();
        state
            .employments
            .iter()
            .find(|row| {
                row.draft.employee_id == employee_id
                    && row.draft.status == EmploymentStatus::Active
            })
            .map(|row| state.employment(row))
            .transpose()
    }

    async fn list(&self) -> AppResult<Vec<Employment>> {
        let state = self.state();
        state
            .employments
            .iter()
            .map(|row| state.employment(row))
            .collect()
    }

    async fn delete(&self, id: u64) -> AppResult<bool> {
        let mut state = self.state();
        let before = state.employments.len();
        state.employments.retain(|row| row.id != id);
        Ok(state.employments.len() < before)
    }
}

#[async_trait]
impl DeductionStore for MemoryStore {
    async fn insert(&self, draft: DeductionDraft) -> AppResult<Deduction> {
        let mut state = self.state();
        state.check_deduction_unique(&draft, None)?;
        let deduction = Deduction {
            id: state.next_id(),
            code: draft.code,
            name: draft.name,
            rate: draft.rate,
        };
        state.deductions.push(deduction.clone());
        Ok(deduction)
    }

    async fn update(&self, id: u64, draft: DeductionDraft) -> AppResult<Deduction> {
        let mut state = self.state();
        state.check_deduction_unique(&draft, Some(id))?;
        let slot = state
            .deductions
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| AppError::not_found(format!("Deduction id {id}")))?;
        slot.code = draft.code;
        slot.name = draft.name;
        slot.rate = draft.rate;
        Ok(slot.clone())
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<Deduction>> {
        Ok(self.state().deductions.iter().find(|d| d.id == id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Deduction>> {
        Ok(self
            .state()
            .deductions
            .iter()
            .find(|d| d.code == code)
            .cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Deduction>> {
        Ok(self
            .state()
            .deductions
            .iter()
            .find(|d| d.name == name)
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<Deduction>> {
        Ok(self.state().deductions.clone())
    }

    async fn delete(&self, id: u64) -> AppResult<bool> {
        let mut state = self.state();
        let before = state.deductions.len();
        state.deductions.retain(|d| d.id != id);
        Ok(state.deductions.len() < before)
    }
}

#[async_trait]
impl PayslipStore for MemoryStore {
    async fn find_by_id(&self, id: u64) -> AppResult<Option<Payslip>> {
        Ok(self.state().payslips.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_employee(&self, employee_id: u64) -> AppResult<Vec<Payslip>> {
        let mut payslips: Vec<Payslip> = self
            .state()
            .payslips
            .iter()
            .filter(|p| p.employee_id == employee_id)
            .cloned()
            .collect();
        payslips.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
        Ok(payslips)
    }

    async fn find_by_period(&self, period: Period) -> AppResult<Vec<Payslip>> {
        Ok(self
            .state()
            .payslips
            .iter()
            .filter(|p| p.month == period.month() && p.year == period.year())
            .cloned()
            .collect())
    }

    async fn replace_pending(
        &self,
        period: Period,
        drafts: Vec<PayslipDraft>,
    ) -> AppResult<Vec<Payslip>> {
        let mut state = self.state();
        let in_period = |p: &Payslip| p.month == period.month() && p.year == period.year();

        if state
            .payslips
            .iter()
            .any(|p| in_period(p) && p.status == PayslipStatus::Paid)
        {
            return Err(AppError::Conflict(format!(
                "Payroll for {period} has already been approved. Cannot re-generate."
            )));
        }

        state.payslips.retain(|p| !in_period(p));
        let mut stored = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let payslip = draft.into_payslip(state.next_id());
            state.payslips.push(payslip.clone());
            stored.push(payslip);
        }
        Ok(stored)
    }

    async fn mark_paid(
        &self,
        period: Period,
        approval_date: NaiveDate,
    ) -> AppResult<Vec<Payslip>> {
        let mut state = self.state();
        let in_period = |p: &Payslip| p.month == period.month() && p.year == period.year();

        if !state.payslips.iter().any(in_period) {
            return Err(AppError::not_found(format!("Payslips for {period}")));
        }
        if state
            .payslips
            .iter()
            .any(|p| in_period(p) && p.status == PayslipStatus::Paid)
        {
            return Err(AppError::Conflict(format!(
                "Payroll for {period} has already been approved"
            )));
        }

        let mut paid = Vec::new();
        for payslip in state.payslips.iter_mut().filter(|p| in_period(p)) {
            payslip.approve(approval_date)?;
            paid.push(payslip.clone());
        }
        Ok(paid)
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn record(&self, draft: MessageDraft) -> AppResult<Message> {
        let mut state = self.state();
        let message = draft.into_message(state.next_id());
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<Message>> {
        Ok(self.state().messages.iter().find(|m| m.id == id).cloned())
    }

    async fn find_by_employee(&self, employee_id: u64) -> AppResult<Vec<Message>> {
        Ok(self
            .state()
            .messages
            .iter()
            .filter(|m| m.employee_id == employee_id)
            .cloned()
            .collect())
    }
}
