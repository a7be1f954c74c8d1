use std::sync::Arc;

use sqlx::MySqlPool;

use crate::notify::{Mailer, Notifier};
use crate::payroll::workflow::PayrollWorkflow;
use crate::store::mysql::MySqlStores;
use crate::store::{DeductionStore, EmployeeStore, EmploymentStore, MessageStore, PayslipStore};
use crate::utils::period_lock::PeriodLocks;

/// Shared application state, registered once as `web::Data<AppState>`.
pub struct AppState {
    pub employees: Arc<dyn EmployeeStore>,
    pub employments: Arc<dyn EmploymentStore>,
    pub deductions: Arc<dyn DeductionStore>,
    pub payslips: Arc<dyn PayslipStore>,
    pub messages: Arc<dyn MessageStore>,
    pub payroll: PayrollWorkflow,
}

impl AppState {
    pub fn new(
        employees: Arc<dyn EmployeeStore>,
        employments: Arc<dyn EmploymentStore>,
        deductions: Arc<dyn DeductionStore>,
        payslips: Arc<dyn PayslipStore>,
        messages: Arc<dyn MessageStore>,
        mailer: Arc<dyn Mailer>,
        institution: &str,
    ) -> Self {
        let notifier = Arc::new(Notifier::new(messages.clone(), mailer, institution));
        let payroll = PayrollWorkflow::new(
            employees.clone(),
            employments.clone(),
            deductions.clone(),
            payslips.clone(),
            notifier,
            PeriodLocks::new(),
        );
        Self {
            employees,
            employments,
            deductions,
            payslips,
            messages,
            payroll,
        }
    }

    pub fn mysql(pool: MySqlPool, mailer: Arc<dyn Mailer>, institution: &str) -> Self {
        let stores = MySqlStores::new(pool);
        Self::new(
            Arc::new(stores.employees),
            Arc::new(stores.employments),
            Arc::new(stores.deductions),
            Arc::new(stores.payslips),
            Arc::new(stores.messages),
            mailer,
            institution,
        )
    }

    #[cfg(test)]
    pub fn in_memory(
        store: Arc<crate::store::memory::MemoryStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            mailer,
            crate::notify::DEFAULT_INSTITUTION,
        )
    }
}
