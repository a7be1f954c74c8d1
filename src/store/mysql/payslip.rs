use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{MySqlPool, Row, mysql::MySqlRow};
use tracing::{debug, info};

use super::parse_column;
use crate::error::{AppError, AppResult};
use crate::model::payslip::{Payslip, PayslipDraft, PayslipStatus, Period};
use crate::payroll::calculator::SalaryBreakdown;
use crate::store::PayslipStore;

const SELECT_PAYSLIP: &str = r#"
    SELECT p.id, p.employee_id, e.code AS employee_code, e.first_name, e.last_name, e.email,
           p.base_salary, p.housing_amount, p.transport_amount, p.employee_tax_amount,
           p.pension_amount, p.medical_insurance_amount, p.other_taxed_amount,
           p.gross_salary, p.total_deductions, p.net_salary,
           p.month, p.year, p.status, p.generation_date, p.approval_date
    FROM payslips p
    JOIN employees e ON e.id = p.employee_id
"#;

pub struct MySqlPayslipStore {
    pool: MySqlPool,
}

impl MySqlPayslipStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn payslip_from_row(row: &MySqlRow) -> Result<Payslip, sqlx::Error> {
    Ok(Payslip {
        id: row.try_get("id")?,
        employee_id: row.try_get("employee_id")?,
        employee_code: row.try_get("employee_code")?,
        employee_first_name: row.try_get("first_name")?,
        employee_last_name: row.try_get("last_name")?,
        employee_email: row.try_get("email")?,
        breakdown: SalaryBreakdown {
            base_salary: row.try_get("base_salary")?,
            housing_amount: row.try_get("housing_amount")?,
            transport_amount: row.try_get("transport_amount")?,
            employee_tax_amount: row.try_get("employee_tax_amount")?,
            pension_amount: row.try_get("pension_amount")?,
            medical_insurance_amount: row.try_get("medical_insurance_amount")?,
            other_taxed_amount: row.try_get("other_taxed_amount")?,
            gross_salary: row.try_get("gross_salary")?,
            total_deductions: row.try_get("total_deductions")?,
            net_salary: row.try_get("net_salary")?,
        },
        month: row.try_get("month")?,
        year: row.try_get("year")?,
        status: parse_column(row, "status")?,
        generation_date: row.try_get("generation_date")?,
        approval_date: row.try_get("approval_date")?,
    })
}

fn payslips_from_rows(rows: &[MySqlRow]) -> AppResult<Vec<Payslip>> {
    Ok(rows
        .iter()
        .map(payslip_from_row)
        .collect::<Result<_, _>>()?)
}

#[async_trait]
impl PayslipStore for MySqlPayslipStore {
    async fn find_by_id(&self, id: u64) -> AppResult<Option<Payslip>> {
        let row = sqlx::query(&format!("{SELECT_PAYSLIP} WHERE p.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(payslip_from_row).transpose()?)
    }

    async fn find_by_employee(&self, employee_id: u64) -> AppResult<Vec<Payslip>> {
        let rows = sqlx::query(&format!(
            "{SELECT_PAYSLIP} WHERE p.employee_id = ? ORDER BY p.year DESC, p.month DESC"
        ))
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        payslips_from_rows(&rows)
    }

    async fn find_by_period(&self, period: Period) -> AppResult<Vec<Payslip>> {
        let rows = sqlx::query(&format!(
            "{SELECT_PAYSLIP} WHERE p.month = ? AND p.year = ? ORDER BY p.id"
        ))
        .bind(period.month())
        .bind(period.year())
        .fetch_all(&self.pool)
        .await?;
        payslips_from_rows(&rows)
    }

    async fn replace_pending(
        &self,
        period: Period,
        drafts: Vec<PayslipDraft>,
    ) -> AppResult<Vec<Payslip>> {
        let mut tx = self.pool.begin().await?;

        let paid: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM payslips WHERE month = ? AND year = ? AND status = ? FOR UPDATE",
        )
        .bind(period.month())
        .bind(period.year())
        .bind(PayslipStatus::Paid.as_ref())
        .fetch_one(&mut *tx)
        .await?;
        if paid > 0 {
            return Err(AppError::Conflict(format!(
                "Payroll for {period} has already been approved. Cannot re-generate."
            )));
        }

        let discarded = sqlx::query("DELETE FROM payslips WHERE month = ? AND year = ? AND status = ?")
            .bind(period.month())
            .bind(period.year())
            .bind(PayslipStatus::Pending.as_ref())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if discarded > 0 {
            debug!(%period, discarded, "Discarded pending payslips");
        }

        let mut stored = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let b = &draft.breakdown;
            let result = sqlx::query(
                r#"
                INSERT INTO payslips
                (employee_id, base_salary, housing_amount, transport_amount, employee_tax_amount,
                 pension_amount, medical_insurance_amount, other_taxed_amount, gross_salary,
                 total_deductions, net_salary, month, year, status, generation_date)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(draft.employee_id)
            .bind(b.base_salary)
            .bind(b.housing_amount)
            .bind(b.transport_amount)
            .bind(b.employee_tax_amount)
            .bind(b.pension_amount)
            .bind(b.medical_insurance_amount)
            .bind(b.other_taxed_amount)
            .bind(b.gross_salary)
            .bind(b.total_deductions)
            .bind(b.net_salary)
            .bind(period.month())
            .bind(period.year())
            .bind(PayslipStatus::Pending.as_ref())
            .bind(draft.generation_date)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::from_write(e, format!("A payslip for {period} already exists"))
            })?;

            stored.push(draft.into_payslip(result.last_insert_id()));
        }

        tx.commit().await?;
        info!(%period, count = stored.len(), "Pending payslips stored");
        Ok(stored)
    }

    async fn mark_paid(
        &self,
        period: Period,
        approval_date: NaiveDate,
    ) -> AppResult<Vec<Payslip>> {
        let mut tx = self.pool.begin().await?;

        let statuses: Vec<String> = sqlx::query_scalar(
            "SELECT status FROM payslips WHERE month = ? AND year = ? FOR UPDATE",
        )
        .bind(period.month())
        .bind(period.year())
        .fetch_all(&mut *tx)
        .await?;

        if statuses.is_empty() {
            return Err(AppError::not_found(format!("Payslips for {period}")));
        }
        if statuses.iter().any(|s| s == PayslipStatus::Paid.as_ref()) {
            return Err(AppError::Conflict(format!(
                "Payroll for {period} has already been approved"
            )));
        }

        sqlx::query(
            "UPDATE payslips SET status = ?, approval_date = ? WHERE month = ? AND year = ?",
        )
        .bind(PayslipStatus::Paid.as_ref())
        .bind(approval_date)
        .bind(period.month())
        .bind(period.year())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.find_by_period(period).await
    }
}
