use async_trait::async_trait;
use sqlx::{MySqlPool, Row, mysql::MySqlRow};

use super::parse_column;
use crate::error::{AppError, AppResult};
use crate::model::employment::{Employment, EmploymentDraft};
use crate::store::EmploymentStore;

const SELECT_EMPLOYMENT: &str = r#"
    SELECT em.id, em.code, em.employee_id, e.code AS employee_code,
           e.first_name, e.last_name, em.department, em.position,
           em.base_salary, em.status, em.joining_date
    FROM employments em
    JOIN employees e ON e.id = em.employee_id
"#;

const DUPLICATE_EMPLOYMENT: &str =
    "Employment code already exists or the employee already has an active employment";

pub struct MySqlEmploymentStore {
    pool: MySqlPool,
}

impl MySqlEmploymentStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn employment_from_row(row: &MySqlRow) -> Result<Employment, sqlx::Error> {
    Ok(Employment {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        employee_id: row.try_get("employee_id")?,
        employee_code: row.try_get("employee_code")?,
        employee_first_name: row.try_get("first_name")?,
        employee_last_name: row.try_get("last_name")?,
        department: row.try_get("department")?,
        position: row.try_get("position")?,
        base_salary: row.try_get("base_salary")?,
        status: parse_column(row, "status")?,
        joining_date: row.try_get("joining_date")?,
    })
}

#[async_trait]
impl EmploymentStore for MySqlEmploymentStore {
    async fn insert(&self, draft: EmploymentDraft) -> AppResult<Employment> {
        let result = sqlx::query(
            r#"
            INSERT INTO employments
            (code, employee_id, department, position, base_salary, status, joining_date)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&draft.code)
        .bind(draft.employee_id)
        .bind(&draft.department)
        .bind(&draft.position)
        .bind(draft.base_salary)
        .bind(draft.status.as_ref())
        .bind(draft.joining_date)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_write(e, DUPLICATE_EMPLOYMENT))?;

        let id = result.last_insert_id();
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Employment {id} vanished after insert")))
    }

    async fn update(&self, id: u64, draft: EmploymentDraft) -> AppResult<Employment> {
        sqlx::query(
            r#"
            UPDATE employments
            SET code = ?, employee_id = ?, department = ?, position = ?,
                base_salary = ?, status = ?, joining_date = ?
            WHERE id = ?
            "#,
        )
        .bind(&draft.code)
        .bind(draft.employee_id)
        .bind(&draft.department)
        .bind(&draft.position)
        .bind(draft.base_salary)
        .bind(draft.status.as_ref())
        .bind(draft.joining_date)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_write(e, DUPLICATE_EMPLOYMENT))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Employment id {id}")))
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<Employment>> {
        let row = sqlx::query(&format!("{SELECT_EMPLOYMENT} WHERE em.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(employment_from_row).transpose()?)
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Employment>> {
        let row = sqlx::query(&format!("{SELECT_EMPLOYMENT} WHERE em.code = ?"))
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(employment_from_row).transpose()?)
    }

    async fn find_active(&self, employee_id: u64) -> AppResult<Option<Employment>> {
        let row = sqlx::query(&format!(
            "{SELECT_EMPLOYMENT} WHERE em.employee_id = ? AND em.status = 'ACTIVE'"
        ))
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(employment_from_row).transpose()?)
    }

    async fn list(&self) -> AppResult<Vec<Employment>> {
        let rows = sqlx::query(&format!("{SELECT_EMPLOYMENT} ORDER BY em.id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(employment_from_row)
            .collect::<Result<_, _>>()?)
    }

    async fn delete(&self, id: u64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM employments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
