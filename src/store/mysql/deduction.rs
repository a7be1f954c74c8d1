use async_trait::async_trait;
use sqlx::{MySqlPool, Row, mysql::MySqlRow};

use crate::error::{AppError, AppResult};
use crate::model::deduction::{Deduction, DeductionDraft};
use crate::store::DeductionStore;

const SELECT_DEDUCTION: &str = "SELECT id, code, name, rate FROM deductions";
const DUPLICATE_DEDUCTION: &str = "Deduction with this code or name already exists";

pub struct MySqlDeductionStore {
    pool: MySqlPool,
}

impl MySqlDeductionStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn deduction_from_row(row: &MySqlRow) -> Result<Deduction, sqlx::Error> {
    Ok(Deduction {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        rate: row.try_get("rate")?,
    })
}

#[async_trait]
impl DeductionStore for MySqlDeductionStore {
    async fn insert(&self, draft: DeductionDraft) -> AppResult<Deduction> {
        let result = sqlx::query("INSERT INTO deductions (code, name, rate) VALUES (?, ?, ?)")
            .bind(&draft.code)
            .bind(&draft.name)
            .bind(draft.rate)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, DUPLICATE_DEDUCTION))?;

        Ok(Deduction {
            id: result.last_insert_id(),
            code: draft.code,
            name: draft.name,
            rate: draft.rate,
        })
    }

    async fn update(&self, id: u64, draft: DeductionDraft) -> AppResult<Deduction> {
        let result = sqlx::query("UPDATE deductions SET code = ?, name = ?, rate = ? WHERE id = ?")
            .bind(&draft.code)
            .bind(&draft.name)
            .bind(draft.rate)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, DUPLICATE_DEDUCTION))?;

        if result.rows_affected() == 0 && self.find_by_id(id).await?.is_none() {
            return Err(AppError::not_found(format!("Deduction id {id}")));
        }

        Ok(Deduction {
            id,
            code: draft.code,
            name: draft.name,
            rate: draft.rate,
        })
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<Deduction>> {
        let row = sqlx::query(&format!("{SELECT_DEDUCTION} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(deduction_from_row).transpose()?)
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Deduction>> {
        let row = sqlx::query(&format!("{SELECT_DEDUCTION} WHERE code = ?"))
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(deduction_from_row).transpose()?)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Deduction>> {
        let row = sqlx::query(&format!("{SELECT_DEDUCTION} WHERE name = ?"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(deduction_from_row).transpose()?)
    }

    async fn list(&self) -> AppResult<Vec<Deduction>> {
        let rows = sqlx::query(&format!("{SELECT_DEDUCTION} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(deduction_from_row)
            .collect::<Result<_, _>>()?)
    }

    async fn delete(&self, id: u64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM deductions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
