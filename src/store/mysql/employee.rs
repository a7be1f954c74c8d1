use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, Row, Transaction, mysql::MySqlRow};
use tracing::debug;

use super::parse_column;
use crate::error::{AppError, AppResult};
use crate::model::{
    employee::{Employee, EmployeeDraft, EmployeeStatus},
    role::Role,
};
use crate::store::EmployeeStore;

const SELECT_EMPLOYEE: &str = r#"
    SELECT id, code, first_name, last_name, email, password, mobile, date_of_birth, status
    FROM employees
"#;

const DUPLICATE_EMPLOYEE: &str = "Employee with this code or email already exists";

pub struct MySqlEmployeeStore {
    pool: MySqlPool,
}

impl MySqlEmployeeStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn with_roles(&self, row: Option<MySqlRow>) -> AppResult<Option<Employee>> {
        match row {
            Some(row) => {
                let mut employee = employee_from_row(&row)?;
                employee.roles = self.roles_of(employee.id).await?;
                Ok(Some(employee))
            }
            None => Ok(None),
        }
    }

    async fn fetch_many(&self, filter: &str) -> AppResult<Vec<Employee>> {
        let sql = format!("{SELECT_EMPLOYEE} {filter} ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut roles = self.all_roles().await?;
        rows.iter()
            .map(|row| -> AppResult<Employee> {
                let mut employee = employee_from_row(row)?;
                employee.roles = roles.remove(&employee.id).unwrap_or_default();
                Ok(employee)
            })
            .collect()
    }

    async fn roles_of(&self, employee_id: u64) -> AppResult<Vec<Role>> {
        let rows = sqlx::query("SELECT role FROM employee_roles WHERE employee_id = ?")
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| parse_column::<Role>(row, "role").map_err(AppError::from))
            .collect()
    }

    async fn all_roles(&self) -> AppResult<HashMap<u64, Vec<Role>>> {
        let rows = sqlx::query("SELECT employee_id, role FROM employee_roles")
            .fetch_all(&self.pool)
            .await?;

        let mut roles: HashMap<u64, Vec<Role>> = HashMap::new();
        for row in &rows {
            let employee_id: u64 = row.try_get("employee_id")?;
            let role: Role = parse_column(row, "role")?;
            roles.entry(employee_id).or_default().push(role);
        }
        Ok(roles)
    }

    async fn write_roles(
        tx: &mut Transaction<'_, MySql>,
        employee_id: u64,
        roles: &[Role],
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM employee_roles WHERE employee_id = ?")
            .bind(employee_id)
            .execute(&mut **tx)
            .await?;

        for role in roles {
            sqlx::query("INSERT INTO employee_roles (employee_id, role) VALUES (?, ?)")
                .bind(employee_id)
                .bind(role.as_ref())
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }
}

fn employee_from_row(row: &MySqlRow) -> Result<Employee, sqlx::Error> {
    Ok(Employee {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password")?,
        mobile: row.try_get("mobile")?,
        date_of_birth: row.try_get("date_of_birth")?,
        status: parse_column(row, "status")?,
        roles: Vec::new(),
    })
}

#[async_trait]
impl EmployeeStore for MySqlEmployeeStore {
    async fn insert(&self, draft: EmployeeDraft) -> AppResult<Employee> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO employees
            (code, first_name, last_name, email, password, mobile, date_of_birth, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&draft.code)
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(&draft.email)
        .bind(&draft.password_hash)
        .bind(&draft.mobile)
        .bind(draft.date_of_birth)
        .bind(draft.status.as_ref())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, DUPLICATE_EMPLOYEE))?;

        let id = result.last_insert_id();
        Self::write_roles(&mut tx, id, &draft.roles).await?;
        tx.commit().await?;

        debug!(employee_id = id, code = %draft.code, "Employee inserted");
        Ok(draft.into_employee(id))
    }

    async fn update(&self, id: u64, draft: EmployeeDraft) -> AppResult<Employee> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE employees
            SET code = ?, first_name = ?, last_name = ?, email = ?, password = ?,
                mobile = ?, date_of_birth = ?, status = ?
            WHERE id = ?
            "#,
        )
        .bind(&draft.code)
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(&draft.email)
        .bind(&draft.password_hash)
        .bind(&draft.mobile)
        .bind(draft.date_of_birth)
        .bind(draft.status.as_ref())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, DUPLICATE_EMPLOYEE))?;

        // MySQL reports 0 affected rows when nothing changed, so check existence separately.
        if result.rows_affected() == 0 {
            let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
            if exists == 0 {
                return Err(AppError::not_found(format!("Employee id {id}")));
            }
        }

        Self::write_roles(&mut tx, id, &draft.roles).await?;
        tx.commit().await?;
        Ok(draft.into_employee(id))
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<Employee>> {
        let row = sqlx::query(&format!("{SELECT_EMPLOYEE} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        self.with_roles(row).await
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Employee>> {
        let row = sqlx::query(&format!("{SELECT_EMPLOYEE} WHERE code = ?"))
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        self.with_roles(row).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Employee>> {
        let row = sqlx::query(&format!("{SELECT_EMPLOYEE} WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        self.with_roles(row).await
    }

    async fn list(&self) -> AppResult<Vec<Employee>> {
        self.fetch_many("").await
    }

    async fn list_active(&self) -> AppResult<Vec<Employee>> {
        self.fetch_many("WHERE status = 'ACTIVE'").await
    }

    async fn disable(&self, id: u64) -> AppResult<bool> {
        let result = sqlx::query("UPDATE employees SET status = ? WHERE id = ?")
            .bind(EmployeeStatus::Disabled.as_ref())
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() > 0 {
            return Ok(true);
        }
        Ok(self.find_by_id(id).await?.is_some())
    }
}
