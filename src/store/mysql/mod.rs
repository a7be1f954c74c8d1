//! MySQL implementations of the store traits.
//!
//! Queries are runtime-checked (`sqlx::query` / `query_scalar`) and rows are
//! mapped by hand because status columns are plain VARCHARs parsed through strum.

use std::str::FromStr;

use sqlx::{MySqlPool, Row, mysql::MySqlRow};

mod deduction;
mod employee;
mod employment;
mod message;
mod payslip;

pub use deduction::MySqlDeductionStore;
pub use employee::MySqlEmployeeStore;
pub use employment::MySqlEmploymentStore;
pub use message::MySqlMessageStore;
pub use payslip::MySqlPayslipStore;

/// Reads a VARCHAR column and parses it into an enum.
fn parse_column<T>(row: &MySqlRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: T::Err| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

/// Bundles the five stores over one pool.
pub struct MySqlStores {
    pub employees: MySqlEmployeeStore,
    pub employments: MySqlEmploymentStore,
    pub deductions: MySqlDeductionStore,
    pub payslips: MySqlPayslipStore,
    pub messages: MySqlMessageStore,
}

impl MySqlStores {
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            employees: MySqlEmployeeStore::new(pool.clone()),
            employments: MySqlEmploymentStore::new(pool.clone()),
            deductions: MySqlDeductionStore::new(pool.clone()),
            payslips: MySqlPayslipStore::new(pool.clone()),
            messages: MySqlMessageStore::new(pool),
        }
    }
}
