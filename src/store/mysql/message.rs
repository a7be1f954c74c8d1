use async_trait::async_trait;
use sqlx::{MySqlPool, Row, mysql::MySqlRow};

use crate::error::AppResult;
use crate::model::message::{Message, MessageDraft};
use crate::store::MessageStore;

const SELECT_MESSAGE: &str = r#"
    SELECT m.id, m.employee_id, e.code AS employee_code, e.first_name, e.last_name,
           m.content, m.month, m.year, m.sent_date
    FROM messages m
    JOIN employees e ON e.id = m.employee_id
"#;

pub struct MySqlMessageStore {
    pool: MySqlPool,
}

impl MySqlMessageStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn message_from_row(row: &MySqlRow) -> Result<Message, sqlx::Error> {
    Ok(Message {
        id: row.try_get("id")?,
        employee_id: row.try_get("employee_id")?,
        employee_code: row.try_get("employee_code")?,
        employee_first_name: row.try_get("first_name")?,
        employee_last_name: row.try_get("last_name")?,
        content: row.try_get("content")?,
        month: row.try_get("month")?,
        year: row.try_get("year")?,
        sent_date: row.try_get("sent_date")?,
    })
}

#[async_trait]
impl MessageStore for MySqlMessageStore {
    async fn record(&self, draft: MessageDraft) -> AppResult<Message> {
        let result = sqlx::query(
            "INSERT INTO messages (employee_id, content, month, year, sent_date) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(draft.employee_id)
        .bind(&draft.content)
        .bind(draft.month)
        .bind(draft.year)
        .bind(draft.sent_date)
        .execute(&self.pool)
        .await?;

        Ok(draft.into_message(result.last_insert_id()))
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<Message>> {
        let row = sqlx::query(&format!("{SELECT_MESSAGE} WHERE m.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(message_from_row).transpose()?)
    }

    async fn find_by_employee(&self, employee_id: u64) -> AppResult<Vec<Message>> {
        let rows = sqlx::query(&format!(
            "{SELECT_MESSAGE} WHERE m.employee_id = ? ORDER BY m.sent_date DESC, m.id DESC"
        ))
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(message_from_row)
            .collect::<Result<_, _>>()?)
    }
}
