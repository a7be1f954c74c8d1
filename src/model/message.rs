use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct Message {
    pub id: u64,
    pub employee_id: u64,
    pub employee_code: String,
    pub employee_first_name: String,
    pub employee_last_name: String,
    pub content: String,
    pub month: u32,
    pub year: i32,
    pub sent_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub employee_id: u64,
    pub employee_code: String,
    pub employee_first_name: String,
    pub employee_last_name: String,
    pub content: String,
    pub month: u32,
    pub year: i32,
    pub sent_date: NaiveDate,
}

impl MessageDraft {
    pub fn into_message(self, id: u64) -> Message {
        Message {
            id,
            employee_id: self.employee_id,
            employee_code: self.employee_code,
            employee_first_name: self.employee_first_name,
            employee_last_name: self.employee_last_name,
            content: self.content,
            month: self.month,
            year: self.year,
            sent_date: self.sent_date,
        }
    }
}
