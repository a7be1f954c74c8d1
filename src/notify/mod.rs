//! Salary notifications sent after a payroll period is approved.
//!
//! Each paid payslip produces one stored [`Message`](crate::model::message::Message)
//! and one HTML email. Both steps are best-effort: failures are logged and never
//! roll back the approval.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::model::message::MessageDraft;
use crate::model::payslip::Payslip;
use crate::store::MessageStore;

pub mod mailer;

pub const DEFAULT_INSTITUTION: &str = "Government of Rwanda";

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("failed to build email: {0}")]
    Build(String),

    #[error("transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, html_body: &str)
    -> Result<(), DeliveryError>;
}

/// What happened to one payslip's notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub message_recorded: bool,
    pub email_sent: bool,
}

pub struct Notifier {
    messages: Arc<dyn MessageStore>,
    mailer: Arc<dyn Mailer>,
    institution: String,
}

impl Notifier {
    pub fn new(
        messages: Arc<dyn MessageStore>,
        mailer: Arc<dyn Mailer>,
        institution: impl Into<String>,
    ) -> Self {
        Self {
            messages,
            mailer,
            institution: institution.into(),
        }
    }

    /// Records the salary message and emails the employee.
    pub async fn payslip_paid(&self, payslip: &Payslip, sent_date: NaiveDate) -> Delivery {
        let draft = MessageDraft {
            employee_id: payslip.employee_id,
            employee_code: payslip.employee_code.clone(),
            employee_first_name: payslip.employee_first_name.clone(),
            employee_last_name: payslip.employee_last_name.clone(),
            content: salary_message(payslip, &self.institution),
            month: payslip.month,
            year: payslip.year,
            sent_date,
        };

        let message_recorded = match self.messages.record(draft).await {
            Ok(message) => {
                debug!(payslip_id = payslip.id, message_id = message.id, "Salary message recorded");
                true
            }
            Err(e) => {
                error!(error = %e, payslip_id = payslip.id, "Failed to record salary message");
                false
            }
        };

        let (subject, body) = salary_email(payslip);
        let email_sent = match self
            .mailer
            .send_email(&payslip.employee_email, &subject, &body)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    error = %e,
                    payslip_id = payslip.id,
                    to = %payslip.employee_email,
                    "Failed to send salary email"
                );
                false
            }
        };

        Delivery {
            message_recorded,
            email_sent,
        }
    }
}

pub fn salary_message(payslip: &Payslip, institution: &str) -> String {
    format!(
        "Dear {}, your salary for {}/{} from {} amounting to {:.2} RWF has been credited to your account {} successfully.",
        payslip.employee_first_name,
        payslip.month,
        payslip.year,
        institution,
        payslip.net_salary(),
        payslip.employee_code,
    )
}

/// Subject and HTML body of the payment email.
pub fn salary_email(payslip: &Payslip) -> (String, String) {
    let subject = format!(
        "Salary Payment Notification - {}/{}",
        payslip.month, payslip.year
    );
    let approved = payslip
        .approval_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let body = format!(
        "<html><body>\
         <p>Dear {} {},</p>\
         <p>Your salary for {}/{} has been processed and credited to your account.</p>\
         <ul>\
         <li>Gross salary: {:.2} RWF</li>\
         <li>Net salary: {:.2} RWF</li>\
         <li>Approval date: {}</li>\
         </ul>\
         <p>Best regards,<br/>HR Department</p>\
         </body></html>",
        escape_html(&payslip.employee_first_name),
        escape_html(&payslip.employee_last_name),
        payslip.month,
        payslip.year,
        payslip.gross_salary(),
        payslip.net_salary(),
        approved,
    );
    (subject, body)
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
