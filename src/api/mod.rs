//! HTTP handlers. Each one takes the caller as an explicit [`AuthUser`]
//! and the shared [`AppState`](crate::state::AppState).
//!
//! [`AuthUser`]: crate::auth::auth::AuthUser

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidateEmail;

use crate::error::{AppError, AppResult};

pub mod deduction;
pub mod employee;
pub mod employment;
pub mod message;
pub mod payslip;

#[derive(Serialize, ToSchema)]
pub struct MessageBody {
    #[schema(example = "Successfully deleted")]
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Trims `value` and checks it is non-blank and at most `max` characters.
pub(crate) fn required_text(field: &str, value: &str, max: usize) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be blank")));
    }
    if trimmed.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} cannot exceed {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn valid_email(value: &str) -> AppResult<String> {
    let email = required_text("Email", value, 100)?;
    if !email.validate_email() {
        return Err(AppError::Validation("Email should be valid".into()));
    }
    Ok(email)
}

pub(crate) fn not_in_future(field: &str, date: NaiveDate) -> AppResult<()> {
    if date > today() {
        return Err(AppError::Validation(format!(
            "{field} cannot be in the future"
        )));
    }
    Ok(())
}

/// Rejects negative values and values with more than `max_scale` decimal places.
pub(crate) fn bounded_decimal(field: &str, value: Decimal, max_scale: u32) -> AppResult<Decimal> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::Validation(format!(
            "{field} must be non-negative"
        )));
    }
    let value = value.normalize();
    if value.scale() > max_scale {
        return Err(AppError::Validation(format!(
            "{field} cannot have more than {max_scale} decimal places"
        )));
    }
    Ok(value)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use actix_web::{App, dev::ServiceResponse, test, web};
    use chrono::NaiveDate;

    use crate::auth::{jwt::generate_access_token, password::hash_password};
    use crate::config::Config;
    use crate::model::employee::{Employee, EmployeeDraft, EmployeeStatus};
    use crate::model::role::Role;
    use crate::notify::mailer::RecordingMailer;
    use crate::routes;
    use crate::state::AppState;
    use crate::store::EmployeeStore;
    use crate::store::memory::MemoryStore;

    pub struct TestApp {
        pub store: Arc<MemoryStore>,
        pub mailer: Arc<RecordingMailer>,
        pub state: web::Data<AppState>,
        pub config: web::Data<Config>,
    }

    impl TestApp {
        pub fn new() -> Self {
            let store = Arc::new(MemoryStore::new());
            let mailer = Arc::new(RecordingMailer::new());
            let state = web::Data::new(AppState::in_memory(store.clone(), mailer.clone()));
            Self {
                store,
                mailer,
                state,
                config: web::Data::new(Config::for_tests()),
            }
        }

        pub async fn employee(&self, code: &str, roles: &[Role]) -> Employee {
            EmployeeStore::insert(
                self.store.as_ref(),
                EmployeeDraft {
                    code: code.to_string(),
                    first_name: format!("First{code}"),
                    last_name: format!("Last{code}"),
                    email: format!("{}@gov.rw", code.to_lowercase()),
                    password_hash: hash_password("password123").unwrap(),
                    mobile: None,
                    date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1),
                    status: EmployeeStatus::Active,
                    roles: roles.to_vec(),
                },
            )
            .await
            .unwrap()
        }

        pub fn bearer(&self, employee: &Employee) -> (&'static str, String) {
            let token =
                generate_access_token(employee, &self.config.jwt_secret, 3600).unwrap();
            ("Authorization", format!("Bearer {token}"))
        }

        pub async fn call(&self, req: test::TestRequest) -> ServiceResponse {
            let state = self.state.clone();
            let config = self.config.clone();
            let app = test::init_service(
                App::new()
                    .app_data(state)
                    .app_data(config.clone())
                    .configure(|cfg| routes::configure(cfg, config.get_ref().clone())),
            )
            .await;
            // The rate limiters key on the peer address.
            let req = req.peer_addr("127.0.0.1:40000".parse().unwrap());
            test::call_service(&app, req.to_request()).await
        }
    }
}
