use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;

use crate::api::{MessageBody, not_in_future, required_text, valid_email};
use crate::auth::{auth::AuthUser, password::hash_password};
use crate::error::{AppError, AppResult};
use crate::model::{
    employee::{Employee, EmployeeDraft, EmployeeStatus},
    role::Role,
};
use crate::state::AppState;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct EmployeeRequest {
    #[schema(example = "EMP-001")]
    pub code: String,
    #[schema(example = "Jane")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "jane.doe@gov.rw", format = "email")]
    pub email: String,
    /// Required on create, optional on update.
    pub password: Option<String>,
    #[schema(example = "+250788000000")]
    pub mobile: Option<String>,
    #[schema(example = "1990-05-17", format = "date", value_type = Option<String>)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default = "default_status")]
    pub status: EmployeeStatus,
    #[serde(default)]
    pub roles: Vec<Role>,
}

fn default_status() -> EmployeeStatus {
    EmployeeStatus::Active
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct EmployeeResponse {
    pub id: u64,
    pub code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: Option<String>,
    #[schema(format = "date", value_type = Option<String>)]
    pub date_of_birth: Option<NaiveDate>,
    pub status: EmployeeStatus,
    pub roles: Vec<Role>,
}

impl From<Employee> for EmployeeResponse {
    fn from(e: Employee) -> Self {
        Self {
            id: e.id,
            code: e.code,
            first_name: e.first_name,
            last_name: e.last_name,
            email: e.email,
            mobile: e.mobile,
            date_of_birth: e.date_of_birth,
            status: e.status,
            roles: e.roles,
        }
    }
}

fn validate_password(password: &str) -> AppResult<()> {
    let len = password.chars().count();
    if !(6..=120).contains(&len) {
        return Err(AppError::Validation(
            "Password must be between 6 and 120 characters".into(),
        ));
    }
    Ok(())
}

impl EmployeeRequest {
    /// Validates every field and builds the draft. `existing_hash` is kept when
    /// no new password is supplied.
    fn into_draft(self, existing_hash: Option<String>) -> AppResult<EmployeeDraft> {
        let code = required_text("Employee code", &self.code, 50)?;
        let first_name = required_text("First name", &self.first_name, 100)?;
        let last_name = required_text("Last name", &self.last_name, 100)?;
        let email = valid_email(&self.email)?;

        let mobile = match self.mobile.as_deref().map(str::trim) {
            Some(m) if m.chars().count() > 20 => {
                return Err(AppError::Validation(
                    "Mobile number cannot exceed 20 characters".into(),
                ));
            }
            Some("") | None => None,
            Some(m) => Some(m.to_string()),
        };
        if let Some(dob) = self.date_of_birth {
            not_in_future("Date of birth", dob)?;
        }

        if self.roles.is_empty() {
            return Err(AppError::Validation(
                "At least one role must be assigned".into(),
            ));
        }
        let mut roles = self.roles;
        roles.sort_by_key(|r| *r as u8);
        roles.dedup();

        let password_hash = match (self.password, existing_hash) {
            (Some(password), _) => {
                validate_password(&password)?;
                hash_password(&password)?
            }
            (None, Some(hash)) => hash,
            (None, None) => {
                return Err(AppError::Validation(
                    "Password is required for new employees".into(),
                ));
            }
        };

        Ok(EmployeeDraft {
            code,
            first_name,
            last_name,
            email,
            password_hash,
            mobile,
            date_of_birth: self.date_of_birth,
            status: self.status,
            roles,
        })
    }
}

/// Shared by the create endpoint and self-registration.
pub(crate) async fn create_employee_record(
    state: &AppState,
    request: EmployeeRequest,
) -> AppResult<Employee> {
    let draft = request.into_draft(None)?;

    if state.employees.find_by_code(&draft.code).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Employee with code {} already exists",
            draft.code
        )));
    }
    if state.employees.find_by_email(&draft.email).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Employee with email {} already exists",
            draft.email
        )));
    }

    let employee = state.employees.insert(draft).await?;
    info!(employee_id = employee.id, code = %employee.code, "Employee created");
    Ok(employee)
}

async fn load(state: &AppState, id: u64) -> AppResult<Employee> {
    state
        .employees
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Employee id {id}")))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = EmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = EmployeeResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Manager role required"),
        (status = 409, description = "Code or email already in use")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn create_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<EmployeeRequest>,
) -> AppResult<HttpResponse> {
    auth.require_any(&[Role::Manager])?;

    let employee = create_employee_record(&state, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(EmployeeResponse::from(employee)))
}

/// List Employees
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "All employees", body = [EmployeeResponse]),
        (status = 403, description = "Admin or manager role required")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn list_employees(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    auth.require_staff()?;

    let employees = state.employees.list().await.inspect_err(|e| {
        error!(error = %e, "Failed to list employees");
    })?;
    let body: Vec<EmployeeResponse> = employees.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = EmployeeResponse),
        (status = 403, description = "Not your record"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn get_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let employee_id = path.into_inner();
    auth.ensure_owner_or_staff(employee_id)?;

    let employee = load(&state, employee_id).await?;
    Ok(HttpResponse::Ok().json(EmployeeResponse::from(employee)))
}

/// Get Employee by code
#[utoipa::path(
    get,
    path = "/api/employees/code/{code}",
    params(("code", Path, description = "Employee code")),
    responses(
        (status = 200, description = "Employee found", body = EmployeeResponse),
        (status = 403, description = "Not your record"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn get_employee_by_code(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let code = path.into_inner();

    let employee = state
        .employees
        .find_by_code(&code)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Employee with code {code}")))?;
    auth.ensure_owner_or_staff(employee.id)?;

    Ok(HttpResponse::Ok().json(EmployeeResponse::from(employee)))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    request_body = EmployeeRequest,
    responses(
        (status = 200, description = "Employee updated", body = EmployeeResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Code or email already in use")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn update_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: web::Json<EmployeeRequest>,
) -> AppResult<HttpResponse> {
    auth.require_staff()?;
    let employee_id = path.into_inner();

    let current = load(&state, employee_id).await?;
    let draft = payload.into_inner().into_draft(Some(current.password_hash))?;

    if let Some(other) = state.employees.find_by_code(&draft.code).await? {
        if other.id != employee_id {
            return Err(AppError::Conflict(format!(
                "Employee with code {} already exists",
                draft.code
            )));
        }
    }
    if let Some(other) = state.employees.find_by_email(&draft.email).await? {
        if other.id != employee_id {
            return Err(AppError::Conflict(format!(
                "Employee with email {} already exists",
                draft.email
            )));
        }
    }

    let employee = state.employees.update(employee_id, draft).await?;
    info!(employee_id, "Employee updated");
    Ok(HttpResponse::Ok().json(EmployeeResponse::from(employee)))
}

/// Disable Employee
///
/// Employees are never removed; their status becomes DISABLED.
#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee disabled", body = MessageBody),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn delete_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    auth.require_staff()?;
    let employee_id = path.into_inner();

    if !state.employees.disable(employee_id).await? {
        return Err(AppError::not_found(format!("Employee id {employee_id}")));
    }
    info!(employee_id, "Employee disabled");
    Ok(HttpResponse::Ok().json(MessageBody::new("Successfully deleted")))
}
