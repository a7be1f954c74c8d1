use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::api::{MessageBody, bounded_decimal, not_in_future, required_text};
use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::model::employment::{Employment, EmploymentDraft, EmploymentStatus};
use crate::state::AppState;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct EmploymentRequest {
    #[schema(example = "EMPL-001")]
    pub code: String,
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = "Finance")]
    pub department: String,
    #[schema(example = "Accountant")]
    pub position: String,
    #[schema(example = "850000.00", value_type = String)]
    pub base_salary: Decimal,
    pub status: EmploymentStatus,
    #[schema(example = "2024-02-01", format = "date", value_type = String)]
    pub joining_date: NaiveDate,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct EmploymentResponse {
    pub id: u64,
    pub code: String,
    pub employee_id: u64,
    pub employee_code: String,
    pub employee_first_name: String,
    pub employee_last_name: String,
    pub department: String,
    pub position: String,
    #[schema(value_type = String)]
    pub base_salary: Decimal,
    pub status: EmploymentStatus,
    #[schema(format = "date", value_type = String)]
    pub joining_date: NaiveDate,
}

impl From<Employment> for EmploymentResponse {
    fn from(e: Employment) -> Self {
        Self {
            id: e.id,
            code: e.code,
            employee_id: e.employee_id,
            employee_code: e.employee_code,
            employee_first_name: e.employee_first_name,
            employee_last_name: e.employee_last_name,
            department: e.department,
            position: e.position,
            base_salary: e.base_salary.normalize(),
            status: e.status,
            joining_date: e.joining_date,
        }
    }
}

/// Exclusive upper bound of the `DECIMAL(15, 2)` salary column.
const BASE_SALARY_LIMIT: Decimal = Decimal::from_parts(1_316_134_912, 2_328, 0, false, 0); // 10^13

impl EmploymentRequest {
    fn into_draft(self) -> AppResult<EmploymentDraft> {
        not_in_future("Joining date", self.joining_date)?;
        if self.base_salary >= BASE_SALARY_LIMIT {
            return Err(AppError::Validation(format!(
                "Base salary must be less than {BASE_SALARY_LIMIT}"
            )));
        }
        Ok(EmploymentDraft {
            code: required_text("Employment code", &self.code, 50)?,
            employee_id: self.employee_id,
            department: required_text("Department", &self.department, 100)?,
            position: required_text("Position", &self.position, 100)?,
            base_salary: bounded_decimal("Base salary", self.base_salary, 2)?,
            status: self.status,
            joining_date: self.joining_date,
        })
    }
}

/// Checks the referenced employee, the code and the one-active rule.
/// `current_id` is the employment being updated, if any.
async fn check_draft(
    state: &AppState,
    draft: &EmploymentDraft,
    current_id: Option<u64>,
) -> AppResult<()> {
    if state.employees.find_by_id(draft.employee_id).await?.is_none() {
        return Err(AppError::not_found(format!(
            "Employee id {}",
            draft.employee_id
        )));
    }

    if let Some(other) = state.employments.find_by_code(&draft.code).await? {
        if Some(other.id) != current_id {
            return Err(AppError::Conflict(format!(
                "Employment with code {} already exists",
                draft.code
            )));
        }
    }

    if draft.status == EmploymentStatus::Active {
        if let Some(active) = state.employments.find_active(draft.employee_id).await? {
            if Some(active.id) != current_id {
                return Err(AppError::Conflict(format!(
                    "Employee {} already has an active employment ({})",
                    draft.employee_id, active.code
                )));
            }
        }
    }
    Ok(())
}

async fn load(state: &AppState, id: u64) -> AppResult<Employment> {
    state
        .employments
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Employment id {id}")))
}

/// Create Employment
#[utoipa::path(
    post,
    path = "/api/employments",
    request_body = EmploymentRequest,
    responses(
        (status = 201, description = "Employment created", body = EmploymentResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Code in use or employee already has an active employment")
    ),
    tag = "Employment",
    security(("bearer_auth" = []))
)]
pub async fn create_employment(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<EmploymentRequest>,
) -> AppResult<HttpResponse> {
    auth.require_staff()?;

    let draft = payload.into_inner().into_draft()?;
    check_draft(&state, &draft, None).await?;

    let employment = state.employments.insert(draft).await?;
    info!(
        employment_id = employment.id,
        employee_id = employment.employee_id,
        "Employment created"
    );
    Ok(HttpResponse::Created().json(EmploymentResponse::from(employment)))
}

/// List Employments
#[utoipa::path(
    get,
    path = "/api/employments",
    responses(
        (status = 200, description = "All employments", body = [EmploymentResponse]),
        (status = 403, description = "Admin or manager role required")
    ),
    tag = "Employment",
    security(("bearer_auth" = []))
)]
pub async fn list_employments(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    auth.require_staff()?;

    let body: Vec<EmploymentResponse> = state
        .employments
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Get Employment by ID
#[utoipa::path(
    get,
    path = "/api/employments/{employment_id}",
    params(("employment_id", Path, description = "Employment ID")),
    responses(
        (status = 200, description = "Employment found", body = EmploymentResponse),
        (status = 403, description = "Not your record"),
        (status = 404, description = "Employment not found")
    ),
    tag = "Employment",
    security(("bearer_auth" = []))
)]
pub async fn get_employment(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let employment = load(&state, path.into_inner()).await?;
    auth.ensure_owner_or_staff(employment.employee_id)?;
    Ok(HttpResponse::Ok().json(EmploymentResponse::from(employment)))
}

/// Update Employment
#[utoipa::path(
    put,
    path = "/api/employments/{employment_id}",
    params(("employment_id", Path, description = "Employment ID")),
    request_body = EmploymentRequest,
    responses(
        (status = 200, description = "Employment updated", body = EmploymentResponse),
        (status = 404, description = "Employment or employee not found"),
        (status = 409, description = "Code in use or employee already has an active employment")
    ),
    tag = "Employment",
    security(("bearer_auth" = []))
)]
pub async fn update_employment(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: web::Json<EmploymentRequest>,
) -> AppResult<HttpResponse> {
    auth.require_staff()?;
    let employment_id = path.into_inner();

    load(&state, employment_id).await?;
    let draft = payload.into_inner().into_draft()?;
    check_draft(&state, &draft, Some(employment_id)).await?;

    let employment = state.employments.update(employment_id, draft).await?;
    info!(employment_id, "Employment updated");
    Ok(HttpResponse::Ok().json(EmploymentResponse::from(employment)))
}

/// Delete Employment
#[utoipa::path(
    delete,
    path = "/api/employments/{employment_id}",
    params(("employment_id", Path, description = "Employment ID")),
    responses(
        (status = 200, description = "Employment deleted", body = MessageBody),
        (status = 404, description = "Employment not found")
    ),
    tag = "Employment",
    security(("bearer_auth" = []))
)]
pub async fn delete_employment(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    auth.require_staff()?;
    let employment_id = path.into_inner();

    if !state.employments.delete(employment_id).await? {
        return Err(AppError::not_found(format!("Employment id {employment_id}")));
    }
    info!(employment_id, "Employment deleted");
    Ok(HttpResponse::Ok().json(MessageBody::new("Successfully deleted")))
}
