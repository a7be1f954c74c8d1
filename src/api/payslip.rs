use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::today;
use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::model::payslip::{Payslip, PayslipStatus, Period};
use crate::model::role::Role;
use crate::state::AppState;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct PayslipGenerationRequest {
    #[schema(example = 6, minimum = 1, maximum = 12)]
    pub month: u32,
    #[schema(example = 2025, minimum = 2000)]
    pub year: i32,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PayslipResponse {
    pub id: u64,
    pub employee_id: u64,
    pub employee_code: String,
    pub employee_first_name: String,
    pub employee_last_name: String,
    #[schema(value_type = String)]
    pub base_salary: Decimal,
    #[schema(value_type = String)]
    pub housing_amount: Decimal,
    #[schema(value_type = String)]
    pub transport_amount: Decimal,
    #[schema(value_type = String)]
    pub employee_tax_amount: Decimal,
    #[schema(value_type = String)]
    pub pension_amount: Decimal,
    #[schema(value_type = String)]
    pub medical_insurance_amount: Decimal,
    #[schema(value_type = String)]
    pub other_taxed_amount: Decimal,
    #[schema(value_type = String)]
    pub gross_salary: Decimal,
    #[schema(value_type = String)]
    pub total_deductions: Decimal,
    #[schema(value_type = String)]
    pub net_salary: Decimal,
    pub month: u32,
    pub year: i32,
    pub status: PayslipStatus,
    #[schema(format = "date", value_type = String)]
    pub generation_date: NaiveDate,
    #[schema(format = "date", value_type = Option<String>)]
    pub approval_date: Option<NaiveDate>,
}

impl From<Payslip> for PayslipResponse {
    fn from(p: Payslip) -> Self {
        let b = p.breakdown;
        Self {
            id: p.id,
            employee_id: p.employee_id,
            employee_code: p.employee_code,
            employee_first_name: p.employee_first_name,
            employee_last_name: p.employee_last_name,
            base_salary: b.base_salary.normalize(),
            housing_amount: b.housing_amount.normalize(),
            transport_amount: b.transport_amount.normalize(),
            employee_tax_amount: b.employee_tax_amount.normalize(),
            pension_amount: b.pension_amount.normalize(),
            medical_insurance_amount: b.medical_insurance_amount.normalize(),
            other_taxed_amount: b.other_taxed_amount.normalize(),
            gross_salary: b.gross_salary.normalize(),
            total_deductions: b.total_deductions.normalize(),
            net_salary: b.net_salary.normalize(),
            month: p.month,
            year: p.year,
            status: p.status,
            generation_date: p.generation_date,
            approval_date: p.approval_date,
        }
    }
}

fn to_body(payslips: Vec<Payslip>) -> Vec<PayslipResponse> {
    payslips.into_iter().map(Into::into).collect()
}

/// Generate Payroll
///
/// Computes PENDING payslips for every active employee with an active employment.
/// Re-running for a period replaces its PENDING payslips.
#[utoipa::path(
    post,
    path = "/api/payslips/generate",
    request_body = PayslipGenerationRequest,
    responses(
        (status = 201, description = "Payslips generated", body = [PayslipResponse]),
        (status = 400, description = "Invalid month or year"),
        (status = 403, description = "Manager role required"),
        (status = 409, description = "Period already approved"),
        (status = 422, description = "Deductions exceed gross salary for an employee")
    ),
    tag = "Payslip",
    security(("bearer_auth" = []))
)]
pub async fn generate_payroll(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<PayslipGenerationRequest>,
) -> AppResult<HttpResponse> {
    auth.require_any(&[Role::Manager])?;
    let period = Period::new(payload.month, payload.year)?;

    let payslips = state.payroll.generate(period, today()).await?;
    Ok(HttpResponse::Created().json(to_body(payslips)))
}

/// Approve Payroll
///
/// Marks every payslip of the period PAID and notifies the employees.
#[utoipa::path(
    put,
    path = "/api/payslips/approve/{month}/{year}",
    params(
        ("month", Path, description = "Month, 1 to 12"),
        ("year", Path, description = "Year, 2000 or later")
    ),
    responses(
        (status = 200, description = "Payslips approved", body = [PayslipResponse]),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "No payslips for the period"),
        (status = 409, description = "Some payslips are not pending")
    ),
    tag = "Payslip",
    security(("bearer_auth" = []))
)]
pub async fn approve_payroll(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<(u32, i32)>,
) -> AppResult<HttpResponse> {
    auth.require_any(&[Role::Admin])?;
    let (month, year) = path.into_inner();
    let period = Period::new(month, year)?;

    let payslips = state.payroll.approve(period, today()).await?;
    Ok(HttpResponse::Ok().json(to_body(payslips)))
}

/// Get Payslip by ID
#[utoipa::path(
    get,
    path = "/api/payslips/{payslip_id}",
    params(("payslip_id", Path, description = "Payslip ID")),
    responses(
        (status = 200, description = "Payslip found", body = PayslipResponse),
        (status = 403, description = "Not your payslip"),
        (status = 404, description = "Payslip not found")
    ),
    tag = "Payslip",
    security(("bearer_auth" = []))
)]
pub async fn get_payslip(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let payslip_id = path.into_inner();

    let payslip = state
        .payslips
        .find_by_id(payslip_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Payslip id {payslip_id}")))?;
    auth.ensure_owner_or_staff(payslip.employee_id)?;

    Ok(HttpResponse::Ok().json(PayslipResponse::from(payslip)))
}

/// List Payslips of an employee
#[utoipa::path(
    get,
    path = "/api/payslips/employee/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Payslips, newest period first", body = [PayslipResponse]),
        (status = 403, description = "Not your payslips"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Payslip",
    security(("bearer_auth" = []))
)]
pub async fn list_employee_payslips(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let employee_id = path.into_inner();
    auth.ensure_owner_or_staff(employee_id)?;

    if state.employees.find_by_id(employee_id).await?.is_none() {
        return Err(AppError::not_found(format!("Employee id {employee_id}")));
    }
    let payslips = state.payslips.find_by_employee(employee_id).await?;
    Ok(HttpResponse::Ok().json(to_body(payslips)))
}

/// List Payslips of a period
#[utoipa::path(
    get,
    path = "/api/payslips/month/{month}/year/{year}",
    params(
        ("month", Path, description = "Month, 1 to 12"),
        ("year", Path, description = "Year, 2000 or later")
    ),
    responses(
        (status = 200, description = "Payslips of the period", body = [PayslipResponse]),
        (status = 400, description = "Invalid month or year"),
        (status = 403, description = "Admin or manager role required")
    ),
    tag = "Payslip",
    security(("bearer_auth" = []))
)]
pub async fn list_period_payslips(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<(u32, i32)>,
) -> AppResult<HttpResponse> {
    auth.require_staff()?;
    let (month, year) = path.into_inner();
    let period = Period::new(month, year)?;

    let payslips = state.payslips.find_by_period(period).await?;
    Ok(HttpResponse::Ok().json(to_body(payslips)))
}
