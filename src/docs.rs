use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

use crate::api::{
    MessageBody,
    deduction::{DeductionRequest, DeductionResponse},
    employee::{EmployeeRequest, EmployeeResponse},
    employment::{EmploymentRequest, EmploymentResponse},
    message::MessageResponse,
    payslip::{PayslipGenerationRequest, PayslipResponse},
};
use crate::model::{
    employee::EmployeeStatus, employment::EmploymentStatus, payslip::PayslipStatus, role::Role,
};
use crate::models::{JwtAuthResponse, LoginReqDto};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Employee Payroll API",
        version = "1.0.0",
        description = r#"
## Employee Payroll Service

Employee records, employment contracts, deduction rules, monthly payslip
generation and approval, and salary notifications.

### Payroll flow
1. A **manager** generates the PENDING payslips of a month.
2. Re-generating a month replaces its PENDING payslips.
3. An **admin** approves the month: every payslip becomes PAID and each
   employee gets a stored message and an email.

### Security
All endpoints except login and registration need a **JWT Bearer** token.
Employees without a manager or admin role only see their own records.

### Money
Amounts are decimal strings, e.g. `"112000.5"`.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::register,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::get_employee_by_code,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::employment::create_employment,
        crate::api::employment::list_employments,
        crate::api::employment::get_employment,
        crate::api::employment::update_employment,
        crate::api::employment::delete_employment,

        crate::api::deduction::create_deduction,
        crate::api::deduction::list_deductions,
        crate::api::deduction::get_deduction,
        crate::api::deduction::update_deduction,
        crate::api::deduction::delete_deduction,

        crate::api::payslip::generate_payroll,
        crate::api::payslip::approve_payroll,
        crate::api::payslip::get_payslip,
        crate::api::payslip::list_employee_payslips,
        crate::api::payslip::list_period_payslips,

        crate::api::message::get_message,
        crate::api::message::list_employee_messages
    ),
    components(
        schemas(
            LoginReqDto,
            JwtAuthResponse,
            MessageBody,
            Role,
            EmployeeStatus,
            EmploymentStatus,
            PayslipStatus,
            EmployeeRequest,
            EmployeeResponse,
            EmploymentRequest,
            EmploymentResponse,
            DeductionRequest,
            DeductionResponse,
            PayslipGenerationRequest,
            PayslipResponse,
            MessageResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and self-registration"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Employment", description = "Employment contract APIs"),
        (name = "Deduction", description = "Deduction and allowance rule APIs"),
        (name = "Payslip", description = "Payroll generation, approval and payslip APIs"),
        (name = "Message", description = "Salary notification messages"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Prefix the handler annotations are written against.
const DOCUMENTED_PREFIX: &str = "/api";

/// The document with every path moved under `api_prefix`, matching where
/// `routes::configure` mounts the handlers.
pub fn openapi_for_prefix(api_prefix: &str) -> openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    let prefix = api_prefix.trim_end_matches('/');
    let paths = std::mem::take(&mut doc.paths.paths);
    doc.paths.paths = paths
        .into_iter()
        .map(|(path, item)| {
            let mounted = match path.strip_prefix(DOCUMENTED_PREFIX) {
                Some(rest) => format!("{prefix}{rest}"),
                None => path,
            };
            (mounted, item)
        })
        .collect();
    doc
}
