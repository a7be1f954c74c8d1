use actix_web::{HttpResponse, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::api::{MessageBody, bounded_decimal, required_text};
use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::model::deduction::{Deduction, DeductionDraft, rate_from_percentage};
use crate::model::role::Role;
use crate::state::AppState;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct DeductionRequest {
    #[schema(example = "PEN")]
    pub code: String,
    #[schema(example = "Pension")]
    pub name: String,
    /// 0 to 100, e.g. 6 for 6%.
    #[schema(example = "6", value_type = String)]
    pub percentage: Decimal,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct DeductionResponse {
    pub id: u64,
    pub code: String,
    pub name: String,
    #[schema(value_type = String)]
    pub percentage: Decimal,
}

impl From<Deduction> for DeductionResponse {
    fn from(d: Deduction) -> Self {
        Self {
            percentage: d.percentage(),
            id: d.id,
            code: d.code,
            name: d.name,
        }
    }
}

impl DeductionRequest {
    fn into_draft(self) -> AppResult<DeductionDraft> {
        let percentage = bounded_decimal("Percentage", self.percentage, 4)?;
        if percentage > Decimal::ONE_HUNDRED {
            return Err(AppError::Validation("Percentage cannot exceed 100".into()));
        }
        Ok(DeductionDraft {
            code: required_text("Deduction code", &self.code, 50)?,
            name: required_text("Deduction name", &self.name, 100)?,
            rate: rate_from_percentage(percentage),
        })
    }
}

async fn check_unique(
    state: &AppState,
    draft: &DeductionDraft,
    current_id: Option<u64>,
) -> AppResult<()> {
    if let Some(other) = state.deductions.find_by_code(&draft.code).await? {
        if Some(other.id) != current_id {
            return Err(AppError::Conflict(format!(
                "Deduction with code {} already exists",
                draft.code
            )));
        }
    }
    if let Some(other) = state.deductions.find_by_name(&draft.name).await? {
        if Some(other.id) != current_id {
            return Err(AppError::Conflict(format!(
                "Deduction with name {} already exists",
                draft.name
            )));
        }
    }
    Ok(())
}

/// Create Deduction
#[utoipa::path(
    post,
    path = "/api/deductions",
    request_body = DeductionRequest,
    responses(
        (status = 201, description = "Deduction created", body = DeductionResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Code or name already in use")
    ),
    tag = "Deduction",
    security(("bearer_auth" = []))
)]
pub async fn create_deduction(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<DeductionRequest>,
) -> AppResult<HttpResponse> {
    auth.require_any(&[Role::Manager])?;

    let draft = payload.into_inner().into_draft()?;
    check_unique(&state, &draft, None).await?;

    let deduction = state.deductions.insert(draft).await?;
    info!(deduction_id = deduction.id, name = %deduction.name, "Deduction created");
    Ok(HttpResponse::Created().json(DeductionResponse::from(deduction)))
}

/// List Deductions
#[utoipa::path(
    get,
    path = "/api/deductions",
    responses(
        (status = 200, description = "All deduction rules", body = [DeductionResponse])
    ),
    tag = "Deduction",
    security(("bearer_auth" = []))
)]
pub async fn list_deductions(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    auth.require_staff()?;

    let body: Vec<DeductionResponse> = state
        .deductions
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Get Deduction by ID
#[utoipa::path(
    get,
    path = "/api/deductions/{deduction_id}",
    params(("deduction_id", Path, description = "Deduction ID")),
    responses(
        (status = 200, description = "Deduction found", body = DeductionResponse),
        (status = 404, description = "Deduction not found")
    ),
    tag = "Deduction",
    security(("bearer_auth" = []))
)]
pub async fn get_deduction(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    auth.require_staff()?;
    let deduction_id = path.into_inner();

    let deduction = state
        .deductions
        .find_by_id(deduction_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Deduction id {deduction_id}")))?;
    Ok(HttpResponse::Ok().json(DeductionResponse::from(deduction)))
}

/// Update Deduction by code
#[utoipa::path(
    put,
    path = "/api/deductions/{code}",
    params(("code", Path, description = "Deduction code")),
    request_body = DeductionRequest,
    responses(
        (status = 200, description = "Deduction updated", body = DeductionResponse),
        (status = 404, description = "Deduction not found"),
        (status = 409, description = "Code or name already in use")
    ),
    tag = "Deduction",
    security(("bearer_auth" = []))
)]
pub async fn update_deduction(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<DeductionRequest>,
) -> AppResult<HttpResponse> {
    auth.require_any(&[Role::Manager])?;
    let code = path.into_inner();

    let current = state
        .deductions
        .find_by_code(&code)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Deduction with code {code}")))?;
    let draft = payload.into_inner().into_draft()?;
    check_unique(&state, &draft, Some(current.id)).await?;

    let deduction = state.deductions.update(current.id, draft).await?;
    info!(deduction_id = deduction.id, "Deduction updated");
    Ok(HttpResponse::Ok().json(DeductionResponse::from(deduction)))
}

/// Delete Deduction
#[utoipa::path(
    delete,
    path = "/api/deductions/{deduction_id}",
    params(("deduction_id", Path, description = "Deduction ID")),
    responses(
        (status = 200, description = "Deduction deleted", body = MessageBody),
        (status = 404, description = "Deduction not found")
    ),
    tag = "Deduction",
    security(("bearer_auth" = []))
)]
pub async fn delete_deduction(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    auth.require_any(&[Role::Manager])?;
    let deduction_id = path.into_inner();

    if !state.deductions.delete(deduction_id).await? {
        return Err(AppError::not_found(format!("Deduction id {deduction_id}")));
    }
    info!(deduction_id, "Deduction deleted");
    Ok(HttpResponse::Ok().json(MessageBody::new("Successfully deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::TestApp;
    use actix_web::{http::StatusCode, test};
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[actix_web::test]
    async fn percentage_is_stored_as_fraction() {
        let app = TestApp::new();
        let manager = app.employee("MGR", &[Role::Manager]).await;

        let resp = app
            .call(
                test::TestRequest::post()
                    .uri("/api/deductions")
                    .insert_header(app.bearer(&manager))
                    .set_json(json!({ "code": "PEN", "name": "Pension", "percentage": 5 })),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: DeductionResponse = test::read_body_json(resp).await;
        assert_eq!(body.percentage, dec!(5));

        let stored = app.state.deductions.find_by_code("PEN").await.unwrap().unwrap();
        assert_eq!(stored.rate, dec!(0.05));
    }

    #[actix_web::test]
    async fn update_by_code_and_reject_out_of_range() {
        let app = TestApp::new();
        let manager = app.employee("MGR", &[Role::Manager]).await;
        app.call(
            test::TestRequest::post()
                .uri("/api/deductions")
                .insert_header(app.bearer(&manager))
                .set_json(json!({ "code": "TAX", "name": "Employee Tax", "percentage": "30" })),
        )
        .await;

        let resp = app
            .call(
                test::TestRequest::put()
                    .uri("/api/deductions/TAX")
                    .insert_header(app.bearer(&manager))
                    .set_json(json!({ "code": "TAX", "name": "Employee Tax", "percentage": "12.5" })),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: DeductionResponse = test::read_body_json(resp).await;
        assert_eq!(body.percentage, dec!(12.5));

        let resp = app
            .call(
                test::TestRequest::put()
                    .uri("/api/deductions/TAX")
                    .insert_header(app.bearer(&manager))
                    .set_json(json!({ "code": "TAX", "name": "Employee Tax", "percentage": "100.5" })),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn duplicate_name_is_conflict() {
        let app = TestApp::new();
        let manager = app.employee("MGR", &[Role::Manager]).await;
        let create = |code: &str| {
            test::TestRequest::post()
                .uri("/api/deductions")
                .insert_header(app.bearer(&manager))
                .set_json(json!({ "code": code, "name": "Housing", "percentage": 14 }))
        };

        assert_eq!(app.call(create("HOU")).await.status(), StatusCode::CREATED);
        assert_eq!(app.call(create("HOU2")).await.status(), StatusCode::CONFLICT);
    }
}
