use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::model::message::Message;
use crate::state::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: u64,
    pub employee_id: u64,
    pub employee_code: String,
    pub employee_first_name: String,
    pub employee_last_name: String,
    pub content: String,
    pub month: u32,
    pub year: i32,
    #[schema(format = "date", value_type = String)]
    pub sent_date: NaiveDate,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            employee_id: m.employee_id,
            employee_code: m.employee_code,
            employee_first_name: m.employee_first_name,
            employee_last_name: m.employee_last_name,
            content: m.content,
            month: m.month,
            year: m.year,
            sent_date: m.sent_date,
        }
    }
}

/// Get Message by ID
#[utoipa::path(
    get,
    path = "/api/messages/{message_id}",
    params(("message_id", Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message found", body = MessageResponse),
        (status = 403, description = "Not your message"),
        (status = 404, description = "Message not found")
    ),
    tag = "Message",
    security(("bearer_auth" = []))
)]
pub async fn get_message(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let message_id = path.into_inner();

    let message = state
        .messages
        .find_by_id(message_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Message id {message_id}")))?;
    auth.ensure_owner_or_staff(message.employee_id)?;

    Ok(HttpResponse::Ok().json(MessageResponse::from(message)))
}

/// List Messages of an employee
#[utoipa::path(
    get,
    path = "/api/messages/employee/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Messages, newest first", body = [MessageResponse]),
        (status = 403, description = "Not your messages"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Message",
    security(("bearer_auth" = []))
)]
pub async fn list_employee_messages(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let employee_id = path.into_inner();
    auth.ensure_owner_or_staff(employee_id)?;

    if state.employees.find_by_id(employee_id).await?.is_none() {
        return Err(AppError::not_found(format!("Employee id {employee_id}")));
    }
    let body: Vec<MessageResponse> = state
        .messages
        .find_by_employee(employee_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(HttpResponse::Ok().json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::TestApp;
    use crate::model::message::MessageDraft;
    use crate::model::role::Role;
    use actix_web::{http::StatusCode, test};

    #[actix_web::test]
    async fn owner_and_staff_read_messages() {
        let app = TestApp::new();
        let worker = app.employee("E1", &[Role::Employee]).await;
        let outsider = app.employee("E2", &[Role::Employee]).await;
        let manager = app.employee("MGR", &[Role::Manager]).await;

        let message = app
            .state
            .messages
            .record(MessageDraft {
                employee_id: worker.id,
                employee_code: worker.code.clone(),
                employee_first_name: worker.first_name.clone(),
                employee_last_name: worker.last_name.clone(),
                content: "Dear FirstE1, your salary ...".into(),
                month: 6,
                year: 2025,
                sent_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            })
            .await
            .unwrap();

        let own = app
            .call(
                test::TestRequest::get()
                    .uri(&format!("/api/messages/employee/{}", worker.id))
                    .insert_header(app.bearer(&worker)),
            )
            .await;
        assert_eq!(own.status(), StatusCode::OK);
        let own: Vec<MessageResponse> = test::read_body_json(own).await;
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].employee_code, "E1");

        let foreign = app
            .call(
                test::TestRequest::get()
                    .uri(&format!("/api/messages/{}", message.id))
                    .insert_header(app.bearer(&outsider)),
            )
            .await;
        assert_eq!(foreign.status(), StatusCode::FORBIDDEN);

        let staff = app
            .call(
                test::TestRequest::get()
                    .uri(&format!("/api/messages/{}", message.id))
                    .insert_header(app.bearer(&manager)),
            )
            .await;
        assert_eq!(staff.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn unknown_message_is_not_found() {
        let app = TestApp::new();
        let manager = app.employee("MGR", &[Role::Manager]).await;
        let resp = app
            .call(
                test::TestRequest::get()
                    .uri("/api/messages/404")
                    .insert_header(app.bearer(&manager)),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
