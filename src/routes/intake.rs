use axum::extract::{Json, State};
use axum::http::StatusCode;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::NewDriverApplication;
use crate::onboarding::ApplicationStatus;
use crate::schema::driver_applications;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct DriverApplicationRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub licence_number: String,
}

#[derive(Serialize)]
pub struct DriverApplicationResponse {
    pub id: Uuid,
    pub status: ApplicationStatus,
}

/// Public recruiting form. The wider marketing site posts here; everything
/// after this point is the admin pipeline.
pub async fn apply_driver(
    State(state): State<AppState>,
    Json(payload): Json<DriverApplicationRequest>,
) -> AppResult<(StatusCode, Json<DriverApplicationResponse>)> {
    let first_name = required(&payload.first_name, "first_name")?;
    let last_name = required(&payload.last_name, "last_name")?;
    let email = required(&payload.email, "email")?;
    if !email.contains('@') {
        return Err(AppError::bad_request("email must be a valid address"));
    }
    let phone = required(&payload.phone, "phone")?;
    let licence_number = required(&payload.licence_number, "licence_number")?;

    let application = NewDriverApplication {
        id: Uuid::new_v4(),
        first_name,
        last_name,
        email,
        phone,
        licence_number,
        status: ApplicationStatus::Pending.as_str().to_string(),
    };

    let mut conn = state.db()?;
    diesel::insert_into(driver_applications::table)
        .values(&application)
        .execute(&mut conn)?;

    info!(application_id = %application.id, "driver application received");

    Ok((
        StatusCode::CREATED,
        Json(DriverApplicationResponse {
            id: application.id,
            status: ApplicationStatus::Pending,
        }),
    ))
}

fn required(value: &str, name: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request(format!("{name} is required")));
    }
    Ok(trimmed.to_string())
}
