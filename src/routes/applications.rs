use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::AuthenticatedAdmin;
use crate::error::{AppError, AppResult};
use crate::mailer::{application_decision_email, onboarding_link_email};
use crate::models::DriverApplication;
use crate::onboarding::store;
use crate::onboarding::{tokens, ApplicationStatus, DocumentStatus};
use crate::routes::onboarding::{document_response, profile_response, DocumentResponse, ProfileResponse};
use crate::schema::driver_applications::dsl as applications_dsl;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub licence_number: String,
    pub status: String,
    pub assigned_to: Option<Uuid>,
    pub decision_note: Option<String>,
    pub archived_at: Option<chrono::NaiveDateTime>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

impl From<DriverApplication> for ApplicationResponse {
    fn from(application: DriverApplication) -> Self {
        Self {
            id: application.id,
            first_name: application.first_name,
            last_name: application.last_name,
            email: application.email,
            phone: application.phone,
            licence_number: application.licence_number,
            status: application.status,
            assigned_to: application.assigned_to,
            decision_note: application.decision_note,
            archived_at: application.archived_at,
            created_at: application.created_at,
            updated_at: application.updated_at,
        }
    }
}

#[derive(Deserialize)]
pub struct ApplicationListQuery {
    pub status: Option<String>,
    #[serde(default)]
    pub include_archived: bool,
}

pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ApplicationListQuery>,
) -> AppResult<Json<Vec<ApplicationResponse>>> {
    let status = match query.status.as_deref() {
        Some(value) => Some(
            ApplicationStatus::parse(value)
                .ok_or_else(|| AppError::bad_request(format!("unknown status {value}")))?,
        ),
        None => None,
    };

    let mut conn = state.db()?;
    let mut statement = applications_dsl::driver_applications
        .order(applications_dsl::created_at.desc())
        .into_boxed();

    if let Some(status) = status {
        statement = statement.filter(applications_dsl::status.eq(status.as_str()));
    }
    if !query.include_archived {
        statement = statement.filter(applications_dsl::archived_at.is_null());
    }

    let applications = statement.load::<DriverApplication>(&mut conn)?;
    Ok(Json(
        applications
            .into_iter()
            .map(ApplicationResponse::from)
            .collect(),
    ))
}

pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApplicationResponse>> {
    let mut conn = state.db()?;
    let application: DriverApplication =
        applications_dsl::driver_applications.find(id).first(&mut conn)?;
    Ok(Json(ApplicationResponse::from(application)))
}

pub async fn get_onboarding_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = {
        let mut conn = state.db()?;
        store::get_profile(&mut conn, id)?.ok_or_else(AppError::not_found)?
    };
    Ok(Json(profile_response(&state, profile, true).await?))
}

#[derive(Serialize)]
pub struct SendLinkResponse {
    pub sent: bool,
    pub expires_at: chrono::NaiveDateTime,
}

/// Issues a fresh onboarding token and emails the link. This is the one
/// mutating action that hard-fails on a mail provider failure: a silently
/// undelivered link would leave the driver stuck with no recourse. The
/// token stays persisted either way; a retry mints a new one and revokes it.
pub async fn send_onboarding_link(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SendLinkResponse>> {
    let (application, issued) = {
        let mut conn = state.db()?;
        let application: DriverApplication =
            applications_dsl::driver_applications.find(id).first(&mut conn)?;
        if application.archived_at.is_some() {
            return Err(AppError::bad_request("application is archived"));
        }
        let issued =
            tokens::issue_token(&mut conn, id, state.config.onboarding_token_expiry_days)?;
        (application, issued)
    };

    let link = state.config.onboarding_link(&issued.raw);
    let (subject, html) = onboarding_link_email(&application.first_name, &link);

    if !state.mailer.send_email(&application.email, &subject, &html).await {
        warn!(
            application_id = %id,
            email = %application.email,
            "onboarding link email failed; link was not delivered"
        );
        return Err(AppError::bad_gateway(
            "the onboarding email could not be sent; please retry",
        ));
    }

    {
        let mut conn = state.db()?;
        tokens::record_send(&mut conn, issued.token.id)?;

        // Resends after the driver has already submitted (or a decision was
        // made) must not regress the status.
        let current = ApplicationStatus::parse(&application.status);
        if matches!(
            current,
            Some(ApplicationStatus::Pending)
                | Some(ApplicationStatus::Reviewing)
                | Some(ApplicationStatus::LinkSent)
        ) {
            store::set_application_status(&mut conn, id, ApplicationStatus::LinkSent)?;
        }
    }

    info!(
        application_id = %id,
        sent_by = %admin.username,
        expires_at = %issued.token.expires_at,
        "onboarding link sent"
    );

    Ok(Json(SendLinkResponse {
        sent: true,
        expires_at: issued.token.expires_at,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
}

#[derive(Deserialize)]
pub struct ReviewRequest {
    pub action: ReviewAction,
    pub reason: Option<String>,
}

pub async fn review_document(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Path(doc_id): Path<Uuid>,
    Json(payload): Json<ReviewRequest>,
) -> AppResult<Json<DocumentResponse>> {
    let status = match payload.action {
        ReviewAction::Approve => DocumentStatus::Approved,
        ReviewAction::Reject => DocumentStatus::Rejected,
    };

    let document = {
        let mut conn = state.db()?;
        store::set_document_review(&mut conn, doc_id, status, admin.user_id, payload.reason)?
    };

    info!(
        document_id = %doc_id,
        application_id = %document.application_id,
        status = %document.status,
        reviewed_by = %admin.username,
        "document reviewed"
    );

    Ok(Json(document_response(&state, document, true).await?))
}

#[derive(Deserialize)]
pub struct UpdateApplicationRequest {
    pub status: Option<String>,
    pub assigned_to: Option<Uuid>,
    #[serde(default)]
    pub clear_assignee: bool,
    pub decision_note: Option<String>,
}

/// Manual admin mutations: the `reviewing` intermediate, assignment, and
/// the explicit approve/reject decision. The decision is the admin's own
/// call; the completion badge is advisory input, never an automatic
/// trigger. Decision emails are best-effort, unlike the send-link path.
pub async fn update_application(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateApplicationRequest>,
) -> AppResult<Json<ApplicationResponse>> {
    let status = match payload.status.as_deref() {
        Some(value) => Some(
            ApplicationStatus::parse(value)
                .ok_or_else(|| AppError::bad_request(format!("unknown status {value}")))?,
        ),
        None => None,
    };

    let mut conn = state.db()?;

    // Read-merge-write under a row lock so two concurrent edits cannot
    // interleave into a lost update.
    let updated: DriverApplication = conn.transaction(|conn| {
        let application: DriverApplication = applications_dsl::driver_applications
            .find(id)
            .for_update()
            .first(conn)?;

        let new_status = status
            .map(|status| status.as_str().to_string())
            .unwrap_or_else(|| application.status.clone());
        let new_assignee = if payload.clear_assignee {
            None
        } else {
            payload.assigned_to.or(application.assigned_to)
        };
        let new_note = payload.decision_note.clone().or(application.decision_note);

        let now = Utc::now().naive_utc();
        diesel::update(applications_dsl::driver_applications.find(id))
            .set((
                applications_dsl::status.eq(new_status),
                applications_dsl::assigned_to.eq(new_assignee),
                applications_dsl::decision_note.eq(new_note),
                applications_dsl::updated_at.eq(now),
            ))
            .get_result(conn)
    })?;

    info!(
        application_id = %id,
        status = %updated.status,
        updated_by = %admin.username,
        "application updated"
    );

    if let Some(decision @ (ApplicationStatus::Approved | ApplicationStatus::Rejected)) = status {
        let mailer = state.mailer.clone();
        let to = updated.email.clone();
        let first_name = updated.first_name.clone();
        let approved = decision == ApplicationStatus::Approved;
        tokio::spawn(async move {
            let (subject, html) = application_decision_email(&first_name, approved);
            if !mailer.send_email(&to, &subject, &html).await {
                error!(email = %to, "decision notification failed");
            }
        });
    }

    Ok(Json(ApplicationResponse::from(updated)))
}

pub async fn archive_application(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    let updated = diesel::update(
        applications_dsl::driver_applications
            .find(id)
            .filter(applications_dsl::archived_at.is_null()),
    )
    .set((
        applications_dsl::archived_at.eq(now),
        applications_dsl::updated_at.eq(now),
    ))
    .execute(&mut conn)?;

    if updated == 0 {
        // Either unknown or already archived; archiving twice is harmless.
        let exists: i64 = applications_dsl::driver_applications
            .find(id)
            .count()
            .get_result(&mut conn)?;
        if exists == 0 {
            return Err(AppError::not_found());
        }
    }

    info!(application_id = %id, archived_by = %admin.username, "application archived");
    Ok(StatusCode::NO_CONTENT)
}
