use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::NaiveDate;
use diesel::Connection;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{DriverApplication, DriverDocument, DriverVehicle};
use crate::onboarding::store::{self, OnboardingProfile, VehicleInput};
use crate::onboarding::tokens;
use crate::onboarding::{
    completion_state, ApplicationStatus, CompletionState, DocumentType, REQUIRED_DOCUMENT_TYPES,
};
use crate::state::AppState;
use crate::storage::document_key;

const ACCEPTED_CONTENT_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/webp", "application/pdf"];

#[derive(Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

#[derive(Serialize)]
pub struct DriverSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub licence_number: String,
    pub status: String,
}

impl From<&DriverApplication> for DriverSummary {
    fn from(application: &DriverApplication) -> Self {
        Self {
            id: application.id,
            first_name: application.first_name.clone(),
            last_name: application.last_name.clone(),
            email: application.email.clone(),
            phone: application.phone.clone(),
            licence_number: application.licence_number.clone(),
            status: application.status.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct VehicleResponse {
    pub registration: String,
    pub make: String,
    pub model: String,
    pub colour: String,
    pub year: Option<i32>,
    pub plate_number: Option<String>,
    pub capacity: Option<i32>,
}

impl From<DriverVehicle> for VehicleResponse {
    fn from(vehicle: DriverVehicle) -> Self {
        Self {
            registration: vehicle.registration,
            make: vehicle.make,
            model: vehicle.model,
            colour: vehicle.colour,
            year: vehicle.year,
            plate_number: vehicle.plate_number,
            capacity: vehicle.capacity,
        }
    }
}

#[derive(Serialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub doc_type: String,
    pub status: String,
    /// Freshly derived access URL; treat as ephemeral.
    pub url: String,
    pub expiry_date: Option<NaiveDate>,
    pub rejection_reason: Option<String>,
    pub uploaded_at: chrono::NaiveDateTime,
    pub reviewed_at: Option<chrono::NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<Uuid>,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub driver: DriverSummary,
    pub vehicle: Option<VehicleResponse>,
    pub documents: Vec<DocumentResponse>,
    pub required_documents: Vec<DocumentType>,
    pub completion: CompletionState,
}

pub(crate) async fn document_response(
    state: &AppState,
    document: DriverDocument,
    include_reviewer: bool,
) -> AppResult<DocumentResponse> {
    let url = state
        .storage
        .read_url(&document.storage_key)
        .await
        .map_err(|err| {
            error!(error = %err, key = %document.storage_key, "failed to derive document URL");
            AppError::internal(err)
        })?;

    Ok(DocumentResponse {
        id: document.id,
        doc_type: document.doc_type,
        status: document.status,
        url,
        expiry_date: document.expiry_date,
        rejection_reason: document.rejection_reason,
        uploaded_at: document.uploaded_at,
        reviewed_at: document.reviewed_at,
        reviewed_by: include_reviewer.then_some(document.reviewed_by).flatten(),
    })
}

pub(crate) async fn profile_response(
    state: &AppState,
    profile: OnboardingProfile,
    include_reviewer: bool,
) -> AppResult<ProfileResponse> {
    let completion = completion_state(&profile.documents);

    let mut documents = Vec::with_capacity(profile.documents.len());
    for document in profile.documents {
        documents.push(document_response(state, document, include_reviewer).await?);
    }

    Ok(ProfileResponse {
        driver: DriverSummary::from(&profile.application),
        vehicle: profile.vehicle.map(VehicleResponse::from),
        documents,
        required_documents: REQUIRED_DOCUMENT_TYPES.to_vec(),
        completion,
    })
}

fn resolve(state: &AppState, raw: &str) -> AppResult<Uuid> {
    let mut conn = state.db()?;
    let token = tokens::resolve_token(&mut conn, raw)?;
    match token {
        Some(token) => Ok(token.application_id),
        None => {
            warn!("onboarding token failed to resolve");
            Err(AppError::invalid_onboarding_link())
        }
    }
}

fn load_profile(state: &AppState, application_id: Uuid) -> AppResult<OnboardingProfile> {
    let mut conn = state.db()?;
    // A token whose application vanished behaves like any other bad link.
    store::get_profile(&mut conn, application_id)?
        .ok_or_else(AppError::invalid_onboarding_link)
}

pub async fn get_profile(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> AppResult<Json<ProfileResponse>> {
    let application_id = resolve(&state, &query.token)?;
    let profile = load_profile(&state, application_id)?;
    Ok(Json(profile_response(&state, profile, false).await?))
}

pub async fn save_vehicle(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    Json(payload): Json<VehicleInput>,
) -> AppResult<Json<VehicleResponse>> {
    let application_id = resolve(&state, &query.token)?;

    let mut conn = state.db()?;
    let vehicle = store::upsert_vehicle(&mut conn, application_id, payload)?;
    info!(application_id = %application_id, registration = %vehicle.registration, "vehicle saved");

    Ok(Json(VehicleResponse::from(vehicle)))
}

#[derive(Deserialize)]
pub struct UploadDocumentRequest {
    pub doc_type: String,
    pub content_type: String,
    pub content_base64: String,
    pub expiry_date: Option<NaiveDate>,
}

pub async fn upload_document(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    Json(payload): Json<UploadDocumentRequest>,
) -> AppResult<(StatusCode, Json<DocumentResponse>)> {
    let application_id = resolve(&state, &query.token)?;

    let doc_type = DocumentType::parse(&payload.doc_type)
        .ok_or_else(|| AppError::bad_request(format!("unknown document type {}", payload.doc_type)))?;

    if !ACCEPTED_CONTENT_TYPES.contains(&payload.content_type.as_str()) {
        return Err(AppError::bad_request(
            "documents must be a JPEG, PNG, WebP image or a PDF",
        ));
    }

    // Cap checked on the encoded length so oversized payloads are refused
    // before any decode work.
    let max_encoded = state.config.max_document_bytes / 3 * 4 + 4;
    if payload.content_base64.len() > max_encoded {
        return Err(AppError::bad_request(format!(
            "document exceeds the {}MB limit",
            state.config.max_document_bytes / (1024 * 1024)
        )));
    }

    let bytes = BASE64
        .decode(payload.content_base64.as_bytes())
        .map_err(|_| AppError::bad_request("document content is not valid base64"))?;
    if bytes.is_empty() {
        return Err(AppError::bad_request("document content must not be empty"));
    }

    let key = document_key(application_id, doc_type.as_str(), &payload.content_type);
    let stored = state
        .storage
        .store(&key, bytes, &payload.content_type)
        .await
        .map_err(|err| {
            error!(error = %err, application_id = %application_id, doc_type = %doc_type.as_str(), "document upload failed");
            AppError::bad_gateway(format!("document storage failed: {err}"))
        })?;

    let mut conn = state.db()?;
    let document = store::upsert_document(
        &mut conn,
        application_id,
        doc_type,
        &stored.key,
        payload.expiry_date,
    )?;
    info!(
        application_id = %application_id,
        doc_type = %doc_type.as_str(),
        key = %stored.key,
        "document uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(document_response(&state, document, false).await?),
    ))
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub status: ApplicationStatus,
}

pub async fn submit(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> AppResult<Json<SubmitResponse>> {
    let mut conn = state.db()?;
    let token = tokens::resolve_for_submit(&mut conn, &query.token)?
        .ok_or_else(AppError::invalid_onboarding_link)?;

    let profile = store::get_profile(&mut conn, token.application_id)?
        .ok_or_else(AppError::invalid_onboarding_link)?;

    // Submit only moves an application that is still waiting on the driver.
    // A retry after a successful submit reports success and changes nothing;
    // once the admin side has taken over, a replayed token must not drag the
    // status back.
    match ApplicationStatus::parse(&profile.application.status) {
        Some(ApplicationStatus::DocsReceived) => {
            return Ok(Json(SubmitResponse {
                status: ApplicationStatus::DocsReceived,
            }));
        }
        Some(ApplicationStatus::Reviewing) => {
            return Err(AppError::conflict("the application is already under review"));
        }
        Some(ApplicationStatus::Approved | ApplicationStatus::Rejected) => {
            return Err(AppError::conflict("the application has already been decided"));
        }
        _ => {}
    }

    if profile.vehicle.is_none() {
        return Err(AppError::bad_request(
            "add your vehicle details before submitting",
        ));
    }

    let completion = completion_state(&profile.documents);
    if !completion.missing.is_empty() {
        return Err(AppError::bad_request(format!(
            "upload all required documents before submitting ({} missing)",
            completion.missing.len()
        )));
    }

    conn.transaction(|conn| {
        tokens::consume_token(conn, token.id)?;
        store::set_application_status(
            conn,
            token.application_id,
            ApplicationStatus::DocsReceived,
        )
    })?;

    info!(application_id = %token.application_id, "driver submitted onboarding for review");

    Ok(Json(SubmitResponse {
        status: ApplicationStatus::DocsReceived,
    }))
}
