use chrono::{NaiveDate, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    DriverApplication, DriverDocument, DriverVehicle, NewDriverDocument, NewDriverVehicle,
};
use crate::onboarding::registration::{format_uk_reg, is_uk_reg};
use crate::onboarding::{ApplicationStatus, DocumentStatus, DocumentType};
use crate::schema::{driver_applications, driver_documents, driver_vehicles};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("record not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(message) => AppError::bad_request(message),
            StoreError::NotFound => AppError::not_found(),
            StoreError::Database(err) => AppError::from(err),
        }
    }
}

/// Aggregate read for both the driver-facing form and the admin review
/// screen. A missing vehicle or empty document list is normal while
/// onboarding is in progress, never an error.
pub struct OnboardingProfile {
    pub application: DriverApplication,
    pub vehicle: Option<DriverVehicle>,
    pub documents: Vec<DriverDocument>,
}

pub fn get_profile(
    conn: &mut PgConnection,
    application_id: Uuid,
) -> QueryResult<Option<OnboardingProfile>> {
    let application = match driver_applications::table
        .find(application_id)
        .first::<DriverApplication>(conn)
        .optional()?
    {
        Some(application) => application,
        None => return Ok(None),
    };

    let vehicle = driver_vehicles::table
        .find(application_id)
        .first::<DriverVehicle>(conn)
        .optional()?;

    let documents = driver_documents::table
        .filter(driver_documents::application_id.eq(application_id))
        .order(driver_documents::doc_type.asc())
        .load::<DriverDocument>(conn)?;

    Ok(Some(OnboardingProfile {
        application,
        vehicle,
        documents,
    }))
}

#[derive(Debug, Deserialize)]
pub struct VehicleInput {
    pub registration: String,
    pub make: String,
    pub model: String,
    pub colour: String,
    pub year: Option<i32>,
    pub plate_number: Option<String>,
    pub capacity: Option<i32>,
}

pub fn upsert_vehicle(
    conn: &mut PgConnection,
    application_id: Uuid,
    input: VehicleInput,
) -> Result<DriverVehicle, StoreError> {
    let registration = format_uk_reg(&input.registration);
    if registration.is_empty() {
        return Err(StoreError::Validation("registration is required".into()));
    }
    if !is_uk_reg(&registration) {
        return Err(StoreError::Validation(format!(
            "{registration} is not a valid UK registration"
        )));
    }

    let make = require_field(&input.make, "make")?;
    let model = require_field(&input.model, "model")?;
    let colour = require_field(&input.colour, "colour")?;

    let record = NewDriverVehicle {
        application_id,
        registration,
        make,
        model,
        colour,
        year: input.year,
        plate_number: input.plate_number.filter(|value| !value.trim().is_empty()),
        capacity: input.capacity,
    };

    let now = Utc::now().naive_utc();
    let vehicle = diesel::insert_into(driver_vehicles::table)
        .values(&record)
        .on_conflict(driver_vehicles::application_id)
        .do_update()
        .set((
            driver_vehicles::registration.eq(&record.registration),
            driver_vehicles::make.eq(&record.make),
            driver_vehicles::model.eq(&record.model),
            driver_vehicles::colour.eq(&record.colour),
            driver_vehicles::year.eq(record.year),
            driver_vehicles::plate_number.eq(&record.plate_number),
            driver_vehicles::capacity.eq(record.capacity),
            driver_vehicles::updated_at.eq(now),
        ))
        .get_result(conn)?;

    Ok(vehicle)
}

fn require_field(value: &str, name: &str) -> Result<String, StoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation(format!("{name} is required")));
    }
    Ok(trimmed.to_string())
}

/// Upsert into the `(application, doc_type)` slot. A fresh file supersedes
/// any prior review: status returns to pending, the rejection reason and
/// reviewer stamps are cleared.
pub fn upsert_document(
    conn: &mut PgConnection,
    application_id: Uuid,
    doc_type: DocumentType,
    storage_key: &str,
    expiry_date: Option<NaiveDate>,
) -> Result<DriverDocument, StoreError> {
    if storage_key.trim().is_empty() {
        return Err(StoreError::Validation("storage key is required".into()));
    }

    let record = NewDriverDocument {
        id: Uuid::new_v4(),
        application_id,
        doc_type: doc_type.as_str().to_string(),
        storage_key: storage_key.to_string(),
        status: DocumentStatus::Pending.as_str().to_string(),
        expiry_date,
    };

    let now = Utc::now().naive_utc();
    let document = diesel::insert_into(driver_documents::table)
        .values(&record)
        .on_conflict((
            driver_documents::application_id,
            driver_documents::doc_type,
        ))
        .do_update()
        .set((
            driver_documents::storage_key.eq(&record.storage_key),
            driver_documents::status.eq(DocumentStatus::Pending.as_str()),
            driver_documents::expiry_date.eq(record.expiry_date),
            driver_documents::rejection_reason.eq::<Option<String>>(None),
            driver_documents::uploaded_at.eq(now),
            driver_documents::reviewed_at.eq::<Option<chrono::NaiveDateTime>>(None),
            driver_documents::reviewed_by.eq::<Option<Uuid>>(None),
        ))
        .get_result(conn)?;

    Ok(document)
}

/// The only place `reviewed_at`/`reviewed_by` are ever written.
pub fn set_document_review(
    conn: &mut PgConnection,
    document_id: Uuid,
    status: DocumentStatus,
    reviewed_by: Uuid,
    rejection_reason: Option<String>,
) -> Result<DriverDocument, StoreError> {
    let reason = match status {
        DocumentStatus::Approved => None,
        DocumentStatus::Rejected => {
            let reason = rejection_reason
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    StoreError::Validation("a rejection reason is required".into())
                })?;
            Some(reason.to_string())
        }
        DocumentStatus::Pending => {
            return Err(StoreError::Validation(
                "a review decision must be approved or rejected".into(),
            ))
        }
    };

    let now = Utc::now().naive_utc();
    let document = diesel::update(driver_documents::table.find(document_id))
        .set((
            driver_documents::status.eq(status.as_str()),
            driver_documents::rejection_reason.eq(reason),
            driver_documents::reviewed_at.eq(now),
            driver_documents::reviewed_by.eq(reviewed_by),
        ))
        .get_result::<DriverDocument>(conn)
        .optional()?
        .ok_or(StoreError::NotFound)?;

    Ok(document)
}

pub fn set_application_status(
    conn: &mut PgConnection,
    application_id: Uuid,
    status: ApplicationStatus,
) -> QueryResult<usize> {
    let now = Utc::now().naive_utc();
    diesel::update(driver_applications::table.find(application_id))
        .set((
            driver_applications::status.eq(status.as_str()),
            driver_applications::updated_at.eq(now),
        ))
        .execute(conn)
}
