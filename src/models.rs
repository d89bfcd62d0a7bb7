use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::*;

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = refresh_tokens)]
#[diesel(belongs_to(User))]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub issued_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    pub revoked_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = refresh_tokens)]
pub struct NewRefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub issued_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = driver_applications)]
pub struct DriverApplication {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub licence_number: String,
    pub status: String,
    pub assigned_to: Option<Uuid>,
    pub decision_note: Option<String>,
    pub archived_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = driver_applications)]
pub struct NewDriverApplication {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub licence_number: String,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = onboarding_tokens)]
#[diesel(belongs_to(DriverApplication, foreign_key = application_id))]
pub struct OnboardingToken {
    pub id: Uuid,
    pub application_id: Uuid,
    pub token_hash: String,
    pub expires_at: NaiveDateTime,
    pub used_at: Option<NaiveDateTime>,
    pub revoked_at: Option<NaiveDateTime>,
    pub send_count: i32,
    pub last_sent_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = onboarding_tokens)]
pub struct NewOnboardingToken {
    pub id: Uuid,
    pub application_id: Uuid,
    pub token_hash: String,
    pub expires_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = driver_vehicles)]
#[diesel(primary_key(application_id))]
#[diesel(belongs_to(DriverApplication, foreign_key = application_id))]
pub struct DriverVehicle {
    pub application_id: Uuid,
    pub registration: String,
    pub make: String,
    pub model: String,
    pub colour: String,
    pub year: Option<i32>,
    pub plate_number: Option<String>,
    pub capacity: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = driver_vehicles)]
pub struct NewDriverVehicle {
    pub application_id: Uuid,
    pub registration: String,
    pub make: String,
    pub model: String,
    pub colour: String,
    pub year: Option<i32>,
    pub plate_number: Option<String>,
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = driver_documents)]
#[diesel(belongs_to(DriverApplication, foreign_key = application_id))]
pub struct DriverDocument {
    pub id: Uuid,
    pub application_id: Uuid,
    pub doc_type: String,
    pub storage_key: String,
    pub status: String,
    pub expiry_date: Option<NaiveDate>,
    pub rejection_reason: Option<String>,
    pub uploaded_at: NaiveDateTime,
    pub reviewed_at: Option<NaiveDateTime>,
    pub reviewed_by: Option<Uuid>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = driver_documents)]
pub struct NewDriverDocument {
    pub id: Uuid,
    pub application_id: Uuid,
    pub doc_type: String,
    pub storage_key: String,
    pub status: String,
    pub expiry_date: Option<NaiveDate>,
}
