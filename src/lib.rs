pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod mailer;
pub mod models;
pub mod onboarding;
pub mod routes;
pub mod s3;
pub mod schema;
pub mod state;
pub mod storage;
