pub mod registration;
pub mod store;
pub mod tokens;

use serde::{Deserialize, Serialize};

use crate::models::DriverDocument;

/// Lifecycle of a driver application. `pending -> link_sent` happens only
/// through the admin send-link action, `link_sent -> docs_received` through
/// the driver submit action; `approved`/`rejected` are an explicit admin
/// decision, informed by (not derived from) document completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    LinkSent,
    DocsReceived,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewing => "reviewing",
            Self::LinkSent => "link_sent",
            Self::DocsReceived => "docs_received",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "reviewing" => Some(Self::Reviewing),
            "link_sent" => Some(Self::LinkSent),
            "docs_received" => Some(Self::DocsReceived),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// The fixed set of required document slots per application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    LicenseFront,
    LicenseBack,
    Badge,
    Plating,
    Insurance,
    Mot,
}

pub const REQUIRED_DOCUMENT_TYPES: [DocumentType; 6] = [
    DocumentType::LicenseFront,
    DocumentType::LicenseBack,
    DocumentType::Badge,
    DocumentType::Plating,
    DocumentType::Insurance,
    DocumentType::Mot,
];

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LicenseFront => "LICENSE_FRONT",
            Self::LicenseBack => "LICENSE_BACK",
            Self::Badge => "BADGE",
            Self::Plating => "PLATING",
            Self::Insurance => "INSURANCE",
            Self::Mot => "MOT",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "LICENSE_FRONT" => Some(Self::LicenseFront),
            "LICENSE_BACK" => Some(Self::LicenseBack),
            "BADGE" => Some(Self::Badge),
            "PLATING" => Some(Self::Plating),
            "INSURANCE" => Some(Self::Insurance),
            "MOT" => Some(Self::Mot),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionBadge {
    Complete,
    Incomplete,
    Rejected,
}

/// Read-time summary of document review progress. Never persisted; a
/// rejected document trumps everything else.
#[derive(Debug, Serialize)]
pub struct CompletionState {
    pub badge: CompletionBadge,
    pub uploaded: usize,
    pub approved: usize,
    pub missing: Vec<DocumentType>,
}

pub fn completion_state(documents: &[DriverDocument]) -> CompletionState {
    let mut uploaded = 0;
    let mut approved = 0;
    let mut any_rejected = false;
    let mut missing = Vec::new();

    for doc_type in REQUIRED_DOCUMENT_TYPES {
        let slot = documents.iter().find(|doc| {
            doc.doc_type == doc_type.as_str() && !doc.storage_key.trim().is_empty()
        });

        match slot {
            Some(doc) => {
                uploaded += 1;
                match DocumentStatus::parse(&doc.status) {
                    Some(DocumentStatus::Approved) => approved += 1,
                    Some(DocumentStatus::Rejected) => any_rejected = true,
                    _ => {}
                }
            }
            None => missing.push(doc_type),
        }
    }

    let badge = if any_rejected {
        CompletionBadge::Rejected
    } else if missing.is_empty() && approved == REQUIRED_DOCUMENT_TYPES.len() {
        CompletionBadge::Complete
    } else {
        CompletionBadge::Incomplete
    };

    CompletionState {
        badge,
        uploaded,
        approved,
        missing,
    }
}
