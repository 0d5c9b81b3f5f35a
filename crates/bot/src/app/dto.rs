use serde::{Deserialize, Serialize};

use keydrop_core::{DomainError, RecipientId};
use keydrop_grants::Grant;
use keydrop_infra::{
    GrantConfirmation, MailboxMessage, PayloadKind, ProductListing, Registration, RevokeOutcome, SupersededGrant,
};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterProductRequest {
    pub name: String,
    pub link: String,
}

impl RegisterProductRequest {
    /// Names are exact keys and links are opaque, so neither is trimmed; only
    /// blank values are rejected.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("product name must not be empty"));
        }
        if self.link.trim().is_empty() {
            return Err(DomainError::validation("link must not be empty"));
        }
        Ok(())
    }
}

/// Snowflakes exceed the float-safe integer range, so ids travel as strings.
#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    pub recipient_id: String,
    pub product_name: String,
}

#[derive(Debug, Deserialize)]
pub struct MailboxSettingsRequest {
    pub accept_direct_messages: bool,
}

pub fn parse_recipient(raw: &str) -> Result<RecipientId, DomainError> {
    raw.trim().parse()
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<String>,
    pub empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl From<ProductListing> for ProductListResponse {
    fn from(listing: ProductListing) -> Self {
        match listing {
            ProductListing::Empty => Self {
                products: Vec::new(),
                empty: true,
                message: Some("no products registered"),
            },
            ProductListing::Products(products) => Self {
                products,
                empty: false,
                message: None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub name: String,
    pub link: String,
    pub replaced: Option<String>,
}

impl From<Registration> for RegistrationResponse {
    fn from(r: Registration) -> Self {
        Self {
            name: r.name,
            link: r.link,
            replaced: r.replaced,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SupersededResponse {
    pub handle: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct GrantResponse {
    pub recipient_id: String,
    pub product_name: String,
    pub handle: String,
    pub superseded: Option<SupersededResponse>,
}

impl From<GrantConfirmation> for GrantResponse {
    fn from(c: GrantConfirmation) -> Self {
        let superseded = c.superseded.map(|s| SupersededResponse {
            handle: s.handle().to_string(),
            status: match s {
                SupersededGrant::Kept(_) => "kept",
                SupersededGrant::Retracted(_) => "retracted",
                SupersededGrant::AlreadyGone(_) => "already_gone",
                SupersededGrant::RetractFailed(_) => "retract_failed",
            },
        });

        Self {
            recipient_id: c.recipient.to_string(),
            product_name: c.product,
            handle: c.handle.to_string(),
            superseded,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RevokeResponse {
    pub outcome: &'static str,
    pub notice_delivered: bool,
}

impl From<RevokeOutcome> for RevokeResponse {
    fn from(outcome: RevokeOutcome) -> Self {
        match outcome {
            RevokeOutcome::Revoked { notice_delivered } => Self {
                outcome: "revoked",
                notice_delivered,
            },
            RevokeOutcome::ArtifactMissing => Self {
                outcome: "artifact_missing",
                notice_delivered: false,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GrantEntry {
    pub product_name: String,
    pub handle: String,
}

#[derive(Debug, Serialize)]
pub struct GrantListResponse {
    pub recipient_id: String,
    pub grants: Vec<GrantEntry>,
}

impl GrantListResponse {
    pub fn new(recipient: RecipientId, grants: Vec<Grant>) -> Self {
        Self {
            recipient_id: recipient.to_string(),
            grants: grants
                .into_iter()
                .map(|g| GrantEntry {
                    product_name: g.product_name,
                    handle: g.handle.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MailboxMessageResponse {
    pub message_id: String,
    pub kind: PayloadKind,
    pub product_name: String,
    pub title: String,
    pub body: String,
    pub delivered_at: chrono::DateTime<chrono::Utc>,
}

impl From<MailboxMessage> for MailboxMessageResponse {
    fn from(m: MailboxMessage) -> Self {
        Self {
            message_id: m.handle.to_string(),
            kind: m.payload.kind,
            product_name: m.payload.product,
            title: m.payload.title,
            body: m.payload.body,
            delivered_at: m.delivered_at,
        }
    }
}
