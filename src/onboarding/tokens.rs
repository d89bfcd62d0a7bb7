use chrono::{Duration as ChronoDuration, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::{NewOnboardingToken, OnboardingToken};
use crate::schema::onboarding_tokens::dsl;

pub struct IssuedToken {
    /// The client-facing secret. Returned exactly once; only its hash is
    /// persisted.
    pub raw: String,
    pub token: OnboardingToken,
}

/// Mints a fresh onboarding token and revokes any prior live tokens for the
/// application, so exactly one link is valid at a time.
pub fn issue_token(
    conn: &mut PgConnection,
    application_id: Uuid,
    ttl_days: i64,
) -> QueryResult<IssuedToken> {
    let now = Utc::now().naive_utc();
    let raw = generate_raw_token();

    let token = conn.transaction(|conn| {
        diesel::update(
            dsl::onboarding_tokens
                .filter(dsl::application_id.eq(application_id))
                .filter(dsl::used_at.is_null())
                .filter(dsl::revoked_at.is_null()),
        )
        .set((dsl::revoked_at.eq(now), dsl::updated_at.eq(now)))
        .execute(conn)?;

        let new_token = NewOnboardingToken {
            id: Uuid::new_v4(),
            application_id,
            token_hash: hash_token(&raw),
            expires_at: now + ChronoDuration::days(ttl_days),
        };

        diesel::insert_into(dsl::onboarding_tokens)
            .values(&new_token)
            .execute(conn)?;

        dsl::onboarding_tokens.find(new_token.id).first(conn)
    })?;

    Ok(IssuedToken { raw, token })
}

/// Looks up an unexpired, unused, unrevoked token by its raw value. All
/// failure modes collapse to `None`; the route layer answers them with one
/// uniform message.
pub fn resolve_token(conn: &mut PgConnection, raw: &str) -> QueryResult<Option<OnboardingToken>> {
    let now = Utc::now().naive_utc();
    dsl::onboarding_tokens
        .filter(dsl::token_hash.eq(hash_token(raw)))
        .filter(dsl::used_at.is_null())
        .filter(dsl::revoked_at.is_null())
        .filter(dsl::expires_at.gt(now))
        .first::<OnboardingToken>(conn)
        .optional()
}

/// Like [`resolve_token`] but tolerates a consumed token, so a duplicate
/// submit retry resolves instead of erroring.
pub fn resolve_for_submit(
    conn: &mut PgConnection,
    raw: &str,
) -> QueryResult<Option<OnboardingToken>> {
    let now = Utc::now().naive_utc();
    dsl::onboarding_tokens
        .filter(dsl::token_hash.eq(hash_token(raw)))
        .filter(dsl::revoked_at.is_null())
        .filter(dsl::expires_at.gt(now))
        .first::<OnboardingToken>(conn)
        .optional()
}

/// Marks the token used. The `used_at IS NULL` guard makes a second call a
/// no-op rather than an error.
pub fn consume_token(conn: &mut PgConnection, token_id: Uuid) -> QueryResult<()> {
    let now = Utc::now().naive_utc();
    diesel::update(
        dsl::onboarding_tokens
            .filter(dsl::id.eq(token_id))
            .filter(dsl::used_at.is_null()),
    )
    .set((dsl::used_at.eq(now), dsl::updated_at.eq(now)))
    .execute(conn)?;
    Ok(())
}

/// Bumps resend bookkeeping. Called only after the email actually went out.
pub fn record_send(conn: &mut PgConnection, token_id: Uuid) -> QueryResult<()> {
    let now = Utc::now().naive_utc();
    diesel::update(dsl::onboarding_tokens.find(token_id))
        .set((
            dsl::send_count.eq(dsl::send_count + 1),
            dsl::last_sent_at.eq(now),
            dsl::updated_at.eq(now),
        ))
        .execute(conn)?;
    Ok(())
}

fn generate_raw_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn hash_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_hex_sha256() {
        let first = hash_token("abc");
        let second = hash_token("abc");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert_ne!(first, hash_token("abd"));
    }

    #[test]
    fn raw_tokens_are_distinct_64_char_hex() {
        let a = generate_raw_token();
        let b = generate_raw_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
