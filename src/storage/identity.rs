//! Identity Redis operations.
//!
//! Redis key patterns:
//! - `identity:{nanoid}`: identity data (JSON, includes the password hash)
//! - `identity_email:{email}`: email lookup to identity id (STRING)
//!
//! Identity JSON is wrapped in `Zeroizing` so the copy holding the password
//! hash is cleared from application memory once it has been parsed.

use super::{from_json, to_json};
use crate::models::{Role, StoredIdentity};
use redis::AsyncCommands;
use zeroize::Zeroizing;

fn identity_key(id: &str) -> String {
    format!("identity:{}", id)
}

fn email_key(email: &str) -> String {
    format!("identity_email:{}", email)
}

/// Store an identity and its email lookup key. Identities do not expire.
pub async fn store_identity<C>(
    con: &mut C,
    identity: &StoredIdentity,
) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
{
    let json = Zeroizing::new(to_json(identity)?);

    con.set::<_, _, ()>(identity_key(&identity.id), json.as_str())
        .await?;
    con.set::<_, _, ()>(email_key(&identity.email), &identity.id)
        .await?;

    Ok(())
}

/// Get an identity by id.
pub async fn get_identity<C>(
    con: &mut C,
    id: &str,
) -> Result<Option<StoredIdentity>, redis::RedisError>
where
    C: AsyncCommands,
{
    let json: Option<String> = con.get(identity_key(id)).await?;

    match json {
        Some(data) => {
            let data = Zeroizing::new(data);
            Ok(Some(from_json(&data)?))
        }
        None => Ok(None),
    }
}

/// Get an identity by email (exact match).
///
/// Performs a two-step lookup: email -> identity id -> identity data.
pub async fn get_identity_by_email<C>(
    con: &mut C,
    email: &str,
) -> Result<Option<StoredIdentity>, redis::RedisError>
where
    C: AsyncCommands,
{
    let id: Option<String> = con.get(email_key(email)).await?;

    match id {
        Some(id) => get_identity(con, &id).await,
        None => Ok(None),
    }
}

/// Create or replace the identity registered under `email`.
///
/// An existing identity keeps its id and creation time; everything else is
/// overwritten.
pub async fn upsert_identity<C>(
    con: &mut C,
    email: &str,
    name: &str,
    role: Role,
    password_hash: String,
) -> Result<StoredIdentity, redis::RedisError>
where
    C: AsyncCommands,
{
    let existing = get_identity_by_email(con, email).await?;

    let (id, created_at) = match existing {
        Some(identity) => (identity.id, identity.created_at),
        None => (nanoid::nanoid!(12), chrono::Utc::now().timestamp()),
    };

    let identity = StoredIdentity {
        id,
        email: email.to_string(),
        name: name.to_string(),
        password_hash,
        role,
        created_at,
    };

    store_identity(con, &identity).await?;
    Ok(identity)
}
