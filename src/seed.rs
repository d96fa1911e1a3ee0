//! Demo identity provisioning.

use crate::auth::password::hash_password;
use crate::error::AppError;
use crate::models::{Role, StoredIdentity};
use crate::storage;
use redis::AsyncCommands;

/// A demo account: email, display name, role, clear-text password.
pub struct DemoIdentity {
    pub email: &'static str,
    pub name: &'static str,
    pub role: Role,
    pub password: &'static str,
}

pub const DEMO_IDENTITIES: [DemoIdentity; 3] = [
    DemoIdentity {
        email: "interviewer@example.com",
        name: "Demo Interviewer",
        role: Role::Interviewer,
        password: "interviewerpass",
    },
    DemoIdentity {
        email: "recruiter@example.com",
        name: "Demo Recruiter",
        role: Role::HrRecruiter,
        password: "recruiterpass",
    },
    DemoIdentity {
        email: "manager@example.com",
        name: "Demo Hiring Manager",
        role: Role::HrManager,
        password: "managerpass",
    },
];

/// Upsert every demo identity, hashing passwords on the way in.
pub async fn seed_demo_identities<C>(con: &mut C) -> Result<Vec<StoredIdentity>, AppError>
where
    C: AsyncCommands,
{
    let mut seeded = Vec::with_capacity(DEMO_IDENTITIES.len());

    for demo in &DEMO_IDENTITIES {
        let hash = hash_password(demo.password)?;
        let identity =
            storage::identity::upsert_identity(con, demo.email, demo.name, demo.role, hash).await?;
        tracing::info!(
            action = "identity_seeded",
            email = %identity.email,
            role = %identity.role,
            "Demo identity ready"
        );
        seeded.push(identity);
    }

    Ok(seeded)
}
