use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::profile::{Profile, ProfileFile};
use crate::profile::patch::ProfilePatch;
use crate::profile::sections::EntryChange;

/// A change to one user's profile document, applied atomically by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileMutation {
    Patch(ProfilePatch),
    Entry(EntryChange),
}

impl ProfileMutation {
    pub fn apply(self, profile: &mut Profile) -> Result<(), AppError> {
        match self {
            ProfileMutation::Patch(patch) => {
                patch.apply_to(profile);
                Ok(())
            }
            ProfileMutation::Entry(change) => change.apply_to(profile),
        }
    }
}

impl From<ProfilePatch> for ProfileMutation {
    fn from(patch: ProfilePatch) -> Self {
        ProfileMutation::Patch(patch)
    }
}

impl From<EntryChange> for ProfileMutation {
    fn from(change: EntryChange) -> Self {
        ProfileMutation::Entry(change)
    }
}

/// Result of pointing a profile's file field at a new URL (or at nothing).
#[derive(Debug, Clone, PartialEq)]
pub struct FileSwap {
    /// URL the field held before the swap, read under the same lock.
    pub previous: Option<String>,
    /// Stored document after the swap; `None` when clearing for a user
    /// without a profile.
    pub profile: Option<Profile>,
}

impl FileSwap {
    /// The replaced URL, when it is no longer referenced by the profile.
    pub fn orphaned(&self, file: ProfileFile) -> Option<&str> {
        let current = self.profile.as_ref().and_then(|p| match file {
            ProfileFile::Resume => p.resume_url.as_deref(),
            ProfileFile::Image => p.profile_image.as_deref(),
        });
        self.previous.as_deref().filter(|prev| Some(*prev) != current)
    }
}

/// Persistence for profile documents, keyed by user id.
///
/// Carried in `AppState` as `Arc<dyn ProfileStore>`.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find(&self, user_id: &str) -> Result<Option<Profile>, AppError>;

    /// Upserts: creates an empty document on first write, then applies the
    /// mutation and returns the stored result. A failing mutation leaves the
    /// stored document unchanged.
    async fn update(&self, user_id: &str, mutation: ProfileMutation) -> Result<Profile, AppError>;

    /// Sets `file` to `url`, or clears it with `None`, and reports the URL it
    /// replaced. Setting creates the document if needed; clearing never does.
    async fn swap_file(
        &self,
        user_id: &str,
        file: ProfileFile,
        url: Option<String>,
    ) -> Result<FileSwap, AppError>;
}

/// PostgreSQL-backed store. Each profile is a JSONB document in `profiles`.
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        PgProfileStore { pool }
    }

    /// Row-locks the user's document for the rest of `tx`. With `create`, an
    /// empty document is inserted first so first saves are locked too.
    async fn lock_document(
        tx: &mut Transaction<'_, Postgres>,
        user_id: &str,
        create: bool,
    ) -> Result<Option<Profile>, AppError> {
        if create {
            let inserted = sqlx::query(
                "INSERT INTO profiles (user_id, document) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING",
            )
            .bind(user_id)
            .bind(Json(Profile::new(user_id)))
            .execute(&mut **tx)
            .await?
            .rows_affected();
            if inserted > 0 {
                debug!("Created profile document for user {user_id}");
            }
        }

        let document: Option<Json<Profile>> =
            sqlx::query_scalar("SELECT document FROM profiles WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut **tx)
                .await?;
        Ok(document.map(|Json(profile)| profile))
    }

    async fn write_document(
        tx: &mut Transaction<'_, Postgres>,
        profile: &Profile,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE profiles SET document = $2, updated_at = NOW() WHERE user_id = $1")
            .bind(&profile.user_id)
            .bind(Json(profile))
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn find(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        let document: Option<Json<Profile>> =
            sqlx::query_scalar("SELECT document FROM profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(document.map(|Json(profile)| profile))
    }

    async fn update(&self, user_id: &str, mutation: ProfileMutation) -> Result<Profile, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut profile = Self::lock_document(&mut tx, user_id, true)
            .await?
            .ok_or_else(|| anyhow!("profile row for {user_id} missing after insert"))?;

        // Dropping `tx` on error rolls back, including the insert above.
        mutation.apply(&mut profile)?;
        profile.user_id = user_id.to_string();

        Self::write_document(&mut tx, &profile).await?;
        tx.commit().await?;
        info!("Saved profile document for user {user_id}");
        Ok(profile)
    }

    async fn swap_file(
        &self,
        user_id: &str,
        file: ProfileFile,
        url: Option<String>,
    ) -> Result<FileSwap, AppError> {
        let mut tx = self.pool.begin().await?;
        let Some(mut profile) = Self::lock_document(&mut tx, user_id, url.is_some()).await? else {
            return Ok(FileSwap {
                previous: None,
                profile: None,
            });
        };

        let previous = std::mem::replace(file.slot(&mut profile), url);
        profile.user_id = user_id.to_string();

        Self::write_document(&mut tx, &profile).await?;
        tx.commit().await?;
        info!("Swapped {file:?} for user {user_id}");
        Ok(FileSwap {
            previous,
            profile: Some(profile),
        })
    }
}
