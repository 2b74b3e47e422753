use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    auth::VerifiedIdentity,
    error::AppResult,
    models::{ProfileData, UserProfile},
};

/// Document store for user profiles, keyed by email
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Creates the profile on first sign-in with empty lists; afterwards only refreshes identity fields
    async fn upsert_by_email(&self, identity: &VerifiedIdentity) -> AppResult<UserProfile>;

    async fn get(&self, email: &str) -> AppResult<Option<UserProfile>>;

    /// Replaces the profile's kitchen data; `None` when no profile exists for `email`
    async fn update_data(&self, email: &str, data: &ProfileData) -> AppResult<Option<UserProfile>>;
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    email: String,
    google_id: String,
    name: Option<String>,
    given_name: Option<String>,
    ingredients: Vec<String>,
    allergies: Vec<String>,
    dietary_style: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        UserProfile {
            email: row.email,
            google_id: row.google_id,
            name: row.name,
            given_name: row.given_name,
            data: ProfileData {
                ingredients: row.ingredients,
                allergies: row.allergies,
                dietary_style: row.dietary_style,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const USER_COLUMNS: &str = "email, google_id, name, given_name, ingredients, allergies, \
                            dietary_style, created_at, updated_at";

/// Postgres-backed profile store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    async fn upsert_by_email(&self, identity: &VerifiedIdentity) -> AppResult<UserProfile> {
        let query = format!(
            r#"
            INSERT INTO users (email, google_id, name, given_name)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET google_id = EXCLUDED.google_id,
                name = EXCLUDED.name,
                given_name = EXCLUDED.given_name,
                updated_at = now()
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row: UserRow = sqlx::query_as(&query)
            .bind(&identity.email)
            .bind(&identity.subject)
            .bind(&identity.name)
            .bind(&identity.given_name)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(email = %row.email, "User profile upserted");

        Ok(row.into())
    }

    async fn get(&self, email: &str) -> AppResult<Option<UserProfile>> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        let row: Option<UserRow> = sqlx::query_as(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserProfile::from))
    }

    async fn update_data(&self, email: &str, data: &ProfileData) -> AppResult<Option<UserProfile>> {
        let query = format!(
            r#"
            UPDATE users
            SET ingredients = $2, allergies = $3, dietary_style = $4, updated_at = now()
            WHERE email = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row: Option<UserRow> = sqlx::query_as(&query)
            .bind(email)
            .bind(&data.ingredients)
            .bind(&data.allergies)
            .bind(&data.dietary_style)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserProfile::from))
    }
}
