//! Signup, login, token refresh and account mutations.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::TokenService;
use crate::config::RoleConfig;
use crate::database::audit::{self, Change, Provenance};
use crate::database::models::{User, UserProfile};
use crate::database::snapshot::{self, Depth, Snapshot};
use crate::database::{DatabaseError, PartialUpdate};
use crate::services::access::Actor;
use crate::services::error::{required, ServiceError, ServiceResult};
use crate::types::TableName;

#[derive(Debug, Clone, Deserialize)]
pub struct SignupInput {
    #[serde(alias = "user_id")]
    pub login_id: String,
    pub password: String,
    pub display_name: Option<String>,
    pub phone_number: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    #[serde(alias = "user_id")]
    pub login_id: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub phone_number: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// Identifies the account to remove. Exactly one field must be set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserLookup {
    #[serde(alias = "user_id")]
    pub login_id: Option<String>,
    pub display_name: Option<String>,
    pub phone_number: Option<String>,
}

impl UserLookup {
    fn column_and_value(&self) -> ServiceResult<(&'static str, &str)> {
        let supplied: Vec<(&'static str, &str)> = [
            ("login_id", self.login_id.as_deref()),
            ("display_name", self.display_name.as_deref()),
            ("phone_number", self.phone_number.as_deref()),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.map(str::trim).filter(|v| !v.is_empty()).map(|v| (column, v)))
        .collect();

        match supplied.as_slice() {
            [one] => Ok(*one),
            [] => Err(ServiceError::Validation(
                "one of login_id, display_name or phone_number is required".to_string(),
            )),
            _ => Err(ServiceError::Validation("supply only one identifying field".to_string())),
        }
    }
}

/// Tokens handed out by a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
    pub is_admin: bool,
}

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    tokens: Arc<TokenService>,
    roles: RoleConfig,
}

impl AuthService {
    pub fn new(pool: PgPool, tokens: Arc<TokenService>, roles: RoleConfig) -> Self {
        Self { pool, tokens, roles }
    }

    pub async fn signup(&self, input: SignupInput) -> ServiceResult<UserProfile> {
        let login_id = required("login_id", &input.login_id)?;
        if input.password.is_empty() {
            return Err(ServiceError::Validation("password is required".to_string()));
        }
        let role = input
            .role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(&self.roles.default_role)
            .to_string();

        let password_hash = hash_password_blocking(input.password).await?;
        let user = User {
            id: Uuid::new_v4(),
            login_id,
            password_hash,
            display_name: input.display_name,
            phone_number: input.phone_number,
            is_admin: self.roles.is_admin(&role),
            role,
            created_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE login_id = $1)")
            .bind(&user.login_id)
            .fetch_one(&mut *tx)
            .await?;
        if exists {
            return Err(ServiceError::DuplicateIdentifier(user.login_id));
        }

        let user: User = sqlx::query_as(
            "INSERT INTO users (id, login_id, password_hash, display_name, phone_number, role, is_admin, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(user.id)
        .bind(&user.login_id)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(&user.phone_number)
        .bind(&user.role)
        .bind(user.is_admin)
        .bind(user.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| duplicate_or(DatabaseError::from(e), &user.login_id))?;

        audit::record(&mut tx, &Change::Insert(Snapshot::user(user.clone())), Some(user.id), Provenance::Mutation)
            .await?;
        tx.commit().await?;

        info!("User signed up: {} ({})", user.login_id, user.id);
        Ok(UserProfile::from(&user))
    }

    pub async fn login(&self, input: LoginInput) -> ServiceResult<LoginOutcome> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE login_id = $1")
            .bind(input.login_id.trim())
            .fetch_optional(&self.pool)
            .await?;
        let Some(user) = user else {
            warn!("Login rejected: unknown login id");
            return Err(ServiceError::UnknownIdentifier);
        };

        if !verify_password_blocking(input.password, user.password_hash.clone()).await? {
            warn!("Login rejected: bad password for {}", user.id);
            return Err(ServiceError::BadCredential);
        }

        let outcome = LoginOutcome {
            user_id: user.id,
            access_token: self.tokens.issue_access_token(user.id)?,
            refresh_token: self.tokens.issue_refresh_token(user.id)?,
            is_admin: user.is_admin,
        };
        info!("User logged in: {}", user.id);
        Ok(outcome)
    }

    /// Mints a new access token from the refresh cookie. The refresh token is not rotated.
    pub fn refresh(&self, refresh_token: Option<&str>) -> ServiceResult<String> {
        let token = refresh_token.ok_or(ServiceError::MissingToken)?;
        let user_id = self.tokens.verify_refresh_token(token).map_err(|e| {
            warn!("Refresh rejected: {}", e);
            ServiceError::InvalidOrExpiredToken
        })?;
        Ok(self.tokens.issue_access_token(user_id)?)
    }

    pub async fn update_profile(&self, user_id: Uuid, fields: ProfileUpdate) -> ServiceResult<UserProfile> {
        let role = fields.role.as_deref().map(str::trim).filter(|r| !r.is_empty()).map(str::to_string);
        let update = PartialUpdate::new(TableName::Users)
            .set_if("display_name", fields.display_name.map(Some))
            .set_if("phone_number", fields.phone_number.map(Some))
            .set_if("is_admin", role.as_deref().map(|r| self.roles.is_admin(r)))
            .set_if("role", role);
        if update.is_empty() {
            return Err(ServiceError::NothingToUpdate);
        }

        let mut tx = self.pool.begin().await?;
        let old = snapshot::fetch_user(&mut tx, user_id)
            .await?
            .ok_or(ServiceError::Unauthenticated)?;
        let new: User = update
            .fetch_optional(&mut tx, user_id)
            .await?
            .ok_or(ServiceError::Unauthenticated)?;
        audit::record(
            &mut tx,
            &Change::Update { old: Snapshot::user(old), new: Snapshot::user(new.clone()) },
            Some(user_id),
            Provenance::Mutation,
        )
        .await?;
        tx.commit().await?;

        info!("Updated profile of {} ({})", user_id, update.columns().join(", "));
        Ok(UserProfile::from(&new))
    }

    pub async fn change_password(&self, user_id: Uuid, change: PasswordChange) -> ServiceResult<()> {
        if change.new_password.is_empty() {
            return Err(ServiceError::Validation("new_password is required".to_string()));
        }

        let mut tx = self.pool.begin().await?;
        let old = snapshot::fetch_user(&mut tx, user_id)
            .await?
            .ok_or(ServiceError::Unauthenticated)?;
        if !verify_password_blocking(change.current_password, old.password_hash.clone()).await? {
            warn!("Password change rejected for {}", user_id);
            return Err(ServiceError::BadCredential);
        }

        let password_hash = hash_password_blocking(change.new_password).await?;
        let new: User = PartialUpdate::new(TableName::Users)
            .set("password_hash", password_hash)
            .fetch_optional(&mut tx, user_id)
            .await?
            .ok_or(ServiceError::Unauthenticated)?;
        audit::record(
            &mut tx,
            &Change::Update { old: Snapshot::user(old), new: Snapshot::user(new) },
            Some(user_id),
            Provenance::Mutation,
        )
        .await?;
        tx.commit().await?;

        info!("Password changed for {}", user_id);
        Ok(())
    }

    /// Removes an account together with everything it owns. The audit snapshot
    /// carries the whole tree so an undo brings all of it back.
    pub async fn delete_user(&self, caller: Uuid, lookup: UserLookup) -> ServiceResult<Uuid> {
        let (column, value) = lookup.column_and_value()?;
        let sql = match column {
            "login_id" => "SELECT id FROM users WHERE login_id = $1 LIMIT 2",
            "display_name" => "SELECT id FROM users WHERE display_name = $1 LIMIT 2",
            _ => "SELECT id FROM users WHERE phone_number = $1 LIMIT 2",
        };

        let mut tx = self.pool.begin().await?;
        let actor = Actor::load(&mut tx, caller).await?;
        let matches: Vec<Uuid> = sqlx::query_scalar(sql).bind(value).fetch_all(&mut *tx).await?;
        let target = match matches.as_slice() {
            [] => return Err(ServiceError::NotFound("user")),
            [id] => *id,
            _ => return Err(ServiceError::AmbiguousMatch),
        };
        if !actor.is_admin && actor.id != target {
            return Err(ServiceError::Forbidden("only the account holder or an admin can remove an account"));
        }

        let tree = snapshot::load(&mut tx, TableName::Users, target, Depth::Tree)
            .await?
            .ok_or(ServiceError::NotFound("user"))?;
        snapshot::remove(&mut tx, TableName::Users, target).await?;
        audit::record(&mut tx, &Change::Delete(tree), Some(actor.id), Provenance::Mutation).await?;
        tx.commit().await?;

        info!("User {} removed by {}", target, actor.id);
        Ok(target)
    }
}

fn duplicate_or(err: DatabaseError, login_id: &str) -> ServiceError {
    if err.is_unique_violation() {
        ServiceError::DuplicateIdentifier(login_id.to_string())
    } else {
        ServiceError::Database(err)
    }
}
