use crate::{
    auth::{hash_password, verify_password},
    entities::user::{self, Entity as User, UserRole},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Account registration, credential checks and profile maintenance.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    pub role: Option<UserRole>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

async fn hash_off_thread(password: String) -> Result<String, ServiceError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ServiceError::InternalError(format!("Hashing task failed: {}", e)))?
        .map_err(|e| ServiceError::HashError(e.to_string()))
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Creates a `USER` account.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<user::Model, ServiceError> {
        input.validate()?;
        let email = normalize_email(&input.email);

        let taken = User::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .count(&*self.db)
            .await?;
        if taken > 0 {
            return Err(ServiceError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_off_thread(input.password).await?;

        let now = Utc::now();
        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            first_name: Set(input.first_name.trim().to_string()),
            last_name: Set(input.last_name.trim().to_string()),
            password_hash: Set(password_hash),
            role: Set(UserRole::User),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Returns the account matching the credentials. Unknown emails and wrong
    /// passwords produce the same error.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn authenticate(&self, input: LoginInput) -> Result<user::Model, ServiceError> {
        input.validate()?;

        let Some(user) = self.find_by_email(&input.email).await? else {
            warn!("Login attempt for unknown email");
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let stored = user.password_hash.clone();
        let password = input.password;
        let matches = tokio::task::spawn_blocking(move || verify_password(&stored, &password))
            .await
            .map_err(|e| ServiceError::InternalError(format!("Verification task failed: {}", e)))?
            .map_err(|e| ServiceError::HashError(e.to_string()))?;

        if !matches {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, ServiceError> {
        Ok(User::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<user::Model>, ServiceError> {
        Ok(User::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> Result<user::Model, ServiceError> {
        User::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    /// Updates profile names. Only callers with `may_change_role` can set the role.
    #[instrument(skip(self))]
    pub async fn update_user(
        &self,
        id: Uuid,
        input: UpdateUserInput,
        may_change_role: bool,
    ) -> Result<user::Model, ServiceError> {
        input.validate()?;
        if input.role.is_some() && !may_change_role {
            return Err(ServiceError::Forbidden(
                "Access denied. Admins only.".to_string(),
            ));
        }

        let existing = self.get_user(id).await?;
        let mut active: user::ActiveModel = existing.into();
        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name.trim().to_string());
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(last_name.trim().to_string());
        }
        if let Some(role) = input.role {
            active.role = Set(role);
        }
        active.updated_at = Set(Utc::now());

        let user = active.update(&*self.db).await?;
        info!(user_id = %id, "User updated");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> Result<user::Model, ServiceError> {
        let existing = self.get_user(id).await?;
        User::delete_by_id(id).exec(&*self.db).await?;
        info!(user_id = %id, "User deleted");
        Ok(existing)
    }

    /// Creates or promotes an admin account. Used by the bootstrap CLI.
    #[instrument(skip(self, password))]
    pub async fn ensure_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<user::Model, ServiceError> {
        if let Some(existing) = self.find_by_email(email).await? {
            if existing.role == UserRole::Admin {
                return Ok(existing);
            }
            let mut active: user::ActiveModel = existing.into();
            active.role = Set(UserRole::Admin);
            active.updated_at = Set(Utc::now());
            let user = active.update(&*self.db).await?;
            info!(user_id = %user.id, "Promoted user to admin");
            return Ok(user);
        }

        let mut user = self
            .register(RegisterInput {
                email: email.to_string(),
                password: password.to_string(),
                first_name: "Admin".to_string(),
                last_name: "User".to_string(),
            })
            .await?;

        let mut active: user::ActiveModel = user.clone().into();
        active.role = Set(UserRole::Admin);
        user = active.update(&*self.db).await?;
        info!(user_id = %user.id, "Created admin account");
        Ok(user)
    }
}
