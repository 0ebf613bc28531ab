use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::auth::{self, AuthError, TokenKind, TokenPair};
use crate::config::SecurityConfig;
use crate::database::models::{NewUser, Role, User, UserId};
use crate::database::repository::{RepositoryError, UserRepository};
use crate::supply::validation::{self as check, FieldErrors};
use crate::supply::Audit;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const PASSWORD_MISMATCH: &str = "Passwords do not match!";
const EMAIL_TAKEN: &str = "user with this email already exists.";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("validation failed")]
    Validation(FieldErrors),

    #[error("User {0} not found")]
    NotFound(UserId),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<FieldErrors> for UserError {
    fn from(errors: FieldErrors) -> Self {
        UserError::Validation(errors)
    }
}

impl From<RepositoryError> for UserError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UniqueViolation { field } => {
                UserError::Validation(FieldErrors::single(field, EMAIL_TAKEN))
            }
            other => UserError::Repository(other),
        }
    }
}

/// Body of `POST /user/register/`.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

/// Account data before hashing, used by registration, seeding and the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

fn default_role() -> Role {
    Role::User
}

fn default_true() -> bool {
    true
}

fn password(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    match value {
        None => errors.add(field, check::REQUIRED),
        Some(v) if v.is_empty() => errors.add(field, check::BLANK),
        Some(v) if v.chars().count() < MIN_PASSWORD_LENGTH => errors.add(
            field,
            format!("Ensure this field has at least {MIN_PASSWORD_LENGTH} characters."),
        ),
        Some(v) => return Some(v),
    }
    None
}

impl RegisterForm {
    pub fn validate(self) -> Result<NewAccount, FieldErrors> {
        let mut errors = FieldErrors::new();

        let email = check::email(&mut errors, "email", self.email, true);
        let password = password(&mut errors, "password", self.password);
        let confirmation = match self.password_confirmation {
            None => {
                errors.add("password_confirmation", check::REQUIRED);
                None
            }
            Some(v) => Some(v),
        };
        let first_name = check::blank_text(&mut errors, "first_name", self.first_name, 30);
        let last_name = check::blank_text(&mut errors, "last_name", self.last_name, 30);
        let phone = check::blank_text(&mut errors, "phone", self.phone, 20);

        if let (Some(p), Some(c)) = (&password, &confirmation) {
            if p != c {
                errors.add("non_field_errors", PASSWORD_MISMATCH);
            }
        }

        errors.finish(|| NewAccount {
            email: email.unwrap_or_default(),
            password: password.unwrap_or_default(),
            first_name,
            last_name,
            phone,
            role: Role::User,
            is_active: true,
            is_staff: false,
            is_superuser: false,
        })
    }
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    security: SecurityConfig,
    audit: Audit,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, security: SecurityConfig, audit: Audit) -> Self {
        Self { repo, security, audit }
    }

    pub async fn register(&self, form: RegisterForm) -> Result<User, UserError> {
        let account = form.validate()?;
        self.create_account(account).await
    }

    /// Hashes the password and stores the account. Email must be unused.
    pub async fn create_account(&self, account: NewAccount) -> Result<User, UserError> {
        let email = check::normalize_email(&account.email);
        if self.repo.find_user_by_email(&email).await?.is_some() {
            return Err(FieldErrors::single("email", EMAIL_TAKEN).into());
        }

        let user = self
            .repo
            .insert_user(NewUser {
                email,
                password_hash: auth::hash_password(&account.password)?,
                first_name: account.first_name,
                last_name: account.last_name,
                phone: account.phone,
                role: account.role,
                is_active: account.is_active,
                is_staff: account.is_staff,
                is_superuser: account.is_superuser,
            })
            .await?;

        tracing::info!("Created user {} with role {}", user.email, user.role.as_str());
        Ok(user)
    }

    /// Inserts each account whose email is not taken yet. Returns the emails
    /// paired with whether they were created.
    pub async fn seed(&self, accounts: Vec<NewAccount>) -> Result<Vec<(String, bool)>, UserError> {
        let mut report = Vec::with_capacity(accounts.len());
        for account in accounts {
            let email = check::normalize_email(&account.email);
            if self.repo.find_user_by_email(&email).await?.is_some() {
                report.push((email, false));
                continue;
            }
            self.create_account(account).await?;
            report.push((email, true));
        }
        Ok(report)
    }

    /// Email and password to a token pair. Unknown, wrong or inactive all
    /// look the same to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, UserError> {
        let email = check::normalize_email(email);
        let found = self.repo.find_user_by_email(&email).await?;
        let verified = match &found {
            Some(user) if user.is_active => auth::verify_password(password, &user.password_hash)?,
            _ => false,
        };
        let user = match found {
            Some(user) if verified => user,
            _ => {
                self.audit.login(&email, false);
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let tokens = auth::issue_token_pair(&user, &self.security)?;
        self.repo.touch_last_login(user.id).await?;
        self.audit.login(&user.email, true);
        Ok(tokens)
    }

    /// Refresh token to a fresh access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, UserError> {
        let claims = auth::decode_token(refresh_token, TokenKind::Refresh, &self.security)?;
        let user = self.active_user(claims.sub).await?;
        Ok(auth::issue_access_token(&user, &self.security)?)
    }

    /// Access token to the active user it was issued for.
    pub async fn authenticate(&self, access_token: &str) -> Result<User, UserError> {
        let claims = auth::decode_token(access_token, TokenKind::Access, &self.security)?;
        self.active_user(claims.sub).await
    }

    pub async fn profile(&self, id: UserId) -> Result<User, UserError> {
        self.repo.get_user(id).await?.ok_or(UserError::NotFound(id))
    }

    pub async fn count(&self) -> Result<i64, UserError> {
        Ok(self.repo.count_users().await?)
    }

    async fn active_user(&self, id: UserId) -> Result<User, UserError> {
        match self.repo.get_user(id).await? {
            Some(user) if user.is_active => Ok(user),
            Some(_) => Err(AuthError::InactiveUser.into()),
            None => Err(AuthError::TokenInvalid("user no longer exists".to_string()).into()),
        }
    }
}
