/// Account endpoints
///
/// Registration, email confirmation, login, and the password-reset flow.
///
/// # Endpoints
///
/// - `POST /api/auth/create-account` - Register (sends confirmation code)
/// - `POST /api/auth/confirm-account` - Redeem a confirmation code
/// - `POST /api/auth/login` - Login and get a session token
/// - `POST /api/auth/request-code` - Re-send a confirmation code
/// - `POST /api/auth/forgot-password` - Send a password-reset code
/// - `POST /api/auth/validate-token` - Check a reset code without consuming it
/// - `POST /api/auth/update-password/:token` - Consume the code, set password
/// - `GET  /api/auth/user` - The authenticated account's profile

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::MessageResponse,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use crewtask_shared::{
    auth::{jwt, middleware::AuthContext, password},
    mail::{self, MailKind},
    models::{
        token::TokenPurpose,
        user::{CreateUser, User},
    },
    tokens::{self, Redemption},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    /// Display name
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Must repeat the password
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirmation: String,
}

/// Code redemption request (confirmation and reset-validation flows)
#[derive(Debug, Deserialize, Validate)]
pub struct CodeRequest {
    /// The emailed verification code
    #[validate(length(min = 1, message = "Code is required"))]
    pub token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Signed session token (bearer credential)
    pub token: String,
}

/// Email-only request (request-code and forgot-password flows)
#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// New password request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    /// New password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Must repeat the password
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirmation: String,
}

/// Registers a new account.
///
/// The account row and its first confirmation code are written in one
/// transaction; the confirmation mail is dispatched fire-and-forget after
/// commit.
///
/// # Errors
///
/// - `400`: validation failed
/// - `409`: email already registered
pub async fn create_account(
    State(state): State<AppState>,
    Json(req): Json<CreateAccountRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    // Prevent duplicates with a friendly message; the unique index is the
    // actual guarantee under concurrency.
    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email is already registered".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let mut tx = state.db.begin().await?;

    let user = User::create(
        &mut *tx,
        CreateUser {
            email: req.email,
            name: req.name,
            password_hash,
        },
    )
    .await?;

    let token = tokens::issue(
        &mut tx,
        user.id,
        TokenPurpose::Confirmation,
        state.config.issue_policy(),
    )
    .await?;

    tx.commit().await?;

    mail::dispatch(
        state.mailer.clone(),
        MailKind::Confirmation,
        user.email,
        user.name,
        token.code,
    );

    Ok(Json(MessageResponse::new(
        "Account created, a confirmation code has been sent to your email",
    )))
}

/// Redeems a confirmation code and marks the account confirmed.
///
/// Redemption and the flag flip share a transaction: if the update fails,
/// the code is not consumed.
///
/// # Errors
///
/// - `404`: unknown code, or code expired (the expired row is discarded)
pub async fn confirm_account(
    State(state): State<AppState>,
    Json(req): Json<CodeRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    let mut tx = state.db.begin().await?;

    match tokens::redeem(
        &mut *tx,
        &req.token,
        TokenPurpose::Confirmation,
        state.config.confirmation_ttl(),
    )
    .await?
    {
        Redemption::Redeemed { user_id } => {
            User::confirm(&mut *tx, user_id).await?;
            tx.commit().await?;
            Ok(Json(MessageResponse::new("Account confirmed")))
        }
        Redemption::Expired => {
            // Keep the delete of the stale row
            tx.commit().await?;
            Err(ApiError::NotFound(
                "Code has expired, request a new one".to_string(),
            ))
        }
        Redemption::NotFound => Err(ApiError::NotFound("Invalid code".to_string())),
    }
}

/// Authenticates an account and hands out a session token.
///
/// Logging into an unconfirmed account re-sends a confirmation code
/// instead of a session token.
///
/// # Errors
///
/// - `404`: unknown email
/// - `401`: unconfirmed account (code re-sent) or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !user.confirmed {
        let mut tx = state.db.begin().await?;
        let token = tokens::issue(
            &mut tx,
            user.id,
            TokenPurpose::Confirmation,
            state.config.issue_policy(),
        )
        .await?;
        tx.commit().await?;

        mail::dispatch(
            state.mailer.clone(),
            MailKind::Confirmation,
            user.email,
            user.name,
            token.code,
        );

        return Err(ApiError::Unauthorized(
            "Account is not confirmed, a confirmation code has been sent to your email"
                .to_string(),
        ));
    }

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Incorrect password".to_string()));
    }

    let claims = jwt::Claims::new(user.id, state.config.jwt_validity());
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(LoginResponse { token }))
}

/// Re-sends a confirmation code to an unconfirmed account.
///
/// # Errors
///
/// - `404`: unknown email
/// - `403`: account already confirmed (nothing to confirm)
pub async fn request_code(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User is not registered".to_string()))?;

    if user.confirmed {
        return Err(ApiError::Forbidden(
            "Account is already confirmed".to_string(),
        ));
    }

    let mut tx = state.db.begin().await?;
    let token = tokens::issue(
        &mut tx,
        user.id,
        TokenPurpose::Confirmation,
        state.config.issue_policy(),
    )
    .await?;
    tx.commit().await?;

    mail::dispatch(
        state.mailer.clone(),
        MailKind::Confirmation,
        user.email,
        user.name,
        token.code,
    );

    Ok(Json(MessageResponse::new(
        "A new code has been sent to your email",
    )))
}

/// Starts the password-reset flow by mailing a reset code.
///
/// # Errors
///
/// - `404`: unknown email
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User is not registered".to_string()))?;

    let mut tx = state.db.begin().await?;
    let token = tokens::issue(
        &mut tx,
        user.id,
        TokenPurpose::PasswordReset,
        state.config.issue_policy(),
    )
    .await?;
    tx.commit().await?;

    mail::dispatch(
        state.mailer.clone(),
        MailKind::PasswordReset,
        user.email,
        user.name,
        token.code,
    );

    Ok(Json(MessageResponse::new(
        "Reset instructions have been sent to your email",
    )))
}

/// Checks a reset code without consuming it.
///
/// Idempotent read: the client calls this before showing the new-password
/// form; the code is only consumed by `update_password`.
///
/// # Errors
///
/// - `404`: unknown or expired code
pub async fn validate_token(
    State(state): State<AppState>,
    Json(req): Json<CodeRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    let valid = tokens::validate(
        &state.db,
        &req.token,
        TokenPurpose::PasswordReset,
        state.config.reset_ttl(),
    )
    .await?;

    if !valid {
        return Err(ApiError::NotFound("Invalid code".to_string()));
    }

    Ok(Json(MessageResponse::new(
        "Code is valid, set your new password",
    )))
}

/// Consumes a reset code and replaces the account's password.
///
/// Redemption and the hash replacement share a transaction, so the code
/// cannot be burned without the password actually changing. A second
/// attempt with the same code finds nothing.
///
/// # Errors
///
/// - `400`: validation failed
/// - `404`: unknown code, or code expired (the expired row is discarded)
pub async fn update_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<UpdatePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    let password_hash = password::hash_password(&req.password)?;

    let mut tx = state.db.begin().await?;

    match tokens::redeem(
        &mut *tx,
        &token,
        TokenPurpose::PasswordReset,
        state.config.reset_ttl(),
    )
    .await?
    {
        Redemption::Redeemed { user_id } => {
            User::set_password_hash(&mut *tx, user_id, &password_hash).await?;
            tx.commit().await?;
            Ok(Json(MessageResponse::new("Password has been reset")))
        }
        Redemption::Expired => {
            tx.commit().await?;
            Err(ApiError::NotFound(
                "Code has expired, request a new one".to_string(),
            ))
        }
        Redemption::NotFound => Err(ApiError::NotFound("Invalid code".to_string())),
    }
}

/// Returns the authenticated account's profile.
pub async fn get_user(Extension(actor): Extension<AuthContext>) -> ApiResult<Json<AuthContext>> {
    Ok(Json(actor))
}
