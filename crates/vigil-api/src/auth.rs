use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use vigil_types::api::{ApiResponse, AuthData, LoginRequest, RegisterRequest};

use crate::error::ApiError;
use crate::middleware::Claims;
use crate::{AppState, blocking};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.trim().is_empty()
        || req.email.trim().is_empty()
        || req.phone.trim().is_empty()
        || req.password.is_empty()
    {
        return Err(ApiError::validation("Please provide all required fields"));
    }
    if req.password.len() < 6 {
        return Err(ApiError::validation(
            "Password must be at least 6 characters",
        ));
    }

    let existing = {
        let state = state.clone();
        let email = req.email.clone();
        blocking(move || state.db.get_user_by_email(&email)).await?
    };
    if existing.is_some() {
        return Err(ApiError::validation("Email already registered"));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hash: {}", e)))?
        .to_string();

    let user_id = Uuid::new_v4();
    {
        let state = state.clone();
        let id = user_id.to_string();
        let (name, email, phone, address) =
            (req.name.clone(), req.email.clone(), req.phone.clone(), req.address.clone());
        blocking(move || {
            state
                .db
                .create_user(&id, &name, &email, &phone, address.as_deref(), &password_hash)
        })
        .await?;
    }

    let token = create_token(&state.jwt_secret, user_id, &req.name)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with(
            "Registration successful",
            AuthData {
                user_id,
                name: req.name,
                token,
            },
        )),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = {
        let state = state.clone();
        let email = req.email.clone();
        blocking(move || state.db.get_user_by_email(&email)).await?
    }
    .ok_or(ApiError::Unauthorized)?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("stored hash unparsable: {}", e)))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let user_id = crate::parse_uuid(&user.id, "user id");
    let token = create_token(&state.jwt_secret, user_id, &user.name)?;

    Ok(Json(ApiResponse::ok_with(
        "Login successful",
        AuthData {
            user_id,
            name: user.name,
            token,
        },
    )))
}

fn create_token(secret: &str, user_id: Uuid, name: &str) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user_id,
        name: name.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(anyhow::anyhow!("token encode: {}", e)))?;

    Ok(token)
}
