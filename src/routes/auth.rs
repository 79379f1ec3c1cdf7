use crate::{
    auth::{AuthResponse, AuthService, LoginRequest, RegisterRequest},
    error::AppError,
    models::UserView,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new account
///
/// The first account registered into an empty store is granted the admin role.
///
/// ## Responses:
/// - `201 Created`: the new account as a `UserView`.
/// - `409 Conflict`: the username is taken.
/// - `422 Unprocessable Entity`: the payload failed validation.
#[post("/register")]
pub async fn register(
    service: web::Data<AuthService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let user = service
        .register(&register_data.username, &register_data.password)
        .await?;

    Ok(HttpResponse::Created().json(UserView::from(user)))
}

/// Log in
///
/// Exchanges a username and password for a bearer token.
///
/// ## Responses:
/// - `200 OK`: an `AuthResponse` with the token and its lifetime.
/// - `401 Unauthorized`: unknown username or wrong password. Both look the same.
/// - `403 Forbidden`: the account is deactivated.
/// - `422 Unprocessable Entity`: the payload failed validation.
#[post("/login")]
pub async fn login(
    service: web::Data<AuthService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let token = service
        .login(&login_data.username, &login_data.password)
        .await
        .map_err(|e| match e {
            AppError::NotFound(_) => AppError::InvalidCredentials,
            other => other,
        })?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        expires_in: service.token_ttl().num_seconds(),
    }))
}
