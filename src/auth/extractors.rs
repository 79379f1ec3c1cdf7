use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;

/// Extracts the verified claims of the caller from request extensions.
///
/// Only usable on routes wrapped in [`RequireRole`](crate::auth::RequireRole), which
/// inserts the claims after a successful check. Without them the extractor fails
/// with `AppError::Unauthenticated`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>().cloned() {
            Some(claims) => ready(Ok(AuthenticatedUser(claims))),
            None => {
                let err = AppError::Unauthenticated(
                    "No verified claims on request. Ensure RequireRole is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
