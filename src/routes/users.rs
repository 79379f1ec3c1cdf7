use crate::auth::AuthenticatedUser;
use actix_web::{get, HttpResponse, Responder};

/// Returns the verified claims of the caller.
#[get("")]
pub async fn me(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(user.0)
}
