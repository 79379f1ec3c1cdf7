#![doc = "The `rolegate` library crate."]
#![doc = ""]
#![doc = "Token-based authentication and role-based authorization: password hashing,"]
#![doc = "signed token issuance, the bearer-token access middleware, and the"]
#![doc = "registration and activation workflow. The server binary (`main.rs`) wires"]
#![doc = "these into an actix-web application."]

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

pub use crate::error::AppError;
