pub mod auth;
pub mod entities;
pub mod error;
pub mod graphql;
pub mod services;
