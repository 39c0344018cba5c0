//! Request and response payloads of the HTTP API.

pub mod game;
pub mod health;
pub mod lookup;
pub mod subscription;
pub mod validation;
