//! Library crate for the game release tracker, exposing modules for the binary
//! and integration tests.

pub mod catalog;
pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod notifications;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_support;
