// src/lib.rs

pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod db;
pub mod rate_limit;
pub mod repositories;
pub mod services;
pub mod tasks;

pub use db::Database;
pub use gzsurvey_common::error::Error;
pub use gzsurvey_common::{models, traits};
