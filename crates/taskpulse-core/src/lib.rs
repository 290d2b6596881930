//! Core library for taskpulse.
//!
//! This crate holds everything the dashboard front-ends share:
//! - `auth`: the process-wide session store and its durable storage backends
//! - `api`: the request pipeline that authorizes every call, plus a typed client
//! - `navigation`: routes and the navigator hook used for forced logins
//! - `models`: task board and monitoring records returned by the API
//! - `config`: persisted client configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod navigation;
