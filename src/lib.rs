//! contentdesk - Role-segmented content management backend
//!
//! Admins, staff and end users share one HTTP API. Every status change on
//! articles, videos, comments, testimonials and appointments goes through a
//! single validated workflow.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
