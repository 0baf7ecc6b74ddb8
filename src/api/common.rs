//! Common API utilities and shared types
//!
//! Request shapes used by more than one route namespace.

use serde::Deserialize;

/// Body of a status transition request
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// Optional `?status=` filter on list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

impl StatusQuery {
    /// The filter, with an empty value treated as absent
    pub fn filter(&self) -> Option<&str> {
        self.status.as_deref().filter(|s| !s.is_empty())
    }
}

/// Body of an appointment host assignment
#[derive(Debug, Deserialize)]
pub struct AssignHostRequest {
    pub host_id: i64,
}
