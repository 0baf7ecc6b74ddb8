//! Shared input checks used by the resource services

use crate::services::error::{ServiceError, ServiceResult};

/// `InvalidInput` when `value` is blank
pub fn require(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::invalid(format!("{} is required", field)));
    }
    Ok(())
}

/// An absolute http(s) URL
pub fn require_url(field: &str, value: &str) -> ServiceResult<()> {
    require(field, value)?;
    optional_url(field, value)
}

/// Blank is accepted; anything else must be an absolute http(s) URL
pub fn optional_url(field: &str, value: &str) -> ServiceResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    match url::Url::parse(value) {
        Ok(u) if matches!(u.scheme(), "http" | "https") && u.host().is_some() => Ok(()),
        _ => Err(ServiceError::invalid(format!(
            "{} must be a valid http(s) URL",
            field
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        assert!(require("title", "Hello").is_ok());
        let err = require("title", "  ").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(ref m) if m == "title is required"));
    }

    #[test]
    fn test_urls() {
        assert!(optional_url("link_video", "").is_ok());
        assert!(optional_url("link_video", "https://youtu.be/abc").is_ok());
        assert!(optional_url("link_video", "youtu.be/abc").is_err());
        assert!(optional_url("link_video", "ftp://example.com/x").is_err());
        assert!(require_url("link_video", "").is_err());
        assert!(require_url("link_video", "http://example.com").is_ok());
    }
}
