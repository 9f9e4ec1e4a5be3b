//! Local checks that mirror the server's request validation.

use crate::error::{ApiError, ApiResult};

pub const TOPIC_MIN: usize = 3;
pub const TOPIC_MAX: usize = 200;

pub const MESSAGE_ROLES: [&str; 3] = ["user", "assistant", "system"];

/// Trims and checks a research topic; lengths are in characters.
pub fn topic(raw: &str) -> ApiResult<String> {
    let t = raw.trim();
    let n = t.chars().count();
    if n < TOPIC_MIN {
        return Err(ApiError::Invalid(format!("topic must be at least {TOPIC_MIN} characters")));
    }
    if n > TOPIC_MAX {
        return Err(ApiError::Invalid(format!("topic must be at most {TOPIC_MAX} characters")));
    }
    Ok(t.to_string())
}

/// Trims `raw` and rejects it when nothing is left.
pub fn required(field: &str, raw: &str) -> ApiResult<String> {
    let t = raw.trim();
    if t.is_empty() {
        Err(ApiError::Invalid(format!("{field} is required")))
    } else {
        Ok(t.to_string())
    }
}

pub fn role(raw: &str) -> ApiResult<String> {
    let r = raw.trim().to_lowercase();
    if MESSAGE_ROLES.contains(&r.as_str()) {
        Ok(r)
    } else {
        Err(ApiError::Invalid(format!("invalid role '{}'", raw.trim())))
    }
}

/// Empty or whitespace-only optional fields are sent as absent.
pub fn optional(raw: &str) -> Option<String> {
    let t = raw.trim();
    (!t.is_empty()).then(|| t.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_bounds() {
        assert!(topic("ab").is_err());
        assert!(topic("  ab  ").is_err());
        assert_eq!(topic("  GNN ").unwrap(), "GNN");
        assert!(topic(&"x".repeat(200)).is_ok());
        assert!(topic(&"x".repeat(201)).is_err());
        // multi-byte characters count once
        assert!(topic("αβγ").is_ok());
    }

    #[test]
    fn required_and_optional() {
        assert_eq!(required("name", "   "), Err(ApiError::Invalid("name is required".into())));
        assert_eq!(required("name", " lab "), Ok("lab".into()));
        assert_eq!(optional("  "), None);
        assert_eq!(optional(" mit "), Some("mit".into()));
    }

    #[test]
    fn roles_are_normalised() {
        assert_eq!(role(" System ").unwrap(), "system");
        assert!(role("tool").is_err());
    }
}
