//! HTTP verbs supported by the request layer

use serde::{Deserialize, Serialize};

use crate::impl_wire_name_conversions;

/// The fixed verb set a request may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl_wire_name_conversions!(HttpMethod {
    Get => "GET",
    Post => "POST",
    Put => "PUT",
    Delete => "DELETE",
    Patch => "PATCH",
});

impl HttpMethod {
    /// Whether a request body is sent for this verb.
    ///
    /// GET never carries a body; every other verb sends one when present.
    pub const fn sends_body(self) -> bool {
        !matches!(self, Self::Get)
    }

    /// Only GET responses are eligible for the response cache.
    pub const fn is_cacheable(self) -> bool {
        matches!(self, Self::Get)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_wire_names() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
        assert_eq!("patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_method_serde_uppercase() {
        let json = serde_json::to_string(&HttpMethod::Post).unwrap();
        assert_eq!(json, "\"POST\"");
        let parsed: HttpMethod = serde_json::from_str("\"PUT\"").unwrap();
        assert_eq!(parsed, HttpMethod::Put);
    }

    #[test]
    fn test_body_and_cache_rules() {
        assert!(!HttpMethod::Get.sends_body());
        assert!(HttpMethod::Post.sends_body());
        assert!(HttpMethod::Get.is_cacheable());
        assert!(!HttpMethod::Patch.is_cacheable());
    }
}
