//! `format` keyword checks
//!
//! Covers the JSON Schema string formats that show up in API descriptions
//! plus the OpenAPI numeric formats. Unknown formats always pass.

use regex::Regex;
use serde_json::Value;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

/// Compiled checkers for the known formats
pub struct FormatChecker {
    email: Regex,
    hostname_label: Regex,
    uri: Regex,
    uuid: Regex,
    byte: Regex,
}

impl FormatChecker {
    fn new() -> Self {
        Self {
            email: Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"),
            hostname_label: Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$")
                .expect("hostname regex"),
            uri: Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:[^\s]*$").expect("uri regex"),
            uuid: Regex::new(
                r"^[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}$",
            )
            .expect("uuid regex"),
            byte: Regex::new(r"^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$")
                .expect("base64 regex"),
        }
    }

    /// Process-wide instance; regexes are compiled once
    pub fn shared() -> &'static Self {
        static CHECKER: OnceLock<FormatChecker> = OnceLock::new();
        CHECKER.get_or_init(Self::new)
    }

    /// Whether `value` satisfies `format`.
    ///
    /// Values of a type the format does not apply to pass; `type` reports those.
    pub fn check(&self, format: &str, value: &Value) -> bool {
        match value {
            Value::String(s) => self.check_str(format, s),
            Value::Number(n) => match format {
                "int32" => whole(n).is_some_and(|f| f >= i32::MIN as f64 && f <= i32::MAX as f64),
                "int64" => {
                    n.is_i64() || whole(n).is_some_and(|f| f >= i64::MIN as f64 && f < i64::MAX as f64)
                }
                "float" | "double" => n.as_f64().is_some_and(f64::is_finite),
                _ => true,
            },
            _ => true,
        }
    }

    fn check_str(&self, format: &str, s: &str) -> bool {
        match format {
            "date" => s.len() == 10 && chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
            "date-time" => chrono::DateTime::parse_from_rfc3339(s).is_ok(),
            "email" => self.email.is_match(s),
            "hostname" => {
                !s.is_empty()
                    && s.len() <= 253
                    && s.trim_end_matches('.').split('.').all(|l| self.hostname_label.is_match(l))
            }
            "ipv4" => s.parse::<Ipv4Addr>().is_ok(),
            "ipv6" => s.parse::<Ipv6Addr>().is_ok(),
            "uri" => self.uri.is_match(s),
            "uuid" => self.uuid.is_match(s),
            "byte" => s.len() % 4 == 0 && self.byte.is_match(s),
            _ => true,
        }
    }
}

fn whole(n: &serde_json::Number) -> Option<f64> {
    n.as_f64().filter(|f| f.is_finite() && f.fract() == 0.0)
}
