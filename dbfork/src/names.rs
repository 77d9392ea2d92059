//! Fork name generation.
//!
//! Names look like `svc1-fork-1760700000000`: the source id plus the
//! creation time in Unix milliseconds.

use chrono::Utc;

use crate::config::DemoConfig;
use crate::models::ServiceId;

/// The configured fork name, or a generated one.
pub fn fork_name(config: &DemoConfig, source: &ServiceId) -> String {
    config
        .fork_name()
        .map_or_else(|| generate_name(source), str::to_string)
}

/// Generate a fork name for `source` from the current time.
pub fn generate_name(source: &ServiceId) -> String {
    name_at(source, Utc::now().timestamp_millis())
}

fn name_at(source: &ServiceId, millis: i64) -> String {
    format!("{source}-fork-{millis}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_name() {
        let source = ServiceId::new("svc1").unwrap();
        let name = generate_name(&source);

        let suffix = name.strip_prefix("svc1-fork-").unwrap();
        assert!(suffix.parse::<i64>().unwrap() > 0);
    }

    #[test]
    fn test_name_at() {
        let source = ServiceId::new("svc1").unwrap();
        assert_eq!(name_at(&source, 1_760_700_000_000), "svc1-fork-1760700000000");
    }

    #[test]
    fn test_configured_name_wins() {
        let source = ServiceId::new("svc1").unwrap();
        let config = DemoConfig {
            fork_name: Some("demo-fork".to_string()),
            ..DemoConfig::default()
        };
        assert_eq!(fork_name(&config, &source), "demo-fork");
        assert!(fork_name(&DemoConfig::default(), &source).starts_with("svc1-fork-"));
    }
}
