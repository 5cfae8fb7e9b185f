//! Origin and liveness sidecar files.
//!
//! Both files are written into the worktree by an external agent process and
//! are only ever read here. Neither function fails: unreadable input maps to
//! the documented default.

use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

use crate::config::SidecarConfig;
use crate::types::{LiveStatus, OriginType};

#[derive(Debug, Deserialize)]
struct OriginFile {
    #[serde(default)]
    origin: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusFile {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    last_active: Option<Value>,
    #[serde(default)]
    timestamp: Option<Value>,
}

/// Heartbeat interpretation for one worktree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Liveness {
    pub status: LiveStatus,
    pub last_active: Option<DateTime<Utc>>,
}

/// Automated if the origin sidecar names the automated marker, manual otherwise
pub fn detect_origin_type(worktree: &Path, config: &SidecarConfig) -> OriginType {
    let path = worktree.join(&config.origin_file);
    let parsed = std::fs::read_to_string(&path)
        .ok()
        .and_then(|content| serde_json::from_str::<OriginFile>(&content).ok());

    match parsed.and_then(|meta| meta.origin) {
        Some(origin) if origin == config.automated_marker => OriginType::Automated,
        _ => OriginType::Manual,
    }
}

/// Interpret the live-status heartbeat relative to `now`.
///
/// Active requires the active marker and a timestamp inside the freshness
/// window. A present but stale or inactive file is idle; a missing or
/// unparseable one is unknown.
pub fn detect_live_status(
    worktree: &Path,
    config: &SidecarConfig,
    now: DateTime<Utc>,
) -> Liveness {
    let path = worktree.join(&config.status_file);
    let Ok(content) = std::fs::read_to_string(&path) else {
        return Liveness::default();
    };
    let file: StatusFile = match serde_json::from_str::<Value>(&content) {
        Ok(object @ Value::Object(_)) => match serde_json::from_value(object) {
            Ok(file) => file,
            Err(e) => {
                trace!(path = %path.display(), error = %e, "Unparseable live-status file");
                return Liveness::default();
            }
        },
        Ok(_) => {
            trace!(path = %path.display(), "Live-status file is not a JSON object");
            return Liveness::default();
        }
        Err(e) => {
            trace!(path = %path.display(), error = %e, "Unparseable live-status file");
            return Liveness::default();
        }
    };

    let last_active = file
        .last_active
        .as_ref()
        .or(file.timestamp.as_ref())
        .and_then(parse_timestamp);

    let window = i64::try_from(config.freshness_secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX);
    let fresh = last_active.is_some_and(|ts| (now - ts).abs() <= window);
    let is_active_marker = file.status.as_deref() == Some(config.active_marker.as_str());

    Liveness {
        status: if is_active_marker && fresh {
            LiveStatus::Active
        } else {
            LiveStatus::Idle
        },
        last_active,
    }
}

/// RFC 3339 string or epoch milliseconds
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_status(dir: &Path, json: &str) {
        fs::write(dir.join(".claude-surf-status.json"), json).unwrap();
    }

    #[test]
    fn test_origin_detection() {
        let temp = tempfile::tempdir().unwrap();
        let config = SidecarConfig::default();
        assert_eq!(detect_origin_type(temp.path(), &config), OriginType::Manual);

        let meta = temp.path().join(".claude-surf-meta.json");
        fs::write(&meta, r#"{"origin": "robot-surf", "task": "x"}"#).unwrap();
        assert_eq!(detect_origin_type(temp.path(), &config), OriginType::Automated);

        fs::write(&meta, r#"{"origin": "solo-surf"}"#).unwrap();
        assert_eq!(detect_origin_type(temp.path(), &config), OriginType::Manual);

        fs::write(&meta, "{not json").unwrap();
        assert_eq!(detect_origin_type(temp.path(), &config), OriginType::Manual);
    }

    #[test]
    fn test_heartbeat_freshness() {
        let temp = tempfile::tempdir().unwrap();
        let config = SidecarConfig::default();
        let now = Utc::now();

        let two_min_ago = (now - TimeDelta::minutes(2)).to_rfc3339();
        write_status(
            temp.path(),
            &format!(r#"{{"status": "active", "lastActive": "{}"}}"#, two_min_ago),
        );
        let live = detect_live_status(temp.path(), &config, now);
        assert_eq!(live.status, LiveStatus::Active);
        assert!(live.last_active.is_some());

        let ten_min_ago = (now - TimeDelta::minutes(10)).to_rfc3339();
        write_status(
            temp.path(),
            &format!(r#"{{"status": "active", "lastActive": "{}"}}"#, ten_min_ago),
        );
        assert_eq!(
            detect_live_status(temp.path(), &config, now).status,
            LiveStatus::Idle
        );
    }

    #[test]
    fn test_heartbeat_timestamp_field_and_millis() {
        let temp = tempfile::tempdir().unwrap();
        let config = SidecarConfig::default();
        let now = Utc::now();

        let millis = (now - TimeDelta::seconds(30)).timestamp_millis();
        write_status(
            temp.path(),
            &format!(r#"{{"status": "active", "timestamp": {}}}"#, millis),
        );
        let live = detect_live_status(temp.path(), &config, now);
        assert_eq!(live.status, LiveStatus::Active);
        assert_eq!(live.last_active.map(|t| t.timestamp_millis()), Some(millis));
    }

    #[test]
    fn test_fresh_but_not_active_is_idle() {
        let temp = tempfile::tempdir().unwrap();
        let config = SidecarConfig::default();
        let now = Utc::now();
        write_status(
            temp.path(),
            &format!(r#"{{"status": "waiting", "lastActive": "{}"}}"#, now.to_rfc3339()),
        );
        assert_eq!(
            detect_live_status(temp.path(), &config, now).status,
            LiveStatus::Idle
        );

        // Active marker without any timestamp cannot be fresh
        write_status(temp.path(), r#"{"status": "active"}"#);
        let live = detect_live_status(temp.path(), &config, now);
        assert_eq!(live.status, LiveStatus::Idle);
        assert_eq!(live.last_active, None);
    }

    #[test]
    fn test_missing_or_garbage_is_unknown() {
        let temp = tempfile::tempdir().unwrap();
        let config = SidecarConfig::default();
        let now = Utc::now();
        assert_eq!(
            detect_live_status(temp.path(), &config, now).status,
            LiveStatus::Unknown
        );

        write_status(temp.path(), "garbage");
        assert_eq!(
            detect_live_status(temp.path(), &config, now),
            Liveness::default()
        );
    }

    #[test]
    fn test_non_object_json_is_unknown() {
        let temp = tempfile::tempdir().unwrap();
        let config = SidecarConfig::default();
        let now = Utc::now();

        for content in ["[]", "[\"active\"]", "null", "42", "\"active\""] {
            write_status(temp.path(), content);
            assert_eq!(
                detect_live_status(temp.path(), &config, now),
                Liveness::default(),
                "{content} was not treated as unknown"
            );
        }

        write_status(temp.path(), "{}");
        assert_eq!(
            detect_live_status(temp.path(), &config, now).status,
            LiveStatus::Idle
        );
    }
}
