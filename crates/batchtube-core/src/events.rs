//! Server-push events for the event-stream transfer protocol.
//!
//! Each SSE `data:` payload is one JSON object tagged by `event_type`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// One event pushed by the backend during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// An item became active.
    Downloading {
        /// Item id.
        video_id: String,
        /// Item title, informational.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// Transfer progress for an active item.
    Progress {
        /// Item id.
        video_id: String,
        /// Percent complete, 0-100.
        #[serde(
            default,
            deserialize_with = "deserialize_percent",
            skip_serializing_if = "Option::is_none"
        )]
        percent: Option<f64>,
        /// Human-readable transfer rate.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        speed: Option<String>,
    },
    /// An item entered post-processing.
    Merging {
        /// Item id.
        video_id: String,
    },
    /// An item finished.
    Complete {
        /// Item id.
        video_id: String,
        /// Item title, informational.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// An item failed.
    Error {
        /// Item id.
        video_id: String,
        /// Failure reason.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Every item of the run has been resolved.
    AllComplete,
}

impl ServerEvent {
    /// Parse one SSE data payload.
    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data)
            .map_err(|e| Error::Protocol(format!("malformed event {data:?}: {e}")))
    }

    /// Item the event refers to, if any.
    pub fn video_id(&self) -> Option<&str> {
        match self {
            Self::Downloading { video_id, .. }
            | Self::Progress { video_id, .. }
            | Self::Merging { video_id }
            | Self::Complete { video_id, .. }
            | Self::Error { video_id, .. } => Some(video_id),
            Self::AllComplete => None,
        }
    }

    /// Whether this event ends the run.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::AllComplete)
    }
}

/// Percent may arrive as a number or as a string such as `" 42.5%"`.
fn deserialize_percent<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().trim_end_matches('%').trim().parse().ok(),
        None => None,
    }
    .filter(|p: &f64| p.is_finite())
    .map(|p| p.clamp(0.0, 100.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_event_type() {
        let cases = [
            (
                r#"{"event_type":"downloading","video_id":"a","title":"A"}"#,
                ServerEvent::Downloading {
                    video_id: "a".to_string(),
                    title: Some("A".to_string()),
                },
            ),
            (
                r#"{"event_type":"progress","video_id":"a","percent":50,"speed":"1.2MiB/s"}"#,
                ServerEvent::Progress {
                    video_id: "a".to_string(),
                    percent: Some(50.0),
                    speed: Some("1.2MiB/s".to_string()),
                },
            ),
            (
                r#"{"event_type":"merging","video_id":"a"}"#,
                ServerEvent::Merging {
                    video_id: "a".to_string(),
                },
            ),
            (
                r#"{"event_type":"complete","video_id":"a"}"#,
                ServerEvent::Complete {
                    video_id: "a".to_string(),
                    title: None,
                },
            ),
            (
                r#"{"event_type":"error","video_id":"b","message":"Video is private"}"#,
                ServerEvent::Error {
                    video_id: "b".to_string(),
                    message: Some("Video is private".to_string()),
                },
            ),
            (r#"{"event_type":"all_complete"}"#, ServerEvent::AllComplete),
        ];
        for (json, expected) in cases {
            assert_eq!(ServerEvent::from_json(json).ok(), Some(expected), "{json}");
        }
    }

    #[test]
    fn test_percent_as_string() {
        let event = ServerEvent::from_json(
            r#"{"event_type":"progress","video_id":"a","percent":" 42.5%"}"#,
        )
        .expect("parse");
        assert!(matches!(event, ServerEvent::Progress { percent: Some(p), .. } if p == 42.5));
    }

    #[test]
    fn test_percent_clamped_and_optional() {
        let event =
            ServerEvent::from_json(r#"{"event_type":"progress","video_id":"a","percent":140}"#)
                .expect("parse");
        assert!(matches!(event, ServerEvent::Progress { percent: Some(p), .. } if p == 100.0));

        let event = ServerEvent::from_json(r#"{"event_type":"progress","video_id":"a"}"#)
            .expect("parse");
        assert!(matches!(event, ServerEvent::Progress { percent: None, .. }));

        let event = ServerEvent::from_json(
            r#"{"event_type":"progress","video_id":"a","percent":"n/a"}"#,
        )
        .expect("parse");
        assert!(matches!(event, ServerEvent::Progress { percent: None, .. }));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let event = ServerEvent::from_json(
            r#"{"event_type":"complete","video_id":"a","title":"A","extra":1}"#,
        );
        assert!(event.is_ok());
    }

    #[test]
    fn test_malformed_events() {
        assert!(matches!(
            ServerEvent::from_json(r#"{"event_type":"exploded"}"#),
            Err(Error::Protocol(_))
        ));
        assert!(matches!(
            ServerEvent::from_json(r#"{"event_type":"complete"}"#),
            Err(Error::Protocol(_))
        ));
        assert!(ServerEvent::from_json("keepalive").is_err());
    }

    #[test]
    fn test_video_id_and_terminal() {
        let event = ServerEvent::Merging {
            video_id: "m".to_string(),
        };
        assert_eq!(event.video_id(), Some("m"));
        assert!(!event.is_terminal());
        assert!(ServerEvent::AllComplete.is_terminal());
        assert_eq!(ServerEvent::AllComplete.video_id(), None);
    }
}
