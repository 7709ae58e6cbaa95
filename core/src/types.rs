//! Result records returned by the live detect endpoints.
//!
//! # Design
//! Every record uses `#[serde(default)]`: missing fields take their zero
//! value and unknown fields are ignored, so new fields added by the service
//! never break parsing. Records are never mutated by the client after
//! deserialization.

use serde::{Deserialize, Serialize};

/// Result of action-based (video) live detect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveDetectResult {
    #[serde(rename = "video-result")]
    pub video_result: VideoResult,
    #[serde(rename = "warning-list")]
    pub warning_list: Vec<Warning>,
}

/// Per-video outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoResult {
    pub alive: bool,
    pub actions: Vec<ActionDetail>,
    /// Best frame, base64 encoded.
    pub picture: String,
}

/// Confidence that one prompted action was performed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionDetail {
    pub action: i32,
    pub confidence: f64,
}

/// Result of silent (single photo) live detect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveDetectSilentResult {
    pub result: SilentResult,
    #[serde(rename = "warning-list")]
    pub warning_list: Vec<Warning>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SilentResult {
    pub alive: bool,
    /// Not range-checked; passed through as the service reports it.
    pub confidence: f64,
    pub picture: String,
}

/// Non-fatal condition flagged by the service, e.g. low image quality.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Warning {
    pub warning_code: i32,
    pub warning_msg: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_result_roundtrips_through_json() {
        let original = SilentResult {
            alive: true,
            confidence: 0.97,
            picture: "abc".to_string(),
        };
        let json = serde_json::to_string(&original).unwrap();
        let back: SilentResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn silent_envelope_uses_hyphenated_warning_key() {
        let parsed: LiveDetectSilentResult = serde_json::from_str(
            r#"{"result":{"alive":true,"confidence":0.5,"picture":"p"},
                "warning-list":[{"warning_code":1001,"warning_msg":"blurry"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.warning_list.len(), 1);
        assert_eq!(parsed.warning_list[0].warning_code, 1001);
        assert_eq!(parsed.warning_list[0].warning_msg, "blurry");

        let json = serde_json::to_value(&parsed).unwrap();
        assert!(json.get("warning-list").is_some());
        assert!(json.get("warning_list").is_none());
    }

    #[test]
    fn missing_fields_default_to_zero_values() {
        let parsed: LiveDetectSilentResult = serde_json::from_str("{}").unwrap();
        assert!(!parsed.result.alive);
        assert_eq!(parsed.result.confidence, 0.0);
        assert!(parsed.result.picture.is_empty());
        assert!(parsed.warning_list.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let parsed: LiveDetectResult = serde_json::from_str(
            r#"{"video-result":{"alive":true,"actions":[{"action":1,"confidence":0.8,"extra":1}],
                "picture":"x","new_field":"y"},"request_id":"r-1"}"#,
        )
        .unwrap();
        assert!(parsed.video_result.alive);
        assert_eq!(
            parsed.video_result.actions,
            vec![ActionDetail {
                action: 1,
                confidence: 0.8
            }]
        );
    }

    #[test]
    fn confidence_outside_unit_range_is_kept() {
        let parsed: SilentResult = serde_json::from_str(r#"{"confidence":1.5}"#).unwrap();
        assert_eq!(parsed.confidence, 1.5);
    }
}
