//! Tests for the HeyGen avatar integration.
//!
//! This module contains unit tests for:
//! - Configuration handling
//! - Wire message shapes
//! - The audio buffer flush policy
//! - Client state management

use super::*;
use crate::core::avatar::{AvatarError, ConnectionState, StreamParams};
use base64::prelude::*;
use serde_json::{Value, json};

// =============================================================================
// Configuration Tests
// =============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HeyGenConfig::default();
        assert!(config.api_key.is_empty());
        assert_eq!(config.avatar_name, DEFAULT_AVATAR_NAME);
        assert_eq!(config.avatar_version, DEFAULT_AVATAR_VERSION);
        assert_eq!(config.api_base_url, HEYGEN_API_BASE_URL);
        assert!(config.audio_in_sample_rate.is_none());
        assert!(config.audio_out_sample_rate.is_none());
    }

    #[test]
    fn test_builders() {
        let config = HeyGenConfig::new("key")
            .with_avatar("June_HR_public", "v2")
            .with_api_base_url("http://localhost:9000")
            .with_connection_timeout(5)
            .with_audio_in_sample_rate(8000)
            .with_audio_out_sample_rate(24000);

        assert_eq!(config.api_key, "key");
        assert_eq!(config.avatar_name, "June_HR_public");
        assert_eq!(config.api_base_url, "http://localhost:9000");
        assert_eq!(config.connection_timeout_seconds, 5);
        assert_eq!(config.audio_in_sample_rate, Some(8000));
        assert_eq!(config.audio_out_sample_rate, Some(24000));
    }

    #[test]
    fn test_validate_requires_api_key() {
        assert!(HeyGenConfig::default().validate().is_err());
        assert!(HeyGenConfig::new("key").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = HeyGenConfig::new("key").with_avatar("", "v2");
        assert!(config.validate().is_err());

        let config = HeyGenConfig::new("key").with_api_base_url("ftp://example.com");
        assert!(config.validate().is_err());

        let config = HeyGenConfig::new("key").with_connection_timeout(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_heygen_sample_rate() {
        assert_eq!(HEYGEN_SAMPLE_RATE, 24000);
    }
}

// =============================================================================
// Message Tests
// =============================================================================

mod message_tests {
    use super::*;

    fn to_value(event: &ClientEvent) -> Value {
        let json = serialize_client_event(event).unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_control_event_wire_shape() {
        for (event, expected_type) in [
            (ClientEvent::interrupt(), "agent.interrupt"),
            (ClientEvent::start_listening(), "agent.start_listening"),
            (ClientEvent::stop_listening(), "agent.stop_listening"),
            (ClientEvent::audio_buffer_clear(), "agent.audio_buffer_clear"),
        ] {
            let value = to_value(&event);
            assert_eq!(value["type"], expected_type);
            assert!(value["event_id"].is_string());
            assert!(value.get("audio").is_none());
            assert_eq!(event.event_type(), expected_type);
        }
    }

    #[test]
    fn test_append_event_carries_base64_audio() {
        let audio = [0x01u8, 0x02, 0x03, 0x04];
        let event = ClientEvent::audio_buffer_append(&audio);
        let value = to_value(&event);

        assert_eq!(value["type"], "agent.audio_buffer_append");
        let encoded = value["audio"].as_str().unwrap();
        assert_eq!(BASE64_STANDARD.decode(encoded).unwrap(), audio);
    }

    #[test]
    fn test_commit_event_carries_null_placeholder() {
        let event = ClientEvent::audio_buffer_commit();
        let value = to_value(&event);

        assert_eq!(value["type"], "agent.audio_buffer_commit");
        let encoded = value["audio"].as_str().unwrap();
        assert_eq!(BASE64_STANDARD.decode(encoded).unwrap(), vec![0u8]);
    }

    #[test]
    fn test_event_ids_are_fresh_per_message() {
        let a = ClientEvent::interrupt();
        let b = ClientEvent::interrupt();
        assert_ne!(a.event_id(), b.event_id());
        // Transport ids are UUIDs.
        assert!(uuid::Uuid::parse_str(a.event_id()).is_ok());
    }

    #[test]
    fn test_deserialize_agent_status() {
        let json = r#"{"type":"agent.status","event_id":"abc","status":"speaking"}"#;
        let event = deserialize_server_event(json).unwrap();
        match event {
            ServerEvent::AgentStatus(status) => {
                assert_eq!(status.event_id.as_deref(), Some("abc"));
                assert_eq!(status.payload["status"], "speaking");
            }
            other => panic!("expected AgentStatus, got {other:?}"),
        }
    }

    #[test]
    fn test_deserialize_unknown_event_type() {
        let json = r#"{"type":"agent.mystery","event_id":"abc"}"#;
        let event = deserialize_server_event(json).unwrap();
        assert!(matches!(event, ServerEvent::Unknown));
    }

    #[test]
    fn test_deserialize_missing_type_is_error() {
        assert!(deserialize_server_event(r#"{"event_id":"abc"}"#).is_err());
        assert!(deserialize_server_event("not json").is_err());
    }

    #[test]
    fn test_new_session_request_field_names() {
        let request = NewSessionRequest {
            avatar_name: "Shawn_Therapist_public".to_string(),
            version: "v2".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["avatarName"], "Shawn_Therapist_public");
        assert_eq!(value["version"], "v2");
    }

    #[test]
    fn test_session_parses_from_envelope() {
        let body = json!({
            "code": 100,
            "message": "success",
            "data": {
                "session_id": "sess-1",
                "realtime_endpoint": "wss://example.test/realtime",
                "url": "wss://media.example.test",
                "access_token": "tok",
                "ice_servers": []
            }
        });
        let envelope: messages::ApiEnvelope<HeyGenSession> =
            serde_json::from_value(body).unwrap();
        let session = envelope.data.unwrap();
        assert_eq!(session.session_id, "sess-1");
        assert_eq!(session.realtime_endpoint, "wss://example.test/realtime");
        assert_eq!(session.url.as_deref(), Some("wss://media.example.test"));
    }
}

// =============================================================================
// Flush Policy Tests
// =============================================================================

mod flush_tests {
    use crate::core::avatar::heygen::client::{AudioBufferAccumulator, FlushAction};

    use super::*;

    #[test]
    fn test_short_finish_buffer_is_cleared_not_committed() {
        let mut acc = AudioBufferAccumulator::default();
        acc.append(50.0);
        assert_eq!(acc.decide(true), FlushAction::Clear);
    }

    #[test]
    fn test_finish_above_minimum_commits() {
        let mut acc = AudioBufferAccumulator::default();
        acc.append(200.0);
        assert_eq!(acc.decide(true), FlushAction::Commit);
    }

    #[test]
    fn test_minimum_boundary_is_inclusive_for_commit() {
        let mut acc = AudioBufferAccumulator::default();
        acc.append(MIN_COMMIT_DURATION_MS);
        // Exactly 80ms is not "below the minimum": it commits.
        assert_eq!(acc.decide(true), FlushAction::Commit);
    }

    #[test]
    fn test_accumulation_below_threshold_takes_no_action() {
        let mut acc = AudioBufferAccumulator::default();
        for _ in 0..10 {
            acc.append(100.0);
        }
        // Exactly 1000ms does not exceed the threshold.
        assert_eq!(acc.decide(false), FlushAction::None);
    }

    #[test]
    fn test_crossing_upper_threshold_commits_without_finish() {
        let mut acc = AudioBufferAccumulator::default();
        for _ in 0..10 {
            acc.append(100.0);
        }
        acc.append(100.0);
        assert_eq!(acc.decide(false), FlushAction::Commit);
    }

    #[test]
    fn test_reset_returns_counter_to_zero() {
        let mut acc = AudioBufferAccumulator::default();
        acc.append(500.0);
        assert_eq!(acc.buffered_ms(), 500.0);
        acc.reset();
        assert_eq!(acc.buffered_ms(), 0.0);
        assert_eq!(acc.decide(false), FlushAction::None);
    }
}

// =============================================================================
// Client Tests
// =============================================================================

mod client_tests {
    use super::*;

    fn pcm_ms_at_avatar_rate(ms: usize) -> Vec<u8> {
        // 24kHz, 16-bit mono: 48 bytes per millisecond.
        vec![0u8; ms * 48]
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        assert!(HeyGenClient::new(HeyGenConfig::default()).is_err());
    }

    #[test]
    fn test_client_initial_state() {
        let client = HeyGenClient::new(HeyGenConfig::new("key")).unwrap();
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
        assert!(client.session_id().is_none());
        assert!(client.last_utterance_id().is_none());
        assert_eq!(client.buffered_audio_duration_ms(), 0.0);
        assert_eq!(client.in_sample_rate(), 0);
        assert_eq!(client.out_sample_rate(), 0);
    }

    #[tokio::test]
    async fn test_start_before_setup_is_an_error() {
        let mut client = HeyGenClient::new(HeyGenConfig::new("key")).unwrap();
        let result = client.start(StreamParams::default()).await;
        assert!(matches!(result, Err(AvatarError::SessionError(_))));
    }

    #[tokio::test]
    async fn test_control_messages_without_connection_do_not_fail() {
        let mut client = HeyGenClient::new(HeyGenConfig::new("key")).unwrap();
        // Disconnected sends are dropped, not raised.
        client.interrupt().await;
        client.start_agent_listening().await;
        client.stop_agent_listening().await;
    }

    #[tokio::test]
    async fn test_send_audio_accumulates_at_avatar_rate() {
        let mut client = HeyGenClient::new(HeyGenConfig::new("key")).unwrap();

        client
            .send_audio(&pcm_ms_at_avatar_rate(100), HEYGEN_SAMPLE_RATE, "utt-1", false)
            .await
            .unwrap();
        assert_eq!(client.buffered_audio_duration_ms(), 100.0);
        assert_eq!(client.last_utterance_id(), Some("utt-1"));

        client
            .send_audio(&pcm_ms_at_avatar_rate(100), HEYGEN_SAMPLE_RATE, "utt-1", false)
            .await
            .unwrap();
        assert_eq!(client.buffered_audio_duration_ms(), 200.0);
    }

    #[tokio::test]
    async fn test_short_finish_resets_counter() {
        let mut client = HeyGenClient::new(HeyGenConfig::new("key")).unwrap();

        client
            .send_audio(&pcm_ms_at_avatar_rate(50), HEYGEN_SAMPLE_RATE, "utt-1", true)
            .await
            .unwrap();
        assert_eq!(client.buffered_audio_duration_ms(), 0.0);
    }

    #[tokio::test]
    async fn test_crossing_upper_threshold_resets_counter() {
        let mut client = HeyGenClient::new(HeyGenConfig::new("key")).unwrap();

        for _ in 0..10 {
            client
                .send_audio(&pcm_ms_at_avatar_rate(100), HEYGEN_SAMPLE_RATE, "utt-1", false)
                .await
                .unwrap();
        }
        // Ten chunks put the buffer at exactly 1000ms: no commit yet.
        assert_eq!(client.buffered_audio_duration_ms(), 1000.0);

        client
            .send_audio(&pcm_ms_at_avatar_rate(100), HEYGEN_SAMPLE_RATE, "utt-1", false)
            .await
            .unwrap();
        assert_eq!(client.buffered_audio_duration_ms(), 0.0);
    }

    #[tokio::test]
    async fn test_cleanup_without_setup_is_safe() {
        let mut client = HeyGenClient::new(HeyGenConfig::new("key")).unwrap();
        client.cleanup().await;
        client.cleanup().await;
        assert!(client.session_id().is_none());
    }
}
