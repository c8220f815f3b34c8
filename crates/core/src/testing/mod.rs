//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides mock implementations of the network traits, allowing
//! full-pipeline testing without a station or a terminal.
//!
//! # Example
//!
//! ```rust,ignore
//! use wimsnap_core::testing::{MockPrompter, MockTransport};
//!
//! let transport = MockTransport::new();
//! transport.respond_ok("/api/1.0/vehicle/detail?id=1", b"{...}");
//!
//! let prompter = MockPrompter::always(true);
//!
//! // Hand both to a NetGovernor...
//! ```

mod mock_prompter;
mod mock_transport;

pub use mock_prompter::MockPrompter;
pub use mock_transport::MockTransport;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::records::VehicleRecord;

    /// A record with just an id, the way most input rows look.
    pub fn record(vehicle_id: i64) -> VehicleRecord {
        VehicleRecord {
            vehicle_id: Some(vehicle_id),
            timestamp: None,
            lane: None,
        }
    }

    /// A record whose id column was empty or unparseable.
    pub fn record_without_id() -> VehicleRecord {
        VehicleRecord {
            vehicle_id: None,
            timestamp: None,
            lane: None,
        }
    }

    /// Detail response body with a full set of fields and the given images.
    ///
    /// `images` pairs are `(tag, url)`.
    pub fn detail_body(vehicle_id: i64, images: &[(&str, &str)]) -> Vec<u8> {
        let rendered: Vec<String> = images
            .iter()
            .map(|(tag, url)| format!(r#"{{"tag": "{}", "url": "{}"}}"#, tag, url))
            .collect();
        format!(
            r#"{{
  "data": {{
    "timestamp": "2023-04-01T10:02:03.123456+02:00",
    "ucid": 3,
    "lane": "L{}",
    "laneDescription": "Site 4, brno",
    "images": [{}]
  }}
}}"#,
            vehicle_id,
            rendered.join(", ")
        )
        .into_bytes()
    }

    /// Detail response body with an empty image list.
    pub fn detail_body_without_images(vehicle_id: i64) -> Vec<u8> {
        detail_body(vehicle_id, &[])
    }
}
