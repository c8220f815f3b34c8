//! Typed model of the vehicle detail payload.

use serde::Deserialize;
use thiserror::Error;

/// Errors decoding a detail payload.
#[derive(Debug, Error)]
pub enum DetailError {
    /// The body was not the expected `{"data": {...}}` envelope.
    #[error("Vehicle object not in json: {0}")]
    Decode(String),
}

/// The `{"data": ...}` envelope around a vehicle detail.
#[derive(Debug, Deserialize)]
struct DetailEnvelope {
    data: VehicleDetail,
}

/// Vehicle detail as served by `/api/../vehicle/detail`.
///
/// Every field except the image list is optional in practice; machines
/// differ in what they populate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDetail {
    /// Tagged image variants for this passing.
    #[serde(default)]
    pub images: Vec<ImageRef>,
    /// Passing timestamp, kept opaque (formats vary between machines).
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Vehicle class id.
    #[serde(default)]
    pub ucid: Option<i64>,
    /// Lane identifier.
    #[serde(default)]
    pub lane: Option<String>,
    /// Free text lane description; its trailing comma-field names the site.
    #[serde(default)]
    pub lane_description: Option<String>,
}

/// One tagged image variant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageRef {
    pub tag: String,
    pub url: String,
}

/// Decodes a detail response body.
pub fn parse_vehicle(body: &[u8]) -> Result<VehicleDetail, DetailError> {
    let envelope: DetailEnvelope =
        serde_json::from_slice(body).map_err(|e| DetailError::Decode(e.to_string()))?;
    Ok(envelope.data)
}
