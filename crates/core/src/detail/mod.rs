//! Vehicle detail payload decoding and image selection.

mod select;
mod types;

pub use select::{select_preferred_image, SelectionError};
pub use types::{parse_vehicle, DetailError, ImageRef, VehicleDetail};
