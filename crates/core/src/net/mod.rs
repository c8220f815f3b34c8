//! Rate-governed network access layer.
//!
//! All outbound GET calls go through the [`NetGovernor`], which enforces one
//! of four operating levels: interactive confirmation, a cumulative byte
//! budget, a pacing delay, or bounded-concurrency fan-out. The governor
//! talks to the wire through the [`Transport`] seam and to the operator
//! through the [`Prompter`] seam, so both sides are mockable.

mod governor;
mod level;
mod prompt;
mod transport;
mod types;

pub use governor::{NetGovernor, MAX_IN_FLIGHT};
pub use level::{NetworkLevel, ALL_LEVELS};
pub use prompt::{Prompter, StdinPrompter};
pub use transport::{HttpTransport, Transport};
pub use types::{ApiResponse, NetError};
