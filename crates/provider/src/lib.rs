//! Data access boundary between the views and the analytics core.
//!
//! Views talk to a [`DataSource`]; the [`MockDataSource`] answers from the
//! synthetic generators after a simulated network delay. A real backend
//! would implement the same trait.

pub mod copilot;
pub mod latest;
pub mod mock;
pub mod source;

pub use copilot::simulate_latest;
pub use latest::{LatestSlot, Ticket};
pub use mock::MockDataSource;
pub use source::{DataSource, LeadTimeline, PaymentIntent, PaymentIntentRequest, PaymentMethod};
