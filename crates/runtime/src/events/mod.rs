//! Topic-based event bus for runtime events.
//!
//! Every dispatch the scenario produces is published to the topic of the
//! team it is addressed to and to [`Topic::All`]. Consumers subscribe to the
//! topics they need.

mod bus;

pub use bus::{Event, EventBus, Topic};
