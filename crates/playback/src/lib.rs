//! Progress synchronization: the single authoritative [0, 1] progress
//! value, arbitration between its competing writers, and the session event
//! bus that reports rebuilds back to the trigger's owner.

pub mod bus;
pub mod transport;

pub use bus::{SessionBus, SessionEvent};
pub use transport::{Driver, Progress, Transport, DEFAULT_PLAY_STEP, EXTERNAL_EPSILON};
