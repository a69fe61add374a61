use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

/// Notifications from the session to whoever owns the progress-driving
/// trigger, published after the fact; consumers drain them once per tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Tracks changed; the scene was re-applied at the current progress.
    TracksEdited,
    /// A named sequence replaced the animation state wholesale.
    SequenceLoaded { name: String },
    /// The renderable object set changed and the bindings were rebuilt.
    BindingsRebuilt,
}

#[derive(Debug, Clone)]
pub struct SessionBus {
    tx: Sender<SessionEvent>,
    rx: Receiver<SessionEvent>,
}

impl SessionBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn publish(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    pub fn drain(&self) -> Vec<SessionEvent> {
        self.rx.try_iter().collect()
    }
}

impl Default for SessionBus {
    fn default() -> Self {
        Self::new()
    }
}
