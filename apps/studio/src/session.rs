use animation::presets::{self, SequenceError};
use animation::{apply_edit, AnimationState, EditCommand, EditError, EditOutcome};
use playback::{Progress, SessionBus, SessionEvent, Transport};
use scene::{showcase_rig, ApplyOutcome, SceneBindings, SceneRig};

pub(crate) const DEFAULT_SEQUENCE: &str = "cinematicReveal";

/// The owned session context: animation state, scene rig and bindings,
/// transport, and the event bus. Created at startup, replaced piecewise on
/// sequence load, torn down with the app.
pub(crate) struct ShowcaseSession {
    pub(crate) state: AnimationState,
    pub(crate) transport: Transport,
    pub(crate) rig: SceneRig,
    pub(crate) bindings: SceneBindings,
    pub(crate) bus: SessionBus,
    pub(crate) sequence_name: String,
}

impl ShowcaseSession {
    pub(crate) fn new() -> Self {
        let (rig, bindings) = showcase_rig();
        let mut session = Self {
            state: presets::cinematic_reveal(),
            transport: Transport::new(),
            rig,
            bindings,
            bus: SessionBus::new(),
            sequence_name: DEFAULT_SEQUENCE.to_string(),
        };
        session.apply_scene();
        session
    }

    /// Replaces the animation state wholesale from a named sequence, resets
    /// progress to zero and re-applies the scene. An unknown name reports
    /// and leaves everything untouched.
    pub(crate) fn load_sequence(&mut self, name: &str) -> Result<(), SequenceError> {
        let state = presets::load_sequence(name)?;
        self.state = state;
        self.sequence_name = name.to_string();
        self.transport.reset();
        self.apply_scene();
        self.bus
            .publish(SessionEvent::SequenceLoaded { name: name.to_string() });
        Ok(())
    }

    /// Runs one editor mutation. Changes re-apply the scene at the current
    /// progress immediately and notify the bus.
    pub(crate) fn edit(&mut self, command: EditCommand) -> Result<EditOutcome, EditError> {
        let outcome = apply_edit(&mut self.state, command)?;
        if outcome == EditOutcome::Changed {
            self.apply_scene();
            self.bus.publish(SessionEvent::TracksEdited);
        }
        Ok(outcome)
    }

    /// One external scroll tick.
    pub(crate) fn set_external_progress(&mut self, fraction: f64) {
        if self.transport.set_external(fraction) {
            self.apply_scene();
        }
    }

    /// Playhead scrub; returns the fraction to push back out to the scroll
    /// source.
    pub(crate) fn drag_playhead(&mut self, fraction: f64) -> Progress {
        let progress = self.transport.drag_to(fraction);
        self.apply_scene();
        progress
    }

    pub(crate) fn end_drag(&mut self) {
        self.transport.end_drag();
    }

    /// One auto-play tick; `Some` carries the outward scroll target.
    pub(crate) fn tick(&mut self) -> Option<Progress> {
        let pushed = self.transport.tick();
        if pushed.is_some() {
            self.apply_scene();
        }
        pushed
    }

    /// Rebuilds the rig and binding table wholesale, as when the renderable
    /// set changes.
    pub(crate) fn rebuild_rig(&mut self) {
        let (rig, bindings) = showcase_rig();
        self.rig = rig;
        self.bindings = bindings;
        self.apply_scene();
        self.bus.publish(SessionEvent::BindingsRebuilt);
    }

    pub(crate) fn apply_scene(&mut self) -> ApplyOutcome {
        scene::apply(
            &self.state,
            &mut self.rig,
            &self.bindings,
            self.transport.progress(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use animation::Channel;

    #[test]
    fn session_starts_applied_at_zero() {
        let session = ShowcaseSession::new();
        let camera = session
            .rig
            .get(session.bindings.resolve("camera").unwrap())
            .unwrap();
        assert_eq!(camera.position.z, 1.5);
    }

    #[test]
    fn loading_a_sequence_resets_progress_and_scene() {
        let mut session = ShowcaseSession::new();
        session.set_external_progress(0.8);
        session.load_sequence("simpleShowcase").unwrap();
        assert_eq!(session.transport.progress(), Progress::ZERO);
        assert_eq!(session.sequence_name, "simpleShowcase");
        let camera = session
            .rig
            .get(session.bindings.resolve("camera").unwrap())
            .unwrap();
        assert_eq!(camera.position.z, 5.0);
        assert!(session
            .bus
            .drain()
            .contains(&SessionEvent::SequenceLoaded { name: "simpleShowcase".into() }));
    }

    #[test]
    fn an_unknown_sequence_leaves_the_session_untouched() {
        let mut session = ShowcaseSession::new();
        session.set_external_progress(0.4);
        session.bus.drain();
        let before_state = session.state.clone();
        assert!(session.load_sequence("missing").is_err());
        assert_eq!(session.state, before_state);
        assert_eq!(session.transport.progress().fraction(), 0.4);
        assert_eq!(session.sequence_name, DEFAULT_SEQUENCE);
        assert!(session.bus.drain().is_empty());
    }

    #[test]
    fn edits_reapply_the_scene_and_notify() {
        let mut session = ShowcaseSession::new();
        session.bus.drain();
        session
            .edit(EditCommand::AddKeyframe {
                object: "pointLight".into(),
                property: "intensity".into(),
                channel: Channel::Value,
                position: 0.0,
                value: "9.0".into(),
            })
            .unwrap();
        let point = session
            .rig
            .get(session.bindings.resolve("pointLight").unwrap())
            .unwrap();
        assert_eq!(point.intensity, 9.0);
        assert_eq!(session.bus.drain(), vec![SessionEvent::TracksEdited]);
    }

    #[test]
    fn drag_overrides_the_external_signal_until_release() {
        let mut session = ShowcaseSession::new();
        session.drag_playhead(0.5);
        session.set_external_progress(0.1);
        assert_eq!(session.transport.progress().fraction(), 0.5);
        session.end_drag();
        session.set_external_progress(0.1);
        assert_eq!(session.transport.progress().fraction(), 0.1);
    }
}
