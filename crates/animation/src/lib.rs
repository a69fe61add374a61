//! Keyframe animation core: per-channel keyframe tracks, linear numeric and
//! RGB color interpolation, the authored animation state, and the editor
//! operations that mutate it.

pub mod editor;
pub mod presets;
pub mod state;
pub mod track;
pub mod value;

pub use editor::{apply_edit, clamp_position, parse_value_input, EditCommand, EditError, EditOutcome};
pub use presets::{load_sequence, sequence_names, SequenceError};
pub use state::{
    AnimationState, Channel, ColorTracks, ObjectTracks, PropertyKind, PropertyTracks, StateError,
};
pub use track::{Keyframe, KeyframeTrack, TrackError, TIMELINE_END};
pub use value::{lerp_value, ColorParseError, Rgb, Value, ValueKind};
