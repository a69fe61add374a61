use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::{AnimationState, Channel, ColorTracks, PropertyTracks};
use crate::track::{TrackError, TIMELINE_END};
use crate::value::{Rgb, Value, ValueKind};

#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("property {property:?} has no channel {channel}")]
    UnknownChannel { property: String, channel: Channel },
    #[error("could not parse {input:?} as a keyframe value")]
    InvalidValue { input: String },
    #[error("channel {channel} expects {expected:?} keyframes")]
    WrongValueKind { channel: Channel, expected: ValueKind },
    #[error("no keyframe at position {position} to move")]
    MissingKeyframe { position: u32 },
    #[error(transparent)]
    Track(#[from] TrackError),
}

/// Editor mutations over the animation state. Every variant maps to one
/// authoring gesture; `apply_edit` is the sole write path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditCommand {
    AddProperty {
        object: String,
        property: String,
    },
    AddKeyframe {
        object: String,
        property: String,
        channel: Channel,
        position: f64,
        value: String,
    },
    RemoveKeyframe {
        object: String,
        property: String,
        channel: Channel,
        position: u32,
    },
    MoveKeyframe {
        object: String,
        property: String,
        channel: Channel,
        from: u32,
        to: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditOutcome {
    Changed,
    Unchanged,
}

/// Rounds a raw position into the integer [0, 100] timeline domain.
pub fn clamp_position(raw: f64) -> u32 {
    if raw.is_nan() {
        0
    } else {
        raw.round().clamp(0.0, TIMELINE_END as f64) as u32
    }
}

/// Parses raw keyframe input: `#`-prefixed text is a color literal,
/// anything else must be a finite float. Rejecting everything else keeps
/// not-a-number sentinels out of the tracks.
pub fn parse_value_input(input: &str) -> Result<Value, EditError> {
    let trimmed = input.trim();
    if trimmed.starts_with('#') {
        return Rgb::parse_hex(trimmed)
            .map(Value::Color)
            .map_err(|_| EditError::InvalidValue { input: input.to_string() });
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Value::Number(v)),
        _ => Err(EditError::InvalidValue { input: input.to_string() }),
    }
}

pub fn apply_edit(
    state: &mut AnimationState,
    command: EditCommand,
) -> Result<EditOutcome, EditError> {
    match command {
        EditCommand::AddProperty { object, property } => {
            if state.property(&object, &property).is_some() {
                return Ok(EditOutcome::Unchanged);
            }
            state.ensure_property(&object, &property);
            Ok(EditOutcome::Changed)
        }
        EditCommand::AddKeyframe { object, property, channel, position, value } => {
            let parsed = parse_value_input(&value)?;
            let tracks = state.ensure_property(&object, &property);
            require_value_kind(tracks, channel, parsed.kind())?;
            let track = tracks.channel_mut(channel).ok_or(EditError::UnknownChannel {
                property: property.clone(),
                channel,
            })?;
            track.insert_or_update(clamp_position(position), parsed)?;
            Ok(EditOutcome::Changed)
        }
        EditCommand::RemoveKeyframe { object, property, channel, position } => {
            let Some(track) = state.track_mut(&object, &property, channel) else {
                return Ok(EditOutcome::Unchanged);
            };
            match track.remove_at(position) {
                Some(_) => Ok(EditOutcome::Changed),
                None => Ok(EditOutcome::Unchanged),
            }
        }
        EditCommand::MoveKeyframe { object, property, channel, from, to } => {
            let track = state
                .track_mut(&object, &property, channel)
                .ok_or(EditError::UnknownChannel { property: property.clone(), channel })?;
            match track.move_key(from, clamp_position(to)) {
                Ok(()) => Ok(EditOutcome::Changed),
                Err(TrackError::NoKeyframeAt(position)) => {
                    Err(EditError::MissingKeyframe { position })
                }
                Err(err) => Err(err.into()),
            }
        }
    }
}

/// The property schema fixes what a channel may hold even while its track
/// is still empty: hex color channels take colors, everything else numbers.
fn require_value_kind(
    tracks: &PropertyTracks,
    channel: Channel,
    found: ValueKind,
) -> Result<(), EditError> {
    let expected = match (tracks, channel) {
        (PropertyTracks::Color(ColorTracks::Hex { .. }), Channel::Value) => ValueKind::Color,
        _ => ValueKind::Number,
    };
    if expected != found {
        return Err(EditError::WrongValueKind { channel, expected });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PropertyKind;

    fn add(
        state: &mut AnimationState,
        object: &str,
        property: &str,
        channel: Channel,
        position: f64,
        value: &str,
    ) -> Result<EditOutcome, EditError> {
        apply_edit(
            state,
            EditCommand::AddKeyframe {
                object: object.into(),
                property: property.into(),
                channel,
                position,
                value: value.into(),
            },
        )
    }

    #[test]
    fn add_property_is_idempotent_and_creates_no_keyframes() {
        let mut state = AnimationState::new();
        let first = apply_edit(
            &mut state,
            EditCommand::AddProperty { object: "model".into(), property: "position".into() },
        )
        .unwrap();
        let second = apply_edit(
            &mut state,
            EditCommand::AddProperty { object: "model".into(), property: "position".into() },
        )
        .unwrap();
        assert_eq!(first, EditOutcome::Changed);
        assert_eq!(second, EditOutcome::Unchanged);
        let tracks = state.property("model", "position").unwrap();
        assert_eq!(tracks.kind(), PropertyKind::Vector3);
        assert!(tracks.channels().iter().all(|(_, track)| track.is_empty()));
    }

    #[test]
    fn add_keyframe_parses_numbers_and_colors() {
        let mut state = AnimationState::new();
        add(&mut state, "model", "rotation", Channel::Y, 50.0, "3.14").unwrap();
        add(&mut state, "pointLight", "color", Channel::Value, 0.0, "#0080ff").unwrap();
        assert_eq!(
            state.track("model", "rotation", Channel::Y).unwrap().value_at(50.0),
            Value::Number(3.14)
        );
        assert_eq!(
            state
                .track("pointLight", "color", Channel::Value)
                .unwrap()
                .value_at(0.0),
            Value::Color(Rgb::new(0x00, 0x80, 0xff))
        );
    }

    #[test]
    fn add_keyframe_clamps_positions_into_range() {
        let mut state = AnimationState::new();
        add(&mut state, "model", "rotation", Channel::Y, -10.0, "1.0").unwrap();
        add(&mut state, "model", "rotation", Channel::Y, 250.0, "2.0").unwrap();
        let track = state.track("model", "rotation", Channel::Y).unwrap();
        assert!(track.key_at(0).is_some());
        assert!(track.key_at(100).is_some());
        assert_eq!(track.len(), 2);
    }

    #[test]
    fn add_keyframe_rejects_unparseable_input() {
        let mut state = AnimationState::new();
        let err = add(&mut state, "model", "rotation", Channel::Y, 0.0, "fast").unwrap_err();
        assert!(matches!(err, EditError::InvalidValue { .. }));
        assert!(state.is_empty() || state.track("model", "rotation", Channel::Y).unwrap().is_empty());
    }

    #[test]
    fn color_channels_reject_numeric_input_even_while_empty() {
        let mut state = AnimationState::new();
        let err = add(&mut state, "pointLight", "color", Channel::Value, 0.0, "0.5").unwrap_err();
        assert_eq!(
            err,
            EditError::WrongValueKind { channel: Channel::Value, expected: ValueKind::Color }
        );
    }

    #[test]
    fn numeric_channels_reject_color_input() {
        let mut state = AnimationState::new();
        let err = add(&mut state, "model", "rotation", Channel::Y, 0.0, "#ffffff").unwrap_err();
        assert_eq!(
            err,
            EditError::WrongValueKind { channel: Channel::Y, expected: ValueKind::Number }
        );
    }

    #[test]
    fn vector_properties_have_no_value_channel() {
        let mut state = AnimationState::new();
        let err = add(&mut state, "model", "position", Channel::Value, 0.0, "1.0").unwrap_err();
        assert!(matches!(err, EditError::UnknownChannel { .. }));
    }

    #[test]
    fn remove_keyframe_is_a_quiet_no_op_when_absent() {
        let mut state = AnimationState::new();
        let outcome = apply_edit(
            &mut state,
            EditCommand::RemoveKeyframe {
                object: "model".into(),
                property: "rotation".into(),
                channel: Channel::Y,
                position: 40,
            },
        )
        .unwrap();
        assert_eq!(outcome, EditOutcome::Unchanged);
    }

    #[test]
    fn move_keyframe_relocates_and_clamps() {
        let mut state = AnimationState::new();
        add(&mut state, "model", "rotation", Channel::Y, 40.0, "2.0").unwrap();
        apply_edit(
            &mut state,
            EditCommand::MoveKeyframe {
                object: "model".into(),
                property: "rotation".into(),
                channel: Channel::Y,
                from: 40,
                to: 130.0,
            },
        )
        .unwrap();
        let track = state.track("model", "rotation", Channel::Y).unwrap();
        assert!(track.key_at(40).is_none());
        assert_eq!(track.key_at(100).map(|k| k.value), Some(Value::Number(2.0)));
    }

    #[test]
    fn move_of_a_missing_keyframe_reports_and_changes_nothing() {
        let mut state = AnimationState::new();
        add(&mut state, "model", "rotation", Channel::Y, 40.0, "2.0").unwrap();
        let before = state.clone();
        let err = apply_edit(
            &mut state,
            EditCommand::MoveKeyframe {
                object: "model".into(),
                property: "rotation".into(),
                channel: Channel::Y,
                from: 10,
                to: 60.0,
            },
        )
        .unwrap_err();
        assert_eq!(err, EditError::MissingKeyframe { position: 10 });
        assert_eq!(state, before);
    }

    #[test]
    fn parse_rejects_non_finite_numbers() {
        assert!(parse_value_input("NaN").is_err());
        assert!(parse_value_input("inf").is_err());
        assert_eq!(parse_value_input(" 0.5 ").unwrap(), Value::Number(0.5));
    }
}
