//! Built-in animation sequences for the showcase scene.

use thiserror::Error;

use crate::state::{AnimationState, ColorTracks, PropertyTracks};
use crate::track::KeyframeTrack;
use crate::value::{Rgb, Value};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequenceError {
    #[error("unknown animation sequence {0:?}")]
    UnknownSequence(String),
}

pub fn sequence_names() -> &'static [&'static str] {
    &["cinematicReveal", "simpleShowcase", "technicalInspection"]
}

/// Resolves a named sequence to a fresh animation state. Unknown names are
/// reported and leave the caller's current state untouched.
pub fn load_sequence(name: &str) -> Result<AnimationState, SequenceError> {
    match name {
        "cinematicReveal" => Ok(cinematic_reveal()),
        "simpleShowcase" => Ok(simple_showcase()),
        "technicalInspection" => Ok(technical_inspection()),
        other => Err(SequenceError::UnknownSequence(other.to_string())),
    }
}

fn number_track(keys: &[(u32, f64)]) -> KeyframeTrack {
    let mut track = KeyframeTrack::new();
    for &(position, value) in keys {
        // same-kind inserts into a numeric track cannot fail
        let _ = track.insert_or_update(position, Value::Number(value));
    }
    track
}

fn color_track(keys: &[(u32, Rgb)]) -> KeyframeTrack {
    let mut track = KeyframeTrack::new();
    for &(position, color) in keys {
        let _ = track.insert_or_update(position, Value::Color(color));
    }
    track
}

fn vector3(x: &[(u32, f64)], y: &[(u32, f64)], z: &[(u32, f64)]) -> PropertyTracks {
    PropertyTracks::Vector3 {
        x: number_track(x),
        y: number_track(y),
        z: number_track(z),
    }
}

fn scalar(value: &[(u32, f64)]) -> PropertyTracks {
    PropertyTracks::Scalar { value: number_track(value) }
}

fn color(value: &[(u32, Rgb)]) -> PropertyTracks {
    PropertyTracks::Color(ColorTracks::Hex { value: color_track(value) })
}

/// Camera starts close and pulls back while the model holds still until a
/// final spin; the lights shift from neutral white toward red.
pub fn cinematic_reveal() -> AnimationState {
    let mut state = AnimationState::new();

    state.insert_property(
        "model",
        "rotation",
        vector3(
            &[(0, 0.0), (75, 0.0), (100, 1.57)],
            &[(0, 0.0), (75, 0.0), (100, 3.14)],
            &[(0, 0.0), (75, 0.0), (90, 0.4), (100, 0.0)],
        ),
    );
    state.insert_property(
        "model",
        "position",
        vector3(&[], &[(0, 0.0), (75, 0.0), (90, 0.3), (100, 0.0)], &[]),
    );

    state.insert_property(
        "camera",
        "position",
        vector3(
            &[(0, 0.0), (25, 1.0), (50, 0.0), (75, -1.0), (100, 0.0)],
            &[(0, 0.0), (25, 0.5), (50, 1.0), (75, 0.5), (100, 0.0)],
            &[(0, 1.5), (25, 3.0), (50, 5.0), (75, 4.0), (100, 5.0)],
        ),
    );
    state.insert_property(
        "camera",
        "rotation",
        vector3(&[(0, -0.2), (50, -0.1), (100, -0.3)], &[], &[]),
    );

    state.insert_property(
        "pointLight",
        "intensity",
        scalar(&[(0, 0.5), (25, 1.0), (50, 2.0), (75, 2.5), (100, 3.0)]),
    );
    state.insert_property(
        "pointLight",
        "color",
        color(&[
            (0, Rgb::new(0xff, 0xff, 0xff)),
            (25, Rgb::new(0x00, 0x80, 0xff)),
            (50, Rgb::new(0x33, 0x55, 0xaa)),
            (75, Rgb::new(0xff, 0x20, 0x20)),
            (100, Rgb::new(0xff, 0x40, 0x40)),
        ]),
    );

    state.insert_property(
        "rimLight",
        "intensity",
        scalar(&[(0, 0.0), (60, 0.0), (75, 0.5), (85, 1.5), (100, 2.0)]),
    );
    state.insert_property(
        "rimLight",
        "position",
        vector3(
            &[(0, 0.0), (75, 0.0), (85, -2.0), (100, -3.0)],
            &[(0, 4.0), (75, 4.0), (100, 5.0)],
            &[],
        ),
    );
    state.insert_property(
        "rimLight",
        "color",
        color(&[
            (0, Rgb::new(0x00, 0x88, 0xff)),
            (75, Rgb::new(0x00, 0x44, 0xff)),
            (100, Rgb::new(0x80, 0x00, 0xff)),
        ]),
    );

    state
}

/// A full model turn with subtle camera drift and near-constant lighting.
pub fn simple_showcase() -> AnimationState {
    let mut state = AnimationState::new();

    state.insert_property(
        "model",
        "rotation",
        vector3(&[], &[(0, 0.0), (100, 6.28)], &[]),
    );

    state.insert_property(
        "camera",
        "position",
        vector3(
            &[(0, 0.0), (50, 0.8), (100, 0.0)],
            &[(0, 0.5), (50, 0.8), (100, 0.5)],
            &[(0, 5.0), (50, 4.5), (100, 5.0)],
        ),
    );
    state.insert_property(
        "camera",
        "rotation",
        vector3(&[(0, -0.1), (50, -0.15), (100, -0.1)], &[], &[]),
    );

    state.insert_property(
        "pointLight",
        "intensity",
        scalar(&[(0, 1.0), (50, 1.2), (100, 1.0)]),
    );
    state.insert_property(
        "pointLight",
        "color",
        color(&[
            (0, Rgb::new(0xff, 0xff, 0xff)),
            (50, Rgb::new(0xff, 0xfa, 0xf0)),
            (100, Rgb::new(0xff, 0xff, 0xff)),
        ]),
    );

    state.insert_property(
        "ambientLight",
        "intensity",
        scalar(&[(0, 0.5), (50, 0.6), (100, 0.5)]),
    );

    state.insert_property(
        "rimLight",
        "intensity",
        scalar(&[(0, 0.8), (50, 1.0), (100, 0.8)]),
    );
    state.insert_property(
        "rimLight",
        "color",
        color(&[
            (0, Rgb::new(0x44, 0x66, 0xff)),
            (50, Rgb::new(0x44, 0x77, 0xff)),
            (100, Rgb::new(0x44, 0x66, 0xff)),
        ]),
    );

    state
}

/// A slow half-orbit through the model with the model itself static. The
/// camera y-rotation is left unkeyed; the binder's face-the-model step owns
/// that axis.
pub fn technical_inspection() -> AnimationState {
    let mut state = AnimationState::new();

    state.insert_property(
        "camera",
        "position",
        vector3(
            &[(0, 0.0), (25, 3.5), (50, 0.0), (75, -3.5), (100, 0.0)],
            &[(0, 2.0), (50, 3.0), (100, 2.0)],
            &[(0, 5.0), (25, 3.5), (50, 0.0), (75, 3.5), (100, 5.0)],
        ),
    );
    state.insert_property(
        "camera",
        "rotation",
        vector3(&[(0, -0.2), (50, -0.4), (100, -0.2)], &[], &[]),
    );

    state.insert_property(
        "pointLight",
        "intensity",
        scalar(&[(0, 1.5), (50, 2.0), (100, 1.5)]),
    );
    state.insert_property(
        "pointLight",
        "color",
        color(&[(0, Rgb::new(0xff, 0xff, 0xff)), (100, Rgb::new(0xff, 0xff, 0xff))]),
    );

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Channel;

    #[test]
    fn every_advertised_sequence_loads() {
        for name in sequence_names() {
            assert!(load_sequence(name).is_ok(), "sequence {name} failed to load");
        }
    }

    #[test]
    fn unknown_sequence_is_reported() {
        assert_eq!(
            load_sequence("dollyZoom"),
            Err(SequenceError::UnknownSequence("dollyZoom".to_string()))
        );
    }

    #[test]
    fn cinematic_reveal_opens_with_the_camera_close() {
        let state = cinematic_reveal();
        let z = state.track("camera", "position", Channel::Z).unwrap();
        assert_eq!(z.value_at(0.0), Value::Number(1.5));
        assert_eq!(z.value_at(50.0), Value::Number(5.0));
    }

    #[test]
    fn cinematic_reveal_holds_the_model_until_the_spin() {
        let state = cinematic_reveal();
        let y = state.track("model", "rotation", Channel::Y).unwrap();
        assert_eq!(y.value_at(40.0), Value::Number(0.0));
        assert_eq!(y.value_at(100.0), Value::Number(3.14));
    }

    #[test]
    fn simple_showcase_accent_light_warms_at_midpoint() {
        let state = simple_showcase();
        let track = state.track("pointLight", "color", Channel::Value).unwrap();
        assert_eq!(
            track.value_at(50.0),
            Value::Color(Rgb::new(0xff, 0xfa, 0xf0))
        );
    }

    #[test]
    fn technical_inspection_does_not_animate_the_model() {
        let state = technical_inspection();
        assert!(state.object("model").is_none());
    }
}
