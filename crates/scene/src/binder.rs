use animation::{AnimationState, PropertyTracks};
use glam::DVec3;
use playback::Progress;
use tracing::warn;

use crate::rig::{ObjectKind, SceneBindings, SceneRig};

/// Per-application accounting: how many channel writes landed and how many
/// object/property targets were skipped for want of a live binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub written: usize,
    pub skipped: usize,
}

/// Evaluates the animation state at `progress` and writes the results onto
/// the bound scene objects. Missing targets are reported and skipped, never
/// fatal; every write is independent, so partial application is safe.
pub fn apply(
    state: &AnimationState,
    rig: &mut SceneRig,
    bindings: &SceneBindings,
    progress: Progress,
) -> ApplyOutcome {
    let percent = progress.as_percent();
    let mut outcome = ApplyOutcome::default();

    for (object_name, properties) in state.iter() {
        let Some(id) = bindings.resolve(object_name) else {
            warn!(object = object_name, "animated object has no scene binding, skipping");
            outcome.skipped += 1;
            continue;
        };
        let Some(object) = rig.get_mut(id) else {
            warn!(object = object_name, "binding points at a removed object, skipping");
            outcome.skipped += 1;
            continue;
        };

        for (property_name, tracks) in properties {
            match tracks {
                PropertyTracks::Vector3 { x, y, z } => {
                    let Some(vector) = object.vector_mut(property_name) else {
                        warn!(
                            object = object_name,
                            property = property_name.as_str(),
                            "target does not accept property, skipping"
                        );
                        outcome.skipped += 1;
                        continue;
                    };
                    // only keyed channels write; an unkeyed axis keeps the
                    // object's current value
                    if !x.is_empty() {
                        if let Some(v) = x.value_at(percent).as_number() {
                            vector.x = v;
                            outcome.written += 1;
                        }
                    }
                    if !y.is_empty() {
                        if let Some(v) = y.value_at(percent).as_number() {
                            vector.y = v;
                            outcome.written += 1;
                        }
                    }
                    if !z.is_empty() {
                        if let Some(v) = z.value_at(percent).as_number() {
                            vector.z = v;
                            outcome.written += 1;
                        }
                    }
                }
                PropertyTracks::Scalar { value } => {
                    if property_name.as_str() != "intensity" || !object.supports(property_name) {
                        warn!(
                            object = object_name,
                            property = property_name.as_str(),
                            "target does not accept property, skipping"
                        );
                        outcome.skipped += 1;
                        continue;
                    }
                    if !value.is_empty() {
                        if let Some(v) = value.value_at(percent).as_number() {
                            object.intensity = v;
                            outcome.written += 1;
                        }
                    }
                }
                PropertyTracks::Color(color) => {
                    if !object.supports("color") {
                        warn!(
                            object = object_name,
                            property = property_name.as_str(),
                            "target does not accept property, skipping"
                        );
                        outcome.skipped += 1;
                        continue;
                    }
                    if let Some(rgb) = color.rgb_at(percent) {
                        object.color = rgb;
                        outcome.written += 1;
                    }
                }
            }
        }
    }

    face_camera_at_model(rig, bindings);
    outcome
}

/// Fixed post step: the camera always ends the tick facing the model, the
/// orbit effect the keyframed camera positions rely on.
fn face_camera_at_model(rig: &mut SceneRig, bindings: &SceneBindings) {
    let Some(camera_id) = bindings.first_of_kind(rig, ObjectKind::Camera) else {
        return;
    };
    let Some(model_id) = bindings.first_of_kind(rig, ObjectKind::Model) else {
        return;
    };
    let Some(target) = rig.get(model_id).map(|model| model.position) else {
        return;
    };
    if let Some(camera) = rig.get_mut(camera_id) {
        camera.rotation = look_at_rotation(camera.position, target);
    }
}

/// Pitch/yaw Euler angles (roll zero, up = +y) that aim an object at
/// `target` along its -z axis.
pub fn look_at_rotation(eye: DVec3, target: DVec3) -> DVec3 {
    let d = eye - target;
    let yaw = d.x.atan2(d.z);
    let pitch = (-d.y).atan2((d.x * d.x + d.z * d.z).sqrt());
    DVec3::new(pitch, yaw, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::{showcase_rig, SceneObject};
    use animation::presets::cinematic_reveal;
    use animation::{AnimationState, ColorTracks, Keyframe, KeyframeTrack, PropertyTracks, Rgb, Value};
    use playback::Progress;

    fn track(keys: &[(u32, f64)]) -> KeyframeTrack {
        KeyframeTrack::from_keys(
            keys.iter()
                .map(|&(position, value)| Keyframe { position, value: Value::Number(value) }),
        )
        .unwrap()
    }

    #[test]
    fn applying_a_sequence_at_zero_matches_its_opening_keyframes() {
        let (mut rig, bindings) = showcase_rig();
        let state = cinematic_reveal();
        apply(&state, &mut rig, &bindings, Progress::ZERO);

        let camera = rig.get(bindings.resolve("camera").unwrap()).unwrap();
        assert_eq!(camera.position, DVec3::new(0.0, 0.0, 1.5));

        let point = rig.get(bindings.resolve("pointLight").unwrap()).unwrap();
        assert_eq!(point.intensity, 0.5);
        assert_eq!(point.color, Rgb::new(0xff, 0xff, 0xff));

        let rim = rig.get(bindings.resolve("rimLight").unwrap()).unwrap();
        assert_eq!(rim.intensity, 0.0);
        // z is never keyed, so the rig's initial placement survives
        assert_eq!(rim.position, DVec3::new(0.0, 4.0, -3.0));
    }

    #[test]
    fn the_camera_faces_the_model_after_every_apply() {
        let (mut rig, bindings) = showcase_rig();
        apply(&cinematic_reveal(), &mut rig, &bindings, Progress::from_fraction(0.25));

        let camera = rig.get(bindings.resolve("camera").unwrap()).unwrap();
        let model = rig.get(bindings.resolve("model").unwrap()).unwrap();
        assert_eq!(
            camera.rotation,
            look_at_rotation(camera.position, model.position)
        );
    }

    #[test]
    fn unbound_objects_are_skipped_without_aborting_the_rest() {
        let (mut rig, bindings) = showcase_rig();
        let mut state = cinematic_reveal();
        state.insert_property(
            "ghostLight",
            "intensity",
            PropertyTracks::Scalar { value: track(&[(0, 1.0)]) },
        );
        let outcome = apply(&state, &mut rig, &bindings, Progress::ZERO);
        assert_eq!(outcome.skipped, 1);
        let point = rig.get(bindings.resolve("pointLight").unwrap()).unwrap();
        assert_eq!(point.intensity, 0.5);
    }

    #[test]
    fn unsupported_properties_are_skipped_per_target() {
        let (mut rig, bindings) = showcase_rig();
        let mut state = AnimationState::new();
        state.insert_property(
            "model",
            "intensity",
            PropertyTracks::Scalar { value: track(&[(0, 2.0)]) },
        );
        let outcome = apply(&state, &mut rig, &bindings, Progress::ZERO);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.written, 0);
    }

    #[test]
    fn legacy_rgb_tracks_resolve_to_one_color_write() {
        let (mut rig, bindings) = showcase_rig();
        let mut state = AnimationState::new();
        state.insert_property(
            "pointLight",
            "color",
            PropertyTracks::Color(ColorTracks::LegacyRgb {
                r: track(&[(0, 1.0)]),
                g: track(&[(0, 0.5)]),
                b: track(&[(0, 0.0)]),
            }),
        );
        apply(&state, &mut rig, &bindings, Progress::ZERO);
        let point = rig.get(bindings.resolve("pointLight").unwrap()).unwrap();
        assert_eq!(point.color, Rgb::new(255, 127, 0));
    }

    #[test]
    fn midpoint_color_interpolation_lands_on_the_scene_object() {
        let mut rig = SceneRig::new();
        let mut bindings = SceneBindings::new();
        let light = rig.add(SceneObject::new(ObjectKind::PointLight));
        bindings.bind("pointLight", light);

        let mut state = AnimationState::new();
        let mut value = KeyframeTrack::new();
        value
            .insert_or_update(0, Value::Color(Rgb::new(0x00, 0x00, 0xff)))
            .unwrap();
        value
            .insert_or_update(100, Value::Color(Rgb::new(0xff, 0x00, 0xff)))
            .unwrap();
        state.insert_property(
            "pointLight",
            "color",
            PropertyTracks::Color(ColorTracks::Hex { value }),
        );

        apply(&state, &mut rig, &bindings, Progress::from_fraction(0.5));
        let light = rig.get(bindings.resolve("pointLight").unwrap()).unwrap();
        assert_eq!(light.color, Rgb::new(0x7f, 0x00, 0xff));
    }

    #[test]
    fn look_at_points_down_negative_z_by_default() {
        let rotation = look_at_rotation(DVec3::new(0.0, 0.0, 5.0), DVec3::ZERO);
        assert_eq!(rotation, DVec3::ZERO);
        let overhead = look_at_rotation(DVec3::new(0.0, 5.0, 0.0), DVec3::ZERO);
        assert!((overhead.x + std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }
}
