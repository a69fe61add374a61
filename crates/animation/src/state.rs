use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::track::KeyframeTrack;
use crate::value::{Rgb, ValueKind};

#[derive(Debug, Error, PartialEq)]
pub enum StateError {
    #[error("unknown channel {channel:?} for {object}.{property}")]
    UnknownChannel {
        object: String,
        property: String,
        channel: String,
    },
    #[error("{object}.color mixes the unified value channel with legacy r/g/b channels")]
    MixedColorVariants { object: String },
    #[error("{object}.{property}.{channel} holds {found:?} keyframes where {expected:?} are required")]
    WrongValueKind {
        object: String,
        property: String,
        channel: String,
        expected: ValueKind,
        found: ValueKind,
    },
}

/// The fixed channel layout of a property, decided by its name the moment
/// the property is established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    Vector3,
    Scalar,
    Color,
}

impl PropertyKind {
    pub fn for_property(name: &str) -> PropertyKind {
        match name {
            "position" | "rotation" | "scale" => PropertyKind::Vector3,
            "color" => PropertyKind::Color,
            _ => PropertyKind::Scalar,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    X,
    Y,
    Z,
    Value,
    R,
    G,
    B,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::X => "x",
            Channel::Y => "y",
            Channel::Z => "z",
            Channel::Value => "value",
            Channel::R => "r",
            Channel::G => "g",
            Channel::B => "b",
        }
    }

    pub fn parse(name: &str) -> Option<Channel> {
        match name {
            "x" => Some(Channel::X),
            "y" => Some(Channel::Y),
            "z" => Some(Channel::Z),
            "value" => Some(Channel::Value),
            "r" => Some(Channel::R),
            "g" => Some(Channel::G),
            "b" => Some(Channel::B),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Color channels come in two shapes: the unified hex-keyframe track the
/// editor authors, and the legacy numeric r/g/b triple kept for read
/// compatibility. `rgb_at` is the one conversion to a canonical color.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorTracks {
    Hex { value: KeyframeTrack },
    LegacyRgb {
        r: KeyframeTrack,
        g: KeyframeTrack,
        b: KeyframeTrack,
    },
}

impl ColorTracks {
    pub fn empty() -> Self {
        ColorTracks::Hex { value: KeyframeTrack::new() }
    }

    /// Canonical color at `percent`, or `None` when nothing is keyed.
    pub fn rgb_at(&self, percent: f64) -> Option<Rgb> {
        match self {
            ColorTracks::Hex { value } => {
                if value.is_empty() {
                    return None;
                }
                value.value_at(percent).as_color()
            }
            ColorTracks::LegacyRgb { r, g, b } => {
                if r.is_empty() && g.is_empty() && b.is_empty() {
                    return None;
                }
                let component = |track: &KeyframeTrack| {
                    track.value_at(percent).as_number().unwrap_or(0.0)
                };
                Some(Rgb::from_unit(component(r), component(g), component(b)))
            }
        }
    }
}

/// Channel tracks of one property, in the shape its kind dictates.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyTracks {
    Vector3 {
        x: KeyframeTrack,
        y: KeyframeTrack,
        z: KeyframeTrack,
    },
    Scalar { value: KeyframeTrack },
    Color(ColorTracks),
}

impl PropertyTracks {
    pub fn empty_for(kind: PropertyKind) -> Self {
        match kind {
            PropertyKind::Vector3 => PropertyTracks::Vector3 {
                x: KeyframeTrack::new(),
                y: KeyframeTrack::new(),
                z: KeyframeTrack::new(),
            },
            PropertyKind::Scalar => PropertyTracks::Scalar { value: KeyframeTrack::new() },
            PropertyKind::Color => PropertyTracks::Color(ColorTracks::empty()),
        }
    }

    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyTracks::Vector3 { .. } => PropertyKind::Vector3,
            PropertyTracks::Scalar { .. } => PropertyKind::Scalar,
            PropertyTracks::Color(_) => PropertyKind::Color,
        }
    }

    pub fn channel(&self, channel: Channel) -> Option<&KeyframeTrack> {
        match (self, channel) {
            (PropertyTracks::Vector3 { x, .. }, Channel::X) => Some(x),
            (PropertyTracks::Vector3 { y, .. }, Channel::Y) => Some(y),
            (PropertyTracks::Vector3 { z, .. }, Channel::Z) => Some(z),
            (PropertyTracks::Scalar { value }, Channel::Value) => Some(value),
            (PropertyTracks::Color(ColorTracks::Hex { value }), Channel::Value) => Some(value),
            (PropertyTracks::Color(ColorTracks::LegacyRgb { r, .. }), Channel::R) => Some(r),
            (PropertyTracks::Color(ColorTracks::LegacyRgb { g, .. }), Channel::G) => Some(g),
            (PropertyTracks::Color(ColorTracks::LegacyRgb { b, .. }), Channel::B) => Some(b),
            _ => None,
        }
    }

    pub fn channel_mut(&mut self, channel: Channel) -> Option<&mut KeyframeTrack> {
        match (self, channel) {
            (PropertyTracks::Vector3 { x, .. }, Channel::X) => Some(x),
            (PropertyTracks::Vector3 { y, .. }, Channel::Y) => Some(y),
            (PropertyTracks::Vector3 { z, .. }, Channel::Z) => Some(z),
            (PropertyTracks::Scalar { value }, Channel::Value) => Some(value),
            (PropertyTracks::Color(ColorTracks::Hex { value }), Channel::Value) => Some(value),
            (PropertyTracks::Color(ColorTracks::LegacyRgb { r, .. }), Channel::R) => Some(r),
            (PropertyTracks::Color(ColorTracks::LegacyRgb { g, .. }), Channel::G) => Some(g),
            (PropertyTracks::Color(ColorTracks::LegacyRgb { b, .. }), Channel::B) => Some(b),
            _ => None,
        }
    }

    /// Channel tracks in display order.
    pub fn channels(&self) -> Vec<(Channel, &KeyframeTrack)> {
        match self {
            PropertyTracks::Vector3 { x, y, z } => {
                vec![(Channel::X, x), (Channel::Y, y), (Channel::Z, z)]
            }
            PropertyTracks::Scalar { value } => vec![(Channel::Value, value)],
            PropertyTracks::Color(ColorTracks::Hex { value }) => vec![(Channel::Value, value)],
            PropertyTracks::Color(ColorTracks::LegacyRgb { r, g, b }) => {
                vec![(Channel::R, r), (Channel::G, g), (Channel::B, b)]
            }
        }
    }
}

pub type ObjectTracks = BTreeMap<String, PropertyTracks>;

type RawAnimationData = BTreeMap<String, BTreeMap<String, BTreeMap<String, KeyframeTrack>>>;

/// The complete authored animation: object name -> property name -> channel
/// tracks. The editor operations are the sole writers; the scene binder
/// borrows it read-only per evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationState {
    objects: BTreeMap<String, ObjectTracks>,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ObjectTracks)> {
        self.objects.iter().map(|(name, tracks)| (name.as_str(), tracks))
    }

    pub fn object(&self, name: &str) -> Option<&ObjectTracks> {
        self.objects.get(name)
    }

    pub fn property(&self, object: &str, property: &str) -> Option<&PropertyTracks> {
        self.objects.get(object)?.get(property)
    }

    pub fn track(&self, object: &str, property: &str, channel: Channel) -> Option<&KeyframeTrack> {
        self.property(object, property)?.channel(channel)
    }

    pub fn track_mut(
        &mut self,
        object: &str,
        property: &str,
        channel: Channel,
    ) -> Option<&mut KeyframeTrack> {
        self.objects.get_mut(object)?.get_mut(property)?.channel_mut(channel)
    }

    /// Establishes the channel set for `object.property` when absent;
    /// existing tracks are left untouched.
    pub fn ensure_property(&mut self, object: &str, property: &str) -> &mut PropertyTracks {
        self.objects
            .entry(object.to_string())
            .or_default()
            .entry(property.to_string())
            .or_insert_with(|| PropertyTracks::empty_for(PropertyKind::for_property(property)))
    }

    /// Installs fully-built channel tracks. Authored preset data comes in
    /// through here; external data goes through deserialization, which
    /// validates against the property schema.
    pub fn insert_property(
        &mut self,
        object: impl Into<String>,
        property: impl Into<String>,
        tracks: PropertyTracks,
    ) {
        self.objects
            .entry(object.into())
            .or_default()
            .insert(property.into(), tracks);
    }

    fn from_raw(raw: RawAnimationData) -> Result<Self, StateError> {
        let mut state = AnimationState::new();
        for (object, properties) in raw {
            for (property, mut channels) in properties {
                let tracks = match PropertyKind::for_property(&property) {
                    PropertyKind::Vector3 => {
                        let x = take_numeric(&mut channels, &object, &property, "x")?;
                        let y = take_numeric(&mut channels, &object, &property, "y")?;
                        let z = take_numeric(&mut channels, &object, &property, "z")?;
                        reject_leftovers(&channels, &object, &property)?;
                        PropertyTracks::Vector3 { x, y, z }
                    }
                    PropertyKind::Scalar => {
                        let value = take_numeric(&mut channels, &object, &property, "value")?;
                        reject_leftovers(&channels, &object, &property)?;
                        PropertyTracks::Scalar { value }
                    }
                    PropertyKind::Color => {
                        let has_unified = channels.contains_key("value");
                        let has_legacy = ["r", "g", "b"].iter().any(|c| channels.contains_key(*c));
                        if has_unified && has_legacy {
                            return Err(StateError::MixedColorVariants { object: object.clone() });
                        }
                        let color = if has_legacy {
                            let r = take_numeric(&mut channels, &object, &property, "r")?;
                            let g = take_numeric(&mut channels, &object, &property, "g")?;
                            let b = take_numeric(&mut channels, &object, &property, "b")?;
                            ColorTracks::LegacyRgb { r, g, b }
                        } else {
                            let value = channels.remove("value").unwrap_or_default();
                            require_kind(&value, ValueKind::Color, &object, &property, "value")?;
                            ColorTracks::Hex { value }
                        };
                        reject_leftovers(&channels, &object, &property)?;
                        PropertyTracks::Color(color)
                    }
                };
                state.insert_property(object.clone(), property, tracks);
            }
        }
        Ok(state)
    }

    fn to_raw(&self) -> BTreeMap<&str, BTreeMap<&str, BTreeMap<&'static str, &KeyframeTrack>>> {
        self.objects
            .iter()
            .map(|(object, properties)| {
                let properties = properties
                    .iter()
                    .map(|(property, tracks)| {
                        let channels = tracks
                            .channels()
                            .into_iter()
                            .map(|(channel, track)| (channel.as_str(), track))
                            .collect();
                        (property.as_str(), channels)
                    })
                    .collect();
                (object.as_str(), properties)
            })
            .collect()
    }
}

fn take_numeric(
    channels: &mut BTreeMap<String, KeyframeTrack>,
    object: &str,
    property: &str,
    channel: &str,
) -> Result<KeyframeTrack, StateError> {
    let track = channels.remove(channel).unwrap_or_default();
    require_kind(&track, ValueKind::Number, object, property, channel)?;
    Ok(track)
}

fn require_kind(
    track: &KeyframeTrack,
    expected: ValueKind,
    object: &str,
    property: &str,
    channel: &str,
) -> Result<(), StateError> {
    match track.kind() {
        Some(found) if found != expected => Err(StateError::WrongValueKind {
            object: object.to_string(),
            property: property.to_string(),
            channel: channel.to_string(),
            expected,
            found,
        }),
        _ => Ok(()),
    }
}

fn reject_leftovers(
    channels: &BTreeMap<String, KeyframeTrack>,
    object: &str,
    property: &str,
) -> Result<(), StateError> {
    if let Some(channel) = channels.keys().next() {
        return Err(StateError::UnknownChannel {
            object: object.to_string(),
            property: property.to_string(),
            channel: channel.clone(),
        });
    }
    Ok(())
}

impl Serialize for AnimationState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_raw().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AnimationState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawAnimationData::deserialize(deserializer)?;
        AnimationState::from_raw(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn property_kind_follows_the_property_name() {
        assert_eq!(PropertyKind::for_property("position"), PropertyKind::Vector3);
        assert_eq!(PropertyKind::for_property("rotation"), PropertyKind::Vector3);
        assert_eq!(PropertyKind::for_property("scale"), PropertyKind::Vector3);
        assert_eq!(PropertyKind::for_property("color"), PropertyKind::Color);
        assert_eq!(PropertyKind::for_property("intensity"), PropertyKind::Scalar);
    }

    #[test]
    fn ensure_property_is_idempotent() {
        let mut state = AnimationState::new();
        state.ensure_property("model", "rotation");
        state
            .track_mut("model", "rotation", Channel::Y)
            .unwrap()
            .insert_or_update(50, Value::Number(3.14))
            .unwrap();
        state.ensure_property("model", "rotation");
        let track = state.track("model", "rotation", Channel::Y).unwrap();
        assert_eq!(track.len(), 1);
    }

    #[test]
    fn reads_the_unified_color_shape() {
        let json = r##"{
            "pointLight": {
                "color": {
                    "value": [
                        { "position": 0, "value": "#ffffff" },
                        { "position": 100, "value": "#ff4040" }
                    ]
                }
            }
        }"##;
        let state: AnimationState = serde_json::from_str(json).unwrap();
        let tracks = state.property("pointLight", "color").unwrap();
        let PropertyTracks::Color(color) = tracks else {
            panic!("expected color tracks");
        };
        assert_eq!(color.rgb_at(0.0), Some(Rgb::new(0xff, 0xff, 0xff)));
    }

    #[test]
    fn reads_the_legacy_rgb_color_shape() {
        let json = r#"{
            "pointLight": {
                "color": {
                    "r": [ { "position": 0, "value": 1.0 } ],
                    "g": [ { "position": 0, "value": 0.5 } ],
                    "b": [ { "position": 0, "value": 0.0 } ]
                }
            }
        }"#;
        let state: AnimationState = serde_json::from_str(json).unwrap();
        let PropertyTracks::Color(color) = state.property("pointLight", "color").unwrap() else {
            panic!("expected color tracks");
        };
        assert!(matches!(color, ColorTracks::LegacyRgb { .. }));
        assert_eq!(color.rgb_at(0.0), Some(Rgb::new(255, 127, 0)));
    }

    #[test]
    fn rejects_mixed_color_variants() {
        let json = r##"{
            "pointLight": {
                "color": {
                    "value": [ { "position": 0, "value": "#ffffff" } ],
                    "r": [ { "position": 0, "value": 1.0 } ]
                }
            }
        }"##;
        assert!(serde_json::from_str::<AnimationState>(json).is_err());
    }

    #[test]
    fn rejects_unknown_channels() {
        let json = r#"{
            "model": {
                "position": { "w": [ { "position": 0, "value": 1.0 } ] }
            }
        }"#;
        assert!(serde_json::from_str::<AnimationState>(json).is_err());
    }

    #[test]
    fn rejects_numeric_keyframes_on_a_hex_color_channel() {
        let json = r#"{
            "pointLight": {
                "color": { "value": [ { "position": 0, "value": 0.5 } ] }
            }
        }"#;
        assert!(serde_json::from_str::<AnimationState>(json).is_err());
    }

    #[test]
    fn partial_vector_channels_deserialize_with_empty_siblings() {
        let json = r#"{
            "model": {
                "position": { "y": [ { "position": 0, "value": 0.3 } ] }
            }
        }"#;
        let state: AnimationState = serde_json::from_str(json).unwrap();
        let tracks = state.property("model", "position").unwrap();
        assert!(tracks.channel(Channel::X).unwrap().is_empty());
        assert_eq!(tracks.channel(Channel::Y).unwrap().len(), 1);
    }

    #[test]
    fn empty_color_tracks_yield_no_color() {
        assert_eq!(ColorTracks::empty().rgb_at(50.0), None);
    }
}
