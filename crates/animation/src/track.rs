use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::value::{lerp_value, Value, ValueKind};

/// Keyframe positions are integer percent along the timeline.
pub const TIMELINE_END: u32 = 100;

#[derive(Debug, Error, PartialEq)]
pub enum TrackError {
    #[error("keyframe value kind {found:?} does not match the track's {expected:?}")]
    MixedValueKinds { expected: ValueKind, found: ValueKind },
    #[error("no keyframe at position {0}")]
    NoKeyframeAt(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub position: u32,
    pub value: Value,
}

/// Ordered keyframes for one channel: unique by position, sorted ascending
/// after every mutation, and all of one value kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyframeTrack {
    keys: Vec<Keyframe>,
}

impl KeyframeTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_keys(keys: impl IntoIterator<Item = Keyframe>) -> Result<Self, TrackError> {
        let mut track = Self::new();
        for key in keys {
            track.insert_or_update(key.position, key.value)?;
        }
        Ok(track)
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The value kind shared by every keyframe, or `None` while empty.
    pub fn kind(&self) -> Option<ValueKind> {
        self.keys.first().map(|k| k.value.kind())
    }

    pub fn key_at(&self, position: u32) -> Option<&Keyframe> {
        self.keys.iter().find(|k| k.position == position)
    }

    /// Interpolated value at `percent` in the [0, 100] position domain.
    ///
    /// Empty tracks evaluate to zero, singletons are constant, and inputs
    /// outside the keyed range clamp to the first/last value rather than
    /// extrapolating.
    pub fn value_at(&self, percent: f64) -> Value {
        let keys = &self.keys;
        match keys.len() {
            0 => Value::Number(0.0),
            1 => keys[0].value,
            _ => {
                let first = keys[0];
                let last = keys[keys.len() - 1];
                if percent <= first.position as f64 {
                    return first.value;
                }
                if percent >= last.position as f64 {
                    return last.value;
                }
                for pair in keys.windows(2) {
                    let (k1, k2) = (pair[0], pair[1]);
                    if percent >= k1.position as f64 && percent <= k2.position as f64 {
                        let span = (k2.position - k1.position) as f64;
                        // span of zero cannot arise from the unique-position
                        // invariant; guard the division anyway
                        let t = if span == 0.0 {
                            0.0
                        } else {
                            (percent - k1.position as f64) / span
                        };
                        return lerp_value(k1.value, k2.value, t);
                    }
                }
                last.value
            }
        }
    }

    /// Overwrites the keyframe at an existing position, otherwise inserts
    /// and re-sorts. Rejects a value whose kind differs from the track's.
    pub fn insert_or_update(&mut self, position: u32, value: Value) -> Result<(), TrackError> {
        if let Some(expected) = self.kind() {
            if expected != value.kind() {
                return Err(TrackError::MixedValueKinds {
                    expected,
                    found: value.kind(),
                });
            }
        }
        match self.keys.iter_mut().find(|k| k.position == position) {
            Some(existing) => existing.value = value,
            None => {
                self.keys.push(Keyframe { position, value });
                self.keys.sort_by_key(|k| k.position);
            }
        }
        Ok(())
    }

    /// Removes the keyframe at `position`; `None` when absent.
    pub fn remove_at(&mut self, position: u32) -> Option<Keyframe> {
        let index = self.keys.iter().position(|k| k.position == position)?;
        Some(self.keys.remove(index))
    }

    /// Repositions one keyframe as a compound remove-then-insert. The track
    /// is left untouched unless the whole move succeeds.
    pub fn move_key(&mut self, from: u32, to: u32) -> Result<(), TrackError> {
        if from == to {
            return self
                .key_at(from)
                .map(|_| ())
                .ok_or(TrackError::NoKeyframeAt(from));
        }
        let taken = self.remove_at(from).ok_or(TrackError::NoKeyframeAt(from))?;
        if let Err(err) = self.insert_or_update(to, taken.value) {
            self.keys.push(taken);
            self.keys.sort_by_key(|k| k.position);
            return Err(err);
        }
        Ok(())
    }
}

impl Serialize for KeyframeTrack {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.keys.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for KeyframeTrack {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let keys = Vec::<Keyframe>::deserialize(deserializer)?;
        KeyframeTrack::from_keys(keys).map_err(serde::de::Error::custom)
    }
}
