//! Scene binding: the animatable object rig, the name -> handle binding
//! table supplied by the rendering side, and the binder that writes an
//! evaluated animation state onto it.

pub mod binder;
pub mod rig;

pub use binder::{apply, look_at_rotation, ApplyOutcome};
pub use rig::{showcase_rig, ObjectId, ObjectKind, SceneBindings, SceneObject, SceneRig};
