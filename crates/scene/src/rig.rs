use std::collections::BTreeMap;

use animation::Rgb;
use glam::DVec3;

/// What a bound object is, which in turn gates the properties it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Model,
    Camera,
    PointLight,
    SpotLight,
    AmbientLight,
}

/// One externally-owned animatable target. The binder writes interpolated
/// values straight onto these fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub kind: ObjectKind,
    pub position: DVec3,
    pub rotation: DVec3,
    pub scale: DVec3,
    pub color: Rgb,
    pub intensity: f64,
}

impl SceneObject {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            position: DVec3::ZERO,
            rotation: DVec3::ZERO,
            scale: DVec3::ONE,
            color: Rgb::WHITE,
            intensity: 1.0,
        }
    }

    pub fn at(mut self, x: f64, y: f64, z: f64) -> Self {
        self.position = DVec3::new(x, y, z);
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = intensity;
        self
    }

    /// Whether this object accepts writes to the named property.
    pub fn supports(&self, property: &str) -> bool {
        match self.kind {
            ObjectKind::Model => matches!(property, "position" | "rotation" | "scale"),
            ObjectKind::Camera => matches!(property, "position" | "rotation"),
            ObjectKind::PointLight | ObjectKind::SpotLight => {
                matches!(property, "position" | "color" | "intensity")
            }
            ObjectKind::AmbientLight => matches!(property, "color" | "intensity"),
        }
    }

    pub fn vector_mut(&mut self, property: &str) -> Option<&mut DVec3> {
        if !self.supports(property) {
            return None;
        }
        match property {
            "position" => Some(&mut self.position),
            "rotation" => Some(&mut self.rotation),
            "scale" => Some(&mut self.scale),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObjectId(usize);

/// The live scene: every renderable object the binding table can point at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneRig {
    objects: Vec<SceneObject>,
}

impl SceneRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.0)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Name -> object handle table supplied by the rendering side. Rebuilt
/// wholesale whenever the renderable set changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneBindings {
    map: BTreeMap<String, ObjectId>,
}

impl SceneBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, id: ObjectId) {
        self.map.insert(name.into(), id);
    }

    pub fn resolve(&self, name: &str) -> Option<ObjectId> {
        self.map.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ObjectId)> {
        self.map.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn first_of_kind(&self, rig: &SceneRig, kind: ObjectKind) -> Option<ObjectId> {
        self.map
            .values()
            .copied()
            .find(|id| rig.get(*id).map(|object| object.kind == kind).unwrap_or(false))
    }
}

/// The default showcase rig: a model at the origin, the camera pulled back
/// on z, a warm accent point light, a blue rim spot and a dim ambient fill,
/// each bound under the name the animation sequences use.
pub fn showcase_rig() -> (SceneRig, SceneBindings) {
    let mut rig = SceneRig::new();
    let mut bindings = SceneBindings::new();

    let model = rig.add(SceneObject::new(ObjectKind::Model));
    let camera = rig.add(SceneObject::new(ObjectKind::Camera).at(0.0, 0.0, 5.0));
    let point = rig.add(
        SceneObject::new(ObjectKind::PointLight)
            .at(-1.0, 1.0, 2.0)
            .with_intensity(0.3),
    );
    let rim = rig.add(
        SceneObject::new(ObjectKind::SpotLight)
            .at(0.0, 4.0, -3.0)
            .with_color(Rgb::new(0x00, 0x88, 0xff))
            .with_intensity(0.8),
    );
    let ambient = rig.add(SceneObject::new(ObjectKind::AmbientLight).with_intensity(0.2));

    bindings.bind("model", model);
    bindings.bind("camera", camera);
    bindings.bind("pointLight", point);
    bindings.bind("rimLight", rim);
    bindings.bind("ambientLight", ambient);

    (rig, bindings)
}
