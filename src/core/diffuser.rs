// Copyright @yucwang 2023

use crate::core::error::{RadiosityError, RadiosityResult};
use crate::core::interaction::IntersectionParams;
use crate::core::optics::Optics;
use crate::core::primitive::Primitive;
use crate::materials::lambertian_diffuse::LambertianDiffuse;
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f, EPSILON, PI };
use crate::math::numeric::{ safe_acos, safe_asin };

use std::fmt;
use std::sync::Arc;

/// Side of a diffuser. `Front` is the side the geometric normal points to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Face {
    Front = 0,
    Back = 1,
}

impl Face {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// `1` selects the back face, every other code the front face.
    pub fn from_code(code: u8) -> Self {
        if code == 1 { Face::Back } else { Face::Front }
    }

    pub fn opposite(self) -> Self {
        match self {
            Face::Front => Face::Back,
            Face::Back => Face::Front,
        }
    }
}

const ONE_SIDED: [Face; 1] = [Face::Front];
const TWO_SIDED: [Face; 2] = [Face::Front, Face::Back];

/// Hands out diffuser identifiers. Identifiers are dense, start at zero and
/// are never reused, so they double as indices of the energy system.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of identifiers issued so far.
    pub fn count(&self) -> usize {
        self.next as usize
    }
}

pub enum DiffuserKind {
    /// Physical one-sided surface; reflects only.
    Opaque { id: u32 },
    /// Virtual detector; measured but kept out of the energy balance.
    Sensor { id: u32 },
    /// Physical two-sided surface with one identifier and optics per face.
    Translucent { ids: [u32; 2], back: Arc<dyn Optics>, active: Face },
}

/// A surface element exchanging radiative energy with the rest of the scene.
///
/// The diffuser owns its geometry and shares its optics. The translucent
/// variant keeps an active face; the `*_of(face)` accessors read a given face
/// without touching that state and are what the tracer uses.
pub struct Diffuser {
    primitive: Box<dyn Primitive>,
    optics: Arc<dyn Optics>,
    kind: DiffuserKind,
}

impl fmt::Debug for Diffuser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            DiffuserKind::Opaque { .. } => "Opaque",
            DiffuserKind::Sensor { .. } => "Sensor",
            DiffuserKind::Translucent { .. } => "Translucent",
        };
        f.debug_struct("Diffuser")
            .field("kind", &kind)
            .field("name", &self.primitive.name())
            .field("id", &self.id())
            .field("face", &self.face())
            .finish()
    }
}

impl Diffuser {
    pub fn opaque(primitive: Box<dyn Primitive>, optics: Arc<dyn Optics>, ids: &mut IdAllocator) -> Self {
        let id = ids.next_id();
        Self { primitive, optics, kind: DiffuserKind::Opaque { id } }
    }

    /// Sensors without optics get a private non-reflecting Lambertian face.
    pub fn sensor(primitive: Box<dyn Primitive>, optics: Option<Arc<dyn Optics>>, ids: &mut IdAllocator) -> Self {
        let id = ids.next_id();
        let optics = optics.unwrap_or_else(|| Arc::new(LambertianDiffuse::default()));
        Self { primitive, optics, kind: DiffuserKind::Sensor { id } }
    }

    pub fn translucent(primitive: Box<dyn Primitive>,
                       front: Arc<dyn Optics>,
                       back: Arc<dyn Optics>,
                       ids: &mut IdAllocator) -> Self {
        let front_id = ids.next_id();
        let back_id = ids.next_id();
        Self {
            primitive,
            optics: front,
            kind: DiffuserKind::Translucent { ids: [front_id, back_id], back, active: Face::Front },
        }
    }

    pub fn primitive(&self) -> &dyn Primitive {
        self.primitive.as_ref()
    }

    pub fn kind(&self) -> &DiffuserKind {
        &self.kind
    }

    pub fn is_opaque(&self) -> bool {
        !matches!(self.kind, DiffuserKind::Translucent { .. })
    }

    pub fn is_real(&self) -> bool {
        !matches!(self.kind, DiffuserKind::Sensor { .. })
    }

    pub fn intersect(&self, params: &IntersectionParams) -> Option<(Float, Vector3f)> {
        self.primitive.intersect(params)
    }

    /// Faces that carry an identifier.
    pub fn faces(&self) -> &'static [Face] {
        match self.kind {
            DiffuserKind::Translucent { .. } => &TWO_SIDED,
            _ => &ONE_SIDED,
        }
    }

    /// Face struck by a ray travelling along `direction`: the front when it
    /// arrives against the geometric normal. One-sided diffusers always
    /// answer `Front`.
    pub fn resolve_face(&self, direction: &Vector3f) -> Face {
        match self.kind {
            DiffuserKind::Translucent { .. } => {
                if direction.dot(&self.primitive.normal()) < 0.0 {
                    Face::Front
                } else {
                    Face::Back
                }
            }
            _ => Face::Front,
        }
    }

    /// Whether flux travelling along `direction` is taken in where it lands.
    /// Opaque diffusers only receive on their front; what reaches their back
    /// is lost. Sensors and translucent diffusers receive on both sides.
    pub fn receives(&self, direction: &Vector3f) -> bool {
        match self.kind {
            DiffuserKind::Opaque { .. } => direction.dot(&self.primitive.normal()) < 0.0,
            _ => true,
        }
    }

    pub fn normal_of(&self, face: Face) -> Vector3f {
        match (&self.kind, face) {
            (DiffuserKind::Translucent { .. }, Face::Back) => -self.primitive.normal(),
            _ => self.primitive.normal(),
        }
    }

    pub fn id_of(&self, face: Face) -> u32 {
        match &self.kind {
            DiffuserKind::Opaque { id } | DiffuserKind::Sensor { id } => *id,
            DiffuserKind::Translucent { ids, .. } => ids[face as usize],
        }
    }

    /// Identifier of the other side, for two-sided diffusers only.
    pub fn opposite_id(&self, face: Face) -> Option<u32> {
        match &self.kind {
            DiffuserKind::Translucent { ids, .. } => Some(ids[face.opposite() as usize]),
            _ => None,
        }
    }

    fn optics_of(&self, face: Face) -> &dyn Optics {
        match (&self.kind, face) {
            (DiffuserKind::Translucent { back, .. }, Face::Back) => back.as_ref(),
            _ => self.optics.as_ref(),
        }
    }

    pub fn rho_of(&self, face: Face) -> Float {
        self.optics_of(face).rho()
    }

    /// One-sided diffusers have no transmission path and report zero.
    pub fn tau_of(&self, face: Face) -> Float {
        match self.kind {
            DiffuserKind::Translucent { .. } => self.optics_of(face).tau(),
            _ => 0.0,
        }
    }

    pub fn face(&self) -> Face {
        match self.kind {
            DiffuserKind::Translucent { active, .. } => active,
            _ => Face::Front,
        }
    }

    pub fn normal(&self) -> Vector3f {
        self.normal_of(self.face())
    }

    pub fn id(&self) -> u32 {
        self.id_of(self.face())
    }

    pub fn rho(&self) -> Float {
        self.rho_of(self.face())
    }

    pub fn tau(&self) -> Float {
        self.tau_of(self.face())
    }

    pub fn toggle_face(&mut self) {
        if let DiffuserKind::Translucent { active, .. } = &mut self.kind {
            *active = active.opposite();
        }
    }

    pub fn set_face(&mut self, direction: &Vector3f) {
        let face = self.resolve_face(direction);
        self.set_face_code(face.code());
    }

    pub fn set_face_code(&mut self, code: u8) {
        if let DiffuserKind::Translucent { active, .. } = &mut self.kind {
            *active = Face::from_code(code);
        }
    }

    /// Activates the face carrying `target`, toggling at most once. A target
    /// this diffuser does not own means the id/face mapping is corrupted; the
    /// active face is left as it was and the violation is returned.
    pub fn set_face_by_id(&mut self, target: u32) -> RadiosityResult<()> {
        if self.id() == target {
            return Ok(());
        }
        self.toggle_face();
        if self.id() != target {
            self.toggle_face();
            return Err(RadiosityError::InvariantViolation(format!(
                "diffuser {} has no face with id {} (active id {})",
                self.primitive.name(), target, self.id())));
        }
        Ok(())
    }

    pub fn centre(&self) -> Vector3f {
        self.primitive.centre()
    }

    pub fn surface(&self) -> Float {
        self.primitive.surface()
    }

    pub fn name(&self) -> u64 {
        self.primitive.name()
    }

    pub fn azimuth_reference(&self) -> Vector3f {
        self.primitive.azimuth()
    }

    pub fn bounding_box(&self) -> AABB {
        self.primitive.bounding_box()
    }

    pub fn sample_point(&self, u: &Vector2f) -> RadiosityResult<Vector3f> {
        self.primitive.sample_point(u)
    }

    /// Signed angle between the unit vector `direction` and the surface
    /// plane, positive on the front side.
    pub fn elevation_of(&self, direction: &Vector3f) -> RadiosityResult<Float> {
        safe_asin(direction.dot(&self.primitive.normal()))
    }

    /// Angle in `[0, 2pi)` of `direction` projected onto the surface plane,
    /// measured counter-clockwise about the normal from the azimuth
    /// reference. Directions along the normal have azimuth zero.
    pub fn azimuth_of(&self, direction: &Vector3f) -> RadiosityResult<Float> {
        let n = self.primitive.normal();
        let projected = direction - n * direction.dot(&n);
        let len = projected.norm();
        if len < EPSILON {
            return Ok(0.0);
        }
        let reference = self.primitive.azimuth();
        let angle = safe_acos(projected.dot(&reference) / len)?;
        if reference.cross(&projected).dot(&n) < 0.0 {
            Ok(2.0 * PI - angle)
        } else {
            Ok(angle)
        }
    }
}
