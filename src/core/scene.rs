// Copyright @yucwang 2026

use crate::core::bsp::{Bsp, BspBox, BspPolicy};
use crate::core::diffuser::{Diffuser, IdAllocator};
use crate::core::error::{RadiosityError, RadiosityResult};
use crate::core::interaction::{Hit, IntersectionParams};
use crate::core::optics::Optics;
use crate::core::pattern::Pattern;
use crate::core::primitive::Primitive;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f, EPSILON};
use std::sync::Arc;

/// Bound on how many times a ray may re-enter a periodic tile.
pub const MAX_WRAPS: u32 = 64;

type Candidate = (usize, (Float, Vector3f));

/// Owns the diffusers of a simulation and the partition built over them.
#[derive(Debug)]
pub struct Scene {
    diffusers: Vec<Diffuser>,
    extents: Vec<AABB>,
    scene_bounds: AABB,
    ids: IdAllocator,
    bsp: Option<Bsp>,
    pattern: Option<Pattern>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            diffusers: Vec::new(),
            extents: Vec::new(),
            scene_bounds: AABB::default(),
            ids: IdAllocator::new(),
            bsp: None,
            pattern: None,
        }
    }

    /// Adopts diffusers built elsewhere together with the allocator that
    /// numbered them. Every face id must have been issued by `ids` and be
    /// used once.
    pub fn with_diffusers(diffusers: Vec<Diffuser>, ids: IdAllocator) -> RadiosityResult<Self> {
        let issued = ids.count();
        let mut seen = vec![false; issued];
        for diffuser in &diffusers {
            for &face in diffuser.faces() {
                let id = diffuser.id_of(face) as usize;
                if id >= issued {
                    return Err(RadiosityError::invalid_argument(
                        "Scene::with_diffusers",
                        format!("diffuser {} uses id {} but only {} ids were issued", diffuser.name(), id, issued)));
                }
                if seen[id] {
                    return Err(RadiosityError::invalid_argument(
                        "Scene::with_diffusers",
                        format!("id {} is used twice (diffuser {})", id, diffuser.name())));
                }
                seen[id] = true;
            }
        }

        let mut scene = Self { ids, ..Self::new() };
        for diffuser in diffusers {
            scene.push(diffuser);
        }
        Ok(scene)
    }

    fn push(&mut self, diffuser: Diffuser) -> usize {
        let extent = diffuser.bounding_box();
        self.scene_bounds.expand_by_aabb(&extent);
        self.extents.push(extent);
        self.diffusers.push(diffuser);
        self.bsp = None;
        self.diffusers.len() - 1
    }

    pub fn add_opaque(&mut self, primitive: Box<dyn Primitive>, optics: Arc<dyn Optics>) -> usize {
        let diffuser = Diffuser::opaque(primitive, optics, &mut self.ids);
        self.push(diffuser)
    }

    pub fn add_sensor(&mut self, primitive: Box<dyn Primitive>, optics: Option<Arc<dyn Optics>>) -> usize {
        let diffuser = Diffuser::sensor(primitive, optics, &mut self.ids);
        self.push(diffuser)
    }

    pub fn add_translucent(&mut self,
                           primitive: Box<dyn Primitive>,
                           front: Arc<dyn Optics>,
                           back: Arc<dyn Optics>) -> usize {
        let diffuser = Diffuser::translucent(primitive, front, back, &mut self.ids);
        self.push(diffuser)
    }

    pub fn diffusers(&self) -> &[Diffuser] {
        &self.diffusers
    }

    pub fn diffuser(&self, idx: usize) -> &Diffuser {
        &self.diffusers[idx]
    }

    pub fn len(&self) -> usize {
        self.diffusers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diffusers.is_empty()
    }

    /// Number of face identifiers issued, i.e. the size of the energy system.
    pub fn face_count(&self) -> usize {
        self.ids.count()
    }

    pub fn scene_bounds(&self) -> &AABB {
        &self.scene_bounds
    }

    pub fn bsp(&self) -> Option<&Bsp> {
        self.bsp.as_ref()
    }

    pub fn pattern(&self) -> Option<&Pattern> {
        self.pattern.as_ref()
    }

    /// Makes the canopy periodic: rays leaving the tile through a lateral
    /// face come back through the opposite one. Diffusers are expected to
    /// lie inside the tile; parts sticking out are never seen.
    pub fn set_pattern(&mut self, pattern: Option<Pattern>) {
        if let Some(tile) = &pattern {
            let outside = self.extents.iter().filter(|e| !tile.holds(e)).count();
            if outside > 0 {
                log::warn!("{} diffusers extend beyond the pattern tile.", outside);
            }
        }
        self.pattern = pattern;
    }

    pub fn build_bsp(&mut self, policy: BspPolicy) {
        if self.diffusers.is_empty() {
            self.bsp = None;
            return;
        }
        let root = BspBox::seed_root(self.scene_bounds.p_min,
                                     self.scene_bounds.p_max,
                                     0..self.diffusers.len());
        let bsp = Bsp::build(root, &self.extents, policy);
        log::info!("BSP over {} diffusers: {} nodes, depth {}.",
                   self.diffusers.len(), bsp.node_count(), bsp.depth());
        self.bsp = Some(bsp);
    }

    pub fn intersect(&self, params: &mut IntersectionParams) -> Option<Hit> {
        self.intersect_where(params, |_| true)
    }

    /// Nearest hit among diffusers accepted by `filter`. Falls back to a
    /// linear scan when no partition has been built. With a pattern the ray
    /// is followed through at most `MAX_WRAPS` neighbouring tiles; the hit
    /// distance is then the length travelled across all of them.
    pub fn intersect_where<F>(&self, params: &mut IntersectionParams, filter: F) -> Option<Hit>
    where
        F: Fn(&Diffuser) -> bool,
    {
        let result = match &self.pattern {
            Some(tile) => self.closest_toric(params, tile, &filter),
            None => self.closest(params, &filter).map(|c| (c, 0)),
        };
        params.mark_traced();

        result.map(|((idx, (distance, point)), wraps)| self.make_hit(params, idx, distance, point, wraps))
    }

    /// Brute-force reference query over every diffuser of the tile.
    pub fn intersect_linear(&self, params: &IntersectionParams) -> Option<Hit> {
        self.closest_linear(params, &|_: &Diffuser| true)
            .map(|(idx, (distance, point))| self.make_hit(params, idx, distance, point, 0))
    }

    fn make_hit(&self, params: &IntersectionParams, idx: usize, distance: Float, point: Vector3f, wraps: u32) -> Hit {
        let diffuser = &self.diffusers[idx];
        let face = diffuser.resolve_face(&params.direction());
        Hit { distance, point, diffuser: idx, face, id: diffuser.id_of(face), wraps }
    }

    fn closest<F>(&self, params: &IntersectionParams, filter: &F) -> Option<Candidate>
    where
        F: Fn(&Diffuser) -> bool,
    {
        match &self.bsp {
            Some(bsp) => {
                let ray = params.to_ray();
                bsp.ray_intersection(&ray, |idx| {
                    let diffuser = &self.diffusers[idx];
                    if !filter(diffuser) {
                        return None;
                    }
                    diffuser.intersect(params).map(|(t, p)| ((t, p), t))
                })
            }
            None => self.closest_linear(params, filter),
        }
    }

    fn closest_toric<F>(&self, params: &IntersectionParams, tile: &Pattern, filter: &F)
        -> Option<(Candidate, u32)>
    where
        F: Fn(&Diffuser) -> bool,
    {
        let dir = params.to_ray().dir();
        let mut cursor = params.clone();
        let mut travelled: Float = 0.0;

        for wraps in 0..=MAX_WRAPS {
            let hit = self.closest(&cursor, filter);
            match (hit, tile.exit(&cursor.origin(), &dir)) {
                (Some((idx, (t, p))), Some((t_exit, _))) if t <= t_exit + EPSILON => {
                    return Some(((idx, (travelled + t, p)), wraps));
                }
                (Some((idx, (t, p))), None) => return Some(((idx, (travelled + t, p)), wraps)),
                (_, Some((t_exit, shift))) => {
                    let next = cursor.origin() + dir * t_exit + shift;
                    if self.escapes_vertically(&next, &dir) {
                        return None;
                    }
                    travelled += t_exit;
                    cursor.set_origin(next);
                }
                (None, None) => return None,
            }
        }
        None
    }

    fn escapes_vertically(&self, p: &Vector3f, dir: &Vector3f) -> bool {
        (p.z >= self.scene_bounds.p_max.z && dir.z >= 0.0)
            || (p.z <= self.scene_bounds.p_min.z && dir.z <= 0.0)
    }

    fn closest_linear<F>(&self, params: &IntersectionParams, filter: &F) -> Option<Candidate>
    where
        F: Fn(&Diffuser) -> bool,
    {
        let mut closest: Option<Candidate> = None;
        for (idx, diffuser) in self.diffusers.iter().enumerate() {
            if !filter(diffuser) {
                continue;
            }
            if let Some((t, p)) = diffuser.intersect(params) {
                if closest.map_or(true, |(_, (best, _))| t < best) {
                    closest = Some((idx, (t, p)));
                }
            }
        }
        closest
    }
}
