//! Axis-aligned collision shapes
//!
//! Everything is a box test. A [`CompositeSet`] is a flat list that is
//! scanned in insertion order and the first child reporting a hit wins, so
//! the order colliders are inserted in is observable.
//!
//! `test` is asymmetric: `a.test(b)` asks whether `b` intersects `a`, and the
//! returned [`Hit`] always names the collider that received the call (or the
//! leaf inside it for sets).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// What a leaf collider represents on the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColliderKind {
    /// A pickable rock
    Rock,
    /// A fixed obstacle
    Barrier,
    /// The field boundary
    Edge,
}

impl ColliderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColliderKind::Rock => "rock",
            ColliderKind::Barrier => "barrier",
            ColliderKind::Edge => "edge",
        }
    }
}

impl std::fmt::Display for ColliderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collider handle, unique within the [`IdSource`] that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(u64);

impl ColliderId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Composite set handle, used as the child -> parent back-reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SetId(u64);

/// Issues collider and set handles. Each simulation owns its own source, so
/// ids from two worlds are not comparable.
#[derive(Debug, Default)]
pub struct IdSource {
    next_collider: u64,
    next_set: u64,
}

impl IdSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn collider(&mut self) -> ColliderId {
        self.next_collider += 1;
        ColliderId(self.next_collider)
    }

    fn set(&mut self) -> SetId {
        self.next_set += 1;
        SetId(self.next_set)
    }
}

/// Axis-aligned box given by its center and full extents (y grows upward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    pub fn new(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            center,
            width,
            height,
        }
    }

    /// Square box with the given half extent
    pub fn square(center: Vec2, half_extent: f32) -> Self {
        Self::new(center, 2.0 * half_extent, 2.0 * half_extent)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.center.x - self.width / 2.0
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.center.x + self.width / 2.0
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y + self.height / 2.0
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.center.y - self.height / 2.0
    }

    /// Half of the diagonal
    pub fn radius(&self) -> f32 {
        (self.width * self.width + self.height * self.height).sqrt() / 2.0
    }

    /// Open-interval overlap: boxes that only share an edge do not overlap
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.right() > other.left()
            && self.left() < other.right()
            && self.top() > other.bottom()
            && self.bottom() < other.top()
    }
}

/// The field boundary, centered on the origin
///
/// Inverted test: a box "hits" the boundary when any part of it leaves the field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenBoundary {
    pub half_width: f32,
    pub half_height: f32,
}

impl ScreenBoundary {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            half_width: width / 2.0,
            half_height: height / 2.0,
        }
    }

    pub fn escapes(&self, other: &Aabb) -> bool {
        other.right() > self.half_width
            || other.left() < -self.half_width
            || other.top() > self.half_height
            || other.bottom() < -self.half_height
    }
}

/// The leaf collider a test ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hit {
    pub id: ColliderId,
    pub kind: ColliderKind,
}

#[derive(Debug)]
pub enum Shape {
    Box { aabb: Aabb, kind: ColliderKind },
    Screen(ScreenBoundary),
    Set(CompositeSet),
}

/// A collider owned by at most one [`CompositeSet`]
///
/// Colliders are not `Clone`: inserting one into a set moves it there, and
/// [`CompositeSet::remove`] is the only way to get it back out.
#[derive(Debug)]
pub struct Collider {
    id: ColliderId,
    parent: Option<SetId>,
    shape: Shape,
}

impl Collider {
    fn with_shape(ids: &mut IdSource, shape: Shape) -> Self {
        Self {
            id: ids.collider(),
            parent: None,
            shape,
        }
    }

    pub fn boxed(ids: &mut IdSource, aabb: Aabb, kind: ColliderKind) -> Self {
        Self::with_shape(ids, Shape::Box { aabb, kind })
    }

    pub fn rock(ids: &mut IdSource, aabb: Aabb) -> Self {
        Self::boxed(ids, aabb, ColliderKind::Rock)
    }

    pub fn barrier(ids: &mut IdSource, aabb: Aabb) -> Self {
        Self::boxed(ids, aabb, ColliderKind::Barrier)
    }

    pub fn screen(ids: &mut IdSource, width: f32, height: f32) -> Self {
        Self::with_shape(ids, Shape::Screen(ScreenBoundary::new(width, height)))
    }

    pub fn set(ids: &mut IdSource, set: CompositeSet) -> Self {
        Self::with_shape(ids, Shape::Set(set))
    }

    pub fn id(&self) -> ColliderId {
        self.id
    }

    /// The set currently owning this collider
    pub fn parent(&self) -> Option<SetId> {
        self.parent
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Category of a leaf collider (`None` for composite sets)
    pub fn kind(&self) -> Option<ColliderKind> {
        match &self.shape {
            Shape::Box { kind, .. } => Some(*kind),
            Shape::Screen(_) => Some(ColliderKind::Edge),
            Shape::Set(_) => None,
        }
    }

    pub fn aabb(&self) -> Option<&Aabb> {
        match &self.shape {
            Shape::Box { aabb, .. } => Some(aabb),
            _ => None,
        }
    }

    /// Does `probe` intersect this collider?
    pub fn test(&self, probe: &Aabb) -> Option<Hit> {
        match &self.shape {
            Shape::Box { aabb, kind } => aabb.overlaps(probe).then_some(Hit {
                id: self.id,
                kind: *kind,
            }),
            Shape::Screen(boundary) => boundary.escapes(probe).then_some(Hit {
                id: self.id,
                kind: ColliderKind::Edge,
            }),
            Shape::Set(set) => set.test(probe),
        }
    }
}

/// Ordered group of owned colliders
#[derive(Debug)]
pub struct CompositeSet {
    id: SetId,
    children: Vec<Collider>,
}

impl CompositeSet {
    pub fn new(ids: &mut IdSource) -> Self {
        Self {
            id: ids.set(),
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> SetId {
        self.id
    }

    /// Take ownership of `collider`, appending it to the test order
    pub fn insert(&mut self, mut collider: Collider) -> ColliderId {
        collider.parent = Some(self.id);
        let id = collider.id;
        self.children.push(collider);
        id
    }

    /// Detach a direct child and hand it back to the caller
    pub fn remove(&mut self, id: ColliderId) -> Option<Collider> {
        let index = self.children.iter().position(|c| c.id == id)?;
        let mut collider = self.children.remove(index);
        collider.parent = None;
        Some(collider)
    }

    pub fn get(&self, id: ColliderId) -> Option<&Collider> {
        self.children.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: ColliderId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collider> {
        self.children.iter()
    }

    /// First child (in insertion order) that `probe` intersects. O(n).
    pub fn test(&self, probe: &Aabb) -> Option<Hit> {
        self.children.iter().find_map(|child| child.test(probe))
    }
}
