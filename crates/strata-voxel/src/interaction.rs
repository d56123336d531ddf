//! Block targeting and break/place mutations.
//!
//! Rays are marched in fixed steps through the [`ChunkStore`]; the first solid
//! non-air cell is the target and the last air cell sampled before it is where
//! a new block would go. Every mutation goes through the store's overlay.

use glam::{IVec3, Vec3};

use crate::registry::{BlockAttributes, BlockId, BlockRegistry};
use crate::store::ChunkStore;

/// Default distance between ray samples, in blocks.
pub const DEFAULT_RAY_STEP: f32 = 0.1;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// The block a ray stopped at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RayHit {
    /// World position of the hit block.
    pub block: IVec3,
    /// Type of the hit block.
    pub block_type: BlockId,
    /// Empty cell on the ray's approach side of the hit.
    pub placement: IVec3,
    /// `placement - block`; `(0, 1, 0)` when the ray started inside a block.
    pub normal: IVec3,
}

/// Outcome of a break request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakOutcome {
    /// The block was replaced by air; `drop` is what it yields.
    Broken { drop: Option<BlockId> },
    /// The block has a negative break time.
    Indestructible,
    /// The cell already held air.
    NothingThere,
}

/// Outcome of a place request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceOutcome {
    /// The block was written to the overlay.
    Placed,
    /// Air or an unregistered type was requested.
    InvalidBlock,
    /// The cell lies outside the vertical range.
    OutOfWorld,
    /// The cell is not air.
    Occupied,
    /// The cell would overlap the actor's collision volume.
    IntersectsActor,
}

/// Axis-aligned collision volume of an actor standing at `feet`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorBox {
    /// Centre of the bottom face.
    pub feet: Vec3,
    /// Extent along X and Z.
    pub width: f32,
    /// Extent along Y.
    pub height: f32,
}

impl ActorBox {
    pub fn new(feet: Vec3, width: f32, height: f32) -> Self {
        Self {
            feet,
            width,
            height,
        }
    }

    /// Minimum and maximum corners.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let half = self.width * 0.5;
        (
            self.feet - Vec3::new(half, 0.0, half),
            self.feet + Vec3::new(half, self.height, half),
        )
    }

    /// Returns `true` if the unit cell at `cell` overlaps this box.
    ///
    /// Touching faces do not count as overlap, so an actor standing exactly
    /// on a block boundary can still place against it.
    pub fn intersects_cell(&self, cell: IVec3) -> bool {
        let (min, max) = self.bounds();
        let cell_min = cell.as_vec3();
        let cell_max = cell_min + Vec3::ONE;
        min.cmplt(cell_max).all() && max.cmpgt(cell_min).all()
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolves ray targets and applies break/place edits against a store.
pub struct InteractionResolver<'a> {
    registry: &'a BlockRegistry,
    step: f32,
}

impl<'a> InteractionResolver<'a> {
    pub fn new(registry: &'a BlockRegistry) -> Self {
        Self {
            registry,
            step: DEFAULT_RAY_STEP,
        }
    }

    /// Overrides the march step. Non-positive values keep the default.
    pub fn with_step(mut self, step: f32) -> Self {
        if step > 0.0 && step.is_finite() {
            self.step = step;
        }
        self
    }

    fn attributes(&self, block: BlockId) -> &BlockAttributes {
        self.registry.lookup(block)
    }

    /// Marches from `origin` along `direction` for at most `max_distance`.
    ///
    /// Non-solid blocks such as water are passed through but do not count as
    /// placement cells. A zero direction or a non-finite reach never hits.
    pub fn raycast(
        &self,
        store: &ChunkStore,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<RayHit> {
        let dir = direction.try_normalize()?;
        if !origin.is_finite() || !max_distance.is_finite() || max_distance <= 0.0 {
            return None;
        }
        let steps = (max_distance / self.step).ceil() as u32;
        let mut last_air: Option<IVec3> = None;

        for i in 0..steps {
            let distance = i as f32 * self.step;
            let cell = (origin + dir * distance).floor().as_ivec3();
            let block = store.block_at_pos(cell);
            if block.is_air() {
                last_air = Some(cell);
                continue;
            }
            if self.attributes(block).solid {
                let placement = last_air.unwrap_or(cell + IVec3::Y);
                return Some(RayHit {
                    block: cell,
                    block_type: block,
                    placement,
                    normal: placement - cell,
                });
            }
        }
        None
    }

    /// Replaces the block at `pos` with air unless it is indestructible.
    pub fn break_block(&self, store: &mut ChunkStore, pos: IVec3) -> BreakOutcome {
        let block = store.block_at_pos(pos);
        if block.is_air() {
            return BreakOutcome::NothingThere;
        }
        let attrs = self.attributes(block);
        if attrs.is_indestructible() {
            tracing::debug!("refused to break indestructible {} at {}", attrs.name, pos);
            return BreakOutcome::Indestructible;
        }
        let drop = attrs.drop;
        store.set_overlay(pos.x, pos.y, pos.z, BlockId::AIR);
        BreakOutcome::Broken { drop }
    }

    /// Writes `block` at `pos` if the cell is empty and clear of the actor.
    pub fn place_block(
        &self,
        store: &mut ChunkStore,
        pos: IVec3,
        block: BlockId,
        actor: &ActorBox,
    ) -> PlaceOutcome {
        if !self.registry.contains(block) {
            return PlaceOutcome::InvalidBlock;
        }
        if !store.dims().contains_y(pos.y) {
            return PlaceOutcome::OutOfWorld;
        }
        if !store.block_at_pos(pos).is_air() {
            return PlaceOutcome::Occupied;
        }
        if actor.intersects_cell(pos) {
            return PlaceOutcome::IntersectsActor;
        }
        store.set_overlay(pos.x, pos.y, pos.z, block);
        PlaceOutcome::Placed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
