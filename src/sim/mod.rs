//! Simulation module
//!
//! Everything in here runs on the simulation thread only:
//! - Fixed ticks, no wall-clock time
//! - Seeded RNG only
//! - No rendering or channel dependencies

pub mod collision;
pub mod robot;
pub mod state;
pub mod tick;

pub use collision::{Aabb, Collider, ColliderId, ColliderKind, CompositeSet, Hit, IdSource, ScreenBoundary, SetId, Shape};
pub use robot::{Motion, MoveResult, PendingMove, Robot, RobotState};
pub use state::{Barrier, Rock, Simulation};
pub use tick::tick;
