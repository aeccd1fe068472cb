//! Animation controllers
//!
//! Controllers never read the clock themselves. The frame loop samples time
//! once and hands the same reading to each controller, which writes local
//! transforms into the scene graph.

pub mod clock;
pub mod globe;
pub mod idle;
pub mod interpolation;
pub mod patrol;
pub mod proximity;

pub use clock::AnimationClock;
pub use globe::Spin;
pub use idle::{declare_dancer, DancePose, IdleController};
pub use patrol::{declare_patrol, BeamState, PatrolController, PatrolMode};
pub use proximity::{ProximityActivation, ProximityLink};
