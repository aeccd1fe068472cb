//! Waypoint patrol of the mobile robot
//!
//! The robot alternates between two phases: it slides from one corner of its
//! loop to the next, then turns on the spot to the heading of the next leg.
//! Independently, the antenna head sweeps a spotlight beam around in a circle.
//!
//! Locomotion and sweep each run on their own [`AnimationClock`]. Disabling the
//! robot pauses the locomotion clock, so when it is enabled again the current
//! phase resumes exactly where it stopped. Whether the beam keeps sweeping in
//! the meantime is decided by [`SweepPolicy`].

use log::debug;

use crate::animation::clock::AnimationClock;
use crate::animation::interpolation::{angle_lerp, lerp_vec3, phase_fraction};
use crate::core::config::{PatrolConfig, SweepPolicy};
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};
use crate::scene::{NodeKey, PartDescriptor, Primitive, RenderableFactory, SceneError, SceneGraph, SceneGraphBuilder};

/// Node placing the patrol robot on its path
pub const PATROL_TRANSLATE: &str = "patrol translate";
const PATROL_ROTATE: &str = "patrol rotate";
const ANTENNA_ROTATE: &str = "patrol antenna rotate";

const BODY_TEXTURES: &[&str] = &["robot2", "robot2_spec"];
const EYE_TEXTURES: &[&str] = &["robot_eyes"];

fn shape(
    builder: SceneGraphBuilder,
    factory: &mut dyn RenderableFactory,
    name: &str,
    parent: &str,
    transform: Mat4,
    primitive: Primitive,
    textures: &[&str],
) -> SceneGraphBuilder {
    let renderable = factory.create(&PartDescriptor::new(name, primitive, textures));
    builder.leaf(name, parent, transform, renderable)
}

/// Declare the patrol robot's node hierarchy under `parent`
///
/// The robot is placed at the first waypoint facing the first heading, with
/// the antenna at the start of its sweep.
pub fn declare_patrol(
    builder: SceneGraphBuilder,
    parent: &str,
    config: &PatrolConfig,
    factory: &mut dyn RenderableFactory,
) -> SceneGraphBuilder {
    let antenna_angle = BeamState::at(0.0, config.waypoints[0], config).antenna_angle;

    let builder = builder
        .group(PATROL_TRANSLATE, parent, Mat4::translation(config.waypoints[0]))
        .group(PATROL_ROTATE, PATROL_TRANSLATE, Mat4::rotation_y_deg(config.headings[0]))
        .group("patrol body", PATROL_ROTATE, None);
    let builder = shape(
        builder,
        factory,
        "patrol body shape",
        "patrol body",
        Mat4::scaling_xyz(0.5, 0.75, 1.0) * Mat4::translation_xyz(0.0, 0.4, 0.0),
        Primitive::Cube,
        BODY_TEXTURES,
    );

    // Eyes sit on the front face
    let eye_scale = Mat4::scaling_xyz(0.175, 0.175, 0.0875);
    let builder = builder
        .group("patrol face", "patrol body", Mat4::translation_xyz(0.0, 0.375, 0.5))
        .group("patrol left eye", "patrol face", None);
    let builder = shape(
        builder,
        factory,
        "patrol left eye shape",
        "patrol left eye",
        eye_scale * Mat4::translation_xyz(0.75, 1.0, 0.0),
        Primitive::Sphere,
        EYE_TEXTURES,
    )
    .group("patrol right eye", "patrol face", None);
    let builder = shape(
        builder,
        factory,
        "patrol right eye shape",
        "patrol right eye",
        eye_scale * Mat4::translation_xyz(-0.75, 1.0, 0.0),
        Primitive::Sphere,
        EYE_TEXTURES,
    );

    // The antenna does not turn with the body, only its head sweeps
    let builder = builder
        .group("patrol antenna translate", PATROL_TRANSLATE, Mat4::translation_xyz(0.0, 1.1, 0.0))
        .group("patrol antenna", "patrol antenna translate", None);
    let builder = shape(
        builder,
        factory,
        "patrol antenna shape",
        "patrol antenna",
        Mat4::scaling_xyz(0.175, 0.9, 0.175),
        Primitive::Sphere,
        BODY_TEXTURES,
    )
    .group("patrol connector", "patrol antenna translate", None)
    .group(
        "patrol connector transform",
        "patrol connector",
        Mat4::scaling_xyz(0.3, 0.3, 0.3) * Mat4::translation_xyz(0.0, 1.2, 0.0),
    )
    .group(ANTENNA_ROTATE, "patrol connector transform", Mat4::rotation_y_deg(antenna_angle));
    let builder = shape(
        builder,
        factory,
        "patrol connector shape",
        ANTENNA_ROTATE,
        Mat4::identity(),
        Primitive::Sphere,
        BODY_TEXTURES,
    )
    .group("patrol bulb", ANTENNA_ROTATE, None);
    shape(
        builder,
        factory,
        "patrol bulb shape",
        "patrol bulb",
        Mat4::scaling_xyz(0.5, 0.5, 0.5) * Mat4::translation_xyz(-0.7, -0.3, 0.0),
        Primitive::Sphere,
        &[],
    )
}

/// Locomotion phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatrolMode {
    /// Moving from the current waypoint to the next
    Translating,
    /// Turning at the current waypoint
    Rotating,
}

/// Spotlight beam carried by the antenna
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamState {
    /// Beam origin
    pub position: Vec3,
    /// Beam direction, not normalised
    pub direction: Vec3,
    /// Antenna head yaw in degrees, `[0, 360)`
    pub antenna_angle: f32,
}

impl BeamState {
    /// Beam after `sweep_elapsed` seconds of sweeping from a body at `body`
    #[allow(clippy::cast_possible_truncation)]
    pub fn at(sweep_elapsed: f64, body: Vec3, config: &PatrolConfig) -> Self {
        let phase = (sweep_elapsed * f64::from(config.sweep_rate)) as f32;
        Self {
            position: body + Vec3::new(0.0, config.beam_height, 0.0),
            direction: Vec3::new(phase.sin(), -1.0, phase.cos()),
            antenna_angle: (utils::rad_to_deg(phase) + 90.0).rem_euclid(360.0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PatrolRig {
    translate: NodeKey,
    rotate: NodeKey,
    antenna: NodeKey,
}

/// Drives the patrol robot around its waypoint loop
#[derive(Debug, Clone)]
pub struct PatrolController {
    config: PatrolConfig,
    locomotion: AnimationClock,
    sweep: AnimationClock,
    mode: PatrolMode,
    phase_start: f64,
    index: usize,
    position: Vec3,
    heading: f32,
    enabled: bool,
    beam: BeamState,
    rig: PatrolRig,
}

impl PatrolController {
    /// Bind to a graph built with [`declare_patrol`]; starts enabled at the first waypoint
    pub fn new(config: PatrolConfig, graph: &SceneGraph, now: f64) -> Result<Self, SceneError> {
        let rig = PatrolRig {
            translate: graph.node(PATROL_TRANSLATE)?,
            rotate: graph.node(PATROL_ROTATE)?,
            antenna: graph.node(ANTENNA_ROTATE)?,
        };
        let position = config.waypoints[0];
        let heading = config.headings[0];
        let beam = BeamState::at(0.0, position, &config);
        Ok(Self {
            config,
            locomotion: AnimationClock::new(now),
            sweep: AnimationClock::new(now),
            mode: PatrolMode::Translating,
            phase_start: 0.0,
            index: 0,
            position,
            heading,
            enabled: true,
            beam,
            rig,
        })
    }

    /// Current body position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current body heading in degrees
    pub fn heading(&self) -> f32 {
        self.heading
    }

    /// Waypoint the robot last reached (or starts from)
    pub fn waypoint_index(&self) -> usize {
        self.index
    }

    /// Current locomotion phase
    pub fn mode(&self) -> PatrolMode {
        self.mode
    }

    /// Whether the robot is moving
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Beam computed by the last update
    pub fn beam(&self) -> BeamState {
        self.beam
    }

    /// Node whose world position locates the robot
    pub fn position_node(&self) -> NodeKey {
        self.rig.translate
    }

    /// Enable or disable locomotion at `now`
    pub fn set_enabled(&mut self, enabled: bool, now: f64) {
        if enabled == self.enabled {
            return;
        }
        if enabled {
            self.locomotion.resume(now);
            self.sweep.resume(now);
        } else {
            self.locomotion.pause(now);
            if self.config.sweep_policy == SweepPolicy::PauseWithBody {
                self.sweep.pause(now);
            }
        }
        self.enabled = enabled;
        debug!(
            "Patrol {} at {:.3}s while {:?}",
            if enabled { "enabled" } else { "disabled" },
            now,
            self.mode
        );
    }

    /// Flip locomotion on or off, returning the new enabled flag
    pub fn toggle_enabled(&mut self, now: f64) -> bool {
        self.set_enabled(!self.enabled, now);
        self.enabled
    }

    /// Advance to `now` and write the body and antenna transforms
    pub fn update(&mut self, now: f64, graph: &mut SceneGraph) -> Result<(), SceneError> {
        if self.enabled {
            let elapsed = self.locomotion.elapsed(now);
            self.advance(elapsed);
        }
        self.beam = BeamState::at(self.sweep.elapsed(now), self.position, &self.config);

        graph.set_local_transform(self.rig.translate, Mat4::translation(self.position))?;
        graph.set_local_transform(self.rig.rotate, Mat4::rotation_y_deg(self.heading))?;
        graph.set_local_transform(self.rig.antenna, Mat4::rotation_y_deg(self.beam.antenna_angle))?;
        Ok(())
    }

    fn next_index(&self) -> usize {
        (self.index + 1) % self.config.waypoints.len()
    }

    fn previous_index(&self) -> usize {
        let count = self.config.waypoints.len();
        (self.index + count - 1) % count
    }

    // One translate step then one rotate step, at most one transition each
    fn advance(&mut self, elapsed: f64) {
        if self.mode == PatrolMode::Translating {
            let time = elapsed - self.phase_start;
            if time >= self.config.move_duration {
                self.index = self.next_index();
                self.position = self.config.waypoints[self.index];
                self.mode = PatrolMode::Rotating;
                self.phase_start = elapsed;
                debug!("Patrol reached waypoint {} at {:.3}s", self.index, elapsed);
            } else {
                let t = phase_fraction(time, self.config.move_duration);
                self.position = lerp_vec3(
                    &self.config.waypoints[self.index],
                    &self.config.waypoints[self.next_index()],
                    t,
                );
            }
        }

        if self.mode == PatrolMode::Rotating {
            let time = elapsed - self.phase_start;
            let target = self.config.headings[self.index];
            if time >= self.config.rotation_duration {
                self.heading = target;
                self.mode = PatrolMode::Translating;
                self.phase_start = elapsed;
                debug!("Patrol turned to {target} at {elapsed:.3}s");
            } else {
                let t = phase_fraction(time, self.config.rotation_duration);
                self.heading = angle_lerp(self.config.headings[self.previous_index()], target, t);
            }
        }
    }
}
