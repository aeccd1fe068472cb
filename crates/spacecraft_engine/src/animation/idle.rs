//! Idle dance of the jointed robot
//!
//! The dancer is a stack of sphere segments on a base plate. A torso sway is
//! cancelled out by the upper leg and body counter-rotations, so the robot
//! wobbles while its body stays roughly upright. Arms, head, ears and eyes run
//! their own periodic curves on top.
//!
//! Every joint angle is a pure function of effective elapsed time (see
//! [`DancePose::at`]). The controller only owns the pause bookkeeping and the
//! node handles it writes to.

use log::debug;

use crate::animation::clock::AnimationClock;
use crate::core::config::IdleAnimationConfig;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};
use crate::scene::{NodeKey, PartDescriptor, Primitive, RenderableFactory, SceneError, SceneGraph, SceneGraphBuilder};

/// Node placing the whole dancer in the room
pub const DANCER_TRANSFORM: &str = "dancer transform";
const ROBOT_ROTATE: &str = "dancer rotate";
const UPPER_LEG_ROTATE: &str = "dancer upper leg rotate";
const BODY_ROTATE: &str = "dancer body rotate";
const LEFT_ARM_ROTATE: &str = "dancer left arm rotate";
const RIGHT_ARM_ROTATE: &str = "dancer right arm rotate";
const HEAD_ROTATE: &str = "dancer head rotate";
const LEFT_EYE_SCALE: &str = "dancer left eye scale";
const RIGHT_EYE_SCALE: &str = "dancer right eye scale";
const LEFT_EAR_ROTATE: &str = "dancer left ear rotate";
const RIGHT_EAR_ROTATE: &str = "dancer right ear rotate";

const BODY_TEXTURES: &[&str] = &["robot1", "pure_spec"];
const EYE_TEXTURES: &[&str] = &["robot_eyes"];

const LEG: Vec3 = Vec3::new(0.25, 1.25, 0.25);
const BASE: Vec3 = Vec3::new(3.0, 0.3, 3.0);
const BODY: Vec3 = Vec3::new(0.5, 3.0, 0.5);
const ARM: Vec3 = Vec3::new(0.3, 1.5, 0.3);
const HEAD: Vec3 = Vec3::new(1.0, 0.75, 0.4);
const EAR: Vec3 = Vec3::new(0.2, 0.75, 0.1);
const EAR_OFFSET: f32 = 0.25;
const REST_EAR_ANGLE: f32 = 35.0;
const REST_ARM_ANGLE: f32 = 20.0;
const REST_EYE_SCALE: f32 = 0.3;

fn eye_scale(vertical: f32) -> Mat4 {
    Mat4::scaling_xyz(0.225, vertical, 0.2)
}

/// A sphere part: a group node carrying children plus a scaled shape leaf
fn part(
    builder: SceneGraphBuilder,
    factory: &mut dyn RenderableFactory,
    name: &str,
    parent: &str,
    size: Vec3,
    textures: &[&str],
) -> SceneGraphBuilder {
    let shape = format!("{name} shape");
    let renderable = factory.create(&PartDescriptor::new(shape.as_str(), Primitive::Sphere, textures));
    builder
        .group(name, parent, None)
        .leaf(shape, name, Mat4::scaling(size), renderable)
}

/// Declare the dancer's node hierarchy under `parent`, standing at `position`
pub fn declare_dancer(
    builder: SceneGraphBuilder,
    parent: &str,
    position: Vec3,
    factory: &mut dyn RenderableFactory,
) -> SceneGraphBuilder {
    let builder = builder.group(DANCER_TRANSFORM, parent, Mat4::translation(position));
    let builder = part(builder, factory, "dancer base", DANCER_TRANSFORM, BASE, BODY_TEXTURES)
        .group("dancer bottom leg pivot", "dancer base", Mat4::translation_xyz(0.0, BASE.y - 0.15, 0.0))
        .group(ROBOT_ROTATE, "dancer bottom leg pivot", None)
        .group("dancer bottom leg translate", ROBOT_ROTATE, Mat4::translation_xyz(0.0, LEG.y / 2.0, 0.0));
    let builder = part(builder, factory, "dancer bottom leg", "dancer bottom leg translate", LEG, BODY_TEXTURES)
        .group("dancer upper leg pivot", "dancer bottom leg", Mat4::translation_xyz(0.0, BASE.y + 0.25, 0.0))
        .group(UPPER_LEG_ROTATE, "dancer upper leg pivot", None)
        .group("dancer upper leg translate", UPPER_LEG_ROTATE, Mat4::translation_xyz(0.0, LEG.y / 2.0, 0.0));
    let builder = part(builder, factory, "dancer upper leg", "dancer upper leg translate", LEG, BODY_TEXTURES)
        .group("dancer body pivot", "dancer upper leg", Mat4::translation_xyz(0.0, BASE.y + 0.2, 0.0))
        .group(BODY_ROTATE, "dancer body pivot", None)
        .group("dancer body translate", BODY_ROTATE, Mat4::translation_xyz(0.0, BODY.y / 2.0, 0.0));
    let builder = part(builder, factory, "dancer body", "dancer body translate", BODY, BODY_TEXTURES);

    // Arms hang from the shoulders, mirrored about the body axis
    let arm_pivot_y = BODY.y / 2.0 - ARM.y / 2.0;
    let shoulder_x = BODY.x / 2.0 - 0.05;
    let builder = builder
        .group("dancer left arm pivot", "dancer body", Mat4::translation_xyz(shoulder_x, arm_pivot_y, 0.0))
        .group(LEFT_ARM_ROTATE, "dancer left arm pivot", Mat4::rotation_z_deg(REST_ARM_ANGLE))
        .group("dancer left arm translate", LEFT_ARM_ROTATE, Mat4::translation_xyz(0.0, -ARM.y / 2.0, 0.0));
    let builder = part(builder, factory, "dancer left arm", "dancer left arm translate", ARM, BODY_TEXTURES)
        .group("dancer right arm pivot", "dancer body", Mat4::translation_xyz(-shoulder_x, arm_pivot_y, 0.0))
        .group(RIGHT_ARM_ROTATE, "dancer right arm pivot", Mat4::rotation_z_deg(-REST_ARM_ANGLE))
        .group("dancer right arm translate", RIGHT_ARM_ROTATE, Mat4::translation_xyz(0.0, -ARM.y / 2.0, 0.0));
    let builder = part(builder, factory, "dancer right arm", "dancer right arm translate", ARM, BODY_TEXTURES)
        .group("dancer head pivot", "dancer body", Mat4::translation_xyz(0.0, BODY.y / 2.0 + HEAD.y / 2.0 - 0.4, 0.0))
        .group(HEAD_ROTATE, "dancer head pivot", None)
        .group("dancer head translate", HEAD_ROTATE, Mat4::translation_xyz(0.0, HEAD.y / 2.0, 0.0));
    let builder = part(builder, factory, "dancer head", "dancer head translate", HEAD, BODY_TEXTURES);

    let eye_z = HEAD.z / 2.0 - 0.005;
    let builder = builder
        .group("dancer left eye translate", "dancer head", Mat4::translation_xyz(-0.135, 0.0, eye_z))
        .group(LEFT_EYE_SCALE, "dancer left eye translate", eye_scale(REST_EYE_SCALE));
    let builder = part(builder, factory, "dancer left eye", LEFT_EYE_SCALE, HEAD, EYE_TEXTURES)
        .group("dancer right eye translate", "dancer head", Mat4::translation_xyz(0.135, 0.0, eye_z))
        .group(RIGHT_EYE_SCALE, "dancer right eye translate", eye_scale(REST_EYE_SCALE));
    let builder = part(builder, factory, "dancer right eye", RIGHT_EYE_SCALE, HEAD, EYE_TEXTURES);

    let ear_pivot_y = EAR_OFFSET + HEAD.y / 2.0 - 0.2;
    let builder = builder
        .group("dancer left ear pivot", "dancer head", Mat4::translation_xyz(-0.2, ear_pivot_y, 0.0))
        .group(LEFT_EAR_ROTATE, "dancer left ear pivot", Mat4::rotation_z_deg(REST_EAR_ANGLE))
        .group("dancer left ear translate", LEFT_EAR_ROTATE, Mat4::translation_xyz(0.0, EAR_OFFSET, 0.0));
    let builder = part(builder, factory, "dancer left ear", "dancer left ear translate", EAR, EYE_TEXTURES)
        .group("dancer right ear pivot", "dancer head", Mat4::translation_xyz(0.2, ear_pivot_y, 0.0))
        .group(RIGHT_EAR_ROTATE, "dancer right ear pivot", Mat4::rotation_z_deg(-REST_EAR_ANGLE))
        .group("dancer right ear translate", RIGHT_EAR_ROTATE, Mat4::translation_xyz(0.0, EAR_OFFSET, 0.0));
    part(builder, factory, "dancer right ear", "dancer right ear translate", EAR, EYE_TEXTURES)
}

/// Joint angles of the dance at one instant, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DancePose {
    /// Torso sway about (X, Y, Z)
    pub torso: Vec3,
    /// Upper leg counter-rotation about (X, Y, Z)
    pub upper: Vec3,
    /// Slow bob term
    pub low: f32,
    /// Slow variation term
    pub variation: f32,
    /// Left arm angle, the right arm mirrors it
    pub arm: f32,
    /// Head yaw
    pub head_yaw: f32,
    /// Head pitch
    pub head_pitch: f32,
    /// Left ear angle, the right ear mirrors it
    pub ear: f32,
    /// Vertical eye scale
    pub eye: f32,
}

impl DancePose {
    /// Evaluate the pose at effective time `t`
    #[allow(clippy::cast_possible_truncation)]
    pub fn at(t: f64, config: &IdleAnimationConfig) -> Self {
        let speed = f64::from(config.speed);
        let amplitude = config.amplitude;
        let fast = (t * speed).sin() as f32;
        let slow = (t * speed / 2.0).sin() as f32;
        let unit = t.sin() as f32;

        let low = slow * amplitude;
        let variation = unit * config.variation;

        let torso_z = fast * config.torso_swing;
        let torso_y = fast * config.torso_swing + variation;
        let torso_x = -low;
        let upper_z = -torso_z + slow * amplitude * config.upper_bob_factor + variation;

        let ear_raw = (t * f64::from(config.ear_speed)).sin() as f32 * amplitude * config.ear_factor;
        let blink = -(t * f64::from(config.blink_speed)).sin() as f32;

        Self {
            torso: Vec3::new(torso_x, torso_y, torso_z),
            upper: Vec3::new(-torso_x, -torso_y, upper_z),
            low,
            variation,
            arm: (fast + 1.0) / 2.0 * (config.arm_max - config.arm_min) + config.arm_min,
            head_yaw: fast * amplitude * config.head_factor,
            head_pitch: unit * amplitude * config.head_factor,
            ear: utils::clamp(ear_raw, config.ear_min, config.ear_max),
            eye: utils::clamp(blink, config.eye_min, config.eye_max),
        }
    }

    /// Torso rotation, `Rz * Ry * Rx`
    pub fn robot_rotation(&self) -> Mat4 {
        Mat4::rotation_z_deg(self.torso.z) * Mat4::rotation_y_deg(self.torso.y) * Mat4::rotation_x_deg(self.torso.x)
    }

    /// Upper leg rotation, `Ry * Rz * Rx * Ry`
    pub fn upper_leg_rotation(&self) -> Mat4 {
        Mat4::rotation_y_deg(self.upper.y)
            * Mat4::rotation_z_deg(self.upper.z)
            * Mat4::rotation_x_deg(self.upper.x)
            * Mat4::rotation_y_deg(self.upper.y)
    }

    /// Body counter-rotation undoing the upper leg sway
    pub fn body_rotation(&self) -> Mat4 {
        Mat4::rotation_z_deg(-self.upper.z)
            * Mat4::rotation_y_deg(-self.upper.y)
            * Mat4::rotation_x_deg(-self.upper.x - self.low - self.variation)
    }

    /// Head rotation, yaw then pitch
    pub fn head_rotation(&self) -> Mat4 {
        Mat4::rotation_y_deg(self.head_yaw) * Mat4::rotation_x_deg(self.head_pitch)
    }
}

#[derive(Debug, Clone, Copy)]
struct DancerRig {
    robot_rotate: NodeKey,
    upper_leg_rotate: NodeKey,
    body_rotate: NodeKey,
    left_arm_rotate: NodeKey,
    right_arm_rotate: NodeKey,
    head_rotate: NodeKey,
    left_eye_scale: NodeKey,
    right_eye_scale: NodeKey,
    left_ear_rotate: NodeKey,
    right_ear_rotate: NodeKey,
}

impl DancerRig {
    fn resolve(graph: &SceneGraph) -> Result<Self, SceneError> {
        Ok(Self {
            robot_rotate: graph.node(ROBOT_ROTATE)?,
            upper_leg_rotate: graph.node(UPPER_LEG_ROTATE)?,
            body_rotate: graph.node(BODY_ROTATE)?,
            left_arm_rotate: graph.node(LEFT_ARM_ROTATE)?,
            right_arm_rotate: graph.node(RIGHT_ARM_ROTATE)?,
            head_rotate: graph.node(HEAD_ROTATE)?,
            left_eye_scale: graph.node(LEFT_EYE_SCALE)?,
            right_eye_scale: graph.node(RIGHT_EYE_SCALE)?,
            left_ear_rotate: graph.node(LEFT_EAR_ROTATE)?,
            right_ear_rotate: graph.node(RIGHT_EAR_ROTATE)?,
        })
    }

    fn apply(&self, pose: &DancePose, graph: &mut SceneGraph) -> Result<(), SceneError> {
        graph.set_local_transform(self.robot_rotate, pose.robot_rotation())?;
        graph.set_local_transform(self.upper_leg_rotate, pose.upper_leg_rotation())?;
        graph.set_local_transform(self.body_rotate, pose.body_rotation())?;
        graph.set_local_transform(self.left_arm_rotate, Mat4::rotation_z_deg(pose.arm))?;
        graph.set_local_transform(self.right_arm_rotate, Mat4::rotation_z_deg(-pose.arm))?;
        graph.set_local_transform(self.head_rotate, pose.head_rotation())?;
        graph.set_local_transform(self.left_eye_scale, eye_scale(pose.eye))?;
        graph.set_local_transform(self.right_eye_scale, eye_scale(pose.eye))?;
        graph.set_local_transform(self.left_ear_rotate, Mat4::rotation_z_deg(pose.ear))?;
        graph.set_local_transform(self.right_ear_rotate, Mat4::rotation_z_deg(-pose.ear))?;
        Ok(())
    }
}

/// Drives the dancer's joints while active
#[derive(Debug, Clone)]
pub struct IdleController {
    config: IdleAnimationConfig,
    clock: AnimationClock,
    rig: DancerRig,
    position_node: NodeKey,
}

impl IdleController {
    /// Bind to a graph built with [`declare_dancer`]; starts paused
    pub fn new(config: IdleAnimationConfig, graph: &SceneGraph, now: f64) -> Result<Self, SceneError> {
        Ok(Self {
            config,
            clock: AnimationClock::new_paused(now),
            rig: DancerRig::resolve(graph)?,
            position_node: graph.node(DANCER_TRANSFORM)?,
        })
    }

    /// Whether the dance is paused
    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Flip between dancing and paused, returning the new paused flag
    pub fn toggle(&mut self, now: f64) -> bool {
        let paused = self.clock.toggle(now);
        debug!("Dancer {} at {:.3}s", if paused { "paused" } else { "resumed" }, now);
        paused
    }

    /// Effective dance time at `now`
    pub fn effective_elapsed(&mut self, now: f64) -> f64 {
        self.clock.elapsed(now)
    }

    /// Pose at effective time `t`
    pub fn pose_at(&self, t: f64) -> DancePose {
        DancePose::at(t, &self.config)
    }

    /// Node whose world position locates the dancer
    pub fn position_node(&self) -> NodeKey {
        self.position_node
    }

    /// Write joint transforms for `now`; nothing is written while paused
    pub fn update(&mut self, now: f64, graph: &mut SceneGraph) -> Result<(), SceneError> {
        if self.clock.is_paused() {
            return Ok(());
        }
        let t = self.clock.elapsed(now);
        let pose = self.pose_at(t);
        self.rig.apply(&pose, graph)
    }

    /// [`update`](Self::update) followed by a world transform pass
    pub fn animate(&mut self, now: f64, graph: &mut SceneGraph) -> Result<(), SceneError> {
        self.update(now, graph)?;
        graph.update();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{NullRenderable, Renderable};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn dancer_graph() -> SceneGraph {
        let mut factory = |_: &PartDescriptor| -> Box<dyn Renderable> { Box::new(NullRenderable) };
        declare_dancer(SceneGraphBuilder::new("scene"), "scene", Vec3::new(-2.75, 0.1, -4.0), &mut factory)
            .build()
            .unwrap()
    }

    #[test]
    fn test_rig_shape() {
        let graph = dancer_graph();
        // 11 sphere parts, each a group plus a shape leaf
        assert_eq!(graph.leaf_count(), 11);
        let position = graph.world_position(graph.node(DANCER_TRANSFORM).unwrap()).unwrap();
        assert_relative_eq!(position, Vec3::new(-2.75, 0.1, -4.0));
        assert!(DancerRig::resolve(&graph).is_ok());
    }

    #[test]
    fn test_ear_angle_clamps() {
        let config = IdleAnimationConfig::default();
        // sin(1.5t) = 1: raw 90 clamps to the top
        assert_eq!(DancePose::at(PI / 3.0, &config).ear, 65.0);
        // sin(1.5t) = -1: raw -90 clamps to the bottom
        assert_eq!(DancePose::at(PI, &config).ear, 0.0);
    }

    #[test]
    fn test_pose_at_zero() {
        let pose = DancePose::at(0.0, &IdleAnimationConfig::default());
        assert_relative_eq!(pose.torso, Vec3::zeros());
        assert_relative_eq!(pose.arm, 85.0);
        assert_relative_eq!(pose.eye, 0.05);
        assert_relative_eq!(pose.robot_rotation(), Mat4::identity(), epsilon = 1e-6);
    }

    #[test]
    fn test_arm_and_eye_ranges() {
        let config = IdleAnimationConfig::default();
        for step in 0..500 {
            let pose = DancePose::at(f64::from(step) * 0.037, &config);
            assert!(pose.arm >= 20.0 - 1e-4 && pose.arm <= 150.0 + 1e-4);
            assert!(pose.eye >= 0.05 && pose.eye <= 0.3);
            assert!(pose.ear >= 0.0 && pose.ear <= 65.0);
        }
    }

    #[test]
    fn test_starts_paused_and_writes_nothing() {
        let mut graph = dancer_graph();
        let mut controller = IdleController::new(IdleAnimationConfig::default(), &graph, 0.0).unwrap();
        assert!(controller.is_paused());

        let rotate = graph.node(ROBOT_ROTATE).unwrap();
        let ear = graph.node(LEFT_EAR_ROTATE).unwrap();
        controller.update(3.0, &mut graph).unwrap();
        assert_relative_eq!(graph.local_transform(rotate).unwrap(), Mat4::identity());
        assert_relative_eq!(graph.local_transform(ear).unwrap(), Mat4::rotation_z_deg(35.0));
    }

    #[test]
    fn test_pause_continuity() {
        let mut graph = dancer_graph();
        let mut controller = IdleController::new(IdleAnimationConfig::default(), &graph, 0.0).unwrap();
        let head = graph.node(HEAD_ROTATE).unwrap();

        assert!(!controller.toggle(0.0));
        controller.update(1.0, &mut graph).unwrap();
        let at_pause = graph.local_transform(head).unwrap();

        assert!(controller.toggle(1.0));
        controller.update(5.0, &mut graph).unwrap();
        assert_relative_eq!(graph.local_transform(head).unwrap(), at_pause);
        assert_relative_eq!(controller.effective_elapsed(5.0), 1.0);

        assert!(!controller.toggle(5.0));
        assert_relative_eq!(controller.effective_elapsed(5.0), 1.0);
        controller.update(5.0, &mut graph).unwrap();
        assert_relative_eq!(graph.local_transform(head).unwrap(), at_pause, epsilon = 1e-6);
    }

    #[test]
    fn test_animate_updates_world_transforms() {
        let mut graph = dancer_graph();
        let mut controller = IdleController::new(IdleAnimationConfig::default(), &graph, 0.0).unwrap();
        let head = graph.node("dancer head").unwrap();
        let before = graph.world_transform(head).unwrap();

        controller.toggle(0.0);
        controller.animate(0.8, &mut graph).unwrap();
        let after = graph.world_transform(head).unwrap();
        assert!((before - after).norm() > 1e-3);
    }
}
