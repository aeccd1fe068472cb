//! The spacecraft room scene
//!
//! Assembles the room, the spinning globe, the skybox and both robots into one
//! scene graph, and runs the per-frame animation in a fixed order:
//!
//! 1. proximity decides whether the dancer should dance
//! 2. the patrol robot advances and the spotlight follows its beam
//! 3. the dancer writes its joints (if active)
//! 4. globe and skybox spins
//! 5. one world transform pass, then one draw pass
//!
//! Proximity reads world positions computed by the previous frame's pass.

use log::{debug, info};

use crate::animation::clock::AnimationClock;
use crate::animation::globe::Spin;
use crate::animation::idle::{declare_dancer, IdleController};
use crate::animation::patrol::{declare_patrol, PatrolController};
use crate::animation::proximity::{ProximityActivation, ProximityLink};
use crate::core::config::{ApplicationConfig, SceneConfig};
use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::render::lighting::LightingEnvironment;
use crate::scene::builder::SceneGraphBuilder;
use crate::scene::renderable::{PartDescriptor, Primitive, RenderableFactory};
use crate::scene::scene_graph::{NodeKey, SceneError, SceneGraph};

const ROOT: &str = "spacecraft";
const ROOM: &str = "room";
const GLOBE: &str = "globe";
const GLOBE_SPIN: &str = "globe spin";
const SKYBOX_SPIN: &str = "skybox spin";

fn static_part(
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

fn declare_room(
    builder: SceneGraphBuilder,
    config: &SceneConfig,
    factory: &mut dyn RenderableFactory,
) -> SceneGraphBuilder {
    let thickness = config.wall_thickness;
    let height = config.wall_height;
    let width = config.back_wall_length;
    let depth = config.side_wall_length;
    let side_x = width / 2.0 + thickness / 2.0;

    let walls = [
        (
            "floor",
            Mat4::scaling_xyz(width, 1.0, depth),
            Primitive::Plane,
            ["floor_diffuse", "floor_spec"],
        ),
        (
            "right wall",
            Mat4::translation_xyz(side_x, height / 2.0, 0.0) * Mat4::scaling_xyz(thickness, height, depth),
            Primitive::Cube,
            ["metal_wall_diff", "vader_repeat"],
        ),
        (
            "back wall",
            Mat4::translation_xyz(0.0, height / 2.0, -(depth / 2.0 + thickness / 2.0))
                * Mat4::scaling_xyz(width + thickness * 2.0, height, thickness),
            Primitive::Cube,
            ["name_diff", "name_spec"],
        ),
        (
            "ceiling",
            Mat4::translation_xyz(0.0, height + thickness / 2.0, 0.0)
                * Mat4::scaling_xyz(width + thickness * 2.0, thickness, depth),
            Primitive::Cube,
            ["roof", "roof_spec"],
        ),
        // The left wall is four pieces framing a window
        (
            "window wall front",
            Mat4::translation_xyz(-side_x, height / 2.0, depth * 0.25 / 2.0 - depth / 2.0)
                * Mat4::scaling_xyz(thickness, height, depth * 0.25),
            Primitive::Cube,
            ["silver_diff", "pure_spec"],
        ),
        (
            "window wall back",
            Mat4::translation_xyz(-side_x, height / 2.0, -(depth * 0.25 / 2.0) + depth / 2.0)
                * Mat4::scaling_xyz(thickness, height, depth * 0.25),
            Primitive::Cube,
            ["silver_diff", "pure_spec"],
        ),
        (
            "window wall upper",
            Mat4::translation_xyz(-side_x, height * 7.0 / 8.0, 0.0)
                * Mat4::scaling_xyz(thickness, height / 4.0, depth * 0.5),
            Primitive::Cube,
            ["silver_diff", "pure_spec"],
        ),
        (
            "window wall lower",
            Mat4::translation_xyz(-side_x, height / 8.0, 0.0) * Mat4::scaling_xyz(thickness, height / 4.0, depth * 0.5),
            Primitive::Cube,
            ["silver_diff", "pure_spec"],
        ),
    ];

    let mut builder = builder.group(ROOM, ROOT, None);
    for (name, transform, primitive, textures) in walls {
        builder = static_part(builder, factory, name, ROOM, transform, primitive, &textures);
    }
    builder
}

/// Floor position of the globe, inset from the far right corner
fn globe_floor_position(config: &SceneConfig) -> (f32, f32) {
    let inset = config.path_gap_from_wall + config.globe_distance_from_path;
    (
        config.back_wall_length / 2.0 + config.wall_thickness / 2.0 - inset,
        config.side_wall_length / 2.0 + config.wall_thickness / 2.0 - inset,
    )
}

fn declare_globe(
    builder: SceneGraphBuilder,
    config: &SceneConfig,
    factory: &mut dyn RenderableFactory,
) -> SceneGraphBuilder {
    let (x, z) = globe_floor_position(config);
    let axis_height = 2.75;

    let builder = builder
        .group(GLOBE, ROOT, Mat4::translation_xyz(x, 2.0, z) * Mat4::scaling_xyz(1.5, 1.5, 1.5))
        .group(GLOBE_SPIN, GLOBE, None);
    let builder = static_part(
        builder,
        factory,
        "globe sphere",
        GLOBE_SPIN,
        Mat4::identity(),
        Primitive::Sphere,
        &["earth_map", "earth_specular"],
    );
    let builder = static_part(
        builder,
        factory,
        "globe stand",
        ROOT,
        Mat4::translation_xyz(x, 0.5, z) * Mat4::rotation_y_deg(-45.0),
        Primitive::Cube,
        &["diffuse_container", "specular_container"],
    );
    static_part(
        builder,
        factory,
        "globe axis",
        ROOT,
        Mat4::translation_xyz(x, 0.5 + axis_height / 2.0, z) * Mat4::scaling_xyz(0.15, axis_height, 0.15),
        Primitive::Sphere,
        &["gold_colour", "pure_spec"],
    )
}

fn declare_skybox(builder: SceneGraphBuilder, factory: &mut dyn RenderableFactory) -> SceneGraphBuilder {
    let builder = builder.group(SKYBOX_SPIN, ROOT, None);
    static_part(
        builder,
        factory,
        "skybox",
        SKYBOX_SPIN,
        Mat4::scaling_xyz(0.5, 0.5, 0.5),
        Primitive::SkyboxCube,
        &["skybox"],
    )
}

/// The assembled, animated room
pub struct SpacecraftScene {
    graph: SceneGraph,
    idle: IdleController,
    patrol: PatrolController,
    proximity: ProximityActivation,
    lights: LightingEnvironment,
    globe_spin: Spin,
    skybox_spin: Spin,
    globe_node: NodeKey,
    skybox_node: NodeKey,
    scene_clock: AnimationClock,
    last_link: Option<ProximityLink>,
}

impl SpacecraftScene {
    /// Build the scene at time `now`, asking `factory` for every drawable part
    pub fn new(
        config: &ApplicationConfig,
        factory: &mut dyn RenderableFactory,
        now: f64,
    ) -> Result<Self, SceneError> {
        let builder = declare_room(SceneGraphBuilder::new(ROOT), &config.scene, factory);
        let builder = declare_globe(builder, &config.scene, factory);
        let builder = declare_skybox(builder, factory);
        let builder = declare_patrol(builder, ROOT, &config.patrol, factory);
        let builder = declare_dancer(builder, ROOT, config.scene.dancer_position, factory);
        let graph = builder.build()?;

        let idle = IdleController::new(config.idle.clone(), &graph, now)?;
        let patrol = PatrolController::new(config.patrol.clone(), &graph, now)?;
        let lights = LightingEnvironment::new(&config.scene, &patrol.beam());

        info!(
            "Spacecraft scene ready: {} nodes, {} drawable parts",
            graph.len(),
            graph.leaf_count()
        );

        Ok(Self {
            globe_node: graph.node(GLOBE_SPIN)?,
            skybox_node: graph.node(SKYBOX_SPIN)?,
            graph,
            idle,
            patrol,
            proximity: ProximityActivation::new(&config.proximity),
            lights,
            globe_spin: Spin::new(config.scene.globe_spin_rate),
            skybox_spin: Spin::new(config.scene.skybox_spin_rate),
            scene_clock: AnimationClock::new(now),
            last_link: None,
        })
    }

    /// Animate and draw one frame at `now`
    pub fn frame(&mut self, now: f64) -> Result<(), SceneError> {
        let link = self.proximity.evaluate(&self.patrol_position()?, &self.dancer_position()?);
        self.proximity.apply(&link, &mut self.idle, now);
        self.last_link = Some(link);

        self.patrol.update(now, &mut self.graph)?;
        self.lights.follow_beam(&self.patrol.beam());

        self.idle.update(now, &mut self.graph)?;

        let elapsed = self.scene_clock.elapsed(now);
        self.graph.set_local_transform(self.globe_node, self.globe_spin.transform(elapsed))?;
        self.graph.set_local_transform(self.skybox_node, self.skybox_spin.transform(elapsed))?;

        self.graph.update();
        self.graph.draw();
        Ok(())
    }

    /// Flip the manual dance override, returning the new flag
    pub fn toggle_dance_override(&mut self) -> bool {
        self.proximity.toggle_override()
    }

    /// Start or stop the patrol robot, returning whether it now moves
    pub fn toggle_patrol(&mut self, now: f64) -> bool {
        let enabled = self.patrol.toggle_enabled(now);
        debug!("Patrol toggled: {}", if enabled { "moving" } else { "stopped" });
        enabled
    }

    /// World position of the dancer as of the last update
    pub fn dancer_position(&self) -> Result<Vec3, SceneError> {
        self.graph.world_position(self.idle.position_node())
    }

    /// World position of the patrol robot as of the last update
    pub fn patrol_position(&self) -> Result<Vec3, SceneError> {
        self.graph.world_position(self.patrol.position_node())
    }

    /// Proximity result of the last frame
    pub fn last_proximity(&self) -> Option<ProximityLink> {
        self.last_link
    }

    /// Whether the dancer is currently dancing
    pub fn is_dancing(&self) -> bool {
        !self.idle.is_paused()
    }

    /// General light intensity, percentage `0..=100`
    pub fn set_general_light_intensity(&mut self, percent: f32) {
        self.lights.set_general_intensity(percent);
    }

    /// Spotlight intensity, percentage `0..=100`
    pub fn set_spotlight_intensity(&mut self, percent: f32) {
        self.lights.set_spotlight_intensity(percent);
    }

    /// Scene lights
    pub fn lights(&self) -> &LightingEnvironment {
        &self.lights
    }

    /// Dancer controller
    pub fn idle(&self) -> &IdleController {
        &self.idle
    }

    /// Patrol controller
    pub fn patrol(&self) -> &PatrolController {
        &self.patrol
    }

    /// The scene graph
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::renderable::Renderable;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Counter(Rc<Cell<usize>>);

    impl Renderable for Counter {
        fn render(&mut self, _world_transform: &Mat4) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn scene_with_counter(config: &ApplicationConfig) -> (SpacecraftScene, Rc<Cell<usize>>) {
        let draws = Rc::new(Cell::new(0));
        let shared = Rc::clone(&draws);
        let mut factory = move |_: &PartDescriptor| -> Box<dyn Renderable> { Box::new(Counter(Rc::clone(&shared))) };
        let scene = SpacecraftScene::new(config, &mut factory, 0.0).unwrap();
        (scene, draws)
    }

    fn run(scene: &mut SpacecraftScene, from: f64, until: f64) {
        let mut step = 1;
        loop {
            let now = from + f64::from(step) * 0.25;
            if now > until {
                break;
            }
            scene.frame(now).unwrap();
            step += 1;
        }
    }

    #[test]
    fn test_every_part_drawn_once_per_frame() {
        let (mut scene, draws) = scene_with_counter(&ApplicationConfig::default());
        // room 8, globe 3, skybox 1, patrol 6, dancer 11
        assert_eq!(scene.graph().leaf_count(), 29);
        scene.frame(0.0).unwrap();
        assert_eq!(draws.get(), 29);
        scene.frame(0.5).unwrap();
        assert_eq!(draws.get(), 58);
    }

    #[test]
    fn test_initial_placement() {
        let (scene, _) = scene_with_counter(&ApplicationConfig::default());
        assert_relative_eq!(scene.patrol_position().unwrap(), Vec3::new(-5.0, 0.0, -8.0));
        assert_relative_eq!(scene.dancer_position().unwrap(), Vec3::new(-2.75, 0.1, -4.0));
        assert!(!scene.is_dancing());

        let sphere = scene.graph().node("globe sphere").unwrap();
        let globe = scene.graph().world_position(sphere).unwrap();
        assert_relative_eq!(globe, Vec3::new(1.85, 2.0, 5.6), epsilon = 1e-5);
    }

    #[test]
    fn test_dancer_wakes_when_patrol_is_near() {
        let (mut scene, _) = scene_with_counter(&ApplicationConfig::default());
        scene.frame(0.0).unwrap();
        assert!(scene.is_dancing());
        let link = scene.last_proximity().unwrap();
        assert!(link.distance <= 6.8);
    }

    #[test]
    fn test_dancer_sleeps_when_patrol_is_far() {
        let (mut scene, _) = scene_with_counter(&ApplicationConfig::default());
        run(&mut scene, 0.0, 10.0);
        assert_relative_eq!(scene.patrol_position().unwrap(), Vec3::new(5.0, 0.0, 8.0));
        assert!(!scene.is_dancing());
    }

    #[test]
    fn test_override_keeps_dancer_active() {
        let (mut scene, _) = scene_with_counter(&ApplicationConfig::default());
        assert!(scene.toggle_dance_override());
        run(&mut scene, 0.0, 10.0);
        assert!(scene.is_dancing());
    }

    #[test]
    fn test_stopped_patrol_holds_position() {
        let (mut scene, _) = scene_with_counter(&ApplicationConfig::default());
        run(&mut scene, 0.0, 1.0);
        let held = scene.patrol_position().unwrap();
        assert!(!scene.toggle_patrol(1.0));
        run(&mut scene, 1.0, 6.0);
        assert_relative_eq!(scene.patrol_position().unwrap(), held);
        assert!(scene.toggle_patrol(6.0));
    }

    #[test]
    fn test_spotlight_rides_on_patrol() {
        let (mut scene, _) = scene_with_counter(&ApplicationConfig::default());
        run(&mut scene, 0.0, 2.0);
        let body = scene.patrol().position();
        assert_relative_eq!(scene.lights().spotlight().position, body + Vec3::new(0.0, 1.46, 0.0));

        scene.set_spotlight_intensity(40.0);
        scene.set_general_light_intensity(100.0);
        assert_relative_eq!(scene.lights().spotlight().intensity, 0.4);
        assert_relative_eq!(scene.lights().general().intensity, 1.0);
    }
}
