//! This module contains all the tuning constants used by the engine.
//!
//! Everything here is a default; the live values flow through [`crate::config::Tuning`],
//! which is deserializable so a level pack can override them.

use std::f32::consts::{FRAC_PI_3, PI, TAU};
use std::time::Duration;

pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);

/// Any pixel with an alpha above this value is a wall.
pub const WALL_ALPHA_THRESHOLD: u8 = 10;

/// Number of points sampled around a body when checking whether it fits.
pub const CLEARANCE_SAMPLES: usize = 8;
/// Number of points sampled around a body when resolving wall push-back.
pub const PUSH_BACK_SAMPLES: usize = 24;
/// Distance, in pixels, a single touching sample pushes a body away from the wall.
pub const PUSH_BACK_STRENGTH: f32 = 8.0;

/// Ray marching step, in pixels.
pub const RAY_STEP: f32 = 5.0;
/// Step between line-of-sight samples on the sentinel to player segment.
pub const SIGHT_STEP: f32 = 5.0;
/// Rays per vision cone polygon.
pub const CONE_RAYS: usize = 32;

/// Slowest speed a tuning may configure, in pixels per second.
pub const MIN_SPEED: f32 = 1.0;
pub const PLAYER_RADIUS: f32 = 20.5;
pub const PLAYER_WALK_SPEED: f32 = 100.0;
pub const PLAYER_SPRINT_SPEED: f32 = 225.0;
pub const MAX_SPRINT_ENERGY: f32 = 100.0;
/// Minimum energy needed to start or keep sprinting.
pub const SPRINT_THRESHOLD: f32 = 5.0;
pub const SPRINT_DRAIN_RATE: f32 = 20.0;
pub const SPRINT_RECHARGE_RATE: f32 = 100.0 / 30.0;
/// Analog stick values inside this band count as no input.
pub const INPUT_DEAD_ZONE: f32 = 0.1;

pub const GUARD_RADIUS: f32 = 20.5;
pub const GUARD_PATROL_SPEED: f32 = 60.0;
pub const GUARD_ALERT_SPEED: f32 = 103.0;
pub const GUARD_VISION_RANGE: f32 = PLAYER_RADIUS * 12.0;
pub const GUARD_VISION_ANGLE: f32 = 35.0;
pub const GUARD_HEARING_RANGE: f32 = 225.0;
pub const CAMERA_VISION_ANGLE: f32 = 90.0;

pub const PAUSE_CHANCE: f64 = 0.3;
pub const PAUSE_DURATION: Duration = Duration::from_secs(3);

/// Look-around limit while walking, either side of the heading.
pub const LOOK_LIMIT_WALKING: f32 = FRAC_PI_3;
/// Look-around limit while paused and for cameras (a full sweep).
pub const LOOK_LIMIT_SWEEP: f32 = TAU;
/// Look-around speed range for guards, in radians per second.
pub const GUARD_LOOK_SPEED: (f32, f32) = (0.18, 0.48);
/// Sweep speed range for cameras, in radians per second.
pub const CAMERA_LOOK_SPEED: (f32, f32) = (0.36, 0.66);
/// Turn rate toward a heard sound, in radians per second.
pub const HEARING_TURN_RATE: f32 = 1.08;
/// A sound further than this off the heading makes the guard reverse.
pub const REVERSE_THRESHOLD: f32 = PI / 2.0;

pub const PURSUIT_SPEED: f32 = 107.0;
pub const PURSUIT_HEARING_RANGE: f32 = 200.0;
pub const PURSUIT_CATCH_RANGE: f32 = 15.0;
pub const MAX_GUARD_ENERGY: f32 = 100.0;
pub const GUARD_ENERGY_DRAIN_RATE: f32 = 100.0 / 15.0;
pub const GUARD_ENERGY_RECHARGE_RATE: f32 = 100.0 / 3.0;
pub const EXHAUSTION_DURATION: Duration = Duration::from_secs(3);
pub const REPLAN_INTERVAL: Duration = Duration::from_secs(1);
pub const TRAIL_SAMPLE_INTERVAL: Duration = Duration::from_millis(50);
/// Distance at which a pursuit guard counts a waypoint as reached.
pub const WAYPOINT_REACHED: f32 = 20.0;
/// Trail targets closer than this are not worth a new motion.
pub const TRAIL_MIN_STEP: f32 = 5.0;
/// Samples kept by the trail recorder; about three and a half minutes at 50 ms.
pub const TRAIL_CAPACITY: usize = 4096;

pub const PATHFINDING_CELL_SIZE: f32 = 25.0;
pub const PATHFINDING_MAX_ITERATIONS: usize = 2000;

pub const DOCUMENT_INTERACT_RANGE: f32 = 50.0;
pub const EXIT_RANGE: f32 = 60.0;
pub const PHASE_DOOR_RANGE: f32 = 10.0;
pub const PUZZLE_POINT_RANGE: f32 = 100.0;
/// Sentinels closer than this show up on the player's threat ring.
pub const THREAT_INDICATOR_RANGE: f32 = 425.0;
pub const OBJECTIVE_INDICATOR_RANGE: f32 = 1000.0;
pub const PUZZLE_TIME_LIMIT: Duration = Duration::from_secs(90);

pub const MINIGAME_TIME_LIMIT: Duration = Duration::from_secs(20);
pub const MINIGAME_CHARS_REQUIRED: u32 = 110;
pub const MINIGAME_INTERSTITIAL: Duration = Duration::from_secs(2);
pub const MINIGAME_MISS_DISPLAY: Duration = Duration::from_millis(500);
pub const SLIDER_TRACK_WIDTH: f32 = 600.0;
pub const SLIDER_SPEED: f32 = 350.0;
pub const SLIDER_TOLERANCE: f32 = 20.0;

/// Built-in demo layout used by the headless binary, rasterized at [`DEMO_CELL_SIZE`].
///
/// `#` is an opaque wall, `.` and spaces are open floor.
pub const DEMO_CELL_SIZE: u32 = 40;
pub const DEMO_LAYOUT: [&str; 14] = [
    "##########################",
    "#.........#..............#",
    "#.........#..............#",
    "#.........#......####....#",
    "#....................#...#",
    "#.........#..........#...#",
    "######.####..........#...#",
    "#.........#######.####...#",
    "#........................#",
    "#.........#..............#",
    "#.........#....######....#",
    "#.........#..............#",
    "#.........#..............#",
    "##########################",
];
