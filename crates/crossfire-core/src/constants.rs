//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Player movement ---

/// Maximum horizontal running speed (m/s).
pub const PLAYER_MAX_SPEED: f64 = 6.0;

/// Speed multiplier applied while the walk modifier is held.
pub const WALK_SPEED_SCALE: f64 = 0.52;

/// Acceleration toward the desired velocity (m/s²).
pub const PLAYER_ACCELERATION: f64 = 48.0;

/// Acceleration used when the desired velocity opposes the current one (m/s²).
pub const PLAYER_DECELERATION: f64 = 64.0;

/// Linear friction applied with no movement input (m/s²).
pub const PLAYER_FRICTION: f64 = 36.0;

/// Half of the player's box footprint on X and Z (meters).
pub const PLAYER_HALF_WIDTH: f64 = 0.32;

/// Player box height (meters).
pub const PLAYER_HEIGHT: f64 = 1.8;

/// Eye height above the feet, origin of hit-scan rays (meters).
pub const PLAYER_EYE_HEIGHT: f64 = 1.62;

/// Ground plane height. There is no vertical movement.
pub const GROUND_Y: f64 = 0.0;

/// Pitch limit in radians (~88.2°).
pub const PITCH_LIMIT: f64 = 1.539;

/// Desired-direction lengths at or below this are treated as no input.
pub const WISH_EPSILON: f64 = 1e-6;

/// Gap left between an entity and the face it was pushed back to (meters).
pub const COLLISION_SKIN: f64 = 1e-6;

/// Ray direction components below this magnitude are treated as parallel.
pub const RAY_PARALLEL_EPSILON: f64 = 1e-12;

// --- Player status ---

/// Hit points of a freshly spawned player.
pub const PLAYER_MAX_HP: u32 = 100;

/// Horizontal distance between footsteps while running (meters).
pub const FOOTSTEP_STRIDE: f64 = 2.2;

// --- Weapon ---

/// Seconds between accepted shots (600 rounds per minute).
pub const FIRE_INTERVAL_SECS: f64 = 0.1;

/// Rounds per magazine.
pub const MAGAZINE_SIZE: u32 = 30;

/// Reload duration (seconds).
pub const RELOAD_TIME_SECS: f64 = 2.4;

/// Maximum hit-scan distance (meters).
pub const HITSCAN_RANGE: f64 = 200.0;

/// Yaw inaccuracy at full lateral speed (degrees).
pub const MOVE_INACCURACY_LATERAL_DEG: f64 = 2.6;

/// Pitch inaccuracy at full forward speed (degrees).
pub const MOVE_INACCURACY_FORWARD_DEG: f64 = 1.1;

/// Cumulative (yaw°, pitch°) recoil offsets indexed by spray index.
/// Entry 0 is the first shot and carries no recoil. Pitch never decreases.
pub const RECOIL_PATTERN: [(f64, f64); 30] = [
    (0.00, 0.00),
    (0.05, 0.55),
    (0.10, 1.20),
    (0.02, 1.95),
    (-0.15, 2.75),
    (-0.35, 3.50),
    (-0.40, 4.20),
    (-0.20, 4.80),
    (0.20, 5.30),
    (0.65, 5.70),
    (1.05, 6.00),
    (1.30, 6.25),
    (1.20, 6.45),
    (0.80, 6.60),
    (0.25, 6.72),
    (-0.35, 6.82),
    (-0.95, 6.90),
    (-1.40, 6.97),
    (-1.65, 7.03),
    (-1.55, 7.08),
    (-1.15, 7.12),
    (-0.60, 7.16),
    (0.00, 7.19),
    (0.55, 7.22),
    (0.95, 7.25),
    (1.15, 7.27),
    (1.05, 7.29),
    (0.70, 7.31),
    (0.25, 7.32),
    (-0.10, 7.33),
];

// --- Prediction ---

/// Maximum number of unacknowledged inputs kept for replay (~2 s at 60 Hz).
pub const PENDING_INPUT_CAPACITY: usize = 120;

/// Exponential smoothing rate for remote entity render positions (1/s).
pub const REMOTE_INTERPOLATION_RATE: f64 = 15.0;

/// Remote entities farther than this from their render position snap instead of gliding.
pub const TELEPORT_SNAP_DISTANCE: f64 = 4.0;
