//! Engine-wide tuning constants.

/// Simulation tick rate at 1x speed (ticks per second).
pub const BASE_TICK_HZ: f64 = 10.0;

/// Game-time seconds that elapse per simulation tick. Speed scaling changes
/// the wall-clock cadence of ticks, never this value, so movement math stays
/// identical at every speed setting.
pub const SIM_TICK_SECONDS: f32 = 0.1;

/// Clamp range for the clock speed multiplier.
pub const MIN_SPEED: f32 = 0.25;
pub const MAX_SPEED: f32 = 16.0;

/// Border (in cells, both axes combined) excluded from the outdoor capacity
/// formula: `floor((w - OUTDOOR_MARGIN) * (h - OUTDOOR_MARGIN) / OUTDOOR_DENSITY)`.
pub const OUTDOOR_MARGIN: usize = 12;

/// One outdoor agent per this many interior cells.
pub const OUTDOOR_DENSITY: usize = 10;

/// Rejection-sampling ceiling for a single outdoor placement. Exhausting it
/// aborts the whole outdoor pass (soft exhaustion, logged, never fatal).
pub const PLACEMENT_ATTEMPT_LIMIT: u32 = 300;

/// Indoor occupants allowed per unit of floor width.
pub const FLOOR_UNIT_CAPACITY: usize = 2;

/// Raster value in the zone layer marking a cell as an edge zone
/// (ineligible for entity placement).
pub const EDGE_ZONE_ID: u8 = 1;
