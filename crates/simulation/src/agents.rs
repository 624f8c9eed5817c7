use bevy::prelude::*;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Marker component for simulation agents.
#[derive(Component)]
pub struct Agent;

/// Backend identity id of this agent.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgentId(pub u64);

/// One roster record supplied by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct RosterEntry {
    pub id: u64,
    pub profile: AgentProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentProfile {
    pub agent_type: String,
    #[serde(default)]
    pub display_name: String,
}

/// Profile payload carried on the spawned entity for display surfaces.
#[derive(Component, Debug, Clone)]
pub struct Profile(pub AgentProfile);

// ---------------------------------------------------------------------------
// Visual category
// ---------------------------------------------------------------------------

/// One of the five character sprite sheets an agent can render with.
/// Derived from the agent's declared type via [`crate::population::CategoryTable`];
/// unmapped types fall back to [`VisualCategory::FALLBACK`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualCategory {
    Executive,
    Office,
    Service,
    Casual,
    Visitor,
}

impl VisualCategory {
    pub const ALL: [VisualCategory; 5] = [
        VisualCategory::Executive,
        VisualCategory::Office,
        VisualCategory::Service,
        VisualCategory::Casual,
        VisualCategory::Visitor,
    ];

    /// The last category doubles as the default for unmapped types.
    pub const FALLBACK: VisualCategory = VisualCategory::Visitor;
}

// ---------------------------------------------------------------------------
// Spatial state
// ---------------------------------------------------------------------------

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    pub x: usize,
    pub y: usize,
}

/// World-units-per-second velocity, written by the external mover.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

/// Logical movement state, owned by the external mover. Hover suspension
/// consults it on pointer-out: motion resumes only if the agent should
/// still be moving.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveState {
    #[default]
    Idle,
    Moving,
}

/// Marker for agents allocated into a building interior. Indoor agents are
/// not members of the outdoor scene layer and skip movement integration.
#[derive(Component)]
pub struct Indoors;

/// The building entity an indoor agent was allocated into.
#[derive(Component, Debug, Clone, Copy)]
pub struct Inside {
    pub building: Entity,
    pub floor: usize,
}

/// Pointer-hover suspension: freezes this one agent's movement/animation
/// while present. Global pause state is unaffected.
#[derive(Component)]
pub struct HoverPaused;
