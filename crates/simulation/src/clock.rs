//! Simulation clock: pause, speed scaling, and interaction suspension.
//!
//! Speed scaling changes the wall-clock cadence of the fixed schedule, not
//! the per-tick game-time step, so one tick advances the world by the same
//! amount at every speed setting.

use bevy::prelude::*;

use crate::agents::HoverPaused;
use crate::config::{BASE_TICK_HZ, MAX_SPEED, MIN_SPEED};
use crate::lifecycle::MapState;

#[derive(Resource, Debug, Clone, Copy)]
pub struct SimClock {
    pub paused: bool,
    /// Speed multiplier, clamped to [`MIN_SPEED`]..[`MAX_SPEED`].
    pub speed: f32,
    /// True while an interaction overlay is open; suspends the whole
    /// simulation independently of the pause toggle.
    pub interacting: bool,
}

impl Default for SimClock {
    fn default() -> Self {
        Self {
            paused: false,
            speed: 1.0,
            interacting: false,
        }
    }
}

impl SimClock {
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    }

    pub fn running(&self) -> bool {
        !self.paused && !self.interacting
    }
}

/// An interaction overlay opened (`true`) or closed (`false`).
#[derive(Event, Debug, Clone, Copy)]
pub struct InteractionChanged(pub bool);

/// Pointer entered or left an agent. Enter freezes that one agent; exit
/// releases it without touching the global clock.
#[derive(Event, Debug, Clone, Copy)]
pub enum HoverEvent {
    Enter(Entity),
    Exit(Entity),
}

/// Run condition for every simulation system that advances world state.
/// Camera, depth keying, and clock controls deliberately stay outside it.
pub fn simulation_active(clock: Res<SimClock>, state: Res<State<MapState>>) -> bool {
    clock.running() && *state.get() == MapState::Ready
}

pub fn apply_interaction_events(
    mut clock: ResMut<SimClock>,
    mut events: EventReader<InteractionChanged>,
) {
    for InteractionChanged(active) in events.read() {
        clock.interacting = *active;
    }
}

pub fn apply_hover_events(mut commands: Commands, mut events: EventReader<HoverEvent>) {
    for event in events.read() {
        // The target may have been despawned by a map rebuild in the same
        // frame; get_entity tolerates that.
        match *event {
            HoverEvent::Enter(entity) => {
                if let Some(mut e) = commands.get_entity(entity) {
                    e.insert(HoverPaused);
                }
            }
            HoverEvent::Exit(entity) => {
                if let Some(mut e) = commands.get_entity(entity) {
                    e.remove::<HoverPaused>();
                }
            }
        }
    }
}

/// Keep the fixed schedule's wall-clock cadence in sync with the speed
/// multiplier.
pub fn sync_fixed_timestep(clock: Res<SimClock>, mut fixed: ResMut<Time<Fixed>>) {
    if clock.is_changed() {
        fixed.set_timestep_hz(BASE_TICK_HZ * clock.speed as f64);
    }
}

pub struct ClockPlugin;

impl Plugin for ClockPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimClock>()
            .insert_resource(Time::<Fixed>::from_hz(BASE_TICK_HZ))
            .add_event::<InteractionChanged>()
            .add_event::<HoverEvent>()
            .add_systems(
                Update,
                (apply_interaction_events, apply_hover_events, sync_fixed_timestep).chain(),
            );
    }
}
