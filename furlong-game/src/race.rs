//! Tick-based race simulation engine.
//!
//! The engine is a poll-driven stepper: the caller owns the cadence
//! (the browser layer uses a 100ms timer) and invokes [`RaceEngine::tick`]
//! once per logical step. Each tick advances every unfinished horse using
//! momentum, energy, and trait-triggered phases, then reports a snapshot.
//! There are no error states; the minimum per-tick movement floor
//! guarantees completion within a bounded number of ticks.

use rand::Rng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::{BoostKind, GameConfig, PhaseId, PhaseKind};
use crate::constants::{
    BASE_STEP_SIZE, BOOSTER_POWER_MIDPOINT, EARLY_PHASE_WEIGHT, EARLY_WINDOW_END,
    ENERGY_BASE_DRAIN, ENERGY_EFFORT_DRAIN, ENERGY_FACTOR_FLOOR, ENERGY_FLOOR,
    FINISH_LINE_PROGRESS, INITIAL_ENERGY_BASE, INITIAL_MOMENTUM_BASE, LATE_PHASE_WEIGHT,
    LATE_RACE_ESCALATION, MID_PHASE_WEIGHT, MID_WINDOW_END, MIN_FINISHERS_FOR_EARLY_END,
    MIN_TICKS_BEFORE_EARLY_END, MIN_TICK_MOVEMENT, MOMENTUM_DRIFT_SPREAD, MOMENTUM_MAX,
    MOMENTUM_MIN, MOVEMENT_JITTER_SPREAD, PERFORMANCE_STEP_FACTOR, PHASE_BASE_CHANCE,
    PHASE_EFFORT_WEIGHT, RACE_TICK_HARD_LIMIT, SINCE_EVENT_ESCALATION, STRUGGLE_MOMENTUM_FLOOR,
    STRUGGLE_MOMENTUM_LOSS, STRUGGLE_POOL_CHANCE, STRUGGLE_POOL_WEIGHT, SURGE_MOMENTUM_CAP,
    SURGE_MOMENTUM_GAIN, TRAIT_CHANCE_TICK_SCALE,
};
use crate::horse::{Horse, HorseId};
use crate::performance::calculate_horse_performance;
use crate::rng::weighted_choice;

const EARLY_PHASES: [PhaseId; 2] = [PhaseId::EarlyBurst, PhaseId::QuickStart];
const MID_PHASES: [PhaseId; 4] = [
    PhaseId::MidRaceSurge,
    PhaseId::SteadyPush,
    PhaseId::Grind,
    PhaseId::Sprint,
];
const LATE_PHASES: [PhaseId; 3] = [
    PhaseId::FinalKick,
    PhaseId::DesperateCharge,
    PhaseId::Sprint,
];

/// A phase currently modifying a horse's per-tick movement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivePhase {
    pub id: PhaseId,
    pub kind: PhaseKind,
    /// Flat movement bonus (or penalty) applied each tick while active.
    pub flat_bonus: f64,
    /// Absolute tick at which the phase expires.
    pub ends_at_tick: u32,
}

/// Ephemeral per-race state layered over a horse snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub horse: Horse,
    /// Precomputed race-day multiplier; fixed for the whole race.
    pub base_performance: f64,
    pub progress: f64,
    pub momentum: f64,
    pub energy: f64,
    pub ticks_since_event: u32,
    pub event_count: u32,
    pub active_phase: Option<ActivePhase>,
    pub finish_tick: Option<u32>,
    pub has_finished: bool,
}

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceStatus {
    Running,
    Finished,
    Aborted,
}

/// Active-phase descriptor surfaced to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDescriptor {
    pub id: PhaseId,
    pub kind: PhaseKind,
}

/// One horse's row in a per-tick snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    /// Display progress, capped at the finish line.
    pub progress: f64,
    pub phase: Option<PhaseDescriptor>,
    /// 1-based placement once finished.
    pub finish_place: Option<usize>,
    pub has_finished: bool,
}

/// Snapshot emitted after every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub tick: u32,
    pub status: RaceStatus,
    pub positions: HashMap<HorseId, PositionUpdate>,
}

/// The race simulator. Owns its participants and a per-race RNG fork so
/// an aborted race never disturbs the session's other streams.
#[derive(Debug, Clone)]
pub struct RaceEngine {
    cfg: GameConfig,
    rng: ChaCha20Rng,
    race_distance: u32,
    tick: u32,
    participants: Vec<Participant>,
    finish_order: Vec<HorseId>,
    status: RaceStatus,
}

impl RaceEngine {
    /// Set up a race: precompute each horse's performance multiplier and
    /// seed momentum and energy within their configured bands. The boost,
    /// if any, applies only to the selected horse.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cfg: &GameConfig,
        horses: &[Horse],
        selected: HorseId,
        boost: Option<BoostKind>,
        race_distance: u32,
        race_number: u32,
        wallet: i64,
        mut rng: ChaCha20Rng,
    ) -> Self {
        let participants = horses
            .iter()
            .map(|horse| {
                let horse_boost = if horse.id == selected { boost } else { None };
                let base_performance = calculate_horse_performance(
                    cfg,
                    &mut rng,
                    horse,
                    race_distance,
                    horse_boost,
                    race_number,
                    wallet,
                );
                Participant {
                    horse: horse.clone(),
                    base_performance,
                    progress: 0.0,
                    momentum: INITIAL_MOMENTUM_BASE + rng.r#gen::<f64>() * cfg.momentum_variance,
                    energy: INITIAL_ENERGY_BASE + rng.r#gen::<f64>() * cfg.energy_variance,
                    ticks_since_event: 0,
                    event_count: 0,
                    active_phase: None,
                    finish_tick: None,
                    has_finished: false,
                }
            })
            .collect();

        Self {
            cfg: cfg.clone(),
            rng,
            race_distance,
            tick: 0,
            participants,
            finish_order: Vec::new(),
            status: RaceStatus::Running,
        }
    }

    #[must_use]
    pub const fn status(&self) -> RaceStatus {
        self.status
    }

    #[must_use]
    pub const fn tick_count(&self) -> u32 {
        self.tick
    }

    #[must_use]
    pub const fn race_distance(&self) -> u32 {
        self.race_distance
    }

    #[must_use]
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Stop the race before its termination condition fires. Subsequent
    /// ticks are no-ops; results rank whatever progress exists.
    pub fn abort(&mut self) {
        if self.status == RaceStatus::Running {
            self.status = RaceStatus::Aborted;
        }
    }

    /// Advance one logical step and report positions. Calling after the
    /// race has ended returns the final snapshot unchanged.
    pub fn tick(&mut self) -> RaceSnapshot {
        if self.status != RaceStatus::Running {
            return self.snapshot();
        }

        self.tick += 1;
        let race_progress = f64::from(self.tick) / f64::from(self.cfg.max_race_ticks);

        for participant in &mut self.participants {
            if participant.has_finished {
                continue;
            }
            update_participant(
                &self.cfg,
                &mut self.rng,
                participant,
                self.tick,
                race_progress,
            );
            if participant.progress >= FINISH_LINE_PROGRESS {
                participant.has_finished = true;
                participant.finish_tick = Some(self.tick);
                self.finish_order.push(participant.horse.id);
            }
        }

        if self.termination_reached() {
            self.status = RaceStatus::Finished;
        }
        self.snapshot()
    }

    /// Current positions without advancing the simulation.
    #[must_use]
    pub fn snapshot(&self) -> RaceSnapshot {
        let positions = self
            .participants
            .iter()
            .map(|p| {
                let finish_place = self
                    .finish_order
                    .iter()
                    .position(|id| *id == p.horse.id)
                    .map(|idx| idx + 1);
                let update = PositionUpdate {
                    progress: p.progress.min(FINISH_LINE_PROGRESS),
                    phase: p.active_phase.map(|phase| PhaseDescriptor {
                        id: phase.id,
                        kind: phase.kind,
                    }),
                    finish_place,
                    has_finished: p.has_finished,
                };
                (p.horse.id, update)
            })
            .collect();
        RaceSnapshot {
            tick: self.tick,
            status: self.status,
            positions,
        }
    }

    /// Consume the engine, yielding the full participant list.
    #[must_use]
    pub fn into_participants(self) -> Vec<Participant> {
        self.participants
    }

    fn termination_reached(&self) -> bool {
        let all_finished = self.participants.iter().all(|p| p.has_finished);
        let podium_settled = self.finish_order.len() >= MIN_FINISHERS_FOR_EARLY_END
            && self.tick > MIN_TICKS_BEFORE_EARLY_END;
        all_finished || podium_settled
    }
}

/// Drive an engine to completion, invoking `on_tick` with every snapshot,
/// and return the final participant list. A hard tick limit bounds the
/// loop well above the structural worst case.
pub fn run_race(
    mut engine: RaceEngine,
    mut on_tick: impl FnMut(&RaceSnapshot),
) -> Vec<Participant> {
    while engine.status() == RaceStatus::Running && engine.tick_count() < RACE_TICK_HARD_LIMIT {
        let snapshot = engine.tick();
        on_tick(&snapshot);
    }
    engine.into_participants()
}

fn update_participant(
    cfg: &GameConfig,
    rng: &mut ChaCha20Rng,
    participant: &mut Participant,
    tick: u32,
    race_progress: f64,
) {
    participant.ticks_since_event += 1;

    // Escalating trigger odds: drought and late-race drama both raise the
    // chance, so every horse eventually fires something.
    let mut phase_chance = PHASE_BASE_CHANCE;
    for trait_id in &participant.horse.traits {
        if let Some(def) = cfg.traits.get(trait_id) {
            phase_chance += def.phase_chance / TRAIT_CHANCE_TICK_SCALE;
        }
    }
    let drought_multiplier =
        1.0 + f64::from(participant.ticks_since_event) * SINCE_EVENT_ESCALATION;
    let progress_multiplier = 1.0 + race_progress * LATE_RACE_ESCALATION;
    phase_chance *= drought_multiplier * progress_multiplier;

    let can_trigger = participant.event_count < cfg.target_phase_events
        && participant.active_phase.is_none();
    if can_trigger && rng.r#gen::<f64>() < phase_chance {
        trigger_phase(cfg, rng, participant, tick, race_progress);
    }

    let movement = calculate_movement(cfg, rng, participant, tick);
    participant.progress += movement;

    drain_energy(participant);
}

#[derive(Clone, Copy)]
struct PhaseCandidate {
    phase: PhaseId,
    power: f64,
}

fn trigger_phase(
    cfg: &GameConfig,
    rng: &mut ChaCha20Rng,
    participant: &mut Participant,
    tick: u32,
    race_progress: f64,
) {
    participant.ticks_since_event = 0;
    participant.event_count += 1;

    let mut candidates = eligible_phases(cfg, &participant.horse, race_progress);
    // All horses risk plain bad luck, traits or not.
    if rng.r#gen::<f64>() < STRUGGLE_POOL_CHANCE {
        candidates.push((
            PhaseCandidate {
                phase: PhaseId::Struggle,
                power: 1.0,
            },
            STRUGGLE_POOL_WEIGHT,
        ));
    }

    let Some(candidate) = weighted_choice(rng, &candidates).copied() else {
        return;
    };
    let Some(phase_def) = cfg.phases.get(&candidate.phase) else {
        return;
    };

    // Booster power amplifies magnitude only; duration follows trait power.
    let booster_modifier =
        (1.0 + f64::from(participant.horse.booster_power) / BOOSTER_POWER_MIDPOINT) / 2.0;
    let flat_bonus =
        phase_def.base_bonus * candidate.power * booster_modifier * cfg.event_power_scaling;
    let duration = (f64::from(phase_def.base_duration) * candidate.power)
        .round()
        .max(1.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let duration = duration as u32;

    participant.active_phase = Some(ActivePhase {
        id: candidate.phase,
        kind: phase_def.kind,
        flat_bonus,
        ends_at_tick: tick + duration,
    });
}

fn eligible_phases(
    cfg: &GameConfig,
    horse: &Horse,
    race_progress: f64,
) -> Vec<(PhaseCandidate, f64)> {
    let mut candidates = Vec::new();
    for trait_id in &horse.traits {
        let Some(def) = cfg.traits.get(trait_id) else {
            continue;
        };
        for &phase in &def.phases {
            let weight = if race_progress < EARLY_WINDOW_END && EARLY_PHASES.contains(&phase) {
                Some(EARLY_PHASE_WEIGHT)
            } else if race_progress < MID_WINDOW_END && MID_PHASES.contains(&phase) {
                Some(MID_PHASE_WEIGHT)
            } else if race_progress >= MID_WINDOW_END && LATE_PHASES.contains(&phase) {
                Some(LATE_PHASE_WEIGHT)
            } else {
                None
            };
            if let Some(weight) = weight {
                candidates.push((
                    PhaseCandidate {
                        phase,
                        power: def.power_modifier,
                    },
                    weight,
                ));
            }
        }
    }
    candidates
}

fn calculate_movement(
    cfg: &GameConfig,
    rng: &mut ChaCha20Rng,
    participant: &mut Participant,
    tick: u32,
) -> f64 {
    let mut phase_bonus = 0.0;
    if let Some(phase) = participant.active_phase {
        if tick < phase.ends_at_tick {
            phase_bonus = phase.flat_bonus;
            match phase.kind {
                PhaseKind::Surge => {
                    participant.momentum =
                        (participant.momentum + SURGE_MOMENTUM_GAIN).min(SURGE_MOMENTUM_CAP);
                }
                PhaseKind::Struggle => {
                    participant.momentum = (participant.momentum - STRUGGLE_MOMENTUM_LOSS)
                        .max(STRUGGLE_MOMENTUM_FLOOR);
                }
                PhaseKind::Steady => {}
            }
        } else {
            // Phase ends exactly at its computed tick.
            participant.active_phase = None;
        }
    }

    // Continuous drift is what makes two races with the same field differ
    // even when no phase fires.
    let drift = (rng.r#gen::<f64>() - 0.5) * MOMENTUM_DRIFT_SPREAD;
    participant.momentum = (participant.momentum + drift).clamp(MOMENTUM_MIN, MOMENTUM_MAX);

    let energy_factor = (participant.energy / 100.0).max(ENERGY_FACTOR_FLOOR);
    let core_increment = BASE_STEP_SIZE
        * cfg.race_speed_multiplier
        * participant.base_performance
        * PERFORMANCE_STEP_FACTOR
        * participant.momentum
        * energy_factor;

    let jitter = (rng.r#gen::<f64>() - 0.5) * MOVEMENT_JITTER_SPREAD;
    (core_increment + phase_bonus + jitter).max(MIN_TICK_MOVEMENT)
}

fn drain_energy(participant: &mut Participant) {
    let phase_bonus = participant
        .active_phase
        .as_ref()
        .map_or(0.0, |phase| phase.flat_bonus);
    let effort = participant.momentum + (phase_bonus * PHASE_EFFORT_WEIGHT).abs();
    participant.energy =
        (participant.energy - (ENERGY_BASE_DRAIN + effort * ENERGY_EFFORT_DRAIN)).max(ENERGY_FLOOR);
}
