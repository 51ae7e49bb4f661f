//! Deterministic season harness: plays whole seasons with a simple greedy
//! policy and records per-race outcomes for aggregate analysis.

use log::debug;
use serde::Serialize;

use furlong_game::{
    GameConfig, GameState, Horse, RaceEngine, UpgradeKind, apply_upgrade_to_all_horses,
    apply_upgrade_to_horse, breed_horses, calculate_comeback_bonus, calculate_prize_pool,
    can_apply_upgrade, entry_fee_options, generate_upgrade_options, horse_buying_options,
    process_player_winnings, process_race_results, run_race,
};

/// Configuration for one season run.
#[derive(Debug, Clone, Copy)]
pub struct SeasonConfig {
    pub seed: u64,
    pub max_races: u32,
}

impl SeasonConfig {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            max_races: 12,
        }
    }

    #[must_use]
    pub const fn with_max_races(mut self, max_races: u32) -> Self {
        self.max_races = max_races;
        self
    }
}

/// One race's outcome within a season.
#[derive(Debug, Clone, Serialize)]
pub struct RaceRecord {
    pub race_number: u32,
    pub distance: u32,
    pub entry_fee: i64,
    pub position: usize,
    pub winnings: i64,
    pub wallet_after: i64,
    pub ticks: u32,
}

/// Aggregate result of a full season.
#[derive(Debug, Clone, Serialize)]
pub struct SeasonSummary {
    pub seed: u64,
    pub races_run: u32,
    pub wins: u32,
    pub podiums: u32,
    pub final_wallet: i64,
    pub won: bool,
    /// Races played while the comeback bonus was active.
    pub comeback_races: u32,
    pub stable_size: usize,
    pub best_speed: i32,
    pub records: Vec<RaceRecord>,
}

/// Play one season: enter the cheapest fee each race with the best-fitting
/// horse, collect winnings, and take the first applicable upgrade.
#[must_use]
pub fn run_season(cfg: &GameConfig, sim: SeasonConfig) -> SeasonSummary {
    let mut state = GameState::new_game(cfg, sim.seed);
    let mut records = Vec::new();
    let mut wins = 0;
    let mut podiums = 0;
    let mut comeback_races = 0;

    for lap in 0..sim.max_races {
        if state.has_won(cfg) {
            break;
        }
        let fees = entry_fee_options(cfg, state.race_number, state.wallet);
        let Some(fee) = fees.first().copied() else {
            debug!("seed {}: bankrupt at race {}", sim.seed, state.race_number);
            break;
        };
        if calculate_comeback_bonus(cfg, state.race_number, state.wallet) > 1.0 {
            comeback_races += 1;
        }

        let distance = cfg.race_distances[lap as usize % cfg.race_distances.len()];
        let selected = best_horse_for(&state.horses, distance).id;
        state.selected_horse = Some(selected);

        let mut field = vec![state.horse(selected).expect("selected exists").clone()];
        field.extend(state.generate_ai_field(cfg));

        state.pay_entry_fee(fee.amount);
        let race_rng = state.rng().race_rng(state.race_number);
        let engine = RaceEngine::new(
            cfg,
            &field,
            selected,
            None,
            distance,
            state.race_number,
            state.wallet,
            race_rng,
        );
        let mut ticks = 0;
        let participants = run_race(engine, |snapshot| ticks = snapshot.tick);

        let ordered = process_race_results(&participants);
        let pool = calculate_prize_pool(cfg, Some(&fee));
        let placement = process_player_winnings(&ordered, selected, &pool);
        state.record_placement(cfg, &placement);

        if placement.position == 0 {
            wins += 1;
        }
        if placement.placed {
            podiums += 1;
        }

        let updated: Vec<Horse> = state
            .horses
            .iter()
            .map(|h| {
                if h.id == selected {
                    h.after_race(cfg, placement.position)
                } else {
                    h.clone()
                }
            })
            .collect();
        state.replace_roster(updated);

        apply_first_applicable_upgrade(cfg, &mut state, distance);

        records.push(RaceRecord {
            race_number: state.race_number,
            distance,
            entry_fee: fee.amount,
            position: placement.position,
            winnings: placement.winnings,
            wallet_after: state.wallet,
            ticks,
        });
        state.advance_race();
    }

    SeasonSummary {
        seed: sim.seed,
        races_run: u32::try_from(records.len()).unwrap_or(u32::MAX),
        wins,
        podiums,
        final_wallet: state.wallet,
        won: state.has_won(cfg),
        comeback_races,
        stable_size: state.horses.len(),
        best_speed: state.best_player_speed().unwrap_or(0),
        records,
    }
}

fn best_horse_for(horses: &[Horse], distance: u32) -> &Horse {
    horses
        .iter()
        .min_by_key(|h| (h.distance_preference - i32::try_from(distance).unwrap_or(0)).abs())
        .expect("stable is never empty")
}

fn apply_first_applicable_upgrade(cfg: &GameConfig, state: &mut GameState, distance: u32) {
    let bundle = state.rng();
    let options = {
        let mut economy_rng = bundle.economy();
        generate_upgrade_options(
            cfg,
            &mut *economy_rng,
            state.race_number,
            state.wallet,
            state.horses.len(),
        )
    };
    let Some(upgrade) = options
        .iter()
        .find(|u| can_apply_upgrade(u, state.wallet, state.horses.len()).is_ok())
    else {
        return;
    };
    debug!("applying upgrade {}", upgrade.name);

    match upgrade.kind {
        UpgradeKind::Breed => {
            let foal = {
                let mut stable_rng = bundle.stable();
                breed_horses(
                    cfg,
                    &mut *stable_rng,
                    &mut state.ids,
                    &state.horses[0],
                    &state.horses[1],
                    state.race_number,
                    state.wallet,
                )
            };
            state.add_offspring(foal);
        }
        UpgradeKind::BuyHorse => {
            let offers = {
                let mut stable_rng = bundle.stable();
                horse_buying_options(cfg, &mut *stable_rng, &mut state.ids, &state.horses)
            };
            if let Some(offer) = offers.first() {
                state.purchase_horse(offer);
            }
        }
        UpgradeKind::StableSpeed { .. } | UpgradeKind::StableRest => {
            let roster = apply_upgrade_to_all_horses(upgrade, &state.horses);
            state.replace_roster(roster);
        }
        _ => {
            let Some(target) = state.selected_horse.and_then(|id| state.horse(id)).cloned()
            else {
                return;
            };
            let upgraded = {
                let mut economy_rng = bundle.economy();
                apply_upgrade_to_horse(cfg, &mut *economy_rng, upgrade, &target, distance)
            };
            let roster: Vec<Horse> = state
                .horses
                .iter()
                .map(|h| {
                    if h.id == upgraded.id {
                        upgraded.clone()
                    } else {
                        h.clone()
                    }
                })
                .collect();
            state.replace_roster(roster);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seasons_are_seed_stable() {
        let cfg = GameConfig::default_config();
        let one = run_season(&cfg, SeasonConfig::new(1337));
        let two = run_season(&cfg, SeasonConfig::new(1337));
        assert_eq!(one.final_wallet, two.final_wallet);
        assert_eq!(one.races_run, two.races_run);
        assert_eq!(one.wins, two.wins);
    }

    #[test]
    fn season_respects_race_cap() {
        let cfg = GameConfig::default_config();
        let summary = run_season(&cfg, SeasonConfig::new(7).with_max_races(3));
        assert!(summary.races_run <= 3);
        assert_eq!(summary.records.len() as u32, summary.races_run);
    }
}
