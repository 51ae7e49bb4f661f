//! Session state: the roster, wallet, and race counter the orchestration
//! layer owns. The roster is swapped atomically as whole lists; horses
//! themselves are immutable snapshots.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

use crate::config::GameConfig;
use crate::constants::{
    LOG_RACE_PLACED, LOG_RACE_UNPLACED, LOG_SEASON_WON, LOG_STABLE_BRED, LOG_STABLE_PURCHASED,
};
use crate::horse::{Horse, HorseId, HorseIdAllocator, generate_horse};
use crate::results::PlayerPlacement;
use crate::rng::RngBundle;

/// Top-level session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub seed: u64,
    pub wallet: i64,
    pub race_number: u32,
    /// The player's stable. Replaced wholesale, never mutated in place.
    pub horses: Vec<Horse>,
    pub selected_horse: Option<HorseId>,
    pub ids: HorseIdAllocator,
    /// Stable log keys for the presentation layer to localize.
    pub logs: Vec<String>,
    #[serde(skip)]
    pub rng_bundle: Option<Rc<RngBundle>>,
}

impl GameState {
    /// Start a fresh session: seeded RNG streams and a starting stable of
    /// one specialist per supported race distance.
    #[must_use]
    pub fn new_game(cfg: &GameConfig, seed: u64) -> Self {
        let bundle = Rc::new(RngBundle::from_user_seed(seed));
        let mut ids = HorseIdAllocator::default();
        let horses: Vec<Horse> = {
            let mut rng = bundle.stable();
            cfg.race_distances
                .iter()
                .map(|&distance| {
                    let anchor = i32::try_from(distance).unwrap_or(1800);
                    let preference = anchor
                        + rng.gen_range(-cfg.market_distance_spread..=cfg.market_distance_spread);
                    generate_horse(cfg, &mut *rng, &mut ids, true, 1, Some(preference), None)
                })
                .collect()
        };
        let selected_horse = horses.first().map(|h| h.id);
        Self {
            seed,
            wallet: cfg.initial_wallet,
            race_number: 1,
            horses,
            selected_horse,
            ids,
            logs: Vec::new(),
            rng_bundle: Some(bundle),
        }
    }

    /// Attach (or replace) the RNG bundle, e.g. after deserialization.
    pub fn attach_rng_bundle(&mut self, bundle: Rc<RngBundle>) {
        self.rng_bundle = Some(bundle);
    }

    /// The session RNG bundle, recreated from the seed when absent.
    #[must_use]
    pub fn rng(&mut self) -> Rc<RngBundle> {
        if let Some(bundle) = &self.rng_bundle {
            return bundle.clone();
        }
        let bundle = Rc::new(RngBundle::from_user_seed(self.seed));
        self.rng_bundle = Some(bundle.clone());
        bundle
    }

    #[must_use]
    pub fn horse(&self, id: HorseId) -> Option<&Horse> {
        self.horses.iter().find(|h| h.id == id)
    }

    #[must_use]
    pub fn best_player_speed(&self) -> Option<i32> {
        self.horses.iter().map(|h| h.speed).max()
    }

    /// Generate the AI field for the next race, scaled against the
    /// player's best horse.
    pub fn generate_ai_field(&mut self, cfg: &GameConfig) -> Vec<Horse> {
        let best = self.best_player_speed();
        let bundle = self.rng();
        let mut rng = bundle.stable();
        (0..cfg.ai_horse_count)
            .map(|_| {
                generate_horse(
                    cfg,
                    &mut *rng,
                    &mut self.ids,
                    false,
                    self.race_number,
                    None,
                    best,
                )
            })
            .collect()
    }

    /// Atomically replace the roster.
    pub fn replace_roster(&mut self, horses: Vec<Horse>) {
        if let Some(selected) = self.selected_horse
            && !horses.iter().any(|h| h.id == selected)
        {
            self.selected_horse = horses.first().map(|h| h.id);
        }
        self.horses = horses;
    }

    /// Add a purchased market horse to the stable.
    pub fn purchase_horse(&mut self, offer: &Horse) {
        self.horses.push(offer.purchased());
        self.logs.push(String::from(LOG_STABLE_PURCHASED));
    }

    /// Add a bred offspring to the stable.
    pub fn add_offspring(&mut self, foal: Horse) {
        self.horses.push(foal);
        self.logs.push(String::from(LOG_STABLE_BRED));
    }

    pub fn pay_entry_fee(&mut self, amount: i64) {
        self.wallet -= amount;
    }

    /// Credit winnings and log the outcome.
    pub fn record_placement(&mut self, cfg: &GameConfig, placement: &PlayerPlacement) {
        self.wallet += placement.winnings;
        self.logs.push(String::from(if placement.placed {
            LOG_RACE_PLACED
        } else {
            LOG_RACE_UNPLACED
        }));
        if self.has_won(cfg) {
            self.logs.push(String::from(LOG_SEASON_WON));
        }
    }

    pub fn advance_race(&mut self) {
        self.race_number += 1;
    }

    /// Wealth-goal check.
    #[must_use]
    pub const fn has_won(&self, cfg: &GameConfig) -> bool {
        self.wallet >= cfg.win_condition
    }
}
