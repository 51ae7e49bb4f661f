//! Result ranking, entry fees, and prize distribution.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::GameConfig;
use crate::constants::{
    ENTRY_FEE_CAP, ENTRY_MAX_FACTOR, ENTRY_MED_FACTOR, PRIZE_FIRST_SHARE, PRIZE_SECOND_SHARE,
    PRIZE_THIRD_SHARE,
};
use crate::economy::min_entry_fee;
use crate::horse::HorseId;
use crate::numbers::{floor_f64_to_i64, i64_to_f64};
use crate::race::Participant;

/// Rank a finished (or aborted) field.
///
/// Finished horses sort by finish tick; unfinished horses rank strictly
/// below all finished ones, ordered by descending progress so the horse
/// closest to the line places best among them.
#[must_use]
pub fn process_race_results(participants: &[Participant]) -> Vec<Participant> {
    let mut ordered = participants.to_vec();
    ordered.sort_by(|a, b| match (a.finish_tick, b.finish_tick) {
        (Some(ta), Some(tb)) => ta.cmp(&tb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => b.progress.total_cmp(&a.progress),
    });
    ordered
}

/// Fee ladder tiers offered before each race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryTier {
    Min,
    Med,
    Max,
}

impl EntryTier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Min => "Min",
            Self::Med => "Med",
            Self::Max => "Max",
        }
    }
}

impl fmt::Display for EntryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selectable entry fee. Stateless and recomputed every race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFee {
    pub amount: i64,
    pub tier: EntryTier,
}

/// The fee ladder for a given race and wallet.
///
/// Each tier is capped by the wallet and a hard ceiling, then filtered to
/// affordable positive amounts; colliding amounts keep the higher tier.
#[must_use]
pub fn entry_fee_options(cfg: &GameConfig, race_number: u32, wallet: i64) -> Vec<EntryFee> {
    let min_bet = min_entry_fee(cfg, race_number);
    let max_allowed = wallet.min(ENTRY_FEE_CAP);

    let ladder = [
        (min_bet, EntryTier::Min),
        (floor_f64_to_i64(i64_to_f64(min_bet) * ENTRY_MED_FACTOR), EntryTier::Med),
        (floor_f64_to_i64(i64_to_f64(min_bet) * ENTRY_MAX_FACTOR), EntryTier::Max),
    ];

    let mut options: Vec<EntryFee> = ladder
        .into_iter()
        .map(|(amount, tier)| EntryFee {
            amount: amount.min(max_allowed),
            tier,
        })
        .filter(|fee| fee.amount > 0 && fee.amount <= wallet)
        .collect();

    // Capping can collapse tiers onto the same amount; keep the higher one.
    let mut deduped: Vec<EntryFee> = Vec::with_capacity(options.len());
    options.reverse();
    for fee in options {
        if !deduped.iter().any(|kept| kept.amount == fee.amount) {
            deduped.insert(0, fee);
        }
    }
    deduped
}

/// Prize money per podium place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrizePool {
    pub first: i64,
    pub second: i64,
    pub third: i64,
}

/// Pool from entry fees of every participant, player included,
/// split 70/20/10 and floored. No fee means no pool.
#[must_use]
pub fn calculate_prize_pool(cfg: &GameConfig, entry_fee: Option<&EntryFee>) -> PrizePool {
    let Some(fee) = entry_fee else {
        return PrizePool::default();
    };
    let competitors = i64::try_from(cfg.ai_horse_count).unwrap_or(0) + 1;
    let total = i64_to_f64(fee.amount * competitors);
    PrizePool {
        first: floor_f64_to_i64(total * PRIZE_FIRST_SHARE),
        second: floor_f64_to_i64(total * PRIZE_SECOND_SHARE),
        third: floor_f64_to_i64(total * PRIZE_THIRD_SHARE),
    }
}

/// The player's outcome for one race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPlacement {
    /// 0-based index in the ordered results; the field size when the
    /// player's horse was somehow absent.
    pub position: usize,
    pub winnings: i64,
    pub placed: bool,
}

/// Look up the player's placement and pool share.
#[must_use]
pub fn process_player_winnings(
    ordered_results: &[Participant],
    player_horse: HorseId,
    prize_pool: &PrizePool,
) -> PlayerPlacement {
    let position = ordered_results
        .iter()
        .position(|p| p.horse.id == player_horse)
        .unwrap_or(ordered_results.len());
    let winnings = match position {
        0 => prize_pool.first,
        1 => prize_pool.second,
        2 => prize_pool.third,
        _ => 0,
    };
    PlayerPlacement {
        position,
        winnings,
        placed: position < 3,
    }
}
