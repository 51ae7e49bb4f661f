use furlong_game::{
    GameConfig, GameState, Horse, RaceEngine, UpgradeKind, apply_upgrade_to_all_horses,
    apply_upgrade_to_horse, breed_horses, calculate_comeback_bonus, calculate_prize_pool,
    can_apply_upgrade, entry_fee_options, generate_scout_reports, generate_upgrade_options,
    horse_buying_options, process_player_winnings, process_race_results, run_race,
};

const SEASON_RACES: usize = 10;

/// Play a full season headlessly: enter races, collect winnings, apply
/// whatever upgrade comes up, and keep every invariant intact throughout.
#[test]
fn full_season_exercises_core_systems() {
    let cfg = GameConfig::default_config();
    let mut state = GameState::new_game(&cfg, 0xF0A1_CAFE);
    let mut races_run = 0;

    for lap in 0..SEASON_RACES {
        if state.has_won(&cfg) {
            break;
        }
        let fees = entry_fee_options(&cfg, state.race_number, state.wallet);
        let Some(fee) = fees.first().copied() else {
            break; // broke: no affordable entry
        };
        let distance = cfg.race_distances[lap % cfg.race_distances.len()];

        let selected = best_horse_for(&state.horses, distance).id;
        state.selected_horse = Some(selected);

        let ai_field = state.generate_ai_field(&cfg);
        let reports = {
            let bundle = state.rng();
            let mut scout_rng = bundle.scout();
            generate_scout_reports(&cfg, &mut *scout_rng, &ai_field, &state.horses, distance)
        };
        assert_eq!(reports.len(), ai_field.len());

        let mut field = vec![state.horse(selected).unwrap().clone()];
        field.extend(ai_field);

        state.pay_entry_fee(fee.amount);
        assert!(state.wallet >= 0, "entry fee overdrew the wallet");

        let race_rng = state.rng().race_rng(state.race_number);
        let engine = RaceEngine::new(
            &cfg,
            &field,
            selected,
            None,
            distance,
            state.race_number,
            state.wallet,
            race_rng,
        );
        let participants = run_race(engine, |snapshot| {
            assert!(snapshot.positions.len() == field.len());
        });

        let ordered = process_race_results(&participants);
        let pool = calculate_prize_pool(&cfg, Some(&fee));
        assert!(pool.first + pool.second + pool.third <= fee.amount * 8);
        let placement = process_player_winnings(&ordered, selected, &pool);
        state.record_placement(&cfg, &placement);

        // Copy fatigue and career counters back onto the raced horse.
        let updated: Vec<Horse> = state
            .horses
            .iter()
            .map(|h| {
                if h.id == selected {
                    h.after_race(&cfg, placement.position)
                } else {
                    h.clone()
                }
            })
            .collect();
        state.replace_roster(updated);

        apply_post_race_upgrade(&cfg, &mut state, distance);

        for horse in &state.horses {
            assert!((30..=105).contains(&horse.speed));
            assert!((30..=105).contains(&horse.booster_power));
            assert!((0..=100).contains(&horse.fatigue));
            assert!((1..=3).contains(&horse.traits.len()));
        }

        state.advance_race();
        races_run += 1;
    }

    assert!(races_run > 0, "season never started");
    assert_eq!(state.race_number, u32::try_from(races_run).unwrap() + 1);
    assert!(!state.logs.is_empty());
    // The comeback knob stays in its documented range all season.
    let bonus = calculate_comeback_bonus(&cfg, state.race_number, state.wallet);
    assert!([1.0, 1.5, 2.0, 3.0].contains(&bonus));
}

fn best_horse_for(horses: &[Horse], distance: u32) -> &Horse {
    horses
        .iter()
        .min_by_key(|h| {
            (h.distance_preference - i32::try_from(distance).unwrap_or(0)).abs()
        })
        .expect("stable is never empty")
}

fn apply_post_race_upgrade(cfg: &GameConfig, state: &mut GameState, distance: u32) {
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
    assert!(!options.is_empty() && options.len() <= 3);

    let Some(upgrade) = options
        .iter()
        .find(|u| can_apply_upgrade(u, state.wallet, state.horses.len()).is_ok())
    else {
        return;
    };

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
            state.purchase_horse(&offers[0]);
        }
        UpgradeKind::StableSpeed { .. } | UpgradeKind::StableRest => {
            let roster = apply_upgrade_to_all_horses(upgrade, &state.horses);
            state.replace_roster(roster);
        }
        _ => {
            let target = state.selected_horse.and_then(|id| state.horse(id)).cloned();
            if let Some(target) = target {
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
}
