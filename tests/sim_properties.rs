use gas_dodger::sim::{GamePhase, GameState, MoveIntent, TickInput, tick};
use gas_dodger::Tuning;

use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

fn intent() -> impl Strategy<Value = MoveIntent> {
    prop_oneof![
        Just(MoveIntent::Idle),
        (any::<bool>(), any::<bool>()).prop_map(|(left, right)| MoveIntent::Keys { left, right }),
        any::<f32>().prop_map(|target_x| MoveIntent::Drag { target_x }),
        (-2000.0f32..2000.0).prop_map(|target_x| MoveIntent::Drag { target_x }),
    ]
}

fn input() -> impl Strategy<Value = TickInput> {
    // Toggles are rare so most ticks actually run
    (intent(), prop::bool::weighted(0.05)).prop_map(|(movement, pause)| TickInput { movement, pause })
}

proptest! {
    #[test]
    fn player_stays_on_the_playfield(
        seed in any::<u64>(),
        inputs in prop::collection::vec(input(), 1..400),
    ) {
        let tuning = Tuning::default();
        let mut state = GameState::new(&tuning);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut events = Vec::new();

        for input in &inputs {
            tick(&mut state, input, &tuning, &mut rng, &mut events);
            let x = state.player.pos.x;
            prop_assert!(x.is_finite());
            prop_assert!((0.0..=tuning.player_max_x()).contains(&x), "x = {}", x);
        }
    }

    #[test]
    fn level_follows_score(seed in any::<u64>(), ticks in 1usize..3000) {
        let tuning = Tuning::default();
        let mut state = GameState::new(&tuning);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut events = Vec::new();

        for _ in 0..ticks {
            tick(&mut state, &TickInput::default(), &tuning, &mut rng, &mut events);
            prop_assert_eq!(state.level() as u64, state.score / 1000 + 1);
            prop_assert!(state.lives <= tuning.starting_lives);
            prop_assert_eq!(state.lives == 0, state.phase == GamePhase::GameOver);
        }
    }

    #[test]
    fn bomb_spawn_chance_rises_with_level(level in 1u32..500) {
        let tuning = Tuning::default();
        prop_assert!(tuning.bomb_spawn_chance(level + 1) > tuning.bomb_spawn_chance(level));
    }
}
