//! Narrator lines
//!
//! A one-liner per notable event, picked at random from a small pool, plus
//! crypto trivia on request. Separate from the toast text in
//! [`GameEvent::message`], which stays fixed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::GameEvent;

const START: &[&str] = &[
    "Welcome to the MONad Multiverse! Time to dodge some fees! 🚀",
    "Another brave Node Runner enters the chaos! 💫",
    "Gas fees are coming... but Monad's speed is your advantage! ⚡",
];

const HIT: &[&str] = &[
    "Ouch! That gas bomb hit harder than Ethereum in 2021! 💥",
    "A wild gas fee appears! Your wallet feels lighter... 💸",
    "That'll teach you to use slow chains! 🐌",
    "Gas fees: the real boss battle of crypto! ⛽",
];

const COLLECT: &[&str] = &[
    "Sweet! MON tokens are the future! 💎",
    "Cha-ching! Another MON in the bag! 🎯",
    "Collecting tokens like a true DeFi degen! 🔥",
    "Monad rewards the fast and fearless! ⚡",
];

const LEVEL_UP: &[&str] = &[
    "Level up! The multiverse gets more dangerous... 📈",
    "Difficulty spike incoming! Hope you're ready! 🌪️",
    "Welcome to the next dimension of chaos! 🌀",
    "More speed = more problems! 🏃",
];

const GAME_OVER: &[&str] = &[
    "RIP Node Runner. The gas fees got you... ⚰️",
    "Game Over! Time to respawn and try again! 💀",
    "The multiverse claims another victim... 👻",
    "Even the best runners get caught eventually! 🏁",
];

const FACTS: &[&str] = &[
    "Did you know? Monad can process 10,000+ TPS! 🚄",
    "Fun fact: Gas fees on Ethereum once hit $200+ per transaction! 💸",
    "Monad uses parallel execution to avoid the gas fee nightmare! ⚡",
    "The longest pending transaction on Ethereum lasted 3 days! ⏰",
    "MEV bots can front-run your transactions in milliseconds! 🤖",
];

fn pick<R: Rng + ?Sized>(pool: &'static [&'static str], rng: &mut R) -> &'static str {
    pool[rng.random_range(0..pool.len())]
}

/// Line for an event, `None` for events the narrator ignores
pub fn narration_for<R: Rng + ?Sized>(event: &GameEvent, rng: &mut R) -> Option<&'static str> {
    let pool = match event {
        GameEvent::Restarted => START,
        GameEvent::BombHit { .. } => HIT,
        GameEvent::TokenCollected { .. } => COLLECT,
        GameEvent::LevelUp { .. } => LEVEL_UP,
        GameEvent::GameOver { .. } => GAME_OVER,
        GameEvent::Paused | GameEvent::Resumed | GameEvent::ScoreRecorded(_) => return None,
    };
    Some(pick(pool, rng))
}

/// Random piece of trivia
pub fn crypto_fact<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    pick(FACTS, rng)
}

/// Narrator with its own RNG, so quotes never disturb the spawn sequence
#[derive(Debug, Clone)]
pub struct Narrator {
    rng: Pcg32,
    line: &'static str,
}

impl Narrator {
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let line = pick(START, &mut rng);
        Self { rng, line }
    }

    /// Current line
    pub fn line(&self) -> &'static str {
        self.line
    }

    /// React to an event; returns the new line if it changed
    pub fn observe(&mut self, event: &GameEvent) -> Option<&'static str> {
        let line = narration_for(event, &mut self.rng)?;
        self.line = line;
        Some(line)
    }

    /// Switch to a random fact
    pub fn fact(&mut self) -> &'static str {
        self.line = crypto_fact(&mut self.rng);
        self.line
    }
}
