//! Score records and the leaderboard
//!
//! Finished runs are appended to a [`ScoreStore`]; the leaderboard ranks them
//! by score (newest first on ties). The local store persists to LocalStorage.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::UserId;

/// Rows shown on the leaderboard
pub const DEFAULT_BOARD_SIZE: usize = 10;

/// Records kept by the local store before the lowest are dropped
pub const MAX_STORED_RECORDS: usize = 500;

/// A finished run, as emitted by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub user_id: UserId,
    pub score: u64,
    pub mon_tokens: u32,
    pub level_reached: u32,
}

/// A stored run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub user_id: UserId,
    pub score: u64,
    pub mon_tokens: u32,
    pub level_reached: u32,
    /// Unix timestamp (ms) when stored
    pub created_at: f64,
}

impl ScoreRecord {
    pub fn from_submission(submission: ScoreSubmission, created_at: f64) -> Self {
        Self {
            user_id: submission.user_id,
            score: submission.score,
            mon_tokens: submission.mon_tokens,
            level_reached: submission.level_reached,
            created_at,
        }
    }
}

/// Why a store operation failed
#[derive(Debug)]
pub enum StoreError {
    /// Backing storage cannot be reached
    Unavailable(String),
    /// Stored data could not be encoded or decoded
    Serialization(serde_json::Error),
    /// The store is full of better runs; the submission was not kept
    NotRetained { score: u64 },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(what) => write!(f, "score store unavailable: {what}"),
            Self::Serialization(err) => write!(f, "score store data error: {err}"),
            Self::NotRetained { score } => write!(
                f,
                "score {score} is below the lowest of the {MAX_STORED_RECORDS} kept runs"
            ),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialization(err) => Some(err),
            Self::Unavailable(_) | Self::NotRetained { .. } => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}

/// Append-only score persistence
pub trait ScoreStore {
    /// Append a finished run. Fails with [`StoreError::NotRetained`] when
    /// the run ranks below everything the store keeps.
    fn record_score(&mut self, submission: ScoreSubmission) -> Result<ScoreRecord, StoreError>;

    /// Up to `n` records, score descending, most recent first on ties
    fn top_scores(&self, n: usize) -> Result<Vec<ScoreRecord>, StoreError>;
}

/// Leaderboard order: score descending, then newest first
fn rank_order(a: &ScoreRecord, b: &ScoreRecord) -> Ordering {
    b.score.cmp(&a.score).then_with(|| {
        b.created_at
            .partial_cmp(&a.created_at)
            .unwrap_or(Ordering::Equal)
    })
}

/// Sort records into leaderboard order
pub fn rank_records(records: &mut [ScoreRecord]) {
    records.sort_by(rank_order);
}

/// Score store backed by LocalStorage on the web, memory elsewhere
#[derive(Debug, Clone)]
pub struct LocalScoreStore {
    records: Vec<ScoreRecord>,
    clock: fn() -> f64,
}

impl Default for LocalScoreStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalScoreStore {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "gas_dodger_scores";

    /// Create an empty store
    pub fn new() -> Self {
        Self::with_clock(crate::platform::now_ms)
    }

    /// Create an empty store stamping records with `clock`
    pub fn with_clock(clock: fn() -> f64) -> Self {
        Self {
            records: Vec::new(),
            clock,
        }
    }

    /// All stored records, leaderboard order
    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Load records from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let mut store = Self::new();
        if let Some(json) = crate::platform::storage::get_item(Self::STORAGE_KEY) {
            match serde_json::from_str::<Vec<ScoreRecord>>(&json) {
                Ok(mut records) => {
                    rank_records(&mut records);
                    log::info!("Loaded {} score records", records.len());
                    store.records = records;
                }
                Err(err) => log::warn!("Discarding unreadable score records: {err}"),
            }
        } else {
            log::info!("No score records found, starting fresh");
        }
        store
    }

    /// Save records to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.records)?;
        crate::platform::storage::set_item(Self::STORAGE_KEY, &json)
            .map_err(StoreError::Unavailable)?;
        log::info!("Score records saved ({} entries)", self.records.len());
        Ok(())
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) -> Result<(), StoreError> {
        // No-op for native
        Ok(())
    }
}

impl ScoreStore for LocalScoreStore {
    fn record_score(&mut self, submission: ScoreSubmission) -> Result<ScoreRecord, StoreError> {
        let record = ScoreRecord::from_submission(submission, (self.clock)());
        // Records stay sorted, so the insertion point is the new rank
        let index = self
            .records
            .partition_point(|r| rank_order(r, &record) == Ordering::Less);
        if index >= MAX_STORED_RECORDS {
            return Err(StoreError::NotRetained {
                score: record.score,
            });
        }
        self.records.insert(index, record.clone());
        self.records.truncate(MAX_STORED_RECORDS);
        self.save()?;
        Ok(record)
    }

    fn top_scores(&self, n: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        Ok(self.records.iter().take(n).cloned().collect())
    }
}

/// Medal for the podium, plain number below it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBadge {
    Gold,
    Silver,
    Bronze,
    Numbered(usize),
}

impl RankBadge {
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            1 => RankBadge::Gold,
            2 => RankBadge::Silver,
            3 => RankBadge::Bronze,
            n => RankBadge::Numbered(n),
        }
    }

    pub fn label(&self) -> String {
        match self {
            RankBadge::Gold => "🥇".to_string(),
            RankBadge::Silver => "🥈".to_string(),
            RankBadge::Bronze => "🥉".to_string(),
            RankBadge::Numbered(n) => format!("#{n}"),
        }
    }
}

/// One leaderboard row
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    /// 1-indexed
    pub rank: usize,
    pub name: String,
    pub score: u64,
    pub level: u32,
    pub mon_collected: u32,
    /// Unix timestamp (ms)
    pub timestamp: f64,
}

impl LeaderboardEntry {
    pub fn badge(&self) -> RankBadge {
        RankBadge::for_rank(self.rank)
    }
}

/// Ranked rows ready for display
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
    /// True when the rows are the placeholder board
    pub is_placeholder: bool,
}

impl Leaderboard {
    /// Build the board from stored records (already in leaderboard order)
    pub fn from_records(records: &[ScoreRecord]) -> Self {
        let entries = records
            .iter()
            .enumerate()
            .map(|(i, r)| LeaderboardEntry {
                rank: i + 1,
                name: r.user_id.display_name(),
                score: r.score,
                level: r.level_reached,
                mon_collected: r.mon_tokens,
                timestamp: r.created_at,
            })
            .collect();
        Self {
            entries,
            is_placeholder: false,
        }
    }

    /// Query the store; any failure yields the placeholder board
    pub fn fetch(store: &dyn ScoreStore, n: usize, now: f64) -> Self {
        match store.top_scores(n) {
            Ok(records) => Self::from_records(&records),
            Err(err) => {
                log::warn!("Leaderboard unavailable, showing placeholder: {err}");
                Self::placeholder(now)
            }
        }
    }

    /// Static board shown when the store cannot be queried
    pub fn placeholder(now: f64) -> Self {
        const HOUR_MS: f64 = 3_600_000.0;
        let rows = [
            ("CryptoNinja", 50_000, 15, 234),
            ("GasDodger", 42_000, 12, 189),
            ("MONster", 38_500, 11, 156),
        ];
        let entries = rows
            .iter()
            .enumerate()
            .map(|(i, &(name, score, level, mon))| LeaderboardEntry {
                rank: i + 1,
                name: name.to_string(),
                score,
                level,
                mon_collected: mon,
                timestamp: now - HOUR_MS * (i + 1) as f64,
            })
            .collect();
        Self {
            entries,
            is_placeholder: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank the given user's best run holds, if they are on the board
    pub fn rank_of(&self, user: &UserId) -> Option<usize> {
        let name = user.display_name();
        self.entries.iter().find(|e| e.name == name).map(|e| e.rank)
    }
}

/// Aggregate stats over one player's runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStats {
    pub high_score: u64,
    pub games_played: u32,
    pub total_mon_collected: u64,
    pub best_level: u32,
}

impl PlayerStats {
    pub fn for_user(records: &[ScoreRecord], user: &UserId) -> Self {
        records
            .iter()
            .filter(|r| &r.user_id == user)
            .fold(Self::default(), |mut stats, r| {
                stats.high_score = stats.high_score.max(r.score);
                stats.games_played += 1;
                stats.total_mon_collected += r.mon_tokens as u64;
                stats.best_level = stats.best_level.max(r.level_reached);
                stats
            })
    }
}

/// Thousands separators, as the board displays scores
pub fn format_score(score: u64) -> String {
    let digits = score.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Relative age for anything younger than a week
pub fn format_age(diff_ms: f64) -> Option<String> {
    let diff_mins = diff_ms / 60_000.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 7.0 {
        return None;
    }

    let text = if diff_days >= 1.0 {
        let days = diff_days.floor() as i32;
        if days == 1 {
            "Yesterday".to_string()
        } else {
            format!("{} days ago", days)
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as i32;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as i32;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    };
    Some(text)
}

/// Format a timestamp as a relative date string
#[cfg(target_arch = "wasm32")]
pub fn format_date(timestamp: f64) -> String {
    let now = js_sys::Date::now();
    format_age(now - timestamp).unwrap_or_else(|| {
        let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
        format!(
            "{}/{}/{}",
            date.get_month() + 1,
            date.get_date(),
            date.get_full_year() % 100
        )
    })
}

#[cfg(not(target_arch = "wasm32"))]
pub fn format_date(timestamp: f64) -> String {
    format_age(crate::platform::now_ms() - timestamp).unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    thread_local! {
        static NOW: Cell<f64> = const { Cell::new(1_000.0) };
    }

    fn ticking_clock() -> f64 {
        NOW.with(|now| {
            let t = now.get();
            now.set(t + 1_000.0);
            t
        })
    }

    fn submission(user: &str, score: u64) -> ScoreSubmission {
        ScoreSubmission {
            user_id: UserId::new(user),
            score,
            mon_tokens: (score / 100) as u32,
            level_reached: (score / 1000) as u32 + 1,
        }
    }

    #[test]
    fn test_top_scores_order() {
        let mut store = LocalScoreStore::with_clock(ticking_clock);
        store.record_score(submission("alice", 300)).unwrap();
        store.record_score(submission("bob", 900)).unwrap();
        store.record_score(submission("carol", 300)).unwrap();
        store.record_score(submission("dave", 50)).unwrap();

        let top = store.top_scores(3).unwrap();
        let names: Vec<_> = top.iter().map(|r| r.user_id.as_str()).collect();
        // Tie at 300: carol is more recent than alice
        assert_eq!(names, vec!["bob", "carol", "alice"]);
    }

    #[test]
    fn test_full_store_rejects_runs_below_the_cutoff() {
        let mut store = LocalScoreStore::with_clock(ticking_clock);
        for i in 0..MAX_STORED_RECORDS {
            store.record_score(submission(&format!("pro{i}"), 10_000)).unwrap();
        }

        let err = store.record_score(submission("newbie", 5)).unwrap_err();
        assert!(matches!(err, StoreError::NotRetained { score: 5 }));
        assert_eq!(store.records().len(), MAX_STORED_RECORDS);
        assert!(store.records().iter().all(|r| r.user_id.as_str() != "newbie"));

        // A better run still gets in and pushes the oldest tie out
        let kept = store.record_score(submission("champ", 20_000)).unwrap();
        assert_eq!(store.records()[0], kept);
        assert_eq!(store.records().len(), MAX_STORED_RECORDS);
        assert!(store.records().iter().all(|r| r.user_id.as_str() != "pro0"));
    }

    #[test]
    fn test_top_scores_fewer_than_n() {
        let mut store = LocalScoreStore::with_clock(ticking_clock);
        store.record_score(submission("alice", 10)).unwrap();
        assert_eq!(store.top_scores(10).unwrap().len(), 1);
        assert!(LocalScoreStore::with_clock(ticking_clock).top_scores(5).unwrap().is_empty());
    }

    struct BrokenStore;

    impl ScoreStore for BrokenStore {
        fn record_score(&mut self, _: ScoreSubmission) -> Result<ScoreRecord, StoreError> {
            Err(StoreError::Unavailable("offline".into()))
        }

        fn top_scores(&self, _: usize) -> Result<Vec<ScoreRecord>, StoreError> {
            Err(StoreError::Unavailable("offline".into()))
        }
    }

    #[test]
    fn test_fetch_falls_back_to_placeholder() {
        let board = Leaderboard::fetch(&BrokenStore, DEFAULT_BOARD_SIZE, 10_000_000.0);
        assert!(board.is_placeholder);
        assert_eq!(board.entries.len(), 3);
        assert_eq!(board.entries[0].name, "CryptoNinja");
        assert_eq!(board.entries[0].score, 50_000);
        assert_eq!(board.entries[2].badge(), RankBadge::Bronze);
    }

    #[test]
    fn test_board_from_records() {
        let mut store = LocalScoreStore::with_clock(ticking_clock);
        store.record_score(submission("0123456789abcdef", 4200)).unwrap();
        let board = Leaderboard::fetch(&store, DEFAULT_BOARD_SIZE, 0.0);
        assert!(!board.is_placeholder);
        assert_eq!(board.entries[0].rank, 1);
        assert_eq!(board.entries[0].name, "Player_01234567");
        assert_eq!(board.entries[0].level, 5);
        assert_eq!(board.rank_of(&UserId::new("0123456789abcdef")), Some(1));
    }

    #[test]
    fn test_player_stats() {
        let mut store = LocalScoreStore::with_clock(ticking_clock);
        store.record_score(submission("alice", 2500)).unwrap();
        store.record_score(submission("alice", 700)).unwrap();
        store.record_score(submission("bob", 9000)).unwrap();

        let stats = PlayerStats::for_user(store.records(), &UserId::new("alice"));
        assert_eq!(stats.high_score, 2500);
        assert_eq!(stats.games_played, 2);
        assert_eq!(stats.total_mon_collected, 32);
        assert_eq!(stats.best_level, 3);
    }

    #[test]
    fn test_badges() {
        assert_eq!(RankBadge::for_rank(1), RankBadge::Gold);
        assert_eq!(RankBadge::for_rank(7).label(), "#7");
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(0), "0");
        assert_eq!(format_score(999), "999");
        assert_eq!(format_score(1000), "1,000");
        assert_eq!(format_score(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(5_000.0).as_deref(), Some("Just now"));
        assert_eq!(format_age(90_000.0).as_deref(), Some("1 min ago"));
        assert_eq!(format_age(3.0 * 3_600_000.0).as_deref(), Some("3 hours ago"));
        assert_eq!(format_age(30.0 * 3_600_000.0).as_deref(), Some("Yesterday"));
        assert!(format_age(8.0 * 86_400_000.0).is_none());
    }
}
