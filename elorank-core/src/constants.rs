/// Rating points separating two items whose expected scores differ by a factor of ten.
/// Standard Elo scaling. Fixed, not configurable.
pub const ELO_SCALE: f64 = 400.0;

/// Default rating assigned to items added without an explicit initial rating.
pub const DEFAULT_INITIAL_RATING: f64 = 1500.0;

/// Default k-factor: the maximum rating movement a single comparison can cause.
pub const DEFAULT_K_FACTOR: f64 = 32.0;

/// Default number of comparisons the least-compared item needs before the
/// population is considered saturated.
pub const DEFAULT_MINIMUM_COMPARISONS: u32 = 10;

/// Default rating floor. No item's rating is ever allowed below this value.
pub const DEFAULT_MIN_RATING: f64 = 100.0;

/// Default per-comparison rating change below which an item counts as settled.
pub const DEFAULT_RATING_CHANGE_THRESHOLD: f64 = 10.0;

/// Default length of the trailing history window inspected for stability.
pub const DEFAULT_STABLE_COMPARISONS: usize = 5;

/// Opponent scoring weights. These are fixed constants of the selection
/// heuristic and must sum to 1.0.
pub const RATING_PROXIMITY_WEIGHT: f64 = 0.4;
pub const COMPARISON_PROXIMITY_WEIGHT: f64 = 0.4;
pub const RECENCY_WEIGHT: f64 = 0.2;

/// An opponent idle for at least this many days gets the full recency score.
pub const RECENCY_WINDOW_DAYS: i64 = 7;
