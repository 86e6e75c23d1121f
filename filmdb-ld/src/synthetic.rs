//! Synthetic attribute generation
//!
//! Studio assignments, role attributes, award wins, favorites and review
//! metadata have no source data; they are drawn uniformly from fixed ranges.
//! The generator is seedable so runs (and tests) can be reproduced.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Built-in award catalog
pub const AWARD_LIST: [&str; 8] = [
    "Academy Award Best Picture",
    "Academy Award Best Director",
    "Golden Globe Best Drama",
    "Golden Globe Best Comedy",
    "BAFTA Best Film",
    "Cannes Palme d'Or",
    "Berlin Golden Bear",
    "Venice Golden Lion",
];

pub const DIRECTING_STYLES: [&str; 8] = [
    "Realism",
    "Surrealism",
    "Documentary-style",
    "Experimental",
    "Character-driven",
    "Action-heavy",
    "Fantasy-oriented",
    "Minimalist",
];

pub const WRITING_STYLES: [&str; 7] = [
    "Dialogue-focused",
    "Non-linear narrative",
    "Character-driven writing",
    "High-concept storytelling",
    "Comedy writing",
    "Dark drama",
    "Thriller style",
];

/// Upper bound for an actor's fan count
pub const MAX_FANS: i64 = 3000;

/// Review ratings are drawn from this inclusive range
pub const RATING_RANGE: (i64, i64) = (1, 10);

/// Timestamp format stored in `Review.post_time`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Seedable source of synthetic values
pub struct Synthetic {
    rng: StdRng,
}

impl Synthetic {
    /// Seeded generator, or entropy-seeded when `seed` is None
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn fan_count(&mut self) -> i64 {
        self.rng.gen_range(0..=MAX_FANS)
    }

    pub fn directing_style(&mut self) -> &'static str {
        DIRECTING_STYLES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(DIRECTING_STYLES[0])
    }

    pub fn writing_style(&mut self) -> &'static str {
        WRITING_STYLES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(WRITING_STYLES[0])
    }

    pub fn rating(&mut self) -> i64 {
        self.rng.gen_range(RATING_RANGE.0..=RATING_RANGE.1)
    }

    /// True with probability `p`
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform pick from a slice
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    /// Uniform integer in the inclusive range; `low` when the range is empty
    pub fn between(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    /// Uniform timestamp from Jan 1 of `start_year` up to (not including)
    /// Dec 31 of `end_year`, to the second
    pub fn timestamp_in(&mut self, start_year: i32, end_year: i32) -> NaiveDateTime {
        let start = NaiveDate::from_ymd_opt(start_year, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        let end = NaiveDate::from_ymd_opt(end_year, 12, 31)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or(start);
        let span = (end - start).num_seconds();
        if span <= 0 {
            return start;
        }
        start + Duration::seconds(self.rng.gen_range(0..span))
    }

    /// Distinct random subset whose size is uniform in `range`, clamped to
    /// the number of items available
    pub fn subset<'a, T>(&mut self, items: &'a [T], range: (usize, usize)) -> Vec<&'a T> {
        let wanted = if range.1 <= range.0 {
            range.0
        } else {
            self.rng.gen_range(range.0..=range.1)
        };
        items
            .choose_multiple(&mut self.rng, wanted.min(items.len()))
            .collect()
    }

    /// Reservoir sample of at most `size` items from a stream
    pub fn reservoir<T>(&mut self, size: usize) -> Reservoir<'_, T> {
        Reservoir {
            rng: &mut self.rng,
            size,
            seen: 0,
            items: Vec::with_capacity(size.min(1 << 16)),
        }
    }
}

/// Fixed-size uniform sample over a stream of unknown length
pub struct Reservoir<'r, T> {
    rng: &'r mut StdRng,
    size: usize,
    seen: usize,
    items: Vec<T>,
}

impl<T> Reservoir<'_, T> {
    pub fn offer(&mut self, item: T) {
        if self.items.len() < self.size {
            self.items.push(item);
        } else {
            let slot = self.rng.gen_range(0..=self.seen);
            if slot < self.size {
                self.items[slot] = item;
            }
        }
        self.seen += 1;
    }

    /// Number of items offered so far
    pub fn seen(&self) -> usize {
        self.seen
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}
