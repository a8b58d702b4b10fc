//! Fixed-decimal distance formatting.
//!
//! Values are rendered with exactly one decimal digit using HALF_UP rounding
//! (`"1.25" -> "1.3"`), a leading `-` for negative input and a space-separated
//! unit suffix. The formatter runs on the per-frame path, so it keeps the last
//! result and returns it untouched when the next call rounds to the same
//! output. On a miss the owned buffer is rebuilt in place.

use std::fmt::Write as _;

use crate::units::LengthUnit;

/// Printed in place of a number for NaN, infinities and magnitudes whose
/// tenths do not fit in a `u64`.
pub const NON_FINITE: &str = "--";

/// Rounded magnitude plus sign; two calls with equal buckets print the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Tenths { rounded: u64, negative: bool },
    Unprintable,
}

impl Bucket {
    fn of(value: f32) -> Self {
        // Adding 0.5 before truncating rounds half up for non-negative input.
        let scaled = value.abs() * 10.0 + 0.5;
        // `as u64` saturates, so anything at or past u64::MAX would print wrong.
        if !scaled.is_finite() || scaled >= u64::MAX as f32 {
            return Bucket::Unprintable;
        }
        Bucket::Tenths {
            rounded: scaled as u64,
            negative: value < 0.0,
        }
    }
}

/// Cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatterStats {
    pub hits: u64,
    pub misses: u64,
}

/// Formatter with a one-entry output cache.
#[derive(Debug, Default)]
pub struct DistanceFormatter {
    cached: Option<Bucket>,
    unit: String,
    output: String,
    stats: FormatterStats,
}

impl DistanceFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Formats `value` followed by `unit`, e.g. `"1.3 cm"`.
    pub fn format(&mut self, value: f32, unit: &str) -> &str {
        let bucket = Bucket::of(value);
        if self.cached == Some(bucket) && self.unit == unit {
            self.stats.hits += 1;
            return &self.output;
        }

        self.stats.misses += 1;
        self.output.clear();
        match bucket {
            Bucket::Tenths { rounded, negative } => {
                if negative {
                    self.output.push('-');
                }
                // Writing into a String cannot fail.
                let _ = write!(self.output, "{}.{}", rounded / 10, rounded % 10);
            }
            Bucket::Unprintable => self.output.push_str(NON_FINITE),
        }
        self.output.push(' ');
        self.output.push_str(unit);

        self.cached = Some(bucket);
        self.unit.clear();
        self.unit.push_str(unit);
        &self.output
    }

    /// Converts meters into `unit` and formats with the unit suffix.
    pub fn format_length(&mut self, meters: f32, unit: LengthUnit) -> &str {
        self.format(unit.convert(meters), unit.suffix())
    }

    pub fn stats(&self) -> FormatterStats {
        self.stats
    }

    /// Drops the cached entry; the next call always rebuilds.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
