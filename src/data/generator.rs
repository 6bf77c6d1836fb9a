//! Synthetic Data Generator
//! Produces the fixed-size time series the chart renders.

use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use thiserror::Error;
use tracing::debug;

/// Upper bound (exclusive) for generated values.
pub const VALUE_CEILING: u32 = 99;

/// One bar of the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub timestamp: NaiveDateTime,
    pub value: u32,
    /// 0 is the most recent point.
    pub sequence_index: usize,
    /// Display label, also the key the band scale and scene use.
    pub datetime: String,
}

impl DataPoint {
    pub fn new(timestamp: NaiveDateTime, value: u32, sequence_index: usize) -> Self {
        Self {
            datetime: format_label(&timestamp),
            timestamp,
            value,
            sequence_index,
        }
    }

    /// Time of day for axis ticks.
    pub fn time_of_day(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// `Y/M/D H:M` without zero padding, e.g. `2024/1/1 0:0`.
pub fn format_label(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%Y/%-m/%-d %-H:%-M").to_string()
}

#[derive(Error, Debug, PartialEq)]
pub enum GenerateError {
    #[error("Point {index} at {spacing_minutes} minute spacing falls outside the supported date range")]
    OutOfRange { index: usize, spacing_minutes: i64 },
}

/// Immutable series, stored oldest first.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    points: Vec<DataPoint>,
}

impl Dataset {
    /// Generate `count` points spaced `spacing_minutes` apart, going back from `now`.
    pub fn generate<R: Rng + ?Sized>(
        now: NaiveDateTime,
        count: usize,
        spacing_minutes: i64,
        rng: &mut R,
    ) -> Result<Self, GenerateError> {
        let mut points: Vec<DataPoint> = (0..count)
            .map(|i| {
                let timestamp = (i as i64)
                    .checked_mul(spacing_minutes)
                    .and_then(Duration::try_minutes)
                    .and_then(|back| now.checked_sub_signed(back))
                    .ok_or(GenerateError::OutOfRange {
                        index: i,
                        spacing_minutes,
                    })?;
                Ok(DataPoint::new(timestamp, rng.gen_range(0..VALUE_CEILING), i))
            })
            .collect::<Result<_, GenerateError>>()?;

        // Oldest first so positions run left to right in time
        points.sort_by(|a, b| b.sequence_index.cmp(&a.sequence_index));
        debug!(count, spacing_minutes, "generated dataset");

        Ok(Self { points })
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point at a chronological position (0 = oldest).
    pub fn get(&self, position: usize) -> Option<&DataPoint> {
        self.points.get(position)
    }

    pub fn by_sequence(&self, sequence_index: usize) -> Option<&DataPoint> {
        let position = self.points.len().checked_sub(sequence_index + 1)?;
        self.points.get(position)
    }

    pub fn most_recent(&self) -> Option<&DataPoint> {
        self.points.last()
    }

    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|p| p.datetime.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn new_year() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn generates_fixed_count_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let data = Dataset::generate(new_year(), 1500, 30, &mut rng).unwrap();
        assert_eq!(data.len(), 1500);
        assert!(data.points().iter().all(|p| p.value <= 99));
    }

    #[test]
    fn timestamps_step_back_by_spacing() {
        let mut rng = StdRng::seed_from_u64(1);
        let data = Dataset::generate(new_year(), 1500, 30, &mut rng).unwrap();
        for seq in 1..data.len() {
            let newer = data.by_sequence(seq - 1).unwrap();
            let older = data.by_sequence(seq).unwrap();
            assert_eq!(newer.timestamp - older.timestamp, Duration::minutes(30));
        }
    }

    #[test]
    fn stored_oldest_first() {
        let mut rng = StdRng::seed_from_u64(3);
        let data = Dataset::generate(new_year(), 10, 30, &mut rng).unwrap();
        assert_eq!(data.get(0).unwrap().sequence_index, 9);
        assert_eq!(data.most_recent().unwrap().sequence_index, 0);
        assert!(data
            .points()
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn labels_are_unpadded() {
        let point = DataPoint::new(new_year(), 5, 0);
        assert_eq!(point.datetime, "2024/1/1 0:0");
        assert_eq!(point.time_of_day(), "00:00");

        let earlier = DataPoint::new(new_year() - Duration::minutes(30), 5, 1);
        assert_eq!(earlier.datetime, "2023/12/31 23:30");
    }

    #[test]
    fn huge_spacing_is_an_error() {
        let mut rng = StdRng::seed_from_u64(3);
        let err = Dataset::generate(new_year(), 1500, 1_000_000_000, &mut rng).unwrap_err();
        assert!(matches!(err, GenerateError::OutOfRange { .. }));

        let err = Dataset::generate(new_year(), 3, i64::MAX, &mut rng).unwrap_err();
        assert_eq!(
            err,
            GenerateError::OutOfRange {
                index: 1,
                spacing_minutes: i64::MAX
            }
        );
    }

    #[test]
    fn by_sequence_out_of_range_is_none() {
        let mut rng = StdRng::seed_from_u64(3);
        let data = Dataset::generate(new_year(), 4, 30, &mut rng).unwrap();
        assert!(data.by_sequence(4).is_none());
        assert!(Dataset::default().most_recent().is_none());
    }
}
