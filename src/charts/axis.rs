//! Axes
//! Tick builders for the time axis under the bars and the value axis with
//! gridlines.

use crate::charts::scale::{BandScale, LinearScale};
use crate::data::Dataset;

#[derive(Clone, Debug, PartialEq)]
pub struct AxisTick {
    /// Stable key for the scene join.
    pub key: String,
    pub px: f64,
    pub label: Option<String>,
}

/// One tick per band whose centre lies within `visible`, labelled with the
/// time of day.
pub fn bottom_ticks(x: &BandScale, data: &Dataset, visible: (f64, f64)) -> Vec<AxisTick> {
    let (lo, hi) = visible;
    x.indices_within(lo, hi)
        .filter_map(|i| {
            let point = data.get(i)?;
            let px = x.center(i)?;
            (lo..=hi).contains(&px).then(|| AxisTick {
                key: point.datetime.clone(),
                px,
                label: Some(point.time_of_day()),
            })
        })
        .collect()
}

/// Value ticks; the labels at both ends of the domain are left out.
pub fn left_ticks(y: &LinearScale, count: usize) -> Vec<AxisTick> {
    let (d0, d1) = y.domain();
    y.ticks(count)
        .into_iter()
        .map(|v| {
            let at_bound = v == d0 || v == d1;
            AxisTick {
                key: format_value(v),
                px: y.map(v),
                label: (!at_bound).then(|| format_value(v)),
            }
        })
        .collect()
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        let s = format!("{v:.6}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
