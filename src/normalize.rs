//! Collapses the two raw cycle shapes into the one canonical view the
//! renderers consume.

use crate::models::{CycleResponse, FlatCycle, NormalizedView, Period};

/// Clamp to `[0, 100]` (treating missing or non-finite values as zero)
/// and round to one decimal place.
pub fn normalize_progress(progress: Option<f64>) -> f64 {
    let value = progress.unwrap_or(0.0);
    let value = if value.is_finite() { value } else { 0.0 };
    (value.clamp(0.0, 100.0) * 10.0).round() / 10.0
}

/// Normalize a raw response. For a `business_cycles` list the first
/// business is the representative record; the dashboard summary always
/// reflects it, never an aggregate.
pub fn normalize(response: &CycleResponse) -> NormalizedView {
    match response {
        CycleResponse::BusinessList { business_cycles } => match business_cycles.first() {
            Some(first) => {
                let current_period = first
                    .current_period
                    .clone()
                    .or_else(|| first.periods.first().cloned())
                    .unwrap_or_default();
                // position of the current period by full equality, not
                // name matching, so duplicate names stay unambiguous
                let number = first
                    .periods
                    .iter()
                    .position(|p| *p == current_period)
                    .map(|i| i + 1)
                    .unwrap_or(1);

                NormalizedView {
                    progress: normalize_progress(first.progress),
                    period_name: current_period.name.clone(),
                    periods: first.periods.clone(),
                    current_period,
                    current_period_number: number,
                    template: first.template.clone(),
                    business_label: Some(first.business.name.clone()),
                }
            }
            None => empty_view(),
        },
        CycleResponse::Flat(flat) => normalize_flat(flat),
    }
}

fn normalize_flat(flat: &FlatCycle) -> NormalizedView {
    let indexed = flat
        .current_period_number
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| flat.periods.get(i));

    let current_period = indexed
        .cloned()
        .or_else(|| flat.current_period.clone())
        .unwrap_or_default();

    let number = flat
        .current_period_number
        .filter(|&n| n >= 1 && n <= flat.periods.len())
        .or_else(|| {
            flat.periods
                .iter()
                .position(|p| *p == current_period)
                .map(|i| i + 1)
        })
        .unwrap_or(1);

    NormalizedView {
        progress: normalize_progress(flat.progress),
        period_name: current_period.name.clone(),
        periods: flat.periods.clone(),
        current_period,
        current_period_number: number,
        template: flat.template.clone(),
        business_label: None,
    }
}

fn empty_view() -> NormalizedView {
    NormalizedView {
        progress: 0.0,
        period_name: String::new(),
        periods: Vec::new(),
        current_period: Period::default(),
        current_period_number: 1,
        template: None,
        business_label: None,
    }
}
