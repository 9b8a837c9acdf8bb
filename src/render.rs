//! Pure renderers from the normalized view to HTML/SVG fragments. No
//! network access and no DOM assumptions beyond the container a
//! fragment is placed into.

use crate::models::{CycleType, NormalizedView, Period};
use std::fmt::Write;

pub const RING_SIZE: f64 = 144.0;
pub const RING_STROKE: f64 = 10.0;

pub fn ring_radius() -> f64 {
    (RING_SIZE - RING_STROKE) / 2.0
}

pub fn ring_circumference() -> f64 {
    2.0 * std::f64::consts::PI * ring_radius()
}

/// Stroke offset for the progress arc. Always within
/// `[0, circumference]` for any input.
pub fn ring_offset(progress: f64) -> f64 {
    let fraction = (progress / 100.0).clamp(0.0, 1.0);
    ring_circumference() * (1.0 - fraction)
}

/// Progress label: whole percentages drop the decimal, everything else
/// keeps one place.
pub fn format_percent(progress: f64) -> String {
    let rounded = (progress * 10.0).round() / 10.0;
    if rounded.fract().abs() < f64::EPSILON {
        format!("{}%", rounded as i64)
    } else {
        format!("{rounded:.1}%")
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The SVG progress ring: a background track, a foreground arc offset
/// by the clamped progress, a centered percentage and the period name
/// beneath.
pub fn render_ring(progress: f64, period_name: &str) -> String {
    let size = RING_SIZE;
    let radius = ring_radius();
    let circumference = ring_circumference();
    let offset = ring_offset(progress);
    let label = format_percent(progress.clamp(0.0, 100.0));

    format!(
        concat!(
            r#"<svg width="{size}" height="{size}" viewBox="0 0 {size} {size}" xmlns="http://www.w3.org/2000/svg" role="img" aria-label="Cycle progress">"#,
            r#"<g transform="translate({half}, {half})">"#,
            r##"<circle r="{radius}" fill="transparent" stroke="#e5e7eb" stroke-width="{stroke}" />"##,
            r##"<circle r="{radius}" fill="transparent" stroke="#7c3aed" stroke-width="{stroke}" stroke-dasharray="{circumference:.2}" stroke-dashoffset="{offset:.2}" stroke-linecap="round" transform="rotate(-90)" />"##,
            r##"<text x="0" y="0" text-anchor="middle" dy="0.35em" font-size="18" fill="#7c3aed">{label}</text>"##,
            "</g></svg>",
            r#"<div class="cycle-label">{name}</div>"#
        ),
        size = size,
        half = size / 2.0,
        radius = radius,
        stroke = RING_STROKE,
        circumference = circumference,
        offset = offset,
        label = label,
        name = escape_html(period_name),
    )
}

/// One card per period in source order. The active card is the one
/// equal to the view's current period (full struct equality). Cards
/// carry `data-period-id` with their index so the page script can find
/// the period in its cache.
pub fn render_period_cards(cycle_type: CycleType, view: &NormalizedView) -> String {
    if view.periods.is_empty() {
        return r#"<p class="empty-note">No cycle data available.</p>"#.to_string();
    }

    let mut html = String::new();
    for (index, period) in view.periods.iter().enumerate() {
        let active = if *period == view.current_period { " active" } else { "" };
        let _ = write!(
            html,
            r#"<article class="period-card{active}" role="article" tabindex="0" data-period-id="{index}" aria-label="{label}">"#,
            active = active,
            index = index,
            label = escape_html(&period.name),
        );
        let _ = write!(html, "<h4>{}</h4>", escape_html(&period.name));
        if cycle_type != CycleType::Health {
            push_bounds_line(&mut html, period);
        }
        if !period.principle.is_empty() {
            let _ = write!(html, "<p>{}</p>", escape_html(&period.principle));
        }
        if show_suggestion(cycle_type) {
            if let Some(suggestion) = &period.suggestion {
                let _ = write!(
                    html,
                    r#"<p class="suggestion"><em>Suggestion: {}</em></p>"#,
                    escape_html(suggestion)
                );
            }
        }
        if cycle_type == CycleType::Business {
            if let Some(label) = &view.business_label {
                let _ = write!(html, r#"<p class="biz-label">{}</p>"#, escape_html(label));
            }
        }
        html.push_str("</article>");
    }
    html
}

// Health cards show the principle alone; their dates and detail live
// in the modal.
fn show_suggestion(cycle_type: CycleType) -> bool {
    cycle_type != CycleType::Health
}

fn push_bounds_line(html: &mut String, period: &Period) {
    if let (Some(start), Some(end)) = (&period.start, &period.end) {
        let _ = write!(
            html,
            r#"<p class="bounds">{} - {}</p>"#,
            escape_html(start),
            escape_html(end)
        );
    } else if let (Some(start), Some(end)) = (&period.start_date, &period.end_date) {
        let _ = write!(
            html,
            r#"<p class="bounds">{} &ndash; {}</p>"#,
            escape_html(start),
            escape_html(end)
        );
    } else if period.start_age.is_some() || period.end_age.is_some() {
        let _ = write!(html, r#"<p class="bounds">Ages {}</p>"#, age_range(period));
    }
}

fn age_range(period: &Period) -> String {
    let bound = |age: Option<u32>| age.map_or_else(|| "?".to_string(), |a| a.to_string());
    format!("{} - {}", bound(period.start_age), bound(period.end_age))
}

/// Summary panel: each line appears only when its backing field does.
pub fn render_summary(view: &NormalizedView) -> String {
    let mut html = String::new();

    if !view.period_name.is_empty() {
        let _ = write!(
            html,
            r#"<div class="summary-period">{}</div>"#,
            escape_html(&view.period_name)
        );
    }
    if let Some(label) = &view.business_label {
        let _ = write!(html, r#"<div class="summary-biz">{}</div>"#, escape_html(label));
    }

    // age range: template bounds first, then the current period's
    let (start_age, end_age) = view
        .template
        .as_ref()
        .filter(|t| t.start_age.is_some() || t.end_age.is_some())
        .map(|t| (t.start_age, t.end_age))
        .unwrap_or((view.current_period.start_age, view.current_period.end_age));
    if start_age.is_some() || end_age.is_some() {
        let bound = |age: Option<u32>| age.map_or_else(|| "?".to_string(), |a| a.to_string());
        let _ = write!(
            html,
            r#"<div class="summary-ages">Age range: {} - {}</div>"#,
            bound(start_age),
            bound(end_age)
        );
    }

    if let (Some(start), Some(end)) = (&view.current_period.start_date, &view.current_period.end_date) {
        let _ = write!(
            html,
            r#"<div class="summary-dates">From: {} To: {}</div>"#,
            escape_html(start),
            escape_html(end)
        );
    }
    if !view.current_period.principle.is_empty() {
        let _ = write!(
            html,
            r#"<div class="summary-principle">{}</div>"#,
            escape_html(&view.current_period.principle)
        );
    }
    if let Some(suggestion) = &view.current_period.suggestion {
        let _ = write!(
            html,
            r#"<div class="summary-suggestion"><em>Suggestion: {}</em></div>"#,
            escape_html(suggestion)
        );
    }
    if let Some(template) = &view.template {
        if !template.description.is_empty() {
            let _ = write!(
                html,
                r#"<div class="summary-template">{}</div>"#,
                escape_html(&template.description)
            );
        }
        if let Some(advice) = &template.advice {
            let _ = write!(
                html,
                r#"<div class="summary-advice"><em>{}</em></div>"#,
                escape_html(advice)
            );
        }
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CycleTemplate;

    fn view_with(periods: Vec<Period>, current: Period, progress: f64) -> NormalizedView {
        NormalizedView {
            progress,
            period_name: current.name.clone(),
            periods,
            current_period: current,
            current_period_number: 1,
            template: None,
            business_label: None,
        }
    }

    #[test]
    fn ring_offset_stays_within_circumference() {
        let circumference = ring_circumference();
        for progress in [-10.0, 0.0, 12.5, 50.0, 99.9, 100.0, 150.0] {
            let offset = ring_offset(progress);
            assert!(offset >= 0.0 && offset <= circumference, "offset {offset}");
        }
        assert_eq!(ring_offset(-10.0), circumference);
        assert_eq!(ring_offset(150.0), 0.0);
    }

    #[test]
    fn ring_offset_decreases_as_progress_increases() {
        let mut last = ring_offset(0.0);
        for progress in [10.0, 25.0, 50.0, 75.0, 100.0] {
            let offset = ring_offset(progress);
            assert!(offset < last, "offset should shrink at {progress}");
            last = offset;
        }
    }

    #[test]
    fn percent_label_trims_whole_numbers() {
        assert_eq!(format_percent(33.3), "33.3%");
        assert_eq!(format_percent(50.0), "50%");
        assert_eq!(format_percent(0.0), "0%");
    }

    #[test]
    fn ring_svg_carries_label_and_name() {
        let svg = render_ring(33.3, "Afternoon");
        assert!(svg.contains(">33.3%<"));
        assert!(svg.contains("Afternoon"));
        assert!(svg.contains("stroke-dashoffset"));
    }

    #[test]
    fn cards_mark_only_the_current_period_active() {
        let twin_a = Period {
            name: "Echo".into(),
            principle: "first".into(),
            ..Period::default()
        };
        let twin_b = Period {
            name: "Echo".into(),
            principle: "second".into(),
            ..Period::default()
        };
        let view = view_with(vec![twin_a, twin_b.clone()], twin_b, 10.0);
        let html = render_period_cards(CycleType::Soul, &view);
        assert_eq!(html.matches("period-card active").count(), 1);
        assert!(html.contains(r#"data-period-id="0""#));
        assert!(html.contains(r#"data-period-id="1""#));
    }

    #[test]
    fn health_cards_show_the_principle_alone() {
        let period = Period {
            name: "The Period of Nerves".into(),
            principle: "Rest more.".into(),
            suggestion: Some("should not appear".into()),
            start_date: Some("2026-04-12".into()),
            end_date: Some("2026-06-02".into()),
            ..Period::default()
        };
        let view = view_with(vec![period.clone()], period.clone(), 10.0);
        let html = render_period_cards(CycleType::Health, &view);
        assert!(html.contains("Rest more."));
        assert!(!html.contains("should not appear"));
        assert!(!html.contains("2026-04-12"));

        // the same period gets its bounds back on a dated cycle type
        let dated = render_period_cards(CycleType::Yearly, &view_with(vec![period.clone()], period, 10.0));
        assert!(dated.contains("2026-04-12"));
    }

    #[test]
    fn cards_escape_untrusted_text() {
        let period = Period {
            name: "<script>alert(1)</script>".into(),
            ..Period::default()
        };
        let view = view_with(vec![period.clone()], period, 0.0);
        let html = render_period_cards(CycleType::Soul, &view);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn summary_falls_back_to_question_mark_for_missing_age() {
        let period = Period {
            name: "Period 3".into(),
            start_age: Some(14),
            ..Period::default()
        };
        let view = view_with(vec![period.clone()], period, 20.0);
        let html = render_summary(&view);
        assert!(html.contains("Age range: 14 - ?"));
    }

    #[test]
    fn summary_prefers_template_ages() {
        let period = Period {
            name: "Period 6".into(),
            start_age: Some(35),
            end_age: Some(41),
            ..Period::default()
        };
        let mut view = view_with(vec![period.clone()], period, 20.0);
        view.template = Some(CycleTemplate {
            description: "Review period".into(),
            advice: None,
            start_age: Some(35),
            end_age: Some(41),
        });
        let html = render_summary(&view);
        assert!(html.contains("Age range: 35 - 41"));
    }

    #[test]
    fn summary_carries_template_description_and_advice() {
        let period = Period {
            name: "The Morning Period".into(),
            principle: "New beginnings.".into(),
            ..Period::default()
        };
        let mut view = view_with(vec![period.clone()], period, 5.0);
        view.template = Some(CycleTemplate {
            description: "Highest clarity and planning potential.".into(),
            advice: Some("Schedule mental work.".into()),
            start_age: None,
            end_age: None,
        });
        let html = render_summary(&view);
        assert!(html.contains("Highest clarity and planning potential."));
        assert!(html.contains("Schedule mental work."));
    }

    #[test]
    fn summary_omits_absent_lines() {
        let period = Period {
            name: "Growth".into(),
            ..Period::default()
        };
        let view = view_with(vec![period.clone()], period, 20.0);
        let html = render_summary(&view);
        assert!(html.contains("Growth"));
        assert!(!html.contains("Age range"));
        assert!(!html.contains("From:"));
        assert!(!html.contains("Suggestion"));
    }
}
