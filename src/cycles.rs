//! Cycle engine: period tables and current-period/progress computation
//! for every cycle type. All functions are pure over an explicit
//! date/time argument so tests can pin the clock.

use crate::models::Period;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Result of computing one cycle: the full period list, the 0-based
/// index of the current period, and progress through the cycle as a
/// percentage already confined to `[0, 100]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleData {
    pub periods: Vec<Period>,
    pub current_index: usize,
    pub progress: f64,
}

impl CycleData {
    pub fn current_period(&self) -> Option<&Period> {
        self.periods.get(self.current_index)
    }

    /// 1-based number of the current period.
    pub fn current_number(&self) -> usize {
        self.current_index + 1
    }
}

const DAILY_PERIOD_MINUTES: i64 = 206;
const DAILY_PERIOD_COUNT: i64 = 7;
const SEGMENT_DAYS: i64 = 52;
const YEAR_DAYS: i64 = 365;
const HUMAN_PERIOD_YEARS: i64 = 7;
const HUMAN_PERIOD_COUNT: usize = 20;
const REINCARNATION_PERIOD_YEARS: i64 = 12;

struct DailySeg {
    name: &'static str,
    start: &'static str,
    end: &'static str,
    principle: &'static str,
    suggestion: &'static str,
}

const DAILY_SEGMENTS: [DailySeg; 7] = [
    DailySeg {
        name: "The Morning Period",
        start: "6:00 a.m.",
        end: "9:26 a.m.",
        principle: "New beginnings, planning, and mental work.",
        suggestion: "Start new tasks, intellectual work, planning",
    },
    DailySeg {
        name: "The Active Period",
        start: "9:26 a.m.",
        end: "12:52 p.m.",
        principle: "Action and execution.",
        suggestion: "Meetings, negotiations, physical activities",
    },
    DailySeg {
        name: "The Period of Rest",
        start: "12:52 p.m.",
        end: "4:18 p.m.",
        principle: "Consolidation and rejuvenation.",
        suggestion: "Take a break, review work, gather energy",
    },
    DailySeg {
        name: "The Period of Fulfillment",
        start: "4:18 p.m.",
        end: "7:44 p.m.",
        principle: "The day's efforts begin to bear fruit.",
        suggestion: "Complete tasks, prepare for evening",
    },
    DailySeg {
        name: "The Period of Preparation",
        start: "7:44 p.m.",
        end: "11:10 p.m.",
        principle: "Introspection and preparing for the next day.",
        suggestion: "Journaling, creative thinking, planning",
    },
    DailySeg {
        name: "The Period of Dreams",
        start: "11:10 p.m.",
        end: "2:36 a.m.",
        principle: "Deep rest and subconscious activity.",
        suggestion: "Sleep and deep rest",
    },
    DailySeg {
        name: "The Period of Introspection",
        start: "2:36 a.m.",
        end: "6:00 a.m.",
        principle: "Profound spiritual and creative thought.",
        suggestion: "Meditation, deep thinking (if awake)",
    },
];

struct YearSeg {
    name: &'static str,
    principle: &'static str,
    suggestion: &'static str,
}

const YEARLY_SEGMENTS: [YearSeg; 7] = [
    YearSeg {
        name: "The Period of Action",
        principle: "Initiate new projects and undertakings.",
        suggestion: "Start new projects, set goals, take initiative",
    },
    YearSeg {
        name: "The Period of Stabilization",
        principle: "Solidify what was started in the first period.",
        suggestion: "Focus on consolidation, follow-through, attention to detail",
    },
    YearSeg {
        name: "The Period of Rejuvenation",
        principle: "Rest, recover, and avoid major new undertakings.",
        suggestion: "Lighter schedule, personal wellness activities",
    },
    YearSeg {
        name: "The Period of Fruition",
        principle: "Reap rewards and success.",
        suggestion: "Celebrate successes, reap rewards",
    },
    YearSeg {
        name: "The Period of Reflection",
        principle: "Review the year and contemplate future goals.",
        suggestion: "Review year's progress, contemplate future goals",
    },
    YearSeg {
        name: "The Period of Transition",
        principle: "Let go of the old and prepare for the new cycle.",
        suggestion: "Tie up loose ends, prepare for new cycle",
    },
    YearSeg {
        name: "The Period of Preparation",
        principle: "Prepare mentally and physically for the new year.",
        suggestion: "Make resolutions, get ready for new cycle",
    },
];

const BUSINESS_SEGMENTS: [YearSeg; 7] = [
    YearSeg {
        name: "Action",
        principle: "Launch new products, start marketing campaigns, and expand operations.",
        suggestion: "Start marketing campaigns, new initiatives",
    },
    YearSeg {
        name: "Stabilization",
        principle: "Strengthen business processes, build customer relationships, and improve efficiency.",
        suggestion: "Improve efficiency, build customer relationships",
    },
    YearSeg {
        name: "Rejuvenation",
        principle: "Step back, review the business plan, and prepare for future growth.",
        suggestion: "Strategic planning, team-building",
    },
    YearSeg {
        name: "Fruition",
        principle: "Sales growth, gaining market share, and celebrating business successes.",
        suggestion: "Track KPIs, celebrate achievements",
    },
    YearSeg {
        name: "Reflection",
        principle: "Analyze what worked and what didn't. Time for internal audits and financial review.",
        suggestion: "Internal audits, financial review",
    },
    YearSeg {
        name: "Transition",
        principle: "Prepare the business for the next cycle. Close out old projects or restructure teams.",
        suggestion: "Close old projects, restructure",
    },
    YearSeg {
        name: "Preparation",
        principle: "Fine-tune strategies and prepare for the next year's major initiatives.",
        suggestion: "Plan for next year's initiatives",
    },
];

struct SoulSeg {
    name: &'static str,
    start: (u32, u32),
    end: (u32, u32),
    principle: &'static str,
    suggestion: &'static str,
}

const SOUL_SEGMENTS: [SoulSeg; 7] = [
    SoulSeg {
        name: "The Period of Self-Realization",
        start: (3, 22),
        end: (5, 12),
        principle: "Personal growth, creativity, and the development of new ideas.",
        suggestion: "Develop new ideas, focus on personal development",
    },
    SoulSeg {
        name: "The Period of Integration",
        start: (5, 13),
        end: (7, 3),
        principle: "Integrate new ideas and inspirations into daily life.",
        suggestion: "Put plans into action, apply new skills",
    },
    SoulSeg {
        name: "The Period of Consolidation",
        start: (7, 4),
        end: (8, 24),
        principle: "Solidify relationships and professional connections.",
        suggestion: "Network, strengthen professional connections",
    },
    SoulSeg {
        name: "The Period of Release",
        start: (8, 25),
        end: (10, 15),
        principle: "Let go of old habits and negative influences.",
        suggestion: "Self-reflection, break bad habits",
    },
    SoulSeg {
        name: "The Period of Regeneration",
        start: (10, 16),
        end: (12, 5),
        principle: "Spiritual growth and renewal.",
        suggestion: "Introspection, personal development",
    },
    SoulSeg {
        name: "The Period of Harmony",
        start: (12, 6),
        end: (1, 25),
        principle: "Finding balance in all aspects of life.",
        suggestion: "Work-life balance, stress management",
    },
    SoulSeg {
        name: "The Period of Preparation",
        start: (1, 26),
        end: (3, 21),
        principle: "Prepare for new beginnings and spiritual growth.",
        suggestion: "Planning, goal-setting for new year",
    },
];

struct HealthSeg {
    name: &'static str,
    principle: &'static str,
    description: &'static str,
}

const HEALTH_SEGMENTS: [HealthSeg; 7] = [
    HealthSeg {
        name: "The Period of Vitality",
        principle: "Constitutional health is at its strongest; gains come easily.",
        description: "Vitality and constitutional health are at their best, and anything below \
                      normal is most easily strengthened now through plain living: outdoor walking, \
                      good air, plenty of water and simple food. Guard the eyes against overuse, and \
                      start any planned regimen or treatment in this period.",
    },
    HealthSeg {
        name: "The Period of Passing Ailments",
        principle: "Light, short-lived physical and emotional upsets.",
        description: "Many light and temporary conditions may touch the stomach, digestion and \
                      nerves. They arrive quickly and pass quickly; attend to each promptly, stay \
                      cheerful, and do not let the mind dwell on them.",
    },
    HealthSeg {
        name: "The Period of Caution",
        principle: "Raised risk of accidents, strain and sudden trouble.",
        description: "Accidents, burns, falls and sudden operations are likelier now than at any \
                      other time. Avoid overeating and overheating, keep the blood clean and the \
                      pressure watched, and spare the body any abnormal strain.",
    },
    HealthSeg {
        name: "The Period of Nerves",
        principle: "The nervous system is tried to its utmost.",
        description: "Too much study, planning or mental strain brings definite reactions in this \
                      period. More sleep and rest are required than at any other part of the year; \
                      those worn down by mental work must be made to relax.",
    },
    HealthSeg {
        name: "The Period of Recovery",
        principle: "Health is strong but overindulgence tempts.",
        description: "Health should be very good, especially with deep breathing, long walks and \
                      outdoor exercise. The temptation is to overindulge in rich food and pleasure; \
                      resist it, and use the period to recover from lingering conditions.",
    },
    HealthSeg {
        name: "The Period of Moderation",
        principle: "Skin, throat and kidneys are vulnerable to excess.",
        description: "Another period in which overindulgence of any kind must be avoided. The skin, \
                      throat and kidneys may be affected; drink plenty of water and favour rest and \
                      outdoor exercise over strain.",
    },
    HealthSeg {
        name: "The Period of Lingering Conditions",
        principle: "Chronic complaints take hold most easily now.",
        description: "Chronic or lingering conditions are most often contracted in this period, when \
                      resistance is lowest. Avoid exposure to colds and contagion, give prompt \
                      attention to anything that lingers, and defer elective treatment to the start \
                      of the next cycle.",
    },
];

struct LifeSeg {
    name: &'static str,
    principle: &'static str,
    description: &'static str,
}

const REINCARNATION_SEGMENTS: [LifeSeg; 12] = [
    LifeSeg {
        name: "Descent into the Body",
        principle: "The personality is latent.",
        description: "Childhood and the soul's descent into the body. The personality is latent.",
    },
    LifeSeg {
        name: "Awakening of Personality",
        principle: "The ego begins to assert itself.",
        description: "Adolescence and the awakening of personality. The ego begins to assert itself.",
    },
    LifeSeg {
        name: "Struggle for Expression",
        principle: "The personality is dominant.",
        description: "Early adulthood and the soul's struggle for expression. The personality is dominant.",
    },
    LifeSeg {
        name: "Search for Meaning",
        principle: "The personality begins to yield to the soul.",
        description: "Maturity and the soul's search for meaning. The personality begins to yield to the soul.",
    },
    LifeSeg {
        name: "Illumination",
        principle: "The personality is now a vehicle for the soul.",
        description: "Mid-life and the soul's illumination. The personality is now a vehicle for the soul.",
    },
    LifeSeg {
        name: "Detachment",
        principle: "The personality is transcended.",
        description: "Later life and the soul's detachment from the physical world. The personality is transcended.",
    },
    LifeSeg {
        name: "Return to the Source",
        principle: "The personality is dissolved.",
        description: "Old age and the soul's return to its source. The personality is dissolved.",
    },
    LifeSeg {
        name: "Journey Through the Spiritual Worlds",
        principle: "The personality is a distant memory.",
        description: "The soul's journey through the spiritual worlds. The personality is a distant memory.",
    },
    LifeSeg {
        name: "Assimilation",
        principle: "The personality is completely absorbed.",
        description: "The soul's assimilation of its earthly experiences. The personality is completely absorbed.",
    },
    LifeSeg {
        name: "Choice of Destiny",
        principle: "The personality is a seed of future potential.",
        description: "The soul's choice of a new destiny. The personality is a seed of future potential.",
    },
    LifeSeg {
        name: "Preparation for Rebirth",
        principle: "The personality is a blueprint for the new life.",
        description: "The soul's preparation for rebirth. The personality is a blueprint for the new life.",
    },
    LifeSeg {
        name: "A Fresh Canvas",
        principle: "The personality is a fresh canvas.",
        description: "The soul's descent into a new body. The personality is a fresh canvas.",
    },
];

fn clamp_pct(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn day_anchor(now: NaiveDateTime) -> NaiveDateTime {
    let six = NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN);
    let anchor = now.date().and_time(six);
    if now < anchor {
        anchor - Duration::days(1)
    } else {
        anchor
    }
}

/// The birthday-equivalent date in `year`, with Feb 29 clamped to
/// Feb 28 on non-leap years.
fn anniversary(birth: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, birth.month(), birth.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 2, 28))
        .unwrap_or(birth)
}

/// The most recent anniversary of `birth` on or before `today`.
fn last_anniversary(birth: NaiveDate, today: NaiveDate) -> NaiveDate {
    let this_year = anniversary(birth, today.year());
    if this_year > today {
        anniversary(birth, today.year() - 1)
    } else {
        this_year
    }
}

/// Completed years between `birth` and `today`, never negative.
fn age_years(birth: NaiveDate, today: NaiveDate) -> i64 {
    let mut age = i64::from(today.year() - birth.year());
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age.max(0)
}

/// 1-based day within a 365-day cycle starting at `cycle_start`.
fn day_in_year_cycle(cycle_start: NaiveDate, today: NaiveDate) -> i64 {
    ((today - cycle_start).num_days() + 1).clamp(1, YEAR_DAYS)
}

/// Seven 52-day segments over a 365-day year; the last segment absorbs
/// the remainder.
fn segment_index(day_in_cycle: i64) -> usize {
    (((day_in_cycle - 1) / SEGMENT_DAYS) as usize).min(6)
}

fn segment_bounds(index: usize) -> (i64, i64) {
    let start_day = index as i64 * SEGMENT_DAYS + 1;
    let end_day = if index == 6 {
        YEAR_DAYS
    } else {
        start_day + SEGMENT_DAYS - 1
    };
    (start_day, end_day)
}

fn dated_period(seg: &YearSeg, cycle_start: NaiveDate, index: usize) -> Period {
    let (start_day, end_day) = segment_bounds(index);
    Period {
        name: seg.name.to_string(),
        principle: seg.principle.to_string(),
        suggestion: Some(seg.suggestion.to_string()),
        start_date: Some((cycle_start + Duration::days(start_day - 1)).to_string()),
        end_date: Some((cycle_start + Duration::days(end_day - 1)).to_string()),
        ..Period::default()
    }
}

/// Seven periods of 3 h 26 m anchored at 06:00; times before the anchor
/// belong to the previous day's cycle.
pub fn daily_cycle(now: NaiveDateTime) -> CycleData {
    let anchor = day_anchor(now);
    let minutes = (now - anchor).num_minutes();
    let total = DAILY_PERIOD_MINUTES * DAILY_PERIOD_COUNT;
    let current_index = ((minutes / DAILY_PERIOD_MINUTES).max(0) as usize).min(6);

    let periods = DAILY_SEGMENTS
        .iter()
        .map(|seg| Period {
            name: seg.name.to_string(),
            principle: seg.principle.to_string(),
            suggestion: Some(seg.suggestion.to_string()),
            start: Some(seg.start.to_string()),
            end: Some(seg.end.to_string()),
            ..Period::default()
        })
        .collect();

    CycleData {
        periods,
        current_index,
        progress: clamp_pct(minutes as f64 / total as f64 * 100.0),
    }
}

/// Personal year anchored at the most recent birthday.
pub fn yearly_cycle(birth: NaiveDate, today: NaiveDate) -> CycleData {
    let cycle_start = last_anniversary(birth, today);
    year_segments_cycle(&YEARLY_SEGMENTS, cycle_start, today)
}

/// Business year anchored at the establishment date, repeating every
/// 365 days.
pub fn business_cycle(established: NaiveDate, today: NaiveDate) -> CycleData {
    let elapsed = (today - established).num_days().max(0);
    let cycle_start = today - Duration::days(elapsed % YEAR_DAYS);
    year_segments_cycle(&BUSINESS_SEGMENTS, cycle_start, today)
}

fn year_segments_cycle(segments: &[YearSeg; 7], cycle_start: NaiveDate, today: NaiveDate) -> CycleData {
    let day = day_in_year_cycle(cycle_start, today);
    let periods = segments
        .iter()
        .enumerate()
        .map(|(index, seg)| dated_period(seg, cycle_start, index))
        .collect();

    CycleData {
        periods,
        current_index: segment_index(day),
        progress: clamp_pct(day as f64 / YEAR_DAYS as f64 * 100.0),
    }
}

/// Fixed calendar periods starting March 22; the sixth wraps the new
/// year.
pub fn soul_cycle(today: NaiveDate) -> CycleData {
    let anchor_year = if (today.month(), today.day()) >= (3, 22) {
        today.year()
    } else {
        today.year() - 1
    };

    let mut periods = Vec::with_capacity(SOUL_SEGMENTS.len());
    let mut current_index = SOUL_SEGMENTS.len() - 1;
    for (index, seg) in SOUL_SEGMENTS.iter().enumerate() {
        // periods after the Dec wrap fall in the following calendar year
        let start_year = if seg.start.0 < 3 { anchor_year + 1 } else { anchor_year };
        let end_year = if seg.end.0 < 3 { anchor_year + 1 } else { anchor_year };
        let start = NaiveDate::from_ymd_opt(start_year, seg.start.0, seg.start.1);
        let end = NaiveDate::from_ymd_opt(end_year, seg.end.0, seg.end.1);
        if let (Some(start), Some(end)) = (start, end) {
            if start <= today && today <= end {
                current_index = index;
            }
        }
        periods.push(Period {
            name: seg.name.to_string(),
            principle: seg.principle.to_string(),
            suggestion: Some(seg.suggestion.to_string()),
            start_date: start.map(|d| d.to_string()),
            end_date: end.map(|d| d.to_string()),
            ..Period::default()
        });
    }

    let anchor = NaiveDate::from_ymd_opt(anchor_year, 3, 22).unwrap_or(today);
    let days_into = (today - anchor).num_days();
    CycleData {
        periods,
        current_index,
        progress: clamp_pct(days_into as f64 / 365.25 * 100.0),
    }
}

/// 144 years divided into twenty 7-year periods.
pub fn human_cycle(birth: NaiveDate, today: NaiveDate) -> CycleData {
    let age = age_years(birth, today);
    let current_index = ((age / HUMAN_PERIOD_YEARS) as usize).min(HUMAN_PERIOD_COUNT - 1);
    let year_fraction = partial_year(birth, today);
    let years_into = (age % HUMAN_PERIOD_YEARS) as f64 + year_fraction;

    let periods = (0..HUMAN_PERIOD_COUNT)
        .map(|i| {
            let start_age = (i as i64 * HUMAN_PERIOD_YEARS) as u32;
            Period {
                name: format!("Period {}", i + 1),
                start_age: Some(start_age),
                end_age: Some(start_age + HUMAN_PERIOD_YEARS as u32 - 1),
                ..Period::default()
            }
        })
        .collect();

    CycleData {
        periods,
        current_index,
        progress: clamp_pct(years_into / HUMAN_PERIOD_YEARS as f64 * 100.0),
    }
}

/// Same day arithmetic as the yearly cycle, with the health period
/// descriptions attached.
pub fn health_cycle(birth: NaiveDate, today: NaiveDate) -> CycleData {
    let cycle_start = last_anniversary(birth, today);
    let day = day_in_year_cycle(cycle_start, today);

    let periods = HEALTH_SEGMENTS
        .iter()
        .enumerate()
        .map(|(index, seg)| {
            let (start_day, end_day) = segment_bounds(index);
            Period {
                name: seg.name.to_string(),
                principle: seg.principle.to_string(),
                start_date: Some((cycle_start + Duration::days(start_day - 1)).to_string()),
                end_date: Some((cycle_start + Duration::days(end_day - 1)).to_string()),
                full_description: Some(seg.description.to_string()),
                ..Period::default()
            }
        })
        .collect();

    CycleData {
        periods,
        current_index: segment_index(day),
        progress: clamp_pct(day as f64 / YEAR_DAYS as f64 * 100.0),
    }
}

/// A 144-year arc in twelve 12-year periods.
pub fn reincarnation_cycle(birth: NaiveDate, today: NaiveDate) -> CycleData {
    let age = age_years(birth, today);
    let current_index = ((age / REINCARNATION_PERIOD_YEARS) as usize).min(REINCARNATION_SEGMENTS.len() - 1);
    let years_into = (age % REINCARNATION_PERIOD_YEARS) as f64 + partial_year(birth, today);

    let periods = REINCARNATION_SEGMENTS
        .iter()
        .enumerate()
        .map(|(i, seg)| {
            let start_age = (i as i64 * REINCARNATION_PERIOD_YEARS) as u32;
            Period {
                name: seg.name.to_string(),
                principle: seg.principle.to_string(),
                start_age: Some(start_age),
                end_age: Some(start_age + REINCARNATION_PERIOD_YEARS as u32 - 1),
                full_description: Some(seg.description.to_string()),
                ..Period::default()
            }
        })
        .collect();

    CycleData {
        periods,
        current_index,
        progress: clamp_pct(years_into / REINCARNATION_PERIOD_YEARS as f64 * 100.0),
    }
}

/// Fraction of the current personal year already elapsed.
fn partial_year(birth: NaiveDate, today: NaiveDate) -> f64 {
    let since = (today - last_anniversary(birth, today)).num_days();
    (since as f64 / 365.25).clamp(0.0, 1.0)
}
