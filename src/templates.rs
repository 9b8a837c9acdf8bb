use crate::models::{CycleTemplate, CycleType};

struct TemplateEntry {
    description: &'static str,
    advice: &'static str,
    start_age: Option<u32>,
    end_age: Option<u32>,
}

impl TemplateEntry {
    const fn aged(
        description: &'static str,
        advice: &'static str,
        start_age: u32,
        end_age: u32,
    ) -> Self {
        Self {
            description,
            advice,
            start_age: Some(start_age),
            end_age: Some(end_age),
        }
    }

    const fn plain(description: &'static str, advice: &'static str) -> Self {
        Self {
            description,
            advice,
            start_age: None,
            end_age: None,
        }
    }
}

const HUMAN: [TemplateEntry; 12] = [
    TemplateEntry::aged(
        "A phase of dependence where basic patterns, trust and attachment form.",
        "Provide steady care, consistent routines and nurturing environments.",
        0, 6,
    ),
    TemplateEntry::aged(
        "Curiosity and early learning expand physical and social abilities.",
        "Encourage play-based learning, language, and social skills.",
        7, 13,
    ),
    TemplateEntry::aged(
        "Forming personal identity and beginning serious learning or training.",
        "Support mentorship, education and responsible risk-taking.",
        14, 20,
    ),
    TemplateEntry::aged(
        "Establishing independence, early career moves and intimate bonds.",
        "Prioritise skill application, relationship-building and steady routines.",
        21, 27,
    ),
    TemplateEntry::aged(
        "Growth into stable roles, responsibility and longer-term planning.",
        "Balance commitments, save, and build reliable systems.",
        28, 34,
    ),
    TemplateEntry::aged(
        "A period of review where earlier choices are questioned and adjusted.",
        "Reflect honestly, correct course, and renew neglected interests.",
        35, 41,
    ),
    TemplateEntry::aged(
        "Peak competence and influence; others begin to look to you for guidance.",
        "Take on leadership, mentor younger people, share what you know.",
        42, 48,
    ),
    TemplateEntry::aged(
        "Widening perspective and a shift from ambition toward stewardship.",
        "Consolidate gains, delegate, and invest in lasting institutions.",
        49, 55,
    ),
    TemplateEntry::aged(
        "Harvesting the results of earlier work and passing on its fruits.",
        "Give generously of time and experience; simplify obligations.",
        56, 62,
    ),
    TemplateEntry::aged(
        "Attention turns inward; health and close relationships come first.",
        "Protect wellbeing, keep moving, stay socially connected.",
        63, 69,
    ),
    TemplateEntry::aged(
        "Inner work, reconciliation, and the shaping of a legacy.",
        "Record your story, resolve old differences, mentor at a distance.",
        70, 76,
    ),
    TemplateEntry::aged(
        "Completion and handover; life is reviewed as a whole.",
        "Let go gracefully, hand responsibilities on, enjoy what remains.",
        77, 83,
    ),
];

const BUSINESS: [TemplateEntry; 7] = [
    TemplateEntry::plain(
        "The launch window: energy spent now compounds through the rest of the cycle.",
        "Start marketing campaigns and new initiatives while momentum is cheap.",
    ),
    TemplateEntry::plain(
        "What was launched must now be made to hold its shape.",
        "Improve efficiency and build durable customer relationships.",
    ),
    TemplateEntry::plain(
        "A quieter stretch suited to stepping back from day-to-day execution.",
        "Do strategic planning and team-building rather than expansion.",
    ),
    TemplateEntry::plain(
        "Earlier efforts bear fruit; growth is easiest to capture here.",
        "Track the numbers closely and celebrate what is working.",
    ),
    TemplateEntry::plain(
        "An audit window: the cycle's results are visible and worth studying.",
        "Run internal audits and a full financial review.",
    ),
    TemplateEntry::plain(
        "The old cycle winds down; structures should be loosened for the next one.",
        "Close out stale projects and restructure where needed.",
    ),
    TemplateEntry::plain(
        "Groundwork for the coming year's major moves.",
        "Fine-tune strategy and line up next cycle's initiatives.",
    ),
];

// Condensed tables: only the opening periods carry reference text, the
// rest resolve to None.
const DAILY: [TemplateEntry; 3] = [
    TemplateEntry::plain(
        "Highest clarity and planning potential; important tasks belong here.",
        "Schedule mental work and planning sessions.",
    ),
    TemplateEntry::plain(
        "Sustained energy for execution and collaboration.",
        "Use for meetings, implementation and steady effort.",
    ),
    TemplateEntry::plain(
        "Winding down; review and creative reflection.",
        "Review progress and handle low-effort creative tasks.",
    ),
];

const YEARLY: [TemplateEntry; 2] = [
    TemplateEntry::plain(
        "A phase for new goals and setting direction for the year.",
        "Set priorities and outline achievable milestones.",
    ),
    TemplateEntry::plain(
        "Period focused on carrying out plans and refining efforts.",
        "Monitor progress and adjust tactics as needed.",
    ),
];

const SOUL: [TemplateEntry; 5] = [
    TemplateEntry::plain(
        "An emergence of deeper purpose and the first stirrings of a calling.",
        "Listen to inner nudges, begin regular practices, journal impressions.",
    ),
    TemplateEntry::plain(
        "A period of forming practices, discipline and grounding inner work.",
        "Establish routines, study, and seek mentors.",
    ),
    TemplateEntry::plain(
        "Expressing inner gifts outwardly through service, teaching or creative work.",
        "Find ways to contribute talents; balance service with self-care.",
    ),
    TemplateEntry::plain(
        "Challenges that clear disruptions and deepen maturity.",
        "Face difficulties with compassion and seek cleansing practices.",
    ),
    TemplateEntry::plain(
        "Synthesis of lessons and a mature, steady orientation.",
        "Teach, write, or embody what you have learned.",
    ),
];

/// Static reference material for the current period of a cycle, keyed
/// by cycle type and 1-based period number. Health and reincarnation
/// carry their reference text on the period itself, so those types
/// resolve to `None` here.
pub fn lookup(cycle_type: CycleType, period_number: usize) -> Option<CycleTemplate> {
    let table: &[TemplateEntry] = match cycle_type {
        CycleType::Human => &HUMAN,
        CycleType::Business => &BUSINESS,
        CycleType::Daily => &DAILY,
        CycleType::Yearly => &YEARLY,
        CycleType::Soul => &SOUL,
        CycleType::Health | CycleType::Reincarnation => return None,
    };
    let entry = table.get(period_number.checked_sub(1)?)?;
    Some(CycleTemplate {
        description: entry.description.to_string(),
        advice: Some(entry.advice.to_string()),
        start_age: entry.start_age,
        end_age: entry.end_age,
    })
}
