use crate::cycles::{self, CycleData};
use crate::errors::AppError;
use crate::models::{
    AppData, Business, BusinessCycle, BusinessForm, BusinessRef, CycleResponse, CycleType,
    CycleViewResponse, FlatCycle, NormalizedView,
};
use crate::normalize::normalize;
use crate::render;
use crate::state::AppState;
use crate::storage::persist_data;
use crate::templates;
use crate::ui::{render_index, IndexContext};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::{Form, Json};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde_json::json;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use tracing::warn;

const DEFAULT_CYCLE: CycleType = CycleType::Human;
const CSRF_COOKIE: &str = "csrftoken";

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let data = state.data.lock().await;
    let now = Local::now().naive_local();

    // first paint goes through the same pipeline as the API; a missing
    // birth date degrades to an empty ring rather than an error page
    let view = build_cycle_response(DEFAULT_CYCLE, &data, None, now)
        .map(|response| normalize(&response))
        .ok();

    let (ring_html, summary_html, cards_html, initial_periods_json) = match &view {
        Some(view) => (
            render::render_ring(view.progress, &view.period_name),
            render::render_summary(view),
            render::render_period_cards(DEFAULT_CYCLE, view),
            serde_json::to_string(&view.periods).unwrap_or_else(|_| "[]".to_string()),
        ),
        None => (
            render::render_ring(0.0, ""),
            r#"<div class="summary-period">Set your date of birth to see your cycles.</div>"#
                .to_string(),
            String::new(),
            "[]".to_string(),
        ),
    };

    let html = render_index(&IndexContext {
        default_cycle: DEFAULT_CYCLE,
        ring_html,
        summary_html,
        cards_html,
        initial_periods_json,
        businesses: &data.businesses,
        profile: &data.profile,
    });

    let mut response_headers = HeaderMap::new();
    if cookie_value(&headers, CSRF_COOKIE).is_none() {
        let cookie = format!("{CSRF_COOKIE}={}; Path=/; SameSite=Lax", fresh_csrf_token());
        if let Ok(value) = cookie.parse() {
            response_headers.insert(header::SET_COOKIE, value);
        }
    }
    (response_headers, Html(html))
}

/// Raw cycle shapes, exactly as the page script's fetcher expects them:
/// a flat record for every non-business type, `{business_cycles: [...]}`
/// for business.
pub async fn user_cycle(
    State(state): State<AppState>,
    Path(cycle_type): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CycleResponse>, AppError> {
    let cycle = parse_cycle_type(&cycle_type)?;
    let business_id = parse_business_id(&params)?;
    let data = state.data.lock().await;
    let response = build_cycle_response(cycle, &data, business_id, Local::now().naive_local())?;
    Ok(Json(response))
}

/// The normalized view plus pre-rendered fragments for a tab switch.
pub async fn cycle_view(
    State(state): State<AppState>,
    Path(cycle_type): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CycleViewResponse>, AppError> {
    let cycle = parse_cycle_type(&cycle_type)?;
    let business_id = parse_business_id(&params)?;
    let data = state.data.lock().await;
    let response = build_cycle_response(cycle, &data, business_id, Local::now().naive_local())?;
    let view = normalize(&response);
    Ok(Json(render_view(cycle, view)))
}

pub async fn profile_update(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let mut fields: HashMap<String, String> = HashMap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::bad_request("invalid_form"))?
    {
        if let Some(name) = field.name().map(str::to_string) {
            let value = field
                .text()
                .await
                .map_err(|_| AppError::bad_request("invalid_form"))?;
            fields.insert(name, value);
        }
    }

    let mut errors = serde_json::Map::new();
    let date_of_birth = match parse_optional_date(fields.get("date_of_birth")) {
        Ok(date) => date,
        Err(()) => {
            errors.insert("date_of_birth".into(), json!("enter a valid date"));
            None
        }
    };
    if let Some(dob) = date_of_birth {
        if dob > Local::now().date_naive() {
            errors.insert("date_of_birth".into(), json!("date of birth cannot be in the future"));
        }
    }
    let business_start_date = match parse_optional_date(fields.get("business_start_date")) {
        Ok(date) => date,
        Err(()) => {
            errors.insert("business_start_date".into(), json!("enter a valid date"));
            None
        }
    };

    if !errors.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "errors": errors })),
        ));
    }

    let mut data = state.data.lock().await;
    data.profile.date_of_birth = date_of_birth;
    data.profile.business_start_date = business_start_date;
    if let Some(timezone) = fields.get("timezone") {
        if !timezone.trim().is_empty() {
            data.profile.timezone = timezone.trim().to_string();
        }
    }
    persist_data(&state.data_path, &data).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "date_of_birth": data.profile.date_of_birth.map(|d| d.to_string()),
            "business_start_date": data.profile.business_start_date.map(|d| d.to_string()),
            "timezone": data.profile.timezone,
        })),
    ))
}

pub async fn business_add(
    State(state): State<AppState>,
    Form(form): Form<BusinessForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("invalid_form"));
    }
    let establishment_date = NaiveDate::parse_from_str(&form.establishment_date, "%Y-%m-%d")
        .map_err(|_| AppError::bad_request("invalid_form"))?;

    let mut data = state.data.lock().await;
    let id = data.next_business_id;
    data.next_business_id += 1;
    data.businesses.push(Business {
        id,
        name: name.to_string(),
        establishment_date,
    });
    persist_data(&state.data_path, &data).await?;

    Ok(Json(json!({ "success": true, "id": id })))
}

pub async fn business_delete(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let cookie = cookie_value(&headers, CSRF_COOKIE);
    let token = headers
        .get("x-csrftoken")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    match (cookie, token) {
        (Some(cookie), Some(token)) if !cookie.is_empty() && cookie == token => {}
        _ => {
            warn!(id, "rejected business delete without a valid CSRF token");
            return Err(AppError::forbidden("csrf_failed"));
        }
    }

    let mut data = state.data.lock().await;
    let before = data.businesses.len();
    data.businesses.retain(|business| business.id != id);
    if data.businesses.len() == before {
        return Err(AppError::not_found("business_not_found"));
    }
    persist_data(&state.data_path, &data).await?;

    Ok(Json(json!({ "success": true })))
}

fn parse_cycle_type(raw: &str) -> Result<CycleType, AppError> {
    raw.parse()
        .map_err(|()| AppError::bad_request("unsupported_cycle_type"))
}

fn parse_business_id(params: &HashMap<String, String>) -> Result<Option<u64>, AppError> {
    params
        .get("business_id")
        .map(|value| {
            value
                .parse::<u64>()
                .map_err(|_| AppError::not_found("business_not_found"))
        })
        .transpose()
}

/// Compute the raw response for a cycle type from the stored profile
/// and businesses. Pure over `now`, so tests can pin the clock.
pub fn build_cycle_response(
    cycle: CycleType,
    data: &AppData,
    business_id: Option<u64>,
    now: NaiveDateTime,
) -> Result<CycleResponse, AppError> {
    let today = now.date();

    if cycle == CycleType::Business {
        let business_cycles: Vec<BusinessCycle> = match business_id {
            Some(id) => {
                let business = data
                    .businesses
                    .iter()
                    .find(|b| b.id == id)
                    .ok_or_else(|| AppError::not_found("business_not_found"))?;
                vec![business_record(business, today)]
            }
            None => data
                .businesses
                .iter()
                .map(|business| business_record(business, today))
                .collect(),
        };
        return Ok(CycleResponse::BusinessList { business_cycles });
    }

    let computed = match cycle {
        CycleType::Daily => cycles::daily_cycle(now),
        CycleType::Soul => cycles::soul_cycle(today),
        CycleType::Yearly | CycleType::Human | CycleType::Health | CycleType::Reincarnation => {
            let birth = data
                .profile
                .date_of_birth
                .ok_or_else(|| AppError::bad_request("birth_date_missing"))?;
            match cycle {
                CycleType::Yearly => cycles::yearly_cycle(birth, today),
                CycleType::Human => cycles::human_cycle(birth, today),
                CycleType::Health => cycles::health_cycle(birth, today),
                CycleType::Reincarnation => cycles::reincarnation_cycle(birth, today),
                _ => unreachable!(),
            }
        }
        CycleType::Business => unreachable!(),
    };

    Ok(flat_response(cycle, computed))
}

fn business_record(business: &Business, today: NaiveDate) -> BusinessCycle {
    let computed = cycles::business_cycle(business.establishment_date, today);
    BusinessCycle {
        business: BusinessRef {
            id: business.id,
            name: business.name.clone(),
        },
        current_period: computed.current_period().cloned(),
        progress: Some(computed.progress),
        template: templates::lookup(CycleType::Business, computed.current_number()),
        periods: computed.periods,
    }
}

fn flat_response(cycle: CycleType, computed: CycleData) -> CycleResponse {
    CycleResponse::Flat(FlatCycle {
        current_period: computed.current_period().cloned(),
        current_period_number: Some(computed.current_number()),
        progress: Some(computed.progress),
        template: templates::lookup(cycle, computed.current_number()),
        periods: computed.periods,
    })
}

fn render_view(cycle: CycleType, view: NormalizedView) -> CycleViewResponse {
    CycleViewResponse {
        ring_html: render::render_ring(view.progress, &view.period_name),
        cards_html: render::render_period_cards(cycle, &view),
        summary_html: render::render_summary(&view),
        view,
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in raw.split(';') {
        let trimmed = pair.trim();
        if let Some(value) = trimmed.strip_prefix(name) {
            if let Some(value) = value.strip_prefix('=') {
                return Some(value.to_string());
            }
        }
    }
    None
}

// Double-submit token; the check is cookie/header equality, so the
// token only needs to be opaque, not secret.
fn fresh_csrf_token() -> String {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
        .hash(&mut hasher);
    std::process::id().hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

fn parse_optional_date(value: Option<&String>) -> Result<Option<NaiveDate>, ()> {
    match value.map(|v| v.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ()),
    }
}
