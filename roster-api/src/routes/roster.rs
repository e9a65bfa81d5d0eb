/// Roster endpoints
///
/// # Endpoints
///
/// - `GET /api/roster/current` - Most recently updated roster, or null
/// - `GET /api/roster/today` - Today's shifts from the current roster
/// - `GET /api/roster/:id` - One roster
/// - `GET /api/roster/template` - Blank week for the editor (admin)
/// - `POST /api/roster/validate` - Best-effort checks (admin)
/// - `POST /api/roster` - Save a new roster (admin)
/// - `PUT /api/roster/:id` - Overwrite a roster (admin)
/// - `GET /api/rosters` - List of all rosters (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Datelike, Local, Utc};
use roster_shared::{
    auth::middleware::AuthContext,
    models::{
        roster::{CreateRoster, Roster, RosterSummary, UpdateRoster},
        schedule::{
            all_days_active, blank_week, day_schedule, is_day_active, is_truthy, validate_week,
            ActiveDays, DaySchedule, WeekSchedule, Weekday,
        },
    },
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Roster as the client sees it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterView {
    pub id: i64,
    pub name: String,
    pub data: Value,
    pub active_days: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Roster> for RosterView {
    fn from(roster: Roster) -> Self {
        Self {
            id: roster.id,
            name: roster.name,
            data: roster.data.0,
            active_days: roster.active_days.0,
            created_at: roster.created_at,
            updated_at: roster.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RosterResponse {
    pub roster: Option<RosterView>,
}

/// Body of create and update
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRequest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub data: Option<Value>,

    #[serde(default)]
    pub active_days: Option<Value>,
}

/// A request whose three fields are all present
struct RosterFields {
    name: String,
    data: Value,
    active_days: Value,
}

impl RosterRequest {
    /// `name` must be a non-empty string; `data` and `activeDays` must be
    /// truthy
    fn require_fields(self) -> ApiResult<RosterFields> {
        let missing = || ApiError::BadRequest("Name, data, and activeDays are required".to_string());

        let name = self.name.filter(|n| !n.is_empty()).ok_or_else(missing)?;
        let data = self.data.filter(is_truthy).ok_or_else(missing)?;
        let active_days = self.active_days.filter(is_truthy).ok_or_else(missing)?;

        Ok(RosterFields {
            name,
            data,
            active_days,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRosterResponse {
    pub message: String,
    pub roster_id: i64,
}

#[derive(Debug, Serialize)]
pub struct UpdateRosterResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RosterListResponse {
    pub rosters: Vec<RosterSummary>,
}

/// Today's slice of the current roster
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayResponse {
    pub day: Weekday,

    /// Whether today is flagged active in the roster
    pub active: bool,

    pub shift: Option<DaySchedule>,
    pub roster_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    pub data: WeekSchedule,
    pub active_days: ActiveDays,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    #[serde(default)]
    pub data: Value,

    #[serde(default)]
    pub active_days: Value,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Roster IDs arrive as path text; anything non-numeric cannot exist
fn parse_roster_id(raw: &str) -> ApiResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::NotFound("Roster not found".to_string()))
}

/// Current roster
///
/// `{"roster": null}` when nothing has been saved yet.
pub async fn current_roster(State(state): State<AppState>) -> ApiResult<Json<RosterResponse>> {
    let roster = Roster::find_current(&state.db).await?;

    Ok(Json(RosterResponse {
        roster: roster.map(RosterView::from),
    }))
}

/// Today's shifts
///
/// Uses the server's local weekday. `shift` is null when there is no
/// roster or the roster has nothing usable for today.
pub async fn today(State(state): State<AppState>) -> ApiResult<Json<TodayResponse>> {
    let day = Weekday::from_chrono(Local::now().weekday());

    let response = match Roster::find_current(&state.db).await? {
        Some(roster) => TodayResponse {
            day,
            active: is_day_active(&roster.active_days.0, day),
            shift: day_schedule(&roster.data.0, day),
            roster_id: Some(roster.id),
        },
        None => TodayResponse {
            day,
            active: false,
            shift: None,
            roster_id: None,
        },
    };

    Ok(Json(response))
}

/// Single roster by ID
///
/// # Errors
///
/// - `404 Not Found`: No roster with that ID
pub async fn get_roster(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RosterResponse>> {
    let id = parse_roster_id(&id)?;

    let roster = Roster::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Roster not found".to_string()))?;

    Ok(Json(RosterResponse {
        roster: Some(roster.into()),
    }))
}

/// Blank week for a new roster
pub async fn template() -> Json<TemplateResponse> {
    Json(TemplateResponse {
        data: blank_week(),
        active_days: all_days_active(),
    })
}

/// Runs the editor's pre-save checks
///
/// Advisory only: create and update do not call this.
pub async fn validate_roster(ApiJson(req): ApiJson<ValidateRequest>) -> Json<ValidateResponse> {
    let errors = validate_week(&req.data, &req.active_days);

    Json(ValidateResponse {
        valid: errors.is_empty(),
        errors,
    })
}

/// Saves a new roster
///
/// Every save inserts a row, and the new row becomes current.
///
/// # Errors
///
/// - `400 Bad Request`: `name`, `data` or `activeDays` missing
pub async fn create_roster(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<RosterRequest>,
) -> ApiResult<Json<CreateRosterResponse>> {
    let fields = req.require_fields()?;

    let roster = Roster::create(
        &state.db,
        CreateRoster {
            name: fields.name,
            data: fields.data,
            active_days: fields.active_days,
            created_by: Some(auth.user_id),
        },
    )
    .await?;

    tracing::info!(roster_id = roster.id, user_id = auth.user_id, "Roster created");

    Ok(Json(CreateRosterResponse {
        message: "Roster created successfully".to_string(),
        roster_id: roster.id,
    }))
}

/// Overwrites an existing roster
///
/// # Errors
///
/// - `400 Bad Request`: `name`, `data` or `activeDays` missing
/// - `404 Not Found`: No roster with that ID
pub async fn update_roster(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<RosterRequest>,
) -> ApiResult<Json<UpdateRosterResponse>> {
    let fields = req.require_fields()?;
    let id = parse_roster_id(&id)?;

    let roster = Roster::update(
        &state.db,
        id,
        UpdateRoster {
            name: fields.name,
            data: fields.data,
            active_days: fields.active_days,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Roster not found".to_string()))?;

    tracing::info!(roster_id = roster.id, user_id = auth.user_id, "Roster updated");

    Ok(Json(UpdateRosterResponse {
        message: "Roster updated successfully".to_string(),
    }))
}

/// All rosters, newest update first, without their documents
pub async fn list_rosters(State(state): State<AppState>) -> ApiResult<Json<RosterListResponse>> {
    let rosters = Roster::list_summaries(&state.db).await?;

    Ok(Json(RosterListResponse { rosters }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(name: Option<&str>, data: Option<Value>, active_days: Option<Value>) -> RosterRequest {
        RosterRequest {
            name: name.map(str::to_string),
            data,
            active_days,
        }
    }

    #[test]
    fn test_require_fields_accepts_complete_body() {
        let fields = request(Some("Week 1"), Some(json!({})), Some(json!({"monday": true})))
            .require_fields()
            .unwrap();

        assert_eq!(fields.name, "Week 1");
        assert_eq!(fields.active_days["monday"], json!(true));
    }

    #[test]
    fn test_require_fields_rejects_falsy_values() {
        let cases = vec![
            request(None, Some(json!({})), Some(json!({}))),
            request(Some(""), Some(json!({})), Some(json!({}))),
            request(Some("Week 1"), None, Some(json!({}))),
            request(Some("Week 1"), Some(Value::Null), Some(json!({}))),
            request(Some("Week 1"), Some(json!({})), Some(json!(false))),
            request(Some("Week 1"), Some(json!("")), Some(json!({}))),
        ];

        for case in cases {
            match case.require_fields() {
                Err(ApiError::BadRequest(msg)) => {
                    assert_eq!(msg, "Name, data, and activeDays are required")
                }
                Err(other) => panic!("unexpected error: {}", other),
                Ok(_) => panic!("incomplete body accepted"),
            }
        }
    }

    #[test]
    fn test_parse_roster_id() {
        assert_eq!(parse_roster_id("42").unwrap(), 42);
        assert!(matches!(parse_roster_id("abc"), Err(ApiError::NotFound(_))));
    }
}
