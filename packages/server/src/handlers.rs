//! HTTP handler functions for the access map API.

use access_map_ai::GenerationRequest;
use access_map_analytics::areas::{aggregate_areas, summarize_global, summarize_scope};
use access_map_analytics::breakdown::{emotion_breakdown, issue_breakdown};
use access_map_analytics::prompts::{
    GLOBAL_REPORT_PROFILE, SCOPE_REPORT_PROFILE, global_report_prompt, scope_report_prompt,
};
use access_map_analytics_models::{PromptPair, ReportProfile};
use access_map_database::RecordFilter;
use access_map_report_models::{LocationUpdate, NewEmotion, NewLocation, NewReport};
use access_map_server_models::{
    ApiHealth, AreaReportParams, AreasResponse, BreakdownResponse, LocationParams,
    MessageResponse, ReportResponse,
};
use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;

type ApiResult = Result<HttpResponse, ApiError>;

/// Parses a required `location_id` query parameter.
fn location_id(params: &LocationParams) -> Result<Uuid, ApiError> {
    let raw = params
        .location_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::Validation("Location ID is required".to_string()))?;

    raw.parse()
        .map_err(|_| ApiError::Validation(format!("Invalid location ID: {raw}")))
}

fn location_not_found() -> ApiError {
    ApiError::NotFound("Location not found".to_string())
}

/// Sends `prompt` to the narrative generator with the settings in `profile`.
async fn narrate(
    state: &AppState,
    prompt: &PromptPair,
    profile: ReportProfile,
) -> Result<String, ApiError> {
    let request = GenerationRequest {
        system_prompt: &prompt.system,
        user_prompt: &prompt.user,
        model: profile.model,
        temperature: profile.temperature,
        max_tokens: profile.max_tokens,
    };

    Ok(state.generator.generate(&request).await?)
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/analytics/llm-report`
///
/// Narrative report over every record: totals, top issues, and overall
/// sentiment.
pub async fn llm_report(state: web::Data<AppState>) -> ApiResult {
    let reports = state.store.reports(&RecordFilter::All).await?;
    let emotions = state.store.emotions(&RecordFilter::All).await?;

    let summary = summarize_global(&reports, &emotions);
    let prompt = global_report_prompt(&summary);
    let report = narrate(&state, &prompt, GLOBAL_REPORT_PROFILE).await?;

    Ok(HttpResponse::Ok().json(ReportResponse { report }))
}

/// `GET /api/analytics/detailed-report-area?area_name=...`
pub async fn detailed_report_area(
    state: web::Data<AppState>,
    params: web::Query<AreaReportParams>,
) -> ApiResult {
    // Area names are matched exactly as stored, so only blank input is rejected.
    let area = params
        .area_name
        .as_deref()
        .filter(|area| !area.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Area name is required".to_string()))?;

    let filter = RecordFilter::Area(area.to_string());
    let reports = state.store.reports(&filter).await?;
    let emotions = state.store.emotions(&filter).await?;

    let summary = summarize_scope(area, &reports, &emotions);
    let prompt = scope_report_prompt(&summary);
    let report = narrate(&state, &prompt, SCOPE_REPORT_PROFILE).await?;

    Ok(HttpResponse::Ok().json(ReportResponse { report }))
}

/// `GET /api/analytics/detailed-report-location?location_id=...`
pub async fn detailed_report_location(
    state: web::Data<AppState>,
    params: web::Query<LocationParams>,
) -> ApiResult {
    let id = location_id(&params)?;
    let location = state
        .store
        .location(id)
        .await?
        .ok_or_else(location_not_found)?;

    let filter = RecordFilter::Location(id);
    let reports = state.store.reports(&filter).await?;
    let emotions = state.store.emotions(&filter).await?;

    let summary = summarize_scope(&location.name, &reports, &emotions);
    let prompt = scope_report_prompt(&summary);
    let report = narrate(&state, &prompt, SCOPE_REPORT_PROFILE).await?;

    Ok(HttpResponse::Ok().json(ReportResponse { report }))
}

/// `GET /api/analytics/area-analysis`
pub async fn area_analysis(state: web::Data<AppState>) -> ApiResult {
    let reports = state.store.reports(&RecordFilter::All).await?;
    let emotions = state.store.emotions(&RecordFilter::All).await?;

    Ok(HttpResponse::Ok().json(AreasResponse {
        areas: aggregate_areas(&reports, &emotions),
    }))
}

/// `GET /api/analytics/location-reports?location_id=...`
pub async fn location_reports(
    state: web::Data<AppState>,
    params: web::Query<LocationParams>,
) -> ApiResult {
    let id = location_id(&params)?;
    let reports = state.store.reports(&RecordFilter::Location(id)).await?;

    Ok(HttpResponse::Ok().json(BreakdownResponse {
        report: issue_breakdown(&reports),
    }))
}

/// `GET /api/analytics/location-emotions?location_id=...`
pub async fn location_emotions(
    state: web::Data<AppState>,
    params: web::Query<LocationParams>,
) -> ApiResult {
    let id = location_id(&params)?;
    let emotions = state.store.emotions(&RecordFilter::Location(id)).await?;

    Ok(HttpResponse::Ok().json(BreakdownResponse {
        report: emotion_breakdown(&emotions),
    }))
}

/// `GET /api/locations`
pub async fn list_locations(state: web::Data<AppState>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.store.locations(None).await?))
}

/// `GET /api/locations/area/{area}`
pub async fn locations_in_area(
    state: web::Data<AppState>,
    area: web::Path<String>,
) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.store.locations(Some(area.as_str())).await?))
}

/// `GET /api/locations/{id}`
pub async fn get_location(state: web::Data<AppState>, id: web::Path<Uuid>) -> ApiResult {
    let location = state
        .store
        .location(*id)
        .await?
        .ok_or_else(location_not_found)?;

    Ok(HttpResponse::Ok().json(location))
}

/// `POST /api/locations`
pub async fn create_location(
    state: web::Data<AppState>,
    body: web::Json<NewLocation>,
) -> ApiResult {
    let location = body.into_inner();
    location.validate()?;

    let location = state.store.insert_location(location).await?;
    log::info!("Created location {} in {}", location.id, location.area);

    Ok(HttpResponse::Created().json(location))
}

/// `PATCH /api/locations/{id}`
pub async fn update_location(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<LocationUpdate>,
) -> ApiResult {
    let update = body.into_inner();
    update.validate()?;

    let location = state
        .store
        .update_location(*id, update)
        .await?
        .ok_or_else(location_not_found)?;

    Ok(HttpResponse::Ok().json(location))
}

/// `DELETE /api/locations/{id}`
pub async fn delete_location(state: web::Data<AppState>, id: web::Path<Uuid>) -> ApiResult {
    if !state.store.delete_location(*id).await? {
        return Err(location_not_found());
    }
    log::info!("Deleted location {id}");

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Location deleted".to_string(),
    }))
}

/// Rejects a new record whose owning location does not exist.
async fn require_location(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    if state.store.location(id).await?.is_none() {
        return Err(ApiError::Validation(format!("Location {id} does not exist")));
    }
    Ok(())
}

/// `GET /api/reports`
pub async fn list_reports(state: web::Data<AppState>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.store.reports(&RecordFilter::All).await?))
}

/// `POST /api/reports`
pub async fn create_report(state: web::Data<AppState>, body: web::Json<NewReport>) -> ApiResult {
    let report = body.into_inner();
    report.validate()?;
    require_location(&state, report.location_id).await?;

    Ok(HttpResponse::Created().json(state.store.insert_report(report).await?))
}

/// `GET /api/emotions`
pub async fn list_emotions(state: web::Data<AppState>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.store.emotions(&RecordFilter::All).await?))
}

/// `POST /api/emotions`
pub async fn create_emotion(
    state: web::Data<AppState>,
    body: web::Json<NewEmotion>,
) -> ApiResult {
    let emotion = body.into_inner();
    require_location(&state, emotion.location_id).await?;

    Ok(HttpResponse::Created().json(state.store.insert_emotion(emotion).await?))
}
