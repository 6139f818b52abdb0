//! # API REST
//!
//! REST API implementation for the cardio risk service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (bearer extraction, JSON rejections, status codes, CORS)
//!
//! All business rules live in [`cardio_core::AssessmentService`]; handlers only translate
//! between HTTP and service calls.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use api_shared::{
    auth::bearer_token, Appointment, AppointmentStatus, AppointmentTrendPoint,
    CreateAppointmentReq, DoctorDashboardRes, ErrorRes, HealthData, HealthRecord, HealthRes,
    HealthService, ListAppointmentsRes, ListDoctorsRes, ListHealthRecordsRes, ListPredictionsRes,
    PatientDetailRes, PatientStatistics, PredictReq, PredictRes, Prediction, Profile,
    RiskDistributionEntry, RiskLevel, RiskLevelMetrics, RiskTimelinePoint, Role, RosterEntry,
    UpdateAppointmentStatusReq,
};
use cardio_core::{AssessmentError, AssessmentService};

/// Application state for the REST API server
///
/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    service: Arc<AssessmentService>,
}

impl AppState {
    pub fn new(service: Arc<AssessmentService>) -> Self {
        Self { service }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        predict_heart_risk,
        list_predictions,
        list_health_data,
        list_doctors,
        list_appointments,
        create_appointment,
        update_appointment_status,
        doctor_dashboard,
        patient_detail,
    ),
    components(schemas(
        HealthRes,
        ErrorRes,
        HealthData,
        HealthRecord,
        RiskLevel,
        Prediction,
        Role,
        Profile,
        AppointmentStatus,
        Appointment,
        PredictReq,
        PredictRes,
        ListPredictionsRes,
        ListHealthRecordsRes,
        ListAppointmentsRes,
        ListDoctorsRes,
        CreateAppointmentReq,
        UpdateAppointmentStatusReq,
        RosterEntry,
        RiskDistributionEntry,
        RiskLevelMetrics,
        PatientStatistics,
        AppointmentTrendPoint,
        RiskTimelinePoint,
        DoctorDashboardRes,
        PatientDetailRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict-heart-risk", post(predict_heart_risk))
        .route("/predictions", get(list_predictions))
        .route("/health-data", get(list_health_data))
        .route("/doctors", get(list_doctors))
        .route("/appointments", get(list_appointments))
        .route("/appointments", post(create_appointment))
        .route("/appointments/:id/status", put(update_appointment_status))
        .route("/doctor/dashboard", get(doctor_dashboard))
        .route("/doctor/patients/:id", get(patient_detail))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Error response carrying a status code and a flat `{ "error": ... }` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<AssessmentError> for ApiError {
    fn from(err: AssessmentError) -> Self {
        let (status, message) = match &err {
            AssessmentError::Unauthorized => (StatusCode::UNAUTHORIZED, err.to_string()),
            AssessmentError::Forbidden(_) => (StatusCode::FORBIDDEN, err.to_string()),
            AssessmentError::InvalidInput(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            AssessmentError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
            e if e.is_inference() => {
                tracing::error!("Inference error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to generate risk assessment".to_string(),
                )
            }
            e => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };
        Self { status, message }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorRes { error: self.message })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Reads the bearer token from the request, if it has a well-formed one.
///
/// A missing or malformed header yields `None`, which the service rejects as unauthorized.
fn caller_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    bearer_token(header).ok()
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks. Requires no authentication.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/predict-heart-risk",
    request_body = PredictReq,
    responses(
        (status = 200, description = "Assessment stored", body = PredictRes),
        (status = 400, description = "Malformed or out-of-range health data", body = ErrorRes),
        (status = 401, description = "Missing or unknown bearer token", body = ErrorRes),
        (status = 500, description = "Inference or storage failure", body = ErrorRes)
    )
)]
/// Run a cardiovascular risk assessment for the caller
///
/// Validates the submitted health data, asks the model for an assessment and stores the health
/// record together with its prediction. When the model reply cannot be used, the fixed
/// fallback assessment is stored and `fallbackUsed` is set.
///
/// # Errors
/// Returns `401 Unauthorized` before the body is read if the token does not resolve, and
/// `500 Internal Server Error` if the gateway call or either write fails.
#[axum::debug_handler]
async fn predict_heart_risk(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PredictReq>, JsonRejection>,
) -> ApiResult<PredictRes> {
    let token = caller_token(&headers);
    state.service.authorize(token)?;
    let Json(req) = payload?;

    let outcome = state.service.assess(token, req.health_data).await?;
    let fallback_used = outcome.used_fallback();

    Ok(Json(PredictRes {
        success: true,
        prediction: outcome.prediction,
        fallback_used,
    }))
}

#[utoipa::path(
    get,
    path = "/predictions",
    responses(
        (status = 200, description = "The caller's predictions, newest first", body = ListPredictionsRes),
        (status = 401, description = "Missing or unknown bearer token", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn list_predictions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<ListPredictionsRes> {
    let predictions = state.service.own_predictions(caller_token(&headers))?;
    Ok(Json(ListPredictionsRes { predictions }))
}

#[utoipa::path(
    get,
    path = "/health-data",
    responses(
        (status = 200, description = "The caller's health records, newest first", body = ListHealthRecordsRes),
        (status = 401, description = "Missing or unknown bearer token", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn list_health_data(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<ListHealthRecordsRes> {
    let health_records = state.service.own_health_records(caller_token(&headers))?;
    Ok(Json(ListHealthRecordsRes { health_records }))
}

#[utoipa::path(
    get,
    path = "/doctors",
    responses(
        (status = 200, description = "Doctors available for booking", body = ListDoctorsRes),
        (status = 401, description = "Missing or unknown bearer token", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn list_doctors(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<ListDoctorsRes> {
    let doctors = state.service.doctors(caller_token(&headers))?;
    Ok(Json(ListDoctorsRes { doctors }))
}

#[utoipa::path(
    get,
    path = "/appointments",
    responses(
        (status = 200, description = "Doctor schedule or patient bookings", body = ListAppointmentsRes),
        (status = 401, description = "Missing or unknown bearer token", body = ErrorRes)
    )
)]
/// List appointments for the caller
///
/// Doctors get their schedule (soonest first); patients get their bookings (latest first).
#[axum::debug_handler]
async fn list_appointments(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<ListAppointmentsRes> {
    let appointments = state.service.appointments(caller_token(&headers))?;
    Ok(Json(ListAppointmentsRes { appointments }))
}

#[utoipa::path(
    post,
    path = "/appointments",
    request_body = CreateAppointmentReq,
    responses(
        (status = 201, description = "Appointment booked", body = Appointment),
        (status = 400, description = "Bad request or unknown doctor", body = ErrorRes),
        (status = 401, description = "Missing or unknown bearer token", body = ErrorRes),
        (status = 403, description = "Caller is not a patient", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn create_appointment(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateAppointmentReq>, JsonRejection>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let token = caller_token(&headers);
    state.service.authorize(token)?;
    let Json(req) = payload?;

    let appointment = state.service.book_appointment(token, req)?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[utoipa::path(
    put,
    path = "/appointments/{id}/status",
    params(("id" = Uuid, Path, description = "Appointment id")),
    request_body = UpdateAppointmentStatusReq,
    responses(
        (status = 200, description = "Appointment updated", body = Appointment),
        (status = 401, description = "Missing or unknown bearer token", body = ErrorRes),
        (status = 403, description = "Caller is not a doctor", body = ErrorRes),
        (status = 404, description = "No such appointment for this doctor", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn update_appointment_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateAppointmentStatusReq>, JsonRejection>,
) -> ApiResult<Appointment> {
    let token = caller_token(&headers);
    state.service.require_doctor(token)?;
    let Path(id) = id?;
    let Json(req) = payload?;

    let appointment = state.service.update_appointment_status(token, id, req)?;
    Ok(Json(appointment))
}

#[utoipa::path(
    get,
    path = "/doctor/dashboard",
    responses(
        (status = 200, description = "Roster and aggregates", body = DoctorDashboardRes),
        (status = 401, description = "Missing or unknown bearer token", body = ErrorRes),
        (status = 403, description = "Caller is not a doctor", body = ErrorRes)
    )
)]
/// Doctor dashboard
///
/// Patient roster with latest risk, risk distribution and per-level metrics, headline
/// statistics, and daily appointment counts for the last 30 days.
#[axum::debug_handler]
async fn doctor_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<DoctorDashboardRes> {
    let today = chrono::Utc::now().date_naive();
    let dashboard = state
        .service
        .doctor_dashboard(caller_token(&headers), today)?;
    Ok(Json(dashboard))
}

#[utoipa::path(
    get,
    path = "/doctor/patients/{id}",
    params(("id" = Uuid, Path, description = "Patient user id")),
    responses(
        (status = 200, description = "Patient detail", body = PatientDetailRes),
        (status = 401, description = "Missing or unknown bearer token", body = ErrorRes),
        (status = 403, description = "Caller is not a doctor", body = ErrorRes),
        (status = 404, description = "No such patient", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn patient_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<PatientDetailRes> {
    let token = caller_token(&headers);
    state.service.require_doctor(token)?;
    let Path(id) = id?;

    let detail = state.service.patient_detail(token, id)?;
    Ok(Json(detail))
}
