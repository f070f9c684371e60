// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State, Extension},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_appointment_manager;

use crate::models::{
    AppointmentError, BookAppointmentRequest, EndTimeQuery, ServicePriceQuery,
    StatusUpdateRequest, UpdateAppointmentRequest,
};
use crate::services::billing::BillingOutcome;
use crate::services::booking::{AppointmentBackends, AppointmentBookingService};
use crate::services::end_time::EndTimeCalculator;
use crate::services::pricing::PricingService;
use crate::services::schedule::format_hms;

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::Conflict { .. } => AppError::Conflict(e.to_string()),
        AppointmentError::OutsideWorkingHours { .. } => AppError::ValidationError(e.to_string()),
        AppointmentError::SettingsUnavailable(_) => AppError::ValidationError(e.to_string()),
        AppointmentError::InvalidTime(msg) => AppError::BadRequest(msg),
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
    }
}

fn billing_json(billing: Option<BillingOutcome>) -> Value {
    billing.map_or(Value::Null, |outcome| json!(outcome.summary()))
}

// ==============================================================================
// PUBLIC (WHITELISTED) LOOKUPS
// ==============================================================================

/// Estimated end time for a service booked at the given date and time.
pub async fn calculate_end_time(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<EndTimeQuery>,
) -> Result<Json<Value>, AppError> {
    let backends = AppointmentBackends::supabase(&state, None);
    let calculator = EndTimeCalculator::new(backends.catalog);

    let end_time = calculator.calculate_end_time(
        query.service.as_deref(),
        query.appointment_date.as_deref(),
        query.appointment_time.as_deref(),
    ).await.map_err(map_appointment_error)?;

    Ok(Json(json!({
        "estimated_end_time": end_time.map(format_hms)
    })))
}

pub async fn get_service_price(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<ServicePriceQuery>,
) -> Result<Json<Value>, AppError> {
    let backends = AppointmentBackends::supabase(&state, None);
    let pricing = PricingService::new(backends.catalog);

    let price = pricing.get_service_price(query.service.as_deref()).await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({ "price": price })))
}

// ==============================================================================
// APPOINTMENT DOCUMENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    require_appointment_manager(&user)?;

    let booking_service = AppointmentBookingService::new(&state, Some(auth.token()));

    let (appointment, billing) = booking_service.book_appointment(request).await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "billing": billing_json(billing),
        "message": "Appointment booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state, Some(auth.token()));

    let appointment = booking_service.get_appointment(appointment_id).await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    require_appointment_manager(&user)?;

    let booking_service = AppointmentBookingService::new(&state, Some(auth.token()));

    let (appointment, billing) = booking_service.update_appointment(appointment_id, request).await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "billing": billing_json(billing),
        "message": "Appointment updated successfully"
    })))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    require_appointment_manager(&user)?;

    let booking_service = AppointmentBookingService::new(&state, Some(auth.token()));

    let (appointment, billing) = booking_service.change_status(appointment_id, request.status).await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "billing": billing_json(billing),
        "message": format!("Appointment marked as {}", appointment.status)
    })))
}
