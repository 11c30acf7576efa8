//! Booking routes: price quotes, creation, listing

use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use temanly_booking::{
    calculate_service_price, calculate_total_price, has_restricted_services,
    service_restrictions, BookingRequest, CreatedBooking, DurationUnit, ServiceSelection,
    Transaction,
};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SelectionBody {
    pub id: String,
    pub duration: u32,
    pub unit: String,
}

impl SelectionBody {
    fn into_selection(self) -> ApiResult<ServiceSelection> {
        let unit = DurationUnit::parse_str(&self.unit)
            .ok_or_else(|| ApiError::BadRequest(format!("Unknown duration unit '{}'", self.unit)))?;
        if self.duration == 0 {
            return Err(ApiError::BadRequest("Duration must be positive".to_string()));
        }
        Ok(ServiceSelection::new(self.id, self.duration, unit))
    }
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub selections: Vec<SelectionBody>,
}

#[derive(Debug, Serialize)]
pub struct QuoteLineItem {
    pub id: String,
    pub price: i64,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub line_items: Vec<QuoteLineItem>,
    pub total: i64,
    /// Display names of selected services the caller cannot book yet;
    /// empty for verified users.
    pub restricted_services: Vec<&'static str>,
}

/// Price a selection set without persisting anything.
///
/// Quotes are allowed to include restricted services so the frontend can
/// show the price alongside the verification call-to-action; only the
/// create endpoint enforces the gate.
pub async fn quote(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<QuoteRequest>,
) -> ApiResult<Json<QuoteResponse>> {
    let selections = body
        .selections
        .into_iter()
        .map(SelectionBody::into_selection)
        .collect::<ApiResult<Vec<_>>>()?;

    let is_verified = state
        .booking
        .verification
        .is_verified(auth_user.user_id)
        .await?;

    let line_items = selections
        .iter()
        .map(|s| QuoteLineItem {
            id: s.id.clone(),
            price: calculate_service_price(s),
        })
        .collect();

    let restricted_services = if has_restricted_services(&selections, is_verified) {
        service_restrictions(is_verified)
    } else {
        Vec::new()
    };

    Ok(Json(QuoteResponse {
        line_items,
        total: calculate_total_price(&selections),
        restricted_services,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingBody {
    pub talent_id: Uuid,
    pub selection: SelectionBody,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
}

/// Create a booking and its Snap payment session.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateBookingBody>,
) -> ApiResult<Json<CreatedBooking>> {
    if body.customer_name.trim().is_empty() || body.customer_email.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Customer name and email are required".to_string(),
        ));
    }

    let selection = body.selection.into_selection()?;

    let is_verified = state
        .booking
        .verification
        .is_verified(auth_user.user_id)
        .await?;

    let request = BookingRequest {
        user_id: auth_user.user_id,
        talent_id: body.talent_id,
        selection,
        customer_name: body.customer_name,
        customer_email: body.customer_email,
        customer_phone: body.customer_phone,
    };

    let created = state
        .booking
        .transactions
        .create_booking(&request, is_verified)
        .await?;

    Ok(Json(created))
}

/// Fetch one booking by order id for the post-payment status poll.
///
/// Only the booking's owner may read it.
pub async fn detail(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(order_id): Path<String>,
) -> ApiResult<Json<Transaction>> {
    let transaction = state
        .booking
        .transactions
        .find_by_order_id(&order_id)
        .await?;

    if transaction.user_id != auth_user.user_id {
        return Err(ApiError::NotFound);
    }

    Ok(Json(transaction))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct BookingListResponse {
    pub bookings: Vec<Transaction>,
}

/// The caller's own transactions, newest first.
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<BookingListResponse>> {
    let bookings = state
        .booking
        .transactions
        .list_for_user(auth_user.user_id, query.limit.unwrap_or(50))
        .await?;

    Ok(Json(BookingListResponse { bookings }))
}
