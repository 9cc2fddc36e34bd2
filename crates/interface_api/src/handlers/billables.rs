//! Billable handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use core_kernel::{BillableId, Money};

use crate::dto::billing::*;
use crate::dto::DataResponse;
use crate::extract::ValidatedJson;
use crate::{error::ApiError, AppState};

type ApiResult<T> = Result<Json<DataResponse<T>>, ApiError>;

/// Creates a billable
pub async fn create_billable(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateBillableRequest>,
) -> Result<(StatusCode, Json<DataResponse<BillableResponse>>), ApiError> {
    let billable = state
        .engine
        .create_billable(
            BillableId::new(request.billable_id),
            Money::from_minor(request.amount_principal),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse::new(billable.into()))))
}

/// Gets a billable by id
pub async fn get_billable(
    State(state): State<AppState>,
    Path(billable_id): Path<String>,
) -> ApiResult<BillableResponse> {
    let billable = state.engine.get_billable(&BillableId::new(billable_id)).await?;
    Ok(Json(DataResponse::new(billable.into())))
}

/// Records one installment payment
pub async fn make_payment(
    State(state): State<AppState>,
    Path(billable_id): Path<String>,
    ValidatedJson(request): ValidatedJson<MakePaymentRequest>,
) -> Result<(StatusCode, Json<DataResponse<PaymentResponse>>), ApiError> {
    let paid_at = request.paid_at.unwrap_or_else(|| state.engine.clock().now());
    let payment = state
        .engine
        .record_payment(
            &BillableId::new(billable_id),
            Money::from_minor(request.amount),
            paid_at,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse::new(payment.into()))))
}

/// Lists a billable's payments in the order they were recorded
pub async fn list_payments(
    State(state): State<AppState>,
    Path(billable_id): Path<String>,
) -> ApiResult<Vec<PaymentResponse>> {
    let payments = state.engine.list_payments(&BillableId::new(billable_id)).await?;
    Ok(Json(DataResponse::new(
        payments.into_iter().map(PaymentResponse::from).collect(),
    )))
}

/// Gets the outstanding balance
pub async fn get_outstanding(
    State(state): State<AppState>,
    Path(billable_id): Path<String>,
) -> ApiResult<OutstandingResponse> {
    let outstanding = state.engine.get_outstanding(&BillableId::new(billable_id)).await?;
    Ok(Json(DataResponse::new(outstanding.into())))
}

/// Checks whether the borrower is delinquent right now
pub async fn check_delinquency(
    State(state): State<AppState>,
    Path(billable_id): Path<String>,
) -> ApiResult<DelinquencyResponse> {
    let assessment = state
        .engine
        .assess_delinquency(&BillableId::new(billable_id))
        .await?;
    Ok(Json(DataResponse::new(assessment.into())))
}
