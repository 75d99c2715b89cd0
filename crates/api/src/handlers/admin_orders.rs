//! Admin handlers for `/admin/orders`.

use axum::extract::{Path, State};
use axum::Json;
use footprint_core::delivery::{describe, estimated_arrival, shipping_state};
use footprint_core::error::CoreError;
use footprint_core::status::DeliveryStatus;
use footprint_core::types::DbId;
use footprint_db::models::order::{Order, OrderWithItems, UpdateOrder};
use footprint_db::repositories::OrderRepo;
use footprint_events::{notify_best_effort, Notification};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /admin/orders/{id}`. Absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateOrderBody {
    pub status: Option<String>,
    pub delivery_status: Option<String>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub acknowledge: Option<bool>,
}

fn order_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Order", id })
}

/// GET /api/v1/admin/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<OrderWithItems>>> {
    let order = OrderRepo::find_with_items(&state.pool, id)
        .await?
        .ok_or_else(|| order_not_found(id))?;
    Ok(Json(DataResponse { data: order }))
}

/// PUT /api/v1/admin/orders/{id}
///
/// A delivery status change recomputes the estimated arrival from the order's
/// creation time and shipping state. The customer is emailed afterwards.
pub async fn update_order(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(body): Json<UpdateOrderBody>,
) -> AppResult<Json<DataResponse<Order>>> {
    let delivery_status = body
        .delivery_status
        .as_deref()
        .map(|s| {
            DeliveryStatus::parse(s.trim())
                .ok_or_else(|| AppError::BadRequest(format!("Invalid delivery status: {s}")))
        })
        .transpose()?;
    let status = body
        .status
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let before = OrderRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| order_not_found(id))?;

    let arrival = delivery_status.map(|ds| {
        let state_name = before.shipping_address.as_ref().and_then(shipping_state);
        estimated_arrival(before.created_at, ds, state_name)
    });

    let patch = UpdateOrder {
        status,
        delivery_status: delivery_status.map(|ds| ds.as_str().to_string()),
        estimated_arrival: arrival,
        tracking_number: body.tracking_number,
        notes: body.notes,
        acknowledged_by: body
            .acknowledge
            .filter(|ack| *ack)
            .map(|_| admin.email.clone()),
    };

    let order = OrderRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or_else(|| order_not_found(id))?;

    tracing::info!(
        order_id = id,
        admin = %admin.email,
        status = %order.status,
        delivery_status = %order.delivery_status,
        "Order updated",
    );

    if let Some(notification) = status_notification(&before, &order, delivery_status) {
        notify_best_effort(state.notifier.as_ref(), &notification).await;
    }

    Ok(Json(DataResponse { data: order }))
}

/// The email owed to the customer after an update, if any.
///
/// Moving to `dispatch` sends the shipping notice; any other change to the
/// status or delivery stage sends a generic update.
fn status_notification(
    before: &Order,
    after: &Order,
    requested_delivery: Option<DeliveryStatus>,
) -> Option<Notification> {
    let customer_name = after
        .customer_name
        .clone()
        .unwrap_or_else(|| "Customer".to_string());

    if requested_delivery == Some(DeliveryStatus::Dispatch) {
        return Some(Notification::OrderShipped {
            to: after.email.clone(),
            customer_name,
            order_number: after.order_number.clone(),
            tracking_number: after.tracking_number.clone(),
            estimated_arrival: after.estimated_arrival,
        });
    }

    let changed =
        before.status != after.status || before.delivery_status != after.delivery_status;
    if !changed {
        return None;
    }

    let stage = DeliveryStatus::parse(&after.delivery_status);
    Some(Notification::OrderStatusUpdate {
        to: after.email.clone(),
        customer_name,
        order_number: after.order_number.clone(),
        status: after.status.clone(),
        delivery_status: after.delivery_status.clone(),
        delivery_description: stage.map(describe).unwrap_or_default().to_string(),
        estimated_arrival: after.estimated_arrival,
    })
}
