//! Customer CRUD handlers

use axum::extract::{Path, Query, State};
use axum::Json;

use core_kernel::{CustomerId, PageInfo, PageRequest};
use domain_customer::CustomerCreateRequest;

use crate::dto::{CustomerPageResponse, CustomerResponse, ListParams};
use crate::error::ApiError;
use crate::AppState;

/// Creates a new customer aggregate
pub async fn create_customer(
    State(state): State<AppState>,
    Json(request): Json<CustomerCreateRequest>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let customer = state.customers.create(request).await?;
    Ok(Json(customer.into()))
}

/// Lists customers, paginated and ordered by id
pub async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<CustomerPageResponse>, ApiError> {
    let request = PageRequest::from(params);
    let (customers, total) = state.customers.list(request).await?;

    Ok(Json(CustomerPageResponse {
        customers: customers.into_iter().map(CustomerResponse::from).collect(),
        page: PageInfo::compute(request, total),
    }))
}

/// Gets a customer by id
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let customer = state.customers.get(CustomerId::new(id)).await?;
    Ok(Json(customer.into()))
}

/// Replaces a customer aggregate
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<CustomerCreateRequest>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let customer = state.customers.update(CustomerId::new(id), request).await?;
    Ok(Json(customer.into()))
}

/// Deletes a customer and everything it owns
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<(), ApiError> {
    state.customers.delete(CustomerId::new(id)).await?;
    Ok(())
}
