use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct CheckInQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub(crate) lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub(crate) lng: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LocationDto {
    pub(crate) name: String,
    pub(crate) lat: f64,
    pub(crate) lng: f64,
}

#[utoipa::path(
    post,
    path = "/helloworld",
    tag = "checkin",
    params(CheckInQuery),
    responses(
        (status = 201, description = "Posted; body holds the place when one was found", body = LocationDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authorized"),
        (status = 502, description = "Unknown error calling Graph API")
    )
)]
pub(crate) async fn hello_world(
    State(state): State<AppState>,
    Query(query): Query<CheckInQuery>,
) -> AppResult<Response> {
    query.validate()?;

    let check_in = state.oauth.hello_world(query.lat, query.lng).await?;

    let response = match check_in.place {
        Some(place) => (
            StatusCode::CREATED,
            Json(LocationDto {
                name: place.name,
                lat: place.lat,
                lng: place.lng,
            }),
        )
            .into_response(),
        None => StatusCode::CREATED.into_response(),
    };
    Ok(response)
}
