use super::error::*;
use crate::application_port::*;
use crate::domain_model::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

pub async fn health(
    _request_id: RequestId,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let health = session_service.check_health().await;
    Ok(warp::reply::json(&ApiResponse::ok(health)))
}

pub async fn login(
    request_id: RequestId,
    body: Credentials,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if body.username.is_empty() || body.password.is_empty() {
        return Err(ApiRejection::new(ApiErrorCode::BadRequest, &request_id));
    }

    let pair = session_service
        .login(body)
        .await
        .map_err(|e| ApiRejection::new(e, &request_id))?;

    Ok(warp::reply::json(&ApiResponse::ok(pair)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn refresh(
    request_id: RequestId,
    body: RefreshRequest,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let pair = session_service
        .refresh_token(&body.refresh_token)
        .await
        .map_err(|e| ApiRejection::new(e, &request_id))?;

    Ok(warp::reply::json(&ApiResponse::ok(pair)))
}

pub async fn get_self(
    request_id: RequestId,
    claims: AccessTokenClaims,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user = session_service
        .get_user(claims.user_id)
        .await
        .map_err(|e| ApiRejection::new(e, &request_id))?;

    Ok(warp::reply::json(&ApiResponse::ok(user)))
}

pub async fn logout(
    request_id: RequestId,
    claims: AccessTokenClaims,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    session_service
        .logout(claims.user_id)
        .await
        .map_err(|e| ApiRejection::new(e, &request_id))?;

    Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}
