use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use crate::logger::*;
use serde::Serialize;
use std::convert::Infallible;
use std::fmt;
use thiserror::Error;
use warp::http::StatusCode;
use warp::{Rejection, reject};

#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn generate() -> Self {
        RequestId(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub status: u16,
    pub message: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid access token")]
    InvalidAccessToken,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("not found")]
    NotFound,
    #[error("bad request")]
    BadRequest,
    #[error("internal storage error")]
    InternalStorage,
    #[error("internal security error")]
    InternalSecurity,
    #[error("internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn http_status(self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidCredentials | ApiErrorCode::InvalidAccessToken => {
                StatusCode::UNAUTHORIZED
            }
            ApiErrorCode::InvalidRefreshToken | ApiErrorCode::BadRequest => {
                StatusCode::BAD_REQUEST
            }
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::InternalStorage
            | ApiErrorCode::InternalSecurity
            | ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Finer grained status carried in the error body.
    pub fn app_status(self) -> u16 {
        match self {
            ApiErrorCode::InvalidCredentials => 4011,
            ApiErrorCode::InvalidAccessToken => 4012,
            ApiErrorCode::InvalidRefreshToken => 4013,
            ApiErrorCode::NotFound => 4040,
            ApiErrorCode::BadRequest => 4000,
            ApiErrorCode::InternalError => 5000,
            ApiErrorCode::InternalStorage => 5001,
            ApiErrorCode::InternalSecurity => 5002,
        }
    }
}

impl From<SessionError> for ApiErrorCode {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            SessionError::InvalidAccessToken => ApiErrorCode::InvalidAccessToken,
            SessionError::InvalidRefreshToken => ApiErrorCode::InvalidRefreshToken,
            SessionError::NotFound => ApiErrorCode::NotFound,
            SessionError::InternalStorage => ApiErrorCode::InternalStorage,
            SessionError::InternalSecurity => ApiErrorCode::InternalSecurity,
        }
    }
}

/// A failed request, tagged with the id it was logged under.
#[derive(Debug)]
pub struct ApiRejection {
    pub code: ApiErrorCode,
    pub request_id: RequestId,
}

impl ApiRejection {
    pub fn new(code: impl Into<ApiErrorCode>, request_id: &RequestId) -> Rejection {
        reject::custom(ApiRejection {
            code: code.into(),
            request_id: request_id.clone(),
        })
    }
}

impl reject::Reject for ApiRejection {}

fn reply_error(
    code: ApiErrorCode,
    request_id: Option<&RequestId>,
) -> warp::reply::WithStatus<warp::reply::Json> {
    let status = code.http_status();
    if status.is_server_error() {
        error!(request_id = ?request_id.map(|r| &r.0), %code, "request failed");
    } else {
        warn!(request_id = ?request_id.map(|r| &r.0), %code, "request rejected");
    }

    let json = warp::reply::json(&ApiResponse::<()> {
        success: false,
        data: None,
        error: Some(ApiError {
            code,
            status: code.app_status(),
            message: code.to_string(),
            request_id: request_id.map(|r| r.0.clone()),
        }),
    });
    warp::reply::with_status(json, status)
}

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    if let Some(rejection) = err.find::<ApiRejection>() {
        return Ok(reply_error(rejection.code, Some(&rejection.request_id)));
    }

    let code = if err.is_not_found() {
        ApiErrorCode::NotFound
    } else if err.find::<reject::InvalidHeader>().is_some()
        || err.find::<reject::MethodNotAllowed>().is_some()
    {
        ApiErrorCode::BadRequest
    } else {
        warn!("unhandled rejection: {:?}", err);
        ApiErrorCode::InternalError
    };
    Ok(reply_error(code, None))
}
