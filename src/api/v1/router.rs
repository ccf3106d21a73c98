use super::error::*;
use super::handler;
use crate::application_port::*;
use crate::domain_model::*;
use crate::logger::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::Method;
use warp::path::FullPath;
use warp::Filter;

const MAX_BODY_BYTES: u64 = 16 * 1024;

pub fn routes(
    session_service: Arc<dyn SessionService>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_request_id())
        .and(with(session_service.clone()))
        .and_then(handler::health);

    let login = warp::path("auth")
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_json_body::<Credentials>())
        .and(with(session_service.clone()))
        .and_then(handler::login);

    let refresh = warp::path("auth")
        .and(warp::path("refresh"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_json_body::<handler::RefreshRequest>())
        .and(with(session_service.clone()))
        .and_then(handler::refresh);

    let get_self = warp::path("user")
        .and(warp::path("self"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_verification(session_service.clone()))
        .and(with(session_service.clone()))
        .and_then(handler::get_self);

    let logout = warp::path("user")
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_verification(session_service.clone()))
        .and(with(session_service.clone()))
        .and_then(handler::logout);

    health.or(login).or(refresh).or(get_self).or(logout)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

/// Reads a bounded JSON body; decode failures carry the request id.
fn with_json_body<T>() -> impl Filter<Extract = (RequestId, T), Error = warp::Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send + 'static,
{
    with_request_id()
        .and(warp::header::optional::<u64>("content-length"))
        .and_then(|request_id: RequestId, length: Option<u64>| async move {
            match length {
                Some(length) if length <= MAX_BODY_BYTES => Ok(request_id),
                _ => {
                    debug!(%request_id, ?length, "body length missing or over limit");
                    Err(ApiRejection::new(ApiErrorCode::BadRequest, &request_id))
                }
            }
        })
        .and(warp::body::bytes())
        .and_then(|request_id: RequestId, bytes: warp::hyper::body::Bytes| async move {
            match serde_json::from_slice::<T>(&bytes) {
                Ok(body) => Ok((request_id, body)),
                Err(e) => {
                    debug!(%request_id, error = %e, "decoding body");
                    Err(ApiRejection::new(ApiErrorCode::BadRequest, &request_id))
                }
            }
        })
        .untuple_one()
}

fn with_request_id() -> impl Filter<Extract = (RequestId,), Error = Infallible> + Clone {
    warp::method()
        .and(warp::path::full())
        .map(|method: Method, path: FullPath| {
            let request_id = RequestId::generate();
            info!(%request_id, %method, path = path.as_str(), "got request");
            request_id
        })
}

/// Validates the bearer access token, yielding its claims.
fn with_verification(
    session_service: Arc<dyn SessionService>,
) -> impl Filter<Extract = (RequestId, AccessTokenClaims), Error = warp::Rejection> + Clone {
    with_request_id()
        .and(warp::header::optional::<String>("authorization"))
        .and_then(move |request_id: RequestId, header: Option<String>| {
            let session_service = session_service.clone();
            async move {
                let token = header
                    .as_deref()
                    .and_then(|h| h.strip_prefix("Bearer "))
                    .ok_or_else(|| {
                        ApiRejection::new(ApiErrorCode::InvalidAccessToken, &request_id)
                    })?;
                let claims = session_service
                    .validate_access(token)
                    .await
                    .map_err(|e| ApiRejection::new(e, &request_id))?;
                Ok::<_, warp::Rejection>((request_id, claims))
            }
        })
        .untuple_one()
}
