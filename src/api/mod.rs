pub mod v1;

use crate::application_port::SessionService;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

/// The `/api/v1` tree with error recovery applied.
pub fn api_v1(
    session_service: Arc<dyn SessionService>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone {
    warp::path("api")
        .and(warp::path("v1"))
        .and(v1::routes(session_service))
        .recover(v1::recover_error)
}
