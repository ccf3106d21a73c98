mod jwt_token_authority;
mod session_service_impl;

pub use jwt_token_authority::*;
pub use session_service_impl::*;
