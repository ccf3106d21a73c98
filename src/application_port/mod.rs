mod session_service;
mod token_authority;

pub use session_service::*;
pub use token_authority::*;
