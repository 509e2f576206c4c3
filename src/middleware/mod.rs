pub mod auth;
pub mod response;

pub use auth::{auth_middleware, CurrentAccount};
pub use response::{ApiResponse, ApiResult};
