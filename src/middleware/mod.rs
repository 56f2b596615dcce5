pub mod cors;
pub mod payload;
pub mod query;
pub mod response;

pub use cors::{cors_layer, preflight_body};
pub use payload::Payload;
pub use query::QueryParams;
pub use response::{ApiResponse, ApiResult};
