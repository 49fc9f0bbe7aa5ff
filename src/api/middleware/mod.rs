pub mod api_key;
pub mod request_id;
pub mod timing;

pub use api_key::{ApiKeyGuard, ApiKeySettings};
pub use request_id::{RequestId, RequestIdMiddleware, request_id_of};
pub use timing::TimingMiddleware;
