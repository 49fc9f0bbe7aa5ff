pub mod generate;
pub mod health;
pub mod types;

pub use generate::{GenerateService, RequestRules, generate_routes};
pub use health::{AppStartTime, HealthService, health_routes};
pub use types::{ErrorBody, GenerateRequest, GenerateResponse, HealthResponse};
