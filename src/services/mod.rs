pub mod auth_service;
pub mod email_service;
pub mod feedback_service;
pub mod idempotency;
pub mod notifier;
pub mod rate_limiter;
pub mod session_service;
pub mod token_service;
pub mod user_service;

pub use auth_service::*;
pub use email_service::*;
pub use feedback_service::*;
pub use idempotency::*;
pub use notifier::*;
pub use rate_limiter::*;
pub use session_service::*;
pub use token_service::*;
pub use user_service::*;
