pub mod auth_token;
pub mod feedback;
pub mod user;

pub use auth_token::*;
pub use feedback::*;
pub use user::*;
