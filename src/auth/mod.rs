mod claims;
mod identity;
mod jwt;
mod resolver;

pub use claims::Claims;
pub use identity::{IdentityService, LocalIdentityService, UserProfile};
pub use jwt::JwtValidator;
pub use resolver::{extract_bearer_token, AuthorizationResolver};
