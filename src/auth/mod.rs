mod jwt;
mod middleware;
mod password;
mod service;
mod types;
mod validator;

pub use jwt::{TokenError, TokenIssuer};
pub use middleware::JwtAuth;
pub use password::{hash_password, verify_password, PasswordError};
pub use service::{LoginService, LoginSuccess};
pub use types::{Claims, PublicUser};
pub use validator::{validate_identifier, validate_password, ValidationError};
