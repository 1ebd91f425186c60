//! Identity: password storage, session tokens, and request authentication

pub mod credentials;
pub mod extractor;
pub mod jwt;
pub mod password;

pub use credentials::{AuthenticatedUser, CredentialStore, USERS_TABLE};
pub use extractor::MaybePrincipal;
pub use jwt::{Claims, JwtConfig, JwtManager, MAX_TOKEN_TTL_HOURS};
pub use password::DEFAULT_COST as DEFAULT_BCRYPT_COST;
