//! `vitrina-auth`: authentication and authorization boundary.
//!
//! Token claims, HS256 signing, role → permission policy and the user/profile
//! model. Decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{authorize, permissions_from_roles, ActionAuthorization, AuthzError};
pub use claims::{JwtClaims, TokenValidationError};
pub use jwt::{Hs256Jwt, JwtError, JwtValidator};
pub use permissions::Permission;
pub use principal::Principal;
pub use roles::Role;
pub use user::{initials, CreateUserInput, NewUser, Profile, ProfileUpdate, UpdateProfileInput, UserWithProfile};
