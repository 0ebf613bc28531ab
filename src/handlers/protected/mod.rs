// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here runs behind `jwt_auth_middleware`, which puts an
// `AuthUser` into the request extensions.

pub mod me;
pub mod supply;
