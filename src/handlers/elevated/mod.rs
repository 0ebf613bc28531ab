// handlers/elevated/mod.rs - Admin handlers (JWT + admin role)
//
// Routes here run behind both `jwt_auth_middleware` and
// `require_admin_middleware`.

pub mod supply;
