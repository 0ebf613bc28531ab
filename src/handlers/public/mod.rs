// handlers/public/mod.rs - Public handlers (no authentication)
//
// Service info, health and token acquisition.

pub mod service;
pub mod user;
