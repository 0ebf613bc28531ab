pub mod fixture;
pub mod migrate;
pub mod nodes;
pub mod users;
