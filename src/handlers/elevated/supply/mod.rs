pub mod clear_debt;

pub use clear_debt::clear_debt_post;
