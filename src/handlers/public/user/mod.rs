pub mod login;
pub mod refresh;
pub mod register;

pub use login::login_post;
pub use refresh::refresh_post;
pub use register::register_post;
