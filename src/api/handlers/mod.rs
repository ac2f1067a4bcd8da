pub mod auth;
pub use self::auth::SessionCookies;

pub mod health;
pub use self::health::health;

pub mod hello;
pub mod pages;
