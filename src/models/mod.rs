pub mod chat;
pub mod enums;
pub mod user;

pub use chat::*;
pub use user::*;
