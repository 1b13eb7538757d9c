//! Domain model.

mod asset;
mod user;

pub use asset::*;
pub use user::*;
