//! Data Transfer Objects (DTOs).

mod upload_dto;
mod user_dto;

pub use upload_dto::*;
pub use user_dto::*;
