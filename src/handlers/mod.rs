pub mod health;
pub mod shared;
pub mod vacations;

pub use shared::ApiResponse;
