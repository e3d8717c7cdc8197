pub mod activity;
pub mod employee;
mod macros;
pub mod notification;
pub mod statistics;
pub mod vacation;

// Re-export all models for easy importing
pub use activity::*;
pub use employee::*;
pub use notification::*;
pub use statistics::*;
pub use vacation::*;
