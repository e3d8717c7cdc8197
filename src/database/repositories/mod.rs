pub mod activity;
pub mod employee;
pub mod notification;
pub mod vacation;

pub use activity::PgActivityTrail;
pub use employee::PgOwnershipResolver;
pub use notification::PgNotificationStore;
pub use vacation::PgVacationRepository;
