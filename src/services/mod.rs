pub mod activity_logger;
pub mod authorization;
pub mod duration;
pub mod entitlements;
pub mod lifecycle;
pub mod ports;
pub mod vacation;

pub use activity_logger::ActivityLogger;
pub use authorization::{Action, AuthorizationGuard, Scope, Subject};
pub use duration::working_days;
pub use entitlements::StaticEntitlements;
pub use lifecycle::{LifecycleManager, StatusCommand, Transition};
pub use ports::{
    AuditTrail, EntitlementSource, NotificationDispatcher, OwnershipResolver, VacationRepository,
};
pub use vacation::VacationService;
