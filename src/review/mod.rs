//! Review recording and review sessions built on the SM-2 scheduler.

pub mod service;
pub mod session;

pub use service::ReviewService;
pub use session::ReviewSession;
