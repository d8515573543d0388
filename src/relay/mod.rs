// Public API - what other modules can use
pub use broadcast::{FanoutReport, MessageBroadcaster};
pub use channels::RoomChannels;
pub use enrollments::Enrollments;
pub use router::EventRouter;

// Internal modules
mod broadcast;
mod channels;
mod enrollments;
mod handlers;
mod router;
