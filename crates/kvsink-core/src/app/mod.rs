//! Application layer: the event bus, dispatch, handlers, and the two
//! reactors (retry saga, cache purge).

pub mod bus;
pub mod dispatch;
pub mod handlers;
pub mod inbound;
pub mod purge;
pub mod saga;

pub use bus::EventBus;
pub use dispatch::{CommandDispatcher, Dispatch};
pub use handlers::{CreateTaskHandler, DeleteTaskHandler, UpdateTaskHandler};
pub use purge::PurgeReactor;
pub use saga::{MAX_RETRIES, RETRY_DELAYS, RetrySaga};
