//! External collaborators: schedule provider, market provider, record store.

pub mod gamma;
pub mod schedule_api;
pub mod store;

pub use gamma::GammaClient;
pub use schedule_api::ScheduleClient;
pub use store::{MemoryStore, PostgresStore, RecordStore};
