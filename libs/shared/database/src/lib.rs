pub mod store;

pub use store::{ScheduleStore, StoreError, StoreTx};
