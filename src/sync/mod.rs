pub mod synchronizer;

pub use synchronizer::{RebindReport, SchemaSynchronizer, clone_with_schema, rebind_in_place};
