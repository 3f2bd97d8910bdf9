mod row;
pub mod store;

pub use store::{LoadError, LoadStatus, PersonId, SaveError, Store};
