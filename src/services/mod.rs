pub mod batch;

pub use batch::{import, remove_students, BatchError, Roster};
