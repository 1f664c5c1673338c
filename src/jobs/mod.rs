//! Background note resolution
//!
//! [`NoteResolver`] performs one sweep over unprocessed notes.
//! [`ResolutionJob`] runs sweeps on an interval, at most one at a time.

mod driver;
mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use driver::{group_by_book, NoteResolver, SweepReport};
pub use scheduler::{ResolutionJob, Schedule};
