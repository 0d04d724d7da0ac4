pub mod controller;
pub mod error;
pub mod read;
pub mod report;
pub mod schedule;

pub use controller::{PollController, PollState};
pub use error::PollError;
pub use read::{read_fn, FnRead, PollRead};
pub use report::{PollCycle, ReadFailure, ReadOutcome, ReadSlot, RoundReport, RoundSink};
pub use tokio_util::sync::CancellationToken;
