//! Remote contest directory
//!
//! Fetches the Codeforces contest list and picks the next contest that has
//! not started yet.

pub mod codeforces;
pub mod contest;

pub use codeforces::{CodeforcesClient, ContestDirectory};
pub use contest::{select_next_upcoming, Contest, ContestPhase};
