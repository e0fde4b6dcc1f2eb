//! Library and practice: reading, publishing and deleting generated decks and
//! notes, plus per-card review scoring.
//!
//! Reads are allowed to the owner or, once published, to any signed-in user.
//! Writes are owner-only. Anything the caller may not see is reported as 404.

pub mod handlers;
pub mod library;
pub mod practice;
