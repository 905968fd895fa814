//! Shared types for the quadview server and viewer session.
//!
//! `roster` turns successive status snapshots into change events and `split`
//! decides which channel occupies which viewport slot.  Both are synchronous
//! and own their state exclusively; callers serialize access.

pub mod config;
pub mod error;
pub mod platform;
pub mod protocol;
pub mod roster;
pub mod split;
