//! BroResolve: a campus issue tracker.
//!
//! Students submit free-text issues which are triaged by a keyword
//! classifier into a category and priority, then tracked through a
//! four-stage resolution pipeline (committed, reviewing, patching,
//! resolved). Students see and upvote their own tickets; admins see
//! everything, move tickets between stages, and manage accounts.
//!
//! The crate is both a library and a CLI binary, with an optional HTTP
//! endpoint (`broresolve serve`) exposing the admin-promotion function.

pub mod admin;
pub mod classify;
pub mod commands;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod policy;
pub mod server;
pub mod storage;
