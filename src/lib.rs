//! venue-pulse: display and sampling backend for the venue map.
//!
//! Reputation badges, "time ago" labels, popup view models and the random
//! variates used to generate synthetic crowd data.

pub mod config;
pub mod engine;
pub mod model;
pub mod popup;
pub mod reputation;
pub mod time_ago;
pub mod variate;
pub mod web;
