//! wrapi - client library for the WRM cloud simulation API
//!
//! The WRM API runs EPA SWMM and EPANET models remotely. This crate packages
//! model inputs for upload, submits simulations, polls status and logs, and
//! retrieves result artifacts. All simulation work happens server-side.

pub mod client;
pub mod config;
pub mod models;
