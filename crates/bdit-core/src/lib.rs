//! Core of the BDCat cross-platform integration checks: a fixed-schedule
//! retry policy and the small HTTP clients it wraps.

pub mod config;
pub mod logging;

pub mod broker;
pub mod http;
pub mod release;
pub mod retry;
pub mod testmode;
pub mod workflow;
