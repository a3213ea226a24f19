//! Backend server for the OpenPoll election system.
//!
//! Elections are time-bounded: candidates may register and accounts may vote
//! only while the election window is open, and every account gets exactly one
//! vote per election.

#[macro_use]
extern crate log;
#[macro_use]
extern crate rocket;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

/// Construct the rocket instance, with all fairings and routes attached.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(logging::LoggerFairing)
        .attach(config::ConfigFairing)
        .attach(config::DatabaseFairing)
}
