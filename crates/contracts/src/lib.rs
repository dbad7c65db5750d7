//! Types and pure logic shared by the backend and any client of the
//! production tracker: aggregates, measurement formatting, member grouping
//! and the client-side state machines used by the station and upload screens.

pub mod dashboards;
pub mod domain;
pub mod shared;
pub mod usecases;
