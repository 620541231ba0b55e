//! Request and response bodies

pub mod trips;
