//! Engine — time, motion and scheduling.
//!
//! Everything here is a pure function of document data and a time in
//! milliseconds. The engine never deals with terminals, files or ids it did
//! not derive itself.

pub mod clock;
pub mod frame;
pub mod math;
pub mod motion;
pub mod scheduler;
