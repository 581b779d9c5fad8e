//! Conflict-aware weekly timetable generation.
//!
//! Subjects sharing a faculty member form a conflict graph that is colored by
//! one of several heuristics; a first-fit allocator then fills one grid per
//! section without double-booking a section or a faculty member.

pub mod allocator;
pub mod coloring;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod server;
pub mod solver;

pub use coloring::{Algorithm, AlgorithmMode, Coloring};
pub use data::{FacultyAssignment, SectionGrid, Slot, Subject, TimetableRequest, TimetableResponse};
pub use error::ScheduleError;
pub use graph::ConflictGraph;
pub use solver::{Timetable, generate, generate_with_assignment, solve};
