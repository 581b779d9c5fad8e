use std::fmt;

/// Reasons a timetable request is rejected before any placement happens.
///
/// Unplaced hours are not an error: they stay visible as empty cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    UnknownAlgorithm(String),
    EmptySubjectCode { index: usize },
    DuplicateSubject(String),
    UnknownSubject(String),
    MissingFaculty(String),
    InvalidFacultyCount,
    TooManySubjects { max: usize },
    TooManySections { max: usize },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::UnknownAlgorithm(name) => write!(
                f,
                "Unknown algorithm '{}'. Expected one of DSatur, WelshPowell, Greedy, ActivitySelector, AllOptimized.",
                name
            ),
            ScheduleError::EmptySubjectCode { index } => {
                write!(f, "Subject #{} has an empty code.", index + 1)
            }
            ScheduleError::DuplicateSubject(code) => {
                write!(f, "Subject code '{}' appears more than once.", code)
            }
            ScheduleError::UnknownSubject(code) => {
                write!(f, "Subject '{}' is not a vertex of the conflict graph.", code)
            }
            ScheduleError::MissingFaculty(code) => {
                write!(f, "Subject '{}' has no faculty assigned.", code)
            }
            ScheduleError::InvalidFacultyCount => {
                write!(f, "Faculty count must be at least 1.")
            }
            ScheduleError::TooManySubjects { max } => {
                write!(f, "At most {} subjects can be scheduled in one run.", max)
            }
            ScheduleError::TooManySections { max } => {
                write!(f, "At most {} sections can be scheduled in one run.", max)
            }
        }
    }
}

impl std::error::Error for ScheduleError {}
