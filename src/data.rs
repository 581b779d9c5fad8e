use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ScheduleError;

// Type aliases for clarity
pub type SubjectCode = String;
pub type FacultyId = String;

pub const DAY_NAMES: [&str; 6] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];
pub const DAYS: usize = DAY_NAMES.len();
pub const PERIODS_PER_DAY: usize = 6;
pub const SLOTS_PER_WEEK: usize = DAYS * PERIODS_PER_DAY;

/// A subject together with the number of periods it needs every week.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Subject {
    pub code: SubjectCode,
    #[serde(rename = "hours", alias = "weeklyHours")]
    pub weekly_hours: u32,
}

impl Subject {
    pub fn new(code: impl Into<SubjectCode>, weekly_hours: u32) -> Self {
        Self {
            code: code.into(),
            weekly_hours,
        }
    }
}

/// One (day, period) position in the weekly grid.
///
/// The derived ordering is lexicographic on (day, period), which is also the
/// order in which slots are offered to the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Slot {
    pub day: usize,
    pub period: usize,
}

impl Slot {
    pub fn new(day: usize, period: usize) -> Self {
        Self { day, period }
    }

    /// Every slot of the week in placement order.
    pub fn all() -> impl Iterator<Item = Slot> {
        (0..DAYS).flat_map(|day| (0..PERIODS_PER_DAY).map(move |period| Slot { day, period }))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} P{}", DAY_NAMES[self.day], self.period + 1)
    }
}

/// A filled grid position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub subject_code: SubjectCode,
    pub faculty_id: FacultyId,
}

/// The weekly day x period grid of one section. `None` marks a free period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SectionGrid {
    cells: Vec<Vec<Option<Cell>>>,
}

impl Default for SectionGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionGrid {
    pub fn new() -> Self {
        Self {
            cells: vec![vec![None; PERIODS_PER_DAY]; DAYS],
        }
    }

    pub fn get(&self, slot: Slot) -> Option<&Cell> {
        self.cells[slot.day][slot.period].as_ref()
    }

    pub fn is_free(&self, slot: Slot) -> bool {
        self.get(slot).is_none()
    }

    pub(crate) fn place(&mut self, slot: Slot, cell: Cell) {
        self.cells[slot.day][slot.period] = Some(cell);
    }

    /// Filled cells in slot order.
    pub fn filled(&self) -> impl Iterator<Item = (Slot, &Cell)> {
        Slot::all().filter_map(move |slot| self.get(slot).map(|cell| (slot, cell)))
    }

    pub fn empty_cells(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| cell.is_none()).count()
    }
}

impl fmt::Display for SectionGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<12}", "Day / Period")?;
        for period in 0..PERIODS_PER_DAY {
            write!(f, " | {:<20}", format!("P{}", period + 1))?;
        }
        writeln!(f)?;
        for (day, row) in self.cells.iter().enumerate() {
            write!(f, "{:<12}", DAY_NAMES[day])?;
            for cell in row {
                let text = match cell {
                    Some(cell) => format!("{} ({})", cell.subject_code, cell.faculty_id),
                    None => "-".to_string(),
                };
                write!(f, " | {:<20}", text)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub fn faculty_label(k: u32) -> FacultyId {
    format!("Faculty-{}", k)
}

/// Which faculty member teaches each subject during one scheduling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FacultyAssignment {
    by_subject: BTreeMap<SubjectCode, FacultyId>,
}

impl FacultyAssignment {
    /// Draws a faculty uniformly from `Faculty-1..=Faculty-<faculty_count>` for every
    /// subject, in subject order.
    pub fn draw<R: Rng>(
        subjects: &[Subject],
        faculty_count: u32,
        rng: &mut R,
    ) -> Result<Self, ScheduleError> {
        if faculty_count == 0 {
            return Err(ScheduleError::InvalidFacultyCount);
        }
        let by_subject = subjects
            .iter()
            .map(|s| (s.code.clone(), faculty_label(rng.gen_range(1..=faculty_count))))
            .collect();
        Ok(Self { by_subject })
    }

    /// Builds a fixed assignment. Every subject must be covered.
    pub fn from_pairs<I, S, F>(subjects: &[Subject], pairs: I) -> Result<Self, ScheduleError>
    where
        I: IntoIterator<Item = (S, F)>,
        S: Into<SubjectCode>,
        F: Into<FacultyId>,
    {
        let by_subject: BTreeMap<SubjectCode, FacultyId> = pairs
            .into_iter()
            .map(|(s, f)| (s.into(), f.into()))
            .collect();
        if let Some(missing) = subjects.iter().find(|s| !by_subject.contains_key(&s.code)) {
            return Err(ScheduleError::MissingFaculty(missing.code.clone()));
        }
        Ok(Self { by_subject })
    }

    pub fn faculty_of(&self, code: &str) -> Option<&FacultyId> {
        self.by_subject.get(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SubjectCode, &FacultyId)> {
        self.by_subject.iter()
    }

}

fn default_algorithm() -> String {
    "AllOptimized".to_string()
}

/// The complete input for one timetable generation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableRequest {
    pub subjects: Vec<Subject>,
    pub faculty_count: u32,
    pub section_count: usize,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Fixes the faculty draw so the run can be reproduced.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// The generated grid of one section, numbered from 1.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionTimetable {
    pub section: usize,
    pub grid: SectionGrid,
}

/// The final output of the generator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableResponse {
    pub sections: Vec<SectionTimetable>,
    pub chosen_algorithm: String,
    pub empty_cells: usize,
    pub colors: BTreeMap<SubjectCode, u32>,
    pub faculty_assignment: FacultyAssignment,
}
