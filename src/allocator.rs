use log::trace;
use std::collections::{HashMap, HashSet};

use crate::data::{Cell, FacultyAssignment, SectionGrid, Slot, Subject};
use crate::error::ScheduleError;

/// Faculty already teaching somewhere in each slot, across all sections of one run.
type GlobalSlotOccupancy<'a> = HashMap<Slot, HashSet<&'a str>>;

/// Fills one weekly grid per section, first-fit in slot order.
///
/// Subjects are taken in input order and, for each subject, sections in index
/// order. A slot is used when it is free in that section and the subject's
/// faculty is not already teaching another class in it. Hours that do not fit
/// are left unplaced.
pub fn allocate(
    subjects: &[Subject],
    assignment: &FacultyAssignment,
    section_count: usize,
) -> Result<Vec<SectionGrid>, ScheduleError> {
    let slots: Vec<Slot> = Slot::all().collect();
    let mut grids = vec![SectionGrid::new(); section_count];
    let mut occupancy = GlobalSlotOccupancy::new();

    for subject in subjects {
        let faculty = assignment
            .faculty_of(&subject.code)
            .ok_or_else(|| ScheduleError::MissingFaculty(subject.code.clone()))?;

        for (section, grid) in grids.iter_mut().enumerate() {
            let mut placed = 0;
            for &slot in &slots {
                if placed == subject.weekly_hours {
                    break;
                }
                if !grid.is_free(slot)
                    || occupancy
                        .get(&slot)
                        .is_some_and(|busy| busy.contains(faculty.as_str()))
                {
                    continue;
                }
                grid.place(
                    slot,
                    Cell {
                        subject_code: subject.code.clone(),
                        faculty_id: faculty.clone(),
                    },
                );
                occupancy.entry(slot).or_default().insert(faculty.as_str());
                placed += 1;
            }
            if placed < subject.weekly_hours {
                trace!(
                    "Section {}: placed {} of {} hours for {} ({}).",
                    section + 1,
                    placed,
                    subject.weekly_hours,
                    subject.code,
                    faculty
                );
            }
        }
    }

    Ok(grids)
}

/// Total free cells over every section grid.
pub fn count_empty_cells(grids: &[SectionGrid]) -> usize {
    grids.iter().map(SectionGrid::empty_cells).sum()
}
