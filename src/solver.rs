use crate::allocator::{allocate, count_empty_cells};
use crate::coloring::{Algorithm, AlgorithmMode, Coloring};
use crate::data::{
    FacultyAssignment, SectionGrid, SectionTimetable, Subject, TimetableRequest, TimetableResponse,
};
use crate::error::ScheduleError;
use crate::graph::ConflictGraph;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::time::Instant;

/// Upper bound on subjects per run; the conflict graph is quadratic in this.
pub const MAX_SUBJECTS: usize = 512;
/// Upper bound on sections per run; one grid is allocated per section.
pub const MAX_SECTIONS: usize = 64;

/// The outcome of one generation run.
#[derive(Debug, Clone)]
pub struct Timetable {
    pub grids: Vec<SectionGrid>,
    pub chosen_algorithm: Algorithm,
    pub coloring: Coloring,
    pub faculty_assignment: FacultyAssignment,
    pub empty_cells: usize,
}

/// Parses the request, draws faculty and generates the timetable.
pub fn solve(input: &TimetableRequest) -> Result<TimetableResponse, ScheduleError> {
    let start_time = Instant::now();
    let mode: AlgorithmMode = input.algorithm.parse()?;
    let mut rng = match input.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let timetable = generate(
        &input.subjects,
        input.faculty_count,
        input.section_count,
        mode,
        &mut rng,
    )?;
    info!(
        "Timetable generated in {:.2?} using {} ({} empty cells).",
        start_time.elapsed(),
        timetable.chosen_algorithm,
        timetable.empty_cells
    );

    Ok(TimetableResponse {
        sections: timetable
            .grids
            .into_iter()
            .enumerate()
            .map(|(i, grid)| SectionTimetable {
                section: i + 1,
                grid,
            })
            .collect(),
        chosen_algorithm: timetable.chosen_algorithm.name().to_string(),
        empty_cells: timetable.empty_cells,
        colors: timetable.coloring.as_map().clone(),
        faculty_assignment: timetable.faculty_assignment,
    })
}

/// Draws a fresh faculty assignment from `rng`, then generates.
pub fn generate<R: Rng>(
    subjects: &[Subject],
    faculty_count: u32,
    section_count: usize,
    mode: AlgorithmMode,
    rng: &mut R,
) -> Result<Timetable, ScheduleError> {
    check_limits(subjects, section_count)?;
    let assignment = FacultyAssignment::draw(subjects, faculty_count, rng)?;
    generate_with_assignment(subjects, assignment, section_count, mode)
}

/// Generates against a fixed faculty assignment. Deterministic.
///
/// In `AllOptimized` mode every strategy is run and the run with the fewest
/// empty cells wins, the earliest strategy winning ties. Placement does not
/// read the coloring, so all runs currently produce the same grids.
pub fn generate_with_assignment(
    subjects: &[Subject],
    assignment: FacultyAssignment,
    section_count: usize,
    mode: AlgorithmMode,
) -> Result<Timetable, ScheduleError> {
    check_limits(subjects, section_count)?;
    validate_subjects(subjects)?;
    info!(
        "Generating timetable for {} subjects, {} sections with {}.",
        subjects.len(),
        section_count,
        mode
    );
    let graph = ConflictGraph::build(subjects, &assignment)?;

    let mut best: Option<(Algorithm, Coloring, Vec<SectionGrid>, usize)> = None;
    for &algorithm in mode.algorithms() {
        let coloring = algorithm.color(&graph);
        let grids = allocate(subjects, &assignment, section_count)?;
        let empty_cells = count_empty_cells(&grids);
        debug!(
            "{} used {} colors, leaving {} empty cells.",
            algorithm,
            coloring.color_count(),
            empty_cells
        );
        if best.as_ref().is_none_or(|(.., min)| empty_cells < *min) {
            best = Some((algorithm, coloring, grids, empty_cells));
        }
    }

    let Some((chosen_algorithm, coloring, grids, empty_cells)) = best else {
        unreachable!("every mode runs at least one algorithm");
    };
    Ok(Timetable {
        grids,
        chosen_algorithm,
        coloring,
        faculty_assignment: assignment,
        empty_cells,
    })
}

fn check_limits(subjects: &[Subject], section_count: usize) -> Result<(), ScheduleError> {
    if subjects.len() > MAX_SUBJECTS {
        return Err(ScheduleError::TooManySubjects { max: MAX_SUBJECTS });
    }
    if section_count > MAX_SECTIONS {
        return Err(ScheduleError::TooManySections { max: MAX_SECTIONS });
    }
    Ok(())
}

// subject codes must be non-empty and unique
fn validate_subjects(subjects: &[Subject]) -> Result<(), ScheduleError> {
    let mut seen = HashSet::with_capacity(subjects.len());
    for (index, subject) in subjects.iter().enumerate() {
        if subject.code.trim().is_empty() {
            return Err(ScheduleError::EmptySubjectCode { index });
        }
        if !seen.insert(subject.code.as_str()) {
            return Err(ScheduleError::DuplicateSubject(subject.code.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SLOTS_PER_WEEK, Slot};

    fn cs_subjects() -> Vec<Subject> {
        vec![Subject::new("CS101", 3), Subject::new("CS102", 2)]
    }

    fn mixed_subjects() -> Vec<Subject> {
        vec![
            Subject::new("CS101", 4),
            Subject::new("CS102", 3),
            Subject::new("MA201", 5),
            Subject::new("PH101", 2),
            Subject::new("EE150", 6),
        ]
    }

    #[test]
    fn single_faculty_greedy_scenario() {
        let subjects = cs_subjects();
        let mut rng = StdRng::seed_from_u64(3);
        let timetable = generate(
            &subjects,
            1,
            1,
            AlgorithmMode::Single(Algorithm::Greedy),
            &mut rng,
        )
        .unwrap();

        assert_eq!(timetable.chosen_algorithm, Algorithm::Greedy);
        assert_eq!(timetable.coloring.get("CS101"), Some(1));
        assert_eq!(timetable.coloring.get("CS102"), Some(2));
        assert_eq!(timetable.empty_cells, SLOTS_PER_WEEK - 5);

        let grid = &timetable.grids[0];
        let expected = [
            (Slot::new(0, 0), "CS101"),
            (Slot::new(0, 1), "CS101"),
            (Slot::new(0, 2), "CS101"),
            (Slot::new(0, 3), "CS102"),
            (Slot::new(0, 4), "CS102"),
        ];
        let filled: Vec<(Slot, &str)> = grid
            .filled()
            .map(|(slot, cell)| (slot, cell.subject_code.as_str()))
            .collect();
        assert_eq!(filled, expected);
        assert!(grid.filled().all(|(_, cell)| cell.faculty_id == "Faculty-1"));
    }

    #[test]
    fn all_optimized_is_no_worse_than_any_single_strategy() {
        let subjects = mixed_subjects();
        let assignment = FacultyAssignment::draw(&subjects, 2, &mut StdRng::seed_from_u64(99)).unwrap();

        let best = generate_with_assignment(&subjects, assignment.clone(), 3, AlgorithmMode::AllOptimized)
            .unwrap();
        for algorithm in Algorithm::ALL {
            let single = generate_with_assignment(
                &subjects,
                assignment.clone(),
                3,
                AlgorithmMode::Single(algorithm),
            )
            .unwrap();
            assert!(best.empty_cells <= single.empty_cells);
        }
    }

    #[test]
    fn all_optimized_ties_go_to_the_first_strategy() {
        let subjects = mixed_subjects();
        let assignment = FacultyAssignment::draw(&subjects, 3, &mut StdRng::seed_from_u64(5)).unwrap();
        let best =
            generate_with_assignment(&subjects, assignment, 2, AlgorithmMode::AllOptimized).unwrap();
        assert_eq!(best.chosen_algorithm, Algorithm::DSatur);
    }

    #[test]
    fn fixed_assignment_is_idempotent() {
        let subjects = mixed_subjects();
        let assignment = FacultyAssignment::draw(&subjects, 2, &mut StdRng::seed_from_u64(21)).unwrap();
        for mode in ["DSatur", "WelshPowell", "Greedy", "ActivitySelector", "AllOptimized"] {
            let mode: AlgorithmMode = mode.parse().unwrap();
            let first = generate_with_assignment(&subjects, assignment.clone(), 2, mode).unwrap();
            let second = generate_with_assignment(&subjects, assignment.clone(), 2, mode).unwrap();
            assert_eq!(first.grids, second.grids);
            assert_eq!(first.coloring, second.coloring);
            assert_eq!(first.chosen_algorithm, second.chosen_algorithm);
        }
    }

    #[test]
    fn plenty_of_faculty_means_one_color() {
        let subjects = mixed_subjects();
        let assignment = FacultyAssignment::from_pairs(
            &subjects,
            subjects
                .iter()
                .enumerate()
                .map(|(i, s)| (s.code.clone(), format!("Faculty-{}", i + 1))),
        )
        .unwrap();
        for algorithm in [Algorithm::DSatur, Algorithm::WelshPowell, Algorithm::Greedy] {
            let timetable =
                generate_with_assignment(&subjects, assignment.clone(), 1, AlgorithmMode::Single(algorithm))
                    .unwrap();
            assert!(timetable.coloring.as_map().values().all(|&c| c == 1));
        }
    }

    #[test]
    fn empty_inputs_give_empty_results() {
        let mut rng = StdRng::seed_from_u64(1);
        let none = generate(&[], 4, 2, AlgorithmMode::AllOptimized, &mut rng).unwrap();
        assert_eq!(none.grids.len(), 2);
        assert_eq!(none.empty_cells, 2 * SLOTS_PER_WEEK);
        assert!(none.coloring.as_map().is_empty());

        let no_sections =
            generate(&cs_subjects(), 4, 0, AlgorithmMode::AllOptimized, &mut rng).unwrap();
        assert!(no_sections.grids.is_empty());
        assert_eq!(no_sections.empty_cells, 0);
    }

    #[test]
    fn invalid_subjects_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let mode = AlgorithmMode::Single(Algorithm::Greedy);

        let blank = vec![Subject::new("CS101", 1), Subject::new("  ", 1)];
        assert_eq!(
            generate(&blank, 2, 1, mode, &mut rng).unwrap_err(),
            ScheduleError::EmptySubjectCode { index: 1 }
        );

        let twice = vec![Subject::new("CS101", 1), Subject::new("CS101", 2)];
        assert_eq!(
            generate(&twice, 2, 1, mode, &mut rng).unwrap_err(),
            ScheduleError::DuplicateSubject("CS101".to_string())
        );

        assert_eq!(
            generate(&cs_subjects(), 0, 1, mode, &mut rng).unwrap_err(),
            ScheduleError::InvalidFacultyCount
        );
    }

    #[test]
    fn oversized_runs_are_rejected_before_allocation() {
        let mut rng = StdRng::seed_from_u64(1);
        let mode = AlgorithmMode::AllOptimized;

        for sections in [MAX_SECTIONS + 1, 1 << 42, usize::MAX / 8] {
            assert_eq!(
                generate(&cs_subjects(), 2, sections, mode, &mut rng).unwrap_err(),
                ScheduleError::TooManySections { max: MAX_SECTIONS }
            );
        }

        let many: Vec<Subject> = (0..=MAX_SUBJECTS).map(|i| Subject::new(format!("S{}", i), 1)).collect();
        assert_eq!(
            generate(&many, 2, 1, mode, &mut rng).unwrap_err(),
            ScheduleError::TooManySubjects { max: MAX_SUBJECTS }
        );

        let assignment = FacultyAssignment::draw(&cs_subjects(), 1, &mut rng).unwrap();
        assert_eq!(
            generate_with_assignment(&cs_subjects(), assignment, MAX_SECTIONS + 1, mode).unwrap_err(),
            ScheduleError::TooManySections { max: MAX_SECTIONS }
        );
    }

    #[test]
    fn limits_themselves_are_accepted() {
        let mut rng = StdRng::seed_from_u64(8);
        let timetable =
            generate(&cs_subjects(), 2, MAX_SECTIONS, AlgorithmMode::Single(Algorithm::Greedy), &mut rng)
                .unwrap();
        assert_eq!(timetable.grids.len(), MAX_SECTIONS);
    }

    #[test]
    fn solve_rejects_huge_section_count() {
        let input = TimetableRequest {
            subjects: cs_subjects(),
            faculty_count: 2,
            section_count: usize::MAX / 8,
            algorithm: "AllOptimized".to_string(),
            seed: Some(1),
        };
        assert_eq!(
            solve(&input).unwrap_err(),
            ScheduleError::TooManySections { max: MAX_SECTIONS }
        );
    }

    #[test]
    fn solve_rejects_unknown_algorithm() {
        let input = TimetableRequest {
            subjects: cs_subjects(),
            faculty_count: 2,
            section_count: 1,
            algorithm: "Simplex".to_string(),
            seed: None,
        };
        assert_eq!(
            solve(&input).unwrap_err(),
            ScheduleError::UnknownAlgorithm("Simplex".to_string())
        );
    }

    #[test]
    fn solve_is_reproducible_with_a_seed() {
        let input = TimetableRequest {
            subjects: mixed_subjects(),
            faculty_count: 3,
            section_count: 2,
            algorithm: "alloptimized".to_string(),
            seed: Some(2024),
        };
        let first = solve(&input).unwrap();
        let second = solve(&input).unwrap();

        assert_eq!(first.faculty_assignment, second.faculty_assignment);
        assert_eq!(first.colors, second.colors);
        assert_eq!(first.sections.len(), 2);
        assert_eq!(first.sections[0].section, 1);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }
}
