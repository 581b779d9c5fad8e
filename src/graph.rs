use itertools::Itertools;
use log::debug;
use std::collections::{HashMap, HashSet};

use crate::data::{FacultyAssignment, FacultyId, Subject, SubjectCode};
use crate::error::ScheduleError;

/// Undirected conflict graph over subjects.
///
/// Vertices keep the subject enumeration order and every neighbor list is
/// sorted by that order, so strategies that scan "in order" are reproducible.
/// Edges are stored on both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictGraph {
    vertices: Vec<SubjectCode>,
    index: HashMap<SubjectCode, usize>,
    adjacency: Vec<Vec<usize>>,
}

impl ConflictGraph {
    /// Connects every pair of distinct subjects taught by the same faculty.
    pub fn build(
        subjects: &[Subject],
        assignment: &FacultyAssignment,
    ) -> Result<Self, ScheduleError> {
        let faculty: Vec<&FacultyId> = subjects
            .iter()
            .map(|s| {
                assignment
                    .faculty_of(&s.code)
                    .ok_or_else(|| ScheduleError::MissingFaculty(s.code.clone()))
            })
            .collect::<Result<_, _>>()?;

        let by_faculty: HashMap<&FacultyId, Vec<usize>> = faculty
            .iter()
            .enumerate()
            .map(|(i, f)| (*f, i))
            .into_group_map();

        let adjacency = faculty
            .iter()
            .enumerate()
            .map(|(i, f)| {
                by_faculty[f]
                    .iter()
                    .copied()
                    .filter(|&j| j != i)
                    .collect()
            })
            .collect();

        let graph = Self::with_adjacency(subjects.iter().map(|s| s.code.clone()), adjacency)?;
        debug!(
            "Built conflict graph with {} subjects and {} edges across {} faculty.",
            graph.len(),
            graph.edge_count(),
            by_faculty.len()
        );
        Ok(graph)
    }

    /// Builds a graph from explicit edges. Self loops and repeated edges are ignored.
    pub fn from_edges<V, E, A, B>(vertices: V, edges: E) -> Result<Self, ScheduleError>
    where
        V: IntoIterator,
        V::Item: Into<SubjectCode>,
        E: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut graph = Self::with_adjacency(vertices.into_iter().map(Into::into), Vec::new())?;
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        for (a, b) in edges {
            let a = graph.vertex_index(a.as_ref())?;
            let b = graph.vertex_index(b.as_ref())?;
            if a == b || !seen.insert((a.min(b), a.max(b))) {
                continue;
            }
            graph.adjacency[a].push(b);
            graph.adjacency[b].push(a);
        }
        for neighbors in &mut graph.adjacency {
            neighbors.sort_unstable();
        }
        Ok(graph)
    }

    fn with_adjacency(
        vertices: impl Iterator<Item = SubjectCode>,
        mut adjacency: Vec<Vec<usize>>,
    ) -> Result<Self, ScheduleError> {
        let vertices: Vec<SubjectCode> = vertices.collect();
        let mut index = HashMap::with_capacity(vertices.len());
        for (i, code) in vertices.iter().enumerate() {
            if index.insert(code.clone(), i).is_some() {
                return Err(ScheduleError::DuplicateSubject(code.clone()));
            }
        }
        adjacency.resize(vertices.len(), Vec::new());
        Ok(Self {
            vertices,
            index,
            adjacency,
        })
    }

    fn vertex_index(&self, code: &str) -> Result<usize, ScheduleError> {
        self.index
            .get(code)
            .copied()
            .ok_or_else(|| ScheduleError::UnknownSubject(code.to_string()))
    }

    pub(crate) fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Subject codes in enumeration order.
    pub fn vertices(&self) -> &[SubjectCode] {
        &self.vertices
    }

    pub fn neighbors(&self, code: &str) -> Option<impl Iterator<Item = &str>> {
        let i = *self.index.get(code)?;
        Some(self.adjacency[i].iter().map(|&j| self.vertices[j].as_str()))
    }

    pub fn degree(&self, code: &str) -> Option<usize> {
        self.index.get(code).map(|&i| self.adjacency[i].len())
    }

    pub fn are_adjacent(&self, a: &str, b: &str) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&a), Some(&b)) => self.adjacent(a, b),
            _ => false,
        }
    }

    pub(crate) fn neighbor_indices(&self, v: usize) -> &[usize] {
        &self.adjacency[v]
    }

    pub(crate) fn adjacent(&self, a: usize, b: usize) -> bool {
        self.adjacency[a].binary_search(&b).is_ok()
    }
}
