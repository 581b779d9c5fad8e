use itertools::Itertools;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::data::SubjectCode;
use crate::error::ScheduleError;
use crate::graph::ConflictGraph;

/// Colors handed out by the round-robin baseline before it wraps back to 1.
const ROUND_ROBIN_COLORS: u32 = 5;

/// The vertex coloring strategies the optimizer can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    DSatur,
    WelshPowell,
    Greedy,
    /// Round-robin baseline. Ignores adjacency, so neighbors may share a color.
    ActivitySelector,
}

impl Algorithm {
    /// All strategies, in the order the optimizer tries them.
    pub const ALL: [Algorithm; 4] = [
        Algorithm::DSatur,
        Algorithm::WelshPowell,
        Algorithm::Greedy,
        Algorithm::ActivitySelector,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::DSatur => "DSatur",
            Algorithm::WelshPowell => "WelshPowell",
            Algorithm::Greedy => "Greedy",
            Algorithm::ActivitySelector => "ActivitySelector",
        }
    }

    pub fn color(self, graph: &ConflictGraph) -> Coloring {
        let colors = match self {
            Algorithm::DSatur => dsatur(graph),
            Algorithm::WelshPowell => welsh_powell(graph),
            Algorithm::Greedy => greedy(graph),
            Algorithm::ActivitySelector => round_robin(graph),
        };
        Coloring::new(graph, colors)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Either one strategy or the best-of-all comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmMode {
    Single(Algorithm),
    AllOptimized,
}

impl AlgorithmMode {
    pub const ALL_OPTIMIZED_NAME: &'static str = "AllOptimized";

    pub fn algorithms(&self) -> &[Algorithm] {
        match self {
            AlgorithmMode::Single(algorithm) => std::slice::from_ref(algorithm),
            AlgorithmMode::AllOptimized => &Algorithm::ALL,
        }
    }

    /// Every accepted mode name.
    pub fn names() -> Vec<&'static str> {
        Algorithm::ALL
            .iter()
            .map(|a| a.name())
            .chain([Self::ALL_OPTIMIZED_NAME])
            .collect()
    }
}

impl FromStr for AlgorithmMode {
    type Err = ScheduleError;

    /// Names are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.eq_ignore_ascii_case(Self::ALL_OPTIMIZED_NAME) {
            return Ok(AlgorithmMode::AllOptimized);
        }
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(wanted))
            .map(AlgorithmMode::Single)
            .ok_or_else(|| ScheduleError::UnknownAlgorithm(s.to_string()))
    }
}

impl fmt::Display for AlgorithmMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmMode::Single(algorithm) => fmt::Display::fmt(algorithm, f),
            AlgorithmMode::AllOptimized => f.write_str(Self::ALL_OPTIMIZED_NAME),
        }
    }
}

/// A color (starting at 1) for every vertex of one conflict graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coloring {
    by_subject: BTreeMap<SubjectCode, u32>,
}

impl Coloring {
    // `colors` is indexed like `graph.vertices()`, so every vertex gets exactly one entry.
    fn new(graph: &ConflictGraph, colors: Vec<u32>) -> Self {
        debug_assert_eq!(graph.len(), colors.len());
        let by_subject = graph.vertices().iter().cloned().zip(colors).collect();
        Self { by_subject }
    }

    pub fn get(&self, code: &str) -> Option<u32> {
        self.by_subject.get(code).copied()
    }

    pub fn color_count(&self) -> usize {
        self.by_subject.values().unique().count()
    }

    /// True when no edge of `graph` joins two vertices of the same color.
    pub fn is_proper(&self, graph: &ConflictGraph) -> bool {
        graph.vertices().iter().all(|v| {
            graph
                .neighbors(v)
                .into_iter()
                .flatten()
                .all(|n| self.get(v) != self.get(n))
        })
    }

    pub fn as_map(&self) -> &BTreeMap<SubjectCode, u32> {
        &self.by_subject
    }
}

// Uncolored vertices hold 0 in the working vectors below.

fn smallest_free_color(graph: &ConflictGraph, colors: &[u32], v: usize) -> u32 {
    let used: HashSet<u32> = graph
        .neighbor_indices(v)
        .iter()
        .map(|&n| colors[n])
        .filter(|&c| c != 0)
        .collect();
    let mut color = 1;
    while used.contains(&color) {
        color += 1;
    }
    color
}

fn greedy(graph: &ConflictGraph) -> Vec<u32> {
    let mut colors = vec![0; graph.len()];
    for v in 0..graph.len() {
        colors[v] = smallest_free_color(graph, &colors, v);
    }
    colors
}

fn dsatur(graph: &ConflictGraph) -> Vec<u32> {
    let n = graph.len();
    let degree: Vec<usize> = (0..n).map(|v| graph.neighbor_indices(v).len()).collect();
    let mut colors = vec![0; n];
    let mut saturation = vec![0usize; n];

    for _ in 0..n {
        // highest saturation, then highest degree, then earliest vertex
        let mut pick: Option<usize> = None;
        for v in (0..n).filter(|&v| colors[v] == 0) {
            let better = match pick {
                None => true,
                Some(p) => (saturation[v], degree[v]) > (saturation[p], degree[p]),
            };
            if better {
                pick = Some(v);
            }
        }
        let Some(node) = pick else { break };

        colors[node] = smallest_free_color(graph, &colors, node);

        for &u in graph.neighbor_indices(node) {
            if colors[u] == 0 {
                saturation[u] = graph
                    .neighbor_indices(u)
                    .iter()
                    .map(|&w| colors[w])
                    .filter(|&c| c != 0)
                    .unique()
                    .count();
            }
        }
    }
    colors
}

fn welsh_powell(graph: &ConflictGraph) -> Vec<u32> {
    // stable, so equal degrees keep enumeration order
    let order: Vec<usize> = (0..graph.len())
        .sorted_by_key(|&v| Reverse(graph.neighbor_indices(v).len()))
        .collect();
    let mut colors = vec![0; graph.len()];
    let mut color = 1;

    for &node in &order {
        if colors[node] != 0 {
            continue;
        }
        colors[node] = color;
        for &other in &order {
            let joins_class = colors[other] == 0
                && !graph.adjacent(node, other)
                && graph
                    .neighbor_indices(other)
                    .iter()
                    .all(|&k| colors[k] != color);
            if joins_class {
                colors[other] = color;
            }
        }
        color += 1;
    }
    colors
}

fn round_robin(graph: &ConflictGraph) -> Vec<u32> {
    (0..graph.len())
        .map(|i| (i as u32 % ROUND_ROBIN_COLORS) + 1)
        .collect()
}
