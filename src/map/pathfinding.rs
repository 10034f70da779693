//! Grid A* over a [`CollisionField`].
//!
//! The field is sampled on a coarse grid; a cell is walkable when a guard-sized body centered
//! in it clears every wall. Paths are returned as world-space cell centers.

use std::cell::Cell;

use glam::{IVec2, Vec2};
use pathfinding::prelude::astar;
use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::map::CollisionField;

/// Moves from a cell to its eight neighbors, clockwise from up.
const NEIGHBORS: [IVec2; 8] = [
    IVec2::new(0, -1),
    IVec2::new(1, -1),
    IVec2::new(1, 0),
    IVec2::new(1, 1),
    IVec2::new(0, 1),
    IVec2::new(-1, 1),
    IVec2::new(-1, 0),
    IVec2::new(-1, -1),
];

/// Grid parameters for a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    /// Side length of a grid cell, in pixels.
    pub cell_size: f32,
    /// Radius of the body that must fit in a walkable cell.
    pub clearance: f32,
    /// Node expansions allowed before giving up.
    pub max_iterations: usize,
}

impl GridSpec {
    pub fn cell_of(&self, point: Vec2) -> IVec2 {
        (point / self.cell_size).floor().as_ivec2()
    }

    pub fn center_of(&self, cell: IVec2) -> Vec2 {
        cell.as_vec2() * self.cell_size + Vec2::splat(self.cell_size / 2.0)
    }

    fn walkable(&self, field: &CollisionField, cell: IVec2) -> bool {
        let center = self.center_of(cell);
        !field.is_wall_at(center) && field.is_valid_position(center.x, center.y, self.clearance)
    }
}

/// Result of a path search.
#[derive(Debug, Clone, PartialEq)]
pub enum PathResult {
    /// Cell centers from the start cell to the goal cell, inclusive.
    Found(Vec<Vec2>),
    /// No path within the iteration budget; the two raw endpoints.
    Fallback([Vec2; 2]),
}

impl PathResult {
    pub fn is_fallback(&self) -> bool {
        matches!(self, PathResult::Fallback(_))
    }

    pub fn into_waypoints(self) -> Vec<Vec2> {
        match self {
            PathResult::Found(path) => path,
            PathResult::Fallback(line) => line.to_vec(),
        }
    }
}

/// Finds a path from `start` to `goal` using 8-neighbor A* with a Manhattan heuristic and a
/// uniform step cost of one.
///
/// Falls back to the straight line `[start, goal]` if the goal cell cannot be reached within
/// `spec.max_iterations` expansions.
pub fn find_path(field: &CollisionField, start: Vec2, goal: Vec2, spec: &GridSpec) -> PathResult {
    let start_cell = spec.cell_of(start);
    let goal_cell = spec.cell_of(goal);
    let expansions = Cell::new(0usize);

    let result = astar(
        &start_cell,
        |&cell| {
            let expanded = expansions.get() + 1;
            expansions.set(expanded);
            if expanded > spec.max_iterations {
                return SmallVec::<[(IVec2, u32); 8]>::new();
            }
            NEIGHBORS
                .iter()
                .map(|offset| cell + *offset)
                .filter(|next| spec.walkable(field, *next))
                .map(|next| (next, 1))
                .collect()
        },
        |&cell| {
            let delta = (cell - goal_cell).abs();
            (delta.x + delta.y) as u32
        },
        |&cell| cell == goal_cell,
    );

    match result {
        Some((cells, cost)) => {
            trace!(cost, expansions = expansions.get(), "Path found");
            PathResult::Found(cells.into_iter().map(|cell| spec.center_of(cell)).collect())
        }
        None => {
            warn!(
                start = ?start,
                goal = ?goal,
                expansions = expansions.get(),
                "Pathfinding failed, using a direct line"
            );
            PathResult::Fallback([start, goal])
        }
    }
}
