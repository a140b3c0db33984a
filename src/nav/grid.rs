//! Grid-backed navigation surface.
//!
//! A scene is a rectangular grid of square cells, each either walkable or blocked, with an
//! optional per-cell floor height. Paths are A* over the 8-connected walkable cells (no corner
//! cutting) followed by line-of-sight shortcutting, so roam legs come out as a few straight runs
//! instead of a staircase of cell centers.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, VecDeque},
    fs::File,
    io::BufReader,
    path::Path,
};

use anyhow::Context as _;
use rand::{Rng as _, RngCore};

use crate::{
    foundation::core::{Point3, SceneBounds},
    foundation::error::{NavTrackError, NavTrackResult},
    nav::oracle::NavigationOracle,
};

const RANDOM_POINT_TRIES: usize = 32;
const CELL_JITTER: f64 = 0.4;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// JSON scene description consumed by [`GridNavMesh`].
pub struct GridSceneDef {
    /// Scene identity, used as the region cache key.
    pub name: String,
    /// World position of the low corner of cell `(0, 0)`.
    pub origin: Point3,
    /// Edge length of one cell in world units.
    pub cell_size: f64,
    /// One string per grid row (row 0 at `origin.y`): `.` walkable, `#` blocked.
    pub rows: Vec<String>,
    /// Optional row-major floor heights, relative to `origin.z`.
    #[serde(default)]
    pub heights: Vec<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Cell {
    col: usize,
    row: usize,
}

#[derive(Clone, Debug)]
/// Walkable cell grid implementing [`NavigationOracle`].
pub struct GridNavMesh {
    name: String,
    origin: Point3,
    cell_size: f64,
    cols: usize,
    rows: usize,
    walkable: Vec<bool>,
    heights: Vec<f64>,
}

impl GridNavMesh {
    /// Build and validate a mesh from its description.
    pub fn from_def(def: &GridSceneDef) -> NavTrackResult<Self> {
        if !(def.cell_size.is_finite() && def.cell_size > 0.0) {
            return Err(NavTrackError::validation("grid cellSize must be > 0"));
        }
        let rows = def.rows.len();
        let cols = def.rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(NavTrackError::validation("grid must have at least one cell"));
        }

        let mut walkable = Vec::with_capacity(rows * cols);
        for (r, line) in def.rows.iter().enumerate() {
            if line.chars().count() != cols {
                return Err(NavTrackError::validation(format!(
                    "grid row {r} has {} cells, expected {cols}",
                    line.chars().count()
                )));
            }
            for ch in line.chars() {
                match ch {
                    '.' => walkable.push(true),
                    '#' => walkable.push(false),
                    other => {
                        return Err(NavTrackError::validation(format!(
                            "grid row {r} has unknown cell '{other}'"
                        )));
                    }
                }
            }
        }

        let heights = if def.heights.is_empty() {
            vec![0.0; rows * cols]
        } else if def.heights.len() == rows * cols {
            def.heights.clone()
        } else {
            return Err(NavTrackError::validation(format!(
                "grid heights has {} entries, expected {}",
                def.heights.len(),
                rows * cols
            )));
        };

        Ok(Self {
            name: def.name.clone(),
            origin: def.origin,
            cell_size: def.cell_size,
            cols,
            rows,
            walkable,
            heights,
        })
    }

    /// Load a scene description from a JSON file.
    pub fn load(path: &Path) -> NavTrackResult<Self> {
        let f = File::open(path).with_context(|| format!("open scene '{}'", path.display()))?;
        let def: GridSceneDef = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse scene '{}'", path.display()))?;
        Self::from_def(&def)
    }

    /// Scene identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of walkable cells.
    pub fn walkable_cell_count(&self) -> usize {
        self.walkable.iter().filter(|w| **w).count()
    }

    fn idx(&self, c: Cell) -> usize {
        c.row * self.cols + c.col
    }

    fn cell_of(&self, p: Point3) -> Option<Cell> {
        let fx = ((p.x - self.origin.x) / self.cell_size).floor();
        let fy = ((p.y - self.origin.y) / self.cell_size).floor();
        if fx < 0.0 || fy < 0.0 || !fx.is_finite() || !fy.is_finite() {
            return None;
        }
        let (col, row) = (fx as usize, fy as usize);
        (col < self.cols && row < self.rows).then_some(Cell { col, row })
    }

    fn is_walkable(&self, c: Cell) -> bool {
        self.walkable[self.idx(c)]
    }

    fn walkable_cell_of(&self, p: Point3) -> Option<Cell> {
        self.cell_of(p).filter(|c| self.is_walkable(*c))
    }

    fn floor_z(&self, c: Cell) -> f64 {
        self.origin.z + self.heights[self.idx(c)]
    }

    fn center(&self, c: Cell) -> Point3 {
        Point3::new(
            self.origin.x + (c.col as f64 + 0.5) * self.cell_size,
            self.origin.y + (c.row as f64 + 0.5) * self.cell_size,
            self.floor_z(c),
        )
    }

    fn jittered(&self, c: Cell, rng: &mut dyn RngCore) -> Point3 {
        let center = self.center(c);
        let j = CELL_JITTER * self.cell_size;
        Point3::new(
            center.x + rng.gen_range(-j..=j),
            center.y + rng.gen_range(-j..=j),
            center.z,
        )
    }

    fn neighbors(&self, c: Cell) -> impl Iterator<Item = Cell> + '_ {
        const OFFSETS: [(isize, isize); 8] = [
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ];
        OFFSETS.iter().filter_map(move |&(dc, dr)| {
            let n = self.offset(c, dc, dr)?;
            if !self.is_walkable(n) {
                return None;
            }
            if dc != 0 && dr != 0 {
                // Diagonal steps may not clip a blocked corner.
                let side_a = self.offset(c, dc, 0)?;
                let side_b = self.offset(c, 0, dr)?;
                if !self.is_walkable(side_a) || !self.is_walkable(side_b) {
                    return None;
                }
            }
            Some(n)
        })
    }

    fn offset(&self, c: Cell, dc: isize, dr: isize) -> Option<Cell> {
        let col = c.col.checked_add_signed(dc)?;
        let row = c.row.checked_add_signed(dr)?;
        (col < self.cols && row < self.rows).then_some(Cell { col, row })
    }

    /// Walkable cells connected to `start` whose centers lie within `radius` of `around`.
    fn flood_within(&self, start: Cell, around: Point3, radius: f64) -> Vec<Cell> {
        let mut seen = vec![false; self.walkable.len()];
        let mut queue = VecDeque::from([start]);
        seen[self.idx(start)] = true;
        let mut out = Vec::new();
        while let Some(c) = queue.pop_front() {
            out.push(c);
            for n in self.neighbors(c) {
                let ni = self.idx(n);
                if seen[ni] || self.center(n).distance_xy(around) > radius {
                    continue;
                }
                seen[ni] = true;
                queue.push_back(n);
            }
        }
        out
    }

    fn nearest_walkable(&self, p: Point3) -> Option<Cell> {
        let mut best: Option<(f64, Cell)> = None;
        for row in 0..self.rows {
            for col in 0..self.cols {
                let c = Cell { col, row };
                if !self.is_walkable(c) {
                    continue;
                }
                let d = self.center(c).distance_xy(p);
                if best.is_none_or(|(bd, _)| d < bd) {
                    best = Some((d, c));
                }
            }
        }
        best.map(|(_, c)| c)
    }

    fn astar(&self, start: Cell, goal: Cell) -> Option<Vec<Cell>> {
        let n = self.walkable.len();
        let mut g_score = vec![f64::INFINITY; n];
        let mut came_from: Vec<Option<Cell>> = vec![None; n];
        let mut closed = vec![false; n];
        let goal_center = self.center(goal);

        g_score[self.idx(start)] = 0.0;
        let mut open = BinaryHeap::new();
        open.push(OpenEntry {
            cell: start,
            f_score: self.center(start).distance_xy(goal_center),
        });

        while let Some(OpenEntry { cell, .. }) = open.pop() {
            if cell == goal {
                let mut path = vec![goal];
                let mut cur = goal;
                while let Some(prev) = came_from[self.idx(cur)] {
                    path.push(prev);
                    cur = prev;
                }
                path.reverse();
                return Some(path);
            }
            let ci = self.idx(cell);
            if closed[ci] {
                continue;
            }
            closed[ci] = true;

            let here = self.center(cell);
            for nb in self.neighbors(cell) {
                let ni = self.idx(nb);
                if closed[ni] {
                    continue;
                }
                let there = self.center(nb);
                let tentative = g_score[ci] + here.distance(there);
                if tentative < g_score[ni] {
                    g_score[ni] = tentative;
                    came_from[ni] = Some(cell);
                    open.push(OpenEntry {
                        cell: nb,
                        f_score: tentative + there.distance_xy(goal_center),
                    });
                }
            }
        }
        None
    }

    /// Greedy line-of-sight shortcutting over a waypoint list.
    fn shortcut(&self, waypoints: Vec<Point3>) -> Vec<Point3> {
        if waypoints.len() <= 2 {
            return waypoints;
        }
        let mut out = vec![waypoints[0]];
        let mut anchor = 0;
        while anchor < waypoints.len() - 1 {
            let mut next = anchor + 1;
            for j in (anchor + 2..waypoints.len()).rev() {
                if self.raycast(waypoints[anchor], waypoints[j]).is_none() {
                    next = j;
                    break;
                }
            }
            out.push(waypoints[next]);
            anchor = next;
        }
        out
    }
}

impl NavigationOracle for GridNavMesh {
    fn random_navigable_point(
        &self,
        origin: Point3,
        radius: f64,
        rng: &mut dyn RngCore,
    ) -> Option<Point3> {
        let radius = radius.max(self.cell_size);
        for _ in 0..RANDOM_POINT_TRIES {
            let dx = rng.gen_range(-radius..=radius);
            let dy = rng.gen_range(-radius..=radius);
            if dx.hypot(dy) > radius {
                continue;
            }
            let candidate = Point3::new(origin.x + dx, origin.y + dy, origin.z);
            if let Some(c) = self.walkable_cell_of(candidate) {
                return Some(Point3::new(candidate.x, candidate.y, self.floor_z(c)));
            }
        }
        None
    }

    fn random_reachable_point(
        &self,
        origin: Point3,
        radius: f64,
        rng: &mut dyn RngCore,
    ) -> Option<Point3> {
        let start = self.walkable_cell_of(origin)?;
        let reachable = self.flood_within(start, origin, radius.max(0.0));
        let pick = reachable[rng.gen_range(0..reachable.len())];
        Some(self.jittered(pick, rng))
    }

    fn project_to_surface(&self, point: Point3) -> Point3 {
        if let Some(c) = self.walkable_cell_of(point) {
            return Point3::new(point.x, point.y, self.floor_z(c));
        }
        self.nearest_walkable(point)
            .map(|c| self.center(c))
            .unwrap_or(point)
    }

    fn find_path(&self, start: Point3, end: Point3) -> Vec<Point3> {
        let (Some(a), Some(b)) = (self.walkable_cell_of(start), self.walkable_cell_of(end)) else {
            return Vec::new();
        };
        let start = Point3::new(start.x, start.y, self.floor_z(a));
        let end = Point3::new(end.x, end.y, self.floor_z(b));
        let Some(cells) = self.astar(a, b) else {
            return Vec::new();
        };

        let mut waypoints = Vec::with_capacity(cells.len() + 1);
        waypoints.push(start);
        if cells.len() > 2 {
            waypoints.extend(cells[1..cells.len() - 1].iter().map(|c| self.center(*c)));
        }
        waypoints.push(end);
        self.shortcut(waypoints)
    }

    fn raycast(&self, start: Point3, end: Point3) -> Option<Point3> {
        let length = start.distance_xy(end);
        let step = self.cell_size * 0.25;
        let steps = (length / step).ceil().max(1.0) as usize;
        (0..=steps)
            .map(|i| start.lerp(end, i as f64 / steps as f64))
            .find(|p| self.walkable_cell_of(*p).is_none())
    }

    fn scene_bounds(&self) -> Option<SceneBounds> {
        let (lo, hi) = self
            .heights
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), h| {
                (lo.min(*h), hi.max(*h))
            });
        let half_w = self.cols as f64 * self.cell_size * 0.5;
        let half_h = self.rows as f64 * self.cell_size * 0.5;
        Some(SceneBounds {
            center: Point3::new(
                self.origin.x + half_w,
                self.origin.y + half_h,
                self.origin.z + (lo + hi) * 0.5,
            ),
            extent: Point3::new(half_w, half_h, ((hi - lo) * 0.5).max(self.cell_size)),
        })
    }
}

struct OpenEntry {
    cell: Cell,
    f_score: f64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; ties broken on cell for deterministic expansion order.
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| (other.cell.row, other.cell.col).cmp(&(self.cell.row, self.cell.col)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/nav/grid.rs"]
mod tests;
