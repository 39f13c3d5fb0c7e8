//! Run-length traversal of the occupied cells of a [Grid].

use crate::grid::{CellCoord, CellRef, Grid};
use std::fmt;

/// Whether the trips of a timetable vary by column or by row
#[derive(Derivative)]
#[derivative(Default)]
#[derive(Debug, Deserialize, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// One trip per column
    #[derivative(Default)]
    Vertical,
    /// One trip per row
    Horizontal,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Orientation::Vertical => write!(f, "vertical"),
            Orientation::Horizontal => write!(f, "horizontal"),
        }
    }
}

/// Lazily walks the occupied cells of a grid, lane by lane
///
/// A lane is a column for [Orientation::Vertical] and a row for [Orientation::Horizontal].
/// Each lane is scanned from the start cell onwards: leading empty cells are skipped and
/// the first empty cell after a value ends the lane. The traversal ends at the first lane
/// that holds no value at all, so anything after that lane is never yielded.
///
/// ```
/// use x2gtfs::{CellCoord, Grid, GridCursor, Orientation};
///
/// let grid = Grid::from_rows(vec![
///     vec!["a", "d", "", "g"],
///     vec!["b", "", "", "h"],
///     vec!["", "e", "", ""],
///     vec!["c", "", "", ""],
/// ]);
/// let values: Vec<String> = GridCursor::new(&grid, CellCoord::new(1, 1), Orientation::Vertical)
///     .map(|cell| cell.value.to_string())
///     .collect();
/// assert_eq!(vec!["a", "b", "d"], values);
/// ```
pub struct GridCursor<'a> {
    grid: &'a Grid,
    orientation: Orientation,
    start: CellCoord,
    lane: u32,
    position: u32,
    lane_started: bool,
    found_in_lane: bool,
    done: bool,
}

impl<'a> GridCursor<'a> {
    pub fn new(grid: &'a Grid, start: CellCoord, orientation: Orientation) -> Self {
        let lane = match orientation {
            Orientation::Vertical => start.column,
            Orientation::Horizontal => start.row,
        };
        Self {
            grid,
            orientation,
            start,
            lane,
            position: 0,
            lane_started: false,
            found_in_lane: false,
            done: false,
        }
    }

    fn first_position(&self) -> u32 {
        match self.orientation {
            Orientation::Vertical => self.start.row,
            Orientation::Horizontal => self.start.column,
        }
    }

    fn last_position(&self) -> u32 {
        match self.orientation {
            Orientation::Vertical => self.grid.max_row(),
            Orientation::Horizontal => self.grid.max_column(),
        }
    }

    fn cell_at(&self, lane: u32, position: u32) -> CellRef<'a> {
        let (row, column) = match self.orientation {
            Orientation::Vertical => (position, lane),
            Orientation::Horizontal => (lane, position),
        };
        CellRef {
            row,
            column,
            value: self.grid.cell(row, column),
        }
    }

    fn lane_is_empty(&self, lane: u32) -> bool {
        (self.first_position()..=self.last_position())
            .all(|position| self.cell_at(lane, position).value.is_empty())
    }

    fn next_lane(&mut self) {
        self.lane += 1;
        self.lane_started = false;
    }
}

impl<'a> Iterator for GridCursor<'a> {
    type Item = CellRef<'a>;

    fn next(&mut self) -> Option<CellRef<'a>> {
        loop {
            if self.done {
                return None;
            }
            if !self.lane_started {
                if self.lane_is_empty(self.lane) {
                    self.done = true;
                    return None;
                }
                self.lane_started = true;
                self.found_in_lane = false;
                self.position = self.first_position();
            }
            if self.position > self.last_position() {
                self.next_lane();
                continue;
            }

            let cell = self.cell_at(self.lane, self.position);
            self.position += 1;
            if !cell.value.is_empty() {
                self.found_in_lane = true;
                return Some(cell);
            } else if self.found_in_lane {
                self.next_lane();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(grid: &Grid, start: &str, orientation: Orientation) -> Vec<(u32, u32, String)> {
        GridCursor::new(grid, start.parse().unwrap(), orientation)
            .map(|c| (c.row, c.column, c.value.to_string()))
            .collect()
    }

    #[test]
    fn stops_at_first_empty_column() {
        let grid = Grid::from_rows(vec![
            vec!["x", "x", "", "x"],
            vec!["x", "x", "", "x"],
        ]);
        let cells = collect(&grid, "A1", Orientation::Vertical);
        assert_eq!(4, cells.len());
        assert!(cells.iter().all(|(_, c, _)| *c <= 2));
    }

    #[test]
    fn gap_ends_the_column() {
        let grid = Grid::from_rows(vec![
            vec!["h", "h"],
            vec!["", "1"],
            vec!["2", ""],
            vec!["", "3"],
            vec!["4", ""],
        ]);
        let cells = collect(&grid, "A2", Orientation::Vertical);
        assert_eq!(
            vec![
                (3, 1, "2".to_owned()),
                (2, 2, "1".to_owned()),
            ],
            cells
        );
    }

    #[test]
    fn short_run_at_the_top() {
        let grid = Grid::from_rows(vec![
            vec!["1", "4"],
            vec!["", "5"],
            vec!["", "6"],
        ]);
        let cells = collect(&grid, "A1", Orientation::Vertical);
        let values: Vec<_> = cells.into_iter().map(|(_, _, v)| v).collect();
        assert_eq!(vec!["1", "4", "5", "6"], values);
    }

    #[test]
    fn horizontal_is_the_transpose() {
        let grid = Grid::from_rows(vec![
            vec!["1", "2", "", "3"],
            vec!["", "4", "5", ""],
            vec!["", "", "", ""],
            vec!["6", "", "", ""],
        ]);
        let cells = collect(&grid, "A1", Orientation::Horizontal);
        let values: Vec<_> = cells.into_iter().map(|(_, _, v)| v).collect();
        assert_eq!(vec!["1", "2", "4", "5"], values);
    }

    #[test]
    fn empty_grid() {
        let grid = Grid::new();
        assert!(collect(&grid, "B3", Orientation::Vertical).is_empty());
    }

    #[test]
    fn start_cell_offsets_the_scan() {
        let grid = Grid::from_rows(vec![
            vec!["hdr", "hdr", "hdr"],
            vec!["A10", "07:00", "08:00"],
            vec!["A11", "07:10", ""],
        ]);
        let cells = collect(&grid, "B2", Orientation::Vertical);
        assert_eq!(
            vec![
                (2, 2, "07:00".to_owned()),
                (3, 2, "07:10".to_owned()),
                (2, 3, "08:00".to_owned()),
            ],
            cells
        );
    }
}
