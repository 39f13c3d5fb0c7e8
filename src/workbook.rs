//! Reading of the first worksheet of a workbook into a [Grid].

use crate::grid::{CellValue, Grid};
use crate::Error;
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{Duration, NaiveTime};
use std::convert::TryFrom;
use std::path::Path;

/// Reads the first worksheet of an `.xlsx` (or any format calamine knows) file
///
/// Cells keep their absolute position: a sheet whose used range starts at `B2` still has
/// its first value at row 2, column 2 of the grid.
pub fn read_first_sheet<P: AsRef<Path>>(path: P) -> Result<Grid, Error> {
    let p = path.as_ref();
    let file_name = format!("{}", p.display());
    if !p.is_file() {
        return Err(Error::MissingFile(file_name));
    }
    let mut workbook = open_workbook_auto(p).map_err(|e| Error::Spreadsheet {
        file_name: file_name.clone(),
        source: e,
    })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::EmptyWorkbook(file_name.clone()))?
        .map_err(|e| Error::Spreadsheet {
            file_name: file_name.clone(),
            source: e,
        })?;
    let grid = range_to_grid(&range);
    debug!(
        "read {} rows and {} columns from {}",
        grid.max_row(),
        grid.max_column(),
        file_name
    );
    Ok(grid)
}

fn range_to_grid(range: &Range<Data>) -> Grid {
    let mut grid = Grid::new();
    let (start_row, start_column) = match range.start() {
        Some(start) => start,
        None => return grid,
    };
    if let Some((end_row, end_column)) = range.end() {
        grid.set(end_row + 1, end_column + 1, CellValue::Empty);
    }
    for (row, column, data) in range.used_cells() {
        grid.set(
            start_row + row as u32 + 1,
            start_column + column as u32 + 1,
            cell_value(data),
        );
    }
    grid
}

/// Whole seconds of a fraction of a day, rounded to absorb float noise
fn day_seconds(days: f64) -> i64 {
    (days * 86_400.0).round() as i64
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Bool(b) => CellValue::Bool(*b),
        // `[h]:mm` cells keep their hours past 24
        Data::DateTime(dt) if dt.is_duration() => {
            CellValue::Duration(Duration::seconds(day_seconds(dt.as_f64())))
        }
        // time only cells are fractions of a day
        Data::DateTime(dt) if dt.as_f64() < 1.0 => {
            let seconds = day_seconds(dt.as_f64());
            u32::try_from(seconds)
                .ok()
                .and_then(|s| NaiveTime::from_num_seconds_from_midnight_opt(s, 0))
                .map(CellValue::Time)
                .unwrap_or_else(|| CellValue::Duration(Duration::seconds(seconds)))
        }
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => CellValue::DateTime(datetime),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from(s.as_str()),
        Data::Error(e) => {
            warn!("ignoring cell with error value {}", e);
            CellValue::Empty
        }
        Data::Empty => CellValue::Empty,
    }
}
