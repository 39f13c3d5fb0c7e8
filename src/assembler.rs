//! Reconstruction of trips and stop times from a stream of timetable cells.

use crate::config::{Defaults, TimetableLayout};
use crate::cursor::{GridCursor, Orientation};
use crate::grid::{CellRef, Grid};
use crate::objects::{StopTime, Trip};
use crate::resolver::{Lookups, Resolution, Unresolved};
use crate::Error;
use std::collections::{HashMap, HashSet};

/// Trips and stop times produced by a [TripStopAssembler]
#[derive(Debug, Default)]
pub struct Assembly {
    pub trips: Vec<Trip>,
    pub stop_times: Vec<StopTime>,
    /// Every token that fell back to its raw value, in order of appearance
    pub unresolved: Vec<Unresolved>,
}

/// The trip of the column being read
struct OpenTrip {
    trip: Trip,
    column: u32,
    /// Resolved id of the last stop read for this trip
    stop_id: Option<String>,
    /// Index in the output of the last stop time opened for this trip
    stop_time: Option<usize>,
}

/// State machine turning the cells of vertical timetables into [Trip] and [StopTime]
///
/// Each column of the time block is a trip. Trip attributes come from header rows of the
/// same column, the stop of each cell from the stop column of the same row. Consecutive
/// cells of the same stop are merged: the first gives the arrival, the last the departure.
///
/// The assembler is meant to be reused for every sheet of a feed so that trip ids keep
/// increasing from one sheet to the next.
pub struct TripStopAssembler<'a> {
    layout: &'a TimetableLayout,
    defaults: &'a Defaults,
    lookups: &'a Lookups,
    trips: Vec<Trip>,
    stop_times: Vec<StopTime>,
    unresolved: Vec<Unresolved>,
    stop_sequences: HashMap<String, u16>,
}

impl<'a> TripStopAssembler<'a> {
    /// Fails for horizontal layouts, whose trips are not supported
    pub fn new(
        layout: &'a TimetableLayout,
        defaults: &'a Defaults,
        lookups: &'a Lookups,
    ) -> Result<Self, Error> {
        if layout.orientation != Orientation::Vertical {
            return Err(Error::UnsupportedLayout(layout.orientation));
        }
        Ok(Self {
            layout,
            defaults,
            lookups,
            trips: Vec::new(),
            stop_times: Vec::new(),
            unresolved: Vec::new(),
            stop_sequences: HashMap::new(),
        })
    }

    /// Walks the time block of a grid from the configured start cell and assembles it
    pub fn assemble_grid(&mut self, grid: &Grid) -> Result<(), Error> {
        let cursor = GridCursor::new(grid, self.layout.start, self.layout.orientation);
        self.assemble(grid, cursor)
    }

    /// Assembles the cells of one grid
    ///
    /// The last trip of the grid is complete once the cells are exhausted, so the next
    /// grid always starts a new trip.
    pub fn assemble<'g, I>(&mut self, grid: &'g Grid, cells: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = CellRef<'g>>,
    {
        let mut open: Option<OpenTrip> = None;
        let mut seen_columns = HashSet::new();

        for cell in cells {
            if cell.value.is_text(&self.layout.run_through_char) {
                continue;
            }

            let mut trip = match open.take() {
                Some(trip) if trip.column == cell.column => trip,
                previous => {
                    if let Some(done) = previous {
                        self.finalize(done);
                    }
                    if !seen_columns.insert(cell.column) {
                        return Err(Error::TripColumnRevisited {
                            column: cell.column,
                        });
                    }
                    self.open_trip(grid, cell.column)
                }
            };

            self.add_stop(grid, &mut trip, &cell)?;
            open = Some(trip);
        }

        if let Some(done) = open {
            self.finalize(done);
        }
        Ok(())
    }

    /// All the trips and stop times assembled so far
    pub fn finish(self) -> Assembly {
        Assembly {
            trips: self.trips,
            stop_times: self.stop_times,
            unresolved: self.unresolved,
        }
    }

    fn open_trip(&mut self, grid: &Grid, column: u32) -> OpenTrip {
        let header = |row: u32| grid.cell(row, column).token();

        let route = self
            .lookups
            .resolve_route(&header(self.layout.route_row).unwrap_or_default());
        let service = self
            .lookups
            .resolve_service(&header(self.layout.service_row).unwrap_or_default());

        let trip = Trip {
            id: self.defaults.trip_id(self.trips.len() + 1),
            route_id: self.note(route),
            service_id: self.note(service),
            trip_headsign: header(self.layout.trip_headsign_row),
            trip_short_name: header(self.layout.trip_short_name_row),
            shape_id: header(self.layout.shape_row),
            ..Trip::default()
        };
        debug!("trip {} starts in column {}", trip.id, column);

        OpenTrip {
            trip,
            column,
            stop_id: None,
            stop_time: None,
        }
    }

    fn add_stop(&mut self, grid: &Grid, trip: &mut OpenTrip, cell: &CellRef) -> Result<(), Error> {
        let stop_token = grid
            .cell(cell.row, self.layout.stop_column.index())
            .token()
            .unwrap_or_default();
        let resolution = self.lookups.resolve_stop(&stop_token);
        let stop_id = self.note(resolution);
        let time = cell.value.format_time(&self.layout.time_format);

        match trip.stop_time {
            Some(index) if trip.stop_id.as_deref() == Some(stop_id.as_str()) => {
                self.stop_times[index].departure_time = time;
            }
            _ => {
                let stop_sequence = self.next_sequence(&trip.trip.id)?;
                self.stop_times.push(StopTime {
                    trip_id: trip.trip.id.clone(),
                    arrival_time: time.clone(),
                    departure_time: time,
                    stop_id: stop_id.clone(),
                    stop_sequence,
                    ..StopTime::default()
                });
                trip.stop_time = Some(self.stop_times.len() - 1);
                trip.stop_id = Some(stop_id);
            }
        }
        Ok(())
    }

    fn next_sequence(&mut self, trip_id: &str) -> Result<u16, Error> {
        let sequence = self.stop_sequences.entry(trip_id.to_owned()).or_insert(0);
        *sequence = sequence.checked_add(1).ok_or_else(|| Error::TooManyStops {
            trip_id: trip_id.to_owned(),
        })?;
        Ok(*sequence)
    }

    fn note(&mut self, resolution: Resolution) -> String {
        if let Some(unresolved) = resolution.unresolved() {
            self.unresolved.push(unresolved.clone());
        }
        resolution.into_id()
    }

    fn finalize(&mut self, open: OpenTrip) {
        self.trips.push(open.trip);
    }
}
