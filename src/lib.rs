//! The [General Transit Feed Specification](https://gtfs.org/) (GTFS) is the format of
//! choice of public transport timetables, but many small operators keep theirs in
//! spreadsheets: one sheet per line, one column per trip, one row per stop.
//!
//! This crate turns such spreadsheets into a GTFS archive.
//! The layout of the sheets (where the time block starts, which rows hold the route and the
//! service of each trip, which column holds the stop) is described by a [Configuration].
//!
//! ```no_run
//! let configuration = x2gtfs::Configuration::from_path("config.yml")?;
//! let assembly = x2gtfs::convert(&configuration, "gtfs.zip")?;
//! println!("{} trips", assembly.trips.len());
//! # Ok::<(), x2gtfs::Error>(())
//! ```
//!
//! The building blocks can be used on their own: a [GridCursor] walks the occupied cells of
//! a [Grid], and a [TripStopAssembler] turns that stream of cells into trips and stop times.

#[macro_use]
extern crate derivative;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

mod assembler;
mod batch;
mod config;
mod cursor;
pub mod error;
mod feed;
mod grid;
mod metadata;
pub(crate) mod objects;
mod resolver;
mod serde_helpers;
mod workbook;


pub use assembler::{Assembly, TripStopAssembler};
pub use batch::{build_feed, convert, load_lookups, process_timetables, timetable_files};
pub use crate::config::{
    CalendarExceptionsConfig, CalendarsConfig, Configuration, Defaults, Mappings,
    MetadataConfig, RoutesConfig, StopsConfig, TimetableLayout,
};
pub use cursor::{GridCursor, Orientation};
pub use error::Error;
pub use feed::Feed;
pub use grid::{column_index, column_name, CellCoord, CellRef, CellValue, Column, Grid};
pub use metadata::{load_agencies_and_routes, load_calendar_exceptions, load_calendars, load_stops};
pub use objects::*;
pub use resolver::{resolve, LookupCategory, Lookups, Resolution, Unresolved};
pub use workbook::read_first_sheet;
