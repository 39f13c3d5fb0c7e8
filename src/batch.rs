//! Conversion of a directory of timetable workbooks into one GTFS feed.

use crate::assembler::{Assembly, TripStopAssembler};
use crate::config::{Configuration, Defaults, TimetableLayout};
use crate::feed::Feed;
use crate::grid::Grid;
use crate::metadata;
use crate::resolver::Lookups;
use crate::workbook::read_first_sheet;
use crate::Error;
use itertools::Itertools;
use std::fs;
use std::path::{Path, PathBuf};

const TIMETABLE_EXTENSION: &str = "xlsx";

/// The timetable workbooks of a directory, sorted by file name
pub fn timetable_files<P: AsRef<Path>>(directory: P) -> Result<Vec<PathBuf>, Error> {
    let p = directory.as_ref();
    let entries = fs::read_dir(p).map_err(|e| Error::NamedFileIO {
        file_name: format!("{}", p.display()),
        source: e,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_timetable = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case(TIMETABLE_EXTENSION))
            .unwrap_or(false);
        if path.is_file() && is_timetable {
            files.push(path);
        }
    }
    Ok(files
        .into_iter()
        .sorted_by(|a, b| a.file_name().cmp(&b.file_name()))
        .collect())
}

/// Assembles the trips of every grid, in order, with one assembler
pub fn process_timetables<'g, I>(
    grids: I,
    layout: &TimetableLayout,
    defaults: &Defaults,
    lookups: &Lookups,
) -> Result<Assembly, Error>
where
    I: IntoIterator<Item = &'g Grid>,
{
    let mut assembler = TripStopAssembler::new(layout, defaults, lookups)?;
    for grid in grids {
        assembler.assemble_grid(grid)?;
    }
    Ok(assembler.finish())
}

/// Reads the metadata workbooks named in the configuration
pub fn load_lookups(configuration: &Configuration) -> Result<Lookups, Error> {
    let metadata_config = &configuration.metadata;
    let mappings = &configuration.mappings;
    let defaults = &configuration.defaults;

    let stops = metadata::load_stops(
        &read_first_sheet(&metadata_config.stops.input_filename)?,
        &metadata_config.stops,
    )?;
    let calendars = metadata::load_calendars(
        &read_first_sheet(&metadata_config.calendars.input_filename)?,
        &metadata_config.calendars,
        mappings,
        defaults,
    )?;
    let calendar_dates = match &metadata_config.calendar_exceptions {
        Some(exceptions) => metadata::load_calendar_exceptions(
            &read_first_sheet(&exceptions.input_filename)?,
            exceptions,
            &calendars,
            mappings,
            defaults,
        )?,
        None => Default::default(),
    };
    let (agencies, routes) = metadata::load_agencies_and_routes(
        &read_first_sheet(&metadata_config.routes.input_filename)?,
        &metadata_config.routes,
        mappings,
        defaults,
    )?;

    info!(
        "metadata loaded: {} stops, {} calendars, {} services with exceptions, {} routes, {} agencies",
        stops.len(),
        calendars.len(),
        calendar_dates.len(),
        routes.len(),
        agencies.len()
    );
    Ok(Lookups {
        stops,
        calendars,
        calendar_dates,
        routes,
        agencies,
    })
}

/// Builds the feed of the metadata tables and of the assembled trips
///
/// Metadata tables are sorted by id so that the output does not depend on hashing.
pub fn build_feed(lookups: &Lookups, assembly: &Assembly) -> Result<Feed, Error> {
    let mut feed = Feed::default();
    feed.add_optional_table("agency.txt", &lookups.agencies)?;
    let stops: Vec<_> = lookups
        .stops
        .values()
        .sorted_by(|a, b| a.id.cmp(&b.id))
        .collect();
    feed.add_optional_table("stops.txt", &stops)?;
    let routes: Vec<_> = lookups
        .routes
        .values()
        .sorted_by(|a, b| a.id.cmp(&b.id))
        .collect();
    feed.add_optional_table("routes.txt", &routes)?;
    let calendars: Vec<_> = lookups
        .calendars
        .values()
        .sorted_by(|a, b| a.id.cmp(&b.id))
        .collect();
    feed.add_optional_table("calendar.txt", &calendars)?;
    let calendar_dates: Vec<_> = lookups
        .calendar_dates
        .values()
        .flatten()
        .sorted_by(|a, b| (&a.service_id, a.date).cmp(&(&b.service_id, b.date)))
        .collect();
    feed.add_optional_table("calendar_dates.txt", &calendar_dates)?;
    feed.add_table("trips.txt", &assembly.trips)?;
    feed.add_table("stop_times.txt", &assembly.stop_times)?;
    Ok(feed)
}

/// Converts every timetable of the configured directory into a GTFS archive
pub fn convert<P: AsRef<Path>>(configuration: &Configuration, output: P) -> Result<Assembly, Error> {
    let lookups = load_lookups(configuration)?;
    let layout = &configuration.timetables;
    let grids = timetable_files(&layout.input_directory)?
        .iter()
        .map(|file| {
            info!("Processing file: {}", file.display());
            read_first_sheet(file)
        })
        .collect::<Result<Vec<Grid>, Error>>()?;
    let assembly = process_timetables(&grids, layout, &configuration.defaults, &lookups)?;
    for unresolved in assembly.unresolved.iter().unique() {
        warn!("{} is not in the metadata, used verbatim", unresolved);
    }

    build_feed(&lookups, &assembly)?.write(output)?;
    Ok(assembly)
}
