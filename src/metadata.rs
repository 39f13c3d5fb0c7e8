//! Loading of the stop, calendar and route tables from their spreadsheets.
//!
//! Every sheet has a header on its first row. Data rows are read until the first row
//! whose identification cell is empty. The identification is the token used in the
//! timetable sheets, and is the key of the resulting tables.

use crate::config::{
    CalendarExceptionsConfig, CalendarsConfig, Defaults, Mappings, RoutesConfig, StopsConfig,
};
use crate::grid::{CellCoord, CellValue, Column, Grid};
use crate::objects::{Agency, Calendar, CalendarDate, Exception, Route, RouteType, Stop};
use crate::Error;
use chrono::NaiveDate;
use std::collections::HashMap;

const FIRST_DATA_ROW: u32 = 2;
const DEFAULT_ROUTE_TYPE: u16 = 3;
const DEFAULT_EXCEPTION_TYPE: u8 = 1;

/// Rows of a metadata sheet with their identification token
fn data_rows(grid: &Grid, identification: Column) -> impl Iterator<Item = (u32, String)> + '_ {
    (FIRST_DATA_ROW..=grid.max_row())
        .map_while(move |row| grid.cell(row, identification.index()).token().map(|t| (row, t)))
}

fn text(grid: &Grid, row: u32, column: Column) -> Option<String> {
    grid.cell(row, column.index()).token()
}

fn number(grid: &Grid, row: u32, column: Column) -> Result<f64, Error> {
    let value = grid.cell(row, column.index());
    value.as_f64().ok_or_else(|| Error::InvalidNumber {
        cell: CellCoord::new(row, column.index()).to_string(),
        value: value.to_string(),
    })
}

fn date(grid: &Grid, row: u32, column: Column, format: &str) -> Result<NaiveDate, Error> {
    let value = grid.cell(row, column.index());
    let mk_err = || Error::InvalidDate {
        cell: CellCoord::new(row, column.index()).to_string(),
        value: value.to_string(),
        format: format.to_owned(),
    };
    match value {
        CellValue::DateTime(dt) => Ok(dt.date()),
        CellValue::Text(s) => NaiveDate::parse_from_str(s.trim(), format).map_err(|_| mk_err()),
        _ => Err(mk_err()),
    }
}

pub fn load_stops(grid: &Grid, config: &StopsConfig) -> Result<HashMap<String, Stop>, Error> {
    let mut stops = HashMap::new();
    for (row, token) in data_rows(grid, config.stop_identification_index) {
        let stop = Stop {
            id: text(grid, row, config.stop_id_index).unwrap_or_else(|| token.clone()),
            name: text(grid, row, config.stop_name_index).unwrap_or_default(),
            latitude: number(grid, row, config.stop_lat_index)?,
            longitude: number(grid, row, config.stop_lon_index)?,
            ..Stop::default()
        };
        if stops.contains_key(&token) {
            warn!("duplicate stop identification '{}' on row {} ignored", token, row);
            continue;
        }
        stops.insert(token, stop);
    }
    Ok(stops)
}

pub fn load_calendars(
    grid: &Grid,
    config: &CalendarsConfig,
    mappings: &Mappings,
    defaults: &Defaults,
) -> Result<HashMap<String, Calendar>, Error> {
    let day = |row: u32, column: Column| {
        text(grid, row, column)
            .and_then(|t| mappings.calendar_day_types.get(&t).copied())
            .unwrap_or(0)
            != 0
    };

    let mut calendars = HashMap::new();
    for (row, token) in data_rows(grid, config.service_identification_index) {
        if calendars.contains_key(&token) {
            warn!("duplicate service identification '{}' on row {} ignored", token, row);
            continue;
        }
        let calendar = Calendar {
            id: defaults.service_id(calendars.len() + 1),
            monday: day(row, config.monday_index),
            tuesday: day(row, config.tuesday_index),
            wednesday: day(row, config.wednesday_index),
            thursday: day(row, config.thursday_index),
            friday: day(row, config.friday_index),
            saturday: day(row, config.saturday_index),
            sunday: day(row, config.sunday_index),
            start_date: date(grid, row, config.start_date_index, &config.date_format)?,
            end_date: date(grid, row, config.end_date_index, &config.date_format)?,
        };
        calendars.insert(token, calendar);
    }
    Ok(calendars)
}

/// Exceptions per service token
///
/// Services without a calendar get a generated service id that continues the calendar
/// numbering, so that they can still be referenced by trips.
pub fn load_calendar_exceptions(
    grid: &Grid,
    config: &CalendarExceptionsConfig,
    calendars: &HashMap<String, Calendar>,
    mappings: &Mappings,
    defaults: &Defaults,
) -> Result<HashMap<String, Vec<CalendarDate>>, Error> {
    let mut calendar_dates: HashMap<String, Vec<CalendarDate>> = HashMap::new();
    let mut exception_only = 0;

    for (row, token) in data_rows(grid, config.service_identification_index) {
        let service_id = match (calendars.get(&token), calendar_dates.get(&token)) {
            (Some(calendar), _) => calendar.id.clone(),
            (None, Some(dates)) if !dates.is_empty() => dates[0].service_id.clone(),
            _ => {
                exception_only += 1;
                debug!("service '{}' only runs on exception dates", token);
                defaults.service_id(calendars.len() + exception_only)
            }
        };
        let code = text(grid, row, config.exception_type_index)
            .and_then(|t| mappings.calendar_exception_types.get(&t).copied())
            .unwrap_or(DEFAULT_EXCEPTION_TYPE);
        let calendar_date = CalendarDate {
            service_id,
            date: date(grid, row, config.date_index, &config.date_format)?,
            exception_type: Exception::from_code(code).ok_or(Error::InvalidExceptionType(code))?,
        };
        calendar_dates
            .entry(token)
            .or_insert_with(Vec::new)
            .push(calendar_date);
    }
    Ok(calendar_dates)
}

/// Routes per route token, and the agencies they reference
///
/// Agencies are identified by their name.
pub fn load_agencies_and_routes(
    grid: &Grid,
    config: &RoutesConfig,
    mappings: &Mappings,
    defaults: &Defaults,
) -> Result<(Vec<Agency>, HashMap<String, Route>), Error> {
    let mut agencies: Vec<Agency> = Vec::new();
    let mut agency_by_name: HashMap<String, usize> = HashMap::new();
    let mut routes = HashMap::new();

    for (row, token) in data_rows(grid, config.route_identification_index) {
        if routes.contains_key(&token) {
            warn!("duplicate route identification '{}' on row {} ignored", token, row);
            continue;
        }
        let agency_name = text(grid, row, config.agency_name_index).unwrap_or_default();
        let agency_index = match agency_by_name.get(&agency_name) {
            Some(index) => *index,
            None => {
                agencies.push(Agency {
                    id: Some(defaults.agency_id(agencies.len() + 1)),
                    name: agency_name.clone(),
                    url: text(grid, row, config.agency_url_index).unwrap_or_default(),
                    timezone: defaults.agency_timezone.clone(),
                    ..Agency::default()
                });
                agency_by_name.insert(agency_name, agencies.len() - 1);
                agencies.len() - 1
            }
        };

        let route_type = text(grid, row, config.route_type_index)
            .and_then(|t| mappings.route_type.get(&t).copied())
            .unwrap_or(DEFAULT_ROUTE_TYPE);
        let route = Route {
            id: text(grid, row, config.route_id_index).unwrap_or_else(|| token.clone()),
            route_type: RouteType::from(route_type),
            agency_id: agencies[agency_index].id.clone(),
            short_name: text(grid, row, config.route_short_name_index),
            long_name: text(grid, row, config.route_long_name_index),
            route_color: text(grid, row, config.route_color_index),
            route_text_color: text(grid, row, config.route_text_color_index),
            ..Route::default()
        };
        trace!("route {} run by {}", route, agencies[agency_index].name);
        routes.insert(token, route);
    }
    Ok((agencies, routes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn defaults() -> Defaults {
        Defaults {
            trip_id: "{trip_id}".to_owned(),
            service_id: "{service_id}".to_owned(),
            agency_id: "A{agency_id}".to_owned(),
            agency_timezone: "Europe/Berlin".to_owned(),
        }
    }

    fn mappings() -> Mappings {
        let mut mappings = Mappings::default();
        mappings.calendar_day_types.insert("x".to_owned(), 1);
        mappings.calendar_exception_types.insert("extra".to_owned(), 1);
        mappings.calendar_exception_types.insert("entfall".to_owned(), 2);
        mappings.route_type.insert("tram".to_owned(), 0);
        mappings
    }

    #[test]
    fn stops_until_first_empty_identification() {
        let mut grid = Grid::from_rows(vec![
            vec!["ident", "id", "name", "lat", "lon"],
            vec!["Hbf", "de:1000", "Hauptbahnhof", "48.78", "9.18"],
            vec!["Pl", "de:1001", "Schlossplatz", "", ""],
            vec!["", "", "", "", ""],
            vec!["Late", "de:1002", "Never read", "0", "0"],
        ]);
        grid.set(3, 4, 48.77);
        grid.set(3, 5, 9.17);
        let config = StopsConfig {
            input_filename: PathBuf::from("stops.xlsx"),
            stop_identification_index: Column(1),
            stop_id_index: Column(2),
            stop_name_index: Column(3),
            stop_lat_index: Column(4),
            stop_lon_index: Column(5),
        };
        let stops = load_stops(&grid, &config).unwrap();
        assert_eq!(2, stops.len());
        assert_eq!("de:1000", stops["Hbf"].id);
        assert_eq!(48.78, stops["Hbf"].latitude);
        assert_eq!("Schlossplatz", stops["Pl"].name);
        assert_eq!(9.17, stops["Pl"].longitude);
        assert!(!stops.contains_key("Late"));
    }

    #[test]
    fn stop_with_invalid_coordinate() {
        let grid = Grid::from_rows(vec![
            vec!["ident", "id", "name", "lat", "lon"],
            vec!["Hbf", "de:1000", "Hauptbahnhof", "north", "9.18"],
        ]);
        let config = StopsConfig {
            input_filename: PathBuf::from("stops.xlsx"),
            stop_identification_index: Column(1),
            stop_id_index: Column(2),
            stop_name_index: Column(3),
            stop_lat_index: Column(4),
            stop_lon_index: Column(5),
        };
        match load_stops(&grid, &config) {
            Err(Error::InvalidNumber { cell, value }) => {
                assert_eq!("D2", cell);
                assert_eq!("north", value);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    fn calendars_config() -> CalendarsConfig {
        CalendarsConfig {
            input_filename: PathBuf::from("calendars.xlsx"),
            service_identification_index: Column(1),
            monday_index: Column(2),
            tuesday_index: Column(3),
            wednesday_index: Column(4),
            thursday_index: Column(5),
            friday_index: Column(6),
            saturday_index: Column(7),
            sunday_index: Column(8),
            start_date_index: Column(9),
            end_date_index: Column(10),
            date_format: "%d.%m.%Y".to_owned(),
        }
    }

    fn calendar_grid() -> Grid {
        let mut grid = Grid::from_rows(vec![
            vec!["ident", "mo", "di", "mi", "do", "fr", "sa", "so", "start", "end"],
            vec!["Mo-Fr", "x", "x", "x", "x", "x", "", "", "01.01.2024", "31.12.2024"],
            vec!["Sa", "", "", "", "", "", "x", "-", "", ""],
        ]);
        grid.set(
            3,
            9,
            NaiveDate::from_ymd_opt(2024, 1, 6)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        );
        grid.set(3, 10, "28.12.2024");
        grid
    }

    #[test]
    fn calendars() {
        let calendars =
            load_calendars(&calendar_grid(), &calendars_config(), &mappings(), &defaults())
                .unwrap();
        let week = &calendars["Mo-Fr"];
        assert_eq!("1", week.id);
        assert!(week.monday && week.friday);
        assert!(!week.saturday && !week.sunday);
        assert_eq!(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(), week.end_date);
        let saturday = &calendars["Sa"];
        assert_eq!("2", saturday.id);
        assert!(saturday.saturday);
        assert!(!saturday.sunday);
        assert_eq!(NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(), saturday.start_date);
    }

    #[test]
    fn calendar_with_invalid_date() {
        let mut grid = calendar_grid();
        grid.set(2, 9, "2024-01-01");
        assert!(matches!(
            load_calendars(&grid, &calendars_config(), &mappings(), &defaults()),
            Err(Error::InvalidDate { .. })
        ));
    }

    #[test]
    fn exceptions_for_known_and_unknown_services() {
        let calendars =
            load_calendars(&calendar_grid(), &calendars_config(), &mappings(), &defaults())
                .unwrap();
        let grid = Grid::from_rows(vec![
            vec!["ident", "date", "type"],
            vec!["Mo-Fr", "25.12.2024", "entfall"],
            vec!["Xmas", "24.12.2024", "extra"],
            vec!["Xmas", "31.12.2024", ""],
            vec!["Mo-Fr", "26.12.2024", "entfall"],
        ]);
        let config = CalendarExceptionsConfig {
            input_filename: PathBuf::from("exceptions.xlsx"),
            service_identification_index: Column(1),
            date_index: Column(2),
            exception_type_index: Column(3),
            date_format: "%d.%m.%Y".to_owned(),
        };
        let dates =
            load_calendar_exceptions(&grid, &config, &calendars, &mappings(), &defaults())
                .unwrap();
        assert_eq!(2, dates["Mo-Fr"].len());
        assert!(dates["Mo-Fr"]
            .iter()
            .all(|d| d.service_id == "1" && d.exception_type == Exception::Deleted));
        assert_eq!(2, dates["Xmas"].len());
        assert!(dates["Xmas"]
            .iter()
            .all(|d| d.service_id == "3" && d.exception_type == Exception::Added));
    }

    #[test]
    fn routes_share_agencies_by_name() {
        let grid = Grid::from_rows(vec![
            vec!["ident", "id", "short", "long", "type", "color", "text", "agency", "url"],
            vec!["U1", "r1", "U1", "", "tram", "FF0000", "FFFFFF", "SSB", "https://ssb.de"],
            vec!["42", "r42", "42", "Bus 42", "bus", "", "", "SSB", "https://ssb.de"],
            vec!["S1", "s1", "S1", "", "", "", "", "DB", "https://db.de"],
        ]);
        let config = RoutesConfig {
            input_filename: PathBuf::from("routes.xlsx"),
            route_identification_index: Column(1),
            route_id_index: Column(2),
            route_short_name_index: Column(3),
            route_long_name_index: Column(4),
            route_type_index: Column(5),
            route_color_index: Column(6),
            route_text_color_index: Column(7),
            agency_name_index: Column(8),
            agency_url_index: Column(9),
        };
        let (agencies, routes) =
            load_agencies_and_routes(&grid, &config, &mappings(), &defaults()).unwrap();
        assert_eq!(2, agencies.len());
        assert_eq!(Some("A1".to_owned()), agencies[0].id);
        assert_eq!("Europe/Berlin", agencies[1].timezone);
        assert_eq!(RouteType::Tramway, routes["U1"].route_type);
        assert_eq!(RouteType::Bus, routes["42"].route_type);
        assert_eq!(Some("A1".to_owned()), routes["42"].agency_id);
        assert_eq!(Some("A2".to_owned()), routes["S1"].agency_id);
        assert_eq!(Some("FF0000".to_owned()), routes["U1"].route_color);
        assert_eq!(None, routes["U1"].long_name);
        assert_eq!("Bus 42", routes["42"].to_string());
    }
}
