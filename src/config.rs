//! Typed configuration, read once from a YAML document.
//!
//! ```yaml
//! config:
//!   timetables:
//!     input_directory: timetables/
//!     layout_type: vertical
//!     data_start_area: B3
//!     stop_identification_index: A
//!     route_identification_index: 1
//!     # ...
//!   metadata:
//!     stops: { input_filename: stops.xlsx, stop_identification_index: A, ... }
//!   defaults:
//!     agency_timezone: Europe/Berlin
//! ```

use crate::cursor::Orientation;
use crate::grid::{CellCoord, Column};
use crate::Error;
use chrono::format::{Item, StrftimeItems};
use config::{Config, ConfigError, FileFormat};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct ConfigDocument {
    config: Configuration,
}

/// The whole conversion configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Configuration {
    pub timetables: TimetableLayout,
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub mappings: Mappings,
    pub defaults: Defaults,
}

/// Physical layout of the timetable sheets
#[derive(Debug, Deserialize, Clone)]
pub struct TimetableLayout {
    pub input_directory: PathBuf,
    #[serde(default, rename = "layout_type")]
    pub orientation: Orientation,
    /// Marks a stop the vehicle passes without stopping
    #[serde(default = "default_run_through_char")]
    pub run_through_char: String,
    #[serde(default = "default_time_format")]
    pub time_format: String,
    /// First cell of the time block
    #[serde(rename = "data_start_area")]
    pub start: CellCoord,
    /// Column holding the stop identification of each row
    #[serde(rename = "stop_identification_index")]
    pub stop_column: Column,
    #[serde(rename = "route_identification_index")]
    pub route_row: u32,
    #[serde(rename = "service_identification_index")]
    pub service_row: u32,
    #[serde(rename = "shape_identification_index")]
    pub shape_row: u32,
    #[serde(rename = "trip_short_name_index")]
    pub trip_short_name_row: u32,
    #[serde(rename = "trip_headsign_index")]
    pub trip_headsign_row: u32,
}

fn default_run_through_char() -> String {
    "$".to_owned()
}

fn default_time_format() -> String {
    "%H:%M:%S".to_owned()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_owned()
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetadataConfig {
    pub stops: StopsConfig,
    pub calendars: CalendarsConfig,
    /// Not every feed has exceptions
    pub calendar_exceptions: Option<CalendarExceptionsConfig>,
    pub routes: RoutesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StopsConfig {
    pub input_filename: PathBuf,
    pub stop_identification_index: Column,
    pub stop_id_index: Column,
    pub stop_name_index: Column,
    pub stop_lat_index: Column,
    pub stop_lon_index: Column,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CalendarsConfig {
    pub input_filename: PathBuf,
    pub service_identification_index: Column,
    pub monday_index: Column,
    pub tuesday_index: Column,
    pub wednesday_index: Column,
    pub thursday_index: Column,
    pub friday_index: Column,
    pub saturday_index: Column,
    pub sunday_index: Column,
    pub start_date_index: Column,
    pub end_date_index: Column,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CalendarExceptionsConfig {
    pub input_filename: PathBuf,
    pub service_identification_index: Column,
    pub date_index: Column,
    pub exception_type_index: Column,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoutesConfig {
    pub input_filename: PathBuf,
    pub route_identification_index: Column,
    pub route_id_index: Column,
    pub route_short_name_index: Column,
    pub route_long_name_index: Column,
    pub route_type_index: Column,
    pub route_color_index: Column,
    pub route_text_color_index: Column,
    pub agency_name_index: Column,
    pub agency_url_index: Column,
}

/// Translations of spreadsheet values into GTFS codes
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Mappings {
    #[serde(default)]
    pub calendar_day_types: HashMap<String, u8>,
    #[serde(default)]
    pub calendar_exception_types: HashMap<String, u8>,
    #[serde(default)]
    pub route_type: HashMap<String, u16>,
}

/// Templates of generated ids and values missing from the spreadsheets
#[derive(Debug, Deserialize, Clone)]
pub struct Defaults {
    #[serde(default = "default_trip_id")]
    pub trip_id: String,
    #[serde(default = "default_service_id")]
    pub service_id: String,
    #[serde(default = "default_agency_id")]
    pub agency_id: String,
    pub agency_timezone: String,
}

fn default_trip_id() -> String {
    "{trip_id}".to_owned()
}

fn default_service_id() -> String {
    "{service_id}".to_owned()
}

fn default_agency_id() -> String {
    "{agency_id}".to_owned()
}

const TRIP_ID_WIDTH: usize = 6;

impl Defaults {
    /// Id of the n-th trip (1-based), left padded with zeros
    pub fn trip_id(&self, n: usize) -> String {
        let id = fill_template(&self.trip_id, "trip_id", n);
        format!("{:0>width$}", id, width = TRIP_ID_WIDTH)
    }

    /// Id of the n-th service (1-based)
    pub fn service_id(&self, n: usize) -> String {
        fill_template(&self.service_id, "service_id", n)
    }

    /// Id of the n-th agency (1-based)
    pub fn agency_id(&self, n: usize) -> String {
        fill_template(&self.agency_id, "agency_id", n)
    }
}

fn fill_template(template: &str, placeholder: &str, n: usize) -> String {
    template.replace(&format!("{{{}}}", placeholder), &n.to_string())
}

impl Configuration {
    /// Reads and validates a YAML configuration file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::MissingFile(format!("{}", path.display())));
        }
        Self::from_source(config::File::new(&path.to_string_lossy(), FileFormat::Yaml))
    }

    /// Reads and validates a YAML configuration document
    pub fn from_yaml_str(document: &str) -> Result<Self, Error> {
        Self::from_source(config::File::from_str(document, FileFormat::Yaml))
    }

    fn from_source<S>(source: S) -> Result<Self, Error>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let document: ConfigDocument = Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;
        document.config.validate()?;
        Ok(document.config)
    }

    /// Checks what serde cannot: formats and header rows
    pub fn validate(&self) -> Result<(), Error> {
        let layout = &self.timetables;
        check_format("config.timetables.time_format", &layout.time_format)?;
        check_format(
            "config.metadata.calendars.date_format",
            &self.metadata.calendars.date_format,
        )?;
        if let Some(exceptions) = &self.metadata.calendar_exceptions {
            check_format(
                "config.metadata.calendar_exceptions.date_format",
                &exceptions.date_format,
            )?;
        }
        for (key, row) in &[
            ("route_identification_index", layout.route_row),
            ("service_identification_index", layout.service_row),
            ("shape_identification_index", layout.shape_row),
            ("trip_short_name_index", layout.trip_short_name_row),
            ("trip_headsign_index", layout.trip_headsign_row),
        ] {
            if *row == 0 {
                return Err(invalid(format!(
                    "config.timetables.{}: rows start at 1",
                    key
                )));
            }
        }
        Ok(())
    }
}

fn check_format(key: &str, format: &str) -> Result<(), Error> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        Err(invalid(format!("{}: invalid format '{}'", key, format)))
    } else {
        Ok(())
    }
}

fn invalid(message: String) -> Error {
    Error::Config(ConfigError::Message(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
config:
  timetables:
    input_directory: timetables
    data_start_area: C5
    stop_identification_index: A
    route_identification_index: 1
    service_identification_index: 2
    shape_identification_index: 3
    trip_short_name_index: 4
    trip_headsign_index: 5
  metadata:
    stops:
      input_filename: stops.xlsx
      stop_identification_index: A
      stop_id_index: B
      stop_name_index: C
      stop_lat_index: D
      stop_lon_index: E
    calendars:
      input_filename: calendars.xlsx
      service_identification_index: A
      monday_index: B
      tuesday_index: C
      wednesday_index: D
      thursday_index: E
      friday_index: F
      saturday_index: G
      sunday_index: H
      start_date_index: I
      end_date_index: J
    routes:
      input_filename: routes.xlsx
      route_identification_index: A
      route_id_index: B
      route_short_name_index: C
      route_long_name_index: D
      route_type_index: E
      route_color_index: F
      route_text_color_index: G
      agency_name_index: H
      agency_url_index: I
  defaults:
    agency_timezone: Europe/Berlin
"#;

    #[test]
    fn documented_defaults() {
        let config = Configuration::from_yaml_str(MINIMAL).unwrap();
        let layout = &config.timetables;
        assert_eq!(Orientation::Vertical, layout.orientation);
        assert_eq!("$", layout.run_through_char);
        assert_eq!("%H:%M:%S", layout.time_format);
        assert_eq!(CellCoord::new(5, 3), layout.start);
        assert_eq!(Column(1), layout.stop_column);
        assert_eq!(4, layout.trip_short_name_row);
        assert_eq!("%Y-%m-%d", config.metadata.calendars.date_format);
        assert!(config.metadata.calendar_exceptions.is_none());
        assert!(config.mappings.route_type.is_empty());
        assert_eq!("000001", config.defaults.trip_id(1));
        assert_eq!("7", config.defaults.service_id(7));
    }

    #[test]
    fn missing_required_key() {
        let document = MINIMAL.replace("    data_start_area: C5\n", "");
        assert!(matches!(
            Configuration::from_yaml_str(&document),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn invalid_cell_reference() {
        let document = MINIMAL.replace("data_start_area: C5", "data_start_area: 5C");
        assert!(Configuration::from_yaml_str(&document).is_err());
    }

    #[test]
    fn invalid_time_format() {
        let document = MINIMAL.replace(
            "    data_start_area: C5\n",
            "    data_start_area: C5\n    time_format: \"%H:%\"\n",
        );
        assert!(matches!(
            Configuration::from_yaml_str(&document),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn horizontal_layout_is_parsed() {
        let document = MINIMAL.replace(
            "    data_start_area: C5\n",
            "    data_start_area: C5\n    layout_type: horizontal\n",
        );
        let config = Configuration::from_yaml_str(&document).unwrap();
        assert_eq!(Orientation::Horizontal, config.timetables.orientation);
    }

    #[test]
    fn id_templates() {
        let defaults = Defaults {
            trip_id: "T{trip_id}".to_owned(),
            service_id: "S-{service_id}".to_owned(),
            agency_id: "{agency_id}".to_owned(),
            agency_timezone: "UTC".to_owned(),
        };
        assert_eq!("0000T3", defaults.trip_id(3));
        assert_eq!("S-12", defaults.service_id(12));
        assert_eq!("2", defaults.agency_id(2));
    }

    #[test]
    fn read_fixture() {
        let config = Configuration::from_path("fixtures/config.yml").unwrap();
        assert_eq!(Some(&1), config.mappings.calendar_day_types.get("x"));
        assert_eq!(Some(&2), config.mappings.calendar_exception_types.get("entfall"));
        assert_eq!(Some(&0), config.mappings.route_type.get("tram"));
        assert!(config.metadata.calendar_exceptions.is_some());
        assert!(Configuration::from_path("fixtures/missing.yml").is_err());
    }
}
