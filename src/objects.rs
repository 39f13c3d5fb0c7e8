use crate::serde_helpers::*;
use chrono::NaiveDate;
use serde::ser::Serializer;
use std::fmt;

/// Objects that can be found in a lookup table by their GTFS id
pub trait Id {
    fn id(&self) -> &str;
}

/// Stops read from spreadsheets are always boarding points
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LocationType {
    StopPoint = 0,
}

impl Default for LocationType {
    fn default() -> LocationType {
        LocationType::StopPoint
    }
}

impl serde::Serialize for LocationType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(*self as u8)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RouteType {
    Tramway,
    Subway,
    Rail,
    Bus,
    Ferry,
    CableCar,
    Gondola,
    Funicular,
    // Any other value than 0..7 is invalid in the GTFS
    // but some producers use the extended route types
    Other(u16),
}

impl Default for RouteType {
    fn default() -> RouteType {
        RouteType::Bus
    }
}

impl From<u16> for RouteType {
    fn from(i: u16) -> RouteType {
        match i {
            0 => RouteType::Tramway,
            1 => RouteType::Subway,
            2 => RouteType::Rail,
            3 => RouteType::Bus,
            4 => RouteType::Ferry,
            5 => RouteType::CableCar,
            6 => RouteType::Gondola,
            7 => RouteType::Funicular,
            _ => RouteType::Other(i),
        }
    }
}

impl From<RouteType> for u16 {
    fn from(t: RouteType) -> u16 {
        match t {
            RouteType::Tramway => 0,
            RouteType::Subway => 1,
            RouteType::Rail => 2,
            RouteType::Bus => 3,
            RouteType::Ferry => 4,
            RouteType::CableCar => 5,
            RouteType::Gondola => 6,
            RouteType::Funicular => 7,
            RouteType::Other(i) => i,
        }
    }
}

impl serde::Serialize for RouteType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u16(u16::from(*self))
    }
}

#[derive(Debug, Serialize, Default, Clone, PartialEq)]
pub struct Agency {
    #[serde(rename = "agency_name")]
    pub name: String,
    #[serde(rename = "agency_url")]
    pub url: String,
    #[serde(rename = "agency_timezone")]
    pub timezone: String,
    #[serde(rename = "agency_id")]
    pub id: Option<String>,
    #[serde(rename = "agency_lang")]
    pub lang: Option<String>,
    #[serde(rename = "agency_phone")]
    pub phone: Option<String>,
    #[serde(rename = "agency_fare_url")]
    pub fare_url: Option<String>,
}

#[derive(Debug, Serialize, Default, Clone, PartialEq)]
pub struct Route {
    #[serde(rename = "route_id")]
    pub id: String,
    pub route_type: RouteType,
    pub agency_id: Option<String>,
    #[serde(rename = "route_short_name")]
    pub short_name: Option<String>,
    #[serde(rename = "route_long_name")]
    pub long_name: Option<String>,
    #[serde(rename = "route_desc")]
    pub desc: Option<String>,
    #[serde(rename = "route_url")]
    pub url: Option<String>,
    pub route_color: Option<String>,
    pub route_text_color: Option<String>,
}

impl Id for Route {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.long_name, &self.short_name) {
            (Some(long_name), _) if !long_name.is_empty() => write!(f, "{}", long_name),
            (_, Some(short_name)) => write!(f, "{}", short_name),
            _ => write!(f, "{}", self.id),
        }
    }
}

#[derive(Debug, Serialize, Default, Clone, PartialEq)]
pub struct Stop {
    #[serde(rename = "stop_id")]
    pub id: String,
    #[serde(rename = "stop_name")]
    pub name: String,
    #[serde(rename = "stop_lat")]
    pub latitude: f64,
    #[serde(rename = "stop_lon")]
    pub longitude: f64,
    #[serde(rename = "stop_code")]
    pub code: Option<String>,
    #[serde(rename = "stop_desc")]
    pub description: Option<String>,
    pub zone_id: Option<String>,
    #[serde(rename = "stop_url")]
    pub url: Option<String>,
    pub location_type: LocationType,
    pub parent_station: Option<String>,
    pub wheelchair_boarding: Option<u8>,
}

impl Id for Stop {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Calendar {
    #[serde(rename = "service_id")]
    pub id: String,
    #[serde(serialize_with = "serialize_bool")]
    pub monday: bool,
    #[serde(serialize_with = "serialize_bool")]
    pub tuesday: bool,
    #[serde(serialize_with = "serialize_bool")]
    pub wednesday: bool,
    #[serde(serialize_with = "serialize_bool")]
    pub thursday: bool,
    #[serde(serialize_with = "serialize_bool")]
    pub friday: bool,
    #[serde(serialize_with = "serialize_bool")]
    pub saturday: bool,
    #[serde(serialize_with = "serialize_bool")]
    pub sunday: bool,
    #[serde(serialize_with = "serialize_date")]
    pub start_date: NaiveDate,
    #[serde(serialize_with = "serialize_date")]
    pub end_date: NaiveDate,
}

impl Id for Calendar {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Exception {
    Added,
    Deleted,
}

impl Exception {
    /// The `exception_type` code of calendar_dates.txt
    pub fn from_code(code: u8) -> Option<Exception> {
        match code {
            1 => Some(Exception::Added),
            2 => Some(Exception::Deleted),
            _ => None,
        }
    }
}

impl serde::Serialize for Exception {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(match self {
            Exception::Added => 1,
            Exception::Deleted => 2,
        })
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CalendarDate {
    pub service_id: String,
    #[serde(serialize_with = "serialize_date")]
    pub date: NaiveDate,
    pub exception_type: Exception,
}

#[derive(Debug, Serialize, Default, Clone, PartialEq)]
pub struct Trip {
    #[serde(rename = "trip_id")]
    pub id: String,
    pub route_id: String,
    pub service_id: String,
    pub trip_headsign: Option<String>,
    pub trip_short_name: Option<String>,
    pub direction_id: Option<u8>,
    pub block_id: Option<String>,
    pub shape_id: Option<String>,
    pub wheelchair_accessible: Option<u8>,
    pub bikes_allowed: Option<u8>,
}


#[derive(Debug, Serialize, Default, Clone, PartialEq)]
pub struct StopTime {
    pub trip_id: String,
    pub arrival_time: String,
    pub departure_time: String,
    pub stop_id: String,
    pub stop_sequence: u16,
    pub stop_headsign: Option<String>,
    pub pickup_type: Option<u8>,
    pub drop_off_type: Option<u8>,
    pub shape_dist_traveled: Option<f32>,
    pub timepoint: Option<u8>,
}
