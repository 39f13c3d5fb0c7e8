//! Resolution of raw spreadsheet tokens into GTFS ids.

use crate::objects::{Agency, Calendar, CalendarDate, Id, Route, Stop};
use std::collections::HashMap;
use std::fmt;

/// Which lookup table a token was searched in
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LookupCategory {
    Stop,
    Route,
    Service,
}

impl fmt::Display for LookupCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LookupCategory::Stop => write!(f, "stop"),
            LookupCategory::Route => write!(f, "route"),
            LookupCategory::Service => write!(f, "service"),
        }
    }
}

/// A token that was not found in its lookup table and was used as id verbatim
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Unresolved {
    pub category: LookupCategory,
    pub token: String,
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} identification '{}'", self.category, self.token)
    }
}

/// Outcome of a lookup: the canonical id, or the raw token as fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(String),
    Fallback(Unresolved),
}

impl Resolution {
    pub fn id(&self) -> &str {
        match self {
            Resolution::Resolved(id) => id,
            Resolution::Fallback(unresolved) => &unresolved.token,
        }
    }

    pub fn into_id(self) -> String {
        match self {
            Resolution::Resolved(id) => id,
            Resolution::Fallback(unresolved) => unresolved.token,
        }
    }

    pub fn unresolved(&self) -> Option<&Unresolved> {
        match self {
            Resolution::Resolved(_) => None,
            Resolution::Fallback(unresolved) => Some(unresolved),
        }
    }
}

/// Looks a token up in a table keyed by raw spreadsheet tokens
///
/// A missing token is not an error: it is logged and returned unchanged.
pub fn resolve<O: Id>(token: &str, table: &HashMap<String, O>, category: LookupCategory) -> Resolution {
    match lookup(token, table) {
        Some(id) => Resolution::Resolved(id),
        None => fallback(token, category),
    }
}

fn lookup<O: Id>(token: &str, table: &HashMap<String, O>) -> Option<String> {
    table.get(token).map(|o| o.id().to_owned())
}

fn fallback(token: &str, category: LookupCategory) -> Resolution {
    warn!(
        "{} identification '{}' not found in {} metadata. Using {} identification as {}_id fallback.",
        category, token, category, category, category
    );
    Resolution::Fallback(Unresolved {
        category,
        token: token.to_owned(),
    })
}

/// Metadata tables, keyed by the tokens used in the timetable sheets
#[derive(Debug, Default, Clone)]
pub struct Lookups {
    pub stops: HashMap<String, Stop>,
    pub calendars: HashMap<String, Calendar>,
    /// Exceptions per service token, including services that only run on exception dates
    pub calendar_dates: HashMap<String, Vec<CalendarDate>>,
    pub routes: HashMap<String, Route>,
    pub agencies: Vec<Agency>,
}

impl Lookups {
    pub fn resolve_stop(&self, token: &str) -> Resolution {
        resolve(token, &self.stops, LookupCategory::Stop)
    }

    pub fn resolve_route(&self, token: &str) -> Resolution {
        resolve(token, &self.routes, LookupCategory::Route)
    }

    /// Calendars first, then exception-only services
    pub fn resolve_service(&self, token: &str) -> Resolution {
        let exception_only = || {
            self.calendar_dates
                .get(token)
                .and_then(|dates| dates.first())
                .map(|date| date.service_id.clone())
        };
        match lookup(token, &self.calendars).or_else(exception_only) {
            Some(id) => Resolution::Resolved(id),
            None => fallback(token, LookupCategory::Service),
        }
    }
}
