use crate::cursor::Orientation;
use thiserror::Error;

/// An error that can occur when converting spreadsheet timetables.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cound not find file {0}")]
    MissingFile(String),
    #[error("'{0}' is not a valid cell reference")]
    InvalidCellReference(String),
    #[error("'{0}' is not a valid column name")]
    InvalidColumn(String),
    #[error("the {0} layout is not supported for trip assembly")]
    UnsupportedLayout(Orientation),
    #[error("column {column} was already assembled into a trip")]
    TripColumnRevisited { column: u32 },
    #[error("trip {trip_id} has more stops than a stop_sequence can number")]
    TooManyStops { trip_id: String },
    #[error("'{value}' in cell {cell} is not a valid date for format '{format}'")]
    InvalidDate {
        cell: String,
        value: String,
        format: String,
    },
    #[error("'{value}' in cell {cell} is not a valid number")]
    InvalidNumber { cell: String, value: String },
    #[error("{0} is not a valid calendar exception type")]
    InvalidExceptionType(u8),
    #[error("no records provided for table {0}")]
    EmptyTable(String),
    #[error("the workbook '{0}' has no worksheet")]
    EmptyWorkbook(String),
    #[error("impossible to read file")]
    IO(#[from] std::io::Error),
    #[error("impossible to read '{file_name}'")]
    NamedFileIO {
        file_name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("impossible to read spreadsheet '{file_name}'")]
    Spreadsheet {
        file_name: String,
        #[source]
        source: calamine::Error,
    },
    #[error("impossible to write csv file '{file_name}'")]
    CSVError {
        file_name: String,
        #[source]
        source: csv::Error,
    },
    #[error("invalid configuration")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}
