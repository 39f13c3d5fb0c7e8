use crate::Error;
use serde::Serialize;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::CompressionMethod;

/// A GTFS feed being written: named csv tables, serialized in insertion order
///
/// ```
/// use x2gtfs::{Feed, Trip};
///
/// let mut feed = Feed::default();
/// let trips = vec![Trip { id: "000001".to_owned(), ..Trip::default() }];
/// feed.add_table("trips.txt", &trips).unwrap();
/// assert_eq!(vec!["trips.txt"], feed.table_names());
/// assert!(feed.add_table::<Trip>("stop_times.txt", &[]).is_err());
/// ```
#[derive(Debug, Default)]
pub struct Feed {
    tables: Vec<(String, Vec<u8>)>,
}

impl Feed {
    /// Serializes the records as a csv table with a header row
    ///
    /// Adding a table with the name of an existing one replaces it.
    pub fn add_table<T: Serialize>(&mut self, file_name: &str, records: &[T]) -> Result<(), Error> {
        if records.is_empty() {
            return Err(Error::EmptyTable(file_name.to_owned()));
        }
        let mk_err = |source| Error::CSVError {
            file_name: file_name.to_owned(),
            source,
        };
        let mut writer = csv::Writer::from_writer(vec![]);
        for record in records {
            writer.serialize(record).map_err(mk_err)?;
        }
        let data = writer
            .into_inner()
            .map_err(|e| mk_err(csv::Error::from(e.into_error())))?;

        match self.tables.iter_mut().find(|(name, _)| name == file_name) {
            Some((_, table)) => *table = data,
            None => self.tables.push((file_name.to_owned(), data)),
        }
        trace!("{}: {} records", file_name, records.len());
        Ok(())
    }

    /// Like [Feed::add_table], but an empty table is skipped
    pub fn add_optional_table<T: Serialize>(
        &mut self,
        file_name: &str,
        records: &[T],
    ) -> Result<(), Error> {
        if records.is_empty() {
            info!("no records for {}, table skipped", file_name);
            return Ok(());
        }
        self.add_table(file_name, records)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn table(&self, file_name: &str) -> Option<&[u8]> {
        self.tables
            .iter()
            .find(|(name, _)| name == file_name)
            .map(|(_, data)| data.as_slice())
    }

    /// Writes every table as a deflated entry of a zip archive
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<(), Error> {
        let mut zip = zip::ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, data) in &self.tables {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }
        zip.finish()?;
        Ok(())
    }

    /// Writes the zip archive to a file, replacing it if it exists
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let p = path.as_ref();
        let file = File::create(p).map_err(|e| Error::NamedFileIO {
            file_name: format!("{}", p.display()),
            source: e,
        })?;
        self.write_to(file)?;
        info!("GTFS feed written to {}", p.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Calendar, CalendarDate, Exception};
    use chrono::NaiveDate;
    use std::io::{Cursor, Read};

    fn calendar(id: &str) -> Calendar {
        Calendar {
            id: id.to_owned(),
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: false,
            sunday: false,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        }
    }

    #[test]
    fn calendar_table() {
        let mut feed = Feed::default();
        feed.add_table("calendar.txt", &[calendar("1")]).unwrap();
        assert_eq!(
            "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n\
             1,1,1,1,1,1,0,0,20240101,20241231\n",
            String::from_utf8_lossy(feed.table("calendar.txt").unwrap())
        );
    }

    #[test]
    fn replaced_table_keeps_its_position() {
        let mut feed = Feed::default();
        feed.add_table("calendar.txt", &[calendar("1")]).unwrap();
        let dates = vec![CalendarDate {
            service_id: "1".to_owned(),
            date: NaiveDate::from_ymd_opt(2024, 12, 25).unwrap(),
            exception_type: Exception::Deleted,
        }];
        feed.add_table("calendar_dates.txt", &dates).unwrap();
        feed.add_table("calendar.txt", &[calendar("2")]).unwrap();
        assert_eq!(vec!["calendar.txt", "calendar_dates.txt"], feed.table_names());
        assert!(String::from_utf8_lossy(feed.table("calendar.txt").unwrap()).contains("\n2,"));
        assert_eq!(
            "service_id,date,exception_type\n1,20241225,2\n",
            String::from_utf8_lossy(feed.table("calendar_dates.txt").unwrap())
        );
    }

    #[test]
    fn empty_tables() {
        let mut feed = Feed::default();
        assert!(matches!(
            feed.add_table::<Calendar>("calendar.txt", &[]),
            Err(Error::EmptyTable(name)) if name == "calendar.txt"
        ));
        feed.add_optional_table::<Calendar>("calendar.txt", &[]).unwrap();
        assert!(feed.table_names().is_empty());
    }

    #[test]
    fn zip_archive() {
        let mut feed = Feed::default();
        feed.add_table("calendar.txt", &[calendar("1")]).unwrap();
        let mut buffer = Cursor::new(Vec::new());
        feed.write_to(&mut buffer).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(buffer.into_inner())).unwrap();
        assert_eq!(1, archive.len());
        let mut file = archive.by_name("calendar.txt").unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        assert!(content.starts_with("service_id,monday"));
    }
}
