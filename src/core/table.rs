use crate::domain::model::{CleanStat, SeasonStat, StatDescription, StatLink};
use crate::utils::error::{EtlError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A record with a fixed CSV column set. The header is written even for empty tables.
pub trait CsvRecord: Serialize + DeserializeOwned {
    const HEADERS: &'static [&'static str];
}

impl CsvRecord for StatLink {
    const HEADERS: &'static [&'static str] = &["master", "stat", "stat_link"];
}

impl CsvRecord for StatDescription {
    const HEADERS: &'static [&'static str] =
        &["year", "stat_name", "link", "category", "description"];
}

impl CsvRecord for SeasonStat {
    const HEADERS: &'static [&'static str] = &[
        "year",
        "category",
        "type",
        "stat_name",
        "link",
        "description",
        "rank",
        "athlete",
        "stat1_name",
        "stat1",
        "stat2_name",
        "stat2",
        "stat3_name",
        "stat3",
        "stat4_name",
        "stat4",
        "stat5_name",
        "stat5",
        "stat6_name",
        "stat6",
        "stat7_name",
        "stat7",
    ];
}

impl CsvRecord for CleanStat {
    const HEADERS: &'static [&'static str] = &[
        "year",
        "category",
        "type",
        "stat_name",
        "link",
        "description",
        "rank",
        "athlete",
        "stat",
        "value",
    ];
}

pub fn to_csv_bytes<T: CsvRecord>(records: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(T::HEADERS)?;
    for record in records {
        writer.serialize(record)?;
    }

    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

pub fn from_csv_bytes<T: CsvRecord>(data: &[u8]) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data);

    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}
