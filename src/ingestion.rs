use crate::error::Result;
use crate::schema::Transaction;
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

/// Reads transactions from CSV with a header row. Columns beyond
/// `client_id, date, amount, mcc` are ignored.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut transactions = Vec::new();
    for record in csv_reader.deserialize() {
        transactions.push(record?);
    }
    debug!("Read {} transactions", transactions.len());
    Ok(transactions)
}

pub fn load_transactions(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    read_transactions(File::open(path)?)
}

/// Writes any result table as CSV, using the serialized column names as headers.
pub fn write_table<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Read-only lookup from merchant category code to display name.
pub trait CategoryLookup {
    fn category_name(&self, code: &str) -> Option<String>;
}

impl CategoryLookup for HashMap<String, String> {
    fn category_name(&self, code: &str) -> Option<String> {
        self.get(code).cloned()
    }
}

impl CategoryLookup for BTreeMap<String, String> {
    fn category_name(&self, code: &str) -> Option<String> {
        self.get(code).cloned()
    }
}

/// Merchant category codes keyed by their string form, e.g. `"5411"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MccCatalog {
    names: BTreeMap<String, String>,
}

impl MccCatalog {
    pub fn new(names: BTreeMap<String, String>) -> Self {
        Self { names }
    }

    /// Parses a JSON object of `code -> name` pairs.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let names: BTreeMap<String, String> = serde_json::from_str(raw)?;
        Ok(Self::new(names))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl CategoryLookup for MccCatalog {
    fn category_name(&self, code: &str) -> Option<String> {
        self.names.get(code).cloned()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for MccCatalog {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(code, name)| (code.to_string(), name.to_string()))
                .collect(),
        )
    }
}
