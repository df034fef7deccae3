//! Report store: one immutable summary row per submission.
//!
//! The store is an explicitly opened handle owned by the caller; open it once,
//! submit, then [`ReportStore::close`] it. [`CsvReportStore`] appends rows to
//! a CSV file and hands out sequential ids.
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::Local;
use log::info;
use serde::{Deserialize, Serialize};

use crate::analytics::ReportData;
use crate::error::StoreError;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: u64,
    pub submitter_email: String,
    pub submission_date: String,
    pub cracking_date: String,
    pub wordlist: String,
    pub rule_set: String,
    pub hashcathelper_version: String,
    pub hashcat_version: String,
    pub accounts: usize,
    pub cracked: usize,
    pub nonunique: usize,
    pub user_equals_password: usize,
    pub lm_hash_count: usize,
    pub empty_password: usize,
    pub average_password_length: f64,
    pub largest_baseword_cluster: usize,
}

pub trait ReportStore {
    /// Persist `row`, assigning its id. Returns the id.
    fn insert(&mut self, row: Submission) -> Result<u64, StoreError>;

    fn close(self) -> Result<(), StoreError>
    where
        Self: Sized;
}

#[derive(Debug)]
pub struct CsvReportStore {
    path: PathBuf,
    writer: csv::Writer<File>,
    next_id: u64,
}

impl CsvReportStore {
    /// Open (or create) the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let unavailable = |source| StoreError::Unavailable {
            path: path.clone(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(unavailable)?;
        let is_empty = file.metadata().map_err(unavailable)?.len() == 0;

        let mut next_id = 1;
        if !is_empty {
            let mut rdr = csv::Reader::from_path(&path)?;
            for row in rdr.deserialize::<Submission>() {
                next_id = next_id.max(row?.id + 1);
            }
        }
        let writer = csv::WriterBuilder::new()
            .has_headers(is_empty)
            .from_writer(file);
        Ok(Self {
            path,
            writer,
            next_id,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All rows currently in the store, oldest first.
    pub fn rows(&mut self) -> Result<Vec<Submission>, StoreError> {
        self.writer.flush()?;
        let mut rdr = csv::Reader::from_path(&self.path)?;
        let rows = rdr.deserialize().collect::<Result<Vec<Submission>, _>>()?;
        Ok(rows)
    }
}

impl ReportStore for CsvReportStore {
    fn insert(&mut self, mut row: Submission) -> Result<u64, StoreError> {
        row.id = self.next_id;
        self.writer.serialize(&row)?;
        self.writer.flush()?;
        self.next_id += 1;
        Ok(row.id)
    }

    fn close(mut self) -> Result<(), StoreError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Store a summary of `data` and return the new record id.
pub fn submit<S: ReportStore>(
    store: &mut S,
    submitter_email: &str,
    wordlist: &str,
    rule_set: &str,
    hashcat_version: &str,
    data: &ReportData,
) -> Result<u64, StoreError> {
    let row = Submission {
        id: 0,
        submitter_email: submitter_email.to_string(),
        submission_date: Local::now().format(DATE_FORMAT).to_string(),
        cracking_date: data.timestamp.format(DATE_FORMAT).to_string(),
        wordlist: wordlist.to_string(),
        rule_set: rule_set.to_string(),
        hashcathelper_version: env!("CARGO_PKG_VERSION").to_string(),
        hashcat_version: hashcat_version.to_string(),
        accounts: data.accounts,
        cracked: data.cracked,
        nonunique: data.nonunique,
        user_equals_password: data.user_equals_password,
        lm_hash_count: data.lm_hash_count,
        empty_password: data.empty_password,
        average_password_length: data.average_password_length,
        largest_baseword_cluster: data.largest_baseword_cluster,
    };
    let id = store.insert(row)?;
    info!("submitted report {} for {}", id, submitter_email);
    Ok(id)
}
