//! Appending entries into matrix cells.
//!
//! A submit names a row, a column and a title. The target cell is coerced
//! into its canonical list form (see [`Cell::into_items`]) and a new
//! [`Entry`] is appended to it. Rows are never created here: an unknown
//! identifier is rejected.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{MatrixError, Result};
use crate::matrix::{Cell, Column, Dataset, Entry};
use crate::saving::DataStore;

pub const INVALID_FIELDS: &str = "Missing or invalid fields";

/// Body of a submit request as sent by the front-end.
///
/// `tactic` is what older clients send instead of `tacticId`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub tactic_id: Option<String>,
    pub tactic: Option<String>,
    pub column: Option<String>,
    pub entry: Option<String>,
    pub description: Option<String>,
}

/// A submit request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    pub tactic_id: String,
    pub column: Column,
    pub title: String,
    pub description: String,
}

/// Result of a successful append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub entry: Entry,
    pub message: String,
}

impl SubmitRequest {
    /// Parse a request body. Only a JSON object is accepted; serde would
    /// otherwise also read the struct from an array of its fields.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let invalid = || MatrixError::Validation(INVALID_FIELDS.to_string());
        match serde_json::from_slice::<Value>(body).map_err(|_| invalid())? {
            object @ Value::Object(_) => serde_json::from_value(object).map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }

    pub fn validate(&self) -> Result<ValidSubmission> {
        let tactic_id = non_empty(self.tactic_id.as_deref()).or(non_empty(self.tactic.as_deref()));
        let column = self
            .column
            .as_deref()
            .and_then(|key| key.parse::<Column>().ok());
        let title = self.entry.as_deref().unwrap_or_default().trim();

        match (tactic_id, column) {
            (Some(tactic_id), Some(column)) if !title.is_empty() => Ok(ValidSubmission {
                tactic_id: tactic_id.to_string(),
                column,
                title: title.to_string(),
                description: self
                    .description
                    .as_deref()
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
            }),
            _ => Err(MatrixError::Validation(INVALID_FIELDS.to_string())),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Append the submitted entry to its cell inside `dataset`.
///
/// On error the dataset is left untouched.
pub fn submit_entry(dataset: &mut Dataset, submission: &ValidSubmission) -> Result<SubmitOutcome> {
    let row = dataset
        .find_row_mut(&submission.tactic_id)
        .ok_or_else(|| {
            MatrixError::NotFound(format!("Tactic id not found: {}", submission.tactic_id))
        })?;

    let entry = Entry::new(&submission.title, &submission.description);
    row.push_entry(submission.column, entry.clone());

    let subject = row.tactic().unwrap_or(submission.tactic_id.as_str());
    let message = format!(
        "Added \"{}\" under {} for {}.",
        submission.title,
        submission.column.label(),
        subject
    );

    Ok(SubmitOutcome { entry, message })
}

/// Validate, load, append and persist in one go.
///
/// Nothing is written when validation or the row lookup fails.
pub fn append_entry(store: &dyn DataStore, request: &SubmitRequest) -> Result<SubmitOutcome> {
    let submission = request.validate()?;
    let mut dataset = store.load()?;
    let outcome = submit_entry(&mut dataset, &submission)?;
    store.save(&dataset)?;
    Ok(outcome)
}

/// Number of items the cell would hold once coerced, without changing it.
pub fn cell_len(dataset: &Dataset, tactic_id: &str, column: Column) -> Option<usize> {
    dataset
        .find_row(tactic_id)
        .map(|row| match row.cell(column) {
            Cell::Empty => 0,
            Cell::List(items) => items.len(),
            Cell::Text(_) | Cell::Other(_) => 1,
        })
}
