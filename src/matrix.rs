use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::MatrixError;

lazy_static! {
    static ref NON_SLUG_RUN: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Derive an identifier-safe slug from a title.
///
/// The title is lowercased, every run of characters outside `[a-z0-9]`
/// collapses into one hyphen, and hyphens at either end are dropped.
/// Equal titles give equal slugs; nothing makes them unique.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    NON_SLUG_RUN
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// The seven architecture layers a tactic can be mapped onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Social,
    Application,
    Decision,
    Middleware,
    Data,
    Sensing,
    Physical,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Social,
        Column::Application,
        Column::Decision,
        Column::Middleware,
        Column::Data,
        Column::Sensing,
        Column::Physical,
    ];

    /// Key under which the column is stored in a row.
    pub fn key(self) -> &'static str {
        match self {
            Column::Social => "social",
            Column::Application => "application",
            Column::Decision => "decision",
            Column::Middleware => "middleware",
            Column::Data => "data",
            Column::Sensing => "sensing",
            Column::Physical => "physical",
        }
    }

    /// Human readable layer name.
    pub fn label(self) -> &'static str {
        match self {
            Column::Social => "Social Interface",
            Column::Application => "Application",
            Column::Decision => "Decision-making",
            Column::Middleware => "Middleware",
            Column::Data => "Data Processing",
            Column::Sensing => "Sensing & Perception",
            Column::Physical => "Physical",
        }
    }
}

impl FromStr for Column {
    type Err = MatrixError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|column| column.key() == key)
            .ok_or_else(|| MatrixError::Validation(format!("Unknown column: {}", key)))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A structured item inside a cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Entry {
    pub id: String,
    pub title: String,
    pub description: String,
    pub notes: String,
}

impl Entry {
    pub fn new(title: &str, description: &str) -> Self {
        Entry {
            id: slugify(title),
            title: title.to_string(),
            description: description.to_string(),
            notes: String::new(),
        }
    }
}

impl From<Entry> for Value {
    fn from(entry: Entry) -> Self {
        let mut object = Map::new();
        object.insert("id".to_string(), Value::String(entry.id));
        object.insert("title".to_string(), Value::String(entry.title));
        object.insert("description".to_string(), Value::String(entry.description));
        object.insert("notes".to_string(), Value::String(entry.notes));
        Value::Object(object)
    }
}

/// One element of a list cell.
///
/// Lists written by older front-ends may hold plain strings, and hand
/// edited files may hold anything; such items are carried through untouched.
#[derive(Clone, Debug, PartialEq)]
pub enum CellItem {
    Entry(Entry),
    Text(String),
    Raw(Value),
}

impl CellItem {
    pub fn title(&self) -> Option<&str> {
        match self {
            CellItem::Entry(entry) => Some(&entry.title),
            CellItem::Text(text) => Some(text),
            CellItem::Raw(_) => None,
        }
    }
}

impl From<Value> for CellItem {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => CellItem::Text(text),
            Value::Object(_) => match serde_json::from_value::<Entry>(value.clone()) {
                Ok(entry) => CellItem::Entry(entry),
                Err(_) => CellItem::Raw(value),
            },
            other => CellItem::Raw(other),
        }
    }
}

impl From<CellItem> for Value {
    fn from(item: CellItem) -> Self {
        match item {
            CellItem::Entry(entry) => entry.into(),
            CellItem::Text(text) => Value::String(text),
            CellItem::Raw(value) => value,
        }
    }
}

/// The value stored under one column of one row, in any of the shapes
/// the data file has gone through.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    List(Vec<CellItem>),
    Other(Value),
}

impl Cell {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::String(text) if text.is_empty() => Cell::Empty,
            Value::String(text) => Cell::Text(text),
            Value::Array(items) => Cell::List(items.into_iter().map(CellItem::from).collect()),
            other => Cell::Other(other),
        }
    }

    /// Coerce the cell into its canonical list form.
    ///
    /// A bare string becomes a single entry titled with the trimmed string.
    /// Any other scalar or object is rendered as JSON text first and then
    /// wrapped the same way, without trimming.
    pub fn into_items(self) -> Vec<CellItem> {
        match self {
            Cell::Empty => Vec::new(),
            Cell::List(items) => items,
            Cell::Text(text) => vec![CellItem::Entry(Entry::new(text.trim(), ""))],
            Cell::Other(value) => vec![CellItem::Entry(Entry::new(&value.to_string(), ""))],
        }
    }
}

/// One tactic of the matrix.
///
/// Rows are kept as the JSON objects they were read from so fields this
/// crate does not know about survive a load/save cycle in their original order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn new(id: &str, tactic: &str) -> Self {
        Row::default()
            .with_field("id", Value::String(id.to_string()))
            .with_field("tactic", Value::String(tactic.to_string()))
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn tactic(&self) -> Option<&str> {
        self.0.get("tactic").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn cell(&self, column: Column) -> Cell {
        Cell::from_value(self.0.get(column.key()).cloned().unwrap_or(Value::Null))
    }

    pub fn set_cell(&mut self, column: Column, items: Vec<CellItem>) {
        let list = items.into_iter().map(Value::from).collect();
        self.0.insert(column.key().to_string(), Value::Array(list));
    }

    /// Append `entry` to the cell under `column`.
    ///
    /// A cell that already is a list only grows; its stored items are not
    /// re-serialized. Any other shape is coerced with [`Cell::into_items`] first.
    pub fn push_entry(&mut self, column: Column, entry: Entry) {
        if let Some(Value::Array(list)) = self.0.get_mut(column.key()) {
            list.push(entry.into());
            return;
        }

        let mut items = self.cell(column).into_items();
        items.push(CellItem::Entry(entry));
        self.set_cell(column, items);
    }
}

/// The whole matrix, in file order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(rows: Vec<Row>) -> Self {
        Dataset { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn find_row(&self, id: &str) -> Option<&Row> {
        self.rows.iter().find(|row| row.id() == Some(id))
    }

    pub fn find_row_mut(&mut self, id: &str) -> Option<&mut Row> {
        self.rows.iter_mut().find(|row| row.id() == Some(id))
    }
}
