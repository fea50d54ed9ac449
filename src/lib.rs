/*!
# Tactic Matrix

A small web backend for a matrix of tactics mapped onto architecture layers,
built in Rust.

## Overview

The matrix is a JSON array of rows. Each row is one tactic, identified by its
`id` and labelled by its `tactic` name, with up to seven layer columns:
`social`, `application`, `decision`, `middleware`, `data`, `sensing` and
`physical`. Each column holds a cell: a list of entries with an id, a title,
a description and notes.

The data file has gone through several shapes over time (bare strings,
lists of strings, lists of objects). Reading accepts all of them; appending
always leaves the touched cell as a list.

## Architecture

### Frontend Layer
- Static HTML/JS bundle served from a directory (`static/` by default)

### Backend Layer
- **Technologies**: Rust, axum, tower-http
- **Core Components**:
  - Matrix model - Rows, columns, cells, entries and slug derivation
  - Cell upsert - Validation, cell coercion and entry append
  - Error handler - Maps validation/not-found/storage failures to HTTP status codes

### Data Persistence Layer
- One pretty-printed JSON file, rewritten in full on each append
- Writes go through a temporary file and an atomic rename
- `DataStore` trait so another store can replace the file

## Modules

- **matrix**: Column, Row, Dataset, Cell, CellItem, Entry and `slugify`
- **upsert**: Submit validation and the append algorithm
- **saving**: `DataStore` with JSON-file and in-memory implementations
- **config**: Server settings
- **error**: Error taxonomy
- **app**: Routing and handlers (feature `web`)

## REST API Endpoints

- `GET /api/data` - The whole matrix
- `POST /api/submit` - Append an entry: `{tacticId, column, entry, description?}`
- `GET /`, `GET /{path}` - Front-end files
*/

pub mod config;
pub mod error;
pub mod matrix;
pub mod saving;
pub mod upsert;

#[cfg(feature = "web")]
pub mod app;

/// Re-export the common types to make them easier to use
pub use error::{MatrixError, Result};
pub use matrix::*;
pub use saving::*;
pub use upsert::*;
