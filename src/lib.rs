/*!
# Journal Ratings Finder

A browser-based lookup of academic journal ratings, built in Rust.

## Overview

The application reads a spreadsheet listing journals and the grade each of
five rating bodies (AJG, CNRS, CNU, VHB, ABDC) gives them, one row per
(journal, source) pair. A signed-in user picks journal titles and gets one
row per journal with a column per source, shown as a table and offered as a
CSV or XLSX download.

## Architecture

### Core
- **record**: `Source` and `RatingRecord`, title normalization
- **loader**: spreadsheet reading (XLSX/XLS/ODS through calamine, CSV)
- **dataset**: the immutable `Dataset`, its title index, and the load-once `DatasetCache`
- **lookup**: selection by normalized title and the pivot into `PivotRow`s
- **table**: HTML table rendering
- **downloader**: CSV and XLSX export
- **login**: credential allow-list and session store

### Web layer (`web` feature)
- **app**: axum router, page rendering and downloads
- **config**: command-line / environment settings

## Usage

Credentials are read from `JOURNALS_USER_1` .. `JOURNALS_USER_21`, each an
`email:password` pair. Start the server with

```text
journal-ratings --dataset Journals.xlsx --bind 127.0.0.1:3000
```

## Routes

- `/login` - Sign-in form and submission
- `/logout` - Ends the session
- `/` - Title selection and ratings table (`?journal=<title>` repeated)
- `/download.csv`, `/download.xlsx` - The same table as a file
- `/health` - Liveness probe
- `/static/<file>` - Stylesheet, favicon and other assets
*/

pub mod dataset;
pub mod downloader;
pub mod error;
pub mod loader;
pub mod login;
pub mod lookup;
pub mod record;
pub mod table;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod config;

pub use dataset::{Dataset, DatasetCache};
pub use error::{DataError, DownloadError};
pub use login::{CredentialList, SessionStore};
pub use lookup::{LookupOutcome, PivotRow, lookup, pivot, select};
pub use record::{RatingRecord, Source};
