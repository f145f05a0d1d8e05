//! Curio: three small, independent data-munging utilities
//!
//! Each tool is a straight parse → transform → write pipeline run to completion
//! on a single thread:
//!
//! 1. **Library exporter** -- Scrape a saved audiobook "My Library" page for
//!    titles, product links, cover images and author/narrator credits, merge
//!    them by title and render a static page through a Jinja-style template
//! 2. **Structure dumper** -- Print any nested map/list/tuple value with one
//!    level of indentation per nesting depth
//! 3. **AS peering extractor** -- Download a bzip2 routing table snapshot, pull
//!    the AS path out of every best-path route and write, per origin AS, the
//!    distinct set of peers seen in front of it as CSV
//!
//! # Key Modules
//!
//! - [`library`] -- HTML scraping, title merge, sort heuristic and page rendering
//! - [`models`] -- Book records and export summary
//! - [`dumper`] -- Indented pretty-printer over the [`dumper::Value`] tree
//! - [`routes`] -- Route line parsing, peer aggregation and CSV output
//! - [`download`] -- Blocking snapshot download with progress reporting
//! - [`stats`] -- Snapshot scan counters
//! - [`progress`] -- Spinner and download bar styles
//! - [`config`] -- Default paths, selectors and constants
//!
//! # Example Usage
//!
//! ```bash
//! # Render the saved library page into site/html/index.html
//! curio library --html "html/My Library _ Audible.com.html" --template page.tmpl
//!
//! # Download the latest Route Views snapshot and summarize AS peers
//! curio asn-peers -o asn_peers.csv
//!
//! # Pretty-print a JSON document
//! curio dump -i data.json
//! ```

pub mod config;
pub mod download;
pub mod dumper;
pub mod library;
pub mod models;
pub mod progress;
pub mod routes;
pub mod stats;
