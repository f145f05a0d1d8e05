//! AS peering extraction from `show ip bgp`-style routing table snapshots.
//!
//! Each best-path line carries an AS path after six fixed columns:
//!
//! ```text
//! *  1.0.0.0/24  208.51.134.254  0  0  0 3549 3356 13335 i
//! ```
//!
//! The last hop is the origin AS and the hop before it is recorded as one of
//! the origin's peers.

use crate::config::{AS_PATH_OFFSET, IO_BUFFER_SIZE, PEERS_CSV_HEADER, PROGRESS_INTERVAL};
use crate::progress::make_spinner;
use crate::stats::RouteStats;
use anyhow::{Context, Result};
use bzip2::read::MultiBzDecoder;
use memchr::memchr;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Anything not starting with the `*` best-path marker
    Other,
    /// Route whose path contains an aggregated `{...}` AS set
    AsSet,
    Route,
}

pub fn classify_line(line: &str) -> LineKind {
    if !line.starts_with('*') {
        LineKind::Other
    } else if memchr(b'{', line.as_bytes()).is_some() {
        LineKind::AsSet
    } else {
        LineKind::Route
    }
}

/// Repeated hops dropped, keeping each hop's first position. Covers both
/// prepending (`A B B C`) and looped or poisoned paths (`A B A C`).
pub fn collapse_hops<'a>(hops: &[&'a str]) -> Vec<&'a str> {
    let mut seen = FxHashSet::default();
    hops.iter().copied().filter(|hop| seen.insert(*hop)).collect()
}

/// Returns the AS path of a route line, or `None` for lines that are not
/// best-path entries or that carry an AS set.
///
/// The path is every token between the fixed columns and the trailing origin
/// code; a line too short to have one yields an empty path.
pub fn parse_as_path(line: &str) -> Option<Vec<&str>> {
    if classify_line(line) != LineKind::Route {
        return None;
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let end = tokens.len().saturating_sub(1);
    let hops = tokens.get(AS_PATH_OFFSET..end).unwrap_or_default();
    Some(collapse_hops(hops))
}

/// Numeric order for plain AS numbers, text order for anything else.
pub fn compare_asn(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRow {
    pub origin: String,
    pub peers: Vec<String>,
}

/// Origin AS to the set of distinct peers seen in front of it
#[derive(Debug, Default)]
pub struct PeerTable {
    peers: FxHashMap<String, FxHashSet<String>>,
}

impl PeerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the second-to-last hop as a peer of the last. Returns false for
    /// paths with fewer than two hops.
    pub fn record_path(&mut self, path: &[&str]) -> bool {
        match path {
            [.., peer, origin] => {
                self.peers
                    .entry((*origin).to_string())
                    .or_default()
                    .insert((*peer).to_string());
                true
            }
            _ => false,
        }
    }

    pub fn peers_of(&self, origin: &str) -> Option<&FxHashSet<String>> {
        self.peers.get(origin)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Rows ordered by origin, each with its peers ordered.
    pub fn rows(&self) -> Vec<PeerRow> {
        let mut rows: Vec<PeerRow> = self
            .peers
            .iter()
            .map(|(origin, peers)| {
                let mut peers: Vec<String> = peers.iter().cloned().collect();
                peers.sort_by(|a, b| compare_asn(a, b));
                PeerRow {
                    origin: origin.clone(),
                    peers,
                }
            })
            .collect();
        rows.sort_by(|a, b| compare_asn(&a.origin, &b.origin));
        rows
    }

    /// Scans snapshot text line by line. Invalid UTF-8 is replaced, not fatal.
    pub fn from_reader<R: BufRead>(mut reader: R, stats: &mut RouteStats) -> Result<Self> {
        let mut table = Self::new();
        let mut buf = Vec::new();
        let pb = make_spinner("Parsing snapshot for AS paths");

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .context("Failed to read snapshot line")?;
            if read == 0 {
                break;
            }
            stats.inc_lines();
            if stats.lines_read % PROGRESS_INTERVAL == 0 {
                pb.set_position(stats.lines_read);
            }

            let line = String::from_utf8_lossy(&buf);
            match classify_line(&line) {
                LineKind::Other => continue,
                LineKind::AsSet => {
                    stats.inc_as_sets();
                    continue;
                }
                LineKind::Route => stats.inc_routes(),
            }

            if let Some(path) = parse_as_path(&line) {
                if table.record_path(&path) {
                    stats.inc_paths();
                }
            }
        }

        pb.finish_and_clear();
        Ok(table)
    }
}

/// Reads a bzip2-compressed snapshot (multi-stream archives included).
pub fn read_snapshot(path: &Path) -> Result<(PeerTable, RouteStats)> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open snapshot: {}", path.display()))?;
    let reader = BufReader::with_capacity(IO_BUFFER_SIZE, MultiBzDecoder::new(file));

    info!(path = %path.display(), "Parsing snapshot for AS paths");
    let mut stats = RouteStats::new();
    let table = PeerTable::from_reader(reader, &mut stats)?;

    info!(
        lines = stats.lines_read,
        routes = stats.route_lines,
        as_sets = stats.as_set_lines,
        paths = stats.paths_recorded,
        origins = table.len(),
        "Snapshot parsed"
    );
    Ok((table, stats))
}

/// Writes one row per origin: origin, peer count, comma-joined peer list.
/// Returns the number of rows written.
pub fn write_csv<W: Write>(table: &PeerTable, writer: W) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(PEERS_CSV_HEADER)?;

    let rows = table.rows();
    for row in &rows {
        writer.write_record([
            row.origin.as_str(),
            row.peers.len().to_string().as_str(),
            row.peers.join(",").as_str(),
        ])?;
    }

    writer.flush()?;
    debug!(rows = rows.len(), "Peer CSV written");
    Ok(rows.len())
}

pub fn write_csv_file(table: &PeerTable, path: &Path) -> Result<usize> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    write_csv(table, BufWriter::with_capacity(IO_BUFFER_SIZE, file))
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))
}

#[derive(Debug, Clone)]
pub struct PeersSummary {
    pub origins: usize,
    pub stats: RouteStats,
}

/// Parses a local snapshot and writes the peers CSV.
pub fn run_peers(snapshot: &Path, output: &Path) -> Result<PeersSummary> {
    let (table, stats) = read_snapshot(snapshot)?;
    let origins = write_csv_file(&table, output)?;
    info!(path = %output.display(), origins, "Results written");
    Ok(PeersSummary { origins, stats })
}
