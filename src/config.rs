/// Saved library page read by the exporter
pub const DEFAULT_LIBRARY_HTML: &str = "html/My Library _ Audible.com.html";

/// Jinja-style template the exporter renders
pub const DEFAULT_TEMPLATE: &str = "page.tmpl";

/// Rendered static page
pub const DEFAULT_PAGE_OUTPUT: &str = "site/html/index.html";

/// Destination for copied cover images
pub const DEFAULT_IMAGE_DIR: &str = "site/images";

/// Anchor carrying a book title and its product URL
pub const TITLE_LINK_SELECTOR: &str =
    "a.adbl-flyout-trigger-marker.adbl-link.adbl-prod-title.adbl-series-margin-bottom";

/// Cover image; `alt` holds the title
pub const COVER_IMAGE_SELECTOR: &str = "img.adbl-prod-image";

/// Table cell wrapping one product's info blocks
pub const PRODUCT_CELL_SELECTOR: &str = r#"td.adbl-flyout-cont-marker[name="productCover"]"#;

pub const SUMMARY_BLOCK_SELECTOR: &str = "div.socialTile-summary";

/// Info blocks containing any of these are promotions, not books
pub const PROMOTIONAL_MARKERS: &[&str] = &[
    "Vango",
    "Your First Listen",
    "The New York Times Audio Digest",
];

/// Latest full RIB snapshot published by Route Views
pub const DEFAULT_SNAPSHOT_URL: &str =
    "http://archive.routeviews.org/oix-route-views/oix-full-snapshot-latest.dat.bz2";

pub const DEFAULT_SNAPSHOT_FILE: &str = "oix-full-snapshot-latest.dat.bz2";

pub const DEFAULT_PEERS_CSV: &str = "asn_peers.csv";

/// Header line of the peers CSV, spacing included
pub const PEERS_CSV_HEADER: [&str; 3] = ["source_asn", " number_of_peers", " peer_list"];

/// Index of the first AS path token in a snapshot line
/// (status, network, next hop, metric, local pref, weight precede it)
pub const AS_PATH_OFFSET: usize = 6;

/// Progress update interval (tick every N snapshot lines)
pub const PROGRESS_INTERVAL: u64 = 100_000;

/// Buffer size for the snapshot reader and CSV writer
pub const IO_BUFFER_SIZE: usize = 256 * 1024;
