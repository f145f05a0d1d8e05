//! Audiobook library exporter.
//!
//! Scrapes a saved "My Library" page for titles, product links, cover images
//! and author/narrator credits, then renders the merged, sorted book list into
//! a static page through a Jinja-style template.

use crate::config::{
    COVER_IMAGE_SELECTOR, PRODUCT_CELL_SELECTOR, PROMOTIONAL_MARKERS, SUMMARY_BLOCK_SELECTOR,
    TITLE_LINK_SELECTOR,
};
use crate::models::{BookEntry, ExportSummary};
use anyhow::{Context, Result};
use minijinja::{context, Environment};
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use scraper::{ElementRef, Html, Selector};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

static CREDIT_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(By|Narrated By)\s").unwrap());

static TITLE_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse(TITLE_LINK_SELECTOR).unwrap());
static COVER_IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse(COVER_IMAGE_SELECTOR).unwrap());
static PRODUCT_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(PRODUCT_CELL_SELECTOR).unwrap());
static SUMMARY_BLOCK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(SUMMARY_BLOCK_SELECTOR).unwrap());
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h3").unwrap());
static LIST_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("li").unwrap());

/// Registered name of the page template; no autoescaping for `.tmpl`.
const TEMPLATE_NAME: &str = "page.tmpl";

/// A cover image referenced by the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    /// Alt text, which carries the book title
    pub alt: String,
    /// `src` as written in the page, relative to the page's directory
    pub src: String,
    /// Last path segment of `src`
    pub file_name: String,
}

pub struct ExportOptions {
    pub html_path: PathBuf,
    pub template_path: PathBuf,
    pub output_path: PathBuf,
    pub image_dir: PathBuf,
}

/// Element text with runs of whitespace collapsed to single spaces.
fn normalized_text(el: &ElementRef) -> String {
    let raw: String = el.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Maps title link text to its `href`.
pub fn collect_links(document: &Html) -> FxHashMap<String, String> {
    let mut links = FxHashMap::default();
    for link in document.select(&TITLE_LINK) {
        let Some(href) = link.value().attr("href") else {
            debug!("Title link without href, skipping");
            continue;
        };
        links.insert(normalized_text(&link), href.to_string());
    }
    links
}

pub fn collect_images(document: &Html) -> Vec<CoverImage> {
    document
        .select(&COVER_IMAGE)
        .filter_map(|img| {
            let src = img.value().attr("src")?;
            let alt = img.value().attr("alt")?;
            let file_name = src.rsplit('/').next().unwrap_or(src);
            if file_name.is_empty() {
                return None;
            }
            Some(CoverImage {
                alt: alt.split_whitespace().collect::<Vec<_>>().join(" "),
                src: src.to_string(),
                file_name: file_name.to_string(),
            })
        })
        .collect()
}

/// Copies every cover from `html_dir/<src>` into `image_dir/<file name>`.
pub fn copy_images(images: &[CoverImage], html_dir: &Path, image_dir: &Path) -> Result<usize> {
    fs::create_dir_all(image_dir)
        .with_context(|| format!("Failed to create image directory: {}", image_dir.display()))?;

    for image in images {
        let from = html_dir.join(&image.src);
        let to = image_dir.join(&image.file_name);
        fs::copy(&from, &to).with_context(|| {
            format!(
                "Failed to copy cover image {} to {}",
                from.display(),
                to.display()
            )
        })?;
    }
    Ok(images.len())
}

/// Strips a leading "By " / "Narrated By " credit label.
pub fn strip_credit_prefix(text: &str) -> String {
    CREDIT_PREFIX.replace(text, "").into_owned()
}

fn is_promotional(text: &str) -> bool {
    PROMOTIONAL_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Scans product info blocks and merges in the link and image maps by title.
pub fn collect_books(
    document: &Html,
    links: &FxHashMap<String, String>,
    images: &FxHashMap<String, String>,
) -> FxHashMap<String, BookEntry> {
    let mut books = FxHashMap::default();

    for cell in document.select(&PRODUCT_CELL) {
        for block in cell.select(&SUMMARY_BLOCK) {
            let raw: String = block.text().collect();
            if is_promotional(&raw) {
                continue;
            }

            let Some(heading) = block.select(&HEADING).next() else {
                debug!("Info block without a title heading, skipping");
                continue;
            };
            let title = normalized_text(&heading);
            if title.chars().count() <= 1 {
                debug!(title = %title, "Info block title too short, skipping");
                continue;
            }

            let mut entry = BookEntry::new(title.clone());
            entry.url = links.get(&title).cloned();
            entry.image = images.get(&title).cloned();

            let items: Vec<ElementRef> = block.select(&LIST_ITEM).collect();
            if items.len() > 2 {
                entry.author = Some(strip_credit_prefix(&normalized_text(&items[1])));
                entry.narrator = Some(strip_credit_prefix(&normalized_text(&items[2])));
            }

            books.insert(title, entry);
        }
    }

    books
}

/// Alphabetization key: the text after the last ": " and after the last ", ".
///
/// A title without a separator contributes itself unchanged.
pub fn sort_key(title: &str) -> (&str, &str) {
    let after_colon = title.rsplit(": ").next().unwrap_or(title);
    let after_comma = title.rsplit(", ").next().unwrap_or(title);
    (after_colon, after_comma)
}

fn compare_titles(a: &str, b: &str) -> Ordering {
    sort_key(a).cmp(&sort_key(b)).then_with(|| a.cmp(b))
}

pub fn sort_books(books: FxHashMap<String, BookEntry>) -> Vec<BookEntry> {
    let mut sorted: Vec<BookEntry> = books.into_values().collect();
    sorted.sort_by(|a, b| compare_titles(&a.title, &b.title));
    sorted
}

/// Renders `template_src` with `data` bound to a list of `[title, book]` pairs.
pub fn render_page(template_src: &str, books: &[BookEntry]) -> Result<String> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, template_src)
        .context("Failed to parse page template")?;
    let template = env.get_template(TEMPLATE_NAME)?;

    let data: Vec<(&str, &BookEntry)> = books.iter().map(|b| (b.title.as_str(), b)).collect();
    template
        .render(context! { data => data })
        .context("Failed to render page template")
}

pub fn run_export(options: &ExportOptions) -> Result<ExportSummary> {
    let html = fs::read_to_string(&options.html_path).with_context(|| {
        format!(
            "Failed to read library page: {}",
            options.html_path.display()
        )
    })?;
    let template_src = fs::read_to_string(&options.template_path).with_context(|| {
        format!(
            "Failed to read page template: {}",
            options.template_path.display()
        )
    })?;

    let document = Html::parse_document(&html);

    let links = collect_links(&document);
    info!(links = links.len(), "Collected title links");

    let covers = collect_images(&document);
    let html_dir = options.html_path.parent().unwrap_or(Path::new(""));
    let images_copied = copy_images(&covers, html_dir, &options.image_dir)?;
    info!(images = images_copied, "Copied cover images");

    let images: FxHashMap<String, String> = covers
        .into_iter()
        .map(|c| (c.alt, c.file_name))
        .collect();

    let books = sort_books(collect_books(&document, &links, &images));
    info!(books = books.len(), "Collected books");

    let page = render_page(&template_src, &books)?;

    if let Some(parent) = options.output_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    fs::write(&options.output_path, page).with_context(|| {
        format!(
            "Failed to write page: {}",
            options.output_path.display()
        )
    })?;
    info!(path = %options.output_path.display(), "Page written");

    Ok(ExportSummary {
        books: books.len(),
        links: links.len(),
        images_copied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_page() -> &'static str {
        r#"<html><body>
        <a class="adbl-flyout-trigger-marker adbl-link adbl-prod-title adbl-series-margin-bottom"
           href="/pd/Dune-Audiobook/B002V1OF70">Dune</a>
        <a class="adbl-flyout-trigger-marker adbl-link adbl-prod-title adbl-series-margin-bottom">No Href</a>
        <a class="adbl-link" href="/other">Not A Title</a>
        <img class="adbl-prod-image" src="files/51dune.jpg" alt="Dune">
        <img class="adbl-prod-image" src="files/51hobbit.jpg" alt="The Hobbit">
        <img class="adbl-prod-image" alt="Missing Src">
        <table><tr>
          <td class="adbl-flyout-cont-marker" name="productCover">
            <div class="socialTile-summary">
              <h3>Dune</h3>
              <ul>
                <li>Dune</li>
                <li>By   Frank Herbert</li>
                <li>Narrated By Scott Brick, Orlagh Cassidy</li>
              </ul>
            </div>
          </td>
          <td class="adbl-flyout-cont-marker" name="productCover">
            <div class="socialTile-summary">
              <h3>The Hobbit</h3>
              <ul><li>The Hobbit</li></ul>
            </div>
          </td>
          <td class="adbl-flyout-cont-marker" name="productCover">
            <div class="socialTile-summary">
              <h3>Your First Listen</h3>
              <ul><li>a</li><li>By Someone</li><li>Narrated By Someone</li></ul>
            </div>
          </td>
          <td class="adbl-flyout-cont-marker" name="productCover">
            <div class="socialTile-summary">
              <h3>Vango: Between Sky and Earth</h3>
              <ul><li>a</li><li>By Someone</li><li>Narrated By Someone</li></ul>
            </div>
          </td>
          <td class="adbl-flyout-cont-marker" name="productCover">
            <div class="socialTile-summary"><p>No heading here</p></div>
          </td>
          <td class="adbl-flyout-cont-marker" name="somethingElse">
            <div class="socialTile-summary"><h3>Ignored Cell</h3></div>
          </td>
        </tr></table>
        </body></html>"#
    }

    #[test]
    fn links_require_marker_classes_and_href() {
        let doc = Html::parse_document(sample_page());
        let links = collect_links(&doc);
        assert_eq!(links.len(), 1);
        assert_eq!(links["Dune"], "/pd/Dune-Audiobook/B002V1OF70");
    }

    #[test]
    fn images_use_last_path_segment() {
        let doc = Html::parse_document(sample_page());
        let images = collect_images(&doc);
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].alt, "Dune");
        assert_eq!(images[0].src, "files/51dune.jpg");
        assert_eq!(images[0].file_name, "51dune.jpg");
        assert_eq!(images[1].file_name, "51hobbit.jpg");
    }

    #[test]
    fn books_merge_links_images_and_credits() {
        let doc = Html::parse_document(sample_page());
        let links = collect_links(&doc);
        let images: FxHashMap<String, String> = collect_images(&doc)
            .into_iter()
            .map(|c| (c.alt, c.file_name))
            .collect();
        let books = collect_books(&doc, &links, &images);

        assert_eq!(books.len(), 2);

        let dune = &books["Dune"];
        assert_eq!(dune.url.as_deref(), Some("/pd/Dune-Audiobook/B002V1OF70"));
        assert_eq!(dune.image.as_deref(), Some("51dune.jpg"));
        assert_eq!(dune.author.as_deref(), Some("Frank Herbert"));
        assert_eq!(
            dune.narrator.as_deref(),
            Some("Scott Brick, Orlagh Cassidy")
        );

        let hobbit = &books["The Hobbit"];
        assert_eq!(hobbit.url, None);
        assert_eq!(hobbit.image.as_deref(), Some("51hobbit.jpg"));
        assert_eq!(hobbit.author, None);
        assert_eq!(hobbit.narrator, None);
    }

    #[test]
    fn promotional_blocks_are_skipped() {
        let doc = Html::parse_document(sample_page());
        let books = collect_books(&doc, &FxHashMap::default(), &FxHashMap::default());
        assert!(!books.contains_key("Your First Listen"));
        assert!(!books.contains_key("Vango: Between Sky and Earth"));
        assert!(!books.contains_key("Ignored Cell"));
    }

    #[test]
    fn single_character_title_is_skipped() {
        let html = r#"<table><tr><td class="adbl-flyout-cont-marker" name="productCover">
            <div class="socialTile-summary"><h3>X</h3></div>
        </td></tr></table>"#;
        let doc = Html::parse_document(html);
        let books = collect_books(&doc, &FxHashMap::default(), &FxHashMap::default());
        assert!(books.is_empty());
    }

    #[test]
    fn credit_prefix_stripped() {
        assert_eq!(strip_credit_prefix("By Frank Herbert"), "Frank Herbert");
        assert_eq!(strip_credit_prefix("Narrated By Scott Brick"), "Scott Brick");
        assert_eq!(strip_credit_prefix("Bypass Author"), "Bypass Author");
        assert_eq!(strip_credit_prefix("Written By Someone"), "Written By Someone");
    }

    #[test]
    fn sort_key_takes_last_segments() {
        assert_eq!(
            sort_key("Dune: Book One"),
            ("Book One", "Dune: Book One")
        );
        assert_eq!(
            sort_key("Hobbit, The"),
            ("Hobbit, The", "The")
        );
        assert_eq!(sort_key("Dune"), ("Dune", "Dune"));
    }

    #[test]
    fn sort_books_orders_by_composite_key() {
        let mut books = FxHashMap::default();
        for title in ["Zebra", "Series: Alpha", "Mango"] {
            books.insert(title.to_string(), BookEntry::new(title));
        }
        let titles: Vec<String> = sort_books(books).into_iter().map(|b| b.title).collect();
        assert_eq!(titles, vec!["Series: Alpha", "Mango", "Zebra"]);
    }

    #[test]
    fn render_exposes_title_pairs_and_omits_missing_fields() {
        let mut dune = BookEntry::new("Dune");
        dune.url = Some("/dune".to_string());
        let hobbit = BookEntry::new("The Hobbit");

        let template = "{% for title, book in data %}{{ title }}|{{ book.url is defined }}\n{% endfor %}";
        let out = render_page(template, &[dune, hobbit]).unwrap();
        assert_eq!(out, "Dune|true\nThe Hobbit|false\n");
    }

    #[test]
    fn render_rejects_broken_template() {
        let result = render_page("{% for x in %}", &[]);
        assert!(result.is_err());
    }
}
