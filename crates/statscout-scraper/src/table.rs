//! Grid scraping: one page of HTML into a [`TableRecord`], and walking paged grids.

use crate::error::{Result, ScrapeError};
use crate::record::TableRecord;
use crate::settings::WaitSettings;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use statscout_browser::{BrowserActions, BrowserError};
use statscout_page::definition::{DerivedField, Pagination, TableSelectors};
use statscout_page::snapshot::{element_text, parse_selector};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

/// Parse the grid described by `selectors` out of a document.
///
/// Header cells are read once; repeated header texts get `_2`, `_3`...
/// suffixes. Body rows without cells are skipped. A row whose cell count
/// differs from the header's fails with `RowShape`.
pub fn parse_table(html: &str, selectors: &TableSelectors) -> Result<TableRecord> {
    let document = Html::parse_document(html);
    let table_selector = parse_selector(&selectors.table)?;
    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| ScrapeError::MissingTable {
            selector: selectors.table.clone(),
        })?;

    let header_selector = parse_selector(&selectors.header_cells)?;
    let headers: Vec<String> = table.select(&header_selector).map(|el| element_text(&el)).collect();
    if headers.is_empty() {
        return Err(ScrapeError::EmptyHeader {
            selector: selectors.table.clone(),
        });
    }

    let derived = DerivedColumns::compile(&selectors.derived)?;
    let mut columns = dedupe_headers(headers);
    let width = columns.len();
    columns.extend(selectors.derived.iter().map(|field| field.column.clone()));
    let mut record = TableRecord::new(columns);

    let row_selector = parse_selector(&selectors.body_rows)?;
    let cell_selector = parse_selector(&selectors.cells)?;
    for (index, row) in table.select(&row_selector).enumerate() {
        let mut cells: Vec<String> = row.select(&cell_selector).map(|el| element_text(&el)).collect();
        if cells.is_empty() {
            continue;
        }
        if cells.len() != width {
            return Err(ScrapeError::RowShape {
                row: index + 1,
                expected: width,
                found: cells.len(),
            });
        }
        cells.extend(derived.values(&row));
        record.push_row(cells)?;
    }

    debug!(
        table = %selectors.table,
        columns = width,
        rows = record.len(),
        "parsed table"
    );

    Ok(record)
}

/// Scrape every page of a grid through the live driver.
///
/// Without pagination this is one [`parse_table`] of the current page. With
/// it, the walk starts on page 1: a current-page marker showing another page
/// sends the grid back through `pagination.first` first. The total page
/// count is read from `pagination.total_pages` and the next control is
/// clicked once per further page, waiting until the grid shows the new page.
/// Every page but the last must have as many rows as the first. Afterwards
/// the grid is returned to page 1 when a first-page control is declared.
pub async fn scrape_paginated<D>(
    driver: &D,
    selectors: &TableSelectors,
    wait: &WaitSettings,
) -> Result<TableRecord>
where
    D: BrowserActions + ?Sized,
{
    let mut html = driver.content().await?;

    let Some(pagination) = &selectors.pagination else {
        return parse_table(&html, selectors);
    };

    if let Some(marker) = &pagination.current_page {
        match read_number(&html, marker)? {
            Some(page) if page != 1 => {
                let first = pagination
                    .first
                    .as_deref()
                    .ok_or(ScrapeError::NotOnFirstPage { page })?;
                debug!(page, "returning grid to page 1");
                html = go_to_first(driver, selectors, pagination, first, &html, wait).await?;
            }
            _ => {}
        }
    }

    let mut record = parse_table(&html, selectors)?;
    let total = total_pages(&html, &pagination.total_pages)?;
    let page_size = record.len();
    let mut previous_len = page_size;

    for page in 2..=total {
        if previous_len != page_size {
            return Err(ScrapeError::PageSize {
                page: page - 1,
                expected: page_size,
                found: previous_len,
            });
        }

        let before = grid_html(&html, &selectors.table)?;
        driver.click(&pagination.next).await?;
        tokio::time::sleep(wait.settle_delay).await;
        html = wait_for_page(driver, selectors, pagination, page, &before, wait).await?;

        let next = parse_table(&html, selectors)?;
        previous_len = next.len();
        record.append(next)?;
        debug!(page, total, rows = previous_len, "scraped grid page");
    }

    if total > 1 && previous_len > page_size {
        return Err(ScrapeError::PageSize {
            page: total,
            expected: page_size,
            found: previous_len,
        });
    }

    if total > 1 {
        if let Some(first) = &pagination.first {
            go_to_first(driver, selectors, pagination, first, &html, wait).await?;
        }
    }

    info!(pages = total, rows = record.len(), "scraped grid");
    Ok(record)
}

/// Click the first-page control and wait until the grid shows page 1.
async fn go_to_first<D>(
    driver: &D,
    selectors: &TableSelectors,
    pagination: &Pagination,
    first: &str,
    html: &str,
    wait: &WaitSettings,
) -> Result<String>
where
    D: BrowserActions + ?Sized,
{
    let before = grid_html(html, &selectors.table)?;
    driver.click(first).await?;
    tokio::time::sleep(wait.settle_delay).await;
    wait_for_page(driver, selectors, pagination, 1, &before, wait).await
}

/// Poll until the grid shows `page`.
///
/// With a current-page marker the marker must report `page`; otherwise the
/// grid's markup must differ from `before`.
async fn wait_for_page<D>(
    driver: &D,
    selectors: &TableSelectors,
    pagination: &Pagination,
    page: usize,
    before: &str,
    wait: &WaitSettings,
) -> Result<String>
where
    D: BrowserActions + ?Sized,
{
    let started = Instant::now();
    loop {
        let html = driver.content().await?;
        let arrived = match &pagination.current_page {
            Some(marker) => read_number(&html, marker)? == Some(page),
            None => grid_html(&html, &selectors.table)? != before,
        };
        if arrived {
            return Ok(html);
        }
        if started.elapsed() >= wait.timeout {
            return Err(BrowserError::Timeout {
                what: format!("page {page} of {}", selectors.table),
                waited: wait.timeout,
            }
            .into());
        }
        tokio::time::sleep(wait.poll_interval).await;
    }
}

/// Total page count: the last integer in the marker's text.
fn total_pages(html: &str, selector: &str) -> Result<usize> {
    let document = Html::parse_document(html);
    let marker = parse_selector(selector)?;
    let text = document
        .select(&marker)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default();

    last_integer(&text).ok_or(ScrapeError::PageCount { text })
}

fn read_number(html: &str, selector: &str) -> Result<Option<usize>> {
    let document = Html::parse_document(html);
    let marker = parse_selector(selector)?;
    Ok(document
        .select(&marker)
        .next()
        .and_then(|el| last_integer(&element_text(&el))))
}

fn last_integer(text: &str) -> Option<usize> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .last()
        .and_then(|digits| digits.parse().ok())
}

/// Markup of the grid node, empty when absent.
fn grid_html(html: &str, selector: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let table = parse_selector(selector)?;
    Ok(document
        .select(&table)
        .next()
        .map(|el| el.html())
        .unwrap_or_default())
}

fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(i, header)| {
            let header = if header.is_empty() {
                format!("column_{}", i + 1)
            } else {
                header
            };
            let count = seen.entry(header.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                header
            } else {
                format!("{header}_{count}")
            }
        })
        .collect()
}

struct DerivedColumn<'a> {
    field: &'a DerivedField,
    selector: Option<Selector>,
    pattern: Regex,
}

struct DerivedColumns<'a>(Vec<DerivedColumn<'a>>);

impl<'a> DerivedColumns<'a> {
    fn compile(fields: &'a [DerivedField]) -> Result<Self> {
        let mut columns = Vec::with_capacity(fields.len());
        for field in fields {
            let selector = field.selector.as_deref().map(parse_selector).transpose()?;
            let pattern = Regex::new(&field.pattern).map_err(|source| ScrapeError::Pattern {
                column: field.column.clone(),
                source,
            })?;
            columns.push(DerivedColumn {
                field,
                selector,
                pattern,
            });
        }
        Ok(Self(columns))
    }

    /// One value per derived column; empty where the pattern doesn't match.
    fn values(&self, row: &ElementRef<'_>) -> Vec<String> {
        self.0
            .iter()
            .map(|column| {
                let node = match &column.selector {
                    Some(selector) => row.select(selector).next(),
                    None => Some(*row),
                };
                let source = node.and_then(|node| match &column.field.attribute {
                    Some(attribute) => node.value().attr(attribute).map(ToString::to_string),
                    None => Some(element_text(&node)),
                });
                source
                    .and_then(|text| {
                        column
                            .pattern
                            .captures(&text)
                            .and_then(|caps| caps.get(1))
                            .map(|m| m.as_str().to_string())
                    })
                    .unwrap_or_default()
            })
            .collect()
    }
}
