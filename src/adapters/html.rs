//! Selectors for the three kinds of pages on the stats site: the stats
//! index, the category pages and the per-season stat pages.

use crate::domain::model::{SeasonTable, StatLink, TableRow, STAT_COLUMNS};
use crate::domain::services::{absolute_url, stat_link_from_href};
use crate::utils::error::{EtlError, Result};
use scraper::{ElementRef, Html, Selector};

/// Leaderboard columns before the stat columns: rank, rank last week, athlete.
const LEADING_COLUMNS: usize = 3;

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| EtlError::ProcessingError {
        message: format!("invalid selector '{}': {}", css, e),
    })
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

fn first<'a>(scope: ElementRef<'a>, css: &str) -> Result<Option<ElementRef<'a>>> {
    Ok(scope.select(&selector(css)?).next())
}

/// Category page links from the navigation block of the stats index, skipping
/// the first entry (the overview page itself).
pub fn parse_category_links(html: &str, url: &str, base: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let container = document
        .select(&selector("div.page-container")?)
        .next()
        .ok_or_else(|| EtlError::html(url, "missing div.page-container"))?;
    let nav = first(container, "div.navigation.section")?
        .ok_or_else(|| EtlError::html(url, "missing div.navigation.section"))?;

    let li = selector("li")?;
    let mut links = Vec::new();
    for item in nav.select(&li).skip(1) {
        match first(item, "a[href]")?.and_then(|a| a.value().attr("href")) {
            Some(href) => links.push(absolute_url(base, href)),
            None => tracing::debug!("Navigation entry without link on {}", url),
        }
    }

    Ok(links)
}

pub fn parse_stat_links(html: &str, master: &str, base: &str) -> Result<Vec<StatLink>> {
    let document = Html::parse_document(html);
    let container = document
        .select(&selector("div.section.categories")?)
        .next()
        .ok_or_else(|| EtlError::html(master, "missing div.section.categories"))?;

    let li = selector("li")?;
    let mut links = Vec::new();
    for item in container.select(&li) {
        let Some(anchor) = first(item, "a[href]")? else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        links.push(StatLink {
            master: master.to_string(),
            stat: text_of(anchor),
            stat_link: stat_link_from_href(base, href),
        });
    }

    Ok(links)
}

/// Footer paragraph of a stat page. Pages without one yield an empty description.
pub fn parse_description(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    Ok(document
        .select(&selector("div.content-footer p")?)
        .next()
        .map(text_of)
        .unwrap_or_default())
}

pub fn parse_season_table(html: &str, url: &str) -> Result<SeasonTable> {
    let document = Html::parse_document(html);
    let table = document
        .select(&selector("table#statsTable")?)
        .next()
        .ok_or_else(|| EtlError::html(url, "missing table#statsTable"))?;

    let headers: Vec<String> = table.select(&selector("th")?).map(text_of).collect();
    let stat_names = std::array::from_fn(|i| {
        headers
            .get(LEADING_COLUMNS + i)
            .cloned()
            .unwrap_or_default()
    });

    let td = selector("td")?;
    let mut rows = Vec::new();
    for tr in table.select(&selector("tr")?).skip(1) {
        let cells: Vec<String> = tr.select(&td).map(text_of).collect();
        if cells.len() < LEADING_COLUMNS {
            tracing::debug!("Skipping row with {} cells on {}", cells.len(), url);
            continue;
        }

        let values: [String; STAT_COLUMNS] = std::array::from_fn(|i| {
            cells
                .get(LEADING_COLUMNS + i)
                .cloned()
                .unwrap_or_default()
        });

        rows.push(TableRow {
            rank: cells[0].clone(),
            rank_last: cells[1].clone(),
            athlete: cells[2].clone(),
            values,
        });
    }

    Ok(SeasonTable { stat_names, rows })
}
