//! URL and naming rules of the stats site, plus the text normalization
//! applied to every scraped cell.

pub const STATS_INDEX_PATH: &str = "/stats.html";

const STAT_TYPES: [(&str, &str); 8] = [
    ("RSCR", "Scoring"),
    ("RAPP", "Approach"),
    ("RPUT", "Putting"),
    ("ROTT", "Off The Tee"),
    ("RSTR", "Streaks"),
    ("RARG", "Around The Green"),
    ("RMNY", "Money"),
    ("RPTS", "Points"),
];

pub fn index_url(base: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), STATS_INDEX_PATH)
}

pub fn absolute_url(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    format!("{}{}", base.trim_end_matches('/'), href)
}

/// `/stats/stat.120.html` becomes `<base>/stats/stat.120.`, ready for a season suffix.
pub fn stat_link_from_href(base: &str, href: &str) -> String {
    let trimmed = match href.find("html") {
        Some(idx) => &href[..idx],
        None => href,
    };
    absolute_url(base, trimmed)
}

pub fn season_url(stat_link: &str, year: u16) -> String {
    format!("{}{}.html", stat_link, year)
}

/// Category code of a category page, e.g. `.../categories.RSCR_INQ.html` -> `RSCR`.
pub fn category_from_master(master: &str) -> String {
    let trimmed = master.trim_end_matches('/');
    let last_segment = match trimmed.rsplit_once('/') {
        Some((_, segment)) => segment,
        None => trimmed,
    };

    let Some((_, rest)) = last_segment.split_once('.') else {
        return String::new();
    };

    match rest.find(['_', '.']) {
        Some(end) => rest[..end].to_string(),
        None => rest.to_string(),
    }
}

pub fn stat_type_for(category: &str) -> &'static str {
    STAT_TYPES
        .iter()
        .find(|(code, _)| *code == category)
        .map(|(_, name)| *name)
        .unwrap_or("")
}

pub fn clean_text(value: &str) -> String {
    value.chars().filter(|c| !matches!(c, '\n' | '\t' | '\r')).collect()
}

/// Ties are published as `T5`; the marker is dropped.
pub fn clean_rank(value: &str) -> String {
    clean_text(value).replace('T', "")
}
