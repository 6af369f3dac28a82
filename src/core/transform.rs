use crate::domain::model::{CleanStat, SeasonRow, SeasonStat, StatDescription};
use crate::domain::services::{clean_rank, clean_text, stat_type_for};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Numeric ranks sort numerically and ahead of anything else (blank ranks last).
pub fn rank_cmp(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<u64>(), b.trim().parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn season_order(a: &SeasonStat, b: &SeasonStat) -> Ordering {
    a.category
        .cmp(&b.category)
        .then_with(|| a.stat_name.cmp(&b.stat_name))
        .then_with(|| a.year.cmp(&b.year))
        .then_with(|| rank_cmp(&a.rank, &b.rank))
}

fn clean_order(a: &CleanStat, b: &CleanStat) -> Ordering {
    a.category
        .cmp(&b.category)
        .then_with(|| a.stat_name.cmp(&b.stat_name))
        .then_with(|| a.year.cmp(&b.year))
        .then_with(|| a.stat.cmp(&b.stat))
        .then_with(|| rank_cmp(&a.rank, &b.rank))
}

pub fn clean_descriptions(descriptions: Vec<StatDescription>) -> Vec<StatDescription> {
    descriptions
        .into_iter()
        .map(|d| StatDescription {
            year: clean_text(&d.year),
            stat_name: clean_text(&d.stat_name),
            link: clean_text(&d.link),
            category: clean_text(&d.category),
            description: clean_text(&d.description),
        })
        .collect()
}

pub fn clean_season_rows(rows: Vec<SeasonRow>) -> Vec<SeasonRow> {
    rows.into_iter()
        .map(|row| SeasonRow {
            year: clean_text(&row.year),
            stat_name: clean_text(&row.stat_name),
            link: clean_text(&row.link),
            category: clean_text(&row.category),
            rank: clean_rank(&row.rank),
            rank_last: clean_rank(&row.rank_last),
            athlete: clean_text(&row.athlete),
            stat_names: row.stat_names.map(|s| clean_text(&s)),
            values: row.values.map(|s| clean_text(&s)),
        })
        .collect()
}

/// Outer join of one season's rows with the stat descriptions on
/// `(category, stat_name)`. Descriptions without any row for the season
/// still produce a row with empty leaderboard fields.
pub fn merge_descriptions(
    rows: Vec<SeasonRow>,
    descriptions: &[StatDescription],
    year: u16,
) -> Vec<SeasonStat> {
    let mut by_key: HashMap<(&str, &str), &StatDescription> = HashMap::new();
    for description in descriptions {
        by_key
            .entry((description.category.as_str(), description.stat_name.as_str()))
            .or_insert(description);
    }

    let mut matched: HashSet<(String, String)> = HashSet::new();
    let mut merged = Vec::with_capacity(rows.len());

    for row in rows {
        let description = by_key
            .get(&(row.category.as_str(), row.stat_name.as_str()))
            .map(|d| d.description.clone())
            .unwrap_or_default();
        matched.insert((row.category.clone(), row.stat_name.clone()));

        let mut stat = SeasonStat {
            year: row.year,
            stat_type: stat_type_for(&row.category).to_string(),
            category: row.category,
            stat_name: row.stat_name,
            link: row.link,
            description,
            rank: row.rank,
            athlete: row.athlete,
            ..Default::default()
        };
        stat.set_pairs(row.stat_names, row.values);
        merged.push(stat);
    }

    for description in descriptions {
        let key = (description.category.clone(), description.stat_name.clone());
        if !matched.insert(key) {
            continue;
        }
        merged.push(SeasonStat {
            year: year.to_string(),
            category: description.category.clone(),
            stat_type: stat_type_for(&description.category).to_string(),
            stat_name: description.stat_name.clone(),
            link: description.link.clone(),
            description: description.description.clone(),
            ..Default::default()
        });
    }

    merged.sort_by(season_order);
    merged
}

/// Concatenated seasons, sorted, keeping the first row per
/// `(category, stat_name, year, rank, athlete)`.
pub fn consolidate(mut rows: Vec<SeasonStat>) -> Vec<SeasonStat> {
    rows.sort_by(season_order);

    let mut seen = HashSet::new();
    rows.retain(|r| {
        seen.insert((
            r.category.clone(),
            r.stat_name.clone(),
            r.year.clone(),
            r.rank.clone(),
            r.athlete.clone(),
        ))
    });
    rows
}

/// Long format: one row per (athlete, stat column). Columns without a stat
/// name are dropped.
pub fn melt(full: &[SeasonStat]) -> Vec<CleanStat> {
    let mut long = Vec::new();

    for column in 0..crate::domain::model::STAT_COLUMNS {
        for row in full {
            let (stat, value) = row.pairs()[column];
            if stat.trim().is_empty() {
                continue;
            }
            long.push(CleanStat {
                year: row.year.clone(),
                category: row.category.clone(),
                stat_type: row.stat_type.clone(),
                stat_name: row.stat_name.clone(),
                link: row.link.clone(),
                description: row.description.clone(),
                rank: row.rank.clone(),
                athlete: row.athlete.clone(),
                stat: stat.to_string(),
                value: value.to_string(),
            });
        }
    }

    long.sort_by(clean_order);

    let mut seen = HashSet::new();
    long.retain(|r| {
        seen.insert((
            r.category.clone(),
            r.stat_name.clone(),
            r.year.clone(),
            r.stat.clone(),
            r.rank.clone(),
            r.athlete.clone(),
        ))
    });
    long
}
