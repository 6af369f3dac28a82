use serde::{Deserialize, Serialize};

/// Number of (stat name, stat value) column pairs kept from a leaderboard.
pub const STAT_COLUMNS: usize = 7;

/// A stat page discovered on one of the category pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLink {
    pub master: String,
    pub stat: String,
    pub stat_link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatDescription {
    pub year: String,
    pub stat_name: String,
    pub link: String,
    pub category: String,
    pub description: String,
}

/// One leaderboard table as it appears on a season page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasonTable {
    pub stat_names: [String; STAT_COLUMNS],
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    pub rank: String,
    pub rank_last: String,
    pub athlete: String,
    pub values: [String; STAT_COLUMNS],
}

/// A leaderboard row tagged with the stat it was scraped for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasonRow {
    pub year: String,
    pub stat_name: String,
    pub link: String,
    pub category: String,
    pub rank: String,
    pub rank_last: String,
    pub athlete: String,
    pub stat_names: [String; STAT_COLUMNS],
    pub values: [String; STAT_COLUMNS],
}

/// Wide record written to the season files and the full dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonStat {
    pub year: String,
    pub category: String,
    #[serde(rename = "type")]
    pub stat_type: String,
    pub stat_name: String,
    pub link: String,
    pub description: String,
    pub rank: String,
    pub athlete: String,
    pub stat1_name: String,
    pub stat1: String,
    pub stat2_name: String,
    pub stat2: String,
    pub stat3_name: String,
    pub stat3: String,
    pub stat4_name: String,
    pub stat4: String,
    pub stat5_name: String,
    pub stat5: String,
    pub stat6_name: String,
    pub stat6: String,
    pub stat7_name: String,
    pub stat7: String,
}

impl SeasonStat {
    pub fn pairs(&self) -> [(&str, &str); STAT_COLUMNS] {
        [
            (self.stat1_name.as_str(), self.stat1.as_str()),
            (self.stat2_name.as_str(), self.stat2.as_str()),
            (self.stat3_name.as_str(), self.stat3.as_str()),
            (self.stat4_name.as_str(), self.stat4.as_str()),
            (self.stat5_name.as_str(), self.stat5.as_str()),
            (self.stat6_name.as_str(), self.stat6.as_str()),
            (self.stat7_name.as_str(), self.stat7.as_str()),
        ]
    }

    pub fn set_pairs(&mut self, names: [String; STAT_COLUMNS], values: [String; STAT_COLUMNS]) {
        let [n1, n2, n3, n4, n5, n6, n7] = names;
        let [v1, v2, v3, v4, v5, v6, v7] = values;
        self.stat1_name = n1;
        self.stat1 = v1;
        self.stat2_name = n2;
        self.stat2 = v2;
        self.stat3_name = n3;
        self.stat3 = v3;
        self.stat4_name = n4;
        self.stat4 = v4;
        self.stat5_name = n5;
        self.stat5 = v5;
        self.stat6_name = n6;
        self.stat6 = v6;
        self.stat7_name = n7;
        self.stat7 = v7;
    }
}

/// Long-format record: one stat value per row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanStat {
    pub year: String,
    pub category: String,
    #[serde(rename = "type")]
    pub stat_type: String,
    pub stat_name: String,
    pub link: String,
    pub description: String,
    pub rank: String,
    pub athlete: String,
    pub stat: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonReport {
    pub year: u16,
    pub collected: Vec<String>,
    pub failed: Vec<String>,
    pub rows: usize,
    pub minutes: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionReport {
    pub generated_at: String,
    pub stat_links: usize,
    pub descriptions: usize,
    pub seasons: Vec<SeasonReport>,
    pub full_rows: usize,
    pub clean_rows: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SeasonScrape {
    pub year: u16,
    pub rows: Vec<SeasonRow>,
    pub report: SeasonReport,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractResult {
    pub links: Vec<StatLink>,
    pub descriptions: Vec<StatDescription>,
    pub seasons: Vec<SeasonScrape>,
}

#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub links: Vec<StatLink>,
    pub descriptions: Vec<StatDescription>,
    pub seasons: Vec<(u16, Vec<SeasonStat>)>,
    pub reports: Vec<SeasonReport>,
}

impl TransformResult {
    pub fn season_rows(&self) -> usize {
        self.seasons.iter().map(|(_, rows)| rows.len()).sum()
    }
}
