use crate::adapters::html;
use crate::core::table::{from_csv_bytes, to_csv_bytes};
use crate::core::transform::{clean_descriptions, clean_season_rows, consolidate, melt, merge_descriptions};
use crate::domain::model::{
    CleanStat, CollectionReport, ExtractResult, SeasonRow, SeasonScrape, SeasonStat, SeasonReport,
    StatDescription, StatLink, TransformResult,
};
use crate::domain::ports::{ConfigProvider, PageFetcher, Pipeline, Storage};
use crate::domain::services::{category_from_master, clean_text, index_url, season_url};
use crate::utils::error::{EtlError, Result};
use crate::utils::monitor::minutes;
use std::collections::HashSet;
use std::time::Instant;

pub const LINKS_DIR: &str = "stats/links";
pub const SEASONS_DIR: &str = "stats/seasons";
pub const LINKS_FILE: &str = "stats/links/StatLinks.csv";
pub const DESCRIPTIONS_FILE: &str = "stats/links/StatLinks_Descriptions.csv";
pub const FULL_FILE: &str = "stats/PGATourStats_Full.csv";
pub const CLEAN_FILE: &str = "stats/PGATourStats_Full_Clean.csv";
pub const REPORT_FILE: &str = "stats/collection_report.json";

pub fn season_file(year: u16) -> String {
    format!("{}/PGATourStats_{}.csv", SEASONS_DIR, year)
}

pub struct StatsPipeline<S: Storage, F: PageFetcher, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) fetcher: F,
    pub(crate) config: C,
}

impl<S: Storage, F: PageFetcher, C: ConfigProvider> StatsPipeline<S, F, C> {
    pub fn new(storage: S, fetcher: F, config: C) -> Self {
        Self {
            storage,
            fetcher,
            config,
        }
    }

    pub async fn check_dirs(&self) -> Result<()> {
        tracing::info!("Checking for directories within path - creating folders if not existing...");
        for dir in [LINKS_DIR, SEASONS_DIR] {
            if self.storage.ensure_dir(dir).await? {
                tracing::info!("{} - CREATED", dir);
            } else {
                tracing::info!("{} - EXISTS", dir);
            }
        }
        Ok(())
    }

    /// Every stat page linked from every category page. The stats index must
    /// be reachable; a category page that fails is skipped.
    pub async fn links(&self) -> Result<Vec<StatLink>> {
        let base = self.config.base_url();
        let index = index_url(base);
        let page = self.fetcher.fetch(&index).await?;
        let categories = html::parse_category_links(&page, &index, base)?;
        tracing::debug!("Found {} category pages", categories.len());

        let mut links = Vec::new();
        for category in &categories {
            let found = match self.fetcher.fetch(category).await {
                Ok(page) => html::parse_stat_links(&page, category, base),
                Err(e) => Err(e),
            };
            match found {
                Ok(found) => {
                    tracing::debug!("{} stats listed on {}", found.len(), category);
                    links.extend(found);
                }
                Err(e) if e.is_skippable() => {
                    tracing::warn!("Category {} NOT COLLECTED - ERROR: {}", category, e);
                }
                Err(e) => return Err(e),
            }
        }

        if links.is_empty() {
            return Err(EtlError::ProcessingError {
                message: format!("no stat links found from {}", index),
            });
        }

        tracing::info!("Stat links collected ({})", links.len());
        Ok(links)
    }

    /// Stat descriptions rarely change, so an existing descriptions file is
    /// reused when the configuration allows it. Stats missing from that file
    /// are still fetched and appended.
    pub async fn descriptions(&self, links: &[StatLink]) -> Result<Vec<StatDescription>> {
        let mut descriptions = Vec::with_capacity(links.len());

        if self.config.reuse_descriptions() && self.storage.exists(DESCRIPTIONS_FILE).await {
            let data = self.storage.read_file(DESCRIPTIONS_FILE).await?;
            let saved: Vec<StatDescription> = from_csv_bytes(&data)?;
            tracing::info!(
                "Reusing {} stat descriptions from {}",
                saved.len(),
                DESCRIPTIONS_FILE
            );
            descriptions = saved;
        }

        let known: HashSet<(String, String)> = descriptions
            .iter()
            .map(|d| (d.category.clone(), d.stat_name.clone()))
            .collect();
        let missing: Vec<&StatLink> = links
            .iter()
            .filter(|link| {
                !known.contains(&(category_from_master(&link.master), clean_text(&link.stat)))
            })
            .collect();

        if !known.is_empty() && !missing.is_empty() {
            tracing::info!("{} stats have no saved description", missing.len());
        }

        for link in missing {
            descriptions.push(self.fetch_description(link).await?);
        }

        tracing::info!("Stat descriptions collected ({})", descriptions.len());
        Ok(clean_descriptions(descriptions))
    }

    async fn fetch_description(&self, link: &StatLink) -> Result<StatDescription> {
        let year = self.config.description_year();
        let url = season_url(&link.stat_link, year);
        let description = match self.fetcher.fetch(&url).await {
            Ok(page) => {
                tracing::debug!("{} - {} COLLECTED", year, link.stat);
                html::parse_description(&page)?
            }
            Err(e) if e.is_skippable() => {
                tracing::warn!("{} - {} NOT COLLECTED - ERROR: {}", year, link.stat, e);
                String::new()
            }
            Err(e) => return Err(e),
        };

        Ok(StatDescription {
            year: year.to_string(),
            stat_name: link.stat.clone(),
            link: link.stat_link.clone(),
            category: category_from_master(&link.master),
            description,
        })
    }

    pub async fn scrape_season(&self, links: &[StatLink], year: u16) -> Result<SeasonScrape> {
        let started = Instant::now();
        let total = links.len();
        let mut rows = Vec::new();
        let mut report = SeasonReport {
            year,
            ..Default::default()
        };

        for (num, link) in links.iter().enumerate() {
            let url = season_url(&link.stat_link, year);
            let table = match self.fetcher.fetch(&url).await {
                Ok(page) => html::parse_season_table(&page, &url),
                Err(e) => Err(e),
            };

            match table {
                Ok(table) => {
                    let category = category_from_master(&link.master);
                    for table_row in table.rows {
                        rows.push(SeasonRow {
                            year: year.to_string(),
                            stat_name: link.stat.clone(),
                            link: link.stat_link.clone(),
                            category: category.clone(),
                            rank: table_row.rank,
                            rank_last: table_row.rank_last,
                            athlete: table_row.athlete,
                            stat_names: table.stat_names.clone(),
                            values: table_row.values,
                        });
                    }
                    report.collected.push(link.stat.clone());
                    tracing::info!("{} - Stat {}/{} COLLECTED", year, num + 1, total);
                }
                Err(e) if e.is_skippable() => {
                    report.failed.push(link.stat.clone());
                    tracing::warn!("{} - {} NOT COLLECTED - ERROR: {}", year, link.stat, e);
                }
                Err(e) => return Err(e),
            }
        }

        report.rows = rows.len();
        report.minutes = minutes(started.elapsed());
        tracing::info!("{} Stats collected in {} minutes.", year, report.minutes);

        Ok(SeasonScrape { year, rows, report })
    }

    /// Rebuilds the full and long-format datasets from every season file on
    /// disk, including seasons collected by earlier runs.
    pub async fn collect_full(&self) -> Result<(Vec<SeasonStat>, Vec<CleanStat>)> {
        let mut all = Vec::new();
        for name in self.storage.list_files(SEASONS_DIR, "csv").await? {
            let path = format!("{}/{}", SEASONS_DIR, name);
            let data = self.storage.read_file(&path).await?;
            let season: Vec<SeasonStat> = from_csv_bytes(&data)?;
            tracing::debug!("Read {} rows from {}", season.len(), path);
            all.extend(season);
        }

        let full = consolidate(all);
        tracing::info!("Cleaning up stats dataset...");
        let clean = melt(&full);
        Ok((full, clean))
    }
}

#[async_trait::async_trait]
impl<S: Storage, F: PageFetcher, C: ConfigProvider> Pipeline for StatsPipeline<S, F, C> {
    async fn extract(&self) -> Result<ExtractResult> {
        self.check_dirs().await?;

        let links = self.links().await?;
        let descriptions = self.descriptions(&links).await?;

        let mut seasons = Vec::new();
        for &year in self.config.years() {
            seasons.push(self.scrape_season(&links, year).await?);
        }

        Ok(ExtractResult {
            links,
            descriptions,
            seasons,
        })
    }

    async fn transform(&self, data: ExtractResult) -> Result<TransformResult> {
        let ExtractResult {
            links,
            descriptions,
            seasons,
        } = data;

        let mut merged = Vec::with_capacity(seasons.len());
        let mut reports = Vec::with_capacity(seasons.len());
        for season in seasons {
            let rows = clean_season_rows(season.rows);
            merged.push((season.year, merge_descriptions(rows, &descriptions, season.year)));
            reports.push(season.report);
        }

        Ok(TransformResult {
            links,
            descriptions,
            seasons: merged,
            reports,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        self.storage
            .write_file(LINKS_FILE, &to_csv_bytes(&result.links)?)
            .await?;
        tracing::info!("Stat links saved to {}", LINKS_FILE);

        self.storage
            .write_file(DESCRIPTIONS_FILE, &to_csv_bytes(&result.descriptions)?)
            .await?;

        for (year, rows) in &result.seasons {
            let path = season_file(*year);
            self.storage.write_file(&path, &to_csv_bytes(rows)?).await?;
            tracing::info!("{} season saved to {} ({} rows)", year, path, rows.len());
        }

        let (full, clean) = self.collect_full().await?;
        self.storage.write_file(FULL_FILE, &to_csv_bytes(&full)?).await?;
        self.storage
            .write_file(CLEAN_FILE, &to_csv_bytes(&clean)?)
            .await?;
        tracing::info!("Full stats dataset cleaned and saved to file");

        let report = CollectionReport {
            generated_at: chrono::Local::now().to_rfc3339(),
            stat_links: result.links.len(),
            descriptions: result.descriptions.len(),
            seasons: result.reports,
            full_rows: full.len(),
            clean_rows: clean.len(),
        };
        let json = serde_json::to_string_pretty(&report)?;
        self.storage.write_file(REPORT_FILE, json.as_bytes()).await?;

        Ok(format!(
            "{}/{}",
            self.config.output_path().trim_end_matches('/'),
            CLEAN_FILE
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliConfig;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    const BASE: &str = "http://stats.test";

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_text(&self, path: &str) -> Option<String> {
            let files = self.files.lock().await;
            files
                .get(path)
                .map(|data| String::from_utf8_lossy(data).into_owned())
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn exists(&self, path: &str) -> bool {
            self.files.lock().await.contains_key(path)
        }

        async fn list_files(&self, dir: &str, extension: &str) -> Result<Vec<String>> {
            let prefix = format!("{}/", dir);
            let suffix = format!(".{}", extension);
            let files = self.files.lock().await;
            Ok(files
                .keys()
                .filter_map(|k| k.strip_prefix(&prefix))
                .filter(|name| !name.contains('/') && name.ends_with(&suffix))
                .map(str::to_string)
                .collect())
        }

        async fn ensure_dir(&self, _dir: &str) -> Result<bool> {
            Ok(false)
        }
    }

    #[derive(Default)]
    struct MockFetcher {
        pages: HashMap<String, String>,
    }

    impl MockFetcher {
        fn with_page(mut self, path: &str, html: &str) -> Self {
            self.pages.insert(format!("{}{}", BASE, path), html.to_string());
            self
        }
    }

    impl PageFetcher for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| EtlError::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    fn config(years: Vec<u16>) -> CliConfig {
        CliConfig {
            base_url: BASE.to_string(),
            output_path: "out".to_string(),
            years,
            ..Default::default()
        }
    }

    const INDEX: &str = r#"<div class="page-container"><div class="navigation section"><ul>
        <li><a href="/stats.html">Overview</a></li>
        <li><a href="/stats/categories.RSCR_INQ.html">Scoring</a></li>
        <li><a href="/stats/categories.RPUT_INQ.html">Putting</a></li>
        </ul></div></div>"#;

    const SCORING: &str = r#"<div class="section categories"><ul>
        <li><a href="/stats/stat.120.html">Scoring Average</a></li>
        </ul></div>"#;

    const PUTTING: &str = r#"<div class="section categories"><ul>
        <li><a href="/stats/stat.119.html">Putts Per Round</a></li>
        </ul></div>"#;

    fn season_page(rows: &[(&str, &str, &str)]) -> String {
        let body: String = rows
            .iter()
            .map(|(rank, athlete, avg)| {
                format!(
                    "<tr><td>{}</td><td>1</td><td>{}</td><td>80</td><td>{}</td></tr>",
                    rank, athlete, avg
                )
            })
            .collect();
        format!(
            r#"<table id="statsTable"><tr><th>RANK</th><th>LAST</th><th>PLAYER</th><th>ROUNDS</th><th>AVG</th></tr>{}</table>
            <div class="content-footer"><p>Footer
description.</p></div>"#,
            body
        )
    }

    fn fetcher() -> MockFetcher {
        MockFetcher::default()
            .with_page("/stats.html", INDEX)
            .with_page("/stats/categories.RSCR_INQ.html", SCORING)
            .with_page("/stats/categories.RPUT_INQ.html", PUTTING)
            .with_page(
                "/stats/stat.120.2019.html",
                &season_page(&[("T1", "Rory McIlroy", "69.057"), ("T1", "Brooks Koepka", "69.1")]),
            )
            .with_page(
                "/stats/stat.120.2018.html",
                &season_page(&[("1", "Dustin Johnson", "68.698")]),
            )
    }

    #[tokio::test]
    async fn test_links_discovers_stats_per_category() {
        let pipeline = StatsPipeline::new(MockStorage::default(), fetcher(), config(vec![2019]));

        let links = pipeline.links().await.unwrap();

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].stat, "Scoring Average");
        assert_eq!(links[0].stat_link, "http://stats.test/stats/stat.120.");
        assert_eq!(
            links[0].master,
            "http://stats.test/stats/categories.RSCR_INQ.html"
        );
        assert_eq!(links[1].stat, "Putts Per Round");
    }

    #[tokio::test]
    async fn test_links_skips_unreachable_category() {
        let fetcher = MockFetcher::default()
            .with_page("/stats.html", INDEX)
            .with_page("/stats/categories.RSCR_INQ.html", SCORING);
        let pipeline = StatsPipeline::new(MockStorage::default(), fetcher, config(vec![2019]));

        let links = pipeline.links().await.unwrap();
        assert_eq!(links.len(), 1);
    }

    #[tokio::test]
    async fn test_links_fails_without_index() {
        let pipeline =
            StatsPipeline::new(MockStorage::default(), MockFetcher::default(), config(vec![2019]));
        let err = pipeline.links().await.unwrap_err();
        assert!(matches!(err, EtlError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_descriptions_tolerate_missing_pages() {
        let pipeline = StatsPipeline::new(MockStorage::default(), fetcher(), config(vec![2019]));
        let links = pipeline.links().await.unwrap();

        let descriptions = pipeline.descriptions(&links).await.unwrap();

        assert_eq!(descriptions.len(), 2);
        assert_eq!(descriptions[0].year, "2019");
        assert_eq!(descriptions[0].category, "RSCR");
        assert_eq!(descriptions[0].description, "Footerdescription.");
        // stat.119 has no 2019 page
        assert_eq!(descriptions[1].category, "RPUT");
        assert_eq!(descriptions[1].description, "");
    }

    #[tokio::test]
    async fn test_descriptions_reused_from_storage() {
        let storage = MockStorage::default();
        let saved = vec![StatDescription {
            year: "2019".to_string(),
            stat_name: "Scoring Average".to_string(),
            link: "http://stats.test/stats/stat.120.".to_string(),
            category: "RSCR".to_string(),
            description: "Saved earlier.".to_string(),
        }];
        storage
            .write_file(DESCRIPTIONS_FILE, &to_csv_bytes(&saved).unwrap())
            .await
            .unwrap();

        let mut cfg = config(vec![2019]);
        cfg.reuse_descriptions = true;
        // no pages at all: reuse must not hit the network
        let pipeline = StatsPipeline::new(storage, MockFetcher::default(), cfg);

        let descriptions = pipeline.descriptions(&[]).await.unwrap();
        assert_eq!(descriptions, saved);
    }

    #[tokio::test]
    async fn test_reused_descriptions_fetch_newly_listed_stats() {
        let storage = MockStorage::default();
        let saved = vec![StatDescription {
            year: "2019".to_string(),
            stat_name: "Scoring Average".to_string(),
            link: "http://stats.test/stats/stat.120.".to_string(),
            category: "RSCR".to_string(),
            description: "Saved earlier.".to_string(),
        }];
        storage
            .write_file(DESCRIPTIONS_FILE, &to_csv_bytes(&saved).unwrap())
            .await
            .unwrap();

        let mut cfg = config(vec![2019]);
        cfg.reuse_descriptions = true;
        let fetcher = fetcher().with_page(
            "/stats/stat.119.2019.html",
            r#"<div class="content-footer"><p>Putts per round played.</p></div>"#,
        );
        let pipeline = StatsPipeline::new(storage, fetcher, cfg);
        let links = pipeline.links().await.unwrap();

        let descriptions = pipeline.descriptions(&links).await.unwrap();

        assert_eq!(descriptions.len(), 2);
        assert_eq!(descriptions[0].description, "Saved earlier.");
        assert_eq!(descriptions[1].stat_name, "Putts Per Round");
        assert_eq!(descriptions[1].category, "RPUT");
        assert_eq!(descriptions[1].description, "Putts per round played.");
    }

    #[tokio::test]
    async fn test_scrape_season_records_failures() {
        let pipeline = StatsPipeline::new(MockStorage::default(), fetcher(), config(vec![2019]));
        let links = pipeline.links().await.unwrap();

        let season = pipeline.scrape_season(&links, 2019).await.unwrap();

        assert_eq!(season.rows.len(), 2);
        assert_eq!(season.rows[0].category, "RSCR");
        assert_eq!(season.rows[0].rank, "T1");
        assert_eq!(season.rows[0].stat_names[1], "AVG");
        assert_eq!(season.report.collected, vec!["Scoring Average".to_string()]);
        assert_eq!(season.report.failed, vec!["Putts Per Round".to_string()]);
        assert_eq!(season.report.rows, 2);
    }

    #[tokio::test]
    async fn test_full_run_writes_all_outputs() {
        let storage = MockStorage::default();
        let pipeline = StatsPipeline::new(storage.clone(), fetcher(), config(vec![2018, 2019]));

        let extracted = pipeline.extract().await.unwrap();
        let transformed = pipeline.transform(extracted).await.unwrap();
        let path = pipeline.load(transformed).await.unwrap();

        assert_eq!(path, "out/stats/PGATourStats_Full_Clean.csv");

        let links = storage.get_text(LINKS_FILE).await.unwrap();
        assert!(links.starts_with("master,stat,stat_link\n"));

        let season = storage.get_text(&season_file(2019)).await.unwrap();
        let season: Vec<SeasonStat> = from_csv_bytes(season.as_bytes()).unwrap();
        // two athletes for scoring plus the description-only putting row
        assert_eq!(season.len(), 3);
        assert_eq!(season[0].category, "RPUT");
        assert_eq!(season[0].athlete, "");
        assert_eq!(season[1].rank, "1");
        assert_eq!(season[1].stat_type, "Scoring");
        assert_eq!(season[1].description, "Footerdescription.");

        let full: Vec<SeasonStat> =
            from_csv_bytes(storage.get_text(FULL_FILE).await.unwrap().as_bytes()).unwrap();
        assert_eq!(full.len(), 5);

        let clean: Vec<CleanStat> =
            from_csv_bytes(storage.get_text(CLEAN_FILE).await.unwrap().as_bytes()).unwrap();
        // 3 athletes x 2 named stat columns
        assert_eq!(clean.len(), 6);
        assert!(clean.iter().all(|r| !r.stat.is_empty()));
        assert_eq!(clean[0].year, "2018");
        assert_eq!(clean[0].stat, "AVG");
        assert_eq!(clean[0].athlete, "Dustin Johnson");

        let report = storage.get_text(REPORT_FILE).await.unwrap();
        let report: CollectionReport = serde_json::from_str(&report).unwrap();
        assert_eq!(report.seasons.len(), 2);
        assert_eq!(report.clean_rows, 6);
    }

    #[tokio::test]
    async fn test_load_merges_seasons_from_earlier_runs() {
        let storage = MockStorage::default();
        let earlier = vec![SeasonStat {
            year: "2017".to_string(),
            category: "RSCR".to_string(),
            stat_type: "Scoring".to_string(),
            stat_name: "Scoring Average".to_string(),
            rank: "1".to_string(),
            athlete: "Jordan Spieth".to_string(),
            stat1_name: "AVG".to_string(),
            stat1: "68.846".to_string(),
            ..Default::default()
        }];
        storage
            .write_file(&season_file(2017), &to_csv_bytes(&earlier).unwrap())
            .await
            .unwrap();

        let pipeline = StatsPipeline::new(storage.clone(), fetcher(), config(vec![2019]));
        let extracted = pipeline.extract().await.unwrap();
        let transformed = pipeline.transform(extracted).await.unwrap();
        pipeline.load(transformed).await.unwrap();

        let (full, clean) = pipeline.collect_full().await.unwrap();
        assert!(full.iter().any(|r| r.year == "2017"));
        assert!(full.iter().any(|r| r.year == "2019"));
        assert_eq!(clean[0].athlete, "Jordan Spieth");
    }
}
