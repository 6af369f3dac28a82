use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::{minutes, SystemMonitor};
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Runs extract, transform and load; returns the path of the long-format dataset.
    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting stats collection...");

        // Extract
        let raw = self.pipeline.extract().await?;
        let scraped: usize = raw.seasons.iter().map(|s| s.rows.len()).sum();
        tracing::info!(
            "Extracted {} stat links, {} descriptions, {} season rows",
            raw.links.len(),
            raw.descriptions.len(),
            scraped
        );
        self.monitor.log_stats("Extract");

        // Transform
        let transformed = self.pipeline.transform(raw).await?;
        tracing::info!(
            "Merged {} rows across {} season(s)",
            transformed.season_rows(),
            transformed.seasons.len()
        );
        self.monitor.log_stats("Transform");

        // Load
        let output_path = self.pipeline.load(transformed).await?;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        tracing::info!(
            "Stats updated in {} minutes.",
            minutes(started.elapsed())
        );
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        ExtractResult, SeasonRow, SeasonScrape, StatLink, TransformResult,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingPipeline {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Pipeline for RecordingPipeline {
        async fn extract(&self) -> Result<ExtractResult> {
            assert_eq!(self.calls.fetch_add(1, Ordering::SeqCst), 0);
            Ok(ExtractResult {
                links: vec![StatLink {
                    master: "m".to_string(),
                    stat: "s".to_string(),
                    stat_link: "l".to_string(),
                }],
                descriptions: vec![],
                seasons: vec![SeasonScrape {
                    year: 2019,
                    rows: vec![SeasonRow::default()],
                    report: Default::default(),
                }],
            })
        }

        async fn transform(&self, data: ExtractResult) -> Result<TransformResult> {
            assert_eq!(self.calls.fetch_add(1, Ordering::SeqCst), 1);
            assert_eq!(data.seasons[0].rows.len(), 1);
            Ok(TransformResult {
                links: data.links,
                ..Default::default()
            })
        }

        async fn load(&self, result: TransformResult) -> Result<String> {
            assert_eq!(self.calls.fetch_add(1, Ordering::SeqCst), 2);
            assert_eq!(result.links.len(), 1);
            Ok("out/stats/PGATourStats_Full_Clean.csv".to_string())
        }
    }

    #[tokio::test]
    async fn test_run_executes_phases_in_order() {
        let engine = EtlEngine::new(RecordingPipeline::default());
        let path = engine.run().await.unwrap();

        assert_eq!(path, "out/stats/PGATourStats_Full_Clean.csv");
        assert_eq!(engine.pipeline().calls.load(Ordering::SeqCst), 3);
    }

    struct FailingPipeline;

    #[async_trait::async_trait]
    impl Pipeline for FailingPipeline {
        async fn extract(&self) -> Result<ExtractResult> {
            Err(crate::utils::error::EtlError::ProcessingError {
                message: "no stat links".to_string(),
            })
        }

        async fn transform(&self, _data: ExtractResult) -> Result<TransformResult> {
            unreachable!("transform must not run after a failed extract")
        }

        async fn load(&self, _result: TransformResult) -> Result<String> {
            unreachable!("load must not run after a failed extract")
        }
    }

    #[tokio::test]
    async fn test_run_stops_on_extract_error() {
        let engine = EtlEngine::new(FailingPipeline);
        assert!(engine.run().await.is_err());
    }
}
