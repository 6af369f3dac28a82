pub mod stats_pipeline;
