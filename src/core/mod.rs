pub mod etl;
pub mod table;
pub mod transform;

pub use crate::app::pipelines::stats_pipeline::StatsPipeline;
pub use crate::domain::model::{ExtractResult, TransformResult};
pub use crate::domain::ports::{ConfigProvider, PageFetcher, Pipeline, Storage};
pub use crate::utils::error::Result;
