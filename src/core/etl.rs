use crate::core::{Pipeline, TransformResult};
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;

/// What a finished run hands back to the caller.
#[derive(Debug, Clone)]
pub struct EtlOutput {
    pub output_path: String,
    pub result: TransformResult,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: RunMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<EtlOutput> {
        tracing::info!("🚀 Starting sales ETL process");

        let rows = self.pipeline.extract().await?;
        tracing::info!("Extracted {} data rows", rows.len());
        self.monitor.finish_phase("extract");

        let result = self.pipeline.transform(rows).await?;
        tracing::info!(
            "Transformed {} records ({} valid)",
            result.records.len(),
            result.valid_records.len()
        );
        self.monitor.finish_phase("transform");

        let output_path = self.pipeline.load(&result).await?;
        tracing::info!("Report saved to: {}", output_path);
        self.monitor.finish_phase("load");
        self.monitor.log_final_stats();

        Ok(EtlOutput {
            output_path,
            result,
        })
    }
}
