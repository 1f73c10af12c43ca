use super::Client;
use crate::core::client::Client as HttpClient;
use crate::core::error::Result;
use crate::core::request::{null_as_default, RequestOption, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const QUEUE_METRICS_PATH: &str = "/sidekiq/queue_metrics";
const PROCESS_METRICS_PATH: &str = "/sidekiq/process_metrics";
const JOB_STATS_PATH: &str = "/sidekiq/job_stats";
const COMPOUND_METRICS_PATH: &str = "/sidekiq/compound_metrics";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueMetrics {
    pub queues: BTreeMap<String, QueueMetric>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueMetric {
    pub backlog: i64,
    /// Seconds the oldest job has been waiting.
    pub latency: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessMetrics {
    pub processes: Vec<ProcessMetric>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessMetric {
    pub hostname: String,
    pub pid: i64,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub queues: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    pub concurrency: i64,
    pub busy: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStats {
    pub jobs: JobCounters,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCounters {
    pub processed: i64,
    pub failed: i64,
    pub enqueued: i64,
}

/// All three snapshots as returned by a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundMetrics {
    #[serde(flatten)]
    pub queue_metrics: QueueMetrics,
    #[serde(flatten)]
    pub process_metrics: ProcessMetrics,
    #[serde(flatten)]
    pub job_stats: JobStats,
}

/// Sidekiq monitoring, `/sidekiq/*`.
#[allow(async_fn_in_trait)]
pub trait SidekiqMetrics {
    async fn get_queue_metrics(&self, options: &[RequestOption]) -> Result<QueueMetrics>;
    async fn get_process_metrics(&self, options: &[RequestOption]) -> Result<ProcessMetrics>;
    async fn get_job_stats(&self, options: &[RequestOption]) -> Result<JobStats>;
    async fn get_compound_metrics(&self, options: &[RequestOption]) -> Result<CompoundMetrics>;
}

pub struct SidekiqService<'c> {
    client: &'c HttpClient<'c>,
}

const _: fn() = || {
    fn assert_impl<T: SidekiqMetrics>() {}
    assert_impl::<SidekiqService<'static>>();
};

impl<'c> SidekiqService<'c> {
    pub fn new(client: &'c HttpClient<'c>) -> Self {
        Self { client }
    }

    async fn fetch<R>(&self, path: &str, options: &[RequestOption]) -> Result<R>
    where
        R: serde::de::DeserializeOwned,
    {
        let url = self.client.endpoint(path, None::<&str>)?;

        self.client.get(url, options).await.map(Response::into_data)
    }
}

impl SidekiqMetrics for SidekiqService<'_> {
    async fn get_queue_metrics(&self, options: &[RequestOption]) -> Result<QueueMetrics> {
        self.fetch(QUEUE_METRICS_PATH, options).await
    }

    async fn get_process_metrics(&self, options: &[RequestOption]) -> Result<ProcessMetrics> {
        self.fetch(PROCESS_METRICS_PATH, options).await
    }

    async fn get_job_stats(&self, options: &[RequestOption]) -> Result<JobStats> {
        self.fetch(JOB_STATS_PATH, options).await
    }

    async fn get_compound_metrics(&self, options: &[RequestOption]) -> Result<CompoundMetrics> {
        self.fetch(COMPOUND_METRICS_PATH, options).await
    }
}

impl<'a> Client<'a> {
    pub fn sidekiq(&self) -> SidekiqService<'_> {
        SidekiqService::new(&self.http_client)
    }
}
