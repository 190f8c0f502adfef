pub mod app;
pub mod engine;
pub mod indexer;
pub mod job;
pub mod task;
pub mod wordcount;
pub mod worker;

pub use app::{app_by_name, KeyValue, MapReduceApp, APP_NAMES};
pub use job::{JobInfo, JobStatus};
pub use task::{Assignment, TaskKind};
pub use worker::{
    TaskAssignmentRequest, TaskAssignmentResponse, TaskCompleteRequest, TaskCompleteResponse,
    WorkerId,
};
