//! Job store: the list of recordings to fetch, their credentials, and the
//! checkpoints written back after failed runs.

mod sink;
mod spec;
mod store;

pub use sink::{CheckpointSink, JobStoreFile, MemorySink};
pub use spec::{encode_checkpoint, parse_timestamp, JobEntryError, JobSpec};
pub use store::{JobStore, DEFAULT_JOB_STORE};
