//! Image Ingest Function
//!
//! Serverless function that receives snapshots from IoT camera devices as
//! Base64 text inside a JSON event, decodes them and stores the JPEG bytes
//! in an S3 bucket under a timestamp-derived key.
//!
//! ## Flow
//!
//! ```text
//! {"picture": "<base64>"} ──▶ decode ──▶ object key ──▶ S3 PutObject ──▶ 200
//!                               │                            │
//!                               ▼                            ▼
//!                              400                          500
//! ```
//!
//! Each invocation is independent. The S3 client is created once per process
//! and injected into [`ImageIngestHandler`] through the [`ObjectStore`] trait.

pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod lambda;
pub mod object_key;
pub mod storage;

pub use config::Config;
pub use error::{IngestError, StorageError};
pub use event::{InboundEvent, InvocationResult};
pub use handler::ImageIngestHandler;
pub use lambda::function_handler;
pub use object_key::{KeyTimezone, ObjectKeyGenerator};
pub use storage::{ObjectStore, S3ObjectStore};
