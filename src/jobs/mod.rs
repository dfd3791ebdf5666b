//! Background jobs.
//!
//! Jobs are persisted with apalis in Postgres and processed by the
//! `jobs work` command.

mod email_job;
mod queue;

pub use email_job::{email_job_handler, EmailJob};
pub use queue::{connect_storage, EmailQueue, PostgresEmailQueue};

#[cfg(any(test, feature = "test-utils"))]
pub use queue::MockEmailQueue;
