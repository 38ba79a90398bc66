//! `volley-dispatch` — the recurring broadcast engine.
//!
//! # Overview
//!
//! A [`controller::DispatchController`] owns at most one running job at a
//! time. Starting a job replaces any previous one, clears the rolling log,
//! runs a first delivery cycle immediately, and then re-runs a cycle at the
//! configured interval until stopped. One cycle walks the target channel
//! list in order, sending the configured message to each channel with an
//! attachment-then-text fallback, and records every outcome in a bounded
//! log that the dashboard polls.
//!
//! # Guarantees
//!
//! | Property        | Behaviour                                            |
//! |-----------------|------------------------------------------------------|
//! | Single job      | `start` fully cancels the previous job first         |
//! | No overlap      | cycles are awaited in the job task; overdue ticks skip |
//! | Bounded log     | 100 entries, FIFO eviction, cleared on every start   |
//! | Stop            | timer never fires again; in-flight cycle halts at the next target |
//! | Failure model   | per-target errors are logged and never abort a cycle |

pub mod attach;
pub mod controller;
mod cycle;
pub mod error;
pub mod log;
pub mod transport;
pub mod types;

pub use attach::AttachmentResolver;
pub use controller::DispatchController;
pub use error::{DispatchError, Result};
pub use transport::{DiscordTransport, FilePart, Transport};
pub use types::{DispatchStatus, JobParams, LogEntry, LogKind};
