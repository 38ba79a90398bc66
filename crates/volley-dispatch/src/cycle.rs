//! The cycle executor — one full in-order pass over the target channels.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::attach::AttachmentResolver;
use crate::controller::{append_scoped, JobState};
use crate::error::{DispatchError, Result};
use crate::transport::Transport;
use crate::types::{JobParams, LogKind};

/// Delay between consecutive targets within one cycle, to stay under
/// upstream rate limits. Fixed — unrelated to the job interval.
pub(crate) const TARGET_PACING: Duration = Duration::from_secs(1);

/// Everything one job task needs. Owned by the task; the shared state is
/// only touched through [`append_scoped`] so entries from a replaced job
/// can never land in its successor's log.
pub(crate) struct JobContext {
    pub(crate) params: JobParams,
    pub(crate) generation: u64,
    pub(crate) stop_rx: watch::Receiver<bool>,
    pub(crate) state: Arc<Mutex<JobState>>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) resolver: Arc<AttachmentResolver>,
}

impl JobContext {
    fn log(&self, kind: LogKind, message: String) {
        append_scoped(&self.state, self.generation, kind, message);
    }
}

/// Job task body: first cycle immediately, then one cycle per interval tick
/// until the stop signal is observed.
///
/// Cycles are awaited inside the loop and overdue ticks are skipped, so two
/// cycles can never interleave against the same log.
pub(crate) async fn run_job(ctx: JobContext) {
    // interval() panics on a zero period; params are validated upstream but
    // a panic inside a detached task would be silent.
    let period = Duration::from_secs(ctx.params.delay_secs.max(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut stop_rx = ctx.stop_rx.clone();
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_cycle(&ctx).await;
                if *ctx.stop_rx.borrow() {
                    break;
                }
            }
            res = stop_rx.changed() => {
                if res.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
        }
    }
    debug!(generation = ctx.generation, "job task exiting");
}

/// One pass over `channel_ids` in list order. Checks the stop signal before
/// every target; a stop observed mid-cycle abandons the remaining targets
/// but never aborts a delivery call already in flight.
pub(crate) async fn run_cycle(ctx: &JobContext) {
    ctx.log(LogKind::Info, "Executing cycle...".to_string());

    for channel_id in &ctx.params.channel_ids {
        if *ctx.stop_rx.borrow() {
            break;
        }
        attempt_target(ctx, channel_id).await;
        tokio::time::sleep(TARGET_PACING).await;
    }
}

/// Deliver to a single channel: attachment attempt first when images are
/// configured, unconditional text fallback on its failure. All errors are
/// absorbed into the log.
async fn attempt_target(ctx: &JobContext, channel_id: &str) {
    let mut delivered = false;

    if !ctx.params.image_refs.is_empty() {
        match send_with_attachments(ctx, channel_id).await {
            Ok(()) => {
                ctx.log(LogKind::Success, format!("Sent to {channel_id} with images"));
                delivered = true;
            }
            Err(e) => {
                ctx.log(
                    LogKind::Error,
                    format!("Image send failed in {channel_id}: {e}"),
                );
            }
        }
    }

    if !delivered {
        match ctx
            .transport
            .send_text(&ctx.params.token, channel_id, &ctx.params.message)
            .await
        {
            Ok(()) => ctx.log(LogKind::Success, format!("Sent text to {channel_id}")),
            Err(e) => ctx.log(LogKind::Error, format!("Failed {channel_id}: {e}")),
        }
    }
}

async fn send_with_attachments(ctx: &JobContext, channel_id: &str) -> Result<()> {
    let files = ctx.resolver.resolve(&ctx.params.image_refs).await;
    if files.is_empty() {
        return Err(DispatchError::NoUsableAttachment {
            count: ctx.params.image_refs.len(),
        });
    }
    ctx.transport
        .send_with_files(&ctx.params.token, channel_id, &ctx.params.message, files)
        .await
}
