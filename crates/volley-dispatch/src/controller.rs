//! Job lifecycle: at most one running broadcast job per controller.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::attach::AttachmentResolver;
use crate::cycle::{run_job, JobContext};
use crate::log::LogBuffer;
use crate::transport::Transport;
use crate::types::{DispatchStatus, JobParams, LogKind};

/// Mutable job state. One instance per controller; every access goes
/// through the mutex and the lock is never held across an await.
pub(crate) struct JobState {
    pub(crate) running: bool,
    /// Bumped on every start. Log appends from job tasks carry the
    /// generation they were spawned with and are dropped when stale.
    pub(crate) generation: u64,
    pub(crate) stop_tx: Option<watch::Sender<bool>>,
    pub(crate) task: Option<JoinHandle<()>>,
    pub(crate) logs: LogBuffer,
}

/// Append on behalf of a job task, unless the job has been replaced.
pub(crate) fn append_scoped(
    state: &Mutex<JobState>,
    generation: u64,
    kind: LogKind,
    message: String,
) {
    let mut st = state.lock().unwrap();
    if st.generation == generation {
        st.logs.append(kind, message);
    }
}

/// Owns the start/stop lifecycle of the recurring broadcast job.
///
/// Constructed once at process startup and shared behind `Arc` with the
/// HTTP handlers — there is no ambient global. `start` and `stop` must be
/// called from within a Tokio runtime (the job runs as a spawned task).
pub struct DispatchController {
    state: Arc<Mutex<JobState>>,
    transport: Arc<dyn Transport>,
    resolver: Arc<AttachmentResolver>,
}

impl DispatchController {
    pub fn new(transport: Arc<dyn Transport>, resolver: AttachmentResolver) -> Self {
        Self {
            state: Arc::new(Mutex::new(JobState {
                running: false,
                generation: 0,
                stop_tx: None,
                task: None,
                logs: LogBuffer::new(),
            })),
            transport,
            resolver: Arc::new(resolver),
        }
    }

    /// Replace any running job with a new one.
    ///
    /// Cancels the previous job's timer, clears the log, appends the start
    /// banner and arms the job task. Returns once the job is armed; the
    /// first cycle begins immediately in the background and its progress is
    /// observable only through [`status`](Self::status).
    pub fn start(&self, params: JobParams) {
        let mut st = self.state.lock().unwrap();

        cancel_job(&mut st);
        st.generation += 1;
        st.logs.clear();
        st.logs.append(
            LogKind::Info,
            format!(
                "Starting automation. Delay: {}s. Channels: {}",
                params.delay_secs,
                params.channel_ids.len()
            ),
        );
        info!(
            channels = params.channel_ids.len(),
            delay_secs = params.delay_secs,
            images = params.image_refs.len(),
            "broadcast job starting"
        );

        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run_job(JobContext {
            params,
            generation: st.generation,
            stop_rx,
            state: Arc::clone(&self.state),
            transport: Arc::clone(&self.transport),
            resolver: Arc::clone(&self.resolver),
        }));

        st.stop_tx = Some(stop_tx);
        st.task = Some(task);
        st.running = true;
    }

    /// Stop the running job. Idempotent — a stop on an already-stopped
    /// controller still appends its "stopped" entry (the dashboard shows
    /// every operator action), and never fails.
    pub fn stop(&self) {
        let mut st = self.state.lock().unwrap();
        cancel_job(&mut st);
        st.running = false;
        st.logs.append(LogKind::Info, "Automation stopped.");
        info!("broadcast job stopped");
    }

    /// Non-blocking snapshot of the running flag and the rolling log.
    pub fn status(&self) -> DispatchStatus {
        let st = self.state.lock().unwrap();
        DispatchStatus {
            running: st.running,
            logs: st.logs.snapshot(),
        }
    }
}

/// Signal the current job task (if any) to stop and release its handle.
///
/// The task exits at its next stop check; an in-flight delivery call is
/// allowed to finish. Dropping the handle does not abort the task.
fn cancel_job(st: &mut JobState) {
    if let Some(tx) = st.stop_tx.take() {
        let _ = tx.send(true);
    }
    st.task.take();
}
