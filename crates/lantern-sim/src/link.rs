use async_trait::async_trait;
use lantern_plan::time::TimePoint;
use tokio::sync::mpsc;

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("not connected to the simulator")]
    NotConnected,

    #[error("already connected")]
    AlreadyConnected,

    #[error("simulation has not been started")]
    NotStarted,

    #[error("firmware '{name}' has not been uploaded")]
    FirmwareNotUploaded { name: String },

    #[error("set_control {target}/{control} failed: {reason}")]
    ControlFailed {
        target: String,
        control: String,
        reason: String,
    },

    #[error("read_signal {target}/{signal} failed: {reason}")]
    ReadFailed {
        target: String,
        signal: String,
        reason: String,
    },

    #[error("serial stream already taken")]
    SerialTaken,

    #[error("transport failure: {0}")]
    Transport(String),
}

/// The opaque capability surface the harness consumes from a simulator
/// backend. This is the ONLY interface between the harness and the
/// simulated device; no wire protocol is defined here.
///
/// `wait_until` and the line stream are the suspension points; set-control
/// and read-signal are quick round-trips.
#[async_trait]
pub trait Simulator: Send + Sync {
    async fn connect(&self) -> Result<(), SimError>;

    async fn disconnect(&self) -> Result<(), SimError>;

    /// Upload a static artifact (wiring descriptor, firmware image) under
    /// the name the simulation expects.
    async fn upload(&self, name: &str, contents: Vec<u8>) -> Result<(), SimError>;

    /// Start the simulation from a previously uploaded firmware image.
    async fn start(&self, firmware: &str) -> Result<(), SimError>;

    /// Suspend until the simulated clock reaches `time`.
    async fn wait_until(&self, time: TimePoint) -> Result<(), SimError>;

    async fn set_control(&self, target: &str, control: &str, level: u32) -> Result<(), SimError>;

    async fn read_signal(&self, target: &str, signal: &str) -> Result<u32, SimError>;

    /// The captured-output line stream. Single consumer; taking it twice
    /// is an error.
    async fn serial_lines(&self) -> Result<LineStream, SimError>;
}

/// Lazy, unbounded, order-preserving stream of captured output lines.
/// Ends when the backend drops its sender; not restartable.
pub struct LineStream {
    rx: mpsc::UnboundedReceiver<String>,
}

impl LineStream {
    pub fn channel() -> (mpsc::UnboundedSender<String>, LineStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, LineStream { rx })
    }

    /// Next captured line, or None once the source has ended.
    pub async fn next_line(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}
