//! Poll controller.
//!
//! The [`PollController`] is a cheap, cloneable handle to an actor task
//! that owns the [`TagSession`] and the pending-poll bookkeeping. Every
//! mutation happens on that task, one message at a time.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  Command   ┌──────────────────────┐
//! │ Controller │───(mpsc)──►│                      │
//! │ handles    │◄─(oneshot)─│      Poll actor      │
//! └────────────┘            │                      │
//!                           │  pending poll        │
//! ┌────────────┐  Event     │  poll timer          │
//! │ Discovery  │───(mpsc)──►│  TagSession          │
//! │ callback   │            │                      │
//! └────────────┘            └──────────────────────┘
//! ┌────────────┐  Event          ▲
//! │ Poll timer │─────────────────┘
//! └────────────┘
//! ```
//!
//! The discovery callback and the poll timer race to resolve a poll. Both
//! only enqueue an event tagged with the poll's sequence number; the actor
//! resolves the poll with whichever event it handles first and discards
//! the other as stale.
//!
//! # Examples
//!
//! ```
//! use nfckit_hardware::mock::{MockAdapter, MockTechnology};
//! use nfckit_hardware::types::{IsoDepInfo, NfcAInfo, RawTag};
//! use nfckit_session::{PollConfig, PollController};
//!
//! #[tokio::main]
//! async fn main() -> nfckit_core::Result<()> {
//!     let (adapter, handle) = MockAdapter::new();
//!     let controller = PollController::spawn(adapter, PollConfig::default());
//!
//!     let card = MockTechnology::iso_dep();
//!     card.push_response(vec![0x90, 0x00]);
//!
//!     let poll = tokio::spawn({
//!         let controller = controller.clone();
//!         async move { controller.poll(None).await }
//!     });
//!
//!     while !handle.is_discovery_enabled() {
//!         tokio::task::yield_now().await;
//!     }
//!     handle.present_tag(
//!         RawTag::builder(vec![0x04, 0xA2, 0xB3, 0xC4])
//!             .nfc_a(NfcAInfo { atqa: vec![0x00, 0x04], sak: 0x20 })
//!             .iso_dep(IsoDepInfo::default(), card)
//!             .build(),
//!     );
//!
//!     let identity = poll.await.expect("poll task panicked")?;
//!     assert_eq!(identity.id_hex(), "04a2b3c4");
//!
//!     let response = controller.transceive_hex("00A4040000").await?;
//!     assert_eq!(response, "9000");
//!
//!     controller.finish().await;
//!     Ok(())
//! }
//! ```

use crate::classifier::{self, Classification};
use crate::config::PollConfig;
use crate::session::{SessionState, TagSession};
use nfckit_core::{Availability, Result, TagError, TagIdentity, codec};
use nfckit_hardware::{DiscoveryCallback, NfcAdapter, RawTag, TechKind};
use serde::Serialize;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::AbortHandle;
use tracing::{debug, info, trace, warn};

/// Snapshot of the controller's session bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    /// A poll is waiting for a tag.
    pub pending: bool,
    pub state: SessionState,
    /// Technology bound by the last successful poll.
    pub bound: Option<TechKind>,
}

enum Command {
    Poll {
        timeout: Duration,
        reply: oneshot::Sender<Result<TagIdentity>>,
    },
    Finish {
        reply: oneshot::Sender<()>,
    },
    Transceive {
        command: Vec<u8>,
        reply: oneshot::Sender<Result<Vec<u8>>>,
    },
    ReadSpecialUid {
        reply: oneshot::Sender<Result<Vec<u8>>>,
    },
    Status {
        reply: oneshot::Sender<SessionStatus>,
    },
    Detach {
        reply: oneshot::Sender<()>,
    },
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

enum Event<T> {
    Discovered { seq: u64, tag: RawTag<T> },
    TimerFired { seq: u64 },
}

/// Handle to the poll actor.
///
/// Cloning is cheap; all clones talk to the same session. The actor stops
/// on [`detach`](Self::detach) or once every handle has been dropped, in
/// both cases closing the session and leaving reader mode.
pub struct PollController<A: NfcAdapter> {
    adapter: Arc<A>,
    commands: mpsc::Sender<Command>,
    default_timeout: Duration,
}

impl<A: NfcAdapter> Clone for PollController<A> {
    fn clone(&self) -> Self {
        Self {
            adapter: Arc::clone(&self.adapter),
            commands: self.commands.clone(),
            default_timeout: self.default_timeout,
        }
    }
}

impl<A: NfcAdapter> std::fmt::Debug for PollController<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollController")
            .field("default_timeout", &self.default_timeout)
            .field("running", &!self.commands.is_closed())
            .finish()
    }
}

impl<A: NfcAdapter> PollController<A> {
    /// Take ownership of the adapter and start the actor task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(adapter: A, config: PollConfig) -> Self {
        let adapter = Arc::new(adapter);
        let default_timeout = config.default_timeout();
        let (commands_tx, commands_rx) = mpsc::channel(config.command_buffer.max(1));
        let (actor, events_rx) = PollActor::new(Arc::clone(&adapter), config);

        tokio::spawn(actor.run(commands_rx, events_rx));

        Self {
            adapter,
            commands: commands_tx,
            default_timeout,
        }
    }

    /// Report whether the device can poll for tags right now.
    pub fn availability(&self) -> Availability {
        if !self.adapter.is_present() {
            Availability::NotSupported
        } else if !self.adapter.is_enabled() {
            Availability::Disabled
        } else {
            Availability::Available
        }
    }

    /// Wait for a tag to enter the field.
    ///
    /// `None` uses the configured default window (20 s unless changed).
    /// On success the tag's command channel is bound to the session,
    /// replacing any previous one.
    ///
    /// # Errors
    ///
    /// - [`TagError::Unavailable`] if the radio is absent or off
    /// - [`TagError::Unsupported`] if another poll is still pending
    /// - [`TagError::Timeout`] if no tag appeared within the window
    /// - [`TagError::Cancelled`] if [`finish`](Self::finish) or
    ///   [`detach`](Self::detach) ran first
    pub async fn poll(&self, timeout: Option<Duration>) -> Result<TagIdentity> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        self.request(|reply| Command::Poll { timeout, reply })
            .await
            .unwrap_or(Err(TagError::Unavailable))
    }

    /// Cancel a pending poll, close the session and leave reader mode.
    ///
    /// Never fails; calling it with nothing open is a no-op.
    pub async fn finish(&self) {
        let _ = self.request(|reply| Command::Finish { reply }).await;
    }

    /// Exchange one command APDU with the polled tag.
    pub async fn transceive(&self, command: &[u8]) -> Result<Vec<u8>> {
        let command = command.to_vec();
        self.request(|reply| Command::Transceive { command, reply })
            .await
            .unwrap_or(Err(TagError::NoSession))
    }

    /// [`transceive`](Self::transceive) with hex in and hex out.
    pub async fn transceive_hex(&self, command: &str) -> Result<String> {
        let command = codec::decode(command)?;
        let response = self.transceive(&command).await?;
        Ok(codec::encode(&response))
    }

    /// Read the proprietary UID of a bare Type B card.
    pub async fn read_special_uid(&self) -> Result<Vec<u8>> {
        self.request(|reply| Command::ReadSpecialUid { reply })
            .await
            .unwrap_or(Err(TagError::NoSession))
    }

    /// [`read_special_uid`](Self::read_special_uid) as lowercase hex.
    pub async fn read_special_uid_hex(&self) -> Result<String> {
        let uid = self.read_special_uid().await?;
        Ok(codec::encode(&uid))
    }

    /// Current session bookkeeping.
    pub async fn status(&self) -> SessionStatus {
        self.request(|reply| Command::Status { reply })
            .await
            .unwrap_or(SessionStatus {
                pending: false,
                state: SessionState::Closed,
                bound: None,
            })
    }

    /// Tear the session down and stop the actor.
    ///
    /// Other clones of this handle see [`TagError::Unavailable`] on poll
    /// and [`TagError::NoSession`] on transceive afterwards.
    pub async fn detach(&self) {
        let _ = self.request(|reply| Command::Detach { reply }).await;
    }

    async fn request<R>(&self, command: impl FnOnce(oneshot::Sender<R>) -> Command) -> Option<R> {
        let (reply, response) = oneshot::channel();
        self.commands.send(command(reply)).await.ok()?;
        response.await.ok()
    }
}

struct PendingPoll {
    seq: u64,
    timeout: Duration,
    reply: oneshot::Sender<Result<TagIdentity>>,
    timer: PollTimer,
}

/// Timeout for one poll. Dropping it cancels the timer task.
struct PollTimer(AbortHandle);

impl PollTimer {
    fn start<T: Send + 'static>(
        seq: u64,
        timeout: Duration,
        events: mpsc::UnboundedSender<Event<T>>,
    ) -> Self {
        let task = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = events.send(Event::TimerFired { seq });
        });
        Self(task.abort_handle())
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.0.abort();
    }
}

struct PollActor<A: NfcAdapter> {
    adapter: Arc<A>,
    config: PollConfig,
    session: TagSession<A::Technology>,
    pending: Option<PendingPoll>,
    next_seq: u64,
    events: mpsc::UnboundedSender<Event<A::Technology>>,
}

impl<A: NfcAdapter> PollActor<A> {
    fn new(
        adapter: Arc<A>,
        config: PollConfig,
    ) -> (Self, mpsc::UnboundedReceiver<Event<A::Technology>>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let actor = Self {
            adapter,
            config,
            session: TagSession::new(),
            pending: None,
            next_seq: 0,
            events: events_tx,
        };
        (actor, events_rx)
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut events: mpsc::UnboundedReceiver<Event<A::Technology>>,
    ) {
        debug!("Poll controller started");

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        debug!("All controller handles dropped");
                        self.teardown().await;
                        break;
                    };
                    if self.handle_command(command).await.is_break() {
                        break;
                    }
                }
                Some(event) = events.recv() => self.handle_event(event).await,
            }
        }

        debug!("Poll controller stopped");
    }

    async fn handle_command(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::Poll { timeout, reply } => self.start_poll(timeout, reply),
            Command::Finish { reply } => {
                self.teardown().await;
                let _ = reply.send(());
            }
            Command::Transceive { command, reply } => {
                let _ = reply.send(self.session.transceive(&command).await);
            }
            Command::ReadSpecialUid { reply } => {
                let _ = reply.send(self.session.read_special_uid().await);
            }
            Command::Status { reply } => {
                let _ = reply.send(self.status());
            }
            Command::Detach { reply } => {
                info!("Detaching poll controller");
                self.teardown().await;
                let _ = reply.send(());
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    async fn handle_event(&mut self, event: Event<A::Technology>) {
        match event {
            Event::Discovered { seq, tag } => self.on_discovered(seq, tag).await,
            Event::TimerFired { seq } => self.on_timer(seq).await,
        }
    }

    fn start_poll(&mut self, timeout: Duration, reply: oneshot::Sender<Result<TagIdentity>>) {
        if !self.adapter.is_enabled() {
            debug!("Poll rejected, NFC adapter unavailable");
            let _ = reply.send(Err(TagError::Unavailable));
            return;
        }

        if let Some(pending) = &self.pending {
            if !pending.reply.is_closed() {
                debug!(seq = pending.seq, "Poll rejected, another poll is pending");
                let _ = reply.send(Err(TagError::unsupported(
                    "poll while another poll is pending",
                )));
                return;
            }
            debug!(seq = pending.seq, "Previous poll abandoned by its caller");
            self.pending = None;
        }

        self.next_seq += 1;
        let seq = self.next_seq;
        let timer = PollTimer::start(seq, timeout, self.events.clone());

        let events = self.events.clone();
        let on_tag: DiscoveryCallback<A::Technology> =
            Arc::new(move |tag: RawTag<A::Technology>| {
                let _ = events.send(Event::Discovered { seq, tag });
            });

        if let Err(e) = self.adapter.enable_discovery(self.config.discovery, on_tag) {
            warn!("Failed to enable discovery: {}", e);
            let _ = reply.send(Err(TagError::Unavailable));
            return;
        }

        info!(seq, timeout_ms = millis(timeout), "Polling for tag");
        self.pending = Some(PendingPoll {
            seq,
            timeout,
            reply,
            timer,
        });
    }

    async fn on_discovered(&mut self, seq: u64, tag: RawTag<A::Technology>) {
        let Some(pending) = self.pending.take_if(|p| p.seq == seq) else {
            debug!(seq, id = %codec::encode(&tag.id), "Discarding late tag discovery");
            return;
        };
        drop(pending.timer);

        let Classification { identity, binding } = classifier::classify(tag);
        self.session.bind(binding).await;

        info!(
            seq,
            tag_type = %identity.tag_type,
            standard = identity.standard,
            id = %identity.id_hex(),
            "Tag discovered"
        );

        if pending.reply.send(Ok(identity)).is_err() {
            debug!(seq, "Poll caller gone, releasing tag");
            self.teardown().await;
        }
    }

    async fn on_timer(&mut self, seq: u64) {
        let Some(pending) = self.pending.take_if(|p| p.seq == seq) else {
            trace!(seq, "Ignoring stale poll timer");
            return;
        };

        self.disable_discovery();
        self.session.close().await;

        let duration_ms = millis(pending.timeout);
        info!(seq, duration_ms, "Polling timed out");
        let _ = pending.reply.send(Err(TagError::timeout(duration_ms)));
    }

    async fn teardown(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(seq = pending.seq, "Cancelling pending poll");
            let _ = pending.reply.send(Err(TagError::Cancelled));
        }
        self.session.close().await;
        self.disable_discovery();
    }

    fn disable_discovery(&self) {
        if let Err(e) = self.adapter.disable_discovery() {
            warn!("Failed to disable discovery: {}", e);
        }
    }

    fn status(&self) -> SessionStatus {
        SessionStatus {
            pending: self.pending.is_some(),
            state: self.session.state(),
            bound: self.session.bound_kind(),
        }
    }
}
