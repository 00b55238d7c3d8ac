//! Cell actors.
//!
//! A cell is split in two:
//!
//! - [`CellState`] is the finite-state record (trap flag, occupant kind,
//!   registered eviction notifier) with synchronous transitions. It has no
//!   knowledge of tasks or channels beyond the notifier it may hold.
//! - The actor loop owns one `CellState` and applies mailbox commands to it
//!   one at a time. [`CellHandle`] is the only way in.
//!
//! # Traps
//!
//! A trap is armed while free. The first reservation of an armed trap
//! returns [`ReserveOutcome::TrapTriggered`] and marks the cell occupied so
//! no second agent can trigger it concurrently. When the victim releases it,
//! the trap re-arms and the cell emits a fresh `#` birth event. A searching
//! squatter that touches a trap hands it back with `abandon` instead, which
//! re-arms it without a birth event.
//!
//! # Eviction
//!
//! A traveler reserving a squatter-held cell makes the cell send a
//! best-effort [`Kick`] to the squatter and is still denied. The kick
//! channel holds one pending notification; further kicks while one is
//! pending are coalesced.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use travelers_events::{Event, EventSender};
use travelers_types::{
    CellStatus, Coordinate, EntityId, EventClock, OccupantKind, ReserveOutcome, Symbol,
};

use crate::error::WorldError;

/// Eviction notification delivered to a squatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kick;

/// Sending half of a squatter's eviction channel, held by the cell.
#[derive(Debug, Clone)]
pub struct EvictionNotifier {
    tx: mpsc::Sender<Kick>,
}

impl EvictionNotifier {
    /// Send a kick without waiting. Returns `false` when the kick was
    /// coalesced with a pending one or the squatter is gone.
    pub fn kick(&self) -> bool {
        self.tx.try_send(Kick).is_ok()
    }
}

/// Receiving half of a squatter's eviction channel.
#[derive(Debug)]
pub struct EvictionInbox {
    rx: mpsc::Receiver<Kick>,
}

impl EvictionInbox {
    /// Wait for the next kick. `None` once every notifier is gone.
    pub async fn recv(&mut self) -> Option<Kick> {
        self.rx.recv().await
    }

    /// Take a pending kick, if any, without waiting.
    pub fn try_recv(&mut self) -> Option<Kick> {
        self.rx.try_recv().ok()
    }
}

/// Create a single-slot, lossy eviction channel.
pub fn eviction_channel() -> (EvictionNotifier, EvictionInbox) {
    let (tx, rx) = mpsc::channel(1);
    (EvictionNotifier { tx }, EvictionInbox { rx })
}

/// Occupancy state of one cell.
///
/// Invariant: `occupant` is always a single value, and every change goes
/// through [`reserve`](Self::reserve),
/// [`squatter_reserve`](Self::squatter_reserve) or
/// [`release`](Self::release).
#[derive(Debug)]
pub struct CellState {
    coord: Coordinate,
    is_trap: bool,
    occupant: OccupantKind,
    eviction: Option<EvictionNotifier>,
}

impl CellState {
    /// A free cell. `is_trap` is fixed for the cell's lifetime.
    pub const fn new(coord: Coordinate, is_trap: bool) -> Self {
        Self {
            coord,
            is_trap,
            occupant: OccupantKind::None,
            eviction: None,
        }
    }

    /// This cell's coordinate.
    pub const fn coord(&self) -> Coordinate {
        self.coord
    }

    /// Whether this cell is a trap.
    pub const fn is_trap(&self) -> bool {
        self.is_trap
    }

    /// Current occupant.
    pub const fn occupant(&self) -> OccupantKind {
        self.occupant
    }

    /// Traveler reservation.
    ///
    /// A squatter-held cell is sent a kick as a side effect; the request is
    /// denied either way.
    pub fn reserve(&mut self) -> ReserveOutcome {
        match self.occupant {
            OccupantKind::None => {
                self.occupant = OccupantKind::Traveler;
                if self.is_trap {
                    ReserveOutcome::TrapTriggered
                } else {
                    ReserveOutcome::Granted
                }
            }
            OccupantKind::Squatter => {
                if let Some(notifier) = &self.eviction {
                    let delivered = notifier.kick();
                    debug!(cell = %self.coord, delivered, "kicked squatter");
                }
                ReserveOutcome::Denied
            }
            OccupantKind::Traveler => ReserveOutcome::Denied,
        }
    }

    /// Squatter reservation. Never evicts anyone.
    ///
    /// A triggered trap is marked traveler-occupied, exactly as for
    /// [`reserve`](Self::reserve).
    pub fn squatter_reserve(&mut self) -> ReserveOutcome {
        match self.occupant {
            OccupantKind::None if self.is_trap => {
                self.occupant = OccupantKind::Traveler;
                ReserveOutcome::TrapTriggered
            }
            OccupantKind::None => {
                self.occupant = OccupantKind::Squatter;
                ReserveOutcome::Granted
            }
            OccupantKind::Traveler | OccupantKind::Squatter => ReserveOutcome::Denied,
        }
    }

    /// Attach the current squatter's eviction notifier.
    ///
    /// Ignored unless a squatter holds the cell, so a stale registration can
    /// never kick a later occupant. Returns whether it was accepted.
    pub fn register_eviction(&mut self, notifier: EvictionNotifier) -> bool {
        if self.occupant == OccupantKind::Squatter {
            self.eviction = Some(notifier);
            true
        } else {
            false
        }
    }

    /// Free the cell unconditionally. Idempotent.
    ///
    /// Returns `true` when this release re-armed a triggered trap.
    pub fn release(&mut self) -> bool {
        let rearmed = self.is_trap && self.occupant != OccupantKind::None;
        self.occupant = OccupantKind::None;
        self.eviction = None;
        rearmed
    }

    /// Give the cell back without a death having happened there.
    ///
    /// Same transition as [`release`](Self::release), but a trap that was
    /// only touched comes back armed silently, so the caller never sees a
    /// rebirth.
    pub fn abandon(&mut self) {
        self.occupant = OccupantKind::None;
        self.eviction = None;
    }

    /// Snapshot for observers. A trap reports [`CellStatus::Trap`] whatever
    /// its occupancy.
    pub const fn status(&self) -> CellStatus {
        if self.is_trap {
            return CellStatus::Trap;
        }
        match self.occupant {
            OccupantKind::None => CellStatus::Free,
            OccupantKind::Traveler => CellStatus::OccupiedTraveler,
            OccupantKind::Squatter => CellStatus::OccupiedSquatter,
        }
    }
}

/// Mailbox messages understood by a cell actor.
#[derive(Debug)]
enum CellCommand {
    Reserve {
        requester: EntityId,
        reply: oneshot::Sender<ReserveOutcome>,
    },
    SquatterReserve {
        requester: EntityId,
        reply: oneshot::Sender<ReserveOutcome>,
    },
    RegisterEviction {
        notifier: EvictionNotifier,
    },
    Release {
        requester: EntityId,
        reply: oneshot::Sender<()>,
    },
    Abandon {
        requester: EntityId,
        reply: oneshot::Sender<()>,
    },
    Status {
        reply: oneshot::Sender<CellStatus>,
    },
}

/// Cloneable address of a running cell actor.
#[derive(Debug, Clone)]
pub struct CellHandle {
    coord: Coordinate,
    tx: mpsc::Sender<CellCommand>,
}

impl CellHandle {
    /// Start a cell actor on the current tokio runtime.
    ///
    /// A trap cell emits its birth event before serving any request. The
    /// actor stops once every handle to it has been dropped.
    pub fn spawn(
        state: CellState,
        events: EventSender,
        clock: EventClock,
        mailbox_capacity: usize,
    ) -> Self {
        let coord = state.coord();
        let (tx, rx) = mpsc::channel(mailbox_capacity.max(1));
        tokio::spawn(run_cell(state, rx, events, clock));
        Self { coord, tx }
    }

    /// The coordinate this handle addresses.
    pub const fn coord(&self) -> Coordinate {
        self.coord
    }

    /// Reserve the cell for a traveler.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MailboxClosed`] if the actor has stopped.
    pub async fn reserve(&self, requester: EntityId) -> Result<ReserveOutcome, WorldError> {
        self.request(|reply| CellCommand::Reserve { requester, reply })
            .await
    }

    /// Reserve the cell for a squatter.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MailboxClosed`] if the actor has stopped.
    pub async fn squatter_reserve(
        &self,
        requester: EntityId,
    ) -> Result<ReserveOutcome, WorldError> {
        self.request(|reply| CellCommand::SquatterReserve { requester, reply })
            .await
    }

    /// Register a squatter's eviction notifier with the cell. Does not wait
    /// for the actor to process it; later requests from the same caller are
    /// still ordered after it.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MailboxClosed`] if the actor has stopped.
    pub async fn register_eviction_channel(
        &self,
        notifier: EvictionNotifier,
    ) -> Result<(), WorldError> {
        self.tx
            .send(CellCommand::RegisterEviction { notifier })
            .await
            .map_err(|closed| {
                debug!(command = ?closed.0, "register on stopped cell");
                WorldError::MailboxClosed(self.coord)
            })
    }

    /// Free the cell. Always succeeds while the actor runs.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MailboxClosed`] if the actor has stopped.
    pub async fn release(&self, requester: EntityId) -> Result<(), WorldError> {
        self.request(|reply| CellCommand::Release { requester, reply })
            .await
    }

    /// Free the cell without announcing a trap rebirth. Used when a trap was
    /// triggered by someone who does not die on it.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MailboxClosed`] if the actor has stopped.
    pub async fn abandon(&self, requester: EntityId) -> Result<(), WorldError> {
        self.request(|reply| CellCommand::Abandon { requester, reply })
            .await
    }

    /// Read-only snapshot of the cell.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MailboxClosed`] if the actor has stopped.
    pub async fn status(&self) -> Result<CellStatus, WorldError> {
        self.request(|reply| CellCommand::Status { reply }).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> CellCommand,
    ) -> Result<T, WorldError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|closed| {
                debug!(command = ?closed.0, "request to stopped cell");
                WorldError::MailboxClosed(self.coord)
            })?;
        response
            .await
            .map_err(|dropped| {
                debug!(error = %dropped, "cell dropped reply");
                WorldError::MailboxClosed(self.coord)
            })
    }
}

async fn run_cell(
    mut state: CellState,
    mut mailbox: mpsc::Receiver<CellCommand>,
    events: EventSender,
    clock: EventClock,
) {
    let coord = state.coord();
    if state.is_trap() {
        emit_trap_birth(coord, &events, clock).await;
    }

    while let Some(command) = mailbox.recv().await {
        match command {
            CellCommand::Reserve { requester, reply } => {
                let outcome = state.reserve();
                debug!(cell = %coord, %requester, ?outcome, "reserve");
                let _ = reply.send(outcome);
            }
            CellCommand::SquatterReserve { requester, reply } => {
                let outcome = state.squatter_reserve();
                debug!(cell = %coord, %requester, ?outcome, "squatter reserve");
                let _ = reply.send(outcome);
            }
            CellCommand::RegisterEviction { notifier } => {
                if !state.register_eviction(notifier) {
                    debug!(cell = %coord, "eviction channel ignored, no squatter present");
                }
            }
            CellCommand::Release { requester, reply } => {
                if state.release() {
                    debug!(cell = %coord, %requester, "trap re-armed");
                    emit_trap_birth(coord, &events, clock).await;
                }
                let _ = reply.send(());
            }
            CellCommand::Abandon { requester, reply } => {
                state.abandon();
                debug!(cell = %coord, %requester, "abandoned");
                let _ = reply.send(());
            }
            CellCommand::Status { reply } => {
                let _ = reply.send(state.status());
            }
        }
    }

    debug!(cell = %coord, "cell actor stopped");
}

async fn emit_trap_birth(coord: Coordinate, events: &EventSender, clock: EventClock) {
    let event = Event {
        timestamp_nanos: clock.now_nanos(),
        entity: EntityId::trap(coord),
        coord,
        symbol: Symbol::TRAP,
    };
    if let Err(e) = events.emit(event).await {
        warn!(cell = %coord, error = %e, "trap birth event lost");
    }
}
