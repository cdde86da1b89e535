//! One game, owned by one worker task.
//!
//! Turns reach the worker over a bounded channel and are handled strictly one
//! after another, so two turns of the same session never race. Every accepted
//! turn publishes a fresh [`Snapshot`].

use std::sync::Arc;

use cardroom::{visualize_state, winning_team, GameKind, GameState, RuleEngine, Status, Turn};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::{GameRecord, ReplaySink, SessionError};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The state of a session after some number of accepted turns.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub session: SessionId,
    /// Number of turns applied so far.
    pub version: u64,
    pub state: Arc<GameState>,
}

pub(crate) type TurnReply = oneshot::Sender<Result<Snapshot, SessionError>>;

pub(crate) enum Command {
    SubmitTurn { turn: Turn, reply: TurnReply },
}

/// What the registry keeps about a running (or finished) session.
pub(crate) struct SessionHandle {
    pub(crate) kind: GameKind,
    pub(crate) commands: mpsc::Sender<Command>,
    pub(crate) snapshots: watch::Receiver<Snapshot>,
}

pub(crate) struct SessionWorker {
    engine: Box<dyn RuleEngine>,
    current: Snapshot,
    snapshots: watch::Sender<Snapshot>,
    record: GameRecord,
    sink: Option<Arc<dyn ReplaySink>>,
}

impl SessionWorker {
    /// Starts the worker task for a freshly dealt game.
    ///
    /// Must be called from within a Tokio runtime.
    pub(crate) fn spawn(
        engine: Box<dyn RuleEngine>,
        state: GameState,
        record: GameRecord,
        queue_depth: usize,
        sink: Option<Arc<dyn ReplaySink>>,
    ) -> SessionHandle {
        let current = Snapshot {
            session: record.session,
            version: 0,
            state: Arc::new(state),
        };
        let kind = engine.kind();
        let (commands_tx, commands_rx) = mpsc::channel(queue_depth.max(1));
        let (snapshots_tx, snapshots_rx) = watch::channel(current.clone());
        let worker = SessionWorker {
            engine,
            current,
            snapshots: snapshots_tx,
            record,
            sink,
        };
        tokio::spawn(worker.run(commands_rx));
        SessionHandle {
            kind,
            commands: commands_tx,
            snapshots: snapshots_rx,
        }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        let session = self.current.session;
        while let Some(command) = commands.recv().await {
            match command {
                Command::SubmitTurn { turn, reply } => {
                    let result = self.submit(&turn);
                    // The submitter may have stopped waiting, which is fine
                    let _ = reply.send(result);
                }
            }
            if self.current.state.status == Status::Ended {
                break;
            }
        }
        // Anything still queued is answered with `GameEnded` when the
        // channel and its reply senders are dropped.
        commands.close();
        if self.current.state.status == Status::Ended {
            self.finish().await;
        } else {
            debug!(%session, "Session closed before the game ended");
        }
    }

    fn submit(&mut self, turn: &Turn) -> Result<Snapshot, SessionError> {
        let session = self.current.session;
        match self.engine.play(&self.current.state, turn) {
            Ok(next) => {
                if let Some(applied) = &next.last_turn {
                    self.record.turns.push(applied.clone());
                }
                self.current = Snapshot {
                    session,
                    version: self.current.version + 1,
                    state: Arc::new(next),
                };
                debug!(
                    %session,
                    version = self.current.version,
                    player = turn.player(),
                    "Applied turn"
                );
                self.snapshots.send_replace(self.current.clone());
                Ok(self.current.clone())
            }
            Err(err) => {
                debug!(%session, player = turn.player(), %err, "Rejected turn");
                Err(SessionError::Turn(err))
            }
        }
    }

    async fn finish(mut self) {
        let session = self.current.session;
        let state = &self.current.state;
        self.record.player_status = state.player_status.clone();
        if self.record.kind == GameKind::Fish {
            self.record.winning_team = winning_team(state);
        }
        info!(
            %session,
            game = %self.record.kind,
            turns = self.record.turns.len(),
            "Game ended"
        );
        debug!("\n{}", visualize_state(state));

        let Some(sink) = self.sink else {
            return;
        };
        let record = self.record;
        // Sinks may do blocking file I/O
        match tokio::task::spawn_blocking(move || sink.store(&record)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(%session, "Could not store the game record: {:#}", err),
            Err(err) => warn!(%session, %err, "Storing the game record failed"),
        }
    }
}
