use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cardroom::{winning_team, GameKind, PlayerId, Status, Turn, TurnError, TurnRecord};
use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{oneshot, watch};
use tracing::info;

use crate::session::{Command, SessionHandle, SessionWorker};
use crate::{GameRecord, ReplaySink, SessionError, SessionId, Snapshot};

#[derive(Clone, Debug)]
pub struct DealerConfig {
    /// Base seed for shuffling; every session derives its own seed from it.
    /// A random one is picked if not given.
    pub seed: Option<u64>,
    /// How many submitted turns may wait for a session's worker.
    pub queue_depth: usize,
}

impl Default for DealerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            queue_depth: 32,
        }
    }
}

/// How a finished game turned out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionOutcome {
    /// Finishing places in Vietcong, team numbers in Fish.
    pub player_status: BTreeMap<PlayerId, i8>,
    /// Fish only: the team with the most half-suits.
    pub winning_team: Option<u8>,
}

/// Runs any number of independent game sessions.
///
/// Turns of one session are applied one at a time, in the order they arrive;
/// different sessions proceed in parallel.
pub struct Dealer {
    sessions: DashMap<SessionId, SessionHandle>,
    next_id: AtomicU64,
    seed: u64,
    queue_depth: usize,
    sink: Option<Arc<dyn ReplaySink>>,
}

impl Dealer {
    pub fn new(config: DealerConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            next_id: AtomicU64::new(1),
            seed: config.seed.unwrap_or_else(rand::random),
            queue_depth: config.queue_depth,
            sink: None,
        }
    }

    /// Every finished game is handed to `sink`.
    pub fn with_replay_sink(mut self, sink: Arc<dyn ReplaySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Deals a new game and starts its session.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_session(
        &self,
        kind: GameKind,
        players: &[PlayerId],
    ) -> Result<(SessionId, Snapshot), SessionError> {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(id.0));
        let engine = kind.engine();
        let state = engine.deal(players, &mut rng)?;
        let record = GameRecord::new(id, kind, players.to_vec());
        let handle = SessionWorker::spawn(
            engine,
            state,
            record,
            self.queue_depth,
            self.sink.clone(),
        );
        let snapshot = handle.snapshots.borrow().clone();
        info!(
            session = %id,
            game = %kind,
            players = players.len(),
            first = %snapshot.state.current_player,
            "Started session"
        );
        self.sessions.insert(id, handle);
        Ok((id, snapshot))
    }

    /// Submits a turn and waits until the session has applied or rejected it.
    pub async fn submit_turn(&self, id: SessionId, turn: Turn) -> Result<Snapshot, SessionError> {
        // The registry guard must not be held across an await
        let commands = {
            let handle = self.handle(id)?;
            if handle.snapshots.borrow().state.status == Status::Ended {
                return Err(TurnError::GameEnded.into());
            }
            handle.commands.clone()
        };
        let (reply, response) = oneshot::channel();
        commands
            .send(Command::SubmitTurn { turn, reply })
            .await
            .map_err(|_| SessionError::Turn(TurnError::GameEnded))?;
        response
            .await
            .unwrap_or(Err(SessionError::Turn(TurnError::GameEnded)))
    }

    /// Decodes a turn in its wire form for this session's game and submits it.
    pub async fn submit_wire_turn(
        &self,
        id: SessionId,
        record: TurnRecord,
    ) -> Result<Snapshot, SessionError> {
        let kind = self.handle(id)?.kind;
        let turn = Turn::decode(kind, &record)?;
        self.submit_turn(id, turn).await
    }

    /// The most recent state of a session.
    pub fn snapshot(&self, id: SessionId) -> Result<Snapshot, SessionError> {
        Ok(self.handle(id)?.snapshots.borrow().clone())
    }

    /// A receiver that is notified whenever the session accepts a turn.
    pub fn subscribe(&self, id: SessionId) -> Result<watch::Receiver<Snapshot>, SessionError> {
        Ok(self.handle(id)?.snapshots.clone())
    }

    pub fn kind(&self, id: SessionId) -> Result<GameKind, SessionError> {
        Ok(self.handle(id)?.kind)
    }

    /// The outcome of a session, once its game has ended.
    pub fn ended_session(&self, id: SessionId) -> Option<SessionOutcome> {
        let handle = self.sessions.get(&id)?;
        let snapshot = handle.snapshots.borrow().clone();
        let state = &snapshot.state;
        (state.status == Status::Ended).then(|| SessionOutcome {
            player_status: state.player_status.clone(),
            winning_team: match handle.kind {
                GameKind::Fish => winning_team(state),
                GameKind::Vietcong => None,
            },
        })
    }

    /// Drops a session from the registry. Its worker stops once it has
    /// answered every turn already submitted.
    pub fn close_session(&self, id: SessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    pub fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    fn handle(
        &self,
        id: SessionId,
    ) -> Result<dashmap::mapref::one::Ref<'_, SessionId, SessionHandle>, SessionError> {
        self.sessions
            .get(&id)
            .ok_or(SessionError::UnknownSession(id))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use cardroom::{
        standard_deck, IllegalPlay, Malformed, OwnerRef, Transaction, TurnError, Vietcong,
    };

    use super::*;

    fn players(n: usize) -> Vec<PlayerId> {
        (1..=n).map(|i| format!("p{}", i)).collect()
    }

    #[derive(Default)]
    struct MemorySink {
        records: Mutex<Vec<GameRecord>>,
    }

    impl ReplaySink for MemorySink {
        fn store(&self, record: &GameRecord) -> anyhow::Result<()> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    fn dealer(seed: u64) -> Dealer {
        Dealer::new(DealerConfig {
            seed: Some(seed),
            ..DealerConfig::default()
        })
    }

    fn opening_play(snapshot: &Snapshot) -> Turn {
        Turn::Play {
            player: snapshot.state.current_player.clone(),
            cards: vec![Vietcong::opening_card()],
        }
    }

    #[tokio::test]
    async fn accepted_turn_bumps_the_version() {
        let dealer = dealer(1);
        let (id, start) = dealer.start_session(GameKind::Vietcong, &players(4)).unwrap();
        assert_eq!(start.version, 0);
        assert!(start.state.is_partition_of(standard_deck()));

        let mut updates = dealer.subscribe(id).unwrap();
        let after = dealer.submit_turn(id, opening_play(&start)).await.unwrap();
        assert_eq!(after.version, 1);
        assert!(after.state.cards_of(&OwnerRef::Pile).contains(Vietcong::opening_card()));
        assert!(after.state.is_partition_of(standard_deck()));

        updates.changed().await.unwrap();
        assert_eq!(updates.borrow().version, 1);
        assert_eq!(dealer.snapshot(id).unwrap().version, 1);
    }

    #[tokio::test]
    async fn rejected_turn_changes_nothing() {
        let dealer = dealer(2);
        let (id, start) = dealer.start_session(GameKind::Vietcong, &players(3)).unwrap();
        let pass = Turn::Pass {
            player: start.state.current_player.clone(),
        };
        let expected = SessionError::Turn(TurnError::IllegalCombination(
            IllegalPlay::CannotPassWhenLeading,
        ));
        assert_eq!(dealer.submit_turn(id, pass.clone()).await.unwrap_err(), expected);
        assert_eq!(dealer.submit_turn(id, pass).await.unwrap_err(), expected);
        let now = dealer.snapshot(id).unwrap();
        assert_eq!(now.version, 0);
        assert_eq!(*now.state, *start.state);
    }

    #[tokio::test]
    async fn wire_turns_are_decoded_for_the_session_game() {
        let dealer = dealer(3);
        let (id, start) = dealer.start_session(GameKind::Vietcong, &players(2)).unwrap();
        let player = start.state.current_player.clone();
        let record = TurnRecord {
            player: player.clone(),
            turn_type: cardroom::turn_type::PLAY,
            transactions: vec![Transaction {
                sender: OwnerRef::player(player.as_str()),
                receiver: OwnerRef::Pile,
                card: Vietcong::opening_card(),
                success: false,
            }],
        };
        let after = dealer.submit_wire_turn(id, record).await.unwrap();
        assert_eq!(after.version, 1);
        let unknown = TurnRecord {
            player,
            turn_type: 9,
            transactions: vec![],
        };
        assert_eq!(
            dealer.submit_wire_turn(id, unknown).await.unwrap_err(),
            SessionError::Turn(TurnError::MalformedTurn(Malformed::UnknownTurnType(9)))
        );
    }

    #[tokio::test]
    async fn unknown_sessions_and_bad_setups() {
        let dealer = dealer(4);
        assert_eq!(
            dealer.snapshot(SessionId(99)).unwrap_err(),
            SessionError::UnknownSession(SessionId(99))
        );
        assert!(dealer.ended_session(SessionId(99)).is_none());
        assert!(matches!(
            dealer.start_session(GameKind::Fish, &players(5)),
            Err(SessionError::Setup(_))
        ));
        let (id, _) = dealer.start_session(GameKind::Fish, &players(4)).unwrap();
        assert_eq!(dealer.session_ids(), vec![id]);
        assert!(dealer.close_session(id));
        assert!(dealer.kind(id).is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_turns_for_one_session_are_applied_one_at_a_time() {
        let dealer = Arc::new(dealer(6));
        let (id, start) = dealer.start_session(GameKind::Vietcong, &players(4)).unwrap();
        let opener = start.state.current_player.clone();
        let mut submissions = tokio::task::JoinSet::new();
        for _ in 0..16 {
            let dealer = dealer.clone();
            let turn = opening_play(&start);
            submissions.spawn(async move { dealer.submit_turn(id, turn).await });
        }

        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        while let Some(result) = submissions.join_next().await {
            match result.unwrap() {
                Ok(snapshot) => accepted.push(snapshot),
                Err(err) => rejected.push(err),
            }
        }
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].version, 1);
        assert_eq!(rejected.len(), 15);
        for err in rejected {
            assert!(matches!(
                err,
                SessionError::Turn(TurnError::NotYourTurn { ref player, .. }) if *player == opener
            ));
        }
        let now = dealer.snapshot(id).unwrap();
        assert_eq!(now.version, 1);
        assert!(now.state.is_partition_of(standard_deck()));
        assert_eq!(now.state.cards_of(&OwnerRef::Pile).len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn sessions_run_in_parallel_and_get_recorded() {
        let sink = Arc::new(MemorySink::default());
        let dealer = Arc::new(dealer(5).with_replay_sink(sink.clone()));
        let mut games = tokio::task::JoinSet::new();
        for i in 0..8u64 {
            let dealer = dealer.clone();
            games.spawn(async move {
                let kind = if i % 2 == 0 {
                    GameKind::Vietcong
                } else {
                    GameKind::Fish
                };
                let (id, _) = dealer.start_session(kind, &players(4)).unwrap();
                let mut rng = StdRng::seed_from_u64(i);
                crate::play_out(&dealer, id, &mut rng, 20_000).await.unwrap()
            });
        }
        let mut finished = 0;
        while let Some(outcome) = games.join_next().await {
            assert!(outcome.unwrap().is_some());
            finished += 1;
        }
        assert_eq!(finished, 8);

        for id in dealer.session_ids() {
            let snapshot = dealer.snapshot(id).unwrap();
            assert_eq!(snapshot.state.status, Status::Ended);
            let deck = dealer.kind(id).unwrap().engine().deck();
            assert!(snapshot.state.is_partition_of(deck));
            let turn = Turn::Pass {
                player: snapshot.state.current_player.clone(),
            };
            assert_eq!(
                dealer.submit_turn(id, turn).await.unwrap_err(),
                SessionError::Turn(TurnError::GameEnded)
            );
        }

        // The workers hand over their records just after publishing the last snapshot
        for _ in 0..100 {
            if sink.records.lock().unwrap().len() == 8 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 8);
        for record in records.iter() {
            let outcome = dealer.ended_session(record.session).unwrap();
            assert_eq!(outcome.player_status, record.player_status);
            assert_eq!(outcome.winning_team, record.winning_team);
            assert!(!record.turns.is_empty());
        }
    }
}
