use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use cardroom::{GameKind, PlayerId, TurnRecord};
use serde::{Deserialize, Serialize};

use crate::SessionId;

/// Everything needed to replay a finished game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub session: SessionId,
    pub kind: GameKind,
    pub players: Vec<PlayerId>,
    /// Seconds since the Unix epoch.
    pub started_at: u64,
    /// The applied turns in order, as observers saw them.
    pub turns: Vec<TurnRecord>,
    pub player_status: BTreeMap<PlayerId, i8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_team: Option<u8>,
}

impl GameRecord {
    pub fn new(session: SessionId, kind: GameKind, players: Vec<PlayerId>) -> Self {
        let started_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        Self {
            session,
            kind,
            players,
            started_at,
            turns: Vec::new(),
            player_status: BTreeMap::new(),
            winning_team: None,
        }
    }
}

/// Receives the record of every game that ends.
pub trait ReplaySink: Send + Sync {
    fn store(&self, record: &GameRecord) -> anyhow::Result<()>;
}

/// Writes each game as `game_<n>.json` into a directory.
pub struct DirectoryRecorder {
    num: AtomicUsize,
    directory: PathBuf,
}

impl DirectoryRecorder {
    pub fn new(directory: PathBuf) -> anyhow::Result<Self> {
        if !directory.is_dir() {
            anyhow::bail!("Directory '{}' does not exist", directory.display());
        }
        Ok(Self {
            num: AtomicUsize::new(1),
            directory,
        })
    }
}

impl ReplaySink for DirectoryRecorder {
    fn store(&self, record: &GameRecord) -> anyhow::Result<()> {
        let num = self.num.fetch_add(1, Ordering::Relaxed);
        let filepath = self.directory.join(format!("game_{:0>6}.json", num));
        let mut writer = BufWriter::new(File::create(filepath)?);
        serde_json::to_writer_pretty(&mut writer, record)?;
        writer.flush()?;
        Ok(())
    }
}
