use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use cardroom::{GameKind, PlayerId};
use clap::Parser;
use dealer::{play_out, Dealer, DealerConfig, DirectoryRecorder, SessionOutcome};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::task::JoinSet;
use tracing::{debug, info};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Simulates games between random players
#[derive(Parser)]
struct Args {
    /// Which game to play, "vietcong" or "fish"
    #[arg(short, long, default_value = "vietcong")]
    game: GameKind,

    /// Number of players in each game
    #[arg(short, long, default_value_t = 4)]
    players: usize,

    /// How many games to play
    #[arg(short, long, default_value_t = 100)]
    num_games: usize,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Give up on a game after this many submitted turns
    #[arg(long, default_value_t = 10_000)]
    max_turns: usize,

    /// How many turns may queue up for one session
    #[arg(long, default_value_t = 32)]
    queue_depth: usize,

    /// Record the finished games as JSON files into this directory
    #[arg(short, long)]
    record_games_to_directory: Option<PathBuf>,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    initialize_logging(args.log_level);

    // Get a random seed
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed);

    let mut dealer = Dealer::new(DealerConfig {
        seed: Some(seed),
        queue_depth: args.queue_depth,
    });
    if let Some(dir_path) = args.record_games_to_directory {
        dealer = dealer.with_replay_sink(Arc::new(DirectoryRecorder::new(dir_path)?));
    }
    let dealer = Arc::new(dealer);

    let players: Vec<PlayerId> = (1..=args.players).map(|i| format!("p{}", i)).collect();
    let mut games = JoinSet::new();
    for game_idx in 0..args.num_games {
        let (id, _) = dealer.start_session(args.game, &players)?;
        let dealer = dealer.clone();
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(game_idx as u64));
        let max_turns = args.max_turns;
        games.spawn(async move { play_out(&dealer, id, &mut rng, max_turns).await });
    }

    let mut outcomes = Vec::with_capacity(args.num_games);
    let mut unfinished = 0;
    while let Some(result) = games.join_next().await {
        match result?? {
            Some(outcome) => outcomes.push(outcome),
            None => unfinished += 1,
        }
    }
    debug!(unfinished);

    print_summary(args.game, &players, &outcomes, unfinished);
    Ok(())
}

fn print_summary(
    game: GameKind,
    players: &[PlayerId],
    outcomes: &[SessionOutcome],
    unfinished: usize,
) {
    let mut lines = Vec::new();
    match game {
        GameKind::Vietcong => {
            let mut wins: BTreeMap<&str, usize> = BTreeMap::new();
            for outcome in outcomes {
                for (player, place) in &outcome.player_status {
                    if *place == 1 {
                        *wins.entry(player.as_str()).or_default() += 1;
                    }
                }
            }
            for player in players {
                let count = wins.get(player.as_str()).copied().unwrap_or(0);
                lines.push(format!("- {} finished first {} times", player, count));
            }
        }
        GameKind::Fish => {
            let mut wins: BTreeMap<Option<u8>, usize> = BTreeMap::new();
            for outcome in outcomes {
                *wins.entry(outcome.winning_team).or_default() += 1;
            }
            for (team, count) in wins {
                match team {
                    Some(team) => lines.push(format!("- team {} won {} times", team, count)),
                    None => lines.push(format!("- {} ties", count)),
                }
            }
        }
    }
    if unfinished > 0 {
        lines.push(format!("- {} games did not finish", unfinished));
    }
    eprintln!(
        "End result after {} {} games:\n{}",
        outcomes.len() + unfinished,
        game,
        lines.join("\n")
    );
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().event_format(format))
        .with(filter)
        .init();
}
