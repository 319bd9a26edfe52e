//! Terminal demo: `hall host` runs a room and auto-calls; `hall join`
//! dials one, renders calls, and claims as soon as a card wins.

use std::time::Duration;

use clap::{Parser, Subcommand};

use bingohall::prelude::*;
use bingohall::{HallError, dial_room, drive_player};

#[derive(Parser)]
#[command(name = "hall", about = "Host or join a live bingo room")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Host a room and call items on an interval.
    Host {
        /// Address to listen on.
        #[arg(long, default_value = "127.0.0.1:4000")]
        bind: String,

        /// Run a themed round instead of standard 75-ball.
        #[arg(long)]
        theme: Option<String>,

        /// Prize text shown to players.
        #[arg(long, default_value = "")]
        prize: String,

        /// Seconds between automatic calls.
        #[arg(long, default_value_t = 5)]
        interval: u64,
    },

    /// Join a room as a player.
    Join {
        /// Base URL of the host, e.g. ws://hall.example:4000.
        #[arg(long, default_value = "ws://127.0.0.1:4000")]
        url: String,

        /// The 8-character room code the host advertised.
        code: String,

        /// Display name.
        #[arg(long, default_value = "player")]
        name: String,
    },
}

/// Stand-in for the hosted text-generation service: a canned pool big
/// enough for any theme.
fn demo_theme_source() -> StaticThemeSource {
    StaticThemeSource::new([
        "flamingo", "teapot", "cactus", "lighthouse", "accordion",
        "meteor", "pretzel", "gondola", "walrus", "tambourine",
        "igloo", "volcano", "harmonica", "pinwheel", "nebula",
        "toboggan", "mandolin", "periscope", "marzipan", "sundial",
        "kaleidoscope", "zeppelin", "ocarina", "labyrinth", "monsoon",
        "sombrero", "trampoline", "waterwheel", "yodeler", "ziggurat",
    ])
}

#[tokio::main]
async fn main() -> Result<(), HallError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    match Cli::parse().command {
        Command::Host {
            bind,
            theme,
            prize,
            interval,
        } => host(bind, theme, prize, interval).await,
        Command::Join { url, code, name } => join(url, code, name).await,
    }
}

async fn host(
    bind: String,
    theme: Option<String>,
    prize: String,
    interval: u64,
) -> Result<(), HallError> {
    let round = match &theme {
        Some(theme) => {
            themed_round(&demo_theme_source(), theme, &prize).await?
        }
        None => RoundConfig::standard().with_prize(prize),
    };

    let server = HallServer::builder().bind(&bind).build(round).await?;
    println!("room code: {}", server.room_code());
    println!("players join with: hall join {}", server.room_code());

    let session = server.session();
    let _caller =
        AutoCaller::spawn(session.clone(), Duration::from_secs(interval));
    server.run().await
}

async fn join(
    url: String,
    code: String,
    name: String,
) -> Result<(), HallError> {
    let code: RoomCode = code.parse()?;
    let connector = WebSocketConnector::new(url);
    let mut session = ClientSession::new(&name);

    let channel = dial_room(&connector, &code, &mut session).await?;
    println!("joined room {code} as {name}, waiting for calls");

    drive_player(&channel, &mut session, |session, event| {
        match event {
            ClientEvent::Joined | ClientEvent::NewRound => {
                let table = session.table().expect("just joined");
                println!(
                    "holding {} cards, {} win pattern(s)",
                    table.cards.len(),
                    table.win_patterns.len()
                );
                Vec::new()
            }
            ClientEvent::Called(item) => {
                println!("called: {item}");
                // Claim the moment one of our cards turns winnable.
                session
                    .claimable_cards()
                    .first()
                    .and_then(|id| session.claim(*id).ok())
                    .map(|claim| {
                        println!("claiming bingo!");
                        vec![claim]
                    })
                    .unwrap_or_default()
            }
            ClientEvent::WinnerAnnounced { owner, card_id } => {
                println!("bingo certified for {owner} ({card_id})");
                Vec::new()
            }
            ClientEvent::ClaimRejected { reason, .. } => {
                println!("claim rejected: {reason}");
                Vec::new()
            }
            ClientEvent::Chat(line) => {
                println!("[{}] {}", line.sender, line.text);
                Vec::new()
            }
            ClientEvent::RejoinRequired => {
                println!("round reset, re-joining");
                Vec::new()
            }
        }
    })
    .await?;

    println!("session over");
    Ok(())
}
