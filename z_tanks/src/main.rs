mod sim;
mod term_display;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::{Key, Term};
use tank_arena::constants::{
    CONTROL_FIRE, CONTROL_HELP_BLUE, CONTROL_HELP_RED, CONTROL_JOYSTICK, CONTROL_P1_JOIN,
    CONTROL_P2_JOIN,
};
use tank_arena::name_generator::generate_viewer_name;
use tank_arena::network::DEFAULT_PREFIX;
use tank_arena::{
    ControlUpdate, FramingCamera, Game, GameCommand, GameConfig, HostUpdate, Participant,
    ParticipantClient, ParticipantId, SlotColor, StepResult, ZenohDisplay, ZenohInteractive,
};
use zenoh::key_expr::KeyExpr;

use sim::{SimArena, SimSpawner};
use term_display::{render_rich_text, Mirrored, TermDisplay};

/// z_tanks - two player tank duel over Zenoh
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Key expression prefix
    #[arg(short, long)]
    prefix: Option<KeyExpr<'static>>,

    /// Path to Zenoh config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the game and wait for participants
    Host {
        /// Round wins needed to win the game
        #[arg(short, long, default_value_t = 3)]
        rounds: u32,

        /// Pause before each round, in milliseconds
        #[arg(long, default_value_t = 3000)]
        start_delay_ms: u64,

        /// Pause after each round, in milliseconds
        #[arg(long, default_value_t = 3000)]
        end_delay_ms: u64,

        /// Lifetime of a viewer boost, in seconds
        #[arg(long, default_value_t = 10)]
        help_cooldown_s: u64,
    },
    /// Join a running game as a participant
    Join {
        /// Participant name
        #[arg(short, long)]
        name: Option<String>,
    },
}

/// What a key press on the participant terminal does
#[derive(Debug, Clone, PartialEq)]
enum ParticipantAction {
    Press(&'static str),
    Steer { x: f32, y: f32 },
    Quit,
}

fn participant_action(key: Key) -> Option<ParticipantAction> {
    let action = match key {
        Key::Char('1') => ParticipantAction::Press(CONTROL_P1_JOIN),
        Key::Char('2') => ParticipantAction::Press(CONTROL_P2_JOIN),
        Key::Char('w') | Key::ArrowUp => ParticipantAction::Steer { x: 0.0, y: 1.0 },
        Key::Char('s') | Key::ArrowDown => ParticipantAction::Steer { x: 0.0, y: -1.0 },
        Key::Char('a') | Key::ArrowLeft => ParticipantAction::Steer { x: -1.0, y: 0.0 },
        Key::Char('d') | Key::ArrowRight => ParticipantAction::Steer { x: 1.0, y: 0.0 },
        Key::Char('x') => ParticipantAction::Steer { x: 0.0, y: 0.0 },
        Key::Char('f') | Key::Char(' ') => ParticipantAction::Press(CONTROL_FIRE),
        Key::Char('h') => ParticipantAction::Press(CONTROL_HELP_RED),
        Key::Char('j') => ParticipantAction::Press(CONTROL_HELP_BLUE),
        Key::Char('q') | Key::Char('Q') => ParticipantAction::Quit,
        _ => return None,
    };
    Some(action)
}

#[tokio::main(flavor = "multi_thread", worker_threads = 1)]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Create zenoh config
    let zenoh_config = if let Some(config_path) = &args.config {
        zenoh::Config::from_file(config_path)
            .map_err(|e| anyhow::anyhow!("Failed to load config file: {}", e))?
    } else {
        zenoh::Config::default()
    };

    // Create zenoh session
    let session = zenoh::open(zenoh_config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open zenoh session: {}", e))?;

    let prefix = match args.prefix {
        Some(prefix) => prefix,
        None => KeyExpr::try_from(DEFAULT_PREFIX)
            .map_err(|e| anyhow::anyhow!("Invalid default prefix: {}", e))?,
    };

    match args.command {
        Command::Host {
            rounds,
            start_delay_ms,
            end_delay_ms,
            help_cooldown_s,
        } => {
            let config = GameConfig {
                num_rounds_to_win: rounds,
                start_delay: Duration::from_millis(start_delay_ms),
                end_delay: Duration::from_millis(end_delay_ms),
                help_cooldown: Duration::from_secs(help_cooldown_s),
                ..GameConfig::default()
            };
            run_host(&session, prefix, config).await
        }
        Command::Join { name } => run_participant(&session, prefix, name).await,
    }
}

async fn run_host(
    session: &zenoh::Session,
    prefix: KeyExpr<'static>,
    config: GameConfig,
) -> anyhow::Result<()> {
    let interactive = Arc::new(ZenohInteractive::new(session, prefix.clone()).await?);
    let remote_display = ZenohDisplay::new(session, &prefix).await?;

    let arena = SimArena::new();
    let mut game = Game::builder()
        .interactive(interactive)
        .spawner(SimSpawner::new(arena.clone()))
        .camera(FramingCamera::default())
        .display(Mirrored(TermDisplay::new(Term::stdout()), remote_display))
        .config(config)
        .build()
        .context("Failed to set up the game")?;

    let physics_task = tokio::spawn(arena.clone().run(game.config().tick_interval));

    // Spawn keyboard input task with separate term
    let keyboard_sender = game.sender();
    let keyboard_task = tokio::task::spawn_blocking(move || {
        let input_term = Term::stdout();
        loop {
            match input_term.read_key() {
                Ok(Key::Char('q')) | Ok(Key::Char('Q')) => {
                    let _ = keyboard_sender.send(GameCommand::Stop);
                    break;
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
    });

    tracing::info!("Hosting arena '{}'", prefix);

    // Main step loop
    loop {
        match game.step().await? {
            StepResult::Advanced(status) => {
                tracing::info!(
                    "{} done, round {} (red {} - blue {})",
                    status.phase,
                    status.round,
                    status.wins_of(SlotColor::Red),
                    status.wins_of(SlotColor::Blue)
                );
                if let Some(winner) = status.game_winner {
                    tracing::info!("{} wins the game", winner);
                }
            }
            StepResult::Stop => {
                println!("Game stopped");
                break;
            }
        }
    }

    physics_task.abort();
    keyboard_task.abort();
    Ok(())
}

async fn run_participant(
    session: &zenoh::Session,
    prefix: KeyExpr<'static>,
    name: Option<String>,
) -> anyhow::Result<()> {
    let name = name.unwrap_or_else(generate_viewer_name);
    let participant = Participant::from_name(ParticipantId(rand::random()), name)?;
    let client = ParticipantClient::join(session, &prefix, participant).await?;

    let term = Term::stdout();
    term.write_line(&format!("=== z_tanks - joined as {} ===", client.participant()))?;
    term.write_line("Controls:")?;
    term.write_line("  1 / 2 - Take the red / blue seat")?;
    term.write_line("  w a s d - Drive, x - Stop")?;
    term.write_line("  f - Fire")?;
    term.write_line("  h / j - Help red / blue")?;
    term.write_line("  q - Quit")?;
    term.write_line("")?;

    // Keys are read on a blocking thread and forwarded to the async loop
    let (key_tx, key_rx) = flume::unbounded::<ParticipantAction>();
    let keyboard_task = tokio::task::spawn_blocking(move || {
        let input_term = Term::stdout();
        while let Ok(key) = input_term.read_key() {
            if let Some(action) = participant_action(key) {
                let quit = action == ParticipantAction::Quit;
                if key_tx.send(action).is_err() || quit {
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            update = client.recv() => {
                match update {
                    Ok(update) => term.write_line(&describe_update(&update))?,
                    Err(e) => tracing::warn!("Bad update from host: {}", e),
                }
            }
            action = key_rx.recv_async() => {
                let Ok(action) = action else { break };
                match action {
                    ParticipantAction::Press(control_id) => client.press(control_id).await?,
                    ParticipantAction::Steer { x, y } => {
                        client.joystick(CONTROL_JOYSTICK, x, y).await?
                    }
                    ParticipantAction::Quit => break,
                }
            }
        }
    }

    keyboard_task.abort();
    Ok(())
}

fn describe_update(update: &HostUpdate) -> String {
    match update {
        HostUpdate::Group(group) => format!("[group] {}", group),
        HostUpdate::Control {
            control_id,
            update: ControlUpdate::Label(text),
        } => format!("[{}] {}", control_id, text.replace('\n', " | ")),
        HostUpdate::Control {
            control_id,
            update: ControlUpdate::Disabled(disabled),
        } => {
            let state = if *disabled { "disabled" } else { "enabled" };
            format!("[{}] {}", control_id, state)
        }
        HostUpdate::Display(text) => format!("[display] {}", render_rich_text(text).replace('\n', " | ")),
    }
}
