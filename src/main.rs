//! Interactive terminal game for Cake Factory
//!
//! Usage: cargo run -- [--config cake.toml] [--max-mistakes N] [--max-orders N] [--seed N]

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cake_factory::config::{self, FileConfig, Overrides, Settings};
use cake_factory::display::{format_feedback, render_controls, render_snapshot, BOLD, DIM, RESET};
use cake_factory::session::{Client, ClientError, LocalTransport, Outcome, SessionHost};
use cake_factory::{AssemblyEngine, RandomOrders};

/// Play Cake Factory in the terminal
#[derive(Parser, Debug)]
#[command(name = "cake-factory")]
#[command(about = "Rebuild each ordered cake layer by layer", long_about = None)]
struct Args {
    /// TOML file with max_mistakes, max_orders, hold_ms and seed
    #[arg(long)]
    config: Option<PathBuf>,

    /// Wrong submissions allowed before the game is over
    #[arg(long)]
    max_mistakes: Option<u32>,

    /// Orders to complete to clear the game
    #[arg(long)]
    max_orders: Option<u32>,

    /// Random seed for order generation (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// How long submission feedback stays on screen, in milliseconds
    #[arg(long)]
    hold_ms: Option<u64>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Command {
    /// Zero-based index into the current choices
    Select(usize),
    Advance,
    Back,
    NewGame,
    Quit,
}

fn parse_command(input: &str) -> Option<Command> {
    match input.trim() {
        "" | "n" | "next" => Some(Command::Advance),
        "b" | "back" => Some(Command::Back),
        "r" | "new" => Some(Command::NewGame),
        "q" | "quit" => Some(Command::Quit),
        other => match other.parse::<usize>() {
            Ok(n) if n >= 1 => Some(Command::Select(n - 1)),
            _ => None,
        },
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // stderr keeps log lines out of the board
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

fn report(result: Result<Outcome, ClientError>) -> Option<Outcome> {
    match result {
        Ok(outcome) => Some(outcome),
        Err(err) => {
            println!("{DIM}The kitchen did not answer: {err}{RESET}");
            None
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let file = match &args.config {
        Some(path) => config::load_file(path)?,
        None => FileConfig::default(),
    };
    let overrides = Overrides {
        max_mistakes: args.max_mistakes,
        max_orders: args.max_orders,
        hold_ms: args.hold_ms,
        seed: args.seed,
    };
    let settings = Settings::resolve(file, &overrides).context("invalid game settings")?;

    let seed = settings.seed.unwrap_or_else(|| rand::rng().random());
    tracing::info!(
        seed,
        max_mistakes = settings.game.max_mistakes,
        max_orders = settings.game.max_orders,
        "starting game"
    );

    let engine = AssemblyEngine::new(settings.game, RandomOrders::new(StdRng::seed_from_u64(seed)))?;
    let host = SessionHost::new(engine, seed.wrapping_add(1));
    let mut client = Client::new(LocalTransport::new(host), settings.client);
    client.new_game().context("failed to open a session")?;

    println!("\n{BOLD}Welcome to Cake Factory!{RESET}");
    println!("Rebuild each ordered cake from the bottom up. Type 'q' to quit.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let Some(snapshot) = client.display() else {
            anyhow::bail!("no session state to show");
        };
        print!("{}", render_snapshot(&snapshot));
        print!("{}", render_controls(&snapshot));
        print!("\n{BOLD}>{RESET} ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            // EOF
            println!("\nGoodbye!");
            return Ok(());
        };
        let line = line.context("failed to read input")?;

        let Some(command) = parse_command(&line) else {
            println!("Enter a choice number, n, b, r or q.");
            continue;
        };

        match command {
            Command::Select(idx) => match snapshot.choices.get(idx) {
                Some(&ingredient) => {
                    client.select(ingredient);
                }
                None if snapshot.choices.is_empty() => println!("Nothing to pick right now."),
                None => println!("Pick a number from 1 to {}.", snapshot.choices.len()),
            },
            Command::Advance => {
                if let Some(Outcome::SubmissionHeld { correct }) = report(client.advance()) {
                    println!("\n{}", format_feedback(correct));
                    thread::sleep(client.config().submission_hold);
                    client.finish_submission();
                }
            }
            Command::Back => {
                report(client.go_back());
            }
            Command::NewGame => {
                report(client.new_game());
            }
            Command::Quit => {
                println!("Goodbye!");
                return Ok(());
            }
        }
    }
}
