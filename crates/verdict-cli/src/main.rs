//! verdict: deterministic query answering from the terminal.
//!
//! Interactive by default; `--query` runs a single query and exits
//! with a non-zero status if the session halted.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use verdict_persona::{FileSystemSource, PersonaLoader};
use verdict_session::{QueryOutcome, SessionController, SessionError};

mod output;

use output::{render_outcome, DisplayOptions};

const BANNER: &str = "\
verdict — deterministic query answering
Type /help for commands, 'exit' to quit.";

#[derive(Parser)]
#[command(name = "verdict", about = "Deterministic query-answering engine")]
#[command(version)]
struct Cli {
    /// Directory of persona documents
    #[arg(long, env = "VERDICT_PERSONAS_DIR", default_value = "personas")]
    personas_dir: PathBuf,

    /// Directory of binarized knowledge domain files
    #[arg(long, env = "VERDICT_KNOWLEDGE_DIR", default_value = "knowledge")]
    knowledge_dir: PathBuf,

    /// Constitution document (built-in constitution if omitted)
    #[arg(long, env = "VERDICT_CONSTITUTION")]
    constitution: Option<PathBuf>,

    /// Persona to load on startup
    #[arg(short, long, default_value = "default")]
    persona: String,

    /// Run a single query and exit
    #[arg(short, long)]
    query: Option<String>,

    /// Display the proof chain for each answer
    #[arg(long)]
    proof: bool,

    /// Display the audit ledger for each response
    #[arg(long)]
    audit: bool,

    /// Output raw JSON responses
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = DisplayOptions {
        show_proof: cli.proof,
        show_audit: cli.audit,
        json: cli.json,
    };

    let loader = PersonaLoader::new(&cli.personas_dir, cli.constitution.as_deref());
    let constitution = loader.constitution().clone();
    let source = FileSystemSource::new(loader, &cli.knowledge_dir);
    let mut controller = SessionController::new(source, constitution);

    let mut active_persona = cli.persona.clone();
    controller
        .switch_persona(&active_persona)
        .with_context(|| format!("failed to load persona '{active_persona}'"))?;

    if let Some(query) = cli.query {
        let (outcome, rendered) = run_query(&mut controller, &active_persona, &query, options)?;
        println!("{rendered}");
        std::process::exit(if outcome.is_answer() { 0 } else { 1 });
    }

    repl(&mut controller, &mut active_persona, options)
}

fn repl(
    controller: &mut SessionController<FileSystemSource>,
    active_persona: &mut String,
    options: DisplayOptions,
) -> anyhow::Result<()> {
    println!("{BANNER}");
    if let Some(session) = controller.session() {
        let persona = session.persona();
        println!("\nActive Persona: {} ({})", persona.name, persona.archetype);
        println!("Persona ID:     {}", persona.id);
        let domains: Vec<String> = persona.domains.iter().map(|d| d.to_string()).collect();
        println!("Domains:        {}\n", domains.join(", "));
    }

    let stdin = std::io::stdin();
    loop {
        print!("you > ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!("\nsession terminated.");
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "exit" | "quit" | "q") {
            println!("session terminated.");
            break;
        }

        if let Some(command) = input.strip_prefix('/') {
            handle_command(controller, active_persona, command)?;
            continue;
        }

        let (_, rendered) = run_query(controller, active_persona, input, options)?;
        println!("{rendered}");
    }
    Ok(())
}

/// Submit a query and render the response against the session that
/// processed it. On halt, acknowledge it afterwards by starting a
/// fresh session for the same persona so the operator can continue.
fn run_query(
    controller: &mut SessionController<FileSystemSource>,
    active_persona: &str,
    query: &str,
    options: DisplayOptions,
) -> anyhow::Result<(QueryOutcome, String)> {
    let outcome = controller
        .handle_query(query)
        .context("query could not be processed")?;
    let rendered = match controller.session() {
        Some(session) => render_outcome(&outcome, session, options),
        None => String::new(),
    };
    if !outcome.is_answer() {
        // HALT is terminal for the session; continuing requires a new one
        controller
            .switch_persona(active_persona)
            .with_context(|| format!("failed to restart session for '{active_persona}'"))?;
    }
    Ok((outcome, rendered))
}

fn handle_command(
    controller: &mut SessionController<FileSystemSource>,
    active_persona: &mut String,
    command: &str,
) -> anyhow::Result<()> {
    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("help"), _) => {
            println!("Available commands");
            println!("  /help             Display this help message.");
            println!("  /persona <id>     Switch to a different persona (ends the session).");
            println!("  /personas         List available personas.");
            println!("  /status           Display current system status.");
            println!("  /audit            Display the session audit ledger.");
            println!("  /state            Display the current session state.");
            println!("Any other input is processed as a query, e.g. parent(tom,X).");
        }
        (Some("persona"), Some(id)) => match controller.switch_persona(id) {
            Ok(session) => {
                *active_persona = id.to_string();
                let persona = session.persona();
                println!("Persona switched successfully.");
                println!("Active Persona: {} ({})", persona.name, persona.archetype);
            }
            Err(SessionError::UnknownPersona(id)) => {
                println!(
                    "persona '{id}' does not exist. Available: {}",
                    controller.available_personas().join(", ")
                );
            }
            Err(err) => {
                println!("persona load failed: {err}");
                // the failed load halted the session; start over
                controller
                    .switch_persona(active_persona)
                    .with_context(|| format!("failed to restart session for '{active_persona}'"))?;
            }
        },
        (Some("persona"), None) => println!("usage: /persona <id>"),
        (Some("personas"), _) => {
            println!("Available personas: {}", controller.available_personas().join(", "));
        }
        (Some("status"), _) => {
            if let Some(session) = controller.session() {
                let persona = session.persona();
                let domains: Vec<String> =
                    persona.domains.iter().map(|d| d.to_string()).collect();
                println!("Active Persona:    {} ({})", persona.name, persona.archetype);
                println!("Persona ID:        {}", persona.id);
                println!("Session State:     {}", session.state());
                println!("Knowledge Domains: {}", domains.join(", "));
                println!("Facts Loaded:      {}", session.knowledge().fact_count());
                println!("Rules Loaded:      {}", session.knowledge().rule_count());
                println!(
                    "Inference:         {} (depth {})",
                    if persona.allow_inference { "enabled" } else { "disabled" },
                    persona.max_depth()
                );
            } else {
                println!("no active session.");
            }
        }
        (Some("audit"), _) => {
            if let Some(session) = controller.session() {
                if session.audit().is_empty() {
                    println!("audit ledger is empty.");
                } else {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(session.audit().entries())?
                    );
                }
            } else {
                println!("no active session.");
            }
        }
        (Some("state"), _) => match controller.state() {
            Some(state) => println!("Session State: {state}"),
            None => println!("no active session."),
        },
        (Some(other), _) => {
            println!("unknown command '/{other}'. Type /help for available commands.");
        }
        (None, _) => println!("Type /help for available commands."),
    }
    Ok(())
}
