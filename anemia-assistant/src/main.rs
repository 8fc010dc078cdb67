use anemia_assistant::{
    ClinicalSession, StepOutcome,
    config::{LogFormat, OutputFormat, init_tracing},
    input::load_snapshot,
    render::{render_decision, render_step},
    repl::{HELP, ReplCommand, parse_line},
    tasks::StageDecision,
};
use anemia_core::{Field, PatientSnapshot, Stage, assess_all, derive_tsat};
use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "anemia-assistant")]
#[command(about = "Stepwise decision support for anemia in chronic kidney disease")]
struct Cli {
    /// Log format written to stderr
    #[arg(long, global = true, env = "LOG_FORMAT", value_enum, default_value = "json")]
    log_format: LogFormat,

    /// Recommendation format written to stdout
    #[arg(long, global = true, env = "ANEMIA_OUTPUT", value_enum, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate stages of a snapshot independently
    Assess {
        /// Patient snapshot (JSON, fields may be omitted)
        snapshot: PathBuf,
        /// Evaluate a single stage instead of all four
        #[arg(long)]
        stage: Option<Stage>,
    },
    /// Step through the stages from screening while each says continue
    Walk {
        snapshot: PathBuf,
    },
    /// Derive transferrin saturation from serum iron and TIBC
    Tsat {
        #[arg(long)]
        serum_iron: f64,
        #[arg(long)]
        tibc: f64,
    },
    /// Edit a snapshot line by line and re-evaluate after every change
    Interactive {
        /// Optional starting snapshot
        snapshot: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Commands::Assess { snapshot, stage } => {
            let snapshot = load_snapshot(&snapshot)?;
            let decisions: Vec<StageDecision> = match stage {
                Some(stage) => vec![StageDecision {
                    stage,
                    decision: stage.evaluate(&snapshot),
                }],
                None => assess_all(&snapshot)
                    .into_iter()
                    .map(|(stage, decision)| StageDecision { stage, decision })
                    .collect(),
            };
            match cli.output {
                OutputFormat::Json => print_json(&decisions)?,
                OutputFormat::Text => {
                    for record in &decisions {
                        println!("{}", render_decision(record.stage, &record.decision));
                    }
                }
            }
        }
        Commands::Walk { snapshot } => {
            let snapshot = load_snapshot(&snapshot)?;
            let mut session = ClinicalSession::with_snapshot(snapshot)?;
            let steps = session.walk().await?;
            info!(
                session_id = %session.id(),
                steps = steps.len(),
                last_status = session.status_message().unwrap_or_default(),
                "walk finished"
            );
            match cli.output {
                OutputFormat::Json => print_json(&steps)?,
                OutputFormat::Text => {
                    for step in &steps {
                        println!("{}", render_step(step));
                    }
                }
            }
        }
        Commands::Tsat { serum_iron, tibc } => match derive_tsat(Some(serum_iron), Some(tibc)) {
            Some(tsat) => match cli.output {
                OutputFormat::Json => print_json(&serde_json::json!({ "tsat": tsat }))?,
                OutputFormat::Text => println!("TSAT: {tsat}%"),
            },
            None => anyhow::bail!("TSAT cannot be derived when TIBC is 0"),
        },
        Commands::Interactive { snapshot } => {
            let snapshot = match snapshot {
                Some(path) => load_snapshot(&path)?,
                None => PatientSnapshot::new(),
            };
            run_interactive(ClinicalSession::with_snapshot(snapshot)?, cli.output).await?;
        }
    }

    Ok(())
}

async fn run_interactive(mut session: ClinicalSession, output: OutputFormat) -> anyhow::Result<()> {
    println!("{HELP}\n");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("[{}] > ", session.current_stage());
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                warn!(error = %e, "rejected input");
                println!("{e}");
                continue;
            }
        };

        match command {
            ReplCommand::Edit(edit) => {
                print_step(&session.apply(edit).await?, output)?;
                debug!(status = session.status_message().unwrap_or_default(), "edit evaluated");
            }
            ReplCommand::Evaluate => print_step(&session.evaluate().await?, output)?,
            ReplCommand::Back => match session.go_back() {
                Ok(stage) => println!("Back to {}", stage.title()),
                Err(e) => println!("{e}"),
            },
            ReplCommand::GoTo(stage) => {
                session.go_to(stage)?;
                println!("Now at {}", stage.title());
            }
            ReplCommand::Show => match session.last_decision() {
                Some(record) => match output {
                    OutputFormat::Json => print_json(&record)?,
                    OutputFormat::Text => println!("{}", render_decision(record.stage, &record.decision)),
                },
                None => println!("No stage evaluated yet"),
            },
            ReplCommand::Snapshot => print_json(session.snapshot())?,
            ReplCommand::Fields => {
                for field in Field::all() {
                    println!("  {field}");
                }
            }
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::Quit => break,
        }
    }

    info!(session_id = %session.id(), "interactive session closed");
    Ok(())
}

fn print_step(step: &StepOutcome, output: OutputFormat) -> anyhow::Result<()> {
    match output {
        OutputFormat::Json => print_json(step),
        OutputFormat::Text => {
            println!("{}", render_step(step));
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
