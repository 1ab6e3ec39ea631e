use crate::engine::ScriptedFactory;
use crate::io::format::{parse_input, DisplayFormat, InputMode};
use crate::io::IoManager;
use crate::logging::LogLevel;
use crate::model::{Architecture, ControllerEvent, ExecutionStatus, InfoEvent, RunConfig, RunReport};
use crate::orchestrator::{build_report, Command, ControllerHandle, ExecutionController};
use crate::selection::SelectedAddress;
use anyhow::{Context, Result};
use bytes::Bytes;
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "emuctl",
    version,
    about = "Load a program into an emulated processor and run or step it"
)]
pub struct Cli {
    /// Program image to upload
    pub program: std::path::PathBuf,

    /// Processor architecture to construct the engine with
    #[arg(long = "arch", value_enum, default_value_t = Architecture::Risc)]
    pub architecture: Architecture,

    /// Instructions per run-loop chunk
    #[arg(long, default_value_t = 1000)]
    pub chunk_size: u32,

    /// Pause between chunks (0s only yields to the scheduler)
    #[arg(long, default_value = "0s")]
    pub chunk_pause: humantime::Duration,

    /// Pause the run after this many chunks
    #[arg(long)]
    pub max_chunks: Option<u64>,

    /// Single-step this many instructions instead of running
    #[arg(long)]
    pub steps: Option<u64>,

    /// Input to queue before execution starts
    #[arg(long)]
    pub input: Option<String>,

    /// How --input is parsed
    #[arg(long, value_enum, default_value_t = InputMode::String)]
    pub input_mode: InputMode,

    /// Port that receives --input
    #[arg(long, default_value_t = 0)]
    pub input_port: u16,

    /// Rendering of port output in the text summary
    #[arg(long, value_enum, default_value_t = DisplayFormat::Ascii)]
    pub output_format: DisplayFormat,

    /// Print the run report as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Export the run report as JSON
    #[arg(long)]
    pub export_json: Option<std::path::PathBuf>,

    /// Log level for diagnostics on stderr
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Raise the log level (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> Result<RunConfig> {
    if args.chunk_size == 0 {
        anyhow::bail!("--chunk-size must be at least 1");
    }
    Ok(RunConfig {
        architecture: args.architecture,
        chunk_size: args.chunk_size,
        chunk_pause: Duration::from(args.chunk_pause),
        max_chunks: args.max_chunks,
    })
}

/// Run the program described by `args`. Returns true if it ended in `Errored`.
pub async fn run(args: Cli) -> Result<bool> {
    let cfg = build_config(&args)?;
    let image = std::fs::read(&args.program)
        .with_context(|| format!("failed to read program {}", args.program.display()))?;
    let inputs = match args.input.as_deref() {
        Some(text) => parse_input(text, args.input_mode).context("invalid --input")?,
        None => Vec::new(),
    };

    let (out_tx, out_handle) = spawn_output_writer();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ControllerEvent>();
    let io = IoManager::new();
    let controller = ExecutionController::new(
        Arc::new(ScriptedFactory::new()),
        io.clone(),
        SelectedAddress::new(),
        cfg.clone(),
        event_tx,
    );
    let handle = ControllerHandle::spawn(controller);
    handle.send(Command::Upload {
        image: Bytes::from(image),
        architecture: cfg.architecture,
    });

    let mut started = false;
    loop {
        tokio::select! {
            ev = event_rx.recv() => {
                let Some(ev) = ev else { break };
                let done = match &ev {
                    // Upload clears I/O, so input is queued only once the program is in.
                    ControllerEvent::Info(InfoEvent::ProgramLoaded { .. }) if !started => {
                        started = true;
                        if !inputs.is_empty() {
                            io.queue_inputs(args.input_port, &inputs);
                        }
                        match args.steps {
                            Some(n) => {
                                for _ in 0..n {
                                    handle.send(Command::Step);
                                }
                                true
                            }
                            None => {
                                handle.send(Command::Run);
                                false
                            }
                        }
                    }
                    ControllerEvent::StatusChanged { status } => run_settled(*status),
                    ControllerEvent::Info(_) => false,
                };
                print_event(&out_tx, &ev);
                if done {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                let _ = out_tx.send(OutputLine::Stderr("Stopping…".into()));
                handle.send(Command::Stop);
            }
        }
    }

    let controller = handle
        .shutdown()
        .await
        .context("controller task failed")?;
    while let Ok(ev) = event_rx.try_recv() {
        print_event(&out_tx, &ev);
    }

    let report = build_report(&controller);
    if let Some(p) = args.export_json.as_deref() {
        export_json(p, &report)?;
        let _ = out_tx.send(OutputLine::Stderr(format!("Exported JSON: {}", p.display())));
    }
    if args.json {
        let out = serde_json::to_string_pretty(&report)?;
        let _ = out_tx.send(OutputLine::Stdout(out));
    } else {
        let summary = crate::text_summary::build_text_summary(&report, args.output_format);
        for line in summary.lines {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    }

    drop(out_tx);
    let _ = out_handle.await;
    Ok(report.status == ExecutionStatus::Errored)
}

/// Whether the CLI can stop waiting: the program ended, or the run was paused
/// (Ctrl-C or the chunk cap).
fn run_settled(status: ExecutionStatus) -> bool {
    status.is_terminal() || status == ExecutionStatus::Paused
}

fn print_event(out_tx: &mpsc::UnboundedSender<OutputLine>, ev: &ControllerEvent) {
    let line = match ev {
        ControllerEvent::StatusChanged { status } => format!("== {status} =="),
        ControllerEvent::Info(info) => info.to_message(),
    };
    let _ = out_tx.send(OutputLine::Stderr(line));
}

fn export_json(path: &std::path::Path, report: &RunReport) -> Result<()> {
    let out = serde_json::to_vec_pretty(report)?;
    std::fs::write(path, out).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
