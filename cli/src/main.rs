use std::io::{IsTerminal, Write};

use warden_cli::callbacks;
use warden_cli::commands;
use warden_cli::log_filter;
use warden_cli::mobs::MobTable;
use warden_cli::output;
use warden_cli::readline;
use warden_cli::speech::CommandSpeech;
use warden_core::guide::resolve_guide_dir;
use warden_core::{DirectoryGuideSource, EffectSink, GameId, GuideEngine, Runner, RunnerInput, SpeechBackend};
use warden_types::GuideConfig;

#[tokio::main]
async fn main() -> Result<(), String> {
    init_logging();

    let config: GuideConfig = confy::load("warden", None).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        GuideConfig::default()
    });

    let Some(guide_dir) = resolve_guide_dir(config.guide_dir.as_deref()) else {
        return Err("could not determine a guide directory".to_string());
    };
    println!("Guides: {}", guide_dir.display());

    let speech = CommandSpeech::probe();
    match &speech {
        Some(s) => tracing::info!(program = %s.program().display(), "Speech available"),
        None => tracing::info!("No speech synthesizer found, speech actions disabled"),
    }

    let (effect_tx, effect_rx) = tokio::sync::mpsc::unbounded_channel();
    let printer = output::spawn_printer(effect_rx);

    let source = DirectoryGuideSource::with_callbacks(guide_dir, callbacks::builtin());
    let sink: Box<dyn EffectSink + Send> = Box::new(effect_tx);
    let engine = GuideEngine::new(&config, Box::new(source), sink)
        .with_speech(speech.map(|s| Box::new(s) as Box<dyn SpeechBackend + Send>));

    let (runner, tx) = Runner::new(engine, MobTable::new(GameId(config.local_player)));
    let runner_task = tokio::spawn(runner.run());

    loop {
        let line = readline()?;
        if line.is_empty() {
            // EOF
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match commands::respond(line, &tx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    let _ = tx.send(RunnerInput::Shutdown);
    let (engine, _) = runner_task.await.map_err(|e| e.to_string())?;
    drop(engine);
    let _ = printer.await;

    Ok(())
}

/// Filter comes from `WARDEN_LOG` (`RUST_LOG` syntax). Logs go to
/// `WARDEN_LOG_PATH` when set, so the REPL's stdout stays clean.
/// Otherwise they share the terminal with the prompt on stderr, without
/// timestamps and with colour only when stderr is a terminal.
fn init_logging() {
    let filter = log_filter(std::env::var("WARDEN_LOG").ok().as_deref());
    let log_file = std::env::var("WARDEN_LOG_PATH").ok().and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .inspect_err(|e| eprintln!("Cannot open log file {path}: {e}"))
            .ok()
    });

    match log_file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(file)
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .without_time()
            .with_target(false)
            .with_ansi(std::io::stderr().is_terminal())
            .with_writer(std::io::stderr)
            .init(),
    }
}
