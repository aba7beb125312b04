use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cookmode::{
    Config, ConsoleRecognizer, ConsoleSynthesizer, ControlRequest, HttpTranslator, Recognizer,
    RecipeClient, SessionController, SessionEngines, SessionSnapshot, Synthesizer,
};

/// Cookmode - hands-free guided cooking sessions
#[derive(Parser)]
#[command(name = "cookmode", version, about)]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "COOKMODE_BACKEND_URL")]
    backend: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable voice input (for hosts without a recognition engine)
    #[arg(long, env = "COOKMODE_DISABLE_VOICE")]
    disable_voice: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a guided session for a recipe
    Run {
        /// Recipe identifier
        recipe_id: String,

        /// Initial display language
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Speak text through the console synthesizer
    Say {
        /// Text to speak
        #[arg(default_value = "Welcome to cookmode.")]
        text: String,
    },
    /// Show the duration discovered in a step's text
    Parse {
        /// Step text
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,cookmode=info",
        1 => "info,cookmode=debug",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.disable_voice)?;
    if let Some(backend) = cli.backend {
        config.backend_url = backend;
    }

    match cli.command {
        Command::Run { recipe_id, language } => run_session(&config, &recipe_id, language).await,
        Command::Say { text } => {
            let synth = ConsoleSynthesizer::new(config.speech_pace_ms);
            let (done_tx, done_rx) = tokio::sync::oneshot::channel::<()>();
            synth.speak(&text, Box::new(move || drop(done_tx.send(()))));
            done_rx.await.ok();
            Ok(())
        }
        Command::Parse { text } => {
            match cookmode::extract_minutes(&text) {
                Some(minutes) => println!("{minutes} min"),
                None => println!("no duration found"),
            }
            Ok(())
        }
    }
}

async fn run_session(
    config: &Config,
    recipe_id: &str,
    language: Option<String>,
) -> anyhow::Result<()> {
    let recipes = RecipeClient::new(&config.backend_url)?;
    // Recipe load failure is terminal: nothing to display
    let recipe = recipes.fetch(recipe_id).await?;

    let translator = Arc::new(HttpTranslator::new(&config.backend_url)?);
    let synthesizer = Arc::new(ConsoleSynthesizer::new(config.speech_pace_ms));

    let (recognizer, recognizer_events) = if config.voice_enabled {
        let (recognizer, events) = ConsoleRecognizer::spawn();
        let recognizer: Arc<dyn Recognizer> = recognizer;
        (Some(recognizer), Some(events))
    } else {
        (None, None)
    };

    let (controller, handle) = SessionController::new(
        recipe,
        config.source_language.clone(),
        SessionEngines {
            synthesizer,
            recognizer,
            recognizer_events,
            translator,
        },
    );
    let session = tokio::spawn(controller.run());

    if config.voice_enabled {
        handle.send(ControlRequest::ToggleListening).await?;
        println!("Voice commands: next, back, repeat, start timer, stop");
    }
    if let Some(language) = language {
        handle.send(ControlRequest::SetTargetLanguage(language)).await?;
    }

    // Mirror session state to the terminal until shutdown
    let mut watch = handle.watch();
    let printer = tokio::spawn(async move {
        let mut last = StepView::default();
        loop {
            if watch.changed().await.is_err() {
                break;
            }
            let snapshot = watch.borrow().clone();
            print_changes(&snapshot, &mut last);
        }
    });

    tokio::signal::ctrl_c().await?;
    handle.send(ControlRequest::Shutdown).await.ok();
    session.await??;
    printer.abort();
    Ok(())
}

/// Last printed state, to only echo changes
#[derive(Default)]
struct StepView {
    index: usize,
    text: String,
    timer_line: String,
    finished: bool,
}

fn print_changes(snapshot: &SessionSnapshot, last: &mut StepView) {
    if snapshot.step_count > 0
        && (snapshot.current_index != last.index || snapshot.displayed_text != last.text)
    {
        last.index = snapshot.current_index;
        last.text = snapshot.displayed_text.clone();
        println!(
            "\nStep {}/{}: {}",
            snapshot.current_index + 1,
            snapshot.step_count,
            snapshot.displayed_text
        );
    }

    if let Some(timer) = snapshot.timer {
        let line = format!(
            "\u{23f1} {} {}",
            timer.format_remaining(),
            if timer.running { "" } else { "(paused)" }
        );
        if line != last.timer_line {
            last.timer_line = line.clone();
            println!("{line}");
        }
    }

    if snapshot.timer_finished && !last.finished {
        println!("\u{23f0} Timer done!");
    }
    last.finished = snapshot.timer_finished;
}
