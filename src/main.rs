//! Application entry point: read a text file aloud on the console.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`ReaderConfig`] from disk (defaults on first run) and compile it.
//! 3. Import the file into the [`Library`] and decode its text.
//! 4. Spawn a [`ReaderSession`] driving a [`ConsoleSpeechEngine`].
//! 5. Play until the session reports the end of the play or Ctrl-C is
//!    pressed.
//! 6. Close the session, which persists the reading position.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::{mpsc, oneshot};

use read_aloud::{
    config::{AppPaths, ReaderConfig},
    library::{Encoding, JsonFileStore, Library, ReadingPosition, TextDecoder},
    playback::{new_shared_state, ReaderCommand, ReaderPhase, ReaderSession},
    speech::ConsoleSpeechEngine,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "read-aloud", version, about = "Read a plain-text book aloud")]
struct Cli {
    /// Text file to read.
    file: PathBuf,

    /// Text encoding label (utf-8, gbk, gb18030, big5, utf-16le, …);
    /// detected from the BOM when omitted.
    #[arg(long)]
    encoding: Option<Encoding>,

    /// Start at this line instead of the stored position.
    #[arg(long)]
    from_line: Option<usize>,

    /// Milliseconds each utterance takes on the console engine.
    #[arg(long, default_value_t = 400)]
    pace_ms: u64,

    /// Settings file to use instead of the platform one.
    #[arg(long)]
    config: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    // 2. Configuration
    let config = match &cli.config {
        Some(path) => ReaderConfig::load_from(path)?,
        None => ReaderConfig::load()?,
    };
    let profile = config.compile()?;

    // 3. Library
    let paths = AppPaths::new();
    let store = JsonFileStore::open(&paths.library_file)?;
    let mut library = Library::new(Box::new(store), &paths.books_dir);

    let bytes = std::fs::read(&cli.file)
        .with_context(|| format!("cannot read {}", cli.file.display()))?;
    let title = cli
        .file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| cli.file.display().to_string());
    let mut book = library.import(&title, &bytes)?;

    if let Some(encoding) = cli.encoding {
        library.set_encoding(&book.hash, encoding)?;
        book.encoding = encoding;
    }
    let text = library.load_text(&book, &TextDecoder)?;

    if let Some(line) = cli.from_line {
        let position = ReadingPosition {
            viewing_index: line,
            ..ReadingPosition::load(library.store(), &book.hash)?
        };
        position.save(library.store_mut(), &book.hash)?;
    }
    println!("{}", book.summary_line());

    // 4. Session
    let state = new_shared_state(&profile);
    let (event_tx, event_rx) = mpsc::channel(32);
    let (command_tx, command_rx) = mpsc::channel(16);
    let engine = ConsoleSpeechEngine::new(event_tx, Duration::from_millis(cli.pace_ms));
    let session = ReaderSession::new(
        state.clone(),
        Box::new(engine),
        library.into_store(),
        book.hash.clone(),
        text,
        profile,
    );
    let mut plays_ended = session.plays_ended();
    let task = tokio::spawn(session.run(command_rx, event_rx));

    // 5. Play
    command_tx.send(ReaderCommand::PlayToggle).await?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut ticker = tokio::time::interval(Duration::from_millis(50));

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                log::info!("interrupted");
                break;
            }
            changed = plays_ended.changed() => {
                if changed.is_err() {
                    log::warn!("reader session ended early");
                }
                break;
            }
            _ = ticker.tick() => {
                let mut st = state.lock().unwrap();
                for scroll in st.take_scrolls() {
                    log::debug!("scroll to line {} (animated: {})", scroll.index, scroll.animated);
                }
                // Play is refused in these states, so no play will ever end.
                if st.phase == ReaderPhase::Error {
                    log::error!(
                        "{}",
                        st.error_message.as_deref().unwrap_or("speech engine unavailable")
                    );
                    break;
                }
                if st.phase == ReaderPhase::Idle && st.store.is_empty() {
                    break;
                }
            }
        }
    }

    // 6. Close
    let (reply_tx, reply_rx) = oneshot::channel();
    if command_tx.send(ReaderCommand::Close(reply_tx)).await.is_err() {
        // The session stopped on its own; surface its error.
        task.await??;
        anyhow::bail!("reader session closed unexpectedly");
    }
    let summary = reply_rx.await?;
    task.await??;

    let progress = state.lock().unwrap().progress();
    println!(
        "stopped at line {} of {}: {} [{progress}]",
        summary.last_index + 1,
        summary.line_count,
        summary.last_line_text
    );
    Ok(())
}
