use std::{fs, process};

use anyhow::{Context, Result, bail, ensure};
use tracing_subscriber::EnvFilter;

use flipbook::{
    book::Book,
    config::{Keymap, ReaderConfig},
    engine::{Reader, spread::SpreadRenderer},
    player::Player,
    renderer::{CellCanvas, Renderer},
    surface::{Monospace, Recorder, replay},
};

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

/// Logs go to stderr so they never land on the alternate screen.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

const READ_USAGE: &str = "flipbook read <book.json>";
const RENDER_USAGE: &str = "flipbook render <book.json> <page> [ops.json]";

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("read") => {
            let path = args.next().context(READ_USAGE)?;
            read(&path)
        }
        Some("render") => {
            let path = args.next().context(RENDER_USAGE)?;
            let page = args.next().context(RENDER_USAGE)?;
            let page: usize = page
                .parse()
                .with_context(|| format!("Invalid page index {page:?}"))?;
            render(&path, page, args.next().as_deref())
        }
        _ => bail!(
            "flipbook — a page-turning book reader for the terminal\n\nUsage:\n  {READ_USAGE}\n  {RENDER_USAGE}"
        ),
    }
}

fn read(path: &str) -> Result<()> {
    let config = ReaderConfig::load();
    let keymap = Keymap::from_bindings(&config.key_bindings).context("Invalid key bindings")?;
    let book = Book::load(path)?;

    let reader = Reader::new(book, config.geometry, config.timing);
    let mut player = Player::new(reader, keymap, config.cell);
    player.play()
}

/// Draw one static page index, either as plain text on stdout or as a JSON
/// list of draw ops.
fn render(path: &str, page: usize, output: Option<&str>) -> Result<()> {
    let config = ReaderConfig::load();
    let book = Book::load(path)?;
    ensure!(
        page <= book.last_page(),
        "Page {page} out of range: {path} has pages 0..={}",
        book.last_page()
    );

    let renderer = SpreadRenderer::new(config.geometry);
    let mut recorder = Recorder::new(Monospace {
        advance: config.cell.width_px,
    });
    renderer.render(&book, page, &mut recorder);

    match output {
        Some(output_path) => {
            let json = serde_json::to_string_pretty(recorder.ops())?;
            fs::write(output_path, &json)
                .with_context(|| format!("Failed to write {output_path}"))?;
            eprintln!("Wrote {} draw ops for page {page} -> {output_path}", recorder.ops().len());
        }
        None => {
            let contract = config.cell.contract_for(&config.geometry);
            let mut canvas = CellCanvas::new(contract, config.cell);
            replay(recorder.ops(), &mut canvas);
            print!("{}", Renderer::to_text(canvas.grid()));
        }
    }

    Ok(())
}
