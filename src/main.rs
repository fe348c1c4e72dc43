use std::process;

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use arena_timeline::{
    config::StudioConfig,
    document::{DocumentStore, input::parse_ms},
    engine::{clock::Clock, frame::FrameView},
    player::{Player, format_ms},
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const NEW_USAGE: &str = "arena-timeline new <doc.json>";
const INSPECT_USAGE: &str = "arena-timeline inspect <doc.json> <time_ms>";
const EXPORT_USAGE: &str = "arena-timeline export <doc.json> <out.json>";
const PLAY_USAGE: &str = "arena-timeline play <doc.json>";

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let config = StudioConfig::load();

    match args.next().as_deref() {
        Some("new") => {
            let path = args.next().context(NEW_USAGE)?;
            new(&path, &config)
        }
        Some("inspect") => {
            let path = args.next().context(INSPECT_USAGE)?;
            let time = args.next().context(INSPECT_USAGE)?;
            inspect(&path, parse_ms(&time, 0.0), &config)
        }
        Some("export") => {
            let path = args.next().context(EXPORT_USAGE)?;
            let out = args.next().context(EXPORT_USAGE)?;
            export(&path, &out, &config)
        }
        Some("play") => {
            let path = args.next().context(PLAY_USAGE)?;
            play(&path, config)
        }
        _ => bail!(
            "Arena timeline — boss encounter authoring and playback\n\nUsage:\n  {NEW_USAGE}\n  {INSPECT_USAGE}\n  {EXPORT_USAGE}\n  {PLAY_USAGE}"
        ),
    }
}

fn new(path: &str, config: &StudioConfig) -> Result<()> {
    let store = DocumentStore::new(config.edit_settings());
    store.save(path)?;
    eprintln!("Wrote default encounter to {path}");
    Ok(())
}

fn inspect(path: &str, time_ms: f64, config: &StudioConfig) -> Result<()> {
    let mut store = DocumentStore::open(path, config.edit_settings())?;
    Clock::new().scrub_to(&mut store, time_ms);

    let doc = store.document();
    let view = FrameView::build(doc, None, config.keyframe_tolerance_ms);
    println!("t = {} of {}", format_ms(view.time_ms), format_ms(doc.timeline_duration_ms));

    println!("\nentities:");
    for e in &view.entities {
        print!("  {} {} at ({:.1}, {:.1})", e.entity.id, e.entity.kind.name(), e.position.x, e.position.y);
        match e.facing {
            Some(deg) => println!(" facing {deg:.1}°"),
            None => println!(),
        }
    }

    println!("\nvisible aoes:");
    for aoe in &view.aoes {
        println!(
            "  {} {} at ({:.1}, {:.1}) rot {:.1}° [{} .. {}]",
            aoe.id,
            aoe.shape.name(),
            aoe.position.x,
            aoe.position.y,
            aoe.rotation,
            format_ms(aoe.timing.visible_from()),
            format_ms(aoe.timing.visible_until()),
        );
    }

    println!("\nfired actions:");
    for action in doc.actions.iter().filter(|a| a.executed) {
        println!("  {} at {}", action.id, format_ms(action.at_ms));
    }
    Ok(())
}

fn export(path: &str, out: &str, config: &StudioConfig) -> Result<()> {
    let store = DocumentStore::open(path, config.edit_settings())?;
    store.save(out)?;
    eprintln!("Exported {path} -> {out}");
    Ok(())
}

fn play(path: &str, config: StudioConfig) -> Result<()> {
    let store = DocumentStore::open(path, config.edit_settings())?;
    let mut player = Player::new(store, config);
    player.play()
}
