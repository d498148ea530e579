//! folio - drive the portfolio showcase and contact form from the terminal.
//!
//! - `simulate`: mount the stacking showcase on a headless stage, feed wheel
//!   input frame by frame and print card poses as JSON lines.
//! - `timeline`: print the built stacking timeline as JSON.
//! - `contact`: validate and submit the contact form.

mod settings;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use folio_contact::{ContactFields, ContactForm, FormState, FormspreeEndpoint};
use folio_core::marquee::Marquee;
use folio_core::{FrameLoop, ScrollStackAnimator, ShowcaseView, Stage};
use serde_json::json;
use settings::{load_deck, Settings};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Scroll-stacked project showcase and contact form", long_about = None)]
struct Cli {
    /// Settings file (JSON); every key is optional
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct DeckArgs {
    /// Deck JSON file (defaults to the shipped projects)
    #[arg(long)]
    deck: Option<PathBuf>,

    /// Rhai script evaluating to a deck; wins over --deck
    #[arg(long)]
    script: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scroll through the showcase and print card poses per frame
    Simulate {
        #[command(flatten)]
        deck: DeckArgs,

        /// Number of frames to run
        #[arg(short, long, default_value_t = 600)]
        frames: u32,

        /// Wheel delta fed on every frame, in px
        #[arg(short, long, default_value_t = 60.0)]
        wheel: f64,

        /// Frame interval in ms
        #[arg(long, default_value_t = 16.0)]
        frame_ms: f64,

        /// Print every Nth frame
        #[arg(long, default_value_t = 10)]
        every: u32,
    },

    /// Print the stacking timeline outline
    Timeline {
        #[command(flatten)]
        deck: DeckArgs,
    },

    /// Submit the contact form
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        email: String,

        #[arg(long)]
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("folio=info,folio_core=info,folio_contact=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Simulate {
            deck,
            frames,
            wheel,
            frame_ms,
            every,
        } => cmd_simulate(&settings, &deck, frames, wheel, frame_ms, every.max(1)),
        Commands::Timeline { deck } => cmd_timeline(&settings, &deck),
        Commands::Contact {
            name,
            company,
            email,
            message,
        } => {
            let fields = ContactFields {
                name,
                company,
                email,
                message,
            };
            cmd_contact(&settings, fields).await
        }
    }
}

/// Lays a deck out and mounts the showcase on a fresh stage.
fn mount(settings: &Settings, args: &DeckArgs) -> Result<(Rc<RefCell<Stage>>, ShowcaseView, ScrollStackAnimator, FrameLoop)> {
    let deck = load_deck(args.deck.as_deref(), args.script.as_deref())?;
    let config = settings.showcase.clone();
    let mut stage = Stage::new(config.viewport);
    let view = ShowcaseView::build(&mut stage, &deck, &config.layout);

    let stage = Rc::new(RefCell::new(stage));
    let mut frames = FrameLoop::new();
    let mut animator = ScrollStackAnimator::with_defaults(deck, config);
    animator
        .mount(Rc::clone(&stage), &mut frames, &view)
        .context("failed to mount the showcase")?;
    Ok((stage, view, animator, frames))
}

fn cmd_simulate(settings: &Settings, args: &DeckArgs, frames: u32, wheel: f64, frame_ms: f64, every: u32) -> Result<()> {
    let (stage, view, mut animator, mut frame_loop) = mount(settings, args)?;

    for frame in 0..frames {
        let now = frame as f64 * frame_ms;
        animator.wheel(wheel);
        frame_loop.tick(now);

        if frame % every != 0 && frame + 1 != frames {
            continue;
        }
        let stage = stage.borrow();
        let cards: Vec<_> = view
            .cards
            .iter()
            .zip(animator.deck().cards())
            .filter_map(|(&id, card)| {
                let pose = stage.pose(id)?;
                Some(json!({
                    "card": card.display_label(),
                    "title": card.title,
                    "y": pose.translate_y,
                    "scale": pose.scale,
                    "opacity": pose.opacity,
                    "z": pose.z_index,
                    "shadow_alpha": pose.shadow.alpha,
                }))
            })
            .collect();
        let line = json!({
            "frame": frame,
            "time_ms": now,
            "scroll": animator.position(),
            "playhead": animator.playhead(),
            "pin_offset": stage.get_node(view.region).map(|n| n.pin_offset),
            "backdrop_clip": stage.pose(view.backdrop).map(|p| p.clip_radius),
            "cards": cards,
        });
        println!("{line}");
    }

    animator.unmount(&mut frame_loop);
    Ok(())
}

fn cmd_timeline(settings: &Settings, args: &DeckArgs) -> Result<()> {
    let (_stage, _view, mut animator, mut frames) = mount(settings, args)?;
    let outline = animator.outline();
    println!("{}", serde_json::to_string_pretty(&outline)?);
    animator.unmount(&mut frames);
    Ok(())
}

async fn cmd_contact(settings: &Settings, fields: ContactFields) -> Result<()> {
    let marquee = Marquee::new("CONTACT ME HERE / CONTACT ME HERE", 1600.0, &settings.showcase.viewport);
    eprintln!("{}", marquee.content());

    let endpoint = FormspreeEndpoint::new(&settings.contact);
    info!(url = endpoint.url(), "submitting contact form");
    let form = ContactForm::new(endpoint, &settings.contact);

    let state = form.submit(&fields).await.context("contact submission failed")?;
    println!("{}", serde_json::to_string(&state)?);

    match state {
        FormState::Succeeded => {
            println!("Message sent successfully!");
            while form.banner_visible() {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            info!("banner expired");
            Ok(())
        }
        FormState::Failed(errors) => {
            for error in &errors {
                eprintln!("  {error}");
            }
            bail!("contact form was not accepted ({} error(s))", errors.len())
        }
        other => bail!("unexpected form state {other:?}"),
    }
}
