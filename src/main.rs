#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

use std::env;
use std::time::Instant;

use anyhow::{bail, Context};
use glam::Vec2;
use tracing::{info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

use infiltrator::constants::LOOP_TIME;
use infiltrator::formatter::{increment_tick, set_session, TickFormatter};
use infiltrator::input::{Buttons, InputSnapshot};
use infiltrator::level::demo::demo_level;
use infiltrator::session::GameSession;

/// Command line options for the headless runner.
struct Options {
    realtime: bool,
    seed: u64,
    ticks: u64,
}

impl Options {
    fn parse() -> anyhow::Result<Self> {
        let mut options = Options {
            realtime: false,
            seed: 0x5EED,
            ticks: 60 * 60,
        };
        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--realtime" | "-r" => options.realtime = true,
                "--seed" => {
                    let value = args.next().context("--seed needs a value")?;
                    options.seed = value.parse().with_context(|| format!("invalid seed {value:?}"))?;
                }
                "--ticks" => {
                    let value = args.next().context("--ticks needs a value")?;
                    options.ticks = value.parse().with_context(|| format!("invalid tick count {value:?}"))?;
                }
                other => bail!("unknown argument {other:?}"),
            }
        }
        Ok(options)
    }
}

fn init_tracing() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::registry()
        .with(fmt::layer().event_format(TickFormatter))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(ErrorLayer::default());
    tracing::subscriber::set_global_default(subscriber).context("could not set tracing subscriber")
}

/// A canned input stream: wander the demo map, mashing keys whenever a document is open.
fn scripted_input(tick: u64, in_minigame: bool) -> InputSnapshot {
    if in_minigame {
        let buttons = if tick % 20 == 0 { Buttons::INTERACT } else { Buttons::empty() };
        return InputSnapshot::idle().with_keystrokes(2).with_buttons(buttons);
    }

    let movement = match (tick / 120) % 4 {
        0 => Vec2::X,
        1 => Vec2::Y,
        2 => Vec2::NEG_X,
        _ => Vec2::NEG_Y,
    };
    let mut buttons = Buttons::empty();
    if (tick / 300) % 2 == 1 {
        buttons |= Buttons::SPRINT;
    }
    if tick % 30 == 0 {
        buttons |= Buttons::INTERACT;
    }
    InputSnapshot::moving(movement).with_buttons(buttons)
}

fn main() -> anyhow::Result<()> {
    let options = Options::parse()?;
    init_tracing()?;

    let (config, rasters) = demo_level().context("could not build the demo level")?;
    let mut session = GameSession::with_level(config, rasters, options.seed)?;

    info!(loop_time = ?LOOP_TIME, ticks = options.ticks, seed = options.seed, "Starting session");

    for tick in 0..options.ticks {
        let start = Instant::now();

        let input = scripted_input(tick, session.minigame().is_some());
        session.tick(LOOP_TIME, &input);
        increment_tick();
        set_session(session.level_index(), session.elapsed());

        for event in session.drain_events() {
            info!(?event, "Game event");
        }

        let outcome = session.outcome();
        if outcome.is_failure() {
            session.restart()?;
        } else if outcome.is_over() {
            info!(elapsed = ?session.elapsed(), "Demo level cleared");
            break;
        }

        if options.realtime {
            let elapsed = start.elapsed();
            if elapsed < LOOP_TIME {
                spin_sleep::sleep(LOOP_TIME - elapsed);
            } else {
                warn!(behind = ?(elapsed - LOOP_TIME), "Tick behind schedule");
            }
        }
    }

    let frame = session.frame();
    info!(
        documents = frame.hud.documents_collected,
        total = frame.hud.documents_total,
        elapsed = ?frame.hud.elapsed,
        "Session finished"
    );
    Ok(())
}
