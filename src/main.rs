//! Caverun headless driver
//!
//! Loads a world definition from JSON, runs a scripted session and logs its
//! progress. File parsing lives here, in the driver; the simulation core
//! only ever sees a fully-formed `WorldDef`.
//!
//! Usage: `caverun <world.json> [ticks]`

use std::error::Error;
use std::fs;
use std::process::ExitCode;

use caverun::sim::{AvatarState, Game, TickInput};
use caverun::view;
use caverun::worlddef::WorldDef;

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("caverun: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: caverun <world.json> [ticks]")?;
    let ticks: u64 = match args.next() {
        Some(raw) => raw.parse()?,
        None => 600,
    };

    let raw = fs::read_to_string(&path)?;
    let def: WorldDef = serde_json::from_str(&raw)?;
    let tuning = def.tuning.clone();
    let world = def.build(None)?;
    let mut game = Game::new(world, tuning, None);

    let mut input = TickInput::default();
    for t in 0..ticks {
        // Demo script: amble right, hop every couple of seconds
        input.right = true;
        input.jump = t % 100 == 40;

        game.tick(&input);

        if t % 60 == 0 {
            log::info!(
                "tick {:>5}  screen {}  pos ({:>6.1},{:>6.1})  {:?}",
                game.time_ticks(),
                game.world.current_id(),
                game.avatar.pos.x,
                game.avatar.pos.y,
                game.avatar.state(),
            );
        }
        if game.avatar.state() == AvatarState::Dying {
            log::info!("tick {:>5}  avatar dying", game.time_ticks());
        }
    }

    let snap = view::snapshot(&game);
    println!("{}", serde_json::to_string_pretty(&snap)?);
    log::info!(
        "finished after {} ticks, {} goodies left",
        game.time_ticks(),
        game.world.collectable_remaining()
    );
    Ok(())
}
