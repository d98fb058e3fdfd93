use anyhow::Context;
use bevy::app::App;
use bevy::ecs::event::Events;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use passive_core::balance::{self, SimConfig};
use passive_core::catalog::Catalog;
use passive_core::combat::Arena;
use passive_core::command::{self, ConsoleInput, ConsoleVerb};
use passive_core::config::GameConfig;
use passive_core::logging;
use passive_core::plugin::{GameLogEvent, PassiveTreePlugin, SessionResource};
use passive_core::session::{GameSession, SessionView};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let first = args.next();
    if first.as_deref() == Some("--export-catalog") {
        let target = args
            .next()
            .map(PathBuf::from)
            .context("--export-catalog needs an output path")?;
        return export_catalog(&target);
    }

    let config_path = first
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("passive-tree.json"));
    let config = GameConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    logging::init_tracing(&config.tracing);
    tracing::info!(config = %config_path.display(), data_dir = %config.data_dir.display(), "starting");

    let mut app = App::new();
    app.add_plugins(PassiveTreePlugin::new(config));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", command::HELP)?;
    render(&mut out, &session(&app).view())?;

    for line in std::io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        let input = match command::parse_line(line.trim_end_matches(['\r', '\n'])) {
            Ok(input) => input,
            Err(e) => {
                writeln!(out, "{e}")?;
                continue;
            }
        };
        match input {
            ConsoleInput::Console(ConsoleVerb::Quit) => break,
            ConsoleInput::Console(ConsoleVerb::Help) => writeln!(out, "{}", command::HELP)?,
            ConsoleInput::Console(ConsoleVerb::Show) => render(&mut out, &session(&app).view())?,
            ConsoleInput::Console(ConsoleVerb::Simulate(trials)) => {
                simulate(&mut out, session(&app), trials)?
            }
            ConsoleInput::Command(command) => {
                app.world_mut().send_event(command);
                app.update();
                let log: Vec<GameLogEvent> = app
                    .world_mut()
                    .resource_mut::<Events<GameLogEvent>>()
                    .drain()
                    .collect();
                for entry in &log {
                    writeln!(out, "> {}", entry.message())?;
                }
                if let Some(arena) = &session(&app).view().arena {
                    render_arena(&mut out, arena)?;
                }
            }
        }
        out.flush()?;
    }
    Ok(())
}

/// Write the built-in catalog as a RON document to start a custom one from
fn export_catalog(target: &Path) -> anyhow::Result<()> {
    let document = Catalog::standard().to_ron_string()?;
    std::fs::write(target, document).with_context(|| format!("writing {}", target.display()))?;
    println!("catalog written to {}", target.display());
    Ok(())
}

fn session(app: &App) -> &GameSession {
    &app.world().resource::<SessionResource>().0
}

fn simulate(out: &mut impl Write, session: &GameSession, trials: u64) -> anyhow::Result<()> {
    let catalog = session.catalog();
    let Some((character, map)) = session.active().and_then(|c| {
        c.selected_map
            .as_deref()
            .and_then(|id| catalog.map(id))
            .map(|m| (c, m))
    }) else {
        writeln!(out, "Create a character and choose a map.")?;
        return Ok(());
    };
    let report = balance::simulate(
        catalog,
        character,
        map,
        &SimConfig {
            trials,
            ..SimConfig::default()
        },
    );
    writeln!(
        out,
        "{} runs on {} at power {}:",
        report.trials, map.name, report.starting_power
    )?;
    for tier in &report.tiers {
        writeln!(out, "  {:<7} {:>5.1}%", tier.tier.as_str(), tier.win_rate * 100.0)?;
    }
    writeln!(
        out,
        "  mean xp {:.1}, mean final level {:.2}",
        report.mean_xp_gained, report.mean_final_level
    )?;
    Ok(())
}

fn render(out: &mut impl Write, view: &SessionView) -> std::io::Result<()> {
    match &view.character {
        Some(c) => {
            writeln!(
                out,
                "\n{} ({}) level {}  xp {}/{}  points {}  power {}",
                c.name, c.class_label, c.level, c.xp, c.xp_to_next, c.points, c.stats.power
            )?;
            let stats: Vec<String> = c
                .stats
                .totals
                .iter()
                .map(|(k, v)| format!("{k} {v:.1}"))
                .collect();
            writeln!(out, "  {}", stats.join(", "))?;
        }
        None => writeln!(out, "\nNo active character.")?,
    }

    writeln!(out, "tree:")?;
    for node in &view.nodes {
        let marker = if node.can_allocate { "+" } else { " " };
        writeln!(
            out,
            " {marker} [{:<9}] {:<16} {}",
            node.state.label(),
            node.id,
            node.effects
        )?;
    }

    writeln!(out, "maps:")?;
    for map in &view.maps {
        let marker = if map.selected { "*" } else { " " };
        writeln!(out, " {marker} {:<15} {}", map.id, map.name)?;
    }

    if !view.roster.is_empty() {
        writeln!(out, "roster:")?;
        for entry in &view.roster {
            let marker = if entry.active { "*" } else { " " };
            writeln!(
                out,
                " {marker} {}  {} ({}) level {}, {} nodes",
                entry.id, entry.name, entry.class_name, entry.level, entry.allocated
            )?;
        }
    }

    if let Some(arena) = &view.arena {
        render_arena(out, arena)?;
    }
    Ok(())
}

fn render_arena(out: &mut impl Write, arena: &Arena) -> std::io::Result<()> {
    writeln!(out, "{}:", arena.map_name)?;
    for y in 0..arena.grid {
        let row: String = (0..arena.grid)
            .map(|x| {
                if arena.player.x == x && arena.player.y == y {
                    '@'
                } else if let Some(e) = arena
                    .enemies
                    .iter()
                    .find(|e| e.position.x == x && e.position.y == y)
                {
                    e.tier.as_str().chars().next().unwrap_or('?').to_ascii_uppercase()
                } else {
                    '.'
                }
            })
            .collect();
        writeln!(out, "  {row}")?;
    }
    for e in &arena.enemies {
        writeln!(out, "  {} {}/{} hp", e.label, e.hp, e.max_hp)?;
    }
    Ok(())
}
