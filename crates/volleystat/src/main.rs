//! `vstat` - CLI for volleystat
//!
//! This binary provides the command-line interface for managing the team,
//! the match schedule and the archive, and for tracking a match live.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{debug, warn};

use volleystat::cli::{
    ArchiveCommand, Cli, Command, ConfigCommand, ScheduleCommand, Session, SessionCommand,
    Step, TeamCommand, TrackCommand,
};
use volleystat::export::find_rally_logs;
use volleystat::schedule::{Match, Schedule};
use volleystat::storage::DataLayout;
use volleystat::team::{Player, TeamBook, TeamInfo};
use volleystat::{init_logging, Config};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Validation reports on the file itself rather than failing the load
    if let Command::Config(ConfigCommand::Validate { file }) = &cli.command {
        validate_config(file.clone().or_else(|| cli.config.clone()));
        return Ok(());
    }

    // Load configuration
    let mut config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    if let Some(dir) = cli.data_dir.clone() {
        config.storage.data_dir = Some(dir);
    }
    let layout = config.data_layout();
    debug!("Data directory: {}", layout.root().display());

    // Execute the command
    match cli.command {
        Command::Team(cmd) => handle_team(&layout, cmd),
        Command::Schedule(cmd) => handle_schedule(&config, &layout, cmd),
        Command::Archive(cmd) => handle_archive(&layout, cmd),
        Command::Track(cmd) => handle_track(&config, &layout, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn handle_team(layout: &DataLayout, cmd: TeamCommand) -> anyhow::Result<()> {
    let mut book = TeamBook::open(layout.team_path());
    match cmd {
        TeamCommand::Show { json } => {
            let team = book.team();
            if json {
                println!("{}", serde_json::to_string_pretty(team)?);
            } else {
                let name = if team.name.is_empty() {
                    "(unnamed team)"
                } else {
                    team.name.as_str()
                };
                println!("{name}");
                println!("{}", "=".repeat(name.len()));
                println!("Hometown: {}", team.hometown);
                println!("League:   {}", team.league);
                println!("Season:   {}", team.season);
                println!();
                if team.players.is_empty() {
                    println!("No players on the roster.");
                }
                for player in &team.players {
                    print_player(player);
                }
            }
        }
        TeamCommand::Set {
            name,
            hometown,
            league,
            season,
        } => {
            book.update_info(TeamInfo {
                name,
                hometown,
                league,
                season,
            })?;
            println!("Team updated.");
        }
        TeamCommand::AddPlayer {
            jersey,
            name,
            position,
        } => {
            let player = Player::new(name, jersey, position);
            book.add_player(player.clone())?;
            print!("Added ");
            print_player(&player);
        }
        TeamCommand::RemovePlayer { jersey } => {
            let player = book.remove_player(jersey)?;
            print!("Removed ");
            print_player(&player);
        }
        TeamCommand::Sort => {
            book.sort_roster()?;
            println!("Roster sorted by jersey.");
        }
        TeamCommand::Import { file } => {
            book.import(&file)
                .with_context(|| format!("importing {}", file.display()))?;
            println!(
                "Imported {} with {} players.",
                book.team().name,
                book.team().players.len()
            );
        }
        TeamCommand::Export { dir } => {
            let dir = dir.unwrap_or_else(|| layout.export_dir().to_path_buf());
            let path = book.export(&dir)?;
            println!("Exported team to {}", path.display());
        }
    }
    Ok(())
}

fn print_player(player: &Player) {
    if player.position.is_empty() {
        println!("#{:<3} {}", player.jersey, player.name);
    } else {
        println!("#{:<3} {} ({})", player.jersey, player.name, player.position);
    }
}

fn print_matches(matches: &[Match], json: bool, empty: &str) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(matches)?);
    } else if matches.is_empty() {
        println!("{empty}");
    } else {
        for m in matches {
            println!(
                "{}  {}  {}  [{}, {}]",
                m.short_id(),
                m.date,
                m.title(),
                m.set_format,
                m.points_to_win
            );
        }
    }
    Ok(())
}

fn handle_schedule(config: &Config, layout: &DataLayout, cmd: ScheduleCommand) -> anyhow::Result<()> {
    let mut schedule = Schedule::open(layout.schedule_path(), layout.archive_path());
    match cmd {
        ScheduleCommand::Add(add) => {
            let our_team = match add
                .our_team
                .or_else(|| config.match_defaults.our_team.clone())
            {
                Some(name) => name,
                None => {
                    let team = TeamBook::open(layout.team_path());
                    if team.team().name.is_empty() {
                        bail!("no team name: pass --our-team or run `vstat team set --name`");
                    }
                    team.team().name.clone()
                }
            };

            let set_format = add
                .format
                .map_or(config.match_defaults.set_format, Into::into);
            let points_to_win = add
                .points
                .map_or(config.match_defaults.points_to_win, Into::into);
            let mut new_match =
                Match::new(our_team, add.opponent).with_rules(set_format, points_to_win);
            if let Some(date) = add.date {
                new_match = new_match.on(date);
            }

            let summary = format!("{} {} on {}", new_match.short_id(), new_match.title(), new_match.date);
            schedule.add_match(new_match)?;
            println!("Scheduled {summary}");
        }
        ScheduleCommand::List { json } => {
            print_matches(schedule.matches(), json, "No upcoming matches.")?;
        }
        ScheduleCommand::Archive { id } => {
            let archived = schedule.archive_match(&id)?;
            println!("Archived {}", archived.title());
        }
    }
    Ok(())
}

fn handle_archive(layout: &DataLayout, cmd: ArchiveCommand) -> anyhow::Result<()> {
    let mut schedule = Schedule::open(layout.schedule_path(), layout.archive_path());
    match cmd {
        ArchiveCommand::List { json } => {
            print_matches(schedule.archived(), json, "No archived matches.")?;
        }
        ArchiveCommand::Delete { id } => {
            let removed = schedule.delete_archived(&id)?;
            println!("Deleted {}", removed.title());
        }
        ArchiveCommand::Logs { id } => {
            let m = schedule.find_archived(&id)?;
            let logs = find_rally_logs(layout.export_dir(), &m.our_team, &m.opponent)?;
            if logs.is_empty() {
                println!("No rally logs for {}.", m.title());
            }
            for path in logs {
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

fn handle_track(config: &Config, layout: &DataLayout, cmd: &TrackCommand) -> anyhow::Result<()> {
    let mut schedule = Schedule::open(layout.schedule_path(), layout.archive_path());
    let scheduled = schedule.find(&cmd.id)?.clone();
    let roster = TeamBook::open(layout.team_path()).team().players.clone();
    if roster.len() < 6 {
        warn!("Only {} players on the roster; lineup is incomplete", roster.len());
    }

    let rules = config.game_rules(scheduled.set_format, scheduled.points_to_win);
    let mut session = Session::new(scheduled, rules, roster, layout.export_dir());
    session.start(cmd.first_serve())?;

    println!("Tracking {} ({})", session.scheduled().title(), session.scheduled().date);
    println!("Type 'help' for commands.");
    println!("{}", session.status());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        stdout.flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let step = match line.parse::<SessionCommand>() {
            Ok(command) => session.execute(command),
            Err(e) => Err(e),
        };
        match step {
            Ok(Step::Continue(message)) => println!("{message}"),
            Ok(Step::Quit) => break,
            Ok(Step::Archive(path)) => {
                println!("Saved rally log to {}", path.display());
                let archived = schedule.archive_match(&session.scheduled().id.to_string())?;
                println!("Archived {}", archived.title());
                return Ok(());
            }
            Err(e) if e.is_game_error() => println!("{e}"),
            Err(e) => return Err(e.into()),
        }
    }

    if session.has_unsaved_events() {
        let path = session.save()?;
        println!("Saved rally log to {}", path.display());
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Data directory:      {}", config.data_dir().display());
                println!("  Export directory:    {}", config.export_dir().display());
                println!();
                println!("[Match defaults]");
                println!("  Set format:          {}", config.match_defaults.set_format);
                println!("  Points to win:       {}", config.match_defaults.points_to_win);
                println!(
                    "  Our team:            {}",
                    config.match_defaults.our_team.as_deref().unwrap_or("(from team.json)")
                );
                println!();
                println!("[Game]");
                println!("  Set points:          {}", config.game.set_points);
                println!("  Deciding set points: {}", config.game.deciding_set_points);
                println!("  Win by:              {}", config.game.win_by);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => validate_config(file),
    }
    Ok(())
}

fn validate_config(file: Option<std::path::PathBuf>) {
    let path = file.unwrap_or_else(Config::default_config_path);
    println!("Validating configuration: {}", path.display());
    match Config::load_from(Some(path)) {
        Ok(_) => println!("Configuration is valid."),
        Err(e) => println!("Configuration error: {e}"),
    }
}
