//! Line-oriented chore tracker shell.

use chore_tracker::persistence::export_chores_to_csv;
use chore_tracker::{
    ChoreError, ChoreHandle, ChoreId, ChoreRepository, ChoreState, SortDirection, TrackerConfig,
    WorkerId, WorkerRepository,
};
use chrono::NaiveDate;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Household chore tracker.
#[derive(Parser)]
#[command(name = "chores", version, about)]
struct Cli {
    /// Path to TOML configuration file. Defaults to
    /// `$XDG_CONFIG_HOME/chore-tracker/config.toml` when that file exists.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the chore and worker stores; overrides the config.
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn render_row<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for (ci, cell) in cells.enumerate() {
        let pad = widths[ci].saturating_sub(cell.chars().count());
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(pad));
        line.push_str(" |");
    }
    line
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&widths, headers.iter().copied()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(&widths, row.iter().map(String::as_str)));
        out.push('\n');
    }
    out.push_str(&sep);
    out
}

fn render_chores(chores: &[ChoreHandle], workers: &WorkerRepository) -> String {
    let rows: Vec<Vec<String>> = chores
        .iter()
        .map(|handle| {
            let chore = handle.borrow();
            let worker = chore
                .worker()
                .map(|id| match workers.resolve(id) {
                    Some(worker) => worker.name.clone(),
                    None => format!("?{id}"),
                })
                .unwrap_or_default();
            vec![
                chore.id().to_string(),
                chore.date().to_string(),
                chore.name().to_string(),
                worker,
                chore.state().to_string(),
                chore.value().map(|v| v.to_string()).unwrap_or_default(),
                String::from(if chore.is_locked() { "yes" } else { "" }),
                chore.comment().to_string(),
            ]
        })
        .collect();
    render_table(
        &["id", "date", "name", "worker", "state", "value", "locked", "comment"],
        &rows,
    )
}

fn print_help() {
    println!(
        "Commands:\n  help                                         Show this help\n  workers                                      List workers\n  show                                         Show chores in current order\n  sort <field> [asc|desc]                      Sort (repeat the field to flip direction)\n  create <from> <to> <worker> <name> [desc...] One chore per day, dates YYYY-MM-DD\n  state   <chore> <STATE>                      BLANK | DONE | PAUSED | NOTDONE\n  cycle   <chore>                              Advance to the next state\n  assign  <chore> <worker>                     Reassign\n  lock    <chore>                              Lock against edits\n  unlock  <chore>                              Unlock\n  comment <chore> <text...>                    Set comment (rest of line)\n  value   <chore> <amount|none>                Set or clear value\n  delete  <chore>                              Delete an unlocked chore\n  week    <worker> <date>                      Worker's chores in that week\n  month   <worker> <date>                      Worker's chores in that month\n  range   <date> <days> [worker]               Chores in [date, date + days)\n  weeks                                        Mondays with week numbers\n  months                                       Months holding chores\n  export  <path>                               Write chores as CSV\n  quit|exit                                    Exit"
    );
}

fn report(what: &str, result: Result<bool, ChoreError>) {
    match result {
        Ok(true) => println!("{what} set."),
        Ok(false) => println!("Chore is locked."),
        Err(e) => println!("Error: {e}"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chore_tracker=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match cli.config {
        Some(ref path) => TrackerConfig::from_file(path)?,
        None => {
            let path = TrackerConfig::default_config_path();
            if path.is_file() {
                TrackerConfig::from_file(&path)?
            } else {
                TrackerConfig::default()
            }
        }
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let (chores, workers) = config.open_repositories()?;
    println!("Chore tracker - type 'help' for commands");
    run(&chores, &workers, io::stdin().lock());
    Ok(())
}

fn run(chores: &ChoreRepository, workers: &WorkerRepository, input: impl BufRead) {
    // Prints the usage line when the id is missing and the error when it
    // does not resolve.
    let chore = |id: Option<&str>, usage: &str| -> Option<ChoreHandle> {
        let Some(id) = id else {
            println!("Usage: {usage}");
            return None;
        };
        match chores.get_by_id(&ChoreId::from(id)) {
            Ok(handle) => Some(handle),
            Err(e) => {
                println!("Error: {e}");
                None
            }
        }
    };
    let worker_id = |id: &str| -> Option<WorkerId> {
        match workers.get_by_id(&WorkerId::from(id)) {
            Ok(worker) => Some(worker.id().clone()),
            Err(e) => {
                println!("Error: {e}");
                None
            }
        }
    };

    let mut lines = input.lines();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let line = match lines.next() {
            Some(Ok(line)) => line,
            _ => break,
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "workers" => {
                let rows: Vec<Vec<String>> = workers
                    .get_all()
                    .iter()
                    .map(|w| vec![w.id().to_string(), w.name.clone(), w.monthly_chore_value.to_string()])
                    .collect();
                println!("{}", render_table(&["id", "name", "monthly value"], &rows));
            }
            "show" => println!("{}", render_chores(&chores.get_all(), workers)),
            "sort" => {
                let field = parts.next();
                let direction = match parts.next() {
                    None => None,
                    Some("asc") => Some(SortDirection::Ascending),
                    Some("desc") => Some(SortDirection::Descending),
                    Some(_) => {
                        println!("Usage: sort <field> [asc|desc]");
                        continue;
                    }
                };
                let Some(field) = field else {
                    println!("Usage: sort <field> [asc|desc]");
                    continue;
                };
                let result = match direction {
                    Some(direction) => chores.sort_with(field, direction),
                    None => chores.sort(field),
                };
                match result {
                    Ok(()) => {
                        let state = chores.sort_state();
                        let dir = if state.direction.is_ascending() { "asc" } else { "desc" };
                        println!("Sorted by {} {dir}.", state.field);
                        println!("{}", render_chores(&chores.get_all(), workers));
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            "create" => {
                let (from_s, to_s, worker_s, name) = (parts.next(), parts.next(), parts.next(), parts.next());
                let description = parts.collect::<Vec<_>>().join(" ");
                match (from_s, to_s, worker_s, name) {
                    (Some(from_s), Some(to_s), Some(worker_s), Some(name)) => {
                        let (Some(from), Some(to)) = (parse_date(from_s), parse_date(to_s)) else {
                            println!("Invalid date (YYYY-MM-DD)");
                            continue;
                        };
                        let Some(worker) = worker_id(worker_s) else { continue };
                        match chores.create_range(from, to, name, &description, &worker) {
                            Ok(count) => println!("Created {count} chores."),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: create <from> <to> <worker> <name> [description...]"),
                }
            }
            "state" => {
                let Some(handle) = chore(parts.next(), "state <chore> <STATE>") else { continue };
                match parts.next().map(str::parse::<ChoreState>) {
                    Some(Ok(state)) => report("state", handle.set_state(state)),
                    Some(Err(e)) => println!("Error: {e}"),
                    None => println!("Usage: state <chore> <STATE>"),
                }
            }
            "cycle" => {
                let Some(handle) = chore(parts.next(), "cycle <chore>") else { continue };
                match handle.cycle_state() {
                    Ok(true) => println!("state set to {}.", handle.borrow().state()),
                    other => report("state", other),
                }
            }
            "assign" => {
                let Some(handle) = chore(parts.next(), "assign <chore> <worker>") else { continue };
                let Some(worker_s) = parts.next() else {
                    println!("Usage: assign <chore> <worker>");
                    continue;
                };
                let Some(worker) = worker_id(worker_s) else { continue };
                report("worker", handle.set_worker_by_id(worker));
            }
            "lock" | "unlock" => {
                let usage = format!("{cmd} <chore>");
                let Some(handle) = chore(parts.next(), usage.as_str()) else { continue };
                let result = if cmd == "lock" { handle.lock() } else { handle.unlock() };
                match result {
                    Ok(()) => println!("{cmd}ed."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "comment" => {
                let Some(handle) = chore(parts.next(), "comment <chore> <text...>") else { continue };
                let text = parts.collect::<Vec<_>>().join(" ");
                report("comment", handle.set_comment(text));
            }
            "value" => {
                let Some(handle) = chore(parts.next(), "value <chore> <amount|none>") else { continue };
                let value = match parts.next() {
                    Some(s) if s.eq_ignore_ascii_case("none") => None,
                    Some(s) => match s.parse::<f64>() {
                        Ok(v) => Some(v),
                        Err(_) => {
                            println!("Invalid amount");
                            continue;
                        }
                    },
                    None => {
                        println!("Usage: value <chore> <amount|none>");
                        continue;
                    }
                };
                report("value", handle.set_value(value));
            }
            "delete" => {
                let Some(handle) = chore(parts.next(), "delete <chore>") else { continue };
                match chores.delete(&handle) {
                    Ok(true) => println!("Deleted."),
                    Ok(false) => println!("Chore is locked."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "week" | "month" => {
                let (worker_s, date_s) = (parts.next(), parts.next());
                match (worker_s, date_s.and_then(parse_date)) {
                    (Some(worker_s), Some(date)) => {
                        let Some(worker) = worker_id(worker_s) else { continue };
                        let found = if cmd == "week" {
                            chores.get_for_worker_in_week(&worker, date)
                        } else {
                            chores.get_for_worker_in_month(&worker, date)
                        };
                        println!("{}", render_chores(&found, workers));
                    }
                    _ => println!("Usage: {cmd} <worker> <YYYY-MM-DD>"),
                }
            }
            "range" => {
                let date = parts.next().and_then(parse_date);
                let days = parts.next().and_then(|s| s.parse::<i64>().ok());
                let worker = match parts.next() {
                    Some(worker_s) => match worker_id(worker_s) {
                        Some(worker) => Some(worker),
                        None => continue,
                    },
                    None => None,
                };
                match (date, days) {
                    (Some(date), Some(days)) => {
                        let found = chores.get_for_date_range(date, days, worker.as_ref());
                        println!("{}", render_chores(&found, workers));
                    }
                    _ => println!("Usage: range <YYYY-MM-DD> <days> [worker]"),
                }
            }
            "weeks" => {
                for (monday, week) in chores.calendar().mondays_and_weeks() {
                    println!("{monday}  week {week}");
                }
            }
            "months" => {
                for month in chores.calendar().months() {
                    println!("{}", month.format("%Y-%m"));
                }
            }
            "export" => match parts.next() {
                Some(path) => match export_chores_to_csv(&chores.get_all(), path) {
                    Ok(()) => println!("Exported {} chores to {path}.", chores.len()),
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: export <path>"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
