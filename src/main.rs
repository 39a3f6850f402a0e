use std::cell::Cell;
use std::io::BufRead;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{anyhow, bail, Context, Result};

use tracewin::config::Config;
use tracewin::reader::read_trace_file;
use tracewin::summary::TraceSummary;
use tracewin::synthetic::{generate, SyntheticConfig};
use tracewin::{FullTrace, Instant, SelectionSession, Trace};

const USAGE: &str = "usage: tracewin <trace.json[.gz]> | tracewin --synthetic <seed>";

const HELP: &str = "commands:
  begin T      move the selection begin to T
  end T        move the selection end to T
  period A B   select [A, B)
  reset        select the whole trace
  show         print the current selection
  summary      print statistics of the current selection
  quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Begin(Instant),
    End(Instant),
    Period(Instant, Instant),
    Reset,
    Show,
    Summary,
    Help,
    Quit,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load_default().unwrap_or_else(|err| {
        log::warn!("Failed to load config, using defaults: {err:#}");
        Config::default()
    });

    let args: Vec<String> = std::env::args().skip(1).collect();
    let trace = load_trace(&args)?;
    let mut session = SelectionSession::with_config(Rc::new(trace), &config);

    let notified_version = Rc::new(Cell::new(session.version()));
    let observer_version = notified_version.clone();
    session.subscribe(move |version| observer_version.set(version));

    println!(
        "Trace spans [{}, {}) on {} locations. Type 'help' for commands.",
        session.full_trace().start_time().ticks(),
        session.full_trace().end_time().ticks(),
        session.full_trace().locations().len()
    );
    print_selection(&session);

    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match parse_command(line) {
            Ok(command) => command,
            Err(err) => {
                log::warn!("{err}");
                continue;
            }
        };

        let seen_version = notified_version.get();
        let result = match command {
            Command::Begin(t) => session.set_begin(t),
            Command::End(t) => session.set_end(t),
            Command::Period(begin, end) => session.set_period(begin, end),
            Command::Reset => {
                if !session.reset_to_full() {
                    println!("whole trace already selected");
                }
                Ok(())
            }
            Command::Show => {
                print_selection(&session);
                Ok(())
            }
            Command::Summary => {
                let summary = TraceSummary::of(&*session.selection());
                print!("{}", summary.report(config.summary_top_regions));
                Ok(())
            }
            Command::Help => {
                println!("{HELP}");
                Ok(())
            }
            Command::Quit => break,
        };

        match result {
            Ok(()) if notified_version.get() != seen_version => {
                println!("selection updated (version {})", notified_version.get());
                print_selection(&session);
            }
            Ok(()) => {}
            Err(err) => println!("rejected: {err}"),
        }
    }

    Ok(())
}

fn load_trace(args: &[String]) -> Result<FullTrace> {
    match args {
        [flag, seed] if flag == "--synthetic" => {
            let seed: u64 = seed
                .parse()
                .with_context(|| format!("Invalid seed '{seed}'"))?;
            Ok(generate(&SyntheticConfig::with_seed(seed))?)
        }
        [path] => read_trace_file(&PathBuf::from(path)),
        _ => bail!(USAGE),
    }
}

fn parse_command(line: &str) -> Result<Command> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let command = match words.as_slice() {
        ["begin", t] => Command::Begin(parse_instant(t)?),
        ["end", t] => Command::End(parse_instant(t)?),
        ["period", begin, end] => Command::Period(parse_instant(begin)?, parse_instant(end)?),
        ["reset"] => Command::Reset,
        ["show"] => Command::Show,
        ["summary"] => Command::Summary,
        ["help"] => Command::Help,
        ["quit"] | ["exit"] => Command::Quit,
        _ => return Err(anyhow!("Unknown command '{line}', try 'help'")),
    };
    Ok(command)
}

fn parse_instant(word: &str) -> Result<Instant> {
    let ticks: i64 = word
        .parse()
        .with_context(|| format!("'{word}' is not a timestamp"))?;
    Ok(Instant(ticks))
}

fn print_selection(session: &SelectionSession) {
    let selection = session.selection();
    println!(
        "[{}, {}) runtime {}: {} slots ({} clipped), {} messages, {} collectives",
        session.begin().ticks(),
        session.end().ticks(),
        selection.runtime(),
        selection.slot_count(),
        selection
            .all_slots()
            .iter()
            .filter(|slot| slot.is_clipped())
            .count(),
        selection.communications().len(),
        selection.collective_communications().len(),
    );
}

#[test]
fn test_parse_command() {
    assert_eq!(parse_command("begin 10").unwrap(), Command::Begin(Instant(10)));
    assert_eq!(
        parse_command("period 300 700").unwrap(),
        Command::Period(Instant(300), Instant(700))
    );
    assert_eq!(parse_command("quit").unwrap(), Command::Quit);
    assert!(parse_command("begin soon").is_err());
    assert!(parse_command("zoom").is_err());
}
