//! Raid seed search CLI
//!
//! Usage: raidseed_search <request.json> [--threads <N>] [--batch-size <N>]
//!
//! Example:
//!   raidseed_search eevee_den.json
//!   raidseed_search eevee_den.json --threads 8 --batch-size 50000
//!
//! The request file lists the trainer, species table, encounters, criteria and
//! hexadecimal seed range. Set RUST_LOG=debug for per-batch logging.

use raidseed_core::infra::search_config::{ConfigError, SearchConfigFile, load_search_config};
use raidseed_core::{Progress, SearchConfig, SearchContext, SearchSession, SeedResult};
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

struct Args {
    request: PathBuf,
    threads: Option<usize>,
    batch_size: Option<u64>,
}

fn print_usage(program: &str) {
    eprintln!(
        "Usage: {} <request.json> [--threads <N>] [--batch-size <N>]",
        program
    );
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    let Some(text) = args.get(i) else {
        eprintln!("{} requires a value", flag);
        std::process::exit(1);
    };
    match text.parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("Error: invalid value '{}' for {}.", text, flag);
            std::process::exit(1);
        }
    }
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("raidseed_search");

    if args.len() < 2 {
        print_usage(program);
        std::process::exit(1);
    }

    let mut request: Option<PathBuf> = None;
    let mut threads: Option<usize> = None;
    let mut batch_size: Option<u64> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--threads" => {
                i += 1;
                threads = Some(parse_value(&args, i, "--threads"));
            }
            "--batch-size" => {
                i += 1;
                batch_size = Some(parse_value(&args, i, "--batch-size"));
            }
            "-h" | "--help" => {
                print_usage(program);
                std::process::exit(0);
            }
            value if !value.starts_with('-') => {
                if request.is_some() {
                    eprintln!("Error: duplicate request argument '{}'.", value);
                    std::process::exit(1);
                }
                request = Some(PathBuf::from(value));
            }
            other => {
                eprintln!("Unknown option: {}", other);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(request) = request else {
        eprintln!("Error: Missing request file.");
        print_usage(program);
        std::process::exit(1);
    };

    Args {
        request,
        threads,
        batch_size,
    }
}

fn format_config_error(err: &ConfigError) -> String {
    match err {
        ConfigError::Io(e) => format!("Could not read the request file: {}", e),
        ConfigError::Json(e) => format!(
            "The request file is not valid: {}\nCheck the field names and value spellings.",
            e
        ),
        ConfigError::Range(e) => format!(
            "Invalid seed range: {}\nSeeds are hexadecimal; leave a bound empty for the full range.",
            e
        ),
    }
}

fn scheduler_config(file: &SearchConfigFile, args: &Args) -> SearchConfig {
    let mut config = SearchConfig::default();
    if let Some(batch_size) = args.batch_size.or(file.batch_size) {
        config.batch_size = batch_size;
    }
    config.threads = args.threads.or(file.threads);
    config
}

fn print_result(result: &SeedResult<'_>) {
    let c = &result.candidate;
    let ivs = c
        .ivs
        .iter()
        .map(|iv| format!("{:2}", iv))
        .collect::<Vec<_>>()
        .join("/");
    let nature = c.nature.to_string();
    let gmax = if result.template.can_gigantamax { "G-Max" } else { "-" };

    println!(
        "  {:016X} {:1} {}  {:<8} {:1}  {:?}({})  form {}  {:<5}  EC {:08X}  PID {:08X}  {}",
        result.seed,
        c.shininess.mark(),
        ivs,
        nature,
        c.gender,
        c.ability_slot,
        c.ability,
        c.form,
        gmax,
        c.encryption_constant,
        c.pid,
        result.template.kind
    );
}

fn main() {
    env_logger::init();
    let args = parse_args();

    let file = match load_search_config(&args.request) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {}", format_config_error(&e));
            std::process::exit(1);
        }
    };
    let range = match file.seed_range() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", format_config_error(&ConfigError::Range(e)));
            std::process::exit(1);
        }
    };

    let lookup = file.personal_table();
    let config = scheduler_config(&file, &args);
    let context = SearchContext::new(file.trainer, &lookup);

    println!(
        "Searching seeds {:#X}..={:#X} for {} encounter(s)...",
        range.start,
        range.end,
        file.encounters.len()
    );
    let start = Instant::now();

    let progress_callback = |progress: &Progress| {
        print!(
            "\r[Search] Progress: {:.2}% ({}/{}) matches: {}",
            progress.percent(),
            progress.seeds_checked,
            progress.total,
            progress.matches
        );
        let _ = io::stdout().flush();
    };

    let mut session = SearchSession::new(
        range,
        &file.encounters,
        file.criteria.clone(),
        file.max_results,
        context,
    )
    .with_config(config);
    let result = session.run(progress_callback);
    println!();

    let outcome = match result {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    if outcome.matches.is_empty() {
        println!("No matching seed found.");
    } else {
        println!("Found {} seed(s):", outcome.matches.len());
        for result in &outcome.matches {
            print_result(result);
        }
    }

    if file.max_results > 0 && outcome.matches.len() >= file.max_results as usize {
        println!("Stopped at the result cap of {}.", file.max_results);
    }

    println!(
        "Checked {} seeds in {:.2} seconds.",
        outcome.seeds_checked,
        elapsed.as_secs_f64()
    );
}
