//! isolab - demo driver for the isolation-anomaly sandbox.
//!
//! Runs one (or all four) of the canonical scenarios against a fresh
//! account and prints a JSON summary of what each worker observed and what
//! the balance ended up as.

use std::process::ExitCode;
use std::time::Duration;

use isolab::bank::{Bank, BankConfig};
use isolab::harness::{HarnessConfig, Scenario};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    // Parse simple command line args.
    let mut balance: i64 = 100;
    let mut scenario: Option<Scenario> = None;
    let mut delay_ms: u64 = 1000;
    let mut stagger_ms: u64 = 100;
    let mut timeout_ms: u64 = 10_000;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-b" | "--balance" => {
                i += 1;
                if i < args.len() {
                    match args[i].parse() {
                        Ok(v) => balance = v,
                        Err(_) => {
                            eprintln!("Invalid balance: {}", args[i]);
                            return ExitCode::FAILURE;
                        }
                    }
                }
            }
            "-s" | "--scenario" => {
                i += 1;
                if i < args.len() {
                    match args[i].parse() {
                        Ok(s) => scenario = Some(s),
                        Err(e) => {
                            eprintln!("{}", e);
                            return ExitCode::FAILURE;
                        }
                    }
                }
            }
            "--delay-ms" => {
                i += 1;
                if i < args.len() {
                    delay_ms = args[i].parse().unwrap_or(delay_ms);
                }
            }
            "--stagger-ms" => {
                i += 1;
                if i < args.len() {
                    stagger_ms = args[i].parse().unwrap_or(stagger_ms);
                }
            }
            "--timeout-ms" => {
                i += 1;
                if i < args.len() {
                    timeout_ms = args[i].parse().unwrap_or(timeout_ms);
                }
            }
            "-v" | "--verbose" => {
                verbose = true;
            }
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "--version" => {
                println!("isolab v{}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            arg => {
                eprintln!("Unknown option: {}", arg);
                return ExitCode::FAILURE;
            }
        }
        i += 1;
    }

    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();

    let config = BankConfig::new().initial_balance(balance).harness(
        HarnessConfig::new()
            .commit_delay(Duration::from_millis(delay_ms))
            .stagger(Duration::from_millis(stagger_ms))
            .join_timeout(Duration::from_millis(timeout_ms)),
    );
    let bank = Bank::new(config);

    let scenarios: Vec<Scenario> = match scenario {
        Some(s) => vec![s],
        None => Scenario::ALL.to_vec(),
    };

    let mut failed = false;
    for scenario in scenarios {
        match run_one(&bank, scenario) {
            Ok(summary) => println!("{}", summary),
            Err(e) => {
                eprintln!("Error running {}: {}", scenario, e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run_one(bank: &Bank, scenario: Scenario) -> Result<String, isolab::bank::BankError> {
    let account = bank.open_account();
    let initial = bank.balance(&account)?;

    let outcomes = bank.run_scenario_report(&account, scenario)?;
    let final_balance = bank.balance(&account)?;

    let operations: Vec<serde_json::Value> = outcomes
        .iter()
        .map(|slot| match slot {
            Ok(outcome) => serde_json::json!(outcome),
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        })
        .collect();

    let summary = serde_json::json!({
        "scenario": scenario.to_string(),
        "isolation": scenario.isolation().to_string(),
        "account": account,
        "initial_balance": initial,
        "final_balance": final_balance,
        "operations": operations,
    });

    // Pretty-printing a Value cannot fail; fall back to compact output anyway.
    Ok(serde_json::to_string_pretty(&summary).unwrap_or_else(|_| summary.to_string()))
}

fn print_help() {
    println!("isolab - transaction isolation anomaly demo");
    println!();
    println!("USAGE:");
    println!("    isolab [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -b, --balance <N>       Starting balance (default: 100)");
    println!("    -s, --scenario <ROUTE>  Run one scenario instead of all four:");
    println!("                            read-uncommitted/common");
    println!("                            read-uncommitted/dirty-read");
    println!("                            read-committed/common");
    println!("                            read-committed/dirty-read");
    println!("        --delay-ms <N>      Write-to-commit delay (default: 1000)");
    println!("        --stagger-ms <N>    Stagger before the second op (default: 100)");
    println!("        --timeout-ms <N>    Bounded join timeout (default: 10000)");
    println!("    -v, --verbose           Debug-level logging");
    println!("    -h, --help              Show this help");
    println!("        --version           Show version");
}
