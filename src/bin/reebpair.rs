use std::{env, process};

use reebpair::batch::{BatchOutcome, CommandLineConfig, compare_dumps, run_batch};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{}", CommandLineConfig::help());
        return;
    }
    let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let config = match CommandLineConfig::from_args(&arg_refs) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(2);
        }
    };

    if let Some((base, other)) = &config.compare {
        process::exit(run_compare(&config, base, other));
    }

    if config.inputs.is_empty() {
        println!("{}", CommandLineConfig::banner());
        return;
    }

    let summary = run_batch(&config.inputs, config.format, |outcome| {
        print_outcome(outcome, config.verbose)
    });
    process::exit(summary.exit_code(config.legacy_exit));
}

fn print_outcome(outcome: &BatchOutcome, verbose: bool) {
    println!("{}", outcome.input);
    match &outcome.result {
        Ok(report) => {
            if verbose {
                eprintln!(" Load time: {:.3}ms", report.timing.load_ms);
                eprintln!(" Connected components: {}", report.components);
                eprintln!(" Total Loops: {}", report.loops);
            }
            print!("{}", report.output);
        }
        Err(err) => eprintln!("error: {}: {err}", outcome.input),
    }
    println!();
}

fn run_compare(config: &CommandLineConfig, base: &str, other: &str) -> i32 {
    let report = match compare_dumps(base, other, &config.comparison) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("error: {err}");
            return 1;
        }
    };
    if config.verbose {
        for mismatch in &report.comparison.mismatches {
            eprintln!("  {mismatch}");
        }
    }
    let consistent = report.is_consistent();
    match serde_json::to_string(&report) {
        Ok(payload) => println!("{payload}"),
        Err(err) => {
            eprintln!("error: {err}");
            return 1;
        }
    }
    if consistent { 0 } else { 1 }
}
