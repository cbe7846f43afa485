use blocklang::{repl, runner, Config, Header, SourceFile};
use clap::{Arg, Command};
use std::path::Path;

fn main() {
    init_tracing();

    let matches = Command::new("blocklang")
        .about("Runs start … end programs of print/return/if/var/set statements")
        .arg(
            Arg::new("file")
                .help("The source file to execute")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Trace each statement as it runs")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-header")
                .long("no-header")
                .help("The file has no leading program count line")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive REPL mode")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let config = Config {
        verbose: matches.get_flag("verbose"),
    };
    let header = if matches.get_flag("no-header") {
        Header::None
    } else {
        Header::Count
    };

    match matches.get_one::<String>("file") {
        Some(file_path) if !matches.get_flag("interactive") => {
            run_file(file_path, header, config)
        }
        _ => repl::start(config),
    }
}

/// Enable with `RUST_LOG=blocklang=debug` or `RUST_LOG=blocklang=trace`.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run_file(path: &str, header: Header, config: Config) {
    let path = Path::new(path);

    let file = match SourceFile::read(path, header) {
        Ok(file) => file,
        Err(error) => {
            eprintln!("Error: {}", error);
            std::process::exit(1);
        }
    };

    let filename = path.display().to_string();
    let Some(summary) = runner::run(&file.body, Some(&filename), config) else {
        std::process::exit(1);
    };

    if let Some(declared) = file.declared_programs {
        if declared != summary.programs() {
            tracing::warn!(
                declared,
                ran = summary.programs(),
                "program count line does not match the programs found"
            );
        }
    }
    tracing::debug!(
        programs = summary.programs(),
        aborted = summary.aborted(),
        "run finished"
    );
}
