use clap::Parser;
use mediainfo_core::{MediaInfoError, ParseOptions};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

mod cli;

use cli::CliArgs;

fn main() {
    let args = CliArgs::parse();

    let log_level = if args.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).with_writer(std::io::stderr).with_ansi(true).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let options = ParseOptions { parse_speed: args.parse_speed, dvd_parsing: args.dvd_parsing, dvd_extras: args.dvd_extras };

    let report = match mediainfo_core::parse_file(&args.input, &options) {
        Ok(report) => report,
        Err(err) => {
            error!(error = ?err, path = %args.input.display(), "parse failed");
            eprintln!("mediainfo: {err}");
            std::process::exit(exit_code_for(&err));
        }
    };

    let result = if args.pretty { serde_json::to_writer_pretty(std::io::stdout(), &report) } else { serde_json::to_writer(std::io::stdout(), &report) };

    if let Err(err) = result {
        eprintln!("mediainfo: failed to write JSON report: {err}");
        std::process::exit(1);
    }
    println!();
}

fn exit_code_for(err: &MediaInfoError) -> i32 {
    match err {
        MediaInfoError::IoError(_) => 2,
        _ => 1,
    }
}
