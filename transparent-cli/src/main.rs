mod args;
mod view;

use std::fs::File;

use transparent_net::{Config, RequestDispatcher};

fn init_logging(verbose: bool) {
    use simplelog::{LevelFilter, WriteLogger};

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let log_path = dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("transparent")
        .join("transparent.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(_) => match File::create(std::env::temp_dir().join("transparent.log")) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Cannot create log file: {}", e);
                return;
            }
        },
    };

    if WriteLogger::init(log_level, simplelog::Config::default(), log_file).is_err() {
        eprintln!("Logger already initialized");
        return;
    }

    log::info!("transparent starting (log level: {:?})", log_level);
}

fn main() {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = match args::parse(&raw) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{}\n{}", e, args::USAGE);
            std::process::exit(2);
        }
    };
    init_logging(args.verbose);

    let Some(action) = args.action else {
        eprintln!("{}", args::USAGE);
        std::process::exit(2);
    };

    let mut config = match &args.config {
        Some(path) => match Config::load_from(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Could not load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Config::load(),
    };
    if let Some(page) = &args.page {
        config.set_page_url(page);
    }

    let cookies = args
        .cookie
        .or_else(|| std::env::var("TRANSPARENT_COOKIE").ok())
        .unwrap_or_default();

    let mut dispatcher = match RequestDispatcher::from_config(&config, &cookies) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Could not start: {}", e);
            std::process::exit(1);
        }
    };

    let code = view::run(&mut dispatcher, action, view::settle_timeout(&config));
    std::process::exit(code);
}
