use clap::Parser;
use dlhook::{HookError, LogSink};
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;

dlhook::export_hook!();

/// Load a unit shared library and call its `run` entry point
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// path of the unit library to load
    #[arg(short, long)]
    file: String,

    /// number of times to call `run` after loading
    #[arg(short, long, default_value_t = 1)]
    runs: u32,

    /// load without inspecting the ELF image first
    #[arg(long)]
    skip_verify: bool,

    /// send unit messages to the log instead of stdout
    #[arg(long)]
    log_messages: bool,

    /// enable debug logs
    #[arg(short, long)]
    debug: bool,
}

fn print_message(message: &str) -> Result<(), HookError> {
    println!("hook(\"{}\")", message);
    Ok(())
}

fn main() {
    let args = Args::parse();

    let level = if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("cannot install logger: {}", e);
    }

    // keep the exported hook in the final link
    std::hint::black_box(hook as dlhook::abi::HookFn);

    let mut host = dlhook::Host::new();

    match host.set_file_path(&args.file) {
        Ok(_) => {}
        Err(e) => {
            error!("Error setting file path: {}", e);
            std::process::exit(1);
        }
    }

    if args.skip_verify {
        host.skip_verification();
    }

    let loaded = if args.log_messages {
        host.load(LogSink)
    } else {
        host.load(print_message)
    };

    let unit = match loaded {
        Ok(unit) => unit,
        Err(e) => {
            error!("Error loading unit: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(mapping) = unit.mapping() {
        info!("unit mapped at 0x{:x}", mapping.base);
    }

    for i in 0..args.runs {
        if let Err(e) = unit.run() {
            error!("Error in run #{}: {}", i + 1, e);
            std::process::exit(1);
        }
    }

    info!("Done");
}
