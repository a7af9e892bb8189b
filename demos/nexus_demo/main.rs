//! # cfgnexus demo application
//!
//! A small CLI that declares a handful of settings, feeds them from flags, a
//! config file and the environment, and prints where every value came from.
//! It exists to demonstrate and manually verify the adapters.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example nexus_demo
//! cargo run --example nexus_demo -- --help
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature              | How to exercise it                                                   |
//! |----------------------|----------------------------------------------------------------------|
//! | Compiled defaults    | `cargo run --example nexus_demo`                                     |
//! | Config file          | `cargo run --example nexus_demo -- --conf demo.toml`                 |
//! | Env var              | `NEXUS_DEMO_PORT=9999 cargo run --example nexus_demo`                |
//! | Flag beats env       | `NEXUS_DEMO_PORT=1 cargo run --example nexus_demo -- --port 2`       |
//! | Boolean flag         | `cargo run --example nexus_demo -- --verbose`                        |
//! | JSON listing         | `cargo run --example nexus_demo -- --json`                           |
//! | Single key           | `cargo run --example nexus_demo -- --get server.port`                |
//! | Logging              | `RUST_LOG=cfgnexus=debug cargo run --example nexus_demo`             |

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Arg, ArgAction, Command};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cfgnexus::{
    ApplyReport, FieldSpec, FileSource, FlagAdapter, Leaf, NexusError, StructSpec, adapt_env,
    conf_flag, default_registry, get_value, list_values,
};

fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();
}

fn declare() -> Result<(), NexusError> {
    let registry = default_registry();

    StructSpec::new("server")
        .field(
            FieldSpec::of::<String>("Host")
                .default("127.0.0.1")
                .usage("Address to bind")
                .env("NEXUS_DEMO_HOST"),
        )
        .field(
            FieldSpec::of::<i64>("Port")
                .default("8080")
                .usage("Port to listen on")
                .env("NEXUS_DEMO_PORT"),
        )
        .register(registry)?;

    Leaf::<bool>::builder("verbose")
        .usage("Print every source's report")
        .env("NEXUS_DEMO_VERBOSE")
        .register(registry);
    conf_flag(registry);
    Ok(())
}

fn report(source: &str, report: &ApplyReport, verbose: bool) {
    for e in &report.failures {
        eprintln!("{source}: {e}");
    }
    if verbose {
        eprintln!(
            "{source}: accepted {:?}, rejected {:?}",
            report.accepted, report.rejected
        );
    }
}

fn run() -> Result<(), NexusError> {
    declare()?;
    let registry = default_registry();

    let mut flags = FlagAdapter::new();
    flags.adapt(registry);
    let cmd = Command::new("nexus-demo")
        .about("cfgnexus demo: layered configuration from flags, file and environment")
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the listing as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("get")
                .long("get")
                .value_name("KEY")
                .help("Print a single dotted key"),
        );
    let matches = flags.augment(cmd).get_matches();

    // Flags first: the file path itself may come from --conf.
    let from_flags = flags.apply_matches(&matches);

    let conf = get_value(registry, cfgnexus::CONF_FLAG)?;
    let explicit = conf
        .value
        .as_str()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);
    let loaded = FileSource::new("nexus-demo")
        .explicit_path(explicit)
        .load(registry)?;

    let from_env = adapt_env(registry);

    let verbose = get_value(registry, "verbose")?.value.as_bool() == Some(true);
    report("flags", &from_flags, verbose);
    if let Some(loaded) = &loaded {
        if verbose {
            eprintln!("file: {}", loaded.path.display());
        }
        report("file", &loaded.report, verbose);
    }
    report("env", &from_env, verbose);

    if let Some(key) = matches.get_one::<String>("get") {
        println!("{}", get_value(registry, key)?);
        return Ok(());
    }

    let listing = list_values(registry);
    if matches.get_flag("json") {
        match listing.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("json: {e}"),
        }
    } else {
        println!("{listing}");
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
