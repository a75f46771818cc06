//! # flagoverlay demo application
//!
//! A tiny "server" whose settings start from compiled-in values and are then
//! overlaid with whatever flags the user passed. This is **not** a real app;
//! it exists to demonstrate and manually verify the overlay behavior.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example flagset_demo
//! cargo run --example flagset_demo -- --feature-gates=Beta=true --v=2
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                      | How to exercise it                                              |
//! |------------------------------|-----------------------------------------------------------------|
//! | Untouched state              | run with no flags                                               |
//! | Scalar overlay               | `-- --v=-1`                                                     |
//! | Map merge                    | `-- --feature-gates=Beta=true`                                  |
//! | Repeated map occurrences     | `-- --feature-gates=Beta=true --feature-gates=Alpha=false`      |
//! | Single-pair map values       | `-- --label=team=a,b --label=tier=gold`                         |
//! | Conditional apply            | `-- --label=x=y` prints the "labels changed" line               |
//! | Parse errors                 | `-- --feature-gates=Beta=maybe`                                 |
//! | Debug logging                | `RUST_LOG=debug cargo run --example flagset_demo -- --v=1`      |

use std::collections::HashMap;
use std::net::IpAddr;
use std::process::ExitCode;

use flagoverlay::{FlagError, FlagSet, MapOptions};

#[derive(Debug)]
struct ServerConfig {
    verbosity: i8,
    bind_address: IpAddr,
    feature_gates: HashMap<String, bool>,
    labels: HashMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            bind_address: IpAddr::from([0, 0, 0, 0]),
            feature_gates: [("Alpha".to_string(), true), ("Beta".to_string(), false)].into(),
            labels: HashMap::new(),
        }
    }
}

fn run(config: &mut ServerConfig) -> Result<(), FlagError> {
    let mut fs = FlagSet::new("flagset-demo");
    let verbosity = fs.int8_var("v", config.verbosity, "Log level");
    let bind = fs.ip_var("bind-address", config.bind_address, "Address to listen on");
    let gates = fs.map_string_bool_var(
        "feature-gates",
        Some(&config.feature_gates),
        "A set of key=value pairs that toggle features",
        MapOptions::default(),
    );
    let labels = fs.map_string_string_var(
        "label",
        Some(&config.labels),
        "One key=value label per occurrence",
        MapOptions::single_pair(),
    );

    fs.parse(std::env::args().skip(1))?;

    fs.scalar(&verbosity)?.set(&mut config.verbosity);
    fs.scalar(&bind)?.set(&mut config.bind_address);
    fs.map(&gates)?.merge(&mut config.feature_gates);
    fs.map(&labels)?.apply(|labels| {
        println!("labels changed: {} entries", labels.len());
        config.labels = labels;
    });
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let mut config = ServerConfig::default();
    if let Err(e) = run(&mut config) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    println!("verbosity     = {}", config.verbosity);
    println!("bind_address  = {}", config.bind_address);
    let mut gates: Vec<_> = config.feature_gates.iter().collect();
    gates.sort();
    for (name, enabled) in gates {
        println!("feature_gate  {name} = {enabled}");
    }
    let mut labels: Vec<_> = config.labels.iter().collect();
    labels.sort();
    for (key, value) in labels {
        println!("label         {key} = {value}");
    }
    ExitCode::SUCCESS
}
