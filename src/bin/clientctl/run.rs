// Copyright 2023 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implements the `check` and `resolve` commands.

use std::fmt::Write;
use std::path::Path;
use std::process;

use anyhow::{anyhow, Context, Result};
use env_logger::Env;
use log::{error, info};

use clientele::Registry;

use crate::args::{CheckArgs, Command, ResolveArgs};
use crate::config;

/// Runs the requested command.
pub fn run(args: crate::args::Args) {
    env_logger::init_from_env(Env::new().default_filter_or("warn"));

    let result = match args.command {
        Command::Check(args) => check(args),
        Command::Resolve(args) => resolve(args),
    };
    if let Err(e) = result {
        let mut message = String::from("Failed to run:");
        for (i, cause) in e.chain().enumerate() {
            write!(message, "\n[{}] {}", i + 1, cause).unwrap();
        }
        message.push_str("\nExiting with failure.");
        error!("{}", message);
        process::exit(1);
    }
}

fn check(args: CheckArgs) -> Result<()> {
    let registry = load_registry(&args.config)?;
    println!(
        "{} clients loaded from {}; no identifier is shared.",
        registry.len(),
        args.config.display(),
    );
    Ok(())
}

fn resolve(args: ResolveArgs) -> Result<()> {
    let registry = load_registry(&args.config)?;
    for id in &args.ids {
        match registry.find(id) {
            Some(client) => println!("{}\t{}\t{}", id, client.name, client.uid),
            None => println!("{}\t(no client)", id),
        }
    }
    Ok(())
}

/// Loads the configuration at `path` into a new [`Registry`]. Every
/// client is tried, so that all clashes are reported at once.
fn load_registry(path: &Path) -> Result<Registry> {
    info!("Loading the configuration from {}.", path.display());
    let config = config::load_from_path(path).context("failed to load the configuration")?;

    let registry = Registry::new();
    let mut clients_failed = 0;
    for client_config in &config.clients {
        // The registry logs the reason for each refusal.
        if registry.add(client_config.to_client()).is_err() {
            clients_failed += 1;
        }
    }

    match clients_failed {
        0 => Ok(registry),
        1 => Err(anyhow!("1 client failed to load")),
        n => Err(anyhow!("{} clients failed to load", n)),
    }
}
