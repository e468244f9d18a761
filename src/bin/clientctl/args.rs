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

//! Implements command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Parses the command line arguments.
pub fn parse() -> Args {
    Args::parse()
}

/// Checks persistent client configurations and resolves identifiers
#[derive(Debug, Parser)]
#[clap(author, version)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the clients and report any clashing identifiers
    Check(CheckArgs),

    /// Resolve client IDs, IP addresses, or MAC addresses to clients
    Resolve(ResolveArgs),
}

#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// Set the configuration file to use
    #[clap(long, value_name = "FILE")]
    pub config: PathBuf,
}

#[derive(Debug, Parser)]
pub struct ResolveArgs {
    /// Set the configuration file to use
    #[clap(long, value_name = "FILE")]
    pub config: PathBuf,

    /// The identifiers to resolve
    #[clap(required = true, value_name = "ID")]
    pub ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_takes_several_identifiers() {
        let args = Args::try_parse_from([
            "clientctl",
            "resolve",
            "--config",
            "clients.toml",
            "1.1.1.1",
            "laptop",
        ])
        .unwrap();
        match args.command {
            Command::Resolve(resolve) => {
                assert_eq!(resolve.config, PathBuf::from("clients.toml"));
                assert_eq!(resolve.ids, ["1.1.1.1", "laptop"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn resolve_requires_an_identifier() {
        assert!(Args::try_parse_from(["clientctl", "resolve", "--config", "c.toml"]).is_err());
    }
}
