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

//! Implements the client configuration file.

use std::fmt::{self, Write};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::Level::Debug;
use log::{debug, log_enabled};
use serde::{de, Deserialize};

use clientele::{Client, Identifier};

////////////////////////////////////////////////////////////////////////
// CONFIGURATION LOADING                                              //
////////////////////////////////////////////////////////////////////////

/// Loads the client configuration from the file given by `path`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let raw_config = fs::read(path.as_ref()).context("failed to read the configuration file")?;
    let config: Config =
        toml::from_slice(&raw_config).context("failed to parse the configuration file")?;
    log_config_summary(&config);
    Ok(config)
}

/// Summarizes the configuration in the log, if the debug log level is
/// enabled.
fn log_config_summary(config: &Config) {
    if !log_enabled!(Debug) {
        // Don't compute the message if it will never be printed.
        return;
    }

    let mut message = String::from("Configuration loaded:\nClients: ");
    if config.clients.is_empty() {
        message.push_str("none");
    } else {
        write!(message, "{}", config.clients.len()).unwrap();
        for client_config in &config.clients {
            write!(
                message,
                "\n  {} ({} identifiers)",
                client_config.name,
                client_config.ids.len(),
            )
            .unwrap();
        }
    }
    debug!("{}", message);
}

////////////////////////////////////////////////////////////////////////
// CONFIGURATION FILE STRUCTURE                                       //
////////////////////////////////////////////////////////////////////////

/// The complete configuration file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub clients: Vec<ClientConfig>,
}

/// The configuration of a single persistent client.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub name: String,
    #[serde(default)]
    pub ids: Vec<ConfigIdentifier>,
}

impl ClientConfig {
    /// Builds a [`Client`] record, with a new UID, from this
    /// configuration.
    pub fn to_client(&self) -> Client {
        let mut client = Client::new(self.name.as_str());
        for id in &self.ids {
            client.add_identifier(id.0.clone());
        }
        client
    }
}

////////////////////////////////////////////////////////////////////////
// IDENTIFIERS                                                        //
////////////////////////////////////////////////////////////////////////

/// A client identifier as written in the configuration file. The text
/// is classified with [`Identifier`]'s [`FromStr`](std::str::FromStr)
/// implementation.
#[derive(Clone, Debug)]
pub struct ConfigIdentifier(pub Identifier);

impl<'de> Deserialize<'de> for ConfigIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_str(IdentifierVisitor)
    }
}

/// Parses a [`ConfigIdentifier`] from a string.
struct IdentifierVisitor;

impl<'de> de::Visitor<'de> for IdentifierVisitor {
    type Value = ConfigIdentifier;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a client ID, IP address, CIDR subnet, or MAC address")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        value
            .parse()
            .map(ConfigIdentifier)
            .map_err(|e| E::custom(format!("invalid identifier {:?}: {}", value, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clients_are_built_from_identifiers() {
        let config: Config = toml::from_str(
            r#"
            [[clients]]
            name = "laptop"
            ids = ["192.168.1.10", "10.0.0.0/8", "aa:bb:cc:dd:ee:ff", "laptop"]

            [[clients]]
            name = "printer"
            "#,
        )
        .unwrap();

        assert_eq!(config.clients.len(), 2);
        let laptop = config.clients[0].to_client();
        assert_eq!(laptop.name, "laptop");
        assert_eq!(laptop.ips.len(), 1);
        assert_eq!(laptop.subnets.len(), 1);
        assert_eq!(laptop.macs.len(), 1);
        assert_eq!(laptop.client_ids, ["laptop"]);
        assert_eq!(config.clients[1].to_client().identifiers().count(), 0);
    }

    #[test]
    fn invalid_identifiers_are_rejected() {
        let result = toml::from_str::<Config>(
            r#"
            [[clients]]
            name = "laptop"
            ids = ["Not A Client ID"]
            "#,
        );
        let message = result.unwrap_err().to_string();
        assert!(message.contains("Not A Client ID"), "{}", message);

        let result = toml::from_str::<Config>(
            r#"
            [[clients]]
            name = "laptop"
            ids = [42]
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = toml::from_str::<Config>(
            r#"
            [[clients]]
            name = "laptop"
            tags = ["device_pc"]
            "#,
        );
        assert!(result.is_err());
    }
}
