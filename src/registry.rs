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

//! The [`Registry`] of persistent clients.

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use std::sync::{Arc, RwLock};

use log::{debug, warn};

use crate::client::{Client, Uid};
use crate::index::{Clash, ClientIndex};
use crate::mac::{HardwareAddr, MacKey};

/// A thread-safe collection of persistent clients.
///
/// A `Registry` owns a [`ClientIndex`] and a table of client names,
/// guarded together by a single [`RwLock`]. Lookups share the lock;
/// changes take it exclusively, so readers never see a client that is
/// only partly added. Every change is checked before it is applied:
/// client names must be unique, and no identifier may belong to two
/// clients (see [`ClientIndex::clashes`]).
pub struct Registry {
    inner: RwLock<Inner>,
}

/// The lock-protected state of a [`Registry`].
#[derive(Default)]
struct Inner {
    index: ClientIndex,
    names: BTreeMap<String, Uid>,
}

impl Inner {
    /// Checks that `client` can be stored, ignoring the client with the
    /// UID `replacing` (if any), and then stores it.
    fn insert(
        &mut self,
        client: Client,
        replacing: Option<Uid>,
    ) -> Result<Arc<Client>, Error> {
        match self.names.get(&client.name) {
            Some(uid) if Some(*uid) != replacing => {
                return Err(Error::DuplicateName(client.name));
            }
            _ => (),
        }
        if let Some(mac) = client
            .macs
            .iter()
            .find(|mac| MacKey::try_normalize(mac.octets()).is_none())
        {
            return Err(Error::InvalidMac(mac.clone()));
        }
        self.index.clashes(&client)?;

        if let Some(uid) = replacing {
            if let Some(previous) = self.index.find_by_uid(uid).cloned() {
                self.index.delete(&previous);
                self.names.remove(&previous.name);
            }
        }

        let client = Arc::new(client);
        self.names.insert(client.name.clone(), client.uid);
        self.index.add(client.clone());
        Ok(client)
    }
}

impl Registry {
    /// Creates a new, initially empty `Registry`.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Adds a new client.
    ///
    /// Fails if another client already has the same name or shares one
    /// of its identifiers. The registry is unchanged on failure.
    pub fn add(&self, client: Client) -> Result<Arc<Client>, Error> {
        let name = client.name.clone();
        let result = self.inner.write().unwrap().insert(client, None);
        match result {
            Ok(ref client) => debug!("Added client {} ({}).", client.name, client.uid),
            Err(ref e) => warn!("Refused to add client {}: {}.", name, e),
        }
        result
    }

    /// Replaces the client named `name` with `client`, which takes over
    /// the old client's [`Uid`]. The new record may be renamed and may
    /// keep any of the old record's identifiers.
    ///
    /// Fails if there is no client named `name`, if the new name
    /// belongs to another client, or if another client shares one of
    /// the new record's identifiers. The registry is unchanged on
    /// failure.
    pub fn update(&self, name: &str, mut client: Client) -> Result<Arc<Client>, Error> {
        let mut inner = self.inner.write().unwrap();
        let uid = match inner.names.get(name) {
            Some(uid) => *uid,
            None => return Err(Error::NotFound(name.to_owned())),
        };

        client.uid = uid;
        let new_name = client.name.clone();
        match inner.insert(client, Some(uid)) {
            Ok(client) => {
                debug!("Updated client {} (now {}, {}).", name, client.name, uid);
                Ok(client)
            }
            Err(e) => {
                warn!("Refused to update client {} as {}: {}.", name, new_name, e);
                Err(e)
            }
        }
    }

    /// Removes the client named `name`, returning it, or [`None`] if
    /// there is no such client.
    pub fn remove(&self, name: &str) -> Option<Arc<Client>> {
        let mut inner = self.inner.write().unwrap();
        let uid = inner.names.remove(name)?;
        let client = inner.index.find_by_uid(uid).cloned()?;
        inner.index.delete(&client);
        debug!("Removed client {} ({}).", name, uid);
        Some(client)
    }

    /// Returns the client named `name`.
    pub fn get(&self, name: &str) -> Option<Arc<Client>> {
        let inner = self.inner.read().unwrap();
        let uid = inner.names.get(name)?;
        inner.index.find_by_uid(*uid).cloned()
    }

    /// Finds a client by the textual form of one of its identifiers.
    /// See [`ClientIndex::find`].
    pub fn find(&self, id: &str) -> Option<Arc<Client>> {
        self.inner.read().unwrap().index.find(id).cloned()
    }

    /// Finds a client by IP address. See [`ClientIndex::find_by_ip`].
    pub fn find_by_ip(&self, ip: IpAddr) -> Option<Arc<Client>> {
        self.inner.read().unwrap().index.find_by_ip(ip).cloned()
    }

    /// Finds a client by hardware address. See
    /// [`ClientIndex::find_by_mac`].
    pub fn find_by_mac(&self, mac: &HardwareAddr) -> Option<Arc<Client>> {
        self.inner.read().unwrap().index.find_by_mac(mac).cloned()
    }

    /// Returns the names of all clients, sorted.
    pub fn names(&self) -> Vec<String> {
        self.inner.read().unwrap().names.keys().cloned().collect()
    }

    /// Returns the number of clients.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().names.len()
    }

    /// Returns whether there are no clients.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// Errors that arise when changing a [`Registry`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// Another client already has this name.
    DuplicateName(String),

    /// There is no client with this name.
    NotFound(String),

    /// Another client already uses one of the client's identifiers.
    Clash(Clash),

    /// One of the client's hardware addresses is not 6, 8, or 20
    /// octets long.
    InvalidMac(HardwareAddr),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::DuplicateName(name) => write!(f, "client \"{}\" already exists", name),
            Self::NotFound(name) => write!(f, "client \"{}\" not found", name),
            Self::Clash(clash) => write!(f, "{}", clash),
            Self::InvalidMac(mac) => write!(
                f,
                "hardware address {} is {} octets long, not 6, 8, or 20",
                mac,
                mac.len(),
            ),
        }
    }
}

impl From<Clash> for Error {
    fn from(clash: Clash) -> Self {
        Self::Clash(clash)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Clash(clash) => Some(clash),
            _ => None,
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
