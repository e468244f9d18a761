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

//! The [`ClientIndex`], which resolves request identifiers to client
//! records.
//!
//! A [`Client`] may be known by any number of client IDs, IP addresses,
//! subnets, and hardware addresses. The index keeps one lookup table
//! per kind of identifier, each mapping an identifier to the [`Uid`] of
//! the client that owns it, plus a primary table mapping each [`Uid`]
//! to its record. Client IDs, IP addresses, and hardware addresses are
//! looked up by exact match. Subnets are kept in an [`OrderedMap`] and
//! are searched for one that *contains* an address.
//!
//! ## Uniqueness of identifiers
//!
//! No identifier may belong to two different clients. The index does
//! not enforce this by itself: [`ClientIndex::add`] overwrites whatever
//! is already associated with an identifier. Instead, callers must
//! first check a client with [`ClientIndex::clashes`], which reports
//! any identifier already owned by a *different* client. A client's
//! own identifiers never clash, so unchanged identifiers can be checked
//! again when the client is updated.
//!
//! ## Consistency
//!
//! Adding and deleting a client touch several tables, and nothing
//! makes the change atomic. Callers must serialize all access to an
//! index that may be mutated (the [`Registry`](crate::registry::Registry)
//! does this with a lock), and must validate every identifier before
//! calling [`ClientIndex::add`]: a hardware address of an unsupported
//! width panics partway through.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use ipnet::IpNet;

use crate::client::{Client, Identifier, Uid};
use crate::collections::OrderedMap;
use crate::mac::{HardwareAddr, MacKey};

mod error;

pub use error::Clash;

/// The comparator type of the subnet table.
type SubnetCmp = fn(&IpNet, &IpNet) -> Ordering;

/// Stores all persistent clients and resolves identifiers to them.
#[derive(Debug)]
pub struct ClientIndex {
    client_id_to_uid: HashMap<String, Uid>,
    ip_to_uid: HashMap<IpAddr, Uid>,
    subnet_to_uid: OrderedMap<IpNet, Uid, SubnetCmp>,
    mac_to_uid: HashMap<MacKey, Uid>,
    uid_to_client: HashMap<Uid, Arc<Client>>,
}

impl ClientIndex {
    /// Creates a new, initially empty `ClientIndex`. Subnets are
    /// ordered by [`compare_subnets`].
    pub fn new() -> Self {
        Self {
            client_id_to_uid: HashMap::new(),
            ip_to_uid: HashMap::new(),
            subnet_to_uid: OrderedMap::new(compare_subnets as SubnetCmp),
            mac_to_uid: HashMap::new(),
            uid_to_client: HashMap::new(),
        }
    }

    /// Stores `client` in the index under its [`Uid`], associating each
    /// of its identifiers with it.
    ///
    /// Any identifier already associated with another client is
    /// silently taken over; use [`ClientIndex::clashes`] first to avoid
    /// this.
    ///
    /// # Panics
    ///
    /// Panics if one of the client's hardware addresses is not 6, 8,
    /// or 20 octets long. The index is left partially updated.
    pub fn add(&mut self, client: Arc<Client>) {
        let uid = client.uid;

        for id in &client.client_ids {
            self.client_id_to_uid.insert(id.clone(), uid);
        }

        for ip in &client.ips {
            self.ip_to_uid.insert(*ip, uid);
        }

        for subnet in &client.subnets {
            self.subnet_to_uid.set(*subnet, uid);
        }

        for mac in &client.macs {
            self.mac_to_uid.insert(mac.key(), uid);
        }

        self.uid_to_client.insert(uid, client);
    }

    /// Checks whether a client other than `client` (that is, one with a
    /// different [`Uid`]) already uses one of `client`'s identifiers.
    ///
    /// Client IDs are checked first, then IP addresses, subnets, and
    /// hardware addresses; the first clash found is returned. Subnets
    /// only clash when they are identical, so overlapping subnets are
    /// allowed.
    pub fn clashes(&self, client: &Client) -> Result<(), Clash> {
        for id in &client.client_ids {
            self.check_owner(client, self.client_id_to_uid.get(id), || {
                Identifier::ClientId(id.clone())
            })?;
        }

        for ip in &client.ips {
            self.check_owner(client, self.ip_to_uid.get(ip), || Identifier::Ip(*ip))?;
        }

        // The subnet comparator orders by every component of a subnet,
        // so a comparator match is an exact match.
        for subnet in &client.subnets {
            self.check_owner(client, self.subnet_to_uid.get(subnet), || {
                Identifier::Subnet(*subnet)
            })?;
        }

        for mac in &client.macs {
            self.check_owner(client, self.mac_to_uid.get(&mac.key()), || {
                Identifier::Mac(mac.clone())
            })?;
        }

        Ok(())
    }

    /// Returns a [`Clash`] if `owner` is the [`Uid`] of a client other
    /// than `client`.
    fn check_owner<F>(
        &self,
        client: &Client,
        owner: Option<&Uid>,
        identifier: F,
    ) -> Result<(), Clash>
    where
        F: FnOnce() -> Identifier,
    {
        match owner {
            Some(&uid) if uid != client.uid => {
                let name = self
                    .uid_to_client
                    .get(&uid)
                    .map_or_else(|| uid.to_string(), |other| other.name.clone());
                Err(Clash {
                    name,
                    uid,
                    identifier: identifier(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Finds a client by the textual form of one of its identifiers.
    ///
    /// `id` is first looked up as a client ID. Failing that, if `id` is
    /// an IP address, it is resolved with [`ClientIndex::find_by_ip`].
    /// Finally, if `id` is a hardware address, it is resolved with
    /// [`ClientIndex::find_by_mac`]. Since some hardware addresses can
    /// also be read as IPv6 addresses, a failed IP lookup falls through
    /// to the hardware address lookup.
    pub fn find(&self, id: &str) -> Option<&Arc<Client>> {
        if let Some(uid) = self.client_id_to_uid.get(id) {
            return self.uid_to_client.get(uid);
        }

        if let Ok(ip) = id.parse() {
            if let Some(client) = self.find_by_ip(ip) {
                return Some(client);
            }
        }

        let mac: HardwareAddr = id.parse().ok()?;
        self.find_by_mac(&mac)
    }

    /// Finds a client by IP address. An exact match is preferred;
    /// otherwise the subnets are searched in ascending order for one
    /// that contains `ip`, and the first such subnet wins. (This is
    /// *not* a longest-prefix match.)
    pub fn find_by_ip(&self, ip: IpAddr) -> Option<&Arc<Client>> {
        let uid = match self.ip_to_uid.get(&ip) {
            Some(uid) => uid,
            None => {
                self.subnet_to_uid
                    .iter()
                    .find(|(subnet, _)| subnet.contains(&ip))?
                    .1
            }
        };
        self.uid_to_client.get(uid)
    }

    /// Finds a client by hardware address.
    ///
    /// # Panics
    ///
    /// Panics if `mac` is not 6, 8, or 20 octets long.
    pub fn find_by_mac(&self, mac: &HardwareAddr) -> Option<&Arc<Client>> {
        let uid = self.mac_to_uid.get(&mac.key())?;
        self.uid_to_client.get(uid)
    }

    /// Finds a client by its [`Uid`].
    pub fn find_by_uid(&self, uid: Uid) -> Option<&Arc<Client>> {
        self.uid_to_client.get(&uid)
    }

    /// Removes `client` and all of its identifiers from the index,
    /// returning the stored record. Identifiers that are not in the
    /// index are skipped.
    ///
    /// Every identifier of `client` is removed, whichever client it is
    /// currently associated with.
    ///
    /// # Panics
    ///
    /// Panics if one of the client's hardware addresses is not 6, 8,
    /// or 20 octets long.
    pub fn delete(&mut self, client: &Client) -> Option<Arc<Client>> {
        for id in &client.client_ids {
            self.client_id_to_uid.remove(id);
        }

        for ip in &client.ips {
            self.ip_to_uid.remove(ip);
        }

        for subnet in &client.subnets {
            self.subnet_to_uid.delete(subnet);
        }

        for mac in &client.macs {
            self.mac_to_uid.remove(&mac.key());
        }

        self.uid_to_client.remove(&client.uid)
    }

    /// Returns an iterator over the stored clients, in no particular
    /// order.
    pub fn clients(&self) -> impl Iterator<Item = &Arc<Client>> {
        self.uid_to_client.values()
    }

    /// Returns the number of stored clients.
    pub fn len(&self) -> usize {
        self.uid_to_client.len()
    }

    /// Returns whether the index has no clients.
    pub fn is_empty(&self) -> bool {
        self.uid_to_client.is_empty()
    }
}

impl Default for ClientIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Orders subnets by network address, then by prefix length, then by
/// the address the subnet was written with. IPv4 subnets sort before
/// IPv6 subnets.
pub fn compare_subnets(a: &IpNet, b: &IpNet) -> Ordering {
    a.network()
        .cmp(&b.network())
        .then_with(|| a.prefix_len().cmp(&b.prefix_len()))
        .then_with(|| a.addr().cmp(&b.addr()))
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    const CLI_IP_NONE: &str = "1.2.3.4";
    const CLI_IP1: &str = "1.1.1.1";
    const CLI_IP2: &str = "2.2.2.2";
    const CLI_IPV6: &str = "1:2:3::4";
    const CLI_SUBNET: &str = "2.2.2.0/24";
    const CLI_SUBNET_IP: &str = "2.2.2.222";
    const CLI_ID: &str = "client-id";
    const CLI_MAC: &str = "11:11:11:11:11:11";

    fn new_client(name: &str, ids: &[&str]) -> Arc<Client> {
        Arc::new(Client::with_identifiers(name, ids).unwrap())
    }

    struct Fixture {
        index: ClientIndex,
        client1: Arc<Client>,
        client2: Arc<Client>,
        client_with_mac: Arc<Client>,
        client_with_id: Arc<Client>,
    }

    fn fixture() -> Fixture {
        let mut fixture = Fixture {
            index: ClientIndex::new(),
            client1: new_client("client1", &[CLI_IP1, CLI_IPV6]),
            client2: new_client("client2", &[CLI_IP2, CLI_SUBNET]),
            client_with_mac: new_client("client_with_mac", &[CLI_MAC]),
            client_with_id: new_client("client_with_id", &[CLI_ID]),
        };
        for client in [
            &fixture.client1,
            &fixture.client2,
            &fixture.client_with_mac,
            &fixture.client_with_id,
        ] {
            fixture.index.add(client.clone());
        }
        fixture
    }

    fn found_name<'a>(index: &'a ClientIndex, id: &str) -> Option<&'a str> {
        index.find(id).map(|c| c.name.as_str())
    }

    #[test]
    fn add_and_find_works() {
        let f = fixture();
        assert_eq!(f.index.len(), 4);
        assert_eq!(found_name(&f.index, CLI_IP1), Some("client1"));
        assert_eq!(found_name(&f.index, CLI_IPV6), Some("client1"));
        assert_eq!(found_name(&f.index, CLI_IP2), Some("client2"));
        assert_eq!(found_name(&f.index, CLI_SUBNET_IP), Some("client2"));
        assert_eq!(found_name(&f.index, CLI_MAC), Some("client_with_mac"));
        assert_eq!(found_name(&f.index, CLI_ID), Some("client_with_id"));
        assert_eq!(found_name(&f.index, CLI_IP_NONE), None);
    }

    #[test]
    fn find_returns_the_stored_record() {
        let f = fixture();
        let found = f.index.find(CLI_ID).unwrap();
        assert!(Arc::ptr_eq(found, &f.client_with_id));
        assert!(Arc::ptr_eq(
            f.index.find_by_uid(f.client1.uid).unwrap(),
            &f.client1
        ));
    }

    #[test]
    fn find_in_empty_index_finds_nothing() {
        let index = ClientIndex::new();
        assert!(index.is_empty());
        assert!(index.find(CLI_IP_NONE).is_none());
        assert!(index.find(CLI_MAC).is_none());
        assert!(index.find("no-such-client").is_none());
    }

    #[test]
    fn clashes_and_delete_work() {
        let mut f = fixture();
        assert_eq!(f.index.clashes(&f.client1), Ok(()));

        let mut dup = Client::new("client_with_the_same_ip_as_client1");
        dup.ips.push(CLI_IP1.parse().unwrap());
        let clash = f.index.clashes(&dup).unwrap_err();
        assert_eq!(clash.name, "client1");
        assert_eq!(clash.uid, f.client1.uid);
        assert_eq!(
            clash.to_string(),
            "another client \"client1\" uses the same IP \"1.1.1.1\"",
        );

        assert!(f.index.delete(&f.client1).is_some());
        assert_eq!(f.index.clashes(&dup), Ok(()));
    }

    #[test]
    fn every_identifier_kind_clashes() {
        let f = fixture();
        let cases = [
            (CLI_ID, "client_with_id", "ID"),
            (CLI_IPV6, "client1", "IP"),
            (CLI_SUBNET, "client2", "subnet"),
            (CLI_MAC, "client_with_mac", "MAC"),
        ];
        for (id, owner, kind) in cases {
            let dup = new_client("dup", &[id]);
            let clash = f.index.clashes(&dup).unwrap_err();
            assert_eq!(clash.name, owner);
            assert_eq!(clash.identifier.kind(), kind);
            assert_eq!(clash.identifier.to_string(), id);
        }
    }

    #[test]
    fn clashes_are_reported_in_priority_order() {
        let f = fixture();
        let dup = new_client("dup", &[CLI_MAC, CLI_SUBNET, CLI_IP1, CLI_ID]);
        let clash = f.index.clashes(&dup).unwrap_err();
        assert_eq!(clash.identifier, Identifier::ClientId(CLI_ID.to_owned()));
    }

    #[test]
    fn overlapping_subnets_do_not_clash() {
        let f = fixture();
        let dup = new_client("dup", &["2.2.0.0/16", "2.2.2.0/25", "2.2.2.1/24"]);
        assert_eq!(f.index.clashes(&dup), Ok(()));
    }

    #[test]
    fn identifier_kinds_are_independent() {
        let mut index = ClientIndex::new();
        let ip_client = new_client("ip", &["1.1.1.1"]);
        index.add(ip_client);
        let mut id_client = Client::new("id");
        id_client.client_ids.push("1.1.1.1".to_owned());
        assert_eq!(index.clashes(&id_client), Ok(()));
    }

    #[test]
    fn updated_client_does_not_clash_with_itself() {
        let f = fixture();
        let mut updated = (*f.client2).clone();
        updated.name = "client2-renamed".to_owned();
        updated.ips.push("3.3.3.3".parse().unwrap());
        assert_eq!(f.index.clashes(&updated), Ok(()));
    }

    #[test]
    fn add_then_delete_forgets_every_identifier() {
        let mut f = fixture();
        for client in [
            f.client1.clone(),
            f.client2.clone(),
            f.client_with_mac.clone(),
            f.client_with_id.clone(),
        ] {
            f.index.delete(&client);
        }
        assert!(f.index.is_empty());
        for id in [CLI_IP1, CLI_IPV6, CLI_IP2, CLI_SUBNET_IP, CLI_MAC, CLI_ID] {
            assert!(f.index.find(id).is_none(), "{} still resolves", id);
        }

        // Deleting again does nothing.
        assert!(f.index.delete(&f.client1).is_none());
    }

    #[test]
    fn first_subnet_in_order_wins() {
        let mut index = ClientIndex::new();
        let narrow = new_client("narrow", &["10.1.0.0/16"]);
        let wide = new_client("wide", &["10.0.0.0/8"]);
        index.add(narrow);
        index.add(wide);
        assert_eq!(found_name(&index, "10.1.2.3"), Some("wide"));
        assert_eq!(found_name(&index, "10.2.0.1"), Some("wide"));
    }

    #[test]
    fn exact_ip_beats_subnet() {
        let mut index = ClientIndex::new();
        index.add(new_client("subnet", &["192.0.2.0/24"]));
        index.add(new_client("exact", &["192.0.2.7"]));
        assert_eq!(found_name(&index, "192.0.2.7"), Some("exact"));
        assert_eq!(found_name(&index, "192.0.2.8"), Some("subnet"));
    }

    #[test]
    fn mac_that_parses_as_ipv6_falls_through() {
        let mut index = ClientIndex::new();
        let mut client = Client::new("eui64");
        client.macs.push("0200.5e10.0000.0001".parse().unwrap());
        index.add(Arc::new(client));

        assert!("02:00:5e:10:00:00:00:01".parse::<IpAddr>().is_ok());
        assert_eq!(found_name(&index, "02:00:5e:10:00:00:00:01"), Some("eui64"));
    }

    #[test]
    fn macs_of_different_widths_are_distinct() {
        let mut index = ClientIndex::new();
        let mut short = Client::new("short");
        short.macs.push(HardwareAddr::from_bytes(&[1; 6]));
        index.add(Arc::new(short));

        let mut long = Client::new("long");
        long.macs.push(HardwareAddr::from_bytes(&[1; 8]));
        assert_eq!(index.clashes(&long), Ok(()));
        assert!(index.find_by_mac(&long.macs[0]).is_none());

        let mut long_infiniband = Client::new("long_infiniband");
        long_infiniband.macs.push(HardwareAddr::from_bytes(&[1; 20]));
        assert!(index.find_by_mac(&long_infiniband.macs[0]).is_none());
    }

    #[test]
    #[should_panic]
    fn adding_unsupported_mac_width_panics() {
        let mut index = ClientIndex::new();
        let mut client = Client::new("broken");
        client.macs.push(HardwareAddr::from_bytes(&[1, 2, 3]));
        index.add(Arc::new(client));
    }

    #[test]
    fn subnets_sort_by_network_then_prefix_length() {
        let mut nets: Vec<IpNet> = ["10.0.0.0/16", "10.0.0.0/8", "9.0.0.0/8", "::/0", "10.0.0.1/16"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        nets.sort_by(compare_subnets);
        let sorted: Vec<String> = nets.iter().map(ToString::to_string).collect();
        assert_eq!(
            sorted,
            ["9.0.0.0/8", "10.0.0.0/8", "10.0.0.0/16", "10.0.0.1/16", "::/0"],
        );
    }
}
