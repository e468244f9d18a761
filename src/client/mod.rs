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

//! Client records and the identifiers they are known by.
//!
//! A [`Client`] is a named, persistently configured client of the
//! gateway. Requests are attributed to a client through one of four
//! kinds of [`Identifier`]: an opaque client ID string (as carried by
//! encrypted DNS protocols), an exact IP address, a CIDR subnet that
//! contains the request's source address, or a hardware (MAC) address.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnet::IpNet;

use crate::mac::{self, HardwareAddr};

mod error;
mod uid;

pub use error::Error;
pub use uid::Uid;

/// The maximum length of a client ID, in octets.
pub const MAX_CLIENT_ID_LEN: usize = 63;

////////////////////////////////////////////////////////////////////////
// CLIENT RECORDS                                                     //
////////////////////////////////////////////////////////////////////////

/// A persistent client record.
///
/// A `Client` carries its own [`Uid`], which a
/// [`ClientIndex`](crate::index::ClientIndex) uses as the record's
/// primary key. The identifier lists are expected to be valid already;
/// in particular, every hardware address must be 6, 8, or 20 octets
/// long.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Client {
    pub name: String,
    pub uid: Uid,
    pub client_ids: Vec<String>,
    pub ips: Vec<IpAddr>,
    pub subnets: Vec<IpNet>,
    pub macs: Vec<HardwareAddr>,
}

impl Client {
    /// Creates a new `Client` with a freshly generated [`Uid`] and no
    /// identifiers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: Uid::new(),
            client_ids: Vec::new(),
            ips: Vec::new(),
            subnets: Vec::new(),
            macs: Vec::new(),
        }
    }

    /// Creates a new `Client` and classifies each of the textual
    /// identifiers in `ids` into it. See [`Identifier`]'s [`FromStr`]
    /// implementation for the classification rules.
    pub fn with_identifiers<I, S>(name: impl Into<String>, ids: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut client = Self::new(name);
        for id in ids {
            client.add_identifier(id.as_ref().parse()?);
        }
        Ok(client)
    }

    /// Adds an identifier to the matching list. An identifier that the
    /// client already has is not added again.
    pub fn add_identifier(&mut self, id: Identifier) {
        fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
            if !list.contains(&item) {
                list.push(item);
            }
        }

        match id {
            Identifier::ClientId(id) => push_unique(&mut self.client_ids, id),
            Identifier::Ip(ip) => push_unique(&mut self.ips, ip),
            Identifier::Subnet(subnet) => push_unique(&mut self.subnets, subnet),
            Identifier::Mac(mac) => push_unique(&mut self.macs, mac),
        }
    }

    /// Returns an iterator over all of the client's identifiers: client
    /// IDs first, then IP addresses, subnets, and hardware addresses.
    pub fn identifiers(&self) -> impl Iterator<Item = Identifier> + '_ {
        let client_ids = self.client_ids.iter().cloned().map(Identifier::ClientId);
        let ips = self.ips.iter().copied().map(Identifier::Ip);
        let subnets = self.subnets.iter().copied().map(Identifier::Subnet);
        let macs = self.macs.iter().cloned().map(Identifier::Mac);
        client_ids.chain(ips).chain(subnets).chain(macs)
    }
}

////////////////////////////////////////////////////////////////////////
// IDENTIFIERS                                                        //
////////////////////////////////////////////////////////////////////////

/// A single identifier of a client.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Identifier {
    ClientId(String),
    Ip(IpAddr),
    Subnet(IpNet),
    Mac(HardwareAddr),
}

impl Identifier {
    /// Returns a short, human-readable name for the kind of this
    /// identifier, suitable for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ClientId(_) => "ID",
            Self::Ip(_) => "IP",
            Self::Subnet(_) => "subnet",
            Self::Mac(_) => "MAC",
        }
    }
}

/// Classifies a textual identifier. The text is tried, in order, as an
/// IP address, a CIDR subnet, and a hardware address. If it is none of
/// these, it must be a valid client ID (see [`validate_client_id`]).
///
/// Some hardware addresses can also be read as IPv6 addresses (for
/// instance, `02:00:5e:10:00:00:00:01`); these are classified as IP
/// addresses.
impl FromStr for Identifier {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if let Ok(ip) = text.parse() {
            return Ok(Self::Ip(ip));
        } else if let Ok(subnet) = text.parse() {
            return Ok(Self::Subnet(subnet));
        }

        match text.parse::<HardwareAddr>() {
            Ok(mac) => Ok(Self::Mac(mac)),
            Err(mac_error) => match validate_client_id(text) {
                Ok(()) => Ok(Self::ClientId(text.to_owned())),
                Err(_) if mac_error != mac::Error::UnknownFormat => Err(mac_error.into()),
                Err(e) => Err(e),
            },
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ClientId(id) => f.write_str(id),
            Self::Ip(ip) => write!(f, "{}", ip),
            Self::Subnet(subnet) => write!(f, "{}", subnet),
            Self::Mac(mac) => write!(f, "{}", mac),
        }
    }
}

/// Checks that `id` is a valid client ID: 1 to 63 octets of lower-case
/// ASCII letters, digits, and hyphens, neither beginning nor ending
/// with a hyphen.
pub fn validate_client_id(id: &str) -> Result<(), Error> {
    let octets = id.as_bytes();
    if octets.is_empty() {
        Err(Error::EmptyClientId)
    } else if octets.len() > MAX_CLIENT_ID_LEN {
        Err(Error::ClientIdTooLong)
    } else if !octets
        .iter()
        .all(|&c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == b'-')
    {
        Err(Error::InvalidClientIdChar)
    } else if octets[0] == b'-' || octets[octets.len() - 1] == b'-' {
        Err(Error::ClientIdEdgeHyphen)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_classified() {
        let client = Client::with_identifiers(
            "client",
            [
                "1.1.1.1",
                "1:2:3::4",
                "2.2.2.0/24",
                "11:11:11:11:11:11",
                "client-id",
            ],
        )
        .unwrap();
        assert_eq!(client.client_ids, ["client-id"]);
        assert_eq!(
            client.ips,
            ["1.1.1.1".parse::<IpAddr>().unwrap(), "1:2:3::4".parse().unwrap()],
        );
        assert_eq!(client.subnets, ["2.2.2.0/24".parse::<IpNet>().unwrap()]);
        assert_eq!(client.macs.len(), 1);
        assert_eq!(client.macs[0].to_string(), "11:11:11:11:11:11");
    }

    #[test]
    fn eight_octet_mac_reads_as_ipv6() {
        assert!(matches!(
            "02:00:5e:10:00:00:00:01".parse::<Identifier>(),
            Ok(Identifier::Ip(IpAddr::V6(_))),
        ));
        assert!(matches!(
            "0200.5e10.0000.0001".parse::<Identifier>(),
            Ok(Identifier::Mac(mac)) if mac.len() == 8,
        ));
    }

    #[test]
    fn duplicate_identifiers_are_ignored() {
        let client = Client::with_identifiers("client", ["1.1.1.1", "1.1.1.1", "a", "a"]).unwrap();
        assert_eq!(client.ips.len(), 1);
        assert_eq!(client.client_ids.len(), 1);
        assert_eq!(client.identifiers().count(), 2);
    }

    #[test]
    fn invalid_identifiers_are_rejected() {
        assert_eq!("".parse::<Identifier>(), Err(Error::EmptyClientId));
        assert_eq!("Upper".parse::<Identifier>(), Err(Error::InvalidClientIdChar));
        assert_eq!("-edge".parse::<Identifier>(), Err(Error::ClientIdEdgeHyphen));
        assert_eq!(
            "a".repeat(MAX_CLIENT_ID_LEN + 1).parse::<Identifier>(),
            Err(Error::ClientIdTooLong),
        );
        assert_eq!(
            "00:00:5e:00:53:zz".parse::<Identifier>(),
            Err(Error::InvalidMac(mac::Error::InvalidDigit)),
        );
    }

    #[test]
    fn hyphenated_client_ids_are_not_mistaken_for_macs() {
        assert_eq!(
            "ab-cd-ef".parse::<Identifier>(),
            Ok(Identifier::ClientId("ab-cd-ef".to_owned())),
        );
    }

    #[test]
    fn new_clients_get_distinct_uids() {
        assert_ne!(Client::new("a").uid, Client::new("a").uid);
    }
}
