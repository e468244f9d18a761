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

//! Implementation of the [`Error`] type for client-related errors.

use std::fmt;

use crate::mac;

/// Errors that arise while building a [`Client`](super::Client) from
/// textual identifiers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// A client ID was empty.
    EmptyClientId,

    /// A client ID was longer than 63 octets.
    ClientIdTooLong,

    /// A client ID contained a character other than a lower-case ASCII
    /// letter, an ASCII digit, or a hyphen.
    InvalidClientIdChar,

    /// A client ID began or ended with a hyphen.
    ClientIdEdgeHyphen,

    /// A textual identifier looked like a hardware address but was not
    /// a valid one.
    InvalidMac(mac::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::EmptyClientId => f.write_str("client ID is empty"),
            Self::ClientIdTooLong => f.write_str("client ID is longer than 63 octets"),
            Self::InvalidClientIdChar => f.write_str(
                "client ID may only contain lower-case ASCII letters, digits, and hyphens",
            ),
            Self::ClientIdEdgeHyphen => {
                f.write_str("client ID must not begin or end with a hyphen")
            }
            Self::InvalidMac(e) => write!(f, "invalid hardware address: {}", e),
        }
    }
}

impl From<mac::Error> for Error {
    fn from(error: mac::Error) -> Self {
        Self::InvalidMac(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidMac(e) => Some(e),
            _ => None,
        }
    }
}
