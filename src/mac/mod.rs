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

//! Hardware (MAC) addresses and their normalized lookup keys.
//!
//! Clients may be identified by hardware addresses of three widths: the
//! familiar 6-octet EUI-48 address, the 8-octet EUI-64 identifier, and
//! the 20-octet IP-over-InfiniBand link-layer address. [`HardwareAddr`]
//! holds an address of any width. To look addresses up in a single
//! hash table, they are first normalized into a [`MacKey`], which
//! remembers the width so that, say, a 6-octet address never equals an
//! 8-octet address that happens to begin with the same octets.

use std::fmt;
use std::str::FromStr;

use arrayvec::ArrayVec;

use crate::util::{nibble_to_ascii_hex_digit, push_hex_octets};

mod error;

pub use error::Error;

/// The largest supported hardware address width, in octets.
pub const MAX_LEN: usize = 20;

////////////////////////////////////////////////////////////////////////
// HARDWARE ADDRESSES                                                 //
////////////////////////////////////////////////////////////////////////

/// A hardware (MAC) address.
///
/// A `HardwareAddr` parsed from a [`str`] is always 6, 8, or 20 octets
/// long. The following formats are accepted, with upper- or lower-case
/// hexadecimal digits:
///
/// * `00:00:5e:00:53:01`
/// * `00-00-5e-00-53-01`
/// * `0000.5e00.5301`
///
/// ```
/// use clientele::mac::HardwareAddr;
///
/// let mac: HardwareAddr = "0200.5e10.0000.0001".parse().unwrap();
/// assert_eq!(mac.len(), 8);
/// assert_eq!(mac.to_string(), "02:00:5e:10:00:00:00:01");
/// ```
///
/// [`HardwareAddr::from_bytes`] does not check the width; addresses of
/// other widths cannot be normalized with [`HardwareAddr::key`].
#[derive(Clone, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct HardwareAddr {
    octets: Box<[u8]>,
}

#[allow(clippy::len_without_is_empty)]
impl HardwareAddr {
    /// Creates a `HardwareAddr` from raw octets.
    pub fn from_bytes(octets: &[u8]) -> Self {
        Self {
            octets: octets.into(),
        }
    }

    /// Returns the octets of this address.
    pub fn octets(&self) -> &[u8] {
        &self.octets
    }

    /// Returns the width of this address in octets.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Normalizes this address into a [`MacKey`].
    ///
    /// # Panics
    ///
    /// Panics if the address is not 6, 8, or 20 octets long. See
    /// [`MacKey::normalize`].
    pub fn key(&self) -> MacKey {
        MacKey::normalize(&self.octets)
    }
}

impl FromStr for HardwareAddr {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.as_bytes();
        let (separator, group_len) = match text {
            [_, _, separator @ (b':' | b'-'), ..] => (*separator, 2),
            [_, _, _, _, b'.', ..] => (b'.', 4),
            _ => return Err(Error::UnknownFormat),
        };

        let mut octets = ArrayVec::<u8, MAX_LEN>::new();
        for group in text.split(|&c| c == separator) {
            if group.len() != group_len {
                return Err(Error::InvalidGroup);
            } else if octets.remaining_capacity() < group_len / 2 {
                return Err(Error::InvalidLength);
            }
            push_hex_octets(group, &mut octets).ok_or(Error::InvalidDigit)?;
        }

        match octets.len() {
            6 | 8 | MAX_LEN => Ok(Self::from_bytes(&octets)),
            _ => Err(Error::InvalidLength),
        }
    }
}

impl From<MacKey> for HardwareAddr {
    fn from(key: MacKey) -> Self {
        Self::from_bytes(key.octets())
    }
}

impl fmt::Display for HardwareAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, octet) in self.octets.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            let high = nibble_to_ascii_hex_digit(octet >> 4) as char;
            let low = nibble_to_ascii_hex_digit(octet & 0xf) as char;
            write!(f, "{}{}", high, low)?;
        }
        Ok(())
    }
}

impl fmt::Debug for HardwareAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

////////////////////////////////////////////////////////////////////////
// NORMALIZED KEYS                                                    //
////////////////////////////////////////////////////////////////////////

/// A hardware address normalized into a fixed-size, hashable key.
///
/// Keys of different widths are different variants, so they never
/// compare equal.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MacKey {
    Eui48([u8; 6]),
    Eui64([u8; 8]),
    Infiniband([u8; 20]),
}

impl MacKey {
    /// Normalizes `octets` into a `MacKey`, or returns [`None`] if
    /// `octets` is not 6, 8, or 20 octets long.
    pub fn try_normalize(octets: &[u8]) -> Option<Self> {
        match octets.len() {
            6 => octets.try_into().ok().map(Self::Eui48),
            8 => octets.try_into().ok().map(Self::Eui64),
            20 => octets.try_into().ok().map(Self::Infiniband),
            _ => None,
        }
    }

    /// Normalizes `octets` into a `MacKey`.
    ///
    /// # Panics
    ///
    /// Panics if `octets` is not 6, 8, or 20 octets long. Callers are
    /// expected to have validated the address already (addresses
    /// parsed into a [`HardwareAddr`] always have a supported width).
    pub fn normalize(octets: &[u8]) -> Self {
        match Self::try_normalize(octets) {
            Some(key) => key,
            None => panic!(
                "hardware address of {} octets cannot be normalized",
                octets.len()
            ),
        }
    }

    /// Returns the octets of the address this key was made from.
    pub fn octets(&self) -> &[u8] {
        match self {
            Self::Eui48(octets) => octets,
            Self::Eui64(octets) => octets,
            Self::Infiniband(octets) => octets,
        }
    }
}
