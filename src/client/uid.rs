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

//! The [`Uid`] type, the unique identifier of a client record.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// The unique identifier of a [`Client`](super::Client).
///
/// A `Uid` is generated once for each client record from a random
/// (version 4) UUID, so independently generated identifiers do not
/// collide in practice. It is the primary key under which a
/// [`ClientIndex`](crate::index::ClientIndex) stores its records.
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Uid(Uuid);

impl Uid {
    /// Generates a new, random `Uid`.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the 16 octets of this `Uid`.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for Uid {
    fn default() -> Self {
        Self::new()
    }
}

impl From<[u8; 16]> for Uid {
    fn from(octets: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(octets))
    }
}

impl FromStr for Uid {
    type Err = uuid::Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        text.parse().map(Self)
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Uid;

    #[test]
    fn generated_uids_are_distinct() {
        let first = Uid::new();
        let second = Uid::new();
        assert_ne!(first, second);
    }

    #[test]
    fn displays_and_parses_as_hyphenated_uuid() {
        let uid = Uid::from([0xab; 16]);
        let text = uid.to_string();
        assert_eq!(text, "abababab-abab-abab-abab-abababababab");
        assert_eq!(text.parse::<Uid>().unwrap(), uid);
    }
}
