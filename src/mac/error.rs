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

//! Implementation of the [`Error`] type for hardware address parsing.

use std::fmt;

/// An error type used to report problems parsing a
/// [`HardwareAddr`](super::HardwareAddr) from a [`str`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// A group did not have the number of digits that the address
    /// format requires.
    InvalidGroup,

    /// A character that is not a hexadecimal digit was found in a
    /// group.
    InvalidDigit,

    /// The address does not have 6, 8, or 20 octets.
    InvalidLength,

    /// The string is not written in any of the supported formats.
    UnknownFormat,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::InvalidGroup => f.write_str("group has the wrong number of digits"),
            Self::InvalidDigit => f.write_str("invalid hexadecimal digit"),
            Self::InvalidLength => f.write_str("address is not 6, 8, or 20 octets long"),
            Self::UnknownFormat => f.write_str("unrecognized hardware address format"),
        }
    }
}

impl std::error::Error for Error {}
