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

//! Implementation of the [`Clash`] error type.

use std::fmt;

use crate::client::{Identifier, Uid};

/// An error reporting that another client already uses one of the
/// identifiers of a client being checked with
/// [`ClientIndex::clashes`](super::ClientIndex::clashes).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Clash {
    /// The name of the client that already uses the identifier.
    pub name: String,

    /// The UID of the client that already uses the identifier.
    pub uid: Uid,

    /// The identifier in question.
    pub identifier: Identifier,
}

impl fmt::Display for Clash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "another client \"{}\" uses the same {} \"{}\"",
            self.name,
            self.identifier.kind(),
            self.identifier,
        )
    }
}

impl std::error::Error for Clash {}
