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

//! Client identity resolution for a filtering DNS gateway.
//!
//! A filtering DNS gateway applies per-client settings, so it must work
//! out which configured client sent each request. Clients are known by
//! client IDs, IP addresses, subnets, and hardware (MAC) addresses; this
//! crate resolves any of these to a single client record while making
//! sure that no identifier is claimed by two clients.
//!
//! * [`index::ClientIndex`] is the core lookup structure. It is not
//!   synchronized, and it relies on its caller to check for clashes
//!   before adding a client.
//! * [`registry::Registry`] wraps an index with a lock and enforces the
//!   clash-checking protocol.
//! * [`collections::OrderedMap`] is the sorted map used to search
//!   subnets in order.
//! * [`mac`] parses hardware addresses and normalizes them into
//!   hashable keys.

pub mod client;
pub mod collections;
pub mod index;
pub mod mac;
pub mod registry;
mod util;

pub use client::{Client, Identifier, Uid};
pub use index::ClientIndex;
pub use registry::Registry;
