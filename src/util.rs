// Copyright 2021 Matthew Ingwersen.
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

//! Crate-private utilities.

/// Converts a nibble into an ASCII hex character. Lower-case hex digits
/// are used. The passed value must be less than 16.
pub fn nibble_to_ascii_hex_digit(nibble: u8) -> u8 {
    assert!(nibble < 16);
    if nibble < 10 {
        b'0' + nibble
    } else {
        b'a' + nibble - 10
    }
}

/// Converts an ASCII hexadecimal digit to its numeric value. This
/// returns [`None`] if `digit` is not one of the ASCII characters
/// `0` through `9`, `A` through `F`, or `a` through `f`.
pub fn ascii_hex_digit_to_nibble(digit: u8) -> Option<u8> {
    if digit.is_ascii_digit() {
        Some(digit - b'0')
    } else if (b'A'..=b'F').contains(&digit) {
        Some(digit - b'A' + 10)
    } else if (b'a'..=b'f').contains(&digit) {
        Some(digit - b'a' + 10)
    } else {
        None
    }
}

/// Parses a run of ASCII hexadecimal digits of even length into
/// octets, appending them to `out`. Returns [`None`] if a non-hex digit
/// is found or if `out` runs out of capacity.
pub fn push_hex_octets<const N: usize>(
    digits: &[u8],
    out: &mut arrayvec::ArrayVec<u8, N>,
) -> Option<()> {
    for pair in digits.chunks(2) {
        let high = ascii_hex_digit_to_nibble(pair[0])?;
        let low = ascii_hex_digit_to_nibble(*pair.get(1)?)?;
        out.try_push((high << 4) | low).ok()?;
    }
    Some(())
}
