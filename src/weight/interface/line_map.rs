// Copyright (C) 2025 Paul Hampson
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License version 3 as  published by the
// Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::error::{Error, Result};
use embedded_hal::digital::{InputPin, OutputPin};

/// Ownership tag attached to claimed lines.
pub const DEFAULT_CONSUMER: &str = "hx711";

const LINES_PER_PORT: u32 = 8;
const PORTS_PER_LETTER_ROUND: u32 = 26;

/// Source of digital lines, typically a GPIO character device. Claimed lines stay owned by
/// the returned pins and are released when those are dropped.
pub trait LineProvider {
    type Output: OutputPin;
    type Input: InputPin;
    type Error: core::fmt::Debug;

    fn request_output(&mut self, line: u32, consumer: &str) -> core::result::Result<Self::Output, Self::Error>;

    fn request_input(&mut self, line: u32, consumer: &str) -> core::result::Result<Self::Input, Self::Error>;
}

/// Board header pin number to named GPIO line, e.g. pin 40 -> `"J6"`.
///
/// Line names are a port address of one or two capital letters followed by a single digit
/// offset within the port. Two letter ports follow on after `Z`, so `"BB0"` is port 27.
#[derive(Debug, Clone, Copy)]
pub struct LineMap<'a> {
    entries: &'a [(u8, &'a str)],
}

impl<'a> LineMap<'a> {
    /// 40-pin header of the Jetson Nano developer kit.
    pub const JETSON_NANO: LineMap<'static> = LineMap::new(&[
        (3, "J3"),
        (5, "J2"),
        (7, "BB0"),
        (8, "G0"),
        (10, "G1"),
        (11, "G2"),
        (12, "J7"),
        (13, "B6"),
        (15, "Y2"),
        (16, "DD0"),
        (18, "B7"),
        (19, "C0"),
        (21, "C1"),
        (22, "B5"),
        (23, "C2"),
        (24, "C3"),
        (26, "C4"),
        (27, "B5"),
        (28, "C2"),
        (29, "S5"),
        (31, "Z0"),
        (32, "V0"),
        (33, "E6"),
        (35, "J4"),
        (36, "G3"),
        (37, "B4"),
        (38, "J5"),
        (40, "J6"),
    ]);

    pub const fn new(entries: &'a [(u8, &'a str)]) -> Self {
        Self { entries }
    }

    pub fn line_name(&self, pin: u8) -> Option<&'a str> {
        self.entries
            .iter()
            .find(|(entry_pin, _)| *entry_pin == pin)
            .map(|(_, name)| *name)
    }

    /// Global line number for a header pin.
    pub fn line_number(&self, pin: u8) -> Result<u32> {
        self.line_name(pin)
            .and_then(parse_line_name)
            .ok_or(Error::InvalidPinMapping { pin })
    }
}

fn parse_line_name(name: &str) -> Option<u32> {
    let bytes = name.as_bytes();
    let (offset, address) = bytes.split_last()?;
    if !offset.is_ascii_digit() || address.is_empty() || address.len() > 2 {
        return None;
    }
    if !address.iter().all(u8::is_ascii_uppercase) {
        return None;
    }

    let mut port = (address[0] - b'A') as u32;
    if address.len() == 2 {
        port += PORTS_PER_LETTER_ROUND;
    }
    Some(port * LINES_PER_PORT + (offset - b'0') as u32)
}
