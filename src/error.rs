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

use embedded_hal::digital::ErrorKind;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A line could not be claimed from the line provider (already in use, bad index...)
    #[error("line {line} could not be acquired")]
    LineUnavailable { line: u32 },

    /// The requested header pin has no usable entry in the active line map
    #[error("pin {pin} has no entry in the line map")]
    InvalidPinMapping { pin: u8 },

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The converter did not signal ready before the configured timeout expired
    #[error("converter did not become ready before the timeout")]
    DeviceNotResponding,

    /// Setting or sampling one of the lines failed
    #[error("line operation failed: {0:?}")]
    Line(ErrorKind),
}

impl Error {
    pub(crate) fn from_pin<E: embedded_hal::digital::Error>(e: E) -> Self {
        Error::Line(e.kind())
    }
}
