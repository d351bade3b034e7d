// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Standard error enum for invoking operations

/// Standard errors returned by HIL and capsule operations.
///
/// Pulse timing itself never fails at runtime. These codes only describe
/// configuration problems and misuse detected before any pin is touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum ErrorCode {
    /// Underlying system is busy; retry
    BUSY = 2,
    /// The state requested is already set
    ALREADY = 3,
    /// The component is powered down or stopped
    OFF = 4,
    /// An invalid parameter was passed
    INVAL = 6,
    /// Parameter passed was too large
    SIZE = 7,
    /// Device does not exist
    NODEVICE = 11,
}

impl From<ErrorCode> for usize {
    fn from(err: ErrorCode) -> usize {
        err as usize
    }
}

impl TryFrom<usize> for ErrorCode {
    type Error = ();

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(ErrorCode::BUSY),
            3 => Ok(ErrorCode::ALREADY),
            4 => Ok(ErrorCode::OFF),
            6 => Ok(ErrorCode::INVAL),
            7 => Ok(ErrorCode::SIZE),
            11 => Ok(ErrorCode::NODEVICE),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usize_round_trip_for_every_code() {
        let codes = [
            ErrorCode::BUSY,
            ErrorCode::ALREADY,
            ErrorCode::OFF,
            ErrorCode::INVAL,
            ErrorCode::SIZE,
            ErrorCode::NODEVICE,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(usize::from(code)), Ok(code));
        }
    }

    #[test]
    fn zero_is_never_an_error() {
        assert_eq!(ErrorCode::try_from(0), Err(()));
        assert_eq!(usize::from(ErrorCode::NODEVICE), 11);
    }
}
