// Copyright (c) 2022-2023 The MobileCoin Foundation

use hww_btc_apdu::{result::ResultCode, ApduError};

/// [Engine][super::Engine] errors
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
#[repr(u8)]
pub enum Error {
    /// Malformed, inconsistent or disallowed request
    #[cfg_attr(feature = "thiserror", error("invalid input"))]
    InvalidInput = 0x01,

    /// Key derivation, encoding or capacity failure
    #[cfg_attr(feature = "thiserror", error("unknown"))]
    Unknown = 0xf0,
}

/// Request decoding failures map to [`Error::Unknown`]
impl From<ApduError> for Error {
    fn from(_: ApduError) -> Self {
        Error::Unknown
    }
}

impl From<Error> for ResultCode {
    fn from(e: Error) -> Self {
        match e {
            Error::InvalidInput => ResultCode::InvalidInput,
            Error::Unknown => ResultCode::Unknown,
        }
    }
}
