// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Session result and reset APDUs
//!

use encdec::{DecodeOwned, Encode};
use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter, EnumString, EnumVariantNames};

use crate::{helpers::check_len, ApduError, ApduStatic, Instruction, BTC_APDU_CLA};

/// Operation result codes
#[derive(
    Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter, TryFromPrimitive,
)]
#[repr(u8)]
pub enum ResultCode {
    Ok = 0x00,
    InvalidInput = 0x01,
    Unknown = 0x02,
}

/// Signing session state
#[derive(
    Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter, TryFromPrimitive,
)]
#[repr(u8)]
pub enum SessionState {
    Idle = 0x00,
    Active = 0x01,
}

/// Result response, returned for session init / reset and on failure
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     CODE      |     STATE     |           RESERVED            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ResultResp {
    pub code: ResultCode,
    pub state: SessionState,
}

impl ResultResp {
    /// Create a new [`ResultResp`]
    pub fn new(code: ResultCode, state: SessionState) -> Self {
        Self { code, state }
    }
}

impl Encode for ResultResp {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(4)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        check_len(buff, 0, 4)?;

        buff[0] = self.code as u8;
        buff[1] = self.state as u8;
        buff[2..4].fill(0);

        Ok(4)
    }
}

impl DecodeOwned for ResultResp {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        check_len(buff, 0, 4)?;

        let code = ResultCode::try_from(buff[0]).map_err(|_| ApduError::InvalidEncoding)?;
        let state = SessionState::try_from(buff[1]).map_err(|_| ApduError::InvalidEncoding)?;

        Ok((Self { code, state }, 4))
    }
}

/// Reset the signing session, discarding any accepted configuration
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct SignResetReq {}

impl ApduStatic for SignResetReq {
    const CLA: u8 = BTC_APDU_CLA;
    const INS: u8 = Instruction::BtcSignReset as u8;
}

impl Encode for SignResetReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, ApduError> {
        Ok(0)
    }
}

impl DecodeOwned for SignResetReq {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(_buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        Ok((Self {}, 0))
    }
}
