// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction input APDUs

use byteorder::{ByteOrder, LittleEndian};
use encdec::{DecodeOwned, Encode};
use heapless::Vec;

use crate::{
    helpers::{check_len, keypath},
    types::{Keypath, MAX_SIGHASH_SCRIPT_SIZE},
    ApduError, ApduStatic, Instruction, BTC_APDU_CLA,
};

/// Request the sighash script (BIP143 scriptCode) for a transaction input
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | CONFIG_INDEX  |  KEYPATH_LEN  |           RESERVED            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                  KEYPATH (u32 x KEYPATH_LEN)                  /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct SignInputReq {
    /// Index of the accepted script configuration the input belongs to
    pub script_config_index: u8,

    /// Full input keypath (account prefix, change, address index)
    pub keypath: Keypath,
}

impl ApduStatic for SignInputReq {
    const CLA: u8 = BTC_APDU_CLA;
    const INS: u8 = Instruction::BtcSignInput as u8;
}

impl SignInputReq {
    /// Create a new [`SignInputReq`]
    pub fn new(script_config_index: u8, keypath: &[u32]) -> Result<Self, ApduError> {
        let keypath = Vec::from_slice(keypath).map_err(|_| ApduError::InvalidLength)?;
        Ok(Self {
            script_config_index,
            keypath,
        })
    }
}

impl Encode for SignInputReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(4 + keypath::enc_len(&self.keypath))
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        check_len(buff, 0, self.encode_len()?)?;

        buff[0] = self.script_config_index;
        buff[1] = self.keypath.len() as u8;
        buff[2..4].fill(0);

        let n = keypath::enc(&self.keypath, &mut buff[4..])?;

        Ok(4 + n)
    }
}

impl DecodeOwned for SignInputReq {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        check_len(buff, 0, 4)?;

        let script_config_index = buff[0];
        let (keypath, n) = keypath::dec(&buff[4..], buff[1] as usize)?;

        Ok((
            Self {
                script_config_index,
                keypath,
            },
            4 + n,
        ))
    }
}

/// Sighash script response, a compact-size prefixed script for multisig
/// inputs or a bare p2pkh script for single-key inputs
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          SCRIPT_LEN           |           RESERVED            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                      SCRIPT (SCRIPT_LEN)                      /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct SighashScriptResp {
    pub script: Vec<u8, MAX_SIGHASH_SCRIPT_SIZE>,
}

impl SighashScriptResp {
    /// Create a new [`SighashScriptResp`]
    pub fn new(script: &[u8]) -> Result<Self, ApduError> {
        let script = Vec::from_slice(script).map_err(|_| ApduError::InvalidLength)?;
        Ok(Self { script })
    }
}

impl Encode for SighashScriptResp {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(4 + self.script.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        check_len(buff, 0, self.encode_len()?)?;

        LittleEndian::write_u16(&mut buff[0..], self.script.len() as u16);
        buff[2..4].fill(0);
        buff[4..][..self.script.len()].copy_from_slice(&self.script);

        Ok(4 + self.script.len())
    }
}

impl DecodeOwned for SighashScriptResp {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        check_len(buff, 0, 4)?;

        let n = LittleEndian::read_u16(&buff[0..]) as usize;
        check_len(buff, 4, n)?;

        let r = Self::new(&buff[4..][..n])?;

        Ok((r, 4 + n))
    }
}
