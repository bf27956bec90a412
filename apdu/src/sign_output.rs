// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction output APDUs

use encdec::{DecodeOwned, Encode};
use heapless::Vec;

use crate::{
    helpers::{check_len, keypath},
    types::{Keypath, MAX_PAYLOAD_SIZE},
    ApduError, ApduStatic, Instruction, BTC_APDU_CLA,
};

/// Request the payload for a transaction output owned by the wallet,
/// used by the caller to verify change addresses
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | CONFIG_INDEX  |  KEYPATH_LEN  |    IS_OWN     |   RESERVED    |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                  KEYPATH (u32 x KEYPATH_LEN)                  /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct SignOutputReq {
    /// Index of the accepted script configuration the output belongs to
    pub script_config_index: u8,

    /// Set when the output is claimed as belonging to the wallet
    pub is_own_output: bool,

    /// Full output keypath (account prefix, change, address index)
    pub keypath: Keypath,
}

impl ApduStatic for SignOutputReq {
    const CLA: u8 = BTC_APDU_CLA;
    const INS: u8 = Instruction::BtcSignOutput as u8;
}

impl SignOutputReq {
    /// Create a new [`SignOutputReq`]
    pub fn new(
        script_config_index: u8,
        is_own_output: bool,
        keypath: &[u32],
    ) -> Result<Self, ApduError> {
        let keypath = Vec::from_slice(keypath).map_err(|_| ApduError::InvalidLength)?;
        Ok(Self {
            script_config_index,
            is_own_output,
            keypath,
        })
    }
}

impl Encode for SignOutputReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(4 + keypath::enc_len(&self.keypath))
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        check_len(buff, 0, self.encode_len()?)?;

        buff[0] = self.script_config_index;
        buff[1] = self.keypath.len() as u8;
        buff[2] = self.is_own_output as u8;
        buff[3] = 0;

        let n = keypath::enc(&self.keypath, &mut buff[4..])?;

        Ok(4 + n)
    }
}

impl DecodeOwned for SignOutputReq {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        check_len(buff, 0, 4)?;

        let script_config_index = buff[0];
        let is_own_output = match buff[2] {
            0 => false,
            1 => true,
            _ => return Err(ApduError::InvalidEncoding),
        };
        let (keypath, n) = keypath::dec(&buff[4..], buff[1] as usize)?;

        Ok((
            Self {
                script_config_index,
                is_own_output,
                keypath,
            },
            4 + n,
        ))
    }
}

/// Output payload response (20 byte hash160, 32 byte sha256 or taproot output key)
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  PAYLOAD_LEN  |                    RESERVED                   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                     PAYLOAD (PAYLOAD_LEN)                     /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct PayloadResp {
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl PayloadResp {
    /// Create a new [`PayloadResp`]
    pub fn new(payload: &[u8]) -> Result<Self, ApduError> {
        let payload = Vec::from_slice(payload).map_err(|_| ApduError::InvalidLength)?;
        Ok(Self { payload })
    }
}

impl Encode for PayloadResp {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(4 + self.payload.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        check_len(buff, 0, self.encode_len()?)?;

        buff[0] = self.payload.len() as u8;
        buff[1..4].fill(0);
        buff[4..][..self.payload.len()].copy_from_slice(&self.payload);

        Ok(4 + self.payload.len())
    }
}

impl DecodeOwned for PayloadResp {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        check_len(buff, 0, 4)?;

        let n = buff[0] as usize;
        check_len(buff, 4, n)?;

        let r = Self::new(&buff[4..][..n])?;

        Ok((r, 4 + n))
    }
}

#[cfg(test)]
mod test {
    use rand::random;

    use super::*;
    use crate::{helpers::test::encode_decode_apdu, types::HARDENED};

    #[test]
    fn encode_decode_sign_output() {
        let apdu = SignOutputReq::new(
            random(),
            true,
            &[48 + HARDENED, HARDENED, HARDENED, 2 + HARDENED, 1, random()],
        )
        .unwrap();

        let mut buff = [0u8; 64];
        let n = encode_decode_apdu(&mut buff, &apdu);

        assert_eq!(n, 4 + 6 * 4);
    }

    #[test]
    fn encode_decode_payload() {
        let apdu = PayloadResp::new(&random::<[u8; 32]>()).unwrap();

        let mut buff = [0u8; 64];
        let n = encode_decode_apdu(&mut buff, &apdu);

        assert_eq!(n, 36);
    }

    #[test]
    fn decode_rejects_invalid_flag() {
        assert_eq!(
            SignOutputReq::decode_owned(&[0, 0, 2, 0]),
            Err(ApduError::InvalidEncoding)
        );
    }
}
