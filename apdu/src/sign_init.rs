// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Signing session initialisation APDU

use encdec::{DecodeOwned, Encode};
use heapless::Vec;

use crate::{
    helpers::{check_len, keypath},
    types::{
        BtcCoin, MultisigConfig, MultisigScriptType, ScriptConfig, ScriptConfigWithKeypath,
        SimpleType, MAX_SCRIPT_CONFIGS, MAX_SIGNERS, XPUB_LEN,
    },
    ApduError, ApduStatic, Instruction, BTC_APDU_CLA,
};

const KIND_SIMPLE: u8 = 0x00;
const KIND_MULTISIG: u8 = 0x01;

/// Signing session initialisation APDU, sets the coin and the script
/// configurations inputs and change outputs may reference
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     COIN      |  NUM_CONFIGS  |           RESERVED            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                   SCRIPT_CONFIG[NUM_CONFIGS]                  /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// ## Script configuration encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     KIND      |  KEYPATH_LEN  |           RESERVED            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                  KEYPATH (u32 x KEYPATH_LEN)                  /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  SCRIPT_TYPE  |   THRESHOLD   | SIGNER_COUNT  | OUR_XPUB_INDEX|
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /            XPUBS (78 bytes x SIGNER_COUNT, multisig)          /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// For simple configurations `THRESHOLD`, `SIGNER_COUNT` and `OUR_XPUB_INDEX`
/// are reserved and no xpubs follow.
#[derive(Clone, PartialEq, Debug)]
pub struct SignInitReq {
    /// Coin for the transaction
    pub coin: BtcCoin,

    /// Script configurations available to inputs and change outputs
    pub configs: Vec<ScriptConfigWithKeypath, MAX_SCRIPT_CONFIGS>,
}

impl ApduStatic for SignInitReq {
    const CLA: u8 = BTC_APDU_CLA;
    const INS: u8 = Instruction::BtcSignInit as u8;
}

impl SignInitReq {
    /// Create a new [`SignInitReq`]
    pub fn new(coin: BtcCoin, configs: &[ScriptConfigWithKeypath]) -> Result<Self, ApduError> {
        let configs = Vec::from_slice(configs).map_err(|_| ApduError::InvalidLength)?;
        Ok(Self { coin, configs })
    }
}

impl Encode for SignInitReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(4 + self.configs.iter().map(config_enc_len).sum::<usize>())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        check_len(buff, 0, self.encode_len()?)?;

        let mut index = 0;
        buff[0] = self.coin as u8;
        buff[1] = self.configs.len() as u8;
        buff[2..4].fill(0);
        index += 4;

        for c in self.configs.iter() {
            index += config_enc(c, &mut buff[index..])?;
        }

        Ok(index)
    }
}

impl DecodeOwned for SignInitReq {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        check_len(buff, 0, 4)?;

        let coin = BtcCoin::try_from(buff[0]).map_err(|_| ApduError::InvalidEncoding)?;
        let num_configs = buff[1] as usize;
        if num_configs > MAX_SCRIPT_CONFIGS {
            return Err(ApduError::InvalidLength);
        }

        let mut index = 4;
        let mut configs = Vec::new();
        for _ in 0..num_configs {
            let (c, n) = config_dec(&buff[index..])?;
            // Capacity checked above
            let _ = configs.push(c);
            index += n;
        }

        Ok((Self { coin, configs }, index))
    }
}

fn config_enc_len(c: &ScriptConfigWithKeypath) -> usize {
    let xpubs = match &c.config {
        ScriptConfig::Simple(_) => 0,
        ScriptConfig::Multisig(m, _) => m.signer_count() * XPUB_LEN,
    };

    4 + keypath::enc_len(&c.keypath) + 4 + xpubs
}

fn config_enc(c: &ScriptConfigWithKeypath, buff: &mut [u8]) -> Result<usize, ApduError> {
    check_len(buff, 0, config_enc_len(c))?;

    let kind = match &c.config {
        ScriptConfig::Simple(_) => KIND_SIMPLE,
        ScriptConfig::Multisig(..) => KIND_MULTISIG,
    };

    let mut index = 0;
    buff[0] = kind;
    buff[1] = c.keypath.len() as u8;
    buff[2..4].fill(0);
    index += 4;

    index += keypath::enc(&c.keypath, &mut buff[index..])?;

    match &c.config {
        ScriptConfig::Simple(t) => {
            buff[index] = *t as u8;
            buff[index + 1..index + 4].fill(0);
            index += 4;
        }
        ScriptConfig::Multisig(m, t) => {
            let threshold = u8::try_from(m.threshold).map_err(|_| ApduError::InvalidEncoding)?;
            let our_xpub_index =
                u8::try_from(m.our_xpub_index).map_err(|_| ApduError::InvalidEncoding)?;

            buff[index] = *t as u8;
            buff[index + 1] = threshold;
            buff[index + 2] = m.signer_count() as u8;
            buff[index + 3] = our_xpub_index;
            index += 4;

            for x in m.xpubs.iter() {
                buff[index..][..XPUB_LEN].copy_from_slice(x);
                index += XPUB_LEN;
            }
        }
    }

    Ok(index)
}

fn config_dec(buff: &[u8]) -> Result<(ScriptConfigWithKeypath, usize), ApduError> {
    check_len(buff, 0, 4)?;

    let kind = buff[0];
    let keypath_len = buff[1] as usize;
    let mut index = 4;

    let (keypath, n) = keypath::dec(&buff[index..], keypath_len)?;
    index += n;

    check_len(buff, index, 4)?;
    let script_type = buff[index];

    let config = match kind {
        KIND_SIMPLE => {
            let t = SimpleType::try_from(script_type).map_err(|_| ApduError::InvalidEncoding)?;
            index += 4;

            ScriptConfig::Simple(t)
        }
        KIND_MULTISIG => {
            let t = MultisigScriptType::try_from(script_type)
                .map_err(|_| ApduError::InvalidEncoding)?;
            let threshold = buff[index + 1] as u32;
            let signer_count = buff[index + 2] as usize;
            let our_xpub_index = buff[index + 3] as u32;
            index += 4;

            if signer_count > MAX_SIGNERS {
                return Err(ApduError::InvalidLength);
            }
            check_len(buff, index, signer_count * XPUB_LEN)?;

            let mut xpubs = Vec::new();
            for _ in 0..signer_count {
                let mut x = [0u8; XPUB_LEN];
                x.copy_from_slice(&buff[index..][..XPUB_LEN]);
                // Capacity checked above
                let _ = xpubs.push(x);
                index += XPUB_LEN;
            }

            ScriptConfig::Multisig(
                MultisigConfig {
                    threshold,
                    xpubs,
                    our_xpub_index,
                },
                t,
            )
        }
        _ => {
            #[cfg(feature = "log")]
            log::debug!("unrecognised script config kind: {:#04x}", kind);

            return Err(ApduError::InvalidEncoding);
        }
    };

    Ok((ScriptConfigWithKeypath { config, keypath }, index))
}

#[cfg(test)]
mod test {
    use rand::random;

    use super::*;
    use crate::{helpers::test::encode_decode_apdu, types::HARDENED};

    #[test]
    fn encode_decode_sign_init_simple() {
        let apdu = SignInitReq::new(
            BtcCoin::Btc,
            &[
                ScriptConfigWithKeypath::new(
                    ScriptConfig::Simple(SimpleType::P2wpkh),
                    &[84 + HARDENED, HARDENED, HARDENED],
                )
                .unwrap(),
                ScriptConfigWithKeypath::new(
                    ScriptConfig::Simple(SimpleType::P2tr),
                    &[86 + HARDENED, HARDENED, HARDENED],
                )
                .unwrap(),
            ],
        )
        .unwrap();

        let mut buff = [0u8; 256];
        let n = encode_decode_apdu(&mut buff, &apdu);

        assert_eq!(n, 4 + 2 * (4 + 12 + 4));
    }

    #[test]
    fn encode_decode_sign_init_multisig() {
        let xpubs: [[u8; XPUB_LEN]; 3] = [
            [random(); XPUB_LEN],
            [random(); XPUB_LEN],
            [random(); XPUB_LEN],
        ];

        let apdu = SignInitReq::new(
            BtcCoin::Tbtc,
            &[ScriptConfigWithKeypath::new(
                ScriptConfig::Multisig(
                    MultisigConfig::new(2, 1, &xpubs).unwrap(),
                    MultisigScriptType::P2wshP2sh,
                ),
                &[48 + HARDENED, 1 + HARDENED, HARDENED, 1 + HARDENED],
            )
            .unwrap()],
        )
        .unwrap();

        let mut buff = [0u8; 512];
        let n = encode_decode_apdu(&mut buff, &apdu);

        assert_eq!(n, 4 + 4 + 16 + 4 + 3 * XPUB_LEN);
    }

    #[test]
    fn decode_rejects_unknown_values() {
        // Unknown coin
        assert_eq!(
            SignInitReq::decode_owned(&[0xff, 0, 0, 0]),
            Err(ApduError::InvalidEncoding)
        );

        // Too many configurations
        assert_eq!(
            SignInitReq::decode_owned(&[0x00, MAX_SCRIPT_CONFIGS as u8 + 1, 0, 0]),
            Err(ApduError::InvalidLength)
        );

        // Unknown configuration kind
        assert_eq!(
            SignInitReq::decode_owned(&[0x00, 1, 0, 0, 0x07, 0, 0, 0, 0x01, 0, 0, 0]),
            Err(ApduError::InvalidEncoding)
        );

        // Unknown simple type
        assert_eq!(
            SignInitReq::decode_owned(&[0x00, 1, 0, 0, KIND_SIMPLE, 0, 0, 0, 0x09, 0, 0, 0]),
            Err(ApduError::InvalidEncoding)
        );
    }
}
