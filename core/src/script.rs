// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Output script and payload derivation for single-key script types.
//!
//! Payloads are the hash or key bytes placed inside a locking script,
//! these are derived from a keypath and script type via [`payload_at_keypath`]
//! and placed into a locking script via [`pkscript_from_payload`].

use byteorder::{ByteOrder, LittleEndian};
use heapless::Vec;
use secp256k1::{PublicKey, Scalar, Secp256k1};

use crate::{
    apdu::types::{
        MultisigScriptType, OutputType, ScriptConfig, SimpleType, HARDENED,
        MAX_PAYLOAD_SIZE, MAX_SIGHASH_SCRIPT_SIZE,
    },
    engine::{Driver, Error},
    helpers::{hash160, tagged_hash},
    params::Params,
    validate::purpose,
};

/// Script opcodes used in output scripts
pub mod opcodes {
    pub const OP_0: u8 = 0x00;
    /// Base for small integer opcodes, `OP_n = OP_RESERVED + n` for `1 <= n <= 16`
    pub const OP_RESERVED: u8 = 0x50;
    pub const OP_1: u8 = 0x51;
    pub const OP_16: u8 = 0x60;
    pub const OP_DUP: u8 = 0x76;
    pub const OP_EQUAL: u8 = 0x87;
    pub const OP_EQUALVERIFY: u8 = 0x88;
    pub const OP_HASH160: u8 = 0xa9;
    pub const OP_CHECKSIG: u8 = 0xac;
    pub const OP_CHECKMULTISIG: u8 = 0xae;
    /// Largest direct data push
    pub const OP_PUSHBYTES_75: u8 = 0x4b;
}

use opcodes::*;

pub const HASH160_LEN: usize = 20;
pub const SHA256_LEN: usize = 32;

/// Output payload, [`HASH160_LEN`] or [`SHA256_LEN`] bytes depending on script type
pub type Payload = Vec<u8, MAX_PAYLOAD_SIZE>;

/// Sighash script (BIP143 scriptCode)
pub type SighashScript = Vec<u8, MAX_SIGHASH_SCRIPT_SIZE>;

/// Length of a p2pkh pk script
pub const P2PKH_SCRIPT_LEN: usize = 25;

/// Bounded script writer over a caller provided buffer,
/// writes past the end of the buffer fail with [`Error::Unknown`]
pub(crate) struct ScriptWriter<'a> {
    buff: &'a mut [u8],
    index: usize,
}

impl<'a> ScriptWriter<'a> {
    pub fn new(buff: &'a mut [u8]) -> Self {
        Self { buff, index: 0 }
    }

    /// Write a single opcode
    pub fn op(&mut self, op: u8) -> Result<(), Error> {
        match self.buff.get_mut(self.index) {
            Some(b) => *b = op,
            None => return Err(Error::Unknown),
        }
        self.index += 1;
        Ok(())
    }

    /// Write a direct data push (length byte then data)
    pub fn push(&mut self, data: &[u8]) -> Result<(), Error> {
        if data.len() > OP_PUSHBYTES_75 as usize {
            return Err(Error::Unknown);
        }

        self.op(data.len() as u8)?;

        let b = match self.buff.get_mut(self.index..self.index + data.len()) {
            Some(b) => b,
            None => return Err(Error::Unknown),
        };
        b.copy_from_slice(data);
        self.index += data.len();

        Ok(())
    }

    /// Number of bytes written
    pub fn len(&self) -> usize {
        self.index
    }
}

/// Build the pk script for an output type and payload, returning the script length.
///
/// Payload sizes must match the output type, and p2tr outputs require taproot support.
#[cfg_attr(feature = "noinline", inline(never))]
pub fn pkscript_from_payload(
    taproot_support: bool,
    output_type: OutputType,
    payload: &[u8],
    out: &mut [u8],
) -> Result<usize, Error> {
    let expected_len = match output_type {
        OutputType::P2pkh | OutputType::P2sh | OutputType::P2wpkh => HASH160_LEN,
        OutputType::P2wsh => SHA256_LEN,
        OutputType::P2tr if taproot_support => SHA256_LEN,
        OutputType::P2tr | OutputType::Unknown => return Err(Error::InvalidInput),
    };
    if payload.len() != expected_len {
        return Err(Error::InvalidInput);
    }

    let mut w = ScriptWriter::new(out);

    match output_type {
        OutputType::P2pkh => {
            w.op(OP_DUP)?;
            w.op(OP_HASH160)?;
            w.push(payload)?;
            w.op(OP_EQUALVERIFY)?;
            w.op(OP_CHECKSIG)?;
        }
        OutputType::P2sh => {
            w.op(OP_HASH160)?;
            w.push(payload)?;
            w.op(OP_EQUAL)?;
        }
        OutputType::P2wpkh | OutputType::P2wsh => {
            w.op(OP_0)?;
            w.push(payload)?;
        }
        OutputType::P2tr => {
            w.op(OP_1)?;
            w.push(payload)?;
        }
        OutputType::Unknown => return Err(Error::InvalidInput),
    }

    Ok(w.len())
}

/// Output type a script configuration's payload is placed in
pub fn output_type_for(config: &ScriptConfig) -> OutputType {
    match config {
        ScriptConfig::Simple(SimpleType::P2pkh) => OutputType::P2pkh,
        ScriptConfig::Simple(SimpleType::P2wpkhP2sh) => OutputType::P2sh,
        ScriptConfig::Simple(SimpleType::P2wpkh) => OutputType::P2wpkh,
        ScriptConfig::Simple(SimpleType::P2tr) => OutputType::P2tr,
        ScriptConfig::Multisig(_, MultisigScriptType::P2wsh) => OutputType::P2wsh,
        ScriptConfig::Multisig(_, MultisigScriptType::P2wshP2sh) => OutputType::P2sh,
    }
}

/// Check an address-level keypath is `purpose' / coin' / account' / change / address`
/// for the provided script type and coin
fn check_keypath(params: &Params, keypath: &[u32], script_type: SimpleType) -> Result<(), Error> {
    match keypath {
        [p, c, a, change, address]
            if *p == purpose(script_type)
                && *c == params.bip44_coin
                && *a >= HARDENED
                && *change < HARDENED
                && *address < HARDENED =>
        {
            Ok(())
        }
        _ => {
            #[cfg(feature = "log")]
            log::warn!("invalid {} keypath: {:08x?}", script_type, keypath);

            Err(Error::InvalidInput)
        }
    }
}

/// Derive the payload for a single-key script type at the provided (address-level) keypath
#[cfg_attr(feature = "noinline", inline(never))]
pub fn payload_at_keypath<DRV: Driver>(
    drv: &DRV,
    params: &Params,
    keypath: &[u32],
    script_type: SimpleType,
) -> Result<Payload, Error> {
    check_keypath(params, keypath, script_type)?;

    match script_type {
        SimpleType::P2pkh | SimpleType::P2wpkh => {
            to_payload(&drv.secp256k1_pubkey_hash160(keypath)?)
        }
        SimpleType::P2wpkhP2sh => {
            // p2sh envelope of the p2wpkh witness program
            let pubkey_hash = drv.secp256k1_pubkey_hash160(keypath)?;

            let mut redeem_script = [0u8; 22];
            let n = pkscript_from_payload(
                params.taproot_support,
                OutputType::P2wpkh,
                &pubkey_hash,
                &mut redeem_script,
            )?;

            to_payload(&hash160(&redeem_script[..n]))
        }
        SimpleType::P2tr => {
            if !params.taproot_support {
                return Err(Error::InvalidInput);
            }

            let pubkey = drv.secp256k1_pubkey_compressed(keypath)?;
            to_payload(&taproot_output_key(&pubkey)?)
        }
    }
}

/// Compute the BIP86 taproot output key (key-path spend only, no script tree)
/// for a compressed internal public key
pub fn taproot_output_key(pubkey: &[u8; 33]) -> Result<[u8; 32], Error> {
    let secp = Secp256k1::verification_only();

    let pubkey = PublicKey::from_slice(pubkey).map_err(|_| Error::Unknown)?;
    let (internal_key, _parity) = pubkey.x_only_public_key();

    let tweak = tagged_hash("TapTweak", &internal_key.serialize());
    let tweak = Scalar::from_be_bytes(tweak).map_err(|_| Error::Unknown)?;

    let (output_key, _parity) = internal_key
        .add_tweak(&secp, &tweak)
        .map_err(|_| Error::Unknown)?;

    Ok(output_key.serialize())
}

/// Build the sighash script for a single-key input, the p2pkh script over
/// the input's public key hash
pub fn sighash_script_from_pubkeyhash(
    pubkey_hash: &[u8; HASH160_LEN],
) -> Result<SighashScript, Error> {
    let mut script = [0u8; P2PKH_SCRIPT_LEN];
    let n = pkscript_from_payload(false, OutputType::P2pkh, pubkey_hash, &mut script)?;

    Vec::from_slice(&script[..n]).map_err(|_| Error::Unknown)
}

/// Compact-size encoded length of `v`
pub const fn compact_size_len(v: u64) -> usize {
    match v {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Write a bitcoin compact-size integer, returning the number of bytes written
pub fn write_compact_size(v: u64, out: &mut [u8]) -> Result<usize, Error> {
    let n = compact_size_len(v);
    if out.len() < n {
        return Err(Error::Unknown);
    }

    match n {
        1 => out[0] = v as u8,
        3 => {
            out[0] = 0xfd;
            LittleEndian::write_u16(&mut out[1..], v as u16);
        }
        5 => {
            out[0] = 0xfe;
            LittleEndian::write_u32(&mut out[1..], v as u32);
        }
        _ => {
            out[0] = 0xff;
            LittleEndian::write_u64(&mut out[1..], v);
        }
    }

    Ok(n)
}

pub(crate) fn to_payload(b: &[u8]) -> Result<Payload, Error> {
    Vec::from_slice(b).map_err(|_| Error::Unknown)
}
