// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Coin, script type and script configuration definitions shared by
//! the engine and the wire encodings.

use heapless::Vec;
use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter, EnumString, EnumVariantNames};
use zeroize::Zeroize;

use crate::ApduError;

/// BIP32 hardened index offset
pub const HARDENED: u32 = 0x8000_0000;

/// Maximum number of elements in a stored keypath
pub const MAX_KEYPATH_LEN: usize = 10;

/// Maximum number of multisig signers (OP_CHECKMULTISIG standardness limit for p2wsh)
pub const MAX_SIGNERS: usize = 15;

/// Maximum number of script configurations accepted per signing session
pub const MAX_SCRIPT_CONFIGS: usize = 2;

/// BIP32 serialized extended public key length
pub const XPUB_LEN: usize = 78;

/// Maximum pk script size, enough for an m-of-15 multisig with headroom up to m-of-20
pub const MAX_PK_SCRIPT_SIZE: usize = 700;

/// Maximum size of a bitcoin compact-size integer
/// (see <https://en.bitcoin.it/wiki/Protocol_documentation#Variable_length_integer>)
pub const MAX_VARINT_SIZE: usize = 9;

/// Maximum size of a sighash script (length-prefixed pk script)
pub const MAX_SIGHASH_SCRIPT_SIZE: usize = MAX_PK_SCRIPT_SIZE + MAX_VARINT_SIZE;

/// Maximum payload size (sha256 / taproot output key)
pub const MAX_PAYLOAD_SIZE: usize = 32;

/// BIP32 keypath with bounded length
pub type Keypath = Vec<u32, MAX_KEYPATH_LEN>;

/// BIP32 serialized extended public key
pub type SerializedXpub = [u8; XPUB_LEN];

/// Supported coins
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Debug,
    Display,
    EnumString,
    EnumVariantNames,
    EnumIter,
    TryFromPrimitive,
)]
#[strum(serialize_all = "UPPERCASE")]
#[repr(u8)]
pub enum BtcCoin {
    Btc = 0x00,
    Tbtc = 0x01,
    Ltc = 0x02,
    Tltc = 0x03,
    Rbtc = 0x04,
}

/// Single-key script types
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Debug,
    Display,
    EnumString,
    EnumVariantNames,
    EnumIter,
    TryFromPrimitive,
)]
#[strum(serialize_all = "kebab-case")]
#[repr(u8)]
pub enum SimpleType {
    /// Segwit v0 key hash wrapped in p2sh
    P2wpkhP2sh = 0x00,
    /// Native segwit v0 key hash
    P2wpkh = 0x01,
    /// Taproot, key-path spend only (BIP86)
    P2tr = 0x02,
    /// Legacy key hash
    P2pkh = 0x03,
}

/// Multisig script types
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Debug,
    Display,
    EnumString,
    EnumVariantNames,
    EnumIter,
    TryFromPrimitive,
)]
#[strum(serialize_all = "kebab-case")]
#[repr(u8)]
pub enum MultisigScriptType {
    /// Native segwit v0 script hash
    P2wsh = 0x00,
    /// Segwit v0 script hash wrapped in p2sh
    P2wshP2sh = 0x01,
}

/// Output (pk script) types
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Debug,
    Display,
    EnumString,
    EnumVariantNames,
    EnumIter,
    TryFromPrimitive,
)]
#[strum(serialize_all = "kebab-case")]
#[repr(u8)]
pub enum OutputType {
    Unknown = 0x00,
    P2pkh = 0x01,
    P2sh = 0x02,
    P2wpkh = 0x03,
    P2wsh = 0x04,
    P2tr = 0x05,
}

/// n-of-m multisig configuration.
///
/// `xpubs` are account-level extended public keys in signer order, this
/// order is part of the policy and is never sorted.
#[derive(Clone, PartialEq, Debug)]
pub struct MultisigConfig {
    /// Number of signatures required
    pub threshold: u32,
    /// Account-level xpubs of all signers
    pub xpubs: Vec<SerializedXpub, MAX_SIGNERS>,
    /// Index of the device's own xpub in `xpubs`
    pub our_xpub_index: u32,
}

impl MultisigConfig {
    /// Create a new multisig configuration
    pub fn new(
        threshold: u32,
        our_xpub_index: u32,
        xpubs: &[SerializedXpub],
    ) -> Result<Self, ApduError> {
        let xpubs = Vec::from_slice(xpubs).map_err(|_| ApduError::InvalidLength)?;

        Ok(Self {
            threshold,
            xpubs,
            our_xpub_index,
        })
    }

    /// Number of signers in this configuration
    pub fn signer_count(&self) -> usize {
        self.xpubs.len()
    }
}

impl Zeroize for MultisigConfig {
    fn zeroize(&mut self) {
        self.threshold.zeroize();
        self.our_xpub_index.zeroize();
        zeroize_vec(&mut self.xpubs);
    }
}

/// Script configuration, either a single-key script type or a multisig policy
#[derive(Clone, PartialEq, Debug)]
pub enum ScriptConfig {
    Simple(SimpleType),
    Multisig(MultisigConfig, MultisigScriptType),
}

impl Zeroize for ScriptConfig {
    fn zeroize(&mut self) {
        if let ScriptConfig::Multisig(multisig, _) = self {
            multisig.zeroize();
        }
        *self = ScriptConfig::Simple(SimpleType::P2wpkhP2sh);
    }
}

/// Script configuration with the account-level keypath prefix
/// that inputs and change outputs referencing it must match
#[derive(Clone, PartialEq, Debug)]
pub struct ScriptConfigWithKeypath {
    pub config: ScriptConfig,
    pub keypath: Keypath,
}

impl ScriptConfigWithKeypath {
    /// Create a new script configuration with keypath prefix
    pub fn new(config: ScriptConfig, keypath: &[u32]) -> Result<Self, ApduError> {
        let keypath = Vec::from_slice(keypath).map_err(|_| ApduError::InvalidLength)?;
        Ok(Self { config, keypath })
    }
}

impl Zeroize for ScriptConfigWithKeypath {
    fn zeroize(&mut self) {
        self.config.zeroize();
        zeroize_vec(&mut self.keypath);
    }
}

/// Overwrite all occupied entries of a [`heapless::Vec`] before truncating it
pub fn zeroize_vec<T: Zeroize, const N: usize>(v: &mut Vec<T, N>) {
    for e in v.iter_mut() {
        e.zeroize();
    }
    v.clear();
}
