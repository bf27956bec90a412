// Copyright (c) 2022-2023 The MobileCoin Foundation

//! BIP32 serialized extended public keys and non-hardened public derivation

use byteorder::{BigEndian, ByteOrder};
use secp256k1::{PublicKey, Scalar, Secp256k1};
use zeroize::Zeroizing;

use crate::{
    apdu::types::{SerializedXpub, HARDENED, XPUB_LEN},
    engine::Error,
    helpers::{hash160, hmac_sha512},
};

/// Mainnet `xpub` version bytes
pub const VERSION_XPUB: [u8; 4] = [0x04, 0x88, 0xb2, 0x1e];

/// Testnet `tpub` version bytes
pub const VERSION_TPUB: [u8; 4] = [0x04, 0x35, 0x87, 0xcf];

/// Parsed BIP32 extended public key
#[derive(Clone, PartialEq, Debug)]
pub struct XPub {
    pub version: [u8; 4],
    pub depth: u8,
    pub parent_fingerprint: [u8; 4],
    pub child_number: u32,
    pub chain_code: [u8; 32],
    pub public_key: PublicKey,
}

impl XPub {
    /// Parse an [`XPub`] from its 78 byte serialized form
    ///
    /// ```text
    /// version[4] | depth[1] | parent_fingerprint[4] | child_number[4] | chain_code[32] | pubkey[33]
    /// ```
    pub fn parse(b: &SerializedXpub) -> Result<Self, Error> {
        let mut version = [0u8; 4];
        version.copy_from_slice(&b[0..4]);
        if version != VERSION_XPUB && version != VERSION_TPUB {
            return Err(Error::InvalidInput);
        }

        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&b[5..9]);

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&b[13..45]);

        let public_key = PublicKey::from_slice(&b[45..78]).map_err(|_| Error::InvalidInput)?;

        Ok(Self {
            version,
            depth: b[4],
            parent_fingerprint,
            child_number: BigEndian::read_u32(&b[9..13]),
            chain_code,
            public_key,
        })
    }

    /// Serialize an [`XPub`] to its 78 byte form
    pub fn serialize(&self) -> SerializedXpub {
        let mut b = [0u8; XPUB_LEN];

        b[0..4].copy_from_slice(&self.version);
        b[4] = self.depth;
        b[5..9].copy_from_slice(&self.parent_fingerprint);
        BigEndian::write_u32(&mut b[9..13], self.child_number);
        b[13..45].copy_from_slice(&self.chain_code);
        b[45..78].copy_from_slice(&self.public_key.serialize());

        b
    }

    /// Compressed public key
    pub fn public_key(&self) -> [u8; 33] {
        self.public_key.serialize()
    }

    /// Non-hardened BIP32 child derivation (CKDpub)
    pub fn derive_child(&self, index: u32) -> Result<Self, Error> {
        if index >= HARDENED {
            return Err(Error::InvalidInput);
        }

        let secp = Secp256k1::verification_only();
        let parent_key = self.public_key.serialize();

        let i = Zeroizing::new(hmac_sha512(
            &self.chain_code,
            &[&parent_key[..], &index.to_be_bytes()[..]],
        ));

        let mut tweak = [0u8; 32];
        tweak.copy_from_slice(&i[..32]);
        let tweak = Scalar::from_be_bytes(tweak).map_err(|_| Error::Unknown)?;

        let public_key = self
            .public_key
            .add_exp_tweak(&secp, &tweak)
            .map_err(|_| Error::Unknown)?;

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);

        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&hash160(&parent_key)[..4]);

        Ok(Self {
            version: self.version,
            depth: self.depth.checked_add(1).ok_or(Error::InvalidInput)?,
            parent_fingerprint,
            child_number: index,
            chain_code,
            public_key,
        })
    }

    /// Derive a child along a sequence of non-hardened indices
    pub fn derive(&self, path: &[u32]) -> Result<Self, Error> {
        let mut k = self.clone();
        for i in path {
            k = k.derive_child(*i)?;
        }
        Ok(k)
    }

    /// Compare the key material of two extended public keys, ignoring the version bytes
    pub fn same_key(&self, other: &Self) -> bool {
        self.depth == other.depth
            && self.parent_fingerprint == other.parent_fingerprint
            && self.child_number == other.child_number
            && self.chain_code == other.chain_code
            && self.public_key == other.public_key
    }
}
