// Copyright (c) 2022-2023 The MobileCoin Foundation

#![allow(unused)]

use core::fmt::Debug;

use bip39::{Language, Mnemonic, Seed};
use bitcoin::{
    bip32::{ChildNumber, DerivationPath, Xpriv, Xpub},
    secp256k1::Secp256k1,
    Network,
};
use encdec::{DecodeOwned, Encode};
use log::{debug, trace};

use hww_btc_core::{
    apdu::prelude::*,
    engine::{Driver, Engine, Error},
};

/// Device mnemonic
pub const MNEMONIC: &str =
    "sudden tenant fault inject concert weather maid people chunk youth stumble grit";

/// Cosigner mnemonics for multisig tests
pub const COSIGNERS: &[&str] = &[
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
    "duck deal pretty pen thunder economy wide common goose fit engine main aisle curtain choose cube claim snake enroll detect brief history float unit",
];

/// Driver implementation for test use
pub struct TestDriver {
    /// BIP39 Mnemonic derived seed
    pub seed: [u8; 64],
}

impl TestDriver {
    pub fn new(seed: Seed) -> Self {
        let mut b = [0u8; 64];
        b.copy_from_slice(seed.as_bytes());
        Self { seed: b }
    }

    /// Create a driver from a mnemonic phrase (empty passphrase)
    pub fn from_mnemonic(phrase: &str) -> anyhow::Result<Self> {
        let m = Mnemonic::from_phrase(phrase, Language::English)?;
        Ok(Self::new(Seed::new(&m, "")))
    }

    /// Derive the extended private key at `keypath`
    pub fn xpriv(&self, keypath: &[u32]) -> Result<Xpriv, Error> {
        let secp = Secp256k1::new();

        let master = Xpriv::new_master(Network::Bitcoin, &self.seed).map_err(|_| Error::Unknown)?;
        let path: Vec<ChildNumber> = keypath.iter().map(|i| ChildNumber::from(*i)).collect();

        master
            .derive_priv(&secp, &DerivationPath::from(path))
            .map_err(|_| Error::Unknown)
    }
}

impl Driver for TestDriver {
    fn secp256k1_pubkey_compressed(&self, keypath: &[u32]) -> Result<[u8; 33], Error> {
        let secp = Secp256k1::new();
        let k = self.xpriv(keypath)?;

        Ok(k.private_key.public_key(&secp).serialize())
    }

    fn xpub(&self, keypath: &[u32]) -> Result<SerializedXpub, Error> {
        let secp = Secp256k1::new();
        let k = self.xpriv(keypath)?;

        Ok(Xpub::from_priv(&secp, &k).encode())
    }
}

/// Setup an engine backed by the device mnemonic
pub fn engine() -> anyhow::Result<Engine<TestDriver>> {
    let _ = simplelog::SimpleLogger::init(log::LevelFilter::Debug, Default::default());

    Ok(Engine::new(TestDriver::from_mnemonic(MNEMONIC)?))
}

/// Account-level xpub for a mnemonic
pub fn account_xpub(phrase: &str, keypath: &[u32]) -> anyhow::Result<SerializedXpub> {
    let d = TestDriver::from_mnemonic(phrase)?;
    d.xpub(keypath).map_err(|e| anyhow::anyhow!("xpub derivation failed: {e:?}"))
}

/// Simple script configuration helper
pub fn simple(t: SimpleType, keypath: &[u32]) -> ScriptConfigWithKeypath {
    ScriptConfigWithKeypath::new(ScriptConfig::Simple(t), keypath).unwrap()
}

/// Encode a request APDU and pass it through [`Engine::handle`],
/// decoding the response as `RESP`
pub fn exchange<REQ, RESP>(e: &mut Engine<TestDriver>, req: &REQ) -> RESP
where
    REQ: Encode<Error = ApduError> + ApduStatic + Debug,
    RESP: DecodeOwned<Output = RESP, Error = ApduError> + Debug,
{
    debug!("cmd: {:?}", req);

    let mut buff = [0u8; 2048];
    let n = req.encode(&mut buff).unwrap();

    trace!("encoded: {:02x?}", &buff[..n]);

    let mut resp = [0u8; 1024];
    let n = e.handle(REQ::INS, &buff[..n], &mut resp).unwrap();

    let (r, _) = RESP::decode_owned(&resp[..n]).unwrap();

    debug!("resp: {:?}", r);

    r
}
