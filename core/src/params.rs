// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Per-coin network parameters

use crate::apdu::types::{BtcCoin, HARDENED};

/// Network parameters for a supported coin
#[derive(Clone, PartialEq, Debug)]
pub struct Params {
    pub coin: BtcCoin,
    /// Hardened BIP44 coin type element
    pub bip44_coin: u32,
    pub base58_version_p2pkh: u8,
    pub base58_version_p2sh: u8,
    pub bech32_hrp: &'static str,
    pub name: &'static str,
    pub unit: &'static str,
    pub taproot_support: bool,
}

const PARAMS_BTC: Params = Params {
    coin: BtcCoin::Btc,
    bip44_coin: HARDENED,
    base58_version_p2pkh: 0x00,
    base58_version_p2sh: 0x05,
    bech32_hrp: "bc",
    name: "Bitcoin",
    unit: "BTC",
    taproot_support: true,
};

const PARAMS_TBTC: Params = Params {
    coin: BtcCoin::Tbtc,
    bip44_coin: 1 + HARDENED,
    base58_version_p2pkh: 0x6f,
    base58_version_p2sh: 0xc4,
    bech32_hrp: "tb",
    name: "BTC Testnet",
    unit: "TBTC",
    taproot_support: true,
};

const PARAMS_RBTC: Params = Params {
    coin: BtcCoin::Rbtc,
    bip44_coin: 1 + HARDENED,
    base58_version_p2pkh: 0x6f,
    base58_version_p2sh: 0xc4,
    bech32_hrp: "bcrt",
    name: "BTC Regtest",
    unit: "RBTC",
    taproot_support: true,
};

const PARAMS_LTC: Params = Params {
    coin: BtcCoin::Ltc,
    bip44_coin: 2 + HARDENED,
    base58_version_p2pkh: 0x30,
    base58_version_p2sh: 0x32,
    bech32_hrp: "ltc",
    name: "Litecoin",
    unit: "LTC",
    taproot_support: false,
};

const PARAMS_TLTC: Params = Params {
    coin: BtcCoin::Tltc,
    bip44_coin: 1 + HARDENED,
    base58_version_p2pkh: 0x6f,
    base58_version_p2sh: 0x3a,
    bech32_hrp: "tltc",
    name: "LTC Testnet",
    unit: "TLTC",
    taproot_support: false,
};

/// Fetch parameters for the provided coin
pub fn get(coin: BtcCoin) -> &'static Params {
    match coin {
        BtcCoin::Btc => &PARAMS_BTC,
        BtcCoin::Tbtc => &PARAMS_TBTC,
        BtcCoin::Rbtc => &PARAMS_RBTC,
        BtcCoin::Ltc => &PARAMS_LTC,
        BtcCoin::Tltc => &PARAMS_TLTC,
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn params_match_coin() {
        for c in BtcCoin::iter() {
            let p = get(c);
            assert_eq!(p.coin, c);
            assert_eq!(p.unit, c.to_string());
            assert!(p.bip44_coin >= HARDENED);
        }
    }

    #[test]
    fn taproot_support() {
        assert!(get(BtcCoin::Btc).taproot_support);
        assert!(get(BtcCoin::Tbtc).taproot_support);
        assert!(get(BtcCoin::Rbtc).taproot_support);
        assert!(!get(BtcCoin::Ltc).taproot_support);
        assert!(!get(BtcCoin::Tltc).taproot_support);
    }
}
