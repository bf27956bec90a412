// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Script configuration validation, applied before a signing session
//! accepts any configuration and on each per-address query.

use crate::{
    apdu::types::{
        MultisigConfig, MultisigScriptType, ScriptConfig, ScriptConfigWithKeypath, SimpleType,
        HARDENED, MAX_SCRIPT_CONFIGS,
    },
    engine::{Driver, Error},
    multisig::check_bounds,
    params::Params,
    xpub::XPub,
};

/// BIP44 purpose for p2pkh
pub const PURPOSE_P2PKH: u32 = 44 + HARDENED;
/// BIP49 purpose for p2wpkh-p2sh
pub const PURPOSE_P2WPKH_P2SH: u32 = 49 + HARDENED;
/// BIP84 purpose for p2wpkh
pub const PURPOSE_P2WPKH: u32 = 84 + HARDENED;
/// BIP86 purpose for p2tr
pub const PURPOSE_P2TR: u32 = 86 + HARDENED;
/// BIP48 purpose for multisig
pub const PURPOSE_MULTISIG: u32 = 48 + HARDENED;

/// BIP48 script type element for p2wsh
pub const MULTISIG_SCRIPT_P2WSH: u32 = 2 + HARDENED;
/// BIP48 script type element for p2wsh-p2sh
pub const MULTISIG_SCRIPT_P2WSH_P2SH: u32 = 1 + HARDENED;

/// Highest accepted account index (unhardened)
pub const MAX_ACCOUNT: u32 = 99;

/// Address indices must be below this value
pub const MAX_ADDRESS_INDEX: u32 = 10_000;

/// BIP44-style purpose element for a single-key script type
pub fn purpose(script_type: SimpleType) -> u32 {
    match script_type {
        SimpleType::P2pkh => PURPOSE_P2PKH,
        SimpleType::P2wpkhP2sh => PURPOSE_P2WPKH_P2SH,
        SimpleType::P2wpkh => PURPOSE_P2WPKH,
        SimpleType::P2tr => PURPOSE_P2TR,
    }
}

/// Validate a set of script configurations for a signing session
#[cfg_attr(feature = "noinline", inline(never))]
pub fn validate_init<DRV: Driver>(
    drv: &DRV,
    params: &Params,
    configs: &[ScriptConfigWithKeypath],
) -> Result<(), Error> {
    if configs.is_empty() || configs.len() > MAX_SCRIPT_CONFIGS {
        return Err(Error::InvalidInput);
    }

    for (i, c) in configs.iter().enumerate() {
        match &c.config {
            ScriptConfig::Simple(t) => validate_simple(params, *t, &c.keypath)?,
            ScriptConfig::Multisig(m, t) => {
                // Multisig policies are not mixed with other configurations
                if configs.len() != 1 {
                    return Err(Error::InvalidInput);
                }
                validate_multisig(drv, params, m, *t, &c.keypath)?;
            }
        }

        // Simple configurations share an account and are distinct
        for other in &configs[..i] {
            if other == c || other.keypath.get(2) != c.keypath.get(2) {
                return Err(Error::InvalidInput);
            }
        }
    }

    Ok(())
}

/// Validate a single-key configuration with its account-level keypath prefix
/// (`purpose' / coin' / account'`)
pub fn validate_simple(
    params: &Params,
    script_type: SimpleType,
    keypath: &[u32],
) -> Result<(), Error> {
    if script_type == SimpleType::P2tr && !params.taproot_support {
        return Err(Error::InvalidInput);
    }

    match keypath {
        [p, c, a] if *p == purpose(script_type) && *c == params.bip44_coin && is_account(*a) => {
            Ok(())
        }
        _ => Err(Error::InvalidInput),
    }
}

/// Validate a multisig configuration with its account-level keypath prefix
/// (`48' / coin' / account' / script_type'`)
pub fn validate_multisig<DRV: Driver>(
    drv: &DRV,
    params: &Params,
    multisig: &MultisigConfig,
    script_type: MultisigScriptType,
    keypath: &[u32],
) -> Result<(), Error> {
    check_bounds(multisig)?;

    let expected_script = match script_type {
        MultisigScriptType::P2wsh => MULTISIG_SCRIPT_P2WSH,
        MultisigScriptType::P2wshP2sh => MULTISIG_SCRIPT_P2WSH_P2SH,
    };

    match keypath {
        [p, c, a, s]
            if *p == PURPOSE_MULTISIG
                && *c == params.bip44_coin
                && is_account(*a)
                && *s == expected_script => {}
        _ => return Err(Error::InvalidInput),
    }

    let our_index = multisig.our_xpub_index as usize;
    if our_index >= multisig.signer_count() {
        return Err(Error::InvalidInput);
    }

    // Parse all signers, rejecting duplicate keys
    for (i, x) in multisig.xpubs.iter().enumerate() {
        let a = XPub::parse(x)?;

        for y in &multisig.xpubs[..i] {
            if a.same_key(&XPub::parse(y)?) {
                return Err(Error::InvalidInput);
            }
        }
    }

    // Our signer must be the device's own account xpub
    let ours = drv.xpub(keypath).map_err(|_e| {
        #[cfg(feature = "log")]
        log::warn!("failed to fetch account xpub: {:?}", _e);

        Error::InvalidInput
    })?;
    let ours = XPub::parse(&ours)?;
    let claimed = XPub::parse(&multisig.xpubs[our_index])?;
    if !ours.same_key(&claimed) {
        #[cfg(feature = "log")]
        log::warn!("multisig config does not include our xpub at index {}", our_index);

        return Err(Error::InvalidInput);
    }

    Ok(())
}

/// Check an address-level keypath against a configuration prefix,
/// returning the `(change, address)` elements
pub fn check_address_keypath(
    config: &ScriptConfigWithKeypath,
    keypath: &[u32],
) -> Result<(u32, u32), Error> {
    let prefix = &config.keypath[..];

    if keypath.len() != prefix.len() + 2 || !keypath.starts_with(prefix) {
        return Err(Error::InvalidInput);
    }

    let change = keypath[prefix.len()];
    let address = keypath[prefix.len() + 1];

    if change > 1 || address >= MAX_ADDRESS_INDEX {
        return Err(Error::InvalidInput);
    }

    Ok((change, address))
}

fn is_account(a: u32) -> bool {
    (HARDENED..=HARDENED + MAX_ACCOUNT).contains(&a)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        apdu::types::{BtcCoin, SerializedXpub, XPUB_LEN},
        params,
    };

    /// Keystore stub, simple configurations never reach the keystore
    struct NoKeys;

    impl Driver for NoKeys {
        fn secp256k1_pubkey_compressed(&self, _keypath: &[u32]) -> Result<[u8; 33], Error> {
            Err(Error::Unknown)
        }

        fn xpub(&self, _keypath: &[u32]) -> Result<SerializedXpub, Error> {
            Err(Error::Unknown)
        }
    }

    fn simple(t: SimpleType, keypath: &[u32]) -> ScriptConfigWithKeypath {
        ScriptConfigWithKeypath::new(ScriptConfig::Simple(t), keypath).unwrap()
    }

    const H: u32 = HARDENED;

    #[test]
    fn simple_configs() {
        let btc = params::get(BtcCoin::Btc);

        let ok: &[&[ScriptConfigWithKeypath]] = &[
            &[simple(SimpleType::P2wpkh, &[84 + H, H, H])],
            &[simple(SimpleType::P2wpkhP2sh, &[49 + H, H, 5 + H])],
            &[simple(SimpleType::P2pkh, &[44 + H, H, 99 + H])],
            &[
                simple(SimpleType::P2wpkh, &[84 + H, H, 3 + H]),
                simple(SimpleType::P2tr, &[86 + H, H, 3 + H]),
            ],
        ];
        for c in ok {
            assert_eq!(validate_init(&NoKeys, btc, c), Ok(()), "{c:?}");
        }

        let invalid: &[&[ScriptConfigWithKeypath]] = &[
            // Empty
            &[],
            // Purpose mismatch
            &[simple(SimpleType::P2wpkh, &[49 + H, H, H])],
            // Coin mismatch
            &[simple(SimpleType::P2wpkh, &[84 + H, 1 + H, H])],
            // Account out of range / unhardened
            &[simple(SimpleType::P2wpkh, &[84 + H, H, 100 + H])],
            &[simple(SimpleType::P2wpkh, &[84 + H, H, 0])],
            // Address-level keypath
            &[simple(SimpleType::P2wpkh, &[84 + H, H, H, 0, 0])],
            // Mismatched accounts
            &[
                simple(SimpleType::P2wpkh, &[84 + H, H, H]),
                simple(SimpleType::P2tr, &[86 + H, H, 1 + H]),
            ],
            // Duplicates
            &[
                simple(SimpleType::P2wpkh, &[84 + H, H, H]),
                simple(SimpleType::P2wpkh, &[84 + H, H, H]),
            ],
            // Too many
            &[
                simple(SimpleType::P2wpkh, &[84 + H, H, H]),
                simple(SimpleType::P2tr, &[86 + H, H, H]),
                simple(SimpleType::P2pkh, &[44 + H, H, H]),
            ],
        ];
        for c in invalid {
            assert_eq!(
                validate_init(&NoKeys, btc, c),
                Err(Error::InvalidInput),
                "{c:?}"
            );
        }
    }

    #[test]
    fn multisig_without_keystore() {
        // BIP32 test vector 1, m/0' and m/0'/1
        let mut x = [[0u8; XPUB_LEN]; 2];
        hex::decode_to_slice("0488b21e013442193e8000000047fdacbd0f1097043b78c63c20c34ef4ed9a111d980047ad16282c7ae6236141035a784662a4a20a65bf6aab9ae98a6c068a81c52e4b032c0fb5400c706cfccc56", &mut x[0]).unwrap();
        hex::decode_to_slice("0488b21e025c1bd648000000012a7857631386ba23dacac34180dd1983734e444fdbf774041578e9b6adb37c1903501e454bf00751f24b1b489aa925215d66af2234e3891c3b21a52bedb3cd711c", &mut x[1]).unwrap();

        let m = MultisigConfig::new(2, 0, &x).unwrap();
        let c = ScriptConfigWithKeypath::new(
            ScriptConfig::Multisig(m, MultisigScriptType::P2wsh),
            &[48 + H, H, H, 2 + H],
        )
        .unwrap();

        // Keystore failures reject the configuration
        assert_eq!(
            validate_init(&NoKeys, params::get(BtcCoin::Btc), &[c]),
            Err(Error::InvalidInput)
        );
    }

    #[test]
    fn taproot_requires_support() {
        let c = [simple(SimpleType::P2tr, &[86 + H, 2 + H, H])];

        assert_eq!(
            validate_init(&NoKeys, params::get(BtcCoin::Ltc), &c),
            Err(Error::InvalidInput)
        );
    }

    #[test]
    fn address_keypath() {
        let c = simple(SimpleType::P2wpkh, &[84 + H, H, H]);

        assert_eq!(check_address_keypath(&c, &[84 + H, H, H, 1, 9999]), Ok((1, 9999)));

        let invalid: [&[u32]; 6] = [
            &[84 + H, H, H, 2, 0],
            &[84 + H, H, H, 0, 10_000],
            &[84 + H, H, 1 + H, 0, 0],
            &[84 + H, H, H, 0],
            &[84 + H, H, H, 0, 0, 0],
            &[],
        ];
        for k in invalid {
            assert_eq!(check_address_keypath(&c, k), Err(Error::InvalidInput), "{k:?}");
        }
    }
}
