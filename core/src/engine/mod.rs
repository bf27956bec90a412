// Copyright (c) 2022-2023 The MobileCoin Foundation

//! The [Engine] provides the Bitcoin signing session functionality required by hardware wallets.
//!
//! This handles [Event] inputs and returns [Output] responses to the caller,
//! see [apdu][crate::apdu] for APDU protocol / encoding definitions.
//!
//! Every session operation that fails resets the session before returning,
//! so an error always leaves the engine [`Idle`][SessionState::Idle].

use encdec::Encode;

use crate::{
    apdu::{
        result::{ResultCode, ResultResp, SessionState},
        types::{BtcCoin, ScriptConfig, ScriptConfigWithKeypath, SerializedXpub, SimpleType},
        ApduError,
    },
    helpers::hash160,
    multisig::{payload_from_multisig, sighash_script_from_multisig},
    params,
    script::{payload_at_keypath, sighash_script_from_pubkeyhash, Payload, SighashScript},
    validate::{check_address_keypath, validate_init},
};

mod event;
pub use event::Event;

mod output;
pub use output::Output;

mod error;
pub use error::Error;

mod session;
use session::{ResetOnError, Session};

/// [`Driver`] trait provides keystore support for [`Engine`] instances
pub trait Driver {
    /// Compressed secp256k1 public key at the provided keypath
    fn secp256k1_pubkey_compressed(&self, keypath: &[u32]) -> Result<[u8; 33], Error>;

    /// HASH160 of the compressed secp256k1 public key at the provided keypath
    fn secp256k1_pubkey_hash160(&self, keypath: &[u32]) -> Result<[u8; 20], Error> {
        let pubkey = self.secp256k1_pubkey_compressed(keypath)?;
        Ok(hash160(&pubkey))
    }

    /// Serialized extended public key at the provided keypath
    fn xpub(&self, keypath: &[u32]) -> Result<SerializedXpub, Error>;
}

impl<T: Driver> Driver for &mut T {
    fn secp256k1_pubkey_compressed(&self, keypath: &[u32]) -> Result<[u8; 33], Error> {
        T::secp256k1_pubkey_compressed(self, keypath)
    }

    fn secp256k1_pubkey_hash160(&self, keypath: &[u32]) -> Result<[u8; 20], Error> {
        T::secp256k1_pubkey_hash160(self, keypath)
    }

    fn xpub(&self, keypath: &[u32]) -> Result<SerializedXpub, Error> {
        T::xpub(self, keypath)
    }
}

/// [Engine] provides hardware-independent support for Bitcoin signing sessions
pub struct Engine<DRV: Driver> {
    session: Session,
    drv: DRV,
}

impl<DRV: Driver> Engine<DRV> {
    /// Create a new engine instance with the provided driver
    pub const fn new(drv: DRV) -> Self {
        Self {
            session: Session::new(),
            drv,
        }
    }

    /// Fetch current session state
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Fetch the coin for the active session
    pub fn coin(&self) -> Option<BtcCoin> {
        self.session.coin()
    }

    /// Fetch script configurations accepted for the active session
    pub fn configs(&self) -> &[ScriptConfigWithKeypath] {
        self.session.configs()
    }

    /// Handle incoming session events
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn update(&mut self, evt: &Event) -> Result<Output, Error> {
        #[cfg(feature = "log")]
        log::debug!("event: {:02x?}", evt);

        match evt {
            Event::SignInit { coin, configs } => self.init(*coin, configs)?,
            Event::SighashScript {
                script_config_index,
                keypath,
            } => {
                return self
                    .sighash_script(keypath, *script_config_index)
                    .map(Output::SighashScript);
            }
            Event::PayloadAtChange {
                script_config_index,
                is_own_output,
                keypath,
            } => {
                return self
                    .payload_at_change(keypath, *script_config_index, *is_own_output)
                    .map(Output::Payload);
            }
            Event::Reset => self.reset(),
        }

        Ok(Output::State {
            state: self.state(),
        })
    }

    /// Decode and handle an incoming request APDU, writing the response APDU to `resp`.
    ///
    /// Failures are encoded as a [`ResultResp`] carrying the error code,
    /// request decoding failures reset the session and report [`ResultCode::Unknown`].
    /// Response encoding failures also reset the session before the error is returned.
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn handle(&mut self, ins: u8, req: &[u8], resp: &mut [u8]) -> Result<usize, ApduError> {
        let r = match Event::parse(ins, req) {
            Ok(evt) => self.update(&evt),
            Err(_e) => {
                #[cfg(feature = "log")]
                log::error!("failed to decode request (ins: {:02x}): {:?}", ins, _e);

                self.reset();
                Err(Error::from(_e))
            }
        };

        let n = match r {
            Ok(o) => o.encode(resp),
            Err(e) => ResultResp::new(ResultCode::from(e), self.state()).encode(resp),
        };

        // Responses that can not be returned end the session
        if let Err(_e) = &n {
            #[cfg(feature = "log")]
            log::error!("failed to encode response (ins: {:02x}): {:?}", ins, _e);

            self.reset();
        }

        n
    }

    /// Start a signing session, validating and storing the provided configurations.
    ///
    /// Any existing session is replaced, on failure the engine is left idle.
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn init(&mut self, coin: BtcCoin, configs: &[ScriptConfigWithKeypath]) -> Result<(), Error> {
        let mut guard = ResetOnError::new(&mut self.session);

        let r = validate_init(&self.drv, params::get(coin), configs)
            .and_then(|_| guard.session().start(coin, configs));

        #[cfg(feature = "log")]
        match &r {
            Ok(_) => log::debug!("started {} session with {} configs", coin, configs.len()),
            Err(e) => log::warn!("rejected {} session init: {:?}", coin, e),
        }

        guard.finish(r)
    }

    /// Build the sighash script (BIP143 scriptCode) for an input at `keypath`
    /// using the configuration at `script_config_index`
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn sighash_script(
        &mut self,
        keypath: &[u32],
        script_config_index: u32,
    ) -> Result<SighashScript, Error> {
        let mut guard = ResetOnError::new(&mut self.session);
        let r = sighash_script(&self.drv, guard.session(), keypath, script_config_index);
        guard.finish(r)
    }

    /// Derive the payload for a change output at `keypath` using the
    /// configuration at `script_config_index`, used by the caller to
    /// verify the output belongs to the wallet
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn payload_at_change(
        &mut self,
        keypath: &[u32],
        script_config_index: u32,
        is_own_output: bool,
    ) -> Result<Payload, Error> {
        let mut guard = ResetOnError::new(&mut self.session);
        let r = payload_at_change(
            &self.drv,
            guard.session(),
            keypath,
            script_config_index,
            is_own_output,
        );
        guard.finish(r)
    }

    /// Reset the signing session, zeroing all session state
    pub fn reset(&mut self) {
        #[cfg(feature = "log")]
        log::debug!("reset signing session");

        self.session.clear();
    }
}

fn sighash_script<DRV: Driver>(
    drv: &DRV,
    session: &Session,
    keypath: &[u32],
    script_config_index: u32,
) -> Result<SighashScript, Error> {
    let (_params, c) = session.config(script_config_index)?;
    let (change, address) = check_address_keypath(c, keypath)?;

    match &c.config {
        // Taproot inputs have no scriptCode
        ScriptConfig::Simple(SimpleType::P2tr) => Err(Error::InvalidInput),
        ScriptConfig::Simple(_) => {
            let pubkey_hash = drv.secp256k1_pubkey_hash160(keypath)?;
            sighash_script_from_pubkeyhash(&pubkey_hash)
        }
        ScriptConfig::Multisig(m, _) => sighash_script_from_multisig(m, change, address),
    }
}

fn payload_at_change<DRV: Driver>(
    drv: &DRV,
    session: &Session,
    keypath: &[u32],
    script_config_index: u32,
    is_own_output: bool,
) -> Result<Payload, Error> {
    if !is_own_output {
        return Err(Error::Unknown);
    }

    let (params, c) = session.config(script_config_index)?;
    let (change, address) = check_address_keypath(c, keypath)?;

    match &c.config {
        ScriptConfig::Simple(t) => payload_at_keypath(drv, params, keypath, *t),
        ScriptConfig::Multisig(m, t) => payload_from_multisig(m, *t, change, address),
    }
}
