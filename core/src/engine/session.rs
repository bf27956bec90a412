// Copyright (c) 2022-2023 The MobileCoin Foundation

use heapless::Vec;
use zeroize::Zeroize;

use crate::{
    apdu::{
        result::SessionState,
        types::{zeroize_vec, BtcCoin, ScriptConfigWithKeypath, MAX_SCRIPT_CONFIGS},
    },
    params::{self, Params},
};

use super::Error;

/// Signing session context, holds the script configurations accepted
/// for the current signing attempt
pub struct Session {
    state: SessionState,
    coin: Option<BtcCoin>,
    configs: Vec<ScriptConfigWithKeypath, MAX_SCRIPT_CONFIGS>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a new (idle) session
    pub const fn new() -> Self {
        Self {
            state: SessionState::Idle,
            coin: None,
            configs: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn coin(&self) -> Option<BtcCoin> {
        self.coin
    }

    pub fn configs(&self) -> &[ScriptConfigWithKeypath] {
        &self.configs
    }

    /// Start a session with (already validated) configurations,
    /// replacing any existing session
    pub fn start(&mut self, coin: BtcCoin, configs: &[ScriptConfigWithKeypath]) -> Result<(), Error> {
        self.clear();

        for c in configs {
            self.configs
                .push(c.clone())
                .map_err(|_| Error::InvalidInput)?;
        }

        self.coin = Some(coin);
        self.state = SessionState::Active;

        Ok(())
    }

    /// Fetch coin parameters and the configuration at `index` for an active session
    pub fn config(&self, index: u32) -> Result<(&'static Params, &ScriptConfigWithKeypath), Error> {
        let coin = match (self.state, self.coin) {
            (SessionState::Active, Some(c)) => c,
            _ => return Err(Error::InvalidInput),
        };

        let c = self
            .configs
            .get(index as usize)
            .ok_or(Error::InvalidInput)?;

        Ok((params::get(coin), c))
    }

    /// Zero all session state
    pub fn clear(&mut self) {
        self.zeroize();
    }
}

impl Zeroize for Session {
    fn zeroize(&mut self) {
        zeroize_vec(&mut self.configs);
        self.coin = None;
        self.state = SessionState::Idle;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Guard resetting the session when dropped, unless the guarded operation
/// completed successfully via [`ResetOnError::finish`]
pub(crate) struct ResetOnError<'a> {
    session: &'a mut Session,
    armed: bool,
}

impl<'a> ResetOnError<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self {
            session,
            armed: true,
        }
    }

    pub fn session(&mut self) -> &mut Session {
        self.session
    }

    /// Disarm the guard if `r` is a success, returning `r`
    pub fn finish<T>(mut self, r: Result<T, Error>) -> Result<T, Error> {
        if r.is_ok() {
            self.armed = false;
        }
        r
    }
}

impl<'a> Drop for ResetOnError<'a> {
    fn drop(&mut self) {
        if self.armed {
            #[cfg(feature = "log")]
            log::warn!("resetting signing session on error");

            self.session.clear();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::apdu::types::{ScriptConfig, SimpleType, HARDENED};

    fn configs() -> [ScriptConfigWithKeypath; 1] {
        [ScriptConfigWithKeypath::new(
            ScriptConfig::Simple(SimpleType::P2wpkh),
            &[84 + HARDENED, HARDENED, HARDENED],
        )
        .unwrap()]
    }

    #[test]
    fn start_and_clear() {
        let mut s = Session::new();
        assert_eq!(s.config(0).map(|_| ()), Err(Error::InvalidInput));

        s.start(BtcCoin::Btc, &configs()).unwrap();
        assert_eq!(s.state(), SessionState::Active);
        assert_eq!(s.coin(), Some(BtcCoin::Btc));
        assert!(s.config(0).is_ok());
        assert_eq!(s.config(1).map(|_| ()), Err(Error::InvalidInput));

        s.clear();
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.configs().is_empty());
        assert_eq!(s.config(0).map(|_| ()), Err(Error::InvalidInput));
    }

    #[test]
    fn guard_resets_on_error() {
        let mut s = Session::new();
        s.start(BtcCoin::Btc, &configs()).unwrap();

        let g = ResetOnError::new(&mut s);
        assert_eq!(g.finish::<()>(Err(Error::Unknown)), Err(Error::Unknown));
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.configs().is_empty());
    }

    #[test]
    fn guard_keeps_session_on_success() {
        let mut s = Session::new();
        s.start(BtcCoin::Tbtc, &configs()).unwrap();

        let g = ResetOnError::new(&mut s);
        assert_eq!(g.finish(Ok(1)), Ok(1));
        assert_eq!(s.state(), SessionState::Active);
        assert_eq!(s.configs().len(), 1);
    }
}
