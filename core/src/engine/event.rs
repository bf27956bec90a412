// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::DecodeOwned;
use heapless::Vec;

use crate::apdu::{
    prelude::*,
    types::{Keypath, MAX_SCRIPT_CONFIGS},
};

/// [`Engine`][super::Engine] input events, typically decoded from request [APDUs][crate::apdu]
#[derive(Clone, PartialEq, Debug)]
pub enum Event {
    /// Start a signing session with the provided script configurations
    SignInit {
        coin: BtcCoin,
        configs: Vec<ScriptConfigWithKeypath, MAX_SCRIPT_CONFIGS>,
    },

    /// Fetch the sighash script for a transaction input
    SighashScript {
        script_config_index: u32,
        keypath: Keypath,
    },

    /// Fetch the payload for a change output
    PayloadAtChange {
        script_config_index: u32,
        is_own_output: bool,
        keypath: Keypath,
    },

    /// Reset the signing session
    Reset,
}

/// Helper for decoding APDUs to events
fn decode_event<T>(buff: &[u8]) -> Result<Event, ApduError>
where
    T: DecodeOwned<Output = T, Error = ApduError>,
    Event: From<T>,
{
    T::decode_owned(buff).map(|(v, _n)| Event::from(v))
}

impl Event {
    /// Parse an incoming APDU to engine event
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn parse(ins: u8, buff: &[u8]) -> Result<Self, ApduError> {
        match ins {
            SignInitReq::INS => decode_event::<SignInitReq>(buff),
            SignInputReq::INS => decode_event::<SignInputReq>(buff),
            SignOutputReq::INS => decode_event::<SignOutputReq>(buff),
            SignResetReq::INS => decode_event::<SignResetReq>(buff),
            _ => Err(ApduError::InvalidEncoding),
        }
    }
}

impl From<SignInitReq> for Event {
    fn from(a: SignInitReq) -> Self {
        Event::SignInit {
            coin: a.coin,
            configs: a.configs,
        }
    }
}

impl From<SignInputReq> for Event {
    fn from(a: SignInputReq) -> Self {
        Event::SighashScript {
            script_config_index: a.script_config_index as u32,
            keypath: a.keypath,
        }
    }
}

impl From<SignOutputReq> for Event {
    fn from(a: SignOutputReq) -> Self {
        Event::PayloadAtChange {
            script_config_index: a.script_config_index as u32,
            is_own_output: a.is_own_output,
            keypath: a.keypath,
        }
    }
}

impl From<SignResetReq> for Event {
    fn from(_: SignResetReq) -> Self {
        Event::Reset
    }
}

#[cfg(test)]
mod test {
    use encdec::Encode;

    use super::*;

    #[test]
    fn parse_events() {
        let mut buff = [0u8; 64];

        let req = SignInputReq::new(1, &[84 + HARDENED, HARDENED, HARDENED, 0, 5]).unwrap();
        let n = req.encode(&mut buff).unwrap();
        assert_eq!(
            Event::parse(SignInputReq::INS, &buff[..n]),
            Ok(Event::SighashScript {
                script_config_index: 1,
                keypath: req.keypath.clone(),
            })
        );

        let req = SignOutputReq::new(0, true, &[86 + HARDENED, HARDENED, HARDENED, 1, 2]).unwrap();
        let n = req.encode(&mut buff).unwrap();
        assert_eq!(
            Event::parse(SignOutputReq::INS, &buff[..n]),
            Ok(Event::PayloadAtChange {
                script_config_index: 0,
                is_own_output: true,
                keypath: req.keypath.clone(),
            })
        );

        assert_eq!(Event::parse(SignResetReq::INS, &[]), Ok(Event::Reset));
    }

    #[test]
    fn parse_failures() {
        // Unknown instruction
        assert_eq!(Event::parse(0x01, &[]), Err(ApduError::InvalidEncoding));

        // Truncated request
        assert_eq!(
            Event::parse(SignInputReq::INS, &[0, 3, 0, 0, 1, 2]),
            Err(ApduError::InvalidLength)
        );
    }
}
