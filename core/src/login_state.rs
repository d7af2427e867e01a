//! Signed OAuth2 `state` values.
//!
//! The login handler hands the provider `"<nonce>.<mac>"` where `mac` is the
//! hex HMAC-SHA256 of the nonce under the service's signing secret. The
//! callback only has to recompute the MAC, so no server-side storage is
//! involved.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::IdentityError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct StateSigner {
    mac: HmacSha256,
}

impl fmt::Debug for StateSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSigner").finish_non_exhaustive()
    }
}

impl StateSigner {
    pub fn new(secret: &[u8]) -> Result<Self, IdentityError> {
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| IdentityError::InvalidState)?;
        Ok(Self { mac })
    }

    /// Sign a fresh nonce. Callers supply the random bytes.
    pub fn issue(&self, nonce: &[u8]) -> String {
        let nonce = hex::encode(nonce);
        let mut mac = self.mac.clone();
        mac.update(nonce.as_bytes());
        format!("{nonce}.{}", hex::encode(mac.finalize().into_bytes()))
    }

    /// Constant-time check that `state` came from [`StateSigner::issue`].
    pub fn verify(&self, state: &str) -> Result<(), IdentityError> {
        let (nonce, signature) = state.split_once('.').ok_or(IdentityError::InvalidState)?;
        if nonce.is_empty() {
            return Err(IdentityError::InvalidState);
        }
        let signature = hex::decode(signature).map_err(|_| IdentityError::InvalidState)?;
        let mut mac = self.mac.clone();
        mac.update(nonce.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| IdentityError::InvalidState)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> StateSigner {
        StateSigner::new(b"a-signing-secret-of-some-length").unwrap()
    }

    #[test]
    fn issued_state_verifies() {
        let state = signer().issue(&[1, 2, 3, 4]);
        assert!(state.starts_with("01020304."));
        assert!(signer().verify(&state).is_ok());
    }

    #[test]
    fn tampered_nonce_is_rejected() {
        let state = signer().issue(&[1, 2, 3, 4]);
        let forged = state.replacen("01020304", "01020305", 1);
        assert_eq!(signer().verify(&forged), Err(IdentityError::InvalidState));
    }

    #[test]
    fn state_from_another_secret_is_rejected() {
        let other = StateSigner::new(b"some-other-secret-entirely").unwrap();
        let state = other.issue(&[9; 16]);
        assert_eq!(signer().verify(&state), Err(IdentityError::InvalidState));
    }

    #[test]
    fn malformed_state_is_rejected() {
        for state in ["", "nodot", ".abcd", "00.zz"] {
            assert_eq!(signer().verify(state), Err(IdentityError::InvalidState), "{state:?}");
        }
    }
}
