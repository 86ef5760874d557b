use core::{fmt, iter};
use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::{IsIdentity, VartimeMultiscalarMul};
use merlin::Transcript;
use zeroize::Zeroize;

use super::transcript::TranscriptProtocol;
use super::{Commitment, PrimitiveError, PrivateKey, PublicKey};

/// A Schnorr signature: nonce commitment `R` followed by the scalar `s`.
/// Single-key and combined multi-party signatures share this form.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Signature([u8; 64]);

impl Signature {
    /// Serialized size in bytes.
    pub const SIZE: usize = 64;

    /// Creates a signature for a single private key and a message.
    pub fn create(private_key: &PrivateKey, public_key: &PublicKey, message: &[u8]) -> Signature {
        let transcript = Self::transcript_for_message(message);
        let mut x = private_key.to_scalar();

        let mut rng = transcript
            .build_rng()
            .rekey_with_witness_bytes(b"x", private_key.as_bytes())
            .finalize(&mut rand::thread_rng());

        // Generate ephemeral keypair (r, R). r is a random nonce.
        let mut r = Scalar::random(&mut rng);
        let R = Commitment::from_point(&(r * RISTRETTO_BASEPOINT_POINT));

        let c = Self::challenge(public_key, &R, message);
        let s = r + c * x;
        r.zeroize();
        x.zeroize();

        Signature::from_parts(&R, &s)
    }

    /// Computes the challenge `c = H(m, X, R)` that binds a signature to
    /// the message, the (possibly aggregated) key and the (possibly
    /// aggregated) nonce commitment.
    pub fn challenge(public_key: &PublicKey, commitment: &Commitment, message: &[u8]) -> Scalar {
        let mut transcript = Self::transcript_for_message(message);
        transcript.signature_domain_sep();
        transcript.append_point(b"X", &public_key.as_compressed());
        transcript.append_point(b"R", &commitment.as_compressed());
        transcript.challenge_scalar(b"c")
    }

    /// Assembles a signature from a commitment and a scalar.
    pub fn from_parts(commitment: &Commitment, s: &Scalar) -> Self {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(commitment.as_bytes());
        buf[32..].copy_from_slice(s.as_bytes());
        Signature(buf)
    }

    /// Wraps a byte slice, failing if it is not exactly 64 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        if bytes.len() != Self::SIZE {
            return Err(PrimitiveError::InvalidLength {
                kind: "Signature",
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }
        let mut buf = [0u8; 64];
        buf.copy_from_slice(bytes);
        Ok(Signature(buf))
    }

    /// Parses 128 hex characters.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitiveError> {
        let bytes = hex::decode(hex_str).map_err(|_| PrimitiveError::InvalidHex)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the view into byte representation of the signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Hex encoding of the signature.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0[..])
    }

    /// The nonce commitment half.
    pub fn commitment(&self) -> Commitment {
        let mut buf = [0u8; 32];
        buf.copy_from_slice(&self.0[..32]);
        Commitment::new(buf)
    }

    /// Verifies the signature against a public key and message.
    /// Undecodable points and non-canonical scalars are failures, never panics.
    pub fn verify(&self, public_key: &PublicKey, message: &[u8]) -> bool {
        self.check(public_key, message).is_ok()
    }

    /// Same as [Signature::verify], reporting why verification failed.
    pub fn check(&self, public_key: &PublicKey, message: &[u8]) -> Result<(), PrimitiveError> {
        let mut sbuf = [0u8; 32];
        sbuf.copy_from_slice(&self.0[32..]);
        let s = Scalar::from_canonical_bytes(sbuf).ok_or(PrimitiveError::InvalidScalar)?;
        let R = self.commitment();
        let c = Self::challenge(public_key, &R, message);

        // `s * G = R + c * X`
        //      ->
        // `0 == (-s * G) + (1 * R) + (c * X)`
        let result = RistrettoPoint::optional_multiscalar_mul(
            iter::once(-s)
                .chain(iter::once(Scalar::one()))
                .chain(iter::once(c)),
            iter::once(Some(RISTRETTO_BASEPOINT_POINT))
                .chain(iter::once(R.as_compressed().decompress()))
                .chain(iter::once(public_key.as_compressed().decompress())),
        )
        .ok_or(PrimitiveError::InvalidPoint)?;

        if result.is_identity() {
            Ok(())
        } else {
            Err(PrimitiveError::InvalidSignature)
        }
    }

    fn transcript_for_message(message: &[u8]) -> Transcript {
        let mut t = Transcript::new(b"AccountAuth.sign_message");
        t.append_message(b"message", message);
        t
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}
