//! Payment Request Envelope Verification
//!
//! An envelope is authentic when
//!
//! 1. the merchant certificate chains up to the given CA, which is the only
//!    trust anchor, under standard X.509 path validation, and
//! 2. the envelope signature is a valid RSA PKCS#1 v1.5 SHA-256 signature by
//!    the merchant certificate's key over the raw UTF-8 bytes of
//!    `envelope.message`.
//!
//! Verification never errors: every failure (bad PEM, untrusted chain,
//! malformed base64, wrong signature) yields `false`. [`check_envelope`]
//! reports which step failed for diagnostics.

use crate::messages::PaymentRequestEnvelope;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rustls_pki_types::{CertificateDer, SignatureVerificationAlgorithm, UnixTime};
use webpki::{EndEntityCert, KeyUsage};

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

/// Signature algorithms accepted on certificates along the chain.
static CHAIN_ALGORITHMS: &[&dyn SignatureVerificationAlgorithm] = &[
    webpki::ring::RSA_PKCS1_2048_8192_SHA256,
    webpki::ring::RSA_PKCS1_2048_8192_SHA384,
    webpki::ring::RSA_PKCS1_2048_8192_SHA512,
    webpki::ring::ECDSA_P256_SHA256,
    webpki::ring::ECDSA_P384_SHA384,
    webpki::ring::ED25519,
];

/// Why an envelope failed verification.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("malformed merchant certificate")]
    MalformedCertificate,
    #[error("malformed CA certificate")]
    MalformedCa,
    #[error("certificate chain not trusted: {0}")]
    UntrustedChain(String),
    #[error("signature is not valid base64")]
    MalformedSignature,
    #[error("signature does not match message")]
    BadSignature,
}

/// Verify `envelope` against the merchant certificate and CA, both PEM.
pub fn verify_envelope(envelope: &PaymentRequestEnvelope, merchant_pem: &str, ca_pem: &str) -> bool {
    check_envelope(envelope, merchant_pem, ca_pem).is_ok()
}

/// Same as [`verify_envelope`] but reports the failing step.
pub fn check_envelope(
    envelope: &PaymentRequestEnvelope,
    merchant_pem: &str,
    ca_pem: &str,
) -> std::result::Result<(), VerifyError> {
    let merchant_der = certificate_from_pem(merchant_pem).ok_or(VerifyError::MalformedCertificate)?;
    let ca_der = certificate_from_pem(ca_pem).ok_or(VerifyError::MalformedCa)?;

    let merchant =
        EndEntityCert::try_from(&merchant_der).map_err(|_| VerifyError::MalformedCertificate)?;
    let anchor = webpki::anchor_from_trusted_cert(&ca_der).map_err(|_| VerifyError::MalformedCa)?;

    merchant
        .verify_for_usage(
            CHAIN_ALGORITHMS,
            &[anchor],
            &[],
            UnixTime::now(),
            KeyUsage::client_auth(),
            None,
            None,
        )
        .map_err(|e| VerifyError::UntrustedChain(format!("{:?}", e)))?;

    let signature = BASE64
        .decode(envelope.signature.trim())
        .map_err(|_| VerifyError::MalformedSignature)?;

    merchant
        .verify_signature(
            webpki::ring::RSA_PKCS1_2048_8192_SHA256,
            envelope.message.as_bytes(),
            &signature,
        )
        .map_err(|_| VerifyError::BadSignature)
}

/// Extract the first certificate from a PEM string.
///
/// Well-formed PEM goes through `rustls-pemfile`. A block squashed onto one
/// line (markers and base64 without line breaks) is accepted as well by
/// stripping the markers and decoding the remaining base64.
pub fn certificate_from_pem(pem: &str) -> Option<CertificateDer<'static>> {
    let mut reader = pem.as_bytes();
    if let Some(Ok(cert)) = rustls_pemfile::certs(&mut reader).next() {
        return Some(cert);
    }

    let body: String = pem
        .replace(PEM_BEGIN, "")
        .replace(PEM_END, "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if body.is_empty() {
        return None;
    }
    BASE64.decode(body).ok().map(CertificateDer::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;

    #[test]
    fn test_fixture_envelope_checks_out() {
        let envelope = fixtures::signed_envelope();
        assert_eq!(
            check_envelope(&envelope, fixtures::MERCHANT_CERT_PEM, fixtures::CA_CERT_PEM),
            Ok(())
        );
    }

    #[test]
    fn test_single_line_pem_is_accepted() {
        let squashed: String = fixtures::CA_CERT_PEM.lines().collect();
        let strict = certificate_from_pem(fixtures::CA_CERT_PEM).unwrap();
        let lenient = certificate_from_pem(&squashed).unwrap();
        assert_eq!(strict.as_ref(), lenient.as_ref());
    }

    #[test]
    fn test_garbage_pem_is_rejected() {
        assert!(certificate_from_pem("").is_none());
        assert!(certificate_from_pem("not a certificate").is_none());
        assert!(certificate_from_pem(&format!("{}\n{}", PEM_BEGIN, PEM_END)).is_none());
    }

    #[test]
    fn test_failure_steps_are_reported() {
        let envelope = fixtures::signed_envelope();
        assert_eq!(
            check_envelope(&envelope, "garbage", fixtures::CA_CERT_PEM),
            Err(VerifyError::MalformedCertificate)
        );
        assert_eq!(
            check_envelope(&envelope, fixtures::MERCHANT_CERT_PEM, "garbage"),
            Err(VerifyError::MalformedCa)
        );
        assert!(matches!(
            check_envelope(
                &envelope,
                fixtures::MERCHANT_CERT_PEM,
                fixtures::UNTRUSTED_CA_PEM
            ),
            Err(VerifyError::UntrustedChain(_))
        ));

        let bad_base64 = PaymentRequestEnvelope::new(envelope.message.clone(), "%%%not-base64%%%");
        assert_eq!(
            check_envelope(&bad_base64, fixtures::MERCHANT_CERT_PEM, fixtures::CA_CERT_PEM),
            Err(VerifyError::MalformedSignature)
        );
    }
}
