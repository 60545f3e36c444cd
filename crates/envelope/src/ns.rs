//! XML namespace, algorithm, and element-name constants used across the crate.

/// SOAP 1.1 envelope namespace.
pub const SOAP_ENV: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// WS-Security extension namespace (security header container).
pub const WSSE: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";

/// XML Digital Signature namespace.
pub const DSIG: &str = "http://www.w3.org/2000/09/xmldsig#";

/// XML Encryption namespace.
pub const XENC: &str = "http://www.w3.org/2001/04/xmlenc#";

/// Exclusive C14N namespace.
pub const EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";

/// Generic corporate file-exchange dialect namespace.
pub const CORPORATE_FILE_SERVICE: &str = "http://bxd.fi/CorporateFileService";

/// Certificate-authority dialect namespace.
pub const PKI_FACTORY_SERVICE: &str = "http://danskebank.dk/PKI/PKIFactoryService";

// ── Namespace prefixes fixed by the catalog ──────────────────────────

pub mod prefix {
    pub const SOAP_ENV: &str = "SOAP-ENV";
    pub const WSSE: &str = "wsse";
    pub const DSIG: &str = "dsig";
    pub const XENC: &str = "xenc";
    pub const COR: &str = "cor";
    pub const PKIF: &str = "pkif";
}

// ── Algorithm identifier URIs ────────────────────────────────────────

pub mod alg {
    /// RSA with SHA-1, the signature algorithm of the wire protocol.
    pub const RSA_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";

    /// SHA-1 digest.
    pub const SHA1: &str = "http://www.w3.org/2000/09/xmldsig#sha1";

    /// Exclusive canonicalization.
    pub const EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";

    /// Triple-DES in CBC mode, mandated by the certificate authority's
    /// legacy interface.
    pub const TRIPLEDES_CBC: &str = "http://www.w3.org/2001/04/xmlenc#tripledes-cbc";

    /// RSA PKCS#1 v1.5 key transport.
    pub const RSA_1_5: &str = "http://www.w3.org/2001/04/xmlenc#rsa-1_5";
}

// ── Element names ────────────────────────────────────────────────────

pub mod node {
    // Envelope structure
    pub const ENVELOPE: &str = "Envelope";
    pub const HEADER: &str = "Header";
    pub const BODY: &str = "Body";
    pub const FAULT: &str = "Fault";
    pub const SECURITY: &str = "Security";

    // DSig elements
    pub const SIGNATURE: &str = "Signature";
    pub const SIGNED_INFO: &str = "SignedInfo";
    pub const CANONICALIZATION_METHOD: &str = "CanonicalizationMethod";
    pub const SIGNATURE_METHOD: &str = "SignatureMethod";
    pub const SIGNATURE_VALUE: &str = "SignatureValue";
    pub const REFERENCE: &str = "Reference";
    pub const TRANSFORMS: &str = "Transforms";
    pub const TRANSFORM: &str = "Transform";
    pub const DIGEST_METHOD: &str = "DigestMethod";
    pub const DIGEST_VALUE: &str = "DigestValue";
    pub const KEY_INFO: &str = "KeyInfo";
    pub const X509_DATA: &str = "X509Data";
    pub const X509_CERTIFICATE: &str = "X509Certificate";

    // Encryption elements
    pub const ENCRYPTED_DATA: &str = "EncryptedData";
    pub const ENCRYPTED_KEY: &str = "EncryptedKey";
    pub const ENCRYPTION_METHOD: &str = "EncryptionMethod";
    pub const CIPHER_DATA: &str = "CipherData";
    pub const CIPHER_VALUE: &str = "CipherValue";
}

// ── Attribute names ──────────────────────────────────────────────────

pub mod attr {
    pub const ID: &str = "Id";
    pub const URI: &str = "URI";
    pub const TYPE: &str = "Type";
    pub const ALGORITHM: &str = "Algorithm";
}

/// Encryption `Type` URI for element encryption.
pub const ENC_TYPE_ELEMENT: &str = "http://www.w3.org/2001/04/xmlenc#Element";
