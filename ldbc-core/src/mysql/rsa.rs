//! Hand-rolled RSA-OAEP encryption for the `sha256_password` /
//! `caching_sha2_password` full-auth fallback, when the connection isn't
//! already running over TLS.
//!
//! The server hands us a PEM-encoded `RSA PUBLIC KEY` (or `PUBLIC KEY`
//! wrapping a `SubjectPublicKeyInfo`); we parse just enough ASN.1 DER to pull
//! out `(n, e)` and do PKCS#1 v2 OAEP padding + modular exponentiation by
//! hand with `num-bigint`, since pulling in a full RSA crate is out of scope
//! for a protocol driver that otherwise never needs RSA outside of this one
//! legacy auth fallback.

use digest::Digest;
use num_bigint::BigUint;
use rand::RngCore;

struct RsaPublicKey {
    n: BigUint,
    e: BigUint,
    byte_len: usize,
}

/// Encrypts `data` (the XOR'd password) with the server's RSA public key
/// using OAEP padding with digest `D` (SHA-1 per the MySQL/MariaDB docs).
pub fn encrypt<D: Digest + Default + Clone>(pem: &[u8], data: &[u8]) -> crate::Result<Vec<u8>> {
    let key = parse_public_key(pem)?;
    let padded = oaep_pad::<D>(data, key.byte_len)?;

    let m = BigUint::from_bytes_be(&padded);
    let c = m.modpow(&key.e, &key.n);

    let mut out = c.to_bytes_be();

    // left-pad to the modulus size; BigUint drops leading zero bytes
    if out.len() < key.byte_len {
        let mut padded_out = vec![0u8; key.byte_len - out.len()];
        padded_out.extend_from_slice(&out);
        out = padded_out;
    }

    Ok(out)
}

fn parse_public_key(pem: &[u8]) -> crate::Result<RsaPublicKey> {
    let der = pem_to_der(pem)?;
    let mut reader = DerReader::new(&der);

    let outer = reader.expect_sequence()?;
    let mut outer_reader = DerReader::new(outer);

    // `SubjectPublicKeyInfo ::= SEQUENCE { algorithm AlgorithmIdentifier, subjectPublicKey BIT STRING }`
    // vs. a bare `RSAPublicKey ::= SEQUENCE { modulus INTEGER, publicExponent INTEGER }`.
    // Peek at the first element: an AlgorithmIdentifier is itself a SEQUENCE, a modulus is an INTEGER.
    let (tag, _) = outer_reader.peek_tag_len()?;

    let rsa_public_key_der;
    let owned;

    if tag == 0x30 {
        // SubjectPublicKeyInfo: skip the algorithm identifier, unwrap the BIT STRING
        let _algorithm = outer_reader.expect_sequence()?;
        let bit_string = outer_reader.expect_bit_string()?;
        owned = bit_string.to_vec();
        rsa_public_key_der = &owned[..];
    } else {
        rsa_public_key_der = outer;
        owned = Vec::new();
        let _ = &owned;
    }

    let mut inner = if tag == 0x30 {
        let mut r = DerReader::new(rsa_public_key_der);
        DerReader::new(r.expect_sequence()?)
    } else {
        DerReader::new(rsa_public_key_der)
    };

    let n = BigUint::from_bytes_be(strip_leading_zero(inner.expect_integer()?));
    let e = BigUint::from_bytes_be(strip_leading_zero(inner.expect_integer()?));
    let byte_len = (n.bits() as usize + 7) / 8;

    Ok(RsaPublicKey { n, e, byte_len })
}

fn strip_leading_zero(bytes: &[u8]) -> &[u8] {
    if bytes.len() > 1 && bytes[0] == 0 {
        &bytes[1..]
    } else {
        bytes
    }
}

fn pem_to_der(pem: &[u8]) -> crate::Result<Vec<u8>> {
    let text = std::str::from_utf8(pem)
        .map_err(|_| auth_err!("server's RSA public key is not valid UTF-8"))?;

    let mut body = String::new();
    let mut in_body = false;

    for line in text.lines() {
        if line.starts_with("-----BEGIN") {
            in_body = true;
            continue;
        }

        if line.starts_with("-----END") {
            break;
        }

        if in_body {
            body.push_str(line.trim());
        }
    }

    if body.is_empty() {
        return Err(auth_err!("server's RSA public key is not PEM-encoded").into());
    }

    base64::decode(&body).map_err(|err| auth_err!("server's RSA public key is not valid base64: {}", err).into())
}

/// A minimal reader for the handful of DER constructs an RSA public key uses:
/// SEQUENCE, INTEGER, and BIT STRING, all with short- or long-form lengths.
struct DerReader<'a> {
    data: &'a [u8],
}

impl<'a> DerReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn read_len(&mut self) -> crate::Result<usize> {
        let first = *self.data.first().ok_or_else(|| auth_err!("truncated DER"))?;
        self.data = &self.data[1..];

        if first & 0x80 == 0 {
            return Ok(first as usize);
        }

        let n = (first & 0x7F) as usize;
        if self.data.len() < n {
            return Err(auth_err!("truncated DER length").into());
        }

        let mut len = 0usize;
        for &b in &self.data[..n] {
            len = (len << 8) | b as usize;
        }
        self.data = &self.data[n..];

        Ok(len)
    }

    fn peek_tag_len(&self) -> crate::Result<(u8, usize)> {
        let mut clone = DerReader::new(self.data);
        let tag = *clone.data.first().ok_or_else(|| auth_err!("truncated DER"))?;
        clone.data = &clone.data[1..];
        let len = clone.read_len()?;

        Ok((tag, len))
    }

    fn expect_tag(&mut self, expected: u8) -> crate::Result<&'a [u8]> {
        let tag = *self.data.first().ok_or_else(|| auth_err!("truncated DER"))?;

        if tag != expected {
            return Err(auth_err!(
                "unexpected DER tag {:#x}, expected {:#x} while parsing RSA public key",
                tag,
                expected
            )
            .into());
        }

        self.data = &self.data[1..];
        let len = self.read_len()?;

        if self.data.len() < len {
            return Err(auth_err!("truncated DER value").into());
        }

        let value = &self.data[..len];
        self.data = &self.data[len..];

        Ok(value)
    }

    fn expect_sequence(&mut self) -> crate::Result<&'a [u8]> {
        self.expect_tag(0x30)
    }

    fn expect_integer(&mut self) -> crate::Result<&'a [u8]> {
        self.expect_tag(0x02)
    }

    fn expect_bit_string(&mut self) -> crate::Result<&'a [u8]> {
        let raw = self.expect_tag(0x03)?;
        // first byte is the count of unused bits in the last byte; always 0 for key material
        Ok(&raw[1..])
    }
}

/// PKCS#1 v2 OAEP encoding with MGF1, both driven by digest `D`.
fn oaep_pad<D: Digest + Default + Clone>(message: &[u8], key_len: usize) -> crate::Result<Vec<u8>> {
    let h_len = <D as Digest>::output_size();

    if message.len() > key_len.saturating_sub(2 * h_len + 2) {
        return Err(auth_err!("password too long to RSA-encrypt with this key size").into());
    }

    let mut l_hash = D::default();
    l_hash.input(b""); // empty label
    let l_hash = l_hash.result();

    let ps_len = key_len - message.len() - 2 * h_len - 2;
    let mut db = Vec::with_capacity(key_len - h_len - 1);
    db.extend_from_slice(&l_hash);
    db.extend(std::iter::repeat(0u8).take(ps_len));
    db.push(1);
    db.extend_from_slice(message);

    let mut seed = vec![0u8; h_len];
    rand::thread_rng().fill_bytes(&mut seed);

    let db_mask = mgf1::<D>(&seed, db.len());
    let mut masked_db = db;
    xor_in_place(&mut masked_db, &db_mask);

    let seed_mask = mgf1::<D>(&masked_db, h_len);
    let mut masked_seed = seed;
    xor_in_place(&mut masked_seed, &seed_mask);

    let mut out = Vec::with_capacity(key_len);
    out.push(0);
    out.extend_from_slice(&masked_seed);
    out.extend_from_slice(&masked_db);

    Ok(out)
}

fn mgf1<D: Digest + Default + Clone>(seed: &[u8], len: usize) -> Vec<u8> {
    let h_len = <D as Digest>::output_size();
    let mut out = Vec::with_capacity(len + h_len);
    let mut counter: u32 = 0;

    while out.len() < len {
        let mut hash = D::default();
        hash.input(seed);
        hash.input(&counter.to_be_bytes());
        out.extend_from_slice(&hash.result());
        counter += 1;
    }

    out.truncate(len);
    out
}

fn xor_in_place(data: &mut [u8], mask: &[u8]) {
    for (b, m) in data.iter_mut().zip(mask) {
        *b ^= m;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mgf1_output_length_matches_request() {
        let out = mgf1::<sha1::Sha1>(b"seed", 37);
        assert_eq!(out.len(), 37);
    }

    #[test]
    fn oaep_pad_rejects_oversized_message() {
        let err = oaep_pad::<sha1::Sha1>(&vec![0u8; 300], 256);
        assert!(err.is_err());
    }
}
