/// XORs `data` in place with `key`, repeating `key` as needed. Used by the
/// native/caching_sha2 password scrambles.
pub fn xor_eq(data: &mut [u8], key: &[u8]) {
    if key.is_empty() {
        return;
    }

    for (i, byte) in data.iter_mut().enumerate() {
        *byte ^= key[i % key.len()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_xors_with_repeating_key() {
        let mut data = vec![1, 2, 3, 4, 5];
        xor_eq(&mut data, &[0xFF, 0x00]);
        assert_eq!(data, vec![1 ^ 0xFF, 2, 3 ^ 0xFF, 4, 5 ^ 0xFF]);
    }
}
