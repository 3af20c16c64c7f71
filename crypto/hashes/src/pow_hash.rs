use crate::Hash;

/// scrypt(N=1024, r=1, p=1) of an 80-byte header, using the header as both password and salt.
pub fn scrypt_1024_1_1_256(input: &[u8]) -> Hash {
    // log2(1024) = 10; these parameters and the 32-byte output are always accepted.
    let params = scrypt::Params::new(10, 1, 1, 32).expect("static scrypt parameters");
    let mut out = [0u8; 32];
    scrypt::scrypt(input, input, &params, &mut out).expect("32-byte scrypt output");
    Hash::from_bytes(out)
}
