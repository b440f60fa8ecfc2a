//! Stress tests: the Hash2 condition over many modifiers, and the
//! identifier encoding across every Sec value.

use std::sync::Arc;

use cga_gen::cga::address::interface_id_of;
use cga_gen::cga::framing::hash2_input;
use cga_gen::cga::{modifier_satisfies, search_modifier};
use cga_gen::crypto::digest::DIGEST_LEN;
use cga_gen::{
    generate_with, verify_with, CancelToken, GenerationRequest, HashEngine, Modifier, NoDad,
    SecurityParameter, Sha1Engine,
};

fn test_key() -> Vec<u8> {
    let mut key = vec![0x30, 0x0a];
    key.extend(1..=10u8);
    key
}

/// Leading zero bits of the leftmost 112 bits of a digest.
fn leading_zero_bits(hash: &[u8; DIGEST_LEN]) -> u32 {
    let mut top = [0u8; 16];
    top[..14].copy_from_slice(&hash[..14]);
    u128::from_be_bytes(top).leading_zeros().min(112)
}

/// SHA-1 for Hash1, but every Hash2 input hashes to 112 zero bits, so a
/// search at any Sec finishes on its first candidate.
struct TrivialHash2;

impl HashEngine for TrivialHash2 {
    fn digest(&self, input: &[u8]) -> [u8; DIGEST_LEN] {
        let mut out = Sha1Engine.digest(input);
        if input[16..25].iter().all(|&b| b == 0) {
            out[..14].fill(0);
        }
        out
    }
}

#[test]
fn stress_random_modifiers_never_falsely_pass() {
    let key = test_key();
    for sec in [1u8, 3] {
        let sec = SecurityParameter::new(sec).unwrap();
        for _ in 0..1000 {
            let m = Modifier::random();
            let hash2 = Sha1Engine.digest(&hash2_input(&m, &key, &[]));
            let expected = leading_zero_bits(&hash2) as usize >= sec.zero_bits();
            assert_eq!(
                modifier_satisfies(&Sha1Engine, &m, sec, &key, &[]),
                expected,
                "modifier {m:?} at sec {sec}"
            );
        }
    }
}

#[test]
fn stress_sec0_accepts_any_modifier() {
    let key = test_key();
    for _ in 0..1000 {
        let m = Modifier::random();
        assert!(modifier_satisfies(
            &Sha1Engine,
            &m,
            SecurityParameter::ZERO,
            &key,
            &[]
        ));
    }
}

#[test]
fn stress_accepted_modifiers_have_zero_bits() {
    let key = test_key();
    let sec = SecurityParameter::new(1).unwrap();
    for _ in 0..5 {
        let (m, stats) = search_modifier(
            &Sha1Engine,
            Modifier::random(),
            sec,
            &key,
            &[],
            &CancelToken::new(),
        )
        .unwrap();
        let hash2 = Sha1Engine.digest(&hash2_input(&m, &key, &[]));
        assert!(leading_zero_bits(&hash2) >= 16);
        assert!(stats.iterations >= 1);
    }
}

#[test]
fn stress_sec_bits_for_every_sec() {
    let prefix = "2001:db8:0:1::/64".parse().unwrap();
    for sec in 0..=7u8 {
        for _ in 0..50 {
            let req = GenerationRequest::builder(prefix, test_key())
                .sec(sec)
                .build()
                .unwrap();
            let cga = generate_with(&TrivialHash2, &req, &Arc::new(NoDad), &CancelToken::new()).unwrap();
            let iid = interface_id_of(&cga.address);

            assert_eq!(iid[0] >> 5, sec, "sec must occupy the top three bits");
            assert_eq!(iid[0] & 0x03, 0, "u and g bits must be cleared");
            assert!(verify_with(&TrivialHash2, &cga.address, &cga.params).is_valid);
        }
    }
}
