use std::fs;

use anyhow::Result;
use rsa_hybrid::rsa::bigint::from_u64;
use rsa_hybrid::util::file_ops::{generate_key_files_with, read_private_key, read_public_key};
use rsa_hybrid::{decrypt_file, encrypt_file, generate_key_files, Error, KeyGenConfig};

#[test]
fn alice_roundtrip_and_corruption() -> Result<()> {
    let dir = tempfile::tempdir()?;

    let files = generate_key_files("alice", dir.path())?;
    assert_eq!(files.public_key, dir.path().join("alice.pub"));
    assert_eq!(files.private_key, dir.path().join("alice.prv"));

    let public = read_public_key(&files.public_key)?;
    let private = read_private_key(&files.private_key)?;
    assert_eq!(public.n, private.n);
    assert_eq!(public.e, from_u64(65537));
    assert_eq!(public.bit_length(), 2048);

    // Two decimal lines each
    let contents = fs::read_to_string(&files.public_key)?;
    assert_eq!(contents.lines().count(), 2);
    assert!(contents.ends_with("\n65537"));

    let secret = dir.path().join("secret.txt");
    let cipher = dir.path().join("secret.cip");
    let recovered = dir.path().join("recovered.txt");
    fs::write(&secret, "hello world")?;

    encrypt_file(&files.public_key, &secret, &cipher)?;
    decrypt_file(&files.private_key, &cipher, &recovered)?;
    assert_eq!(fs::read_to_string(&recovered)?, "hello world");

    // Ciphertext is the tail of the envelope
    let mut bytes = fs::read(&cipher)?;
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    fs::write(&cipher, &bytes)?;

    let corrupted_output = dir.path().join("corrupted.txt");
    let err = decrypt_file(&files.private_key, &cipher, &corrupted_output).unwrap_err();
    assert!(err.is_integrity(), "unexpected error: {}", err);
    assert!(err.to_string().starts_with("ciphertext corrupted"));
    assert!(!corrupted_output.exists());

    Ok(())
}

#[test]
fn independent_key_generations_differ() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = KeyGenConfig::default().with_prime_bits(512);

    let (_, bob) = generate_key_files_with("bob", dir.path(), &config)?;
    let (_, carol) = generate_key_files_with("carol", dir.path(), &config)?;
    assert_ne!(bob.public_key.n, carol.public_key.n);

    Ok(())
}

#[test]
fn binary_payload_roundtrip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = KeyGenConfig::default().with_prime_bits(512);
    let (files, _) = generate_key_files_with("dave", dir.path(), &config)?;

    let payload: Vec<u8> = (0..=255u8).rev().cycle().take(10_000).collect();
    let input = dir.path().join("payload.bin");
    let cipher = dir.path().join("payload.cip");
    let output = dir.path().join("payload.out");
    fs::write(&input, &payload)?;

    encrypt_file(&files.public_key, &input, &cipher)?;
    decrypt_file(&files.private_key, &cipher, &output)?;
    assert_eq!(fs::read(&output)?, payload);

    Ok(())
}

#[test]
fn malformed_inputs_are_reported() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = KeyGenConfig::default().with_prime_bits(512);
    let (files, _) = generate_key_files_with("erin", dir.path(), &config)?;

    let input = dir.path().join("note.txt");
    let cipher = dir.path().join("note.cip");
    let output = dir.path().join("note.out");
    fs::write(&input, "short note")?;
    encrypt_file(&files.public_key, &input, &cipher)?;

    // Truncated envelope
    let bytes = fs::read(&cipher)?;
    fs::write(&cipher, &bytes[..20])?;
    let err = decrypt_file(&files.private_key, &cipher, &output).unwrap_err();
    assert!(matches!(err, Error::EnvelopeFormat(_)), "unexpected error: {}", err);
    assert!(!output.exists());

    // Key file with one line
    let bad_key = dir.path().join("bad.pub");
    fs::write(&bad_key, "1234567")?;
    let err = encrypt_file(&bad_key, &input, &cipher).unwrap_err();
    assert!(matches!(err, Error::KeyFileFormat(_)), "unexpected error: {}", err);

    Ok(())
}
