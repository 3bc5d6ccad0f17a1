use vet_clinic::auth::PasswordHasher;
use vet_clinic::error::ClinicError;

#[test]
fn test_hash_then_verify() {
    let hasher = PasswordHasher::new();
    for secret in ["a", "correct horse battery staple", "contraseña-ñandú", "x".repeat(128).as_str()] {
        let hash = hasher.hash(secret).unwrap();
        assert!(hasher.verify(secret, &hash).unwrap(), "secret {:?} should verify", secret);
    }
}

#[test]
fn test_other_secret_does_not_verify() {
    let hasher = PasswordHasher::new();
    let hash = hasher.hash("perro123").unwrap();
    assert!(!hasher.verify("perro124", &hash).unwrap());
    assert!(!hasher.verify("Perro123", &hash).unwrap());
    assert!(!hasher.verify("", &hash).unwrap());
}

#[test]
fn test_hash_is_salted() {
    let hasher = PasswordHasher::new();
    let first = hasher.hash("gato").unwrap();
    let second = hasher.hash("gato").unwrap();
    assert_ne!(first, second);
    assert!(hasher.verify("gato", &first).unwrap());
    assert!(hasher.verify("gato", &second).unwrap());
}

#[test]
fn test_oversized_secret_never_verifies() {
    let hasher = PasswordHasher::new();
    let hash = hasher.hash(&"y".repeat(128)).unwrap();
    assert!(!hasher.verify(&"y".repeat(129), &hash).unwrap());
}

#[test]
fn test_malformed_and_foreign_hashes() {
    let hasher = PasswordHasher::new();
    assert!(matches!(
        hasher.verify("x", "plaintext-password"),
        Err(ClinicError::MalformedHash(_))
    ));
    assert!(matches!(hasher.verify("x", ""), Err(ClinicError::MalformedHash(_))));
    // Valid PHC syntax, but not an algorithm this hasher runs
    assert!(matches!(
        hasher.verify("x", "$pbkdf2-sha256$i=1000$c2FsdHNhbHQ$ZGlnZXN0ZGlnZXN0"),
        Err(ClinicError::MalformedHash(_))
    ));
}
