// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Argon2 password hashing for provisioned identities.
//!
//! This module provides a centralized Argon2 instance that uses:
//! - Production-strength parameters in release builds
//! - Fast, reduced-cost parameters in tests for performance
//!
//! # Security Note
//!
//! Production parameters use Argon2id with strong defaults:
//! - Memory: 19456 KiB (~19 MiB)
//! - Iterations: 2
//! - Parallelism: 1
//!
//! Test parameters are intentionally weak and MUST NOT be used in production.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
#[cfg(test)]
use argon2::{Algorithm, Params, Version};

/// Errors that can occur while hashing or verifying a password.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
	#[error("password hashing failed: {0}")]
	Hash(String),

	#[error("stored password hash is malformed: {0}")]
	MalformedHash(String),
}

/// Returns an Argon2 instance configured appropriately for the build context.
///
/// In production (`#[cfg(not(test))]`), returns `Argon2::default()` with
/// strong security parameters.
///
/// In tests (`#[cfg(test)]`), returns an Argon2 instance with minimal
/// parameters for fast test execution.
#[inline]
fn argon2_instance() -> Argon2<'static> {
	#[cfg(test)]
	{
		// Fast, insecure parameters for tests ONLY.
		// Memory: 1024 KiB (1 MiB) vs ~19 MiB in production
		// Iterations: 1 vs 2 in production
		// Parallelism: 1
		let params = Params::new(
			1024, // memory_kib: 1 MiB
			1,    // iterations
			1,    // parallelism
			None, // output length = default
		)
		.expect("valid Argon2 params for tests");
		Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
	}

	#[cfg(not(test))]
	{
		// Production: use strong defaults
		// Argon2id with memory=19456 KiB, iterations=2, parallelism=1
		Argon2::default()
	}
}

/// Hash a plaintext password into a PHC-format string for storage.
///
/// # Errors
/// Returns `PasswordError::Hash` if the hasher rejects the input.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
	let salt = SaltString::generate(&mut OsRng);
	let hash = argon2_instance()
		.hash_password(password.as_bytes(), &salt)
		.map_err(|e| PasswordError::Hash(e.to_string()))?;
	Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-format hash.
///
/// # Errors
/// Returns `PasswordError::MalformedHash` if the stored hash cannot be
/// parsed. A non-matching password is not an error; it returns `Ok(false)`.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
	let parsed =
		PasswordHash::new(stored_hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
	Ok(argon2_instance()
		.verify_password(password.as_bytes(), &parsed)
		.is_ok())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_hash_then_verify_roundtrip() {
		let hash = hash_password("secret1").unwrap();
		assert!(verify_password("secret1", &hash).unwrap());
		assert!(!verify_password("wrong", &hash).unwrap());
	}

	#[test]
	fn test_hashes_are_salted() {
		let a = hash_password("secret1").unwrap();
		let b = hash_password("secret1").unwrap();
		assert_ne!(a, b);
	}

	#[test]
	fn test_malformed_hash_rejected() {
		let result = verify_password("secret1", "not-a-phc-string");
		assert!(matches!(result, Err(PasswordError::MalformedHash(_))));
	}
}
