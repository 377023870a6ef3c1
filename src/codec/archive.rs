use crate::types::Board;
/// Passphrase-encrypted full-board archive for file-based backups.
///
/// The archive is not bandwidth-constrained, so it always carries the
/// complete board, never a patch. Layout:
///
///   BSYNC1.<base64(salt || nonce || ciphertext)>
///
/// with a 16-byte Argon2id salt, a 24-byte XChaCha20-Poly1305 nonce, and
/// the AEAD ciphertext of the board JSON. A wrong passphrase or a corrupted
/// file fails the authentication tag and surfaces as `Decrypt`, never as a
/// silently-empty board.
use argon2::Argon2;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{Key, KeyInit, XChaCha20Poly1305, XNonce};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

const MAGIC: &str = "BSYNC1.";
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 24;
const KEY_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("passphrase key derivation failed")]
    KeyDerivation,
    #[error("archive encryption failed")]
    Encrypt,
    #[error("wrong passphrase or corrupted archive")]
    Decrypt,
    #[error("not a recognized archive")]
    Format,
    #[error("decrypted archive is not a valid board: {0}")]
    Parse(String),
}

fn derive_key(passphrase: &str, salt: &[u8]) -> Result<[u8; KEY_LEN], ArchiveError> {
    let mut key = [0u8; KEY_LEN];
    Argon2::default()
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|_| ArchiveError::KeyDerivation)?;
    Ok(key)
}

/// Serialize and encrypt a full board under a user passphrase.
pub fn backup(board: &Board, passphrase: &str) -> Result<String, ArchiveError> {
    let plaintext = serde_json::to_string(board)?;

    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let key = derive_key(passphrase, &salt)?;
    let cipher = XChaCha20Poly1305::new(Key::from_slice(&key));
    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|_| ArchiveError::Encrypt)?;

    let mut blob = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);

    log::debug!(
        "[boardsync.archive] wrote archive, {} cards, {} bytes",
        board.card_count(),
        blob.len()
    );
    Ok(format!("{}{}", MAGIC, BASE64.encode(blob)))
}

/// Decrypt and parse an archive. `Decrypt` means the passphrase is wrong or
/// the file was corrupted; `Format` means the text is not an archive at
/// all; `Parse` means the decrypted content is not a board.
pub fn restore(text: &str, passphrase: &str) -> Result<Board, ArchiveError> {
    let armored = text.trim().strip_prefix(MAGIC).ok_or(ArchiveError::Format)?;
    let blob = BASE64.decode(armored).map_err(|_| ArchiveError::Format)?;
    if blob.len() < SALT_LEN + NONCE_LEN {
        return Err(ArchiveError::Format);
    }
    let (salt, rest) = blob.split_at(SALT_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

    let key = derive_key(passphrase, salt)?;
    let cipher = XChaCha20Poly1305::new(Key::from_slice(&key));
    let plaintext = cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| ArchiveError::Decrypt)?;

    let plaintext = String::from_utf8(plaintext).map_err(|_| ArchiveError::Decrypt)?;
    if plaintext.trim().is_empty() {
        return Err(ArchiveError::Parse("archive was empty".to_string()));
    }
    serde_json::from_str::<Board>(&plaintext).map_err(|e| ArchiveError::Parse(e.to_string()))
}

/// Backup filename carrying the date, e.g. `kanban-backup-2026-08-28.json`.
pub fn backup_file_name(now: DateTime<Utc>) -> String {
    format!("kanban-backup-{}.json", now.format("%Y-%m-%d"))
}
