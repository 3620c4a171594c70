/* This file is part of the DERSFLIX project
*
*  Copyright (C) 2025-2026 The DERSFLIX contributors
*  
*  This program is free software: you can redistribute it and/or modify
*  it under the terms of the GNU Affero General Public License as published by
*  the Free Software Foundation, either version 3 of the License, or
*  (at your option) any later version.
*
*  This program is distributed in the hope that it will be useful,
*  but WITHOUT ANY WARRANTY; without even the implied warranty of
*  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
*  GNU Affero General Public License for more details.
*
*  You should have received a copy of the GNU Affero General Public License
*  along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

//! Sessions are capabilities: every owner-scoped operation takes a [`Session`] explicitly.

use std::{collections::HashMap, fmt::Debug, sync::{Arc, RwLock}, time::{Duration, Instant}};

use argon2::{password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString}, Argon2};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use cloneable_errors::anyhow;
use log::{debug, info};

use crate::{errors::{LibraryError, Result, IDENTITY_READ_ERR, IDENTITY_WRITE_ERR}, store::AccountRepository, types::{Account, OwnerId}};

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
const TOKEN_BYTES: usize = 32;
const SALT_BYTES: usize = 16;

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(Arc<str>);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// tokens are bearer secrets, keep them out of logs
impl Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    token: SessionToken,
    owner: OwnerId,
    email: Arc<str>,
}

impl Session {
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

pub trait IdentityProvider: Send + Sync {
    fn register(&self, email: &str, password: &str) -> Result<Session>;
    fn login(&self, email: &str, password: &str) -> Result<Session>;
    /// Fails with [`LibraryError::Unauthorized`] for unknown, revoked or expired tokens
    fn resolve(&self, token: &str) -> Result<Session>;
    fn logout(&self, token: &str) -> Result<()>;
}

fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut buffer = [0u8; N];
    getrandom::fill(&mut buffer).map_err(|e| anyhow!("Failed to gather randomness: {}", e))?;
    Ok(buffer)
}

/// Argon2id with the crate's default parameters, as a PHC string
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::encode_b64(&random_bytes::<SALT_BYTES>()?)
        .map_err(|e| anyhow!("Failed to encode a password salt: {}", e))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash a password: {}", e))?;
    Ok(hash.to_string())
}

fn verify_password(account: &Account, password: &str) -> Result<bool> {
    let hash = PasswordHash::new(&account.password_hash)
        .map_err(|e| anyhow!("Stored password hash of account {} is malformed: {}", account.owner, e))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &hash).is_ok())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

struct ActiveSession {
    session: Session,
    /// `None` if the TTL overflows [`Instant`]
    expires_at: Option<Instant>,
}

impl ActiveSession {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|t| now >= t)
    }
}

/// Accounts live in an [`AccountRepository`], sessions only in memory.
/// Sessions expire after a fixed time to live and are pruned whenever a new one is opened.
pub struct LocalIdentity {
    accounts: Arc<dyn AccountRepository>,
    sessions: RwLock<HashMap<SessionToken, ActiveSession>>,
    ttl: Duration,
}

impl LocalIdentity {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> LocalIdentity {
        LocalIdentity::with_ttl(accounts, DEFAULT_SESSION_TTL)
    }

    pub fn with_ttl(accounts: Arc<dyn AccountRepository>, ttl: Duration) -> LocalIdentity {
        LocalIdentity { accounts, sessions: RwLock::default(), ttl }
    }

    fn open_session(&self, account: &Account) -> Result<Session> {
        let token = SessionToken(URL_SAFE_NO_PAD.encode(random_bytes::<TOKEN_BYTES>()?).into());
        let session = Session {
            token: token.clone(),
            owner: account.owner.clone(),
            email: account.email.as_str().into(),
        };
        let now = Instant::now();
        let mut sessions = self.sessions.write().map_err(|_| IDENTITY_WRITE_ERR.clone())?;
        let before = sessions.len();
        sessions.retain(|_, active| !active.is_expired(now));
        if sessions.len() != before {
            debug!("Pruned {} expired sessions", before - sessions.len());
        }
        sessions.insert(token, ActiveSession { session: session.clone(), expires_at: now.checked_add(self.ttl) });
        Ok(session)
    }

    pub fn active_sessions(&self) -> Result<usize> {
        let now = Instant::now();
        let sessions = self.sessions.read().map_err(|_| IDENTITY_READ_ERR.clone())?;
        Ok(sessions.values().filter(|active| !active.is_expired(now)).count())
    }
}

impl IdentityProvider for LocalIdentity {
    fn register(&self, email: &str, password: &str) -> Result<Session> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(LibraryError::MissingField("email"));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(LibraryError::WeakPassword { min_length: MIN_PASSWORD_LENGTH });
        }
        if self.accounts.find_by_email(&email)?.is_some() {
            return Err(LibraryError::EmailTaken);
        }
        let account = Account {
            owner: OwnerId::generate(),
            password_hash: hash_password(password)?,
            email,
        };
        self.accounts.insert(account.clone())?;
        info!("Registered account {}", account.owner);
        self.open_session(&account)
    }

    fn login(&self, email: &str, password: &str) -> Result<Session> {
        let account = self.accounts.find_by_email(&normalize_email(email))?
            .ok_or(LibraryError::InvalidCredentials)?;
        if !verify_password(&account, password)? {
            return Err(LibraryError::InvalidCredentials);
        }
        self.open_session(&account)
    }

    fn resolve(&self, token: &str) -> Result<Session> {
        let token = SessionToken(token.into());
        {
            let sessions = self.sessions.read().map_err(|_| IDENTITY_READ_ERR.clone())?;
            match sessions.get(&token) {
                None => return Err(LibraryError::Unauthorized),
                Some(active) if !active.is_expired(Instant::now()) => return Ok(active.session.clone()),
                Some(_) => {},
            }
        }
        self.sessions.write().map_err(|_| IDENTITY_WRITE_ERR.clone())?.remove(&token);
        Err(LibraryError::Unauthorized)
    }

    fn logout(&self, token: &str) -> Result<()> {
        self.sessions.write().map_err(|_| IDENTITY_WRITE_ERR.clone())?
            .remove(&SessionToken(token.into()))
            .map(|_| ())
            .ok_or(LibraryError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn identity() -> LocalIdentity {
        LocalIdentity::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn register_then_login() {
        let identity = identity();
        let registered = identity.register("  Student@Example.com ", "hunter22").unwrap();
        assert_eq!(registered.email(), "student@example.com");

        let logged_in = identity.login("student@example.com", "hunter22").unwrap();
        assert_eq!(logged_in.owner(), registered.owner());
        assert_ne!(logged_in.token(), registered.token());
        assert_eq!(identity.active_sessions().unwrap(), 2);
    }

    #[test]
    fn wrong_password_and_unknown_email_look_the_same() {
        let identity = identity();
        identity.register("a@b.c", "secret1").unwrap();
        assert!(matches!(identity.login("a@b.c", "secret2"), Err(LibraryError::InvalidCredentials)));
        assert!(matches!(identity.login("x@b.c", "secret1"), Err(LibraryError::InvalidCredentials)));
    }

    #[test]
    fn registration_rules() {
        let identity = identity();
        assert!(matches!(identity.register("a@b.c", "short"), Err(LibraryError::WeakPassword { min_length: 6 })));
        assert!(matches!(identity.register("   ", "longenough"), Err(LibraryError::MissingField("email"))));
        identity.register("a@b.c", "longenough").unwrap();
        assert!(matches!(identity.register("A@B.C", "longenough"), Err(LibraryError::EmailTaken)));
    }

    #[test]
    fn tokens_resolve_until_logout() {
        let identity = identity();
        let session = identity.register("a@b.c", "longenough").unwrap();
        let token = session.token().as_str().to_owned();

        assert_eq!(identity.resolve(&token).unwrap().owner(), session.owner());
        identity.logout(&token).unwrap();
        assert!(matches!(identity.resolve(&token), Err(LibraryError::Unauthorized)));
        assert!(matches!(identity.logout(&token), Err(LibraryError::Unauthorized)));
        assert!(matches!(identity.resolve("made-up"), Err(LibraryError::Unauthorized)));
    }

    #[test]
    fn expired_sessions_are_rejected_and_pruned() {
        let identity = LocalIdentity::with_ttl(Arc::new(MemoryStore::new()), Duration::ZERO);
        let first = identity.register("a@b.c", "longenough").unwrap();
        assert!(matches!(identity.resolve(first.token().as_str()), Err(LibraryError::Unauthorized)));

        for _ in 0..3 {
            identity.login("a@b.c", "longenough").unwrap();
        }
        assert_eq!(identity.sessions.read().unwrap().len(), 1);
        assert_eq!(identity.active_sessions().unwrap(), 0);
    }

    #[test]
    fn passwords_are_stored_as_argon2_hashes() {
        let store = Arc::new(MemoryStore::new());
        let identity = LocalIdentity::new(store.clone());
        identity.register("a@b.c", "longenough").unwrap();
        identity.register("d@e.f", "longenough").unwrap();
        let first = store.find_by_email("a@b.c").unwrap().unwrap();
        let second = store.find_by_email("d@e.f").unwrap().unwrap();

        assert!(first.password_hash.starts_with("$argon2id$"));
        assert!(!first.password_hash.contains("longenough"));
        assert_ne!(first.password_hash, second.password_hash);
        assert!(verify_password(&first, "longenough").unwrap());
        assert!(!verify_password(&first, "longenoughh").unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_a_storage_error() {
        let store = Arc::new(MemoryStore::new());
        store.insert(Account { owner: "u".into(), email: "a@b.c".to_owned(), password_hash: "plain".to_owned() }).unwrap();
        let identity = LocalIdentity::new(store);
        assert!(matches!(identity.login("a@b.c", "whatever"), Err(LibraryError::Storage(..))));
    }
}
