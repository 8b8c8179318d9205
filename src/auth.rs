use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
const TOKEN_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username and password cannot be empty")]
    EmptyField,
    #[error("username {0:?} is already taken")]
    UsernameTaken(String),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("credential store error: {0}")]
    Storage(String),
}

/// Proof of a completed login. There is no server-side session registry and
/// no expiry; dropping the value is the logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub token: String,
}

#[derive(Debug, Clone)]
struct Credential {
    username: String,
    salt: Vec<u8>,
    hash: Vec<u8>,
    created_at: String,
}

/// Flat-file credential store: one `username,salt,hash,created_at` CSV row
/// per user, unique on username. Two processes registering at once race on
/// the read-modify-write of this file; that is a documented limitation, not
/// something this store guards against.
pub struct CredentialStore {
    path: PathBuf,
    credentials: Vec<Credential>,
}

impl CredentialStore {
    pub fn open(path: &Path) -> Result<Self, AuthError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| AuthError::Storage(e.to_string()))?;
        }
        if !path.exists() {
            fs::write(path, "username,salt,hash,created_at\n")
                .map_err(|e| AuthError::Storage(e.to_string()))?;
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        let mut credentials = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| AuthError::Storage(e.to_string()))?;
            let Some(credential) = parse_credential(&record) else {
                log::warn!("skipping malformed credential row in {}", path.display());
                continue;
            };
            credentials.push(credential);
        }

        Ok(Self {
            path: path.to_path_buf(),
            credentials,
        })
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn register(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        let username = username.trim();
        let password = password.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::EmptyField);
        }
        if self.credentials.iter().any(|c| c.username == username) {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }

        let mut salt = vec![0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let hash = derive_hash(password, &salt);

        self.credentials.push(Credential {
            username: username.to_string(),
            salt,
            hash,
            created_at: Utc::now().to_rfc3339(),
        });
        self.save()
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let username = username.trim();
        let credential = self
            .credentials
            .iter()
            .find(|c| c.username == username)
            .ok_or(AuthError::InvalidCredentials)?;

        let candidate = derive_hash(password.trim(), &credential.salt);
        if candidate != credential.hash {
            return Err(AuthError::InvalidCredentials);
        }

        let mut token = vec![0u8; TOKEN_LEN];
        rand::thread_rng().fill_bytes(&mut token);
        Ok(Session {
            username: username.to_string(),
            token: BASE64.encode(token),
        })
    }

    pub fn logout(&self, _session: Session) {
        // Sessions live only in the caller; consuming the value ends it.
    }

    fn save(&self) -> Result<(), AuthError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(["username", "salt", "hash", "created_at"])
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        for c in &self.credentials {
            writer
                .write_record([
                    c.username.as_str(),
                    &BASE64.encode(&c.salt),
                    &BASE64.encode(&c.hash),
                    c.created_at.as_str(),
                ])
                .map_err(|e| AuthError::Storage(e.to_string()))?;
        }
        let out = writer
            .into_inner()
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("csv.tmp");
        fs::write(&tmp, out).map_err(|e| AuthError::Storage(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| AuthError::Storage(e.to_string()))?;
        Ok(())
    }
}

pub fn default_credentials_path() -> Option<PathBuf> {
    crate::dataset::app_cache_dir().map(|dir| dir.join("user_credentials.csv"))
}

fn parse_credential(record: &csv::StringRecord) -> Option<Credential> {
    let username = record.get(0)?.to_string();
    let salt = BASE64.decode(record.get(1)?.as_bytes()).ok()?;
    let hash = BASE64.decode(record.get(2)?.as_bytes()).ok()?;
    if username.is_empty() || salt.is_empty() || hash.is_empty() {
        return None;
    }
    Some(Credential {
        username,
        salt,
        hash,
        created_at: record.get(3).unwrap_or_default().to_string(),
    })
}

fn derive_hash(password: &str, salt: &[u8]) -> Vec<u8> {
    let mut hash = vec![0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut hash);
    hash
}
