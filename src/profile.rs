// User profiles encoded as `k=v&...` queries and encrypted with AES-ECB.

use std::{collections::HashMap, fmt::Display};

use rand::Rng;

use crate::{
    cipher::{Aes128, AES_BLOCK_SIZE},
    modes::{BlockMode, Ecb},
    pkcs7_pad, pkcs7_unpad,
    random::random_bytes,
    Error, Result,
};

/// Encrypts profiles for an email address and decrypts them back to fields.
pub trait ProfileService {
    fn encrypt_profile(&self, email: &str) -> Vec<u8>;

    fn decrypt_profile(&self, ciphertext: &[u8]) -> Result<HashMap<String, String>>;
}

#[derive(Debug, PartialEq, Eq)]
pub struct UserProfile {
    email: String,
    uid: u64,
    role: String,
}

impl UserProfile {
    pub fn new(email: &str, uid: u64, role: &str) -> Self {
        UserProfile {
            email: email.to_string(),
            uid,
            role: role.to_string(),
        }
    }

    /// A regular user profile. Query metacharacters are stripped from the email.
    pub fn profile_for(email: &str, uid: u64) -> Self {
        let email: String = email.chars().filter(|c| !matches!(*c, '&' | '=')).collect();
        Self::new(&email, uid, "user")
    }
}

impl Display for UserProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "email={}&uid={}&role={}", self.email, self.uid, self.role)
    }
}

impl TryFrom<&str> for UserProfile {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        let parsed = parse_query(value)?;
        let field = |name: &str| {
            parsed
                .get(name)
                .cloned()
                .ok_or_else(|| Error::MalformedQuery(format!("{name} not parsed from query")))
        };
        Ok(Self {
            email: field("email")?,
            uid: field("uid")?
                .parse::<u64>()
                .map_err(|e| Error::MalformedQuery(format!("cannot parse uid: {e}")))?,
            role: field("role")?,
        })
    }
}

/// Parse `k1=v1&k2=v2` into a map. Every pair must contain an `=`.
pub fn parse_query(query: &str) -> Result<HashMap<String, String>> {
    query
        .split('&')
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| Error::MalformedQuery(format!("no '=' in '{pair}'")))
        })
        .collect()
}

/// Hands out encrypted profiles under a key it never reveals.
pub struct ProfileOracle {
    ecb: Ecb<Aes128>,
    uid: u64,
}

impl ProfileOracle {
    pub fn new(key: [u8; AES_BLOCK_SIZE]) -> Self {
        Self {
            ecb: Ecb::new(Aes128::new(&key)),
            uid: 10,
        }
    }

    pub fn with_random_key<R: Rng>(rng: &mut R) -> Self {
        Self::new(random_bytes(rng))
    }

    /// Use `uid` for every profile handed out.
    pub fn with_uid(mut self, uid: u64) -> Self {
        self.uid = uid;
        self
    }
}

impl ProfileService for ProfileOracle {
    fn encrypt_profile(&self, email: &str) -> Vec<u8> {
        let profile = UserProfile::profile_for(email, self.uid);
        self.ecb
            .encrypt(&pkcs7_pad(profile.to_string().as_bytes(), self.ecb.block_size()))
    }

    fn decrypt_profile(&self, ciphertext: &[u8]) -> Result<HashMap<String, String>> {
        if ciphertext.is_empty() || ciphertext.len() % self.ecb.block_size() != 0 {
            return Err(Error::InvalidPadding);
        }
        let mut plaintext = self.ecb.decrypt(ciphertext);
        pkcs7_unpad(&mut plaintext)?;
        let query = String::from_utf8(plaintext)
            .map_err(|e| Error::MalformedQuery(format!("profile is not utf-8: {e}")))?;
        parse_query(&query)
    }
}
