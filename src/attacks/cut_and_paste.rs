// ECB cut-and-paste

use log::debug;

use crate::{pkcs7_pad, profile::ProfileService, Error, Result};

/// A ciphertext that decrypts to an admin profile, and the email it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgedProfile {
    pub email: String,
    pub ciphertext: Vec<u8>,
}

/// Forges an admin profile by splicing blocks from two honest ciphertexts.
///
/// Only the record layout is assumed known: the field in front of the email,
/// and the role a new profile gets. Where `role=` falls is found by probing.
#[derive(Debug, Clone)]
pub struct ProfileForgeryAttacker {
    pub block_size: usize,
    /// Everything in the record before the email, e.g. `email=`.
    pub field_prefix: String,
    /// The role given to profiles the service hands out.
    pub default_role: String,
    /// Domain used to dress up padding emails.
    pub domain: String,
}

impl Default for ProfileForgeryAttacker {
    fn default() -> Self {
        Self {
            block_size: 16,
            field_prefix: "email=".to_string(),
            default_role: "user".to_string(),
            domain: "@bar.com".to_string(),
        }
    }
}

impl ProfileForgeryAttacker {
    /// Generate a valid ciphertext for an admin profile.
    pub fn forge_admin<S: ProfileService + ?Sized>(&self, service: &S) -> Result<ForgedProfile> {
        let block_size = self.block_size;

        // Remember a profile is encoded as so:
        //  email=foo@bar.com&uid=10&role=user
        // We want an email that makes the record end in a block holding just
        // the role:
        //  email=aaaaa@bar. com&uid=10&role= user<padding>
        let paste_email = self.role_aligned_email(service)?;
        let paste_profile = service.encrypt_profile(&paste_email);

        // Next, an email that puts 'admin' plus valid padding in a block of
        // its own:
        //  email=aaaaaaaaaa admin<padding> @bar.com&uid=10& role=user<padding>
        let n_filler = (block_size - self.field_prefix.len() % block_size) % block_size;
        let admin_block_idx = (self.field_prefix.len() + n_filler) / block_size;
        let admin_block: String = pkcs7_pad(b"admin", block_size)
            .into_iter()
            .map(char::from)
            .collect();
        let cut_email = format!("{}{admin_block}{}", "a".repeat(n_filler), self.domain);
        let cut_profile = service.encrypt_profile(&cut_email);

        // Replace the final 'user' block with the 'admin' block.
        let ciphertext = [
            &paste_profile[..(paste_profile.len() - block_size)],
            &cut_profile[(admin_block_idx * block_size)..((admin_block_idx + 1) * block_size)],
        ]
        .concat();

        let fields = service.decrypt_profile(&ciphertext)?;
        match fields.get("role").map(String::as_str) {
            Some("admin") => Ok(ForgedProfile {
                email: paste_email,
                ciphertext,
            }),
            role => Err(Error::ForgeryRejected {
                role: role.unwrap_or_default().to_string(),
            }),
        }
    }

    /// Find an email whose record has `role=` end exactly on a block boundary.
    ///
    /// Grow the email until the ciphertext gains a block: at that point the
    /// record fills its blocks exactly, so making the email longer by the
    /// length of the default role pushes the role alone into the last block.
    fn role_aligned_email<S: ProfileService + ?Sized>(&self, service: &S) -> Result<String> {
        let base_len = service.encrypt_profile("").len();
        for n in 1..=self.block_size {
            if service.encrypt_profile(&self.email_of_len(n)).len() > base_len {
                let len = n + self.default_role.len();
                debug!("record fills its blocks with a {n}-byte email; using {len} bytes");
                return Ok(self.email_of_len(len));
            }
        }
        Err(Error::BlockSizeIndeterminate {
            max_input_len: self.block_size,
        })
    }

    fn email_of_len(&self, len: usize) -> String {
        if len > self.domain.len() {
            format!("{}{}", "a".repeat(len - self.domain.len()), self.domain)
        } else {
            "a".repeat(len)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use rand::{rngs::StdRng, SeedableRng};
    use rstest::rstest;

    use crate::profile::ProfileOracle;

    /// Accepts anything, and never grants admin.
    struct StubbornService;

    impl ProfileService for StubbornService {
        fn encrypt_profile(&self, email: &str) -> Vec<u8> {
            pkcs7_pad(format!("email={email}&uid=10&role=user").as_bytes(), 16)
        }

        fn decrypt_profile(&self, _: &[u8]) -> Result<HashMap<String, String>> {
            Ok(HashMap::from([("role".to_string(), "user".to_string())]))
        }
    }

    #[rstest]
    #[case(10)]
    #[case(7)]
    #[case(123456789)]
    fn forge_admin_succeeds_for_any_uid_width(#[case] uid: u64) {
        let _ = simple_logger::init_with_level(log::Level::Debug);
        let oracle = ProfileOracle::with_random_key(&mut StdRng::seed_from_u64(uid)).with_uid(uid);

        let forged = ProfileForgeryAttacker::default().forge_admin(&oracle).unwrap();

        let fields = oracle.decrypt_profile(&forged.ciphertext).unwrap();
        assert_eq!(fields["role"], "admin");
        assert_eq!(fields["email"], forged.email);
        assert_eq!(fields["uid"], uid.to_string());
    }

    #[test]
    fn forge_admin_uses_a_13_byte_email_with_two_digit_uid() {
        let oracle = ProfileOracle::new(*b"YELLOW SUBMARINE");

        let forged = ProfileForgeryAttacker::default().forge_admin(&oracle).unwrap();

        assert_eq!(forged.email, "aaaaa@bar.com");
        assert_eq!(forged.ciphertext.len(), 48);
    }

    #[test]
    fn forge_admin_reports_rejected_forgery() {
        let result = ProfileForgeryAttacker::default().forge_admin(&StubbornService);

        assert_eq!(
            result,
            Err(Error::ForgeryRejected {
                role: "user".to_string()
            })
        );
    }

    #[rstest]
    #[case(0, "")]
    #[case(5, "aaaaa")]
    #[case(13, "aaaaa@bar.com")]
    fn email_of_len_has_requested_length(#[case] len: usize, #[case] expected: &str) {
        let email = ProfileForgeryAttacker::default().email_of_len(len);

        assert_eq!(email, expected);
        assert_eq!(email.len(), len);
    }
}
