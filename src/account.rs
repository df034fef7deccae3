//! Account model for pwdump lines (`DOMAIN\user:uid:lm:nt:::`).
//!
//! Use [`Account::from_pwdump`] to populate an account from the fields of one
//! hash-file line. Null hashes are the well-known digests of the empty
//! password; an LM hash is only "present" when it differs from the null one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Name exactly as it appears in the hash file, e.g. `CORP\alice`.
    pub name: String,
    pub sam_account_name: String,
    pub domain: String,
    pub uid: String,
    pub lm_hash: String,
    pub nt_hash: String,
    pub is_machine_account: bool,
}

impl Account {
    pub const NULL_HASH_LM: &'static str = "aad3b435b51404eeaad3b435b51404ee";
    pub const NULL_HASH_NT: &'static str = "31d6cfe0d16ae931b73c59d7e0c089c0";

    pub fn from_pwdump(name: &str, uid: &str, lm_hash: &str, nt_hash: &str) -> Self {
        let (domain, sam) = match name.split_once('\\') {
            Some((d, s)) => (d.trim().to_string(), s.trim().to_string()),
            None => (String::new(), name.trim().to_string()),
        };
        Self {
            name: name.to_string(),
            is_machine_account: sam.ends_with('$'),
            sam_account_name: sam,
            domain,
            uid: uid.to_string(),
            lm_hash: lm_hash.to_ascii_lowercase(),
            nt_hash: nt_hash.to_ascii_lowercase(),
        }
    }

    pub fn is_user_account(&self) -> bool {
        !self.is_machine_account
    }

    pub fn has_lm_hash(&self) -> bool {
        !self.lm_hash.is_empty() && self.lm_hash != Self::NULL_HASH_LM
    }

    /// NT hash of the empty password.
    pub fn has_empty_password(&self) -> bool {
        self.nt_hash == Self::NULL_HASH_NT
    }

    /// Candidate for the derived username wordlist.
    pub fn wordlist_name(&self) -> String {
        self.sam_account_name.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_domain_and_detects_machine_accounts() {
        let a = Account::from_pwdump("CORP\\Alice", "1104", Account::NULL_HASH_LM, "ab");
        assert_eq!(a.domain, "CORP");
        assert_eq!(a.sam_account_name, "Alice");
        assert!(a.is_user_account());
        assert_eq!(a.wordlist_name(), "alice");

        let m = Account::from_pwdump("CORP\\WS01$", "2001", Account::NULL_HASH_LM, "cd");
        assert!(m.is_machine_account);
        assert!(!m.is_user_account());
    }

    #[test]
    fn hash_flags() {
        let a = Account::from_pwdump(
            "bob",
            "500",
            "E52CAC67419A9A224A3B108F3FA6CB6D",
            Account::NULL_HASH_NT,
        );
        assert_eq!(a.domain, "");
        assert!(a.has_lm_hash());
        assert!(a.has_empty_password());

        let b = Account::from_pwdump("bob", "500", Account::NULL_HASH_LM, "8846f7eaee8fb117ad06bdd830b7586c");
        assert!(!b.has_lm_hash());
        assert!(!b.has_empty_password());
    }
}
