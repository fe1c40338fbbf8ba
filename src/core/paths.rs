//! core::paths
//!
//! Default locations of the files mactl edits.
//!
//! # Locations
//!
//! - `~/.zprofile` - user-scope environment variables (zsh login shells)
//! - `/etc/zprofile` - system-scope environment variables
//! - `~/.ssh/` - SSH key pairs
//!
//! Each default can be overridden through [`crate::core::settings`].

use std::path::{Path, PathBuf};

/// File name of the user-scope profile under the home directory.
pub const USER_PROFILE_NAME: &str = ".zprofile";

/// Path of the system-scope profile.
pub const SYSTEM_PROFILE_PATH: &str = "/etc/zprofile";

/// Get the default user profile, `~/.zprofile`.
///
/// Returns `None` when the home directory cannot be determined.
pub fn default_user_profile() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(USER_PROFILE_NAME))
}

/// Get the default system profile, `/etc/zprofile`.
pub fn default_system_profile() -> PathBuf {
    PathBuf::from(SYSTEM_PROFILE_PATH)
}

/// Get the default SSH directory, `~/.ssh`.
pub fn default_ssh_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ssh"))
}

/// Get the public key path paired with a private key path.
///
/// # Example
///
/// ```
/// use mactl::core::paths::public_key_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(
///     public_key_path(Path::new("/home/me/.ssh/id_ed25519")),
///     PathBuf::from("/home/me/.ssh/id_ed25519.pub")
/// );
/// ```
pub fn public_key_path(private_key: &Path) -> PathBuf {
    let mut name = private_key.as_os_str().to_os_string();
    name.push(".pub");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_profile_is_fixed() {
        assert_eq!(default_system_profile(), PathBuf::from("/etc/zprofile"));
    }

    #[test]
    fn user_profile_under_home() {
        if let (Some(home), Some(profile)) = (dirs::home_dir(), default_user_profile()) {
            assert_eq!(profile, home.join(".zprofile"));
        }
    }

    #[test]
    fn public_key_keeps_dotted_names() {
        assert_eq!(
            public_key_path(Path::new("keys/work.key")),
            PathBuf::from("keys/work.key.pub")
        );
    }
}
