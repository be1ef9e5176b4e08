//! Authentication gate
//!
//! Decides whether a session at a given authentication tier may run a verb.
//! The dispatcher consults the gate before any handler is constructed.

use std::fmt;

/// Authentication tier of a session.
///
/// Sessions start `Unauthenticated` and move to `Anonymous` or
/// `Authenticated` after a successful `USER`/`PASS` exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthTier {
    #[default]
    Unauthenticated,
    Anonymous,
    Authenticated,
}

/// Verbs a session may run before logging in.
pub const UNAUTHENTICATED_VERBS: [&str; 3] = ["USER", "PASS", "QUIT"];

/// Verbs a guest session may run. Everything that writes to storage is absent.
pub const ANONYMOUS_VERBS: [&str; 20] = [
    "USER", "PASS", "CWD", "LIST", "MDTM", "NLST", "PASV", "PWD", "QUIT", "RETR", "SIZE", "TYPE",
    "CDUP", "NOOP", "SYST", "PORT", "MLST", "MLSD", "HASH", "RANG",
];

/// Why the gate refused a verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDenial {
    LoginRequired,
    GuestForbidden,
}

impl AuthDenial {
    /// The `530` reply line sent to the client.
    pub fn reply(&self) -> &'static str {
        match self {
            AuthDenial::LoginRequired => "530 Login first with USER and PASS, or QUIT\r\n",
            AuthDenial::GuestForbidden => "530 Guest user is not allowed to use that command\r\n",
        }
    }
}

impl fmt::Display for AuthDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reply().trim_end())
    }
}

/// Maps (tier, verb) to allow or deny.
pub struct AuthGate;

impl AuthGate {
    /// Checks whether `verb` may run at `tier`.
    ///
    /// `verb` must be the canonical, uppercased verb of a registered command;
    /// synonyms are checked under the verb they stand for.
    pub fn permit(tier: AuthTier, verb: &str) -> Result<(), AuthDenial> {
        match tier {
            AuthTier::Authenticated => Ok(()),
            AuthTier::Anonymous if ANONYMOUS_VERBS.contains(&verb) => Ok(()),
            AuthTier::Anonymous => Err(AuthDenial::GuestForbidden),
            AuthTier::Unauthenticated if UNAUTHENTICATED_VERBS.contains(&verb) => Ok(()),
            AuthTier::Unauthenticated => Err(AuthDenial::LoginRequired),
        }
    }
}
