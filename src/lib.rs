#![deny(missing_docs)]

//! Recover the passphrase of a KDBX 3 (Keepass 2) database.
//!
//! The main types in this crate are:
//!
//! * [`Kdbx`] which represents a locked database file and its unencrypted header
//! * [`CompositeKey`] which holds the credentials of one guess
//! * [`Scanner`] which tries a list of candidate passphrases against a database
//!
//! # Opening a database
//!
//! Databases can be read with the [`kdbx_passwd::open`] function. This parses
//! the unencrypted header and keeps the first encrypted bytes of the body, which
//! are all that is needed to check a key.
//!
//! ```no_run
//! # fn main() -> Result<(), kdbx_passwd::Error> {
//! let kdbx = kdbx_passwd::open("./vault.kdbx")?;
//! println!("{}", kdbx.header());
//! # Ok(())
//! # }
//! ```
//!
//! # Recovering a passphrase
//!
//! A [`Scanner`] derives a key for each candidate using the header's own
//! key derivation parameters and checks it against the stream start bytes
//! stored in the header. The first matching candidate wins.
//!
//! ```no_run
//! use kdbx_passwd::{ScanOptions, ScanOutcome};
//!
//! # fn main() -> Result<(), kdbx_passwd::Error> {
//! let kdbx = kdbx_passwd::open("./vault.kdbx")?;
//! let scanner = kdbx.scanner(ScanOptions::default())?;
//! match scanner.scan(&["hunter2", "correct horse"])? {
//!     ScanOutcome::Found { password, .. } => println!("The password is '{}'", password),
//!     _ => println!("Password not found"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Alternatively, [`kdbx_passwd::from_reader`] can be used to read a database
//! from a non file source (such as in-memory or a network stream)
//!
//! [`CompositeKey`]: crate::CompositeKey
//! [`Kdbx`]: crate::Kdbx
//! [`Scanner`]: crate::Scanner
//! [`kdbx_passwd::from_reader`]: crate::from_reader
//! [`kdbx_passwd::open`]: crate::open

pub mod binary;
mod crypto;
pub mod errors;
mod scan;
mod stream;
mod utils;

pub use binary::{from_reader, open, Kdbx, SecurityHeader};
pub use crypto::{CandidateKey, CompositeKey, KeyDerivation};
pub use errors::Error;
pub use scan::{ScanOptions, ScanOutcome, Scanner};
pub use stream::StartBytesVerifier;
