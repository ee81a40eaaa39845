//! Trying candidate passphrases against a locked database

use crate::binary::errors::UnlockError;
use crate::binary::Kdbx;
use crate::crypto::{CompositeKey, KeyDerivation};
use crate::stream::StartBytesVerifier;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
/// Settings for a passphrase scan
pub struct ScanOptions {
    /// Number of worker threads, 1 scans on the calling thread and 0 uses
    /// one worker per logical CPU
    pub threads: usize,
    /// Flag checked between candidates, the scan stops once it is set
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for ScanOptions {
    fn default() -> ScanOptions {
        ScanOptions {
            threads: 1,
            cancel: None,
        }
    }
}

impl ScanOptions {
    /// Use the given number of worker threads
    pub fn with_threads(mut self, threads: usize) -> ScanOptions {
        self.threads = threads;
        self
    }

    /// Stop scanning once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> ScanOptions {
        self.cancel = Some(flag);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of a passphrase scan
pub enum ScanOutcome {
    /// A candidate decrypted the stream start bytes
    Found {
        /// The matching passphrase
        password: String,
        /// Position of the passphrase in the candidate list
        index: usize,
        /// Number of candidates tried, including the match
        attempts: usize,
    },
    /// Every candidate was tried and none matched
    Exhausted {
        /// Number of candidates tried
        attempts: usize,
    },
    /// The cancel flag was set before a match was found
    Cancelled {
        /// Number of candidates tried
        attempts: usize,
    },
}

impl ScanOutcome {
    /// The matching passphrase, if any
    pub fn password(&self) -> Option<&str> {
        match self {
            ScanOutcome::Found { password, .. } => Some(password),
            _ => None,
        }
    }

    /// Number of candidates tried
    pub fn attempts(&self) -> usize {
        match self {
            ScanOutcome::Found { attempts, .. }
            | ScanOutcome::Exhausted { attempts }
            | ScanOutcome::Cancelled { attempts } => *attempts,
        }
    }
}

/// Tries candidate passphrases against one database
///
/// Each candidate derives its own key from the header parameters and
/// decrypts the body start afresh, so candidates can be checked in
/// any order or in parallel. The earliest matching candidate is reported.
pub struct Scanner<'a> {
    derivation: KeyDerivation,
    verifier: StartBytesVerifier,
    body_start: &'a [u8],
    options: ScanOptions,
}

impl<'a> Scanner<'a> {
    /// Prepare a scan, validating every header field the scan depends on
    pub fn new(kdbx: &'a Kdbx, options: ScanOptions) -> Result<Scanner<'a>, UnlockError> {
        let header = kdbx.header();
        let derivation = KeyDerivation::new(header)?;
        let verifier = StartBytesVerifier::new(header)?;
        Ok(Scanner {
            derivation,
            verifier,
            body_start: kdbx.body_start(),
            options,
        })
    }

    /// Check a single passphrase
    pub fn check(&self, password: &str) -> bool {
        let key = CompositeKey::from_password(password);
        let candidate = self.derivation.derive(&key);
        self.verifier.matches(self.body_start, &candidate)
    }

    fn cancelled(&self) -> bool {
        self.options
            .cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    /// Try each candidate in order, stopping at the first match
    pub fn scan<S>(&self, candidates: &[S]) -> Result<ScanOutcome, UnlockError>
    where
        S: AsRef<str> + Sync,
    {
        log::info!(
            "Trying {} candidates, {} transform rounds each, {} worker(s)",
            candidates.len(),
            self.derivation.transform_rounds(),
            self.options.threads
        );
        let outcome = if self.options.threads == 1 {
            self.scan_sequential(candidates)
        } else {
            self.scan_parallel(candidates)?
        };
        match &outcome {
            ScanOutcome::Found {
                index, attempts, ..
            } => log::info!(
                "Found password at candidate {} after {} attempts",
                index,
                attempts
            ),
            ScanOutcome::Exhausted { attempts } => {
                log::info!("No match in {} candidates", attempts)
            }
            ScanOutcome::Cancelled { attempts } => {
                log::info!("Scan cancelled after {} attempts", attempts)
            }
        }
        Ok(outcome)
    }

    /// Try candidates from an iterator on the calling thread
    ///
    /// Candidates are pulled one at a time, none is pulled after a match.
    pub fn scan_sequential<I, S>(&self, candidates: I) -> ScanOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut attempts = 0;
        for (index, candidate) in candidates.into_iter().enumerate() {
            if self.cancelled() {
                return ScanOutcome::Cancelled { attempts };
            }
            let candidate = candidate.as_ref();
            attempts += 1;
            log::debug!("Trying candidate {}", index);
            log::trace!("Candidate {} is '{}'", index, candidate);
            if self.check(candidate) {
                return ScanOutcome::Found {
                    password: candidate.to_string(),
                    index,
                    attempts,
                };
            }
        }
        ScanOutcome::Exhausted { attempts }
    }

    fn scan_parallel<S>(&self, candidates: &[S]) -> Result<ScanOutcome, UnlockError>
    where
        S: AsRef<str> + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.threads)
            .build()?;
        let attempts = AtomicUsize::new(0);
        let found = pool.install(|| {
            candidates.par_iter().position_first(|candidate| {
                if self.cancelled() {
                    return false;
                }
                attempts.fetch_add(1, Ordering::Relaxed);
                self.check(candidate.as_ref())
            })
        });
        let attempts = attempts.into_inner();

        Ok(match found {
            Some(index) => ScanOutcome::Found {
                password: candidates[index].as_ref().to_string(),
                index,
                attempts,
            },
            None if self.cancelled() => ScanOutcome::Cancelled { attempts },
            None => ScanOutcome::Exhausted { attempts },
        })
    }
}
