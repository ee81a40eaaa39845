//! Tries a list of passwords against a KDBX 3 database
//!
//! Candidates come from a comma separated list, a word list file, or both.
//! Prints the first password that unlocks the database.

use clap::Parser;
use kdbx_passwd::{ScanOptions, ScanOutcome};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the KeePass2 KDBX database
    #[arg(short, long)]
    file: PathBuf,

    /// Comma separated list of passwords to try
    #[arg(short, long, value_delimiter = ',')]
    passwords: Vec<String>,

    /// File with one password to try per line, tried after --passwords
    #[arg(short, long)]
    wordlist: Option<PathBuf>,

    /// Print the decryption specific fields from the file's header and exit
    #[arg(long)]
    header: bool,

    /// Worker threads, 0 for one per CPU
    #[arg(short, long, default_value_t = 1)]
    threads: usize,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn read_wordlist(path: &PathBuf) -> std::io::Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut words = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let word = line.strip_suffix('\r').unwrap_or(&line);
        if !word.is_empty() {
            words.push(word.to_string());
        }
    }
    Ok(words)
}

fn main() -> Result<(), kdbx_passwd::Error> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let kdbx = kdbx_passwd::open(&args.file)?;
    if args.header {
        print!("{}", kdbx.header());
        return Ok(());
    }

    let mut candidates = args.passwords;
    if let Some(wordlist) = &args.wordlist {
        candidates.extend(read_wordlist(wordlist)?);
    }
    if candidates.is_empty() {
        eprintln!("No passwords to try, use --passwords or --wordlist");
        std::process::exit(2);
    }

    let scanner = kdbx.scanner(ScanOptions::default().with_threads(args.threads))?;
    match scanner.scan(&candidates)? {
        ScanOutcome::Found { password, .. } => println!("The password is '{}'", password),
        _ => println!("Password not found"),
    }
    Ok(())
}
