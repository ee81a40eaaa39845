//! Prints the parsed header of a kdbx database
//!
//! Primarily for investigating the kdbx format.

fn main() -> Result<(), kdbx_passwd::Error> {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        println!("Usage: kdbx-dump-header <path to kdbx file>");
        return Ok(());
    }
    let kdbx = kdbx_passwd::open(&args[1])?;
    println!("Version: {}.{}", kdbx.major_version(), kdbx.minor_version());
    print!("{}", kdbx.header());
    println!("Body bytes kept: {}", kdbx.body_start().len());
    Ok(())
}
