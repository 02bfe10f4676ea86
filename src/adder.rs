#![allow(dead_code)]

use std::path::PathBuf;

use clap::Parser;

pub(crate) use error::Error;
use filesystem::{timestamp_now, Image};

mod checksum;
mod error;
mod filesystem;
mod structs;

#[derive(Parser, Debug)]
#[command(name = "adder", about = "Add one regular file to a MiniVSFS image")]
struct Args {
    /// Existing image path, never modified
    #[arg(long)]
    input: PathBuf,

    /// Output image path
    #[arg(long)]
    output: PathBuf,

    /// Name of a regular file in the current working directory
    #[arg(long)]
    file: String,
}

fn run(args: &Args) -> Result<(), Error> {
    if args.file == "." || args.file == ".." {
        return Err(Error::ReservedName);
    }
    if args.file.len() > structs::NAME_MAX {
        return Err(Error::NameTooLong);
    }
    let metadata = std::fs::metadata(&args.file)?;
    if !metadata.is_file() {
        return Err(Error::NotRegularFile);
    }
    let contents = std::fs::read(&args.file)?;

    let mut image = Image::open(&args.input)?;
    let inode_no = image.add_file(&args.file, &contents, timestamp_now())?;
    image.save(&args.output)?;
    println!(
        "Added '{}' to '{}' as inode {} ({} bytes), wrote '{}'",
        args.file,
        args.input.display(),
        inode_no,
        contents.len(),
        args.output.display(),
    );
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("adder: {e}");
        std::process::exit(1);
    }
}
