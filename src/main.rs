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
#[command(name = "mkfs", about = "Create an empty MiniVSFS disk image")]
struct Args {
    /// Output image path
    #[arg(long)]
    image: PathBuf,

    /// Image capacity in KiB, a multiple of 4 within 180..=4096
    #[arg(long = "size-kib")]
    size_kib: u64,

    /// Inode count within 128..=512
    #[arg(long)]
    inodes: u64,
}

fn run(args: &Args) -> Result<(), Error> {
    let image = Image::format(args.size_kib, args.inodes, timestamp_now())?;
    image.save(&args.image)?;
    let sb = image.superblock;
    println!(
        "Created '{}': {} blocks, {} inodes, inode table {} blocks",
        args.image.display(),
        { sb.total_blocks },
        { sb.inode_count },
        { sb.inode_table_blocks },
    );
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("mkfs: {e}");
        std::process::exit(1);
    }
}
