use std::fmt::Display;

#[derive(Debug)]
pub enum Error {
    OutOfBounds,
    CorruptSuperblock,
    InvalidGeometry(&'static str),
    NoFreeInodes,
    NoFreeBlocks,
    DirectoryFull,
    FileTooLarge,
    NameTooLong,
    ReservedName,
    NotRegularFile,
    Io(std::io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "out of bounds"),
            Self::CorruptSuperblock => write!(f, "bad superblock"),
            Self::InvalidGeometry(why) => write!(f, "invalid geometry: {why}"),
            Self::NoFreeInodes => write!(f, "no free inode"),
            Self::NoFreeBlocks => write!(f, "no free data block"),
            Self::DirectoryFull => write!(f, "directory full"),
            Self::FileTooLarge => write!(f, "file too large"),
            Self::NameTooLong => write!(f, "name too long (58 max)"),
            Self::ReservedName => write!(f, "name cannot be '.' or '..'"),
            Self::NotRegularFile => write!(f, "not a regular file"),
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
