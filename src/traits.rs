//! Reading and writing entry points shared by catalog types.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Cursor, Write},
    path::Path,
};

use crate::error::Error;

/// Moves a catalog between PO text and memory.
///
/// Implementors supply [`Parser::from_reader`] and [`Parser::to_writer`];
/// the path, string and byte variants are derived from those two.
///
/// # Example
///
/// ```rust,no_run
/// use pocodec::traits::Parser;
/// let catalog = pocodec::File::read_from("locale/de.po")?;
/// catalog.write_to("locale/de_copy.po")?;
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser {
    /// Reads a catalog from already-decoded UTF-8 text.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error>
    where
        Self: Sized;

    /// Reads the catalog stored at `path`.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path).map_err(Error::Io)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Emits PO text; the output is always UTF-8.
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error>;

    /// Creates or truncates `path` and writes the catalog to it.
    fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.to_writer(&mut writer)?;
        writer.flush().map_err(Error::Io)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        self.to_writer(&mut out)?;
        Ok(out)
    }

    fn from_str(s: &str) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(s))
    }

    /// Reads a catalog from raw bytes. The default treats them as UTF-8.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(bytes))
    }
}
