//! Packaging format types.

use crate::bundler::error::Error;
use std::{fmt, str::FromStr};

/// Output format of one archive spec.
///
/// Every variant except [`ArchiveFormat::Binary`] is backed by an
/// [`ArchiveWriter`](super::ArchiveWriter). `Binary` is the pass-through
/// format: binaries are published as-is without creating an archive file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ArchiveFormat {
    /// Gzip-compressed tarball with `.tar.gz` extension
    #[default]
    TarGz,
    /// Gzip-compressed tarball with `.tgz` extension
    Tgz,
    /// Uncompressed tarball
    Tar,
    /// Single gzip-compressed file
    Gz,
    /// Zip archive (deflate)
    Zip,
    /// No archive, binaries are uploaded raw
    Binary,
}

impl ArchiveFormat {
    /// The format string, also used as the file extension.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Tgz => "tgz",
            Self::Tar => "tar",
            Self::Gz => "gz",
            Self::Zip => "zip",
            Self::Binary => "binary",
        }
    }

    /// Extension appended to the rendered archive name.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Whether this is the pass-through format.
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary)
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArchiveFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tar.gz" => Ok(Self::TarGz),
            "tgz" => Ok(Self::Tgz),
            "tar" => Ok(Self::Tar),
            "gz" => Ok(Self::Gz),
            "zip" => Ok(Self::Zip),
            "binary" => Ok(Self::Binary),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}

impl serde::Serialize for ArchiveFormat {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for ArchiveFormat {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_formats() {
        assert_eq!("tar.gz".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::TarGz);
        assert_eq!("zip".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::Zip);
        assert!("binary".parse::<ArchiveFormat>().unwrap().is_binary());
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(matches!(
            "rar".parse::<ArchiveFormat>(),
            Err(Error::UnknownFormat(f)) if f == "rar"
        ));
    }
}
