//! Canonical output tree for a reporting run.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SoascapeError;

/// Paths of the output tree, relative to a configured root:
/// `log/`, `reports/public/xml/`, `reports/special/xml/`,
/// `reports/private/<unit>/xml/`, and `xsl/` for the style sheets.
/// HTML output lands one directory above each `xml/` folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root.join("log")
    }

    pub fn public_xml_dir(&self) -> PathBuf {
        self.root.join("reports").join("public").join("xml")
    }

    pub fn special_xml_dir(&self) -> PathBuf {
        self.root.join("reports").join("special").join("xml")
    }

    pub fn private_xml_dir(&self, unit_name: &str) -> PathBuf {
        self.root
            .join("reports")
            .join("private")
            .join(unit_name)
            .join("xml")
    }

    pub fn xsl_dir(&self) -> PathBuf {
        self.root.join("xsl")
    }

    /// Creates the directory if needed and hands it back.
    pub fn ensure(&self, dir: PathBuf) -> Result<PathBuf, SoascapeError> {
        fs::create_dir_all(&dir).map_err(|err| {
            SoascapeError::Setup(format!(
                "could not get output directory {}: {err}",
                dir.display()
            ))
        })?;
        Ok(dir)
    }
}
