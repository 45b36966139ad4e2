// Class names loaded from a text file, one name per line

use crate::error::{Result, VisionError};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassNames {
    names: Vec<String>,
}

impl ClassNames {
    /// Read a names file; the path must be a regular file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let class_err = |reason: String| VisionError::ClassNames {
            path: path.display().to_string(),
            reason,
        };

        let is_file = fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
        if !is_file {
            return Err(class_err("not a regular file or does not exist".to_string()));
        }

        let text = fs::read_to_string(path).map_err(|e| class_err(e.to_string()))?;
        let names = Self::from_lines(text.lines());
        debug!(path = %path.display(), classes = names.len(), "Loaded class names");
        Ok(names)
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Name for `index`, or `class_<index>` when the file has no such line
    pub fn label(&self, index: usize) -> String {
        match self.get(index) {
            Some(name) => name.to_string(),
            None => format!("class_{}", index),
        }
    }
}
