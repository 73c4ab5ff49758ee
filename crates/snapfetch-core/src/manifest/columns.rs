use csv::StringRecord;

use crate::error::ConfigError;

/// Column names as configured by the user, before looking at any header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name:      String,
    pub url:       String,
    pub subfolder: Option<String>,
    pub verifier:  Option<String>,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            name:      "filename".to_string(),
            url:       "file_url".to_string(),
            subfolder: None,
            verifier:  None,
        }
    }
}

impl ColumnSpec {
    #[must_use]
    pub fn name(mut self, column: impl Into<String>) -> Self {
        self.name = column.into();
        self
    }

    #[must_use]
    pub fn url(mut self, column: impl Into<String>) -> Self {
        self.url = column.into();
        self
    }

    #[must_use]
    pub fn subfolder(mut self, column: Option<String>) -> Self {
        self.subfolder = column;
        self
    }

    #[must_use]
    pub fn verifier(mut self, column: Option<String>) -> Self {
        self.verifier = column;
        self
    }
}

/// Logical roles resolved to concrete column positions.
///
/// Built once from the manifest header; everything downstream reads cells
/// through this mapping instead of looking names up again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub name:      usize,
    pub url:       usize,
    pub subfolder: Option<usize>,
    pub verifier:  Option<usize>,
}

impl ColumnMap {
    /// Match configured names against `headers`, ignoring case.
    pub fn resolve(headers: &StringRecord, spec: &ColumnSpec) -> Result<Self, ConfigError> {
        let lowered: Vec<String> = headers.iter().map(str::to_lowercase).collect();
        let find = |role: &'static str, column: &str| -> Result<usize, ConfigError> {
            let wanted = column.to_lowercase();
            lowered
                .iter()
                .position(|h| *h == wanted)
                .ok_or_else(|| ConfigError::MissingColumn {
                    role,
                    column: column.to_string(),
                    available: lowered.join(", "),
                })
        };

        Ok(Self {
            name:      find("name", &spec.name)?,
            url:       find("url", &spec.url)?,
            subfolder: spec.subfolder.as_deref().map(|c| find("subfolder", c)).transpose()?,
            verifier:  spec.verifier.as_deref().map(|c| find("verifier", c)).transpose()?,
        })
    }
}
