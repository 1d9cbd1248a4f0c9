//! Reference data fetched through capabilities: error codes and last names.

use llsd::LlsdValue;

/// Errors raised when a decoded response does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogShapeError {
    /// The error code response was not a sequence of pairs.
    #[error("error code table is malformed: {message}")]
    ErrorCodes {
        /// What was wrong with the decoded value.
        message: String,
    },
    /// The last name response was not a map of identifier to name.
    #[error("last name catalogue is malformed: {message}")]
    LastNames {
        /// What was wrong with the decoded value.
        message: String,
    },
}

impl CatalogShapeError {
    fn error_codes(message: impl Into<String>) -> Self {
        Self::ErrorCodes {
            message: message.into(),
        }
    }

    fn last_names(message: impl Into<String>) -> Self {
        Self::LastNames {
            message: message.into(),
        }
    }
}

/// One service error code and its description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCodeEntry {
    /// Code as rendered text (codes arrive as integers or strings).
    pub code: String,
    /// Human-readable description.
    pub description: String,
}

/// Error codes published by the registration service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorCodeTable {
    entries: Vec<ErrorCodeEntry>,
}

impl ErrorCodeTable {
    /// Decode a sequence of `[code, description]` pairs.
    ///
    /// Extra trailing elements in a pair are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogShapeError::ErrorCodes`] when the value is not an array
    /// of arrays with two scalar leading elements.
    ///
    /// # Examples
    /// ```
    /// use llsd::LlsdValue;
    /// use registration_client::domain::ErrorCodeTable;
    ///
    /// let value = LlsdValue::Array(vec![LlsdValue::Array(vec![
    ///     LlsdValue::Integer(10),
    ///     LlsdValue::from("Name taken"),
    /// ])]);
    /// let table = ErrorCodeTable::from_llsd(&value)?;
    /// assert_eq!(table.entries()[0].code, "10");
    /// # Ok::<(), registration_client::domain::CatalogShapeError>(())
    /// ```
    pub fn from_llsd(value: &LlsdValue) -> Result<Self, CatalogShapeError> {
        let rows = value.as_array().ok_or_else(|| {
            CatalogShapeError::error_codes(format!(
                "expected an array, found {}",
                value.type_name()
            ))
        })?;

        let entries = rows
            .iter()
            .enumerate()
            .map(|(index, row)| decode_error_code(index, row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Entries in response order.
    #[must_use]
    pub fn entries(&self) -> &[ErrorCodeEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return true when the service published no codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn decode_error_code(index: usize, row: &LlsdValue) -> Result<ErrorCodeEntry, CatalogShapeError> {
    let pair = row.as_array().ok_or_else(|| {
        CatalogShapeError::error_codes(format!(
            "entry {index} should be an array, found {}",
            row.type_name()
        ))
    })?;
    let (code, description) = match pair {
        [code, description, ..] => (code, description),
        _ => {
            return Err(CatalogShapeError::error_codes(format!(
                "entry {index} should hold a code and a description"
            )));
        }
    };
    let scalar = |value: &LlsdValue, field: &str| {
        value.scalar_text().ok_or_else(|| {
            CatalogShapeError::error_codes(format!(
                "entry {index} {field} should be a scalar, found {}",
                value.type_name()
            ))
        })
    };
    Ok(ErrorCodeEntry {
        code: scalar(code, "code")?,
        description: scalar(description, "description")?,
    })
}

/// One last name open for registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastNameEntry {
    /// Opaque identifier sent back as `last_name_id`.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Last names offered by the service, in decoded document order.
///
/// # Examples
/// ```
/// use llsd::{LlsdMap, LlsdValue};
/// use registration_client::domain::LastNameCatalog;
///
/// let map: LlsdMap = [("9", "Linden"), ("7", "Resident")].into_iter().collect();
/// let catalog = LastNameCatalog::from_llsd(&LlsdValue::Map(map))?;
/// assert_eq!(catalog.first_available().map(|entry| entry.id.as_str()), Some("9"));
/// # Ok::<(), registration_client::domain::CatalogShapeError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastNameCatalog {
    entries: Vec<LastNameEntry>,
}

impl LastNameCatalog {
    /// Decode a map of identifier to last name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogShapeError::LastNames`] when the value is not a map or
    /// a name is not a scalar.
    pub fn from_llsd(value: &LlsdValue) -> Result<Self, CatalogShapeError> {
        let map = value.as_map().ok_or_else(|| {
            CatalogShapeError::last_names(format!("expected a map, found {}", value.type_name()))
        })?;

        let entries = map
            .iter()
            .map(|(id, name)| {
                name.scalar_text()
                    .map(|text| LastNameEntry {
                        id: id.to_owned(),
                        name: text,
                    })
                    .ok_or_else(|| {
                        CatalogShapeError::last_names(format!(
                            "last name '{id}' should be a scalar, found {}",
                            name.type_name()
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// The entry used for registration: the first one in document order.
    #[must_use]
    pub fn first_available(&self) -> Option<&LastNameEntry> {
        self.entries.first()
    }

    /// Entries in document order.
    #[must_use]
    pub fn entries(&self) -> &[LastNameEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return true when no last names were offered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
