//! Validated primitive types shared by the Care Desk crates.
//!
//! Each type here guarantees its invariant at construction time, so downstream code can
//! accept the type instead of re-validating raw strings.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// Errors raised when a value does not match its expected format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("invalid phone number: {0}")]
    PhoneNumber(String),
    #[error("invalid pincode: {0}")]
    Pincode(String),
}

/// Country calling code assumed for numbers typed without one.
pub const DEFAULT_CALLING_CODE: &str = "91";

/// Free text with at least one non-whitespace character, stored trimmed.
///
/// Registration text inputs (name, address, village, insurer) are kept raw while the user
/// types; this is the form they take once the draft is read for submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Trims `input` and wraps it.
    ///
    /// # Arguments
    ///
    /// * `input` - Raw text as typed, possibly padded with whitespace
    ///
    /// # Returns
    ///
    /// The trimmed text.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if nothing is left after trimming.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        match input.as_ref().trim() {
            "" => Err(TextError::Empty),
            trimmed => Ok(Self(trimmed.to_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NonEmptyText {
    type Error = TextError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyText> for String {
    fn from(text: NonEmptyText) -> Self {
        text.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Strips the formatting characters people type into phone inputs.
///
/// Whitespace, `-`, `(` and `)` are removed; everything else is kept as typed.
pub fn compact_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect()
}

/// A phone number normalised to E.164 form (`+` followed by 10 to 15 digits).
///
/// Numbers typed without a country code are read as Indian numbers:
/// - ten digits become `+91` followed by the digits,
/// - a leading trunk `0` on an eleven digit number is dropped,
/// - twelve digits starting with `91` gain the `+` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalises a typed phone number.
    ///
    /// # Arguments
    ///
    /// * `raw` - The number as typed; spaces, `-`, `(` and `)` are ignored
    ///
    /// # Returns
    ///
    /// The number in `+<digits>` form.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::PhoneNumber` carrying `raw` if the input is partial, has
    /// non-digit characters, or cannot be read as an Indian or international number.
    pub fn parse(raw: &str) -> Result<Self, ValueError> {
        let compact = compact_phone(raw);
        let invalid = || ValueError::PhoneNumber(raw.to_string());

        let digits = match compact.strip_prefix('+') {
            Some(rest) => rest.to_string(),
            None => {
                if !compact.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                match compact.len() {
                    10 => format!("{DEFAULT_CALLING_CODE}{compact}"),
                    11 if compact.starts_with('0') => {
                        format!("{DEFAULT_CALLING_CODE}{}", &compact[1..])
                    }
                    12 if compact.starts_with(DEFAULT_CALLING_CODE) => compact,
                    _ => return Err(invalid()),
                }
            }
        };

        if !(10..=15).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if digits.starts_with('0') {
            return Err(invalid());
        }

        Ok(Self(format!("+{digits}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A six digit Indian postal code whose first digit is not zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pincode(String);

impl Pincode {
    /// # Errors
    ///
    /// Returns `ValueError::Pincode` unless `raw` is exactly six ASCII digits with a
    /// non-zero first digit. No trimming is applied.
    pub fn parse(raw: &str) -> Result<Self, ValueError> {
        let bytes = raw.as_bytes();
        let ok = bytes.len() == 6
            && matches!(bytes[0], b'1'..=b'9')
            && bytes.iter().all(|b| b.is_ascii_digit());

        if !ok {
            return Err(ValueError::Pincode(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Pincode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
