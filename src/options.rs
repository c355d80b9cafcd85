//! Options controlling how catalogs are read and written.

/// Read behavior options for [`crate::File`] parsing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// Language used for the plural fallback when the header names neither
    /// `Plural-Forms` nor `Language`.
    pub language_hint: Option<String>,
    /// Reject plural messages whose translation count differs from the
    /// selector's `nplurals` instead of only logging them.
    pub strict: bool,
}

impl ParseOptions {
    /// Creates default parse options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a language hint.
    pub fn with_language_hint(mut self, language_hint: Option<String>) -> Self {
        self.language_hint = language_hint;
        self
    }

    /// Enables/disables strict mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Write behavior options for [`crate::File`] serialization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WriteOptions {
    /// Maximum line width for quoted values. `None` only breaks lines after
    /// embedded newlines.
    pub wrap_width: Option<usize>,
}

impl WriteOptions {
    /// Creates default write options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the wrap width (gettext tools use 79).
    pub fn with_wrap_width(mut self, wrap_width: Option<usize>) -> Self {
        self.wrap_width = wrap_width;
        self
    }
}
