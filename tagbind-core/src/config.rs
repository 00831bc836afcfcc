//! Parse and bind options.

/// Options for the event parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// Drop whitespace-only `Characters` events inside elements.
    pub ignore_whitespace_text: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore_whitespace_text(mut self, yes: bool) -> Self {
        self.ignore_whitespace_text = yes;
        self
    }
}

/// What to do when a non-list field matches more than one child element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fail the record with `DuplicateField`.
    #[default]
    Reject,
    /// Keep the value of the last matching element.
    LastWins,
}

/// Options for the typed binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BindOptions {
    pub parse: ParseOptions,
    pub duplicates: DuplicatePolicy,
    /// Fail records containing child elements no field spec names.
    pub deny_unknown_fields: bool,
}

impl BindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    pub fn duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    pub fn deny_unknown_fields(mut self, yes: bool) -> Self {
        self.deny_unknown_fields = yes;
        self
    }
}
