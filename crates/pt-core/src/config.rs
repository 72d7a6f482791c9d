/// How integer input that is not a number is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IntegerParsing {
    /// Reject it with a decode error.
    #[default]
    Strict,
    /// Read it as zero.
    Lenient,
}

/// Configuration for a property editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Treatment of malformed integer input.
    pub integer_parsing: IntegerParsing,
    /// Whether edits to identity properties report the new display forms.
    pub report_display_forms: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            integer_parsing: IntegerParsing::Strict,
            report_display_forms: true,
        }
    }
}

impl EditorConfig {
    /// Set the treatment of malformed integer input.
    pub fn with_integer_parsing(mut self, parsing: IntegerParsing) -> Self {
        self.integer_parsing = parsing;
        self
    }

    /// Enable or disable display-form reporting.
    pub fn with_report_display_forms(mut self, report: bool) -> Self {
        self.report_display_forms = report;
        self
    }
}
