//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn source() -> PathBuf {
        "posts".into()
    }

    pub fn source_ext() -> String {
        ".md".into()
    }

    pub fn output() -> PathBuf {
        "static".into()
    }

    pub fn output_ext() -> String {
        ".html".into()
    }

    pub fn templates() -> PathBuf {
        "templates".into()
    }

    pub fn template_ext() -> String {
        ".html".into()
    }

    pub fn default_template() -> String {
        "default".into()
    }
}

// ============================================================================
// [meta] Section Defaults
// ============================================================================

pub mod meta {
    pub fn title() -> String {
        "Title:".into()
    }

    pub fn author() -> String {
        "Author:".into()
    }

    pub fn tag() -> String {
        "Tag:".into()
    }

    pub fn template() -> String {
        "Template:".into()
    }

    pub fn date() -> String {
        "Date:".into()
    }

    pub fn separator() -> String {
        "---".into()
    }

    /// chrono spelling of "2 January 2006 @ 3:04pm"
    pub fn date_format() -> String {
        "%-d %B %Y @ %-I:%M%P".into()
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        8080
    }
}

// ============================================================================
// [watch] Section Defaults
// ============================================================================

pub mod watch {
    pub fn interval() -> u64 {
        4
    }
}
