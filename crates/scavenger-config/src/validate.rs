//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for settings that
//! parse but cannot work as intended.

use std::fmt;

use crate::{Config, patterns::compile_glob};

/// Stemmer names the index understands, besides "none".
pub const KNOWN_STEMMERS: &[&str] = &[
    "arabic",
    "danish",
    "dutch",
    "english",
    "finnish",
    "french",
    "german",
    "greek",
    "hungarian",
    "italian",
    "norwegian",
    "portuguese",
    "romanian",
    "russian",
    "spanish",
    "swedish",
    "tamil",
    "turkish",
];

/// Field names accepted in `[search] fields`.
pub const KNOWN_FIELDS: &[&str] = &[
    "key",
    "path",
    "name",
    "description",
    "data",
    "fileExtension",
    "dataSource",
];

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// The stemmer is not a supported language.
    UnknownStemmer {
        /// Configured value.
        stemmer: String,
    },
    /// A default search field does not exist.
    UnknownSearchField {
        /// Configured field name.
        field: String,
    },
    /// No default search fields are configured.
    NoSearchFields,
    /// Highlighting is enabled with a zero fragment length.
    ZeroFragmentLength,
    /// Exactly one of the highlight markers is empty.
    UnpairedHighlightTags,
    /// The extension whitelist is empty, so nothing will be ingested.
    NoExtensions,
    /// An exclude glob does not compile.
    InvalidExcludePattern {
        /// The offending pattern.
        pattern: String,
        /// Compiler message.
        message: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownStemmer { stemmer } => {
                write!(f, "unknown stemmer '{stemmer}'; use \"none\" or a language name")
            }
            Self::UnknownSearchField { field } => {
                write!(f, "search field '{field}' does not exist")
            }
            Self::NoSearchFields => write!(f, "no default search fields are configured"),
            Self::ZeroFragmentLength => {
                write!(f, "highlight fragment_length is 0; no fragments will be produced")
            }
            Self::UnpairedHighlightTags => {
                write!(f, "only one of pre_tag/post_tag is empty; markers will be unbalanced")
            }
            Self::NoExtensions => write!(f, "ingest extensions list is empty"),
            Self::InvalidExcludePattern { pattern, message } => {
                write!(f, "exclude pattern '{pattern}' is invalid: {message}")
            }
        }
    }
}

/// Validates the configuration and returns any warnings.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    let stemmer = config.index.stemmer.to_lowercase();
    if stemmer != "none" && !KNOWN_STEMMERS.contains(&stemmer.as_str()) {
        warnings.push(ConfigWarning::UnknownStemmer {
            stemmer: config.index.stemmer.clone(),
        });
    }

    if config.search.fields.is_empty() {
        warnings.push(ConfigWarning::NoSearchFields);
    }
    for field in &config.search.fields {
        if !KNOWN_FIELDS.contains(&field.as_str()) {
            warnings.push(ConfigWarning::UnknownSearchField {
                field: field.clone(),
            });
        }
    }

    let highlight = &config.highlight;
    if highlight.fragments > 0 && highlight.fragment_length == 0 {
        warnings.push(ConfigWarning::ZeroFragmentLength);
    }
    if highlight.pre_tag.is_empty() != highlight.post_tag.is_empty() {
        warnings.push(ConfigWarning::UnpairedHighlightTags);
    }

    if config.ingest.extensions.is_empty() {
        warnings.push(ConfigWarning::NoExtensions);
    }
    for pattern in &config.ingest.exclude {
        if let Err(err) = compile_glob(pattern) {
            warnings.push(ConfigWarning::InvalidExcludePattern {
                pattern: pattern.clone(),
                message: err.to_string(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_clean() {
        assert!(validate_config(&Config::default()).is_empty());
    }

    #[test]
    fn stemmer_names_are_case_insensitive() {
        let mut config = Config::default();
        config.index.stemmer = "English".into();
        assert!(validate_config(&config).is_empty());

        config.index.stemmer = "klingon".into();
        assert_eq!(
            validate_config(&config),
            vec![ConfigWarning::UnknownStemmer {
                stemmer: "klingon".into()
            }]
        );
    }

    #[test]
    fn unknown_field_is_reported() {
        let mut config = Config::default();
        config.search.fields = vec!["data".into(), "title".into()];
        let warnings = validate_config(&config);
        assert_eq!(
            warnings,
            vec![ConfigWarning::UnknownSearchField {
                field: "title".into()
            }]
        );
        assert!(warnings[0].to_string().contains("title"));
    }

    #[test]
    fn unpaired_markers() {
        let mut config = Config::default();
        config.highlight.post_tag = String::new();
        assert_eq!(
            validate_config(&config),
            vec![ConfigWarning::UnpairedHighlightTags]
        );
    }

    #[test]
    fn empty_markers_are_fine_together() {
        let mut config = Config::default();
        config.highlight.pre_tag = String::new();
        config.highlight.post_tag = String::new();
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn zero_fragment_length_only_matters_when_enabled() {
        let mut config = Config::default();
        config.highlight.fragment_length = 0;
        assert_eq!(
            validate_config(&config),
            vec![ConfigWarning::ZeroFragmentLength]
        );
        config.highlight.fragments = 0;
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn bad_exclude_glob() {
        let mut config = Config::default();
        config.ingest.exclude = vec!["a/{b".into()];
        let warnings = validate_config(&config);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            ConfigWarning::InvalidExcludePattern { pattern, .. } if pattern == "a/{b"
        ));
    }

    #[test]
    fn empty_extensions() {
        let mut config = Config::default();
        config.ingest.extensions.clear();
        assert_eq!(validate_config(&config), vec![ConfigWarning::NoExtensions]);
    }
}
