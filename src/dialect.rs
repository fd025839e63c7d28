//! Dialect and style rewriting applied after (or instead of) translation.
//!
//! Two kinds of transform live here: whole-word slang/archaic substitution
//! driven by fixed per-language dictionaries, and the structural
//! prose-to-poetry rewrite. Custom slang entries are session-scoped and merged
//! into the base dictionary before lookup, so they override without redefining
//! any behavior at runtime.

use std::collections::HashMap;

use regex::{NoExpand, RegexBuilder};
use tracing::debug;

use crate::error::{Result, VaaniError};

/// Closed set of supported styles. `FormalToCasual` and `ProseToPoetry` are
/// special modes: the pipeline applies them to the raw input and skips
/// translation entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectStyle {
    Standard,
    RegionalSlang,
    CasualSlang,
    Archaic,
    FormalToCasual,
    ProseToPoetry,
}

impl DialectStyle {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(' ', "-").replace('_', "-").as_str() {
            "standard" | "none" => Ok(Self::Standard),
            "regional" | "regional-slang" | "desi" | "desi-slang" => Ok(Self::RegionalSlang),
            "casual" | "casual-slang" => Ok(Self::CasualSlang),
            "archaic" | "archaic-english" | "shakespearean" => Ok(Self::Archaic),
            "formal-to-casual" => Ok(Self::FormalToCasual),
            "prose-to-poetry" | "poetry" => Ok(Self::ProseToPoetry),
            _ => Err(VaaniError::Config(format!(
                "Invalid dialect '{}'. Valid dialects: standard, regional-slang, \
                 casual-slang, archaic, formal-to-casual, prose-to-poetry",
                s
            ))),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::RegionalSlang => "Desi Slang",
            Self::CasualSlang => "Casual Slang",
            Self::Archaic => "Archaic English",
            Self::FormalToCasual => "Formal to Casual",
            Self::ProseToPoetry => "Prose to Poetry",
        }
    }

    /// Special modes bypass the translation engine and rewrite the input
    /// directly.
    pub fn is_special_mode(&self) -> bool {
        matches!(self, Self::FormalToCasual | Self::ProseToPoetry)
    }
}

/// Archaic substitution only applies when the target is this style's home
/// language.
const ARCHAIC_HOME_LANGUAGE: &str = "en";

type SlangPairs = &'static [(&'static str, &'static str)];

fn casual_pairs(lang_code: &str) -> SlangPairs {
    match lang_code {
        "en" => &[
            ("hello", "hey"),
            ("friend", "buddy"),
            ("very", "super"),
            ("goodbye", "catch you later"),
            ("thank you", "thanks a ton"),
            ("money", "bucks"),
        ],
        "es" => &[
            ("hola", "qué onda"),
            ("amigo", "compa"),
            ("dinero", "plata"),
            ("muy", "re"),
            ("adiós", "nos vemos"),
            ("gracias", "mil gracias"),
        ],
        "hi" => &[
            ("namaste", "aur bhai"),
            ("mitra", "yaar"),
            ("dhanyavaad", "shukriya"),
            ("bahut", "ekdum"),
        ],
        _ => &[],
    }
}

fn regional_pairs(lang_code: &str) -> SlangPairs {
    match lang_code {
        "en" => &[
            ("hello", "arre"),
            ("friend", "yaar"),
            ("very", "ekdum"),
            ("great", "mast"),
            ("crazy", "pagal"),
        ],
        "hi" => &[
            ("mitra", "bhidu"),
            ("achha", "jhakaas"),
            ("ladka", "chhokra"),
        ],
        _ => &[],
    }
}

fn archaic_pairs() -> SlangPairs {
    &[
        ("hello", "hail"),
        ("you", "thee"),
        ("your", "thy"),
        ("are", "art"),
        ("have", "hast"),
        ("yes", "aye"),
        ("no", "nay"),
        ("before", "ere"),
    ]
}

/// Session-scoped slang state: fixed base dictionaries plus user-added
/// overrides keyed by language code.
#[derive(Debug, Default)]
pub struct SlangBook {
    overrides: HashMap<String, Vec<(String, String)>>,
}

impl SlangBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite a custom slang entry for a language. Repeated calls
    /// with the same triple leave the dictionary state unchanged.
    pub fn add_custom(&mut self, formal: &str, styled: &str, lang_code: &str) -> String {
        let entries = self.overrides.entry(lang_code.to_lowercase()).or_default();
        match entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(formal))
        {
            Some(entry) => entry.1 = styled.to_string(),
            None => entries.push((formal.to_string(), styled.to_string())),
        }
        debug!("Custom slang added for {}: '{}' -> '{}'", lang_code, formal, styled);
        format!("Added custom slang for {}: '{}' -> '{}'", lang_code, formal, styled)
    }

    /// Transform `text` with the selected style for the given target language.
    pub fn transform(&self, text: &str, style: DialectStyle, target_code: &str) -> String {
        let lang = normalize_lang(target_code);
        match style {
            DialectStyle::Standard => text.to_string(),
            DialectStyle::RegionalSlang => {
                apply_pairs(text, &self.merged(regional_pairs(&lang), &lang))
            }
            DialectStyle::CasualSlang | DialectStyle::FormalToCasual => {
                apply_pairs(text, &self.merged(casual_pairs(&lang), &lang))
            }
            DialectStyle::Archaic => {
                if lang == ARCHAIC_HOME_LANGUAGE {
                    apply_pairs(text, &self.merged(archaic_pairs(), &lang))
                } else {
                    text.to_string()
                }
            }
            DialectStyle::ProseToPoetry => prose_to_poetry(text),
        }
    }

    /// Base pairs with session overrides merged in. An override whose formal
    /// term matches a base entry replaces it in place; new terms are appended
    /// after the base dictionary.
    fn merged(&self, base: SlangPairs, lang_code: &str) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = base
            .iter()
            .map(|(formal, styled)| (formal.to_string(), styled.to_string()))
            .collect();

        if let Some(custom) = self.overrides.get(lang_code) {
            for (formal, styled) in custom {
                match pairs
                    .iter_mut()
                    .find(|(existing, _)| existing.eq_ignore_ascii_case(formal))
                {
                    Some(entry) => entry.1 = styled.clone(),
                    None => pairs.push((formal.clone(), styled.clone())),
                }
            }
        }

        pairs
    }
}

/// Strip a regional suffix for dictionary lookup ("zh-CN" -> "zh").
fn normalize_lang(code: &str) -> String {
    code.split('-').next().unwrap_or(code).to_lowercase()
}

/// Replace whole-word, case-insensitive occurrences of each formal term with
/// its styled counterpart, in dictionary order. First-applied wins on overlap.
fn apply_pairs(text: &str, pairs: &[(String, String)]) -> String {
    let mut out = text.to_string();
    for (formal, styled) in pairs {
        let pattern = format!(r"\b{}\b", regex::escape(formal));
        let re = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
            Ok(re) => re,
            Err(e) => {
                debug!("Skipping unbuildable slang pattern '{}': {}", formal, e);
                continue;
            }
        };
        out = re.replace_all(&out, NoExpand(styled)).into_owned();
    }
    out
}

/// Structural rewrite: one line per sentence, comma-terminated, a blank line
/// after every second line, trailing comma/newline run stripped.
pub fn prose_to_poetry(text: &str) -> String {
    let mut poem = String::new();
    let mut lines = 0usize;

    for sentence in text.split('.') {
        let trimmed = sentence.trim();
        if trimmed.is_empty() {
            continue;
        }
        poem.push_str(trimmed);
        poem.push_str(",\n");
        lines += 1;
        if lines % 2 == 0 {
            poem.push('\n');
        }
    }

    poem.trim_end_matches(&[',', '\n'][..]).to_string()
}
