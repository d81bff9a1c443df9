use std::{
    collections::BTreeSet,
    sync::LazyLock,
};

use regex::{
    Captures,
    Regex,
};
use serde::{
    Deserialize,
    Serialize,
};

use super::{
    models::TransformationKind,
    LanguageToolsResult,
};

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|<div[^>]*>|\r\n|\r|\n").unwrap());
static SOUND_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[sound:[^\]]+\]").unwrap());
static TYPE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[type:[^\]]+\]\]").unwrap());
static STYLE_OR_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<style[^>]*>.*?</style>|<script[^>]*>.*?</script>").unwrap()
});
static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img[^>]*?src=["']?([^"'>\s]+)["']?[^>]*>"#).unwrap()
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);").unwrap());
static NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r\n|\r|\n").unwrap());

/// Named entities for U+00A0 to U+00FF, in code point order.
const LATIN1_ENTITIES: [&str; 96] = [
    "nbsp", "iexcl", "cent", "pound", "curren", "yen", "brvbar", "sect", "uml", "copy", "ordf",
    "laquo", "not", "shy", "reg", "macr", "deg", "plusmn", "sup2", "sup3", "acute", "micro",
    "para", "middot", "cedil", "sup1", "ordm", "raquo", "frac14", "frac12", "frac34", "iquest",
    "Agrave", "Aacute", "Acirc", "Atilde", "Auml", "Aring", "AElig", "Ccedil", "Egrave", "Eacute",
    "Ecirc", "Euml", "Igrave", "Iacute", "Icirc", "Iuml", "ETH", "Ntilde", "Ograve", "Oacute",
    "Ocirc", "Otilde", "Ouml", "times", "Oslash", "Ugrave", "Uacute", "Ucirc", "Uuml", "Yacute",
    "THORN", "szlig", "agrave", "aacute", "acirc", "atilde", "auml", "aring", "aelig", "ccedil",
    "egrave", "eacute", "ecirc", "euml", "igrave", "iacute", "icirc", "iuml", "eth", "ntilde",
    "ograve", "oacute", "ocirc", "otilde", "ouml", "divide", "oslash", "ugrave", "uacute",
    "ucirc", "uuml", "yacute", "thorn", "yuml",
];

const OTHER_ENTITIES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("OElig", '\u{152}'),
    ("oelig", '\u{153}'),
    ("Scaron", '\u{160}'),
    ("scaron", '\u{161}'),
    ("Yuml", '\u{178}'),
    ("circ", '\u{2c6}'),
    ("tilde", '\u{2dc}'),
    ("ensp", '\u{2002}'),
    ("emsp", '\u{2003}'),
    ("thinsp", '\u{2009}'),
    ("zwnj", '\u{200c}'),
    ("zwj", '\u{200d}'),
    ("ndash", '\u{2013}'),
    ("mdash", '\u{2014}'),
    ("lsquo", '\u{2018}'),
    ("rsquo", '\u{2019}'),
    ("sbquo", '\u{201a}'),
    ("ldquo", '\u{201c}'),
    ("rdquo", '\u{201d}'),
    ("bdquo", '\u{201e}'),
    ("dagger", '\u{2020}'),
    ("Dagger", '\u{2021}'),
    ("bull", '\u{2022}'),
    ("hellip", '\u{2026}'),
    ("permil", '\u{2030}'),
    ("prime", '\u{2032}'),
    ("lsaquo", '\u{2039}'),
    ("rsaquo", '\u{203a}'),
    ("euro", '\u{20ac}'),
    ("trade", '\u{2122}'),
    ("larr", '\u{2190}'),
    ("rarr", '\u{2192}'),
];

/// Strips note markup down to a single line of plain text.
///
/// Markup is removed first and entities are decoded last, so text the editor
/// stored escaped (`&lt;` for a typed `<`) survives as written. Running it
/// again on its output is a no-op unless the decoded text itself looks like
/// markup.
pub fn html_to_text_line(text: &str) -> String {
    let text = LINE_BREAK.replace_all(text, " ");
    let text = SOUND_TAG.replace_all(&text, "");
    let text = TYPE_TAG.replace_all(&text, "");
    let text = STYLE_OR_SCRIPT.replace_all(&text, "");
    let text = COMMENT.replace_all(&text, "");
    let text = IMAGE.replace_all(&text, " $1 ");
    let text = TAG.replace_all(&text, "");
    let text = ENTITY.replace_all(&text, |captures: &Captures| decode_entity(captures));
    let text = NEWLINE.replace_all(&text, " ");
    text.trim().to_string()
}

fn decode_entity(captures: &Captures) -> String {
    let name = &captures[1];
    let decoded = if let Some(number) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X"))
    {
        u32::from_str_radix(number, 16).ok().and_then(char::from_u32)
    } else if let Some(number) = name.strip_prefix('#') {
        number.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        named_entity(name)
    };

    decoded.map(String::from).unwrap_or_else(|| captures[0].to_string())
}

fn named_entity(name: &str) -> Option<char> {
    // non-breaking space reads as a plain one
    if name == "nbsp" {
        return Some(' ');
    }
    if let Some(offset) = LATIN1_ENTITIES.iter().position(|entity| *entity == name) {
        return char::from_u32(0xA0 + offset as u32);
    }
    OTHER_ENTITIES.iter().find(|(entity, _)| *entity == name).map(|(_, c)| *c)
}

/// A user configured substitution, run on the plain text before it is sent
/// to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextReplacement {
    pub pattern: String,
    pub replace: String,
    #[serde(default)]
    pub applies_to: BTreeSet<TransformationKind>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextProcessingOptions {
    #[serde(default)]
    pub replacements: Vec<TextReplacement>,
}

#[derive(Debug, Clone)]
struct CompiledReplacement {
    regex: Regex,
    replace: String,
    applies_to: BTreeSet<TransformationKind>,
}

#[derive(Debug, Clone, Default)]
pub struct TextProcessor {
    replacements: Vec<CompiledReplacement>,
}

impl TextProcessor {
    pub fn new(options: &TextProcessingOptions) -> LanguageToolsResult<Self> {
        let replacements = options
            .replacements
            .iter()
            .map(|replacement| {
                Ok(CompiledReplacement {
                    regex: Regex::new(&replacement.pattern)?,
                    replace: replacement.replace.clone(),
                    applies_to: replacement.applies_to.clone(),
                })
            })
            .collect::<LanguageToolsResult<Vec<_>>>()?;

        Ok(Self { replacements })
    }

    pub fn is_empty(&self, text: &str) -> bool {
        html_to_text_line(text).is_empty()
    }

    pub fn process(&self, text: &str, kind: TransformationKind) -> String {
        let mut result = html_to_text_line(text);

        for replacement in &self.replacements {
            if replacement.applies_to.contains(&kind) {
                result =
                    replacement.regex.replace_all(&result, replacement.replace.as_str()).into_owned();
            }
        }

        result
    }
}
