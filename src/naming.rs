//! Identifier normalization: case conversion and English inflection.
//!
//! Every transform here is deterministic and table-driven. The irregular tables
//! are checked before the generic rules, on exact matches only.

/// Compound terms whose snake form is fixed rather than derived.
const IRREGULAR_SNAKE: &[(&str, &str)] = &[
    ("OAuth", "oauth"),
    ("OAuth2", "oauth2"),
    ("IPv4", "ipv4"),
    ("IPv6", "ipv6"),
    ("GraphQL", "graphql"),
    ("MySQL", "mysql"),
    ("PostgreSQL", "postgresql"),
    ("SQLite", "sqlite"),
    ("JavaScript", "javascript"),
    ("TypeScript", "typescript"),
    ("WebSocket", "websocket"),
    ("GitHub", "github"),
    ("iOS", "ios"),
    ("macOS", "macos"),
];

/// Singular -> plural forms the suffix rules get wrong.
const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("ox", "oxen"),
    ("datum", "data"),
    ("criterion", "criteria"),
    ("phenomenon", "phenomena"),
    ("analysis", "analyses"),
    ("axis", "axes"),
    ("crisis", "crises"),
    ("status", "statuses"),
    ("bus", "buses"),
    ("quiz", "quizzes"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("knife", "knives"),
    ("wife", "wives"),
];

/// Words whose plural is the word itself.
const UNCOUNTABLE: &[&str] = &[
    "sheep",
    "fish",
    "series",
    "species",
    "news",
    "equipment",
    "information",
    "metadata",
    "feedback",
];

const ORDINAL_SUFFIXES: &[&str] = &["st", "nd", "rd", "th"];

/// Convert an identifier to `snake_case`.
///
/// A run of capitals followed by a lowercase letter starts a new word at the
/// last capital (`HTTPRequest` -> `http_request`). A letter directly after a
/// digit starts a new word unless it begins an ordinal suffix (`2nd`).
/// Digits after letters stay attached (`TeamID42` -> `team_id42`).
pub fn to_snake_case(input: &str) -> String {
    if let Some((_, snake)) = IRREGULAR_SNAKE.iter().find(|(word, _)| *word == input) {
        return (*snake).to_string();
    }

    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            push_separator(&mut out);
            continue;
        }

        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();

        if c.is_uppercase() {
            if let Some(p) = prev {
                let acronym_end = p.is_uppercase() && next.is_some_and(|n| n.is_lowercase());
                if p.is_lowercase() || p.is_ascii_digit() || acronym_end {
                    push_separator(&mut out);
                }
            }
            out.extend(c.to_lowercase());
        } else if c.is_lowercase() {
            if prev.is_some_and(|p| p.is_ascii_digit()) && !starts_ordinal_suffix(&chars, i) {
                push_separator(&mut out);
            }
            out.push(c);
        } else {
            out.push(c);
        }
    }

    out.trim_matches('_').to_string()
}

fn push_separator(out: &mut String) {
    if !out.is_empty() && !out.ends_with('_') {
        out.push('_');
    }
}

/// True if `chars[at..]` starts with an ordinal suffix that ends the word.
fn starts_ordinal_suffix(chars: &[char], at: usize) -> bool {
    if at + 2 > chars.len() {
        return false;
    }
    let candidate: String = chars[at..at + 2].iter().collect();
    if !ORDINAL_SUFFIXES.contains(&candidate.as_str()) {
        return false;
    }
    !chars.get(at + 2).is_some_and(|c| c.is_lowercase())
}

/// Convert an identifier to `camelCase`.
pub fn to_camel_case(input: &str) -> String {
    let snake = to_snake_case(input);
    let mut out = String::with_capacity(snake.len());
    for (i, word) in snake.split('_').filter(|w| !w.is_empty()).enumerate() {
        if i == 0 {
            out.push_str(word);
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

/// Convert an identifier to `PascalCase`.
pub fn to_pascal_case(input: &str) -> String {
    to_snake_case(input)
        .split('_')
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Pluralize a lowercase word.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR_PLURALS.iter().find(|(s, _)| *s == word) {
        return (*plural).to_string();
    }

    if let Some(stem) = word.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !is_vowel(c)) {
            return format!("{}ies", stem);
        }
    }

    if ["s", "sh", "ch", "x", "z"].iter().any(|s| word.ends_with(s)) {
        return format!("{}es", word);
    }

    format!("{}s", word)
}

/// Reverse the common plural forms. Approximate: not guaranteed to invert
/// [`pluralize`] for every input.
pub fn singularize(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULAR_PLURALS.iter().find(|(_, p)| *p == word) {
        return (*singular).to_string();
    }
    if IRREGULAR_PLURALS.iter().any(|(s, _)| *s == word) {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{}y", stem);
        }
    }

    if let Some(stem) = word.strip_suffix("es") {
        if ["ss", "sh", "ch", "x", "z"].iter().any(|s| stem.ends_with(s)) {
            return stem.to_string();
        }
    }

    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }

    word.strip_suffix('s').unwrap_or(word).to_string()
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Table name for an entity: snake case, then plural.
pub fn derive_table_name(entity_name: &str) -> String {
    pluralize(&to_snake_case(entity_name))
}

/// A string helper exposed to templates.
pub type TemplateHelper = fn(&str) -> String;

/// The case and inflection helpers templates may call by name.
pub const TEMPLATE_HELPERS: &[(&str, TemplateHelper)] = &[
    ("snake", to_snake_case),
    ("camel", to_camel_case),
    ("pascal", to_pascal_case),
    ("plural", pluralize),
    ("singular", singularize),
    ("table", derive_table_name),
];

/// Look up a template helper by name.
pub fn template_helper(name: &str) -> Option<TemplateHelper> {
    TEMPLATE_HELPERS
        .iter()
        .find(|(helper, _)| *helper == name)
        .map(|(_, f)| *f)
}
