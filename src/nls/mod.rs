//! Localized message bundles.
//!
//! Every locale is a static [`Bundle`]. A bundle flagged with `fallback`
//! answers missing keys from the base bundle.

mod fr;
mod root;

use actix_web::HttpRequest;

pub struct Bundle {
    pub messages: &'static [(&'static str, &'static str)],
    pub errors: &'static [(&'static str, &'static str)],
    pub fallback: bool,
}

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    /// Parse a language tag such as `fr`, `fr-FR` or `en_US`.
    pub fn parse(tag: &str) -> Option<Self> {
        let language = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "en" => Some(Locale::En),
            "fr" => Some(Locale::Fr),
            _ => None,
        }
    }

    /// Pick the first supported language of an `Accept-Language` header,
    /// honouring quality weights. A zero weight excludes the language.
    pub fn from_accept_language(header: &str, fallback: Locale) -> Locale {
        let mut candidates: Vec<(f32, Locale)> = header
            .split(',')
            .filter_map(|entry| {
                let mut parts = entry.split(';');
                let locale = Locale::parse(parts.next()?)?;
                let quality = parts
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                (quality > 0.0).then_some((quality, locale))
            })
            .collect();
        // Stable sort keeps header order for equal weights
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
        candidates.first().map(|(_, l)| *l).unwrap_or(fallback)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
        }
    }

    fn bundle(&self) -> &'static Bundle {
        match self {
            Locale::En => &root::BUNDLE,
            Locale::Fr => &fr::BUNDLE,
        }
    }
}

/// Message lookup for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Messages {
    locale: Locale,
}

impl Messages {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn root() -> Self {
        Self::new(Locale::En)
    }

    /// Messages for the locale the request asks for.
    pub fn for_request(req: &HttpRequest, fallback: Locale) -> Self {
        let locale = req
            .headers()
            .get(actix_web::http::header::ACCEPT_LANGUAGE)
            .and_then(|h| h.to_str().ok())
            .map(|h| Locale::from_accept_language(h, fallback))
            .unwrap_or(fallback);
        Self::new(locale)
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn get(&self, key: &str) -> Option<&'static str> {
        let bundle = self.locale.bundle();
        lookup(bundle.messages, key).or_else(|| {
            if bundle.fallback {
                lookup(root::BUNDLE.messages, key)
            } else {
                None
            }
        })
    }

    /// The message for `key`, or the key itself when no bundle has it.
    pub fn label<'a>(&self, key: &'a str) -> &'a str {
        self.get(key).unwrap_or(key)
    }

    pub fn error(&self, key: &str) -> Option<&'static str> {
        let bundle = self.locale.bundle();
        lookup(bundle.errors, key).or_else(|| {
            if bundle.fallback {
                lookup(root::BUNDLE.errors, key)
            } else {
                None
            }
        })
    }

    /// Render the message `key` with `parameters`, see [`render_template`].
    pub fn format(&self, key: &str, parameters: &[&str]) -> String {
        render_template(self.label(key), parameters)
    }
}

/// Substitute `{{this}}` with the first parameter and `{{N}}` with the N-th.
///
/// One pass over the template: substituted values are never expanded again.
/// Unknown placeholders and missing positions are kept as written.
pub fn render_template(template: &str, parameters: &[&str]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let Some(end) = tail.find("}}") else {
            output.push_str(&rest[start..]);
            return output;
        };
        let name = &tail[..end];
        let value = if name == "this" {
            Some(parameters.first().copied().unwrap_or_default())
        } else {
            name.parse::<usize>()
                .ok()
                .and_then(|i| parameters.get(i).copied())
        };
        match value {
            Some(value) => output.push_str(value),
            None => output.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &tail[end + 2..];
    }
    output.push_str(rest);
    output
}
