//! Property name resolution.
//!
//! Canonical names are the unprefixed DOM spellings (`animationName`,
//! `transform`). The host's property list decides which spelling the current
//! environment actually exposes (`animationName`, `webkitAnimationName`, ...).

use std::collections::HashMap;

/// Memoizing lookup from canonical property names to native ones.
#[derive(Debug, Clone, Default)]
pub struct PropertyResolver {
    known: Vec<String>,
    prefixes: Vec<String>,
    cache: HashMap<String, Option<String>>,
}

fn fold(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

impl PropertyResolver {
    /// `known` is the property list of a detached scratch element; `prefixes`
    /// are the tolerated vendor prefixes (`webkit`, `moz`, ...).
    pub fn new<P, S>(known: Vec<String>, prefixes: P) -> Self
    where
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            known,
            prefixes: prefixes.into_iter().map(|p| fold(p.as_ref())).collect(),
            cache: HashMap::new(),
        }
    }

    /// Native spelling of `canonical`, or None when the environment exposes
    /// no matching property. Stable once computed.
    pub fn resolve(&mut self, canonical: &str) -> Option<String> {
        if let Some(hit) = self.cache.get(canonical) {
            return hit.clone();
        }
        let found = self.lookup(canonical);
        tracing::trace!(canonical, native = ?found, "resolved property name");
        self.cache.insert(canonical.to_string(), found.clone());
        found
    }

    fn lookup(&self, canonical: &str) -> Option<String> {
        let wanted = fold(canonical);
        if wanted.is_empty() {
            return None;
        }

        // An unprefixed spelling wins; otherwise the first prefixed one.
        let mut prefixed = None;
        for key in &self.known {
            let folded = fold(key);
            let Some(lead) = folded.strip_suffix(wanted.as_str()) else {
                continue;
            };
            if lead.is_empty() {
                return Some(key.clone());
            }
            if prefixed.is_none() && self.prefixes.iter().any(|p| p == lead) {
                prefixed = Some(key.clone());
            }
        }
        prefixed
    }

    /// Number of memoized lookups.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Declaration spelling of a DOM-style property name:
    /// `webkitTransform` -> `-webkit-transform`, `backgroundColor` ->
    /// `background-color`. Names that already contain a dash pass through.
    pub fn css_property_name(&self, native: &str) -> String {
        if native.contains('-') {
            return native.to_ascii_lowercase();
        }
        if native == "cssFloat" {
            return "float".to_string();
        }

        let mut out = String::with_capacity(native.len() + 4);
        let mut rest = native;
        for prefix in &self.prefixes {
            let n = prefix.len();
            if native.len() > n
                && native.is_char_boundary(n)
                && native[..n].eq_ignore_ascii_case(prefix)
                && native[n..].starts_with(|c: char| c.is_ascii_uppercase())
            {
                out.push('-');
                out.push_str(prefix);
                rest = &native[n..];
                break;
            }
        }

        for c in rest.chars() {
            if c.is_ascii_uppercase() {
                out.push('-');
                out.push(c.to_ascii_lowercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(names: &[&str]) -> PropertyResolver {
        PropertyResolver::new(
            names.iter().map(|s| s.to_string()).collect(),
            ["webkit", "moz", "ms", "o"],
        )
    }

    #[test]
    fn prefers_unprefixed() {
        let mut r = resolver(&["webkitAnimationName", "animationName", "opacity"]);
        assert_eq!(r.resolve("animationName").as_deref(), Some("animationName"));
        assert_eq!(r.resolve("opacity").as_deref(), Some("opacity"));
    }

    #[test]
    fn falls_back_to_vendor_prefix() {
        let mut r = resolver(&["WebkitAnimation", "MozTransform", "color"]);
        assert_eq!(r.resolve("animation").as_deref(), Some("WebkitAnimation"));
        assert_eq!(r.resolve("transform").as_deref(), Some("MozTransform"));
    }

    #[test]
    fn rejects_unknown_prefix_and_missing() {
        let mut r = resolver(&["khtmlAnimation", "animationDelay"]);
        assert_eq!(r.resolve("animation"), None);
        assert_eq!(r.resolve("filter"), None);
        // Absence is cached too.
        assert_eq!(r.cached(), 2);
    }

    #[test]
    fn matches_dashed_spellings() {
        let mut r = resolver(&["animation-name"]);
        assert_eq!(r.resolve("animationName").as_deref(), Some("animation-name"));
    }

    #[test]
    fn css_spelling() {
        let r = resolver(&[]);
        assert_eq!(r.css_property_name("opacity"), "opacity");
        assert_eq!(r.css_property_name("backgroundColor"), "background-color");
        assert_eq!(r.css_property_name("webkitTransform"), "-webkit-transform");
        assert_eq!(r.css_property_name("MozAnimationName"), "-moz-animation-name");
        assert_eq!(r.css_property_name("OTransform"), "-o-transform");
        assert_eq!(r.css_property_name("msTransform"), "-ms-transform");
        assert_eq!(r.css_property_name("order"), "order");
        assert_eq!(r.css_property_name("-webkit-filter"), "-webkit-filter");
        assert_eq!(r.css_property_name("cssFloat"), "float");
    }
}
