use regex::Regex;

/// Resolves a `group:name` key to the `versions.props` identifier that governs it.
///
/// An exact identifier always wins. Otherwise the matching glob with the most
/// literal (non-`*`) characters is chosen, earlier declarations winning ties.
#[derive(Debug, Clone, Default)]
pub struct FuzzyPatternResolver {
    exact: Vec<String>,
    globs: Vec<Glob>,
}

#[derive(Debug, Clone)]
struct Glob {
    raw: String,
    regex: Regex,
    weight: usize,
}

impl Glob {
    fn compile(raw: &str) -> Option<Self> {
        let body = raw
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*?");
        let regex = Regex::new(&format!("^(?:{body})$")).ok()?;
        Some(Self {
            raw: raw.to_string(),
            regex,
            weight: raw.chars().filter(|c| *c != '*').count(),
        })
    }
}

impl FuzzyPatternResolver {
    pub fn new<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolver = Self::default();
        for identifier in identifiers {
            let identifier = identifier.as_ref();
            if identifier.contains('*') {
                if resolver.globs.iter().all(|g| g.raw != identifier) {
                    resolver.globs.extend(Glob::compile(identifier));
                }
            } else if !resolver.exact.iter().any(|e| e == identifier) {
                resolver.exact.push(identifier.to_string());
            }
        }
        // stable: equal weights keep declaration order
        resolver.globs.sort_by(|a, b| b.weight.cmp(&a.weight));
        resolver
    }

    pub fn pattern_for(&self, key: &str) -> Option<&str> {
        if let Some(exact) = self.exact.iter().find(|e| *e == key) {
            return Some(exact);
        }
        self.globs
            .iter()
            .find(|glob| glob.regex.is_match(key))
            .map(|glob| glob.raw.as_str())
    }
}
