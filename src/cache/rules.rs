/// How a request is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Always fetched; the cache is neither read nor written.
    NetworkOnly,
    /// Served from the cache when present, otherwise fetched and stored.
    CacheFirst,
    /// Fetched and stored; the cache is only consulted when the fetch fails.
    NetworkFirst,
}

/// Live data that must never be served stale.
pub const NETWORK_ONLY_PREFIXES: &[&str] = &["/api/", "/rfid_scan", "/kitchen/data", "/menu/data"];

pub const STATIC_PREFIX: &str = "/static/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatcher {
    Prefix(String),
    Any,
}

impl PathMatcher {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        PathMatcher::Prefix(prefix.into())
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathMatcher::Prefix(prefix) => path.starts_with(prefix.as_str()),
            PathMatcher::Any => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub matcher: PathMatcher,
    pub strategy: Strategy,
}

/// Ordered rules evaluated top to bottom; the first match wins.
///
/// Paths matched by no rule are served network-first.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    rules: Vec<Rule>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The FoodBot routing: live data, then static assets, then pages.
    pub fn foodbot() -> Self {
        NETWORK_ONLY_PREFIXES
            .iter()
            .fold(Self::new(), |table, prefix| {
                table.rule(PathMatcher::prefix(*prefix), Strategy::NetworkOnly)
            })
            .rule(PathMatcher::prefix(STATIC_PREFIX), Strategy::CacheFirst)
            .rule(PathMatcher::Any, Strategy::NetworkFirst)
    }

    pub fn rule(mut self, matcher: PathMatcher, strategy: Strategy) -> Self {
        self.rules.push(Rule { matcher, strategy });
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn strategy_for(&self, path: &str) -> Strategy {
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(path))
            .map(|rule| rule.strategy)
            .unwrap_or(Strategy::NetworkFirst)
    }
}
