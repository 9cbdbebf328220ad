//! Production rules for the grammar engine.
//!
//! A rule maps one symbol either to a fixed replacement or to a list of
//! weighted alternatives. Rules arrive from presets, GUI text fields and JSON
//! snapshots in loosely shaped forms ([`RawRule`]); [`normalize_rule_definition`]
//! turns any of them into a [`RuleDefinition`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// One weighted choice of a stochastic rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightedAlternative {
    /// Replacement text inserted when this alternative is selected.
    pub value: String,
    /// Relative weight. Negative weights count as zero during selection.
    pub weight: f64,
}

impl WeightedAlternative {
    pub fn new(value: impl Into<String>, weight: f64) -> Self {
        Self {
            value: value.into(),
            weight,
        }
    }
}

/// A normalized production rule.
///
/// Serializes as a bare string (`Fixed`) or as a list of
/// `{ "value", "weight" }` objects (`Weighted`). Deserialization accepts every
/// shape [`RawRule`] accepts and normalizes it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuleDefinition {
    /// Always rewrite to the same text. An empty string leaves the symbol terminal.
    Fixed(String),
    /// Re-roll among the alternatives for every occurrence of the symbol.
    Weighted(Vec<WeightedAlternative>),
}

impl RuleDefinition {
    pub fn fixed(text: impl Into<String>) -> Self {
        Self::Fixed(text.into())
    }

    pub fn weighted<I, S>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self::Weighted(
            alternatives
                .into_iter()
                .map(|(value, weight)| WeightedAlternative::new(value, weight))
                .collect(),
        )
    }

    /// True when applying the rule would leave the symbol unchanged.
    pub fn is_passthrough(&self) -> bool {
        match self {
            Self::Fixed(text) => text.is_empty(),
            Self::Weighted(alternatives) => alternatives.is_empty(),
        }
    }
}

impl<'de> Deserialize<'de> for RuleDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawRule::deserialize(deserializer).map(|raw| normalize_rule_definition(&raw))
    }
}

/// A weight as it may appear in loosely typed input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawWeight {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawWeight {
    /// Numeric value of the weight; anything non-finite becomes `1`.
    pub fn resolve(&self) -> f64 {
        let weight = match self {
            Self::Number(n) => *n,
            Self::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    0.0
                } else {
                    text.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            Self::Other(_) => f64::NAN,
        };
        if weight.is_finite() { weight } else { 1.0 }
    }
}

/// A single rule option before normalization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRuleOption {
    Text(String),
    Entry {
        #[serde(default)]
        value: Option<serde_json::Value>,
        #[serde(default)]
        weight: Option<RawWeight>,
    },
    /// Numbers, booleans, `null` and other stray values. Dropped on normalization.
    Other(serde_json::Value),
}

impl RawRuleOption {
    pub fn entry(value: impl Into<String>, weight: f64) -> Self {
        Self::Entry {
            value: Some(serde_json::Value::String(value.into())),
            weight: Some(RawWeight::Number(weight)),
        }
    }
}

/// A rule before normalization: a string, one `{value, weight}` object, or a
/// list mixing both. Any other JSON value is accepted and treated as "no rule".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRule {
    List(Vec<RawRuleOption>),
    Single(RawRuleOption),
    Other(serde_json::Value),
}

impl From<&str> for RawRule {
    fn from(text: &str) -> Self {
        Self::Single(RawRuleOption::Text(text.to_owned()))
    }
}

impl From<&RuleDefinition> for RawRule {
    fn from(rule: &RuleDefinition) -> Self {
        match rule {
            RuleDefinition::Fixed(text) => Self::Single(RawRuleOption::Text(text.clone())),
            RuleDefinition::Weighted(alternatives) => Self::List(
                alternatives
                    .iter()
                    .map(|alt| RawRuleOption::entry(alt.value.clone(), alt.weight))
                    .collect(),
            ),
        }
    }
}

enum NormalizedOption {
    Text(String),
    Weighted(WeightedAlternative),
}

fn normalize_option(option: &RawRuleOption) -> Option<NormalizedOption> {
    match option {
        RawRuleOption::Text(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| NormalizedOption::Text(text.to_owned()))
        }
        RawRuleOption::Entry { value, weight } => {
            let value = value.as_ref()?.as_str()?.trim();
            if value.is_empty() {
                return None;
            }
            let weight = weight.as_ref().map_or(1.0, RawWeight::resolve);
            Some(NormalizedOption::Weighted(WeightedAlternative::new(
                value, weight,
            )))
        }
        RawRuleOption::Other(_) => None,
    }
}

fn finalize_single(option: NormalizedOption) -> RuleDefinition {
    match option {
        NormalizedOption::Text(text) => RuleDefinition::Fixed(text),
        NormalizedOption::Weighted(alt) => RuleDefinition::Weighted(vec![alt]),
    }
}

/// Normalizes a loosely shaped rule.
///
/// Blank strings and entries without a usable `value` are dropped, missing or
/// non-finite weights become `1`. An empty result collapses to
/// `Fixed("")` (the symbol stays terminal) and a lone plain string collapses to
/// `Fixed`. Normalizing an already normalized rule returns it unchanged.
pub fn normalize_rule_definition(raw: &RawRule) -> RuleDefinition {
    match raw {
        RawRule::Other(_) => RuleDefinition::Fixed(String::new()),
        RawRule::Single(option) => normalize_option(option)
            .map(finalize_single)
            .unwrap_or_else(|| RuleDefinition::Fixed(String::new())),
        RawRule::List(options) => {
            let mut normalized: Vec<NormalizedOption> =
                options.iter().filter_map(normalize_option).collect();
            match normalized.len() {
                0 => RuleDefinition::Fixed(String::new()),
                1 => finalize_single(normalized.remove(0)),
                _ => RuleDefinition::Weighted(
                    normalized
                        .into_iter()
                        .map(|option| match option {
                            NormalizedOption::Text(text) => WeightedAlternative::new(text, 1.0),
                            NormalizedOption::Weighted(alt) => alt,
                        })
                        .collect(),
                ),
            }
        }
    }
}

/// Reduces user input to a rule symbol: the first character after trimming.
pub fn symbol_key(raw: &str) -> Option<char> {
    raw.trim().chars().next()
}

/// The full mapping from symbols to rules.
///
/// Symbols without an entry are terminals. Serialized as a JSON object keyed by
/// one-character strings; on input, longer keys are reduced with [`symbol_key`]
/// and blank keys are skipped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleSet(BTreeMap<char, RuleDefinition>);

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: char) -> Option<&RuleDefinition> {
        self.0.get(&symbol)
    }

    pub fn insert(&mut self, symbol: char, rule: RuleDefinition) {
        self.0.insert(symbol, rule);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &RuleDefinition)> {
        self.0.iter().map(|(symbol, rule)| (*symbol, rule))
    }

    /// Builds a rule set from loosely shaped input, normalizing every rule.
    pub fn from_raw<'a, I>(raw: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a RawRule)>,
    {
        raw.into_iter()
            .filter_map(|(key, rule)| Some((symbol_key(key)?, normalize_rule_definition(rule))))
            .collect()
    }
}

impl FromIterator<(char, RuleDefinition)> for RuleSet {
    fn from_iter<T: IntoIterator<Item = (char, RuleDefinition)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for RuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(symbol, rule)| (symbol.to_string(), rule)))
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, RawRule>::deserialize(deserializer)?;
        Ok(Self::from_raw(raw.iter().map(|(k, v)| (k.as_str(), v))))
    }
}

/// Parses the text form used by rule input fields.
///
/// `"FF"` is a fixed rule. `"FF | 2 ; F-F"` is a weighted rule: options are
/// separated by `;` and an optional weight follows `|`. Unparseable weights
/// become `1`. A single option of weight `1` collapses to a fixed rule.
pub fn parse_rule_input(input: &str) -> RuleDefinition {
    let raw = input.trim();
    if raw.is_empty() {
        return RuleDefinition::Fixed(String::new());
    }
    if !raw.contains(';') && !raw.contains('|') {
        return RuleDefinition::Fixed(raw.to_owned());
    }

    let mut options: Vec<WeightedAlternative> = raw
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let mut pieces = part.split('|').map(str::trim);
            let pattern = pieces.next().filter(|p| !p.is_empty())?;
            let weight = match pieces.next() {
                Some(w) if !w.is_empty() => w.parse::<f64>().ok().filter(|w| w.is_finite()).unwrap_or(1.0),
                _ => 1.0,
            };
            Some(WeightedAlternative::new(pattern, weight))
        })
        .collect();

    match options.len() {
        0 => RuleDefinition::Fixed(raw.to_owned()),
        1 if options[0].weight == 1.0 => RuleDefinition::Fixed(options.remove(0).value),
        _ => RuleDefinition::Weighted(options),
    }
}

/// Inverse of [`parse_rule_input`]: `value | weight` pairs joined by ` ; `.
pub fn serialize_rule(rule: &RuleDefinition) -> String {
    match rule {
        RuleDefinition::Fixed(text) => text.clone(),
        RuleDefinition::Weighted(alternatives) => alternatives
            .iter()
            .filter(|alt| !alt.value.is_empty())
            .map(|alt| format!("{} | {}", alt.value, alt.weight))
            .collect::<Vec<_>>()
            .join(" ; "),
    }
}

/// Key under which a GUI binds the input field for `symbol`'s rule.
pub fn rule_control_key(symbol: char) -> String {
    format!("rule_{symbol}")
}
