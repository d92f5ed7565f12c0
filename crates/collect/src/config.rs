//! # Collect Configuration
//!
//! One [`CollectConfig`] per declaration. There are three ways to build one:
//!
//! - the builder: `CollectConfig::new("items").with_order(Order::Reverse)`
//! - the raw declaration surface, [`resolve`]: a name plus either a single
//!   aggregator or a flat key/value option list, as a type author would
//!   write it (`"from", "bases", "order", "bottom_up"`)
//! - a serialized [`CollectDescriptor`] (everything except closures)
//!
//! All three end in [`CollectConfig::validate`], so they accept exactly the
//! same configurations.
//!
//! ## Option keys
//!
//! | key | value | default |
//! |---|---|---|
//! | `provider` | identifier | the derived name |
//! | `from` | `self` / `bases` / `capabilities`, or a list of them | `[self, bases, capabilities]` |
//! | `order` | `forward` / `reverse` | `forward` |
//! | `recurse` | bool | `true` |
//! | `call_mode` | `multi` / `single` | `multi` |
//! | `aggregator` | [`Aggregator`] | identity |
//!
//! Aliases: `superclasses` for `bases`, `roles` for `capabilities`,
//! `top_down` / `bottom_up` for the orders, `list` / `scalar` for the call
//! modes, `context` for `call_mode`, `collector` for `aggregator`.

use std::fmt;
use std::sync::Arc;

use method_collect_core::{
    relocated_name, CallMode, Instance, OperationError, Value, RELOCATION_PREFIX,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;
use crate::hooks::{CollectHook, TracingHook};

// ============================================================================
// Enumerations
// ============================================================================

/// Where providers are looked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// The invocant's own type (literal `self`).
    #[serde(rename = "self")]
    Own,
    /// Ancestors in linearization order.
    #[serde(alias = "superclasses")]
    Bases,
    /// Composed capability units.
    #[serde(alias = "roles")]
    Capabilities,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Own, Source::Bases, Source::Capabilities];

    pub fn from_literal(literal: &str) -> Option<Self> {
        match literal {
            "self" => Some(Source::Own),
            "bases" | "superclasses" => Some(Source::Bases),
            "capabilities" | "roles" => Some(Source::Capabilities),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Source::Own => "self",
            Source::Bases => "bases",
            Source::Capabilities => "capabilities",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Traversal direction within the `Bases` and `Capabilities` buckets.
///
/// `Forward` is most-derived (or first-declared) first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    #[default]
    #[serde(alias = "top_down")]
    Forward,
    #[serde(alias = "bottom_up")]
    Reverse,
}

impl Order {
    pub fn from_literal(literal: &str) -> Option<Self> {
        match literal {
            "forward" | "top_down" => Some(Order::Forward),
            "reverse" | "bottom_up" => Some(Order::Reverse),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Order::Forward => "forward",
            Order::Reverse => "reverse",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Aggregator
// ============================================================================

type AggregatorFn =
    dyn Fn(&Instance, Vec<Value>) -> Result<Vec<Value>, OperationError> + Send + Sync;

/// Reduces the flattened provider results into the derived operation's
/// result.
#[derive(Clone)]
pub struct Aggregator(Arc<AggregatorFn>);

impl Aggregator {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Instance, Vec<Value>) -> Result<Vec<Value>, OperationError>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(f))
    }

    /// Pass results through unchanged.
    pub fn identity() -> Self {
        Self::new(|_, items| Ok(items))
    }

    pub fn apply(&self, invocant: &Instance, items: Vec<Value>) -> Result<Vec<Value>, OperationError> {
        (self.0)(invocant, items)
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Aggregator(..)")
    }
}

// ============================================================================
// CollectConfig
// ============================================================================

/// Resolved configuration of one declaration.
#[derive(Clone)]
pub struct CollectConfig {
    /// Name the derived operation is installed under
    pub derived_name: String,
    /// Name looked up on each holder
    pub provider_name: String,
    /// Buckets, in the order their providers are concatenated
    pub sources: Vec<Source>,
    /// Direction within the `Bases` and `Capabilities` buckets
    pub order: Order,
    /// `false` keeps only the nearest base that defines the provider
    pub recurse_bases: bool,
    /// How each provider's return is captured
    pub call_mode: CallMode,
    /// Final reduction
    pub aggregator: Aggregator,
    /// Observer for declaration and call events
    pub hook: Arc<dyn CollectHook>,
}

impl CollectConfig {
    /// Defaults for `derived_name`; the provider name is the same.
    pub fn new(derived_name: impl Into<String>) -> Self {
        let derived_name = derived_name.into();
        Self {
            provider_name: derived_name.clone(),
            derived_name,
            sources: Source::ALL.to_vec(),
            order: Order::Forward,
            recurse_bases: true,
            call_mode: CallMode::Multi,
            aggregator: Aggregator::identity(),
            hook: Arc::new(TracingHook),
        }
    }

    /// Collect from a differently named provider operation.
    pub fn with_provider(mut self, name: impl Into<String>) -> Self {
        self.provider_name = name.into();
        self
    }

    pub fn with_sources(mut self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.sources = sources.into_iter().collect();
        self
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn with_recurse_bases(mut self, recurse: bool) -> Self {
        self.recurse_bases = recurse;
        self
    }

    pub fn with_call_mode(mut self, mode: CallMode) -> Self {
        self.call_mode = mode;
        self
    }

    pub fn with_aggregator<F>(mut self, f: F) -> Self
    where
        F: Fn(&Instance, Vec<Value>) -> Result<Vec<Value>, OperationError>
            + Send
            + Sync
            + 'static,
    {
        self.aggregator = Aggregator::new(f);
        self
    }

    pub fn with_hook(mut self, hook: Arc<dyn CollectHook>) -> Self {
        self.hook = hook;
        self
    }

    /// Private name a relocated self provider would live under.
    pub fn relocated_name(&self) -> String {
        relocated_name(&self.provider_name)
    }

    /// Check names and sources.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_identifier(&self.derived_name)?;
        check_identifier(&self.provider_name)?;
        if self.sources.is_empty() {
            return Err(ConfigError::EmptySources);
        }
        Ok(())
    }

    /// Serializable summary.
    pub fn describe(&self) -> CollectDescriptor {
        CollectDescriptor {
            derived_name: self.derived_name.clone(),
            provider_name: Some(self.provider_name.clone()),
            sources: self.sources.clone(),
            order: self.order,
            recurse_bases: self.recurse_bases,
            call_mode: self.call_mode,
        }
    }
}

impl fmt::Debug for CollectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectConfig")
            .field("derived_name", &self.derived_name)
            .field("provider_name", &self.provider_name)
            .field("sources", &self.sources)
            .field("order", &self.order)
            .field("recurse_bases", &self.recurse_bases)
            .field("call_mode", &self.call_mode)
            .finish_non_exhaustive()
    }
}

fn check_identifier(name: &str) -> Result<(), ConfigError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(ConfigError::InvalidName {
            name: name.to_string(),
            reason: "must not be empty",
        });
    };
    if !(first.is_ascii_alphabetic() || first == '_')
        || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ConfigError::InvalidName {
            name: name.to_string(),
            reason: "must be an identifier",
        });
    }
    if name.starts_with(RELOCATION_PREFIX) {
        return Err(ConfigError::ReservedName {
            name: name.to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// Descriptor
// ============================================================================

/// The closure-free part of a configuration, for logs, introspection and
/// loading declarations from data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectDescriptor {
    pub derived_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(default = "default_sources", deserialize_with = "one_or_many")]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub order: Order,
    #[serde(default = "default_recurse")]
    pub recurse_bases: bool,
    #[serde(default)]
    pub call_mode: CallMode,
}

fn default_sources() -> Vec<Source> {
    Source::ALL.to_vec()
}

fn default_recurse() -> bool {
    true
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Source>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Source),
        Many(Vec<Source>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(source) => vec![source],
        OneOrMany::Many(sources) => sources,
    })
}

impl TryFrom<CollectDescriptor> for CollectConfig {
    type Error = ConfigError;

    fn try_from(desc: CollectDescriptor) -> Result<Self, Self::Error> {
        let mut config = CollectConfig::new(desc.derived_name)
            .with_sources(desc.sources)
            .with_order(desc.order)
            .with_recurse_bases(desc.recurse_bases)
            .with_call_mode(desc.call_mode);
        if let Some(provider) = desc.provider_name {
            config = config.with_provider(provider);
        }
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Raw Declaration Arguments
// ============================================================================

/// One argument at the raw declaration surface.
#[derive(Debug, Clone)]
pub enum Arg {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<Arg>),
    Aggregator(Aggregator),
}

impl Arg {
    fn kind(&self) -> &'static str {
        match self {
            Arg::Str(_) => "string",
            Arg::Int(_) => "integer",
            Arg::Bool(_) => "boolean",
            Arg::List(_) => "list",
            Arg::Aggregator(_) => "aggregator",
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Str(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Str(s)
    }
}

impl From<i64> for Arg {
    fn from(n: i64) -> Self {
        Arg::Int(n)
    }
}

impl From<i32> for Arg {
    fn from(n: i32) -> Self {
        Arg::Int(n.into())
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Arg::Bool(b)
    }
}

impl From<Aggregator> for Arg {
    fn from(a: Aggregator) -> Self {
        Arg::Aggregator(a)
    }
}

impl<T: Into<Arg>> From<Vec<T>> for Arg {
    fn from(items: Vec<T>) -> Self {
        Arg::List(items.into_iter().map(Into::into).collect())
    }
}

/// Build a raw option list: `collect_args!["order", "reverse", "recurse", false]`.
#[macro_export]
macro_rules! collect_args {
    ($($arg:expr),* $(,)?) => {
        vec![$($crate::Arg::from($arg)),*]
    };
}

/// Parse a raw declaration into a validated configuration.
///
/// `args` is either empty (all defaults), a single [`Arg::Aggregator`]
/// (shorthand that sets only the aggregator), or a flat key/value list.
/// Later occurrences of a key override earlier ones. Pure: nothing is
/// touched until the caller installs the result.
pub fn resolve(name: impl Into<Arg>, args: Vec<Arg>) -> Result<CollectConfig, ConfigError> {
    let derived_name = name_arg(name.into())?;
    let mut config = CollectConfig::new(derived_name);

    if let [Arg::Aggregator(aggregator)] = args.as_slice() {
        config.aggregator = aggregator.clone();
        config.validate()?;
        return Ok(config);
    }

    if args.len() % 2 != 0 {
        return Err(ConfigError::OddOptionList { len: args.len() });
    }

    let mut pairs = args.into_iter();
    let mut position = 0;
    while let (Some(key), Some(value)) = (pairs.next(), pairs.next()) {
        let Arg::Str(key) = key else {
            return Err(ConfigError::NonStringKey { position });
        };
        match key.as_str() {
            "provider" => config.provider_name = name_arg(value)?,
            "from" => config.sources = sources_arg(value)?,
            "order" => {
                let literal = literal_arg("order", value)?;
                config.order = Order::from_literal(&literal)
                    .ok_or(ConfigError::InvalidLiteral {
                        option: "order",
                        literal,
                    })?;
            }
            "recurse" => {
                config.recurse_bases = match value {
                    Arg::Bool(b) => b,
                    Arg::Int(n) => n != 0,
                    _ => {
                        return Err(ConfigError::InvalidValue {
                            option: "recurse",
                            expected: "a boolean",
                        })
                    }
                }
            }
            "call_mode" | "context" => {
                let literal = literal_arg("call_mode", value)?;
                config.call_mode = CallMode::from_literal(&literal)
                    .ok_or(ConfigError::InvalidLiteral {
                        option: "call_mode",
                        literal,
                    })?;
            }
            "aggregator" | "collector" => match value {
                Arg::Aggregator(aggregator) => config.aggregator = aggregator,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        option: "aggregator",
                        expected: "an aggregator",
                    })
                }
            },
            _ => return Err(ConfigError::UnknownOption { key }),
        }
        position += 2;
    }

    config.validate()?;
    Ok(config)
}

fn name_arg(arg: Arg) -> Result<String, ConfigError> {
    match arg {
        Arg::Str(name) => {
            check_identifier(&name)?;
            Ok(name)
        }
        other => Err(ConfigError::InvalidName {
            name: format!("<{}>", other.kind()),
            reason: "must be a single string",
        }),
    }
}

fn literal_arg(option: &'static str, arg: Arg) -> Result<String, ConfigError> {
    match arg {
        Arg::Str(s) => Ok(s),
        _ => Err(ConfigError::InvalidValue {
            option,
            expected: "a string literal",
        }),
    }
}

fn sources_arg(arg: Arg) -> Result<Vec<Source>, ConfigError> {
    let literals = match arg {
        Arg::List(items) => items
            .into_iter()
            .map(|item| literal_arg("from", item))
            .collect::<Result<Vec<_>, _>>()?,
        other => vec![literal_arg("from", other)?],
    };
    if literals.is_empty() {
        return Err(ConfigError::EmptySources);
    }
    literals
        .into_iter()
        .map(|literal| {
            Source::from_literal(&literal).ok_or(ConfigError::InvalidLiteral {
                option: "from",
                literal,
            })
        })
        .collect()
}
