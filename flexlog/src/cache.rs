//! Per-type decision cache.
//!
//! Decisions for every method of a type are computed together the first
//! time any of its methods is looked up, and stored in a [`DashMap`] keyed
//! by type name. Reads after that are lock-free.
//!
//! Precedence, highest first:
//!
//! 1. `NoLog`/`NoAutoLog` on the method or the type: not logged
//! 2. logging attribute on the method
//! 3. logging attribute on the type
//! 4. matching `Services` pattern, unless the method matches one of its
//!    `ExcludeMethodPatterns`
//! 5. `AutoIntercept`: input at `Information`
//!
//! An attribute or pattern resolving to `Level::None` disables logging.

use std::{collections::HashMap, sync::Arc};

use dashmap::DashMap;
use glob::Pattern;

use crate::{
    config::{LoggingConfig, PatternTieBreak, ServiceLogConfig},
    decision::Decision,
    registry::{LogAttribute, MethodDescriptor, MethodRef, TypeDescriptor},
};

/// Decisions for the methods of one type. Methods that are not logged have
/// no entry.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TypeDecisions {
    decisions: HashMap<&'static str, Decision>,
}

impl TypeDecisions {
    pub fn get(&self, method: &str) -> Option<&Decision> {
        self.decisions.get(method)
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Decision)> {
        self.decisions.iter().map(|(name, decision)| (*name, decision))
    }
}

struct ServiceRule {
    pattern: Pattern,
    is_wildcard: bool,
    literal_chars: usize,
    excludes: Vec<Pattern>,
    service: ServiceLogConfig,
}

impl ServiceRule {
    fn compile(raw: &str, service: &ServiceLogConfig) -> Option<Self> {
        let pattern = match Pattern::new(raw) {
            Ok(pattern) => pattern,
            Err(e) => {
                tracing::warn!(pattern = raw, error = %e, "skipping malformed service pattern");
                return None;
            }
        };

        let excludes = service
            .exclude_method_patterns
            .iter()
            .filter_map(|exclude| match Pattern::new(exclude) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    tracing::warn!(
                        pattern = raw,
                        exclude = exclude.as_str(),
                        error = %e,
                        "skipping malformed method exclusion pattern"
                    );
                    None
                }
            })
            .collect();

        Some(Self {
            pattern,
            is_wildcard: raw.contains(['*', '?', '[']),
            literal_chars: raw.chars().filter(|c| !matches!(c, '*' | '?')).count(),
            excludes,
            service: service.clone(),
        })
    }

    fn excludes(&self, method: &str) -> bool {
        self.excludes.iter().any(|exclude| exclude.matches(method))
    }
}

/// Computes and caches the [`Decision`] of each loggable method.
pub struct InterceptionDecisionCache {
    decisions: DashMap<&'static str, Arc<TypeDecisions>>,
    rules: Vec<ServiceRule>,
    auto_intercept: bool,
    tie_break: PatternTieBreak,
}

impl InterceptionDecisionCache {
    /// Compiles the configured service patterns. Malformed patterns are
    /// logged and skipped.
    pub fn new(config: &LoggingConfig) -> Self {
        let rules = config
            .services
            .iter()
            .filter_map(|(pattern, service)| ServiceRule::compile(pattern, service))
            .collect();

        Self {
            decisions: DashMap::new(),
            rules,
            auto_intercept: config.auto_intercept,
            tie_break: config.pattern_tie_break,
        }
    }

    /// Decision for `method`, analyzing its type first if needed.
    pub fn get_decision(&self, method: MethodRef) -> Option<Decision> {
        let descriptor = method.descriptor();
        if let Some(decisions) = self.decisions.get(descriptor.type_name) {
            return decisions.get(method.name()).cloned();
        }

        self.cache_type_decisions(descriptor)
            .get(method.name())
            .cloned()
    }

    /// Analyzes every method of a type once. Later calls return the stored
    /// result.
    pub fn cache_type_decisions(&self, descriptor: &'static TypeDescriptor) -> Arc<TypeDecisions> {
        self.decisions
            .entry(descriptor.type_name)
            .or_insert_with(|| Arc::new(self.analyze(descriptor)))
            .clone()
    }

    pub fn is_cached(&self, type_name: &str) -> bool {
        self.decisions.contains_key(type_name)
    }

    pub fn cached_type_count(&self) -> usize {
        self.decisions.len()
    }

    fn analyze(&self, descriptor: &'static TypeDescriptor) -> TypeDecisions {
        let rule = self.matching_rule(descriptor.type_name);
        let decisions: HashMap<_, _> = descriptor
            .methods
            .iter()
            .filter_map(|method| {
                self.decide(descriptor, method, rule)
                    .map(|decision| (method.name, decision))
            })
            .collect();

        tracing::debug!(
            type_name = descriptor.type_name,
            methods = descriptor.methods.len(),
            logged = decisions.len(),
            "cached logging decisions"
        );

        TypeDecisions { decisions }
    }

    fn decide(
        &self,
        descriptor: &TypeDescriptor,
        method: &MethodDescriptor,
        rule: Option<&ServiceRule>,
    ) -> Option<Decision> {
        if is_excluded(method.attributes) || is_excluded(descriptor.attributes) {
            return None;
        }

        if let Some(attribute) = logging_attribute(method.attributes) {
            return Decision::from_attribute(attribute);
        }
        if let Some(attribute) = logging_attribute(descriptor.attributes) {
            return Decision::from_attribute(attribute);
        }

        match rule {
            Some(rule) if rule.excludes(method.name) => None,
            Some(rule) => Decision::from_service(&rule.service),
            None if self.auto_intercept => Some(Decision::auto_intercept()),
            None => None,
        }
    }

    /// Exact (wildcard-free) pattern first, then the wildcard pattern with
    /// the most literal characters, ties broken by registration order.
    fn matching_rule(&self, type_name: &str) -> Option<&ServiceRule> {
        let mut matching = self
            .rules
            .iter()
            .filter(|rule| rule.pattern.matches(type_name));

        let mut best = matching.next()?;
        for rule in matching {
            let ordering = (!rule.is_wildcard, rule.literal_chars)
                .cmp(&(!best.is_wildcard, best.literal_chars));
            let better = match self.tie_break {
                PatternTieBreak::FirstRegistered => ordering.is_gt(),
                PatternTieBreak::LastRegistered => ordering.is_ge(),
            };
            if better {
                best = rule;
            }
        }

        Some(best)
    }
}

fn is_excluded(attributes: &[LogAttribute]) -> bool {
    attributes.iter().any(|a| a.kind.is_exclusion())
}

fn logging_attribute(attributes: &[LogAttribute]) -> Option<&LogAttribute> {
    attributes.iter().find(|a| !a.kind.is_exclusion())
}
