//! Category resolution engine
//!
//! Given a customs tariff code (full 10-digit or 4-digit group form) and an
//! optional free-text product kind, picks the single registry category the
//! product belongs to. Resolution is local-first against a static mapping
//! table, with token-scoring disambiguation when a product kind is supplied,
//! then falls back to the registry's category endpoint, then to a fixed
//! default category.

use crate::services::registry_client::{RegistryClient, RegistryError};
use crate::services::tokenizer;
use katalog_common::Error;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Default category when every resolution strategy comes up empty
/// (generic sewn goods)
pub const DEFAULT_CATEGORY: u32 = 215009;

/// Categories preferred by the remote fallback when a code maps to several
/// (apparel, footwear)
const PRIORITY_CATEGORIES: &[u32] = &[30933, 30717];

/// Categories the registry no longer accepts; filtered from candidates.
/// Reviewed externally against registry announcements.
const INACTIVE_CATEGORIES: &[u32] = &[30790, 215054];

/// Categories deprioritized in ambiguous resolution: generic catch-alls
/// that win only when nothing specific matches.
const LOW_PRIORITY_CATEGORIES: &[u32] = &[215009];

/// One disambiguation override: when a query token contains `query_stem`,
/// the score of `category_id` is multiplied by `multiplier`.
#[derive(Debug, Clone, Copy)]
struct ScoringRule {
    query_stem: &'static str,
    category_id: u32,
    multiplier: f64,
}

/// Keyword/category overrides for known confusable pairs. Kept as a table so
/// the heuristic can be extended without touching the scoring algorithm.
const SCORING_RULES: &[ScoringRule] = &[
    // trousers queries collide with the skirts category ("юбки-брюки")
    ScoringRule {
        query_stem: "брюк",
        category_id: 215062,
        multiplier: 0.3,
    },
    // and symmetrically, skirt queries with the trousers category
    ScoringRule {
        query_stem: "юбк",
        category_id: 215061,
        multiplier: 0.3,
    },
    // single canonical category for the keyword
    ScoringRule {
        query_stem: "плать",
        category_id: 215064,
        multiplier: 2.0,
    },
    ScoringRule {
        query_stem: "костюм",
        category_id: 215063,
        multiplier: 3.0,
    },
];

/// One candidate category from the mapping table
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCandidate {
    pub id: u32,
    pub name: String,
}

/// Static tariff-code → category-candidates table.
///
/// Loaded once at startup from a JSON document
/// (`{"6204": {"215061": "Брюки", ...}, ...}`); keys are full codes or
/// 4-digit groups. Document insertion order is preserved, so ambiguous
/// resolution picks "the first" candidate deterministically.
pub struct CategoryMapping {
    entries: Vec<(String, Vec<CategoryCandidate>)>,
    index: HashMap<String, usize>,
}

impl CategoryMapping {
    /// Load the mapping document from disk. Absence is a fatal
    /// configuration error.
    pub fn load(path: &Path) -> katalog_common::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Mapping file {} unavailable: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parse the mapping document
    pub fn from_json(json: &str) -> katalog_common::Result<Self> {
        // serde_json's preserve_order feature keeps document order here
        let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Mapping parse failed: {}", e)))?;

        let mut entries = Vec::with_capacity(raw.len());
        let mut index = HashMap::with_capacity(raw.len());

        for (code, categories) in raw {
            let object = categories.as_object().ok_or_else(|| {
                Error::Config(format!("Mapping entry {} is not an object", code))
            })?;

            let mut candidates = Vec::with_capacity(object.len());
            for (cat_id, name) in object {
                let id: u32 = cat_id.parse().map_err(|_| {
                    Error::Config(format!("Mapping entry {}: bad category id {}", code, cat_id))
                })?;
                let name = name.as_str().unwrap_or_default().to_string();
                candidates.push(CategoryCandidate { id, name });
            }

            index.insert(code.clone(), entries.len());
            entries.push((code, candidates));
        }

        Ok(Self { entries, index })
    }

    /// Test/bootstrap helper: build a table from literal entries
    pub fn from_entries(entries: &[(&str, &[(u32, &str)])]) -> Self {
        let mut table = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());
        for (code, cats) in entries {
            let candidates = cats
                .iter()
                .map(|(id, name)| CategoryCandidate {
                    id: *id,
                    name: (*name).to_string(),
                })
                .collect();
            index.insert((*code).to_string(), table.len());
            table.push(((*code).to_string(), candidates));
        }
        Self {
            entries: table,
            index,
        }
    }

    /// Candidates for a tariff code: exact key first, then the 4-digit
    /// group prefix.
    pub fn candidates(&self, tariff_code: &str) -> Option<&[CategoryCandidate]> {
        if let Some(&i) = self.index.get(tariff_code) {
            return Some(&self.entries[i].1);
        }
        if tariff_code.chars().count() > 4 {
            let group: String = tariff_code.chars().take(4).collect();
            if let Some(&i) = self.index.get(&group) {
                return Some(&self.entries[i].1);
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Category resolver: local mapping table + scoring heuristics, remote
/// category lookup fallback, fixed default.
pub struct CategoryResolver {
    mapping: CategoryMapping,
    registry: Arc<RegistryClient>,
    default_category: u32,
}

impl CategoryResolver {
    pub fn new(mapping: CategoryMapping, registry: Arc<RegistryClient>) -> Self {
        Self {
            mapping,
            registry,
            default_category: DEFAULT_CATEGORY,
        }
    }

    /// Local resolution against the mapping table. Pure; no I/O.
    ///
    /// Returns `None` when the table has no opinion (empty/unknown code);
    /// the caller then falls through to the remote lookup or a default.
    pub fn resolve_local(&self, tariff_code: &str, product_kind: Option<&str>) -> Option<u32> {
        let tariff_code = tariff_code.trim();
        if tariff_code.is_empty() {
            return None;
        }

        let all = self.mapping.candidates(tariff_code)?;
        if all.is_empty() {
            return None;
        }

        // Drop inactive categories; when that would empty the set, keep the
        // original candidates and warn (policy: prefer an answer over none).
        let active: Vec<&CategoryCandidate> = all
            .iter()
            .filter(|c| !INACTIVE_CATEGORIES.contains(&c.id))
            .collect();
        let pool: Vec<&CategoryCandidate> = if active.is_empty() {
            tracing::warn!(
                tariff_code,
                "all mapped categories inactive, keeping original candidate set"
            );
            all.iter().collect()
        } else {
            active
        };

        let kind = product_kind.map(str::trim).filter(|k| !k.is_empty());
        match kind {
            None => Some(first_normal_or_any(&pool)),
            Some(kind) => Some(self.resolve_scored(&pool, kind)),
        }
    }

    /// Score candidates against the tokenized product kind and pick the
    /// winner.
    fn resolve_scored(&self, pool: &[&CategoryCandidate], kind: &str) -> u32 {
        let query = tokenizer::tokenize(kind);
        if query.is_empty() {
            return first_normal_or_any(pool);
        }

        let mut scored: Vec<(&CategoryCandidate, f64)> = pool
            .iter()
            .map(|c| (*c, score_candidate(&query, c)))
            .collect();
        // stable sort keeps table order among equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        tracing::debug!(
            kind,
            scores = ?scored
                .iter()
                .map(|(c, s)| (c.id, format!("{:.2}", s)))
                .collect::<Vec<_>>(),
            "category scoring"
        );

        // Highest positive scorer outside the low-priority set wins; when
        // only low-priority categories scored, take the top one anyway.
        if let Some((winner, _)) = scored
            .iter()
            .find(|(c, s)| *s > 0.0 && !LOW_PRIORITY_CATEGORIES.contains(&c.id))
        {
            return winner.id;
        }
        if let Some((winner, _)) = scored.iter().find(|(_, s)| *s > 0.0) {
            return winner.id;
        }

        first_normal_or_any(pool)
    }

    /// Remote fallback: ask the registry which categories cover the code.
    ///
    /// 10-digit codes try their 4-digit group first, then the full code.
    /// Failures are logged and surfaced as `None`, never raised.
    pub async fn resolve_remote(&self, tariff_code: &str) -> Option<u32> {
        let tariff_code = tariff_code.trim();
        if tariff_code.is_empty() {
            return None;
        }

        let mut categories = Vec::new();
        if tariff_code.chars().count() == 10 {
            let group: String = tariff_code.chars().take(4).collect();
            categories = self.fetch_categories_logged(&group).await;
        }
        if categories.is_empty() {
            categories = self.fetch_categories_logged(tariff_code).await;
        }
        if categories.is_empty() {
            return None;
        }

        // priority active categories first, then any active, then the first
        if let Some(cat) = categories
            .iter()
            .find(|c| PRIORITY_CATEGORIES.contains(&c.cat_id) && c.category_active)
        {
            return Some(cat.cat_id);
        }
        if let Some(cat) = categories.iter().find(|c| c.category_active) {
            return Some(cat.cat_id);
        }
        categories.first().map(|c| c.cat_id)
    }

    async fn fetch_categories_logged(
        &self,
        code: &str,
    ) -> Vec<crate::services::registry_client::RegistryCategory> {
        match self.registry.fetch_categories(code).await {
            Ok(categories) => categories,
            Err(RegistryError::Api(status, body)) => {
                tracing::warn!(code, status, body = %body, "category lookup failed");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(code, error = %e, "category lookup failed");
                Vec::new()
            }
        }
    }

    /// Full resolution chain for card assembly:
    /// tariff+kind → tariff-only → kind-only → fixed default.
    pub async fn resolve_category(&self, tariff_code: &str, product_kind: &str) -> u32 {
        let tariff_code = tariff_code.trim();
        let product_kind = product_kind.trim();

        if !tariff_code.is_empty() && !product_kind.is_empty() {
            if let Some(id) = self.resolve_local(tariff_code, Some(product_kind)) {
                return id;
            }
        }
        if !tariff_code.is_empty() {
            if let Some(id) = self.resolve_local(tariff_code, None) {
                return id;
            }
            if let Some(id) = self.resolve_remote(tariff_code).await {
                return id;
            }
        }
        if !product_kind.is_empty() {
            if let Some(id) = self.resolve_local("", Some(product_kind)) {
                return id;
            }
        }

        tracing::info!(
            tariff_code,
            product_kind,
            default = self.default_category,
            "falling back to default category"
        );
        self.default_category
    }

    pub fn default_category(&self) -> u32 {
        self.default_category
    }

    pub fn mapping(&self) -> &CategoryMapping {
        &self.mapping
    }
}

/// First candidate outside the low-priority set, else the first candidate
fn first_normal_or_any(pool: &[&CategoryCandidate]) -> u32 {
    pool.iter()
        .find(|c| !LOW_PRIORITY_CATEGORIES.contains(&c.id))
        .or_else(|| pool.first())
        .map(|c| c.id)
        .unwrap_or(DEFAULT_CATEGORY)
}

/// Score one candidate's name against the query token set:
/// +1 per exact stemmed-token intersection, +0.5 per substring pair
/// (both tokens ≥3 chars, counted for every pair), disambiguation
/// multipliers from [`SCORING_RULES`], normalized by query token count.
fn score_candidate(query: &[String], candidate: &CategoryCandidate) -> f64 {
    let name_tokens = tokenizer::tokenize(&candidate.name);
    let mut score = 0.0;

    for q in query {
        if name_tokens.contains(q) {
            score += 1.0;
        }
    }

    for q in query {
        if q.chars().count() < 3 {
            continue;
        }
        for n in &name_tokens {
            if n.chars().count() < 3 || q == n {
                continue;
            }
            if q.contains(n.as_str()) || n.contains(q.as_str()) {
                score += 0.5;
            }
        }
    }

    for rule in SCORING_RULES {
        if candidate.id == rule.category_id && query.iter().any(|q| q.contains(rule.query_stem)) {
            score *= rule.multiplier;
        }
    }

    score / query.len() as f64
}
