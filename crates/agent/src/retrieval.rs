use std::cmp::Ordering;
use std::collections::BTreeSet;

use asha_core::session::{EntityKind, SessionContext};
use asha_core::KnowledgeDoc;

#[derive(Clone, Debug, PartialEq)]
pub struct ScoredDoc {
    pub doc: KnowledgeDoc,
    pub score: f64,
}

/// Fold the most recent remembered entities into the raw message so that
/// follow-up questions ("anything in pune?") keep their earlier subject.
pub fn build_search_query(message: &str, ctx: &SessionContext) -> String {
    let mut query = message.to_string();

    for kind in EntityKind::SEARCH_RELEVANT {
        for value in ctx.recent_entities(kind, 2) {
            query.push(' ');
            query.push_str(value);
        }
    }

    query
}

/// Keyword-overlap retrieval: score every document by the fraction of query
/// tokens it shares, keep positive scores, return the best `top_k`. A single
/// linear pass over the in-memory records; there is no index.
pub fn keyword_search(query: &str, documents: &[KnowledgeDoc], top_k: usize) -> Vec<ScoredDoc> {
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() || documents.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<ScoredDoc> = documents
        .iter()
        .filter_map(|doc| {
            let doc_tokens = tokenize(&doc.search_text());
            let matches = query_tokens.intersection(&doc_tokens).count();
            (matches > 0).then(|| ScoredDoc {
                doc: doc.clone(),
                score: matches as f64 / query_tokens.len() as f64,
            })
        })
        .collect();

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    results.truncate(top_k);
    results
}

pub fn tokenize(text: &str) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();
    let mut current = String::new();

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            current.extend(ch.to_lowercase());
        } else if !current.is_empty() {
            tokens.insert(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.insert(current);
    }

    tokens
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use asha_core::session::{EntityKind, SessionContext};
    use asha_core::{JobRecord, KnowledgeDoc, MentorshipRecord};

    use super::{build_search_query, keyword_search, tokenize};

    fn job(title: &str, description: &str, location: &str) -> KnowledgeDoc {
        KnowledgeDoc::Job(JobRecord {
            id: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            description: description.to_string(),
            location: location.to_string(),
            ..JobRecord::default()
        })
    }

    #[test]
    fn tokenizer_lowercases_and_splits_on_non_word() {
        let tokens = tokenize("Data-Analyst jobs, in PUNE!");
        assert!(tokens.contains("data"));
        assert!(tokens.contains("analyst"));
        assert!(tokens.contains("pune"));
        assert!(!tokens.contains("Data-Analyst"));
    }

    #[test]
    fn overlap_score_ranks_best_match_first() {
        let documents = vec![
            job("Data Engineer", "big data pipelines", "Mumbai"),
            job("Data Analyst", "analyze data and reports", "Pune"),
            job("HR Manager", "people operations", "Delhi"),
        ];

        let results = keyword_search("data analyst in pune", &documents, 5);

        assert_eq!(results.len(), 2, "zero-overlap documents are dropped");
        assert_eq!(results[0].doc.title(), "Data Analyst");
        assert!(results[0].score > results[1].score);
        assert!(results.iter().all(|scored| scored.doc.title() != "HR Manager"));
    }

    #[test]
    fn results_are_capped_at_top_k() {
        let documents: Vec<KnowledgeDoc> = (0..10)
            .map(|index| job(&format!("Developer {index}"), "software developer role", "Remote"))
            .collect();

        let results = keyword_search("developer", &documents, 5);
        assert_eq!(results.len(), 5);
    }

    #[test]
    fn empty_query_or_corpus_returns_nothing() {
        assert!(keyword_search("", &[job("A", "b", "c")], 5).is_empty());
        assert!(keyword_search("anything", &[], 5).is_empty());
    }

    #[test]
    fn mixed_kinds_are_searched_together() {
        let documents = vec![
            job("Backend Developer", "apis in rust", "Remote"),
            KnowledgeDoc::Mentorship(MentorshipRecord {
                id: "m-1".to_string(),
                title: "Leadership Mentoring".to_string(),
                mentor: "Priya".to_string(),
                expertise: "engineering leadership".to_string(),
                description: "grow into leadership roles".to_string(),
            }),
        ];

        let results = keyword_search("leadership mentoring", &documents, 5);
        assert_eq!(results[0].doc.title(), "Leadership Mentoring");
    }

    #[test]
    fn search_query_includes_recent_entities() {
        let mut ctx = SessionContext::new(3600);
        let mut extracted = BTreeMap::new();
        extracted.insert(EntityKind::Skill, vec!["python".to_string(), "sql".to_string()]);
        extracted.insert(EntityKind::Location, vec!["pune".to_string()]);
        ctx.merge_entities(extracted, 5);

        let query = build_search_query("anything new?", &ctx);
        assert!(query.contains("anything new?"));
        assert!(query.contains("python"));
        assert!(query.contains("sql"));
        assert!(query.contains("pune"));
    }
}
