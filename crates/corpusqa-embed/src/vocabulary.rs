use std::collections::{BTreeMap, HashMap};

use corpusqa_core::{Error, Result};

#[derive(Debug, Default, Clone, Copy)]
struct TermStats {
    doc_freq: usize,
    total_freq: usize,
}

/// Terms selected at fit time, their column index and inverse document frequency.
///
/// Columns are assigned in lexicographic term order so the layout depends only
/// on the selected term set.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    index: HashMap<String, usize>,
    terms: Vec<String>,
    idf: Vec<f32>,
}

impl Vocabulary {
    /// Fit from the analyzed terms of every document in the corpus.
    ///
    /// Keeps at most `max_features` terms, preferring higher document
    /// frequency, then higher total frequency, then lexicographic order.
    pub fn fit(documents: &[Vec<String>], max_features: usize) -> Result<Self> {
        if documents.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        let mut stats: BTreeMap<&str, TermStats> = BTreeMap::new();
        for terms in documents {
            let mut seen: Vec<&str> = Vec::with_capacity(terms.len());
            for term in terms {
                let entry = stats.entry(term.as_str()).or_default();
                entry.total_freq += 1;
                if !seen.contains(&term.as_str()) {
                    seen.push(term.as_str());
                    entry.doc_freq += 1;
                }
            }
        }
        if stats.is_empty() {
            return Err(Error::EmptyVocabulary);
        }

        let mut ranked: Vec<(&str, TermStats)> = stats.into_iter().collect();
        ranked.sort_by(|(ta, a), (tb, b)| {
            b.doc_freq
                .cmp(&a.doc_freq)
                .then(b.total_freq.cmp(&a.total_freq))
                .then(ta.cmp(tb))
        });
        ranked.truncate(max_features);
        ranked.sort_by(|(ta, _), (tb, _)| ta.cmp(tb));

        let n_docs = documents.len() as f64;
        let mut index = HashMap::with_capacity(ranked.len());
        let mut terms = Vec::with_capacity(ranked.len());
        let mut idf = Vec::with_capacity(ranked.len());
        for (col, (term, st)) in ranked.into_iter().enumerate() {
            index.insert(term.to_string(), col);
            terms.push(term.to_string());
            idf.push(smooth_idf(n_docs, st.doc_freq as f64));
        }
        Ok(Self { index, terms, idf })
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn column(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn idf(&self, column: usize) -> Option<f32> {
        self.idf.get(column).copied()
    }

    /// Terms in column order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

// ln((1 + n) / (1 + df)) + 1
fn smooth_idf(n_docs: f64, doc_freq: f64) -> f32 {
    (((1.0 + n_docs) / (1.0 + doc_freq)).ln() + 1.0) as f32
}
