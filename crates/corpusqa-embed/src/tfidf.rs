use corpusqa_core::{Error, Result};
use corpusqa_text::TermAnalyzer;
use tracing::debug;

use crate::l2_normalize;
use crate::vocabulary::Vocabulary;

/// TF-IDF vectorizer: raw term counts weighted by smoothed IDF, L2-normalized.
///
/// A vectorizer is fit once per index generation from the complete segment
/// set. Query vectors come from [`transform`](Self::transform) against that
/// same vocabulary, so they always have the stored vectors' width.
#[derive(Clone)]
pub struct TfIdfVectorizer {
    max_features: usize,
    analyzer: TermAnalyzer,
    vocabulary: Option<Vocabulary>,
}

impl TfIdfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self { max_features, analyzer: TermAnalyzer::english(), vocabulary: None }
    }

    pub fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    /// Width of produced vectors; zero until fitted.
    pub fn dim(&self) -> usize {
        self.vocabulary.as_ref().map_or(0, Vocabulary::len)
    }

    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.vocabulary.as_ref()
    }

    /// Fit the vocabulary on `segments` and return one vector per segment.
    ///
    /// Replaces any previous fit. On error the previous fit is left intact.
    pub fn fit_transform(&mut self, segments: &[String]) -> Result<Vec<Vec<f32>>> {
        if segments.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        let analyzed: Vec<Vec<String>> = segments.iter().map(|s| self.analyzer.terms(s)).collect();
        let vocabulary = Vocabulary::fit(&analyzed, self.max_features)?;
        debug!(terms = vocabulary.len(), segments = segments.len(), "fitted vocabulary");
        let vectors = analyzed.iter().map(|terms| weigh(&vocabulary, terms)).collect();
        self.vocabulary = Some(vocabulary);
        Ok(vectors)
    }

    /// Vectorize `text` against the fitted vocabulary.
    pub fn transform(&self, text: &str) -> Result<Vec<f32>> {
        let vocabulary = self.vocabulary.as_ref().ok_or(Error::UnfittedModel)?;
        Ok(weigh(vocabulary, &self.analyzer.terms(text)))
    }
}

fn weigh(vocabulary: &Vocabulary, terms: &[String]) -> Vec<f32> {
    let mut counts = vec![0u32; vocabulary.len()];
    for term in terms {
        if let Some(col) = vocabulary.column(term) {
            counts[col] += 1;
        }
    }
    let mut v: Vec<f32> = counts
        .iter()
        .enumerate()
        .map(|(col, &n)| {
            if n == 0 {
                0.0
            } else {
                n as f32 * vocabulary.idf(col).unwrap_or(0.0)
            }
        })
        .collect();
    l2_normalize(&mut v);
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "Fiber internet offers speeds up to 1 Gbps.".to_string(),
            "Customer support is available 24/7 by phone.".to_string(),
            "Cable internet is widely available.".to_string(),
        ]
    }

    #[test]
    fn rows_are_unit_length() {
        let mut v = TfIdfVectorizer::new(1000);
        for row in v.fit_transform(&corpus()).unwrap() {
            let norm: f32 = row.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5, "norm={norm}");
        }
    }

    #[test]
    fn transform_before_fit_is_unfitted() {
        let v = TfIdfVectorizer::new(10);
        assert!(!v.is_fitted());
        assert!(matches!(v.transform("fiber"), Err(Error::UnfittedModel)));
    }

    #[test]
    fn unknown_terms_give_zero_vector() {
        let mut v = TfIdfVectorizer::new(1000);
        v.fit_transform(&corpus()).unwrap();
        let q = v.transform("quantum entanglement").unwrap();
        assert_eq!(q.len(), v.dim());
        assert!(q.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn width_is_capped_by_max_features() {
        let mut v = TfIdfVectorizer::new(3);
        let rows = v.fit_transform(&corpus()).unwrap();
        assert_eq!(v.dim(), 3);
        assert!(rows.iter().all(|r| r.len() == 3));
        // "internet" and "available" occur in two segments each.
        let terms = v.vocabulary().unwrap().terms();
        assert!(terms.contains(&"internet".to_string()));
        assert!(terms.contains(&"available".to_string()));
    }

    #[test]
    fn failed_refit_keeps_previous_vocabulary() {
        let mut v = TfIdfVectorizer::new(1000);
        v.fit_transform(&corpus()).unwrap();
        let dim = v.dim();
        assert!(matches!(v.fit_transform(&[]), Err(Error::EmptyCorpus)));
        let stop_words_only = ["the and of".to_string()];
        assert!(matches!(v.fit_transform(&stop_words_only), Err(Error::EmptyVocabulary)));
        assert_eq!(v.dim(), dim);
    }
}
