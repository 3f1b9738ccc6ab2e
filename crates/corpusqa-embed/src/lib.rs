//! Sparse TF-IDF vectorization over a bounded, corpus-fitted vocabulary.

mod tfidf;
mod vocabulary;

pub use tfidf::TfIdfVectorizer;
pub use vocabulary::Vocabulary;

/// Scale `v` to unit length in place. Zero vectors stay zero.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| f64::from(*x) * f64::from(*x)).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x = (f64::from(*x) / norm) as f32;
        }
    }
}
