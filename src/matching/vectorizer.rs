use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use super::stop_words::is_stop_word;

/// Splits text into lower-cased word tokens.
///
/// Tokens are runs of alphanumeric characters of length two or more; stop-words are dropped.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_lowercase)
        .filter(|token| !is_stop_word(token))
}

/// Sparse bag-of-words vector: column index to token count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SparseVector(BTreeMap<usize, u32>);

impl SparseVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, column: usize) {
        *self.0.entry(column).or_insert(0) += 1;
    }

    pub fn get(&self, column: usize) -> u32 {
        self.0.get(&column).copied().unwrap_or(0)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of non-zero columns
    pub fn nnz(&self) -> usize {
        self.0.len()
    }

    /// Unit-length copy of this vector; the zero vector stays zero.
    ///
    /// Counts are divided by their greatest common divisor first, so proportional
    /// vectors normalize to bit-identical components.
    pub fn normalized(&self) -> NormalizedVector {
        let divisor = self.0.values().copied().fold(0, gcd);
        if divisor == 0 {
            return NormalizedVector::default();
        }

        let reduced: Vec<(usize, f64)> = self
            .0
            .iter()
            .map(|(&column, &count)| (column, f64::from(count / divisor)))
            .collect();
        let norm = reduced
            .iter()
            .map(|&(_, value)| value * value)
            .sum::<f64>()
            .sqrt();

        NormalizedVector(
            reduced
                .into_iter()
                .map(|(column, value)| (column, value / norm))
                .collect(),
        )
    }
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// L2-normalized sparse vector, columns in ascending order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedVector(Vec<(usize, f64)>);

impl NormalizedVector {
    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// Dot product, which for unit vectors is their cosine similarity, clamped to [0, 1]
    pub fn dot(&self, other: &NormalizedVector) -> f64 {
        let mut left = self.0.iter().peekable();
        let mut right = other.0.iter().peekable();
        let mut sum: f64 = 0.0;

        while let (Some(&&(a, x)), Some(&&(b, y))) = (left.peek(), right.peek()) {
            match a.cmp(&b) {
                std::cmp::Ordering::Less => {
                    left.next();
                }
                std::cmp::Ordering::Greater => {
                    right.next();
                }
                std::cmp::Ordering::Equal => {
                    sum += x * y;
                    left.next();
                    right.next();
                }
            }
        }

        sum.clamp(0.0, 1.0)
    }
}

impl FromIterator<(usize, u32)> for SparseVector {
    fn from_iter<I: IntoIterator<Item = (usize, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().filter(|&(_, count)| count > 0).collect())
    }
}

/// Result of vectorizing one text against the fixed vocabulary
#[derive(Debug, Clone, PartialEq)]
pub struct Vectorized {
    pub vector: SparseVector,
    /// Tokens that survived stop-word removal but are not in the vocabulary, in first-seen order
    pub unknown_tokens: Vec<String>,
}

/// Fixed token to column mapping, derived once from the corpus
#[derive(Debug, Clone)]
pub struct Vocabulary {
    columns: HashMap<String, usize>,
}

impl Vocabulary {
    /// Builds the vocabulary from corpus texts. Columns follow sorted token order.
    pub fn fit<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let tokens: BTreeSet<String> = texts.into_iter().flat_map(tokenize).collect();

        let columns = tokens
            .into_iter()
            .enumerate()
            .map(|(column, token)| (token, column))
            .collect();

        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, token: &str) -> Option<usize> {
        self.columns.get(token).copied()
    }

    /// Vectorizes a single text, reporting tokens the vocabulary does not know
    pub fn vectorize(&self, text: &str) -> Vectorized {
        let mut vector = SparseVector::new();
        let mut unknown_tokens: Vec<String> = Vec::new();

        for token in tokenize(text) {
            match self.column(&token) {
                Some(column) => vector.increment(column),
                None => {
                    if !unknown_tokens.contains(&token) {
                        unknown_tokens.push(token);
                    }
                }
            }
        }

        Vectorized {
            vector,
            unknown_tokens,
        }
    }

    /// Vectorizes each text independently
    pub fn transform<'a>(&self, texts: impl IntoIterator<Item = &'a str>) -> Vec<Vectorized> {
        texts.into_iter().map(|text| self.vectorize(text)).collect()
    }
}
