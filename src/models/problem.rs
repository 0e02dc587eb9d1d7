//! QAP problem instance: immutable distance and flow matrices.

use std::path::Path;
use thiserror::Error;

/// Error raised when a problem source does not satisfy the numeric
/// contract: the size `n`, then `n²` distances, then `n²` flows, row-major,
/// whitespace-separated.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A token in the source could not be parsed as an integer.
    #[error("a value in the source is not a number: `{0}`")]
    NonNumeric(String),

    /// The source contained no tokens at all.
    #[error("source contains no values")]
    Empty,

    /// The token count does not match the declared size.
    #[error("source contains {actual} values, {expected} values were expected for a problem of size {size}")]
    WrongCount {
        actual: usize,
        expected: usize,
        size: usize,
    },

    /// The source file could not be read.
    #[error("failed to read problem source")]
    Io(#[from] std::io::Error),
}

/// An immutable QAP instance: `size` facilities, `size` locations, and the
/// flow and distance matrices between them.
///
/// Both matrices are stored fully populated in row-major order. No symmetry
/// is enforced; asymmetric data is used as-is.
///
/// # Examples
///
/// ```
/// use qap_aco::models::Problem;
///
/// let problem = Problem::parse("2  0 3 3 0  0 7 7 0").unwrap();
/// assert_eq!(problem.size(), 2);
/// assert_eq!(problem.distance(0, 1), 3);
/// assert_eq!(problem.flow(1, 0), 7);
/// ```
#[derive(Debug, Clone)]
pub struct Problem {
    size: usize,
    distances: Vec<i64>,
    flows: Vec<i64>,
}

impl Problem {
    /// Parses a problem from a whitespace-separated integer source.
    ///
    /// The first token is the size `n`, followed by `n²` distance values
    /// and then `n²` flow values, row-major.
    pub fn parse(source: &str) -> Result<Self, FormatError> {
        let values = source
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<i64>()
                    .map_err(|_| FormatError::NonNumeric(token.to_string()))
            })
            .collect::<Result<Vec<i64>, FormatError>>()?;

        if values.is_empty() {
            return Err(FormatError::Empty);
        }

        let size = usize::try_from(values[0]).unwrap_or(0);
        let expected = 1 + 2 * size * size;
        if values.len() != expected {
            return Err(FormatError::WrongCount {
                actual: values.len(),
                expected,
                size,
            });
        }

        let distances = values[1..1 + size * size].to_vec();
        let flows = values[1 + size * size..].to_vec();

        Ok(Self {
            size,
            distances,
            flows,
        })
    }

    /// Reads and parses a problem file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FormatError> {
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source)
    }

    /// Creates a problem directly from flattened row-major matrices.
    ///
    /// Returns `None` if either matrix length doesn't match `size * size`.
    pub fn from_matrices(size: usize, distances: Vec<i64>, flows: Vec<i64>) -> Option<Self> {
        if distances.len() != size * size || flows.len() != size * size {
            return None;
        }
        Some(Self {
            size,
            distances,
            flows,
        })
    }

    /// Number of facilities = number of locations.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance between locations `a` and `b`.
    #[inline]
    pub fn distance(&self, a: usize, b: usize) -> i64 {
        self.distances[a * self.size + b]
    }

    /// Flow between facilities `a` and `b`.
    #[inline]
    pub fn flow(&self, a: usize, b: usize) -> i64 {
        self.flows[a * self.size + b]
    }
}
