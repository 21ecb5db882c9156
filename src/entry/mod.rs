//! Corpus entry model.
//!
//! An [`Entry`] is the canonical record of one corpus item: its stable id, reference label,
//! text and embedding. Text and embedding are only ever replaced together.

mod error;

pub use error::ValidationError;

use serde::{Deserialize, Serialize};

use crate::hashing::{hash_reference, hash_text};

/// Stable, opaque entry identifier.
///
/// Derived from the reference label (see [`EntryId::for_reference`]); ordered so that equal
/// similarity scores break ties deterministically.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl EntryId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Deterministic id for a reference label.
    pub fn for_reference(reference: &str) -> Self {
        Self(hash_reference(reference))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<u64> for EntryId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Reference label and text carried alongside a vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub reference: String,
    pub text: String,
}

impl Payload {
    pub fn new(reference: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            text: text.into(),
        }
    }
}

/// Canonical corpus record.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
)]
pub struct Entry {
    pub id: EntryId,
    /// Human-readable label, e.g. `"John 3:16"`.
    pub reference: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

impl Entry {
    /// Creates an entry whose id is derived from `reference`.
    pub fn new(
        reference: impl Into<String>,
        text: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        let reference = reference.into();
        Self {
            id: EntryId::for_reference(&reference),
            reference,
            text: text.into(),
            embedding,
        }
    }

    /// Creates an entry with an explicit id.
    pub fn with_id(
        id: EntryId,
        reference: impl Into<String>,
        text: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            id,
            reference: reference.into(),
            text: text.into(),
            embedding,
        }
    }

    /// Checks the reference and embedding against the configured dimension.
    pub fn validate(&self, dimension: usize) -> Result<(), ValidationError> {
        if self.reference.trim().is_empty() {
            return Err(ValidationError::EmptyReference);
        }
        validate_embedding(self.id, &self.embedding, dimension)
    }

    pub fn payload(&self) -> Payload {
        Payload::new(self.reference.clone(), self.text.clone())
    }

    pub fn text_fingerprint(&self) -> [u8; 32] {
        hash_text(&self.text)
    }

    /// Returns `true` if this entry already holds `reference` with exactly `text`.
    pub fn has_content(&self, reference: &str, text: &str) -> bool {
        self.reference == reference && self.text_fingerprint() == hash_text(text)
    }
}

/// Validates an embedding for storage: correct length, finite values, non-zero magnitude.
pub fn validate_embedding(
    id: EntryId,
    embedding: &[f32],
    dimension: usize,
) -> Result<(), ValidationError> {
    if embedding.len() != dimension {
        return Err(ValidationError::DimensionMismatch {
            id,
            expected: dimension,
            actual: embedding.len(),
        });
    }

    if let Some(position) = embedding.iter().position(|v| !v.is_finite()) {
        return Err(ValidationError::NonFiniteEmbedding { id, position });
    }

    if embedding.iter().all(|v| *v == 0.0) {
        return Err(ValidationError::ZeroEmbedding { id });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_derived_from_reference() {
        let entry = Entry::new("John 3:16", "For God so loved the world", vec![1.0, 0.0]);
        assert_eq!(entry.id, EntryId::for_reference("John 3:16"));
    }

    #[test]
    fn test_entry_id_display_is_fixed_width_hex() {
        assert_eq!(EntryId::new(255).to_string(), "00000000000000ff");
    }

    #[test]
    fn test_validate_dimension_mismatch() {
        let entry = Entry::new("A", "text", vec![1.0, 0.0, 0.0]);
        let err = entry.validate(2).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::DimensionMismatch {
                expected: 2,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_rejects_zero_embedding() {
        let entry = Entry::new("A", "text", vec![0.0, 0.0]);
        assert!(matches!(
            entry.validate(2),
            Err(ValidationError::ZeroEmbedding { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let entry = Entry::new("A", "text", vec![0.5, f32::NAN]);
        assert!(matches!(
            entry.validate(2),
            Err(ValidationError::NonFiniteEmbedding { position: 1, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_blank_reference() {
        let entry = Entry::with_id(EntryId::new(1), "  ", "text", vec![1.0]);
        assert_eq!(entry.validate(1), Err(ValidationError::EmptyReference));
    }

    #[test]
    fn test_has_content() {
        let entry = Entry::new("A", "text", vec![1.0]);
        assert!(entry.has_content("A", "text"));
        assert!(!entry.has_content("A", "text!"));
        assert!(!entry.has_content("B", "text"));
    }

    #[test]
    fn test_entry_id_serializes_as_number() {
        let json = serde_json::to_string(&EntryId::new(42)).unwrap();
        assert_eq!(json, "42");
    }
}
