use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::records::{Category, NormalizedItem};

/// Identity of one probe sequence: an object in an image, under one category.
///
/// `object_id` is only unique within its image, so the image is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SequenceKey {
    pub image_id: String,
    pub object_id: String,
    pub category: Category,
}

impl fmt::Display for SequenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}/{}", self.image_id, self.object_id, self.category)
    }
}

/// Ordered correctness flags for one [`SequenceKey`]. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectnessSequence {
    pub key: SequenceKey,
    /// Order indices present, ascending
    pub order_indices: Vec<u32>,
    pub correct: Vec<bool>,
}

impl CorrectnessSequence {
    pub fn len(&self) -> usize {
        self.correct.len()
    }

    pub fn is_empty(&self) -> bool {
        self.correct.is_empty()
    }

    pub fn num_incorrect(&self) -> usize {
        self.correct.iter().filter(|ok| !**ok).count()
    }
}

/// Group items by sequence key and sort each group by order index.
///
/// Sequences come back in key order. When two items claim the same order
/// slot the first one encountered is kept and the other is reported as
/// [`Diagnostic::DuplicateOrder`]. Gaps in the order indices are reported as
/// [`Diagnostic::OrderGap`]; the sequence is scored over what is present.
pub fn build_sequences(
    items: &[NormalizedItem],
    diagnostics: &mut Diagnostics,
) -> Vec<CorrectnessSequence> {
    let mut groups: BTreeMap<SequenceKey, BTreeMap<u32, &NormalizedItem>> = BTreeMap::new();

    for item in items {
        let key = SequenceKey {
            image_id: item.image_id.clone(),
            object_id: item.object_id.clone(),
            category: item.category,
        };
        match groups.entry(key).or_default().entry(item.order_index) {
            Entry::Vacant(slot) => {
                slot.insert(item);
            }
            Entry::Occupied(slot) => {
                diagnostics.push(Diagnostic::DuplicateOrder {
                    question_id: item.question_id.clone(),
                    kept: slot.get().question_id.clone(),
                });
            }
        }
    }

    groups
        .into_iter()
        .map(|(key, slots)| {
            let order_indices: Vec<u32> = slots.keys().copied().collect();
            let (missing_count, missing_sample) = missing_orders(&order_indices);
            if missing_count > 0 {
                diagnostics.push(Diagnostic::OrderGap {
                    sequence: key.to_string(),
                    missing_count,
                    missing_sample,
                });
            }
            let correct = slots.values().map(|item| item.is_correct()).collect();
            CorrectnessSequence {
                key,
                order_indices,
                correct,
            }
        })
        .collect()
}

/// Upper bound on the missing indices listed in a [`Diagnostic::OrderGap`].
const MISSING_SAMPLE_LEN: usize = 10;

/// Number of indices absent from `1..=max` and the first few of them, given
/// ascending, distinct `present`. Never walks the whole range, so a single
/// huge order index stays cheap.
fn missing_orders(present: &[u32]) -> (u32, Vec<u32>) {
    let Some(&max) = present.last() else {
        return (0, Vec::new());
    };
    // Distinct values in 1..=max, so len <= max
    let missing_count = max - present.len() as u32;

    let mut sample = Vec::new();
    let mut next = 1u32;
    for &order in present {
        while next < order && sample.len() < MISSING_SAMPLE_LEN {
            sample.push(next);
            next += 1;
        }
        if sample.len() == MISSING_SAMPLE_LEN {
            break;
        }
        next = order.saturating_add(1);
    }
    (missing_count, sample)
}
