//! Address assignment.
//!
//! The linker inverts the extractor's label maps, walks each segment once assigning
//! absolute addresses (4 bytes per statement, declared size per variable) and checks
//! that every referenced label was declared and that static data fits below the heap.

use std::collections::{BTreeMap, HashMap};

use crate::asm::extractor::Extraction;
use crate::asm::problem::Problem;
use crate::asm::syntax::Span;
use crate::common::addr::Address;
use crate::common::constants::INSTRUCTION_SIZE;
use crate::isa::program::{Label, Program};

/// Segment base addresses used for linking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Linker {
    text_base: Address,
    data_base: Address,
    data_limit: Option<Address>,
}

impl Linker {
    /// Creates a linker placing the segments at the given bases.
    pub const fn new(text_base: Address, data_base: Address) -> Self {
        Self {
            text_base,
            data_base,
            data_limit: None,
        }
    }

    /// Rejects static data that extends past `limit` (normally the heap base).
    #[must_use]
    pub const fn with_data_limit(mut self, limit: Address) -> Self {
        self.data_limit = Some(limit);
        self
    }

    /// Links an extraction into a program image.
    ///
    /// Undefined label references are appended to `problems`.
    ///
    /// # Returns
    ///
    /// The program, or `None` if `problems` is non-empty afterwards.
    pub fn link(
        &self,
        extraction: Extraction,
        source_hash: u64,
        problems: &mut Vec<Problem>,
    ) -> Option<Program> {
        let Extraction {
            statements,
            variables,
            text_labels,
            data_labels,
            references,
        } = extraction;

        let mut labels: HashMap<Label, Address> = HashMap::new();
        let mut lines: BTreeMap<Address, u32> = BTreeMap::new();

        let text_by_index = invert(text_labels);
        let mut addr = self.text_base;
        for (index, statement) in statements.iter().enumerate() {
            let _ = lines.insert(addr, statement.line);
            for label in text_by_index.get(&index).into_iter().flatten() {
                let _ = labels.insert(label.clone(), addr);
            }
            addr = addr.advance(INSTRUCTION_SIZE);
        }

        let data_by_index = invert(data_labels);
        let mut addr = self.data_base;
        let mut end = u64::from(self.data_base.val());
        let mut overflowed = false;
        for (index, variable) in variables.iter().enumerate() {
            let _ = lines.insert(addr, variable.line);
            for label in data_by_index.get(&index).into_iter().flatten() {
                let _ = labels.insert(label.clone(), addr);
            }
            end += u64::from(variable.size);
            let limit = self.data_limit.filter(|l| !overflowed && end > u64::from(l.val()));
            if let Some(limit) = limit {
                overflowed = true;
                problems.push(Problem::at(
                    format!("static data does not fit below the heap at {limit}"),
                    Span::line(variable.line),
                ));
            }
            addr = addr.advance(variable.size);
        }

        for reference in &references {
            if !labels.contains_key(reference.name.as_str()) {
                problems.push(Problem::at(
                    format!("undefined label '{}'", reference.name),
                    reference.span,
                ));
            }
        }

        if !problems.is_empty() {
            return None;
        }
        Some(Program::new(
            statements.into_iter().enumerate().collect(),
            variables.into_iter().enumerate().collect(),
            labels,
            lines,
            source_hash,
            self.text_base,
            self.data_base,
        ))
    }
}

fn invert(labels: HashMap<Label, usize>) -> HashMap<usize, Vec<Label>> {
    let mut by_index: HashMap<usize, Vec<Label>> = HashMap::new();
    for (label, index) in labels {
        by_index.entry(index).or_default().push(label);
    }
    by_index
}
