//! Finalization pass shared by every directed stream.

use super::{InstrStream, LabelPolicy};
use crate::error::{GenError, GenResult};

/// Normalize labels, atomicity and comments of a populated stream in place.
///
/// - `has_label` is cleared on every instruction, or forced on under
///   [`LabelPolicy::Retain`]
/// - every instruction becomes `atomic`
/// - the first instruction is commented `Start <name>`, the last `End <name>`
/// - a non-empty stream label is stamped onto the first instruction
///
/// Reapplying the pass to an unmodified, finalized stream changes nothing.
pub fn finalize(stream: &mut InstrStream) -> GenResult<()> {
    if stream.instr_list.is_empty() {
        return Err(GenError::state(format!(
            "cannot finalize empty stream '{}'",
            stream.name
        )));
    }

    let keep_labels = stream.label_policy == LabelPolicy::Retain;
    for instr in &mut stream.instr_list {
        instr.has_label = keep_labels;
        instr.atomic = true;
    }

    let start = format!("Start {}", stream.name);
    let end = format!("End {}", stream.name);
    if let Some(first) = stream.instr_list.first_mut() {
        first.comment = start;
        if !stream.label.is_empty() {
            first.label = stream.label.clone();
            first.has_label = true;
        }
    }
    if let Some(last) = stream.instr_list.last_mut() {
        last.comment = end;
    }

    tracing::trace!(
        stream = %stream.name,
        instrs = stream.instr_list.len(),
        policy = ?stream.label_policy,
        "finalized stream"
    );
    Ok(())
}
