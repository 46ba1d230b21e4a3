//! Resolved view of a jump-chain block
//!
//! Jump targets are numeric local labels: `3f` names the next label `3`
//! after the referencing instruction, `3b` the closest one before it. This
//! module resolves those references against program order and checks that
//! the block forms one path through every node, ending at the sentinel.

use super::InstrStream;
use crate::error::{GenError, GenResult};
use crate::ir::Instr;
use std::fmt;

/// Search direction of a numeric label reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// A numeric local label reference such as `3f` or `0b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelRef {
    pub index: usize,
    pub direction: Direction,
}

impl LabelRef {
    pub fn forward(index: usize) -> Self {
        Self {
            index,
            direction: Direction::Forward,
        }
    }

    pub fn backward(index: usize) -> Self {
        Self {
            index,
            direction: Direction::Backward,
        }
    }

    /// Reference from a node at `source` to the node at `target`, where both
    /// indices are also their program-order ranks.
    pub fn between(source: usize, target: usize) -> Self {
        if target > source {
            Self::forward(target)
        } else {
            Self::backward(target)
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (digits, direction) = if let Some(d) = s.strip_suffix('f') {
            (d, Direction::Forward)
        } else if let Some(d) = s.strip_suffix('b') {
            (d, Direction::Backward)
        } else {
            return None;
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(|index| Self { index, direction })
    }
}

impl fmt::Display for LabelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.direction {
            Direction::Forward => 'f',
            Direction::Backward => 'b',
        };
        write!(f, "{}{}", self.index, suffix)
    }
}

/// One resolved jump: the instruction at program position `source` lands
/// on node `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpEdge {
    pub source: usize,
    pub target: usize,
}

/// Resolved edges of a jump-chain block of `K` nodes plus start and sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpChain {
    num_nodes: usize,
    entry: usize,
    /// `edges[i]` leaves body node `i`
    edges: Vec<JumpEdge>,
}

impl JumpChain {
    pub fn from_stream(stream: &InstrStream) -> GenResult<Self> {
        Self::from_instrs(&stream.instr_list)
    }

    /// Resolve a block laid out as start, `K` bodies labeled `0..K`, then a
    /// sentinel labeled `K`.
    pub fn from_instrs(instrs: &[Instr]) -> GenResult<Self> {
        if instrs.len() < 3 {
            return Err(GenError::state(format!(
                "jump chain needs at least 3 instructions, got {}",
                instrs.len()
            )));
        }
        let num_nodes = instrs.len() - 2;

        // The start instruction may carry an arbitrary external label.
        let labels: Vec<Option<usize>> = instrs
            .iter()
            .enumerate()
            .map(|(pos, i)| {
                if pos == 0 {
                    None
                } else {
                    i.label.parse().ok()
                }
            })
            .collect();
        for (pos, label) in labels.iter().enumerate().skip(1) {
            if *label != Some(pos - 1) {
                return Err(GenError::state(format!(
                    "instruction {} is labeled {:?}, expected {}",
                    pos,
                    instrs[pos].label,
                    pos - 1
                )));
            }
        }

        let resolve = |pos: usize| -> GenResult<usize> {
            let text = instrs[pos].imm_str.as_deref().unwrap_or_default();
            let label_ref = LabelRef::parse(text).ok_or_else(|| {
                GenError::state(format!(
                    "instruction {} has no label reference (imm {:?})",
                    pos, text
                ))
            })?;
            let hit = match label_ref.direction {
                Direction::Forward => {
                    (pos + 1..instrs.len()).find(|p| labels[*p] == Some(label_ref.index))
                }
                Direction::Backward => (0..pos).rev().find(|p| labels[*p] == Some(label_ref.index)),
            };
            hit.and_then(|p| labels[p]).ok_or_else(|| {
                GenError::state(format!(
                    "reference {} at instruction {} does not resolve",
                    label_ref, pos
                ))
            })
        };

        let entry = resolve(0)?;
        let edges = (1..=num_nodes)
            .map(|pos| {
                resolve(pos).map(|target| JumpEdge {
                    source: pos,
                    target,
                })
            })
            .collect::<GenResult<Vec<_>>>()?;

        Ok(Self {
            num_nodes,
            entry,
            edges,
        })
    }

    /// Number of body nodes `K`.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Node index of the sentinel (`K`).
    pub fn sentinel(&self) -> usize {
        self.num_nodes
    }

    /// Node the start instruction jumps to.
    pub fn entry(&self) -> usize {
        self.entry
    }

    pub fn edges(&self) -> &[JumpEdge] {
        &self.edges
    }

    /// Nodes visited from the entry, ending with the sentinel or the first
    /// repeated node.
    pub fn path(&self) -> Vec<usize> {
        let mut seen = vec![false; self.num_nodes + 1];
        let mut path = Vec::with_capacity(self.num_nodes + 1);
        let mut node = self.entry;
        loop {
            path.push(node);
            if node >= self.num_nodes || seen[node] {
                break;
            }
            seen[node] = true;
            node = self.edges[node].target;
        }
        path
    }

    /// Check that every node is targeted exactly once and the walk from the
    /// entry covers all `K` nodes before reaching the sentinel.
    pub fn validate(&self) -> GenResult<()> {
        let mut in_degree = vec![0usize; self.num_nodes + 1];
        for target in std::iter::once(self.entry).chain(self.edges.iter().map(|e| e.target)) {
            if target > self.num_nodes {
                return Err(GenError::state(format!("target {} out of range", target)));
            }
            in_degree[target] += 1;
        }
        if let Some(node) = in_degree.iter().position(|&d| d != 1) {
            return Err(GenError::state(format!(
                "node {} is targeted {} times",
                node, in_degree[node]
            )));
        }

        let path = self.path();
        if path.len() != self.num_nodes + 1 || path.last() != Some(&self.sentinel()) {
            return Err(GenError::state(format!(
                "walk {:?} does not cover {} nodes before the sentinel",
                path, self.num_nodes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenConfig;
    use crate::ir::{InstrName, InstrSet};

    fn block(targets: &[&str]) -> Vec<Instr> {
        let set = InstrSet::new(&GenConfig::default());
        let k = targets.len() - 1;
        let mut instrs = Vec::new();
        for (pos, target) in targets.iter().enumerate() {
            let mut jal = set.get_instr(InstrName::Jal).unwrap();
            jal.imm_str = Some(target.to_string());
            if pos > 0 {
                jal.label = (pos - 1).to_string();
            }
            instrs.push(jal);
        }
        let mut sentinel = set.get_instr(InstrName::Add).unwrap();
        sentinel.label = k.to_string();
        instrs.push(sentinel);
        instrs
    }

    #[test]
    fn test_parse_label_ref() {
        assert_eq!(LabelRef::parse("3f"), Some(LabelRef::forward(3)));
        assert_eq!(LabelRef::parse("12b"), Some(LabelRef::backward(12)));
        assert_eq!(LabelRef::parse("f"), None);
        assert_eq!(LabelRef::parse("3"), None);
        assert_eq!(LabelRef::parse("-1f"), None);
        assert_eq!(LabelRef::parse("0x10"), None);
        assert_eq!(LabelRef::forward(7).to_string(), "7f");
    }

    #[test]
    fn test_between() {
        assert_eq!(LabelRef::between(0, 1), LabelRef::forward(1));
        assert_eq!(LabelRef::between(2, 0), LabelRef::backward(0));
    }

    #[test]
    fn test_valid_chain() {
        // start -> 2 -> 0 -> 1 -> sentinel 3
        let chain = JumpChain::from_instrs(&block(&["2f", "1f", "3f", "0b"])).unwrap();
        assert_eq!(chain.entry(), 2);
        assert_eq!(chain.path(), vec![2, 0, 1, 3]);
        assert!(chain.validate().is_ok());
        assert_eq!(chain.edges()[2], JumpEdge { source: 3, target: 0 });
    }

    #[test]
    fn test_cycle_is_rejected() {
        // 0 -> 1 -> 0, node 2 orphaned
        let chain = JumpChain::from_instrs(&block(&["0f", "1f", "0b", "3f"])).unwrap();
        assert!(chain.validate().is_err());
    }

    #[test]
    fn test_detached_cycle_is_rejected() {
        // every node targeted once, but 1 <-> 2 never joins the path
        let chain = JumpChain::from_instrs(&block(&["0f", "3f", "2f", "1b"])).unwrap();
        assert_eq!(chain.path(), vec![0, 3]);
        let err = chain.validate().unwrap_err();
        assert!(matches!(err, GenError::InvalidState(_)));
    }

    #[test]
    fn test_unresolved_reference() {
        // a forward reference to a label that only exists earlier
        assert!(JumpChain::from_instrs(&block(&["1f", "0f", "3f", "2f"])).is_err());
        assert!(JumpChain::from_instrs(&block(&["1f", "2f", "3f", "zz"])).is_err());
    }

    #[test]
    fn test_too_short() {
        let instrs = block(&["0f"]);
        assert!(JumpChain::from_instrs(&instrs[..1]).is_err());
    }
}
