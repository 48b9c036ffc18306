//! Point-in-time copy of the chain for debugging
//!
//! The `Display` rendering draws one box per node, head first, with the
//! record fields and the per-role read flags.

use crate::queue::record::Record;
use std::fmt;

/// Copy of one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSnapshot {
    pub record: Record,
    /// Read flag per role, indexed by role
    pub reads: Vec<bool>,
}

impl NodeSnapshot {
    pub fn is_fully_read(&self) -> bool {
        self.reads.iter().all(|read| *read)
    }
}

/// Copy of every node in a queue, head first
#[derive(Debug, Clone, PartialEq)]
pub struct QueueSnapshot {
    pub name: String,
    pub nodes: Vec<NodeSnapshot>,
}

impl QueueSnapshot {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Source ids in chain order
    pub fn source_ids(&self) -> Vec<u16> {
        self.nodes.iter().map(|n| n.record.source_id).collect()
    }
}

const BORDER: &str = "+---------------------------+";
const INNER: &str = "|+-------------------------+|";

impl fmt::Display for QueueSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nodes.is_empty() {
            return writeln!(f, "queue '{}' is empty", self.name);
        }

        writeln!(f, "queue '{}' ({} nodes)", self.name, self.nodes.len())?;
        for (index, node) in self.nodes.iter().enumerate() {
            let flags: Vec<&str> = node
                .reads
                .iter()
                .map(|read| if *read { "1" } else { "0" })
                .collect();

            writeln!(f, "{}", BORDER)?;
            writeln!(f, "    node #{}", index)?;
            writeln!(f, "{}", INNER)?;
            writeln!(f, "||  id:        {:<12}||", node.record.source_id)?;
            writeln!(f, "||  value:     {:<12.2}||", node.record.value)?;
            writeln!(f, "||  time:      {:<12}||", node.record.local_time())?;
            writeln!(f, "||  reads:     {:<12}||", flags.join(" "))?;
            writeln!(f, "{}", INNER)?;
            writeln!(f, "{}", BORDER)?;
            if index + 1 < self.nodes.len() {
                writeln!(f, "|                           |")?;
                writeln!(f, "v                           v")?;
            }
        }
        Ok(())
    }
}
