use numdom_utilities::TagIndex;

/// Tag for [`LabelId`]: indexes into the global, task-wide label alphabet.
pub struct LabelTag;

/// Tag for [`LabelGroupId`]: indexes into one transition system's label
/// groups. Not comparable across different transition systems.
pub struct LabelGroupTag;

/// A label index into the shared [`crate::Labels`] alphabet.
pub type LabelId = TagIndex<usize, LabelTag>;

/// A label-group index, local to a single [`crate::TransitionSystem`].
pub type LabelGroupId = TagIndex<usize, LabelGroupTag>;

/// A local state index within a single transition system. Kept as a plain
/// `usize` (not tagged) since states are also addressed through flat
/// `Vec<StateIndex>` world-state tuples shared across every transition
/// system, following the teacher's `mcrl2rust-lts` convention of a bare
/// `StateIndex` alias.
pub type StateIndex = usize;
