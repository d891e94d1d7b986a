//! Lazily evaluated filter graphs.
//!
//! A [`Filter`] is a cheap handle to an immutable node describing one texture-producing step.
//! Building a graph does no GPU work; [`eval::evaluate`] pulls the root once per frame, computing
//! each node at most once and returning intermediate textures to the pool as soon as their last
//! consumer has read them.

use std::{fmt, rc::Rc};

use smallvec::SmallVec;

use crate::{
    foundation::{
        core::{TextureDescriptor, TextureFormat, TextureSize},
        error::ChainResult,
    },
    texture::SharedTexture,
};

pub mod composition;
pub mod eval;
pub mod resize;
pub mod shader_filter;
pub mod source;
pub mod text;
pub mod transformed;

use self::{
    composition::CompositionFilter,
    eval::RenderContext,
    resize::{ResizeFilter, ResizeOptions},
};

/// Up to four upstream filters, inline.
pub type FilterInputs = SmallVec<[Filter; 4]>;

/// One node of a filter graph.
///
/// Implementations are immutable once constructed (tag state aside) and may be shared by several
/// consumers.
pub trait FilterNode {
    /// Descriptor of the texture [`FilterNode::compute`] produces.
    fn output(&self) -> TextureDescriptor;

    /// Upstream filters, in the order their textures are passed to [`FilterNode::compute`].
    ///
    /// Must return the same handles on every call.
    fn inputs(&self) -> FilterInputs;

    /// Produce the output texture from the already evaluated inputs.
    fn compute(
        &self,
        ctx: &mut RenderContext<'_>,
        inputs: &[SharedTexture],
    ) -> ChainResult<SharedTexture>;

    /// Short description used in logs and graph dumps.
    fn describe(&self) -> String;

    /// Resize capability.
    fn as_resizeable(&self) -> Option<&dyn Resizeable> {
        None
    }

    /// Offset-correction capability.
    fn as_offset_correctable(&self) -> Option<&dyn OffsetCorrectable> {
        None
    }

    /// Tag capability.
    fn as_taggable(&self) -> Option<&dyn Taggable> {
        None
    }

    /// Downcast to a luma/chroma composition.
    fn as_composition(&self) -> Option<&CompositionFilter> {
        None
    }
}

/// A filter that can be marked as significant so it is never elided as a no-op.
pub trait Taggable {
    /// Mark the filter. Irreversible.
    fn enable_tag(&self);

    /// Whether the filter is marked.
    fn is_tagged(&self) -> bool;
}

/// A filter that can re-derive itself at a different output size.
pub trait Resizeable: Taggable {
    /// Equivalent filter producing `size`. May return the input when the result would be a no-op.
    fn set_size(&self, size: TextureSize) -> Filter;
}

/// A filter that can compensate a half-texel shift in its output.
pub trait OffsetCorrectable {
    /// Equivalent filter with offset correction enabled.
    fn force_offset_correction(&self) -> Filter;
}

/// Shared handle to a filter node. Identity is the node allocation.
#[derive(Clone)]
pub struct Filter(Rc<dyn FilterNode>);

/// Node identity used as memoization key during evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeKey(usize);

impl Filter {
    /// Wrap a node.
    pub fn new(node: impl FilterNode + 'static) -> Self {
        Self(Rc::new(node))
    }

    /// The node behind this handle.
    pub fn node(&self) -> &dyn FilterNode {
        &*self.0
    }

    pub(crate) fn key(&self) -> NodeKey {
        NodeKey(Rc::as_ptr(&self.0) as *const () as usize)
    }

    /// `true` when both handles point at the same node.
    pub fn same_node(&self, other: &Filter) -> bool {
        self.key() == other.key()
    }

    /// Output descriptor.
    pub fn output(&self) -> TextureDescriptor {
        self.0.output()
    }

    /// Output size.
    pub fn size(&self) -> TextureSize {
        self.output().size
    }

    /// Output format.
    pub fn format(&self) -> TextureFormat {
        self.output().format
    }

    /// Upstream filters.
    pub fn inputs(&self) -> FilterInputs {
        self.0.inputs()
    }

    /// Resize capability, if the node has one.
    pub fn as_resizeable(&self) -> Option<&dyn Resizeable> {
        self.0.as_resizeable()
    }

    /// Composition view, if the node is one.
    pub fn as_composition(&self) -> Option<&CompositionFilter> {
        self.0.as_composition()
    }

    /// Whether the node carries an enabled tag.
    pub fn is_tagged(&self) -> bool {
        self.0.as_taggable().is_some_and(Taggable::is_tagged)
    }

    /// Mark the node as significant when it supports tagging. Returns whether it does.
    pub fn enable_tag(&self) -> bool {
        match self.0.as_taggable() {
            Some(t) => {
                t.enable_tag();
                true
            }
            None => false,
        }
    }

    /// Filter producing `size`.
    ///
    /// - Same size: this handle.
    /// - Resizeable node: the node re-derives itself, after tagging it when `tagged`.
    /// - Otherwise a generic resample is inserted.
    pub fn set_size(&self, size: TextureSize, tagged: bool) -> Filter {
        if self.size() == size {
            return self.clone();
        }
        if let Some(resizeable) = self.as_resizeable() {
            if tagged {
                resizeable.enable_tag();
            }
            return resizeable.set_size(size);
        }
        let resize = ResizeFilter::new(self.clone(), size, ResizeOptions::default());
        if tagged {
            resize.enable_tag();
        }
        Filter::new(resize)
    }

    /// Explicit resample to `size` with `options`. Always inserts a node.
    pub fn resize(&self, size: TextureSize, options: ResizeOptions) -> Filter {
        Filter::new(ResizeFilter::new(self.clone(), size, options))
    }

    /// Ask the node to compensate a half-texel shift; unsupported nodes are returned unchanged.
    pub fn force_offset_correction(&self) -> Filter {
        match self.0.as_offset_correctable() {
            Some(c) => c.force_offset_correction(),
            None => self.clone(),
        }
    }

    /// Multi-line description of the graph rooted here, inputs indented below their consumer.
    pub fn describe_graph(&self) -> String {
        let mut out = String::new();
        self.write_graph(&mut out, 0);
        out
    }

    fn write_graph(&self, out: &mut String, depth: usize) {
        use std::fmt::Write as _;
        let _ = writeln!(
            out,
            "{:indent$}{} [{}]",
            "",
            self.0.describe(),
            self.output(),
            indent = depth * 2
        );
        for input in self.inputs() {
            input.write_graph(out, depth + 1);
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Filter({} [{}])", self.0.describe(), self.output())
    }
}

#[cfg(test)]
#[path = "../tests/unit/filter/graph.rs"]
mod tests;
