use crate::{
    chain::{RenderChain, context::ChainContext},
    filter::{
        Filter,
        composition::{ChromaScaler, CompositionFilter},
    },
    foundation::{core::TextureSize, error::ChainResult},
};

/// Chain defined by a closure.
pub struct StaticChain<F> {
    f: F,
}

impl<F> StaticChain<F>
where
    F: Fn(&mut ChainContext<'_>, Filter) -> ChainResult<Filter>,
{
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> RenderChain for StaticChain<F>
where
    F: Fn(&mut ChainContext<'_>, Filter) -> ChainResult<Filter>,
{
    fn create_filter(&self, ctx: &mut ChainContext<'_>, input: Filter) -> ChainResult<Filter> {
        (self.f)(ctx, input)
    }
}

/// Applies chains in order.
#[derive(Default)]
pub struct ChainSequence {
    chains: Vec<Box<dyn RenderChain>>,
}

impl ChainSequence {
    /// Empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chain.
    pub fn then(mut self, chain: impl RenderChain + 'static) -> Self {
        self.chains.push(Box::new(chain));
        self
    }

    /// Number of chains.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// `true` when no chain was added.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

impl RenderChain for ChainSequence {
    fn create_filter(&self, ctx: &mut ChainContext<'_>, input: Filter) -> ChainResult<Filter> {
        let mut builder = ChainBuilder::new(input);
        for chain in &self.chains {
            builder.add(ctx, chain.as_ref())?;
        }
        Ok(builder.into_filter())
    }
}

/// Incrementally applies chains to a filter, for chains that branch on intermediate sizes.
pub struct ChainBuilder {
    filter: Filter,
}

impl ChainBuilder {
    /// Start from `input`.
    pub fn new(input: Filter) -> Self {
        Self { filter: input }
    }

    /// Apply `chain` to the current filter.
    pub fn add(
        &mut self,
        ctx: &mut ChainContext<'_>,
        chain: &dyn RenderChain,
    ) -> ChainResult<&mut Self> {
        self.filter = chain.create_filter(ctx, self.filter.clone())?;
        Ok(self)
    }

    /// Size of the current filter.
    pub fn output_size(&self) -> TextureSize {
        self.filter.size()
    }

    /// The current filter.
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Finish.
    pub fn into_filter(self) -> Filter {
        self.filter
    }
}

/// Applies a [`ChromaScaler`] to composition inputs and passes everything else through.
pub struct ChromaChain<S> {
    scaler: S,
}

impl<S: ChromaScaler> ChromaChain<S> {
    /// Use `scaler` for compositions.
    pub fn new(scaler: S) -> Self {
        Self { scaler }
    }
}

impl<S: ChromaScaler> RenderChain for ChromaChain<S> {
    fn create_filter(&self, ctx: &mut ChainContext<'_>, input: Filter) -> ChainResult<Filter> {
        match input.as_composition() {
            Some(composition) => self.scaler.scale_chroma(ctx, composition),
            None => Ok(input),
        }
    }
}

/// Scales a composition's luma plane with another chain before merging.
pub struct LumaChain<C> {
    chain: C,
}

impl<C: RenderChain> LumaChain<C> {
    /// Apply `chain` to luma only.
    pub fn new(chain: C) -> Self {
        Self { chain }
    }
}

impl<C: RenderChain> RenderChain for LumaChain<C> {
    fn create_filter(&self, ctx: &mut ChainContext<'_>, input: Filter) -> ChainResult<Filter> {
        match input.as_composition() {
            Some(composition) => {
                let mapped: CompositionFilter =
                    composition.map_luma(|luma| self.chain.create_filter(ctx, luma.clone()))?;
                Ok(mapped.into_filter())
            }
            None => self.chain.create_filter(ctx, input),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chain/combinators.rs"]
mod tests;
