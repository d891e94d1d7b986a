//! Render chains: reusable graph rewrites applied to the frame's filter.

use crate::{
    chain::context::ChainContext,
    filter::Filter,
    foundation::error::ChainResult,
};

pub mod combinators;
pub mod config;
pub mod context;
pub mod nedi;
pub mod presets;
pub mod scale;
pub mod super_res;

/// A configured transformation of a filter graph.
pub trait RenderChain {
    /// Build the graph this chain produces from `input`.
    ///
    /// Only constructs filters; no texture is touched until the script evaluates the result.
    fn create_filter(&self, ctx: &mut ChainContext<'_>, input: Filter) -> ChainResult<Filter>;
}

impl<C: RenderChain + ?Sized> RenderChain for Box<C> {
    fn create_filter(&self, ctx: &mut ChainContext<'_>, input: Filter) -> ChainResult<Filter> {
        (**self).create_filter(ctx, input)
    }
}

impl<C: RenderChain + ?Sized> RenderChain for std::rc::Rc<C> {
    fn create_filter(&self, ctx: &mut ChainContext<'_>, input: Filter) -> ChainResult<Filter> {
        (**self).create_filter(ctx, input)
    }
}

/// Chain that returns its input.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl RenderChain for Identity {
    fn create_filter(&self, _ctx: &mut ChainContext<'_>, input: Filter) -> ChainResult<Filter> {
        Ok(input)
    }
}
