use tracing::info;

use crate::{
    chain::{RenderChain, config::ChainConfig, context::ChainContext},
    filter::Filter,
    foundation::error::ChainResult,
};

/// A list of options with one selected by index.
///
/// An index outside the list (including the default `-1`) selects nothing and the selector passes
/// its input through.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Selector<T> {
    /// Available options.
    pub options: Vec<T>,
    /// Index of the active option.
    pub selected_index: i32,
}

impl<T> Default for Selector<T> {
    fn default() -> Self {
        Self {
            options: Vec::new(),
            selected_index: -1,
        }
    }
}

impl<T> Selector<T> {
    /// Selector over `options` with `selected_index` active.
    pub fn new(options: Vec<T>, selected_index: i32) -> Self {
        Self {
            options,
            selected_index,
        }
    }

    /// The active option, if the index is in range.
    pub fn selected(&self) -> Option<&T> {
        usize::try_from(self.selected_index)
            .ok()
            .and_then(|i| self.options.get(i))
    }

    /// Select the next option, wrapping around. No-op on an empty list.
    ///
    /// The remainder keeps the sign of the index, so an index below `-1` stays unselected.
    pub fn advance(&mut self) -> Option<&T> {
        if let Ok(len) = i64::try_from(self.options.len())
            && len > 0
        {
            let next = (i64::from(self.selected_index) + 1) % len;
            // Only lists longer than i32::MAX produce an index that does not fit.
            self.selected_index = i32::try_from(next).unwrap_or(-1);
        }
        self.selected()
    }
}

impl<T: RenderChain> RenderChain for Selector<T> {
    fn create_filter(&self, ctx: &mut ChainContext<'_>, input: Filter) -> ChainResult<Filter> {
        match self.selected() {
            Some(option) => option.create_filter(ctx, input),
            None => Ok(input),
        }
    }
}

/// A named chain configuration. An empty preset passes its input through.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Preset {
    /// Display name.
    pub name: String,
    /// The chain, if any.
    pub chain: Option<Box<ChainConfig>>,
}

impl Preset {
    /// Preset named `name` running `chain`.
    pub fn new(name: impl Into<String>, chain: ChainConfig) -> Self {
        Self {
            name: name.into(),
            chain: Some(Box::new(chain)),
        }
    }
}

impl RenderChain for Preset {
    fn create_filter(&self, ctx: &mut ChainContext<'_>, input: Filter) -> ChainResult<Filter> {
        match &self.chain {
            Some(chain) => chain.create_filter(ctx, input),
            None => Ok(input),
        }
    }
}

/// A selector of presets with a display name and a hotkey that cycles through them.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PresetGroup {
    /// Display name.
    pub name: String,
    /// Hotkey bound to [`PresetGroup::advance`] by the host.
    pub hotkey: String,
    /// Presets and the active index.
    #[serde(flatten)]
    pub selector: Selector<Preset>,
}

impl Default for PresetGroup {
    fn default() -> Self {
        Self {
            name: "Preset Group".to_string(),
            hotkey: String::new(),
            selector: Selector::default(),
        }
    }
}

impl PresetGroup {
    /// Group named `name` over `presets`, first one selected.
    pub fn new(name: impl Into<String>, presets: Vec<Preset>) -> Self {
        Self {
            name: name.into(),
            hotkey: String::new(),
            selector: Selector::new(presets, 0),
        }
    }

    /// The active preset.
    pub fn selected(&self) -> Option<&Preset> {
        self.selector.selected()
    }

    /// Cycle to the next preset and report it.
    pub fn advance(&mut self) -> Option<&Preset> {
        let name = self.name.clone();
        let selected = self.selector.advance();
        if let Some(preset) = selected {
            info!(group = %name, preset = %preset.name, "selected preset");
        }
        selected
    }
}

impl RenderChain for PresetGroup {
    fn create_filter(&self, ctx: &mut ChainContext<'_>, input: Filter) -> ChainResult<Filter> {
        self.selector.create_filter(ctx, input)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chain/presets.rs"]
mod tests;
