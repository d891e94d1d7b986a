use serde::{Serialize, de::DeserializeOwned};

use crate::{
    chain::{
        Identity, RenderChain, context::ChainContext, nedi::Nedi, presets::PresetGroup,
        scale::Scale, super_res::SuperRes,
    },
    filter::Filter,
    foundation::error::{ChainError, ChainResult},
};

/// Serializable settings of every built-in chain.
///
/// JSON form is internally tagged: `{"kind": "nedi", "centered": false}`.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainConfig {
    /// Pass-through.
    #[default]
    Identity,
    /// Edge-directed doubling.
    Nedi(Nedi),
    /// Back-projection super-resolution.
    SuperRes(SuperRes),
    /// Plain resample to the target.
    Scale(Scale),
    /// Selectable presets.
    Presets(PresetGroup),
    /// Chains applied in order.
    Sequence {
        /// The chains.
        chains: Vec<ChainConfig>,
    },
}

impl ChainConfig {
    /// Parse a single chain document.
    pub fn from_json_str(s: &str) -> ChainResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> ChainResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl RenderChain for ChainConfig {
    fn create_filter(&self, ctx: &mut ChainContext<'_>, input: Filter) -> ChainResult<Filter> {
        match self {
            Self::Identity => Identity.create_filter(ctx, input),
            Self::Nedi(c) => c.create_filter(ctx, input),
            Self::SuperRes(c) => c.create_filter(ctx, input),
            Self::Scale(c) => c.create_filter(ctx, input),
            Self::Presets(c) => c.create_filter(ctx, input),
            Self::Sequence { chains } => chains
                .iter()
                .try_fold(input, |f, chain| chain.create_filter(ctx, f)),
        }
    }
}

/// Flat JSON object of chain settings keyed by chain name.
///
/// Where the document lives is up to the host; this type only converts and tracks changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SettingsStore {
    entries: serde_json::Map<String, serde_json::Value>,
    revision: u64,
}

impl SettingsStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a settings document. The top level must be an object.
    pub fn from_json_str(s: &str) -> ChainResult<Self> {
        match serde_json::from_str(s)? {
            serde_json::Value::Object(entries) => Ok(Self {
                entries,
                revision: 0,
            }),
            other => Err(ChainError::serde(format!(
                "settings document must be a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Serialize the whole document.
    pub fn to_json_string(&self) -> ChainResult<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    /// Settings stored under `name`, or defaults when absent.
    pub fn load<T: DeserializeOwned + Default>(&self, name: &str) -> ChainResult<T> {
        match self.entries.get(name) {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| ChainError::serde(format!("settings '{name}': {e}"))),
            None => Ok(T::default()),
        }
    }

    /// Store `value` under `name`. The revision only moves when the stored value changes.
    pub fn save<T: Serialize>(&mut self, name: &str, value: &T) -> ChainResult<()> {
        let value = serde_json::to_value(value)?;
        if self.entries.get(name) != Some(&value) {
            self.entries.insert(name.to_string(), value);
            self.revision += 1;
        }
        Ok(())
    }

    /// Drop the settings under `name`. Returns whether they existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let removed = self.entries.remove(name).is_some();
        if removed {
            self.revision += 1;
        }
        removed
    }

    /// Names with stored settings.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Change counter, compared by hosts to detect edited settings.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chain/config.rs"]
mod tests;
