//! Provider registry: stored LLM provider and model configuration
//!
//! Administrative writes and selection reads share one lock, so the
//! "at most one default model per provider" invariant is never observable
//! as violated, even mid-update.

use crate::error::{CogniforgeError, Result};
use crate::types::{ModelRecord, ProviderKind, ProviderRecord};
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Input for registering a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProvider {
    pub name: String,
    pub kind: ProviderKind,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub priority: i32,
}

fn default_enabled() -> bool {
    true
}

/// Partial provider update; unset fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderUpdate {
    pub name: Option<String>,
    pub kind: Option<ProviderKind>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub enabled: Option<bool>,
    pub priority: Option<i32>,
}

/// Input for registering a model under a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewModel {
    pub provider_id: u64,
    pub model_id: String,
    pub display_name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub is_default: bool,
}

/// Partial model update; unset fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelUpdate {
    pub model_id: Option<String>,
    pub display_name: Option<String>,
    pub enabled: Option<bool>,
    pub is_default: Option<bool>,
}

struct RegistryState {
    providers: BTreeMap<u64, ProviderRecord>,
    models: BTreeMap<u64, ModelRecord>,
    next_provider_id: u64,
    next_model_id: u64,
}

/// Thread-safe in-memory provider registry (cheap to clone)
#[derive(Clone)]
pub struct ProviderRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(RegistryState {
                providers: BTreeMap::new(),
                models: BTreeMap::new(),
                next_provider_id: 1,
                next_model_id: 1,
            })),
        }
    }

    /// Register a provider
    pub fn add_provider(&self, input: NewProvider) -> ProviderRecord {
        let now = Utc::now();
        let mut state = self.state.write();
        let id = state.next_provider_id;
        state.next_provider_id += 1;

        let record = ProviderRecord {
            id,
            name: input.name,
            kind: input.kind,
            api_key: input.api_key,
            base_url: input.base_url,
            enabled: input.enabled,
            priority: input.priority,
            created_at: now,
            updated_at: now,
        };
        state.providers.insert(id, record.clone());
        record
    }

    /// Apply a partial update to a provider
    pub fn update_provider(&self, id: u64, update: ProviderUpdate) -> Result<ProviderRecord> {
        let mut state = self.state.write();
        let record = state
            .providers
            .get_mut(&id)
            .ok_or_else(|| CogniforgeError::not_found("provider", id))?;

        if let Some(name) = update.name {
            record.name = name;
        }
        if let Some(kind) = update.kind {
            record.kind = kind;
        }
        if let Some(api_key) = update.api_key {
            record.api_key = Some(api_key);
        }
        if let Some(base_url) = update.base_url {
            record.base_url = Some(base_url);
        }
        if let Some(enabled) = update.enabled {
            record.enabled = enabled;
        }
        if let Some(priority) = update.priority {
            record.priority = priority;
        }
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    /// Remove a provider and all of its models
    pub fn remove_provider(&self, id: u64) -> Result<()> {
        let mut state = self.state.write();
        if state.providers.remove(&id).is_none() {
            return Err(CogniforgeError::not_found("provider", id));
        }
        state.models.retain(|_, m| m.provider_id != id);
        Ok(())
    }

    /// All providers with their models, in stable id order
    pub fn list_providers(&self) -> Vec<(ProviderRecord, Vec<ModelRecord>)> {
        let state = self.state.read();
        state
            .providers
            .values()
            .map(|p| {
                let models = state
                    .models
                    .values()
                    .filter(|m| m.provider_id == p.id)
                    .cloned()
                    .collect();
                (p.clone(), models)
            })
            .collect()
    }

    pub fn get_provider(&self, id: u64) -> Option<ProviderRecord> {
        self.state.read().providers.get(&id).cloned()
    }

    /// Register a model under a provider
    ///
    /// When `is_default` is set, any previous default of the same provider
    /// is cleared in the same write-lock scope.
    pub fn add_model(&self, input: NewModel) -> Result<ModelRecord> {
        let mut state = self.state.write();
        if !state.providers.contains_key(&input.provider_id) {
            return Err(CogniforgeError::not_found("provider", input.provider_id));
        }

        if input.is_default {
            clear_default(&mut state.models, input.provider_id, None);
        }

        let id = state.next_model_id;
        state.next_model_id += 1;
        let record = ModelRecord {
            id,
            provider_id: input.provider_id,
            model_id: input.model_id,
            display_name: input.display_name,
            enabled: input.enabled,
            is_default: input.is_default,
            created_at: Utc::now(),
        };
        state.models.insert(id, record.clone());
        Ok(record)
    }

    /// Apply a partial update to a model
    pub fn update_model(&self, id: u64, update: ModelUpdate) -> Result<ModelRecord> {
        let mut state = self.state.write();
        let provider_id = state
            .models
            .get(&id)
            .map(|m| m.provider_id)
            .ok_or_else(|| CogniforgeError::not_found("model", id))?;

        if update.is_default == Some(true) {
            clear_default(&mut state.models, provider_id, Some(id));
        }

        let record = state
            .models
            .get_mut(&id)
            .ok_or_else(|| CogniforgeError::not_found("model", id))?;
        if let Some(model_id) = update.model_id {
            record.model_id = model_id;
        }
        if let Some(display_name) = update.display_name {
            record.display_name = display_name;
        }
        if let Some(enabled) = update.enabled {
            record.enabled = enabled;
        }
        if let Some(is_default) = update.is_default {
            record.is_default = is_default;
        }
        Ok(record.clone())
    }

    /// Remove a model
    pub fn remove_model(&self, id: u64) -> Result<()> {
        let mut state = self.state.write();
        state
            .models
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CogniforgeError::not_found("model", id))
    }

    /// Make one model the default for its provider, clearing any previous
    /// default in the same atomic write.
    pub fn set_default_model(&self, model_id: u64) -> Result<()> {
        let mut state = self.state.write();
        let provider_id = state
            .models
            .get(&model_id)
            .map(|m| m.provider_id)
            .ok_or_else(|| CogniforgeError::not_found("model", model_id))?;

        clear_default(&mut state.models, provider_id, Some(model_id));
        state
            .models
            .get_mut(&model_id)
            .ok_or_else(|| CogniforgeError::not_found("model", model_id))?
            .is_default = true;
        Ok(())
    }

    /// Highest-priority enabled provider, optionally restricted to a kind
    ///
    /// Priority ties break toward the lowest id, so repeated calls are
    /// deterministic. `None` means the filtered set is empty; that is a
    /// valid result, not an error.
    pub fn select_provider(&self, kind: Option<&ProviderKind>) -> Option<ProviderRecord> {
        let state = self.state.read();
        state
            .providers
            .values()
            .filter(|p| p.enabled)
            .filter(|p| kind.map_or(true, |k| &p.kind == k))
            .max_by_key(|p| (p.priority, std::cmp::Reverse(p.id)))
            .cloned()
    }

    /// The enabled model flagged default for a provider, if any
    pub fn select_default_model(&self, provider_id: u64) -> Option<ModelRecord> {
        let state = self.state.read();
        state
            .models
            .values()
            .find(|m| m.provider_id == provider_id && m.enabled && m.is_default)
            .cloned()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn clear_default(models: &mut BTreeMap<u64, ModelRecord>, provider_id: u64, keep: Option<u64>) {
    for model in models.values_mut() {
        if model.provider_id == provider_id && Some(model.id) != keep {
            model.is_default = false;
        }
    }
}
