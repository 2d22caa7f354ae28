//! # Composite Resolver
//!
//! Decides which remote layers to load and in what precedence order.
//!
//! Layers are inserted at the front of the composite view as they load, so
//! the final order is: profile specific, application name with extension,
//! bare application name, extension configs, shared configs.

use std::sync::Arc;

use config::{ConfigEntry, RemoteConfigSettings};
use errors::ResolveError;
use rc_core::{CompositeView, HostEnvironment, LayerKey};
use utils::{file_extension_of, is_blank};

use crate::builder::LayerBuilder;
use crate::context::ResolutionContext;

/// Name of the composite view handed to the host.
pub const COMPOSITE_NAME: &str = "REMOTE";

pub const SHARED_CONFIGS: &str = "shared-configs";
pub const EXTENSION_CONFIGS: &str = "extension-configs";

/// Inputs of one resolution pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveRequest {
    pub app_identifier: String,
    pub active_profiles: Vec<String>,
    pub shared_configs: Vec<ConfigEntry>,
    pub extension_configs: Vec<ConfigEntry>,
    pub default_group: String,
    pub default_format: String,
    pub ignore_empty: bool,
}

impl ResolveRequest {
    /// Derives a request from bootstrap settings and the host environment.
    ///
    /// The application identifier is the first non-blank of `prefix`,
    /// `name` and the host's application name.
    pub fn from_settings(
        settings: &RemoteConfigSettings,
        env: &HostEnvironment,
    ) -> Result<Self, ResolveError> {
        let app_identifier = [
            settings.prefix.as_deref(),
            settings.name.as_deref(),
            env.application_name.as_deref(),
        ]
        .into_iter()
        .find(|candidate| !is_blank(*candidate))
        .flatten()
        .ok_or_else(|| ResolveError::InvalidSetting {
            key: "prefix".to_string(),
            reason: "no prefix, name or application name is set".to_string(),
        })?;

        Ok(Self {
            app_identifier: app_identifier.trim().to_string(),
            active_profiles: env.active_profiles.clone(),
            shared_configs: settings.shared_configs.clone(),
            extension_configs: settings.extension_configs.clone(),
            default_group: settings.group.clone(),
            default_format: settings.file_extension.clone(),
            ignore_empty: settings.ignore_empty_layers,
        })
    }

    /// Checks every entry and setting before anything is fetched.
    pub fn validate(&self) -> Result<(), ResolveError> {
        check_entries(&self.shared_configs, SHARED_CONFIGS)?;
        check_entries(&self.extension_configs, EXTENSION_CONFIGS)?;

        if self.app_identifier.trim().is_empty() {
            return Err(ResolveError::InvalidSetting {
                key: "prefix".to_string(),
                reason: "application identifier is blank".to_string(),
            });
        }
        if self.default_group.trim().is_empty() {
            return Err(ResolveError::InvalidSetting {
                key: "group".to_string(),
                reason: "group is blank".to_string(),
            });
        }
        Ok(())
    }
}

fn check_entries(entries: &[ConfigEntry], list: &str) -> Result<(), ResolveError> {
    for (index, entry) in entries.iter().enumerate() {
        if entry.identifier.trim().is_empty() {
            return Err(ResolveError::MissingIdentifier {
                list: list.to_string(),
                index,
            });
        }
        if entry.group.trim().is_empty() {
            return Err(ResolveError::MissingGroup {
                list: list.to_string(),
                index,
            });
        }
    }
    Ok(())
}

/// Assembles the layered composite view for one resolution pass.
pub struct CompositeResolver {
    builder: LayerBuilder,
}

impl CompositeResolver {
    pub fn new(builder: LayerBuilder) -> Self {
        Self { builder }
    }

    pub fn context(&self) -> &Arc<ResolutionContext> {
        self.builder.context()
    }

    /// Resolves the composite view described by bootstrap settings.
    pub async fn locate(
        &self,
        settings: &RemoteConfigSettings,
        env: &HostEnvironment,
    ) -> Result<CompositeView, ResolveError> {
        let request = ResolveRequest::from_settings(settings, env)?;
        self.resolve(&request).await
    }

    /// Resolves the composite view for `request`.
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Purpose
    /// Loads shared, extension and application layers in ascending
    /// precedence. Each loaded layer goes to the front of the view.
    ///
    /// ## Errors
    /// Only configuration errors are returned, and they are detected before
    /// any fetch. Fetch and parse failures degrade the affected layer to
    /// empty.
    ///
    /// ## Refresh
    /// Once a change notification has been processed, non-refreshable layers
    /// come from the cache without fetching (and are skipped if never
    /// cached), while refreshable layers are fetched again.
    pub async fn resolve(&self, request: &ResolveRequest) -> Result<CompositeView, ResolveError> {
        request.validate()?;

        let mut view = CompositeView::new(COMPOSITE_NAME);

        for entry in request.shared_configs.iter().chain(&request.extension_configs) {
            let format =
                file_extension_of(&entry.identifier).unwrap_or(request.default_format.as_str());
            if !self.builder.supports_format(format) {
                tracing::warn!(
                    source_id = %entry.identifier,
                    format,
                    "unsupported file extension, layer will be empty"
                );
            }
            self.load_if_present(
                &mut view,
                &entry.identifier,
                &entry.group,
                format,
                entry.refresh,
                request.ignore_empty,
            )
            .await;
        }

        self.load_application(&mut view, request).await;

        let keys: Vec<String> = view.layer_keys().iter().map(|key| key.to_string()).collect();
        tracing::info!(
            app = %request.app_identifier,
            layers = view.len(),
            keys = ?keys,
            "resolved remote configuration layers"
        );

        Ok(view)
    }

    async fn load_application(&self, view: &mut CompositeView, request: &ResolveRequest) {
        let prefix = request.app_identifier.as_str();
        let group = request.default_group.as_str();
        let format = request.default_format.as_str();

        self.load_if_present(view, prefix, group, format, true, request.ignore_empty)
            .await;
        self.load_if_present(
            view,
            &format!("{prefix}.{format}"),
            group,
            format,
            true,
            request.ignore_empty,
        )
        .await;
        for profile in &request.active_profiles {
            self.load_if_present(
                view,
                &format!("{prefix}-{profile}.{format}"),
                group,
                format,
                true,
                request.ignore_empty,
            )
            .await;
        }
    }

    async fn load_if_present(
        &self,
        view: &mut CompositeView,
        source_id: &str,
        group: &str,
        format: &str,
        refreshable: bool,
        ignore_empty: bool,
    ) {
        let context = self.builder.context();

        let layer = if context.refresh_count().has_refreshed() {
            if refreshable {
                self.builder.reload(source_id, group, format, true).await
            } else {
                match context.cache().get(&LayerKey::new(source_id, group)) {
                    Some(layer) => layer,
                    None => {
                        tracing::debug!(source_id, group, "no cached layer to reuse, skipping");
                        return;
                    }
                }
            }
        } else {
            self.builder
                .build(source_id, group, format, refreshable)
                .await
        };

        if ignore_empty && layer.is_empty() {
            tracing::debug!(source_id, group, "skipping empty layer");
            return;
        }
        view.add_first(layer);
    }
}
