//! Table controller: creates and coordinates table sessions.

use std::sync::Arc;

use serde_json::Map;
use serde_json::Value;
use tokio::runtime::Handle;
use url::Url;

use crate::config::TableConfig;
use crate::csrf::CsrfTokenSource;
use crate::error::Error;
use crate::error::SessionError;
use crate::error::TransportError;
use crate::filters;
use crate::grid::ElementRef;
use crate::grid::GridFactory;
use crate::grid::GridOptions;
use crate::grid::MountPoint;
use crate::protocol::ACTION_INITIALIZE;
use crate::protocol::InitPayload;
use crate::registry::TableRegistry;
use crate::session::SessionCallbacks;
use crate::session::SessionParts;
use crate::session::TableSession;
use crate::transport::HttpTransport;
use crate::transport::Transport;
use crate::transport::with_query;

/// Creates table sessions and coordinates the live ones.
///
/// Cheap to clone (uses `Arc` internally). Every session created by a
/// controller shares its configuration, transport and token source.
///
/// # Example
///
/// ```ignore
/// use gridsync_lib::{TableController, TableConfig};
/// use gridsync_lib::csrf::CookieJarToken;
/// use gridsync_lib::grid::{HeadlessGridFactory, MountPoint};
///
/// let controller = TableController::builder()
///     .grid_factory(HeadlessGridFactory::new().auto_draw(true))
///     .csrf(CookieJarToken::new("csrftoken=abc"))
///     .config(TableConfig::default())
///     .build();
///
/// let session = controller
///     .initialize_table(MountPoint::new("orders"), "https://example.com/orders/table/", None, None)
///     .await?;
/// ```
#[derive(Clone)]
pub struct TableController {
    inner: Arc<TableControllerInner>,
}

struct TableControllerInner {
    config: Arc<TableConfig>,
    transport: Arc<dyn Transport>,
    csrf: Arc<dyn CsrfTokenSource>,
    grid_factory: Arc<dyn GridFactory>,
    registry: TableRegistry,
}

impl TableController {
    /// Creates a new builder for constructing a controller.
    pub fn builder() -> TableControllerBuilder<Missing, Missing> {
        TableControllerBuilder::new()
    }

    /// Configuration shared by the controller's sessions.
    pub fn config(&self) -> &TableConfig {
        &self.inner.config
    }

    /// Registry of the controller's live sessions.
    pub fn registry(&self) -> &TableRegistry {
        &self.inner.registry
    }

    /// Fetches the grid configuration from `url` and mounts a grid on `mount`.
    ///
    /// `extra_options` is shallow-merged over the default grid options;
    /// `extra_data` is merged into every page request. Installs the date-range
    /// widget right away; row tools and column filters follow once the grid
    /// reports its first render. A failed fetch leaves the mount point
    /// untouched and is returned to the caller.
    pub async fn initialize_table(
        &self,
        mount: MountPoint,
        url: &str,
        extra_options: Option<Map<String, Value>>,
        extra_data: Option<Map<String, Value>>,
    ) -> Result<TableSession, Error> {
        let endpoint = Url::parse(url).map_err(TransportError::from)?;
        if endpoint.cannot_be_a_base() {
            return Err(SessionError::InvalidEndpoint(url.to_string()).into());
        }

        let init_url = with_query(&endpoint, &[("action", ACTION_INITIALIZE)]);
        let value = self.inner.transport.get_json(&init_url).await?;
        let payload: InitPayload = serde_json::from_value(value)?;
        log::debug!(
            "{}: initialize -> {} columns, column filters {}, date filters {}",
            mount,
            payload.columns.len(),
            payload.show_column_filters,
            payload.show_date_filters
        );

        let options = GridOptions::defaults(&self.inner.config, &payload)
            .merge(extra_options.unwrap_or_default());

        let session = TableSession::new(SessionParts {
            mount: mount.clone(),
            endpoint,
            payload,
            config: self.inner.config.clone(),
            transport: self.inner.transport.clone(),
            csrf: self.inner.csrf.clone(),
            registry: self.inner.registry.clone(),
            runtime: Handle::current(),
            extra_data: extra_data.unwrap_or_default(),
        });

        let grid = self
            .inner
            .grid_factory
            .create(&mount, options, SessionCallbacks::new(&session))?;
        session.attach_grid(grid);

        filters::install_date_range(&session, session.payload());
        self.inner.registry.register(&session);
        Ok(session)
    }

    /// Binds row tools to `url`'s details action and installs column filters.
    ///
    /// Runs automatically after the first render; calling it again on the
    /// same session fails with [`SessionError::AlreadyComposed`].
    pub fn after_table_initialization(
        &self,
        session: &TableSession,
        payload: &InitPayload,
        url: &str,
    ) -> Result<(), Error> {
        let endpoint = Url::parse(url).map_err(TransportError::from)?;
        session.compose(payload, &endpoint)?;
        Ok(())
    }

    /// The table mounted on `mount`.
    pub fn table(&self, mount: &MountPoint) -> Option<TableSession> {
        self.inner.registry.get(mount)
    }

    /// Removes the table mounted on `mount` from the controller.
    ///
    /// Unbinds the table's UI handlers. Outstanding handles stay valid, but
    /// the table no longer takes part in coordinated redraws. Returns `false` if no table is mounted there.
    pub fn destroy_table(&self, mount: &MountPoint) -> bool {
        let Some(session) = self.inner.registry.unregister(mount) else {
            log::warn!("{}: no table to destroy", mount);
            return false;
        };
        session.teardown();
        log::debug!("{}: table {} destroyed", mount, session.id());
        true
    }

    /// Recalculates column widths of every visible table.
    pub fn adjust_table_columns(&self) -> usize {
        self.inner.registry.adjust_columns()
    }

    /// Redraws every live table.
    pub fn redraw_all_tables(&self) -> usize {
        self.inner.registry.redraw_all()
    }

    /// Reloads the table enclosing `element` without changing its page.
    pub fn redraw_table(&self, element: &ElementRef) -> bool {
        self.inner.registry.redraw_in_place(element)
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`TableController`].
///
/// # Required Fields
///
/// - `grid_factory` - A [`GridFactory`] implementation
/// - `csrf` - A [`CsrfTokenSource`] implementation
///
/// The transport defaults to [`HttpTransport::new`] and the configuration to
/// [`TableConfig::default`].
pub struct TableControllerBuilder<Factory, Csrf> {
    grid_factory: Factory,
    csrf: Csrf,
    config: TableConfig,
    transport: Option<Arc<dyn Transport>>,
    registry: Option<TableRegistry>,
}

impl TableControllerBuilder<Missing, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            grid_factory: Missing,
            csrf: Missing,
            config: TableConfig::default(),
            transport: None,
            registry: None,
        }
    }
}

impl Default for TableControllerBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TableControllerBuilder<Missing, C> {
    /// Sets the grid factory.
    pub fn grid_factory<F: GridFactory + 'static>(
        self,
        factory: F,
    ) -> TableControllerBuilder<Set<Arc<dyn GridFactory>>, C> {
        self.shared_grid_factory(Arc::new(factory))
    }

    /// Sets a grid factory the caller keeps a handle to.
    pub fn shared_grid_factory(
        self,
        factory: Arc<dyn GridFactory>,
    ) -> TableControllerBuilder<Set<Arc<dyn GridFactory>>, C> {
        TableControllerBuilder {
            grid_factory: Set(factory),
            csrf: self.csrf,
            config: self.config,
            transport: self.transport,
            registry: self.registry,
        }
    }
}

impl<F> TableControllerBuilder<F, Missing> {
    /// Sets the anti-forgery token source.
    pub fn csrf<T: CsrfTokenSource + 'static>(
        self,
        source: T,
    ) -> TableControllerBuilder<F, Set<Arc<dyn CsrfTokenSource>>> {
        TableControllerBuilder {
            grid_factory: self.grid_factory,
            csrf: Set(Arc::new(source) as Arc<dyn CsrfTokenSource>),
            config: self.config,
            transport: self.transport,
            registry: self.registry,
        }
    }
}

impl<F, C> TableControllerBuilder<F, C> {
    /// Sets the table configuration.
    pub fn config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the transport.
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Sets a transport the caller keeps a handle to.
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Shares a registry with other controllers, so redraws reach their tables too.
    pub fn registry(mut self, registry: TableRegistry) -> Self {
        self.registry = Some(registry);
        self
    }
}

impl TableControllerBuilder<Set<Arc<dyn GridFactory>>, Set<Arc<dyn CsrfTokenSource>>> {
    /// Builds the [`TableController`].
    ///
    /// Only available once both the grid factory and the token source are set.
    pub fn build(self) -> TableController {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new()));

        TableController {
            inner: Arc::new(TableControllerInner {
                config: Arc::new(self.config),
                transport,
                csrf: self.csrf.0,
                grid_factory: self.grid_factory.0,
                registry: self.registry.unwrap_or_default(),
            }),
        }
    }
}
