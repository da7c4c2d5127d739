//! Shared fixtures: an in-memory endpoint and a controller wired to headless grids.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;
use url::Url;

use gridsync_lib::TableConfig;
use gridsync_lib::TableController;
use gridsync_lib::TableSession;
use gridsync_lib::csrf::StaticCsrfToken;
use gridsync_lib::error::TransportError;
use gridsync_lib::grid::HeadlessGrid;
use gridsync_lib::grid::HeadlessGridFactory;
use gridsync_lib::grid::MountPoint;
use gridsync_lib::transport::FormFields;
use gridsync_lib::transport::Headers;
use gridsync_lib::transport::Transport;

pub const ENDPOINT: &str = "https://example.com/orders/table/";
pub const TOKEN: &str = "tok-123";

type PageHandler = Box<dyn Fn(&FormFields) -> Value + Send + Sync>;

/// A recorded form post.
#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub url: Url,
    pub headers: Headers,
    pub form: FormFields,
}

impl RecordedPost {
    pub fn field(&self, key: &str) -> Option<&str> {
        form_field(&self.form, key)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

pub fn form_field<'a>(form: &'a FormFields, key: &str) -> Option<&'a str> {
    form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

/// In-memory endpoint answering the three grid actions.
pub struct FakeEndpoint {
    init: Value,
    details: Mutex<Option<Result<Value, u16>>>,
    page: PageHandler,
    post_delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    gets: Mutex<Vec<Url>>,
    posts: Mutex<Vec<RecordedPost>>,
}

impl FakeEndpoint {
    pub fn new(init: Value) -> Self {
        Self {
            init,
            details: Mutex::new(None),
            page: Box::new(|form| {
                let draw: u64 = form_field(form, "draw")
                    .and_then(|d| d.parse().ok())
                    .unwrap_or(0);
                json!({"draw": draw, "recordsTotal": 0, "recordsFiltered": 0, "data": []})
            }),
            post_delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            gets: Mutex::new(Vec::new()),
            posts: Mutex::new(Vec::new()),
        }
    }

    /// Makes every page request take `delay` to answer.
    pub fn with_post_delay(mut self, delay: Duration) -> Self {
        self.post_delay = delay;
        self
    }

    /// Highest number of page requests seen in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Details queries received so far.
    pub fn detail_gets(&self) -> Vec<Url> {
        self.gets()
            .into_iter()
            .filter(|url| url.query().is_some_and(|q| q.contains("action=details")))
            .collect()
    }

    pub fn with_page<F>(mut self, page: F) -> Self
    where
        F: Fn(&FormFields) -> Value + Send + Sync + 'static,
    {
        self.page = Box::new(page);
        self
    }

    pub fn with_details(self, html: &str) -> Self {
        *self.details.lock().unwrap() = Some(Ok(json!({ "html": html })));
        self
    }

    pub fn with_failing_details(self, status: u16) -> Self {
        *self.details.lock().unwrap() = Some(Err(status));
        self
    }

    pub fn gets(&self) -> Vec<Url> {
        self.gets.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<RecordedPost> {
        self.posts.lock().unwrap().clone()
    }

    pub fn last_post(&self) -> RecordedPost {
        self.posts.lock().unwrap().last().cloned().expect("no post recorded")
    }
}

#[async_trait]
impl Transport for FakeEndpoint {
    async fn get_json(&self, url: &Url) -> Result<Value, TransportError> {
        self.gets.lock().unwrap().push(url.clone());
        let action = url
            .query_pairs()
            .find(|(k, _)| k == "action")
            .map(|(_, v)| v.into_owned());
        match action.as_deref() {
            Some("initialize") => Ok(self.init.clone()),
            Some("details") => match self.details.lock().unwrap().clone() {
                Some(Ok(value)) => Ok(value),
                Some(Err(status)) => Err(TransportError::http(status, "details failed")),
                None => Err(TransportError::http(404, "not found")),
            },
            _ => Err(TransportError::http(400, "unknown action")),
        }
    }

    async fn post_form(
        &self,
        url: &Url,
        headers: &Headers,
        form: &FormFields,
    ) -> Result<Value, TransportError> {
        self.posts.lock().unwrap().push(RecordedPost {
            url: url.clone(),
            headers: headers.clone(),
            form: form.clone(),
        });
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if !self.post_delay.is_zero() {
            tokio::time::sleep(self.post_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok((self.page)(form))
    }
}

/// Initialization payload with Name (searchable), Actions (non-searchable) and a hidden Id.
pub fn orders_payload(column_filters: bool, date_filters: bool) -> Value {
    json!({
        "columns": [
            {"title": "Name", "data": "name", "name": "name", "searchable": true, "orderable": true},
            {"title": "Actions", "data": null, "searchable": false, "orderable": false},
            {"title": "Id", "data": "id", "name": "id", "visible": false, "searchable": true}
        ],
        "order": [[0, "asc"]],
        "length_menu": [[10, 25, 50], [10, 25, 50]],
        "show_column_filters": column_filters,
        "show_date_filters": date_filters
    })
}

/// Page handler returning `count` rows numbered from the request's offset.
pub fn numbered_rows(count: usize) -> impl Fn(&FormFields) -> Value + Send + Sync + 'static {
    move |form| {
        let draw: u64 = form_field(form, "draw")
            .and_then(|d| d.parse().ok())
            .unwrap_or(0);
        let start: usize = form_field(form, "start")
            .and_then(|d| d.parse().ok())
            .unwrap_or(0);
        let rows: Vec<Value> = (start..start + count)
            .map(|i| json!({"id": i + 1, "name": format!("order-{}", i + 1)}))
            .collect();
        json!({
            "draw": draw,
            "recordsTotal": 100,
            "recordsFiltered": 100,
            "data": rows,
            "footer_message": null
        })
    }
}

pub struct Harness {
    pub controller: TableController,
    pub factory: Arc<HeadlessGridFactory>,
    pub endpoint: Arc<FakeEndpoint>,
}

impl Harness {
    pub fn new(endpoint: FakeEndpoint) -> Self {
        Self::with_config(endpoint, TableConfig::default().with_settle_delay(Duration::ZERO))
    }

    pub fn with_config(endpoint: FakeEndpoint, config: TableConfig) -> Self {
        let factory = Arc::new(HeadlessGridFactory::new());
        let endpoint = Arc::new(endpoint);
        let controller = TableController::builder()
            .shared_grid_factory(factory.clone())
            .csrf(StaticCsrfToken::new(TOKEN))
            .shared_transport(endpoint.clone())
            .config(config)
            .build();
        Self {
            controller,
            factory,
            endpoint,
        }
    }

    pub async fn open(&self, mount: &str) -> (TableSession, Arc<HeadlessGrid>) {
        let session = self
            .controller
            .initialize_table(MountPoint::new(mount), ENDPOINT, None, None)
            .await
            .expect("initialize_table");
        let grid = self
            .factory
            .grid(&MountPoint::new(mount))
            .expect("grid constructed");
        (session, grid)
    }

    /// Opens a table, renders its first page and waits for composition.
    pub async fn open_rendered(&self, mount: &str) -> (TableSession, Arc<HeadlessGrid>) {
        let (session, grid) = self.open(mount).await;
        grid.draw_now().await.expect("first draw");
        settle().await;
        (session, grid)
    }
}

/// Lets spawned work (composition, detail fetches) run to completion.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}
