//! Running storefront and admin apps wired to a [`FakeBackend`].

use axum::Router;
use reqwest::redirect::Policy;
use reqwest::{Response, header};
use serde::Serialize;
use tokio::net::TcpListener;

use crate::backend::{FakeBackend, SERVED_POSTCODE};

/// A fake backend plus both web apps, each on its own ephemeral port.
pub struct TestEnv {
    pub backend: FakeBackend,
    pub storefront_url: String,
    pub admin_url: String,
}

impl TestEnv {
    /// Start everything against a freshly seeded backend.
    ///
    /// # Panics
    ///
    /// Panics if an app fails to configure or bind.
    pub async fn start() -> Self {
        let backend = FakeBackend::seeded();
        let api_url = backend.spawn().await;

        let storefront = {
            let api_url = api_url.clone();
            let config = freshfold_storefront::config::StorefrontConfig::from_lookup(|key| match key {
                "FRESHFOLD_API_URL" => Some(api_url.clone()),
                "STOREFRONT_BASE_URL" => Some("http://localhost".to_owned()),
                "STOREFRONT_STATIC_DIR" => {
                    Some(concat!(env!("CARGO_MANIFEST_DIR"), "/../storefront/static").to_owned())
                }
                _ => None,
            })
            .unwrap_or_else(|e| panic!("storefront config: {e}"));
            let state = freshfold_storefront::state::AppState::new(config)
                .unwrap_or_else(|e| panic!("storefront state: {e}"));
            freshfold_storefront::app(state)
        };

        let admin = {
            let config = freshfold_admin::config::AdminConfig::from_lookup(|key| match key {
                "FRESHFOLD_API_URL" => Some(api_url.clone()),
                "ADMIN_BASE_URL" => Some("http://localhost".to_owned()),
                "ADMIN_STATIC_DIR" => {
                    Some(concat!(env!("CARGO_MANIFEST_DIR"), "/../admin/static").to_owned())
                }
                _ => None,
            })
            .unwrap_or_else(|e| panic!("admin config: {e}"));
            let state = freshfold_admin::state::AppState::new(config)
                .unwrap_or_else(|e| panic!("admin state: {e}"));
            freshfold_admin::app(state)
        };

        Self {
            storefront_url: serve(storefront).await,
            admin_url: serve(admin).await,
            backend,
        }
    }

    /// A fresh browser session against the storefront.
    #[must_use]
    pub fn shopper(&self) -> Browser {
        Browser::new(&self.storefront_url)
    }

    /// A fresh browser session against the admin console.
    #[must_use]
    pub fn operator(&self) -> Browser {
        Browser::new(&self.admin_url)
    }
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap_or_else(|e| panic!("bind app: {e}"));
    let addr = listener
        .local_addr()
        .unwrap_or_else(|e| panic!("app address: {e}"));

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Test app stopped: {e}");
        }
    });

    format!("http://{addr}")
}

/// A cookie-keeping HTTP client that does not follow redirects, so tests
/// can assert on `Location`.
pub struct Browser {
    base_url: String,
    client: reqwest::Client,
}

impl Browser {
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .unwrap_or_else(|e| panic!("build client: {e}"));
        Self {
            base_url: base_url.to_owned(),
            client,
        }
    }

    /// # Panics
    ///
    /// Panics on transport errors.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .unwrap_or_else(|e| panic!("GET {path}: {e}"))
    }

    /// Submit a form the way a plain browser would.
    ///
    /// # Panics
    ///
    /// Panics on transport errors.
    pub async fn post<T: Serialize + ?Sized>(&self, path: &str, form: &T) -> Response {
        self.client
            .post(format!("{}{path}", self.base_url))
            .form(form)
            .send()
            .await
            .unwrap_or_else(|e| panic!("POST {path}: {e}"))
    }

    /// Submit a form the way HTMX would.
    ///
    /// # Panics
    ///
    /// Panics on transport errors.
    pub async fn htmx_post<T: Serialize + ?Sized>(&self, path: &str, form: &T) -> Response {
        self.client
            .post(format!("{}{path}", self.base_url))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .unwrap_or_else(|e| panic!("POST {path}: {e}"))
    }

    /// Body of a `GET`.
    pub async fn page(&self, path: &str) -> String {
        text(self.get(path).await).await
    }

    /// Register a new customer, which also signs them in.
    pub async fn sign_up(&self, email: &str) {
        let response = self
            .post(
                "/auth/register",
                &[
                    ("name", "Test Customer"),
                    ("email", email),
                    ("phone", "07700900000"),
                    ("password", "password123"),
                ],
            )
            .await;
        assert_eq!(location(&response), "/services", "registration failed");
    }

    /// Pass the postcode gate with the seeded served postcode.
    pub async fn unlock(&self) {
        let response = self.post("/postcode", &[("pin_code", SERVED_POSTCODE)]).await;
        assert_eq!(location(&response), "/services", "postcode gate stayed shut");
    }

    /// Add one unit of `product_id` to the cart.
    pub async fn add_to_cart(&self, product_id: &str) {
        let response = self.post("/cart/add", &[("product_id", product_id)]).await;
        assert!(
            response.status().is_redirection(),
            "add to cart failed: {}",
            response.status()
        );
    }

    /// Adjust a cart line by `delta`.
    pub async fn adjust(&self, product_id: &str, delta: i32) -> Response {
        let delta = delta.to_string();
        self.post(
            "/cart/update",
            &[("product_id", product_id), ("delta", delta.as_str())],
        )
        .await
    }

    /// Sign in to the admin console.
    pub async fn sign_in(&self, email: &str, password: &str) -> Response {
        self.post("/auth/login", &[("email", email), ("password", password)])
            .await
    }
}

/// `Location` header of a redirect, or `""`.
#[must_use]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

/// Response body as text.
///
/// # Panics
///
/// Panics if the body cannot be read.
pub async fn text(response: Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|e| panic!("read body: {e}"))
}
