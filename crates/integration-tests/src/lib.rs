//! Shared fixtures for Menu Cart integration tests.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p menu-cart-integration-tests
//! ```
//!
//! The menu backend is replaced by a local mockito server and the cart lives
//! in a temporary directory, so the tests need no network or setup.

use std::cell::RefCell;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use mockito::{Mock, Server, ServerGuard};
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

use menu_cart_core::Category;
use menu_cart_storefront::catalog::CatalogClient;
use menu_cart_storefront::config::CatalogConfig;
use menu_cart_storefront::session::Session;
use menu_cart_storefront::storage::FileStorage;

pub const SOUPS: &str = r#"[
    {"id": "soup1", "name": "Borscht", "price": 150, "image": "img/borscht.jpg"},
    {"id": "soup2", "name": "Solyanka", "price": 180.5, "image": "img/solyanka.jpg"}
]"#;

pub const DRINKS: &str = r#"[
    {"id": "d1", "name": "Lemonade", "price": 80, "image": "img/lemonade.jpg"}
]"#;

pub const DESSERTS: &str = r#"[
    {"id": 7, "name": "Medovik", "price": 210, "image": "img/medovik.jpg"}
]"#;

pub const MAIN_COURSES: &str = r#"[
    {"id": "m1", "name": "Pelmeni", "price": 320, "image": "img/pelmeni.jpg"}
]"#;

/// Terminal output captured in memory.
#[derive(Debug, Clone, Default)]
pub struct Buffer(Rc<RefCell<Vec<u8>>>);

impl Buffer {
    /// Everything written so far.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    /// Forget what was written so far.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A mock menu backend serving every category.
pub struct MenuBackend {
    server: ServerGuard,
    _mocks: Vec<Mock>,
}

impl MenuBackend {
    /// Serve the fixture menu.
    pub async fn start() -> Self {
        let mut server = Server::new_async().await;
        let mut mocks = Vec::new();

        for (category, body) in Category::ALL
            .into_iter()
            .zip([SOUPS, DRINKS, DESSERTS, MAIN_COURSES])
        {
            let mock = server
                .mock("GET", format!("/{}", category.path()).as_str())
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(body)
                .create_async()
                .await;
            mocks.push(mock);
        }

        Self {
            server,
            _mocks: mocks,
        }
    }

    /// A backend that answers every request with a server error.
    pub async fn failing() -> Self {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        Self {
            server,
            _mocks: vec![mock],
        }
    }

    /// A catalog client pointed at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn catalog(&self) -> CatalogClient {
        CatalogClient::new(&CatalogConfig {
            base_url: format!("{}/", self.server.url()).parse().unwrap(),
            timeout: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(60),
        })
        .unwrap()
    }
}

/// Open a session on `dir` against `backend`, writing to a fresh buffer.
#[must_use]
pub fn open_session(dir: &Path, backend: &MenuBackend) -> (Session<FileStorage, Buffer>, Buffer) {
    let out = Buffer::default();
    let session = Session::open(FileStorage::new(dir), backend.catalog(), out.clone(), "₽");
    (session, out)
}

/// Scripted user input, one line per entry.
#[must_use]
pub fn input(script: &str) -> Lines<BufReader<&[u8]>> {
    BufReader::new(script.as_bytes()).lines()
}
