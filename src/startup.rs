//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::application::services::{
    CartService, CartServiceImpl, CatalogService, CatalogServiceImpl, LibraryService,
    LibraryServiceImpl, OrderService, OrderServiceImpl,
};
use crate::config::{CorsSettings, Settings, StorageBackend};
use crate::domain::{
    BundleRepository, CartRepository, DiscountRepository, LibraryRepository, OrderRepository,
    PaymentRepository, ProductRepository,
};
use crate::infrastructure::database;
use crate::infrastructure::memory::MemoryRepositories;
use crate::infrastructure::repositories::{
    PgBundleRepository, PgCartRepository, PgDiscountRepository, PgLibraryRepository,
    PgOrderRepository, PgPaymentRepository, PgProductRepository,
};
use crate::presentation::http::{handlers, routes};
use crate::presentation::middleware::{cors, logging};

/// Backing store, kept for readiness checks
#[derive(Clone)]
pub enum Storage {
    Postgres(PgPool),
    Memory,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogService>,
    pub carts: Arc<dyn CartService>,
    pub orders: Arc<dyn OrderService>,
    pub library: Arc<dyn LibraryService>,
    pub storage: Storage,
}

impl AppState {
    /// Services over PostgreSQL repositories
    pub fn postgres(pool: PgPool) -> Self {
        Self::with_repositories(
            Storage::Postgres(pool.clone()),
            Arc::new(PgProductRepository::new(pool.clone())),
            Arc::new(PgDiscountRepository::new(pool.clone())),
            Arc::new(PgBundleRepository::new(pool.clone())),
            Arc::new(PgCartRepository::new(pool.clone())),
            Arc::new(PgOrderRepository::new(pool.clone())),
            Arc::new(PgPaymentRepository::new(pool.clone())),
            Arc::new(PgLibraryRepository::new(pool)),
        )
    }

    /// Services over in-memory repositories
    pub fn in_memory(repos: MemoryRepositories) -> Self {
        Self::with_repositories(
            Storage::Memory,
            repos.products,
            repos.discounts,
            repos.bundles,
            repos.carts,
            repos.orders,
            repos.payments,
            repos.library,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn with_repositories<P, D, B, C, O, Y, L>(
        storage: Storage,
        products: Arc<P>,
        discounts: Arc<D>,
        bundles: Arc<B>,
        carts: Arc<C>,
        orders: Arc<O>,
        payments: Arc<Y>,
        library: Arc<L>,
    ) -> Self
    where
        P: ProductRepository + 'static,
        D: DiscountRepository + 'static,
        B: BundleRepository + 'static,
        C: CartRepository + 'static,
        O: OrderRepository + 'static,
        Y: PaymentRepository + 'static,
        L: LibraryRepository + 'static,
    {
        let cart_service: Arc<dyn CartService> = Arc::new(CartServiceImpl::new(
            carts.clone(),
            products.clone(),
            discounts.clone(),
            bundles.clone(),
            library.clone(),
        ));

        Self {
            catalog: Arc::new(CatalogServiceImpl::new(products.clone(), discounts, bundles)),
            orders: Arc::new(OrderServiceImpl::new(
                cart_service.clone(),
                carts,
                orders,
                payments,
                library.clone(),
            )),
            library: Arc::new(LibraryServiceImpl::new(library, products)),
            carts: cart_service,
            storage,
        }
    }
}

/// Router with the request trace and CORS layers applied
pub fn build_router(state: AppState, cors_settings: &CorsSettings) -> Router {
    routes::create_router(state)
        .layer(logging::create_trace_layer())
        .layer(cors::create_cors_layer(cors_settings))
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let state = match settings.storage.backend {
            StorageBackend::Postgres => {
                let pool = database::create_pool(&settings.database).await?;
                tracing::info!("Database connection pool created");

                if settings.database.run_migrations {
                    database::run_migrations(&pool).await?;
                    tracing::info!("Database migrations applied");
                }
                AppState::postgres(pool)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage, data is lost on shutdown");
                AppState::in_memory(MemoryRepositories::default())
            }
        };

        handlers::health::init_server_start();
        let router = build_router(state, &settings.cors);

        // Bind to address
        let addr = settings.server.socket_addr()?;
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
